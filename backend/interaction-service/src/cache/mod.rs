//! Read-side post cache backed by Redis.
//!
//! Posts lists, single posts and search results are cached as JSON with
//! distinct TTLs. Cache failures are logged and treated as misses -
//! the durable store always remains the source of truth, so nothing
//! here can surface an error to a caller.

use redis::{aio::ConnectionManager, AsyncCommands};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::metrics::POST_CACHE_EVENTS;
use crate::models::Post;

/// TTL for the full posts list (5 minutes)
const POSTS_LIST_TTL: u64 = 300;
/// TTL for a single post (10 minutes)
const SINGLE_POST_TTL: u64 = 600;
/// TTL for search results (3 minutes)
const SEARCH_TTL: u64 = 180;

const POSTS_LIST_KEY: &str = "posts:all";

/// Post cache over an optional Redis connection
///
/// Without Redis every read is a miss and every write a no-op, so the
/// service degrades to querying Postgres directly.
#[derive(Clone)]
pub struct PostCache {
    redis: Option<ConnectionManager>,
}

impl PostCache {
    pub fn new(redis: Option<ConnectionManager>) -> Self {
        Self { redis }
    }

    fn post_key(post_id: Uuid) -> String {
        format!("post:{post_id}")
    }

    fn search_key(term: &str) -> String {
        format!("search:{}", term.to_lowercase())
    }

    async fn read_json<T: DeserializeOwned>(&self, cache: &str, key: &str) -> Option<T> {
        let mut conn = self.redis.clone()?;

        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(data)) => match serde_json::from_str::<T>(&data) {
                Ok(value) => {
                    debug!(key, "Post cache HIT");
                    POST_CACHE_EVENTS.with_label_values(&[cache, "hit"]).inc();
                    Some(value)
                }
                Err(e) => {
                    warn!(key, error = %e, "Failed to deserialize cached entry");
                    POST_CACHE_EVENTS.with_label_values(&[cache, "error"]).inc();
                    None
                }
            },
            Ok(None) => {
                debug!(key, "Post cache MISS");
                POST_CACHE_EVENTS.with_label_values(&[cache, "miss"]).inc();
                None
            }
            Err(e) => {
                warn!(key, error = %e, "Post cache read failed");
                POST_CACHE_EVENTS.with_label_values(&[cache, "error"]).inc();
                None
            }
        }
    }

    async fn write_json<T: Serialize>(&self, cache: &str, key: &str, value: &T, ttl: u64) {
        let Some(mut conn) = self.redis.clone() else {
            return;
        };

        let data = match serde_json::to_string(value) {
            Ok(data) => data,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };

        if let Err(e) = conn.set_ex::<_, _, ()>(key, data, ttl).await {
            warn!(key, error = %e, "Post cache write failed");
            POST_CACHE_EVENTS.with_label_values(&[cache, "error"]).inc();
        }
    }

    pub async fn read_posts_list(&self) -> Option<Vec<Post>> {
        self.read_json("posts_list", POSTS_LIST_KEY).await
    }

    pub async fn write_posts_list(&self, posts: &[Post]) {
        self.write_json("posts_list", POSTS_LIST_KEY, &posts, POSTS_LIST_TTL)
            .await;
    }

    pub async fn read_post(&self, post_id: Uuid) -> Option<Post> {
        self.read_json("single_post", &Self::post_key(post_id)).await
    }

    pub async fn write_post(&self, post: &Post) {
        self.write_json("single_post", &Self::post_key(post.id), post, SINGLE_POST_TTL)
            .await;
    }

    pub async fn read_search(&self, term: &str) -> Option<Vec<Post>> {
        self.read_json("search", &Self::search_key(term)).await
    }

    pub async fn write_search(&self, term: &str, posts: &[Post]) {
        self.write_json("search", &Self::search_key(term), &posts, SEARCH_TTL)
            .await;
    }

    /// Drop the posts list and every search entry (on create/delete)
    pub async fn clear_posts(&self) {
        let Some(mut conn) = self.redis.clone() else {
            return;
        };

        if let Err(e) = conn.del::<_, ()>(POSTS_LIST_KEY).await {
            warn!(error = %e, "Failed to clear posts list cache");
            return;
        }

        match conn.keys::<_, Vec<String>>("search:*").await {
            Ok(keys) if !keys.is_empty() => {
                let count = keys.len();
                if let Err(e) = conn.del::<_, ()>(keys).await {
                    warn!(error = %e, "Failed to clear search caches");
                } else {
                    debug!(count, "Cleared search caches");
                }
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Failed to list search cache keys"),
        }
    }

    /// Drop one post's entry plus the list caches that contain it
    pub async fn clear_post(&self, post_id: Uuid) {
        let Some(mut conn) = self.redis.clone() else {
            return;
        };

        if let Err(e) = conn.del::<_, ()>(Self::post_key(post_id)).await {
            warn!(post_id = %post_id, error = %e, "Failed to clear post cache");
        }

        self.clear_posts().await;
    }
}
