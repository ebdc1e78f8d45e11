use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use redis::{aio::ConnectionManager, AsyncCommands};
use uuid::Uuid;

use crate::models::{QueuedVote, VoteAction};

/// Redis list key holding queued vote events awaiting sync
const VOTE_QUEUE_KEY: &str = "vote_queue";

/// Volatile staging area for vote events
///
/// Absorbs high-frequency votes cheaply before they hit the durable
/// counter store. Loss on process restart is tolerated by design; the
/// drain contract is the part that matters: every fully enqueued event
/// is drained exactly once across the whole system.
#[async_trait]
pub trait VoteBuffer: Send + Sync {
    /// Append one vote event. O(1), never touches the durable store.
    async fn enqueue(&self, post_id: Uuid, action: VoteAction) -> Result<()>;

    /// Atomically take and empty the whole queue.
    ///
    /// Events enqueued concurrently with the drain may land in this
    /// drain or the next, but never in both.
    async fn drain_all(&self) -> Result<Vec<QueuedVote>>;

    /// Best-effort fast read of the counter mirror. May lag the durable
    /// store by one sync interval.
    async fn read_count(&self, post_id: Uuid, action: VoteAction) -> Result<Option<i64>>;

    /// Connection health probe.
    async fn ping(&self) -> Result<()>;
}

/// Redis-backed vote buffer
///
/// Counter mirror keys: `post:{post_id}:upvotes` / `post:{post_id}:downvotes`,
/// queue entries: JSON `{"postId", "voteType", "timestamp"}` on a single list.
#[derive(Clone)]
pub struct RedisVoteBuffer {
    redis: ConnectionManager,
}

impl RedisVoteBuffer {
    /// TTL for mirror keys (7 days) - for expire (i64)
    const MIRROR_TTL: i64 = 604800;

    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    fn mirror_key(post_id: Uuid, action: VoteAction) -> String {
        format!("post:{}:{}", post_id, action.mirror_key())
    }
}

#[async_trait]
impl VoteBuffer for RedisVoteBuffer {
    async fn enqueue(&self, post_id: Uuid, action: VoteAction) -> Result<()> {
        let key = Self::mirror_key(post_id, action);
        let mut conn = self.redis.clone();

        let new_count: i64 = conn
            .incr(&key, 1)
            .await
            .context("Failed to increment vote mirror")?;

        // Set TTL on first increment
        if new_count == 1 {
            let _: () = conn
                .expire(&key, Self::MIRROR_TTL)
                .await
                .context("Failed to set TTL on vote mirror")?;
        }

        let event = QueuedVote {
            post_id,
            action,
            queued_at: Utc::now(),
        };
        let payload = serde_json::to_string(&event).context("Failed to serialize vote event")?;

        let _: () = conn
            .lpush(VOTE_QUEUE_KEY, payload)
            .await
            .context("Failed to push vote onto queue")?;

        Ok(())
    }

    async fn drain_all(&self) -> Result<Vec<QueuedVote>> {
        let mut conn = self.redis.clone();

        let len: usize = conn
            .llen(VOTE_QUEUE_KEY)
            .await
            .context("Failed to read vote queue length")?;

        let Some(count) = NonZeroUsize::new(len) else {
            return Ok(Vec::new());
        };

        // LPOP with a count removes the entries in one round trip, so a
        // concurrent drain can never see the same events.
        let raw: Vec<String> = conn
            .lpop(VOTE_QUEUE_KEY, Some(count))
            .await
            .context("Failed to pop vote queue")?;

        let mut events = Vec::with_capacity(raw.len());
        for entry in raw {
            match serde_json::from_str::<QueuedVote>(&entry) {
                Ok(event) => events.push(event),
                Err(e) => {
                    tracing::warn!(error = %e, "Dropping malformed vote queue entry");
                }
            }
        }

        // LPUSH + LPOP yields newest-first; restore enqueue order.
        events.reverse();
        Ok(events)
    }

    async fn read_count(&self, post_id: Uuid, action: VoteAction) -> Result<Option<i64>> {
        let key = Self::mirror_key(post_id, action);
        let count: Option<i64> = self
            .redis
            .clone()
            .get(&key)
            .await
            .context("Failed to read vote mirror")?;

        Ok(count)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.redis.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .context("Redis PING failed")?;

        if pong == "PONG" {
            Ok(())
        } else {
            anyhow::bail!("unexpected PING response: {pong}")
        }
    }
}

/// In-memory vote buffer
///
/// Used when no Redis URL is configured. Same drain semantics as the
/// Redis buffer with the same loss-on-restart tradeoff, minus the
/// cross-process visibility.
#[derive(Default)]
pub struct MemoryVoteBuffer {
    queue: Mutex<VecDeque<QueuedVote>>,
    mirror: Mutex<HashMap<(Uuid, VoteAction), i64>>,
}

impl MemoryVoteBuffer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VoteBuffer for MemoryVoteBuffer {
    async fn enqueue(&self, post_id: Uuid, action: VoteAction) -> Result<()> {
        {
            let mut mirror = self.mirror.lock().expect("vote mirror lock poisoned");
            *mirror.entry((post_id, action)).or_insert(0) += 1;
        }

        let mut queue = self.queue.lock().expect("vote queue lock poisoned");
        queue.push_back(QueuedVote {
            post_id,
            action,
            queued_at: Utc::now(),
        });

        Ok(())
    }

    async fn drain_all(&self) -> Result<Vec<QueuedVote>> {
        let mut queue = self.queue.lock().expect("vote queue lock poisoned");
        Ok(std::mem::take(&mut *queue).into())
    }

    async fn read_count(&self, post_id: Uuid, action: VoteAction) -> Result<Option<i64>> {
        let mirror = self.mirror.lock().expect("vote mirror lock poisoned");
        Ok(mirror.get(&(post_id, action)).copied())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drain_returns_enqueued_events_in_order() {
        let buffer = MemoryVoteBuffer::new();
        let post = Uuid::new_v4();

        buffer.enqueue(post, VoteAction::Upvote).await.unwrap();
        buffer.enqueue(post, VoteAction::Downvote).await.unwrap();
        buffer.enqueue(post, VoteAction::Upvote).await.unwrap();

        let drained = buffer.drain_all().await.unwrap();
        assert_eq!(drained.len(), 3);
        assert_eq!(drained[0].action, VoteAction::Upvote);
        assert_eq!(drained[1].action, VoteAction::Downvote);
        assert_eq!(drained[2].action, VoteAction::Upvote);
    }

    #[tokio::test]
    async fn test_second_drain_is_empty() {
        let buffer = MemoryVoteBuffer::new();
        let post = Uuid::new_v4();

        buffer.enqueue(post, VoteAction::Upvote).await.unwrap();

        assert_eq!(buffer.drain_all().await.unwrap().len(), 1);
        assert!(buffer.drain_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mirror_tracks_enqueued_votes() {
        let buffer = MemoryVoteBuffer::new();
        let post = Uuid::new_v4();

        for _ in 0..3 {
            buffer.enqueue(post, VoteAction::Upvote).await.unwrap();
        }

        assert_eq!(
            buffer.read_count(post, VoteAction::Upvote).await.unwrap(),
            Some(3)
        );
        assert_eq!(
            buffer.read_count(post, VoteAction::Downvote).await.unwrap(),
            None
        );
    }
}
