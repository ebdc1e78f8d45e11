use crate::models::{CounterColumn, PostMeta};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Durable per-post counter storage
///
/// `increment` is the sole mutation path for counters. No caller is
/// permitted to read-modify-write a counter field, which is what makes
/// concurrent votes from many clients safe without external locking.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically add `amount` to one counter column for a post.
    ///
    /// An unknown post is a non-fatal no-op (logged, nothing touched).
    async fn increment(&self, post_id: Uuid, column: CounterColumn, amount: i64) -> Result<()>;

    /// Fetch the counter row for a post. None means the row does not
    /// exist yet, which readers treat as the zero state.
    async fn get(&self, post_id: Uuid) -> Result<Option<PostMeta>>;
}

/// PostgreSQL-backed counter store over the post_meta table
#[derive(Clone)]
pub struct PgCounterStore {
    pool: PgPool,
}

impl PgCounterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CounterStore for PgCounterStore {
    async fn increment(&self, post_id: Uuid, column: CounterColumn, amount: i64) -> Result<()> {
        // One fixed statement per closed-enum column keeps identifiers
        // out of the bind path entirely.
        let query = match column {
            CounterColumn::Upvotes => {
                "UPDATE post_meta SET upvotes = upvotes + $2 WHERE post_id = $1"
            }
            CounterColumn::Downvotes => {
                "UPDATE post_meta SET downvotes = downvotes + $2 WHERE post_id = $1"
            }
            CounterColumn::Comments => {
                "UPDATE post_meta SET comments = comments + $2 WHERE post_id = $1"
            }
            CounterColumn::Reports => {
                "UPDATE post_meta SET reports = reports + $2 WHERE post_id = $1"
            }
        };

        let result = sqlx::query(query)
            .bind(post_id)
            .bind(amount)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::warn!(
                post_id = %post_id,
                column = column.as_str(),
                amount,
                "Counter increment targeted a missing post, skipping"
            );
        }

        Ok(())
    }

    async fn get(&self, post_id: Uuid) -> Result<Option<PostMeta>> {
        let meta = sqlx::query_as::<_, PostMeta>(
            r#"
            SELECT post_id, upvotes, downvotes, comments, reports
            FROM post_meta
            WHERE post_id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(meta)
    }
}
