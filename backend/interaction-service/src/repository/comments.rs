use crate::models::Comment;
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for Comment operations
#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new comment
    pub async fn create_comment(&self, post_id: Uuid, comment_text: &str) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, comment_text)
            VALUES ($1, $2)
            RETURNING id, post_id, comment_text, created_at
            "#,
        )
        .bind(post_id)
        .bind(comment_text)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Get comments for a post, newest first
    ///
    /// Ties on created_at fall back to id so the order stays stable
    /// across reads.
    pub async fn get_post_comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, comment_text, created_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }
}
