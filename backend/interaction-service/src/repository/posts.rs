use crate::models::Post;
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for Post operations
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

/// Fields accepted when creating a post
pub struct NewPost {
    pub post_type: String,
    pub college: String,
    pub caption: Option<String>,
    pub body: Option<String>,
    pub media_url: Option<String>,
    pub tags: Vec<String>,
    pub alias: String,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a post together with its meta row in one transaction,
    /// so a post is never observable without its counter row.
    pub async fn create_post(&self, new_post: NewPost) -> Result<Post> {
        let mut tx = self.pool.begin().await?;

        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (post_type, college, caption, body, media_url, tags, alias)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, post_type, college, caption, body, media_url, tags, alias, created_at
            "#,
        )
        .bind(&new_post.post_type)
        .bind(&new_post.college)
        .bind(&new_post.caption)
        .bind(&new_post.body)
        .bind(&new_post.media_url)
        .bind(&new_post.tags)
        .bind(&new_post.alias)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO post_meta (post_id) VALUES ($1)")
            .bind(post.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(post)
    }

    /// Get a post by ID
    pub async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, post_type, college, caption, body, media_url, tags, alias, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// List all posts, newest first
    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, post_type, college, caption, body, media_url, tags, alias, created_at
            FROM posts
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// List posts matching a search term across college, caption, body and tags
    ///
    /// Case-insensitive substring match, same coverage the original feed
    /// search had.
    pub async fn search_posts(&self, term: &str) -> Result<Vec<Post>> {
        let pattern = format!("%{}%", term.to_lowercase());
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, post_type, college, caption, body, media_url, tags, alias, created_at
            FROM posts
            WHERE LOWER(college) LIKE $1
               OR LOWER(COALESCE(caption, '')) LIKE $1
               OR LOWER(COALESCE(body, '')) LIKE $1
               OR EXISTS (
                   SELECT 1 FROM UNNEST(tags) AS tag WHERE LOWER(tag) LIKE $1
               )
            ORDER BY created_at DESC
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Delete a post and everything hanging off it
    ///
    /// Reports, comments and meta go first, then the post itself - the
    /// same cascade order the original performed manually. Returns false
    /// when the post did not exist.
    pub async fn delete_post_cascade(&self, post_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM reports WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM post_meta WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}
