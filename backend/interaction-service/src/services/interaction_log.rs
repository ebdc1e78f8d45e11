use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Comment, Report, ReportClaim};
use crate::repository::{CommentRepository, ReportRepository};

/// Append-only record of content-carrying interactions
///
/// Comments and reports live here rather than in the write buffer: they
/// carry content that must not be lost silently, so they are appended
/// synchronously and their failures propagate to the caller.
#[async_trait]
pub trait InteractionLog: Send + Sync {
    async fn append_comment(&self, post_id: Uuid, comment_text: &str) -> Result<Comment>;

    async fn append_report(
        &self,
        post_id: Uuid,
        claim: ReportClaim,
        report_text: Option<&str>,
        proof_url: Option<&str>,
    ) -> Result<Report>;

    /// Comments for a post ordered newest-first by creation timestamp,
    /// insertion order breaking ties.
    async fn comments_newest_first(&self, post_id: Uuid) -> Result<Vec<Comment>>;
}

/// PostgreSQL-backed interaction log over the comment/report repositories
#[derive(Clone)]
pub struct PgInteractionLog {
    comments: CommentRepository,
    reports: ReportRepository,
}

impl PgInteractionLog {
    pub fn new(comments: CommentRepository, reports: ReportRepository) -> Self {
        Self { comments, reports }
    }
}

#[async_trait]
impl InteractionLog for PgInteractionLog {
    async fn append_comment(&self, post_id: Uuid, comment_text: &str) -> Result<Comment> {
        self.comments.create_comment(post_id, comment_text).await
    }

    async fn append_report(
        &self,
        post_id: Uuid,
        claim: ReportClaim,
        report_text: Option<&str>,
        proof_url: Option<&str>,
    ) -> Result<Report> {
        self.reports
            .create_report(post_id, claim.as_str(), report_text, proof_url)
            .await
    }

    async fn comments_newest_first(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        self.comments.get_post_comments(post_id).await
    }
}
