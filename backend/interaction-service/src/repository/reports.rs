use crate::models::{Post, Report};
use anyhow::Result;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for Report operations
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

/// A report joined with the post it targets, for the admin view
#[derive(Debug, Clone, Serialize)]
pub struct ReportWithPost {
    #[serde(flatten)]
    pub report: Report,
    pub post: Option<Post>,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new report
    pub async fn create_report(
        &self,
        post_id: Uuid,
        report_type: &str,
        report_text: Option<&str>,
        proof_url: Option<&str>,
    ) -> Result<Report> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports (post_id, report_type, report_text, proof_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, post_id, report_type, report_text, proof_url, created_at
            "#,
        )
        .bind(post_id)
        .bind(report_type)
        .bind(report_text)
        .bind(proof_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(report)
    }

    /// List all reports newest first, each joined with its post
    pub async fn list_reports_with_posts(&self) -> Result<Vec<ReportWithPost>> {
        let reports = sqlx::query_as::<_, Report>(
            r#"
            SELECT id, post_id, report_type, report_text, proof_url, created_at
            FROM reports
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(reports.len());
        for report in reports {
            let post = sqlx::query_as::<_, Post>(
                r#"
                SELECT id, post_type, college, caption, body, media_url, tags, alias, created_at
                FROM posts
                WHERE id = $1
                "#,
            )
            .bind(report.post_id)
            .fetch_optional(&self.pool)
            .await?;

            result.push(ReportWithPost { report, post });
        }

        Ok(result)
    }
}
