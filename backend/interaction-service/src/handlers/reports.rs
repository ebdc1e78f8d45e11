/// Report handlers - dedicated report submission and the admin listing
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::Result;
use crate::handlers::AppState;
use crate::models::ReportClaim;

/// Request body for submitting a report
///
/// The proof attachment is referenced by URL; uploading the blob itself
/// belongs to the storage proxy, not this service.
#[derive(Debug, Deserialize)]
pub struct SubmitReportRequest {
    pub report_type: ReportClaim,
    pub report_text: Option<String>,
    pub proof_url: Option<String>,
}

/// Submit a report against a post
pub async fn submit_report(
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
    req: web::Json<SubmitReportRequest>,
) -> Result<HttpResponse> {
    let report = state
        .interactions
        .append_report(
            *post_id,
            req.report_type,
            req.report_text.as_deref(),
            req.proof_url.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "report": report,
    })))
}

/// List all reports newest-first, each joined with its post
pub async fn list_admin_reports(state: web::Data<AppState>) -> Result<HttpResponse> {
    let reports = state.reports.list_reports_with_posts().await?;

    Ok(HttpResponse::Ok().json(reports))
}
