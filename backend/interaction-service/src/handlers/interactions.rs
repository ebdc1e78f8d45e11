/// Interaction handlers - the HTTP surface the client aggregator calls
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::handlers::AppState;
use crate::models::{Comment, InteractionAction, PendingInteraction};

/// Request body for a single interaction
#[derive(Debug, Deserialize)]
pub struct SubmitInteractionRequest {
    #[serde(rename = "postId")]
    pub post_id: Uuid,
    #[serde(rename = "actionType")]
    pub action_type: InteractionAction,
    #[serde(rename = "commentText", default)]
    pub comment_text: Option<String>,
}

/// Request body for a batched flush from the client aggregator
#[derive(Debug, Deserialize)]
pub struct SubmitBatchRequest {
    pub interactions: Vec<SubmitInteractionRequest>,
}

/// Comment entry as returned on the summary endpoint
#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub text: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            text: comment.comment_text,
            created_at: comment.created_at,
        }
    }
}

/// Response body for the summary endpoint
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub upvotes: i64,
    pub downvotes: i64,
    pub reports: i64,
    pub comments: Vec<CommentView>,
}

/// Submit one interaction
pub async fn submit_interaction(
    state: web::Data<AppState>,
    req: web::Json<SubmitInteractionRequest>,
) -> Result<HttpResponse> {
    state
        .interactions
        .submit(req.post_id, req.action_type, req.comment_text.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

/// Submit a batch of interactions, best-effort per event
pub async fn submit_interaction_batch(
    state: web::Data<AppState>,
    req: web::Json<SubmitBatchRequest>,
) -> Result<HttpResponse> {
    let events: Vec<PendingInteraction> = req
        .into_inner()
        .interactions
        .into_iter()
        .map(|item| PendingInteraction {
            post_id: item.post_id,
            action: item.action_type,
            comment_text: item.comment_text,
            enqueued_at: Utc::now(),
        })
        .collect();

    let outcome = state.interactions.submit_batch(&events).await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "accepted": outcome.accepted,
        "failed": outcome.failed,
    })))
}

/// Merged interaction view for one post: counters plus comment list
pub async fn get_interactions(
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let summary = state.interactions.summary(*post_id).await?;

    let response = SummaryResponse {
        upvotes: summary.upvotes,
        downvotes: summary.downvotes,
        reports: summary.reports,
        comments: summary.comments.into_iter().map(CommentView::from).collect(),
    };

    Ok(HttpResponse::Ok().json(response))
}
