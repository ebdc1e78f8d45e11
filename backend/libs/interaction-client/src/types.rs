use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Interaction kinds the API accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionAction {
    Upvote,
    Downvote,
    Comment,
    Report,
}

/// An interaction applied locally but not yet flushed to the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingInteraction {
    pub post_id: Uuid,
    pub action: InteractionAction,
    pub comment_text: Option<String>,
    pub enqueued_at: DateTime<Utc>,
}

/// A comment as held in local state
///
/// Comments fabricated by an optimistic update carry a temporary id and
/// a client-generated timestamp until the next refresh replaces them
/// with the server's view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalComment {
    pub id: Uuid,
    pub text: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing)]
    pub pending: bool,
}

/// Local interaction view for one post
#[derive(Debug, Clone, Default)]
pub struct PostInteractions {
    pub upvotes: i64,
    pub downvotes: i64,
    pub reports: i64,
    pub comments: Vec<LocalComment>,
}

/// The server's merged interaction view, as returned by
/// `GET /api/interactions/{postId}`
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionSummary {
    pub upvotes: i64,
    pub downvotes: i64,
    pub reports: i64,
    pub comments: Vec<LocalComment>,
}
