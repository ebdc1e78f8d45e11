use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - an anonymous submission tagged to a college
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub post_type: String,
    pub college: String,
    pub caption: Option<String>,
    pub body: Option<String>,
    pub media_url: Option<String>,
    pub tags: Vec<String>,
    pub alias: String,
    pub created_at: DateTime<Utc>,
}

/// Aggregate engagement counters for a post
///
/// All four counters are monotonic: no decrement operation exists anywhere
/// in the system, so concurrent increments commute freely.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::FromRow)]
pub struct PostMeta {
    pub post_id: Uuid,
    pub upvotes: i64,
    pub downvotes: i64,
    pub comments: i64,
    pub reports: i64,
}

/// Comment entity - stored as an independent row since it carries content
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub comment_text: String,
    pub created_at: DateTime<Utc>,
}

/// Report entity - a claim that a post is true or false
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Report {
    pub id: Uuid,
    pub post_id: Uuid,
    pub report_type: String,
    pub report_text: Option<String>,
    pub proof_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Post type accepted at creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Photo,
    Video,
    Text,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Photo => "photo",
            PostType::Video => "video",
            PostType::Text => "text",
        }
    }
}

/// The closed set of counter columns on post_meta
///
/// Mapping each variant to a fixed column name is what keeps the
/// increment SQL free of interpolated identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterColumn {
    Upvotes,
    Downvotes,
    Comments,
    Reports,
}

impl CounterColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterColumn::Upvotes => "upvotes",
            CounterColumn::Downvotes => "downvotes",
            CounterColumn::Comments => "comments",
            CounterColumn::Reports => "reports",
        }
    }
}

/// A vote as it travels through the write buffer
///
/// Serialized names match the queue entries the sync pipeline stores in
/// Redis: `{"postId": ..., "voteType": "upvotes", "timestamp": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteAction {
    #[serde(rename = "upvotes")]
    Upvote,
    #[serde(rename = "downvotes")]
    Downvote,
}

impl VoteAction {
    /// Counter column this vote lands on after reconciliation
    pub fn counter_column(&self) -> CounterColumn {
        match self {
            VoteAction::Upvote => CounterColumn::Upvotes,
            VoteAction::Downvote => CounterColumn::Downvotes,
        }
    }

    /// Key fragment used for the fast Redis counter mirror
    pub fn mirror_key(&self) -> &'static str {
        self.counter_column().as_str()
    }
}

/// Interaction kinds accepted on the HTTP surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionAction {
    Upvote,
    Downvote,
    Comment,
    Report,
}

impl InteractionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionAction::Upvote => "upvote",
            InteractionAction::Downvote => "downvote",
            InteractionAction::Comment => "comment",
            InteractionAction::Report => "report",
        }
    }

    /// Vote actions are buffered; comment/report are applied synchronously
    pub fn as_vote(&self) -> Option<VoteAction> {
        match self {
            InteractionAction::Upvote => Some(VoteAction::Upvote),
            InteractionAction::Downvote => Some(VoteAction::Downvote),
            _ => None,
        }
    }
}

/// Claim type attached to a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportClaim {
    #[serde(rename = "true")]
    True,
    #[serde(rename = "false")]
    False,
}

impl ReportClaim {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportClaim::True => "true",
            ReportClaim::False => "false",
        }
    }
}

/// An interaction event not yet durably applied
///
/// Lives only in the client queue or a server batch; loss on crash is
/// tolerated for vote kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingInteraction {
    pub post_id: Uuid,
    pub action: InteractionAction,
    pub comment_text: Option<String>,
    pub enqueued_at: DateTime<Utc>,
}

/// A single vote event queued in the write buffer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedVote {
    #[serde(rename = "postId")]
    pub post_id: Uuid,
    #[serde(rename = "voteType")]
    pub action: VoteAction,
    #[serde(rename = "timestamp")]
    pub queued_at: DateTime<Utc>,
}

/// Merged read model returned by the interaction summary endpoint
#[derive(Debug, Clone, Serialize)]
pub struct InteractionSummary {
    pub upvotes: i64,
    pub downvotes: i64,
    pub reports: i64,
    pub comments: Vec<Comment>,
}

impl InteractionSummary {
    /// Zero state for a post with no meta row yet - a normal condition
    /// for freshly created posts, never an error.
    pub fn empty() -> Self {
        Self {
            upvotes: 0,
            downvotes: 0,
            reports: 0,
            comments: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_names() {
        let action: InteractionAction = serde_json::from_str("\"upvote\"").unwrap();
        assert_eq!(action, InteractionAction::Upvote);
        assert!(serde_json::from_str::<InteractionAction>("\"like\"").is_err());
    }

    #[test]
    fn test_queued_vote_wire_shape() {
        let vote = QueuedVote {
            post_id: Uuid::new_v4(),
            action: VoteAction::Upvote,
            queued_at: Utc::now(),
        };
        let json = serde_json::to_value(&vote).unwrap();
        assert_eq!(json["voteType"], "upvotes");
        assert!(json.get("postId").is_some());
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn test_vote_maps_to_counter_column() {
        assert_eq!(VoteAction::Upvote.counter_column(), CounterColumn::Upvotes);
        assert_eq!(
            VoteAction::Downvote.counter_column(),
            CounterColumn::Downvotes
        );
        assert_eq!(InteractionAction::Comment.as_vote(), None);
    }
}
