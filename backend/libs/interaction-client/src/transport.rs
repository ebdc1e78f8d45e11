use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::types::{InteractionSummary, PendingInteraction};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server rejected request with status {0}")]
    Status(u16),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Transport used to flush batches and refresh summaries
///
/// Abstracted so the aggregator can be exercised without a network.
#[async_trait]
pub trait BatchTransport: Send + Sync {
    /// Ship a batch of pending interactions. Best-effort: the caller
    /// has already cleared its queue by the time this returns.
    async fn submit_batch(&self, events: &[PendingInteraction]) -> Result<()>;

    /// Fetch the server's merged view for one post.
    async fn fetch_summary(&self, post_id: Uuid) -> Result<InteractionSummary>;
}

/// Wire entry for one interaction in a batch request
#[derive(Debug, Serialize)]
struct InteractionEntry<'a> {
    #[serde(rename = "postId")]
    post_id: Uuid,
    #[serde(rename = "actionType")]
    action_type: crate::types::InteractionAction,
    #[serde(rename = "commentText", skip_serializing_if = "Option::is_none")]
    comment_text: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    interactions: Vec<InteractionEntry<'a>>,
}

/// HTTP transport against the interaction service
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BatchTransport for HttpTransport {
    async fn submit_batch(&self, events: &[PendingInteraction]) -> Result<()> {
        let body = BatchRequest {
            interactions: events
                .iter()
                .map(|e| InteractionEntry {
                    post_id: e.post_id,
                    action_type: e.action,
                    comment_text: e.comment_text.as_deref(),
                })
                .collect(),
        };

        let response = self
            .client
            .post(format!("{}/api/interactions/batch", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }

        Ok(())
    }

    async fn fetch_summary(&self, post_id: Uuid) -> Result<InteractionSummary> {
        let response = self
            .client
            .get(format!("{}/api/interactions/{}", self.base_url, post_id))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }

        Ok(response.json::<InteractionSummary>().await?)
    }
}
