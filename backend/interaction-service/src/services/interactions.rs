use std::sync::Arc;

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::metrics::{INTERACTIONS_TOTAL, VOTES_DROPPED_TOTAL, VOTES_ENQUEUED_TOTAL};
use crate::models::{
    Comment, CounterColumn, InteractionAction, InteractionSummary, PendingInteraction, Report,
    ReportClaim, VoteAction,
};
use crate::services::counter_store::CounterStore;
use crate::services::interaction_log::InteractionLog;
use crate::services::vote_buffer::VoteBuffer;

/// Outcome of a batch submission
///
/// Per-event failures never abort the rest of the batch; the caller gets
/// the counts instead of per-event bookkeeping.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct BatchOutcome {
    pub accepted: usize,
    pub failed: usize,
}

/// The interaction API boundary
///
/// Votes are cheap and lossy: they go through the write buffer (or fall
/// back to a direct increment) and never surface an error. Comments and
/// reports carry content, so they are applied synchronously and their
/// failures propagate.
pub struct InteractionService {
    store: Arc<dyn CounterStore>,
    log: Arc<dyn InteractionLog>,
    buffer: Arc<dyn VoteBuffer>,
}

impl InteractionService {
    pub fn new(
        store: Arc<dyn CounterStore>,
        log: Arc<dyn InteractionLog>,
        buffer: Arc<dyn VoteBuffer>,
    ) -> Self {
        Self { store, log, buffer }
    }

    /// Submit one interaction
    pub async fn submit(
        &self,
        post_id: Uuid,
        action: InteractionAction,
        comment_text: Option<&str>,
    ) -> Result<()> {
        match action {
            InteractionAction::Upvote => self.submit_vote(post_id, VoteAction::Upvote).await,
            InteractionAction::Downvote => self.submit_vote(post_id, VoteAction::Downvote).await,
            InteractionAction::Comment => {
                let text = comment_text
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| {
                        AppError::Validation("comment requires comment_text".to_string())
                    })?;

                let result = self.append_comment(post_id, text).await;
                self.record_outcome(action, result.is_ok());
                result.map(|_| ())
            }
            InteractionAction::Report => {
                // Reports through the generic interact path default to a
                // "false" claim; the dedicated report endpoint takes an
                // explicit claim and proof reference.
                let result = self
                    .append_report(post_id, ReportClaim::False, comment_text, None)
                    .await;
                self.record_outcome(action, result.is_ok());
                result.map(|_| ())
            }
        }
    }

    /// Submit one vote through the buffer, falling back to a direct
    /// increment when the buffer is unavailable
    ///
    /// Votes favor availability over durability: even a double failure
    /// is logged and dropped, never surfaced to the caller.
    async fn submit_vote(&self, post_id: Uuid, vote: VoteAction) -> Result<()> {
        match self.buffer.enqueue(post_id, vote).await {
            Ok(()) => {
                VOTES_ENQUEUED_TOTAL
                    .with_label_values(&[vote.mirror_key()])
                    .inc();
            }
            Err(e) => {
                tracing::warn!(
                    post_id = %post_id,
                    error = %e,
                    "Vote buffer unavailable, incrementing counter directly"
                );
                if let Err(e) = self
                    .store
                    .increment(post_id, vote.counter_column(), 1)
                    .await
                {
                    tracing::error!(
                        post_id = %post_id,
                        error = %e,
                        "Dropping vote after direct increment failure"
                    );
                    VOTES_DROPPED_TOTAL.with_label_values(&["submit"]).inc();
                }
            }
        }

        let action = match vote {
            VoteAction::Upvote => InteractionAction::Upvote,
            VoteAction::Downvote => InteractionAction::Downvote,
        };
        self.record_outcome(action, true);
        Ok(())
    }

    /// Submit a batch of interactions in array order, continue-on-error
    pub async fn submit_batch(&self, events: &[PendingInteraction]) -> BatchOutcome {
        let mut outcome = BatchOutcome {
            accepted: 0,
            failed: 0,
        };

        for event in events {
            match self
                .submit(event.post_id, event.action, event.comment_text.as_deref())
                .await
            {
                Ok(()) => outcome.accepted += 1,
                Err(e) => {
                    tracing::warn!(
                        post_id = %event.post_id,
                        action = event.action.as_str(),
                        error = %e,
                        "Batch event failed, continuing with remaining events"
                    );
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }

    /// Append a comment row and bump the denormalized count
    pub async fn append_comment(&self, post_id: Uuid, text: &str) -> Result<Comment> {
        let comment = self.log.append_comment(post_id, text).await?;
        self.store
            .increment(post_id, CounterColumn::Comments, 1)
            .await?;
        Ok(comment)
    }

    /// Append a report row and bump the report count
    pub async fn append_report(
        &self,
        post_id: Uuid,
        claim: ReportClaim,
        report_text: Option<&str>,
        proof_url: Option<&str>,
    ) -> Result<Report> {
        let report = self
            .log
            .append_report(post_id, claim, report_text, proof_url)
            .await?;
        self.store
            .increment(post_id, CounterColumn::Reports, 1)
            .await?;
        Ok(report)
    }

    /// Merged read view: counters from the durable store plus the
    /// comment list, newest first
    ///
    /// A missing meta row is the normal zero state for a fresh post,
    /// never an error - the comments that do exist are still returned.
    pub async fn summary(&self, post_id: Uuid) -> Result<InteractionSummary> {
        let comments = self.log.comments_newest_first(post_id).await?;

        let mut summary = match self.store.get(post_id).await? {
            Some(meta) => InteractionSummary {
                upvotes: meta.upvotes,
                downvotes: meta.downvotes,
                reports: meta.reports,
                comments: Vec::new(),
            },
            None => InteractionSummary::empty(),
        };
        summary.comments = comments;

        Ok(summary)
    }

    fn record_outcome(&self, action: InteractionAction, ok: bool) {
        let outcome = if ok { "accepted" } else { "failed" };
        INTERACTIONS_TOTAL
            .with_label_values(&[action.as_str(), outcome])
            .inc();
    }
}
