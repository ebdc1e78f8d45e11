//! Client-side interaction aggregation.
//!
//! Every user action mutates local state synchronously (zero perceived
//! latency) and lands in a bounded pending queue. A flush timer ships
//! the whole queue as one batch on a fixed interval and clears it
//! regardless of the network outcome - optimistic state is never rolled
//! back on a failed flush.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::transport::BatchTransport;
use crate::types::{
    InteractionAction, InteractionSummary, LocalComment, PendingInteraction, PostInteractions,
};

/// Aggregator tuning
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// How often the pending queue is flushed
    pub flush_interval: Duration,
    /// Queue bound; overflow drops the oldest event
    pub max_pending: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_secs(3),
            max_pending: 1024,
        }
    }
}

/// Local interaction state plus the pending queue
///
/// Single-owner, mutated only under the handle's lock; all methods are
/// synchronous so a UI thread sees its own writes immediately.
pub struct FeedAggregator {
    state: HashMap<Uuid, PostInteractions>,
    pending: VecDeque<PendingInteraction>,
    max_pending: usize,
}

impl FeedAggregator {
    pub fn new(max_pending: usize) -> Self {
        Self {
            state: HashMap::new(),
            pending: VecDeque::new(),
            max_pending,
        }
    }

    /// Apply one user action optimistically and queue it for the next
    /// flush
    pub fn interact(&mut self, post_id: Uuid, action: InteractionAction, text: Option<String>) {
        let entry = self.state.entry(post_id).or_default();

        match action {
            InteractionAction::Upvote => entry.upvotes += 1,
            InteractionAction::Downvote => entry.downvotes += 1,
            InteractionAction::Report => entry.reports += 1,
            InteractionAction::Comment => {
                // Fabricate the comment locally; the next refresh swaps
                // it for the server's record.
                entry.comments.insert(
                    0,
                    LocalComment {
                        id: Uuid::new_v4(),
                        text: text.clone().unwrap_or_default(),
                        created_at: Utc::now(),
                        pending: true,
                    },
                );
            }
        }

        self.pending.push_back(PendingInteraction {
            post_id,
            action,
            comment_text: text,
            enqueued_at: Utc::now(),
        });

        if self.pending.len() > self.max_pending {
            self.pending.pop_front();
            warn!(post_id = %post_id, "Pending queue full, dropped oldest interaction");
        }
    }

    /// Current local view for a post (zero state when untouched)
    pub fn interactions(&self, post_id: Uuid) -> PostInteractions {
        self.state.get(&post_id).cloned().unwrap_or_default()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Take the whole queue, leaving it empty
    pub fn take_pending(&mut self) -> Vec<PendingInteraction> {
        self.pending.drain(..).collect()
    }

    /// Replace a post's local view with the server's merged view
    pub fn apply_summary(&mut self, post_id: Uuid, summary: InteractionSummary) {
        self.state.insert(
            post_id,
            PostInteractions {
                upvotes: summary.upvotes,
                downvotes: summary.downvotes,
                reports: summary.reports,
                comments: summary.comments,
            },
        );
    }
}

/// Owns the aggregator, the transport and the flush timer
///
/// Dropping the handle without calling [`shutdown`](Self::shutdown)
/// aborts the timer task; `shutdown` also flushes whatever is queued.
pub struct AggregatorHandle {
    inner: Arc<Mutex<FeedAggregator>>,
    transport: Arc<dyn BatchTransport>,
    flush_task: JoinHandle<()>,
}

/// One fire-and-forget flush: take the queue, ship it, keep going.
///
/// The queue is cleared before the network call resolves, so a failed
/// flush loses those events - the accepted tradeoff for vote traffic.
async fn flush_once(inner: &Mutex<FeedAggregator>, transport: &dyn BatchTransport) {
    let events = {
        let mut aggregator = inner.lock().await;
        aggregator.take_pending()
    };

    if events.is_empty() {
        return;
    }

    debug!(count = events.len(), "Flushing pending interactions");
    if let Err(e) = transport.submit_batch(&events).await {
        warn!(
            count = events.len(),
            error = %e,
            "Batch flush failed, events dropped"
        );
    }
}

impl AggregatorHandle {
    /// Start the aggregator with its flush timer
    pub fn start(transport: Arc<dyn BatchTransport>, config: AggregatorConfig) -> Self {
        let inner = Arc::new(Mutex::new(FeedAggregator::new(config.max_pending)));

        let timer_inner = inner.clone();
        let timer_transport = transport.clone();
        let flush_task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.flush_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                flush_once(&timer_inner, timer_transport.as_ref()).await;
            }
        });

        Self {
            inner,
            transport,
            flush_task,
        }
    }

    /// Apply one user action: local state now, network later
    pub async fn interact(
        &self,
        post_id: Uuid,
        action: InteractionAction,
        text: Option<String>,
    ) {
        self.inner.lock().await.interact(post_id, action, text);
    }

    /// Current local view for a post
    pub async fn interactions(&self, post_id: Uuid) -> PostInteractions {
        self.inner.lock().await.interactions(post_id)
    }

    pub async fn pending_len(&self) -> usize {
        self.inner.lock().await.pending_len()
    }

    /// Flush immediately instead of waiting for the timer
    pub async fn flush_now(&self) {
        flush_once(&self.inner, self.transport.as_ref()).await;
    }

    /// Replace local state for a post from the server
    pub async fn refresh(&self, post_id: Uuid) -> crate::transport::Result<()> {
        let summary = self.transport.fetch_summary(post_id).await?;
        self.inner.lock().await.apply_summary(post_id, summary);
        Ok(())
    }

    /// Stop the timer and flush whatever is still queued
    pub async fn shutdown(self) {
        self.flush_task.abort();
        flush_once(&self.inner, self.transport.as_ref()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ClientError, Result as TransportResult};
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    /// Transport that records every batch it receives
    #[derive(Default)]
    struct RecordingTransport {
        batches: StdMutex<Vec<Vec<PendingInteraction>>>,
    }

    impl RecordingTransport {
        fn batches(&self) -> Vec<Vec<PendingInteraction>> {
            self.batches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BatchTransport for RecordingTransport {
        async fn submit_batch(&self, events: &[PendingInteraction]) -> TransportResult<()> {
            self.batches.lock().unwrap().push(events.to_vec());
            Ok(())
        }

        async fn fetch_summary(&self, _post_id: Uuid) -> TransportResult<InteractionSummary> {
            Ok(InteractionSummary {
                upvotes: 10,
                downvotes: 2,
                reports: 0,
                comments: vec![],
            })
        }
    }

    /// Transport whose flushes always fail
    struct FailingTransport;

    #[async_trait]
    impl BatchTransport for FailingTransport {
        async fn submit_batch(&self, _events: &[PendingInteraction]) -> TransportResult<()> {
            Err(ClientError::Status(500))
        }

        async fn fetch_summary(&self, _post_id: Uuid) -> TransportResult<InteractionSummary> {
            Err(ClientError::Status(500))
        }
    }

    #[tokio::test]
    async fn test_optimistic_updates_are_visible_immediately() {
        let mut aggregator = FeedAggregator::new(1024);
        let post = Uuid::new_v4();

        for _ in 0..3 {
            aggregator.interact(post, InteractionAction::Upvote, None);
        }

        // No flush has happened, yet the local view already moved.
        assert_eq!(aggregator.interactions(post).upvotes, 3);
        assert_eq!(aggregator.pending_len(), 3);
    }

    #[tokio::test]
    async fn test_comment_is_prepended_with_temporary_identity() {
        let mut aggregator = FeedAggregator::new(1024);
        let post = Uuid::new_v4();

        aggregator.interact(post, InteractionAction::Comment, Some("old".into()));
        aggregator.interact(post, InteractionAction::Comment, Some("new".into()));

        let view = aggregator.interactions(post);
        assert_eq!(view.comments.len(), 2);
        assert_eq!(view.comments[0].text, "new");
        assert!(view.comments[0].pending);
    }

    #[tokio::test]
    async fn test_flush_ships_the_exact_queue_once() {
        let transport = Arc::new(RecordingTransport::default());
        let handle =
            AggregatorHandle::start(transport.clone(), AggregatorConfig::default());
        let post = Uuid::new_v4();

        for _ in 0..3 {
            handle.interact(post, InteractionAction::Upvote, None).await;
        }

        handle.flush_now().await;

        let batches = transport.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 3);
        assert!(batches[0]
            .iter()
            .all(|e| e.post_id == post && e.action == InteractionAction::Upvote));

        // Nothing left to flush: a second flush sends no batch.
        handle.flush_now().await;
        assert_eq!(transport.batches().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_flushes_within_one_interval() {
        let transport = Arc::new(RecordingTransport::default());
        let handle =
            AggregatorHandle::start(transport.clone(), AggregatorConfig::default());
        let post = Uuid::new_v4();

        handle.interact(post, InteractionAction::Upvote, None).await;

        // Paused clock: advancing past the interval fires the timer.
        tokio::time::advance(Duration::from_secs(4)).await;
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }

        assert_eq!(transport.batches().len(), 1);
        assert_eq!(handle.pending_len().await, 0);
    }

    #[tokio::test]
    async fn test_failed_flush_clears_queue_and_keeps_optimistic_state() {
        let handle =
            AggregatorHandle::start(Arc::new(FailingTransport), AggregatorConfig::default());
        let post = Uuid::new_v4();

        for _ in 0..3 {
            handle.interact(post, InteractionAction::Upvote, None).await;
        }

        handle.flush_now().await;

        // Fire-and-forget: the events are gone and the local view is
        // untouched - no rollback on failure.
        assert_eq!(handle.pending_len().await, 0);
        assert_eq!(handle.interactions(post).await.upvotes, 3);
    }

    #[tokio::test]
    async fn test_queue_overflow_drops_oldest() {
        let mut aggregator = FeedAggregator::new(2);
        let first = Uuid::new_v4();
        let rest = Uuid::new_v4();

        aggregator.interact(first, InteractionAction::Upvote, None);
        aggregator.interact(rest, InteractionAction::Upvote, None);
        aggregator.interact(rest, InteractionAction::Downvote, None);

        let pending = aggregator.take_pending();
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|e| e.post_id == rest));
    }

    #[tokio::test]
    async fn test_refresh_replaces_local_state_with_server_view() {
        let handle = AggregatorHandle::start(
            Arc::new(RecordingTransport::default()),
            AggregatorConfig::default(),
        );
        let post = Uuid::new_v4();

        handle.interact(post, InteractionAction::Upvote, None).await;
        handle.refresh(post).await.unwrap();

        let view = handle.interactions(post).await;
        assert_eq!(view.upvotes, 10);
        assert_eq!(view.downvotes, 2);
    }

    #[tokio::test]
    async fn test_shutdown_flushes_remaining_queue() {
        let transport = Arc::new(RecordingTransport::default());
        let handle =
            AggregatorHandle::start(transport.clone(), AggregatorConfig::default());
        let post = Uuid::new_v4();

        handle.interact(post, InteractionAction::Upvote, None).await;
        handle.shutdown().await;

        assert_eq!(transport.batches().len(), 1);
    }
}
