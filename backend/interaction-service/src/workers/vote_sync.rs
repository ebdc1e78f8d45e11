//! Vote sync worker - drains the write buffer and applies summed
//! increments to the durable counter store.
//!
//! N individual vote events collapse into at most two increment calls
//! per post per cycle (one per vote direction). Failed groups are logged
//! and dropped, never re-enqueued: retrying here would turn a store
//! outage into an unbounded retry storm.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::metrics::{VOTES_DROPPED_TOTAL, VOTE_SYNC_GROUPS_TOTAL};
use crate::models::{QueuedVote, VoteAction};
use crate::services::counter_store::CounterStore;
use crate::services::vote_buffer::VoteBuffer;

/// Periodic reconciler between the vote buffer and the counter store
pub struct VoteSyncWorker {
    buffer: Arc<dyn VoteBuffer>,
    store: Arc<dyn CounterStore>,
    interval: Duration,
}

/// Sum drained events by (post, vote direction)
fn group_votes(events: &[QueuedVote]) -> HashMap<(Uuid, VoteAction), i64> {
    let mut groups: HashMap<(Uuid, VoteAction), i64> = HashMap::new();
    for event in events {
        *groups.entry((event.post_id, event.action)).or_insert(0) += 1;
    }
    groups
}

impl VoteSyncWorker {
    pub fn new(
        buffer: Arc<dyn VoteBuffer>,
        store: Arc<dyn CounterStore>,
        interval: Duration,
    ) -> Self {
        Self {
            buffer,
            store,
            interval,
        }
    }

    /// One drain-and-apply cycle. Returns the number of groups applied.
    ///
    /// An empty queue is a no-op: no counter store calls are made.
    pub async fn sync_once(&self) -> usize {
        let events = match self.buffer.drain_all().await {
            Ok(events) => events,
            Err(e) => {
                error!(error = %e, "Vote queue drain failed, skipping cycle");
                return 0;
            }
        };

        if events.is_empty() {
            return 0;
        }

        debug!(event_count = events.len(), "Syncing queued votes");

        let groups = group_votes(&events);
        let mut applied = 0;

        for ((post_id, action), count) in groups {
            match self
                .store
                .increment(post_id, action.counter_column(), count)
                .await
            {
                Ok(()) => {
                    VOTE_SYNC_GROUPS_TOTAL.with_label_values(&["applied"]).inc();
                    applied += 1;
                }
                Err(e) => {
                    // Accepted loss window: this group's events are gone.
                    error!(
                        post_id = %post_id,
                        action = action.mirror_key(),
                        count,
                        error = %e,
                        "Dropping vote group after increment failure"
                    );
                    VOTE_SYNC_GROUPS_TOTAL.with_label_values(&["failed"]).inc();
                    VOTES_DROPPED_TOTAL
                        .with_label_values(&["sync"])
                        .inc_by(count as u64);
                }
            }
        }

        if applied > 0 {
            info!(groups = applied, "Synced vote groups to counter store");
        }

        applied
    }

    /// Run until the shutdown signal flips, then flush one final time
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Starting vote sync worker"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sync_once().await;
                }
                _ = shutdown.changed() => {
                    self.sync_once().await;
                    info!("Vote sync worker stopped after final flush");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn vote(post_id: Uuid, action: VoteAction) -> QueuedVote {
        QueuedVote {
            post_id,
            action,
            queued_at: Utc::now(),
        }
    }

    #[test]
    fn test_group_votes_sums_per_post_and_action() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let events = vec![
            vote(a, VoteAction::Upvote),
            vote(a, VoteAction::Upvote),
            vote(a, VoteAction::Downvote),
            vote(b, VoteAction::Upvote),
        ];

        let groups = group_votes(&events);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[&(a, VoteAction::Upvote)], 2);
        assert_eq!(groups[&(a, VoteAction::Downvote)], 1);
        assert_eq!(groups[&(b, VoteAction::Upvote)], 1);
    }

    #[test]
    fn test_group_votes_empty() {
        assert!(group_votes(&[]).is_empty());
    }
}
