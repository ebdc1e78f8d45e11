//! End-to-end tests of the vote pipeline: buffer -> sync worker ->
//! counter store, using in-memory implementations of both seams.

mod common;

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use common::RecordingCounterStore;
use interaction_service::models::{CounterColumn, VoteAction};
use interaction_service::services::{MemoryVoteBuffer, VoteBuffer};
use interaction_service::workers::VoteSyncWorker;

fn worker(
    buffer: Arc<MemoryVoteBuffer>,
    store: Arc<RecordingCounterStore>,
) -> VoteSyncWorker {
    VoteSyncWorker::new(buffer, store, Duration::from_secs(5))
}

#[tokio::test]
async fn test_n_upvotes_increment_store_by_exactly_n() {
    let buffer = Arc::new(MemoryVoteBuffer::new());
    let store = Arc::new(RecordingCounterStore::new());
    let post = Uuid::new_v4();

    for _ in 0..7 {
        buffer.enqueue(post, VoteAction::Upvote).await.unwrap();
    }

    let applied = worker(buffer, store.clone()).sync_once().await;

    assert_eq!(applied, 1);
    assert_eq!(store.value(post, CounterColumn::Upvotes), 7);
}

#[tokio::test]
async fn test_grouping_collapses_events_into_one_call_per_post_and_direction() {
    let buffer = Arc::new(MemoryVoteBuffer::new());
    let store = Arc::new(RecordingCounterStore::new());
    let post_a = Uuid::new_v4();
    let post_b = Uuid::new_v4();

    for _ in 0..5 {
        buffer.enqueue(post_a, VoteAction::Upvote).await.unwrap();
    }
    for _ in 0..2 {
        buffer.enqueue(post_a, VoteAction::Downvote).await.unwrap();
    }
    for _ in 0..3 {
        buffer.enqueue(post_b, VoteAction::Upvote).await.unwrap();
    }

    worker(buffer, store.clone()).sync_once().await;

    // 10 events, 2 distinct posts: at most 2 calls per post.
    assert_eq!(store.increment_calls(), 3);
    assert_eq!(store.value(post_a, CounterColumn::Upvotes), 5);
    assert_eq!(store.value(post_a, CounterColumn::Downvotes), 2);
    assert_eq!(store.value(post_b, CounterColumn::Upvotes), 3);
}

#[tokio::test]
async fn test_empty_queue_makes_no_store_calls() {
    let buffer = Arc::new(MemoryVoteBuffer::new());
    let store = Arc::new(RecordingCounterStore::new());

    let applied = worker(buffer, store.clone()).sync_once().await;

    assert_eq!(applied, 0);
    assert_eq!(store.increment_calls(), 0);
}

#[tokio::test]
async fn test_failed_group_does_not_abort_other_groups() {
    let buffer = Arc::new(MemoryVoteBuffer::new());
    let store = Arc::new(RecordingCounterStore::new());
    let doomed = Uuid::new_v4();
    let healthy = Uuid::new_v4();
    store.fail_for(doomed);

    for _ in 0..4 {
        buffer.enqueue(doomed, VoteAction::Upvote).await.unwrap();
    }
    for _ in 0..6 {
        buffer.enqueue(healthy, VoteAction::Upvote).await.unwrap();
    }

    let sync = worker(buffer.clone(), store.clone());
    let applied = sync.sync_once().await;

    assert_eq!(applied, 1);
    assert_eq!(store.value(healthy, CounterColumn::Upvotes), 6);
    assert_eq!(store.value(doomed, CounterColumn::Upvotes), 0);

    // Failed groups are dropped, never re-enqueued: the next cycle
    // finds an empty queue.
    assert_eq!(sync.sync_once().await, 0);
    assert!(buffer.drain_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_events_are_applied_exactly_once_across_cycles() {
    let buffer = Arc::new(MemoryVoteBuffer::new());
    let store = Arc::new(RecordingCounterStore::new());
    let post = Uuid::new_v4();
    let sync = worker(buffer.clone(), store.clone());

    for _ in 0..3 {
        buffer.enqueue(post, VoteAction::Upvote).await.unwrap();
    }
    sync.sync_once().await;

    for _ in 0..2 {
        buffer.enqueue(post, VoteAction::Upvote).await.unwrap();
    }
    sync.sync_once().await;

    assert_eq!(store.value(post, CounterColumn::Upvotes), 5);
}
