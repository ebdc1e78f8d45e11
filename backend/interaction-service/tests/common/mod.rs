#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use interaction_service::models::{
    Comment, CounterColumn, PostMeta, QueuedVote, Report, ReportClaim, VoteAction,
};
use interaction_service::services::{CounterStore, InteractionLog, VoteBuffer};

/// Counter store that applies increments to an in-memory map and
/// records every call, with optional per-post failure injection.
#[derive(Default)]
pub struct RecordingCounterStore {
    counters: Mutex<HashMap<(Uuid, CounterColumn), i64>>,
    calls: Mutex<Vec<(Uuid, CounterColumn, i64)>>,
    failing_posts: Mutex<HashSet<Uuid>>,
}

impl RecordingCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every increment against this post fail
    pub fn fail_for(&self, post_id: Uuid) {
        self.failing_posts
            .lock()
            .unwrap()
            .insert(post_id);
    }

    pub fn value(&self, post_id: Uuid, column: CounterColumn) -> i64 {
        self.counters
            .lock()
            .unwrap()
            .get(&(post_id, column))
            .copied()
            .unwrap_or(0)
    }

    /// Number of increment calls made so far
    pub fn increment_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CounterStore for RecordingCounterStore {
    async fn increment(&self, post_id: Uuid, column: CounterColumn, amount: i64) -> Result<()> {
        self.calls.lock().unwrap().push((post_id, column, amount));

        if self.failing_posts.lock().unwrap().contains(&post_id) {
            bail!("simulated counter store failure for {post_id}");
        }

        let mut counters = self.counters.lock().unwrap();
        *counters.entry((post_id, column)).or_insert(0) += amount;
        Ok(())
    }

    async fn get(&self, post_id: Uuid) -> Result<Option<PostMeta>> {
        let counters = self.counters.lock().unwrap();
        let has_row = counters.keys().any(|(id, _)| *id == post_id);
        if !has_row {
            return Ok(None);
        }

        let value =
            |column| counters.get(&(post_id, column)).copied().unwrap_or(0);

        Ok(Some(PostMeta {
            post_id,
            upvotes: value(CounterColumn::Upvotes),
            downvotes: value(CounterColumn::Downvotes),
            comments: value(CounterColumn::Comments),
            reports: value(CounterColumn::Reports),
        }))
    }
}

/// In-memory interaction log with fabricated, strictly increasing
/// creation timestamps and optional failure on a specific comment text.
pub struct MemoryInteractionLog {
    comments: Mutex<Vec<Comment>>,
    reports: Mutex<Vec<Report>>,
    poison_text: Mutex<Option<String>>,
    base: DateTime<Utc>,
    seq: AtomicI64,
}

impl MemoryInteractionLog {
    pub fn new() -> Self {
        Self {
            comments: Mutex::new(Vec::new()),
            reports: Mutex::new(Vec::new()),
            poison_text: Mutex::new(None),
            base: Utc::now(),
            seq: AtomicI64::new(0),
        }
    }

    /// Make appending a comment with this exact text fail
    pub fn fail_on_text(&self, text: &str) {
        *self.poison_text.lock().unwrap() = Some(text.to_string());
    }

    pub fn comment_count(&self, post_id: Uuid) -> usize {
        self.comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == post_id)
            .count()
    }

    pub fn report_count(&self, post_id: Uuid) -> usize {
        self.reports
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.post_id == post_id)
            .count()
    }

    fn next_timestamp(&self) -> DateTime<Utc> {
        let n = self.seq.fetch_add(1, Ordering::SeqCst);
        self.base + Duration::milliseconds(n)
    }
}

impl Default for MemoryInteractionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InteractionLog for MemoryInteractionLog {
    async fn append_comment(&self, post_id: Uuid, comment_text: &str) -> Result<Comment> {
        if let Some(poison) = self.poison_text.lock().unwrap().as_deref() {
            if poison == comment_text {
                bail!("simulated comment insert failure");
            }
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            comment_text: comment_text.to_string(),
            created_at: self.next_timestamp(),
        };
        self.comments.lock().unwrap().push(comment.clone());
        Ok(comment)
    }

    async fn append_report(
        &self,
        post_id: Uuid,
        claim: ReportClaim,
        report_text: Option<&str>,
        proof_url: Option<&str>,
    ) -> Result<Report> {
        let report = Report {
            id: Uuid::new_v4(),
            post_id,
            report_type: claim.as_str().to_string(),
            report_text: report_text.map(str::to_string),
            proof_url: proof_url.map(str::to_string),
            created_at: self.next_timestamp(),
        };
        self.reports.lock().unwrap().push(report.clone());
        Ok(report)
    }

    async fn comments_newest_first(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();

        // Stable sort keeps insertion order among equal timestamps.
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }
}

/// Vote buffer whose every operation fails, for exercising the
/// direct-increment fallback path.
pub struct BrokenVoteBuffer;

#[async_trait]
impl VoteBuffer for BrokenVoteBuffer {
    async fn enqueue(&self, _post_id: Uuid, _action: VoteAction) -> Result<()> {
        bail!("simulated buffer outage");
    }

    async fn drain_all(&self) -> Result<Vec<QueuedVote>> {
        bail!("simulated buffer outage");
    }

    async fn read_count(&self, _post_id: Uuid, _action: VoteAction) -> Result<Option<i64>> {
        bail!("simulated buffer outage");
    }

    async fn ping(&self) -> Result<()> {
        bail!("simulated buffer outage");
    }
}
