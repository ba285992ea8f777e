use crate::lock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

pub type StatsCallback = Arc<dyn Fn(StatsSnapshot) + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub pending: usize,
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct FailureRecord {
    pub query: String,
    pub endpoint: String,
    pub message: String,
}

const MAX_FAILURE_RECORDS: usize = 100;

#[derive(Default)]
struct StatsInner {
    pending: usize,
    successful: usize,
    failed: usize,
    failures: Vec<FailureRecord>,
    subscribers: HashMap<usize, StatsCallback>,
}

/// Observable request counters. Every change broadcasts a fresh snapshot to
/// all subscribers.
#[derive(Default)]
pub struct RequestStats {
    inner: Mutex<StatsInner>,
    next_subscriber: AtomicUsize,
}

impl RequestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_request(&self) {
        let mut inner = lock(&self.inner);
        inner.pending += 1;
        Self::broadcast(inner);
    }

    pub fn finish_success(&self) {
        let mut inner = lock(&self.inner);
        inner.pending = inner.pending.saturating_sub(1);
        inner.successful += 1;
        Self::broadcast(inner);
    }

    pub fn finish_failure(&self, record: FailureRecord) {
        let mut inner = lock(&self.inner);
        inner.pending = inner.pending.saturating_sub(1);
        inner.failed += 1;
        if inner.failures.len() < MAX_FAILURE_RECORDS {
            inner.failures.push(record);
        }
        Self::broadcast(inner);
    }

    /// A cancelled request releases its pending slot and touches no other
    /// counter.
    pub fn finish_cancelled(&self) {
        let mut inner = lock(&self.inner);
        inner.pending = inner.pending.saturating_sub(1);
        Self::broadcast(inner);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = lock(&self.inner);
        StatsSnapshot {
            pending: inner.pending,
            successful: inner.successful,
            failed: inner.failed,
        }
    }

    pub fn failures(&self) -> Vec<FailureRecord> {
        lock(&self.inner).failures.clone()
    }

    pub fn subscribe(&self, callback: StatsCallback) -> usize {
        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner).subscribers.insert(id, callback);
        id
    }

    pub fn unsubscribe(&self, id: usize) {
        lock(&self.inner).subscribers.remove(&id);
    }

    // Callbacks run after the lock is released so they may re-enter the
    // stats object.
    fn broadcast(inner: MutexGuard<'_, StatsInner>) {
        let snapshot = StatsSnapshot {
            pending: inner.pending,
            successful: inner.successful,
            failed: inner.failed,
        };
        let callbacks: Vec<StatsCallback> = inner.subscribers.values().cloned().collect();
        drop(inner);
        for callback in callbacks {
            callback(snapshot);
        }
    }
}
