use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Counters for monitoring
#[derive(Clone)]
pub struct Metrics {
    pub logins_succeeded: Arc<AtomicUsize>,
    pub logins_failed: Arc<AtomicUsize>,
    pub forbidden_requests: Arc<AtomicUsize>,
    pub records_created: Arc<AtomicUsize>,
    pub records_deleted: Arc<AtomicUsize>,
    pub files_uploaded: Arc<AtomicUsize>,
    pub bytes_uploaded: Arc<AtomicU64>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            logins_succeeded: Arc::new(AtomicUsize::new(0)),
            logins_failed: Arc::new(AtomicUsize::new(0)),
            forbidden_requests: Arc::new(AtomicUsize::new(0)),
            records_created: Arc::new(AtomicUsize::new(0)),
            records_deleted: Arc::new(AtomicUsize::new(0)),
            files_uploaded: Arc::new(AtomicUsize::new(0)),
            bytes_uploaded: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_login_succeeded(&self) {
        self.logins_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_login_failed(&self) {
        self.logins_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_forbidden(&self) {
        self.forbidden_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_created(&self) {
        self.records_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_deleted(&self) {
        self.records_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_upload(&self, bytes: u64) {
        self.files_uploaded.fetch_add(1, Ordering::Relaxed);
        self.bytes_uploaded.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Takes back an upload whose file was removed again.
    pub fn remove_upload(&self, bytes: u64) {
        self.files_uploaded.fetch_sub(1, Ordering::Relaxed);
        self.bytes_uploaded.fetch_sub(bytes, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            logins_succeeded: self.logins_succeeded.load(Ordering::Relaxed),
            logins_failed: self.logins_failed.load(Ordering::Relaxed),
            forbidden_requests: self.forbidden_requests.load(Ordering::Relaxed),
            records_created: self.records_created.load(Ordering::Relaxed),
            records_deleted: self.records_deleted.load(Ordering::Relaxed),
            files_uploaded: self.files_uploaded.load(Ordering::Relaxed),
            bytes_uploaded: self.bytes_uploaded.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub logins_succeeded: usize,
    pub logins_failed: usize,
    pub forbidden_requests: usize,
    pub records_created: usize,
    pub records_deleted: usize,
    pub files_uploaded: usize,
    pub bytes_uploaded: u64,
    pub uptime_seconds: u64,
}
