use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Request counters for monitoring
#[derive(Clone)]
pub struct Metrics {
    pub listings_served: Arc<AtomicUsize>,
    pub downloads_served: Arc<AtomicUsize>,
    pub uploads_completed: Arc<AtomicUsize>,
    pub uploads_rejected: Arc<AtomicUsize>,
    pub bytes_uploaded: Arc<AtomicU64>,
    pub directories_created: Arc<AtomicUsize>,
    pub requests_blocked: Arc<AtomicUsize>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            listings_served: Arc::new(AtomicUsize::new(0)),
            downloads_served: Arc::new(AtomicUsize::new(0)),
            uploads_completed: Arc::new(AtomicUsize::new(0)),
            uploads_rejected: Arc::new(AtomicUsize::new(0)),
            bytes_uploaded: Arc::new(AtomicU64::new(0)),
            directories_created: Arc::new(AtomicUsize::new(0)),
            requests_blocked: Arc::new(AtomicUsize::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_listings_served(&self) {
        self.listings_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_downloads_served(&self) {
        self.downloads_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upload(&self, bytes: u64) {
        self.uploads_completed.fetch_add(1, Ordering::Relaxed);
        self.bytes_uploaded.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn inc_uploads_rejected(&self) {
        self.uploads_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_directories_created(&self) {
        self.directories_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_requests_blocked(&self) {
        self.requests_blocked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            listings_served: self.listings_served.load(Ordering::Relaxed),
            downloads_served: self.downloads_served.load(Ordering::Relaxed),
            uploads_completed: self.uploads_completed.load(Ordering::Relaxed),
            uploads_rejected: self.uploads_rejected.load(Ordering::Relaxed),
            bytes_uploaded: self.bytes_uploaded.load(Ordering::Relaxed),
            directories_created: self.directories_created.load(Ordering::Relaxed),
            requests_blocked: self.requests_blocked.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub listings_served: usize,
    pub downloads_served: usize,
    pub uploads_completed: usize,
    pub uploads_rejected: usize,
    pub bytes_uploaded: u64,
    pub directories_created: usize,
    pub requests_blocked: usize,
    pub uptime_seconds: u64,
}
