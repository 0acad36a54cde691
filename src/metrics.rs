// Query metrics module
//
// Lightweight counters for query traffic and UI marshaling, logged on shutdown

use crate::models::QueryError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters for query traffic.
///
/// Uses atomic operations for thread-safe tracking without locks. One
/// instance is shared by the coordinator and the UI bridge.
#[derive(Debug)]
pub struct QueryMetrics {
    /// Queries handed to the transport
    pub queries_started: AtomicU64,

    /// Queries that returned a payload
    pub queries_succeeded: AtomicU64,

    /// Queries that ended in a [`QueryError`]
    pub queries_failed: AtomicU64,

    /// Completions dropped because a newer attempt superseded them
    pub stale_discarded: AtomicU64,

    /// In-flight tasks aborted because a newer attempt replaced them
    pub superseded_aborted: AtomicU64,

    /// Attempts that started with a cached payload on screen
    pub cache_hits: AtomicU64,

    /// UI updates queued onto the Slint event loop
    pub ui_updates: AtomicU64,

    /// UI updates dropped because the channel was full
    pub ui_update_channel_full: AtomicU64,

    /// Re-renders folded into one that was already queued
    pub ui_updates_coalesced: AtomicU64,

    /// Avatars fetched and decoded
    pub avatars_loaded: AtomicU64,

    /// Avatars that could not be fetched or decoded
    pub avatars_failed: AtomicU64,

    /// Accumulated query latency in milliseconds
    pub total_query_time_ms: AtomicU64,

    start_time: Instant,
}

impl QueryMetrics {
    pub fn new() -> Self {
        Self {
            queries_started: AtomicU64::new(0),
            queries_succeeded: AtomicU64::new(0),
            queries_failed: AtomicU64::new(0),
            stale_discarded: AtomicU64::new(0),
            superseded_aborted: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            ui_updates: AtomicU64::new(0),
            ui_update_channel_full: AtomicU64::new(0),
            ui_updates_coalesced: AtomicU64::new(0),
            avatars_loaded: AtomicU64::new(0),
            avatars_failed: AtomicU64::new(0),
            total_query_time_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_query_started(&self) {
        self.queries_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record how a query ended and how long it took
    pub fn record_outcome<T>(&self, result: &Result<T, QueryError>, elapsed: Duration) {
        match result {
            Ok(_) => self.queries_succeeded.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.queries_failed.fetch_add(1, Ordering::Relaxed),
        };
        self.total_query_time_ms
            .fetch_add(elapsed.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_stale_discarded(&self) {
        self.stale_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_superseded_aborted(&self) {
        self.superseded_aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ui_update(&self) {
        self.ui_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ui_channel_full(&self) {
        self.ui_update_channel_full.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ui_update_coalesced(&self) {
        self.ui_updates_coalesced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_avatar_loaded(&self) {
        self.avatars_loaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_avatar_failed(&self) {
        self.avatars_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average latency of finished queries in milliseconds
    pub fn avg_query_time_ms(&self) -> f64 {
        let finished = self.queries_succeeded.load(Ordering::Relaxed)
            + self.queries_failed.load(Ordering::Relaxed);
        if finished > 0 {
            self.total_query_time_ms.load(Ordering::Relaxed) as f64 / finished as f64
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Query Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Queries: {} started, {} succeeded, {} failed (avg {:.1}ms)",
            self.queries_started.load(Ordering::Relaxed),
            self.queries_succeeded.load(Ordering::Relaxed),
            self.queries_failed.load(Ordering::Relaxed),
            self.avg_query_time_ms()
        );
        tracing::info!(
            "Superseded: {} discarded, {} aborted; cache hits: {}",
            self.stale_discarded.load(Ordering::Relaxed),
            self.superseded_aborted.load(Ordering::Relaxed),
            self.cache_hits.load(Ordering::Relaxed)
        );
        tracing::info!(
            "UI updates: {} ({} coalesced), channel full errors: {}",
            self.ui_updates.load(Ordering::Relaxed),
            self.ui_updates_coalesced.load(Ordering::Relaxed),
            self.ui_update_channel_full.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Avatars: {} loaded, {} failed",
            self.avatars_loaded.load(Ordering::Relaxed),
            self.avatars_failed.load(Ordering::Relaxed)
        );
    }
}

impl Default for QueryMetrics {
    fn default() -> Self {
        Self::new()
    }
}
