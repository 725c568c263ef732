//! Lightweight global metrics for the harness.
//!
//! Thread-safe atomic counters for the subsystems:
//! - Snapshot lifecycle (taken/committed/rolled back/invalidated)
//! - Export codec
//! - Guard violations by kind

use std::sync::atomic::{AtomicU64, Ordering};

use crate::status::Status;

// ----- Snapshot lifecycle -----
static SNAPSHOTS_TAKEN: AtomicU64 = AtomicU64::new(0);
static SNAPSHOTS_COMMITTED: AtomicU64 = AtomicU64::new(0);
static SNAPSHOTS_ROLLED_BACK: AtomicU64 = AtomicU64::new(0);
static SNAPSHOTS_INVALIDATED: AtomicU64 = AtomicU64::new(0);
static SNAPSHOT_BYTES_CAPTURED: AtomicU64 = AtomicU64::new(0);
static SNAPSHOT_BYTES_RESTORED: AtomicU64 = AtomicU64::new(0);

// ----- Export codec -----
static EXPORTS_TOTAL: AtomicU64 = AtomicU64::new(0);
static EXPORT_BYTES_WRITTEN: AtomicU64 = AtomicU64::new(0);

// ----- Guard violations -----
static GUARD_NULL_REFERENCES: AtomicU64 = AtomicU64::new(0);
static GUARD_OUT_OF_BOUNDS: AtomicU64 = AtomicU64::new(0);
static GUARD_LOOP_LIMITS: AtomicU64 = AtomicU64::new(0);
static GUARD_INCONSISTENCIES: AtomicU64 = AtomicU64::new(0);
static GUARD_UNKNOWN_FAILURES: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    // Snapshot lifecycle
    pub snapshots_taken: u64,
    pub snapshots_committed: u64,
    pub snapshots_rolled_back: u64,
    pub snapshots_invalidated: u64,
    pub snapshot_bytes_captured: u64,
    pub snapshot_bytes_restored: u64,

    // Export codec
    pub exports_total: u64,
    pub export_bytes_written: u64,

    // Guard violations
    pub guard_null_references: u64,
    pub guard_out_of_bounds: u64,
    pub guard_loop_limits: u64,
    pub guard_inconsistencies: u64,
    pub guard_unknown_failures: u64,
}

impl MetricsSnapshot {
    /// Total guard violations across every kind.
    pub fn guard_violations_total(&self) -> u64 {
        self.guard_null_references
            + self.guard_out_of_bounds
            + self.guard_loop_limits
            + self.guard_inconsistencies
            + self.guard_unknown_failures
    }

    /// Snapshots still outstanding (taken minus terminal transitions).
    pub fn snapshots_outstanding(&self) -> u64 {
        self.snapshots_taken.saturating_sub(
            self.snapshots_committed + self.snapshots_rolled_back + self.snapshots_invalidated,
        )
    }
}

// ----- Recorders (snapshot lifecycle) -----
pub fn record_snapshot_taken(bytes: usize) {
    SNAPSHOTS_TAKEN.fetch_add(1, Ordering::Relaxed);
    SNAPSHOT_BYTES_CAPTURED.fetch_add(bytes as u64, Ordering::Relaxed);
}

pub fn record_snapshot_committed() {
    SNAPSHOTS_COMMITTED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_snapshot_rolled_back(bytes: usize) {
    SNAPSHOTS_ROLLED_BACK.fetch_add(1, Ordering::Relaxed);
    SNAPSHOT_BYTES_RESTORED.fetch_add(bytes as u64, Ordering::Relaxed);
}

pub fn record_snapshot_invalidated() {
    SNAPSHOTS_INVALIDATED.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (export codec) -----
pub fn record_export(bytes: usize) {
    EXPORTS_TOTAL.fetch_add(1, Ordering::Relaxed);
    EXPORT_BYTES_WRITTEN.fetch_add(bytes as u64, Ordering::Relaxed);
}

// ----- Recorders (guard violations) -----
pub fn record_guard_violation(status: Status) {
    match status {
        Status::Ok => {}
        Status::NullReference => {
            GUARD_NULL_REFERENCES.fetch_add(1, Ordering::Relaxed);
        }
        Status::OutOfBounds => {
            GUARD_OUT_OF_BOUNDS.fetch_add(1, Ordering::Relaxed);
        }
        Status::IterationLimitExceeded => {
            GUARD_LOOP_LIMITS.fetch_add(1, Ordering::Relaxed);
        }
        Status::Inconsistent => {
            GUARD_INCONSISTENCIES.fetch_add(1, Ordering::Relaxed);
        }
        Status::Unknown => {
            GUARD_UNKNOWN_FAILURES.fetch_add(1, Ordering::Relaxed);
        }
    }
}

// ----- Snapshot / Reset -----
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        snapshots_taken: SNAPSHOTS_TAKEN.load(Ordering::Relaxed),
        snapshots_committed: SNAPSHOTS_COMMITTED.load(Ordering::Relaxed),
        snapshots_rolled_back: SNAPSHOTS_ROLLED_BACK.load(Ordering::Relaxed),
        snapshots_invalidated: SNAPSHOTS_INVALIDATED.load(Ordering::Relaxed),
        snapshot_bytes_captured: SNAPSHOT_BYTES_CAPTURED.load(Ordering::Relaxed),
        snapshot_bytes_restored: SNAPSHOT_BYTES_RESTORED.load(Ordering::Relaxed),

        exports_total: EXPORTS_TOTAL.load(Ordering::Relaxed),
        export_bytes_written: EXPORT_BYTES_WRITTEN.load(Ordering::Relaxed),

        guard_null_references: GUARD_NULL_REFERENCES.load(Ordering::Relaxed),
        guard_out_of_bounds: GUARD_OUT_OF_BOUNDS.load(Ordering::Relaxed),
        guard_loop_limits: GUARD_LOOP_LIMITS.load(Ordering::Relaxed),
        guard_inconsistencies: GUARD_INCONSISTENCIES.load(Ordering::Relaxed),
        guard_unknown_failures: GUARD_UNKNOWN_FAILURES.load(Ordering::Relaxed),
    }
}

pub fn reset() {
    SNAPSHOTS_TAKEN.store(0, Ordering::Relaxed);
    SNAPSHOTS_COMMITTED.store(0, Ordering::Relaxed);
    SNAPSHOTS_ROLLED_BACK.store(0, Ordering::Relaxed);
    SNAPSHOTS_INVALIDATED.store(0, Ordering::Relaxed);
    SNAPSHOT_BYTES_CAPTURED.store(0, Ordering::Relaxed);
    SNAPSHOT_BYTES_RESTORED.store(0, Ordering::Relaxed);

    EXPORTS_TOTAL.store(0, Ordering::Relaxed);
    EXPORT_BYTES_WRITTEN.store(0, Ordering::Relaxed);

    GUARD_NULL_REFERENCES.store(0, Ordering::Relaxed);
    GUARD_OUT_OF_BOUNDS.store(0, Ordering::Relaxed);
    GUARD_LOOP_LIMITS.store(0, Ordering::Relaxed);
    GUARD_INCONSISTENCIES.store(0, Ordering::Relaxed);
    GUARD_UNKNOWN_FAILURES.store(0, Ordering::Relaxed);
}
