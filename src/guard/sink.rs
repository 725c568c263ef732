//! Pluggable failure sink: the diagnostic hook for guard and integrity
//! violations.
//!
//! Scope:
//! - One process-wide sink; installing a new one replaces the previous.
//! - The sink runs synchronously, exactly once per violation, before the
//!   failing guard returns to its caller.
//! - Dropping the SinkHandle uninstalls the sink it installed (best-effort:
//!   a later install wins).
//!
//! Notes:
//! - The sink is diagnostic only. Escalation policy (deliberate delay,
//!   operator acknowledgment, cryptographic confirmation) belongs to the
//!   surrounding system, not this crate.
//! - Keep callbacks fast and non-panicking; they run on the failing thread.
//! - With no sink installed, reports go to the `log` facade as errors.

use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::status::Status;

/// One violation report delivered to the sink.
#[derive(Clone, Debug)]
pub struct SinkReport<'a> {
    /// Source file of the failing call site.
    pub file: &'static str,
    /// Source line of the failing call site.
    pub line: u32,
    /// Human-readable description of the violation.
    pub message: &'a str,
    /// The resulting status; never `Status::Ok`.
    pub status: Status,
}

type Sink = Arc<dyn Fn(&SinkReport<'_>) + Send + Sync + 'static>;

static SINK: Mutex<Option<(u64, Sink)>> = Mutex::new(None);
static NEXT_SINK_ID: AtomicU64 = AtomicU64::new(1);

/// Install a process-wide failure sink, replacing any previous one.
/// Returns a handle; dropping it uninstalls the sink if still current.
pub fn install_failure_sink<F>(f: F) -> SinkHandle
where
    F: Fn(&SinkReport<'_>) + Send + Sync + 'static,
{
    let id = NEXT_SINK_ID.fetch_add(1, Ordering::Relaxed);
    let mut g = SINK.lock().unwrap();
    *g = Some((id, Arc::new(f)));
    SinkHandle { id }
}

/// Deliver a report to the installed sink, or log it if none is installed.
pub(crate) fn report(location: &'static Location<'static>, message: &str, status: Status) {
    crate::metrics::record_guard_violation(status);

    let rep = SinkReport {
        file: location.file(),
        line: location.line(),
        message,
        status,
    };

    // Clone the callback out so it executes outside the lock.
    let cb = SINK.lock().unwrap().as_ref().map(|(_, cb)| cb.clone());
    match cb {
        Some(cb) => cb(&rep),
        None => log::error!(
            "guard violation at {}:{}: {} ({})",
            rep.file,
            rep.line,
            rep.message,
            rep.status
        ),
    }
}

/// RAII handle: uninstalls its sink on drop if no newer sink replaced it.
pub struct SinkHandle {
    id: u64,
}

impl Drop for SinkHandle {
    fn drop(&mut self) {
        let mut g = SINK.lock().unwrap();
        if g.as_ref().map(|(id, _)| *id == self.id).unwrap_or(false) {
            *g = None;
        }
    }
}
