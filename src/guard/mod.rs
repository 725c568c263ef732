//! Guard layer: inline precondition checks that abort the enclosing
//! operation with a typed violation.
//!
//! The checks map the "validate, report, bail out" discipline onto Result
//! and `?`: each guard reports to the failure sink exactly once and hands
//! back a Violation, and the caller propagates it with `?`, which preserves
//! the original Status kind across any number of frames. A caller never
//! observes a failed guard and continues as if it succeeded.
//!
//! Checks:
//! - require: a reference that must be present (NullReference).
//! - check_bounds: index within [0, len) (OutOfBounds).
//! - LoopContext::tick: bounded-loop budget (IterationLimitExceeded).
//! - propagate: bridge for a bare Status computed elsewhere; yields the same
//!   kind unchanged and does not re-report.

pub mod sink;

use std::panic::Location;

use thiserror::Error;

use crate::config::HarnessConfig;
use crate::status::Status;

/// A detected violation. `status` is never `Status::Ok`; the message and the
/// call-site location travel with it for diagnostics.
#[derive(Debug, Clone, Error)]
#[error("{status} at {file}:{line}: {message}")]
pub struct Violation {
    status: Status,
    message: String,
    file: &'static str,
    line: u32,
}

impl Violation {
    /// Build a violation and deliver it to the failure sink. The sink sees
    /// the report before the caller sees the error.
    #[track_caller]
    pub fn new(status: Status, message: String) -> Self {
        let loc = Location::caller();
        sink::report(loc, &message, status);
        Self {
            status,
            message,
            file: loc.file(),
            line: loc.line(),
        }
    }

    /// Build a violation without a sink report. Used by propagation, where
    /// the originating guard already reported.
    #[track_caller]
    pub(crate) fn silent(status: Status, message: String) -> Self {
        let loc = Location::caller();
        Self {
            status,
            message,
            file: loc.file(),
            line: loc.line(),
        }
    }

    /// The status kind of this violation.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Human-readable description.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Call-site location (file, line) captured at construction.
    pub fn location(&self) -> (&'static str, u32) {
        (self.file, self.line)
    }
}

/// Collapse a guard result to its Status kind (`Ok` on success).
pub fn status_of<T>(res: &Result<T, Violation>) -> Status {
    match res {
        Ok(_) => Status::Ok,
        Err(v) => v.status(),
    }
}

/// Require a present reference. `None` reports NullReference and fails; the
/// enclosing operation must propagate the error rather than continue.
#[track_caller]
pub fn require<T>(value: Option<T>, what: &str) -> Result<T, Violation> {
    match value {
        Some(v) => Ok(v),
        None => Err(Violation::new(
            Status::NullReference,
            format!("missing reference: {}", what),
        )),
    }
}

/// Bounds check over the half-open range [0, len): `index == len` is out of
/// bounds. Both inputs are unsigned magnitudes; callers converting from
/// signed values must pre-validate the sign themselves.
#[track_caller]
pub fn check_bounds(index: usize, len: usize) -> Result<(), Violation> {
    if index < len {
        Ok(())
    } else {
        Err(Violation::new(
            Status::OutOfBounds,
            format!("index {} out of bounds for length {}", index, len),
        ))
    }
}

/// Bounded-loop context: counts iterations and trips once the budget is
/// exceeded. Create at loop entry, tick once per iteration, discard at loop
/// exit; the context is not meant to outlive the loop.
#[derive(Debug, Clone)]
pub struct LoopContext {
    iteration: u32,
    max_iterations: u32,
}

impl LoopContext {
    /// Context with an explicit iteration budget.
    pub fn new(max_iterations: u32) -> Self {
        Self {
            iteration: 0,
            max_iterations,
        }
    }

    /// Context with the budget from configuration (SG_DEFAULT_LOOP_LIMIT).
    pub fn with_default_limit(cfg: &HarnessConfig) -> Self {
        Self::new(cfg.default_loop_limit)
    }

    /// Iterations counted so far.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// The configured budget.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Count one iteration. Ticks 1..=max succeed; the tick that pushes the
    /// count past the budget fails. The context stays exhausted afterwards,
    /// so every later tick fails too.
    #[track_caller]
    pub fn tick(&mut self) -> Result<(), Violation> {
        self.iteration = self.iteration.saturating_add(1);
        if self.iteration > self.max_iterations {
            Err(Violation::new(
                Status::IterationLimitExceeded,
                format!(
                    "loop budget exhausted: iteration {} exceeds max {}",
                    self.iteration, self.max_iterations
                ),
            ))
        } else {
            Ok(())
        }
    }
}

/// Status-propagation bridge for callers holding a bare Status (for example
/// one decoded from a frame or an FFI boundary). Yields the same kind
/// unchanged; does not report to the sink; the originating guard already
/// did.
#[track_caller]
pub fn propagate(status: Status) -> Result<(), Violation> {
    if status.is_ok() {
        Ok(())
    } else {
        Err(Violation::silent(
            status,
            "propagated from nested operation".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_passes_through_value() {
        let x = 7u32;
        let got = require(Some(&x), "probe").unwrap();
        assert_eq!(*got, 7);

        let miss = require(None::<&u32>, "probe");
        assert_eq!(status_of(&miss), Status::NullReference);
    }

    #[test]
    fn bounds_half_open_range() {
        assert!(check_bounds(0, 10).is_ok());
        assert!(check_bounds(9, 10).is_ok());
        assert_eq!(status_of(&check_bounds(10, 10)), Status::OutOfBounds);
        assert_eq!(status_of(&check_bounds(100, 10)), Status::OutOfBounds);
        assert_eq!(status_of(&check_bounds(0, 0)), Status::OutOfBounds);
    }

    #[test]
    fn loop_budget_trips_on_first_excess_tick() {
        let mut ctx = LoopContext::new(100);
        for i in 1..=100u32 {
            ctx.tick().unwrap();
            assert_eq!(ctx.iteration(), i);
        }
        let v = ctx.tick().unwrap_err();
        assert_eq!(v.status(), Status::IterationLimitExceeded);
        // Exhausted contexts keep failing.
        assert_eq!(status_of(&ctx.tick()), Status::IterationLimitExceeded);
    }

    #[test]
    fn propagate_preserves_kind() {
        assert!(propagate(Status::Ok).is_ok());
        for s in [
            Status::NullReference,
            Status::OutOfBounds,
            Status::IterationLimitExceeded,
            Status::Inconsistent,
            Status::Unknown,
        ] {
            assert_eq!(status_of(&propagate(s)), s);
        }
    }

    #[test]
    fn violation_carries_location_and_message() {
        let v = check_bounds(3, 3).unwrap_err();
        let (file, line) = v.location();
        assert!(file.ends_with("mod.rs"));
        assert!(line > 0);
        assert!(v.message().contains("3"));
        assert!(v.to_string().contains("out-of-bounds"));
    }
}
