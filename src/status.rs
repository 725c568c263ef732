//! Status domain shared by every fallible harness operation.
//!
//! Goals:
//! - Keep the outcome set closed: callers match exhaustively, and a failure
//!   crossing function boundaries never loses its kind.
//! - Encode as a stable u32 for export frames and fault logs.

use std::fmt;

/// Outcome kind of a guarded operation.
/// Store as u32 in frames/logs for forward/backward compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Operation succeeded.
    Ok,
    /// A required reference was absent.
    NullReference,
    /// Index/length constraint violated.
    OutOfBounds,
    /// Bounded loop exceeded its iteration budget.
    IterationLimitExceeded,
    /// Snapshot in a wrong lifecycle state, or an integrity check failed.
    Inconsistent,
    /// Allocation failure, zero-size request, or writer I/O failure.
    Unknown,
}

impl Status {
    #[inline]
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }

    /// Convert to a compact u32 code for frames/logs.
    pub fn to_u32(self) -> u32 {
        match self {
            Status::Ok => 0,
            Status::NullReference => 1,
            Status::OutOfBounds => 2,
            Status::IterationLimitExceeded => 3,
            Status::Inconsistent => 4,
            Status::Unknown => 5,
        }
    }

    /// Parse from a stored u32 code. Unknown codes return None.
    pub fn from_u32(code: u32) -> Option<Self> {
        match code {
            0 => Some(Status::Ok),
            1 => Some(Status::NullReference),
            2 => Some(Status::OutOfBounds),
            3 => Some(Status::IterationLimitExceeded),
            4 => Some(Status::Inconsistent),
            5 => Some(Status::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Ok => "ok",
            Status::NullReference => "null-reference",
            Status::OutOfBounds => "out-of-bounds",
            Status::IterationLimitExceeded => "iteration-limit-exceeded",
            Status::Inconsistent => "inconsistent",
            Status::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_u32_codes_roundtrip() {
        for s in [
            Status::Ok,
            Status::NullReference,
            Status::OutOfBounds,
            Status::IterationLimitExceeded,
            Status::Inconsistent,
            Status::Unknown,
        ] {
            assert_eq!(Status::from_u32(s.to_u32()), Some(s));
        }
        assert_eq!(Status::from_u32(6), None);
        assert_eq!(Status::from_u32(u32::MAX), None);
    }
}
