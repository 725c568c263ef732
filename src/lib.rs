// Base modules
pub mod checksum;
pub mod config;
pub mod consts;
pub mod metrics;
pub mod status;

// Guard layer (checks + failure sink)
pub mod guard; // src/guard/{mod,sink}.rs

// Snapshot subsystem
pub mod snapshot; // src/snapshot/{mod,region,registry,export}.rs

// Convenience re-exports
pub use checksum::{digest, digest_opt};
pub use config::HarnessConfig;
pub use guard::sink::{install_failure_sink, SinkHandle, SinkReport};
pub use guard::{check_bounds, propagate, require, status_of, LoopContext, Violation};
pub use snapshot::{
    read_frame, FrameHeader, MemRegion, Region, SnapshotId, SnapshotRegistry, SnapshotState,
};
pub use status::Status;
