//! Snapshot subsystem split into submodules:
//! - region.rs: Region capability trait + MemRegion (hosted mutex impl).
//! - registry.rs: SnapshotRegistry lifecycle (take/commit/rollback).
//! - export.rs: SBMS frame codec (export + offline decode).
//!
//! External API surface:
//! - SnapshotRegistry, SnapshotId, SnapshotState
//! - Region, MemRegion
//! - read_frame(), FrameHeader

mod export;
mod region;
mod registry;

pub use export::{read_frame, FrameHeader};
pub use region::{MemRegion, Region};
pub use registry::{SnapshotId, SnapshotRegistry, SnapshotState};
