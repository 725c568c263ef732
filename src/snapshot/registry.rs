//! Snapshot registry: atomic capture, commit/rollback, integrity
//! validation.
//!
//! Lifecycle per snapshot: Active -> Committed | RolledBack | Invalidated,
//! exactly one terminal transition. Corruption detected during rollback
//! invalidates the snapshot without restoring: a payload that fails its
//! digest re-check is never copied back into the origin.
//!
//! Construction is the explicit init point (no lazy self-initialization);
//! reset() is the documented re-init: it drops every slot and restarts
//! sequence numbering, and calling it twice is a no-op the second time.
//! Handle ids keep climbing across resets so a stale id can never alias a
//! new snapshot.
//!
//! The registry is synchronous and non-suspending; every operation runs to
//! completion. Share it across threads behind the caller's own lock if
//! needed; the one non-preemptible window inside take/rollback is the
//! region copy, bounded by HarnessConfig::max_snapshot_bytes.

use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use crate::checksum::digest;
use crate::config::HarnessConfig;
use crate::consts::FRAME_HDR_SIZE;
use crate::guard::{check_bounds, require, Violation};
use crate::metrics::{
    record_export, record_snapshot_committed, record_snapshot_invalidated,
    record_snapshot_rolled_back, record_snapshot_taken,
};
use crate::status::Status;

use super::export::write_frame;
use super::region::Region;

/// Opaque handle to a captured snapshot. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotId(u64);

impl SnapshotId {
    /// Numeric form for logs and CLI output.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a snapshot slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotState {
    /// Payload captured and restorable.
    Active,
    /// Terminal: payload discarded, origin kept as the caller left it.
    Committed,
    /// Terminal: origin restored from the payload.
    RolledBack,
    /// Terminal: corruption detected, origin untouched.
    Invalidated,
}

impl fmt::Display for SnapshotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SnapshotState::Active => "active",
            SnapshotState::Committed => "committed",
            SnapshotState::RolledBack => "rolled-back",
            SnapshotState::Invalidated => "invalidated",
        };
        write!(f, "{}", s)
    }
}

// One captured snapshot. The payload is exclusively owned; the origin is a
// shared capability to the caller's region (the caller keeps the storage).
// Terminal slots keep their state with the payload released, so late calls
// on a finished handle answer Inconsistent instead of "unknown".
struct Slot {
    origin: Arc<dyn Region>,
    payload: Option<Vec<u8>>, // Some iff state == Active
    size: usize,
    checksum: u32,
    sequence: u32,
    state: SnapshotState,
}

/// Registry owning every captured snapshot.
pub struct SnapshotRegistry {
    cfg: HarnessConfig,
    slots: HashMap<u64, Slot>,
    next_id: u64,
    next_sequence: u32,
}

impl Default for SnapshotRegistry {
    fn default() -> Self {
        Self::new(HarnessConfig::default())
    }
}

impl SnapshotRegistry {
    /// Explicit init with tunables.
    pub fn new(cfg: HarnessConfig) -> Self {
        Self {
            cfg,
            slots: HashMap::new(),
            next_id: 1,
            next_sequence: 1,
        }
    }

    /// Re-initialize: drop every slot and restart sequence numbering at 1.
    /// Idempotent. Outstanding handles become unknown (NullReference).
    pub fn reset(&mut self) {
        self.slots.clear();
        self.next_sequence = 1;
    }

    /// Capture the origin region. The copy runs inside the region's
    /// exclusive section; the returned handle is Active.
    ///
    /// Fails NullReference for an absent origin and Unknown for a zero-size
    /// region or one beyond the configured cap.
    #[track_caller]
    pub fn take<R>(&mut self, origin: Option<&R>) -> Result<SnapshotId, Violation>
    where
        R: Region + Clone + 'static,
    {
        let origin = require(origin, "snapshot origin")?;

        let size = origin.size();
        if size == 0 {
            return Err(Violation::new(
                Status::Unknown,
                "zero-size snapshot request".to_string(),
            ));
        }
        let cap = self.cfg.max_snapshot_bytes;
        if cap != 0 && size > cap {
            return Err(Violation::new(
                Status::Unknown,
                format!("snapshot size {} exceeds configured cap {}", size, cap),
            ));
        }

        let mut payload = vec![0u8; size];
        origin.copy_out(&mut payload)?;

        let checksum = digest(&payload);
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        self.slots.insert(
            id,
            Slot {
                origin: Arc::new(origin.clone()),
                payload: Some(payload),
                size,
                checksum,
                sequence,
                state: SnapshotState::Active,
            },
        );

        record_snapshot_taken(size);
        log::debug!(
            "snapshot {} taken: {} bytes, seq {}, checksum {:#010x}",
            id,
            size,
            sequence,
            checksum
        );
        Ok(SnapshotId(id))
    }

    /// Commit: discard the saved payload and keep the origin exactly as the
    /// caller last mutated it. No digest re-check here: the payload is
    /// being discarded, not trusted to restore anything. That asymmetry
    /// with rollback is deliberate.
    #[track_caller]
    pub fn commit(&mut self, id: SnapshotId) -> Result<(), Violation> {
        let slot = slot_mut(&mut self.slots, id)?;
        if slot.state != SnapshotState::Active {
            return Err(Violation::new(
                Status::Inconsistent,
                format!("snapshot {} is {}, not active", id, slot.state),
            ));
        }

        slot.payload = None;
        slot.state = SnapshotState::Committed;
        record_snapshot_committed();
        log::debug!("snapshot {} committed", id);
        Ok(())
    }

    /// Roll back: re-verify the payload digest, then copy the payload back
    /// into the origin inside the exclusive section.
    ///
    /// A digest mismatch invalidates the snapshot WITHOUT touching the
    /// origin, since installing possibly-corrupt bytes would turn a detected
    /// fault into a silent one.
    #[track_caller]
    pub fn rollback(&mut self, id: SnapshotId) -> Result<(), Violation> {
        let slot = slot_mut(&mut self.slots, id)?;
        if slot.state != SnapshotState::Active {
            return Err(Violation::new(
                Status::Inconsistent,
                format!("snapshot {} is {}, not active", id, slot.state),
            ));
        }

        let fresh = digest_of_payload(slot);
        if fresh != Some(slot.checksum) {
            slot.payload = None;
            slot.state = SnapshotState::Invalidated;
            record_snapshot_invalidated();
            return Err(Violation::new(
                Status::Inconsistent,
                format!(
                    "snapshot {} payload failed integrity re-check; origin left untouched",
                    id
                ),
            ));
        }

        // Restore. On a copy error the slot stays Active with its payload,
        // so the caller still holds a restorable snapshot.
        match slot.payload.as_ref() {
            Some(p) => slot.origin.copy_in(p)?,
            None => {
                return Err(Violation::new(
                    Status::Inconsistent,
                    format!("snapshot {} has no payload", id),
                ))
            }
        }

        slot.payload = None;
        slot.state = SnapshotState::RolledBack;
        record_snapshot_rolled_back(slot.size);
        log::debug!("snapshot {} rolled back: {} bytes restored", id, slot.size);
        Ok(())
    }

    /// Export the snapshot as one frame for offline fault analysis.
    /// Non-terminal and repeatable: the snapshot stays Active, even when the
    /// integrity re-check fails (the caller may still decide to commit).
    ///
    /// Fails NullReference for an absent writer or a never-issued handle,
    /// Inconsistent for a non-active snapshot or digest mismatch, Unknown
    /// for a short write or writer error.
    #[track_caller]
    pub fn export<W: Write>(
        &mut self,
        id: SnapshotId,
        writer: Option<&mut W>,
    ) -> Result<(), Violation> {
        let writer = require(writer, "export writer")?;
        let slot = slot_mut(&mut self.slots, id)?;
        if slot.state != SnapshotState::Active {
            return Err(Violation::new(
                Status::Inconsistent,
                format!("snapshot {} is {}, not active", id, slot.state),
            ));
        }

        let fresh = digest_of_payload(slot);
        if fresh != Some(slot.checksum) {
            return Err(Violation::new(
                Status::Inconsistent,
                format!("snapshot {} payload failed integrity re-check before export", id),
            ));
        }

        let payload = match slot.payload.as_ref() {
            Some(p) => p,
            None => {
                return Err(Violation::new(
                    Status::Inconsistent,
                    format!("snapshot {} has no payload", id),
                ))
            }
        };

        write_frame(writer, slot.sequence, slot.checksum, payload)?;
        record_export(FRAME_HDR_SIZE + payload.len());
        log::debug!("snapshot {} exported: {} payload bytes", id, payload.len());
        Ok(())
    }

    /// Lifecycle state for a handle, if it was ever issued.
    pub fn state(&self, id: SnapshotId) -> Option<SnapshotState> {
        self.slots.get(&id.0).map(|s| s.state)
    }

    /// Sequence number assigned at capture, if the handle was ever issued.
    pub fn sequence(&self, id: SnapshotId) -> Option<u32> {
        self.slots.get(&id.0).map(|s| s.sequence)
    }

    /// Number of snapshots currently Active.
    pub fn active_count(&self) -> usize {
        self.slots
            .values()
            .filter(|s| s.state == SnapshotState::Active)
            .count()
    }

    /// Fault injection: flip one payload byte of an Active snapshot so the
    /// next rollback/export integrity re-check trips. Used by corruption
    /// drills and tests; never called on the success path.
    #[track_caller]
    pub fn inject_payload_fault(
        &mut self,
        id: SnapshotId,
        offset: usize,
    ) -> Result<(), Violation> {
        let slot = slot_mut(&mut self.slots, id)?;
        if slot.state != SnapshotState::Active {
            return Err(Violation::new(
                Status::Inconsistent,
                format!("snapshot {} is {}, not active", id, slot.state),
            ));
        }
        let payload = match slot.payload.as_mut() {
            Some(p) => p,
            None => {
                return Err(Violation::new(
                    Status::Inconsistent,
                    format!("snapshot {} has no payload", id),
                ))
            }
        };
        check_bounds(offset, payload.len())?;
        payload[offset] ^= 0xFF;
        Ok(())
    }
}

// Look up a slot; a handle that was never issued answers NullReference.
#[track_caller]
fn slot_mut(slots: &mut HashMap<u64, Slot>, id: SnapshotId) -> Result<&mut Slot, Violation> {
    match slots.get_mut(&id.0) {
        Some(s) => Ok(s),
        None => Err(Violation::new(
            Status::NullReference,
            format!("unknown snapshot handle {}", id),
        )),
    }
}

fn digest_of_payload(slot: &Slot) -> Option<u32> {
    slot.payload.as_deref().map(digest)
}
