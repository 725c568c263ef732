//! Region capability: exclusive access to the guarded memory region.
//!
//! take/rollback must copy the region without a concurrent mutator observing
//! the copy mid-flight. On hosted targets that exclusive section is a lock;
//! bare-metal single-core ports implement the same trait over an
//! interrupt-masked window instead. The registry only ever touches the
//! region through one trait-method invocation at a time, so the
//! implementation fully owns its critical-section discipline.

use std::sync::{Arc, Mutex};

use crate::guard::Violation;
use crate::status::Status;

/// Exclusive-access capability over `size()` bytes of caller-owned state.
///
/// Contract:
/// - `size()` is stable for the lifetime of any snapshot taken from it.
/// - `copy_out`/`copy_in` run the whole transfer inside one exclusive
///   section and never suspend.
/// - The caller retains ownership of the backing storage; dropping it while
///   a snapshot is outstanding is a contract violation on the caller's side.
pub trait Region: Send + Sync {
    /// Region length in bytes.
    fn size(&self) -> usize;

    /// Copy the region into `dst` atomically. `dst.len()` must equal
    /// `size()`.
    fn copy_out(&self, dst: &mut [u8]) -> Result<(), Violation>;

    /// Overwrite the region from `src` atomically. `src.len()` must equal
    /// `size()`.
    fn copy_in(&self, src: &[u8]) -> Result<(), Violation>;
}

/// Heap-backed region guarded by a mutex, the exclusive section for hosted
/// and multithreaded targets. Cloning shares the same backing cell.
#[derive(Clone)]
pub struct MemRegion {
    cell: Arc<Mutex<Vec<u8>>>,
    size: usize,
}

impl MemRegion {
    /// Wrap `initial` as a shared region; its byte length fixes `size()`.
    pub fn new(initial: Vec<u8>) -> Self {
        let size = initial.len();
        Self {
            cell: Arc::new(Mutex::new(initial)),
            size,
        }
    }

    /// Current bytes, copied out under the lock.
    pub fn read(&self) -> Vec<u8> {
        self.cell.lock().unwrap().clone()
    }

    /// Replace the region bytes in place. Length must match `size()`.
    pub fn write(&self, bytes: &[u8]) -> Result<(), Violation> {
        self.copy_in(bytes)
    }

    /// Run `f` on the region bytes under the lock.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        let mut g = self.cell.lock().unwrap();
        f(&mut g[..])
    }
}

impl Region for MemRegion {
    fn size(&self) -> usize {
        self.size
    }

    fn copy_out(&self, dst: &mut [u8]) -> Result<(), Violation> {
        let g = self.cell.lock().unwrap();
        if dst.len() != g.len() {
            return Err(Violation::new(
                Status::Unknown,
                format!(
                    "region copy-out length mismatch: dst {} vs region {}",
                    dst.len(),
                    g.len()
                ),
            ));
        }
        dst.copy_from_slice(&g);
        Ok(())
    }

    fn copy_in(&self, src: &[u8]) -> Result<(), Violation> {
        let mut g = self.cell.lock().unwrap();
        if src.len() != g.len() {
            return Err(Violation::new(
                Status::Unknown,
                format!(
                    "region copy-in length mismatch: src {} vs region {}",
                    src.len(),
                    g.len()
                ),
            ));
        }
        g.copy_from_slice(src);
        Ok(())
    }
}
