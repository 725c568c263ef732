use anyhow::{anyhow, Context, Result};
use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use stateguard::{metrics, LoopContext, MemRegion, SnapshotRegistry};

const BUFFER_CAPACITY: u64 = 100;

// Linear congruential generator, Numerical Recipes parameters. The trace
// must be reproducible bit-for-bit across platforms and runs, which rules
// out any seeded-from-ambient-state generator.
struct Lcg {
    state: u32,
}

impl Lcg {
    fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.state
    }

    /// Random integer in [min, max).
    fn randint(&mut self, min: u32, max: u32) -> u32 {
        min + self.next_u32() % (max - min)
    }

    /// Random f64 in [0, 1).
    fn random(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }
}

#[derive(Serialize)]
struct TraceEvent {
    step: u32,
    state: &'static str,
    buffer_used: u64,
    request: u32,
    success: bool,
}

fn region_value(region: &MemRegion) -> u64 {
    LittleEndian::read_u64(&region.read())
}

fn set_region_value(region: &MemRegion, value: u64) -> Result<()> {
    let mut buf = [0u8; 8];
    LittleEndian::write_u64(&mut buf, value);
    region.write(&buf).map_err(|v| anyhow!("{}", v))
}

/// Generate the allocation-pattern trace. Every state mutation runs inside
/// a snapshot bracket: commit on the success path, rollback when the
/// request would overflow the buffer.
pub fn exec(seed: u32, steps: u32, out: PathBuf) -> Result<()> {
    let file = File::create(&out).with_context(|| format!("create trace {}", out.display()))?;
    let mut w = BufWriter::new(file);

    let mut rng = Lcg::new(seed);
    let region = MemRegion::new(vec![0u8; 8]);
    let mut registry = SnapshotRegistry::default();

    let mut ctx = LoopContext::new(steps);
    let mut overflow_count = 0u32;

    for step in 0..steps {
        ctx.tick().map_err(|v| anyhow!("{}", v))?;

        // Random allocation request of 1..=10 units.
        let request = rng.randint(1, 11);

        // Tentatively apply the request, then keep or undo it.
        let id = registry.take(Some(&region)).map_err(|v| anyhow!("{}", v))?;
        let used = region_value(&region);
        set_region_value(&region, used + u64::from(request))?;

        let (mut state, success) = if used + u64::from(request) <= BUFFER_CAPACITY {
            registry.commit(id).map_err(|v| anyhow!("{}", v))?;
            ("allocated", true)
        } else {
            registry.rollback(id).map_err(|v| anyhow!("{}", v))?;
            overflow_count += 1;
            ("overflow_prevented", false)
        };

        // Random deallocation (10% chance while the buffer is non-empty).
        let used = region_value(&region);
        if used > 0 && rng.random() < 0.1 {
            let dealloc_request = u64::from(rng.randint(1, 11));
            let dealloc = dealloc_request.min(used);

            let id = registry.take(Some(&region)).map_err(|v| anyhow!("{}", v))?;
            set_region_value(&region, used - dealloc)?;
            registry.commit(id).map_err(|v| anyhow!("{}", v))?;
            state = "deallocated";
        }

        let ev = TraceEvent {
            step,
            state,
            buffer_used: region_value(&region),
            request,
            success,
        };
        serde_json::to_writer(&mut w, &ev)?;
        w.write_all(b"\n")?;
    }

    w.flush()?;

    let ms = metrics::snapshot();
    println!(
        "trace completed: {} steps, {} overflows prevented, {} snapshots taken",
        steps, overflow_count, ms.snapshots_taken
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lcg_matches_reference_parameters() {
        // 42 * 1664525 + 1013904223 mod 2^32
        let mut rng = Lcg::new(42);
        assert_eq!(rng.next_u32(), 1_083_814_273);
    }

    #[test]
    fn lcg_is_deterministic_per_seed() {
        let mut a = Lcg::new(7);
        let mut b = Lcg::new(7);
        let mut c = Lcg::new(8);
        let sa: Vec<u32> = (0..10).map(|_| a.next_u32()).collect();
        let sb: Vec<u32> = (0..10).map(|_| b.next_u32()).collect();
        let sc: Vec<u32> = (0..10).map(|_| c.next_u32()).collect();
        assert_eq!(sa, sb);
        assert_ne!(sa, sc);
    }
}
