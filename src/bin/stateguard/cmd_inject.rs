use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use stateguard::{
    check_bounds, install_failure_sink, propagate, require, status_of, LoopContext, MemRegion,
    SnapshotRegistry, SnapshotState, Status, Violation,
};

// One drill: a scenario that must be caught with the expected status.
struct Drill {
    name: &'static str,
    expected: Status,
    got: Status,
}

impl Drill {
    fn detected(&self) -> bool {
        self.got == self.expected
    }
}

fn null_reference_drill() -> Status {
    status_of(&require(None::<&u32>, "state block"))
}

fn out_of_bounds_drill() -> Status {
    // Probe past the end of a ten-slot table.
    status_of(&check_bounds(15, 10))
}

fn loop_limit_drill() -> Status {
    let mut ctx = LoopContext::new(100);
    for _ in 0..150 {
        if let Err(v) = ctx.tick() {
            return v.status();
        }
    }
    Status::Ok
}

fn propagation_drill() -> Status {
    // The nested operation hands back a bare status; the bridge must carry
    // the kind across the frame unchanged.
    fn inner() -> Status {
        status_of(&require(None::<&u32>, "nested state block"))
    }
    fn outer() -> Result<(), Violation> {
        propagate(inner())?;
        Ok(())
    }
    status_of(&outer())
}

// Corrupt an active snapshot's payload, then prove rollback refuses to
// restore and leaves the origin untouched.
fn corruption_drill() -> Result<Status> {
    let region = MemRegion::new(vec![0x42u8; 64]);
    let mut registry = SnapshotRegistry::default();

    let id = registry.take(Some(&region)).map_err(|v| anyhow!("{}", v))?;
    region
        .write(&vec![0x99u8; 64])
        .map_err(|v| anyhow!("{}", v))?;
    registry
        .inject_payload_fault(id, 7)
        .map_err(|v| anyhow!("{}", v))?;

    let got = status_of(&registry.rollback(id));

    if region.read() != vec![0x99u8; 64] {
        return Err(anyhow!("corrupted rollback modified the origin"));
    }
    if registry.state(id) != Some(SnapshotState::Invalidated) {
        return Err(anyhow!("corrupted snapshot was not invalidated"));
    }
    Ok(got)
}

/// Run every drill; exit non-zero if any fault goes undetected.
pub fn exec(json: bool) -> Result<()> {
    let sink_reports = Arc::new(AtomicU64::new(0));
    let counter = sink_reports.clone();
    let _sink = install_failure_sink(move |_rep| {
        counter.fetch_add(1, Ordering::Relaxed);
    });

    let drills = vec![
        Drill {
            name: "null-reference",
            expected: Status::NullReference,
            got: null_reference_drill(),
        },
        Drill {
            name: "out-of-bounds",
            expected: Status::OutOfBounds,
            got: out_of_bounds_drill(),
        },
        Drill {
            name: "loop-limit",
            expected: Status::IterationLimitExceeded,
            got: loop_limit_drill(),
        },
        Drill {
            name: "propagation",
            expected: Status::NullReference,
            got: propagation_drill(),
        },
        Drill {
            name: "corruption",
            expected: Status::Inconsistent,
            got: corruption_drill()?,
        },
    ];

    let detected = drills.iter().filter(|d| d.detected()).count();
    let reports = sink_reports.load(Ordering::Relaxed);

    if json {
        let items: Vec<serde_json::Value> = drills
            .iter()
            .map(|d| {
                serde_json::json!({
                    "drill": d.name,
                    "expected": d.expected.to_string(),
                    "got": d.got.to_string(),
                    "detected": d.detected(),
                })
            })
            .collect();
        let out = serde_json::json!({
            "drills": items,
            "detected": detected,
            "total": drills.len(),
            "sink_reports": reports,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for d in &drills {
            let verdict = if d.detected() { "PASS" } else { "FAIL" };
            println!("[{}] {}: expected {}, got {}", verdict, d.name, d.expected, d.got);
        }
        println!();
        println!("{}/{} faults detected, {} sink reports", detected, drills.len(), reports);
    }

    if detected != drills.len() {
        return Err(anyhow!("{} fault(s) went undetected", drills.len() - detected));
    }
    Ok(())
}
