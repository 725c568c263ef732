use anyhow::Result;

use stateguard::{
    status_of, HarnessConfig, MemRegion, SnapshotRegistry, SnapshotState, Status,
};

#[test]
fn take_commit_keeps_mutations() -> Result<()> {
    let region = MemRegion::new(build_pattern(128, 0xA5));
    let mut reg = SnapshotRegistry::default();

    // 1) capture, then mutate
    let id = reg.take(Some(&region)).expect("take must succeed");
    let mutated = build_pattern(128, 0x5A);
    region.write(&mutated).expect("write must succeed");

    // 2) commit keeps the origin exactly as last mutated
    reg.commit(id).expect("commit must succeed");
    assert_eq!(region.read(), mutated);
    assert_eq!(reg.state(id), Some(SnapshotState::Committed));
    assert_eq!(reg.active_count(), 0);
    Ok(())
}

#[test]
fn take_rollback_restores_bytes() -> Result<()> {
    let original = build_pattern(256, 0x11);
    let region = MemRegion::new(original.clone());
    let mut reg = SnapshotRegistry::default();

    let id = reg.take(Some(&region)).expect("take must succeed");

    // Mutate every byte, then roll back.
    region.with_mut(|b| {
        for x in b.iter_mut() {
            *x = x.wrapping_add(1);
        }
    });
    assert_ne!(region.read(), original, "mutation must be visible");

    reg.rollback(id).expect("rollback must succeed");
    assert_eq!(region.read(), original, "rollback must restore byte-for-byte");
    assert_eq!(reg.state(id), Some(SnapshotState::RolledBack));
    Ok(())
}

#[test]
fn zero_size_and_absent_origin_fail() {
    let mut reg = SnapshotRegistry::default();

    let empty = MemRegion::new(Vec::new());
    assert_eq!(status_of(&reg.take(Some(&empty))), Status::Unknown);

    assert_eq!(
        status_of(&reg.take(None::<&MemRegion>)),
        Status::NullReference
    );
}

#[test]
fn second_terminal_call_fails_inconsistent() {
    let region = MemRegion::new(build_pattern(32, 0x42));
    let mut reg = SnapshotRegistry::default();

    // commit twice
    let id = reg.take(Some(&region)).expect("take must succeed");
    reg.commit(id).expect("first commit must succeed");
    assert_eq!(status_of(&reg.commit(id)), Status::Inconsistent);
    assert_eq!(status_of(&reg.rollback(id)), Status::Inconsistent);

    // rollback twice
    let id2 = reg.take(Some(&region)).expect("take must succeed");
    reg.rollback(id2).expect("first rollback must succeed");
    assert_eq!(status_of(&reg.rollback(id2)), Status::Inconsistent);
    assert_eq!(status_of(&reg.commit(id2)), Status::Inconsistent);
}

#[test]
fn sequences_strictly_increase() {
    let region = MemRegion::new(build_pattern(16, 0x01));
    let mut reg = SnapshotRegistry::default();

    let mut last = 0u32;
    for _ in 0..10 {
        let id = reg.take(Some(&region)).expect("take must succeed");
        let seq = reg.sequence(id).expect("sequence must exist");
        assert!(seq > last, "sequence {} must exceed {}", seq, last);
        last = seq;
        reg.commit(id).expect("commit must succeed");
    }
}

#[test]
fn reset_restarts_sequencing_and_drops_slots() {
    let region = MemRegion::new(build_pattern(16, 0x02));
    let mut reg = SnapshotRegistry::default();

    let id = reg.take(Some(&region)).expect("take must succeed");
    let seq = reg.sequence(id).expect("sequence must exist");
    assert!(seq >= 1);

    reg.reset();
    assert_eq!(reg.active_count(), 0);

    // Outstanding handles are gone after re-init.
    assert_eq!(status_of(&reg.commit(id)), Status::NullReference);
    assert_eq!(reg.state(id), None);

    // Numbering restarts.
    let id2 = reg.take(Some(&region)).expect("take must succeed");
    assert_eq!(reg.sequence(id2), Some(1));

    // reset is idempotent
    reg.reset();
    reg.reset();
    assert_eq!(reg.active_count(), 0);
}

#[test]
fn size_cap_bounds_the_copy_window() {
    let cfg = HarnessConfig::default().with_max_snapshot_bytes(64);
    let mut reg = SnapshotRegistry::new(cfg);

    let small = MemRegion::new(build_pattern(64, 0x03));
    assert!(reg.take(Some(&small)).is_ok());

    let big = MemRegion::new(build_pattern(65, 0x03));
    assert_eq!(status_of(&reg.take(Some(&big))), Status::Unknown);

    // Cap 0 means uncapped.
    let uncapped = HarnessConfig::default().with_max_snapshot_bytes(0);
    let mut reg2 = SnapshotRegistry::new(uncapped);
    assert!(reg2.take(Some(&big)).is_ok());
}

#[test]
fn independent_snapshots_commute() -> Result<()> {
    // Two snapshots over different regions: terminal order does not matter.
    let ra = MemRegion::new(build_pattern(32, 0xAA));
    let rb = MemRegion::new(build_pattern(32, 0xBB));
    let mut reg = SnapshotRegistry::default();

    let a = reg.take(Some(&ra)).expect("take a");
    let b = reg.take(Some(&rb)).expect("take b");

    ra.write(&build_pattern(32, 0x01)).expect("write a");
    rb.write(&build_pattern(32, 0x02)).expect("write b");

    // Later snapshot resolved first.
    reg.rollback(b).expect("rollback b");
    reg.commit(a).expect("commit a");

    assert_eq!(rb.read(), build_pattern(32, 0xBB));
    assert_eq!(ra.read(), build_pattern(32, 0x01));
    assert_eq!(reg.active_count(), 0);
    Ok(())
}

fn build_pattern(len: usize, byte: u8) -> Vec<u8> {
    let mut v = vec![byte; len];
    // A little variety so not all bytes are identical.
    if len >= 8 {
        v[len / 2] = byte ^ 0x11;
        v[len - 1] = byte ^ 0x22;
    }
    v
}
