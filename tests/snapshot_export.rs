use anyhow::Result;
use std::io::Write;

use stateguard::consts::{FRAME_HDR_SIZE, FRAME_MAGIC};
use stateguard::{
    digest, read_frame, status_of, MemRegion, SnapshotRegistry, SnapshotState, Status,
};
use byteorder::{ByteOrder, LittleEndian};

#[test]
fn export_roundtrips_and_does_not_invalidate() -> Result<()> {
    let captured = sample_state(96);
    let region = MemRegion::new(captured.clone());
    let mut reg = SnapshotRegistry::default();

    let id = reg.take(Some(&region)).expect("take must succeed");
    let seq = reg.sequence(id).expect("sequence must exist");

    // Mutations after capture never leak into the exported payload.
    region.write(&sample_state(96).iter().map(|b| !b).collect::<Vec<_>>())?;

    let mut buf: Vec<u8> = Vec::new();
    reg.export(id, Some(&mut buf)).expect("export must succeed");
    assert_eq!(buf.len(), FRAME_HDR_SIZE + captured.len());

    // Frame decodes to the capture-time view.
    let (hdr, payload) = read_frame(&buf).expect("frame must decode");
    assert_eq!(
        LittleEndian::read_u32(&buf[..4]),
        FRAME_MAGIC,
        "leading field must be the format magic"
    );
    assert_eq!(hdr.sequence, seq);
    assert_eq!(hdr.checksum, digest(&captured));
    assert_eq!(hdr.size as usize, captured.len());
    assert_eq!(payload, &captured[..]);

    // Export is repeatable and non-terminal.
    let mut again: Vec<u8> = Vec::new();
    reg.export(id, Some(&mut again)).expect("second export must succeed");
    assert_eq!(again, buf);
    assert_eq!(reg.state(id), Some(SnapshotState::Active));

    reg.commit(id).expect("commit after export must succeed");
    Ok(())
}

#[test]
fn export_guards_its_inputs() {
    let region = MemRegion::new(sample_state(16));
    let mut reg = SnapshotRegistry::default();
    let id = reg.take(Some(&region)).expect("take must succeed");

    // Absent writer
    assert_eq!(
        status_of(&reg.export::<Vec<u8>>(id, None)),
        Status::NullReference
    );

    // Terminal snapshot
    reg.commit(id).expect("commit must succeed");
    let mut buf: Vec<u8> = Vec::new();
    assert_eq!(status_of(&reg.export(id, Some(&mut buf))), Status::Inconsistent);
    assert!(buf.is_empty(), "no bytes may be emitted for a refused export");
}

#[test]
fn writer_failures_surface_as_unknown() {
    struct ShortWriter;
    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len().saturating_sub(1))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct FailingWriter;
    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "sink offline"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let region = MemRegion::new(sample_state(16));
    let mut reg = SnapshotRegistry::default();
    let id = reg.take(Some(&region)).expect("take must succeed");

    let mut short = ShortWriter;
    assert_eq!(status_of(&reg.export(id, Some(&mut short))), Status::Unknown);

    let mut failing = FailingWriter;
    assert_eq!(status_of(&reg.export(id, Some(&mut failing))), Status::Unknown);

    // The snapshot survives writer trouble.
    assert_eq!(reg.state(id), Some(SnapshotState::Active));
    reg.rollback(id).expect("rollback must still succeed");
}

#[test]
fn concatenated_frames_decode_in_capture_order() -> Result<()> {
    let region = MemRegion::new(sample_state(40));
    let mut reg = SnapshotRegistry::default();

    let mut stream: Vec<u8> = Vec::new();
    let mut expected = Vec::new();
    for round in 0..3u8 {
        region.with_mut(|b| b[0] = round);
        let id = reg.take(Some(&region)).expect("take must succeed");
        expected.push((reg.sequence(id).expect("sequence"), region.read()));
        reg.export(id, Some(&mut stream)).expect("export must succeed");
        reg.commit(id).expect("commit must succeed");
    }

    let mut pos = 0usize;
    let mut prev_seq = 0u32;
    for (seq, bytes) in &expected {
        let (hdr, payload) = read_frame(&stream[pos..]).expect("frame must decode");
        assert_eq!(hdr.sequence, *seq);
        assert!(hdr.sequence > prev_seq, "stream must preserve capture order");
        prev_seq = hdr.sequence;
        assert_eq!(payload, &bytes[..]);
        pos += FRAME_HDR_SIZE + hdr.size as usize;
    }
    assert_eq!(pos, stream.len(), "stream must contain exactly the frames");
    Ok(())
}

fn sample_state(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + 3) as u8).collect()
}
