//! Export frame codec (SBMS).
//!
//! Writer side: emit [magic][sequence][checksum][size][payload] in LE, one
//! writer call per framing field plus one for the payload. Any short write
//! or writer error is fatal (Unknown); half a frame is worse than none for
//! fault forensics.
//!
//! Reader side: parse and verify frames for offline analysis. A forensics
//! artifact must be bit-exact, so the reader rejects bad magic, truncated
//! frames and digest mismatches outright.

use byteorder::{ByteOrder, LittleEndian};
use std::io::Write;

use crate::checksum::digest;
use crate::consts::{
    FRAME_HDR_SIZE, FRAME_MAGIC, FRAME_MAX_PAYLOAD, FRAME_OFF_CHECKSUM, FRAME_OFF_MAGIC,
    FRAME_OFF_SEQUENCE, FRAME_OFF_SIZE,
};
use crate::guard::Violation;
use crate::status::Status;

/// Parsed header of one export frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub sequence: u32,
    pub checksum: u32,
    pub size: u32,
}

/// Write one frame. Field order is fixed: magic, sequence, checksum, size,
/// payload; exactly one writer call per item.
pub(crate) fn write_frame<W: Write>(
    w: &mut W,
    sequence: u32,
    checksum: u32,
    payload: &[u8],
) -> Result<(), Violation> {
    if payload.len() as u64 > FRAME_MAX_PAYLOAD {
        return Err(Violation::new(
            Status::Unknown,
            format!("payload too large for frame: {} bytes", payload.len()),
        ));
    }

    let mut field = [0u8; 4];

    LittleEndian::write_u32(&mut field, FRAME_MAGIC);
    put(w, &field)?;
    LittleEndian::write_u32(&mut field, sequence);
    put(w, &field)?;
    LittleEndian::write_u32(&mut field, checksum);
    put(w, &field)?;
    LittleEndian::write_u32(&mut field, payload.len() as u32);
    put(w, &field)?;
    put(w, payload)?;

    Ok(())
}

// Single write call; a partial acceptance is treated as fatal.
#[track_caller]
fn put<W: Write>(w: &mut W, buf: &[u8]) -> Result<(), Violation> {
    match w.write(buf) {
        Ok(n) if n == buf.len() => Ok(()),
        Ok(n) => Err(Violation::new(
            Status::Unknown,
            format!("short write: {} of {} bytes", n, buf.len()),
        )),
        Err(e) => Err(Violation::new(
            Status::Unknown,
            format!("export writer failed: {}", e),
        )),
    }
}

/// Parse one frame from the front of `bytes`, verifying magic and payload
/// digest. Returns the header and the payload slice.
#[track_caller]
pub fn read_frame(bytes: &[u8]) -> Result<(FrameHeader, &[u8]), Violation> {
    if bytes.len() < FRAME_HDR_SIZE {
        return Err(Violation::new(
            Status::Inconsistent,
            format!("frame truncated: {} bytes, header needs {}", bytes.len(), FRAME_HDR_SIZE),
        ));
    }

    let magic = LittleEndian::read_u32(&bytes[FRAME_OFF_MAGIC..FRAME_OFF_MAGIC + 4]);
    if magic != FRAME_MAGIC {
        return Err(Violation::new(
            Status::Inconsistent,
            format!("bad frame magic: {:#010x} (expected {:#010x})", magic, FRAME_MAGIC),
        ));
    }

    let header = FrameHeader {
        sequence: LittleEndian::read_u32(&bytes[FRAME_OFF_SEQUENCE..FRAME_OFF_SEQUENCE + 4]),
        checksum: LittleEndian::read_u32(&bytes[FRAME_OFF_CHECKSUM..FRAME_OFF_CHECKSUM + 4]),
        size: LittleEndian::read_u32(&bytes[FRAME_OFF_SIZE..FRAME_OFF_SIZE + 4]),
    };

    let total = FRAME_HDR_SIZE + header.size as usize;
    if bytes.len() < total {
        return Err(Violation::new(
            Status::Inconsistent,
            format!(
                "frame payload truncated: {} bytes present, {} declared",
                bytes.len() - FRAME_HDR_SIZE,
                header.size
            ),
        ));
    }

    let payload = &bytes[FRAME_HDR_SIZE..total];
    if digest(payload) != header.checksum {
        return Err(Violation::new(
            Status::Inconsistent,
            format!("frame {} payload digest mismatch", header.sequence),
        ));
    }

    Ok((header, payload))
}
