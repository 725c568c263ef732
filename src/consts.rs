//! Export frame format constants.

// -------- Snapshot export frame (v1) --------
//
// Layout (LE):
// [magic u32]     -- "SBMS"
// [sequence u32]  -- capture order within the registry lifetime
// [checksum u32]  -- rotate-xor digest of payload at capture time
// [size u32]      -- payload length in bytes
// [payload]       -- size bytes of raw captured state
//
// Total header size = 4 + 4 + 4 + 4 = 16 bytes.
pub const FRAME_MAGIC: u32 = 0x5342_4D53; // "SBMS"
pub const FRAME_HDR_SIZE: usize = 16;

// Offsets inside the frame header
pub const FRAME_OFF_MAGIC: usize = 0;
pub const FRAME_OFF_SEQUENCE: usize = 4;
pub const FRAME_OFF_CHECKSUM: usize = 8;
pub const FRAME_OFF_SIZE: usize = 12;

/// Format bound: payload length must fit the u32 size field.
pub const FRAME_MAX_PAYLOAD: u64 = u32::MAX as u64;
