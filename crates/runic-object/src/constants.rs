//! Identity and geometry constants of the binary object format.

/// Magic identity bytes at offset 0 of every binary object.
pub const MAGIC: [u8; 4] = [0xBA, 0xDC, 0x0D, 0xE1];

/// Format version emitted by the encoder. Loaders accept any minor version
/// under the same major.
pub const VERSION_MAJOR: u8 = 1;
pub const VERSION_MINOR: u8 = 0;

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 24;

/// Size of one variable descriptor in bytes.
pub const DESCRIPTOR_SIZE: usize = 21;

/// Size of the inline payload slot inside a descriptor. Payloads up to this
/// size are stored in the slot itself; anything larger goes to the data pool.
pub const SLOT_SIZE: usize = 8;

/// Size of one encoded instruction in bytes.
pub const OP_SIZE: usize = 8;

/// Maximum number of declared external variables (u16 header field).
pub const MAX_VARIABLES: usize = u16::MAX as usize;
