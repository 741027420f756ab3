//! Binary object header (24 bytes).
//!
//! Layout (little-endian):
//! - 0-3: magic
//! - 4: version_major, 5: version_minor
//! - 6-7: variable_count (u16)
//! - 8-11: variable_table_offset (u32)
//! - 12-15: code_start (u32)
//! - 16-19: file_size (u32)
//! - 20: return_type (value tag)
//! - 21-23: reserved
//!
//! Offsets are u32 file offsets, which caps an object at 4 GiB.

use runic_core::ValueType;

use super::constants::{HEADER_SIZE, MAGIC, VERSION_MAJOR, VERSION_MINOR};

/// Fixed-size header at the start of every binary object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// Magic bytes: `BA DC 0D E1`.
    pub magic: [u8; 4],
    pub version_major: u8,
    pub version_minor: u8,
    /// Number of descriptors in the variable table.
    pub variable_count: u16,
    /// Offset of the first variable descriptor.
    pub variable_table_offset: u32,
    /// Offset of the code section.
    pub code_start: u32,
    /// Total file size in bytes, for truncation cross-checks.
    pub file_size: u32,
    /// Value tag of the designated result of a run.
    pub return_type: u8,
    pub _reserved: [u8; 3],
}

const _: () = assert!(HEADER_SIZE == 24);

impl Default for Header {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version_major: VERSION_MAJOR,
            version_minor: VERSION_MINOR,
            variable_count: 0,
            variable_table_offset: 0,
            code_start: 0,
            file_size: 0,
            return_type: ValueType::Unknown.as_u8(),
            _reserved: [0; 3],
        }
    }
}

impl Header {
    /// Decode a header from the first 24 bytes. Content is not validated
    /// here; the loader checks every invariant before exposing state.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= HEADER_SIZE, "header too short");

        Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            version_major: bytes[4],
            version_minor: bytes[5],
            variable_count: u16::from_le_bytes([bytes[6], bytes[7]]),
            variable_table_offset: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            code_start: u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
            file_size: u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]),
            return_type: bytes[20],
            _reserved: [bytes[21], bytes[22], bytes[23]],
        }
    }

    /// Encode the header to its 24-byte on-disk form.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version_major;
        bytes[5] = self.version_minor;
        bytes[6..8].copy_from_slice(&self.variable_count.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.variable_table_offset.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.code_start.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.file_size.to_le_bytes());
        bytes[20] = self.return_type;
        bytes[21..24].copy_from_slice(&self._reserved);
        bytes
    }

    pub fn validate_magic(&self) -> bool {
        self.magic == MAGIC
    }

    pub fn validate_version(&self) -> bool {
        self.version_major == VERSION_MAJOR
    }

    /// The declared result tag, if it is a known tag byte.
    pub fn return_type(&self) -> Option<ValueType> {
        ValueType::from_u8(self.return_type)
    }
}
