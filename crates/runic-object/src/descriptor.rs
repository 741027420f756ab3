//! Variable descriptors (21 bytes each).
//!
//! Layout (little-endian):
//! - 0-1: name_size (u16)
//! - 2-9: name slot
//! - 10: type tag
//! - 11-12: data_size (u16)
//! - 13-20: data slot
//!
//! The size fields always hold the real payload size. A slot holds the
//! payload bytes directly when the size is at most 8, otherwise a u64
//! absolute file offset into the data pool.

use super::constants::{DESCRIPTOR_SIZE, SLOT_SIZE};

/// One entry of the variable table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Descriptor {
    pub name_size: u16,
    pub name_slot: [u8; SLOT_SIZE],
    pub type_tag: u8,
    pub data_size: u16,
    pub data_slot: [u8; SLOT_SIZE],
}

/// Resolved view of one descriptor slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot<'a> {
    /// Payload stored in the descriptor itself.
    Inline(&'a [u8]),
    /// Payload stored in the data pool at an absolute file offset.
    Pooled { offset: u64, size: usize },
}

impl<'a> Slot<'a> {
    pub fn is_inline(&self) -> bool {
        matches!(self, Slot::Inline(_))
    }
}

/// Whether a payload of `len` bytes is stored inline. Exactly 8 bytes still
/// fits; 9 forces the pool.
pub fn fits_inline(len: usize) -> bool {
    len <= SLOT_SIZE
}

/// Build a slot holding `payload` inline. Panics if it does not fit; callers
/// check with [`fits_inline`] first.
pub fn inline_slot(payload: &[u8]) -> [u8; SLOT_SIZE] {
    assert!(fits_inline(payload.len()), "payload does not fit inline");
    let mut slot = [0u8; SLOT_SIZE];
    slot[..payload.len()].copy_from_slice(payload);
    slot
}

/// Build a slot holding an absolute data pool offset.
pub fn pooled_slot(offset: u64) -> [u8; SLOT_SIZE] {
    offset.to_le_bytes()
}

impl Descriptor {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= DESCRIPTOR_SIZE, "descriptor too short");

        let mut name_slot = [0u8; SLOT_SIZE];
        name_slot.copy_from_slice(&bytes[2..10]);
        let mut data_slot = [0u8; SLOT_SIZE];
        data_slot.copy_from_slice(&bytes[13..21]);

        Self {
            name_size: u16::from_le_bytes([bytes[0], bytes[1]]),
            name_slot,
            type_tag: bytes[10],
            data_size: u16::from_le_bytes([bytes[11], bytes[12]]),
            data_slot,
        }
    }

    pub fn to_bytes(&self) -> [u8; DESCRIPTOR_SIZE] {
        let mut bytes = [0u8; DESCRIPTOR_SIZE];
        bytes[0..2].copy_from_slice(&self.name_size.to_le_bytes());
        bytes[2..10].copy_from_slice(&self.name_slot);
        bytes[10] = self.type_tag;
        bytes[11..13].copy_from_slice(&self.data_size.to_le_bytes());
        bytes[13..21].copy_from_slice(&self.data_slot);
        bytes
    }

    pub fn name(&self) -> Slot<'_> {
        classify(self.name_size, &self.name_slot)
    }

    pub fn data(&self) -> Slot<'_> {
        classify(self.data_size, &self.data_slot)
    }
}

fn classify(size: u16, slot: &[u8; SLOT_SIZE]) -> Slot<'_> {
    let size = size as usize;
    if fits_inline(size) {
        Slot::Inline(&slot[..size])
    } else {
        Slot::Pooled {
            offset: u64::from_le_bytes(*slot),
            size,
        }
    }
}
