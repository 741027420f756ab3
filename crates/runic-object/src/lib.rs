//! Binary object format for compiled Runic scripts.
//!
//! This crate contains:
//! - The on-disk layout: header, variable descriptors, data pool
//! - The encoder (`ObjectBuilder`) that lays out and emits an object
//! - The loader (`ObjectImage`) that validates an object before exposing it
//! - The code section instruction codec (`Op`, `Opcode`)
//! - The archive container for named compiled-function blobs

mod archive;
mod builder;
mod constants;
mod descriptor;
mod dump;
mod header;
mod object;
mod ops;

pub use archive::{Archive, ArchiveError, RtFunction, function_name_for};
pub use builder::{ConstId, EncodeError, ObjectBuilder};
pub use constants::{
    DESCRIPTOR_SIZE, HEADER_SIZE, MAGIC, MAX_VARIABLES, OP_SIZE, SLOT_SIZE, VERSION_MAJOR,
    VERSION_MINOR,
};
pub use descriptor::{Descriptor, Slot, fits_inline, inline_slot, pooled_slot};
pub use dump::dump_object;
pub use header::Header;
pub use object::{ObjectError, ObjectImage};
pub use ops::{Op, Opcode};

#[cfg(test)]
mod archive_tests;
#[cfg(test)]
mod builder_tests;
#[cfg(test)]
mod descriptor_tests;
