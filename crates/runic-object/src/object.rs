//! Loaded binary objects.
//!
//! `ObjectImage` owns the raw bytes of one artifact. Every header and
//! descriptor invariant is checked before the image is handed out, so the
//! accessors never trust a file offset that was not validated. Payloads are
//! structurally validated up front (bounds, sizes, UTF-8) but only
//! materialized on access, so enumerating variables does not allocate every
//! string eagerly.

use std::io;
use std::path::Path;

use runic_core::{Value, ValueError, ValueType};

use super::constants::{DESCRIPTOR_SIZE, HEADER_SIZE};
use super::descriptor::{Descriptor, Slot};
use super::header::Header;

/// Structural failures: the file cannot be a well-formed binary object.
/// Loading aborts cleanly; no partially initialized image is observable.
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    #[error("file too small: {0} bytes (minimum {HEADER_SIZE})")]
    FileTooSmall(usize),
    #[error("invalid magic bytes")]
    InvalidMagic,
    #[error("unsupported format version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },
    #[error("file size mismatch: header says {header} bytes, got {actual}")]
    SizeMismatch { header: u32, actual: usize },
    #[error("code start {0} outside the file")]
    BadCodeStart(u32),
    #[error("variable table runs past end of file")]
    BadVariableTable,
    #[error("unknown return type tag {0:#04x}")]
    BadReturnType(u8),
    #[error("variable {index}: unknown type tag {tag:#04x}")]
    UnknownTypeTag { index: u16, tag: u8 },
    #[error("variable {index}: pool reference {offset}+{size} runs past end of file")]
    BadPoolReference { index: u16, offset: u64, size: usize },
    #[error("variable {index}: name is not valid UTF-8")]
    InvalidName { index: u16 },
    #[error("variable {index}: {source}")]
    BadPayload { index: u16, source: ValueError },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// An immutable, validated binary object.
#[derive(Debug)]
pub struct ObjectImage {
    bytes: Vec<u8>,
    header: Header,
}

impl ObjectImage {
    /// Validate and take ownership of raw object bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ObjectError> {
        if bytes.len() < HEADER_SIZE {
            return Err(ObjectError::FileTooSmall(bytes.len()));
        }

        let header = Header::from_bytes(&bytes);
        if !header.validate_magic() {
            return Err(ObjectError::InvalidMagic);
        }
        if !header.validate_version() {
            return Err(ObjectError::UnsupportedVersion {
                major: header.version_major,
                minor: header.version_minor,
            });
        }
        if header.file_size as usize != bytes.len() {
            return Err(ObjectError::SizeMismatch {
                header: header.file_size,
                actual: bytes.len(),
            });
        }

        if header.return_type().is_none() {
            return Err(ObjectError::BadReturnType(header.return_type));
        }

        let file_size = bytes.len() as u64;
        let code_start = header.code_start as u64;
        if code_start < HEADER_SIZE as u64 || code_start >= file_size {
            return Err(ObjectError::BadCodeStart(header.code_start));
        }

        let table_offset = header.variable_table_offset as u64;
        let table_size = header.variable_count as u64 * DESCRIPTOR_SIZE as u64;
        if table_offset < HEADER_SIZE as u64 || table_offset + table_size > file_size {
            return Err(ObjectError::BadVariableTable);
        }

        let image = Self { bytes, header };
        for index in 0..image.header.variable_count {
            image.validate_descriptor(index)?;
        }
        Ok(image)
    }

    /// Read and validate an object file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ObjectError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes)
    }

    fn validate_descriptor(&self, index: u16) -> Result<(), ObjectError> {
        let desc = self.descriptor(index);

        let tag = ValueType::from_u8(desc.type_tag).ok_or(ObjectError::UnknownTypeTag {
            index,
            tag: desc.type_tag,
        })?;

        let name_bytes = self
            .slot_bytes(desc.name())
            .ok_or_else(|| bad_reference(index, desc.name()))?;
        if std::str::from_utf8(name_bytes).is_err() {
            return Err(ObjectError::InvalidName { index });
        }

        let data_bytes = self
            .slot_bytes(desc.data())
            .ok_or_else(|| bad_reference(index, desc.data()))?;
        Value::validate_payload(tag, data_bytes)
            .map_err(|source| ObjectError::BadPayload { index, source })?;

        Ok(())
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn variable_count(&self) -> u16 {
        self.header.variable_count
    }

    /// Decode the descriptor at `index`. Panics when out of range.
    pub fn descriptor(&self, index: u16) -> Descriptor {
        assert!(index < self.header.variable_count, "variable index out of bounds");
        let offset =
            self.header.variable_table_offset as usize + index as usize * DESCRIPTOR_SIZE;
        Descriptor::from_bytes(&self.bytes[offset..offset + DESCRIPTOR_SIZE])
    }

    /// Resolve the payload bytes of a slot: inline bytes come from the
    /// descriptor itself, pooled ones are bounds-checked against the file.
    pub fn slot_bytes<'a>(&'a self, slot: Slot<'a>) -> Option<&'a [u8]> {
        match slot {
            Slot::Inline(bytes) => Some(bytes),
            Slot::Pooled { offset, size } => self.pool_bytes(offset, size),
        }
    }

    /// Bounds-checked view into the data pool.
    pub fn pool_bytes(&self, offset: u64, size: usize) -> Option<&[u8]> {
        let end = offset.checked_add(size as u64)?;
        if offset < HEADER_SIZE as u64 || end > self.bytes.len() as u64 {
            return None;
        }
        Some(&self.bytes[offset as usize..end as usize])
    }

    /// Name of the variable at `index`.
    pub fn variable_name(&self, index: u16) -> String {
        let desc = self.descriptor(index);
        let bytes = match desc.name() {
            Slot::Inline(inline) => return decode_name(inline),
            Slot::Pooled { offset, size } => self
                .pool_bytes(offset, size)
                .expect("pool reference validated at load"),
        };
        decode_name(bytes)
    }

    /// Current value of the variable at `index`, decoded from the image.
    pub fn variable_value(&self, index: u16) -> Value {
        let desc = self.descriptor(index);
        let tag = ValueType::from_u8(desc.type_tag).expect("type tag validated at load");
        let bytes: Vec<u8> = match desc.data() {
            Slot::Inline(inline) => inline.to_vec(),
            Slot::Pooled { offset, size } => self
                .pool_bytes(offset, size)
                .expect("pool reference validated at load")
                .to_vec(),
        };
        Value::decode_payload(tag, &bytes).expect("payload validated at load")
    }

    /// Declared tag of the variable at `index`.
    pub fn variable_type(&self, index: u16) -> ValueType {
        ValueType::from_u8(self.descriptor(index).type_tag).expect("type tag validated at load")
    }

    /// Linear search for a variable by name.
    pub fn find_variable(&self, name: &str) -> Option<u16> {
        (0..self.header.variable_count).find(|&index| self.variable_name(index) == name)
    }

    /// Raw bytes from the start of the code section to the end of the file.
    /// The data pool shares this tail; execution relies on the terminating
    /// `return`/`halt` the encoder always emits.
    pub fn code(&self) -> &[u8] {
        &self.bytes[self.header.code_start as usize..]
    }
}

fn bad_reference(index: u16, slot: Slot<'_>) -> ObjectError {
    match slot {
        Slot::Pooled { offset, size } => ObjectError::BadPoolReference {
            index,
            offset,
            size,
        },
        // Inline slots cannot fail to resolve.
        Slot::Inline(_) => ObjectError::BadVariableTable,
    }
}

fn decode_name(bytes: &[u8]) -> String {
    std::str::from_utf8(bytes)
        .expect("name validated at load")
        .to_owned()
}
