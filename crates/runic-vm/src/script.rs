//! Loaded, runnable scripts.
//!
//! A `RunningScript` owns a validated [`ObjectImage`] plus a mutation
//! overlay for its variable table. The image bytes are never modified in
//! place: binds and run-time stores land in the overlay, and `save`
//! re-serializes image + overlay back into the same layout.

use std::path::Path;

use indexmap::IndexMap;

use runic_core::{DiagnosticSink, Value, ValueType};
use runic_object::{
    Descriptor, DESCRIPTOR_SIZE, EncodeError, HEADER_SIZE, ObjectError, ObjectImage, fits_inline,
    inline_slot, pooled_slot,
};

use super::interp;
use super::result::ExecutionResult;

/// Contract violations when binding or reading variables. The caller decides
/// whether these are fatal; the engine state is unchanged by a failed bind.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("unknown variable \"{0}\"")]
    UnknownVariable(String),
    #[error("type mismatch for \"{name}\": declared {declared}, got {provided}")]
    TypeMismatch {
        name: String,
        declared: ValueType,
        provided: ValueType,
    },
}

/// In-memory image of one loaded binary object.
///
/// One instance supports exactly one in-flight `run`; parallel executions
/// require independent loads.
#[derive(Debug)]
pub struct RunningScript {
    image: ObjectImage,
    /// name -> variable index, first declaration wins
    index: IndexMap<String, u16>,
    /// values mutated since load, by variable index
    overlay: Vec<Option<Value>>,
}

impl RunningScript {
    /// Load and validate an object file. On any structural violation no
    /// partially initialized engine is observable.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ObjectError> {
        Ok(Self::from_image(ObjectImage::from_path(path)?))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ObjectError> {
        Ok(Self::from_image(ObjectImage::from_bytes(bytes)?))
    }

    pub fn from_image(image: ObjectImage) -> Self {
        let count = image.variable_count();
        let mut index = IndexMap::with_capacity(count as usize);
        for i in 0..count {
            index.entry(image.variable_name(i)).or_insert(i);
        }
        Self {
            image,
            index,
            overlay: vec![None; count as usize],
        }
    }

    pub fn image(&self) -> &ObjectImage {
        &self.image
    }

    /// Number of declared external variables.
    pub fn variable_size(&self) -> usize {
        self.image.variable_count() as usize
    }

    /// O(1) membership query. Pure; no mutation.
    pub fn has_variable(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declared tag of the designated result.
    pub fn return_type(&self) -> ValueType {
        self.image
            .header()
            .return_type()
            .expect("return type validated at load")
    }

    /// Bind a value to a declared variable. An integer binds into a
    /// float-declared slot; any other tag difference is a mismatch. The
    /// stored type tag is never rewritten.
    pub fn set_variable(&mut self, name: &str, value: impl Into<Value>) -> Result<(), BindError> {
        let value = value.into();
        let index = self.lookup(name)?;
        let declared = self.image.variable_type(index);

        let bound = match (declared, value) {
            (ValueType::Float, Value::Integer(i)) => Value::Float(i as f64),
            (declared, value) if value.value_type() == declared => value,
            (declared, value) => {
                return Err(BindError::TypeMismatch {
                    name: name.to_owned(),
                    declared,
                    provided: value.value_type(),
                });
            }
        };
        self.overlay[index as usize] = Some(bound);
        Ok(())
    }

    /// Current value of a variable, by name.
    pub fn get_variable(&self, name: &str) -> Result<Value, BindError> {
        let index = self.lookup(name)?;
        Ok(self.value_at(index))
    }

    /// Name and current value of the variable at `index`, in declaration
    /// order. Out-of-line payloads are resolved only here, not at load.
    pub fn variable(&self, index: u16) -> Option<(String, Value)> {
        if index >= self.image.variable_count() {
            return None;
        }
        Some((self.image.variable_name(index), self.value_at(index)))
    }

    /// Declared tag of the variable at `index`.
    pub fn variable_type(&self, index: u16) -> Option<ValueType> {
        if index >= self.image.variable_count() {
            return None;
        }
        Some(self.image.variable_type(index))
    }

    /// Interpret the code section exactly once. Not re-entrant and not
    /// thread-safe. Run-time faults are reported through `sink`; a fatal one
    /// halts the run and leaves variables as of the last completed
    /// instruction.
    pub fn run(&mut self, sink: &mut dyn DiagnosticSink) -> ExecutionResult {
        interp::execute(&self.image, &mut self.overlay, sink)
    }

    /// Re-serialize the current variable state into the object layout.
    ///
    /// Header geometry, code section, and existing pool bytes are preserved
    /// verbatim so every embedded pool reference stays valid; a value that
    /// no longer fits its slot is appended to the pool and its descriptor
    /// re-pointed.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut bytes = self.image.bytes().to_vec();
        let table_offset = self.image.header().variable_table_offset as usize;

        for (i, slot) in self.overlay.iter().enumerate() {
            let Some(value) = slot else { continue };
            let payload = value.encode_payload();
            if payload.len() > u16::MAX as usize {
                return Err(EncodeError::PayloadTooLarge(payload.len()));
            }

            let desc_offset = table_offset + i * DESCRIPTOR_SIZE;
            let mut desc = Descriptor::from_bytes(&bytes[desc_offset..desc_offset + DESCRIPTOR_SIZE]);
            desc.data_size = payload.len() as u16;
            if fits_inline(payload.len()) {
                desc.data_slot = inline_slot(&payload);
            } else {
                let offset = bytes.len() as u64;
                if offset + payload.len() as u64 > u32::MAX as u64 {
                    return Err(EncodeError::OffsetOverflow(offset + payload.len() as u64));
                }
                desc.data_slot = pooled_slot(offset);
                bytes.extend_from_slice(&payload);
            }
            bytes[desc_offset..desc_offset + DESCRIPTOR_SIZE].copy_from_slice(&desc.to_bytes());
        }

        let mut header = *self.image.header();
        header.file_size = bytes.len() as u32;
        bytes[..HEADER_SIZE].copy_from_slice(&header.to_bytes());
        Ok(bytes)
    }

    /// Persist the current state for a later "continue where left off"
    /// session.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EncodeError> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<u16, BindError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| BindError::UnknownVariable(name.to_owned()))
    }

    fn value_at(&self, index: u16) -> Value {
        self.overlay[index as usize]
            .clone()
            .unwrap_or_else(|| self.image.variable_value(index))
    }
}
