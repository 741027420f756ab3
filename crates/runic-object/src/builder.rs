//! Binary object encoder.
//!
//! `ObjectBuilder` accumulates extern variable declarations, instructions,
//! and pooled constants, then lays the file out in one pass: header,
//! variable table, code section, data pool. Absolute offsets only exist once
//! every section size is known, so pool references are kept as relocations
//! and patched during [`finish`](ObjectBuilder::finish).
//!
//! Encoding is all-or-nothing: on any failure no bytes are produced.

use std::collections::HashMap;

use runic_core::{Value, ValueType};

use super::constants::{DESCRIPTOR_SIZE, HEADER_SIZE, MAX_VARIABLES, OP_SIZE};
use super::descriptor::{self, Descriptor};
use super::header::Header;
use super::ops::{Op, Opcode};

/// Encoding failures.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("too many external variables: {0} (limit {MAX_VARIABLES})")]
    TooManyVariables(usize),
    #[error("computed offset {0} exceeds the u32 addressable range")]
    OffsetOverflow(u64),
    #[error("cannot encode {0} values")]
    UnsupportedType(ValueType),
    #[error("payload of {0} bytes exceeds the u16 descriptor size field")]
    PayloadTooLarge(usize),
    #[error("initial value for \"{name}\" is {provided}, declared {declared}")]
    InitialValueMismatch {
        name: String,
        declared: ValueType,
        provided: ValueType,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Identifier of a pooled constant. Resolved to an absolute file offset only
/// at `finish` time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConstId(u32);

struct ExternVariable {
    name: String,
    declared: ValueType,
    initial: Value,
}

struct Constant {
    tag: ValueType,
    payload: Vec<u8>,
}

#[derive(Default)]
pub struct ObjectBuilder {
    variables: Vec<ExternVariable>,
    return_type: Option<ValueType>,
    ops: Vec<Op>,
    consts: Vec<Constant>,
    const_index: HashMap<(u8, Vec<u8>), ConstId>,
    const_refs: Vec<(usize, ConstId)>,
}

impl ObjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the tag of the designated result. `Unknown` means the script
    /// produces no result; reserved tags are rejected.
    pub fn set_return_type(&mut self, tag: ValueType) -> Result<(), EncodeError> {
        if matches!(tag, ValueType::Array | ValueType::Range) {
            return Err(EncodeError::UnsupportedType(tag));
        }
        self.return_type = Some(tag);
        Ok(())
    }

    /// Declare an external variable. Declaration order becomes the on-disk
    /// variable table order. Returns the variable's index.
    pub fn add_extern_variable(
        &mut self,
        name: impl Into<String>,
        declared: ValueType,
        initial: Option<Value>,
    ) -> Result<u32, EncodeError> {
        let name = name.into();
        if !declared.is_supported() {
            return Err(EncodeError::UnsupportedType(declared));
        }
        if self.variables.len() == MAX_VARIABLES {
            return Err(EncodeError::TooManyVariables(MAX_VARIABLES + 1));
        }
        if name.len() > u16::MAX as usize {
            return Err(EncodeError::PayloadTooLarge(name.len()));
        }

        let initial = match initial {
            None => Value::zero(declared).map_err(|_| EncodeError::UnsupportedType(declared))?,
            Some(Value::Integer(i)) if declared == ValueType::Float => Value::Float(i as f64),
            Some(value) if value.value_type() == declared => value,
            Some(value) => {
                return Err(EncodeError::InitialValueMismatch {
                    name,
                    declared,
                    provided: value.value_type(),
                });
            }
        };
        if initial.encode_payload().len() > u16::MAX as usize {
            return Err(EncodeError::PayloadTooLarge(initial.encode_payload().len()));
        }

        let index = self.variables.len() as u32;
        self.variables.push(ExternVariable {
            name,
            declared,
            initial,
        });
        Ok(index)
    }

    /// Index of a declared variable, by name.
    pub fn variable_index(&self, name: &str) -> Option<u32> {
        self.variables
            .iter()
            .position(|v| v.name == name)
            .map(|i| i as u32)
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Intern a constant payload in the data pool. Identical payloads share
    /// one pool entry.
    pub fn add_constant(&mut self, value: &Value) -> Result<ConstId, EncodeError> {
        let payload = value.encode_payload();
        if payload.len() > u16::MAX as usize {
            return Err(EncodeError::PayloadTooLarge(payload.len()));
        }

        let key = (value.value_type().as_u8(), payload.clone());
        if let Some(&id) = self.const_index.get(&key) {
            return Ok(id);
        }

        let id = ConstId(self.consts.len() as u32);
        self.consts.push(Constant {
            tag: value.value_type(),
            payload,
        });
        self.const_index.insert(key, id);
        Ok(id)
    }

    /// Append an instruction. Returns its index, usable as a jump target.
    pub fn push_op(&mut self, op: Op) -> u32 {
        self.ops.push(op);
        (self.ops.len() - 1) as u32
    }

    /// Append a `PushConst` for an interned constant. The pool offset is a
    /// relocation patched at `finish`.
    pub fn push_const_op(&mut self, id: ConstId) -> u32 {
        let constant = &self.consts[id.0 as usize];
        let index = self.push_op(Op::push_const(
            constant.tag.as_u8(),
            constant.payload.len() as u16,
            0,
        ));
        self.const_refs.push((index as usize, id));
        index
    }

    /// Next instruction index; the target of a jump to "here".
    pub fn next_op_index(&self) -> u32 {
        self.ops.len() as u32
    }

    /// Fix the target of a previously emitted jump.
    pub fn patch_jump(&mut self, at: u32, target: u32) {
        let op = &mut self.ops[at as usize];
        debug_assert!(
            matches!(op.opcode, Opcode::Jump | Opcode::JumpIfFalse),
            "patching a non-jump instruction"
        );
        op.c = target;
    }

    /// Lay out and emit the object.
    ///
    /// Section order: header, variable table, code, data pool. The data pool
    /// holds out-of-line names first, then out-of-line initial values, then
    /// constants, in declaration/intern order. An empty instruction list is
    /// emitted as a single `halt` so the code section is never empty.
    pub fn finish(mut self) -> Result<Vec<u8>, EncodeError> {
        if self.variables.len() > MAX_VARIABLES {
            return Err(EncodeError::TooManyVariables(self.variables.len()));
        }
        if self.ops.is_empty() {
            self.ops.push(Op::new(Opcode::Halt));
        }

        let table_offset = HEADER_SIZE as u64;
        let code_start = table_offset + (self.variables.len() * DESCRIPTOR_SIZE) as u64;
        let pool_base = code_start + (self.ops.len() * OP_SIZE) as u64;

        let mut pool: Vec<u8> = Vec::new();
        let mut descriptors: Vec<Descriptor> = Vec::with_capacity(self.variables.len());

        for var in &self.variables {
            let name_bytes = var.name.as_bytes();
            let name_slot = if descriptor::fits_inline(name_bytes.len()) {
                descriptor::inline_slot(name_bytes)
            } else {
                let offset = pool_base + pool.len() as u64;
                pool.extend_from_slice(name_bytes);
                descriptor::pooled_slot(offset)
            };

            let data = var.initial.encode_payload();
            let data_slot = if descriptor::fits_inline(data.len()) {
                descriptor::inline_slot(&data)
            } else {
                let offset = pool_base + pool.len() as u64;
                pool.extend_from_slice(&data);
                descriptor::pooled_slot(offset)
            };

            descriptors.push(Descriptor {
                name_size: name_bytes.len() as u16,
                name_slot,
                type_tag: var.declared.as_u8(),
                data_size: data.len() as u16,
                data_slot,
            });
        }

        let mut const_offsets: Vec<u64> = Vec::with_capacity(self.consts.len());
        for constant in &self.consts {
            const_offsets.push(pool_base + pool.len() as u64);
            pool.extend_from_slice(&constant.payload);
        }

        let file_size = pool_base + pool.len() as u64;
        if file_size > u32::MAX as u64 {
            return Err(EncodeError::OffsetOverflow(file_size));
        }

        let const_refs = std::mem::take(&mut self.const_refs);
        for (op_index, id) in const_refs {
            // file_size fits u32, so every pool offset does too
            self.ops[op_index].c = const_offsets[id.0 as usize] as u32;
        }

        let return_type = self.return_type.unwrap_or(ValueType::Unknown);
        let header = Header {
            variable_count: self.variables.len() as u16,
            variable_table_offset: table_offset as u32,
            code_start: code_start as u32,
            file_size: file_size as u32,
            return_type: return_type.as_u8(),
            ..Header::default()
        };

        let mut out = Vec::with_capacity(file_size as usize);
        out.extend_from_slice(&header.to_bytes());
        for desc in &descriptors {
            out.extend_from_slice(&desc.to_bytes());
        }
        for op in &self.ops {
            out.extend_from_slice(&op.to_bytes());
        }
        out.extend_from_slice(&pool);
        debug_assert_eq!(out.len() as u64, file_size);

        Ok(out)
    }
}
