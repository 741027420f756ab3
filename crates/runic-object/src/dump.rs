//! Textual listing of a binary object.
//!
//! Used by the CLI `dump` command. The data pool is not self-describing and
//! the header records no code length, so disassembly walks from `code_start`
//! and stops at the first byte that no longer decodes as an instruction
//! (in practice, the start of the pool).

use std::fmt::Write;

use runic_core::ValueType;

use super::constants::OP_SIZE;
use super::object::ObjectImage;
use super::ops::{Op, Opcode};

/// Render a loaded object as a multi-section listing.
pub fn dump_object(image: &ObjectImage) -> String {
    let mut out = String::new();
    let header = image.header();

    let return_type = header
        .return_type()
        .map(ValueType::name)
        .unwrap_or("invalid");

    let _ = writeln!(
        out,
        "binary object {}.{}",
        header.version_major, header.version_minor
    );
    let _ = writeln!(out, "  variables:  {}", header.variable_count);
    let _ = writeln!(out, "  table at:   {:#06x}", header.variable_table_offset);
    let _ = writeln!(out, "  code at:    {:#06x}", header.code_start);
    let _ = writeln!(out, "  file size:  {} bytes", header.file_size);
    let _ = writeln!(out, "  returns:    {return_type}");

    if image.variable_count() > 0 {
        let _ = writeln!(out, "\nvariables:");
        for index in 0..image.variable_count() {
            let desc = image.descriptor(index);
            let name = image.variable_name(index);
            let value = image.variable_value(index);
            let storage = match desc.data() {
                super::descriptor::Slot::Inline(_) => "inline".to_owned(),
                super::descriptor::Slot::Pooled { offset, size } => {
                    format!("pool {offset:#06x}+{size}")
                }
            };
            let rendered = match &value {
                runic_core::Value::String(s) => format!("{s:?}"),
                other => other.to_string(),
            };
            let _ = writeln!(
                out,
                "  [{index}] {name}: {} = {rendered} ({storage})",
                image.variable_type(index)
            );
        }
    }

    let _ = writeln!(out, "\ncode:");
    let code = image.code();
    for (step, chunk) in code.chunks_exact(OP_SIZE).enumerate() {
        let bytes: [u8; OP_SIZE] = chunk.try_into().expect("chunks_exact yields full chunks");
        let Some(op) = Op::from_bytes(&bytes) else {
            break;
        };
        let _ = writeln!(out, "  {step:04}  {}", format_op(&op));
    }

    out
}

fn format_op(op: &Op) -> String {
    match op.opcode {
        Opcode::PushConst => {
            let tag = ValueType::from_u8(op.a)
                .map(ValueType::name)
                .unwrap_or("invalid");
            format!(
                "{:<11} {tag}, {} bytes @{:#06x}",
                op.opcode.mnemonic(),
                op.b,
                op.c
            )
        }
        Opcode::PushVar | Opcode::StoreVar => {
            format!("{:<11} {}", op.opcode.mnemonic(), op.c)
        }
        Opcode::Jump | Opcode::JumpIfFalse => {
            format!("{:<11} -> {:04}", op.opcode.mnemonic(), op.c)
        }
        _ => op.opcode.mnemonic().to_owned(),
    }
}
