//! Core data structures for Runic.
//!
//! This crate contains:
//! - The typed value model shared by the on-disk format and the binding
//!   boundary (`Value`, `ValueType`)
//! - The diagnostic channel used for encode-time and run-time faults
//!   (`Diagnostic`, `DiagnosticSink`, `Diagnostics`)

mod diagnostics;
mod value;

pub use diagnostics::{
    Diagnostic, DiagnosticCode, DiagnosticSink, Diagnostics, NoopSink, Position, Severity,
};
pub use value::{Value, ValueError, ValueType};

#[cfg(test)]
mod value_tests;
