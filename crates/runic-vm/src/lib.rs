//! Execution engine for compiled Runic objects.
//!
//! [`RunningScript`] is the in-memory image of one loaded binary object:
//! load it, bind caller-supplied values to its declared external variables,
//! run the code section once, read back every variable and the designated
//! result, and optionally save the mutated state for a later session.

mod interp;
mod result;
mod script;

pub use result::ExecutionResult;
pub use script::{BindError, RunningScript};
