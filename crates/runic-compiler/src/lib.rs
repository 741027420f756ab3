//! Lowering of validated program trees into binary objects.
//!
//! The front end (lexer, parser, semantic analysis) is an external
//! collaborator; [`tree`] defines the validated tree it hands over, and
//! [`codegen`] turns that tree plus its extern declarations into a byte
//! stream in the binary object layout.

mod codegen;
mod tree;

pub use codegen::{CompileError, compile};
pub use tree::{BinaryOp, Expr, ExternDecl, Program, Stmt, UnaryOp};
