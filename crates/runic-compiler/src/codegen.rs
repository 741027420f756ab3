//! Lowering of validated trees to code section instructions.
//!
//! One emit function per statement shape; forward jumps are emitted with a
//! placeholder target and patched once the destination index is known.
//! Failures are mirrored onto the diagnostic channel as fatal diagnostics,
//! and nothing is emitted on failure.

use runic_core::{Diagnostic, DiagnosticCode, DiagnosticSink};
use runic_object::{EncodeError, Op, ObjectBuilder, Opcode};

use super::tree::{BinaryOp, Expr, Program, Stmt, UnaryOp};

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("undeclared variable \"{0}\" in validated tree")]
    UndeclaredVariable(String),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl CompileError {
    fn diagnostic_code(&self) -> DiagnosticCode {
        match self {
            Self::UndeclaredVariable(_) => DiagnosticCode::UnknownVariable,
            Self::Encode(EncodeError::TooManyVariables(_)) => DiagnosticCode::TooManyVariables,
            Self::Encode(EncodeError::UnsupportedType(_)) => DiagnosticCode::UnsupportedType,
            Self::Encode(EncodeError::InitialValueMismatch { .. }) => DiagnosticCode::TypeMismatch,
            Self::Encode(EncodeError::OffsetOverflow(_))
            | Self::Encode(EncodeError::PayloadTooLarge(_)) => DiagnosticCode::OffsetOverflow,
            Self::Encode(EncodeError::Io(_)) => DiagnosticCode::InternalError,
        }
    }
}

/// Compile a validated program into binary object bytes.
pub fn compile(
    program: &Program,
    sink: &mut dyn DiagnosticSink,
) -> Result<Vec<u8>, CompileError> {
    match try_compile(program) {
        Ok(bytes) => Ok(bytes),
        Err(err) => {
            sink.report(Diagnostic::fatal(err.diagnostic_code(), err.to_string()));
            Err(err)
        }
    }
}

fn try_compile(program: &Program) -> Result<Vec<u8>, CompileError> {
    let mut builder = ObjectBuilder::new();
    builder.set_return_type(program.return_type)?;

    for decl in &program.externals {
        builder.add_extern_variable(decl.name.clone(), decl.declared, decl.init.clone())?;
    }

    let mut codegen = Codegen { builder };
    for stmt in &program.body {
        codegen.stmt(stmt)?;
    }
    codegen.builder.push_op(Op::new(Opcode::Halt));
    Ok(codegen.builder.finish()?)
}

struct Codegen {
    builder: ObjectBuilder,
}

impl Codegen {
    fn stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Assign { name, value } => {
                self.expr(value)?;
                let index = self.variable(name)?;
                self.builder.push_op(Op::with_c(Opcode::StoreVar, index));
            }
            Stmt::Expr(expr) => {
                self.expr(expr)?;
                self.builder.push_op(Op::new(Opcode::Pop));
            }
            Stmt::Return(expr) => {
                self.expr(expr)?;
                self.builder.push_op(Op::new(Opcode::Return));
            }
            Stmt::If {
                condition,
                then_body,
                else_body,
            } => {
                self.expr(condition)?;
                let skip_then = self.builder.push_op(Op::with_c(Opcode::JumpIfFalse, 0));
                for stmt in then_body {
                    self.stmt(stmt)?;
                }
                if else_body.is_empty() {
                    let end = self.builder.next_op_index();
                    self.builder.patch_jump(skip_then, end);
                } else {
                    let skip_else = self.builder.push_op(Op::with_c(Opcode::Jump, 0));
                    let else_start = self.builder.next_op_index();
                    self.builder.patch_jump(skip_then, else_start);
                    for stmt in else_body {
                        self.stmt(stmt)?;
                    }
                    let end = self.builder.next_op_index();
                    self.builder.patch_jump(skip_else, end);
                }
            }
            Stmt::While { condition, body } => {
                let top = self.builder.next_op_index();
                self.expr(condition)?;
                let exit = self.builder.push_op(Op::with_c(Opcode::JumpIfFalse, 0));
                for stmt in body {
                    self.stmt(stmt)?;
                }
                self.builder.push_op(Op::with_c(Opcode::Jump, top));
                let end = self.builder.next_op_index();
                self.builder.patch_jump(exit, end);
            }
        }
        Ok(())
    }

    fn expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Literal(value) => {
                let id = self.builder.add_constant(value)?;
                self.builder.push_const_op(id);
            }
            Expr::Variable(name) => {
                let index = self.variable(name)?;
                self.builder.push_op(Op::with_c(Opcode::PushVar, index));
            }
            Expr::Unary { op, operand } => {
                self.expr(operand)?;
                let opcode = match op {
                    UnaryOp::Negate => Opcode::Neg,
                    UnaryOp::Not => Opcode::Not,
                };
                self.builder.push_op(Op::new(opcode));
            }
            Expr::Binary { op, left, right } => {
                self.expr(left)?;
                self.expr(right)?;
                self.builder.push_op(Op::new(opcode_for(*op)));
            }
        }
        Ok(())
    }

    fn variable(&self, name: &str) -> Result<u32, CompileError> {
        self.builder
            .variable_index(name)
            .ok_or_else(|| CompileError::UndeclaredVariable(name.to_owned()))
    }
}

fn opcode_for(op: BinaryOp) -> Opcode {
    match op {
        BinaryOp::Add => Opcode::Add,
        BinaryOp::Subtract => Opcode::Sub,
        BinaryOp::Multiply => Opcode::Mul,
        BinaryOp::Divide => Opcode::Div,
        BinaryOp::Modulo => Opcode::Mod,
        BinaryOp::Power => Opcode::Pow,
        BinaryOp::Equal => Opcode::Eq,
        BinaryOp::NotEqual => Opcode::Ne,
        BinaryOp::Less => Opcode::Lt,
        BinaryOp::LessEqual => Opcode::Le,
        BinaryOp::Greater => Opcode::Gt,
        BinaryOp::GreaterEqual => Opcode::Ge,
        BinaryOp::And => Opcode::And,
        BinaryOp::Or => Opcode::Or,
    }
}
