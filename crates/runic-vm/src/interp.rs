//! Stack-machine interpreter for the code section.
//!
//! Execution is best-effort: faults (divide by zero, operand type
//! confusion, bad fetches) are reported through the diagnostic sink, never
//! as returned errors or panics. A fatal diagnostic stops the run and
//! leaves the variable overlay as of the last completed instruction.
//! Integer arithmetic wraps like the hardware the original code ran on.

use std::cmp::Ordering;

use runic_core::{Diagnostic, DiagnosticCode, DiagnosticSink, Position, Value, ValueType};
use runic_object::{OP_SIZE, Op, ObjectImage, Opcode};

use super::result::ExecutionResult;

pub(crate) fn execute(
    image: &ObjectImage,
    overlay: &mut Vec<Option<Value>>,
    sink: &mut dyn DiagnosticSink,
) -> ExecutionResult {
    let mut machine = Machine {
        image,
        overlay,
        sink,
        stack: Vec::new(),
        ip: 0,
        current: 0,
        halted: false,
        result: None,
    };

    while !machine.halted {
        let Some(op) = machine.fetch() else { break };
        machine.step(op);
    }

    match machine.result.take() {
        Some(value) => ExecutionResult::new(value),
        None => image
            .header()
            .return_type()
            .and_then(|tag| Value::zero(tag).ok())
            .map(ExecutionResult::new)
            .unwrap_or_default(),
    }
}

struct Machine<'a> {
    image: &'a ObjectImage,
    overlay: &'a mut Vec<Option<Value>>,
    sink: &'a mut dyn DiagnosticSink,
    stack: Vec<Value>,
    /// Index of the next instruction.
    ip: u32,
    /// Index of the instruction being executed, for diagnostics.
    current: u32,
    halted: bool,
    result: Option<Value>,
}

impl Machine<'_> {
    fn fetch(&mut self) -> Option<Op> {
        let offset =
            self.image.header().code_start as u64 + self.ip as u64 * OP_SIZE as u64;
        let Some(bytes) = self.image.pool_bytes(offset, OP_SIZE) else {
            self.fatal(
                DiagnosticCode::BadInstruction,
                format!("instruction fetch at {} is out of bounds", self.ip),
            );
            return None;
        };
        let chunk: [u8; OP_SIZE] = bytes.try_into().expect("fetch is exactly one instruction");
        let Some(op) = Op::from_bytes(&chunk) else {
            self.fatal(
                DiagnosticCode::BadInstruction,
                format!("undecodable opcode {:#04x}", chunk[0]),
            );
            return None;
        };
        self.current = self.ip;
        self.ip += 1;
        Some(op)
    }

    fn step(&mut self, op: Op) {
        match op.opcode {
            Opcode::Nop => {}
            Opcode::Halt => self.halted = true,
            Opcode::Return => {
                if let Some(value) = self.pop() {
                    self.result = Some(value);
                    self.halted = true;
                }
            }
            Opcode::Pop => {
                self.pop();
            }
            Opcode::Jump => self.ip = op.c,
            Opcode::JumpIfFalse => {
                if let Some(condition) = self.pop_boolean()
                    && !condition
                {
                    self.ip = op.c;
                }
            }
            Opcode::PushConst => self.push_const(op),
            Opcode::PushVar => self.push_var(op.c),
            Opcode::StoreVar => self.store_var(op.c),
            Opcode::Neg => self.negate(),
            Opcode::Not => {
                if let Some(value) = self.pop_boolean() {
                    self.stack.push(Value::Boolean(!value));
                }
            }
            Opcode::And | Opcode::Or => self.logical(op.opcode),
            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Mod
            | Opcode::Pow => self.arithmetic(op.opcode),
            Opcode::Eq | Opcode::Ne => self.equality(op.opcode),
            Opcode::Lt | Opcode::Le | Opcode::Gt | Opcode::Ge => self.ordering(op.opcode),
        }
    }

    fn push_const(&mut self, op: Op) {
        let Some(tag) = ValueType::from_u8(op.a) else {
            self.fatal(
                DiagnosticCode::BadInstruction,
                format!("push.const with unknown tag {:#04x}", op.a),
            );
            return;
        };
        let Some(bytes) = self.image.pool_bytes(op.c as u64, op.b as usize) else {
            self.fatal(
                DiagnosticCode::CorruptObject,
                format!("constant reference {}+{} is out of bounds", op.c, op.b),
            );
            return;
        };
        match Value::decode_payload(tag, bytes) {
            Ok(value) => self.stack.push(value),
            Err(err) => self.fatal(DiagnosticCode::CorruptObject, err.to_string()),
        }
    }

    fn push_var(&mut self, index: u32) {
        if index >= self.image.variable_count() as u32 {
            self.fatal(
                DiagnosticCode::CorruptObject,
                format!("variable index {index} is out of range"),
            );
            return;
        }
        let value = self.overlay[index as usize]
            .clone()
            .unwrap_or_else(|| self.image.variable_value(index as u16));
        self.stack.push(value);
    }

    fn store_var(&mut self, index: u32) {
        if index >= self.image.variable_count() as u32 {
            self.fatal(
                DiagnosticCode::CorruptObject,
                format!("variable index {index} is out of range"),
            );
            return;
        }
        let Some(value) = self.pop() else { return };

        let declared = self.image.variable_type(index as u16);
        let stored = match (declared, value) {
            (ValueType::Float, Value::Integer(i)) => Value::Float(i as f64),
            (declared, value) if value.value_type() == declared => value,
            (declared, value) => {
                self.fatal(
                    DiagnosticCode::TypeMismatch,
                    format!(
                        "cannot store {} into {declared} variable",
                        value.value_type()
                    ),
                );
                return;
            }
        };
        self.overlay[index as usize] = Some(stored);
    }

    fn negate(&mut self) {
        let Some(value) = self.pop() else { return };
        match value {
            Value::Integer(i) => self.stack.push(Value::Integer(i.wrapping_neg())),
            Value::Float(f) => self.stack.push(Value::Float(-f)),
            other => self.fatal(
                DiagnosticCode::TypeMismatch,
                format!("cannot negate a {}", other.value_type()),
            ),
        }
    }

    fn logical(&mut self, opcode: Opcode) {
        let Some(right) = self.pop_boolean() else { return };
        let Some(left) = self.pop_boolean() else { return };
        let value = match opcode {
            Opcode::And => left && right,
            _ => left || right,
        };
        self.stack.push(Value::Boolean(value));
    }

    fn arithmetic(&mut self, opcode: Opcode) {
        let Some(right) = self.pop() else { return };
        let Some(left) = self.pop() else { return };

        if opcode == Opcode::Add
            && let (Value::String(a), Value::String(b)) = (&left, &right)
        {
            self.stack.push(Value::String(format!("{a}{b}")));
            return;
        }

        let Some(pair) = numeric_pair(&left, &right) else {
            self.fatal(
                DiagnosticCode::TypeMismatch,
                format!(
                    "cannot apply {} to {} and {}",
                    opcode.mnemonic(),
                    left.value_type(),
                    right.value_type()
                ),
            );
            return;
        };

        match pair {
            Nums::Ints(a, b) => {
                if matches!(opcode, Opcode::Div | Opcode::Mod) && b == 0 {
                    let operation = if opcode == Opcode::Div {
                        "division"
                    } else {
                        "modulo"
                    };
                    self.fatal(
                        DiagnosticCode::DivideByZero,
                        format!("integer {operation} by zero"),
                    );
                    return;
                }
                let value = match opcode {
                    Opcode::Add => a.wrapping_add(b),
                    Opcode::Sub => a.wrapping_sub(b),
                    Opcode::Mul => a.wrapping_mul(b),
                    Opcode::Div => a.wrapping_div(b),
                    Opcode::Mod => a.wrapping_rem(b),
                    _ => ipow(a, b),
                };
                self.stack.push(Value::Integer(value));
            }
            Nums::Floats(a, b) => {
                let value = match opcode {
                    Opcode::Add => a + b,
                    Opcode::Sub => a - b,
                    Opcode::Mul => a * b,
                    Opcode::Div => a / b,
                    Opcode::Mod => a % b,
                    _ => a.powf(b),
                };
                self.stack.push(Value::Float(value));
            }
        }
    }

    fn equality(&mut self, opcode: Opcode) {
        let Some(right) = self.pop() else { return };
        let Some(left) = self.pop() else { return };

        let equal = match (&left, &right) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => match numeric_pair(&left, &right) {
                Some(Nums::Ints(a, b)) => a == b,
                Some(Nums::Floats(a, b)) => a == b,
                None => {
                    self.comparison_mismatch(&left, &right);
                    return;
                }
            },
        };
        let value = if opcode == Opcode::Eq { equal } else { !equal };
        self.stack.push(Value::Boolean(value));
    }

    fn ordering(&mut self, opcode: Opcode) {
        let Some(right) = self.pop() else { return };
        let Some(left) = self.pop() else { return };

        // NaN compares as unordered: every ordering test yields false
        let order: Option<Ordering> = match (&left, &right) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => match numeric_pair(&left, &right) {
                Some(Nums::Ints(a, b)) => Some(a.cmp(&b)),
                Some(Nums::Floats(a, b)) => a.partial_cmp(&b),
                None => {
                    self.comparison_mismatch(&left, &right);
                    return;
                }
            },
        };

        let value = match order {
            None => false,
            Some(order) => match opcode {
                Opcode::Lt => order == Ordering::Less,
                Opcode::Le => order != Ordering::Greater,
                Opcode::Gt => order == Ordering::Greater,
                _ => order != Ordering::Less,
            },
        };
        self.stack.push(Value::Boolean(value));
    }

    fn comparison_mismatch(&mut self, left: &Value, right: &Value) {
        self.fatal(
            DiagnosticCode::TypeMismatch,
            format!(
                "cannot compare {} with {}",
                left.value_type(),
                right.value_type()
            ),
        );
    }

    fn pop(&mut self) -> Option<Value> {
        let value = self.stack.pop();
        if value.is_none() {
            self.fatal(
                DiagnosticCode::StackUnderflow,
                "value stack is empty".to_owned(),
            );
        }
        value
    }

    fn pop_boolean(&mut self) -> Option<bool> {
        match self.pop()? {
            Value::Boolean(b) => Some(b),
            other => {
                self.fatal(
                    DiagnosticCode::TypeMismatch,
                    format!("expected a boolean, got {}", other.value_type()),
                );
                None
            }
        }
    }

    fn fatal(&mut self, code: DiagnosticCode, message: String) {
        self.sink.report(
            Diagnostic::fatal(code, message).with_position(Position::instruction(self.current)),
        );
        self.halted = true;
    }
}

enum Nums {
    Ints(i64, i64),
    Floats(f64, f64),
}

/// Pair up numeric operands, promoting to float when either side is one.
fn numeric_pair(left: &Value, right: &Value) -> Option<Nums> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(Nums::Ints(*a, *b)),
        (Value::Float(a), Value::Float(b)) => Some(Nums::Floats(*a, *b)),
        (Value::Integer(a), Value::Float(b)) => Some(Nums::Floats(*a as f64, *b)),
        (Value::Float(a), Value::Integer(b)) => Some(Nums::Floats(*a, *b as f64)),
        _ => None,
    }
}

/// Integer power. A negative exponent truncates toward zero, so only
/// bases 1 and -1 survive it.
fn ipow(base: i64, exp: i64) -> i64 {
    if exp < 0 {
        match base {
            1 => 1,
            -1 => {
                if exp % 2 == 0 {
                    1
                } else {
                    -1
                }
            }
            _ => 0,
        }
    } else {
        base.wrapping_pow(u32::try_from(exp).unwrap_or(u32::MAX))
    }
}
