//! The designated outcome of a run.

use runic_core::{Value, ValueType};

/// One typed value produced by `run`, or nothing when the script halted
/// without a result.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecutionResult {
    value: Option<Value>,
}

impl ExecutionResult {
    pub fn new(value: Value) -> Self {
        Self { value: Some(value) }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// `Unknown` when the run produced no result.
    pub fn value_type(&self) -> ValueType {
        self.value
            .as_ref()
            .map(Value::value_type)
            .unwrap_or(ValueType::Unknown)
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<Value> {
        self.value
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self.value {
            Some(Value::Boolean(b)) => Some(b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.value {
            Some(Value::Integer(i)) => Some(i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self.value {
            Some(Value::Float(f)) => Some(f),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match &self.value {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }
}
