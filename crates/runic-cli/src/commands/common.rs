//! Helpers shared by the object-facing commands.

use runic_core::Value;
use runic_vm::RunningScript;

/// Parse a `--set` value literal: `true`/`false`, then integer, then float,
/// anything else a string. The engine's bind rules arbitrate the final type.
pub fn parse_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        _ => {
            if let Ok(i) = raw.parse::<i64>() {
                return Value::Integer(i);
            }
            if let Ok(f) = raw.parse::<f64>() {
                return Value::Float(f);
            }
            Value::String(raw.to_owned())
        }
    }
}

/// Plain one-line-per-variable listing.
pub fn print_variables(script: &RunningScript) {
    for index in 0..script.variable_size() as u16 {
        let (name, value) = script.variable(index).expect("index within count");
        let tag = script.variable_type(index).expect("index within count");
        let rendered = match &value {
            Value::String(s) => format!("{s:?}"),
            other => other.to_string(),
        };
        println!("  {name}: {tag} = {rendered}");
    }
}

/// Variables as a JSON object, keyed by name.
pub fn variables_json(script: &RunningScript) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for index in 0..script.variable_size() as u16 {
        let (name, value) = script.variable(index).expect("index within count");
        map.insert(
            name,
            serde_json::to_value(&value).expect("values encode as JSON"),
        );
    }
    serde_json::Value::Object(map)
}
