use runic_core::Diagnostics;
use runic_vm::RunningScript;

use crate::cli::RunParams;
use super::common::{parse_value, print_variables, variables_json};

pub fn run(params: RunParams) -> i32 {
    let mut script = match RunningScript::load(&params.object) {
        Ok(script) => script,
        Err(err) => {
            eprintln!("runic: {}: {err}", params.object.display());
            return 1;
        }
    };

    for binding in &params.bindings {
        let Some((name, raw)) = binding.split_once('=') else {
            eprintln!("runic: --set expects NAME=VALUE, got \"{binding}\"");
            return 2;
        };
        if let Err(err) = script.set_variable(name, parse_value(raw)) {
            eprintln!("runic: {err}");
            return 1;
        }
    }

    let mut sink = Diagnostics::new();
    let result = script.run(&mut sink);
    for diagnostic in &sink {
        eprintln!("runic: {diagnostic}");
    }

    if params.json {
        let payload = serde_json::json!({
            "result": {
                "type": result.value_type().name(),
                "value": result.value(),
            },
            "variables": variables_json(&script),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).expect("values encode as JSON")
        );
    } else {
        match result.value() {
            Some(value) => println!("result: {} = {value}", result.value_type()),
            None => println!("result: none"),
        }
        if script.variable_size() > 0 {
            println!("variables:");
            print_variables(&script);
        }
    }

    if let Some(path) = &params.save {
        if let Err(err) = script.save(path) {
            eprintln!("runic: {}: {err}", path.display());
            return 1;
        }
    }

    if sink.has_fatal() { 1 } else { 0 }
}
