use runic_vm::RunningScript;

use crate::cli::VarsParams;
use super::common::{print_variables, variables_json};

pub fn run(params: VarsParams) -> i32 {
    let script = match RunningScript::load(&params.object) {
        Ok(script) => script,
        Err(err) => {
            eprintln!("runic: {}: {err}", params.object.display());
            return 1;
        }
    };

    if params.json {
        let json = variables_json(&script);
        println!(
            "{}",
            serde_json::to_string_pretty(&json).expect("values encode as JSON")
        );
    } else {
        println!("{} variables:", script.variable_size());
        print_variables(&script);
    }
    0
}
