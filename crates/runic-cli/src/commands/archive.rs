use runic_object::Archive;

use crate::cli::{ArCreateParams, ArListParams};

pub fn create(params: ArCreateParams) -> i32 {
    let archive = match Archive::create(&params.inputs) {
        Ok(archive) => archive,
        Err(err) => {
            eprintln!("runic: {err}");
            return 1;
        }
    };

    if let Err(err) = archive.save_to_path(&params.output) {
        eprintln!("runic: {}: {err}", params.output.display());
        return 1;
    }

    println!(
        "{}: {} function(s) archived",
        params.output.display(),
        archive.len()
    );
    0
}

pub fn list(params: ArListParams) -> i32 {
    let archive = match Archive::load_from_path(&params.archive) {
        Ok(archive) => archive,
        Err(err) => {
            eprintln!("runic: {}: {err}", params.archive.display());
            return 1;
        }
    };

    for function in archive.get_functions().values() {
        println!("{}  {} bytes", function.name(), function.code().len());
    }
    0
}
