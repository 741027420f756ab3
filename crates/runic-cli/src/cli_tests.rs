use std::path::PathBuf;

use runic_core::{Value, ValueType};
use runic_object::ObjectBuilder;

use crate::cli::{ArCreateParams, RunParams, build_cli};
use crate::commands;

#[test]
fn run_arguments_parse() {
    let matches = build_cli()
        .try_get_matches_from([
            "runic", "run", "demo.rob", "--set", "a=1", "--set", "b=two", "--save", "out.rob",
            "--json",
        ])
        .unwrap();

    let (name, sub) = matches.subcommand().unwrap();
    assert_eq!(name, "run");

    let params = RunParams::from_matches(sub);
    assert_eq!(params.object, PathBuf::from("demo.rob"));
    assert_eq!(params.bindings, ["a=1", "b=two"]);
    assert_eq!(params.save, Some(PathBuf::from("out.rob")));
    assert!(params.json);
}

#[test]
fn ar_create_requires_inputs() {
    assert!(
        build_cli()
            .try_get_matches_from(["runic", "ar", "create", "out.roa"])
            .is_err()
    );

    let matches = build_cli()
        .try_get_matches_from(["runic", "ar", "create", "out.roa", "a.bin", "b.bin"])
        .unwrap();
    let (_, ar) = matches.subcommand().unwrap();
    let (name, sub) = ar.subcommand().unwrap();
    assert_eq!(name, "create");

    let params = ArCreateParams::from_matches(sub);
    assert_eq!(params.inputs.len(), 2);
}

#[test]
fn a_subcommand_is_required() {
    assert!(build_cli().try_get_matches_from(["runic"]).is_err());
}

fn write_sample_object(dir: &tempfile::TempDir) -> PathBuf {
    let mut builder = ObjectBuilder::new();
    builder.set_return_type(ValueType::Integer).unwrap();
    builder
        .add_extern_variable("count", ValueType::Integer, Some(Value::Integer(0)))
        .unwrap();
    let path = dir.path().join("sample.rob");
    std::fs::write(&path, builder.finish().unwrap()).unwrap();
    path
}

#[test]
fn run_command_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let object = write_sample_object(&dir);

    let ok = commands::run::run(RunParams {
        object: object.clone(),
        bindings: vec!["count=42".to_owned()],
        save: None,
        json: true,
    });
    assert_eq!(ok, 0);

    let missing = commands::run::run(RunParams {
        object: dir.path().join("nope.rob"),
        bindings: vec![],
        save: None,
        json: false,
    });
    assert_eq!(missing, 1);

    let malformed = commands::run::run(RunParams {
        object,
        bindings: vec!["count".to_owned()],
        save: None,
        json: false,
    });
    assert_eq!(malformed, 2);
}

#[test]
fn run_command_rejects_bad_binding_type() {
    let dir = tempfile::tempdir().unwrap();
    let object = write_sample_object(&dir);

    let code = commands::run::run(RunParams {
        object,
        bindings: vec!["count=not-a-number".to_owned()],
        save: None,
        json: false,
    });
    assert_eq!(code, 1);
}
