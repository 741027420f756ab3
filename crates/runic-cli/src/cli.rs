//! Command-line definition and parameter extraction.

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command};

pub fn build_cli() -> Command {
    Command::new("runic")
        .about("Inspect, run, and archive compiled Runic objects")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("dump")
                .about("Print the header, variable table, and code of an object")
                .arg(Arg::new("object").value_name("OBJECT").required(true)),
        )
        .subcommand(
            Command::new("vars")
                .about("List the external variables of an object")
                .arg(Arg::new("object").value_name("OBJECT").required(true))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Emit JSON instead of a plain listing"),
                ),
        )
        .subcommand(
            Command::new("run")
                .about("Execute an object with optional variable bindings")
                .arg(Arg::new("object").value_name("OBJECT").required(true))
                .arg(
                    Arg::new("set")
                        .long("set")
                        .value_name("NAME=VALUE")
                        .action(ArgAction::Append)
                        .help("Bind a declared variable before running (repeatable)"),
                )
                .arg(
                    Arg::new("save")
                        .long("save")
                        .value_name("PATH")
                        .help("Save the post-run variable state to PATH"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Emit JSON instead of a plain listing"),
                ),
        )
        .subcommand(
            Command::new("ar")
                .about("Create or inspect function archives")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("create")
                        .about("Bundle compiled function blobs into an archive")
                        .arg(Arg::new("output").value_name("ARCHIVE").required(true))
                        .arg(
                            Arg::new("inputs")
                                .value_name("INPUT")
                                .required(true)
                                .num_args(1..),
                        ),
                )
                .subcommand(
                    Command::new("list")
                        .about("List the functions stored in an archive")
                        .arg(Arg::new("archive").value_name("ARCHIVE").required(true)),
                ),
        )
}

pub struct DumpParams {
    pub object: PathBuf,
}

impl DumpParams {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            object: required_path(matches, "object"),
        }
    }
}

pub struct VarsParams {
    pub object: PathBuf,
    pub json: bool,
}

impl VarsParams {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            object: required_path(matches, "object"),
            json: matches.get_flag("json"),
        }
    }
}

pub struct RunParams {
    pub object: PathBuf,
    pub bindings: Vec<String>,
    pub save: Option<PathBuf>,
    pub json: bool,
}

impl RunParams {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            object: required_path(matches, "object"),
            bindings: matches
                .get_many::<String>("set")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            save: matches.get_one::<String>("save").map(PathBuf::from),
            json: matches.get_flag("json"),
        }
    }
}

pub struct ArCreateParams {
    pub output: PathBuf,
    pub inputs: Vec<PathBuf>,
}

impl ArCreateParams {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            output: required_path(matches, "output"),
            inputs: matches
                .get_many::<String>("inputs")
                .expect("required by clap")
                .map(PathBuf::from)
                .collect(),
        }
    }
}

pub struct ArListParams {
    pub archive: PathBuf,
}

impl ArListParams {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            archive: required_path(matches, "archive"),
        }
    }
}

fn required_path(matches: &ArgMatches, id: &str) -> PathBuf {
    matches
        .get_one::<String>(id)
        .expect("required by clap")
        .into()
}
