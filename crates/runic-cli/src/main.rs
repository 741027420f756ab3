mod cli;
mod commands;

#[cfg(test)]
mod cli_tests;

use cli::{ArCreateParams, ArListParams, DumpParams, RunParams, VarsParams, build_cli};

fn main() {
    let matches = build_cli().get_matches();

    let code = match matches.subcommand() {
        Some(("dump", m)) => commands::dump::run(DumpParams::from_matches(m)),
        Some(("vars", m)) => commands::vars::run(VarsParams::from_matches(m)),
        Some(("run", m)) => commands::run::run(RunParams::from_matches(m)),
        Some(("ar", m)) => match m.subcommand() {
            Some(("create", m)) => commands::archive::create(ArCreateParams::from_matches(m)),
            Some(("list", m)) => commands::archive::list(ArListParams::from_matches(m)),
            _ => unreachable!("clap should have caught this"),
        },
        _ => unreachable!("clap should have caught this"),
    };

    std::process::exit(code);
}
