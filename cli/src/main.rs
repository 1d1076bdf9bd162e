use std::process::ExitCode;

use clap::Parser;
use clockwork_cli::{commands, logging, messages, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref());

    match commands::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", messages::describe(&err));
            ExitCode::FAILURE
        }
    }
}
