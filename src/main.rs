#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

use std::process::ExitCode;

use clap::Parser;
use diana::launch::{self, LaunchCommand, Resolution, SystemEnv};
use diana::logging;

/// Exit code when the run command cannot be started, as shells report it.
const SPAWN_FAILURE: u8 = 127;

#[derive(Parser, Debug)]
#[command(
    name = "diana",
    version,
    about = "Run a resource file from ./resource with the configured run command"
)]
struct Cli {
    /// File name inside the resource directory
    #[arg(value_name = "NAME")]
    name: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init("diana=warn");

    let envx = SystemEnv;
    let path = match launch::resolve(&cli.name, &envx) {
        Ok(Resolution::Found(path)) => path,
        Ok(Resolution::Missing(path)) => {
            for line in launch::missing_report(&path) {
                eprintln!("{line}");
            }
            return ExitCode::from(1);
        }
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(1);
        }
    };

    let command = LaunchCommand::from_env(&envx);
    match launch::dispatch(&command, &path) {
        Ok(status) => ExitCode::from(launch::exit_code(status)),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(SPAWN_FAILURE)
        }
    }
}
