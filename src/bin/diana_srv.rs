#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use diana::{Server, logging};

#[derive(Parser, Debug)]
#[command(name = "diana-srv", version, about = "Serve HTTP from a TOML server config")]
struct Cli {
    /// Path to the server configuration (toml)
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init("diana=info,diana_srv=info");

    let server = match Server::from_path(&cli.config) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(1);
        }
    };
    let addr = server.config().full_addr();
    if let Err(e) = Arc::new(server).run().await {
        eprintln!("failed to serve on {addr}: {e}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}
