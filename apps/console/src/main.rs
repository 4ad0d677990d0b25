//! # Mehfil Console Entry Point
//!
//! All logic lives in `mehfil_console`; this only parses arguments and maps
//! the result to an exit code.

use std::process::ExitCode;

use clap::Parser;
use mehfil_console::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match mehfil_console::run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e.message);
            ExitCode::from(2)
        }
    }
}
