use std::process::ExitCode;

use clap::Parser;

use nmp::cli::Cli;

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    nmp::runtime::run(Cli::parse())
}
