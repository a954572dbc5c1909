mod cli;
mod commands;
mod logging;

use std::{fs, process::ExitCode};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use crate::cli::{Cli, Command};

fn run(cli: Cli) -> Result<ExitCode> {
    let scheme = commands::resolve_scheme(cli.scheme_version)?;
    match cli.command {
        Command::Commit {
            records,
            from,
            to,
            batch_id,
            description,
            output,
        } => {
            let log = commands::load_records(&records)?;
            let result =
                commands::commit(&log, from, to, batch_id, description, scheme, Utc::now())?;
            let json = serde_json::to_string_pretty(&result)?;
            match output {
                Some(path) => fs::write(&path, json)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{}", json),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify {
            records,
            index,
            proof,
            root,
        } => {
            let log = commands::load_records(&records)?;
            if commands::verify(&log, index, &proof, &root, scheme)? {
                println!("verified");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("not verified");
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Leaf { records, index } => {
            let log = commands::load_records(&records)?;
            println!("{}", commands::leaf(&log, index, scheme)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init_tracing() {
        eprintln!("failed to initialise logging: {:#}", e);
    }
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
