// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use xdg_shift::{home_dir, Registry, Verifier, XdgPaths};

use anyhow::Result;
use clap::Parser;
use std::{path::PathBuf, process::exit};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "xdg-verify [options]",
    version
)]
struct Cli {
    /// Restrict checks to the given tools.
    #[arg(long, value_name = "tool", num_args = 1..)]
    pub tools: Vec<String>,

    /// Export the full report as JSON to the given file.
    #[arg(long, value_name = "file")]
    pub export: Option<String>,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    match run() {
        Ok(true) => exit(0),
        Ok(false) => exit(1),
        Err(error) => {
            error!("{error:?}");
            exit(1);
        }
    }
}

fn run() -> Result<bool> {
    let cli = Cli::parse();
    let home = home_dir()?;
    let paths = XdgPaths::from_env()?;
    let registry = Registry::builtin(&paths, &home);

    let mut verifier = Verifier::new(&paths, &registry);
    verifier.run_checks(&cli.tools);
    verifier.print_report();

    if let Some(raw) = cli.export {
        let path = PathBuf::from(shellexpand::full(&raw)?.into_owned());
        verifier.export(&path)?;
        info!("report exported to {}", path.display());
    }

    Ok(verifier.is_compliant())
}
