// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use xdg_shift::{home_dir, Migrator, OsFamily, Registry, XdgPaths};

use anyhow::Result;
use clap::Parser;
use std::{path::PathBuf, process::exit};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "xdg-migrate [options] [tool]...",
    version
)]
struct Cli {
    /// Tools to migrate (default: all of mycli, pgcli, docker, k9s).
    #[arg(value_name = "tool")]
    pub tools: Vec<String>,

    /// Show planned operations without touching the filesystem.
    #[arg(long)]
    pub dry_run: bool,

    /// Also create the four base XDG directories themselves.
    #[arg(long)]
    pub init_base: bool,

    /// Directory of config templates overriding the built-in ones.
    #[arg(long, value_name = "path")]
    pub template_dir: Option<String>,

    /// Where to write the generated environment script.
    #[arg(long, value_name = "path")]
    pub script_out: Option<String>,
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

    let mut migrator = Migrator::new(paths, OsFamily::detect(), home);
    if cli.dry_run {
        info!("dry run: no filesystem changes will be made");
        migrator = migrator.dry_run();
    }
    if let Some(raw) = cli.template_dir {
        migrator = migrator.template_dir(expand(&raw)?);
    }
    if cli.init_base {
        migrator.init_base_dirs();
    }

    let script_out = match cli.script_out {
        Some(raw) => Some(expand(&raw)?),
        None => None,
    };
    let summary = migrator.run(&registry, &cli.tools, script_out)?;

    println!("\nmigration results:");
    for (tool, success) in &summary.results {
        println!("  {tool:<10} {}", if *success { "ok" } else { "failed" });
    }
    println!("\nenvironment script: {}", summary.script_path.display());
    println!("apply it with: source {}", summary.script_path.display());

    Ok(summary.all_succeeded())
}

fn expand(raw: &str) -> Result<PathBuf> {
    Ok(PathBuf::from(shellexpand::full(raw)?.into_owned()))
}
