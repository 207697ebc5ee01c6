use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod dispatch;
mod render;

use dispatch::run_cli;

#[derive(Parser, Debug)]
#[command(name = "rpmrm")]
#[command(about = "Erase installed packages recorded in an rpm-style database", long_about = None)]
struct Cli {
    /// Directory treated as `/` for package files and scripts.
    #[arg(long, env = "RPMRM_ROOT", default_value = "/")]
    root: PathBuf,
    /// Database directory. Defaults to `<root>/var/lib/rpmrm`.
    #[arg(long, env = "RPMRM_DBPATH")]
    dbpath: Option<PathBuf>,
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Trace scripts with `sh -x` and keep their temporary files.
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Erase {
        #[arg(required_unless_present = "offset", conflicts_with = "offset")]
        name: Option<String>,
        #[arg(long)]
        offset: Option<u32>,
        /// Report what would happen without touching files, scripts or the database.
        #[arg(long)]
        test: bool,
        #[arg(long)]
        noscripts: bool,
        /// Erase every installed instance matching the name.
        #[arg(long)]
        all_matches: bool,
    },
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.debug);
    run_cli(cli)
}

fn init_tracing(verbose: u8, debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(verbose, debug)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn default_log_level(verbose: u8, debug: bool) -> &'static str {
    match (verbose, debug) {
        (_, true) | (2.., _) => "debug",
        (1, _) => "info",
        _ => "warn",
    }
}

#[cfg(test)]
mod tests;
