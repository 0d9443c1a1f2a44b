use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rove::app::{App, LaunchOptions};
use rove::logging;

/// Keyboard-driven modal browser shell.
#[derive(Debug, Parser)]
#[command(name = "rove", version)]
struct Cli {
	/// rc file to read instead of the default one
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// URIs or search-engine queries to open, one tab each
	#[arg(value_name = "URI")]
	uris: Vec<String>,
}

fn main() {
	if let Err(err) = run() {
		eprintln!("{:#}", err);
		std::process::exit(1);
	}
}

fn run() -> Result<()> {
	let cli = Cli::parse();
	logging::init_logging().context("initialize logging failed")?;
	let app = App::new().context("initialize app failed")?;
	app.run(LaunchOptions { config: cli.config, uris: cli.uris }).context("run app failed")
}
