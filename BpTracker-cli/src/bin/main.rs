use std::io;
use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bp_tracker_cli::{run, Args};
use bp_tracker_domain::config::DataFileConfig;

/// Log to stderr so reports on stdout stay clean. `RUST_LOG` wins over
/// `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(env_filter)
        .init();
}

fn main() -> ExitCode {
    // Load environment variables from .env file
    let dotenv_loaded = dotenv().is_ok();

    let args = Args::parse();
    init_tracing(args.verbose);
    if !dotenv_loaded {
        debug!(".env file not found, using the process environment");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run(&args, DataFileConfig::from_env(), &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
