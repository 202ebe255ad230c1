//! switchctl - switch VLAN/port control
//!
//! Entry point for the switchctl command line tool.

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use switchctl::cli::{self, Args};
use switchctl::SnmpSwitch;
use switchctl_common::SwitchControl;

/// Initializes tracing/logging subsystem
///
/// `RUST_LOG` overrides the level picked by `-v`.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

async fn run(args: &Args) -> Result<()> {
    let config = args.session_config();
    let mut switch = SnmpSwitch::connect(&args.host, &config)
        .await
        .with_context(|| format!("connecting to {}", args.host))?;
    debug!(
        driver = switch.driver_name(),
        vlan_creation = config.vlan_creation.as_str(),
        "Connected to {}",
        args.host
    );

    let output = cli::execute(&mut switch, &args.host, &args.command, args.json).await?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
