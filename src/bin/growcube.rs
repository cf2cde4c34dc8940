//! GrowCube CLI binary.
//!
//! Reads the status and sensor readings of a GrowCube device and prints
//! them to stdout. A partial status (device too slow, channel missing) is
//! still printed and exits with code 0.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use growcube::{Config, Session, VERSION};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "growcube")]
#[command(version = VERSION)]
#[command(
    about = "Get the status and sensor readings of the GrowCube device at ADDRESS",
    long_about = None
)]
struct Cli {
    /// Device IP address or hostname
    address: Option<String>,

    /// Device TCP port
    #[arg(long)]
    port: Option<u16>,

    /// Maximum time to wait for readings in seconds (GrowCube typically sends readings within 10s)
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Validate connection to GrowCube without waiting for sensor readings
    #[arg(short, long)]
    connect: bool,

    /// Send info-level log output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Send log output to a file
    #[arg(short, long)]
    log: bool,

    /// Filename to use for log output
    #[arg(short = 'f', long, default_value = "growcube.log")]
    logfile: PathBuf,

    /// Config file path (default: <config_dir>/growcube/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the status report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(address) = cli.address {
        config.device.host = address;
    }
    if let Some(port) = cli.port {
        config.device.port = port;
    }
    if let Some(timeout) = cli.timeout {
        config.device.timeout_secs = timeout;
    }
    if cli.connect {
        config.device.connect_only = true;
    }

    tracing::info!(
        "Requesting status from {} (timeout {}s, connect only: {})",
        config.device.addr(),
        config.device.timeout_secs,
        config.device.connect_only
    );

    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(async { Session::new(config.device).run().await })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.status);
        if !report.is_complete() {
            println!("Outcome: {:?} (status is partial)", report.outcome);
        }
    }

    Ok(())
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "error"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if cli.log {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&cli.logfile)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stdout)
            .init();
    }

    Ok(())
}
