//! Multi-strategy trading orchestrator - main entry point
//!
//! This binary provides three subcommands:
//! - run: Start all strategy loops (paper or live)
//! - weights: Compute recommended strategy weights from recent history
//! - account: Show balances and trade history

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use multistrat::commands;

#[derive(Parser, Debug)]
#[command(name = "multistrat")]
#[command(about = "Multi-strategy crypto trading orchestrator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start all strategy loops
    Run {
        /// Path to configuration file (defaults + environment if omitted)
        #[arg(short, long)]
        config: Option<String>,

        /// Paper trading mode (safe, simulated account)
        #[arg(long)]
        paper: bool,

        /// Live trading mode (CAUTION - REAL MONEY!)
        #[arg(long)]
        live: bool,
    },

    /// Compute recommended strategy weights from recent price history
    Weights {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,

        /// Symbol to analyze (defaults to the configured symbol)
        #[arg(short, long)]
        symbol: Option<String>,

        /// Lookback window, e.g. "30 days ago UTC"
        #[arg(short, long, default_value = "30 days ago UTC")]
        lookback: String,
    },

    /// Show account balances and trade history
    Account {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,

        /// Query the live exchange account instead of the simulated one
        #[arg(long)]
        live: bool,
    },
}

fn setup_logging(verbose: bool, command_name: &str) -> Result<()> {
    std::fs::create_dir_all("logs")?;

    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    // Filter out noisy external crates
    let level = if verbose { "debug" } else { "info" };
    let filter_str = format!(
        "{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,h2=warn",
        level
    );
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized");
    info!("Log file: {}", log_path.display());

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let command_name = match &cli.command {
        Commands::Run { .. } => "run",
        Commands::Weights { .. } => "weights",
        Commands::Account { .. } => "account",
    };

    setup_logging(cli.verbose, command_name)?;

    match cli.command {
        Commands::Run {
            config,
            paper,
            live,
        } => commands::run::run(config, paper, live),

        Commands::Weights {
            config,
            symbol,
            lookback,
        } => commands::weights::run(config, symbol, lookback),

        Commands::Account { config, live } => commands::account::run(config, live),
    }
}
