mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
};

use gridrail_core::config::{self, AppConfig};
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "gridrail")]
#[command(about = "Validate rail environments and compile solver actions into trajectories")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a fact file, or every fact file under a directory.
    Check { path: PathBuf },
    /// Compile solver actions against an environment.
    Compile {
        environment: PathBuf,
        actions: PathBuf,
        /// Store a JSON report under the configured report root.
        #[arg(long)]
        save: bool,
        /// Print the simulation as JSON instead of table rows.
        #[arg(long)]
        json: bool,
    },
    /// Re-emit an environment in canonical fact order.
    Normalize {
        environment: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    init_logging(&config)?;

    match cli.command {
        Commands::Check { path } => commands::check(&config, path).await,
        Commands::Compile {
            environment,
            actions,
            save,
            json,
        } => commands::compile(&config, environment, actions, save, json).await,
        Commands::Normalize { environment, out } => commands::normalize(environment, out).await,
    }
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let log_dir = if config.log_dir.is_absolute() {
        config.log_dir.clone()
    } else {
        std::env::current_dir()?.join(&config.log_dir)
    };
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("gridrail.log");

    let env_filter = EnvFilter::from_default_env();

    // Trajectory tables go to stdout, so console logging uses stderr.
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_ansi(false)
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
