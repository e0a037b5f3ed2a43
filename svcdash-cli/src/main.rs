mod commands;
mod directories;
mod logging;
mod tui;
mod ui;

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, error};

use svcdash_core::config::{ConfigError, DashConfig};
use svcdash_core::filter::{ServiceFilter, StatusTab};
use svcdash_core::model::ServiceAction;

use directories::{build_directory, normalize_addr};

#[derive(Parser)]
#[command(name = "svcdash")]
#[command(about = "Monitor and control host services through a control-plane backend", long_about = None)]
struct Cli {
    /// Backend address, `host:port` or a full URL (overrides the config file)
    #[arg(long, global = true)]
    addr: Option<String>,

    /// Config file to use instead of discovery
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use a simulated in-process backend
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive dashboard (default)
    Tui,
    /// Print the service list once
    List {
        /// all, active, inactive or failed
        #[arg(long, value_parser = parse_tab)]
        status: Option<StatusTab>,
        /// Case-insensitive match on name or description
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    Start {
        #[arg(required = true)]
        services: Vec<String>,
    },
    Stop {
        #[arg(required = true)]
        services: Vec<String>,
    },
    Restart {
        #[arg(required = true)]
        services: Vec<String>,
    },
    /// Check configuration and backend conformance
    Doctor,
}

fn parse_tab(s: &str) -> Result<StatusTab, String> {
    StatusTab::parse(s).ok_or_else(|| format!("unknown status '{}'", s))
}

/// Explicit `--config`, else discovery, else defaults; `--addr` wins over all.
fn load_config(cli: &Cli) -> Result<(Option<PathBuf>, DashConfig), ConfigError> {
    let (path, config) = match &cli.config {
        Some(path) => (Some(path.clone()), DashConfig::load(path)?),
        None => {
            let cwd = std::env::current_dir()?;
            match DashConfig::discover(&cwd) {
                Ok((path, config)) => (Some(path), config),
                Err(ConfigError::NotFound { .. }) => (None, DashConfig::default()),
                Err(e) => return Err(e),
            }
        }
    };

    let config = match &cli.addr {
        Some(addr) => config.with_backend_url(normalize_addr(addr))?,
        None => config,
    };
    Ok((path, config))
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let (config_path, config) = match load_config(&cli) {
        Ok(loaded) => loaded,
        Err(e) => fail(e),
    };

    let directory = match build_directory(&config, cli.demo) {
        Ok(directory) => directory,
        Err(e) => fail(e),
    };

    let command = cli.command.unwrap_or(Commands::Tui);
    if let Commands::Tui = command {
        let _guard = logging::init_tui(&config.logging);
        debug!(config = ?config_path, backend = config.base_url(), "starting dashboard");
        return tui::run_tui(&config, directory).await;
    }

    logging::init_cli(&config.logging);
    debug!(config = ?config_path, backend = config.base_url(), "running command");

    let ok = match command {
        Commands::Tui => true,
        Commands::List {
            status,
            search,
            json,
        } => {
            let filter = ServiceFilter::new()
                .with_tab(status.unwrap_or_default())
                .with_search(search.unwrap_or_default());
            match commands::run_list(directory.as_ref(), &filter, json).await {
                Ok(()) => true,
                Err(e) => {
                    error!(error = %e, "failed to list services");
                    eprintln!("Error: {}", e);
                    false
                }
            }
        }
        Commands::Start { services } => {
            commands::run_control(directory.as_ref(), ServiceAction::Start, &services).await
        }
        Commands::Stop { services } => {
            commands::run_control(directory.as_ref(), ServiceAction::Stop, &services).await
        }
        Commands::Restart { services } => {
            commands::run_control(directory.as_ref(), ServiceAction::Restart, &services).await
        }
        Commands::Doctor => {
            commands::run_doctor(config_path.as_deref(), &config, directory.as_ref()).await
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
