//! Gastos main entry point

use anyhow::Context;
use clap::Parser;
use gastos_api::start_server;
use gastos_config::{Config, ConfigError, ConfigErrorSeverity, LoggingConfig};
use gastos_core::{HttpBackend, Tracker};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "gastos")]
#[command(version = "0.1.0")]
#[command(about = "A lightweight web front end for personal expense tracking", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Override server.port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override backend.base_url
    #[arg(long)]
    backend_url: Option<String>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn report(error: &ConfigError) {
    let details = error.to_details();
    match details.severity {
        ConfigErrorSeverity::Warning => log::warn!("{}", details),
        ConfigErrorSeverity::Error => log::error!("{}", details),
    }
}

/// Config file when present, built-in defaults otherwise, then CLI overrides
fn resolve_config(args: &Args, loaded: Result<Config, ConfigError>) -> anyhow::Result<Config> {
    let mut config = match loaded {
        Ok(config) => config,
        Err(e @ ConfigError::FileNotFound { .. }) => {
            report(&e);
            log::warn!("Using default configuration");
            Config::default()
        }
        Err(e) => {
            report(&e);
            return Err(e).with_context(|| format!("loading {}", args.config.display()));
        }
    };

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(url) = &args.backend_url {
        config.backend.base_url = url.clone();
    }

    if let Err(e) = config.validate() {
        report(&e);
        return Err(e).context("invalid configuration");
    }
    Ok(config)
}

fn init_logging(level: &str) {
    // RUST_LOG wins over the configured level
    let env = env_logger::Env::default().default_filter_or(level);
    env_logger::Builder::from_env(env).init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    // The logger level comes from the file, so read it before logging starts
    let loaded = Config::load(&args.config);
    let level = match &loaded {
        Ok(config) => config.logging.level.clone(),
        Err(_) => LoggingConfig::default().level,
    };
    init_logging(&level);

    let config = resolve_config(&args, loaded)?;
    log::info!(
        "Config loaded: backend={}, cache ttl={}s, page size={}",
        config.backend_base_url(),
        config.cache.ttl_secs,
        config.pagination.page_size
    );

    let backend = Arc::new(HttpBackend::from_config(&config));
    let tracker = Arc::new(Tracker::new(backend, config.clone()));

    let rt = Runtime::new()?;
    rt.block_on(start_server(config, tracker))
}
