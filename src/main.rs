//! Battery Monitor CLI
//!
//! - `battery-monitor monitor` - run migrations, then sample the battery
//!   until interrupted
//! - `battery-monitor analyze [--port N]` - serve the analysis web UI
//! - `battery-monitor migrate` - run database migrations and exit
//!
//! # Configuration
//!
//! Settings come from `config.toml` (user config dir or working directory),
//! overridable via `BATTERY_MONITOR_*` environment variables; `RUST_LOG`
//! overrides the log filter.

use battery_monitor::api::{self, AppState};
use battery_monitor::battery::SysfsBattery;
use battery_monitor::config::{Config, LoggingConfig};
use battery_monitor::monitor::Sampler;
use battery_monitor::store::SampleStore;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "battery-monitor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sample host battery state and browse the history in a web UI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start battery monitoring
    Monitor,

    /// Analyze data and start the web server
    Analyze {
        /// Port to host the analyser server on
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load_default();
    init_tracing(&config.logging);

    let db_path = config.store.db_path();
    tracing::info!(path = ?db_path, "opening sample database");
    let store = Arc::new(SampleStore::open(&db_path)?);
    store.migrate()?;

    match cli.command {
        Commands::Monitor => {
            let sampler = Arc::new(Sampler::new(
                Arc::new(SysfsBattery::at(&config.monitor.battery_path)),
                store,
                Duration::from_secs(config.monitor.interval_secs),
            ));
            let handle = sampler.handle();

            let task = {
                let sampler = Arc::clone(&sampler);
                tokio::spawn(async move { sampler.run().await })
            };

            api::shutdown_signal().await;
            handle.stop();
            task.await?;
        }
        Commands::Analyze { port } => {
            let port = port.unwrap_or(config.server.port);
            let state = AppState::new(store);
            api::serve(state, &config.server.host, port).await?;
        }
        Commands::Migrate => {
            tracing::info!("migrations ran successfully");
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "battery_monitor={},tower_http=info",
            logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
