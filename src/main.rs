use std::path::PathBuf;

use clap::Parser;
use oddsdesk::adapter::notifier::LogObserver;
use oddsdesk::app::{shutdown_signal, App};
use oddsdesk::config::Config;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "oddsdesk", version, about = "Betting market service with idempotent writes")]
struct Cli {
    /// Path to the TOML config file; defaults apply when it is missing
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the listening port
    #[arg(short, long)]
    port: Option<u16>,

    /// Start without the demo sports and events
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = match Config::load_or_default(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.no_seed {
        config.server.seed = false;
    }

    config.init_logging();
    info!(config = %cli.config.display(), "oddsdesk starting");

    let app = App::builder(config)
        .observer(Box::new(LogObserver))
        .build();

    if let Err(e) = app.serve(shutdown_signal()).await {
        error!(error = %e, "Fatal error");
        std::process::exit(1);
    }

    info!("oddsdesk stopped");
}
