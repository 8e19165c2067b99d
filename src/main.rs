//! Aukera schedule server binary.

use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use aukera::{
    api, config,
    services::{DiskReader, OsActiveHours, SchedulerService},
    AppState,
};

#[derive(Parser)]
#[command(name = config::SERVICE_NAME, about = "Local maintenance-window schedule server")]
struct Args {
    /// Run in debug mode
    #[arg(long)]
    debug: bool,

    /// Listening port
    #[arg(long, default_value_t = config::SERVICE_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug {
        "aukera=debug,tower_http=debug"
    } else {
        "aukera=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    let (file_layer, log_err) = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(config::log_path())
    {
        Ok(file) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            ),
            None,
        ),
        Err(err) => (None, Some(err)),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();
    if let Some(err) = log_err {
        tracing::warn!(path = %config::log_path().display(), %err, "unable to open log file");
    }

    tracing::info!("starting {} v{}", config::SERVICE_NAME, env!("CARGO_PKG_VERSION"));

    let conf_dir = config::conf_dir();
    if !conf_dir.exists() {
        tracing::warn!(path = %conf_dir.display(), "configuration directory does not exist, attempting creation");
        if let Err(err) = std::fs::create_dir_all(&conf_dir) {
            tracing::warn!(%err, "unable to create configuration directory");
        }
    }

    let state = AppState {
        scheduler: Arc::new(SchedulerService::new(
            conf_dir,
            Arc::new(DiskReader),
            Arc::new(OsActiveHours),
        )),
    };
    let app = api::router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    tracing::info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
