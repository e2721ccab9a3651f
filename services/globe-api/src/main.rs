//! Globe viewer API service.
//!
//! Serves page layout, render requests for globe scenes, layer and camera
//! controls, static assets, and metrics.

use anyhow::{Context, Result};
use clap::Parser;
use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use globe_api::config::AppConfig;
use globe_api::display::DisplayStatus;
use globe_api::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "globe-api")]
#[command(about = "Interactive globe viewer API server")]
struct Args {
    /// Listen address
    #[arg(short, long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Scene configuration file (YAML)
    #[arg(short, long, env = "GLOBE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding rasters, the stylesheet and the info fragment
    #[arg(long, env = "ASSETS_DIR", default_value = "assets")]
    assets_dir: PathBuf,

    /// Number of tokio worker threads (default: number of CPU cores)
    #[arg(long)]
    worker_threads: Option<usize>,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    } else if let Ok(threads_str) = env::var("TOKIO_WORKER_THREADS") {
        if let Ok(threads) = threads_str.parse::<usize>() {
            runtime_builder.worker_threads(threads);
        }
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(args))?;
    Ok(())
}

async fn async_main(args: Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("installing Prometheus recorder")?;

    info!("Prometheus metrics exporter initialized");
    info!(assets = %args.assets_dir.display(), "Starting globe viewer API server");

    let config = AppConfig::load(args.config.as_deref())?;
    let display = DisplayStatus::detect();
    let state = Arc::new(AppState::new(config, args.assets_dir.clone(), display));

    let app = globe_api::build_router(state, prometheus_handle);

    let addr: SocketAddr = args.listen.parse()?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
