use anyhow::Context;
use bridge::routes::routes;
use bridge::store::PlatformStore;
use clap::Parser;
use log::{info, warn};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::SimulatorConfig;
use workflow::runner::CaptureRunner;

mod bridge;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "In-memory field platform for the scan viewer")]
struct Args {
    /// Load simulator settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the listening port
    #[arg(long)]
    port: Option<u16>,
    /// Seed for synthetic captures
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulatorConfig::load(path)?,
        None => SimulatorConfig::default(),
    };
    if let Some(port) = args.port {
        config.bind = SocketAddr::new(config.bind.ip(), port);
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating simulator runtime")?;
    runtime.block_on(serve(config))
}

async fn serve(config: SimulatorConfig) -> anyhow::Result<()> {
    let store = PlatformStore::seeded();
    let capture = tokio::spawn(CaptureRunner::new(store.clone(), &config).run());

    let (addr, server) = warp::serve(routes(store))
        .try_bind_with_graceful_shutdown(config.bind, async {
            if let Err(err) = signal::ctrl_c().await {
                warn!("awaiting Ctrl+C: {err}");
            }
        })
        .with_context(|| format!("binding platform API on {}", config.bind))?;
    info!(
        "platform API listening on http://{addr} (capture every {} ms)",
        config.capture_interval_ms
    );

    server.await;
    capture.abort();
    info!("simulator stopped");
    Ok(())
}
