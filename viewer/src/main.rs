use anyhow::Context;
use clap::Parser;
use config::ViewerConfig;
use console::{Command, ConsoleSurface};
use http::HttpGateway;
use log::{info, warn};
use scancore::reconcile::view_state::{ViewState, ViewStore};
use scancore::sync::{SchedulerHandle, Session};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;

mod config;
mod console;
mod http;

#[derive(Parser)]
#[command(author, version, about = "Terminal viewer for field-scan environments")]
struct Args {
    /// Load viewer settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Platform API root, e.g. http://127.0.0.1:5000
    #[arg(long)]
    base_url: Option<String>,
    /// Directory that image references are resolved against
    #[arg(long)]
    images_root: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(images_root) = args.images_root {
        config.images_root = images_root;
    }
    config.validate().context("validating viewer settings")?;

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating viewer runtime")?;
    runtime.block_on(run(config))
}

async fn run(config: ViewerConfig) -> anyhow::Result<()> {
    info!("polling platform at {}", config.base_url);
    let gateway = Arc::new(HttpGateway::new(&config.base_url));
    let session = Session::new(
        ViewStore::new(ViewState::new()),
        gateway,
        config.display_settings(),
    );
    let scheduler = session.scheduler(&config.cadence).start();
    let render = tokio::spawn(render_loop(
        session.clone(),
        Duration::from_millis(config.cadence.render_ms),
    ));

    println!("{}", console::HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("reading command")?,
            result = signal::ctrl_c() => {
                result.context("awaiting Ctrl+C")?;
                None
            }
        };
        let Some(line) = line else {
            break;
        };
        match Command::parse(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => execute(&session, &scheduler, command).await,
            Ok(None) => {}
            Err(err) => println!("{err}"),
        }
    }

    render.abort();
    scheduler.shutdown().await;
    info!("viewer stopped");
    Ok(())
}

async fn render_loop(session: Session, period: Duration) {
    let mut surface = ConsoleSurface::new();
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        let frame = session.frame();
        let view = session
            .store()
            .read(|state| surface.refresh(&frame, state));
        if let Some(view) = view {
            println!("{view}\n");
        }
    }
}

async fn execute(session: &Session, scheduler: &SchedulerHandle, command: Command) {
    let refused = match command {
        Command::Environments => {
            let text = session.store().read(|state| {
                console::render_environments(
                    &state.environments,
                    state.selection.target_environment(),
                )
            });
            println!("{text}");
            Ok(())
        }
        Command::SelectEnvironment(id) => session.select_environment(&id).await,
        Command::CreateEnvironment(label) => {
            if let Err(err) = session.create_environment(&label).await {
                println!("{err}");
            }
            Ok(())
        }
        Command::SelectPin(pin_id) => session.select_pin(&pin_id),
        Command::SelectOverlay(kind) => session.select_overlay(kind),
        Command::OpenDetail(key) => session.open_detail(key),
        Command::SelectTab(tab) => session.select_detail_tab(tab),
        Command::CloseDetail => {
            session.close_detail();
            Ok(())
        }
        Command::ToggleObjects => {
            session.toggle_objects();
            Ok(())
        }
        Command::Watch { label, full_scan } => {
            if let Err(err) = session.watch(&label, full_scan) {
                println!("{err}");
            }
            Ok(())
        }
        Command::Unwatch(index) => {
            if session.unwatch(index).is_none() {
                println!("no watch-list entry {index}");
            }
            Ok(())
        }
        Command::FullScan(enabled) => {
            session.set_full_scan(enabled);
            Ok(())
        }
        Command::TogglePower => {
            session.toggle_power().await;
            Ok(())
        }
        Command::Capture => {
            session.capture_once().await;
            Ok(())
        }
        Command::Status => {
            let text = session
                .store()
                .read(|state| console::render_status_log(&state.status));
            println!("{text}");
            Ok(())
        }
        Command::Metrics => {
            for name in scheduler.lane_names() {
                if let Some(metrics) = scheduler.metrics(name) {
                    println!(
                        "{name}: completed {} errors {} stale {} skipped {}",
                        metrics.completed, metrics.errors, metrics.stale, metrics.skipped_ticks
                    );
                }
            }
            Ok(())
        }
        Command::Help => {
            println!("{}", console::HELP);
            Ok(())
        }
        Command::Quit => Ok(()),
    };
    if let Err(err) = refused {
        warn!("command refused: {err}");
        println!("{err}");
    }
}
