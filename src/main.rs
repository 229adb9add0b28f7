//! Binary entrypoint for the slider.
//!
//! Delegates all logic to the library crate.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use opal_slider::compositor::LogSurface;
use opal_slider::config::Configuration;
use opal_slider::events::{SlideEvent, SliderCommand};
use opal_slider::slider::Slider;
use opal_slider::tasks;
use opal_slider::transition::TextureAtlas;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(name = "opal-slider", version, about = "Animated shader image slider")]
struct Cli {
    /// Path to YAML config file; built-in slides and timings when omitted
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Run without a window for the given number of seconds, logging transitions
    #[arg(long, value_name = "SECONDS")]
    headless: Option<u64>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("opal_slider={level}").parse()?)
        .add_directive("wgpu=warn".parse()?)
        .add_directive("winit=warn".parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let cfg = match &cli.config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Configuration::default(),
    }
    .validated()
    .context("validating configuration")?;
    let catalog = cfg.catalog().context("building slide catalog")?;
    info!(slides = catalog.len(), "catalog ready");

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received; shutting down");
            }
            cancel.cancel();
        });
    }

    match cli.headless {
        Some(seconds) => run_headless(cfg, catalog, Duration::from_secs(seconds), cancel).await,
        None => tasks::viewer::run_windowed(cfg, catalog, cancel),
    }
}

async fn run_headless(
    cfg: Configuration,
    catalog: opal_slider::catalog::Catalog,
    runtime: Duration,
    cancel: CancellationToken,
) -> Result<()> {
    let atlas = TextureAtlas::uniform(catalog.len(), [1920, 1080]);
    let slider = Slider::mount(
        catalog.clone(),
        atlas,
        LogSurface::default(),
        (1920, 1080),
        cfg.slider_settings(),
        Duration::ZERO,
    );

    let (_cmd_tx, cmd_rx) = mpsc::channel::<SliderCommand>(16);
    let (event_tx, mut event_rx) = mpsc::channel::<SlideEvent>(64);
    let task = tokio::spawn(tasks::slider::run(
        slider,
        cmd_rx,
        event_tx,
        cfg.frame_interval,
        cancel.clone(),
    ));

    let deadline = tokio::time::sleep(runtime);
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = cancel.cancelled() => break,
            Some(event) = event_rx.recv() => {
                if let SlideEvent::SlideCommitted(index) = event {
                    if let Some(slide) = catalog.get(index) {
                        info!(index, title = %slide.title, "now showing");
                    }
                }
            }
        }
    }
    cancel.cancel();

    let slider = task.await.context("slider task panicked")??;
    info!(
        frames = slider.compositor().surface().frames(),
        current = slider.state().current,
        "headless run finished"
    );
    Ok(())
}
