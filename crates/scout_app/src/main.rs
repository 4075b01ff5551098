mod app;
mod config;
mod effects;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use scout_core::AppState;
use scout_engine::{ensure_output_dir, EngineHandle};
use scout_logging::{default_log_path, scout_warn};

use crate::app::App;
use crate::config::{ScoutConfig, CONFIG_FILENAME};
use crate::effects::EffectRunner;

#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "Search Anna's Archive and fetch books through the slow download pages")]
#[command(version)]
struct Cli {
    /// Search query
    query: String,

    /// Configuration file
    #[arg(long, default_value = CONFIG_FILENAME)]
    config: PathBuf,

    /// Site root to search
    #[arg(long)]
    base_url: Option<String>,

    /// Directory downloads are written to
    #[arg(long)]
    out: Option<PathBuf>,

    /// Download the slow link of result N (1-based) once the search finished
    #[arg(long, value_name = "N")]
    download: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, config_error) = match ScoutConfig::load(&cli.config) {
        Ok(config) => (config, None),
        Err(err) => (ScoutConfig::default(), Some(err)),
    };
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    scout_logging::initialize(config.log_destination, level, &default_log_path());
    if let Some(err) = config_error {
        scout_warn!("{}; using defaults", err);
    }

    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(out) = cli.out {
        config.output_dir = out;
    }
    if cli.download.is_some() {
        ensure_output_dir(&config.output_dir)?;
    }

    let engine = EngineHandle::new(config.engine_config())?;
    let mut app = App::new(
        AppState::with_base_url(config.base_url.clone()),
        EffectRunner::new(engine),
    );

    app.search(&cli.query)?;
    if let Some(number) = cli.download {
        let result = app.download(number);
        app.close_download();
        result?;
    }
    Ok(())
}
