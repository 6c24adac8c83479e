mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use app::BorderDashApp;
use clap::Parser;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

#[derive(Parser)]
#[command(
    name = "border-dash",
    about = "Interactive dashboard for U.S. border crossing entry data"
)]
struct Cli {
    /// Crossing data file (.csv or .parquet); overrides `data-path`
    #[arg(long)]
    data: Option<PathBuf>,
    /// Configuration file (defaults to ./border-dash.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = DashboardConfig::resolve(cli.config.as_deref())?;
    if let Some(data) = cli.data {
        config.data_path = data;
    }

    let mut state = AppState::default();
    state.open(&config.data_path);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    let dark_mode = config.dark_mode;
    eframe::run_native(
        "Border Crossing Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(BorderDashApp::new(cc, state, dark_mode)))),
    )
    .map_err(|e| anyhow!("running UI: {e}"))
}
