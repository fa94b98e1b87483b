use std::path::PathBuf;

mod backend_bridge;
mod controller;
mod media;
mod ui;

use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use moodpaper_client::ProviderSettings;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::ui::{MoodPaperApp, StartupConfig};

#[derive(Parser, Debug)]
#[command(name = "moodpaper-gui", about = "Generate phone wallpapers from a mood description")]
struct Args {
    /// Path to a moodpaper.toml with provider settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the image model.
    #[arg(long)]
    model: Option<String>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();
    let startup = StartupConfig::default();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);

    match ProviderSettings::load(args.config.as_deref()) {
        Ok(settings) => {
            let settings = match args.model {
                Some(model) => settings.with_model(model),
                None => settings,
            };
            backend_bridge::runtime::launch(cmd_rx, ui_tx, settings);
        }
        Err(err) => {
            tracing::error!("failed to load provider settings: {err:#}");
            drop(cmd_rx);
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                format!("{err:#}"),
            )));
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(&startup.window_title)
            .with_inner_size([420.0, 860.0])
            .with_min_inner_size([360.0, 640.0]),
        ..Default::default()
    };
    eframe::run_native(
        &startup.window_title,
        options,
        Box::new(|_cc| Ok(Box::new(MoodPaperApp::bootstrap(cmd_tx, ui_rx)))),
    )
}
