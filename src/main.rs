use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use player_widget::renderer::gst_media::GstMediaElement;
use player_widget::types::settings::PlayerSettings;
use player_widget::ui::app::PlayerApp;
use player_widget::{PlayerError, SharedMedia};

#[derive(Parser, Debug)]
#[command(name = "player-widget", about = "Scalable video player with hover controls")]
struct Cli {
    /// JSON settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Media URI or local file, overrides the settings file
    #[arg(short, long)]
    uri: Option<String>,

    /// Poster image shown until the first frame is decoded
    #[arg(long)]
    poster: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => PlayerSettings::load_from_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => PlayerSettings::default(),
    };
    if let Some(uri) = cli.uri {
        settings.source_uri = uri;
    }
    if let Some(poster) = cli.poster {
        settings.poster_path = Some(poster.to_string_lossy().into_owned());
    }

    let media = GstMediaElement::new(
        &settings.source_uri,
        Duration::from_millis(settings.time_update_interval_ms),
    )
    .context("creating media pipeline")?;
    let media: SharedMedia = Rc::new(RefCell::new(media));

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([960.0, 620.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Player",
        native_options,
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(PlayerApp::new(settings, media)))
        }),
    )
    .map_err(|e| PlayerError::Ui(e.to_string()))?;
    Ok(())
}
