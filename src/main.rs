use std::sync::Arc;
use std::time::Duration;

use cutline::config::EditorConfig;
use cutline::renderer::time_source::SimulatedMedia;
use cutline::services::mock::MockServices;
use cutline::store::{SubtitleStore, TextStore};
use cutline::types::subtitle::seed_subtitles;
use cutline::ui::app::CutlineApp;

/// Length of the simulated clip the editor opens with.
const DEMO_MEDIA_SECONDS: f64 = 15.0;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = EditorConfig::from_env();
    let services = match MockServices::new() {
        Ok(services) => Arc::new(services.with_latency(Duration::from_millis(600))),
        Err(err) => {
            log::error!("Failed to set up services: {}", err);
            std::process::exit(1);
        }
    };

    // Metadata arrives a moment after start, like a real media element.
    let media = SimulatedMedia::new(DEMO_MEDIA_SECONDS).with_metadata_delay(0.3);
    let subtitles = SubtitleStore::from_items(seed_subtitles());
    let texts = TextStore::default();
    let app = CutlineApp::new(config, media, subtitles, texts, services);

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_title("Cutline"),
        ..Default::default()
    };
    eframe::run_native(
        "Cutline",
        native_options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
}
