mod audio;
mod config;
mod engine;
mod model;
mod shutdown;
mod ui;

#[cfg(test)]
mod test_support;

use eframe::egui;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // a missing .env file is fine; the key may come from the real environment
    let _ = dotenvy::dotenv();
    let settings = config::settings_io::load_settings();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("西游·法宝大师")
            .with_inner_size([1024.0, 768.0]),
        ..Default::default()
    };

    eframe::run_native(
        "journey_west_artifacts",
        options,
        Box::new(|cc| Ok(Box::new(ui::app::JourneyApp::new(cc, settings)))),
    )
}
