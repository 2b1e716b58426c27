#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod ui;

use gantt_planner::config::{AppDirs, AppSettings};
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    let dirs = AppDirs::resolve();
    let settings = AppSettings::load(&dirs.settings_path());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting Gantt Planner");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 400.0])
            .with_title("Gantt Planner"),
        ..Default::default()
    };

    eframe::run_native(
        "Gantt Planner",
        options,
        Box::new(|cc| Ok(Box::new(app::GanttApp::new(cc, settings, dirs)))),
    )
}
