mod app;
mod color;
mod config;
mod data;
mod error;
mod export;
mod figures;
mod state;
mod ui;

use std::path::Path;

use app::FiguresApp;
use config::{CONFIG_FILE, FigureConfig};
use data::source::{FileSource, SpectraSource};
use eframe::egui;
use figures::Figures;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = FigureConfig::load_or_default(Path::new(CONFIG_FILE))?;

    // Fetch once; a missing or malformed dataset ends the program here.
    let dataset = FileSource::new(&config.data_path).fetch_corrected_spectra()?;
    let figures = Figures::build(&dataset)?;

    let fallback_figures = figures.clone();
    let fallback_style = config.style.clone();
    let output_dir = config.output_dir.clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 750.0])
            .with_min_inner_size([500.0, 375.0]),
        ..Default::default()
    };

    let state = AppState::new(config, dataset, figures);
    let shown = eframe::run_native(
        "SDSS PCA Figures",
        options,
        Box::new(|_cc| Ok(Box::new(FiguresApp::new(state)))),
    );

    if let Err(e) = shown {
        log::warn!(
            "Display unavailable ({e}); exporting figures to {}",
            output_dir.display()
        );
        export::export_all(&fallback_figures, &fallback_style, &output_dir)?;
    }
    Ok(())
}
