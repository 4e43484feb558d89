use eframe::egui::{self, Color32, RichText, Ui};

use crate::color::to_color32;
use crate::figures::FigureKind;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – figure selection and style
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Figures");
    ui.separator();

    for kind in FigureKind::ALL {
        ui.radio_value(&mut state.selected, kind, kind.title());
    }
    ui.separator();

    ui.strong("Style");
    let style = &mut state.config.style;
    ui.add(egui::Slider::new(&mut style.font_size, 6.0..=16.0).text("font size"));
    ui.add(egui::Slider::new(&mut style.dpi, 50..=300).text("export dpi"));
    ui.checkbox(&mut style.use_tex, "TeX labels")
        .on_hover_text("No TeX renderer is available; labels are drawn as plain text.");
    ui.separator();

    // ---- Class legend ----
    ui.strong("Classes");
    let bar = &state.figures.components.colorbar;
    for tick in bar.ticks.iter().rev() {
        let color = to_color32(bar.scale.color_for(tick.value));
        ui.label(RichText::new(format!("■ {}", tick.label)).color(color));
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} spectra, {} components, {} eigenvalues",
            state.dataset.len(),
            state.dataset.n_components(),
            state.figures.eigenvalues.n_eigenvalues()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                ui.visuals().text_color()
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open PCA results")
        .add_filter("Supported files", &["parquet", "pq", "json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.load_from(&path);
    }
}

pub fn export_dialog(state: &mut AppState) {
    let dir = rfd::FileDialog::new()
        .set_title("Export figures to folder")
        .set_directory(&state.config.output_dir)
        .pick_folder();

    if let Some(dir) = dir {
        state.export_to(&dir);
    }
}
