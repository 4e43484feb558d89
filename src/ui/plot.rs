use std::ops::RangeInclusive;

use eframe::egui::{self, Align2, FontId, Sense, Stroke, Ui, Vec2};
use egui_plot::{GridInput, GridMark, Line, Plot, PlotBounds, PlotPoints, Points};

use crate::color::to_color32;
use crate::config::PlotStyle;
use crate::figures::FigureKind;
use crate::figures::components::{ColorBar, ComponentsFigure, GridCell, MAX_TICKS, ScatterPanel};
use crate::figures::eigenvalues::{
    COMPONENT_LABEL, CUMULATIVE_LABEL, CUMULATIVE_Y_LIMITS, EIGENVALUE_LABEL, EIGENVALUE_Y_LIMITS,
    EigenvalueSpectrum,
};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Figure (central panel)
// ---------------------------------------------------------------------------

/// Render the selected figure in the central panel.
pub fn figure(ui: &mut Ui, state: &AppState) {
    let style = &state.config.style;
    match state.selected {
        FigureKind::Components => components_figure(ui, &state.figures.components, style),
        FigureKind::Eigenvalues => eigenvalue_figure(ui, &state.figures.eigenvalues, style),
    }
}

fn blank_ticks(_mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    String::new()
}

/// Tick labels for an axis plotted in log10 space: decades only.
fn decade_ticks(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    let rounded = mark.value.round();
    if (mark.value - rounded).abs() < 1e-9 {
        format!("1e{}", rounded as i32)
    } else {
        String::new()
    }
}

/// Round step (1, 2, 2.5 or 5 times a power of ten) that puts at most
/// `max_ticks` marks on `[lo, hi]`.
fn nice_step(lo: f64, hi: f64, max_ticks: usize) -> f64 {
    let span = hi - lo;
    if !(span > 0.0) || !span.is_finite() {
        return 1.0;
    }
    let raw = span / max_ticks.saturating_sub(1).max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|&step| step >= raw * (1.0 - 1e-9))
        .unwrap_or(10.0 * magnitude)
}

/// Grid marks for an axis limited to [`MAX_TICKS`] labels.
fn limited_marks(input: GridInput) -> Vec<GridMark> {
    let (lo, hi) = input.bounds;
    let step = nice_step(lo, hi, MAX_TICKS);
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last)
        .map(|k| GridMark {
            value: k as f64 * step,
            step_size: step,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// PCA components: 2×2 grid
// ---------------------------------------------------------------------------

fn components_figure(ui: &mut Ui, fig: &ComponentsFigure, style: &PlotStyle) {
    let spacing = ui.spacing().item_spacing;
    let avail = ui.available_size();
    let cell = Vec2::new(
        ((avail.x - spacing.x) / 2.0).max(50.0),
        ((avail.y - spacing.y) / 2.0).max(50.0),
    );

    let panel_at = |cell_pos: GridCell| fig.panels.iter().find(|p| p.cell == cell_pos);

    for row in [[GridCell::TopLeft, GridCell::TopRight], [GridCell::BottomLeft, GridCell::BottomRight]] {
        ui.horizontal(|ui: &mut Ui| {
            for cell_pos in row {
                if fig.colorbar.cell == cell_pos {
                    colorbar(ui, &fig.colorbar, cell, style);
                } else if let Some(panel) = panel_at(cell_pos) {
                    scatter_panel(ui, panel, &fig.colorbar, cell, style);
                } else {
                    ui.allocate_space(cell);
                }
            }
        });
    }
}

fn scatter_panel(ui: &mut Ui, panel: &ScatterPanel, bar: &ColorBar, size: Vec2, style: &PlotStyle) {
    let scale = &bar.scale;

    // One series per colour bin.
    let mut per_bin: Vec<Vec<[f64; 2]>> = vec![Vec::new(); scale.n_bins()];
    for p in &panel.points {
        per_bin[p.bin].push([p.x, p.y]);
    }

    let mut plot = Plot::new(("components", panel.x_component, panel.y_component))
        .width(size.x)
        .height(size.y)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .x_grid_spacer(limited_marks)
        .y_grid_spacer(limited_marks);
    if let Some(label) = panel.x_axis.label {
        plot = plot.x_axis_label(label.render(style));
    }
    if let Some(label) = panel.y_axis.label {
        plot = plot.y_axis_label(label.render(style));
    }
    if !panel.x_axis.show_tick_labels {
        plot = plot.x_axis_formatter(blank_ticks);
    }
    if !panel.y_axis.show_tick_labels {
        plot = plot.y_axis_formatter(blank_ticks);
    }

    let (x0, x1) = panel.x_axis.range;
    let (y0, y1) = panel.y_axis.range;
    plot.show(ui, |plot_ui| {
        plot_ui.set_plot_bounds(PlotBounds::from_min_max([x0, y0], [x1, y1]));
        for (bin, pts) in per_bin.into_iter().enumerate() {
            if pts.is_empty() {
                continue;
            }
            plot_ui.points(
                Points::new(PlotPoints::from(pts))
                    .color(to_color32(scale.bin_color(bin)))
                    .radius(1.5),
            );
        }
    });
}

/// Vertical colour bar with class-name ticks, painted directly.
fn colorbar(ui: &mut Ui, bar: &ColorBar, size: Vec2, style: &PlotStyle) {
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    let text_color = ui.visuals().text_color();

    let x0 = rect.left() + rect.width() * 0.05;
    let x1 = x0 + (rect.width() * 0.04).max(8.0);
    let y_top = rect.top() + rect.height() * 0.15;
    let y_bottom = rect.top() + rect.height() * 0.85;
    let (lo, hi) = bar.scale.clim();
    let to_y = |v: f64| y_bottom - ((v - lo) / (hi - lo)) as f32 * (y_bottom - y_top);

    for bin in 0..bar.scale.n_bins() {
        let (b_lo, b_hi) = bar.scale.bin_range(bin);
        let block = egui::Rect::from_min_max(egui::pos2(x0, to_y(b_hi)), egui::pos2(x1, to_y(b_lo)));
        painter.rect_filled(block, 0.0, to_color32(bar.scale.bin_color(bin)));
    }

    let font = FontId::proportional(style.font_size * 1.5);
    for tick in &bar.ticks {
        let y = to_y(tick.value);
        painter.line_segment(
            [egui::pos2(x1, y), egui::pos2(x1 + 4.0, y)],
            Stroke::new(1.0, text_color),
        );
        painter.text(
            egui::pos2(x1 + 7.0, y),
            Align2::LEFT_CENTER,
            tick.label,
            font.clone(),
            text_color,
        );
    }
}

// ---------------------------------------------------------------------------
// Eigenvalues: two stacked panels
// ---------------------------------------------------------------------------

fn eigenvalue_figure(ui: &mut Ui, spectrum: &EigenvalueSpectrum, style: &PlotStyle) {
    let spacing = ui.spacing().item_spacing;
    let avail = ui.available_size();
    let height = ((avail.y - spacing.y) / 2.0).max(50.0);
    let (x0, x1) = spectrum.x_range();
    let (lx0, lx1) = (x0.log10(), x1.log10());
    let ink = ui.visuals().text_color();

    // egui_plot has no log axes, so plot log10 values and label decades.
    let top_points: PlotPoints = spectrum
        .eigenvalue_points()
        .filter(|&(_, v)| v > 0.0)
        .map(|(n, v)| [n.log10(), v.log10()])
        .collect();
    let (ey0, ey1) = EIGENVALUE_Y_LIMITS;

    Plot::new("eigenvalues")
        .width(avail.x)
        .height(height)
        .y_axis_label(EIGENVALUE_LABEL.render(style))
        .x_axis_formatter(blank_ticks)
        .y_axis_formatter(decade_ticks)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                [lx0, ey0.log10()],
                [lx1, ey1.log10()],
            ));
            plot_ui.line(Line::new(top_points).color(ink).width(1.0));
        });

    let bottom_points: PlotPoints = spectrum
        .cumulative_points()
        .map(|(n, c)| [n.log10(), c])
        .collect();
    let (cy0, cy1) = CUMULATIVE_Y_LIMITS;

    Plot::new("cumulative_eigenvalues")
        .width(avail.x)
        .height(height)
        .x_axis_label(COMPONENT_LABEL.render(style))
        .y_axis_label(CUMULATIVE_LABEL.render(style))
        .x_axis_formatter(decade_ticks)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max([lx0, cy0], [lx1, cy1]));
            plot_ui.line(Line::new(bottom_points).color(ink).width(1.0));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marks(lo: f64, hi: f64) -> Vec<f64> {
        limited_marks(GridInput {
            bounds: (lo, hi),
            base_step_size: 0.0,
        })
        .into_iter()
        .map(|m| m.value)
        .collect()
    }

    #[test]
    fn reference_range_has_at_most_five_ticks() {
        let values = marks(-1.2, 1.0);
        assert!(values.len() <= MAX_TICKS, "{values:?}");
        assert!(values.len() >= 2);
        assert!(values.iter().all(|v| (-1.2..=1.0).contains(v)));
    }

    #[test]
    fn tick_count_stays_bounded_across_ranges() {
        for (lo, hi) in [(0.0, 1.0), (-0.05, 1.05), (-3.7, 12.9), (0.001, 0.0042), (-500.0, 20.0)] {
            let values = marks(lo, hi);
            assert!(!values.is_empty() && values.len() <= MAX_TICKS, "{lo}..{hi}: {values:?}");
        }
    }

    #[test]
    fn steps_are_round_numbers() {
        for (hi, want) in [(1.0, 0.25), (10.0, 2.5), (7.0, 2.0), (2.2, 1.0)] {
            let step = nice_step(0.0, hi, 5);
            assert!((step - want).abs() < 1e-12, "0..{hi}: {step}");
        }
    }
}
