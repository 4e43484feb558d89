use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::color::to_rgb_color;
use crate::config::PlotStyle;
use crate::error::{FigureError, Result};
use crate::figures::components::{ColorBar, ComponentsFigure, MAX_TICKS, ScatterPanel};
use crate::figures::eigenvalues::{
    COMPONENT_LABEL, CUMULATIVE_LABEL, CUMULATIVE_Y_LIMITS, EIGENVALUE_LABEL, EIGENVALUE_Y_LIMITS,
    EigenvalueSpectrum,
};
use crate::figures::{FigureKind, Figures};

/// Name of the eigenvalue table written next to the images.
pub const EIGENVALUE_TABLE: &str = "eigenvalues.csv";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Write both figures as PNG plus the eigenvalue table into `out_dir`.
/// Returns the written paths.
pub fn export_all(figures: &Figures, style: &PlotStyle, out_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir).map_err(|e| {
        FigureError::Render(format!("creating {}: {e}", out_dir.display()))
    })?;

    let components_path = out_dir.join(format!("{}.png", FigureKind::Components.file_stem()));
    draw_components(&components_path, &figures.components, style)?;

    let eigen_path = out_dir.join(format!("{}.png", FigureKind::Eigenvalues.file_stem()));
    draw_eigenvalues(&eigen_path, &figures.eigenvalues, style)?;

    let table_path = out_dir.join(EIGENVALUE_TABLE);
    write_eigenvalue_table(&table_path, &figures.eigenvalues)?;

    let written = vec![components_path, eigen_path, table_path];
    for path in &written {
        log::info!("Wrote {}", path.display());
    }
    Ok(written)
}

/// Write `component,eigenvalue,cumulative` rows.
pub fn write_eigenvalue_table(path: &Path, spectrum: &EigenvalueSpectrum) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(FigureError::render)?;
    for row in spectrum.rows() {
        writer.serialize(row).map_err(FigureError::render)?;
    }
    writer.flush().map_err(FigureError::render)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// PCA components figure
// ---------------------------------------------------------------------------

pub fn draw_components(path: &Path, fig: &ComponentsFigure, style: &PlotStyle) -> Result<()> {
    let root = BitMapBackend::new(path, style.pixel_size()).into_drawing_area();
    root.fill(&WHITE).map_err(FigureError::render)?;

    let cells = root.split_evenly((2, 2));
    for panel in &fig.panels {
        let area = &cells[panel.cell.row() * 2 + panel.cell.col()];
        draw_scatter_panel(area, panel, fig, style)?;
    }
    let bar_area = &cells[fig.colorbar.cell.row() * 2 + fig.colorbar.cell.col()];
    draw_colorbar(bar_area, &fig.colorbar, style)?;

    root.present().map_err(FigureError::render)
}

fn draw_scatter_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &ScatterPanel,
    fig: &ComponentsFigure,
    style: &PlotStyle,
) -> Result<()> {
    let font = ("sans-serif", style.font_px());
    let label_area = style.font_px() * 3;
    let blank = |_: &f64| String::new();

    let (x0, x1) = panel.x_axis.range;
    let (y0, y1) = panel.y_axis.range;

    let mut chart = ChartBuilder::on(area)
        .margin(4)
        .x_label_area_size(if panel.x_axis.show_tick_labels { label_area } else { 4 })
        .y_label_area_size(label_area)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(FigureError::render)?;

    let x_desc = panel.x_axis.label.map(|l| l.render(style)).unwrap_or_default();
    let y_desc = panel.y_axis.label.map(|l| l.render(style)).unwrap_or_default();

    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh()
        .x_labels(MAX_TICKS)
        .y_labels(MAX_TICKS)
        .label_style(font)
        .axis_desc_style(font)
        .x_desc(x_desc)
        .y_desc(y_desc);
    if !panel.x_axis.show_tick_labels {
        mesh.x_label_formatter(&blank);
    }
    if !panel.y_axis.show_tick_labels {
        mesh.y_label_formatter(&blank);
    }
    mesh.draw().map_err(FigureError::render)?;

    let scale = &fig.colorbar.scale;
    chart
        .draw_series(
            panel
                .points
                .iter()
                .filter(|p| (x0..=x1).contains(&p.x) && (y0..=y1).contains(&p.y))
                .map(|p| Circle::new((p.x, p.y), 1, to_rgb_color(scale.bin_color(p.bin)).filled())),
        )
        .map_err(FigureError::render)?;
    Ok(())
}

/// Vertical colour bar: one flat block per bin, class names at the ticks.
fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    bar: &ColorBar,
    style: &PlotStyle,
) -> Result<()> {
    let (w, h) = area.dim_in_pixel();
    let x0 = (w as f64 * 0.05) as i32;
    let x1 = x0 + (w as f64 * 0.04).max(6.0) as i32;
    let y_top = (h as f64 * 0.15) as i32;
    let y_bottom = (h as f64 * 0.85) as i32;
    let (lo, hi) = bar.scale.clim();
    let to_px = |v: f64| y_bottom - ((v - lo) / (hi - lo) * (y_bottom - y_top) as f64) as i32;

    for bin in 0..bar.scale.n_bins() {
        let (b_lo, b_hi) = bar.scale.bin_range(bin);
        let color = to_rgb_color(bar.scale.bin_color(bin));
        area.draw(&Rectangle::new([(x0, to_px(b_hi)), (x1, to_px(b_lo))], color.filled()))
            .map_err(FigureError::render)?;
    }
    area.draw(&Rectangle::new([(x0, y_top), (x1, y_bottom)], BLACK.stroke_width(1)))
        .map_err(FigureError::render)?;

    let text_style = TextStyle::from(("sans-serif", style.font_px()).into_font())
        .pos(Pos::new(HPos::Left, VPos::Center));
    for tick in &bar.ticks {
        let y = to_px(tick.value);
        area.draw(&PathElement::new(vec![(x1, y), (x1 + 3, y)], BLACK))
            .map_err(FigureError::render)?;
        area.draw(&Text::new(tick.label.to_string(), (x1 + 6, y), text_style.clone()))
            .map_err(FigureError::render)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Eigenvalue figure
// ---------------------------------------------------------------------------

pub fn draw_eigenvalues(path: &Path, spectrum: &EigenvalueSpectrum, style: &PlotStyle) -> Result<()> {
    let root = BitMapBackend::new(path, style.pixel_size()).into_drawing_area();
    root.fill(&WHITE).map_err(FigureError::render)?;

    let panels = root.split_evenly((2, 1));
    let font = ("sans-serif", style.font_px());
    let label_area = style.font_px() * 4;
    let (x0, x1) = spectrum.x_range();
    let blank = |_: &f64| String::new();

    // Top: eigenvalues, log-log.
    let (y0, y1) = EIGENVALUE_Y_LIMITS;
    let mut top = ChartBuilder::on(&panels[0])
        .margin(4)
        .x_label_area_size(4)
        .y_label_area_size(label_area)
        .build_cartesian_2d((x0..x1).log_scale(), (y0..y1).log_scale())
        .map_err(FigureError::render)?;
    top.configure_mesh()
        .label_style(font)
        .axis_desc_style(font)
        .y_desc(EIGENVALUE_LABEL.render(style))
        .x_label_formatter(&blank)
        .draw()
        .map_err(FigureError::render)?;
    top.draw_series(LineSeries::new(
        spectrum
            .eigenvalue_points()
            .filter(|&(_, v)| v > 0.0),
        &BLACK,
    ))
    .map_err(FigureError::render)?;

    // Bottom: cumulative fraction, log x.
    let (y0, y1) = CUMULATIVE_Y_LIMITS;
    let mut bottom = ChartBuilder::on(&panels[1])
        .margin(4)
        .x_label_area_size(label_area)
        .y_label_area_size(label_area)
        .build_cartesian_2d((x0..x1).log_scale(), y0..y1)
        .map_err(FigureError::render)?;
    bottom
        .configure_mesh()
        .y_labels(MAX_TICKS + 3)
        .label_style(font)
        .axis_desc_style(font)
        .x_desc(COMPONENT_LABEL.render(style))
        .y_desc(CUMULATIVE_LABEL.render(style))
        .draw()
        .map_err(FigureError::render)?;
    let cumulative: Vec<(f64, f64)> = spectrum.cumulative_points().collect();
    bottom
        .draw_series(LineSeries::new(clip_below(&cumulative, y0), &BLACK))
        .map_err(FigureError::render)?;

    root.present().map_err(FigureError::render)
}

/// Drop the part of a log-x curve below `floor`, adding the point where it
/// crosses `floor` so the line starts on the bottom edge.
fn clip_below(points: &[(f64, f64)], floor: f64) -> Vec<(f64, f64)> {
    let mut out = Vec::with_capacity(points.len() + 1);
    for (i, &(x, y)) in points.iter().enumerate() {
        if y < floor {
            continue;
        }
        if let Some(&(px, py)) = i.checked_sub(1).and_then(|j| points.get(j)) {
            if py < floor {
                let t = (floor - py) / (y - py);
                let log_x = px.log10() + t * (x.log10() - px.log10());
                out.push((10f64.powf(log_x), floor));
            }
        }
        out.push((x, y));
    }
    out
}
