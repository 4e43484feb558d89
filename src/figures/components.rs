use crate::color::{DiscreteColorScale, jet};
use crate::config::Label;
use crate::data::model::{CorrectedSpectra, SpectralClass};
use crate::error::{FigureError, Result};

/// Colour limits of the class scale. Codes 0 and 1 fall below and share the
/// first bin.
pub const COLOR_LIMITS: (f64, f64) = (1.5, 6.5);
pub const COLOR_BINS: usize = 5;
/// Class codes labelled on the colour bar.
pub const COLOR_TICKS: [i64; 5] = [2, 3, 4, 5, 6];

/// Limits fitted to the reference SDSS sample (top-left y, bottom-right x).
/// A different dataset needs new values here.
pub const REFERENCE_LIMITS: (f64, f64) = (-1.2, 1.0);

/// Major ticks per axis, at most.
pub const MAX_TICKS: usize = 5;

/// Relative padding of auto-scaled axes.
const AUTO_MARGIN: f64 = 0.05;

/// Number of PCA components the figure needs.
const REQUIRED_COMPONENTS: usize = 3;

// ---------------------------------------------------------------------------
// Layout types
// ---------------------------------------------------------------------------

/// Cell of the 2×2 figure grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridCell {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl GridCell {
    pub fn row(self) -> usize {
        match self {
            GridCell::TopLeft | GridCell::TopRight => 0,
            GridCell::BottomLeft | GridCell::BottomRight => 1,
        }
    }

    pub fn col(self) -> usize {
        match self {
            GridCell::TopLeft | GridCell::BottomLeft => 0,
            GridCell::TopRight | GridCell::BottomRight => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisSpec {
    pub label: Option<Label>,
    pub range: (f64, f64),
    pub show_tick_labels: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    /// Colour-scale bin of the spectrum's class code.
    pub bin: usize,
}

/// One pairwise scatter plot of two PCA coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPanel {
    pub cell: GridCell,
    pub x_component: usize,
    pub y_component: usize,
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorBarTick {
    pub value: f64,
    pub label: &'static str,
}

/// Shared categorical colour bar.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorBar {
    pub cell: GridCell,
    pub scale: DiscreteColorScale,
    pub ticks: Vec<ColorBarTick>,
}

/// The PCA coefficient figure: three scatter panels and one colour bar.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentsFigure {
    pub panels: Vec<ScatterPanel>,
    pub colorbar: ColorBar,
}

// ---------------------------------------------------------------------------
// Panel table
// ---------------------------------------------------------------------------

struct PanelLayout {
    cell: GridCell,
    x: usize,
    y: usize,
    x_label: Option<Label>,
    y_label: Option<Label>,
    x_fixed: Option<(f64, f64)>,
    y_fixed: Option<(f64, f64)>,
    x_ticks: bool,
    y_ticks: bool,
}

const LAYOUT: [PanelLayout; 3] = [
    PanelLayout {
        cell: GridCell::TopLeft,
        x: 0,
        y: 1,
        x_label: None,
        y_label: Some(Label("$c_2$")),
        x_fixed: None,
        y_fixed: Some(REFERENCE_LIMITS),
        x_ticks: false,
        y_ticks: true,
    },
    PanelLayout {
        cell: GridCell::BottomLeft,
        x: 0,
        y: 2,
        x_label: Some(Label("$c_1$")),
        y_label: Some(Label("$c_3$")),
        x_fixed: None,
        y_fixed: None,
        x_ticks: true,
        y_ticks: true,
    },
    PanelLayout {
        cell: GridCell::BottomRight,
        x: 1,
        y: 2,
        x_label: Some(Label("$c_2$")),
        y_label: None,
        x_fixed: Some(REFERENCE_LIMITS),
        y_fixed: None,
        x_ticks: true,
        y_ticks: false,
    },
];

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

impl ComponentsFigure {
    /// Lay out the coefficient scatter figure for `data`.
    ///
    /// Fails before any plotting when there are no spectra or fewer than
    /// three coefficient columns.
    pub fn build(data: &CorrectedSpectra) -> Result<Self> {
        if data.is_empty() {
            return Err(FigureError::validation("no spectra to plot"));
        }
        if data.n_components() < REQUIRED_COMPONENTS {
            return Err(FigureError::validation(format!(
                "need at least {REQUIRED_COMPONENTS} PCA coefficients per spectrum, got {}",
                data.n_components()
            )));
        }

        let scale = DiscreteColorScale::new(COLOR_LIMITS, COLOR_BINS, jet);
        let bins: Vec<usize> = data
            .class_label()
            .iter()
            .map(|&code| scale.bin_for(code as f64))
            .collect();

        let panels = LAYOUT
            .iter()
            .map(|layout| {
                let points: Vec<ScatterPoint> = data
                    .component(layout.x)
                    .zip(data.component(layout.y))
                    .zip(&bins)
                    .map(|((x, y), &bin)| ScatterPoint { x, y, bin })
                    .collect();
                let x_range = layout
                    .x_fixed
                    .unwrap_or_else(|| auto_range(points.iter().map(|p| p.x)));
                let y_range = layout
                    .y_fixed
                    .unwrap_or_else(|| auto_range(points.iter().map(|p| p.y)));
                ScatterPanel {
                    cell: layout.cell,
                    x_component: layout.x,
                    y_component: layout.y,
                    x_axis: AxisSpec {
                        label: layout.x_label,
                        range: x_range,
                        show_tick_labels: layout.x_ticks,
                    },
                    y_axis: AxisSpec {
                        label: layout.y_label,
                        range: y_range,
                        show_tick_labels: layout.y_ticks,
                    },
                    points,
                }
            })
            .collect();

        let ticks = COLOR_TICKS
            .iter()
            .map(|&code| ColorBarTick {
                value: code as f64,
                label: SpectralClass::from_code(code).map_or("?", SpectralClass::name),
            })
            .collect();

        Ok(ComponentsFigure {
            panels,
            colorbar: ColorBar {
                cell: GridCell::TopRight,
                scale,
                ticks,
            },
        })
    }
}

/// Data extent padded by [`AUTO_MARGIN`] on each side.
fn auto_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return (-1.0, 1.0);
    }
    let span = max - min;
    if span.abs() < f64::EPSILON {
        return (min - 0.5, max + 0.5);
    }
    (min - span * AUTO_MARGIN, max + span * AUTO_MARGIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(rows: usize, width: usize, label: impl Fn(usize) -> i64) -> CorrectedSpectra {
        let coeffs = (0..rows)
            .map(|i| (0..width).map(|j| (i as f64 * 0.1) - (j as f64 * 0.05)).collect())
            .collect();
        let labels = (0..rows).map(label).collect();
        CorrectedSpectra::new(coeffs, vec![1.0; width], labels).unwrap()
    }

    #[test]
    fn three_panels_and_five_bin_colorbar() {
        let fig = ComponentsFigure::build(&dataset(14, 4, |i| (i % 7) as i64)).unwrap();
        assert_eq!(fig.panels.len(), 3);
        assert_eq!(fig.colorbar.scale.n_bins(), 5);
        assert_eq!(fig.colorbar.ticks.len(), 5);
        assert_eq!(fig.colorbar.cell, GridCell::TopRight);

        let pairs: Vec<(usize, usize)> = fig
            .panels
            .iter()
            .map(|p| (p.x_component, p.y_component))
            .collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
        for panel in &fig.panels {
            assert_eq!(panel.points.len(), 14);
        }
    }

    #[test]
    fn uniform_galaxy_labels_keep_all_ticks() {
        let fig = ComponentsFigure::build(&dataset(10, 3, |_| 3)).unwrap();
        let labels: Vec<&str> = fig.colorbar.ticks.iter().map(|t| t.label).collect();
        assert_eq!(
            labels,
            [
                "absorption galaxy",
                "galaxy",
                "emission galaxy",
                "narrow-line QSO",
                "broad-line QSO",
            ]
        );
        let galaxy_bin = fig.colorbar.scale.bin_for(3.0);
        assert!(fig
            .panels
            .iter()
            .flat_map(|p| &p.points)
            .all(|pt| pt.bin == galaxy_bin));
    }

    #[test]
    fn too_few_components_is_rejected() {
        let err = ComponentsFigure::build(&dataset(5, 2, |_| 1)).unwrap_err();
        assert!(matches!(err, FigureError::Validation(_)));
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let data = CorrectedSpectra::new(Vec::new(), vec![1.0], Vec::new()).unwrap();
        assert!(ComponentsFigure::build(&data).is_err());
    }

    #[test]
    fn out_of_range_labels_are_clamped() {
        let fig = ComponentsFigure::build(&dataset(3, 3, |i| [0, 1, 9][i])).unwrap();
        let bins: Vec<usize> = fig.panels[0].points.iter().map(|p| p.bin).collect();
        assert_eq!(bins, vec![0, 0, 4]);
    }

    #[test]
    fn reference_limits_and_hidden_ticks() {
        let fig = ComponentsFigure::build(&dataset(6, 3, |_| 4)).unwrap();
        let top_left = &fig.panels[0];
        assert_eq!(top_left.cell, GridCell::TopLeft);
        assert_eq!(top_left.y_axis.range, REFERENCE_LIMITS);
        assert!(!top_left.x_axis.show_tick_labels);

        let bottom_right = &fig.panels[2];
        assert_eq!(bottom_right.x_axis.range, REFERENCE_LIMITS);
        assert!(!bottom_right.y_axis.show_tick_labels);
        assert!(bottom_right.y_axis.label.is_none());
    }

    #[test]
    fn auto_range_pads_extent() {
        let (lo, hi) = auto_range([0.0, 1.0].into_iter());
        assert!((lo + 0.05).abs() < 1e-12);
        assert!((hi - 1.05).abs() < 1e-12);
        assert_eq!(auto_range([2.0, 2.0].into_iter()), (1.5, 2.5));
    }
}
