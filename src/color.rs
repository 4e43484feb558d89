use eframe::egui::Color32;
use palette::Srgb;
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Jet colormap
// ---------------------------------------------------------------------------

/// Piecewise-linear channel anchors `(position, value)` of the classic jet map.
const JET_RED: &[(f32, f32)] = &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)];
const JET_GREEN: &[(f32, f32)] = &[
    (0.0, 0.0),
    (0.125, 0.0),
    (0.375, 1.0),
    (0.64, 1.0),
    (0.91, 0.0),
    (1.0, 0.0),
];
const JET_BLUE: &[(f32, f32)] = &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)];

fn channel(anchors: &[(f32, f32)], t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    for pair in anchors.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if t <= x1 {
            let f = if x1 > x0 { (t - x0) / (x1 - x0) } else { 0.0 };
            return y0 + f * (y1 - y0);
        }
    }
    anchors.last().map_or(0.0, |&(_, y)| y)
}

/// Sample the jet colormap at `t` in [0, 1].
pub fn jet(t: f32) -> Srgb<u8> {
    Srgb::new(
        channel(JET_RED, t),
        channel(JET_GREEN, t),
        channel(JET_BLUE, t),
    )
    .into_format()
}

// ---------------------------------------------------------------------------
// Discretized color scale: class code → bin colour
// ---------------------------------------------------------------------------

/// A continuous colormap cut into `n` flat bins over the limits `clim`.
///
/// Bin `i` takes the colormap value at `i / (n - 1)`, so the first and last
/// bins carry the colormap endpoints. Values outside `clim` land in the
/// nearest end bin.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteColorScale {
    clim: (f64, f64),
    colors: Vec<Srgb<u8>>,
}

impl DiscreteColorScale {
    pub fn new(clim: (f64, f64), n_bins: usize, cmap: impl Fn(f32) -> Srgb<u8>) -> Self {
        let n_bins = n_bins.max(1);
        let colors = (0..n_bins)
            .map(|i| {
                if n_bins == 1 {
                    cmap(0.5)
                } else {
                    cmap(i as f32 / (n_bins - 1) as f32)
                }
            })
            .collect();
        DiscreteColorScale { clim, colors }
    }

    pub fn clim(&self) -> (f64, f64) {
        self.clim
    }

    pub fn n_bins(&self) -> usize {
        self.colors.len()
    }

    /// Width of one bin in data units.
    pub fn bin_width(&self) -> f64 {
        (self.clim.1 - self.clim.0) / self.n_bins() as f64
    }

    /// Index of the bin that `value` falls into, clamped to the scale.
    pub fn bin_for(&self, value: f64) -> usize {
        let (lo, hi) = self.clim;
        if !(hi > lo) || value.is_nan() {
            return 0;
        }
        let pos = ((value - lo) / self.bin_width()).floor();
        pos.clamp(0.0, (self.n_bins() - 1) as f64) as usize
    }

    pub fn color_for(&self, value: f64) -> Srgb<u8> {
        self.colors[self.bin_for(value)]
    }

    pub fn bin_color(&self, bin: usize) -> Srgb<u8> {
        self.colors[bin]
    }

    /// Lower and upper data value of a bin.
    pub fn bin_range(&self, bin: usize) -> (f64, f64) {
        let lo = self.clim.0 + bin as f64 * self.bin_width();
        (lo, lo + self.bin_width())
    }
}

// ---------------------------------------------------------------------------
// Backend conversions
// ---------------------------------------------------------------------------

pub fn to_color32(c: Srgb<u8>) -> Color32 {
    Color32::from_rgb(c.red, c.green, c.blue)
}

pub fn to_rgb_color(c: Srgb<u8>) -> RGBColor {
    RGBColor(c.red, c.green, c.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jet_endpoints() {
        assert_eq!(jet(0.0), Srgb::new(0u8, 0, 128));
        assert_eq!(jet(1.0), Srgb::new(128u8, 0, 0));
        // Pure green plateau in the middle.
        assert_eq!(jet(0.5).green, 255);
    }

    #[test]
    fn bins_cover_class_codes() {
        let scale = DiscreteColorScale::new((1.5, 6.5), 5, jet);
        assert_eq!(scale.n_bins(), 5);
        for (code, bin) in [(2.0, 0), (3.0, 1), (4.0, 2), (5.0, 3), (6.0, 4)] {
            assert_eq!(scale.bin_for(code), bin);
        }
        assert_eq!(scale.bin_color(0), jet(0.0));
        assert_eq!(scale.bin_color(4), jet(1.0));
        assert_eq!(scale.bin_range(1), (2.5, 3.5));
    }

    #[test]
    fn out_of_range_values_clamp() {
        let scale = DiscreteColorScale::new((1.5, 6.5), 5, jet);
        assert_eq!(scale.bin_for(0.0), 0);
        assert_eq!(scale.bin_for(1.0), 0);
        assert_eq!(scale.bin_for(42.0), 4);
        assert_eq!(scale.color_for(-3.0), scale.bin_color(0));
    }
}
