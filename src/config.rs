use std::path::{Path, PathBuf};
use std::sync::Once;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Config file looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "sdss-pca-figures.json";

// ---------------------------------------------------------------------------
// Text / figure style
// ---------------------------------------------------------------------------

/// Styling shared by every figure, passed explicitly to the renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotStyle {
    /// Base font size in points.
    pub font_size: f32,
    /// Ask for TeX-typeset labels. No backend here can typeset TeX, so
    /// labels fall back to plain Unicode text (see [`Label::render`]).
    pub use_tex: bool,
    /// Figure size in inches (width, height).
    pub figure_size: (f32, f32),
    /// Pixels per inch for exported images.
    pub dpi: u32,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            font_size: 8.0,
            use_tex: true,
            figure_size: (5.0, 3.75),
            dpi: 100,
        }
    }
}

impl PlotStyle {
    /// Exported image size in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let (w, h) = self.figure_size;
        (
            (w * self.dpi as f32).round().max(1.0) as u32,
            (h * self.dpi as f32).round().max(1.0) as u32,
        )
    }

    /// Font size in pixels at the configured resolution.
    pub fn font_px(&self) -> u32 {
        (self.font_size * self.dpi as f32 / 72.0).round().max(1.0) as u32
    }
}

// ---------------------------------------------------------------------------
// Axis labels with TeX source and plain fallback
// ---------------------------------------------------------------------------

static TEX_FALLBACK_WARNING: Once = Once::new();

/// An axis label written in TeX math notation, e.g. `$c_2$`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label(pub &'static str);

impl Label {
    /// Text to draw for this label under `style`.
    pub fn render(&self, style: &PlotStyle) -> String {
        if style.use_tex {
            TEX_FALLBACK_WARNING.call_once(|| {
                log::warn!("TeX rendering is not available; drawing labels as plain text");
            });
        }
        plain_text(self.0)
    }
}

/// Strip `$` delimiters and turn single-character subscripts into Unicode.
fn plain_text(tex: &str) -> String {
    let mut out = String::with_capacity(tex.len());
    let mut chars = tex.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '$' => {}
            '_' => match chars.next() {
                Some(d) => out.push(subscript(d)),
                None => out.push('_'),
            },
            other => out.push(other),
        }
    }
    out
}

fn subscript(c: char) -> char {
    match c {
        '0'..='9' => char::from_u32('₀' as u32 + (c as u32 - '0' as u32)).unwrap_or(c),
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Top-level configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    /// Dataset loaded at startup.
    pub data_path: PathBuf,
    /// Where exported figures go when no display is available.
    pub output_dir: PathBuf,
    pub style: PlotStyle,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("sdss_corrected_spectra.parquet"),
            output_dir: PathBuf::from("figures"),
            style: PlotStyle::default(),
        }
    }
}

impl FigureConfig {
    /// Read `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn defaults_match_book_style() {
        let style = PlotStyle::default();
        assert_eq!(style.font_size, 8.0);
        assert!(style.use_tex);
        assert_eq!(style.pixel_size(), (500, 375));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"style": {"use_tex": false, "dpi": 200}}"#).unwrap();

        let config = FigureConfig::load_or_default(&path).unwrap();
        assert!(!config.style.use_tex);
        assert_eq!(config.style.dpi, 200);
        assert_eq!(config.style.font_size, 8.0);
        assert_eq!(config.data_path, FigureConfig::default().data_path);
    }

    #[test]
    fn missing_config_is_default() {
        let dir = tempdir().unwrap();
        let config = FigureConfig::load_or_default(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, FigureConfig::default());
    }

    #[test]
    fn tex_labels_fall_back_to_unicode() {
        let style = PlotStyle::default();
        assert_eq!(Label("$c_2$").render(&style), "c₂");
        assert_eq!(Label("Cumulative Eigenvalues").render(&style), "Cumulative Eigenvalues");
    }
}
