use std::fmt;

use crate::error::{FigureError, Result};

// ---------------------------------------------------------------------------
// SpectralClass – the `lineindex_cln` classification of a spectrum
// ---------------------------------------------------------------------------

/// Line-index classification attached to each SDSS spectrum.
///
/// The discriminant is the integer code stored in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpectralClass {
    Unknown = 0,
    Star = 1,
    AbsorptionGalaxy = 2,
    Galaxy = 3,
    EmissionGalaxy = 4,
    NarrowLineQso = 5,
    BroadLineQso = 6,
}

impl SpectralClass {
    pub const ALL: [SpectralClass; 7] = [
        SpectralClass::Unknown,
        SpectralClass::Star,
        SpectralClass::AbsorptionGalaxy,
        SpectralClass::Galaxy,
        SpectralClass::EmissionGalaxy,
        SpectralClass::NarrowLineQso,
        SpectralClass::BroadLineQso,
    ];

    /// Look up a class by its dataset code.
    pub fn from_code(code: i64) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Human-readable name used for color-bar tick labels.
    pub fn name(self) -> &'static str {
        match self {
            SpectralClass::Unknown => "unknown",
            SpectralClass::Star => "star",
            SpectralClass::AbsorptionGalaxy => "absorption galaxy",
            SpectralClass::Galaxy => "galaxy",
            SpectralClass::EmissionGalaxy => "emission galaxy",
            SpectralClass::NarrowLineQso => "narrow-line QSO",
            SpectralClass::BroadLineQso => "broad-line QSO",
        }
    }
}

impl fmt::Display for SpectralClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// CorrectedSpectra – the pre-computed PCA results
// ---------------------------------------------------------------------------

/// Pre-computed PCA results for a set of corrected spectra.
///
/// Built once by a [`SpectraSource`](super::source::SpectraSource) and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectedSpectra {
    coeffs: Vec<Vec<f64>>,
    evals: Vec<f64>,
    class_label: Vec<i64>,
}

impl CorrectedSpectra {
    /// Assemble a dataset, checking that the per-spectrum arrays agree.
    ///
    /// Every coefficient row must have the same width and there must be one
    /// class label per row. Emptiness is left to the figure builders, which
    /// know how many rows and components they need.
    pub fn new(coeffs: Vec<Vec<f64>>, evals: Vec<f64>, class_label: Vec<i64>) -> Result<Self> {
        if coeffs.len() != class_label.len() {
            return Err(FigureError::validation(format!(
                "{} coefficient rows but {} class labels",
                coeffs.len(),
                class_label.len()
            )));
        }
        if let Some(first) = coeffs.first() {
            let width = first.len();
            if let Some((row, bad)) = coeffs.iter().enumerate().find(|(_, r)| r.len() != width) {
                return Err(FigureError::validation(format!(
                    "coefficient row {row} has {} components, expected {width}",
                    bad.len()
                )));
            }
        }
        Ok(CorrectedSpectra {
            coeffs,
            evals,
            class_label,
        })
    }

    /// Number of spectra.
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    /// Whether the dataset holds no spectra.
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Number of PCA coefficients stored per spectrum.
    pub fn n_components(&self) -> usize {
        self.coeffs.first().map_or(0, Vec::len)
    }

    /// Singular values as stored in the dataset (not yet squared).
    pub fn evals(&self) -> &[f64] {
        &self.evals
    }

    pub fn class_label(&self) -> &[i64] {
        &self.class_label
    }

    /// Column `component` of the coefficient matrix.
    pub fn component(&self, component: usize) -> impl Iterator<Item = f64> + '_ {
        self.coeffs.iter().map(move |row| row[component])
    }
}
