use serde::Serialize;

use crate::config::Label;
use crate::error::{FigureError, Result};

/// y range of the log-log eigenvalue panel.
pub const EIGENVALUE_Y_LIMITS: (f64, f64) = (5e-4, 100.0);
/// y range of the cumulative panel.
pub const CUMULATIVE_Y_LIMITS: (f64, f64) = (0.65, 1.0);

pub const EIGENVALUE_LABEL: Label = Label("Normalized Eigenvalues");
pub const CUMULATIVE_LABEL: Label = Label("Cumulative Eigenvalues");
pub const COMPONENT_LABEL: Label = Label("Eigenvalue Number");

// ---------------------------------------------------------------------------
// EigenvalueSpectrum
// ---------------------------------------------------------------------------

/// Eigenvalues and their cumulative-normalized curve.
///
/// `cumulative` is non-decreasing and its last entry is exactly `1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenvalueSpectrum {
    eigenvalues: Vec<f64>,
    cumulative: Vec<f64>,
}

/// One row of the exported eigenvalue table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EigenvalueRow {
    pub component: usize,
    pub eigenvalue: f64,
    pub cumulative: f64,
}

impl EigenvalueSpectrum {
    /// Build the spectrum from stored singular values, squaring each one.
    pub fn from_singular_values(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(FigureError::validation("eigenvalue sequence is empty"));
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(FigureError::validation(format!(
                "eigenvalue {i} is not finite ({})",
                values[i]
            )));
        }

        let eigenvalues: Vec<f64> = values.iter().map(|v| v * v).collect();
        let mut running = 0.0;
        let mut cumulative: Vec<f64> = eigenvalues
            .iter()
            .map(|e| {
                running += e;
                running
            })
            .collect();

        let total = running;
        if total <= 0.0 {
            return Err(FigureError::validation(
                "eigenvalues are all zero; cumulative curve is undefined",
            ));
        }
        if !total.is_finite() {
            return Err(FigureError::validation(
                "squared eigenvalues overflow; rescale the singular values",
            ));
        }
        for c in &mut cumulative {
            *c /= total;
        }
        if let Some(last) = cumulative.last_mut() {
            *last = 1.0;
        }

        Ok(EigenvalueSpectrum {
            eigenvalues,
            cumulative,
        })
    }

    /// Number of eigenvalues.
    pub fn n_eigenvalues(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Squared singular values, in dataset order.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// `(eigenvalue number, eigenvalue)` with 1-based numbering.
    pub fn eigenvalue_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.eigenvalues()
            .iter()
            .enumerate()
            .map(|(i, &v)| ((i + 1) as f64, v))
    }

    /// `(eigenvalue number, cumulative fraction)` with 1-based numbering.
    pub fn cumulative_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.cumulative()
            .iter()
            .enumerate()
            .map(|(i, &v)| ((i + 1) as f64, v))
    }

    /// x range shared by both panels, wide enough for a log axis.
    pub fn x_range(&self) -> (f64, f64) {
        (1.0, (self.n_eigenvalues() as f64).max(10.0))
    }

    pub fn rows(&self) -> Vec<EigenvalueRow> {
        self.eigenvalues
            .iter()
            .zip(&self.cumulative)
            .enumerate()
            .map(|(i, (&eigenvalue, &cumulative))| EigenvalueRow {
                component: i + 1,
                eigenvalue,
                cumulative,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squares_then_normalizes() {
        let spectrum = EigenvalueSpectrum::from_singular_values(&[4.0, 3.0, 2.0, 1.0]).unwrap();
        assert_eq!(spectrum.eigenvalues(), &[16.0, 9.0, 4.0, 1.0]);

        let expected = [16.0 / 30.0, 25.0 / 30.0, 29.0 / 30.0, 1.0];
        for (got, want) in spectrum.cumulative().iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{got} != {want}");
        }
        assert!((spectrum.cumulative()[0] - 0.533).abs() < 1e-3);
        assert!((spectrum.cumulative()[1] - 0.833).abs() < 1e-3);
        assert!((spectrum.cumulative()[2] - 0.967).abs() < 1e-3);
    }

    #[test]
    fn squaring_is_elementwise_with_negative_values() {
        let spectrum = EigenvalueSpectrum::from_singular_values(&[-2.0, 0.5, 0.0]).unwrap();
        assert_eq!(spectrum.eigenvalues(), &[4.0, 0.25, 0.0]);
    }

    #[test]
    fn cumulative_is_monotone_and_ends_at_one() {
        let values: Vec<f64> = (0..500).map(|i| 1.0 / (1.0 + i as f64).powf(1.3)).collect();
        let spectrum = EigenvalueSpectrum::from_singular_values(&values).unwrap();
        assert!(spectrum.cumulative().windows(2).all(|w| w[0] <= w[1]));
        let last = *spectrum.cumulative().last().unwrap();
        assert!((last - 1.0).abs() < 1e-9);
        assert!(spectrum.cumulative().iter().all(|c| (0.0..=1.0).contains(c)));
    }

    #[test]
    fn empty_sequence_is_rejected() {
        let err = EigenvalueSpectrum::from_singular_values(&[]).unwrap_err();
        assert!(matches!(err, FigureError::Validation(_)));
    }

    #[test]
    fn all_zero_sequence_is_rejected() {
        let err = EigenvalueSpectrum::from_singular_values(&[0.0, 0.0, 0.0]).unwrap_err();
        assert!(err.to_string().contains("all zero"));
    }

    #[test]
    fn overflowing_squares_are_rejected() {
        let err = EigenvalueSpectrum::from_singular_values(&[1e200, 1.0]).unwrap_err();
        assert!(matches!(err, FigureError::Validation(_)));

        // Large but representable squares still normalize cleanly.
        let spectrum = EigenvalueSpectrum::from_singular_values(&[1e150, 1e149]).unwrap();
        assert!(spectrum.cumulative().iter().all(|c| (0.0..=1.0).contains(c)));
        assert!(spectrum.cumulative().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert!(EigenvalueSpectrum::from_singular_values(&[1.0, f64::NAN]).is_err());
        assert!(EigenvalueSpectrum::from_singular_values(&[f64::INFINITY]).is_err());
    }

    #[test]
    fn points_are_one_based() {
        let spectrum = EigenvalueSpectrum::from_singular_values(&[2.0, 1.0]).unwrap();
        let pts: Vec<(f64, f64)> = spectrum.eigenvalue_points().collect();
        assert_eq!(pts, vec![(1.0, 4.0), (2.0, 1.0)]);
        assert_eq!(spectrum.rows()[1].component, 2);
        assert_eq!(spectrum.x_range(), (1.0, 10.0));
    }
}
