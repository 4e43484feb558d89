use std::path::PathBuf;

use crate::error::{FigureError, Result};

use super::loader;
use super::model::CorrectedSpectra;

// ---------------------------------------------------------------------------
// Dataset accessor
// ---------------------------------------------------------------------------

/// Anything that can hand over the pre-computed PCA results.
///
/// Figures only ever see this trait, so tests can feed synthetic data.
pub trait SpectraSource {
    fn fetch_corrected_spectra(&self) -> Result<CorrectedSpectra>;
}

/// Reads the dataset from a local `.parquet` or `.json` file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }
}

impl SpectraSource for FileSource {
    fn fetch_corrected_spectra(&self) -> Result<CorrectedSpectra> {
        if !self.path.exists() {
            return Err(FigureError::DatasetUnavailable {
                path: self.path.clone(),
                reason: "file not found (run `generate_sample` to create a synthetic dataset)"
                    .to_string(),
            });
        }

        let dataset = loader::load_file(&self.path).map_err(|e| {
            // Shape errors keep their own category.
            match e.downcast::<FigureError>() {
                Ok(inner) => inner,
                Err(e) => FigureError::DatasetUnavailable {
                    path: self.path.clone(),
                    reason: format!("{e:#}"),
                },
            }
        })?;

        log::info!(
            "Loaded {} spectra with {} components and {} eigenvalues from {}",
            dataset.len(),
            dataset.n_components(),
            dataset.evals().len(),
            self.path.display()
        );
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempdir().unwrap();
        let source = FileSource::new(dir.path().join("absent.parquet"));
        let err = source.fetch_corrected_spectra().unwrap_err();
        assert!(matches!(err, FigureError::DatasetUnavailable { .. }));
    }

    #[test]
    fn corrupt_file_is_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = FileSource::new(&path).fetch_corrected_spectra().unwrap_err();
        assert!(matches!(err, FigureError::DatasetUnavailable { .. }));
    }

    #[test]
    fn shape_mismatch_is_a_validation_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mismatch.json");
        std::fs::write(
            &path,
            r#"{"coeffs": [[0.1, 0.2, 0.3]], "evals": [1.0], "lineindex_cln": [1, 2]}"#,
        )
        .unwrap();
        let err = FileSource::new(&path).fetch_corrected_spectra().unwrap_err();
        assert!(matches!(err, FigureError::Validation(_)));
    }
}
