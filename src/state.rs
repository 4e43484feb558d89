use std::path::Path;

use crate::config::FigureConfig;
use crate::data::model::CorrectedSpectra;
use crate::data::source::{FileSource, SpectraSource};
use crate::export;
use crate::figures::{FigureKind, Figures};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Dataset the figures were built from.
    pub dataset: CorrectedSpectra,

    /// Figure models for the current dataset.
    pub figures: Figures,

    /// Figure shown in the central panel.
    pub selected: FigureKind,

    /// Style and paths; the style is edited from the side panel.
    pub config: FigureConfig,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: FigureConfig, dataset: CorrectedSpectra, figures: Figures) -> Self {
        Self {
            dataset,
            figures,
            selected: FigureKind::default(),
            config,
            status_message: None,
        }
    }

    /// Replace the dataset with the contents of `path`.
    ///
    /// The current figures stay on screen when the new file cannot be read
    /// or does not validate.
    pub fn load_from(&mut self, path: &Path) {
        let loaded = FileSource::new(path)
            .fetch_corrected_spectra()
            .and_then(|ds| Figures::build(&ds).map(|figs| (ds, figs)));
        match loaded {
            Ok((dataset, figures)) => {
                self.dataset = dataset;
                self.figures = figures;
                self.config.data_path = path.to_path_buf();
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Export both figures and the eigenvalue table into `dir`.
    pub fn export_to(&mut self, dir: &Path) {
        match export::export_all(&self.figures, &self.config.style, dir) {
            Ok(paths) => {
                self.status_message = Some(format!(
                    "Exported {} files to {}",
                    paths.len(),
                    dir.display()
                ));
            }
            Err(e) => {
                log::error!("Export failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn state() -> AppState {
        let ds = CorrectedSpectra::new(
            vec![vec![0.1, 0.2, 0.3], vec![-0.2, 0.4, 0.0]],
            vec![2.0, 1.0, 0.5],
            vec![3, 4],
        )
        .unwrap();
        let figs = Figures::build(&ds).unwrap();
        AppState::new(FigureConfig::default(), ds, figs)
    }

    #[test]
    fn failed_load_keeps_current_figures() {
        let dir = tempdir().unwrap();
        let mut st = state();
        let before = st.figures.clone();

        st.load_from(&dir.path().join("missing.json"));
        assert_eq!(st.figures, before);
        assert!(st.status_message.as_deref().unwrap().starts_with("Error"));
    }

    #[test]
    fn invalid_dataset_is_reported_not_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("two_columns.json");
        std::fs::write(
            &path,
            r#"{"coeffs": [[0.1, 0.2]], "evals": [1.0, 0.5], "lineindex_cln": [3]}"#,
        )
        .unwrap();

        let mut st = state();
        st.load_from(&path);
        assert_eq!(st.dataset.len(), 2);
        assert!(st.status_message.unwrap().contains("at least 3"));
    }

    #[test]
    fn successful_load_replaces_dataset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spectra.json");
        std::fs::write(
            &path,
            r#"{"coeffs": [[0.1, 0.2, 0.3]], "evals": [3.0, 1.0], "lineindex_cln": [6]}"#,
        )
        .unwrap();

        let mut st = state();
        st.load_from(&path);
        assert_eq!(st.dataset.len(), 1);
        assert_eq!(st.figures.eigenvalues.eigenvalues(), &[9.0, 1.0]);
        assert_eq!(st.config.data_path, path);
        assert!(st.status_message.is_none());
    }
}
