use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Errors surfaced by the dataset accessor, the figure builders and the
/// renderers.
#[derive(Debug, Error)]
pub enum FigureError {
    /// The dataset could not be fetched or parsed. Fatal at startup.
    #[error("dataset unavailable at {}: {reason}", path.display())]
    DatasetUnavailable { path: PathBuf, reason: String },

    /// Input arrays are empty or have the wrong shape.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Drawing or writing a figure failed.
    #[error("rendering failed: {0}")]
    Render(String),
}

impl FigureError {
    pub fn validation(msg: impl Into<String>) -> Self {
        FigureError::Validation(msg.into())
    }

    pub fn render(err: impl std::fmt::Display) -> Self {
        FigureError::Render(err.to_string())
    }
}

pub type Result<T, E = FigureError> = std::result::Result<T, E>;
