/// Figure models: validated, backend-independent descriptions of what to
/// draw. The viewer (`ui`) and the exporter (`export`) both render these.

pub mod components;
pub mod eigenvalues;

use crate::data::model::CorrectedSpectra;
use crate::error::Result;

use components::ComponentsFigure;
use eigenvalues::EigenvalueSpectrum;

/// Which of the two book figures is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FigureKind {
    #[default]
    Components,
    Eigenvalues,
}

impl FigureKind {
    pub const ALL: [FigureKind; 2] = [FigureKind::Components, FigureKind::Eigenvalues];

    pub fn title(self) -> &'static str {
        match self {
            FigureKind::Components => "PCA Projection of SDSS Spectra",
            FigureKind::Eigenvalues => "SDSS Eigenvalues",
        }
    }

    /// Base name of the exported image.
    pub fn file_stem(self) -> &'static str {
        match self {
            FigureKind::Components => "fig_PCA_components",
            FigureKind::Eigenvalues => "fig_eigenvalues",
        }
    }
}

/// Both figures built from one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Figures {
    pub components: ComponentsFigure,
    pub eigenvalues: EigenvalueSpectrum,
}

impl Figures {
    pub fn build(data: &CorrectedSpectra) -> Result<Self> {
        Ok(Figures {
            components: ComponentsFigure::build(data)?,
            eigenvalues: EigenvalueSpectrum::from_singular_values(data.evals())?,
        })
    }
}
