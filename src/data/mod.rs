/// Data layer: core types, loading, and the injectable accessor.
///
/// Architecture:
/// ```text
///  .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → CorrectedSpectra
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SpectraSource │  fetch once, hand to the figure builders
///   └──────────────┘
/// ```

pub mod loader;
pub mod model;
pub mod source;
