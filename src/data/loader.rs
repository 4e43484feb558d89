use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array, LargeListArray, ListArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::CorrectedSpectra;

/// Column holding the per-spectrum PCA coefficient lists.
pub const COEFFS_COLUMN: &str = "coeffs";
/// Column holding the per-spectrum class codes.
pub const LABEL_COLUMN: &str = "lineindex_cln";
/// Schema metadata key holding the eigenvalues as a JSON array.
pub const EVALS_METADATA_KEY: &str = "evals";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load pre-computed PCA results from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – one row per spectrum with `coeffs` and `lineindex_cln`
///   columns; eigenvalues in the `evals` schema metadata entry
/// * `.json`    – `{ "coeffs": [[...]], "evals": [...], "lineindex_cln": [...] }`
pub fn load_file(path: &Path) -> Result<CorrectedSpectra> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct JsonSpectra {
    coeffs: Vec<Vec<f64>>,
    evals: Vec<f64>,
    lineindex_cln: Vec<i64>,
}

/// Expected JSON schema (column-oriented, like the arrays in the `.npz`
/// archive the figures were first drawn from):
///
/// ```json
/// {
///   "coeffs": [[-0.31, 0.05, 0.11], ...],
///   "evals": [4.1, 1.3, 0.7, ...],
///   "lineindex_cln": [3, 4, ...]
/// }
/// ```
fn load_json(path: &Path) -> Result<CorrectedSpectra> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let raw: JsonSpectra = serde_json::from_str(&text).context("parsing JSON")?;
    Ok(CorrectedSpectra::new(raw.coeffs, raw.evals, raw.lineindex_cln)?)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing PCA results.
///
/// Expected schema:
/// - `coeffs`: List<Float64> or LargeList<Float64> (Float32 inner accepted)
/// - `lineindex_cln`: Int32 or Int64
/// - schema metadata `evals`: JSON array of the singular values
fn load_parquet(path: &Path) -> Result<CorrectedSpectra> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let evals_json = builder
        .schema()
        .metadata()
        .get(EVALS_METADATA_KEY)
        .with_context(|| format!("Parquet schema metadata missing '{EVALS_METADATA_KEY}'"))?;
    let evals: Vec<f64> = serde_json::from_str(evals_json).context("parsing 'evals' metadata")?;

    let reader = builder.build().context("building parquet reader")?;

    let mut coeffs = Vec::new();
    let mut labels = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let coeff_idx = schema
            .index_of(COEFFS_COLUMN)
            .map_err(|_| anyhow::anyhow!("Parquet file missing '{COEFFS_COLUMN}' column"))?;
        let label_idx = schema
            .index_of(LABEL_COLUMN)
            .map_err(|_| anyhow::anyhow!("Parquet file missing '{LABEL_COLUMN}' column"))?;

        let coeff_col = batch.column(coeff_idx);
        let label_col = batch.column(label_idx);

        for row in 0..batch.num_rows() {
            let c = extract_f64_list(coeff_col, row)
                .with_context(|| format!("Row {}: failed to read '{COEFFS_COLUMN}'", coeffs.len()))?;
            let label = extract_label(label_col, row)
                .with_context(|| format!("Row {}: failed to read '{LABEL_COLUMN}'", coeffs.len()))?;
            coeffs.push(c);
            labels.push(label);
        }
    }

    Ok(CorrectedSpectra::new(coeffs, evals, labels)?)
}

// -- Parquet / Arrow helpers --

/// Extract a `Vec<f64>` from a List or LargeList column at the given row.
fn extract_f64_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<f64>> {
    if col.is_null(row) {
        bail!("null value in list column");
    }

    let values_array = match col.data_type() {
        DataType::List(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<ListArray>()
                .context("expected ListArray")?;
            list_arr.value(row)
        }
        DataType::LargeList(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<LargeListArray>()
                .context("expected LargeListArray")?;
            list_arr.value(row)
        }
        other => bail!("Expected List or LargeList column, got {other:?}"),
    };

    if let Some(f64_arr) = values_array.as_any().downcast_ref::<Float64Array>() {
        Ok(f64_arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(f32_arr) = values_array.as_any().downcast_ref::<Float32Array>() {
        Ok(f32_arr.iter().map(|v| v.unwrap_or(f32::NAN) as f64).collect())
    } else {
        bail!(
            "List inner type is {:?}, expected Float64 or Float32",
            values_array.data_type()
        )
    }
}

/// Extract an integer class code. Nulls read as 0 ("unknown").
fn extract_label(col: &Arc<dyn Array>, row: usize) -> Result<i64> {
    if col.is_null(row) {
        return Ok(0);
    }
    match col.data_type() {
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            Ok(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            Ok(arr.value(row))
        }
        other => bail!("Expected Int32 or Int64 label column, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use arrow::array::{Float64Builder, ListBuilder};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::tempdir;

    use super::*;

    fn write_parquet(path: &Path, coeffs: &[Vec<f64>], labels: &[i32], evals: Option<&str>) {
        let mut builder = ListBuilder::new(Float64Builder::new());
        for row in coeffs {
            builder.values().append_slice(row);
            builder.append(true);
        }
        let coeff_array = builder.finish();
        let label_array = Int32Array::from(labels.to_vec());

        let mut metadata = HashMap::new();
        if let Some(evals) = evals {
            metadata.insert(EVALS_METADATA_KEY.to_string(), evals.to_string());
        }
        let schema = Arc::new(Schema::new_with_metadata(
            vec![
                Field::new(
                    COEFFS_COLUMN,
                    DataType::List(Arc::new(Field::new("item", DataType::Float64, true))),
                    false,
                ),
                Field::new(LABEL_COLUMN, DataType::Int32, false),
            ],
            metadata,
        ));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(coeff_array), Arc::new(label_array)],
        )
        .unwrap();

        let file = std::fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn loads_json_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spectra.json");
        std::fs::write(
            &path,
            r#"{"coeffs": [[0.1, 0.2, 0.3], [-0.4, 0.5, -0.6]],
                "evals": [3.0, 2.0, 1.0],
                "lineindex_cln": [3, 6]}"#,
        )
        .unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.evals(), &[3.0, 2.0, 1.0]);
        assert_eq!(ds.class_label(), &[3, 6]);
        assert_eq!(ds.component(2).collect::<Vec<_>>(), vec![0.3, -0.6]);
    }

    #[test]
    fn loads_parquet_with_evals_metadata() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spectra.parquet");
        let coeffs = vec![vec![0.1, 0.2, 0.3, 0.4], vec![0.5, 0.6, 0.7, 0.8]];
        write_parquet(&path, &coeffs, &[2, 5], Some("[4.0, 3.0, 2.0, 1.0]"));

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.n_components(), 4);
        assert_eq!(ds.component(0).collect::<Vec<_>>(), vec![0.1, 0.5]);
        assert_eq!(ds.component(3).collect::<Vec<_>>(), vec![0.4, 0.8]);
        assert_eq!(ds.class_label(), &[2, 5]);
        assert_eq!(ds.evals(), &[4.0, 3.0, 2.0, 1.0]);
    }

    #[test]
    fn parquet_without_evals_metadata_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spectra.parquet");
        write_parquet(&path, &[vec![0.0; 3]], &[1], None);

        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("evals"));
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = load_file(Path::new("spectra.npz")).unwrap_err();
        assert!(err.to_string().contains(".npz"));
    }
}
