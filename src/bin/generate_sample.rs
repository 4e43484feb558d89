use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{Float64Builder, Int64Array, ListBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const N_SPECTRA: usize = 4000;
const N_COMPONENTS: usize = 10;
const N_EIGENVALUES: usize = 1000;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Class code, relative frequency, and (c1, c2, c3) cluster centre.
const CLASSES: [(i64, f64, [f64; 3]); 7] = [
    (0, 0.03, [0.0, 0.0, 0.0]),
    (1, 0.05, [-0.6, 0.5, 0.2]),
    (2, 0.30, [-0.4, -0.3, 0.1]),
    (3, 0.25, [-0.1, -0.1, 0.0]),
    (4, 0.27, [0.3, 0.1, -0.2]),
    (5, 0.05, [0.6, 0.4, 0.3]),
    (6, 0.05, [0.7, -0.6, 0.4]),
];

fn pick_class(rng: &mut SimpleRng) -> usize {
    let u = rng.next_f64();
    let mut acc = 0.0;
    for (i, &(_, weight, _)) in CLASSES.iter().enumerate() {
        acc += weight;
        if u < acc {
            return i;
        }
    }
    CLASSES.len() - 1
}

fn main() {
    let mut rng = SimpleRng::new(42);

    // Singular values with a power-law falloff.
    let evals: Vec<f64> = (0..N_EIGENVALUES)
        .map(|i| 9.0 * ((i + 1) as f64).powf(-1.1))
        .collect();

    let mut coeff_builder = ListBuilder::new(Float64Builder::new());
    let mut labels: Vec<i64> = Vec::with_capacity(N_SPECTRA);

    for _ in 0..N_SPECTRA {
        let class = pick_class(&mut rng);
        let (code, _, centre) = CLASSES[class];

        let values = coeff_builder.values();
        for c in 0..N_COMPONENTS {
            let spread = 0.15 / (c + 1) as f64;
            let mean = centre.get(c).copied().unwrap_or(0.0);
            values.append_value(rng.gauss(mean, spread));
        }
        coeff_builder.append(true);
        labels.push(code);
    }

    let coeff_array = coeff_builder.finish();
    let label_array = Int64Array::from(labels);

    let mut metadata = HashMap::new();
    metadata.insert(
        "evals".to_string(),
        serde_json::to_string(&evals).expect("Failed to encode eigenvalues"),
    );

    let schema = Arc::new(Schema::new_with_metadata(
        vec![
            Field::new("coeffs", DataType::List(Arc::new(Field::new("item", DataType::Float64, true))), false),
            Field::new("lineindex_cln", DataType::Int64, false),
        ],
        metadata,
    ));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(coeff_array), Arc::new(label_array)],
    )
    .expect("Failed to create RecordBatch");

    // Write Parquet
    let output_path = "sdss_corrected_spectra.parquet";
    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!(
        "Wrote {N_SPECTRA} spectra ({N_COMPONENTS} coefficients each, {N_EIGENVALUES} eigenvalues) to {output_path}"
    );
}
