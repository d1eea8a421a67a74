//! Writes a synthetic data set at the default input paths so the figure
//! pipeline can be run without the laboratory data.

use std::f64::consts::PI;
use std::path::Path;

use anyhow::{Context, Result};

use magneto_figures::config::FigureConfig;
use magneto_figures::data::mat::{write_file, MatValue, NumericArray, StructArray};
use magneto_figures::data::model::{
    target_variable, CoilAxis, Polarity, OUTPUTS_VARIABLE, TEST_INDICES_FIELD, TRAINING_RECORD,
};

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + std_dev * z
    }
}

// ---------------------------------------------------------------------------
// Model result bundles
// ---------------------------------------------------------------------------

const SAMPLES: usize = 400;

fn write_bundle(path: &Path, polarity: Polarity, noise: f64, rng: &mut SimpleRng) -> Result<()> {
    let targets: Vec<f64> = (0..SAMPLES).map(|_| 5.0 + 80.0 * rng.next_f64()).collect();
    let outputs: Vec<f64> = targets.iter().map(|&t| rng.gauss(t, noise)).collect();

    // 70/15/15 split, one-based like MATLAB's dividerand.
    let (mut train, mut val, mut test) = (Vec::new(), Vec::new(), Vec::new());
    for i in 1..=SAMPLES {
        let r = rng.next_f64();
        let bucket = if r < 0.70 {
            &mut train
        } else if r < 0.85 {
            &mut val
        } else {
            &mut test
        };
        bucket.push(i as f64);
    }

    let tr = MatValue::singleton_cell(
        StructArray::scalar(vec![
            ("trainFcn", MatValue::from("trainlm")),
            ("divideFcn", MatValue::from("dividerand")),
            ("trainInd", NumericArray::row_vector(&train).into()),
            ("valInd", NumericArray::row_vector(&val).into()),
            (TEST_INDICES_FIELD, NumericArray::row_vector(&test).into()),
        ])
        .into(),
    );
    let all_output = MatValue::singleton_cell(NumericArray::row_vector(&outputs).into());
    let all_targets: MatValue = NumericArray::column_vector(&targets).into();
    let target_name = target_variable(CoilAxis::X, polarity);

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    write_file(
        path,
        &[
            (TRAINING_RECORD, &tr),
            (OUTPUTS_VARIABLE, &all_output),
            (target_name.as_str(), &all_targets),
        ],
        true,
    )
    .with_context(|| format!("writing {}", path.display()))?;

    log::info!(
        "Wrote {} ({SAMPLES} samples, {} test)",
        path.display(),
        test.len()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Traversal paths
// ---------------------------------------------------------------------------

/// A figure-eight through the working area.
fn expected_point(t: f64) -> (f64, f64) {
    (10.0 * t.sin(), -2.5 + 7.0 * t.sin() * t.cos())
}

fn sample_path(n: usize, noise: f64, rng: &mut SimpleRng) -> Vec<(f64, f64)> {
    (0..n)
        .map(|i| {
            let (x, y) = expected_point(2.0 * PI * i as f64 / (n - 1) as f64);
            (rng.gauss(x, noise), rng.gauss(y, noise))
        })
        .collect()
}

fn write_path(path: &Path, points: &[(f64, f64)]) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["x", "y"])?;
    for (x, y) in points {
        writer.write_record([format!("{x:.4}"), format!("{y:.4}")])?;
    }
    writer.flush()?;
    log::info!("Wrote {} ({} points)", path.display(), points.len());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);
    let config = FigureConfig::default();

    write_bundle(&config.regression.plus_model, Polarity::Plus, 1.2, &mut rng)?;
    write_bundle(&config.regression.minus_model, Polarity::Minus, 1.8, &mut rng)?;

    let traversal = &config.traversal;
    write_path(&traversal.expected, &sample_path(120, 0.0, &mut rng))?;
    write_path(&traversal.actual_nn, &sample_path(95, 0.35, &mut rng))?;
    write_path(&traversal.actual_sf, &sample_path(80, 0.8, &mut rng))?;

    let trials = traversal.average_trials;
    let runs: Vec<Vec<(f64, f64)>> = (0..trials)
        .map(|_| sample_path(110, 0.35, &mut rng))
        .collect();
    let average: Vec<(f64, f64)> = (0..110)
        .map(|i| {
            let (sx, sy) = runs
                .iter()
                .fold((0.0, 0.0), |(ax, ay), run| (ax + run[i].0, ay + run[i].1));
            (sx / trials as f64, sy / trials as f64)
        })
        .collect();
    write_path(&traversal.average_nn, &average)?;

    println!("Wrote sample inputs; run `magneto-figures` to render the figures.");
    Ok(())
}
