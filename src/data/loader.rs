use std::path::Path;

use anyhow::{Context, Result};

use super::mat;
use super::model::{CoilAxis, ModelResultBundle, PathPoint, Polarity, TraversalTable};

// ---------------------------------------------------------------------------
// Model result bundles (.mat)
// ---------------------------------------------------------------------------

/// Load the result bundle of the model trained for one coil.
///
/// Expected variables:
/// * `tr` – training record; `tr.testInd` holds one-based test indices
/// * `All_output` – network outputs (first row used)
/// * `All_<axis>_<plus|minus>_target_data` – one target row per sample
pub fn load_result_bundle(
    path: &Path,
    axis: CoilAxis,
    polarity: Polarity,
) -> Result<ModelResultBundle> {
    let file = mat::read_file(path)
        .with_context(|| format!("reading MAT file {}", path.display()))?;
    log::debug!(
        "{}: variables {:?}",
        path.display(),
        file.names().collect::<Vec<_>>()
    );

    let bundle = ModelResultBundle::from_mat(&file, axis, polarity).with_context(|| {
        format!(
            "extracting {}{axis} coil results from {}",
            polarity.sign(),
            path.display()
        )
    })?;
    log::info!(
        "Loaded {}{axis} bundle {}: {} samples, {} test",
        polarity.sign(),
        path.display(),
        bundle.outputs.len(),
        bundle.test_indices.len()
    );
    Ok(bundle)
}

// ---------------------------------------------------------------------------
// Traversal tables (.csv)
// ---------------------------------------------------------------------------

/// CSV layout: header row naming at least `x` and `y`; one path point per
/// row. Other columns are ignored.
pub fn load_traversal(path: &Path) -> Result<TraversalTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("reading CSV headers of {}", path.display()))?
        .clone();
    for column in ["x", "y"] {
        if !headers.iter().any(|h| h == column) {
            anyhow::bail!("CSV {} missing '{column}' column", path.display());
        }
    }

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("reading {}", path.display()))?;
        let line = record.position().map_or(0, |p| p.line());
        let point: PathPoint = record
            .deserialize(Some(&headers))
            .with_context(|| format!("{} line {line}", path.display()))?;
        points.push(point);
    }

    let table = TraversalTable::from_points(points);
    log::info!("Loaded {} path points from {}", table.len(), path.display());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::mat::{write_file, MatValue, NumericArray, StructArray};
    use crate::data::model::target_variable;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn load_traversal_reads_xy_and_ignores_other_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expected.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "t, x, y").unwrap();
        writeln!(file, "0, -12.0, 4.5").unwrap();
        writeln!(file, "1, -11.5, 4.25").unwrap();
        writeln!(file, "2, -11.0, 4.0").unwrap();

        let table = load_traversal(&path).unwrap();
        assert_eq!(table.x, vec![-12.0, -11.5, -11.0]);
        assert_eq!(table.y, vec![4.5, 4.25, 4.0]);
    }

    #[test]
    fn load_traversal_reports_the_file_line_of_a_bad_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "x,y\n1.0,2.0\n3.0,oops\n").unwrap();

        let err = format!("{:#}", load_traversal(&path).unwrap_err());
        assert!(err.contains("bad.csv line 3"), "{err}");
    }

    #[test]
    fn load_traversal_requires_both_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_y.csv");
        std::fs::write(&path, "x,z\n1,2\n").unwrap();

        let err = load_traversal(&path).unwrap_err();
        assert!(format!("{err:#}").contains("missing 'y' column"));
    }

    #[test]
    fn load_traversal_header_only_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "x,y\n").unwrap();
        assert!(load_traversal(&path).unwrap().is_empty());
    }

    #[test]
    fn load_traversal_rejects_non_numeric_cells() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "x,y\n1,2\nabc,3\n").unwrap();
        let err = load_traversal(&path).unwrap_err();
        assert!(format!("{err:#}").contains("row 1"));
    }

    #[test]
    fn load_traversal_missing_file_fails() {
        let dir = tempdir().unwrap();
        assert!(load_traversal(&dir.path().join("absent.csv")).is_err());
    }

    #[test]
    fn load_result_bundle_from_compressed_mat() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Minus_X.mat");

        let tr = MatValue::singleton_cell(
            StructArray::scalar(vec![
                ("trainFcn", MatValue::from("trainlm")),
                ("testInd", NumericArray::row_vector(&[2.0, 4.0]).into()),
            ])
            .into(),
        );
        let outputs = MatValue::singleton_cell(NumericArray::row_vector(&[1.0, 10.0, 3.0, 20.0]).into());
        let targets: MatValue = NumericArray::column_vector(&[1.5, 10.0, 2.5, 20.0]).into();
        let target_name = target_variable(CoilAxis::X, Polarity::Minus);
        write_file(
            &path,
            &[("tr", &tr), ("All_output", &outputs), (target_name.as_str(), &targets)],
            true,
        )
        .unwrap();

        let bundle = load_result_bundle(&path, CoilAxis::X, Polarity::Minus).unwrap();
        let split = bundle.test_split().unwrap();
        assert_eq!(split.outputs, vec![10.0, 20.0]);
        assert_eq!(split.targets, vec![10.0, 20.0]);
    }

    #[test]
    fn load_result_bundle_names_the_file_on_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.mat");
        std::fs::write(&path, b"not a mat file").unwrap();

        let err = load_result_bundle(&path, CoilAxis::X, Polarity::Plus).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("garbage.mat"));
        assert!(msg.contains("Invalid MAT header"));
    }
}
