use std::fmt;

use serde::Deserialize;

use super::mat::{MatFile, MatValue, NumericArray};
use crate::error::BundleError;

// ---------------------------------------------------------------------------
// Coil axis / polarity
// ---------------------------------------------------------------------------

/// The coil pair a regression model was trained for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoilAxis {
    #[default]
    X,
    Y,
}

impl fmt::Display for CoilAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoilAxis::X => write!(f, "X"),
            CoilAxis::Y => write!(f, "Y"),
        }
    }
}

/// Which coil of the pair (positive or negative side of the axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Plus,
    Minus,
}

impl Polarity {
    pub fn sign(self) -> char {
        match self {
            Polarity::Plus => '+',
            Polarity::Minus => '-',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Polarity::Plus => "plus",
            Polarity::Minus => "minus",
        }
    }
}

/// Training record variable holding the data split.
pub const TRAINING_RECORD: &str = "tr";
/// Field of the training record listing one-based test sample indices.
pub const TEST_INDICES_FIELD: &str = "testInd";
/// Variable holding the network outputs for every sample.
pub const OUTPUTS_VARIABLE: &str = "All_output";

/// Name of the target matrix variable, e.g. `All_X_plus_target_data`.
pub fn target_variable(axis: CoilAxis, polarity: Polarity) -> String {
    format!("All_{axis}_{}_target_data", polarity.name())
}

// ---------------------------------------------------------------------------
// ModelResultBundle
// ---------------------------------------------------------------------------

/// The parts of one trained model's result file that figure 8a needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResultBundle {
    pub polarity: Polarity,
    /// Zero-based test sample positions.
    pub test_indices: Vec<usize>,
    /// Network output per sample.
    pub outputs: Vec<f64>,
    /// Expected values, one row per sample.
    pub targets: NumericArray,
}

/// Test-set targets and outputs in matching sample order.
#[derive(Debug, Clone, PartialEq)]
pub struct TestSplit {
    pub polarity: Polarity,
    pub targets: Vec<f64>,
    pub outputs: Vec<f64>,
}

impl ModelResultBundle {
    /// Pull the test indices, outputs and targets out of a decoded file.
    pub fn from_mat(file: &MatFile, axis: CoilAxis, polarity: Polarity) -> Result<Self, BundleError> {
        let record = variable(file, TRAINING_RECORD)?;
        let test_ind = record
            .field(TEST_INDICES_FIELD)
            .ok_or_else(|| BundleError::MissingField {
                variable: TRAINING_RECORD.to_string(),
                field: TEST_INDICES_FIELD.to_string(),
            })?
            .as_numeric()
            .ok_or_else(|| BundleError::NotNumeric(format!("{TRAINING_RECORD}.{TEST_INDICES_FIELD}")))?;
        let test_indices = to_zero_based(&test_ind.data)?;

        let outputs = numeric(file, OUTPUTS_VARIABLE)?.first_row();

        let target_name = target_variable(axis, polarity);
        let targets = numeric(file, &target_name)?;
        // A row vector still means one sample per element.
        let targets = if targets.rows() == 1 && targets.cols() > 1 {
            NumericArray::column_vector(&targets.data)
        } else {
            targets.clone()
        };

        Ok(ModelResultBundle {
            polarity,
            test_indices,
            outputs,
            targets,
        })
    }

    /// Select the test samples. Target rows are flattened column by column,
    /// so a single-column target lines up with the outputs one-to-one.
    pub fn test_split(&self) -> Result<TestSplit, BundleError> {
        let outputs = self
            .test_indices
            .iter()
            .map(|&i| {
                self.outputs
                    .get(i)
                    .copied()
                    .ok_or(BundleError::IndexOutOfRange {
                        what: "outputs",
                        index: i + 1,
                        len: self.outputs.len(),
                    })
            })
            .collect::<Result<Vec<f64>, BundleError>>()?;

        let rows = self.targets.rows();
        if let Some(&bad) = self.test_indices.iter().find(|&&i| i >= rows) {
            return Err(BundleError::IndexOutOfRange {
                what: "targets",
                index: bad + 1,
                len: rows,
            });
        }
        let targets: Vec<f64> = (0..self.targets.cols())
            .flat_map(|c| {
                self.test_indices
                    .iter()
                    .filter_map(move |&i| self.targets.get(i, c))
            })
            .collect();

        Ok(TestSplit {
            polarity: self.polarity,
            targets,
            outputs,
        })
    }
}

/// Convert one-based sample indices to zero-based positions.
pub fn to_zero_based(one_based: &[f64]) -> Result<Vec<usize>, BundleError> {
    one_based
        .iter()
        .map(|&v| {
            if v.is_finite() && v >= 1.0 && v.fract() == 0.0 {
                Ok(v as usize - 1)
            } else {
                Err(BundleError::InvalidIndex { value: v })
            }
        })
        .collect()
}

fn variable<'a>(file: &'a MatFile, name: &str) -> Result<&'a MatValue, BundleError> {
    file.get(name)
        .ok_or_else(|| BundleError::MissingVariable(name.to_string()))
}

fn numeric<'a>(file: &'a MatFile, name: &str) -> Result<&'a NumericArray, BundleError> {
    variable(file, name)?
        .as_numeric()
        .ok_or_else(|| BundleError::NotNumeric(name.to_string()))
}

// ---------------------------------------------------------------------------
// TraversalTable
// ---------------------------------------------------------------------------

/// One row of a traversal CSV. Extra columns are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
}

/// An ordered 2-D path, stored column-wise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraversalTable {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl TraversalTable {
    pub fn from_points(points: impl IntoIterator<Item = PathPoint>) -> Self {
        let (x, y) = points.into_iter().map(|p| (p.x, p.y)).unzip();
        TraversalTable { x, y }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// `(x, y)` pairs in row order.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.x.iter().copied().zip(self.y.iter().copied()).collect()
    }
}
