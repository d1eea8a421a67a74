use std::path::PathBuf;

use crate::data::model::CoilAxis;

pub use crate::figure::RenderOptions;

// ---------------------------------------------------------------------------
// Figure settings
// ---------------------------------------------------------------------------

/// Inputs and output of figure 8a.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionSettings {
    pub plus_model: PathBuf,
    pub minus_model: PathBuf,
    pub coil_axis: CoilAxis,
    pub output: PathBuf,
    /// Open a viewer window after saving.
    pub show: bool,
}

impl Default for RegressionSettings {
    fn default() -> Self {
        // These may not be the bundles figure 8a was originally drawn from;
        // confirm with the data owner before publishing a regenerated figure.
        Self {
            plus_model: PathBuf::from("./Neural Network/Plus_X_Target_5_weights_regression.mat"),
            minus_model: PathBuf::from("./Neural Network/Minus_X_Target_5_weights_regression.mat"),
            coil_axis: CoilAxis::X,
            output: PathBuf::from("./figure8a-plot.png"),
            show: true,
        }
    }
}

/// Inputs and outputs of figures 10a and 10b.
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalSettings {
    pub expected: PathBuf,
    pub actual_nn: PathBuf,
    pub actual_sf: PathBuf,
    pub average_nn: PathBuf,
    pub comparison_output: PathBuf,
    pub average_output: PathBuf,
    /// Number of runs averaged into `average_nn`.
    pub average_trials: usize,
    /// Open a viewer window after saving each chart.
    pub show: bool,
}

impl Default for TraversalSettings {
    fn default() -> Self {
        let data = PathBuf::from("./plotdigitizer-data");
        Self {
            expected: data.join("expected-path-plot-data.csv"),
            actual_nn: data.join("actual-path-nn-plot-data.csv"),
            actual_sf: data.join("actual-path-sf-plot-data.csv"),
            average_nn: data.join("average-path-nn-plot-data.csv"),
            comparison_output: PathBuf::from("./figure10a-plot.png"),
            average_output: PathBuf::from("./figure10b-plot.png"),
            average_trials: 10,
            show: true,
        }
    }
}

/// Everything the entry point needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FigureConfig {
    pub regression: RegressionSettings,
    pub traversal: TraversalSettings,
    pub render: RenderOptions,
}

impl FigureConfig {
    /// The same configuration with both viewer switches turned off.
    pub fn headless(mut self) -> Self {
        self.regression.show = false;
        self.traversal.show = false;
        self
    }
}
