use anyhow::{Context, Result};

use crate::app::show_figure;
use crate::color::Rgb;
use crate::config::RegressionSettings;
use crate::data::loader::load_result_bundle;
use crate::data::model::{CoilAxis, ModelResultBundle, Polarity, TestSplit};
use crate::figure::{save_png, tick_range, Axis, Figure, LegendPosition, LineDash, RenderOptions, Series};
use crate::stats::{linregress, LinearFit};

/// Both axes span the full scale-factor range.
const DOMAIN: (f64, f64) = (0.0, 90.0);
const TICK_STEP: f64 = 10.0;
/// Marker area of 8 pt², as a diameter.
const MARKER_PT: f64 = 2.828_427_124_746_19;
const REFERENCE_LABEL: &str = "Predicted = Expected";
const REFERENCE_WIDTH_PT: f64 = 3.0;

/// Test split of one coil model and its regression against the targets.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarityFit {
    pub split: TestSplit,
    pub fit: LinearFit,
}

impl PolarityFit {
    pub fn r_squared(&self) -> f64 {
        self.fit.r_squared()
    }
}

/// Select the test samples of `bundle` and regress outputs on targets.
pub fn fit_polarity(bundle: &ModelResultBundle) -> Result<PolarityFit> {
    let split = bundle
        .test_split()
        .with_context(|| format!("selecting {} coil test samples", bundle.polarity.name()))?;
    let fit = linregress(&split.targets, &split.outputs)
        .with_context(|| format!("regressing {} coil outputs on targets", bundle.polarity.name()))?;
    Ok(PolarityFit { split, fit })
}

pub fn legend_label(axis: CoilAxis, polarity: Polarity, r_squared: f64) -> String {
    format!("{}{axis}: R² = {r_squared:.5}", polarity.sign())
}

pub fn title(axis: CoilAxis) -> String {
    format!("Predicted vs. Expected Current Scale Factor for +{axis} and -{axis} Coil")
}

/// Scatter of (target, output) per polarity plus the identity reference.
pub fn build_regression_figure(axis: CoilAxis, plus: &PolarityFit, minus: &PolarityFit) -> Figure {
    let axis_of = || Axis::new(DOMAIN.0, DOMAIN.1).with_ticks(tick_range(DOMAIN.0, DOMAIN.1, TICK_STEP));
    let mut figure = Figure::new(title(axis), axis_of(), axis_of()).with_legend(LegendPosition::LowerRight);

    for (i, pf) in [plus, minus].into_iter().enumerate() {
        let points = pf
            .split
            .targets
            .iter()
            .copied()
            .zip(pf.split.outputs.iter().copied())
            .collect();
        figure.push(Series::scatter(
            legend_label(axis, pf.split.polarity, pf.r_squared()),
            points,
            Rgb::cycle(i),
            MARKER_PT,
        ));
    }

    let reach = plus
        .split
        .targets
        .iter()
        .copied()
        .filter(|t| t.is_finite())
        .fold(0.0, f64::max);
    figure.push(Series::line(
        REFERENCE_LABEL,
        vec![(0.0, 0.0), (reach, reach)],
        Rgb::LIME,
        REFERENCE_WIDTH_PT,
        LineDash::Solid,
    ));

    figure
}

/// Figure 8a: regression accuracy of the plus and minus coil models.
pub fn regression_plot_generator(settings: &RegressionSettings, render: &RenderOptions) -> Result<()> {
    let axis = settings.coil_axis;
    let plus = load_result_bundle(&settings.plus_model, axis, Polarity::Plus)?;
    let minus = load_result_bundle(&settings.minus_model, axis, Polarity::Minus)?;

    let plus_fit = fit_polarity(&plus)?;
    let minus_fit = fit_polarity(&minus)?;
    for pf in [&plus_fit, &minus_fit] {
        log::info!(
            "{}{axis} coil: test R² = {:.5} (slope {:.4}, intercept {:.4}, n = {})",
            pf.split.polarity.sign(),
            pf.r_squared(),
            pf.fit.slope,
            pf.fit.intercept,
            pf.split.outputs.len()
        );
    }

    let figure = build_regression_figure(axis, &plus_fit, &minus_fit);
    save_png(&figure, &settings.output, render)
        .with_context(|| format!("saving {}", settings.output.display()))?;

    if settings.show {
        show_figure(&figure, &settings.output)?;
    }
    Ok(())
}
