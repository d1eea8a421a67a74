/// Backend-neutral chart description.
///
/// A [`Figure`] is built once per chart and handed to both the PNG renderer
/// ([`render`]) and the interactive viewer, so what is shown on screen is
/// always what was saved.

pub mod render;

use crate::color::Rgb;

pub use render::{render_png, save_png, RenderOptions};

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

/// A fixed axis domain with explicit tick positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub ticks: Vec<f64>,
    pub label: Option<String>,
}

impl Axis {
    pub fn new(min: f64, max: f64) -> Self {
        Axis {
            min,
            max,
            ticks: vec![min, max],
            label: None,
        }
    }

    pub fn with_ticks(mut self, ticks: Vec<f64>) -> Self {
        self.ticks = ticks;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Evenly spaced values from `start` to `stop`, both inclusive.
pub fn tick_range(start: f64, stop: f64, step: f64) -> Vec<f64> {
    let n = ((stop - start) / step).round() as usize;
    (0..=n).map(|i| start + i as f64 * step).collect()
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDash {
    Solid,
    Dashed,
}

/// How a series is drawn. Sizes are in points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesStyle {
    Line {
        color: Rgb,
        width_pt: f64,
        dash: LineDash,
    },
    Scatter {
        color: Rgb,
        /// Marker diameter.
        marker_pt: f64,
    },
}

impl SeriesStyle {
    pub fn color(&self) -> Rgb {
        match *self {
            SeriesStyle::Line { color, .. } | SeriesStyle::Scatter { color, .. } => color,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    pub style: SeriesStyle,
}

impl Series {
    pub fn line(
        label: impl Into<String>,
        points: Vec<(f64, f64)>,
        color: Rgb,
        width_pt: f64,
        dash: LineDash,
    ) -> Self {
        Series {
            label: label.into(),
            points,
            style: SeriesStyle::Line {
                color,
                width_pt,
                dash,
            },
        }
    }

    pub fn scatter(
        label: impl Into<String>,
        points: Vec<(f64, f64)>,
        color: Rgb,
        marker_pt: f64,
    ) -> Self {
        Series {
            label: label.into(),
            points,
            style: SeriesStyle::Scatter { color, marker_pt },
        }
    }
}

// ---------------------------------------------------------------------------
// Figure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendPosition {
    #[default]
    UpperRight,
    UpperLeft,
    LowerRight,
    LowerLeft,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    /// Drawn in order; later series paint over earlier ones.
    pub series: Vec<Series>,
    pub legend: LegendPosition,
}

impl Figure {
    pub fn new(title: impl Into<String>, x_axis: Axis, y_axis: Axis) -> Self {
        Figure {
            title: title.into(),
            x_axis,
            y_axis,
            series: Vec::new(),
            legend: LegendPosition::default(),
        }
    }

    pub fn with_legend(mut self, legend: LegendPosition) -> Self {
        self.legend = legend;
        self
    }

    pub fn push(&mut self, series: Series) {
        self.series.push(series);
    }

    pub fn series_named(&self, label: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.label == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_range_is_inclusive() {
        assert_eq!(tick_range(0.0, 90.0, 10.0).len(), 10);
        assert_eq!(
            tick_range(-12.0, 12.0, 2.0),
            vec![-12.0, -10.0, -8.0, -6.0, -4.0, -2.0, 0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0]
        );
    }

    #[test]
    fn series_lookup_by_label() {
        let mut fig = Figure::new("t", Axis::new(0.0, 1.0), Axis::new(0.0, 1.0))
            .with_legend(LegendPosition::LowerRight);
        fig.push(Series::line("a", vec![(0.0, 0.0)], Rgb::BLACK, 2.0, LineDash::Solid));
        fig.push(Series::scatter("b", vec![(0.5, 0.5)], Rgb::RED, 2.0));

        assert_eq!(fig.series_named("b").map(|s| s.style.color()), Some(Rgb::RED));
        assert!(fig.series_named("c").is_none());
        assert_eq!(fig.legend, LegendPosition::LowerRight);
    }
}
