use anyhow::{Context, Result};

use crate::app::show_figure;
use crate::color::Rgb;
use crate::config::TraversalSettings;
use crate::data::loader::load_traversal;
use crate::data::model::TraversalTable;
use crate::figure::{save_png, tick_range, Axis, Figure, LegendPosition, LineDash, RenderOptions, Series};

const LINE_WIDTH_PT: f64 = 2.0;

fn x_axis() -> Axis {
    Axis::new(-15.0, 15.0)
        .with_ticks(tick_range(-12.0, 12.0, 2.0))
        .with_label("X-Coordinates (mm)")
}

fn y_axis() -> Axis {
    Axis::new(-15.0, 10.0)
        .with_ticks(tick_range(-15.0, 10.0, 5.0))
        .with_label("Y-Coordinates (mm)")
}

fn expected_series(expected: &TraversalTable) -> Series {
    Series::line(
        "Expected Path",
        expected.points(),
        Rgb::BLACK,
        LINE_WIDTH_PT,
        LineDash::Solid,
    )
}

/// Figure 10a: the desired path against one NN-controlled and one
/// SF-controlled run.
pub fn comparison_figure(
    expected: &TraversalTable,
    actual_nn: &TraversalTable,
    actual_sf: &TraversalTable,
) -> Figure {
    let mut figure = Figure::new(
        "Actual Path Traversed By Particle vs. Desired Path",
        x_axis(),
        y_axis(),
    )
    .with_legend(LegendPosition::UpperRight);
    figure.push(expected_series(expected));
    figure.push(Series::line(
        "Actual Path (NN)",
        actual_nn.points(),
        Rgb::BLUE,
        LINE_WIDTH_PT,
        LineDash::Dashed,
    ));
    figure.push(Series::line(
        "Actual Path (SF)",
        actual_sf.points(),
        Rgb::LIME,
        LINE_WIDTH_PT,
        LineDash::Dashed,
    ));
    figure
}

/// Figure 10b: the desired path against the NN path averaged over `trials` runs.
pub fn average_figure(expected: &TraversalTable, average_nn: &TraversalTable, trials: usize) -> Figure {
    let mut figure = Figure::new(
        format!("Neural Network - Expected vs. Average Translation for N = {trials} Trials"),
        x_axis(),
        y_axis(),
    )
    .with_legend(LegendPosition::UpperRight);
    figure.push(expected_series(expected));
    figure.push(Series::line(
        "Mean Actual Path",
        average_nn.points(),
        Rgb::RED,
        LINE_WIDTH_PT,
        LineDash::Dashed,
    ));
    figure
}

/// Figures 10a and 10b from the four digitised path tables.
pub fn traversal_plot_generator(settings: &TraversalSettings, render: &RenderOptions) -> Result<()> {
    let expected = load_traversal(&settings.expected)?;
    let actual_nn = load_traversal(&settings.actual_nn)?;
    let actual_sf = load_traversal(&settings.actual_sf)?;
    let average_nn = load_traversal(&settings.average_nn)?;

    let comparison = comparison_figure(&expected, &actual_nn, &actual_sf);
    save_png(&comparison, &settings.comparison_output, render)
        .with_context(|| format!("saving {}", settings.comparison_output.display()))?;
    if settings.show {
        show_figure(&comparison, &settings.comparison_output)?;
    }

    let average = average_figure(&expected, &average_nn, settings.average_trials);
    save_png(&average, &settings.average_output, render)
        .with_context(|| format!("saving {}", settings.average_output.display()))?;
    if settings.show {
        show_figure(&average, &settings.average_output)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::PathPoint;

    fn path(n: usize, offset: f64) -> TraversalTable {
        TraversalTable::from_points((0..n).map(|i| PathPoint {
            x: -12.0 + i as f64,
            y: offset + 0.5 * i as f64,
        }))
    }

    #[test]
    fn every_row_becomes_one_point_even_with_uneven_lengths() {
        let expected = path(25, 0.0);
        let nn = path(7, 0.3);
        let sf = path(40, -0.2);
        let fig = comparison_figure(&expected, &nn, &sf);

        let counts: Vec<usize> = fig.series.iter().map(|s| s.points.len()).collect();
        assert_eq!(counts, vec![25, 7, 40]);
        assert_eq!(fig.series[1].points, nn.points());
    }

    #[test]
    fn comparison_styles_match_the_publication() {
        let t = path(3, 0.0);
        let fig = comparison_figure(&t, &t, &t);
        let labels: Vec<&str> = fig.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Expected Path", "Actual Path (NN)", "Actual Path (SF)"]);
        assert_eq!(
            fig.series[0].style,
            crate::figure::SeriesStyle::Line {
                color: Rgb::BLACK,
                width_pt: 2.0,
                dash: LineDash::Solid
            }
        );
        assert_eq!(fig.series[2].style.color(), Rgb::LIME);
    }

    #[test]
    fn both_charts_share_fixed_axes() {
        let far = TraversalTable::from_points([PathPoint { x: 100.0, y: -100.0 }]);
        let a = comparison_figure(&far, &far, &far);
        let b = average_figure(&far, &far, 10);
        for fig in [&a, &b] {
            assert_eq!((fig.x_axis.min, fig.x_axis.max), (-15.0, 15.0));
            assert_eq!((fig.y_axis.min, fig.y_axis.max), (-15.0, 10.0));
            assert_eq!(fig.x_axis.ticks.first(), Some(&-12.0));
            assert_eq!(fig.x_axis.ticks.last(), Some(&12.0));
            assert_eq!(fig.x_axis.ticks.len(), 13);
            assert_eq!(fig.x_axis.label.as_deref(), Some("X-Coordinates (mm)"));
        }
    }

    #[test]
    fn average_title_names_trial_count() {
        let t = path(2, 0.0);
        let fig = average_figure(&t, &path(5, 1.0), 10);
        assert_eq!(
            fig.title,
            "Neural Network - Expected vs. Average Translation for N = 10 Trials"
        );
        assert_eq!(fig.series_named("Mean Actual Path").map(|s| s.points.len()), Some(5));
    }

    #[test]
    fn empty_tables_plot_empty_series() {
        let empty = TraversalTable::default();
        let fig = average_figure(&empty, &empty, 3);
        assert!(fig.series.iter().all(|s| s.points.is_empty()));
    }
}
