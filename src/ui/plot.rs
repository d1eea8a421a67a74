use eframe::egui::Ui;
use egui_plot::{Corner, Legend, Line, LineStyle, MarkerShape, Plot, PlotBounds, PlotPoints, Points};

use crate::figure::{LegendPosition, LineDash, SeriesStyle};
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Figure plot (central panel)
// ---------------------------------------------------------------------------

/// Render the figure in the central panel.
pub fn figure_plot(ui: &mut Ui, state: &ViewerState) {
    let figure = &state.figure;

    let mut plot = Plot::new("figure_plot")
        .include_x(figure.x_axis.min)
        .include_x(figure.x_axis.max)
        .include_y(figure.y_axis.min)
        .include_y(figure.y_axis.max)
        .show_grid(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    if state.show_legend {
        plot = plot.legend(Legend::default().position(corner(figure.legend)));
    }
    if let Some(label) = &figure.x_axis.label {
        plot = plot.x_axis_label(label.as_str());
    }
    if let Some(label) = &figure.y_axis.label {
        plot = plot.y_axis_label(label.as_str());
    }

    plot.show(ui, |plot_ui| {
        if state.fixed_axes {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                [figure.x_axis.min, figure.y_axis.min],
                [figure.x_axis.max, figure.y_axis.max],
            ));
        }

        for idx in state.visible_series() {
            let series = &figure.series[idx];
            let points: PlotPoints = series.points.iter().map(|&(x, y)| [x, y]).collect();

            match series.style {
                SeriesStyle::Line {
                    color,
                    width_pt,
                    dash,
                } => {
                    let style = match dash {
                        LineDash::Solid => LineStyle::Solid,
                        LineDash::Dashed => LineStyle::dashed_loose(),
                    };
                    let line = Line::new(points)
                        .name(&series.label)
                        .color(color.to_egui())
                        .width(width_pt as f32)
                        .style(style);
                    plot_ui.line(line);
                }
                SeriesStyle::Scatter { color, marker_pt } => {
                    let markers = Points::new(points)
                        .name(&series.label)
                        .color(color.to_egui())
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(marker_pt as f32);
                    plot_ui.points(markers);
                }
            }
        }
    });
}

fn corner(position: LegendPosition) -> Corner {
    match position {
        LegendPosition::UpperRight => Corner::RightTop,
        LegendPosition::UpperLeft => Corner::LeftTop,
        LegendPosition::LowerRight => Corner::RightBottom,
        LegendPosition::LowerLeft => Corner::LeftBottom,
    }
}
