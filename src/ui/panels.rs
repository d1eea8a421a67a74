use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::figure::SeriesStyle;
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Left side panel – series list
// ---------------------------------------------------------------------------

/// Render the left panel: one checkbox per series, coloured like its plot.
pub fn side_panel(ui: &mut Ui, state: &mut ViewerState) {
    ui.heading("Series");
    ui.separator();

    let entries: Vec<(String, usize, SeriesStyle)> = state
        .figure
        .series
        .iter()
        .map(|s| (s.label.clone(), s.points.len(), s.style))
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (idx, (label, n_points, style)) in entries.iter().enumerate() {
                let mut checked = !state.hidden.get(idx).copied().unwrap_or(false);
                let text = RichText::new(format!("{label}  ({n_points})"))
                    .color(style.color().to_egui());
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_series(idx);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.label(RichText::new(&state.figure.title).strong());

        ui.separator();

        ui.label(format!(
            "Saved to {}  ·  {} points visible",
            state.saved_to.display(),
            state.visible_points()
        ));

        ui.separator();

        if ui
            .selectable_label(state.fixed_axes, "Fixed Axes")
            .clicked()
        {
            state.toggle_fixed_axes();
        }

        if ui.selectable_label(state.show_legend, "Legend").clicked() {
            state.toggle_legend();
        }
    });
}
