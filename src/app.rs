use std::path::Path;

use anyhow::{anyhow, Result};
use eframe::egui;

use crate::figure::Figure;
use crate::state::ViewerState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct FigureApp {
    pub state: ViewerState,
}

impl FigureApp {
    pub fn new(state: ViewerState) -> Self {
        Self { state }
    }
}

impl eframe::App for FigureApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title, output path, toggles ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: series list ----
        egui::SidePanel::left("series_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::figure_plot(ui, &self.state);
        });
    }
}

/// Show `figure` in a native window and block until it is closed.
///
/// The saved file is not touched; `saved_to` is only displayed.
pub fn show_figure(figure: &Figure, saved_to: &Path) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let state = ViewerState::new(figure.clone(), saved_to.to_path_buf());
    log::info!("Showing '{}' (close the window to continue)", figure.title);

    eframe::run_native(
        &figure.title,
        options,
        Box::new(|_cc| Ok(Box::new(FigureApp::new(state)))),
    )
    .map_err(|e| anyhow!("viewer for '{}' failed: {e}", figure.title))
}
