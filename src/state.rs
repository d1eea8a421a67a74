use std::path::PathBuf;

use crate::figure::Figure;

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// The full viewer state, independent of rendering.
pub struct ViewerState {
    /// The chart being shown.
    pub figure: Figure,

    /// Where the same chart was saved.
    pub saved_to: PathBuf,

    /// Pin the plot bounds to the figure's fixed domain every frame.
    pub fixed_axes: bool,

    /// Whether the legend is drawn.
    pub show_legend: bool,

    /// Series hidden from the plot, by index.
    pub hidden: Vec<bool>,
}

impl ViewerState {
    pub fn new(figure: Figure, saved_to: PathBuf) -> Self {
        let hidden = vec![false; figure.series.len()];
        Self {
            figure,
            saved_to,
            fixed_axes: true,
            show_legend: true,
            hidden,
        }
    }

    pub fn toggle_fixed_axes(&mut self) {
        self.fixed_axes = !self.fixed_axes;
    }

    pub fn toggle_legend(&mut self) {
        self.show_legend = !self.show_legend;
    }

    /// Show or hide series `index`.
    pub fn toggle_series(&mut self, index: usize) {
        if let Some(h) = self.hidden.get_mut(index) {
            *h = !*h;
        }
    }

    /// Indices of series currently drawn.
    pub fn visible_series(&self) -> impl Iterator<Item = usize> + '_ {
        self.hidden
            .iter()
            .enumerate()
            .filter(|&(_, &hidden)| !hidden)
            .map(|(i, _)| i)
    }

    /// Total points across visible series, for the status line.
    pub fn visible_points(&self) -> usize {
        self.visible_series()
            .map(|i| self.figure.series[i].points.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::figure::{Axis, LineDash, Series};

    fn state() -> ViewerState {
        let mut fig = Figure::new("t", Axis::new(0.0, 1.0), Axis::new(0.0, 1.0));
        fig.push(Series::line("a", vec![(0.0, 0.0); 3], Rgb::BLACK, 2.0, LineDash::Solid));
        fig.push(Series::line("b", vec![(0.0, 0.0); 5], Rgb::RED, 2.0, LineDash::Dashed));
        ViewerState::new(fig, PathBuf::from("out.png"))
    }

    #[test]
    fn starts_with_everything_visible_and_pinned() {
        let s = state();
        assert!(s.fixed_axes);
        assert!(s.show_legend);
        assert_eq!(s.visible_series().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(s.visible_points(), 8);
    }

    #[test]
    fn toggling_series_changes_visible_points() {
        let mut s = state();
        s.toggle_series(1);
        assert_eq!(s.visible_series().collect::<Vec<_>>(), vec![0]);
        assert_eq!(s.visible_points(), 3);
        s.toggle_series(1);
        s.toggle_series(7);
        assert_eq!(s.visible_points(), 8);
    }

    #[test]
    fn toggles_flip_flags() {
        let mut s = state();
        s.toggle_fixed_axes();
        s.toggle_legend();
        assert!(!s.fixed_axes);
        assert!(!s.show_legend);
    }
}
