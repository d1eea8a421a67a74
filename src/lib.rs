//! Figure generation for the neural-network magnetic particle steering paper.
//!
//! * [`plots::regression_plot_generator`] – figure 8a, predicted vs. expected
//!   coil current scale factors with test-set R².
//! * [`plots::traversal_plot_generator`] – figures 10a/10b, expected vs.
//!   actual particle paths.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod figure;
pub mod plots;
pub mod state;
pub mod stats;
pub mod ui;
