//! The publication figures.
//!
//! Each generator loads its inputs, builds one [`Figure`](crate::figure::Figure)
//! per chart, saves it, and optionally shows it. Generators share nothing and
//! may run in any order.

pub mod regression;
pub mod traversal;

pub use regression::regression_plot_generator;
pub use traversal::traversal_plot_generator;
