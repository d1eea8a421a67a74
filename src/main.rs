use magneto_figures::config::FigureConfig;
use magneto_figures::plots::{regression_plot_generator, traversal_plot_generator};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = FigureConfig::default();

    regression_plot_generator(&config.regression, &config.render)?;
    traversal_plot_generator(&config.traversal, &config.render)?;

    Ok(())
}
