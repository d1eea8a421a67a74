use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error("x has {x} values but y has {y}")]
    LengthMismatch { x: usize, y: usize },

    #[error("linear regression needs at least two samples, got {0}")]
    TooFewSamples(usize),

    #[error("all x values are identical; the regression is undefined")]
    ConstantX,
}

/// Least-squares fit of `y` on `x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient, in `[-1, 1]`.
    pub rvalue: f64,
}

impl LinearFit {
    /// Coefficient of determination.
    pub fn r_squared(&self) -> f64 {
        self.rvalue * self.rvalue
    }
}

/// Ordinary least-squares regression of `y` on `x`.
///
/// A constant `y` gives `rvalue = 0`; a constant `x` has no defined slope
/// and is an error.
pub fn linregress(x: &[f64], y: &[f64]) -> Result<LinearFit, StatsError> {
    if x.len() != y.len() {
        return Err(StatsError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    let n = x.len();
    if n < 2 {
        return Err(StatsError::TooFewSamples(n));
    }

    let nf = n as f64;
    let x_mean = x.iter().sum::<f64>() / nf;
    let y_mean = y.iter().sum::<f64>() / nf;

    let (mut ssxm, mut ssym, mut ssxym) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        ssxm += dx * dx;
        ssym += dy * dy;
        ssxym += dx * dy;
    }

    if ssxm == 0.0 {
        return Err(StatsError::ConstantX);
    }

    let rvalue = if ssym == 0.0 {
        0.0
    } else {
        (ssxym / (ssxm * ssym).sqrt()).clamp(-1.0, 1.0)
    };
    let slope = ssxym / ssxm;

    Ok(LinearFit {
        slope,
        intercept: y_mean - slope * x_mean,
        rvalue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_form_r(x: &[f64], y: &[f64]) -> f64 {
        let n = x.len() as f64;
        let sx: f64 = x.iter().sum();
        let sy: f64 = y.iter().sum();
        let sxx: f64 = x.iter().map(|v| v * v).sum();
        let syy: f64 = y.iter().map(|v| v * v).sum();
        let sxy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
        (n * sxy - sx * sy) / ((n * sxx - sx * sx).sqrt() * (n * syy - sy * sy).sqrt())
    }

    #[test]
    fn identical_series_have_unit_r_squared() {
        let fit = linregress(&[10.0, 20.0], &[10.0, 20.0]).unwrap();
        assert_eq!(fit.r_squared(), 1.0);
        assert_eq!(format!("{:.5}", fit.r_squared()), "1.00000");
        assert!((fit.slope - 1.0).abs() < 1e-12);
        assert!(fit.intercept.abs() < 1e-12);
    }

    #[test]
    fn perfectly_linear_data_with_other_slope() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|v| 2.5 * v - 1.0).collect();
        let fit = linregress(&x, &y).unwrap();
        assert!((fit.r_squared() - 1.0).abs() < 1e-12);
        assert!((fit.slope - 2.5).abs() < 1e-12);
        assert!((fit.intercept + 1.0).abs() < 1e-12);
    }

    #[test]
    fn matches_closed_form_pearson() {
        let x = [12.0, 25.5, 33.1, 47.9, 52.0, 68.4, 75.3, 81.0];
        let y = [13.4, 24.0, 35.2, 45.1, 55.9, 66.0, 77.7, 80.2];
        let fit = linregress(&x, &y).unwrap();
        let expected = closed_form_r(&x, &y);
        assert!((fit.rvalue - expected).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&fit.r_squared()));
    }

    #[test]
    fn anticorrelated_data_still_has_r_squared_in_unit_interval() {
        let fit = linregress(&[1.0, 2.0, 3.0], &[9.0, 4.0, 1.0]).unwrap();
        assert!(fit.rvalue < 0.0);
        assert!((0.0..=1.0).contains(&fit.r_squared()));
    }

    #[test]
    fn constant_y_has_zero_correlation() {
        let fit = linregress(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]).unwrap();
        assert_eq!(fit.rvalue, 0.0);
        assert_eq!(fit.slope, 0.0);
    }

    #[test]
    fn degenerate_inputs_are_errors() {
        assert_eq!(
            linregress(&[1.0, 2.0], &[1.0]),
            Err(StatsError::LengthMismatch { x: 2, y: 1 })
        );
        assert_eq!(linregress(&[1.0], &[1.0]), Err(StatsError::TooFewSamples(1)));
        assert_eq!(
            linregress(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]),
            Err(StatsError::ConstantX)
        );
    }
}
