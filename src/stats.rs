//! Linear regression of museum visitors on city population.
//!
//! The museums with a known city population are shuffled and split into a
//! training and a held-out test set. An ordinary least squares line is fit on
//! the training set and scored on the test set.

use crate::error::StatsError;
use crate::models::MuseumWithPopulation;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, instrument};

/// `visitors = coefficient * population + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearModel {
    pub coefficient: f64,
    pub intercept: f64,
}

impl LinearModel {
    pub fn predict(&self, x: f64) -> f64 {
        self.coefficient * x + self.intercept
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionReport {
    pub model: LinearModel,
    /// Pearson's r derived from the slope: `coefficient * std(x) / std(y)`.
    pub correlation: f64,
    pub mean_absolute_error: f64,
    pub mean_squared_error: f64,
    pub root_mean_squared_error: f64,
    pub train_size: usize,
    pub test_size: usize,
}

/// Fit and evaluate the population → visitors model.
///
/// `test_fraction` of the rows (rounded up) are held out. With a `seed` the
/// split is reproducible.
///
/// # Errors
///
/// [`StatsError::InsufficientData`] when fewer than two training rows or no
/// test rows remain, or when population or visitors have no variance.
#[instrument(level = "info", skip_all, fields(rows = joined.len(), test_fraction = test_fraction, ?seed))]
pub fn correlate_population_visitors(
    joined: &[MuseumWithPopulation],
    test_fraction: f64,
    seed: Option<u64>,
) -> Result<RegressionReport, StatsError> {
    let mut points: Vec<(f64, f64)> = joined
        .iter()
        .filter_map(|m| m.population.map(|p| (p as f64, m.museum.visitors as f64)))
        .collect();

    let n = points.len();
    let test_size = (n as f64 * test_fraction).ceil() as usize;
    let train_size = n.saturating_sub(test_size);
    if train_size < 2 || test_size == 0 {
        return Err(StatsError::InsufficientData(format!(
            "{n} rows with a population give {train_size} training and {test_size} test rows"
        )));
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::seed_from_u64(rand::rng().random()),
    };
    points.shuffle(&mut rng);
    let (test, train) = points.split_at(test_size);

    let model = fit_line(train)?;
    info!(
        coefficient = model.coefficient,
        intercept = model.intercept,
        "Fitted linear regression"
    );

    let (xs, ys): (Vec<f64>, Vec<f64>) = points.iter().copied().unzip();
    let std_y = std_dev(&ys);
    if std_y == 0.0 {
        return Err(StatsError::InsufficientData(
            "visitor counts have no variance".to_string(),
        ));
    }
    let correlation = model.coefficient * std_dev(&xs) / std_y;

    let errors: Vec<f64> = test.iter().map(|&(x, y)| y - model.predict(x)).collect();
    let mean_absolute_error = mean(&errors.iter().map(|e| e.abs()).collect::<Vec<_>>());
    let mean_squared_error = mean(&errors.iter().map(|e| e * e).collect::<Vec<_>>());

    let report = RegressionReport {
        model,
        correlation,
        mean_absolute_error,
        mean_squared_error,
        root_mean_squared_error: mean_squared_error.sqrt(),
        train_size,
        test_size,
    };
    info!(
        correlation = report.correlation,
        mae = report.mean_absolute_error,
        mse = report.mean_squared_error,
        rmse = report.root_mean_squared_error,
        "Evaluated model on test set"
    );
    Ok(report)
}

/// Ordinary least squares fit of `y` on `x`.
pub fn fit_line(points: &[(f64, f64)]) -> Result<LinearModel, StatsError> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = points.iter().copied().unzip();
    let (mean_x, mean_y) = (mean(&xs), mean(&ys));

    let (mut covariance, mut variance) = (0.0, 0.0);
    for (x, y) in points {
        covariance += (x - mean_x) * (y - mean_y);
        variance += (x - mean_x).powi(2);
    }
    if variance == 0.0 {
        return Err(StatsError::InsufficientData(
            "populations in the training set have no variance".to_string(),
        ));
    }

    let coefficient = covariance / variance;
    Ok(LinearModel {
        coefficient,
        intercept: mean_y - coefficient * mean_x,
    })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}
