//! Variance Inflation Factor (VIF) computation

use crate::errors::{StatsError, StatsResult};
use crate::models::to_faer;
use anofox_regression::prelude::*;

/// Compute VIF (Variance Inflation Factor) for each design column.
///
/// For each column j, regress it on all other columns and compute
/// VIF_j = 1 / (1 - R²_j). Values above 10 indicate strong multicollinearity.
///
/// A column whose auxiliary regression cannot be fit (too few rows, or a
/// singular design) gets an infinite VIF.
///
/// # Arguments
/// * `x` - Design columns, each Vec<f64> is one column
///
/// # Returns
/// * Vector of VIF values, one per column
pub fn compute_vif(x: &[Vec<f64>]) -> StatsResult<Vec<f64>> {
    let n_features = x.len();
    if n_features == 0 {
        return Err(StatsError::NoValidFeatures);
    }
    if n_features == 1 {
        return Ok(vec![1.0]);
    }

    let n_obs = x[0].len();
    for (i, col) in x.iter().enumerate() {
        if col.len() != n_obs {
            return Err(StatsError::DimensionMismatch {
                column: format!("design column {i}"),
                len: col.len(),
                expected: n_obs,
            });
        }
    }

    Ok((0..n_features).map(|j| auxiliary_vif(x, j)).collect())
}

fn auxiliary_vif(x: &[Vec<f64>], j: usize) -> f64 {
    let others: Vec<Vec<f64>> = x
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != j)
        .map(|(_, col)| col.clone())
        .collect();

    // intercept plus the other columns must leave a residual degree of freedom
    if x[j].len() <= others.len() + 1 {
        return f64::INFINITY;
    }

    let (y_col, x_mat) = to_faer(&x[j], &others);
    let fitted = OlsRegressor::builder()
        .with_intercept(true)
        .build()
        .fit(&x_mat, &y_col);

    match fitted {
        Ok(fitted) => {
            let r_squared = fitted.result().r_squared;
            if !r_squared.is_finite() || r_squared >= 0.9999 {
                f64::INFINITY
            } else {
                1.0 / (1.0 - r_squared.max(0.0))
            }
        }
        Err(_) => f64::INFINITY,
    }
}
