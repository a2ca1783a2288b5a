//! Prediction from fitted coefficients
//!
//! Both halves of a model pair predict through these functions, so their
//! outputs differ only where their coefficients do.

use crate::errors::{StatsError, StatsResult};

/// Inverse link applied to the linear predictor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Identity,
    Log,
    Logit,
}

impl Link {
    pub fn inverse(&self, eta: f64) -> f64 {
        match self {
            Link::Identity => eta,
            Link::Log => eta.exp(),
            Link::Logit => 1.0 / (1.0 + (-eta).exp()),
        }
    }
}

/// Compute `X * beta + intercept`
///
/// # Arguments
/// * `x` - Feature matrix (p features, each with n observations)
/// * `coefficients` - Fitted coefficients (p values); NaN marks an aliased
///   column and contributes nothing
/// * `intercept` - Intercept term
///
/// # Returns
/// * Vector of linear predictor values (n observations)
#[allow(clippy::needless_range_loop)]
pub fn linear_predictor(x: &[Vec<f64>], coefficients: &[f64], intercept: f64) -> StatsResult<Vec<f64>> {
    if x.len() != coefficients.len() {
        return Err(StatsError::DimensionMismatch {
            column: "coefficients".to_string(),
            len: coefficients.len(),
            expected: x.len(),
        });
    }

    let n_obs = common_len(x, "feature")?;

    let mut eta = vec![intercept; n_obs];
    for (j, coef) in coefficients.iter().enumerate() {
        if coef.is_nan() {
            continue;
        }
        for i in 0..n_obs {
            eta[i] += coef * x[j][i];
        }
    }

    Ok(eta)
}

/// Predicted mean response under `link`
pub fn predict_mean(
    x: &[Vec<f64>],
    coefficients: &[f64],
    intercept: f64,
    link: Link,
) -> StatsResult<Vec<f64>> {
    Ok(linear_predictor(x, coefficients, intercept)?
        .into_iter()
        .map(|eta| link.inverse(eta))
        .collect())
}

/// Normalize per-class scores row by row so each row sums to one
pub fn normalize_rows(scores: &[Vec<f64>]) -> StatsResult<Vec<Vec<f64>>> {
    let n_obs = common_len(scores, "class score")?;
    Ok((0..n_obs)
        .map(|i| {
            let total: f64 = scores.iter().map(|s| s[i]).sum();
            scores
                .iter()
                .map(|s| if total > 0.0 { s[i] / total } else { f64::NAN })
                .collect()
        })
        .collect())
}

/// Row count shared by every column-major vector
fn common_len(columns: &[Vec<f64>], what: &str) -> StatsResult<usize> {
    let n_obs = columns.first().map(Vec::len).unwrap_or(0);
    match columns.iter().enumerate().find(|(_, c)| c.len() != n_obs) {
        Some((j, c)) => Err(StatsError::DimensionMismatch {
            column: format!("{what} {j}"),
            len: c.len(),
            expected: n_obs,
        }),
        None => Ok(n_obs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_predictor_basic() {
        // y = 2*x + 1
        let x = vec![vec![1.0, 2.0, 3.0, 4.0, 5.0]];
        let eta = linear_predictor(&x, &[2.0], 1.0).unwrap();
        assert_eq!(eta, vec![3.0, 5.0, 7.0, 9.0, 11.0]);
    }

    #[test]
    fn test_linear_predictor_skips_aliased() {
        let x = vec![vec![1.0, 2.0], vec![10.0, 20.0]];
        let eta = linear_predictor(&x, &[1.0, f64::NAN], 0.5).unwrap();
        assert_eq!(eta, vec![1.5, 2.5]);
    }

    #[test]
    fn test_linear_predictor_dimension_mismatch() {
        let x = vec![vec![1.0, 2.0]];
        let result = linear_predictor(&x, &[1.0, 2.0], 0.0);
        assert!(matches!(result, Err(StatsError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_ragged_columns() {
        let x = vec![vec![1.0, 2.0, 3.0], vec![1.0, 2.0]];
        assert!(matches!(
            linear_predictor(&x, &[1.0, 1.0], 0.0),
            Err(StatsError::DimensionMismatch { len: 2, expected: 3, .. })
        ));
        assert!(matches!(
            predict_mean(&x, &[1.0, 1.0], 0.0, Link::Log),
            Err(StatsError::DimensionMismatch { .. })
        ));

        let scores = vec![vec![0.2], vec![0.6, 0.5]];
        assert!(matches!(
            normalize_rows(&scores),
            Err(StatsError::DimensionMismatch { len: 2, expected: 1, .. })
        ));
    }

    #[test]
    fn test_inverse_links() {
        assert_eq!(Link::Identity.inverse(1.5), 1.5);
        assert!((Link::Log.inverse(0.0) - 1.0).abs() < 1e-12);
        assert!((Link::Logit.inverse(0.0) - 0.5).abs() < 1e-12);
        let p = predict_mean(&[vec![0.0, 100.0]], &[1.0], 0.0, Link::Logit).unwrap();
        assert!((p[0] - 0.5).abs() < 1e-12);
        assert!(p[1] > 0.999);
    }

    #[test]
    fn test_normalize_rows() {
        let scores = vec![vec![0.2, 0.5], vec![0.6, 0.5]];
        let probs = normalize_rows(&scores).unwrap();
        assert_eq!(probs.len(), 2);
        assert!((probs[0][0] - 0.25).abs() < 1e-12);
        assert!((probs[0][1] - 0.75).abs() < 1e-12);
        assert!((probs[1][0] - 0.5).abs() < 1e-12);
    }
}
