//! Linear regression: OLS, Lasso, Ridge and Elastic Net

use super::{
    complete_rows, equation, regress_error, to_faer, Equation, FitSummary, InferenceModel,
    ModelFamily, ModelPair, PredictiveModel, TableContext,
};
use crate::data::DataFrame;
use crate::diagnostics::compute_vif;
use crate::errors::StatsResult;
use crate::features::resolve_numeric;
use crate::formula::Design;
use crate::types::{Diagnosed, InteractionMode, LinearOptions, Regularization};
use crate::validate::{
    validate_not_in_features, validate_response, validate_significance, validate_strength,
    ResponseRole,
};
use anofox_regression::prelude::*;
use log::debug;

const NO_FACTORS: &[&str] = &[];

/// Fit a linear regression with a predictive and an inference estimator
///
/// # Arguments
/// * `data` - Input table
/// * `response` - Numeric response column
/// * `features` - Candidate numeric features; empty selects every numeric column
/// * `options` - Penalty kind and strength, significance level
///
/// # Returns
/// * The model pair, with a warning for every discarded feature
pub fn fit_linear<S: AsRef<str>>(
    data: &DataFrame,
    response: &str,
    features: &[S],
    options: &LinearOptions,
) -> StatsResult<Diagnosed<ModelPair>> {
    validate_response(data, response, ResponseRole::Continuous)?;
    validate_not_in_features(response, features)?;
    validate_strength(options.strength)?;
    validate_significance(options.significance_level)?;

    let resolved = resolve_numeric(data, response, features)?;
    let design = Design::new(
        data,
        response,
        &resolved.value,
        NO_FACTORS,
        InteractionMode::Additive,
    )?;
    let names = design.column_names()?;
    let (y, x) = complete_rows(&design.response_vector(data)?, &design.matrix(data)?)?;

    let family = ModelFamily::Linear(options.regularization);
    let ctx = TableContext {
        family,
        response,
        label: None,
        significance_level: options.significance_level,
    };

    let (predictive, inference) = match options.regularization {
        Regularization::None => {
            let predictive = fit_centered_ols(&y, &x)?;
            let (table, summary) = fit_ols_inference(&y, &x, &names, &predictive, &ctx)?;
            (predictive, (table, summary))
        }
        Regularization::L2 | Regularization::L1 | Regularization::L1L2 => {
            fit_penalized(&y, &x, &names, options, &ctx)?
        }
    };

    debug!(
        "fit_linear: {} on {} rows, {} design columns, regularization {}",
        design.formula(),
        y.len(),
        names.len(),
        options.regularization
    );

    let (table, summary) = inference;
    let vif = compute_vif(&x)?;
    let pair = ModelPair {
        predictive: PredictiveModel::new(family, design.clone(), Vec::new(), vec![predictive]),
        inference: InferenceModel::new(
            family,
            design,
            Vec::new(),
            vec![table],
            summary,
            options.significance_level,
        )
        .with_vif(vif),
    };
    debug!("coefficient comparison:\n{}", pair.comparison());

    Ok(resolved.map(|_| pair))
}

/// Least squares on mean-centered data, intercept recovered from the means.
///
/// Centering absorbs the intercept, so the fit needs one parameter fewer
/// than a fit with an explicit intercept column.
fn fit_centered_ols(y: &[f64], x: &[Vec<f64>]) -> StatsResult<Equation> {
    let y_mean = mean(y);
    let x_means: Vec<f64> = x.iter().map(|col| mean(col)).collect();

    let y_centered: Vec<f64> = y.iter().map(|v| v - y_mean).collect();
    let x_centered: Vec<Vec<f64>> = x
        .iter()
        .zip(&x_means)
        .map(|(col, m)| col.iter().map(|v| v - m).collect())
        .collect();

    let (y_col, x_mat) = to_faer(&y_centered, &x_centered);
    let fitted = OlsRegressor::builder()
        .with_intercept(false)
        .build()
        .fit(&x_mat, &y_col)
        .map_err(regress_error)?;

    // aliased columns come back as NaN and contribute nothing
    let coefficients: Vec<f64> = fitted
        .result()
        .coefficients
        .iter()
        .map(|&c| if c.is_nan() { 0.0 } else { c })
        .collect();
    let intercept = y_mean
        - coefficients
            .iter()
            .zip(&x_means)
            .map(|(c, m)| c * m)
            .sum::<f64>();

    Ok(Equation {
        label: None,
        coefficients,
        intercept,
    })
}

/// OLS with an explicit intercept and full inference.
///
/// With no residual degrees of freedom the test statistics are undefined:
/// the table then carries the centered estimates with NaN statistics.
fn fit_ols_inference(
    y: &[f64],
    x: &[Vec<f64>],
    names: &[String],
    centered: &Equation,
    ctx: &TableContext<'_>,
) -> StatsResult<(super::CoefficientTable, FitSummary)> {
    let n_obs = y.len();
    if n_obs <= x.len() + 1 {
        let table = ctx.estimates_only(centered.intercept, &centered.coefficients, names);
        let summary = FitSummary {
            n_observations: n_obs,
            ..Default::default()
        };
        return Ok((table, summary));
    }

    let (y_col, x_mat) = to_faer(y, x);
    let fitted = OlsRegressor::builder()
        .with_intercept(true)
        .compute_inference(true)
        .confidence_level(1.0 - ctx.significance_level)
        .build()
        .fit(&x_mat, &y_col)
        .map_err(regress_error)?;
    let result = fitted.result();

    let summary = FitSummary {
        n_observations: n_obs,
        r_squared: Some(result.r_squared),
        adj_r_squared: Some(result.adj_r_squared),
        aic: Some(result.aic),
        ..Default::default()
    };
    Ok((ctx.table(result, names), summary))
}

/// Ridge, Lasso and Elastic Net share one penalized fit for both estimators,
/// so their coefficients agree exactly.
fn fit_penalized(
    y: &[f64],
    x: &[Vec<f64>],
    names: &[String],
    options: &LinearOptions,
    ctx: &TableContext<'_>,
) -> StatsResult<(Equation, (super::CoefficientTable, FitSummary))> {
    let (y_col, x_mat) = to_faer(y, x);

    let (eq, table, summary) = match options.regularization.l1_ratio() {
        None => {
            let fitted = RidgeRegressor::builder()
                .with_intercept(true)
                .lambda(options.strength)
                .compute_inference(true)
                .confidence_level(1.0 - options.significance_level)
                .build()
                .fit(&x_mat, &y_col)
                .map_err(regress_error)?;
            let result = fitted.result();
            (
                equation(result, None),
                ctx.table(result, names),
                summary_of(result, y.len()),
            )
        }
        Some(l1_ratio) => {
            // the library's lambda is our strength, its alpha our l1 ratio
            let fitted = ElasticNetRegressor::builder()
                .with_intercept(true)
                .lambda(options.strength)
                .alpha(l1_ratio)
                .max_iterations(options.max_iterations as usize)
                .tolerance(options.tolerance)
                .build()
                .fit(&x_mat, &y_col)
                .map_err(regress_error)?;
            let result = fitted.result();
            let eq = equation(result, None);
            let table = ctx.estimates_only(eq.intercept, &eq.coefficients, names);
            (eq, table, summary_of(result, y.len()))
        }
    };

    Ok((eq, (table, summary)))
}

fn summary_of(result: &RegressionResult, n_obs: usize) -> FitSummary {
    FitSummary {
        n_observations: n_obs,
        r_squared: Some(result.r_squared),
        adj_r_squared: Some(result.adj_r_squared),
        ..Default::default()
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
