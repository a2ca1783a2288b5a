//! Logistic regression: binomial and multinomial classification

use super::{
    complete_rows, equation, regress_error, to_faer, CoefficientTable, Equation, FitSummary,
    InferenceModel, ModelFamily, ModelPair, PredictiveModel, TableContext,
};
use crate::data::{self, DataFrame};
use crate::errors::{StatsError, StatsResult};
use crate::features::resolve_numeric;
use crate::formula::Design;
use crate::types::{Classification, Diagnosed, LogisticOptions};
use crate::validate::{
    validate_not_in_features, validate_response, validate_significance, ResponseRole,
};
use anofox_regression::prelude::*;
use log::debug;

const NO_FACTORS: &[&str] = &[];

/// Fit a logistic regression with a predictive and an inference estimator
///
/// Class labels are the sorted distinct values of `response`. A binomial
/// model predicts the probability of the second label. A multinomial model
/// predicts one-vs-rest and reports coefficients of every other label
/// against the first.
///
/// # Arguments
/// * `data` - Input table
/// * `response` - Class label column (text or integer)
/// * `features` - Candidate numeric features; empty selects every numeric column
/// * `options` - Classification type, interaction mode, significance level,
///   IRLS settings
///
/// Rows with a null label are dropped along with rows holding a NaN feature.
pub fn fit_logistic<S: AsRef<str>>(
    data: &DataFrame,
    response: &str,
    features: &[S],
    options: &LogisticOptions,
) -> StatsResult<Diagnosed<ModelPair>> {
    validate_response(data, response, ResponseRole::ClassLabels)?;
    validate_not_in_features(response, features)?;
    validate_significance(options.significance_level)?;

    let classes = data::levels(data, response)?;
    check_levels(response, classes.len(), options.classification)?;

    let resolved = resolve_numeric(data, response, features)?;
    let design = Design::new(
        data,
        response,
        &resolved.value,
        NO_FACTORS,
        options.interaction,
    )?;
    let names = design.column_names()?;

    // class index per row, so incomplete rows drop out together with their label
    let class_index: Vec<f64> = data::labels(data, response)?
        .iter()
        .map(|label| {
            label
                .as_ref()
                .and_then(|l| classes.iter().position(|c| c == l))
                .map_or(f64::NAN, |k| k as f64)
        })
        .collect();
    let (class_index, x) = complete_rows(&class_index, &design.matrix(data)?)?;
    let class_index: Vec<usize> = class_index.into_iter().map(|k| k as usize).collect();

    let family = ModelFamily::Logistic(options.classification);
    let (equations, tables, summary) = match options.classification {
        Classification::Binomial => {
            let fit = fit_binomial(
                &indicator(&class_index, 1),
                &x,
                &names,
                options,
                &context(response, &classes[1], options),
            )?;
            let summary = FitSummary {
                n_observations: class_index.len(),
                aic: Some(fit.aic),
                deviance: Some(fit.deviance),
                null_deviance: Some(fit.null_deviance),
                pseudo_r_squared: Some(pseudo_r_squared(fit.deviance, fit.null_deviance)),
                ..Default::default()
            };
            (vec![fit.equation], vec![fit.table], summary)
        }
        Classification::Multinomial => {
            fit_multinomial(&class_index, &x, &names, &classes, response, options)?
        }
    };

    debug!(
        "fit_logistic: {} on {} rows, {} classes ({:?})",
        design.formula(),
        class_index.len(),
        classes.len(),
        options.classification
    );

    let pair = ModelPair {
        predictive: PredictiveModel::new(family, design.clone(), classes.clone(), equations),
        inference: InferenceModel::new(
            family,
            design,
            classes,
            tables,
            summary,
            options.significance_level,
        ),
    };
    debug!("coefficient comparison:\n{}", pair.comparison());

    Ok(resolved.map(|_| pair))
}

fn check_levels(response: &str, levels: usize, classification: Classification) -> StatsResult<()> {
    match classification {
        Classification::Binomial if levels != 2 => Err(StatsError::InvalidResponseLevels {
            column: response.to_string(),
            levels,
            requirement: "binomial classification needs exactly 2",
        }),
        Classification::Multinomial if levels < 2 => Err(StatsError::InvalidResponseLevels {
            column: response.to_string(),
            levels,
            requirement: "multinomial classification needs at least 2",
        }),
        _ => Ok(()),
    }
}

fn context<'a>(response: &'a str, label: &'a str, options: &LogisticOptions) -> TableContext<'a> {
    TableContext {
        family: ModelFamily::Logistic(options.classification),
        response,
        label: Some(label),
        significance_level: options.significance_level,
    }
}

fn indicator(class_index: &[usize], class: usize) -> Vec<f64> {
    class_index
        .iter()
        .map(|&k| if k == class { 1.0 } else { 0.0 })
        .collect()
}

fn pseudo_r_squared(deviance: f64, null_deviance: f64) -> f64 {
    if null_deviance > 0.0 {
        1.0 - deviance / null_deviance
    } else {
        0.0
    }
}

/// Both artifacts of one binomial IRLS fit
struct BinomialFit {
    equation: Equation,
    table: CoefficientTable,
    aic: f64,
    deviance: f64,
    null_deviance: f64,
}

fn fit_binomial(
    y: &[f64],
    x: &[Vec<f64>],
    names: &[String],
    options: &LogisticOptions,
    ctx: &TableContext<'_>,
) -> StatsResult<BinomialFit> {
    let (y_col, x_mat) = to_faer(y, x);
    let fitted = BinomialRegressor::builder()
        .link(anofox_regression::core::BinomialLink::Logit)
        .with_intercept(true)
        .max_iterations(options.max_iterations as usize)
        .tolerance(options.tolerance)
        .compute_inference(true)
        .confidence_level(1.0 - options.significance_level)
        .build()
        .fit(&x_mat, &y_col)
        .map_err(regress_error)?;

    let result = fitted.result();
    Ok(BinomialFit {
        equation: equation(result, ctx.label),
        table: ctx.table(result, names),
        aic: result.aic,
        deviance: fitted.deviance,
        null_deviance: fitted.null_deviance,
    })
}

/// One-vs-rest equations for prediction, baseline-category tables for inference
fn fit_multinomial(
    class_index: &[usize],
    x: &[Vec<f64>],
    names: &[String],
    classes: &[String],
    response: &str,
    options: &LogisticOptions,
) -> StatsResult<(Vec<Equation>, Vec<CoefficientTable>, FitSummary)> {
    let mut equations = Vec::with_capacity(classes.len());
    for (k, class) in classes.iter().enumerate() {
        let fit = fit_binomial(
            &indicator(class_index, k),
            x,
            names,
            options,
            &context(response, class, options),
        )?;
        equations.push(fit.equation);
    }

    // each non-reference class against the first, on the rows of those two classes
    let mut tables = Vec::with_capacity(classes.len() - 1);
    for (k, class) in classes.iter().enumerate().skip(1) {
        let rows: Vec<usize> = (0..class_index.len())
            .filter(|&i| class_index[i] == 0 || class_index[i] == k)
            .collect();
        let y: Vec<f64> = rows
            .iter()
            .map(|&i| if class_index[i] == k { 1.0 } else { 0.0 })
            .collect();
        let x_sub: Vec<Vec<f64>> = x
            .iter()
            .map(|col| rows.iter().map(|&i| col[i]).collect())
            .collect();
        let fit = fit_binomial(&y, &x_sub, names, options, &context(response, class, options))?;
        tables.push(fit.table);
    }

    let (deviance, null_deviance) = multinomial_deviance(class_index, x, &tables, classes.len())?;
    let summary = FitSummary {
        n_observations: class_index.len(),
        deviance: Some(deviance),
        null_deviance: Some(null_deviance),
        pseudo_r_squared: Some(pseudo_r_squared(deviance, null_deviance)),
        ..Default::default()
    };

    Ok((equations, tables, summary))
}

/// Deviance of the baseline-category model and of the intercept-only model
fn multinomial_deviance(
    class_index: &[usize],
    x: &[Vec<f64>],
    tables: &[CoefficientTable],
    n_classes: usize,
) -> StatsResult<(f64, f64)> {
    let n_obs = class_index.len();
    let mut scores = vec![vec![1.0; n_obs]];
    for table in tables {
        let intercept = table.intercept().map(|r| r.estimate).unwrap_or(0.0);
        scores.push(super::predict_mean(
            x,
            &table.estimates(),
            intercept,
            super::Link::Log,
        )?);
    }
    let probs = super::normalize_rows(&scores)?;

    let deviance = -2.0
        * probs
            .iter()
            .zip(class_index)
            .map(|(p, &k)| p[k].max(f64::MIN_POSITIVE).ln())
            .sum::<f64>();

    let mut counts = vec![0usize; n_classes];
    for &k in class_index {
        counts[k] += 1;
    }
    let null_deviance = -2.0
        * counts
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| c as f64 * (c as f64 / n_obs as f64).ln())
            .sum::<f64>();

    Ok((deviance, null_deviance))
}
