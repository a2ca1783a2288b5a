//! Poisson regression for count responses

use super::{
    complete_rows, equation, regress_error, to_faer, FitSummary, InferenceModel, ModelFamily,
    ModelPair, PredictiveModel, TableContext,
};
use crate::data::DataFrame;
use crate::errors::StatsResult;
use crate::features::resolve_count;
use crate::formula::Design;
use crate::types::{CountOptions, Diagnosed};
use crate::validate::{
    validate_not_in_features, validate_response, validate_significance, validate_strength,
    ResponseRole,
};
use anofox_regression::prelude::*;
use log::debug;

/// Fit a log-link Poisson regression with a predictive and an inference estimator
///
/// The linear predictor is built from continuous and categorical features
/// according to `options.interaction`; its formula is available from the
/// inference estimator.
///
/// # Arguments
/// * `data` - Input table
/// * `response` - Non-negative integer count column
/// * `continuous` - Continuous features
/// * `categorical` - Categorical (text) features, treatment coded
/// * `options` - Interaction mode, penalty strength, significance level
///
/// A positive `strength` ridge-penalizes the coefficients of the single
/// Poisson fit both estimators share. When both feature lists are empty every numeric and text column other
/// than the response is used.
pub fn fit_count<S: AsRef<str>, T: AsRef<str>>(
    data: &DataFrame,
    response: &str,
    continuous: &[S],
    categorical: &[T],
    options: &CountOptions,
) -> StatsResult<Diagnosed<ModelPair>> {
    validate_response(data, response, ResponseRole::Count)?;
    validate_not_in_features(response, continuous)?;
    validate_not_in_features(response, categorical)?;
    validate_strength(options.strength)?;
    validate_significance(options.significance_level)?;

    let resolved = resolve_count(data, response, continuous, categorical)?;
    let design = Design::new(
        data,
        response,
        &resolved.value.continuous,
        &resolved.value.categorical,
        options.interaction,
    )?;
    let names = design.column_names()?;
    let (y, x) = complete_rows(&design.response_vector(data)?, &design.matrix(data)?)?;

    let (y_col, x_mat) = to_faer(&y, &x);
    let fitted = PoissonRegressor::log()
        .with_intercept(true)
        .lambda(options.strength)
        .max_iterations(options.max_iterations as usize)
        .tolerance(options.tolerance)
        .compute_inference(true)
        .confidence_level(1.0 - options.significance_level)
        .build()
        .fit(&x_mat, &y_col)
        .map_err(regress_error)?;
    let result = fitted.result();

    let ctx = TableContext {
        family: ModelFamily::Poisson,
        response,
        label: None,
        significance_level: options.significance_level,
    };
    let pseudo_r_squared = if fitted.null_deviance > 0.0 {
        1.0 - fitted.deviance / fitted.null_deviance
    } else {
        0.0
    };
    let summary = FitSummary {
        n_observations: y.len(),
        aic: Some(result.aic),
        deviance: Some(fitted.deviance),
        null_deviance: Some(fitted.null_deviance),
        pseudo_r_squared: Some(pseudo_r_squared),
        ..Default::default()
    };

    debug!(
        "fit_count: {} on {} rows, {} IRLS iterations, deviance {:.4}",
        design.formula(),
        y.len(),
        fitted.iterations,
        fitted.deviance
    );

    let pair = ModelPair {
        predictive: PredictiveModel::new(
            ModelFamily::Poisson,
            design.clone(),
            Vec::new(),
            vec![equation(result, None)],
        ),
        inference: InferenceModel::new(
            ModelFamily::Poisson,
            design,
            Vec::new(),
            vec![ctx.table(result, &names)],
            summary,
            options.significance_level,
        ),
    };
    debug!("coefficient comparison:\n{}", pair.comparison());

    Ok(resolved.map(|_| pair))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StatsError;
    use crate::types::InteractionMode;
    use polars::prelude::df;

    const NONE: &[&str] = &[];

    fn count_frame() -> DataFrame {
        let a: Vec<f64> = (0..30).map(|i| (i % 10) as f64 / 5.0).collect();
        let b: Vec<f64> = (0..30).map(|i| ((i as f64) * 0.4).cos()).collect();
        let g: Vec<&str> = (0..30)
            .map(|i| match i % 3 {
                0 => "north",
                1 => "south",
                _ => "west",
            })
            .collect();
        let n: Vec<i64> = (0..30)
            .map(|i| {
                let mu = (0.3 + 0.6 * a[i] + 0.2 * b[i]).exp();
                (mu + ((i as f64) * 1.9).sin()).round().max(0.0) as i64
            })
            .collect();
        df!("a" => a, "b" => b, "g" => g, "n" => n).unwrap()
    }

    #[test]
    fn test_response_checks() {
        let df = count_frame();
        let opts = CountOptions::default();
        assert!(matches!(
            fit_count(&df, "missing", NONE, NONE, &opts),
            Err(StatsError::ResponseNotFound(_))
        ));
        assert!(matches!(
            fit_count(&df, "a", NONE, NONE, &opts),
            Err(StatsError::InvalidResponseType { .. })
        ));

        let negative = df!("x" => [1.0, 2.0], "n" => [1_i64, -1]).unwrap();
        assert!(matches!(
            fit_count(&negative, "n", NONE, NONE, &opts),
            Err(StatsError::NegativeCounts(_))
        ));

        assert!(matches!(
            fit_count(&df, "n", &["a", "n"], NONE, &opts),
            Err(StatsError::ResponseInFeatures(_))
        ));
    }

    #[test]
    fn test_penalty_shrinks_coefficients() {
        let df = count_frame();
        let plain = fit_count(&df, "n", &["a"], NONE, &CountOptions::default())
            .unwrap()
            .value;
        let opts = CountOptions {
            strength: 0.5,
            ..Default::default()
        };
        let penalized = fit_count(&df, "n", &["a"], NONE, &opts).unwrap().value;

        let unpenalized = plain.predictive.coefficients()[0];
        let shrunk = penalized.predictive.coefficients()[0];
        assert!(unpenalized > 0.0);
        assert!(shrunk.abs() < unpenalized.abs());
        assert_eq!(
            penalized.predictive.coefficients(),
            penalized.inference.coefficients().as_slice()
        );

        let negative = CountOptions {
            strength: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            fit_count(&df, "n", &["a"], NONE, &negative),
            Err(StatsError::InvalidAlpha(_))
        ));
    }

    #[test]
    fn test_additive_fit() {
        let df = count_frame();
        let pair = fit_count(&df, "n", &["a", "b"], &["g"], &CountOptions::default())
            .unwrap()
            .value;

        assert_eq!(pair.inference.formula(), "n ~ a + b + C(g)");
        // a, b and two coded levels of g
        assert_eq!(pair.predictive.coefficients().len(), 4);
        assert_eq!(
            pair.predictive.coefficients(),
            pair.inference.coefficients().as_slice()
        );
        assert!(pair.inference.tables()[0].row("C(g)[T.south]").is_some());

        let means = pair.predictive.predict(&df).unwrap();
        assert!(means.iter().all(|&m| m > 0.0));

        let summary = pair.inference.summary();
        assert!(summary.deviance.unwrap() < summary.null_deviance.unwrap());
    }

    #[test]
    fn test_interactive_fit() {
        let df = count_frame();
        let opts = CountOptions {
            interaction: InteractionMode::Interactive,
            ..Default::default()
        };
        let pair = fit_count(&df, "n", &["a", "b"], &["g"], &opts).unwrap().value;
        assert_eq!(
            pair.inference.formula(),
            "n ~ a + b + C(g) + a:C(g) + b:C(g) + a:b"
        );
        assert_eq!(pair.predictive.coefficients().len(), 9);
    }

    #[test]
    fn test_inferred_features_and_warnings() {
        let df = count_frame();
        let pair = fit_count(&df, "n", NONE, NONE, &CountOptions::default())
            .unwrap()
            .value;
        assert_eq!(pair.inference.formula(), "n ~ a + b + C(g)");

        let fitted = fit_count(&df, "n", &["a", "ghost"], &["b"], &CountOptions::default()).unwrap();
        assert_eq!(fitted.discarded(), vec!["ghost", "b"]);
        assert_eq!(fitted.value.inference.formula(), "n ~ a");
    }
}
