//! Paired regression models
//!
//! Every entry point returns a [`ModelPair`]: a predictive estimator tuned for
//! point predictions and an inference estimator carrying a coefficient table
//! with significance tests. Both are fit on the same design matrix and
//! response vector.

mod count;
mod linear;
mod logistic;
mod predict;

pub use count::fit_count;
pub use linear::fit_linear;
pub use logistic::fit_logistic;
pub use predict::{linear_predictor, normalize_rows, predict_mean, Link};

use crate::data::DataFrame;
use crate::errors::{StatsError, StatsResult};
use crate::formula::Design;
use crate::types::{Classification, Regularization};
use anofox_regression::prelude::*;
use comfy_table::{presets, CellAlignment, Table};
use faer::{Col, Mat};
use std::fmt::Debug;

/// Regression family of a model pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Linear(Regularization),
    Logistic(Classification),
    Poisson,
}

impl ModelFamily {
    pub fn link(&self) -> Link {
        match self {
            ModelFamily::Linear(_) => Link::Identity,
            ModelFamily::Logistic(_) => Link::Logit,
            ModelFamily::Poisson => Link::Log,
        }
    }

    fn is_multinomial(&self) -> bool {
        matches!(self, ModelFamily::Logistic(Classification::Multinomial))
    }
}

/// One fitted linear predictor
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    /// Class modeled by this equation (logistic models only)
    pub label: Option<String>,
    /// Coefficients in design column order
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

// ============================================================================
// Predictive estimator
// ============================================================================

/// Estimator used for point predictions
#[derive(Debug, Clone)]
pub struct PredictiveModel {
    family: ModelFamily,
    design: Design,
    classes: Vec<String>,
    equations: Vec<Equation>,
}

impl PredictiveModel {
    pub(crate) fn new(
        family: ModelFamily,
        design: Design,
        classes: Vec<String>,
        equations: Vec<Equation>,
    ) -> Self {
        Self {
            family,
            design,
            classes,
            equations,
        }
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }

    pub fn design(&self) -> &Design {
        &self.design
    }

    /// Response levels, in sorted order (logistic models only)
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn equations(&self) -> &[Equation] {
        &self.equations
    }

    /// Coefficients of the first equation
    pub fn coefficients(&self) -> &[f64] {
        self.equations
            .first()
            .map(|e| e.coefficients.as_slice())
            .unwrap_or(&[])
    }

    pub fn intercept(&self) -> f64 {
        self.equations.first().map(|e| e.intercept).unwrap_or(0.0)
    }

    /// Mean response for each row of `data`.
    ///
    /// Linear models return fitted values, Poisson models expected counts,
    /// and binomial models the probability of the second class.
    pub fn predict(&self, data: &DataFrame) -> StatsResult<Vec<f64>> {
        if self.family.is_multinomial() {
            return Err(StatsError::UnsupportedPrediction(
                "multinomial models predict class probabilities, use predict_proba",
            ));
        }
        let x = self.design.matrix(data)?;
        let eq = self.first_equation()?;
        predict_mean(&x, &eq.coefficients, eq.intercept, self.family.link())
    }

    /// Class probabilities per row, columns ordered as `classes()`
    pub fn predict_proba(&self, data: &DataFrame) -> StatsResult<Vec<Vec<f64>>> {
        let x = self.design.matrix(data)?;
        match self.family {
            ModelFamily::Logistic(Classification::Binomial) => {
                let eq = self.first_equation()?;
                let p = predict_mean(&x, &eq.coefficients, eq.intercept, Link::Logit)?;
                Ok(p.into_iter().map(|p| vec![1.0 - p, p]).collect())
            }
            ModelFamily::Logistic(Classification::Multinomial) => {
                // one-vs-rest scores, one equation per class
                let scores = self
                    .equations
                    .iter()
                    .map(|eq| predict_mean(&x, &eq.coefficients, eq.intercept, Link::Logit))
                    .collect::<StatsResult<Vec<_>>>()?;
                normalize_rows(&scores)
            }
            _ => Err(StatsError::UnsupportedPrediction(
                "class probabilities require a logistic model",
            )),
        }
    }

    /// Most probable class per row
    pub fn predict_labels(&self, data: &DataFrame) -> StatsResult<Vec<String>> {
        let probs = self.predict_proba(data)?;
        Ok(probs
            .iter()
            .map(|row| self.classes[argmax(row)].clone())
            .collect())
    }

    fn first_equation(&self) -> StatsResult<&Equation> {
        self.equations
            .first()
            .ok_or(StatsError::UnsupportedPrediction("model has no fitted equation"))
    }
}

// ============================================================================
// Inference estimator
// ============================================================================

/// One line of a coefficient table
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientRow {
    pub term: String,
    pub estimate: f64,
    pub std_error: f64,
    /// t statistic for linear models, Wald z statistic for GLMs
    pub statistic: f64,
    pub p_value: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    /// `p_value` below the significance level
    pub significant: bool,
    pub interpretation: String,
}

/// Coefficient table for one equation; the first row is the intercept
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientTable {
    /// Class compared against the reference class (logistic models only)
    pub label: Option<String>,
    pub rows: Vec<CoefficientRow>,
}

impl CoefficientTable {
    pub fn intercept(&self) -> Option<&CoefficientRow> {
        self.rows.first()
    }

    /// Rows excluding the intercept
    pub fn terms(&self) -> &[CoefficientRow] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn estimates(&self) -> Vec<f64> {
        self.terms().iter().map(|r| r.estimate).collect()
    }

    pub fn row(&self, term: &str) -> Option<&CoefficientRow> {
        self.rows.iter().find(|r| r.term == term)
    }
}

/// Goodness-of-fit figures of the inference estimator
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FitSummary {
    pub n_observations: usize,
    pub r_squared: Option<f64>,
    pub adj_r_squared: Option<f64>,
    pub aic: Option<f64>,
    pub deviance: Option<f64>,
    pub null_deviance: Option<f64>,
    pub pseudo_r_squared: Option<f64>,
}

/// Estimator used for coefficient interpretation and significance testing
#[derive(Debug, Clone)]
pub struct InferenceModel {
    family: ModelFamily,
    design: Design,
    classes: Vec<String>,
    tables: Vec<CoefficientTable>,
    summary: FitSummary,
    significance_level: f64,
    vif: Option<Vec<f64>>,
}

impl InferenceModel {
    pub(crate) fn new(
        family: ModelFamily,
        design: Design,
        classes: Vec<String>,
        tables: Vec<CoefficientTable>,
        summary: FitSummary,
        significance_level: f64,
    ) -> Self {
        Self {
            family,
            design,
            classes,
            tables,
            summary,
            significance_level,
            vif: None,
        }
    }

    pub(crate) fn with_vif(mut self, vif: Vec<f64>) -> Self {
        self.vif = Some(vif);
        self
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }

    /// Symbolic formula the model was fit from
    pub fn formula(&self) -> String {
        self.design.formula()
    }

    pub fn design(&self) -> &Design {
        &self.design
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn tables(&self) -> &[CoefficientTable] {
        &self.tables
    }

    pub fn summary(&self) -> &FitSummary {
        &self.summary
    }

    pub fn significance_level(&self) -> f64 {
        self.significance_level
    }

    /// Variance inflation factor per design column (linear models only)
    pub fn vif(&self) -> Option<&[f64]> {
        self.vif.as_deref()
    }

    /// Coefficient estimates of the first table, excluding the intercept
    pub fn coefficients(&self) -> Vec<f64> {
        self.tables
            .first()
            .map(CoefficientTable::estimates)
            .unwrap_or_default()
    }

    pub fn intercept(&self) -> f64 {
        self.tables
            .first()
            .and_then(CoefficientTable::intercept)
            .map(|r| r.estimate)
            .unwrap_or(0.0)
    }

    /// Terms significant at the configured level, across all tables
    pub fn significant_terms(&self) -> Vec<&str> {
        self.tables
            .iter()
            .flat_map(|t| t.terms())
            .filter(|r| r.significant)
            .map(|r| r.term.as_str())
            .collect()
    }

    /// Mean response for each row of `data`, as `PredictiveModel::predict`
    pub fn predict(&self, data: &DataFrame) -> StatsResult<Vec<f64>> {
        if self.family.is_multinomial() {
            return Err(StatsError::UnsupportedPrediction(
                "multinomial models predict class probabilities, use predict_proba",
            ));
        }
        let x = self.design.matrix(data)?;
        predict_mean(&x, &self.coefficients(), self.intercept(), self.family.link())
    }

    /// Class probabilities per row, columns ordered as `classes()`
    pub fn predict_proba(&self, data: &DataFrame) -> StatsResult<Vec<Vec<f64>>> {
        let x = self.design.matrix(data)?;
        match self.family {
            ModelFamily::Logistic(Classification::Binomial) => {
                let p = predict_mean(&x, &self.coefficients(), self.intercept(), Link::Logit)?;
                Ok(p.into_iter().map(|p| vec![1.0 - p, p]).collect())
            }
            ModelFamily::Logistic(Classification::Multinomial) => {
                // baseline-category logits: the reference class scores exp(0)
                let n_obs = x.first().map(Vec::len).unwrap_or(0);
                let mut scores = vec![vec![1.0; n_obs]];
                for table in &self.tables {
                    let intercept = table.intercept().map(|r| r.estimate).unwrap_or(0.0);
                    scores.push(predict_mean(&x, &table.estimates(), intercept, Link::Log)?);
                }
                normalize_rows(&scores)
            }
            _ => Err(StatsError::UnsupportedPrediction(
                "class probabilities require a logistic model",
            )),
        }
    }
}

// ============================================================================
// Model pair
// ============================================================================

/// Predictive and inference estimators from one modeling call
#[derive(Debug, Clone)]
pub struct ModelPair {
    pub predictive: PredictiveModel,
    pub inference: InferenceModel,
}

impl ModelPair {
    /// Side-by-side coefficient table of both estimators
    pub fn comparison(&self) -> String {
        let mut table = Table::new();
        table.load_preset(presets::ASCII_MARKDOWN);
        table.set_header(vec![
            "term",
            "predictive",
            "inference",
            "std error",
            "p-value",
            "significant",
        ]);

        for coef_table in self.inference.tables() {
            let equation = self
                .predictive
                .equations()
                .iter()
                .find(|e| e.label == coef_table.label);
            let suffix = coef_table
                .label
                .as_ref()
                .map(|l| format!(" [{l}]"))
                .unwrap_or_default();

            for (i, row) in coef_table.rows.iter().enumerate() {
                let predictive = equation.map(|e| {
                    if i == 0 {
                        e.intercept
                    } else {
                        e.coefficients.get(i - 1).copied().unwrap_or(f64::NAN)
                    }
                });
                table.add_row(vec![
                    format!("{}{}", row.term, suffix),
                    predictive.map(format_value).unwrap_or_else(|| "-".into()),
                    format_value(row.estimate),
                    format_value(row.std_error),
                    format_value(row.p_value),
                    if row.significant { "yes" } else { "no" }.to_string(),
                ]);
            }
        }

        table.column_iter_mut().skip(1).for_each(|c| {
            c.set_cell_alignment(CellAlignment::Right);
        });
        table.to_string()
    }
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v:.4}")
    }
}

fn argmax(row: &[f64]) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best, max), (i, &v)| {
            if v > max {
                (i, v)
            } else {
                (best, max)
            }
        })
        .0
}

// ============================================================================
// Shared fitting helpers
// ============================================================================

pub(crate) const INTERCEPT: &str = "Intercept";

/// Keep only rows where the response and every feature are finite
pub(crate) fn complete_rows(y: &[f64], x: &[Vec<f64>]) -> StatsResult<(Vec<f64>, Vec<Vec<f64>>)> {
    let valid_indices: Vec<usize> = (0..y.len())
        .filter(|&i| y[i].is_finite() && x.iter().all(|col| col[i].is_finite()))
        .collect();

    if valid_indices.is_empty() {
        return Err(StatsError::NoValidData);
    }

    let y = valid_indices.iter().map(|&i| y[i]).collect();
    let x = x
        .iter()
        .map(|col| valid_indices.iter().map(|&i| col[i]).collect())
        .collect();
    Ok((y, x))
}

/// Convert column vectors to faer types
pub(crate) fn to_faer(y: &[f64], x: &[Vec<f64>]) -> (Col<f64>, Mat<f64>) {
    let y_col = Col::from_fn(y.len(), |i| y[i]);
    let x_mat = Mat::from_fn(y.len(), x.len(), |i, j| x[j][i]);
    (y_col, x_mat)
}

pub(crate) fn regress_error<E: Debug>(e: E) -> StatsError {
    StatsError::RegressError(format!("{:?}", e))
}

fn values_or_nan(col: &Option<Col<f64>>, len: usize) -> Vec<f64> {
    col.as_ref()
        .map(|c| c.iter().copied().collect())
        .unwrap_or_else(|| vec![f64::NAN; len])
}

/// What a coefficient table row is describing, for its interpretation text
pub(crate) struct TableContext<'a> {
    pub family: ModelFamily,
    pub response: &'a str,
    pub label: Option<&'a str>,
    pub significance_level: f64,
}

impl TableContext<'_> {
    fn interpret(&self, term: &str, estimate: f64, p_value: f64) -> String {
        if term == INTERCEPT {
            return "linear predictor with every feature at zero".to_string();
        }
        if estimate.is_nan() {
            return format!("{term} is aliased with other terms and was not estimated");
        }
        if p_value.is_nan() {
            return format!("{term} has no significance test available for this fit");
        }
        if p_value >= self.significance_level {
            return format!(
                "no significant association between {term} and {} at the {} level",
                self.response, self.significance_level
            );
        }
        match self.family {
            ModelFamily::Linear(_) => format!(
                "a one-unit increase in {term} changes {} by {estimate:.4}",
                self.response
            ),
            ModelFamily::Logistic(_) => format!(
                "a one-unit increase in {term} multiplies the odds of {} = {} by {:.4}",
                self.response,
                self.label.unwrap_or("1"),
                estimate.exp()
            ),
            ModelFamily::Poisson => format!(
                "a one-unit increase in {term} multiplies the expected count of {} by {:.4}",
                self.response,
                estimate.exp()
            ),
        }
    }

    fn row(
        &self,
        term: &str,
        estimate: f64,
        std_error: f64,
        statistic: f64,
        p_value: f64,
        ci: (f64, f64),
    ) -> CoefficientRow {
        CoefficientRow {
            term: term.to_string(),
            estimate,
            std_error,
            statistic,
            p_value,
            ci_lower: ci.0,
            ci_upper: ci.1,
            significant: p_value < self.significance_level,
            interpretation: self.interpret(term, estimate, p_value),
        }
    }

    /// Coefficient table from a library regression result
    pub fn table(&self, result: &RegressionResult, names: &[String]) -> CoefficientTable {
        let n = names.len();
        let estimates: Vec<f64> = result.coefficients.iter().copied().collect();
        let std_errors = values_or_nan(&result.std_errors, n);
        let statistics = values_or_nan(&result.t_statistics, n);
        let p_values = values_or_nan(&result.p_values, n);
        let ci_lower = values_or_nan(&result.conf_interval_lower, n);
        let ci_upper = values_or_nan(&result.conf_interval_upper, n);

        let mut rows = Vec::with_capacity(n + 1);
        rows.push(self.row(
            INTERCEPT,
            result.intercept.unwrap_or(0.0),
            result.intercept_std_error.unwrap_or(f64::NAN),
            result.intercept_t_statistic.unwrap_or(f64::NAN),
            result.intercept_p_value.unwrap_or(f64::NAN),
            result.intercept_conf_interval.unwrap_or((f64::NAN, f64::NAN)),
        ));
        for (j, name) in names.iter().enumerate() {
            rows.push(self.row(
                name,
                estimates.get(j).copied().unwrap_or(f64::NAN),
                std_errors.get(j).copied().unwrap_or(f64::NAN),
                statistics.get(j).copied().unwrap_or(f64::NAN),
                p_values.get(j).copied().unwrap_or(f64::NAN),
                (
                    ci_lower.get(j).copied().unwrap_or(f64::NAN),
                    ci_upper.get(j).copied().unwrap_or(f64::NAN),
                ),
            ));
        }

        CoefficientTable {
            label: self.label.map(String::from),
            rows,
        }
    }

    /// Coefficient table with estimates only; every test statistic is NaN
    pub fn estimates_only(&self, intercept: f64, estimates: &[f64], names: &[String]) -> CoefficientTable {
        let nan = f64::NAN;
        let mut rows = vec![self.row(INTERCEPT, intercept, nan, nan, nan, (nan, nan))];
        rows.extend(
            names
                .iter()
                .zip(estimates)
                .map(|(name, &est)| self.row(name, est, nan, nan, nan, (nan, nan))),
        );
        CoefficientTable {
            label: self.label.map(String::from),
            rows,
        }
    }
}

/// Equation from a library regression result
pub(crate) fn equation(result: &RegressionResult, label: Option<&str>) -> Equation {
    Equation {
        label: label.map(String::from),
        coefficients: result.coefficients.iter().copied().collect(),
        intercept: result.intercept.unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_rows_drops_nan() {
        let y = vec![1.0, f64::NAN, 3.0, 4.0];
        let x = vec![vec![1.0, 2.0, f64::INFINITY, 4.0]];
        let (y, x) = complete_rows(&y, &x).unwrap();
        assert_eq!(y, vec![1.0, 4.0]);
        assert_eq!(x, vec![vec![1.0, 4.0]]);
    }

    #[test]
    fn test_complete_rows_all_invalid() {
        let y = vec![f64::NAN, f64::NAN];
        let x = vec![vec![1.0, 2.0]];
        assert!(matches!(complete_rows(&y, &x), Err(StatsError::NoValidData)));
    }

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), 1);
        assert_eq!(argmax(&[0.5, 0.5]), 0);
    }

    #[test]
    fn test_interpretation_text() {
        let ctx = TableContext {
            family: ModelFamily::Poisson,
            response: "n",
            label: None,
            significance_level: 0.05,
        };
        let row = ctx.row("a", 0.0, 0.1, 0.0, 0.01, (0.0, 0.0));
        assert!(row.significant);
        assert!(row.interpretation.contains("expected count of n by 1.0000"));

        let row = ctx.row("a", 0.2, 0.1, 2.0, 0.2, (0.0, 0.4));
        assert!(!row.significant);
        assert!(row.interpretation.starts_with("no significant association"));

        let table = ctx.estimates_only(1.0, &[2.0], &["a".to_string()]);
        assert_eq!(table.estimates(), vec![2.0]);
        assert!(table.terms()[0].p_value.is_nan());
        assert!(!table.terms()[0].significant);
    }
}
