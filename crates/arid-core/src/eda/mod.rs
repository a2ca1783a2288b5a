//! Exploratory data analysis
//!
//! [`explore`] summarizes the features of a dataset and draws how each one
//! relates to a response, next to the rank correlations between features.

mod chart;
mod correlation;
mod summary;

pub use chart::{Chart, ChartKind};
pub use correlation::{spearman, spearman_matrix};
pub use summary::{describe, SummaryTable, STATISTICS};

use crate::data::{self, DataFrame};
use crate::errors::StatsResult;
use crate::types::ResponseKind;
use crate::validate::{
    validate_not_in_features, validate_numeric_features, validate_response, ResponseRole,
};
use log::debug;

/// Summary statistics and a combined chart for the given features
///
/// # Arguments
/// * `data` - Input table
/// * `response` - Response column
/// * `response_type` - `"categorical"` (text response) or `"continuous"` (numeric response)
/// * `features` - Numeric features to explore; empty selects every numeric
///   column other than the response. Every named feature must exist and be numeric.
///
/// # Returns
/// * An 8 × n_features statistics table and a side-by-side chart of the
///   per-feature plots and the Spearman correlation heatmap
pub fn explore<S: AsRef<str>>(
    data: &DataFrame,
    response: &str,
    response_type: &str,
    features: &[S],
) -> StatsResult<(SummaryTable, Chart)> {
    let kind: ResponseKind = response_type.parse()?;
    validate_response(data, response, ResponseRole::from(kind))?;
    validate_not_in_features(response, features)?;
    validate_numeric_features(data, features)?;

    let features: Vec<String> = if features.is_empty() {
        data::column_names(data)
            .filter(|name| {
                *name != response
                    && data::column_type(data, name).is_some_and(|t| t.is_numeric())
            })
            .map(String::from)
            .collect()
    } else {
        features.iter().map(|f| f.as_ref().to_string()).collect()
    };

    let table = describe(data, &features)?;
    let correlations = spearman_matrix(data, &features)?;

    let plots = features
        .iter()
        .map(|f| chart::feature_plot(data, response, kind, f))
        .collect();
    let chart = chart::combined(chart::grid(plots), chart::heatmap(&features, &correlations));

    debug!(
        "explore: {} features against {} response '{}'",
        features.len(),
        response_type,
        response
    );

    Ok((table, chart))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StatsError;
    use polars::prelude::df;

    const NONE: &[&str] = &[];

    fn iris_like() -> DataFrame {
        df!(
            "sepal_length" => [5.1, 4.9, 6.3, 5.8, 7.1, 6.5],
            "sepal_width" => [3.5, 3.0, 3.3, 2.7, 3.0, 3.2],
            "petals" => [1_i64, 1, 6, 5, 6, 5],
            "species" => ["setosa", "setosa", "virginica", "virginica", "virginica", "setosa"]
        )
        .unwrap()
    }

    #[test]
    fn test_categorical_response() {
        let (table, chart) = explore(
            &iris_like(),
            "species",
            "categorical",
            &["sepal_length", "sepal_width"],
        )
        .unwrap();
        assert_eq!(table.shape(), (8, 2));
        assert_eq!(table.columns(), ["sepal_length", "sepal_width"]);
        assert_eq!(chart.kind(), ChartKind::HConcat);

        let parts = chart.spec()["hconcat"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["vconcat"].as_array().unwrap().len(), 1);
        assert_eq!(parts[1]["data"]["values"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_continuous_response_infers_features() {
        let (table, chart) = explore(&iris_like(), "sepal_length", "continuous", NONE).unwrap();
        assert_eq!(table.columns(), ["sepal_width", "petals"]);
        assert_eq!(chart.kind(), ChartKind::HConcat);
    }

    #[test]
    fn test_input_errors() {
        let df = iris_like();
        assert!(matches!(
            explore(&df, "species", "ordinal", NONE),
            Err(StatsError::UnknownResponseType(_))
        ));
        assert!(matches!(
            explore(&df, "species", "continuous", NONE),
            Err(StatsError::InvalidResponseType { .. })
        ));
        assert!(matches!(
            explore(&df, "sepal_length", "categorical", NONE),
            Err(StatsError::InvalidResponseType { .. })
        ));
        assert!(matches!(
            explore(&df, "genus", "categorical", NONE),
            Err(StatsError::ResponseNotFound(_))
        ));
        assert!(matches!(
            explore(&df, "species", "categorical", &["sepal_length", "species"]),
            Err(StatsError::ResponseInFeatures(_))
        ));
        assert!(matches!(
            explore(&df, "species", "categorical", &["petal_width"]),
            Err(StatsError::FeatureNotFound(_))
        ));
        assert!(matches!(
            explore(&DataFrame::empty(), "species", "categorical", NONE),
            Err(StatsError::EmptyDataset)
        ));
    }
}
