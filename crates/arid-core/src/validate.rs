//! Hard precondition checks shared by every entry point
//!
//! Each check fails fast with the variant naming the violated precondition.

use crate::data::{self, ColumnType, DataFrame};
use crate::errors::{StatsError, StatsResult};
use crate::types::ResponseKind;

/// Role a response column plays in the requested analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseRole {
    /// Numeric response (linear regression, continuous EDA)
    Continuous,
    /// Text response (categorical EDA)
    Categorical,
    /// Class labels, text or integer (logistic regression)
    ClassLabels,
    /// Non-negative integers (count regression)
    Count,
}

impl ResponseRole {
    fn expected(&self) -> &'static str {
        match self {
            ResponseRole::Continuous => "numeric",
            ResponseRole::Categorical => "text",
            ResponseRole::ClassLabels => "text or integer",
            ResponseRole::Count => "integer",
        }
    }

    fn accepts(&self, column_type: ColumnType) -> bool {
        match self {
            ResponseRole::Continuous => column_type.is_numeric(),
            ResponseRole::Categorical => column_type == ColumnType::Text,
            ResponseRole::ClassLabels => {
                matches!(column_type, ColumnType::Text | ColumnType::Integer)
            }
            ResponseRole::Count => column_type == ColumnType::Integer,
        }
    }
}

impl From<ResponseKind> for ResponseRole {
    fn from(kind: ResponseKind) -> Self {
        match kind {
            ResponseKind::Categorical => ResponseRole::Categorical,
            ResponseKind::Continuous => ResponseRole::Continuous,
        }
    }
}

/// Fail on a table without columns or rows
pub fn validate_dataset(data: &DataFrame) -> StatsResult<()> {
    if data::is_empty(data) {
        return Err(StatsError::EmptyDataset);
    }
    Ok(())
}

/// Check the response exists and its dtype fits `role`
pub fn validate_response(
    data: &DataFrame,
    response: &str,
    role: ResponseRole,
) -> StatsResult<ColumnType> {
    validate_dataset(data)?;

    let column_type = data::column_type(data, response)
        .ok_or_else(|| StatsError::ResponseNotFound(response.to_string()))?;

    if !role.accepts(column_type) {
        return Err(StatsError::InvalidResponseType {
            column: response.to_string(),
            actual: column_type.name(),
            expected: role.expected(),
        });
    }

    if role == ResponseRole::Count && data::numeric(data, response)?.iter().any(|&v| v < 0.0) {
        return Err(StatsError::NegativeCounts(response.to_string()));
    }

    Ok(column_type)
}

/// Fail if the response is also requested as a feature
pub fn validate_not_in_features<S: AsRef<str>>(response: &str, features: &[S]) -> StatsResult<()> {
    if features.iter().any(|f| f.as_ref() == response) {
        return Err(StatsError::ResponseInFeatures(response.to_string()));
    }
    Ok(())
}

/// Strict feature check: every name must be a numeric column
pub fn validate_numeric_features<S: AsRef<str>>(
    data: &DataFrame,
    features: &[S],
) -> StatsResult<()> {
    for feature in features {
        let name = feature.as_ref();
        let column_type = data::column_type(data, name)
            .ok_or_else(|| StatsError::FeatureNotFound(name.to_string()))?;
        if !column_type.is_numeric() {
            return Err(StatsError::InvalidFeatureType {
                feature: name.to_string(),
                actual: column_type.name(),
            });
        }
    }
    Ok(())
}

/// Significance level must be a probability strictly between 0 and 1
pub fn validate_significance(level: f64) -> StatsResult<()> {
    if !(level > 0.0 && level < 1.0) {
        return Err(StatsError::InvalidSignificance(level));
    }
    Ok(())
}

/// Penalty strength must be finite and non-negative
pub fn validate_strength(strength: f64) -> StatsResult<()> {
    if !strength.is_finite() || strength < 0.0 {
        return Err(StatsError::InvalidAlpha(strength));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;

    fn simple_frame() -> DataFrame {
        df!(
            "x1" => [1.0, 0.0, 0.0],
            "x4" => ["a", "a", "b"],
            "n" => [1_i64, 0, 4],
            "y" => [1.0, 3.0, -1.0],
            "flag" => [true, false, true]
        )
        .unwrap()
    }

    #[test]
    fn test_empty_dataset() {
        let result = validate_response(&DataFrame::empty(), "y", ResponseRole::Continuous);
        assert!(matches!(result, Err(StatsError::EmptyDataset)));
    }

    #[test]
    fn test_response_not_found() {
        let result = validate_response(&simple_frame(), "z", ResponseRole::Continuous);
        assert_eq!(result, Err(StatsError::ResponseNotFound("z".into())));
    }

    #[test]
    fn test_response_type_by_role() {
        let df = simple_frame();
        assert!(validate_response(&df, "y", ResponseRole::Continuous).is_ok());
        assert!(validate_response(&df, "n", ResponseRole::Continuous).is_ok());
        assert!(validate_response(&df, "x4", ResponseRole::Categorical).is_ok());
        assert!(validate_response(&df, "n", ResponseRole::ClassLabels).is_ok());
        assert_eq!(
            validate_response(&df, "n", ResponseRole::Count),
            Ok(ColumnType::Integer)
        );

        assert!(matches!(
            validate_response(&df, "x4", ResponseRole::Continuous),
            Err(StatsError::InvalidResponseType { .. })
        ));
        assert!(matches!(
            validate_response(&df, "y", ResponseRole::Categorical),
            Err(StatsError::InvalidResponseType { .. })
        ));
        assert!(matches!(
            validate_response(&df, "y", ResponseRole::Count),
            Err(StatsError::InvalidResponseType { .. })
        ));
        assert!(matches!(
            validate_response(&df, "flag", ResponseRole::ClassLabels),
            Err(StatsError::InvalidResponseType { actual: "unsupported", .. })
        ));
    }

    #[test]
    fn test_negative_counts() {
        let df = df!("n" => [1_i64, -2, 3]).unwrap();
        assert!(matches!(
            validate_response(&df, "n", ResponseRole::Count),
            Err(StatsError::NegativeCounts(_))
        ));
    }

    #[test]
    fn test_response_in_features() {
        assert!(validate_not_in_features("y", &["x1", "x2"]).is_ok());
        assert!(matches!(
            validate_not_in_features("y", &["x1", "y"]),
            Err(StatsError::ResponseInFeatures(_))
        ));
    }

    #[test]
    fn test_numeric_features_strict() {
        let df = simple_frame();
        assert!(validate_numeric_features(&df, &["x1", "n"]).is_ok());
        assert!(matches!(
            validate_numeric_features(&df, &["x1", "q"]),
            Err(StatsError::FeatureNotFound(_))
        ));
        assert!(matches!(
            validate_numeric_features(&df, &["x4"]),
            Err(StatsError::InvalidFeatureType { .. })
        ));
    }

    #[test]
    fn test_numeric_parameters() {
        assert!(validate_strength(0.0).is_ok());
        assert!(matches!(validate_strength(-1.0), Err(StatsError::InvalidAlpha(_))));
        assert!(matches!(
            validate_strength(f64::NAN),
            Err(StatsError::InvalidAlpha(_))
        ));
        assert!(validate_significance(0.05).is_ok());
        assert!(matches!(
            validate_significance(1.0),
            Err(StatsError::InvalidSignificance(_))
        ));
        assert!(matches!(
            validate_significance(f64::NAN),
            Err(StatsError::InvalidSignificance(_))
        ));
    }
}
