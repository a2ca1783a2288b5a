use thiserror::Error;

/// Errors that can occur while validating inputs or fitting models
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    // Dataset errors
    #[error("Empty dataset: the table has no columns or no rows")]
    EmptyDataset,

    #[error("Column length mismatch: column '{column}' has {len} rows, expected {expected}")]
    DimensionMismatch {
        column: String,
        len: usize,
        expected: usize,
    },

    #[error("Unknown column: '{0}'")]
    UnknownColumn(String),

    // Response errors
    #[error("Response column '{0}' not found in dataset")]
    ResponseNotFound(String),

    #[error("Invalid response datatype: '{column}' is {actual}, expected {expected}")]
    InvalidResponseType {
        column: String,
        actual: &'static str,
        expected: &'static str,
    },

    #[error("Invalid response levels: '{column}' has {levels} distinct values, {requirement}")]
    InvalidResponseLevels {
        column: String,
        levels: usize,
        requirement: &'static str,
    },

    #[error("Count response '{0}' contains negative values")]
    NegativeCounts(String),

    #[error("Unknown response type: '{0}' (expected 'categorical' or 'continuous')")]
    UnknownResponseType(String),

    // Feature errors
    #[error("Feature '{0}' not found in dataset")]
    FeatureNotFound(String),

    #[error("Feature '{feature}' is {actual}, expected a numeric column")]
    InvalidFeatureType {
        feature: String,
        actual: &'static str,
    },

    #[error("Response '{0}' is also listed as a feature")]
    ResponseInFeatures(String),

    #[error("No valid features remain after resolution")]
    NoValidFeatures,

    #[error("All rows filtered due to NaN values")]
    NoValidData,

    // Configuration errors
    #[error("Unknown regularization: '{0}' (expected 'none', 'L1', 'L2' or 'L1L2')")]
    UnknownRegularization(String),

    #[error("Unknown classification type: '{0}' (expected 'binomial' or 'multinomial')")]
    UnknownClassification(String),

    #[error("Unknown interaction mode: '{0}' (expected 'additive' or 'interactive')")]
    UnknownInteraction(String),

    #[error("Invalid alpha parameter: {0} (must be finite and >= 0)")]
    InvalidAlpha(f64),

    #[error("Invalid significance level: {0} (must be in (0, 1))")]
    InvalidSignificance(f64),

    #[error("Prediction not available: {0}")]
    UnsupportedPrediction(&'static str),

    // Delegated errors
    #[error("anofox-regression error: {0}")]
    RegressError(String),

    #[error("polars error: {0}")]
    PolarsError(String),
}

/// Result type for validation and fitting operations
pub type StatsResult<T> = Result<T, StatsError>;
