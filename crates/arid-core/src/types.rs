use crate::errors::{StatsError, StatsResult};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Keyword enums
// ============================================================================

/// Penalty applied to a linear regression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Regularization {
    /// Ordinary least squares
    #[default]
    None,
    /// Lasso
    L1,
    /// Ridge
    L2,
    /// Elastic Net with an even L1/L2 mix
    L1L2,
}

impl Regularization {
    /// Share of the penalty carried by the L1 term, for elastic-net style fits
    pub fn l1_ratio(&self) -> Option<f64> {
        match self {
            Regularization::L1 => Some(1.0),
            Regularization::L1L2 => Some(0.5),
            Regularization::None | Regularization::L2 => None,
        }
    }

    pub fn is_penalized(&self) -> bool {
        !matches!(self, Regularization::None)
    }
}

impl FromStr for Regularization {
    type Err = StatsError;

    fn from_str(s: &str) -> StatsResult<Self> {
        match s {
            "" | "none" | "None" => Ok(Regularization::None),
            "L1" => Ok(Regularization::L1),
            "L2" => Ok(Regularization::L2),
            "L1L2" => Ok(Regularization::L1L2),
            other => Err(StatsError::UnknownRegularization(other.to_string())),
        }
    }
}

impl TryFrom<String> for Regularization {
    type Error = StatsError;

    fn try_from(s: String) -> StatsResult<Self> {
        s.parse()
    }
}

impl fmt::Display for Regularization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Regularization::None => "none",
            Regularization::L1 => "L1",
            Regularization::L2 => "L2",
            Regularization::L1L2 => "L1L2",
        };
        f.write_str(name)
    }
}

/// Logistic regression flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Classification {
    /// Exactly two response levels
    #[default]
    Binomial,
    /// Two or more response levels
    Multinomial,
}

impl FromStr for Classification {
    type Err = StatsError;

    fn from_str(s: &str) -> StatsResult<Self> {
        match s {
            "binomial" => Ok(Classification::Binomial),
            "multinomial" => Ok(Classification::Multinomial),
            other => Err(StatsError::UnknownClassification(other.to_string())),
        }
    }
}

impl TryFrom<String> for Classification {
    type Error = StatsError;

    fn try_from(s: String) -> StatsResult<Self> {
        s.parse()
    }
}

/// Whether the linear predictor includes pairwise cross terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum InteractionMode {
    #[default]
    Additive,
    Interactive,
}

impl FromStr for InteractionMode {
    type Err = StatsError;

    fn from_str(s: &str) -> StatsResult<Self> {
        match s {
            "additive" => Ok(InteractionMode::Additive),
            "interactive" => Ok(InteractionMode::Interactive),
            other => Err(StatsError::UnknownInteraction(other.to_string())),
        }
    }
}

impl TryFrom<String> for InteractionMode {
    type Error = StatsError;

    fn try_from(s: String) -> StatsResult<Self> {
        s.parse()
    }
}

/// Declared response type for exploratory analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Categorical,
    Continuous,
}

impl FromStr for ResponseKind {
    type Err = StatsError;

    fn from_str(s: &str) -> StatsResult<Self> {
        match s {
            "categorical" => Ok(ResponseKind::Categorical),
            "continuous" => Ok(ResponseKind::Continuous),
            other => Err(StatsError::UnknownResponseType(other.to_string())),
        }
    }
}

// ============================================================================
// Options
// ============================================================================

/// Options for `fit_linear`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinearOptions {
    /// Penalty kind
    pub regularization: Regularization,
    /// Penalty strength, ignored without regularization (must be >= 0)
    pub strength: f64,
    /// Significance level for the inference table
    pub significance_level: f64,
    /// Maximum iterations for coordinate descent
    pub max_iterations: u32,
    /// Convergence tolerance
    pub tolerance: f64,
}

impl Default for LinearOptions {
    fn default() -> Self {
        Self {
            regularization: Regularization::None,
            strength: 1.0,
            significance_level: 0.05,
            max_iterations: 1000,
            tolerance: 1e-6,
        }
    }
}

/// Options for `fit_logistic`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogisticOptions {
    /// Binomial or multinomial
    pub classification: Classification,
    /// Additive or interactive linear predictor over the numeric features
    pub interaction: InteractionMode,
    /// Significance level for the inference table
    pub significance_level: f64,
    /// Maximum iterations for IRLS
    pub max_iterations: u32,
    /// Convergence tolerance
    pub tolerance: f64,
}

impl Default for LogisticOptions {
    fn default() -> Self {
        Self {
            classification: Classification::Binomial,
            interaction: InteractionMode::Additive,
            significance_level: 0.05,
            max_iterations: 100,
            tolerance: 1e-8,
        }
    }
}

/// Options for `fit_count`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CountOptions {
    /// Additive or interactive linear predictor
    pub interaction: InteractionMode,
    /// L2 penalty strength on the Poisson coefficients (must be >= 0)
    pub strength: f64,
    /// Significance level for the inference table
    pub significance_level: f64,
    /// Maximum iterations for IRLS
    pub max_iterations: u32,
    /// Convergence tolerance
    pub tolerance: f64,
}

impl Default for CountOptions {
    fn default() -> Self {
        Self {
            interaction: InteractionMode::Additive,
            strength: 0.0,
            significance_level: 0.05,
            max_iterations: 100,
            tolerance: 1e-8,
        }
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Non-fatal problem found while resolving features
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureWarning {
    /// Requested feature is not a column of the dataset
    NotFound(String),
    /// Requested feature exists but has the wrong type for its role
    WrongType {
        feature: String,
        actual: &'static str,
        expected: &'static str,
    },
}

impl FeatureWarning {
    pub fn feature(&self) -> &str {
        match self {
            FeatureWarning::NotFound(name) => name,
            FeatureWarning::WrongType { feature, .. } => feature,
        }
    }
}

impl fmt::Display for FeatureWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureWarning::NotFound(name) => {
                write!(f, "feature '{name}' not found in dataset, ignored")
            }
            FeatureWarning::WrongType {
                feature,
                actual,
                expected,
            } => write!(
                f,
                "feature '{feature}' is {actual}, expected {expected}, ignored"
            ),
        }
    }
}

/// A value together with the warnings raised while producing it
#[derive(Debug, Clone)]
pub struct Diagnosed<T> {
    pub value: T,
    pub warnings: Vec<FeatureWarning>,
}

impl<T> Diagnosed<T> {
    pub fn new(value: T, warnings: Vec<FeatureWarning>) -> Self {
        Self { value, warnings }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Diagnosed<U> {
        Diagnosed {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    /// Names of the features that were discarded
    pub fn discarded(&self) -> Vec<&str> {
        self.warnings.iter().map(FeatureWarning::feature).collect()
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}
