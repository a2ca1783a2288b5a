//! Feature resolution
//!
//! Turns a caller's loosely specified feature list into the columns that are
//! actually modeled. Missing or wrongly typed names are dropped with a
//! [`FeatureWarning`]; only an empty result is an error.

use crate::data::{self, ColumnType, DataFrame};
use crate::errors::{StatsError, StatsResult};
use crate::types::{Diagnosed, FeatureWarning};
use log::warn;

/// Continuous and categorical features for a count model
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedFeatures {
    pub continuous: Vec<String>,
    pub categorical: Vec<String>,
}

impl ResolvedFeatures {
    pub fn is_empty(&self) -> bool {
        self.continuous.is_empty() && self.categorical.is_empty()
    }
}

/// Which column types a feature slot accepts
#[derive(Debug, Clone, Copy)]
enum FeatureKind {
    Numeric,
    Categorical,
}

impl FeatureKind {
    fn accepts(&self, column_type: ColumnType) -> bool {
        match self {
            FeatureKind::Numeric => column_type.is_numeric(),
            FeatureKind::Categorical => column_type == ColumnType::Text,
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            FeatureKind::Numeric => "numeric",
            FeatureKind::Categorical => "text",
        }
    }
}

/// Resolve numeric features for linear and logistic models.
///
/// An empty `requested` list selects every numeric column except the response.
pub fn resolve_numeric<S: AsRef<str>>(
    data: &DataFrame,
    response: &str,
    requested: &[S],
) -> StatsResult<Diagnosed<Vec<String>>> {
    let resolved = resolve_kind(data, response, requested, FeatureKind::Numeric);
    if resolved.value.is_empty() {
        return Err(StatsError::NoValidFeatures);
    }
    Ok(resolved)
}

/// Resolve continuous and categorical features for count models.
///
/// When both lists are empty, both are inferred from the dataset. Otherwise
/// only the lists given are used.
pub fn resolve_count<S: AsRef<str>, T: AsRef<str>>(
    data: &DataFrame,
    response: &str,
    continuous: &[S],
    categorical: &[T],
) -> StatsResult<Diagnosed<ResolvedFeatures>> {
    let infer = continuous.is_empty() && categorical.is_empty();

    let (continuous, mut warnings) = if infer || !continuous.is_empty() {
        let d = resolve_kind(data, response, continuous, FeatureKind::Numeric);
        (d.value, d.warnings)
    } else {
        (Vec::new(), Vec::new())
    };

    let categorical = if infer || !categorical.is_empty() {
        let d = resolve_kind(data, response, categorical, FeatureKind::Categorical);
        warnings.extend(d.warnings);
        d.value
    } else {
        Vec::new()
    };

    let resolved = ResolvedFeatures {
        continuous,
        categorical,
    };
    if resolved.is_empty() {
        return Err(StatsError::NoValidFeatures);
    }
    Ok(Diagnosed::new(resolved, warnings))
}

fn resolve_kind<S: AsRef<str>>(
    data: &DataFrame,
    response: &str,
    requested: &[S],
    kind: FeatureKind,
) -> Diagnosed<Vec<String>> {
    if requested.is_empty() {
        let inferred = data::column_names(data)
            .filter(|name| {
                *name != response
                    && data::column_type(data, name).is_some_and(|t| kind.accepts(t))
            })
            .map(String::from)
            .collect();
        return Diagnosed::new(inferred, Vec::new());
    }

    let mut selected: Vec<String> = Vec::with_capacity(requested.len());
    let mut warnings = Vec::new();

    for name in requested.iter().map(AsRef::as_ref) {
        if name == response || selected.iter().any(|s| s == name) {
            continue;
        }
        match data::column_type(data, name) {
            None => warnings.push(FeatureWarning::NotFound(name.to_string())),
            Some(column_type) if !kind.accepts(column_type) => {
                warnings.push(FeatureWarning::WrongType {
                    feature: name.to_string(),
                    actual: column_type.name(),
                    expected: kind.expected(),
                })
            }
            Some(_) => selected.push(name.to_string()),
        }
    }

    for warning in &warnings {
        warn!("{}", warning);
    }

    Diagnosed::new(selected, warnings)
}
