//! Column access over polars data frames
//!
//! The library reads a caller-owned [`DataFrame`] and never mutates it. These
//! helpers map polars dtypes onto the roles a column can play (continuous,
//! categorical, count) and widen values into the plain vectors the estimators
//! consume. Nulls become NaN when widened to f64 and `None` when read as labels.

use crate::errors::{StatsError, StatsResult};
use polars::prelude::*;

pub use polars::prelude::DataFrame;

/// Role-relevant classification of a polars dtype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Float,
    Integer,
    Text,
    /// Any dtype the library does not model (booleans, dates, lists, ...)
    Other,
}

impl ColumnType {
    pub fn of(dtype: &DataType) -> Self {
        if dtype.is_float() {
            ColumnType::Float
        } else if dtype.is_integer() {
            ColumnType::Integer
        } else if matches!(dtype, DataType::String) {
            ColumnType::Text
        } else {
            ColumnType::Other
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Float => "float",
            ColumnType::Integer => "integer",
            ColumnType::Text => "text",
            ColumnType::Other => "unsupported",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Float | ColumnType::Integer)
    }
}

pub(crate) fn polars_error(e: PolarsError) -> StatsError {
    StatsError::PolarsError(e.to_string())
}

/// True when the frame has no columns or no rows
pub fn is_empty(df: &DataFrame) -> bool {
    df.width() == 0 || df.height() == 0
}

/// Column names in frame order
pub fn column_names(df: &DataFrame) -> impl Iterator<Item = &str> {
    df.get_columns().iter().map(|c| c.name().as_str())
}

pub fn series<'a>(df: &'a DataFrame, name: &str) -> Option<&'a Series> {
    df.column(name).ok().map(|c| c.as_materialized_series())
}

pub fn column_type(df: &DataFrame, name: &str) -> Option<ColumnType> {
    series(df, name).map(|s| ColumnType::of(s.dtype()))
}

fn require<'a>(df: &'a DataFrame, name: &str) -> StatsResult<&'a Series> {
    series(df, name).ok_or_else(|| StatsError::UnknownColumn(name.to_string()))
}

/// Numeric column cast to f64
pub fn numeric(df: &DataFrame, name: &str) -> StatsResult<Vec<f64>> {
    let s = require(df, name)?;
    let column_type = ColumnType::of(s.dtype());
    if !column_type.is_numeric() {
        return Err(StatsError::InvalidFeatureType {
            feature: name.to_string(),
            actual: column_type.name(),
        });
    }

    let cast = s.cast(&DataType::Float64).map_err(polars_error)?;
    let values = cast
        .f64()
        .map_err(polars_error)?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    Ok(values)
}

/// Row labels as used for factor levels and class labels
pub fn labels(df: &DataFrame, name: &str) -> StatsResult<Vec<Option<String>>> {
    let s = require(df, name)?;
    match ColumnType::of(s.dtype()) {
        ColumnType::Text => Ok(s
            .str()
            .map_err(polars_error)?
            .into_iter()
            .map(|v| v.map(String::from))
            .collect()),
        ColumnType::Integer => {
            let cast = s.cast(&DataType::Int64).map_err(polars_error)?;
            Ok(cast
                .i64()
                .map_err(polars_error)?
                .into_iter()
                .map(|v| v.map(|x| x.to_string()))
                .collect())
        }
        ColumnType::Float => Ok(numeric(df, name)?
            .into_iter()
            .map(|v| (!v.is_nan()).then(|| v.to_string()))
            .collect()),
        ColumnType::Other => Err(StatsError::InvalidFeatureType {
            feature: name.to_string(),
            actual: ColumnType::Other.name(),
        }),
    }
}

/// Distinct non-null labels, sorted. Integer columns sort numerically.
pub fn levels(df: &DataFrame, name: &str) -> StatsResult<Vec<String>> {
    let s = require(df, name)?;
    match ColumnType::of(s.dtype()) {
        ColumnType::Integer => {
            let cast = s.cast(&DataType::Int64).map_err(polars_error)?;
            let unique = cast.i64().map_err(polars_error)?.unique().map_err(polars_error)?;
            let mut values: Vec<i64> = unique.into_iter().flatten().collect();
            values.sort_unstable();
            Ok(values.into_iter().map(|x| x.to_string()).collect())
        }
        ColumnType::Text => {
            let unique = s.str().map_err(polars_error)?.unique().map_err(polars_error)?;
            let mut values: Vec<String> = unique.into_iter().flatten().map(String::from).collect();
            values.sort();
            Ok(values)
        }
        _ => {
            let mut values: Vec<String> = labels(df, name)?.into_iter().flatten().collect();
            values.sort();
            values.dedup();
            Ok(values)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;

    fn frame() -> DataFrame {
        df!(
            "a" => [1.0, 2.0, 3.0],
            "b" => [3_i64, 1, 3],
            "c" => ["x", "y", "x"],
            "d" => [true, false, true]
        )
        .unwrap()
    }

    #[test]
    fn test_column_types() {
        let df = frame();
        assert_eq!(column_type(&df, "a"), Some(ColumnType::Float));
        assert_eq!(column_type(&df, "b"), Some(ColumnType::Integer));
        assert_eq!(column_type(&df, "c"), Some(ColumnType::Text));
        assert_eq!(column_type(&df, "d"), Some(ColumnType::Other));
        assert!(column_type(&df, "z").is_none());
        assert_eq!(column_names(&df).collect::<Vec<_>>(), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_is_empty() {
        assert!(is_empty(&DataFrame::empty()));
        assert!(!is_empty(&frame()));
        let no_rows = df!("a" => Vec::<f64>::new()).unwrap();
        assert!(is_empty(&no_rows));
    }

    #[test]
    fn test_numeric_widening() {
        let df = frame();
        assert_eq!(numeric(&df, "b").unwrap(), vec![3.0, 1.0, 3.0]);
        assert!(matches!(
            numeric(&df, "c"),
            Err(StatsError::InvalidFeatureType { .. })
        ));
        assert!(matches!(numeric(&df, "z"), Err(StatsError::UnknownColumn(_))));

        let with_null = df!("a" => [Some(1.0), None]).unwrap();
        let values = numeric(&with_null, "a").unwrap();
        assert_eq!(values[0], 1.0);
        assert!(values[1].is_nan());
    }

    #[test]
    fn test_levels_sorted() {
        let df = df!(
            "n" => [10_i64, 2, 10, 1],
            "g" => [Some("b"), Some("a"), None, Some("b")]
        )
        .unwrap();
        assert_eq!(levels(&df, "n").unwrap(), vec!["1", "2", "10"]);
        assert_eq!(levels(&df, "g").unwrap(), vec!["a", "b"]);
        assert_eq!(
            labels(&df, "g").unwrap(),
            vec![Some("b".to_string()), Some("a".to_string()), None, Some("b".to_string())]
        );
    }
}
