//! Descriptive statistics table

use crate::data::{self, DataFrame};
use crate::errors::StatsResult;
use comfy_table::{presets, CellAlignment, Table};
use statrs::statistics::{Data, Distribution, Max, Min, OrderStatistics};
use std::fmt;

/// Row labels of a [`SummaryTable`], in order
pub const STATISTICS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Descriptive statistics, one column per feature
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    columns: Vec<String>,
    /// One entry per column, each holding the values for `STATISTICS`
    values: Vec<[f64; 8]>,
}

impl SummaryTable {
    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (STATISTICS.len(), self.columns.len())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All statistics for one column, ordered as `STATISTICS`
    pub fn column(&self, name: &str) -> Option<&[f64; 8]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| &self.values[i])
    }

    /// A single statistic, e.g. `get("mean", "x1")`
    pub fn get(&self, statistic: &str, column: &str) -> Option<f64> {
        let row = STATISTICS.iter().position(|s| *s == statistic)?;
        self.column(column).map(|values| values[row])
    }
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = Table::new();
        table.load_preset(presets::ASCII_MARKDOWN);

        let mut header = vec![String::new()];
        header.extend(self.columns.iter().cloned());
        table.set_header(header);

        for (row, statistic) in STATISTICS.iter().enumerate() {
            let mut cells = vec![statistic.to_string()];
            cells.extend(self.values.iter().map(|v| format!("{:.4}", v[row])));
            table.add_row(cells);
        }
        table.column_iter_mut().skip(1).for_each(|c| {
            c.set_cell_alignment(CellAlignment::Right);
        });
        write!(f, "{table}")
    }
}

/// Summarize numeric `features` of `data`; NaN and null values are skipped
pub fn describe<S: AsRef<str>>(data: &DataFrame, features: &[S]) -> StatsResult<SummaryTable> {
    let mut columns = Vec::with_capacity(features.len());
    let mut values = Vec::with_capacity(features.len());

    for feature in features {
        let name = feature.as_ref();
        let observed: Vec<f64> = data::numeric(data, name)?
            .into_iter()
            .filter(|v| !v.is_nan())
            .collect();
        columns.push(name.to_string());
        values.push(summarize(observed));
    }

    Ok(SummaryTable { columns, values })
}

fn summarize(observed: Vec<f64>) -> [f64; 8] {
    let count = observed.len() as f64;
    if observed.is_empty() {
        let nan = f64::NAN;
        return [count, nan, nan, nan, nan, nan, nan, nan];
    }

    let mut data = Data::new(observed);
    [
        count,
        data.mean().unwrap_or(f64::NAN),
        data.std_dev().unwrap_or(f64::NAN),
        data.min(),
        data.lower_quartile(),
        data.median(),
        data.upper_quartile(),
        data.max(),
    ]
}
