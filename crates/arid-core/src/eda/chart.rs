//! Vega-Lite chart assembly
//!
//! Charts are plain Vega-Lite v5 specifications. Rendering is left to
//! whatever front end consumes the JSON.

use crate::data::{self, DataFrame};
use crate::types::ResponseKind;
use serde_json::{json, Map, Value};

const SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";
const PLOT_SIZE: u32 = 200;

/// Top-level composition of a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Unit,
    Layer,
    HConcat,
    VConcat,
}

/// A Vega-Lite specification and its top-level composition
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    kind: ChartKind,
    spec: Value,
}

impl Chart {
    fn new(kind: ChartKind, spec: Value) -> Self {
        Self { kind, spec }
    }

    fn hconcat(charts: Vec<Chart>) -> Self {
        Self::compose(ChartKind::HConcat, "hconcat", charts)
    }

    fn vconcat(charts: Vec<Chart>) -> Self {
        Self::compose(ChartKind::VConcat, "vconcat", charts)
    }

    fn compose(kind: ChartKind, key: &str, charts: Vec<Chart>) -> Self {
        let parts: Vec<Value> = charts.into_iter().map(|c| c.spec).collect();
        let mut spec = Map::new();
        spec.insert(key.to_string(), Value::Array(parts));
        Self::new(kind, Value::Object(spec))
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    /// Specification without the `$schema` key
    pub fn spec(&self) -> &Value {
        &self.spec
    }

    /// Complete, standalone Vega-Lite document
    pub fn to_vega_lite(&self) -> Value {
        let mut document = self.spec.clone();
        if let Value::Object(map) = &mut document {
            map.insert("$schema".to_string(), Value::from(SCHEMA));
        }
        document
    }
}

/// Column values as JSON; NaN and null serialize as null, which Vega-Lite treats as missing
fn column_values(data: &DataFrame, name: &str) -> Option<Vec<Value>> {
    if data::column_type(data, name)?.is_numeric() {
        let values = data::numeric(data, name).ok()?;
        Some(values.into_iter().map(Value::from).collect())
    } else {
        let labels = data::labels(data, name).ok()?;
        Some(labels.into_iter().map(Value::from).collect())
    }
}

/// Inline data rows holding the given columns
fn records(data: &DataFrame, names: &[&str]) -> Value {
    let columns: Vec<(&str, Vec<Value>)> = names
        .iter()
        .filter_map(|n| column_values(data, n).map(|values| (*n, values)))
        .collect();

    let rows: Vec<Value> = (0..data.height())
        .map(|i| {
            let mut row = Map::new();
            for (name, values) in &columns {
                row.insert(name.to_string(), values[i].clone());
            }
            Value::Object(row)
        })
        .collect();
    json!({ "values": rows })
}

/// Distribution of one feature against the response
///
/// A categorical response gets one density curve per level, a continuous
/// response a binned histogram of the feature.
pub fn feature_plot(data: &DataFrame, response: &str, kind: ResponseKind, feature: &str) -> Chart {
    let spec = match kind {
        ResponseKind::Categorical => json!({
            "title": feature,
            "width": PLOT_SIZE,
            "height": PLOT_SIZE,
            "data": records(data, &[feature, response]),
            "transform": [{
                "density": feature,
                "groupby": [response],
                "as": [feature, "density"]
            }],
            "mark": { "type": "area", "opacity": 0.5 },
            "encoding": {
                "x": { "field": feature, "type": "quantitative" },
                "y": { "field": "density", "type": "quantitative", "stack": null },
                "color": { "field": response, "type": "nominal" }
            }
        }),
        ResponseKind::Continuous => json!({
            "title": feature,
            "width": PLOT_SIZE,
            "height": PLOT_SIZE,
            "data": records(data, &[feature]),
            "mark": "bar",
            "encoding": {
                "x": { "field": feature, "type": "quantitative", "bin": { "maxbins": 30 } },
                "y": { "aggregate": "count", "type": "quantitative" }
            }
        }),
    };
    Chart::new(ChartKind::Unit, spec)
}

/// Tile charts two per row, rows stacked vertically
pub fn grid(charts: Vec<Chart>) -> Chart {
    let mut rows = Vec::new();
    let mut charts = charts.into_iter().peekable();
    while charts.peek().is_some() {
        let row: Vec<Chart> = charts.by_ref().take(2).collect();
        rows.push(Chart::hconcat(row));
    }
    Chart::vconcat(rows)
}

/// Correlation matrix as a colored heatmap with the value printed in each cell
pub fn heatmap<S: AsRef<str>>(features: &[S], matrix: &[Vec<f64>]) -> Chart {
    let mut cells = Vec::with_capacity(features.len() * features.len());
    for (i, row) in matrix.iter().enumerate() {
        for (j, &rho) in row.iter().enumerate() {
            cells.push(json!({
                "x": features[j].as_ref(),
                "y": features[i].as_ref(),
                "correlation": rho,
                "label": if rho.is_nan() { "NaN".to_string() } else { format!("{rho:.2}") }
            }));
        }
    }

    let order: Vec<&str> = features.iter().map(AsRef::as_ref).collect();
    let spec = json!({
        "title": "Spearman correlation",
        "width": PLOT_SIZE,
        "height": PLOT_SIZE,
        "data": { "values": cells },
        "encoding": {
            "x": { "field": "x", "type": "nominal", "sort": order, "title": null },
            "y": { "field": "y", "type": "nominal", "sort": order, "title": null }
        },
        "layer": [
            {
                "mark": "rect",
                "encoding": {
                    "color": {
                        "field": "correlation",
                        "type": "quantitative",
                        "scale": { "domain": [-1, 1], "scheme": "redblue" }
                    }
                }
            },
            {
                "mark": "text",
                "encoding": { "text": { "field": "label", "type": "nominal" } }
            }
        ]
    });
    Chart::new(ChartKind::Layer, spec)
}

/// Feature plots beside the correlation heatmap
pub fn combined(plots: Chart, heatmap: Chart) -> Chart {
    Chart::hconcat(vec![plots, heatmap])
}
