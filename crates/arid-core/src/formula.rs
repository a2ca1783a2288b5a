//! Model formulas and their design matrices
//!
//! A [`Design`] holds the terms of a linear predictor. It renders to the
//! symbolic `response ~ terms` formula and expands, for any dataset carrying
//! the same columns, into the numeric design matrix both estimators are fit on.
//!
//! Categorical terms use treatment coding: the first level (sorted) is the
//! reference and gets no column.

use crate::data::{self, DataFrame};
use crate::errors::{StatsError, StatsResult};
use crate::types::InteractionMode;

/// One term of a linear predictor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Continuous main effect
    Continuous(String),
    /// Categorical main effect, rendered `C(name)`
    Factor(String),
    /// Continuous by categorical cross term
    ContinuousFactor(String, String),
    /// Cross term between two distinct continuous features
    ContinuousPair(String, String),
}

impl Term {
    /// Symbolic form of the term
    pub fn render(&self) -> String {
        match self {
            Term::Continuous(x) => x.clone(),
            Term::Factor(g) => format!("C({g})"),
            Term::ContinuousFactor(x, g) => format!("{x}:C({g})"),
            Term::ContinuousPair(a, b) => format!("{a}:{b}"),
        }
    }

    pub fn is_interaction(&self) -> bool {
        matches!(self, Term::ContinuousFactor(..) | Term::ContinuousPair(..))
    }
}

/// Ordered list of terms for the given features and interaction mode.
///
/// Additive: continuous terms, then factors. Interactive additionally appends
/// every continuous×categorical cross term and every unordered pair of
/// distinct continuous features, each exactly once.
pub fn build_terms<S: AsRef<str>, T: AsRef<str>>(
    continuous: &[S],
    categorical: &[T],
    mode: InteractionMode,
) -> Vec<Term> {
    let mut terms: Vec<Term> = continuous
        .iter()
        .map(|x| Term::Continuous(x.as_ref().to_string()))
        .chain(
            categorical
                .iter()
                .map(|g| Term::Factor(g.as_ref().to_string())),
        )
        .collect();

    if mode == InteractionMode::Interactive {
        for x in continuous {
            for g in categorical {
                terms.push(Term::ContinuousFactor(
                    x.as_ref().to_string(),
                    g.as_ref().to_string(),
                ));
            }
        }
        for (i, a) in continuous.iter().enumerate() {
            for b in &continuous[i + 1..] {
                terms.push(Term::ContinuousPair(
                    a.as_ref().to_string(),
                    b.as_ref().to_string(),
                ));
            }
        }
    }

    terms
}

/// Render `response ~ t1 + t2 + ...`
pub fn build_formula<S: AsRef<str>, T: AsRef<str>>(
    response: &str,
    continuous: &[S],
    categorical: &[T],
    mode: InteractionMode,
) -> String {
    render(response, &build_terms(continuous, categorical, mode))
}

fn render(response: &str, terms: &[Term]) -> String {
    let rhs = terms
        .iter()
        .map(Term::render)
        .collect::<Vec<_>>()
        .join(" + ");
    format!("{response} ~ {rhs}")
}

/// A categorical feature and the levels observed when the design was built
#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    pub name: String,
    pub levels: Vec<String>,
}

impl Factor {
    /// Levels that receive an indicator column
    pub fn coded_levels(&self) -> &[String] {
        self.levels.get(1..).unwrap_or(&[])
    }

    fn label(&self, level: &str) -> String {
        format!("C({})[T.{}]", self.name, level)
    }

    /// Null labels code as the reference level
    fn indicators(&self, data: &DataFrame) -> StatsResult<Vec<Vec<f64>>> {
        let labels = data::labels(data, &self.name)?;
        Ok(self
            .coded_levels()
            .iter()
            .map(|level| {
                labels
                    .iter()
                    .map(|label| if label.as_ref() == Some(level) { 1.0 } else { 0.0 })
                    .collect()
            })
            .collect())
    }
}

/// Terms of a fitted linear predictor plus the factor levels they were coded with
#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    response: String,
    mode: InteractionMode,
    terms: Vec<Term>,
    factors: Vec<Factor>,
}

impl Design {
    /// Build a design from resolved features, reading factor levels from `data`
    pub fn new<S: AsRef<str>, T: AsRef<str>>(
        data: &DataFrame,
        response: &str,
        continuous: &[S],
        categorical: &[T],
        mode: InteractionMode,
    ) -> StatsResult<Self> {
        let factors = categorical
            .iter()
            .map(|g| {
                let name = g.as_ref();
                Ok(Factor {
                    name: name.to_string(),
                    levels: data::levels(data, name)?,
                })
            })
            .collect::<StatsResult<Vec<_>>>()?;

        Ok(Self {
            response: response.to_string(),
            mode,
            terms: build_terms(continuous, categorical, mode),
            factors,
        })
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn formula(&self) -> String {
        render(&self.response, &self.terms)
    }

    fn factor(&self, name: &str) -> StatsResult<&Factor> {
        self.factors
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| StatsError::UnknownColumn(name.to_string()))
    }

    /// Labels of the design matrix columns, in matrix order
    pub fn column_names(&self) -> StatsResult<Vec<String>> {
        let mut names = Vec::new();
        for term in &self.terms {
            match term {
                Term::Continuous(x) => names.push(x.clone()),
                Term::Factor(g) => {
                    let factor = self.factor(g)?;
                    names.extend(factor.coded_levels().iter().map(|l| factor.label(l)));
                }
                Term::ContinuousFactor(x, g) => {
                    let factor = self.factor(g)?;
                    names.extend(
                        factor
                            .coded_levels()
                            .iter()
                            .map(|l| format!("{x}:{}", factor.label(l))),
                    );
                }
                Term::ContinuousPair(a, b) => names.push(format!("{a}:{b}")),
            }
        }
        Ok(names)
    }

    /// Expand the terms over `data` into feature columns (column-major)
    pub fn matrix(&self, data: &DataFrame) -> StatsResult<Vec<Vec<f64>>> {
        let mut columns = Vec::new();
        for term in &self.terms {
            match term {
                Term::Continuous(x) => columns.push(data::numeric(data, x)?),
                Term::Factor(g) => columns.extend(self.factor(g)?.indicators(data)?),
                Term::ContinuousFactor(x, g) => {
                    let values = data::numeric(data, x)?;
                    for indicator in self.factor(g)?.indicators(data)? {
                        columns.push(product(&values, &indicator));
                    }
                }
                Term::ContinuousPair(a, b) => {
                    columns.push(product(&data::numeric(data, a)?, &data::numeric(data, b)?))
                }
            }
        }
        Ok(columns)
    }

    /// Response column widened to f64
    pub fn response_vector(&self, data: &DataFrame) -> StatsResult<Vec<f64>> {
        data::numeric(data, &self.response)
    }
}

fn product(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x * y).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;

    const NONE: &[&str] = &[];

    #[test]
    fn test_additive_formula() {
        let f = build_formula("y", &["a", "b"], &["g"], InteractionMode::Additive);
        assert_eq!(f, "y ~ a + b + C(g)");
        assert!(!f.contains(':'));
    }

    #[test]
    fn test_interactive_formula() {
        let f = build_formula("y", &["a", "b", "c"], &["g"], InteractionMode::Interactive);
        assert_eq!(
            f,
            "y ~ a + b + c + C(g) + a:C(g) + b:C(g) + c:C(g) + a:b + a:c + b:c"
        );
    }

    #[test]
    fn test_interactive_cross_term_counts() {
        let continuous = ["a", "b", "c", "d"];
        let categorical = ["g", "h"];
        let terms = build_terms(&continuous, &categorical, InteractionMode::Interactive);
        let cross_factor = terms
            .iter()
            .filter(|t| matches!(t, Term::ContinuousFactor(..)))
            .count();
        let pairs = terms
            .iter()
            .filter(|t| matches!(t, Term::ContinuousPair(..)))
            .count();
        assert_eq!(cross_factor, 4 * 2);
        assert_eq!(pairs, 4 * 3 / 2);
        assert!(!terms.contains(&Term::ContinuousPair("a".into(), "a".into())));
    }

    #[test]
    fn test_collapsed_segments() {
        let f = build_formula("y", &["a", "b"], NONE, InteractionMode::Interactive);
        assert_eq!(f, "y ~ a + b + a:b");

        let f = build_formula("y", &["a"], &["g"], InteractionMode::Interactive);
        assert_eq!(f, "y ~ a + C(g) + a:C(g)");

        let f = build_formula("y", NONE, &["g", "h"], InteractionMode::Interactive);
        assert_eq!(f, "y ~ C(g) + C(h)");
    }

    #[test]
    fn test_formula_is_deterministic() {
        let first = build_formula("n", &["b", "a"], &["g"], InteractionMode::Interactive);
        let second = build_formula("n", &["b", "a"], &["g"], InteractionMode::Interactive);
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    fn frame() -> DataFrame {
        df!(
            "a" => [1.0, 2.0, 3.0, 4.0],
            "b" => [2.0, 0.5, 1.0, 3.0],
            "g" => ["lo", "hi", "mid", "hi"],
            "n" => [0_i64, 2, 1, 5]
        )
        .unwrap()
    }

    #[test]
    fn test_design_columns() {
        let df = frame();
        let design = Design::new(&df, "n", &["a", "b"], &["g"], InteractionMode::Interactive)
            .unwrap();
        assert_eq!(design.formula(), "n ~ a + b + C(g) + a:C(g) + b:C(g) + a:b");
        assert_eq!(
            design.column_names().unwrap(),
            vec![
                "a",
                "b",
                "C(g)[T.lo]",
                "C(g)[T.mid]",
                "a:C(g)[T.lo]",
                "a:C(g)[T.mid]",
                "b:C(g)[T.lo]",
                "b:C(g)[T.mid]",
                "a:b",
            ]
        );

        let x = design.matrix(&df).unwrap();
        assert_eq!(x.len(), 9);
        assert_eq!(x[2], vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(x[3], vec![0.0, 0.0, 1.0, 0.0]);
        assert_eq!(x[5], vec![0.0, 0.0, 3.0, 0.0]);
        assert_eq!(x[8], vec![2.0, 1.0, 3.0, 12.0]);
        assert_eq!(design.response_vector(&df).unwrap(), vec![0.0, 2.0, 1.0, 5.0]);
    }

    #[test]
    fn test_design_unseen_level_is_reference() {
        let df = frame();
        let design = Design::new(&df, "n", &["a"], &["g"], InteractionMode::Additive).unwrap();
        let new = df!("a" => [1.0, 2.0], "g" => [Some("other"), None]).unwrap();
        let x = design.matrix(&new).unwrap();
        assert_eq!(x, vec![vec![1.0, 2.0], vec![0.0, 0.0], vec![0.0, 0.0]]);
    }

    #[test]
    fn test_design_missing_column() {
        let df = frame();
        let design = Design::new(&df, "n", &["a"], NONE, InteractionMode::Additive).unwrap();
        let other = df.select(["b"]).unwrap();
        assert!(matches!(
            design.matrix(&other),
            Err(StatsError::UnknownColumn(_))
        ));
    }
}
