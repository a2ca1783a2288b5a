//! Spearman rank correlation between features

use crate::data::{self, DataFrame};
use crate::errors::StatsResult;
use statrs::statistics::{Data, OrderStatistics, RankTieBreaker, Statistics};

/// Symmetric Spearman correlation matrix with a zeroed diagonal.
///
/// Each pair uses the rows where both features are present. Ties get their
/// average rank.
pub fn spearman_matrix<S: AsRef<str>>(
    data: &DataFrame,
    features: &[S],
) -> StatsResult<Vec<Vec<f64>>> {
    let columns = features
        .iter()
        .map(|f| data::numeric(data, f.as_ref()))
        .collect::<StatsResult<Vec<_>>>()?;

    let n = columns.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let rho = spearman(&columns[i], &columns[j]);
            matrix[i][j] = rho;
            matrix[j][i] = rho;
        }
    }
    Ok(matrix)
}

/// Spearman's rho: Pearson correlation of the ranks
pub fn spearman(a: &[f64], b: &[f64]) -> f64 {
    let (a, b): (Vec<f64>, Vec<f64>) = a
        .iter()
        .zip(b)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(x, y)| (*x, *y))
        .unzip();
    if a.len() < 2 {
        return f64::NAN;
    }

    let rank_a = Data::new(a).ranks(RankTieBreaker::Average);
    let rank_b = Data::new(b).ranks(RankTieBreaker::Average);

    let cov = Statistics::covariance(rank_a.iter(), rank_b.iter());
    let sd_a = Statistics::std_dev(rank_a.iter());
    let sd_b = Statistics::std_dev(rank_b.iter());
    if sd_a == 0.0 || sd_b == 0.0 {
        return f64::NAN;
    }
    cov / (sd_a * sd_b)
}
