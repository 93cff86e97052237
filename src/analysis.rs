//! Correlations, descriptive statistics and the Mann-Whitney U test.

use itertools::Itertools;
use statrs::function::erf::erfc;
use statrs::statistics::{Data, Median, Statistics};
use std::fmt;
use tracing::{debug, info};

use crate::constants::SIGNIFICANCE_LEVEL;
use crate::error::AppError;
use crate::table::Table;

/// Pearson correlations between numeric columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Pearson r rounded to two decimals
    pub r: Vec<Vec<f64>>,
    /// r² rounded to two decimals
    pub r_squared: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.r[i][j])
    }
}

impl fmt::Display for CorrelationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.columns.iter().map(|c| c.chars().count()).max().unwrap_or(0);
        for (name, row) in self.columns.iter().zip(&self.r) {
            write!(f, "{name:<width$}")?;
            for r in row {
                write!(f, " {r:>6.2}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn require_numeric(table: &Table, column: &str) -> Result<(), AppError> {
    if table.is_numeric(column)? {
        Ok(())
    } else {
        Err(AppError::statistics(format!(
            "column '{column}' is not numeric"
        )))
    }
}

/// Pearson r of two equally long samples. NaN when either is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }
    let cov = x.iter().covariance(y.iter());
    cov / (x.iter().std_dev() * y.iter().std_dev())
}

/// Pairwise correlation matrix. Each pair uses the rows where both columns
/// have a value.
pub fn correlation_matrix(table: &Table, columns: &[&str]) -> Result<CorrelationMatrix, AppError> {
    for column in columns {
        require_numeric(table, column)?;
    }

    let n = columns.len();
    let mut r = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let (x, y): (Vec<f64>, Vec<f64>) = table
                .iter_rows()
                .filter_map(|row| Some((row.number(columns[i])?, row.number(columns[j])?)))
                .unzip();
            let value = round2(pearson(&x, &y));
            r[i][j] = value;
            r[j][i] = value;
        }
    }
    // squared before rounding
    let r_squared = columns
        .iter()
        .map(|a| {
            columns
                .iter()
                .map(|b| {
                    let (x, y): (Vec<f64>, Vec<f64>) = table
                        .iter_rows()
                        .filter_map(|row| Some((row.number(a)?, row.number(b)?)))
                        .unzip();
                    round2(pearson(&x, &y).powi(2))
                })
                .collect()
        })
        .collect();

    debug!("Correlation matrix over {columns:?}: {r:?}");
    Ok(CorrelationMatrix {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        r,
        r_squared,
    })
}

/// Summary statistics of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1)
    pub std: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: n={} mean={:.2} std={:.2} min={:.2} median={:.2} max={:.2}",
            self.column, self.count, self.mean, self.std, self.min, self.median, self.max
        )
    }
}

pub fn describe(table: &Table, columns: &[&str]) -> Result<Vec<Summary>, AppError> {
    columns
        .iter()
        .map(|column| {
            require_numeric(table, column)?;
            let values = table.numbers(column)?;
            Ok(Summary {
                column: column.to_string(),
                count: values.len(),
                mean: values.iter().mean(),
                std: values.iter().std_dev(),
                min: Statistics::min(values.iter()),
                median: if values.is_empty() {
                    f64::NAN
                } else {
                    Data::new(values.clone()).median()
                },
                max: Statistics::max(values.iter()),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UTestMethod {
    Exact,
    Asymptotic,
}

/// Two-sided Mann-Whitney U test result.
#[derive(Debug, Clone, PartialEq)]
pub struct MannWhitney {
    /// U of the first sample
    pub u: f64,
    pub p_value: f64,
    pub method: UTestMethod,
}

/// Average ranks (1-based) of the values, ties share their mean rank.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &k in &order[i..=j] {
            ranks[k] = rank;
        }
        i = j + 1;
    }
    ranks
}

/// Sizes of the groups of equal values.
fn tie_sizes(values: &[f64]) -> Vec<usize> {
    values
        .iter()
        .sorted_by(|a, b| a.total_cmp(b))
        .dedup_with_count()
        .map(|(count, _)| count)
        .collect()
}

/// Number of orderings of `m` and `n` observations per value of U.
fn u_distribution(m: usize, n: usize) -> Vec<f64> {
    // counts[j] is the distribution for (i, j) while the outer loop runs over i
    let mut counts: Vec<Vec<f64>> = (0..=n).map(|_| vec![1.0]).collect();
    for i in 1..=m {
        let mut next: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
        next.push(vec![1.0]);
        for j in 1..=n {
            let mut dist = vec![0.0; i * j + 1];
            // the largest observation belongs to the first sample
            for (u, c) in counts[j].iter().enumerate() {
                dist[u + j] += c;
            }
            // or to the second
            for (u, c) in next[j - 1].iter().enumerate() {
                dist[u] += c;
            }
            next.push(dist);
        }
        counts = next;
    }
    counts.pop().unwrap_or_else(|| vec![1.0])
}

fn normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / std::f64::consts::SQRT_2)
}

/// Two-sided Mann-Whitney U test.
///
/// Uses the exact null distribution when one of the samples has at most 8
/// observations and there are no ties, the normal approximation with tie and
/// continuity correction otherwise.
pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> Result<MannWhitney, AppError> {
    if x.is_empty() || y.is_empty() {
        return Err(AppError::statistics("Mann-Whitney U needs two non-empty samples"));
    }
    if x.iter().chain(y).any(|v| v.is_nan()) {
        return Err(AppError::statistics("samples contain NaN"));
    }

    let (n1, n2) = (x.len(), y.len());
    let combined: Vec<f64> = x.iter().chain(y).copied().collect();
    let ranks = average_ranks(&combined);
    let r1: f64 = ranks[..n1].iter().sum();
    let u1 = r1 - (n1 * (n1 + 1)) as f64 / 2.0;
    let u2 = (n1 * n2) as f64 - u1;
    let u_max = u1.max(u2);

    let ties = tie_sizes(&combined);
    let has_ties = ties.iter().any(|&t| t > 1);
    let method = if (n1 <= 8 || n2 <= 8) && !has_ties {
        UTestMethod::Exact
    } else {
        UTestMethod::Asymptotic
    };

    let p_value = match method {
        UTestMethod::Exact => {
            let dist = u_distribution(n1.min(n2), n1.max(n2));
            let total: f64 = dist.iter().sum();
            // U is an integer without ties
            let upper: f64 = dist.iter().skip(u_max.round() as usize).sum();
            2.0 * upper / total
        }
        UTestMethod::Asymptotic => {
            let n = (n1 + n2) as f64;
            let mu = (n1 * n2) as f64 / 2.0;
            let tie_term: f64 = ties.iter().map(|&t| (t.pow(3) - t) as f64).sum();
            let sigma = ((n1 * n2) as f64 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)))).sqrt();
            if sigma == 0.0 {
                1.0
            } else {
                2.0 * normal_sf((u_max - mu - 0.5) / sigma)
            }
        }
    }
    .clamp(0.0, 1.0);

    info!("Mann-Whitney U = {u1:.2}, p = {p_value:.4} ({method:?}, n1={n1}, n2={n2})");
    Ok(MannWhitney {
        u: u1,
        p_value,
        method,
    })
}

/// Least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

pub fn linear_fit(x: &[f64], y: &[f64]) -> Result<LinearFit, AppError> {
    if x.len() != y.len() {
        return Err(AppError::statistics(format!(
            "samples differ in length ({} and {})",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(AppError::statistics("a line needs at least two points"));
    }
    let variance = x.iter().variance();
    if variance == 0.0 {
        return Err(AppError::statistics("x has no variance"));
    }
    let slope = x.iter().covariance(y.iter()) / variance;
    let intercept = y.iter().mean() - slope * x.iter().mean();
    Ok(LinearFit { slope, intercept })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    RejectNull,
    RetainNull,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::RejectNull => write!(f, "Tulos on tilastollisesti merkitsevä. Hylätään nollahypoteesi."),
            Decision::RetainNull => write!(f, "Tulos ei ole tilastollisesti merkitsevä. Nollahypoteesia ei hylätä."),
        }
    }
}

pub fn interpret(p_value: f64, alpha: f64) -> Decision {
    if p_value < alpha {
        Decision::RejectNull
    } else {
        Decision::RetainNull
    }
}

/// [`interpret`] at the 5 % level.
pub fn interpret_default(p_value: f64) -> Decision {
    interpret(p_value, SIGNIFICANCE_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn pairs() -> Table {
        Table::from_rows(
            ["Vuosi", "a", "b", "c"],
            vec![
                vec![2015.into(), 1.0.into(), 2.0.into(), 8.0.into()],
                vec![2016.into(), 2.0.into(), 4.0.into(), 6.0.into()],
                vec![2017.into(), 3.0.into(), 5.0.into(), 4.0.into()],
                vec![2018.into(), 4.0.into(), 4.0.into(), 2.0.into()],
                vec![2019.into(), Value::Missing, 9.0.into(), 1.0.into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_correlation_matrix() {
        let m = correlation_matrix(&pairs(), &["a", "b", "c"]).unwrap();
        assert_eq!(m.get("a", "a"), Some(1.0));
        assert_eq!(m.get("a", "b"), Some(0.72));
        assert_eq!(m.get("b", "a"), Some(0.72));
        assert_eq!(m.get("a", "c"), Some(-1.0));
        assert_eq!(m.r_squared[0][1], 0.52);
        assert_eq!(m.r_squared[0][2], 1.0);
    }

    #[test]
    fn test_correlation_rejects_text_column() {
        let t = Table::from_rows(["x", "y"], vec![vec!["a".into(), 1.0.into()]]).unwrap();
        assert!(matches!(
            correlation_matrix(&t, &["x", "y"]),
            Err(AppError::Statistics(_))
        ));
    }

    #[test]
    fn test_describe() {
        let s = describe(&pairs(), &["a"]).unwrap();
        assert_eq!(s[0].count, 4);
        assert_eq!(s[0].mean, 2.5);
        assert!((s[0].std - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(s[0].min, 1.0);
        assert_eq!(s[0].median, 2.5);
        assert_eq!(s[0].max, 4.0);
    }

    #[test]
    fn test_average_ranks_with_ties() {
        assert_eq!(average_ranks(&[3.0, 1.0, 3.0, 2.0]), vec![3.5, 1.0, 3.5, 2.0]);
    }

    #[test]
    fn test_u_distribution_counts_orderings() {
        // C(6, 3) orderings, U ranges over 0..=9
        let dist = u_distribution(3, 3);
        assert_eq!(dist.len(), 10);
        assert_eq!(dist.iter().sum::<f64>(), 20.0);
        assert_eq!(dist, vec![1.0, 1.0, 2.0, 3.0, 3.0, 3.0, 3.0, 2.0, 1.0, 1.0]);
    }

    #[test]
    fn test_mann_whitney_exact() {
        let result = mann_whitney_u(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap();
        assert_eq!(result.method, UTestMethod::Exact);
        assert_eq!(result.u, 0.0);
        assert!((result.p_value - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_mann_whitney_asymptotic_with_ties() {
        // self-care shares without and with some difficulty, fully separated
        let no_difficulty = [96.0, 98.0, 98.0, 95.0, 91.0, 97.0];
        let some_difficulty = [3.0, 1.5, 1.0, 4.0, 7.5, 2.0];
        let result = mann_whitney_u(&no_difficulty, &some_difficulty).unwrap();
        assert_eq!(result.method, UTestMethod::Asymptotic);
        assert_eq!(result.u, 36.0);
        assert!((result.p_value - 0.0050).abs() < 1e-4, "p = {}", result.p_value);
        assert_eq!(interpret_default(result.p_value), Decision::RejectNull);
    }

    #[test]
    fn test_mann_whitney_identical_samples() {
        let result = mann_whitney_u(&[1.0, 1.0], &[1.0, 1.0]).unwrap();
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_mann_whitney_empty_sample() {
        assert!(mann_whitney_u(&[], &[1.0]).is_err());
    }

    #[test]
    fn test_linear_fit() {
        let fit = linear_fit(&[1.0, 2.0, 3.0], &[3.0, 5.0, 7.0]).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.at(4.0) - 9.0).abs() < 1e-12);
        assert!(linear_fit(&[1.0, 1.0], &[2.0, 3.0]).is_err());
    }

    #[test]
    fn test_interpret() {
        assert_eq!(interpret(0.049, 0.05), Decision::RejectNull);
        assert_eq!(interpret(0.05, 0.05), Decision::RetainNull);
    }
}
