//! Distribution analysis.
//!
//! The Kolmogorov-Smirnov normality check plus the data behind the two
//! diagnostic figures: histogram bins and normal QQ-plot points.
//!
//! # Examples
//!
//! ```
//! use u_hypothesis::distribution::{histogram_bins, BinMethod};
//!
//! let data = [1.0, 2.0, 2.5, 3.0, 3.5, 4.0, 5.0];
//! let bins = histogram_bins(&data, BinMethod::Sturges).unwrap();
//! assert_eq!(bins.counts.iter().sum::<usize>(), data.len());
//! ```

use serde::Serialize;
use u_numflow::special;
use u_numflow::stats;

// ---------------------------------------------------------------------------
// Histogram binning
// ---------------------------------------------------------------------------

/// Method for choosing the number of histogram bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinMethod {
    /// Sturges' rule: k = ⌈log₂(n)⌉ + 1. Best for near-normal data.
    Sturges,
    /// Freedman-Diaconis rule: h = 2·IQR·n^(-1/3). Robust to outliers.
    FreedmanDiaconis,
    /// The larger bin count of Sturges and Freedman-Diaconis.
    Auto,
}

/// Histogram bins for a sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBins {
    /// Number of bins.
    pub n_bins: usize,
    /// Bin width.
    pub bin_width: f64,
    /// Bin edges (length = n_bins + 1).
    pub edges: Vec<f64>,
    /// Bin counts.
    pub counts: Vec<usize>,
}

fn sturges_bins(n: f64) -> usize {
    (n.log2().ceil() as usize + 1).max(2)
}

// Falls back to Sturges when the IQR collapses. Capped at max(n, Sturges):
// a tiny IQR against a wide range otherwise asks for an unbounded bin count.
fn freedman_diaconis_bins(data: &[f64], range: f64) -> Option<usize> {
    let nf = data.len() as f64;
    let sturges = sturges_bins(nf);
    let iqr = stats::quantile(data, 0.75)? - stats::quantile(data, 0.25)?;
    if iqr < 1e-300 {
        return Some(sturges);
    }
    let cap = data.len().max(sturges);
    let h = 2.0 * iqr * nf.powf(-1.0 / 3.0);
    let bins = (range / h).ceil();
    if bins.is_finite() && bins < cap as f64 {
        Some(bins as usize)
    } else {
        Some(cap)
    }
}

/// Computes histogram bins using the specified method.
///
/// # Returns
///
/// `None` if fewer than 2 data points, non-finite values, or zero range.
///
/// # Examples
///
/// ```
/// use u_hypothesis::distribution::{histogram_bins, BinMethod};
///
/// let data = [1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0];
/// let result = histogram_bins(&data, BinMethod::Auto).unwrap();
/// assert!(result.n_bins >= 5);
/// assert_eq!(result.edges.len(), result.n_bins + 1);
/// ```
pub fn histogram_bins(data: &[f64], method: BinMethod) -> Option<HistogramBins> {
    let n = data.len();
    if n < 2 || data.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let min_val = data.iter().copied().reduce(f64::min)?;
    let max_val = data.iter().copied().reduce(f64::max)?;
    let range = max_val - min_val;
    if range < 1e-300 {
        return None;
    }

    let nf = n as f64;
    let n_bins = match method {
        BinMethod::Sturges => sturges_bins(nf),
        BinMethod::FreedmanDiaconis => freedman_diaconis_bins(data, range)?,
        BinMethod::Auto => sturges_bins(nf).max(freedman_diaconis_bins(data, range)?),
    }
    .max(2);

    let bin_width = range / n_bins as f64;
    let edges: Vec<f64> = (0..=n_bins).map(|i| min_val + i as f64 * bin_width).collect();

    let mut counts = vec![0_usize; n_bins];
    for &x in data {
        let bin = (((x - min_val) / bin_width).floor() as usize).min(n_bins - 1);
        counts[bin] += 1;
    }

    Some(HistogramBins {
        n_bins,
        bin_width,
        edges,
        counts,
    })
}

// ---------------------------------------------------------------------------
// Normal density and QQ-plot
// ---------------------------------------------------------------------------

/// Density of N(μ, σ²) at `x`.
pub fn normal_pdf(x: f64, mu: f64, sigma: f64) -> f64 {
    let z = (x - mu) / sigma;
    (-0.5 * z * z).exp() / (sigma * (2.0 * std::f64::consts::PI).sqrt())
}

/// Generates QQ-plot data (theoretical quantiles vs sample quantiles).
///
/// Theoretical quantiles are standard normal at plotting positions
/// (i - 0.5) / n; sample quantiles are the sorted data.
///
/// # Returns
///
/// `None` if fewer than 3 data points or non-finite values.
///
/// # Examples
///
/// ```
/// use u_hypothesis::distribution::qq_plot_normal;
///
/// let data = [1.5, -0.5, 0.0, 0.5, -1.5];
/// let (theoretical, sample) = qq_plot_normal(&data).unwrap();
/// assert_eq!(sample, vec![-1.5, -0.5, 0.0, 0.5, 1.5]);
/// assert!(theoretical[2].abs() < 1e-9);
/// ```
pub fn qq_plot_normal(data: &[f64]) -> Option<(Vec<f64>, Vec<f64>)> {
    let n = data.len();
    if n < 3 || data.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let mut sample = data.to_vec();
    sample.sort_by(|a, b| a.total_cmp(b));

    let nf = n as f64;
    let theoretical = (0..n)
        .map(|i| special::inverse_normal_cdf((i as f64 + 0.5) / nf))
        .collect();

    Some((theoretical, sample))
}

// ---------------------------------------------------------------------------
// Kolmogorov-Smirnov test
// ---------------------------------------------------------------------------

/// Kolmogorov-Smirnov normality test against a normal fitted by the sample
/// mean and standard deviation.
///
/// # Algorithm
///
/// D = max|F_n(x) - Φ((x - x̄)/s)| over both sides of each ECDF step.
/// P-value from the Kolmogorov distribution with Stephens' small-sample
/// scaling λ = (√n + 0.12 + 0.11/√n)·D.
///
/// # Returns
///
/// `(D, p)`, or `None` if fewer than 5 observations, zero variance, or
/// non-finite values.
///
/// # Examples
///
/// ```
/// use u_hypothesis::distribution::ks_test_normal;
///
/// let data = [-1.2, -0.8, -0.3, 0.1, 0.5, 0.7, 1.1, 1.4];
/// let (d, p) = ks_test_normal(&data).unwrap();
/// assert!(d > 0.0 && d < 1.0);
/// assert!(p > 0.05);
/// ```
pub fn ks_test_normal(data: &[f64]) -> Option<(f64, f64)> {
    let n = data.len();
    if n < 5 || data.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let mean = stats::mean(data)?;
    let sd = stats::std_dev(data)?;
    if sd < 1e-300 {
        return None;
    }

    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let nf = n as f64;
    let d_stat = sorted
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let cdf = special::standard_normal_cdf((x - mean) / sd);
            let above = ((i + 1) as f64 / nf - cdf).abs();
            let below = (i as f64 / nf - cdf).abs();
            above.max(below)
        })
        .fold(0.0_f64, f64::max);

    let lambda = (nf.sqrt() + 0.12 + 0.11 / nf.sqrt()) * d_stat;
    Some((d_stat, kolmogorov_survival(lambda)))
}

// Q(λ) = P(K > λ) for the Kolmogorov distribution. Below λ = 1.18 the
// alternating series converges too slowly, so use 1 - K(λ) with the Jacobi
// theta form K(λ) = √(2π)/λ · Σ exp(-(2k-1)²π²/(8λ²)) instead.
fn kolmogorov_survival(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    if lambda < 1.18 {
        let c = -std::f64::consts::PI.powi(2) / (8.0 * lambda * lambda);
        let mut cdf = 0.0;
        for k in 1..=20 {
            let odd = (2 * k - 1) as f64;
            let term = (c * odd * odd).exp();
            cdf += term;
            if term < 1e-16 * cdf.max(f64::MIN_POSITIVE) {
                break;
            }
        }
        1.0 - (2.0 * std::f64::consts::PI).sqrt() / lambda * cdf
    } else {
        // Q(λ) = 2·Σ (-1)^(k-1) exp(-2k²λ²)
        let mut sum = 0.0;
        for k in 1..=20 {
            let kf = k as f64;
            let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
            let term = sign * (-2.0 * kf * kf * lambda * lambda).exp();
            sum += term;
            if term.abs() < 1e-16 {
                break;
            }
        }
        2.0 * sum
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn hist_counts_cover_data(
            data in proptest::collection::vec(-1e3_f64..1e3, 2..=80)
        ) {
            if let Some(h) = histogram_bins(&data, BinMethod::Auto) {
                prop_assert_eq!(h.counts.iter().sum::<usize>(), data.len());
                prop_assert_eq!(h.edges.len(), h.n_bins + 1);
            }
        }

        #[test]
        fn ks_p_bounded(
            data in proptest::collection::vec(-1e3_f64..1e3, 5..=60)
        ) {
            if let Some((d, p)) = ks_test_normal(&data) {
                prop_assert!((0.0..=1.0).contains(&d), "D = {}", d);
                prop_assert!((0.0..=1.0).contains(&p), "p = {}", p);
            }
        }

        #[test]
        fn kolmogorov_survival_in_unit_interval(lambda in 0.0_f64..5.0) {
            let q = kolmogorov_survival(lambda);
            prop_assert!((0.0..=1.0).contains(&q), "Q({}) = {}", lambda, q);
        }
    }
}
