//! Data behind the two diagnostic figures drawn per sample.
//!
//! A renderer gets everything it needs to draw a density histogram with the
//! fitted normal curve and a mean marker, and a normal QQ-plot with a
//! standardized reference line. No drawing happens here.

use serde::Serialize;
use u_numflow::stats;

use crate::distribution::{histogram_bins, normal_pdf, qq_plot_normal, BinMethod, HistogramBins};

/// Number of points on the fitted normal curve.
pub const CURVE_POINTS: usize = 100;

/// Histogram panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramFigure {
    /// Bins chosen by [`BinMethod::Auto`].
    pub bins: HistogramBins,
    /// Per-bin density, so the bars integrate to 1.
    pub densities: Vec<f64>,
    /// `(x, pdf)` points of the fitted normal over the bin range.
    pub normal_curve: Vec<(f64, f64)>,
    /// Mean of the fitted normal (vertical marker).
    pub mu: f64,
    /// Maximum-likelihood standard deviation of the fitted normal.
    pub sigma: f64,
}

/// QQ-plot panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QqFigure {
    /// Standard normal quantiles.
    pub theoretical: Vec<f64>,
    /// Sorted sample.
    pub sample: Vec<f64>,
    /// Reference line intercept (sample mean).
    pub line_intercept: f64,
    /// Reference line slope (sample standard deviation).
    pub line_slope: f64,
}

/// Both figures for one labelled sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigureData {
    /// Sample label, used in titles.
    pub label: String,
    /// Histogram with fitted normal.
    pub histogram: HistogramFigure,
    /// Normal QQ-plot.
    pub qq: QqFigure,
}

/// Builds the figure data for one sample.
///
/// # Returns
///
/// `None` if the sample has fewer than 3 points, zero range or non-finite
/// values.
///
/// # Examples
///
/// ```
/// use u_hypothesis::figures::{figure_data, CURVE_POINTS};
///
/// let data = [4.1, 5.0, 5.3, 4.7, 5.9, 5.1, 4.4, 5.6];
/// let fig = figure_data(&data, "length").unwrap();
/// assert_eq!(fig.histogram.normal_curve.len(), CURVE_POINTS);
/// assert_eq!(fig.qq.sample.len(), data.len());
/// ```
pub fn figure_data(data: &[f64], label: &str) -> Option<FigureData> {
    let bins = histogram_bins(data, BinMethod::Auto)?;
    let (theoretical, sample) = qq_plot_normal(data)?;

    let n = data.len() as f64;
    let mu = stats::mean(data)?;
    let sd = stats::std_dev(data)?;
    let sigma = sd * ((n - 1.0) / n).sqrt();
    if sigma < 1e-300 {
        return None;
    }

    let densities = bins
        .counts
        .iter()
        .map(|&c| c as f64 / (n * bins.bin_width))
        .collect();

    let lo = bins.edges[0];
    let hi = bins.edges[bins.n_bins];
    let step = (hi - lo) / (CURVE_POINTS - 1) as f64;
    let normal_curve = (0..CURVE_POINTS)
        .map(|i| {
            let x = lo + i as f64 * step;
            (x, normal_pdf(x, mu, sigma))
        })
        .collect();

    Some(FigureData {
        label: label.to_string(),
        histogram: HistogramFigure {
            bins,
            densities,
            normal_curve,
            mu,
            sigma,
        },
        qq: QqFigure {
            theoretical,
            sample,
            line_intercept: mu,
            line_slope: sd,
        },
    })
}
