//! Statistical routines behind the assumption checks and the t-test.
//!
//! Every routine follows the same contract: it takes raw `f64` slices and
//! returns `None` when the statistic cannot be computed for that input
//! (too few observations, non-finite values, zero variance). Callers decide
//! whether that is fatal.
//!
//! # Examples
//!
//! ```
//! use u_hypothesis::testing::{one_sample_t_test, TestStatistic};
//!
//! let data = [5.1, 4.9, 5.2, 5.0, 4.8, 5.3, 5.1, 4.9];
//! let result = one_sample_t_test(&data, 5.0).unwrap();
//! assert!(result.p_value > 0.05); // cannot reject H₀: μ = 5.0
//! ```

use u_numflow::special;
use u_numflow::stats;

/// Raw output of a statistical routine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestStatistic {
    /// Test statistic (t, W, K², F or χ² depending on the routine).
    pub statistic: f64,
    /// Degrees of freedom, where the routine has one (0 otherwise).
    pub df: f64,
    /// p-value under the routine's null hypothesis (two-tailed for t-tests).
    pub p_value: f64,
}

fn all_finite(data: &[f64]) -> bool {
    data.iter().all(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// t-tests
// ---------------------------------------------------------------------------

/// One-sample t-test: H₀: μ = μ₀.
///
/// # Algorithm
///
/// t = (x̄ - μ₀) / (s / √n), df = n-1.
///
/// # Returns
///
/// `None` if fewer than 2 observations, zero variance, or non-finite values.
///
/// # Examples
///
/// ```
/// use u_hypothesis::testing::one_sample_t_test;
///
/// let data = [2.0, 4.0, 6.0, 8.0, 10.0];
/// let r = one_sample_t_test(&data, 6.0).unwrap();
/// assert!(r.p_value > 0.5); // mean is 6.0
/// ```
pub fn one_sample_t_test(data: &[f64], mu0: f64) -> Option<TestStatistic> {
    let n = data.len();
    if n < 2 || !all_finite(data) || !mu0.is_finite() {
        return None;
    }

    let mean = stats::mean(data)?;
    let sd = stats::std_dev(data)?;
    if sd < 1e-300 {
        return None;
    }

    let t = (mean - mu0) / (sd / (n as f64).sqrt());
    let df = (n - 1) as f64;
    let p_value = 2.0 * (1.0 - special::t_distribution_cdf(t.abs(), df));

    Some(TestStatistic {
        statistic: t,
        df,
        p_value,
    })
}

/// Independent two-sample Student t-test: H₀: μ₁ = μ₂ (equal variances).
///
/// Uses the pooled variance estimate, which is the appropriate estimator
/// once homogeneity of variance has been checked.
///
/// # Algorithm
///
/// s²ₚ = ((n₁-1)s₁² + (n₂-1)s₂²) / (n₁+n₂-2)
/// t = (x̄₁ - x̄₂) / √(s²ₚ (1/n₁ + 1/n₂)), df = n₁+n₂-2.
///
/// # Returns
///
/// `None` if either sample has fewer than 2 observations, the pooled
/// variance is zero, or non-finite values.
///
/// # References
///
/// Student (1908). "The probable error of a mean". Biometrika, 6(1), 1–25.
///
/// # Examples
///
/// ```
/// use u_hypothesis::testing::pooled_t_test;
///
/// let a = [5.1, 4.9, 5.2, 5.0, 4.8];
/// let b = [7.1, 6.9, 7.2, 7.0, 6.8];
/// let r = pooled_t_test(&a, &b).unwrap();
/// assert!(r.statistic < 0.0);
/// assert!(r.p_value < 0.01); // means clearly differ
/// assert_eq!(r.df, 8.0);
/// ```
pub fn pooled_t_test(a: &[f64], b: &[f64]) -> Option<TestStatistic> {
    let n1 = a.len();
    let n2 = b.len();
    if n1 < 2 || n2 < 2 || !all_finite(a) || !all_finite(b) {
        return None;
    }

    let mean1 = stats::mean(a)?;
    let mean2 = stats::mean(b)?;
    let var1 = stats::variance(a)?;
    let var2 = stats::variance(b)?;

    let n1f = n1 as f64;
    let n2f = n2 as f64;
    let df = n1f + n2f - 2.0;

    let pooled = ((n1f - 1.0) * var1 + (n2f - 1.0) * var2) / df;
    let se_sq = pooled * (1.0 / n1f + 1.0 / n2f);
    if se_sq < 1e-300 {
        return None;
    }

    let t = (mean1 - mean2) / se_sq.sqrt();
    let p_value = 2.0 * (1.0 - special::t_distribution_cdf(t.abs(), df));

    Some(TestStatistic {
        statistic: t,
        df,
        p_value,
    })
}

// ---------------------------------------------------------------------------
// Normality: Shapiro-Wilk
// ---------------------------------------------------------------------------

/// Shapiro-Wilk normality test: H₀: data is normally distributed.
///
/// The statistic is W (0 < W ≤ 1); `df` is unused and reported as 0.
///
/// # Algorithm
///
/// Royston (1992, 1995) approximation, AS R94:
/// 1. Coefficients from Blom-approximated normal order statistics
/// 2. W = (Σ aᵢ x₍ᵢ₎)² / Σ (xᵢ - x̄)²
/// 3. Normalising transform of W, p-value from the standard normal
///
/// # Returns
///
/// `None` if n < 3, n > 5000, all values identical, or non-finite values.
///
/// # References
///
/// - Shapiro & Wilk (1965). "An analysis of variance test for normality".
///   Biometrika, 52(3–4), 591–611.
/// - Royston (1995). "Remark AS R94: A remark on Algorithm AS 181".
///   Applied Statistics, 44(4), 547–551.
///
/// # Examples
///
/// ```
/// use u_hypothesis::testing::shapiro_wilk_test;
///
/// let data = [-1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5];
/// let r = shapiro_wilk_test(&data).unwrap();
/// assert!(r.statistic > 0.9);
/// assert!(r.p_value > 0.05);
/// ```
pub fn shapiro_wilk_test(data: &[f64]) -> Option<TestStatistic> {
    let n = data.len();
    if !(3..=5000).contains(&n) || !all_finite(data) {
        return None;
    }

    let mut x = data.to_vec();
    x.sort_by(|a, b| a.total_cmp(b));
    if x[n - 1] - x[0] < 1e-300 {
        return None;
    }

    let (w, p) = if n == 3 {
        sw_exact_n3(&x)?
    } else {
        let half = n / 2;
        let a = sw_coefficients(n, half)?;
        let w = sw_w(&x, &a);
        if !(0.0..=1.0 + 1e-10).contains(&w) {
            return None;
        }
        let w = w.min(1.0);
        (w, sw_p_value(w, n))
    };

    Some(TestStatistic {
        statistic: w,
        df: 0.0,
        p_value: p,
    })
}

// n = 3 has an exact distribution: a = (1/√2, 0, -1/√2).
fn sw_exact_n3(x: &[f64]) -> Option<(f64, f64)> {
    let mean = (x[0] + x[1] + x[2]) / 3.0;
    let ss: f64 = x.iter().map(|&v| (v - mean).powi(2)).sum();
    if ss < 1e-300 {
        return None;
    }
    let num = std::f64::consts::FRAC_1_SQRT_2 * (x[2] - x[0]);
    let w = (num * num / ss).clamp(0.75, 1.0);
    // W = 3/4 is the lower end of the support; acos rounding there can dip below 0.
    let p = if w <= 0.75 + 1e-12 {
        0.0
    } else {
        1.0 - (6.0 / std::f64::consts::PI) * w.sqrt().acos()
    };
    Some((w, p))
}

// Royston polynomial coefficients (AS R94)
const SW_C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const SW_C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const SW_C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const SW_C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const SW_C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const SW_C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const SW_G: [f64; 2] = [-2.273, 0.459];

// c[0] + c[1]·x + c[2]·x² + ... by Horner's rule
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}

fn sw_coefficients(n: usize, half: usize) -> Option<Vec<f64>> {
    let nf = n as f64;
    let m: Vec<f64> = (0..half)
        .map(|i| special::inverse_normal_cdf((i as f64 + 1.0 - 0.375) / (nf + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / nf.sqrt();

    // The first one (n ≤ 5) or two (n > 5) coefficients get Royston's
    // polynomial correction; the rest are rescaled order statistics.
    let corrected = if n <= 5 { 1 } else { 2 };
    let mut a = vec![0.0; half];
    a[0] = poly(&SW_C1, rsn) - m[0] / ssumm2;
    if corrected == 2 {
        a[1] = poly(&SW_C2, rsn) - m[1] / ssumm2;
    }

    let fac_sq = summ2 - 2.0 * m[..corrected].iter().map(|v| v * v).sum::<f64>();
    let one_minus = 1.0 - 2.0 * a[..corrected].iter().map(|v| v * v).sum::<f64>();
    if fac_sq <= 0.0 || one_minus <= 0.0 {
        return None;
    }
    let fac = (fac_sq / one_minus).sqrt();
    for i in corrected..half {
        a[i] = -m[i] / fac;
    }
    Some(a)
}

fn sw_w(x: &[f64], a: &[f64]) -> f64 {
    let n = x.len();
    let sa: f64 = a
        .iter()
        .enumerate()
        .map(|(i, &ai)| ai * (x[n - 1 - i] - x[i]))
        .sum();
    let mean = x.iter().sum::<f64>() / n as f64;
    let ss: f64 = x.iter().map(|&v| (v - mean).powi(2)).sum();
    if ss < 1e-300 {
        return 1.0;
    }
    sa * sa / ss
}

fn sw_p_value(w: f64, n: usize) -> f64 {
    let nf = n as f64;
    let w1 = 1.0 - w;
    if w1 <= 0.0 {
        return 1.0;
    }
    let y = w1.ln();

    let z = if n <= 11 {
        let gamma = poly(&SW_G, nf);
        if y >= gamma {
            return 0.0;
        }
        let s = poly(&SW_C4, nf).exp();
        (-(gamma - y).ln() - poly(&SW_C3, nf)) / s
    } else {
        let ln_n = nf.ln();
        let s = poly(&SW_C6, ln_n).exp();
        (y - poly(&SW_C5, ln_n)) / s
    };
    1.0 - special::standard_normal_cdf(z)
}

// ---------------------------------------------------------------------------
// Normality: D'Agostino-Pearson K²
// ---------------------------------------------------------------------------

/// D'Agostino-Pearson omnibus K² normality test: H₀: data is normally
/// distributed.
///
/// # Algorithm
///
/// With biased moments √b₁ = m₃ / m₂^{3/2} and b₂ = m₄ / m₂²:
/// 1. Z(√b₁): D'Agostino (1970) transform of sample skewness
/// 2. Z(b₂): Anscombe & Glynn (1983) transform of sample kurtosis
/// 3. K² = Z(√b₁)² + Z(b₂)² ~ χ²(2)
///
/// # Returns
///
/// `None` if fewer than 8 observations (the skewness transform is undefined
/// below that), zero variance, or non-finite values.
///
/// # References
///
/// - D'Agostino & Pearson (1973). "Tests for departure from normality".
///   Biometrika, 60(3), 613–622.
/// - Anscombe & Glynn (1983). "Distribution of the kurtosis statistic b₂
///   for normal samples". Biometrika, 70(1), 227–234.
///
/// # Examples
///
/// ```
/// use u_hypothesis::testing::dagostino_k_squared_test;
///
/// let data = [-1.5, -1.0, -0.7, -0.3, 0.0, 0.3, 0.7, 1.0, 1.5];
/// let r = dagostino_k_squared_test(&data).unwrap();
/// assert!(r.p_value > 0.05);
/// assert_eq!(r.df, 2.0);
/// ```
pub fn dagostino_k_squared_test(data: &[f64]) -> Option<TestStatistic> {
    let n = data.len();
    if n < 8 || !all_finite(data) {
        return None;
    }

    let nf = n as f64;
    let mean = data.iter().sum::<f64>() / nf;
    let moment = |k: i32| data.iter().map(|&x| (x - mean).powi(k)).sum::<f64>() / nf;
    let m2 = moment(2);
    if m2 < 1e-300 {
        return None;
    }
    let sqrt_b1 = moment(3) / m2.powf(1.5);
    let b2 = moment(4) / (m2 * m2);

    let z_skew = skewness_z(sqrt_b1, nf)?;
    let z_kurt = kurtosis_z(b2, nf)?;

    let k2 = z_skew * z_skew + z_kurt * z_kurt;
    let p_value = 1.0 - special::chi_squared_cdf(k2, 2.0);

    Some(TestStatistic {
        statistic: k2,
        df: 2.0,
        p_value,
    })
}

fn skewness_z(sqrt_b1: f64, n: f64) -> Option<f64> {
    let y = sqrt_b1 * ((n + 1.0) * (n + 3.0) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    if w2 <= 1.0 {
        return None;
    }
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    Some(delta * (y / alpha).asinh())
}

fn kurtosis_z(b2: f64, n: f64) -> Option<f64> {
    let expected = 3.0 * (n - 1.0) / (n + 1.0);
    let var_b2 = 24.0 * n * (n - 2.0) * (n - 3.0)
        / ((n + 1.0) * (n + 1.0) * (n + 3.0) * (n + 5.0));
    let x = (b2 - expected) / var_b2.sqrt();

    let sqrt_beta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * (6.0 * (n + 3.0) * (n + 5.0) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0
        + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / (sqrt_beta1 * sqrt_beta1)).sqrt());

    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    if denom == 0.0 {
        return None;
    }
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let term2 = denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).cbrt();
    Some((term1 - term2) / (2.0 / (9.0 * a)).sqrt())
}

// ---------------------------------------------------------------------------
// Homogeneity of variance
// ---------------------------------------------------------------------------

/// Bartlett test for equality of variances: H₀: all groups have equal variance.
///
/// Only meaningful when every group is normally distributed; for anything
/// else prefer [`levene_test`].
///
/// # Algorithm
///
/// 1. Pooled variance s²ₚ = Σ(nᵢ-1)s²ᵢ / (N-k)
/// 2. Numerator (N-k) ln(s²ₚ) - Σ(nᵢ-1) ln(s²ᵢ)
/// 3. C = 1 + [Σ 1/(nᵢ-1) - 1/(N-k)] / (3(k-1))
/// 4. T = numerator / C ~ χ²(k-1)
///
/// # Returns
///
/// `None` if fewer than 2 groups, any group < 2 observations, any group has
/// zero variance, or non-finite values.
///
/// # References
///
/// Bartlett (1937). "Properties of sufficiency and statistical tests".
/// Proceedings of the Royal Society A, 160(901), 268–282.
///
/// # Examples
///
/// ```
/// use u_hypothesis::testing::bartlett_test;
///
/// let g1 = [2.0, 3.0, 4.0, 5.0, 6.0]; // variance 2.5
/// let g2 = [10.0, 20.0, 30.0, 40.0, 50.0]; // variance 250
/// let r = bartlett_test(&[&g1, &g2]).unwrap();
/// assert!(r.p_value < 0.01);
/// ```
pub fn bartlett_test(groups: &[&[f64]]) -> Option<TestStatistic> {
    let k = groups.len();
    if k < 2 {
        return None;
    }

    let mut sizes = Vec::with_capacity(k);
    let mut vars = Vec::with_capacity(k);
    for g in groups {
        if g.len() < 2 || !all_finite(g) {
            return None;
        }
        let v = stats::variance(g)?;
        if v <= 0.0 {
            return None; // ln undefined
        }
        sizes.push(g.len() as f64 - 1.0);
        vars.push(v);
    }

    let nk: f64 = sizes.iter().sum();
    let pooled = sizes.iter().zip(&vars).map(|(&d, &v)| d * v).sum::<f64>() / nk;
    if pooled <= 0.0 {
        return None;
    }

    let num = nk * pooled.ln() - sizes.iter().zip(&vars).map(|(&d, &v)| d * v.ln()).sum::<f64>();
    let recip: f64 = sizes.iter().map(|&d| 1.0 / d).sum();
    let c = 1.0 + (recip - 1.0 / nk) / (3.0 * (k as f64 - 1.0));

    let statistic = num / c;
    let df = (k - 1) as f64;
    let p_value = 1.0 - special::chi_squared_cdf(statistic, df);

    Some(TestStatistic {
        statistic,
        df,
        p_value,
    })
}

/// Levene test for equality of variances: H₀: all groups have equal variance.
///
/// Median-centred (Brown-Forsythe) variant, robust to non-normality.
///
/// # Algorithm
///
/// 1. zᵢⱼ = |xᵢⱼ - median(groupᵢ)|
/// 2. One-way ANOVA F-test on the zᵢⱼ
///
/// # Returns
///
/// `None` if fewer than 2 groups, any group < 2 observations, non-finite
/// values, or zero spread of the deviations within every group.
///
/// # References
///
/// - Levene (1960). "Robust tests for equality of variances".
/// - Brown & Forsythe (1974). "Robust tests for the equality of variances".
///   JASA, 69(346), 364–367.
///
/// # Examples
///
/// ```
/// use u_hypothesis::testing::levene_test;
///
/// let g1 = [4.9, 5.0, 5.0, 5.1, 5.0];
/// let g2 = [0.0, 3.0, 5.0, 7.0, 10.0];
/// let r = levene_test(&[&g1, &g2]).unwrap();
/// assert!(r.p_value < 0.05);
/// ```
pub fn levene_test(groups: &[&[f64]]) -> Option<TestStatistic> {
    if groups.len() < 2 {
        return None;
    }
    let mut deviations = Vec::with_capacity(groups.len());
    for g in groups {
        if g.len() < 2 || !all_finite(g) {
            return None;
        }
        let median = stats::median(g)?;
        deviations.push(g.iter().map(|&x| (x - median).abs()).collect::<Vec<f64>>());
    }
    let refs: Vec<&[f64]> = deviations.iter().map(Vec::as_slice).collect();
    anova_f_test(&refs)
}

// One-way ANOVA F-test; `df` reports the between-groups degrees of freedom.
fn anova_f_test(groups: &[&[f64]]) -> Option<TestStatistic> {
    let k = groups.len();
    let total: usize = groups.iter().map(|g| g.len()).sum();
    if k < 2 || total <= k {
        return None;
    }

    let grand_mean = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / total as f64;
    let means: Vec<f64> = groups
        .iter()
        .map(|g| g.iter().sum::<f64>() / g.len() as f64)
        .collect();

    let ss_between: f64 = groups
        .iter()
        .zip(&means)
        .map(|(g, &m)| g.len() as f64 * (m - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = groups
        .iter()
        .zip(&means)
        .map(|(g, &m)| g.iter().map(|&x| (x - m).powi(2)).sum::<f64>())
        .sum();

    let df_between = (k - 1) as f64;
    let df_within = (total - k) as f64;
    let ms_within = ss_within / df_within;

    if ms_within <= 1e-300 {
        return None;
    }
    let f = (ss_between / df_between) / ms_within;
    let p_value = 1.0 - special::f_distribution_cdf(f, df_between, df_within);

    Some(TestStatistic {
        statistic: f,
        df: df_between,
        p_value,
    })
}
