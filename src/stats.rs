//! Descriptive and inferential statistics over metric samples
//!
//! Implements the pieces the analysis engine needs: means, population
//! standard deviation, the independent two-sample Student's t-test (pooled
//! variance, two-sided), and a pooled-standard-deviation effect size in the
//! Cohen's d form. The t-distribution tail probability is evaluated through
//! the regularized incomplete beta function (continued fraction form), so
//! there is no dependency on an external numerics crate.

/// Result of an independent two-sample Student's t-test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTest {
    /// The t statistic, `(mean(a) - mean(b)) / standard_error`.
    pub t_statistic: f64,
    /// Degrees of freedom, `len(a) + len(b) - 2`.
    pub degrees_of_freedom: f64,
    /// Two-sided p-value.
    pub p_value: f64,
}

/// Arithmetic mean. `None` for an empty sample.
#[must_use]
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Population standard deviation (divisor `n`). `None` for an empty sample.
#[must_use]
pub fn population_std(samples: &[f64]) -> Option<f64> {
    let m = mean(samples)?;
    let n = samples.len() as f64;
    let ssd: f64 = samples.iter().map(|x| (x - m).powi(2)).sum();
    Some((ssd / n).sqrt())
}

/// Independent two-sample Student's t-test with pooled variance.
///
/// Returns `None` when either sample is empty or there are fewer than
/// three observations in total (no degrees of freedom). Identical samples
/// yield a NaN statistic and p-value; a zero-variance difference yields an
/// infinite statistic and a p-value of zero.
#[must_use]
pub fn students_t_test(a: &[f64], b: &[f64]) -> Option<TTest> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let df = (a.len() + b.len()) as f64 - 2.0;
    if df <= 0.0 {
        return None;
    }

    let ma = mean(a)?;
    let mb = mean(b)?;
    let ssd_a: f64 = a.iter().map(|x| (x - ma).powi(2)).sum();
    let ssd_b: f64 = b.iter().map(|x| (x - mb).powi(2)).sum();
    let pooled_variance = (ssd_a + ssd_b) / df;
    let standard_error =
        (pooled_variance * (1.0 / a.len() as f64 + 1.0 / b.len() as f64)).sqrt();
    let t = (ma - mb) / standard_error;

    Some(TTest {
        t_statistic: t,
        degrees_of_freedom: df,
        p_value: two_sided_p(t, df),
    })
}

/// Cohen's d style effect size with population standard deviations:
/// `(mean(b) - mean(a)) / sqrt((sigma_a^2 + sigma_b^2) / 2)`.
///
/// `None` when either sample is empty.
#[must_use]
pub fn pooled_effect_size(a: &[f64], b: &[f64]) -> Option<f64> {
    let sigma_a = population_std(a)?;
    let sigma_b = population_std(b)?;
    let pooled = ((sigma_a * sigma_a + sigma_b * sigma_b) / 2.0).sqrt();
    Some((mean(b)? - mean(a)?) / pooled)
}

/// Two-sided tail probability of Student's t distribution:
/// `P(|T| >= |t|)` with `df` degrees of freedom.
fn two_sided_p(t: f64, df: f64) -> f64 {
    if t.is_nan() {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }
    incomplete_beta(df / 2.0, 0.5, df / (df + t * t))
}

/// Regularized incomplete beta function `I_x(a, b)`.
fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let ln_prefactor =
        ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let prefactor = ln_prefactor.exp();

    // The continued fraction converges fast for x < (a+1)/(a+b+2); use the
    // symmetry relation on the other side.
    if x < (a + 1.0) / (a + b + 2.0) {
        prefactor * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - prefactor * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

/// Continued fraction for the incomplete beta function (modified Lentz).
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITERATIONS: usize = 200;
    const EPSILON: f64 = 3.0e-14;
    const TINY: f64 = 1.0e-300;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < TINY {
        d = TINY;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        // even step
        let numerator = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + numerator * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + numerator / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        h *= d * c;

        // odd step
        let numerator = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + numerator * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + numerator / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPSILON {
            break;
        }
    }

    h
}

/// Natural log of the gamma function (Lanczos approximation, g = 5).
fn ln_gamma(x: f64) -> f64 {
    const COEFFICIENTS: [f64; 6] = [
        76.180_091_729_471_46,
        -86.505_320_329_416_77,
        24.014_098_240_830_91,
        -1.231_739_572_450_155,
        0.001_208_650_973_866_179,
        -0.000_005_395_239_384_953,
    ];

    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();

    let mut series = 1.000_000_000_190_015;
    let mut denominator = x;
    for coefficient in COEFFICIENTS {
        denominator += 1.0;
        series += coefficient / denominator;
    }

    -tmp + (2.506_628_274_631_000_5 * series / x).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_mean_empty_is_none() {
        assert!(mean(&[]).is_none());
    }

    #[test]
    fn test_mean_basic() {
        assert!((mean(&[1.0, 2.0, 3.0, 4.0]).unwrap() - 2.5).abs() < TOLERANCE);
    }

    #[test]
    fn test_population_std_basic() {
        // [2, 4, 4, 4, 5, 5, 7, 9] has population std exactly 2
        let samples = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_std(&samples).unwrap() - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_ln_gamma_factorials() {
        // Gamma(n) = (n-1)!
        assert!((ln_gamma(1.0)).abs() < 1e-10);
        assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < 1e-10);
        assert!((ln_gamma(0.5) - std::f64::consts::PI.sqrt().ln()).abs() < 1e-10);
    }

    #[test]
    fn test_t_distribution_cauchy_closed_form() {
        // df = 1 is the Cauchy distribution: P(|T| >= 1) = 1/2 exactly.
        let p = two_sided_p(1.0, 1.0);
        assert!((p - 0.5).abs() < 1e-10, "p = {p}");
    }

    #[test]
    fn test_t_distribution_df2_closed_form() {
        // df = 2: P(|T| >= t) = 1 - t / sqrt(t^2 + 2)
        let t = std::f64::consts::SQRT_2;
        let expected = 1.0 - t / (t * t + 2.0).sqrt();
        let p = two_sided_p(t, 2.0);
        assert!((p - expected).abs() < 1e-10, "p = {p}");
    }

    #[test]
    fn test_t_distribution_reference_value() {
        // Two-tailed p for t = 2.0, df = 10 is 0.0734 (standard tables).
        let p = two_sided_p(2.0, 10.0);
        assert!((p - 0.0734).abs() < 1e-3, "p = {p}");
    }

    #[test]
    fn test_students_t_test_symmetry() {
        let a = [7.0, 8.0, 7.0, 8.0, 7.0];
        let b = [8.0, 9.0, 8.0, 9.0, 8.0];
        let ab = students_t_test(&a, &b).unwrap();
        let ba = students_t_test(&b, &a).unwrap();

        assert!((ab.t_statistic + ba.t_statistic).abs() < TOLERANCE);
        assert!((ab.p_value - ba.p_value).abs() < TOLERANCE);
    }

    #[test]
    fn test_students_t_test_separated_samples_significant() {
        // mean difference 1.0, pooled variance 0.3, df 8: t ~ 2.89, p ~ 0.02
        let control = [7.0, 8.0, 7.0, 8.0, 7.0];
        let variant = [8.0, 9.0, 8.0, 9.0, 8.0];
        let result = students_t_test(&control, &variant).unwrap();

        assert!((result.degrees_of_freedom - 8.0).abs() < TOLERANCE);
        assert!((result.t_statistic.abs() - 2.886_751_345_948_129).abs() < 1e-9);
        assert!(result.p_value < 0.05);
        assert!(result.p_value > 0.01);
    }

    #[test]
    fn test_students_t_test_insufficient_data() {
        assert!(students_t_test(&[], &[1.0]).is_none());
        assert!(students_t_test(&[1.0], &[2.0]).is_none());
    }

    #[test]
    fn test_students_t_test_identical_samples_nan() {
        let result = students_t_test(&[5.0, 5.0], &[5.0, 5.0]).unwrap();
        assert!(result.t_statistic.is_nan());
        assert!(result.p_value.is_nan());
    }

    #[test]
    fn test_students_t_test_zero_variance_difference() {
        let result = students_t_test(&[5.0, 5.0], &[6.0, 6.0]).unwrap();
        assert!(result.t_statistic.is_infinite());
        assert!((result.p_value).abs() < TOLERANCE);
    }

    #[test]
    fn test_pooled_effect_size_sign() {
        let control = [7.0, 8.0, 7.0, 8.0, 7.0];
        let variant = [8.0, 9.0, 8.0, 9.0, 8.0];
        let d = pooled_effect_size(&control, &variant).unwrap();

        // improvement of one pooled-ish std: d just above 2 here
        assert!(d > 0.0);
        let reversed = pooled_effect_size(&variant, &control).unwrap();
        assert!((d + reversed).abs() < TOLERANCE);
    }
}
