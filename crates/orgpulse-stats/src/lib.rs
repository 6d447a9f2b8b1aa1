//! Pure statistical primitives shared by the synthesizer and the
//! verification harness.
//!
//! Both sides of the harness depend on the same functions: the generator uses
//! them to derive what the results pipeline *should* produce, and the
//! verifier uses them to recompute what it *did* produce from raw responses.
//! Every function here is deterministic, allocation-light, and leaves its
//! input untouched.

/// Arithmetic mean.
///
/// The caller must never invoke this on an empty slice; an empty input
/// yields `NaN`, which every consumer in this workspace treats as a bug.
#[inline]
#[must_use]
pub fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Bessel-corrected (n − 1) sample standard deviation.
///
/// Returns 0.0 for fewer than two observations.
#[must_use]
pub fn sample_std_dev(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    let var = xs.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (xs.len() - 1) as f64;
    var.sqrt()
}

/// Percentage of values at or above 4 on the 1–5 scale.
///
/// The boundary value 4 counts as favorable.
#[must_use]
pub fn favorability(xs: &[f64]) -> f64 {
    let favorable = xs.iter().filter(|&&v| v >= 4.0).count();
    favorable as f64 / xs.len() as f64 * 100.0
}

/// Within-group agreement index rwg (James, Demaree & Wolf, 1984).
///
/// Returns `None` for fewer than 3 observations. Otherwise
/// `1 − popVariance / 2.0`, clamped to [0, 1] and rounded to 3 decimals.
/// The constant 2.0 is the variance of a uniform null distribution on a
/// 5-point scale, (5² − 1) / 12.
#[must_use]
pub fn within_group_agreement(xs: &[f64]) -> Option<f64> {
    if xs.len() < 3 {
        return None;
    }
    let m = mean(xs);
    let pop_var = xs.iter().map(|v| (v - m).powi(2)).sum::<f64>() / xs.len() as f64;
    let expected_var = 2.0;
    Some(round_dp((1.0 - pop_var / expected_var).clamp(0.0, 1.0), 3))
}

/// Cronbach's alpha internal-consistency reliability.
///
/// `item_matrix` rows are respondents, columns are items. Returns `None`
/// for fewer than 2 items, fewer than 10 respondents, or zero total-score
/// variance (no discrimination). Rounded to 3 decimals.
#[must_use]
pub fn cronbach_alpha(item_matrix: &[Vec<f64>]) -> Option<f64> {
    let n = item_matrix.len();
    let k = item_matrix.first().map_or(0, Vec::len);
    if k < 2 || n < 10 {
        return None;
    }

    let mut sum_item_var = 0.0;
    for j in 0..k {
        let col: Vec<f64> = item_matrix.iter().map(|row| row[j]).collect();
        let m = mean(&col);
        sum_item_var += col.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    }

    let totals: Vec<f64> = item_matrix.iter().map(|row| row.iter().sum()).collect();
    let total_mean = mean(&totals);
    let total_var = totals.iter().map(|v| (v - total_mean).powi(2)).sum::<f64>() / (n - 1) as f64;

    if total_var == 0.0 {
        return None;
    }
    let alpha = k as f64 / (k - 1) as f64 * (1.0 - sum_item_var / total_var);
    Some(round_dp(alpha, 3))
}

/// Pearson correlation with approximate two-tailed significance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    /// Pearson r, rounded to 3 decimals.
    pub r: f64,
    /// Approximate two-tailed p-value, rounded to 4 decimals.
    pub p_value: f64,
    /// Number of paired observations.
    pub n: usize,
}

impl Correlation {
    /// The conservative "no evidence" result used for degenerate inputs.
    #[inline]
    #[must_use]
    pub fn none(n: usize) -> Self {
        Self { r: 0.0, p_value: 1.0, n }
    }
}

/// Pearson r between two equally-sized series.
///
/// Fewer than 10 pairs, or zero variance in either series, yields the
/// conservative `{r: 0, p: 1}`. The p-value comes from a closed-form
/// exponential approximation to the t-distribution tail: good enough for
/// diagnostic thresholds, not a rigorous hypothesis test.
#[must_use]
pub fn pearson(xs: &[f64], ys: &[f64]) -> Correlation {
    let n = xs.len();
    if n < 10 || n != ys.len() {
        return Correlation::none(n);
    }
    let mx = mean(xs);
    let my = mean(ys);

    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    let mut sum_y2 = 0.0;
    for i in 0..n {
        let dx = xs[i] - mx;
        let dy = ys[i] - my;
        sum_xy += dx * dy;
        sum_x2 += dx * dx;
        sum_y2 += dy * dy;
    }

    let denom = (sum_x2 * sum_y2).sqrt();
    if denom == 0.0 {
        return Correlation::none(n);
    }
    let r = sum_xy / denom;
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r + 1e-10)).sqrt();
    let p = (-0.717 * t.abs() - 0.416 * t * t / df).exp();

    Correlation {
        r: round_dp(r, 3),
        p_value: round_dp(p, 4),
        n,
    }
}

/// Round to `dp` decimal places (half away from zero, matching the
/// rounding the results pipeline applies before persisting).
#[inline]
#[must_use]
pub fn round_dp(v: f64, dp: u32) -> f64 {
    let factor = 10f64.powi(dp as i32);
    (v * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mean_of_known_values() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0);
    }

    #[test]
    fn std_dev_zero_below_two_observations() {
        assert_eq!(sample_std_dev(&[]), 0.0);
        assert_eq!(sample_std_dev(&[4.2]), 0.0);
    }

    #[test]
    fn std_dev_uses_bessel_correction() {
        // Sample variance of [2, 4, 4, 4, 5, 5, 7, 9] is 32/7.
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let expected = (32.0f64 / 7.0).sqrt();
        assert!((sample_std_dev(&xs) - expected).abs() < 1e-12);
    }

    #[test]
    fn favorability_counts_boundary_four() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(favorability(&xs), 40.0);
    }

    #[test]
    fn rwg_is_none_below_three_observations() {
        assert_eq!(within_group_agreement(&[]), None);
        assert_eq!(within_group_agreement(&[4.0, 4.0]), None);
    }

    #[test]
    fn rwg_is_exactly_one_for_identical_values() {
        assert_eq!(within_group_agreement(&[3.0, 3.0, 3.0, 3.0]), Some(1.0));
        assert_eq!(within_group_agreement(&[5.0; 40]), Some(1.0));
    }

    #[test]
    fn rwg_clamps_high_dispersion_to_zero() {
        // Alternating extremes: population variance 4.0 > null variance 2.0.
        let xs = [1.0, 5.0, 1.0, 5.0, 1.0, 5.0];
        assert_eq!(within_group_agreement(&xs), Some(0.0));
    }

    #[test]
    fn alpha_guards_small_inputs() {
        // One item.
        let one_item: Vec<Vec<f64>> = (0..20).map(|i| vec![f64::from(i % 5)]).collect();
        assert_eq!(cronbach_alpha(&one_item), None);
        // Nine respondents.
        let few: Vec<Vec<f64>> = (0..9).map(|i| vec![f64::from(i), f64::from(i)]).collect();
        assert_eq!(cronbach_alpha(&few), None);
    }

    #[test]
    fn alpha_is_none_for_zero_total_variance() {
        let flat = vec![vec![3.0, 3.0, 3.0]; 12];
        assert_eq!(cronbach_alpha(&flat), None);
    }

    #[test]
    fn alpha_is_high_for_parallel_items() {
        // Two items that move together perfectly: alpha should be ~1.
        let matrix: Vec<Vec<f64>> = (0..12)
            .map(|i| {
                let v = f64::from(i % 5) + 1.0;
                vec![v, v]
            })
            .collect();
        let alpha = cronbach_alpha(&matrix).unwrap();
        assert!((alpha - 1.0).abs() < 1e-9, "alpha = {alpha}");
    }

    #[test]
    fn alpha_below_one_when_items_disagree() {
        let matrix: Vec<Vec<f64>> = (0..15)
            .map(|i| vec![f64::from(i % 5) + 1.0, f64::from((i * 3 + 1) % 5) + 1.0])
            .collect();
        let alpha = cronbach_alpha(&matrix).unwrap();
        assert!(alpha < 1.0);
    }

    #[test]
    fn pearson_perfect_positive() {
        let xs: Vec<f64> = (1..=20).map(f64::from).collect();
        let c = pearson(&xs, &xs);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.n, 20);
    }

    #[test]
    fn pearson_perfect_negative() {
        let xs: Vec<f64> = (1..=20).map(f64::from).collect();
        let ys: Vec<f64> = (1..=20).rev().map(f64::from).collect();
        assert_eq!(pearson(&xs, &ys).r, -1.0);
    }

    #[test]
    fn pearson_short_series_is_no_evidence() {
        let xs: Vec<f64> = (1..=9).map(f64::from).collect();
        let c = pearson(&xs, &xs);
        assert_eq!(c, Correlation { r: 0.0, p_value: 1.0, n: 9 });
    }

    #[test]
    fn pearson_zero_variance_is_no_evidence() {
        let xs = vec![4.0; 15];
        let ys: Vec<f64> = (1..=15).map(f64::from).collect();
        let c = pearson(&xs, &ys);
        assert_eq!(c.r, 0.0);
        assert_eq!(c.p_value, 1.0);
    }

    #[test]
    fn round_dp_matches_pipeline_rounding() {
        assert_eq!(round_dp(3.14159, 2), 3.14);
        assert_eq!(round_dp(2.675, 1), 2.7);
        assert_eq!(round_dp(-0.0005, 3), -0.001);
    }
}
