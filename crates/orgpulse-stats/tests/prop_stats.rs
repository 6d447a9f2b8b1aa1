use orgpulse_stats::{
    cronbach_alpha, favorability, mean, pearson, sample_std_dev, within_group_agreement,
};
use proptest::prelude::*;

fn likert_scores(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec((1u8..=5u8).prop_map(f64::from), min_len..max_len)
}

proptest! {
    #[test]
    fn prop_mean_is_bounded_by_extremes(xs in likert_scores(1, 200)) {
        let m = mean(&xs);
        let lo = xs.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(m >= lo - 1e-12 && m <= hi + 1e-12);
    }

    #[test]
    fn prop_std_dev_is_non_negative(xs in likert_scores(0, 200)) {
        prop_assert!(sample_std_dev(&xs) >= 0.0);
    }

    #[test]
    fn prop_favorability_is_a_percentage(xs in likert_scores(1, 200)) {
        let f = favorability(&xs);
        prop_assert!((0.0..=100.0).contains(&f));
    }

    #[test]
    fn prop_rwg_stays_in_unit_interval(xs in likert_scores(3, 200)) {
        let rwg = within_group_agreement(&xs).unwrap();
        prop_assert!((0.0..=1.0).contains(&rwg));
    }

    #[test]
    fn prop_rwg_none_below_three(xs in likert_scores(0, 3)) {
        prop_assert_eq!(within_group_agreement(&xs), None);
    }

    #[test]
    fn prop_pearson_r_stays_in_range(
        pairs in proptest::collection::vec(
            ((1u8..=5u8).prop_map(f64::from), (1u8..=5u8).prop_map(f64::from)),
            10..150,
        )
    ) {
        let xs: Vec<f64> = pairs.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = pairs.iter().map(|p| p.1).collect();
        let c = pearson(&xs, &ys);
        prop_assert!((-1.0..=1.0).contains(&c.r));
        prop_assert!((0.0..=1.0).contains(&c.p_value));
    }

    #[test]
    fn prop_pearson_symmetric(
        pairs in proptest::collection::vec(
            ((1u8..=5u8).prop_map(f64::from), (1u8..=5u8).prop_map(f64::from)),
            10..100,
        )
    ) {
        let xs: Vec<f64> = pairs.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = pairs.iter().map(|p| p.1).collect();
        prop_assert_eq!(pearson(&xs, &ys).r, pearson(&ys, &xs).r);
    }

    #[test]
    fn prop_alpha_at_most_one_after_rounding(
        rows in proptest::collection::vec(
            proptest::collection::vec((1u8..=5u8).prop_map(f64::from), 4),
            10..60,
        )
    ) {
        // Alpha can go arbitrarily negative for adversarial matrices, but it
        // never exceeds 1 + rounding slack.
        if let Some(alpha) = cronbach_alpha(&rows) {
            prop_assert!(alpha <= 1.0005, "alpha = {}", alpha);
        }
    }
}
