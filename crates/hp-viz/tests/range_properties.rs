use hp_hist::BinSeries;
use hp_viz::{RangeDeriver, RangeWarning, log_y_range, non_empty_xrange};
use proptest::prelude::*;

fn series(content: Vec<f64>) -> BinSeries {
    let edges = (0..=content.len()).map(|i| i as f64).collect();
    let n = content.len();
    BinSeries::new(edges, content, vec![0.0; n]).unwrap()
}

proptest! {
    #[test]
    fn log_high_is_monotonic_in_max(
        y_min_pos in 1e-3f64..10.0,
        y_max in 10.0f64..1e6,
        bump in 0.0f64..1e6,
        margin in 1.0f64..3.0,
    ) {
        let (_, hi_a) = log_y_range(y_min_pos, y_max, margin);
        let (_, hi_b) = log_y_range(y_min_pos, y_max + bump, margin);
        prop_assert!(hi_b >= hi_a);
    }

    #[test]
    fn log_guard_never_panics(
        n in 1usize..12,
        negative in proptest::collection::vec(-100.0f64..-1e-3, 12)
    ) {
        let mut zero = RangeDeriver::new();
        zero.register_series(&series(vec![0.0; n]));
        prop_assert!(zero.set_log_y(true).is_none());
        let before = zero.state().clone();
        let out = zero.basis_y_range(1.5);
        prop_assert!(
            matches!(out.warning, Some(RangeWarning::NonPositiveMaximum { .. })),
            "expected NonPositiveMaximum warning"
        );
        prop_assert_eq!(zero.state(), &before);

        let mut neg = RangeDeriver::new();
        neg.register_series(&series(negative[..n].to_vec()));
        let before = neg.state().clone();
        let warning = neg.set_log_y(true);
        prop_assert!(
            matches!(warning, Some(RangeWarning::NegativeContent { .. })),
            "expected NegativeContent warning"
        );
        prop_assert_eq!(neg.state(), &before);
    }

    #[test]
    fn trimming_brackets_filled_bins(
        n in 3usize..30,
        a in 0usize..30,
        b in 0usize..30,
    ) {
        let (lo, hi) = (a.min(b) % n, a.max(b) % n);
        prop_assume!(lo <= hi);
        let mut primary = vec![0.0; n];
        let mut secondary = vec![0.0; n];
        primary[lo] = 1.0;
        secondary[hi] = 2.0;
        let r = non_empty_xrange(&series(primary), &series(secondary)).unwrap();
        prop_assert_eq!(r, (lo as f64, (hi + 1) as f64));
    }
}

#[test]
fn trimming_bins_three_to_seven_of_ten() {
    let primary = series(vec![0.0, 0.0, 0.0, 1.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0]);
    let secondary = series(vec![0.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 4.0, 0.0, 0.0]);
    assert_eq!(non_empty_xrange(&primary, &secondary).unwrap(), (3.0, 8.0));
}
