use cap_core::{CapError, TimeSeries};
use cap_fit::{fit_polynomial, fit_report, Polynomial};
use proptest::prelude::*;

fn sampled(model: &Polynomial, months: u32) -> TimeSeries {
    TimeSeries::from_values((1..=months).map(|p| model.evaluate(p as f64))).expect("series")
}

#[test]
fn exact_cubic_is_recovered() {
    let truth = Polynomial::new(vec![0.002, -0.3, 45.0, 1200.0]).unwrap();
    let fitted = fit_polynomial(&sampled(&truth, 144), 3).expect("fit");

    for (found, expected) in fitted.coefficients().iter().zip(truth.coefficients()) {
        let rel = ((found - expected) / expected).abs();
        assert!(rel < 1e-6, "found {found}, expected {expected}");
    }
}

#[test]
fn lower_degree_truth_leaves_zero_leading_terms() {
    let truth = Polynomial::new(vec![0.0, 0.0, 12.5, -40.0]).unwrap();
    let fitted = fit_polynomial(&sampled(&truth, 60), 3).expect("fit");
    assert!(fitted.coefficients()[0].abs() < 1e-9);
    assert!(fitted.coefficients()[1].abs() < 1e-7);
    assert!((fitted.coefficients()[2] - 12.5).abs() < 1e-6);
}

#[test]
fn noisy_series_has_positive_residual() {
    let values = (1..=48).map(|p| {
        let x = p as f64;
        let wobble = if p % 2 == 0 { 25.0 } else { -25.0 };
        3.0 * x * x + 100.0 + wobble
    });
    let series = TimeSeries::from_values(values).unwrap();
    let report = fit_report(&series, 3).expect("report");
    assert!(report.rss > 0.0);
    assert!(report.r_squared > 0.99);
    assert!(report.rmse < 30.0);
}

#[test]
fn short_series_signal_insufficient_data() {
    for len in 0..=3 {
        let series = TimeSeries::from_values((0..len).map(|v| v as f64)).unwrap();
        let err = fit_polynomial(&series, 3).unwrap_err();
        assert!(matches!(err, CapError::InsufficientData(_)), "len {len}");
    }
}

#[test]
fn four_points_determine_a_cubic() {
    let truth = Polynomial::new(vec![1.0, -2.0, 3.0, -4.0]).unwrap();
    let fitted = fit_polynomial(&sampled(&truth, 4), 3).expect("fit");
    for p in 1..=4 {
        let x = p as f64;
        assert!((fitted.evaluate(x) - truth.evaluate(x)).abs() < 1e-8);
    }
}

proptest! {
    #[test]
    fn fitting_is_deterministic(values in prop::collection::vec(0.0f64..50_000.0, 4..80)) {
        let series = TimeSeries::from_values(values).unwrap();
        let first = fit_report(&series, 3).unwrap();
        let second = fit_report(&series, 3).unwrap();
        prop_assert_eq!(first.model.coefficients(), second.model.coefficients());
        prop_assert_eq!(first.fit_hash, second.fit_hash);
    }

    #[test]
    fn taylor_view_is_bit_identical(
        coefficients in prop::collection::vec(-1_000.0f64..1_000.0, 4),
        period in 1.0f64..144.0,
    ) {
        let model = Polynomial::new(coefficients).unwrap();
        let taylor = model.taylor();
        prop_assert_eq!(taylor.evaluate(period).to_bits(), model.evaluate(period).to_bits());
    }
}
