use std::fs;

use cap_core::{CapError, Orientation, PlanConfig};

#[test]
fn defaults_match_planning_constants() {
    let config = PlanConfig::default();
    assert_eq!(config.threshold, 25_000.0);
    assert_eq!(config.lead_time, 13);
    assert_eq!(config.degree, 3);
    assert_eq!(config.initial_guess, 144.0);
    assert_eq!(config.plot_range.start, 1.0);
    assert_eq!(config.plot_range.end, 200.0);
    assert!(config.validate().is_ok());
}

#[test]
fn partial_yaml_fills_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("plan.yaml");
    fs::write(
        &path,
        "threshold: 30000\nsolver:\n  max_iters: 50\ninput:\n  orientation: column\n",
    )
    .expect("write");

    let config = PlanConfig::load(&path).expect("load");
    assert_eq!(config.threshold, 30_000.0);
    assert_eq!(config.solver.max_iters, 50);
    assert_eq!(config.solver.xtol, PlanConfig::default().solver.xtol);
    assert_eq!(config.input.orientation, Orientation::Column);
    assert_eq!(config.lead_time, 13);
}

#[test]
fn invalid_degree_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("plan.yaml");
    fs::write(&path, "degree: 0\n").expect("write");

    let err = PlanConfig::load(&path).unwrap_err();
    assert!(matches!(err, CapError::Config(_)));
    assert_eq!(err.info().context["field"], "degree");
}

#[test]
fn empty_plot_range_is_rejected() {
    let mut config = PlanConfig::default();
    config.plot_range.end = config.plot_range.start;
    assert!(config.validate().is_err());
}

#[test]
fn missing_file_is_a_config_error() {
    let err = PlanConfig::load(std::path::Path::new("/nonexistent/plan.yaml")).unwrap_err();
    assert_eq!(err.info().code, "config.read");
}

#[test]
fn oversized_degree_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("plan.yaml");
    fs::write(&path, "degree: 18446744073709551615\n").expect("write");

    let err = PlanConfig::load(&path).unwrap_err();
    assert_eq!(err.info().code, "config.invalid");
    assert_eq!(err.info().context["field"], "degree");
}

#[test]
fn each_tolerance_is_checked_separately() {
    let mut config = PlanConfig::default();
    config.solver.xtol = 0.0;
    let err = config.validate().unwrap_err();
    assert_eq!(err.info().context["field"], "solver.xtol");
    assert!(err.info().message.contains("positive"));

    let mut config = PlanConfig::default();
    config.solver.ftol = -1.0;
    let err = config.validate().unwrap_err();
    assert_eq!(err.info().context["field"], "solver.ftol");
    assert!(err.info().message.contains("non-negative"));

    let mut config = PlanConfig::default();
    config.solver.ftol = 0.0;
    assert!(config.validate().is_ok());
}
