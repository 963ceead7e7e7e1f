use std::fs;
use std::path::PathBuf;

use cap_core::{CapError, InputConfig, Orientation, PlanConfig};
use cap_io::{
    open_source, parse_resource, parse_table, parse_workbook, plan_with, FileLoader, Loader,
    NullRenderer,
};

fn workbook_fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/production.xlsx")
}

#[test]
fn wide_row_with_header_is_reoriented() {
    let table = "m1,m2,m3,m4,m5\n100,110,125,140,160\n";
    let series = parse_table(table.as_bytes(), Orientation::Auto).expect("parse");
    assert_eq!(series.len(), 5);
    assert_eq!(series.observations()[0].period, 1);
    assert_eq!(series.observations()[4].value, 160.0);
}

#[test]
fn tall_table_uses_last_column() {
    let table = "Month,Production\n1,100\n2,105.5\n3,111\n";
    let series = parse_table(table.as_bytes(), Orientation::Auto).expect("parse");
    let values: Vec<f64> = series.values().collect();
    assert_eq!(values, vec![100.0, 105.5, 111.0]);
}

#[test]
fn forced_row_orientation_reads_first_numeric_row() {
    let table = "1,2,3\n4,5,6\n";
    let series = parse_table(table.as_bytes(), Orientation::Row).expect("parse");
    let values: Vec<f64> = series.values().collect();
    assert_eq!(values, vec![1.0, 2.0, 3.0]);
}

#[test]
fn header_only_table_is_a_fetch_error() {
    let err = parse_table("Production\n".as_bytes(), Orientation::Auto).unwrap_err();
    assert!(matches!(err, CapError::ResourceFetch(_)));
    assert_eq!(err.info().code, "input.empty");
}

#[test]
fn non_finite_cells_are_rejected() {
    let err = parse_table("1\nNaN\n3\n".as_bytes(), Orientation::Column).unwrap_err();
    assert_eq!(err.info().code, "series.non_finite");
}

#[test]
fn non_numeric_cell_in_row_is_rejected() {
    let err = parse_table("100,200,n/a,400,500\n".as_bytes(), Orientation::Auto).unwrap_err();
    assert!(matches!(err, CapError::ResourceFetch(_)));
    assert_eq!(err.info().code, "input.malformed_cell");
    assert_eq!(err.info().context["row"], "1");
    assert_eq!(err.info().context["column"], "3");
    assert_eq!(err.info().context["cell"], "n/a");
}

#[test]
fn empty_value_cell_in_column_is_rejected() {
    let table = "Month,Production\n1,100\n2,\n3,300\n";
    let err = parse_table(table.as_bytes(), Orientation::Auto).unwrap_err();
    assert_eq!(err.info().code, "input.malformed_cell");
    assert_eq!(err.info().context["row"], "3");
    assert_eq!(err.info().context["column"], "2");
}

#[test]
fn text_row_after_data_is_not_skipped() {
    let err = parse_table("100\nn/a\n300\n".as_bytes(), Orientation::Column).unwrap_err();
    assert_eq!(err.info().code, "input.malformed_cell");
    assert_eq!(err.info().context["row"], "2");
}

#[test]
fn forced_column_checks_every_cell() {
    let err = parse_table("1,100\nx,105\n".as_bytes(), Orientation::Column).unwrap_err();
    assert_eq!(err.info().code, "input.malformed_cell");
    assert_eq!(err.info().context["column"], "1");
}

#[test]
fn period_label_row_is_a_header() {
    let table = "1,2,3,4,5\n100,110,125,140,160\n";
    let series = parse_table(table.as_bytes(), Orientation::Auto).expect("parse");
    let values: Vec<f64> = series.values().collect();
    assert_eq!(values, vec![100.0, 110.0, 125.0, 140.0, 160.0]);
}

#[test]
fn two_column_table_starting_one_two_stays_tall() {
    let table = "1,2\n2,4\n";
    let series = parse_table(table.as_bytes(), Orientation::Auto).expect("parse");
    let values: Vec<f64> = series.values().collect();
    assert_eq!(values, vec![2.0, 4.0]);
}

#[test]
fn trailing_blank_cells_are_padding() {
    let table = "m1,m2,m3,\n7,8,9,\n";
    let series = parse_table(table.as_bytes(), Orientation::Auto).expect("parse");
    let values: Vec<f64> = series.values().collect();
    assert_eq!(values, vec![7.0, 8.0, 9.0]);

    let tall = "1,100,\n2,105,\n3,111,\n";
    let series = parse_table(tall.as_bytes(), Orientation::Column).expect("parse");
    let values: Vec<f64> = series.values().collect();
    assert_eq!(values, vec![100.0, 105.0, 111.0]);
}

#[test]
fn workbook_fixture_loads_wide_sheet() {
    let series = FileLoader::new(workbook_fixture(), Orientation::Auto)
        .load()
        .expect("load");
    assert_eq!(series.len(), 144);
    assert!((series.observations()[0].value - 1149.951).abs() < 1e-9);

    let report = plan_with(
        &FileLoader::new(workbook_fixture(), Orientation::Auto),
        &mut NullRenderer,
        &PlanConfig::default(),
    )
    .expect("plan");
    assert_eq!(report.recommended_start, 134);
}

#[test]
fn workbook_is_detected_by_content() {
    let bytes = fs::read(workbook_fixture()).expect("fixture");
    let sniffed = parse_resource(&bytes, Orientation::Auto).expect("sniffed");
    let direct = parse_workbook(&bytes, Orientation::Auto).expect("direct");
    assert_eq!(sniffed, direct);
}

#[test]
fn corrupt_workbook_is_a_fetch_error() {
    let err = parse_resource(b"PK\x03\x04not a workbook", Orientation::Auto).unwrap_err();
    assert!(matches!(err, CapError::ResourceFetch(_)));
    assert_eq!(err.info().code, "input.xlsx");
}

#[test]
fn file_loader_reads_csv_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("production.csv");
    let row = (1..=144)
        .map(|p| (1000 + 150 * p).to_string())
        .collect::<Vec<_>>()
        .join(",");
    fs::write(&path, format!("{row}\n")).expect("write");

    let series = FileLoader::new(&path, Orientation::Auto).load().expect("load");
    assert_eq!(series.len(), 144);
    assert_eq!(series.last_period(), 144);
}

#[test]
fn missing_file_reports_location() {
    let loader = open_source("/nonexistent/production.csv", &InputConfig::default());
    let err = loader.load().unwrap_err();
    assert_eq!(err.info().code, "input.open");
    assert_eq!(err.info().context["location"], "/nonexistent/production.csv");
}

#[test]
fn unreachable_url_is_a_fetch_error() {
    let config = InputConfig {
        timeout_secs: 2,
        ..InputConfig::default()
    };
    let loader = open_source("http://127.0.0.1:9/production.csv", &config);
    let err = loader.load().unwrap_err();
    assert!(matches!(err, CapError::ResourceFetch(_)));
}
