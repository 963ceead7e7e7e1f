use std::fs;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::time::Duration;

use calamine::{open_workbook_from_rs, Reader, Xlsx, XlsxError};
use cap_core::errors::{CapError, ErrorInfo};
use cap_core::{InputConfig, Orientation, TimeSeries};
use csv::{ReaderBuilder, Trim};
use reqwest::blocking::Client;
use tracing::{debug, info};

/// Local file header of a zip archive; every xlsx workbook starts with it.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Cell text in source order, one entry per sheet or CSV row.
type Table = Vec<Vec<String>>;

fn fetch_error(code: &str, err: impl ToString, location: &str) -> CapError {
    CapError::ResourceFetch(ErrorInfo::new(code, err.to_string()).with_context("location", location))
}

/// Source of the production series.
pub trait Loader {
    /// Reads the full series. Called once per run.
    fn load(&self) -> Result<TimeSeries, CapError>;
}

/// Reads an xlsx workbook or CSV export from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileLoader {
    path: PathBuf,
    orientation: Orientation,
}

impl FileLoader {
    /// Creates a loader for `path`.
    pub fn new(path: impl Into<PathBuf>, orientation: Orientation) -> Self {
        Self {
            path: path.into(),
            orientation,
        }
    }
}

impl Loader for FileLoader {
    fn load(&self) -> Result<TimeSeries, CapError> {
        let location = self.path.display().to_string();
        let bytes = fs::read(&self.path).map_err(|err| fetch_error("input.open", err, &location))?;
        let series = parse_resource(&bytes, self.orientation)
            .map_err(|err| with_location(err, &location))?;
        info!(path = %location, points = series.len(), "loaded production series");
        Ok(series)
    }
}

/// Fetches an xlsx or CSV resource over HTTP(S). One attempt, no retry.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    url: String,
    orientation: Orientation,
    timeout: Duration,
}

impl HttpLoader {
    /// Creates a loader for `url`.
    pub fn new(url: impl Into<String>, orientation: Orientation, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            orientation,
            timeout,
        }
    }
}

impl Loader for HttpLoader {
    fn load(&self) -> Result<TimeSeries, CapError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| fetch_error("input.http_client", err, &self.url))?;
        let response = client
            .get(&self.url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| fetch_error("input.http", err, &self.url))?;
        let body = response
            .bytes()
            .map_err(|err| fetch_error("input.http_body", err, &self.url))?;
        debug!(url = %self.url, bytes = body.len(), "fetched input resource");
        let series =
            parse_resource(&body, self.orientation).map_err(|err| with_location(err, &self.url))?;
        info!(url = %self.url, points = series.len(), "loaded production series");
        Ok(series)
    }
}

/// Picks a loader for a path or `http(s)://` URL.
pub fn open_source(location: &str, input: &InputConfig) -> Box<dyn Loader> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpLoader::new(
            location,
            input.orientation,
            Duration::from_secs(input.timeout_secs),
        ))
    } else {
        Box::new(FileLoader::new(location, input.orientation))
    }
}

fn with_location(err: CapError, location: &str) -> CapError {
    match err {
        CapError::ResourceFetch(info) => {
            CapError::ResourceFetch(info.with_context("location", location))
        }
        other => other,
    }
}

/// Parses a fetched resource, sniffing xlsx workbooks by their zip header
/// and treating anything else as CSV.
pub fn parse_resource(bytes: &[u8], orientation: Orientation) -> Result<TimeSeries, CapError> {
    if bytes.starts_with(ZIP_MAGIC) {
        parse_workbook(bytes, orientation)
    } else {
        parse_table(bytes, orientation)
    }
}

/// Parses the first worksheet of an xlsx workbook into a series.
pub fn parse_workbook(bytes: &[u8], orientation: Orientation) -> Result<TimeSeries, CapError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|err: XlsxError| CapError::fetch("input.xlsx", err.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CapError::fetch("input.xlsx_no_sheet", "workbook has no worksheets"))?
        .map_err(|err| CapError::fetch("input.xlsx", err.to_string()))?;
    let table: Table = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string().trim().to_owned()).collect())
        .collect();
    reorient(table, orientation)
}

/// Parses a CSV table into a series.
pub fn parse_table<R: Read>(reader: R, orientation: Orientation) -> Result<TimeSeries, CapError> {
    let mut csv = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut table = Table::new();
    for (line, record) in csv.records().enumerate() {
        let record = record.map_err(|err| {
            CapError::ResourceFetch(
                ErrorInfo::new("input.csv", err.to_string()).with_context("row", line + 1),
            )
        })?;
        table.push(record.iter().map(str::to_owned).collect());
    }
    reorient(table, orientation)
}

fn is_numeric(cell: &str) -> bool {
    cell.parse::<f64>().is_ok()
}

fn malformed(row: usize, column: usize, cell: &str) -> CapError {
    CapError::ResourceFetch(
        ErrorInfo::new("input.malformed_cell", "cell is not a number")
            .with_context("row", row + 1)
            .with_context("column", column + 1)
            .with_context("cell", cell),
    )
}

/// Parses every cell of a data row. Trailing blank cells are padding, not
/// missing values.
fn parse_row(index: usize, row: &[String]) -> Result<Vec<f64>, CapError> {
    let used = row.iter().rposition(|cell| !cell.is_empty()).map_or(0, |last| last + 1);
    row[..used]
        .iter()
        .enumerate()
        .map(|(column, cell)| cell.parse::<f64>().map_err(|_| malformed(index, column, cell)))
        .collect()
}

/// Whether `values` reads `1, 2, ..., n`, i.e. a row of period labels.
fn is_period_header(values: &[f64]) -> bool {
    values.len() > 2 && (1u32..).zip(values).all(|(period, value)| *value == f64::from(period))
}

/// Turns raw cells into a series.
///
/// Leading rows without any numeric cell are headers. Every row after them
/// is data, and every non-padding cell of a data row must parse. In row
/// layout the first data row is the series; in column layout each data row
/// contributes the cell in the last used column, which must be present.
fn reorient(mut table: Table, orientation: Orientation) -> Result<TimeSeries, CapError> {
    while table.last().is_some_and(|row| row.iter().all(String::is_empty)) {
        table.pop();
    }
    let first_data = table
        .iter()
        .position(|row| row.iter().any(|cell| is_numeric(cell)))
        .ok_or_else(|| {
            CapError::fetch("input.empty", "resource does not contain any numeric values")
        })?;
    let mut data: Vec<(usize, &[String])> = table
        .iter()
        .enumerate()
        .skip(first_data)
        .map(|(index, row)| (index, row.as_slice()))
        .collect();

    let orientation = match orientation {
        Orientation::Auto => {
            if data.len() == 2 && is_period_header(&parse_row(data[0].0, data[0].1)?) {
                data.remove(0);
            }
            let (index, row) = data[0];
            if data.len() == 1 && parse_row(index, row)?.len() > 1 {
                Orientation::Row
            } else {
                Orientation::Column
            }
        }
        fixed => fixed,
    };

    let values = match orientation {
        Orientation::Row => {
            let (index, row) = data[0];
            parse_row(index, row)?
        }
        _ => {
            let rows = data
                .iter()
                .map(|&(index, row)| parse_row(index, row).map(|parsed| (index, parsed)))
                .collect::<Result<Vec<_>, CapError>>()?;
            let column = rows
                .iter()
                .map(|(_, parsed)| parsed.len())
                .max()
                .unwrap_or(0)
                .saturating_sub(1);
            rows.iter()
                .map(|(index, parsed)| {
                    parsed
                        .get(column)
                        .copied()
                        .ok_or_else(|| malformed(*index, column, ""))
                })
                .collect::<Result<Vec<f64>, CapError>>()?
        }
    };
    debug!(?orientation, points = values.len(), "parsed input table");
    TimeSeries::from_values(values)
}
