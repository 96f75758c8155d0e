//! Load adjusted closing prices from a wide CSV table
//!
//! Layout: a `Date` column followed by one column per symbol. Empty cells (and
//! `NaN`) are days the symbol did not trade.

use super::{PricePoint, PriceSeries, PriceSource, PriceTable};
use crate::error::{Error, Result};
use chrono::NaiveDate;
use csv::Reader;
use log::debug;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Date format used for price tables
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Price source backed by a CSV file on disk
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    path: PathBuf,
}

impl CsvPriceSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PriceSource for CsvPriceSource {
    fn load(&self) -> Result<PriceTable> {
        load_price_table(&self.path)
    }
}

/// Load a price table from a CSV file
pub fn load_price_table<P: AsRef<Path>>(path: P) -> Result<PriceTable> {
    let reader = Reader::from_path(path.as_ref())?;
    debug!("Loading prices from {}", path.as_ref().display());
    read_table(reader)
}

/// Load a price table from any reader (e.g., string buffer)
pub fn load_price_table_from_reader<R: Read>(reader: R) -> Result<PriceTable> {
    read_table(Reader::from_reader(reader))
}

fn read_table<R: Read>(mut reader: Reader<R>) -> Result<PriceTable> {
    let headers = reader.headers()?.clone();

    let date_col = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("date"))
        .ok_or(Error::MissingDateColumn)?;

    let symbols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != date_col)
        .map(|(idx, name)| (idx, name.trim().to_string()))
        .collect();

    let mut columns: Vec<Vec<PricePoint>> = vec![Vec::new(); symbols.len()];

    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let row = i + 1;

        let raw_date = record.get(date_col).unwrap_or("");
        let date = parse_date(raw_date).ok_or_else(|| Error::InvalidDate {
            row,
            value: raw_date.to_string(),
        })?;

        for (column, (idx, symbol)) in columns.iter_mut().zip(&symbols) {
            let cell = record.get(*idx).unwrap_or("");
            let price = parse_price(cell).ok_or_else(|| Error::InvalidCell {
                row,
                symbol: symbol.clone(),
                value: cell.to_string(),
            })?;
            column.push(PricePoint::new(date, price));
        }
    }

    let mut table = PriceTable::new();
    for ((_, symbol), points) in symbols.into_iter().zip(columns) {
        let series = PriceSeries::new(points)?;
        debug!(
            "Loaded {}: {} rows, {} with prices",
            symbol,
            series.len(),
            series.valid_count()
        );
        table.insert(symbol, series);
    }

    Ok(table)
}

/// Accepts `2020-01-31` as well as timestamps such as `2020-01-31 00:00:00-05:00`
fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let day = value.split(|c: char| c == ' ' || c == 'T').next().unwrap_or(value);
    NaiveDate::parse_from_str(day, DATE_FORMAT).ok()
}

/// `Some(None)` is a missing price, `None` is an unparseable cell
fn parse_price(cell: &str) -> Option<Option<f64>> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Some(None);
    }
    cell.parse::<f64>().ok().map(Some)
}
