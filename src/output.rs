//! CSV output for result tables
//!
//! Undefined values are written as empty cells so they stay distinguishable
//! from zero. Each table has a `*_to` form that writes to any `io::Write`, and
//! a `ResultsWriter` method that writes a named file in the results directory.

use crate::error::Result;
use crate::metrics::MetricsRecord;
use crate::prices::{loader::DATE_FORMAT, PriceTable};
use crate::scenario::{LabeledPath, LabeledTable};
use csv::Writer;
use log::info;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Metrics table: `Ticker,CAGR,AnnualVolatility,MaxDD,Sharpe`
pub fn write_metrics_to<W: Write>(writer: W, records: &[MetricsRecord]) -> Result<()> {
    let mut csv = Writer::from_writer(writer);
    if records.is_empty() {
        csv.write_record(["Ticker", "CAGR", "AnnualVolatility", "MaxDD", "Sharpe"])?;
    }
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Wide price table: `Date` then one column per symbol, over the union of dates
pub fn write_prices_to<W: Write>(writer: W, table: &PriceTable) -> Result<()> {
    let mut csv = Writer::from_writer(writer);

    let mut header = vec!["Date".to_string()];
    header.extend(table.symbols().map(str::to_string));
    csv.write_record(&header)?;

    for date in table.dates() {
        let mut row = vec![date.format(DATE_FORMAT).to_string()];
        row.extend(table.iter().map(|(_, series)| cell(series.price_on(date))));
        csv.write_record(&row)?;
    }

    csv.flush()?;
    Ok(())
}

/// Paths side by side: `Month`, `Age` when every path starts at the same age,
/// then one column per label. Shorter paths leave trailing cells empty.
pub fn write_paths_to<W: Write>(writer: W, paths: &[LabeledPath]) -> Result<()> {
    let mut csv = Writer::from_writer(writer);

    let common_age = paths
        .first()
        .and_then(|p| p.path.start_age)
        .filter(|age| paths.iter().all(|p| p.path.start_age == Some(*age)));

    let mut header = vec!["Month".to_string()];
    if common_age.is_some() {
        header.push("Age".to_string());
    }
    header.extend(paths.iter().map(|p| p.label.clone()));
    csv.write_record(&header)?;

    let rows = paths.iter().map(|p| p.path.len()).max().unwrap_or(0);
    for month in 0..rows as u32 {
        let mut row = vec![month.to_string()];
        if let Some(age) = common_age {
            row.push(format!("{:.2}", age as f64 + month as f64 / 12.0));
        }
        row.extend(paths.iter().map(|p| cell(p.path.balance_at(month))));
        csv.write_record(&row)?;
    }

    csv.flush()?;
    Ok(())
}

/// Monthly-needed tables side by side: `Start Age` then one column per label
pub fn write_monthly_needed_to<W: Write>(writer: W, tables: &[LabeledTable]) -> Result<()> {
    let mut csv = Writer::from_writer(writer);

    let mut header = vec!["Start Age".to_string()];
    header.extend(tables.iter().map(|t| t.label.clone()));
    csv.write_record(&header)?;

    let ages = tables.first().map(|t| t.table.rows()).unwrap_or(&[]);
    for (i, first) in ages.iter().enumerate() {
        let mut row = vec![first.start_age.to_string()];
        row.extend(
            tables
                .iter()
                .map(|t| cell(t.table.rows().get(i).and_then(|r| r.monthly))),
        );
        csv.write_record(&row)?;
    }

    csv.flush()?;
    Ok(())
}

/// Writes result tables into one output directory
///
/// The directory comes from configuration and is created on construction.
#[derive(Debug, Clone)]
pub struct ResultsWriter {
    dir: PathBuf,
}

impl ResultsWriter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    fn create(&self, file_name: &str) -> Result<(File, PathBuf)> {
        let path = self.path_for(file_name);
        Ok((File::create(&path)?, path))
    }

    pub fn write_metrics(&self, file_name: &str, records: &[MetricsRecord]) -> Result<PathBuf> {
        let (file, path) = self.create(file_name)?;
        write_metrics_to(file, records)?;
        info!("Wrote {} metrics rows to {}", records.len(), path.display());
        Ok(path)
    }

    pub fn write_prices(&self, file_name: &str, table: &PriceTable) -> Result<PathBuf> {
        let (file, path) = self.create(file_name)?;
        write_prices_to(file, table)?;
        info!("Wrote {} price series to {}", table.len(), path.display());
        Ok(path)
    }

    pub fn write_paths(&self, file_name: &str, paths: &[LabeledPath]) -> Result<PathBuf> {
        let (file, path) = self.create(file_name)?;
        write_paths_to(file, paths)?;
        info!("Wrote {} paths to {}", paths.len(), path.display());
        Ok(path)
    }

    pub fn write_monthly_needed(&self, file_name: &str, tables: &[LabeledTable]) -> Result<PathBuf> {
        let (file, path) = self.create(file_name)?;
        write_monthly_needed_to(file, tables)?;
        info!("Wrote {} monthly-needed tables to {}", tables.len(), path.display());
        Ok(path)
    }
}
