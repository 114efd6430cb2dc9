//! CSV file provider: offline import of previously exported daily bars.
//!
//! Layout: `{dir}/{SYMBOL}.csv` with the Yahoo export header
//! `Date,Open,High,Low,Close,Adj Close,Volume`. Unparseable numeric cells
//! (Yahoo writes `null`) become NaN and are dropped later as void bars.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::provider::{check_range, check_symbol, DataError, DataSource, FetchResult, PriceProvider};
use crate::domain::DailyBar;

#[derive(Debug, Deserialize, Serialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open", deserialize_with = "csv::invalid_option")]
    open: Option<f64>,
    #[serde(rename = "High", deserialize_with = "csv::invalid_option")]
    high: Option<f64>,
    #[serde(rename = "Low", deserialize_with = "csv::invalid_option")]
    low: Option<f64>,
    #[serde(rename = "Close", deserialize_with = "csv::invalid_option")]
    close: Option<f64>,
    #[serde(rename = "Adj Close", default, deserialize_with = "csv::invalid_option")]
    adj_close: Option<f64>,
    #[serde(rename = "Volume", default, deserialize_with = "csv::invalid_option")]
    volume: Option<f64>,
}

/// Reads daily bars from per-symbol CSV files.
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing `symbol`.
    pub fn symbol_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl PriceProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        check_range(start, end)?;
        check_symbol(symbol)?;

        let path = self.symbol_path(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let bars: Vec<DailyBar> = read_csv(&path)?
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect();

        if bars.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
                start,
                end,
            });
        }

        tracing::info!(%symbol, bars = bars.len(), path = %path.display(), "loaded csv");

        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::CsvImport,
        })
    }
}

/// Read every bar from a Yahoo-layout CSV file.
pub fn read_csv(path: &Path) -> Result<Vec<DailyBar>, DataError> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| DataError::Csv(format!("{}: {e}", path.display())))?;

    let mut bars = Vec::new();
    for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(|e| DataError::Csv(format!("{} row {}: {e}", path.display(), line + 1)))?;
        let close = row.close.unwrap_or(f64::NAN);
        bars.push(DailyBar {
            date: row.date,
            open: row.open.unwrap_or(f64::NAN),
            high: row.high.unwrap_or(f64::NAN),
            low: row.low.unwrap_or(f64::NAN),
            close,
            volume: row.volume.map(|v| v.max(0.0) as u64).unwrap_or(0),
            adj_close: row.adj_close.unwrap_or(close),
        });
    }
    Ok(bars)
}

/// Write bars in the layout `CsvProvider` reads back.
pub fn write_csv(path: &Path, bars: &[DailyBar]) -> Result<(), DataError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| DataError::Csv(format!("{}: {e}", path.display())))?;
    for b in bars {
        writer
            .serialize(CsvRow {
                date: b.date,
                open: Some(b.open),
                high: Some(b.high),
                low: Some(b.low),
                close: Some(b.close),
                adj_close: Some(b.adj_close),
                volume: Some(b.volume as f64),
            })
            .map_err(|e| DataError::Csv(e.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}
