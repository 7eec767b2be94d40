//! Daily OHLCV price series
//!
//! The simulator reads prices only; the series is validated once on
//! construction and never mutated afterwards.

use std::io;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::DataConfig;
use crate::error::{Result, SimError};

/// Number of rows in the observation window
pub const WINDOW_SIZE: usize = 6;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One trading day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Create an undated bar
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date: None,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    fn check(&self, index: usize) -> Result<()> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::InvalidPriceBar {
                    index,
                    reason: format!("{name} must be finite and non-negative, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// CSV row layout: the column names written by common market data exports
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date", default)]
    date: Option<String>,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: f64,
}

impl CsvRow {
    fn into_bar(self) -> Result<PriceBar> {
        let date = match self.date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(
                NaiveDate::parse_from_str(raw, DATE_FORMAT)
                    .map_err(|e| SimError::InvalidDate(format!("{raw}: {e}")))?,
            ),
            _ => None,
        };

        Ok(PriceBar {
            date,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        })
    }
}

/// Ordered, read-only daily price records
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, rejecting non-finite or negative values and series too
    /// short to hold one observation window.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self> {
        if bars.len() < WINDOW_SIZE {
            return Err(SimError::SeriesTooShort {
                len: bars.len(),
                required: WINDOW_SIZE,
            });
        }

        for (index, bar) in bars.iter().enumerate() {
            bar.check(index)?;
        }

        Ok(Self { bars })
    }

    /// Read a headered CSV with `Open`, `High`, `Low`, `Close`, `Volume` and an
    /// optional `Date` column. Other columns are ignored.
    pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let mut bars = Vec::new();
        for row in csv_reader.deserialize::<CsvRow>() {
            bars.push(row?.into_bar()?);
        }

        Self::new(bars)
    }

    /// Read a CSV file from disk
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(io::BufReader::new(file))
    }

    /// Load the series named by `price_csv`, or None when no file is configured
    pub fn from_config(config: &DataConfig) -> Result<Option<Self>> {
        match config.price_csv.as_deref() {
            Some(path) => Self::from_csv_path(path).map(Some),
            None => Ok(None),
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false: construction requires a full window
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn get(&self, index: usize) -> Option<&PriceBar> {
        self.bars.get(index)
    }

    /// Highest valid window start (inclusive)
    pub fn last_window_start(&self) -> usize {
        self.bars.len() - WINDOW_SIZE
    }

    /// The `WINDOW_SIZE` bars starting at `start`
    pub fn window(&self, start: usize) -> Option<&[PriceBar]> {
        self.bars.get(start..start.checked_add(WINDOW_SIZE)?)
    }
}
