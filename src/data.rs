//! Call-volume dataset loading and cleaning

use crate::error::{ForecastError, Result};
use calamine::{open_workbook_auto, DataType, Reader};
use chrono::{Datelike, NaiveDate};
use std::fs::File;
use std::path::Path;

/// Date format expected in the input file
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Name of the required date column
pub const DATE_COLUMN: &str = "Date";

/// Name of the required call-count column
pub const CALLS_COLUMN: &str = "Calls Offered";

/// Number of working days kept per week (Monday through Friday)
pub const WEEKDAYS: u32 = 5;

/// A single cleaned observation: one weekday and its offered call count
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    /// Calendar date of the observation
    pub date: NaiveDate,
    /// Number of inbound call attempts offered on that date
    pub calls_offered: f64,
    /// ISO-8601 week number derived from the date
    pub week: u32,
    /// Weekday index, days from Monday (0 = Monday .. 4 = Friday)
    pub weekday: u32,
}

impl CallRecord {
    fn new(date: NaiveDate, calls_offered: f64) -> Self {
        Self {
            date,
            calls_offered,
            week: date.iso_week().week(),
            weekday: date.weekday().num_days_from_monday(),
        }
    }
}

/// Cleaned call-volume dataset restricted to weekday rows
#[derive(Debug, Clone)]
pub struct CallDataset {
    records: Vec<CallRecord>,
}

impl CallDataset {
    /// Load a dataset from a file path, dispatching on the extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Self::from_csv(path),
            "xlsx" | "xls" => Self::from_excel(path),
            _ => Err(ForecastError::UnsupportedFormat(format!(
                "'{}' (expected .csv, .xlsx or .xls)",
                path.display()
            ))),
        }
    }

    /// Load a dataset from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(file);

        let headers = reader.headers()?.clone();
        let date_idx = find_column(&headers, DATE_COLUMN)?;
        let calls_idx = find_column(&headers, CALLS_COLUMN)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let date = record.get(date_idx).and_then(parse_date);
            let calls = record
                .get(calls_idx)
                .and_then(|raw| raw.trim().parse::<f64>().ok());
            rows.push((date, calls));
        }

        Self::clean(rows)
    }

    /// Load a dataset from the first worksheet of an Excel file
    pub fn from_excel<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ForecastError::ExcelError("Workbook has no sheets".to_string()))??;

        let mut row_iter = range.rows();
        let headers = row_iter
            .next()
            .ok_or_else(|| ForecastError::DataError("Worksheet is empty".to_string()))?;

        let date_idx = find_excel_column(headers, DATE_COLUMN)?;
        let calls_idx = find_excel_column(headers, CALLS_COLUMN)?;

        let mut rows = Vec::new();
        for row in row_iter {
            // Date cells arrive either as native Excel datetimes or as text
            let date = row.get(date_idx).and_then(|cell| {
                cell.as_date()
                    .or_else(|| cell.get_string().and_then(parse_date))
            });
            let calls = row.get(calls_idx).and_then(|cell| {
                cell.as_f64()
                    .or_else(|| cell.get_string().and_then(|raw| raw.trim().parse().ok()))
            });
            rows.push((date, calls));
        }

        Self::clean(rows)
    }

    /// Create a dataset directly from (date, calls) pairs
    ///
    /// Applies the same cleaning invariant as file loading: weekend rows are
    /// filtered out and an input with no usable rows is an error.
    pub fn from_records(pairs: Vec<(NaiveDate, f64)>) -> Result<Self> {
        Self::clean(
            pairs
                .into_iter()
                .map(|(date, calls)| (Some(date), Some(calls)))
                .collect(),
        )
    }

    /// Apply the cleaning invariant: drop rows with an unparseable date or
    /// call count, keep Monday-Friday only, sort by date
    fn clean(rows: Vec<(Option<NaiveDate>, Option<f64>)>) -> Result<Self> {
        let total = rows.len();
        let mut dropped = 0usize;
        let mut weekend = 0usize;
        let mut records = Vec::with_capacity(total);

        for (date, calls) in rows {
            let (Some(date), Some(calls)) = (date, calls) else {
                dropped += 1;
                continue;
            };
            if date.weekday().num_days_from_monday() >= WEEKDAYS {
                weekend += 1;
                continue;
            }
            records.push(CallRecord::new(date, calls));
        }

        if records.is_empty() {
            return Err(ForecastError::DataError(format!(
                "No usable weekday rows found ({} rows read)",
                total
            )));
        }

        records.sort_by_key(|r| r.date);
        log::info!(
            "loaded {} weekday rows ({} unparseable, {} weekend rows filtered)",
            records.len(),
            dropped,
            weekend
        );

        Ok(Self { records })
    }

    /// Get the cleaned records, sorted by date
    pub fn records(&self) -> &[CallRecord] {
        &self.records
    }

    /// Get the number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest ISO week number in the dataset
    pub fn min_week(&self) -> Option<u32> {
        self.records.iter().map(|r| r.week).min()
    }

    /// Latest ISO week number in the dataset
    pub fn max_week(&self) -> Option<u32> {
        self.records.iter().map(|r| r.week).max()
    }

    /// Number of weeks spanned by the dataset (max week - min week + 1)
    ///
    /// Week numbers are compared as plain integers. A dataset wrapping an
    /// ISO year boundary (late-December week 52 followed by early-January
    /// week 1) therefore reports a near-full-year span, and no requested
    /// week passes the strictly-after-`max_week` validation in
    /// [`crate::forecast::forecast_week`]. Inputs are expected to fall
    /// within a single ISO year.
    pub fn week_range(&self) -> Option<u32> {
        match (self.min_week(), self.max_week()) {
            (Some(min), Some(max)) => Some(max - min + 1),
            _ => None,
        }
    }

    /// Last observed date
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.iter().map(|r| r.date).max()
    }

    /// Check whether a date is already present in the dataset
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.records.iter().any(|r| r.date == date)
    }

    /// Records falling within the last `n` observed week numbers
    pub fn last_weeks(&self, n: u32) -> Vec<&CallRecord> {
        let Some(max_week) = self.max_week() else {
            return Vec::new();
        };
        let threshold = max_week.saturating_sub(n.saturating_sub(1));
        self.records
            .iter()
            .filter(|r| r.week >= threshold)
            .collect()
    }
}

/// Parse a date in the fixed day-month-year input format
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| ForecastError::MissingColumn(name.to_string()))
}

fn find_excel_column(headers: &[calamine::Data], name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|cell| {
            cell.get_string()
                .map(|header| header.trim().eq_ignore_ascii_case(name))
                .unwrap_or(false)
        })
        .ok_or_else(|| ForecastError::MissingColumn(name.to_string()))
}
