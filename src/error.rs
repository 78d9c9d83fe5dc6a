//! Typed errors for the two recognized failure kinds plus configuration problems.
//!
//! A missing amenity table is *not* an error (see [`crate::amenities::AmenityLoad::Missing`]);
//! only unreadable or malformed tables reach [`LoadError`].

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed table {}{}: {source}", .path.display(), record_suffix(.record))]
    Parse {
        path: PathBuf,
        record: Option<u64>,
        source: csv::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid date window: {start} is after {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },
    #[error("simulation needs at least one line")]
    NoLines,
    #[error("{name} must be a finite, non-negative number (got {value})")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("could not read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

fn record_suffix(record: &Option<u64>) -> String {
    match record {
        Some(r) => format!(" (record {r})"),
        None => String::new(),
    }
}
