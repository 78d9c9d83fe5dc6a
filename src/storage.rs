use crate::models::{AmenityRecord, RegularityRecord};
use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Prefix cells that a spreadsheet would evaluate as a formula.
fn safe_cell(s: &str) -> String {
    match s.chars().next() {
        Some('=' | '+' | '-' | '@') => format!("'{s}"),
        _ => s.to_string(),
    }
}

/// Save regularity records as CSV with header.
pub fn save_regularity_csv<P: AsRef<Path>>(records: &[RegularityRecord], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.serialize(("date", "line", "rate", "ridership", "month", "weekday"))?;
    for r in records {
        wtr.serialize((
            r.date.format("%Y-%m-%d").to_string(),
            safe_cell(&r.line),
            r.rate,
            r.ridership,
            &r.month,
            &r.weekday,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save amenity records as CSV with header.
pub fn save_amenities_csv<P: AsRef<Path>>(records: &[AmenityRecord], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.serialize((
        "line",
        "station",
        "address",
        "municipality",
        "zone",
        "latitude",
        "longitude",
    ))?;
    for a in records {
        wtr.serialize((
            safe_cell(&a.line),
            safe_cell(&a.station),
            safe_cell(&a.address),
            safe_cell(&a.municipality),
            a.zone.as_deref().map(safe_cell),
            a.latitude,
            a.longitude,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save any serializable rows as a pretty JSON array.
pub fn save_json<T: Serialize, P: AsRef<Path>>(rows: &[T], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(rows)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
