use crate::error::ConfigError;
use chrono::{Datelike, Month, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Canonical weekday order used for every weekly aggregation.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// English display name of a weekday ("Monday" .. "Sunday").
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// English month name of a date ("January" .. "December").
pub fn month_name(date: NaiveDate) -> &'static str {
    Month::try_from(date.month() as u8)
        .map(|m| m.name())
        .unwrap_or("")
}

/// Ordering for line identifiers: numeric ids by value, then free-text ids.
///
/// Keeps "2" before "10" while still accepting ids such as "3bis" or "RER A".
pub fn line_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<u32>(), b.parse::<u32>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Sort line identifiers in place with [`line_order`].
pub fn sort_lines(lines: &mut [String]) {
    lines.sort_by(|a, b| line_order(a, b));
}

/// One simulated day of service for one line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegularityRecord {
    pub date: NaiveDate,
    pub line: String,
    /// On-time percentage, always within `[0, 100]`.
    pub rate: f64,
    pub ridership: u64,
    pub month: String,
    pub weekday: String,
}

impl RegularityRecord {
    /// Build a record, clamping the rate to `[0, 100]` (two decimals) and
    /// deriving month and weekday names from the date.
    pub fn new(date: NaiveDate, line: impl Into<String>, rate: f64, ridership: u64) -> Self {
        let clamped = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 100.0) };
        Self {
            date,
            line: line.into(),
            rate: (clamped * 100.0).round() / 100.0,
            ridership,
            month: month_name(date).to_string(),
            weekday: weekday_name(date.weekday()).to_string(),
        }
    }

    /// Position of the record's weekday in [`WEEKDAYS`].
    pub fn weekday_index(&self) -> usize {
        self.date.weekday().num_days_from_monday() as usize
    }
}

/// A point of interest (water fountain) attached to a line, as read from the static table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AmenityRecord {
    pub line: String,
    pub station: String,
    pub address: String,
    pub municipality: String,
    pub zone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl AmenityRecord {
    /// `(longitude, latitude)` when both coordinates are present and finite.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.longitude, self.latitude) {
            (Some(lon), Some(lat)) if lon.is_finite() && lat.is_finite() => Some((lon, lat)),
            _ => None,
        }
    }
}

/// Closed date interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Window of exactly one day.
    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered (both ends included).
    pub fn days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Iterate every day of the window in order.
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take(self.days())
    }

    /// Narrow `self` to the part that overlaps `bounds`; `None` when disjoint.
    pub fn clamp_to(&self, bounds: &DateWindow) -> Option<DateWindow> {
        let start = self.start.max(bounds.start);
        let end = self.end.min(bounds.end);
        DateWindow::new(start, end).ok()
    }
}

/// User-chosen lines and date window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub lines: BTreeSet<String>,
    pub window: DateWindow,
}

impl Selection {
    pub fn new<I, S>(lines: I, window: DateWindow) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines
                .into_iter()
                .map(|l| l.into().trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
            window,
        }
    }

    pub fn includes_line(&self, line: &str) -> bool {
        self.lines.contains(line)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Selected lines in display order.
    pub fn sorted_lines(&self) -> Vec<String> {
        let mut out: Vec<String> = self.lines.iter().cloned().collect();
        sort_lines(&mut out);
        out
    }

    /// Toggle membership of a line (used by the multi-select).
    pub fn toggle(&mut self, line: &str) {
        if !self.lines.remove(line) {
            self.lines.insert(line.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn record_clamps_and_derives_names() {
        let r = RegularityRecord::new(d(2023, 1, 1), "1", 101.234, 10);
        assert_eq!(r.rate, 100.0);
        assert_eq!(r.month, "January");
        assert_eq!(r.weekday, "Sunday");
        assert_eq!(r.weekday_index(), 6);

        let low = RegularityRecord::new(d(2023, 1, 2), "1", -3.0, 10);
        assert_eq!(low.rate, 0.0);
        assert_eq!(low.weekday, "Monday");

        let rounded = RegularityRecord::new(d(2023, 1, 2), "1", 94.567, 10);
        assert!((rounded.rate - 94.57).abs() < 1e-9);
    }

    #[test]
    fn window_rejects_reversed_bounds() {
        assert!(DateWindow::new(d(2023, 2, 1), d(2023, 1, 1)).is_err());
        let w = DateWindow::new(d(2023, 1, 1), d(2023, 1, 31)).unwrap();
        assert_eq!(w.days(), 31);
        assert!(w.contains(d(2023, 1, 31)));
        assert!(!w.contains(d(2023, 2, 1)));
        assert_eq!(w.iter_days().count(), 31);
    }

    #[test]
    fn window_clamp_handles_disjoint() {
        let year = DateWindow::new(d(2023, 1, 1), d(2023, 12, 31)).unwrap();
        let late = DateWindow::new(d(2024, 1, 1), d(2024, 2, 1)).unwrap();
        assert!(late.clamp_to(&year).is_none());
        let overlap = DateWindow::new(d(2022, 12, 1), d(2023, 1, 10)).unwrap();
        let clamped = overlap.clamp_to(&year).unwrap();
        assert_eq!(clamped.start(), d(2023, 1, 1));
        assert_eq!(clamped.end(), d(2023, 1, 10));
    }

    #[test]
    fn line_order_is_numeric_first() {
        let mut lines: Vec<String> = ["10", "2", "RER A", "1", "3bis"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        sort_lines(&mut lines);
        assert_eq!(lines, vec!["1", "2", "10", "3bis", "RER A"]);
    }

    #[test]
    fn selection_trims_and_toggles() {
        let w = DateWindow::new(d(2023, 1, 1), d(2023, 1, 2)).unwrap();
        let mut s = Selection::new([" 1", "13 ", ""], w);
        assert_eq!(s.sorted_lines(), vec!["1", "13"]);
        s.toggle("13");
        assert!(!s.includes_line("13"));
        s.toggle("4");
        assert!(s.includes_line("4"));
    }
}
