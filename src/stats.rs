use crate::filter::FilteredData;
use crate::models::{RegularityRecord, WEEKDAYS, line_order, sort_lines, weekday_name};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Summary statistics of the daily rate for one line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub line: String,
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

fn mean(vals: &[f64]) -> Option<f64> {
    if vals.is_empty() {
        None
    } else {
        Some(vals.iter().sum::<f64>() / vals.len() as f64)
    }
}

fn rates_by_line(records: &[RegularityRecord]) -> HashMap<&str, Vec<f64>> {
    let mut groups: HashMap<&str, Vec<f64>> = HashMap::new();
    for r in records {
        groups.entry(r.line.as_str()).or_default().push(r.rate);
    }
    groups
}

/// Compute per-line statistics, ordered by line.
pub fn grouped_summary(records: &[RegularityRecord]) -> Vec<Summary> {
    let mut out = Vec::new();
    for (line, mut vals) in rates_by_line(records) {
        vals.sort_by(|a, b| a.total_cmp(b));
        let count = vals.len();
        let median = if count == 0 {
            None
        } else if count % 2 == 1 {
            Some(vals[count / 2])
        } else {
            Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
        };
        out.push(Summary {
            line: line.to_string(),
            count,
            min: vals.first().copied(),
            max: vals.last().copied(),
            mean: mean(&vals),
            median,
        });
    }
    out.sort_by(|a, b| line_order(&a.line, &b.line));
    out
}

/// Mean rate of one line over the selected period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineScore {
    pub line: String,
    pub mean_rate: f64,
    pub days: usize,
}

/// Lines by mean rate, best first; ties keep line order.
pub fn ranking(records: &[RegularityRecord]) -> Vec<LineScore> {
    let mut out: Vec<LineScore> = rates_by_line(records)
        .into_iter()
        .filter_map(|(line, vals)| {
            mean(&vals).map(|m| LineScore {
                line: line.to_string(),
                mean_rate: m,
                days: vals.len(),
            })
        })
        .collect();
    out.sort_by(|a, b| {
        b.mean_rate
            .total_cmp(&a.mean_rate)
            .then_with(|| line_order(&a.line, &b.line))
    });
    out
}

/// Pivot of mean rate: one row per line, one column per canonical weekday.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekdayMatrix {
    pub lines: Vec<String>,
    /// `cells[row][col]`, column order as [`WeekdayMatrix::columns`].
    pub cells: Vec<[Option<f64>; 7]>,
}

impl WeekdayMatrix {
    /// The seven weekday names, Monday first.
    pub fn columns() -> [&'static str; 7] {
        WEEKDAYS.map(weekday_name)
    }

    pub fn get(&self, line: &str, weekday: usize) -> Option<f64> {
        let row = self.lines.iter().position(|l| l == line)?;
        self.cells.get(row)?.get(weekday).copied().flatten()
    }

    /// Smallest and largest filled cell.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let vals: Vec<f64> = self.cells.iter().flatten().filter_map(|c| *c).collect();
        if vals.is_empty() {
            return None;
        }
        let lo = vals.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((lo, hi))
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

pub fn weekday_matrix(records: &[RegularityRecord]) -> WeekdayMatrix {
    let mut sums: BTreeMap<String, [(f64, usize); 7]> = BTreeMap::new();
    for r in records {
        let cell = &mut sums.entry(r.line.clone()).or_insert([(0.0, 0); 7])[r.weekday_index()];
        cell.0 += r.rate;
        cell.1 += 1;
    }
    let mut lines: Vec<String> = sums.keys().cloned().collect();
    sort_lines(&mut lines);
    let cells = lines
        .iter()
        .map(|l| {
            sums[l].map(|(sum, n)| if n == 0 { None } else { Some(sum / n as f64) })
        })
        .collect();
    WeekdayMatrix { lines, cells }
}

/// Mean rate per line and calendar month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyMeans {
    /// First day of every month present, in calendar order.
    pub months: Vec<NaiveDate>,
    pub lines: Vec<String>,
    /// `cells[line][month]`
    pub cells: Vec<Vec<Option<f64>>>,
}

pub fn monthly_means(records: &[RegularityRecord]) -> MonthlyMeans {
    let mut sums: BTreeMap<(String, NaiveDate), (f64, usize)> = BTreeMap::new();
    let mut months: Vec<NaiveDate> = Vec::new();
    for r in records {
        let first = r.date.with_day(1).unwrap_or(r.date);
        let e = sums.entry((r.line.clone(), first)).or_insert((0.0, 0));
        e.0 += r.rate;
        e.1 += 1;
        months.push(first);
    }
    months.sort();
    months.dedup();
    let mut lines: Vec<String> = sums.keys().map(|(l, _)| l.clone()).collect();
    lines.dedup();
    sort_lines(&mut lines);
    let cells = lines
        .iter()
        .map(|l| {
            months
                .iter()
                .map(|m| {
                    sums.get(&(l.clone(), *m))
                        .map(|(sum, n)| sum / *n as f64)
                })
                .collect()
        })
        .collect();
    MonthlyMeans {
        months,
        lines,
        cells,
    }
}

/// Headline figures of the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Kpis {
    /// Mean daily rate; `None` when the date window holds no record.
    pub mean_rate: Option<f64>,
    /// Worst daily rate over the selection.
    pub worst_day: Option<f64>,
    pub amenity_count: usize,
    pub line_count: usize,
    pub total_ridership: u64,
}

pub fn kpis(data: &FilteredData, line_count: usize) -> Kpis {
    let rates: Vec<f64> = data.regularity.iter().map(|r| r.rate).collect();
    Kpis {
        mean_rate: mean(&rates),
        worst_day: rates.iter().copied().reduce(f64::min),
        amenity_count: data.amenities.len(),
        line_count,
        total_ridership: data.regularity.iter().map(|r| r.ridership).sum(),
    }
}
