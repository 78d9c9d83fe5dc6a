use chrono::{Datelike, NaiveDate, Weekday};
use transit_dash::amenities::AmenitySource;
use transit_dash::dashboard::{MapPanel, Notice};
use transit_dash::filter::{self, EMPTY_SELECTION_PROMPT, Filtered};
use transit_dash::models::AmenityRecord;
use transit_dash::profile::{Portrait, ProfileConfig};
use transit_dash::stats;
use transit_dash::{
    Dashboard, DateWindow, Page, Selection, SimulationConfig, View, dispatch, generate,
};

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, m, d).unwrap()
}

fn seeded(seed: u64) -> SimulationConfig {
    SimulationConfig {
        seed: Some(seed),
        ..SimulationConfig::default()
    }
}

fn amenity(line: &str, station: &str, coords: Option<(f64, f64)>) -> AmenityRecord {
    AmenityRecord {
        line: line.into(),
        station: station.into(),
        address: String::new(),
        municipality: "Paris".into(),
        zone: None,
        latitude: coords.map(|c| c.0),
        longitude: coords.map(|c| c.1),
    }
}

fn dashboard(amenities: AmenitySource) -> Dashboard {
    let cfg = seeded(42);
    let calendar = cfg.validate().unwrap();
    Dashboard::new(generate(&cfg).unwrap(), amenities, "fountains.csv", calendar)
}

#[test]
fn simulated_year_covers_every_line_and_day() {
    let rows = generate(&seeded(1)).unwrap();
    assert_eq!(rows.len(), 14 * 365);
    assert!(rows.iter().all(|r| (0.0..=100.0).contains(&r.rate)));

    let first = &rows[0];
    assert_eq!(first.line, "1");
    assert_eq!(first.date, day(1, 1));
    assert_eq!(first.weekday, "Sunday");
    assert_eq!(first.month, "January");
    assert!(rows.iter().all(|r| r.date.year() == 2023));
}

#[test]
fn extreme_noise_stays_within_bounds() {
    let cfg = SimulationConfig {
        noise_sd: 40.0,
        ..seeded(9)
    };
    let rows = generate(&cfg).unwrap();
    assert!(rows.iter().all(|r| (0.0..=100.0).contains(&r.rate)));
    assert!(rows.iter().any(|r| r.rate == 100.0));
}

#[test]
fn seeded_runs_are_reproducible() {
    assert_eq!(generate(&seeded(5)).unwrap(), generate(&seeded(5)).unwrap());
    assert_ne!(generate(&seeded(5)).unwrap(), generate(&seeded(6)).unwrap());
}

#[test]
fn automated_lines_rank_above_degraded_line() {
    let rows = generate(&seeded(11)).unwrap();
    let ranking = stats::ranking(&rows);
    let pos = |line: &str| ranking.iter().position(|s| s.line == line).unwrap();
    assert!(pos("1") < pos("13"));
    assert!(pos("14") < pos("13"));
    assert_eq!(ranking.last().unwrap().line, "13");
}

#[test]
fn automated_lines_beat_every_default_line() {
    let cfg = seeded(1);
    let rows = generate(&cfg).unwrap();
    let ranking = stats::ranking(&rows);
    let mean = |line: &str| ranking.iter().find(|s| s.line == line).unwrap().mean_rate;

    let default_lines: Vec<&str> = (2..=12)
        .map(|i| cfg.lines[i - 1].as_str())
        .filter(|l| cfg.baseline_for(l) == cfg.default_baseline)
        .collect();
    assert_eq!(default_lines.len(), 11);

    let best_default = default_lines
        .iter()
        .map(|l| mean(l))
        .fold(f64::NEG_INFINITY, f64::max);
    for automated in ["1", "14"] {
        assert!(
            mean(automated) > best_default,
            "line {automated} mean {} not above {best_default}",
            mean(automated)
        );
    }
}

#[test]
fn weekends_are_penalized_on_average() {
    let cfg = SimulationConfig {
        noise_sd: 0.0,
        ..seeded(3)
    };
    let rows = generate(&cfg).unwrap();
    let sat = rows
        .iter()
        .find(|r| r.line == "4" && r.date.weekday() == Weekday::Sat)
        .unwrap();
    let mon = rows
        .iter()
        .find(|r| r.line == "4" && r.date.weekday() == Weekday::Mon)
        .unwrap();
    assert!((mon.rate - sat.rate - cfg.weekend_penalty).abs() < 1e-9);
}

#[test]
fn filter_returns_subset_inside_window() {
    let rows = generate(&seeded(2)).unwrap();
    let window = DateWindow::new(day(2, 1), day(2, 28)).unwrap();
    let sel = Selection::new(["4", "13"], window);
    let Filtered::Ready(data) = filter::apply(&sel, &rows, &[]) else {
        panic!("expected data");
    };
    assert_eq!(data.regularity.len(), 2 * 28);
    assert!(
        data.regularity
            .iter()
            .all(|r| sel.includes_line(&r.line) && window.contains(r.date))
    );
}

#[test]
fn empty_selection_short_circuits() {
    let rows = generate(&seeded(2)).unwrap();
    let sel = Selection::new(Vec::<String>::new(), DateWindow::single(day(3, 1)));
    assert_eq!(
        filter::apply(&sel, &rows, &[]),
        Filtered::NoLines {
            prompt: EMPTY_SELECTION_PROMPT
        }
    );
    let dash = dashboard(AmenitySource::Missing);
    assert_eq!(dash.page(&sel), Page::Prompt(EMPTY_SELECTION_PROMPT.to_string()));
}

#[test]
fn missing_table_keeps_the_rest_of_the_page() {
    let dash = dashboard(AmenitySource::Missing);
    let sel = dash.default_selection(&["1".into(), "4".into(), "13".into()]);
    let Page::Dashboard(page) = dash.page(&sel) else {
        panic!("expected dashboard page");
    };
    assert_eq!(page.kpis.line_count, 3);
    assert_eq!(page.kpis.amenity_count, 0);
    assert_eq!(page.ranking.len(), 3);
    assert_eq!(page.weekly.lines, vec!["1", "4", "13"]);
    assert!(matches!(page.map, MapPanel::FileMissing { .. }));
    assert!(page.map.notice().unwrap().to_string().contains("not found"));
    assert!(page.notices.is_empty());
}

#[test]
fn failed_table_is_reported_not_fatal() {
    let dash = dashboard(AmenitySource::Failed("bad row 3".into()));
    let sel = dash.default_selection(&["1".into()]);
    let Page::Dashboard(page) = dash.page(&sel) else {
        panic!("expected dashboard page");
    };
    assert!(matches!(page.map, MapPanel::LoadFailed(_)));
    assert!(matches!(&page.notices[0], Notice::Error(m) if m.contains("bad row 3")));
    assert!(page.kpis.mean_rate.is_some());
}

#[test]
fn table_lines_drive_the_options() {
    let dash = dashboard(AmenitySource::Loaded(vec![
        amenity("13", "Saint-Denis", Some((48.93, 2.35))),
        amenity("4", "Odéon", None),
        amenity("1", "Bastille", Some((48.85, 2.37))),
    ]));
    assert_eq!(dash.line_options(), vec!["1", "4", "13"]);

    let sel = Selection::new(["4"], dash.calendar());
    let Page::Dashboard(page) = dash.page(&sel) else {
        panic!("expected dashboard page");
    };
    assert!(matches!(page.map, MapPanel::NoCoordinates { .. }));
    assert_eq!(page.map.rows().len(), 1);

    let sel = Selection::new(["1", "4"], dash.calendar());
    let Page::Dashboard(page) = dash.page(&sel) else {
        panic!("expected dashboard page");
    };
    assert!(matches!(page.map, MapPanel::Ready { located: 1, .. }));
    assert_eq!(page.kpis.amenity_count, 2);
}

#[test]
fn window_outside_data_gives_info_notice() {
    let dash = dashboard(AmenitySource::Missing);
    let window = DateWindow::new(day(12, 31), day(12, 31))
        .unwrap()
        .clamp_to(&dash.calendar())
        .unwrap();
    let sel = Selection::new(["99"], window);
    let Page::Dashboard(page) = dash.page(&sel) else {
        panic!("expected dashboard page");
    };
    assert!(page.kpis.mean_rate.is_none());
    assert!(page.ranking.is_empty());
    assert!(matches!(&page.notices[0], Notice::Info(_)));
}

#[test]
fn dispatch_selects_the_view() {
    let dash = dashboard(AmenitySource::Missing);
    let sel = dash.default_selection(&["1".into()]);
    let profile = ProfileConfig::default();
    let portrait = Portrait::Missing {
        path: "profile.jpg".into(),
    };

    let Page::Profile(p) = dispatch(View::Profile, Some(&dash), &sel, &profile, &portrait) else {
        panic!("expected profile page");
    };
    assert_eq!(p.profile, profile);
    assert!(matches!(p.notice, Some(Notice::Warning(_))));

    assert!(matches!(
        dispatch(View::Dashboard, Some(&dash), &sel, &profile, &portrait),
        Page::Dashboard(_)
    ));
}
