use std::fs;
use tempfile::tempdir;
use transit_dash::amenities::AmenitySource;
use transit_dash::dashboard::DashboardPage;
use transit_dash::models::AmenityRecord;
use transit_dash::stats::WeekdayMatrix;
use transit_dash::viz::{self, ChartInput, ChartKind, ChartOptions, LegendMode};
use transit_dash::{Dashboard, Page, Selection, SimulationConfig, generate};

fn fountain(line: &str, station: &str, lat: f64, lon: f64) -> AmenityRecord {
    AmenityRecord {
        line: line.into(),
        station: station.into(),
        address: String::new(),
        municipality: "Paris".into(),
        zone: Some("Oui".into()),
        latitude: Some(lat),
        longitude: Some(lon),
    }
}

fn page(lines: &[&str]) -> Box<DashboardPage> {
    let cfg = SimulationConfig {
        seed: Some(8),
        ..SimulationConfig::default()
    };
    let calendar = cfg.validate().unwrap();
    let dash = Dashboard::new(
        generate(&cfg).unwrap(),
        AmenitySource::Loaded(vec![
            fountain("1", "Bastille", 48.8531, 2.3691),
            fountain("4", "Odéon", 48.8520, 2.3398),
            fountain("13", "Saint-Denis", 48.9356, 2.3539),
        ]),
        "fountains.csv",
        calendar,
    );
    match dash.page(&Selection::new(lines.iter().copied(), calendar)) {
        Page::Dashboard(p) => p,
        other => panic!("expected dashboard page, got {other:?}"),
    }
}

#[test]
fn every_chart_renders_to_svg() {
    let page = page(&["1", "4", "13"]);
    let input = ChartInput::from_page(&page);
    let dir = tempdir().unwrap();
    for (kind, name) in [
        (ChartKind::Timeline, "timeline.svg"),
        (ChartKind::Ranking, "ranking.svg"),
        (ChartKind::WeeklyHeatmap, "weekly.svg"),
        (ChartKind::Map, "map.svg"),
    ] {
        let out = dir.path().join(name);
        viz::render_chart(kind, &input, &out, &ChartOptions::default()).unwrap();
        let svg = fs::read_to_string(&out).unwrap();
        assert!(svg.contains("<svg"), "{name} is not an svg document");
        assert!(svg.len() > 500, "{name} looks empty");
    }
}

#[test]
fn timeline_legend_in_every_placement() {
    let page = page(&["1", "13"]);
    let input = ChartInput::from_page(&page);
    let dir = tempdir().unwrap();
    for legend in [
        LegendMode::Inside,
        LegendMode::Right,
        LegendMode::Top,
        LegendMode::Bottom,
    ] {
        let out = dir.path().join(format!("timeline-{legend:?}.svg"));
        let opts = ChartOptions {
            legend,
            title: "Punctuality".into(),
            ..ChartOptions::default()
        };
        viz::render_chart(ChartKind::Timeline, &input, &out, &opts).unwrap();
        let svg = fs::read_to_string(&out).unwrap();
        assert!(svg.contains("Line 13"));
        assert!(svg.contains("Target 95%"));
    }
}

#[test]
fn single_line_chart_renders() {
    let page = page(&["4"]);
    let input = ChartInput::from_page(&page);
    let dir = tempdir().unwrap();
    for kind in [ChartKind::Ranking, ChartKind::WeeklyHeatmap, ChartKind::Map] {
        let out = dir.path().join(format!("{kind:?}.svg"));
        viz::render_chart(kind, &input, &out, &ChartOptions::default()).unwrap();
        assert!(out.exists());
    }
}

#[test]
fn png_output_is_written() {
    let page = page(&["1", "4"]);
    let dir = tempdir().unwrap();
    let out = dir.path().join("ranking.png");
    viz::render_chart(
        ChartKind::Ranking,
        &ChartInput::from_page(&page),
        &out,
        &ChartOptions::default(),
    )
    .unwrap();
    let bytes = fs::read(&out).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
}

#[test]
fn rgb_buffer_matches_size() {
    let page = page(&["1"]);
    let opts = ChartOptions {
        width: 640,
        height: 400,
        ..ChartOptions::default()
    };
    let input = ChartInput::from_page(&page);
    let buf = viz::render_chart_rgb(ChartKind::Timeline, &input, &opts).unwrap();
    assert_eq!(buf.len(), 640 * 400 * 3);
    assert!(buf.iter().any(|&b| b != 255));
}

#[test]
fn empty_input_fails_without_writing() {
    let weekly = WeekdayMatrix {
        lines: Vec::new(),
        cells: Vec::new(),
    };
    let input = ChartInput {
        regularity: &[],
        ranking: &[],
        weekly: &weekly,
        amenities: &[],
    };
    let dir = tempdir().unwrap();
    for kind in [
        ChartKind::Timeline,
        ChartKind::Ranking,
        ChartKind::WeeklyHeatmap,
        ChartKind::Map,
    ] {
        let out = dir.path().join(format!("{kind:?}.svg"));
        assert!(viz::render_chart(kind, &input, &out, &ChartOptions::default()).is_err());
        assert!(!out.exists());
    }
}

#[test]
fn tiny_canvas_is_rejected() {
    let page = page(&["1"]);
    let opts = ChartOptions {
        width: 50,
        height: 50,
        ..ChartOptions::default()
    };
    let input = ChartInput::from_page(&page);
    let err = viz::render_chart_rgb(ChartKind::Ranking, &input, &opts).unwrap_err();
    assert!(err.to_string().contains("too small"));
}
