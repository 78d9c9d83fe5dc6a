//! View state and the render dispatch.
//!
//! The front ends keep an explicit [`View`] and a [`Selection`], and ask [`dispatch`] for the
//! [`Page`] to draw. Everything a page shows is computed here, so the GUI and CLI only format.

use crate::amenities::AmenitySource;
use crate::cache::DataCache;
use crate::config::AppConfig;
use crate::error::ConfigError;
use crate::filter::{self, Filtered, FilteredData};
use crate::models::{AmenityRecord, DateWindow, RegularityRecord, Selection, sort_lines};
use crate::profile::{Portrait, ProfileConfig};
use crate::stats::{self, Kpis, LineScore, WeekdayMatrix};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Which page is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum View {
    #[default]
    Profile,
    Dashboard,
}

/// Dashboard tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tab {
    #[default]
    Timeline,
    Ranking,
    Weekly,
    Map,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Timeline, Tab::Ranking, Tab::Weekly, Tab::Map];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Timeline => "Punctuality over time",
            Tab::Ranking => "Line ranking",
            Tab::Weekly => "Weekly heatmap",
            Tab::Map => "Amenity map",
        }
    }
}

/// User-facing message attached to a page; never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warning(String),
    Error(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Info(m) => write!(f, "info: {m}"),
            Notice::Warning(m) => write!(f, "warning: {m}"),
            Notice::Error(m) => write!(f, "error: {m}"),
        }
    }
}

/// State of the map tab.
#[derive(Debug, Clone, PartialEq)]
pub enum MapPanel {
    FileMissing { path: PathBuf },
    LoadFailed(String),
    /// The table loaded but lists nothing for the selected lines.
    NoAmenities,
    /// Rows exist but none carries coordinates.
    NoCoordinates { rows: Vec<AmenityRecord> },
    Ready {
        located: usize,
        rows: Vec<AmenityRecord>,
    },
}

impl MapPanel {
    pub fn notice(&self) -> Option<Notice> {
        match self {
            MapPanel::FileMissing { path } => Some(Notice::Error(format!(
                "Amenity table '{}' not found. Place it next to the application.",
                path.display()
            ))),
            MapPanel::LoadFailed(msg) => Some(Notice::Error(msg.clone())),
            MapPanel::NoAmenities => Some(Notice::Info(
                "No amenity is listed for the selected lines.".into(),
            )),
            MapPanel::NoCoordinates { .. } => Some(Notice::Warning(
                concat!(
                    "Coordinates are missing for these lines ",
                    "(check the Latitude and Longitude columns)."
                )
                .into(),
            )),
            MapPanel::Ready { .. } => None,
        }
    }

    /// Rows for the detail table.
    pub fn rows(&self) -> &[AmenityRecord] {
        match self {
            MapPanel::NoCoordinates { rows } | MapPanel::Ready { rows, .. } => rows,
            _ => &[],
        }
    }
}

/// Everything the dashboard view displays for one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardPage {
    pub lines: Vec<String>,
    pub window: DateWindow,
    pub kpis: Kpis,
    pub data: FilteredData,
    pub ranking: Vec<LineScore>,
    pub weekly: WeekdayMatrix,
    pub map: MapPanel,
    /// Page-level messages (load failures, empty period).
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfilePage {
    pub profile: ProfileConfig,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Profile(ProfilePage),
    /// Nothing to compute yet; show the prompt.
    Prompt(String),
    Dashboard(Box<DashboardPage>),
    /// The data could not be built (invalid simulation settings).
    Unavailable(String),
}

/// Both data sets plus what is needed to describe them.
#[derive(Debug, Clone)]
pub struct Dashboard {
    regularity: Vec<RegularityRecord>,
    amenities: AmenitySource,
    data_path: PathBuf,
    calendar: DateWindow,
}

impl Dashboard {
    pub fn new(
        regularity: Vec<RegularityRecord>,
        amenities: AmenitySource,
        data_path: impl Into<PathBuf>,
        calendar: DateWindow,
    ) -> Self {
        Self {
            regularity,
            amenities,
            data_path: data_path.into(),
            calendar,
        }
    }

    /// Build from the caches; only regenerates or reloads what changed.
    pub fn from_cache(cache: &mut DataCache, config: &AppConfig) -> Result<Self, ConfigError> {
        let calendar = config.simulation.validate()?;
        let regularity = cache.simulation(&config.simulation)?.to_vec();
        let data_path = config.resolved_data_path();
        let amenities = cache.amenities(&data_path).clone();
        Ok(Self::new(regularity, amenities, data_path, calendar))
    }

    pub fn regularity(&self) -> &[RegularityRecord] {
        &self.regularity
    }

    pub fn amenities(&self) -> &AmenitySource {
        &self.amenities
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Full simulated period; bounds of the date picker.
    pub fn calendar(&self) -> DateWindow {
        self.calendar
    }

    /// Lines offered in the multi-select: those of the amenity table when it has any,
    /// otherwise the simulated ones.
    pub fn line_options(&self) -> Vec<String> {
        let from_table: BTreeSet<&str> = self
            .amenities
            .records()
            .iter()
            .map(|a| a.line.as_str())
            .filter(|l| !l.is_empty())
            .collect();
        let set: BTreeSet<&str> = if from_table.is_empty() {
            self.regularity.iter().map(|r| r.line.as_str()).collect()
        } else {
            from_table
        };
        let mut out: Vec<String> = set.into_iter().map(str::to_string).collect();
        sort_lines(&mut out);
        out
    }

    /// Configured default lines that are actually offered, over the whole calendar.
    pub fn default_selection(&self, defaults: &[String]) -> Selection {
        let options = self.line_options();
        Selection::new(
            defaults.iter().filter(|l| options.contains(*l)).cloned(),
            self.calendar,
        )
    }

    fn map_panel(&self, rows: Vec<AmenityRecord>) -> MapPanel {
        match &self.amenities {
            AmenitySource::Missing => MapPanel::FileMissing {
                path: self.data_path.clone(),
            },
            AmenitySource::Failed(msg) => MapPanel::LoadFailed(msg.clone()),
            AmenitySource::Loaded(_) if rows.is_empty() => MapPanel::NoAmenities,
            AmenitySource::Loaded(_) => {
                let located = rows.iter().filter(|a| a.coordinates().is_some()).count();
                if located == 0 {
                    MapPanel::NoCoordinates { rows }
                } else {
                    MapPanel::Ready { located, rows }
                }
            }
        }
    }

    /// Compute the dashboard page for a selection.
    pub fn page(&self, selection: &Selection) -> Page {
        let data = match filter::apply(selection, &self.regularity, self.amenities.records()) {
            Filtered::NoLines { prompt } => return Page::Prompt(prompt.to_string()),
            Filtered::Ready(data) => data,
        };

        let mut notices = Vec::new();
        if let AmenitySource::Failed(msg) = &self.amenities {
            notices.push(Notice::Error(format!("Amenity table unavailable: {msg}")));
        }
        if data.regularity.is_empty() {
            notices.push(Notice::Info(
                "No punctuality data in the selected period.".into(),
            ));
        }

        let lines = selection.sorted_lines();
        let kpis = stats::kpis(&data, lines.len());
        let ranking = stats::ranking(&data.regularity);
        let weekly = stats::weekday_matrix(&data.regularity);
        let map = self.map_panel(data.amenities.clone());

        Page::Dashboard(Box::new(DashboardPage {
            lines,
            window: selection.window,
            kpis,
            data,
            ranking,
            weekly,
            map,
            notices,
        }))
    }
}

/// Shown on the dashboard view when no [`Dashboard`] could be built.
pub const DATA_UNAVAILABLE: &str = "Dashboard data is unavailable; check the simulation settings.";

/// The profile page; needs no data.
pub fn profile_page(profile: &ProfileConfig, portrait: &Portrait) -> ProfilePage {
    ProfilePage {
        profile: profile.clone(),
        notice: portrait.warning().map(Notice::Warning),
    }
}

/// Render dispatch: the page for the current view.
///
/// `dashboard` is `None` when the data could not be built; the profile still renders.
pub fn dispatch(
    view: View,
    dashboard: Option<&Dashboard>,
    selection: &Selection,
    profile: &ProfileConfig,
    portrait: &Portrait,
) -> Page {
    match (view, dashboard) {
        (View::Profile, _) => Page::Profile(profile_page(profile, portrait)),
        (View::Dashboard, Some(dashboard)) => dashboard.page(selection),
        (View::Dashboard, None) => Page::Unavailable(DATA_UNAVAILABLE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, m, day).unwrap()
    }

    fn calendar() -> DateWindow {
        DateWindow::new(d(1, 1), d(1, 31)).unwrap()
    }

    fn amenity(line: &str, coords: bool) -> AmenityRecord {
        AmenityRecord {
            line: line.into(),
            station: "S".into(),
            address: "A".into(),
            municipality: "Paris".into(),
            zone: None,
            latitude: coords.then_some(48.85),
            longitude: coords.then_some(2.35),
        }
    }

    fn regularity() -> Vec<RegularityRecord> {
        calendar()
            .iter_days()
            .flat_map(|day| {
                ["1", "4", "13"]
                    .into_iter()
                    .map(move |l| RegularityRecord::new(day, l, 95.0, 1))
            })
            .collect()
    }

    #[test]
    fn line_options_prefer_the_table() {
        let with_table = Dashboard::new(
            regularity(),
            AmenitySource::Loaded(vec![amenity("14", true), amenity("2", true)]),
            "t.csv",
            calendar(),
        );
        assert_eq!(with_table.line_options(), vec!["2", "14"]);

        let missing = Dashboard::new(regularity(), AmenitySource::Missing, "t.csv", calendar());
        assert_eq!(missing.line_options(), vec!["1", "4", "13"]);
        let sel = missing.default_selection(&["1".into(), "99".into()]);
        assert_eq!(sel.sorted_lines(), vec!["1"]);
        assert_eq!(sel.window, calendar());
    }

    #[test]
    fn map_panel_states() {
        let sel = Selection::new(["1"], calendar());

        let missing = Dashboard::new(regularity(), AmenitySource::Missing, "t.csv", calendar());
        let Page::Dashboard(page) = missing.page(&sel) else {
            panic!("expected dashboard page")
        };
        assert!(matches!(page.map, MapPanel::FileMissing { .. }));
        assert_eq!(page.kpis.amenity_count, 0);

        let none = Dashboard::new(
            regularity(),
            AmenitySource::Loaded(vec![amenity("4", true)]),
            "t.csv",
            calendar(),
        );
        let Page::Dashboard(page) = none.page(&sel) else {
            panic!("expected dashboard page")
        };
        assert_eq!(page.map, MapPanel::NoAmenities);

        let no_coords = Dashboard::new(
            regularity(),
            AmenitySource::Loaded(vec![amenity("1", false)]),
            "t.csv",
            calendar(),
        );
        let Page::Dashboard(page) = no_coords.page(&sel) else {
            panic!("expected dashboard page")
        };
        assert!(matches!(page.map, MapPanel::NoCoordinates { .. }));
        assert_eq!(page.map.rows().len(), 1);

        let failed = Dashboard::new(
            regularity(),
            AmenitySource::Failed("bad".into()),
            "t.csv",
            calendar(),
        );
        let Page::Dashboard(page) = failed.page(&sel) else {
            panic!("expected dashboard page")
        };
        assert_eq!(page.map, MapPanel::LoadFailed("bad".into()));
        assert!(matches!(page.notices[0], Notice::Error(_)));
        // the rest of the page is still computed
        assert_eq!(page.kpis.mean_rate, Some(95.0));
    }

    #[test]
    fn dispatch_follows_view() {
        let dash = Dashboard::new(regularity(), AmenitySource::Missing, "t.csv", calendar());
        let empty = Selection::new(Vec::<String>::new(), calendar());
        let portrait = Portrait::Missing {
            path: "profile.jpg".into(),
        };
        let profile = ProfileConfig::default();

        match dispatch(View::Profile, Some(&dash), &empty, &profile, &portrait) {
            Page::Profile(p) => assert!(matches!(p.notice, Some(Notice::Warning(_)))),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            dispatch(View::Dashboard, Some(&dash), &empty, &profile, &portrait),
            Page::Prompt(_)
        ));
    }

    #[test]
    fn profile_renders_without_data() {
        let empty = Selection::new(Vec::<String>::new(), calendar());
        let portrait = Portrait::Missing {
            path: "profile.jpg".into(),
        };
        let profile = ProfileConfig::default();

        match dispatch(View::Profile, None, &empty, &profile, &portrait) {
            Page::Profile(p) => assert_eq!(p.profile, profile),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            dispatch(View::Dashboard, None, &empty, &profile, &portrait),
            Page::Unavailable(DATA_UNAVAILABLE.to_string())
        );
    }

    #[test]
    fn period_without_data_is_flagged() {
        let dash = Dashboard::new(regularity(), AmenitySource::Missing, "t.csv", calendar());
        let sel = Selection::new(["1"], DateWindow::new(d(3, 1), d(3, 2)).unwrap());
        let Page::Dashboard(page) = dash.page(&sel) else {
            panic!("expected dashboard page")
        };
        assert!(page.data.regularity.is_empty());
        assert_eq!(page.kpis.mean_rate, None);
        assert!(page.notices.iter().any(|n| matches!(n, Notice::Info(_))));
    }
}
