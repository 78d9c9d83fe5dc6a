//! transit_dash
//!
//! A small library behind a profile page and a transit punctuality dashboard. Pairs with the
//! `tdash` CLI and the `tdash-gui` desktop app.
//!
//! ### Features
//! - Simulate daily punctuality and ridership per line over a calendar
//! - Load the semicolon-delimited station amenity table (missing file is not an error)
//! - Filter by line and date window, rank lines, pivot by weekday
//! - Render timeline, ranking, weekly heatmap and amenity map charts to SVG/PNG
//! - Export records as CSV or JSON
//!
//! ### Example
//! ```no_run
//! use transit_dash::{AppConfig, DataCache, Dashboard, Page, viz};
//!
//! let config = AppConfig::default();
//! let mut cache = DataCache::default();
//! let dashboard = Dashboard::from_cache(&mut cache, &config)?;
//! let selection = dashboard.default_selection(&config.default_lines);
//! if let Page::Dashboard(page) = dashboard.page(&selection) {
//!     println!("{:#?}", page.kpis);
//!     viz::render_chart(
//!         viz::ChartKind::Ranking,
//!         &viz::ChartInput::from_page(&page),
//!         "ranking.svg",
//!         &viz::ChartOptions::default(),
//!     )?;
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod amenities;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod models;
pub mod profile;
pub mod simulate;
pub mod stats;
pub mod storage;
pub mod viz;

pub use amenities::{AmenityLoad, AmenitySource, load_amenities};
pub use cache::DataCache;
pub use config::AppConfig;
pub use dashboard::{Dashboard, Page, Tab, View, dispatch};
pub use error::{ConfigError, LoadError};
pub use models::{AmenityRecord, DateWindow, RegularityRecord, Selection};
pub use simulate::{SimulationConfig, generate};
