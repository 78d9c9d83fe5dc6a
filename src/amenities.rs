//! Loader for the static, semicolon-delimited amenity table.
//!
//! A missing file is an expected state and yields [`AmenityLoad::Missing`]. Anything else that
//! goes wrong while reading or parsing is reported as a [`LoadError`].

use crate::error::LoadError;
use crate::models::AmenityRecord;
use csv::{ReaderBuilder, Trim};
use log::{error, info, warn};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::io;
use std::path::Path;

/// Default file name, expected next to the application.
pub const DEFAULT_FILE_NAME: &str = "fontaines-a-eau-dans-le-reseau-ratp.csv";

/// Outcome of a successful load attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AmenityLoad {
    /// The file does not exist; downstream views show an empty state.
    Missing,
    Loaded(Vec<AmenityRecord>),
}

impl AmenityLoad {
    pub fn records(&self) -> &[AmenityRecord] {
        match self {
            AmenityLoad::Missing => &[],
            AmenityLoad::Loaded(rows) => rows,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, AmenityLoad::Missing)
    }
}

/// What the dashboard knows about the amenity table after a load attempt.
///
/// Read or parse failures are kept as a message so the rest of the page stays usable.
#[derive(Debug, Clone, PartialEq)]
pub enum AmenitySource {
    Missing,
    Loaded(Vec<AmenityRecord>),
    Failed(String),
}

impl AmenitySource {
    pub fn records(&self) -> &[AmenityRecord] {
        match self {
            AmenitySource::Loaded(rows) => rows,
            AmenitySource::Missing | AmenitySource::Failed(_) => &[],
        }
    }

    /// Rows are available (possibly zero of them).
    pub fn is_available(&self) -> bool {
        matches!(self, AmenitySource::Loaded(_))
    }
}

impl From<Result<AmenityLoad, LoadError>> for AmenitySource {
    fn from(result: Result<AmenityLoad, LoadError>) -> Self {
        match result {
            Ok(AmenityLoad::Missing) => AmenitySource::Missing,
            Ok(AmenityLoad::Loaded(rows)) => AmenitySource::Loaded(rows),
            Err(e) => {
                error!("{e}");
                AmenitySource::Failed(e.to_string())
            }
        }
    }
}

/// Row as it appears in the published data set (French headers, capitalized coordinates).
#[derive(Debug, Deserialize)]
struct RawAmenity {
    #[serde(rename = "Ligne", alias = "ligne", alias = "line")]
    line: String,
    #[serde(rename = "Station ou Gare", alias = "Station", alias = "station", default)]
    station: String,
    #[serde(rename = "Adresse", alias = "address", default)]
    address: String,
    #[serde(rename = "Commune", alias = "municipality", default)]
    municipality: String,
    #[serde(rename = "En zone contrôlée ou non", alias = "zone", default)]
    zone: Option<String>,
    #[serde(
        rename = "Latitude",
        alias = "latitude",
        default,
        deserialize_with = "de_coordinate"
    )]
    latitude: Option<f64>,
    #[serde(
        rename = "Longitude",
        alias = "longitude",
        default,
        deserialize_with = "de_coordinate"
    )]
    longitude: Option<f64>,
    /// Open-data exports sometimes carry only a combined "lat, lon" column.
    #[serde(rename = "geo_point_2d", default)]
    geo_point: Option<String>,
}

impl From<RawAmenity> for AmenityRecord {
    fn from(raw: RawAmenity) -> Self {
        let (latitude, longitude) = match (raw.latitude, raw.longitude) {
            (None, None) => raw
                .geo_point
                .as_deref()
                .and_then(split_geo_point)
                .map(|(lat, lon)| (Some(lat), Some(lon)))
                .unwrap_or((None, None)),
            pair => pair,
        };
        Self {
            line: raw.line.trim().to_string(),
            station: raw.station,
            address: raw.address,
            municipality: raw.municipality,
            zone: raw.zone.filter(|z| !z.trim().is_empty()),
            latitude,
            longitude,
        }
    }
}

/// Parse a coordinate accepting both `48.85` and `48,85`; empty cells become `None`.
fn de_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .replace(',', ".")
            .parse::<f64>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid coordinate {s:?}: {e}"))),
    }
}

fn split_geo_point(s: &str) -> Option<(f64, f64)> {
    let (lat, lon) = s.split_once(',')?;
    Some((lat.trim().parse().ok()?, lon.trim().parse().ok()?))
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
}

/// Parse amenity rows from any reader (semicolon-delimited, header row required).
pub fn parse_amenities<R: io::Read>(reader: R) -> Result<Vec<AmenityRecord>, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b';')
        .trim(Trim::All)
        .from_reader(reader);
    let mut out = Vec::new();
    for row in rdr.deserialize::<RawAmenity>() {
        out.push(row?.into());
    }
    Ok(out)
}

/// Load the amenity table at `path`.
pub fn load_amenities<P: AsRef<Path>>(path: P) -> Result<AmenityLoad, LoadError> {
    let path = path.as_ref();
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("amenity table {} not found; continuing without it", path.display());
            return Ok(AmenityLoad::Missing);
        }
        Err(source) => {
            return Err(LoadError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let rows = parse_amenities(strip_bom(&bytes)).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        record: source.position().map(|p| p.record()),
        source,
    })?;
    info!("loaded {} amenities from {}", rows.len(), path.display());
    Ok(AmenityLoad::Loaded(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Ligne;Station ou Gare;Adresse;Commune;En zone contrôlée ou non;Latitude;Longitude
1;Bastille;Place de la Bastille;Paris;Oui;48.8531;2.3691
14; Châtelet ;1 rue de Rivoli;Paris;Non;48,8584;2,3470
4;Montparnasse;Boulevard de Vaugirard;Paris;;;
";

    #[test]
    fn parses_published_headers() {
        let rows = parse_amenities(SAMPLE.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].line, "1");
        assert_eq!(rows[0].zone.as_deref(), Some("Oui"));
        assert_eq!(rows[0].coordinates(), Some((2.3691, 48.8531)));
        // trimmed cells and comma decimals
        assert_eq!(rows[1].station, "Châtelet");
        assert_eq!(rows[1].latitude, Some(48.8584));
        // empty coordinates and zone
        assert_eq!(rows[2].zone, None);
        assert_eq!(rows[2].coordinates(), None);
    }

    #[test]
    fn accepts_english_headers_and_geo_point() {
        let text = "line;station;geo_point_2d\n7;Opéra;\"48.8712, 2.3316\"\n";
        let rows = parse_amenities(text.as_bytes()).unwrap();
        assert_eq!(rows[0].line, "7");
        assert_eq!(rows[0].address, "");
        assert_eq!(rows[0].coordinates(), Some((2.3316, 48.8712)));
    }

    #[test]
    fn missing_line_column_is_an_error() {
        let text = "Station ou Gare;Adresse\nBastille;Place\n";
        assert!(parse_amenities(text.as_bytes()).is_err());
    }

    #[test]
    fn bom_is_ignored() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice(SAMPLE.as_bytes());
        let rows = parse_amenities(strip_bom(&bytes)).unwrap();
        assert_eq!(rows.len(), 3);
    }
}
