//! Amenity locations as a longitude/latitude scatter.

use anyhow::{Result, anyhow, bail};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;

use super::types::ChartOptions;
use super::util::{MAP_POINT, finite_bounds};
use crate::models::AmenityRecord;

/// Located points and the padded view box.
#[derive(Debug, Clone)]
pub struct MapPoints {
    points: Vec<(f64, f64)>,
    lon: (f64, f64),
    lat: (f64, f64),
}

fn pad((lo, hi): (f64, f64)) -> (f64, f64) {
    let p = ((hi - lo) * 0.05).max(0.005);
    (lo - p, hi + p)
}

pub fn prepare(amenities: &[AmenityRecord]) -> Result<MapPoints> {
    let points: Vec<(f64, f64)> = amenities.iter().filter_map(|a| a.coordinates()).collect();
    if points.is_empty() {
        bail!("no amenity with coordinates to plot");
    }
    let lon = finite_bounds(points.iter().map(|p| p.0)).ok_or_else(|| anyhow!("bad longitudes"))?;
    let lat = finite_bounds(points.iter().map(|p| p.1)).ok_or_else(|| anyhow!("bad latitudes"))?;
    Ok(MapPoints {
        points,
        lon: pad(lon),
        lat: pad(lat),
    })
}

pub fn draw<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    data: &MapPoints,
    opts: &ChartOptions,
) -> Result<()> {
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    let title = if opts.title.trim().is_empty() {
        format!("Amenities ({} located)", data.points.len())
    } else {
        opts.title.trim().to_string()
    };
    let coord_fmt = |v: &f64| format!("{v:.3}");

    let mut chart = ChartBuilder::on(&root)
        .margin(16)
        .caption(title, (FontFamily::SansSerif, 24))
        .set_label_area_size(LabelAreaPosition::Left, 64)
        .set_label_area_size(LabelAreaPosition::Bottom, 48)
        .build_cartesian_2d(data.lon.0..data.lon.1, data.lat.0..data.lat.1)
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .configure_mesh()
        .x_desc("Longitude")
        .y_desc("Latitude")
        .x_labels(6)
        .y_labels(6)
        .x_label_formatter(&coord_fmt)
        .y_label_formatter(&coord_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 16))
        .light_line_style(BLACK.mix(0.05))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .draw_series(
            data.points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 5, MAP_POINT.mix(0.8).filled())),
        )
        .map_err(|e| anyhow!("{:?}", e))?;

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}
