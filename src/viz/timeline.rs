//! Daily punctuality per line, with the target drawn as a dashed reference.

use anyhow::{Result, anyhow, bail};
use chrono::{Datelike, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::BTreeMap;

use super::legend::{draw_legend_panel, estimate_top_bottom_legend_height_px};
use super::types::{ChartOptions, LegendMode};
use super::util::{finite_bounds, format_decimal, left_label_area_px, office_color, padded_range};
use crate::models::{RegularityRecord, line_order};

const MARGIN: i32 = 16;

/// Series per line, in line order.
#[derive(Debug, Clone)]
pub struct Timeline {
    series: Vec<(String, Vec<(i32, f64)>)>,
    first_day: i32,
    last_day: i32,
    rate_lo: f64,
    rate_hi: f64,
}

pub fn prepare(records: &[RegularityRecord], target_rate: f64) -> Result<Timeline> {
    let mut groups: BTreeMap<&str, Vec<(i32, f64)>> = BTreeMap::new();
    for r in records.iter().filter(|r| r.rate.is_finite()) {
        groups
            .entry(r.line.as_str())
            .or_default()
            .push((r.date.num_days_from_ce(), r.rate));
    }
    if groups.is_empty() {
        bail!("no punctuality data to plot");
    }
    let mut series: Vec<(String, Vec<(i32, f64)>)> = groups
        .into_iter()
        .map(|(line, mut pts)| {
            pts.sort_by_key(|(d, _)| *d);
            (line.to_string(), pts)
        })
        .collect();
    series.sort_by(|a, b| line_order(&a.0, &b.0));

    let days = series.iter().flat_map(|(_, p)| p.iter().map(|(d, _)| *d));
    let first_day = days.clone().min().unwrap_or_default();
    let last_day = days.max().unwrap_or_default();
    let rates = series.iter().flat_map(|(_, p)| p.iter().map(|(_, r)| *r));
    let (lo, hi) = finite_bounds(rates.chain(std::iter::once(target_rate)))
        .ok_or_else(|| anyhow!("no numeric values to plot"))?;
    let (rate_lo, rate_hi) = padded_range(lo, hi, 0.5);
    Ok(Timeline {
        series,
        first_day,
        last_day,
        rate_lo,
        rate_hi,
    })
}

fn day_label(x: &f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn series_label(line: &str) -> String {
    format!("Line {line}")
}

pub fn draw<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    data: &Timeline,
    opts: &ChartOptions,
) -> Result<()> {
    let (mut x_min, mut x_max) = (data.first_day as f64, data.last_day as f64);
    if data.first_day == data.last_day {
        x_min -= 1.0;
        x_max += 1.0;
    }

    let y_label_fmt = |v: &f64| format_decimal(*v, &opts.locale);
    let left_px = left_label_area_px(
        [
            y_label_fmt(&data.rate_lo).as_str(),
            y_label_fmt(&data.rate_hi).as_str(),
        ],
        12,
    );
    let axis_x_start_px = MARGIN + left_px as i32;

    let labels: Vec<String> = data.series.iter().map(|(l, _)| series_label(l)).collect();
    let (root_w, root_h) = root.dim_in_pixel();
    let (root_w, root_h) = (root_w as i32, root_h as i32);

    let (plot_area, legend_area) = match opts.legend {
        LegendMode::Right => {
            let (plot, legend) = root.split_horizontally((85).percent_width());
            (plot, Some(legend))
        }
        LegendMode::Top => {
            let h = estimate_top_bottom_legend_height_px(&labels, axis_x_start_px, root_w);
            let (legend, plot) = root.split_vertically(h);
            (plot, Some(legend))
        }
        LegendMode::Bottom => {
            let h = estimate_top_bottom_legend_height_px(&labels, axis_x_start_px, root_w);
            let (plot, legend) = root.split_vertically((root_h - h).max(40));
            (plot, Some(legend))
        }
        LegendMode::Inside => (root, None),
    };
    plot_area.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let title = if opts.title.trim().is_empty() {
        "Daily punctuality by line"
    } else {
        opts.title.trim()
    };
    let mut chart = ChartBuilder::on(&plot_area)
        .margin(MARGIN as u32)
        .caption(title, (FontFamily::SansSerif, 24))
        .set_label_area_size(LabelAreaPosition::Left, left_px)
        .set_label_area_size(LabelAreaPosition::Bottom, 48)
        .build_cartesian_2d(x_min..x_max, data.rate_lo..data.rate_hi)
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Punctuality (%)")
        .x_labels(8)
        .y_labels(10)
        .x_label_formatter(&day_label)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 16))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let mut legend_items: Vec<(String, RGBAColor)> = Vec::new();
    for (idx, ((_, points), label)) in data.series.iter().zip(labels).enumerate() {
        let color = office_color(idx);
        let style = ShapeStyle {
            color,
            filled: false,
            stroke_width: 2,
        };
        let elem = chart
            .draw_series(LineSeries::new(
                points.iter().map(|(d, r)| (*d as f64, *r)),
                style,
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
        if legend_area.is_none() {
            elem.label(label.clone()).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(3))
            });
        }
        legend_items.push((label, color));
    }

    let target = opts.target_rate;
    chart
        .draw_series(DashedLineSeries::new(
            vec![(x_min, target), (x_max, target)],
            10,
            6,
            BLACK.mix(0.7).stroke_width(2),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    let annotation =
        TextStyle::from((FontFamily::SansSerif, 14)).pos(Pos::new(HPos::Right, VPos::Bottom));
    chart
        .draw_series(std::iter::once(Text::new(
            format!("Target {}%", format_target(target)),
            (x_max, target),
            annotation,
        )))
        .map_err(|e| anyhow!("{:?}", e))?;

    match &legend_area {
        None => chart
            .configure_series_labels()
            .border_style(BLACK)
            .position(SeriesLabelPosition::LowerLeft)
            .background_style(WHITE.mix(0.85))
            .label_font((FontFamily::SansSerif, 14))
            .draw()
            .map_err(|e| anyhow!("{:?}", e))?,
        Some(area) => draw_legend_panel(area, &legend_items, opts.legend, axis_x_start_px)?,
    }

    plot_area.present().map_err(|e| anyhow!("{:?}", e))?;
    if let Some(area) = &legend_area {
        area.present().map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}

/// `95` for whole targets, `97.5` otherwise.
fn format_target(t: f64) -> String {
    if t.fract() == 0.0 {
        format!("{t:.0}")
    } else {
        format!("{t}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(day: u32, line: &str, rate: f64) -> RegularityRecord {
        RegularityRecord::new(NaiveDate::from_ymd_opt(2023, 1, day).unwrap(), line, rate, 1)
    }

    #[test]
    fn series_follow_line_order_and_include_target() {
        let rows = vec![rec(2, "13", 91.0), rec(1, "4", 96.0), rec(1, "13", 92.0)];
        let t = prepare(&rows, 95.0).unwrap();
        let lines: Vec<&str> = t.series.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(lines, vec!["4", "13"]);
        assert!(t.series[1].1[0].0 < t.series[1].1[1].0);
        assert!(t.rate_lo <= 90.5 && t.rate_hi >= 96.5);

        let high = prepare(&[rec(1, "1", 99.0)], 95.0).unwrap();
        assert!(high.rate_lo <= 95.0);
    }

    #[test]
    fn nothing_to_plot_is_an_error() {
        assert!(prepare(&[], 95.0).is_err());
    }

    #[test]
    fn target_label() {
        assert_eq!(format_target(95.0), "95");
        assert_eq!(format_target(97.5), "97.5");
        assert_eq!(day_label(&(rec(3, "1", 1.0).date.num_days_from_ce() as f64)), "2023-01-03");
    }
}
