//! Horizontal bars of mean punctuality per line, best at the top.

use anyhow::{Result, anyhow, bail};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::types::ChartOptions;
use super::util::{category_axis, format_decimal, left_label_area_px, rdylgn};
use crate::stats::LineScore;

/// Bars are colored on this span of mean rate.
pub const COLOR_SCALE: (f64, f64) = (90.0, 100.0);

/// Bars top to bottom.
#[derive(Debug, Clone)]
pub struct Ranking {
    bars: Vec<(String, f64)>,
    x_lo: f64,
    x_hi: f64,
}

pub fn prepare(scores: &[LineScore]) -> Result<Ranking> {
    let bars: Vec<(String, f64)> = scores
        .iter()
        .filter(|s| s.mean_rate.is_finite())
        .map(|s| (format!("Line {}", s.line), s.mean_rate))
        .collect();
    if bars.is_empty() {
        bail!("no line to rank");
    }
    let lo = bars.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
    Ok(Ranking {
        bars,
        // axis starts five points below the worst line
        x_lo: ((lo - 5.0).floor()).max(0.0),
        x_hi: 102.0,
    })
}

pub fn draw<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    data: &Ranking,
    opts: &ChartOptions,
) -> Result<()> {
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    let n = data.bars.len();
    // row of bar i, counted from the bottom
    let row = |i: usize| n - 1 - i;

    let label_of = |v: &SegmentValue<usize>| match v {
        SegmentValue::Exact(r) | SegmentValue::CenterOf(r) if *r < n => {
            data.bars[row(*r)].0.clone()
        }
        _ => String::new(),
    };
    let left_px = left_label_area_px(data.bars.iter().map(|(l, _)| l.as_str()), 12);
    let title = if opts.title.trim().is_empty() {
        "Mean punctuality by line"
    } else {
        opts.title.trim()
    };

    let mut chart = ChartBuilder::on(&root)
        .margin(16)
        .caption(title, (FontFamily::SansSerif, 24))
        .set_label_area_size(LabelAreaPosition::Left, left_px)
        .set_label_area_size(LabelAreaPosition::Bottom, 48)
        .build_cartesian_2d(data.x_lo..data.x_hi, category_axis(n).into_segmented())
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Mean punctuality (%)")
        .x_labels(10)
        .y_labels(n)
        .x_label_formatter(&|v: &f64| format!("{v:.0}"))
        .y_label_formatter(&label_of)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 16))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let (c_lo, c_hi) = COLOR_SCALE;
    chart
        .draw_series(data.bars.iter().enumerate().map(|(i, (_, v))| {
            let r = row(i);
            let mut bar = Rectangle::new(
                [
                    (data.x_lo, SegmentValue::Exact(r)),
                    (*v, SegmentValue::Exact(r + 1)),
                ],
                rdylgn(*v, c_lo, c_hi).filled(),
            );
            bar.set_margin(4, 4, 0, 0);
            bar
        }))
        .map_err(|e| anyhow!("{:?}", e))?;

    let value_style =
        TextStyle::from((FontFamily::SansSerif, 13)).pos(Pos::new(HPos::Left, VPos::Center));
    chart
        .draw_series(data.bars.iter().enumerate().map(|(i, (_, v))| {
            Text::new(
                format!(" {}", format_decimal(*v, &opts.locale)),
                (*v, SegmentValue::CenterOf(row(i))),
                value_style.clone(),
            )
        }))
        .map_err(|e| anyhow!("{:?}", e))?;

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(line: &str, mean_rate: f64) -> LineScore {
        LineScore {
            line: line.into(),
            mean_rate,
            days: 30,
        }
    }

    #[test]
    fn keeps_ranking_order_and_floors_axis() {
        let r = prepare(&[score("1", 98.2), score("13", 91.7)]).unwrap();
        assert_eq!(r.bars[0].0, "Line 1");
        assert_eq!(r.x_lo, 86.0);
        assert!(r.x_hi > 100.0);
    }

    #[test]
    fn empty_ranking_is_an_error() {
        assert!(prepare(&[]).is_err());
        assert!(prepare(&[score("1", f64::NAN)]).is_err());
    }
}
