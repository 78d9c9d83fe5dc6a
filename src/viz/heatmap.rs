//! Line x weekday grid of mean punctuality.

use anyhow::{Result, anyhow, bail};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::types::ChartOptions;
use super::util::{category_axis, contrast_text, format_decimal, left_label_area_px, rdylgn};
use crate::stats::WeekdayMatrix;

const EMPTY_CELL: RGBColor = RGBColor(235, 235, 235);

/// Pivot plus the span its colors are scaled on.
#[derive(Debug, Clone, Copy)]
pub struct Heatmap<'a> {
    matrix: &'a WeekdayMatrix,
    lo: f64,
    hi: f64,
}

pub fn prepare(matrix: &WeekdayMatrix) -> Result<Heatmap<'_>> {
    if matrix.is_empty() {
        bail!("no weekly data to plot");
    }
    let (lo, hi) = matrix
        .value_range()
        .ok_or_else(|| anyhow!("no numeric values to plot"))?;
    Ok(Heatmap { matrix, lo, hi })
}

pub fn draw<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    data: &Heatmap<'_>,
    opts: &ChartOptions,
) -> Result<()> {
    let Heatmap { matrix, lo, hi } = *data;
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    let rows = matrix.lines.len();
    let columns = WeekdayMatrix::columns();
    // first line on the top row
    let y_of = |r: usize| rows - 1 - r;

    let row_labels: Vec<String> = matrix.lines.iter().map(|l| format!("Line {l}")).collect();
    let x_label = |v: &SegmentValue<usize>| match v {
        SegmentValue::Exact(c) | SegmentValue::CenterOf(c) if *c < columns.len() => {
            columns[*c].to_string()
        }
        _ => String::new(),
    };
    let y_label = |v: &SegmentValue<usize>| match v {
        SegmentValue::Exact(y) | SegmentValue::CenterOf(y) if *y < rows => {
            row_labels[rows - 1 - *y].clone()
        }
        _ => String::new(),
    };
    let title = if opts.title.trim().is_empty() {
        "Mean punctuality by weekday"
    } else {
        opts.title.trim()
    };

    let mut chart = ChartBuilder::on(&root)
        .margin(16)
        .caption(title, (FontFamily::SansSerif, 24))
        .set_label_area_size(
            LabelAreaPosition::Left,
            left_label_area_px(row_labels.iter().map(String::as_str), 12),
        )
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(
            category_axis(columns.len()).into_segmented(),
            category_axis(rows).into_segmented(),
        )
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(columns.len())
        .y_labels(rows)
        .x_label_formatter(&x_label)
        .y_label_formatter(&y_label)
        .label_style((FontFamily::SansSerif, 12))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let cells: Vec<(usize, usize, Option<f64>)> = matrix
        .cells
        .iter()
        .enumerate()
        .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, v)| (r, c, *v)))
        .collect();

    chart
        .draw_series(cells.iter().map(|&(r, c, v)| {
            let fill = v.map_or(EMPTY_CELL, |v| rdylgn(v, lo, hi));
            let mut rect = Rectangle::new(
                [
                    (SegmentValue::Exact(c), SegmentValue::Exact(y_of(r))),
                    (SegmentValue::Exact(c + 1), SegmentValue::Exact(y_of(r) + 1)),
                ],
                fill.filled(),
            );
            rect.set_margin(1, 1, 1, 1);
            rect
        }))
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .draw_series(cells.iter().filter_map(|&(r, c, v)| {
            let v = v?;
            let mut style = TextStyle::from((FontFamily::SansSerif, 13))
                .pos(Pos::new(HPos::Center, VPos::Center));
            style.color = contrast_text(rdylgn(v, lo, hi)).to_backend_color();
            Some(Text::new(
                format_decimal(v, &opts.locale),
                (SegmentValue::CenterOf(c), SegmentValue::CenterOf(y_of(r))),
                style,
            ))
        }))
        .map_err(|e| anyhow!("{:?}", e))?;

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_matrix_is_an_error() {
        let m = WeekdayMatrix {
            lines: vec![],
            cells: vec![],
        };
        assert!(prepare(&m).is_err());
    }

    #[test]
    fn range_spans_filled_cells() {
        let m = WeekdayMatrix {
            lines: vec!["1".into()],
            cells: vec![[Some(97.0), None, None, None, None, Some(95.5), None]],
        };
        let h = prepare(&m).unwrap();
        assert_eq!((h.lo, h.hi), (95.5, 97.0));
    }
}
