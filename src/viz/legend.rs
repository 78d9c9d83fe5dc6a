//! External legend layout and drawing.
//!
//! Right: one column of entries. Top/Bottom: entries flow left to right starting at the plot's
//! x-axis and wrap into rows; labels longer than a third of the band are truncated.
//! The height estimator and the painter share [`flow_rows`] so the band never clips.

use anyhow::{Result, anyhow};
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::text::{estimate_text_width_px, truncate_to_width};
use super::types::LegendMode;

const FONT_PX: u32 = 14;
const LINE_H: i32 = FONT_PX as i32 + 6;
const PAD: i32 = 8;
const SWATCH_W: i32 = 18;
const SWATCH_GAP: i32 = 6;
const ITEM_GAP: i32 = 16;

/// Label as drawn plus its block width (swatch, gap, text, trailing gap).
fn fitted(label: &str, cap_px: i32) -> (String, i32) {
    let text = truncate_to_width(label, FONT_PX, cap_px.max(24) as u32);
    let w = SWATCH_W + SWATCH_GAP + estimate_text_width_px(&text, FONT_PX) as i32 + ITEM_GAP;
    (text, w)
}

/// Greedy row packing for a band of `total_w` pixels whose first column starts at `start_x`.
/// Returns rows of `(item index, text to draw, x offset)`.
pub fn flow_rows(labels: &[String], start_x: i32, total_w: i32) -> Vec<Vec<(usize, String, i32)>> {
    let usable = (total_w - PAD).max(start_x + 60);
    let cap = ((usable - start_x) / 3).max(120);
    let mut rows: Vec<Vec<(usize, String, i32)>> = Vec::new();
    let mut cur = Vec::new();
    let mut x = start_x;
    for (i, label) in labels.iter().enumerate() {
        let (text, w) = fitted(label, cap);
        if x + w > usable && !cur.is_empty() {
            rows.push(std::mem::take(&mut cur));
            x = start_x;
        }
        cur.push((i, text, x));
        x += w;
    }
    if !cur.is_empty() {
        rows.push(cur);
    }
    rows
}

/// Pixel height a Top/Bottom band needs for `labels`.
pub fn estimate_top_bottom_legend_height_px(labels: &[String], start_x: i32, total_w: i32) -> i32 {
    let rows = flow_rows(labels, start_x, total_w).len().max(1) as i32;
    2 * PAD + rows * LINE_H
}

fn swatch<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    x: i32,
    center_y: i32,
    color: RGBAColor,
) -> Result<()> {
    area.draw(&PathElement::new(
        vec![(x, center_y), (x + SWATCH_W, center_y)],
        color.stroke_width(3),
    ))
    .map_err(|e| anyhow!("{:?}", e))
}

/// Draw the legend entries of `items` into `legend_area`.
pub fn draw_legend_panel<DB: DrawingBackend>(
    legend_area: &DrawingArea<DB, Shift>,
    items: &[(String, RGBAColor)],
    placement: LegendMode,
    axis_x_start_px: i32,
) -> Result<()> {
    legend_area.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    let (w, _) = legend_area.dim_in_pixel();
    let style =
        TextStyle::from((FontFamily::SansSerif, FONT_PX)).pos(Pos::new(HPos::Left, VPos::Center));

    match placement {
        LegendMode::Right => {
            let cap = w as i32 - 2 * PAD - SWATCH_W - SWATCH_GAP;
            for (row, (label, color)) in items.iter().enumerate() {
                let y = PAD + row as i32 * LINE_H + LINE_H / 2;
                swatch(legend_area, PAD, y, *color)?;
                let (text, _) = fitted(label, cap);
                legend_area
                    .draw(&Text::new(text, (PAD + SWATCH_W + SWATCH_GAP, y), style.clone()))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
        }
        LegendMode::Top | LegendMode::Bottom => {
            let labels: Vec<String> = items.iter().map(|(l, _)| l.clone()).collect();
            for (r, row) in flow_rows(&labels, axis_x_start_px, w as i32).into_iter().enumerate() {
                let y = PAD + r as i32 * LINE_H + LINE_H / 2;
                for (i, text, x) in row {
                    swatch(legend_area, x, y, items[i].1)?;
                    legend_area
                        .draw(&Text::new(text, (x + SWATCH_W + SWATCH_GAP, y), style.clone()))
                        .map_err(|e| anyhow!("{:?}", e))?;
                }
            }
        }
        // drawn by plotters' series labels
        LegendMode::Inside => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Line {i}")).collect()
    }

    #[test]
    fn few_labels_fit_one_row() {
        let rows = flow_rows(&labels(3), 60, 1000);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0].2, 60);
        assert_eq!(estimate_top_bottom_legend_height_px(&labels(3), 60, 1000), 2 * PAD + LINE_H);
    }

    #[test]
    fn many_labels_wrap_and_keep_order() {
        let rows = flow_rows(&labels(14), 60, 400);
        assert!(rows.len() > 1);
        let order: Vec<usize> = rows.iter().flatten().map(|(i, _, _)| *i).collect();
        assert_eq!(order, (0..14).collect::<Vec<_>>());
        assert!(rows.iter().all(|r| r[0].2 == 60));
    }
}
