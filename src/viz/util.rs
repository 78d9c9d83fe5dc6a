//! Utility functions for visualization: colors, ranges, locale-aware number labels.

use num_format::{Locale, ToFormattedString};
use plotters::prelude::*;
use std::ops::Range;

use super::text::estimate_text_width_px;

/// Microsoft Office (2013+) chart series palette.
const OFFICE10: [RGBColor; 10] = [
    RGBColor(68, 114, 196),  // blue      (#4472C4)
    RGBColor(237, 125, 49),  // orange    (#ED7D31)
    RGBColor(165, 165, 165), // gray      (#A5A5A5)
    RGBColor(255, 192, 0),   // gold      (#FFC000)
    RGBColor(91, 155, 213),  // light blue(#5B9BD5)
    RGBColor(112, 173, 71),  // green     (#70AD47)
    RGBColor(38, 68, 120),   // dark blue (#264478)
    RGBColor(158, 72, 14),   // dark org. (#9E480E)
    RGBColor(99, 99, 99),    // dark gray (#636363)
    RGBColor(153, 115, 0),   // brownish  (#997300)
];

/// Color of the `idx`-th series.
#[inline]
pub fn office_color(idx: usize) -> RGBAColor {
    OFFICE10[idx % OFFICE10.len()].to_rgba()
}

/// Marker color of amenity points.
pub const MAP_POINT: RGBColor = RGBColor(0, 68, 255);

/// Stops of the ColorBrewer RdYlGn diverging scale, red (low) to green (high).
const RDYLGN: [(u8, u8, u8); 5] = [
    (215, 48, 39),
    (252, 141, 89),
    (254, 224, 139),
    (145, 207, 96),
    (26, 152, 80),
];

/// Red-yellow-green color for `value` on `[lo, hi]`; values outside are clamped.
pub fn rdylgn(value: f64, lo: f64, hi: f64) -> RGBColor {
    let t = if hi > lo && value.is_finite() {
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    } else {
        0.5
    };
    let scaled = t * (RDYLGN.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(RDYLGN.len() - 2);
    let f = scaled - i as f64;
    let (a, b) = (RDYLGN[i], RDYLGN[i + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * f).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Black or white, whichever reads better on `bg`.
pub fn contrast_text(bg: RGBColor) -> RGBColor {
    let luma = 0.299 * bg.0 as f64 + 0.587 * bg.1 as f64 + 0.114 * bg.2 as f64;
    if luma > 140.0 { BLACK } else { WHITE }
}

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'),
    }
}

/// One-decimal number with the locale's decimal separator, e.g. `97,3` for `fr`.
pub fn format_decimal(v: f64, locale_tag: &str) -> String {
    let (_, sep) = map_locale(locale_tag);
    let s = format!("{v:.1}");
    if sep == '.' { s } else { s.replace('.', &sep.to_string()) }
}

/// Whole count with locale grouping, e.g. `182,500,000`.
pub fn format_count(n: u64, locale_tag: &str) -> String {
    let (locale, _) = map_locale(locale_tag);
    n.to_formatted_string(locale)
}

/// `(lo, hi)` widened by `pad` on both sides; a flat range is widened by one unit.
pub fn padded_range(lo: f64, hi: f64, pad: f64) -> (f64, f64) {
    if (hi - lo).abs() < f64::EPSILON {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo - pad, hi + pad)
    }
}

/// Min and max of the finite values, or `None` when there is none.
pub fn finite_bounds<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Inner range of a segmented axis with `n` categories (`n >= 1`).
///
/// Integer ranges are inclusive in plotters and a single-value range does not map, so one
/// category gets an extra empty segment.
pub fn category_axis(n: usize) -> Range<usize> {
    0..n.saturating_sub(1).max(1)
}

/// Width of the left label area fitting the longest of `labels` (pixels, clamped).
pub fn left_label_area_px<'a, I: IntoIterator<Item = &'a str>>(labels: I, font_px: u32) -> u32 {
    let widest = labels
        .into_iter()
        .map(|s| estimate_text_width_px(s, font_px))
        .max()
        .unwrap_or(0);
    widest.saturating_add(18).clamp(40, 140)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_ends_are_red_and_green() {
        assert_eq!(rdylgn(90.0, 90.0, 100.0), RGBColor(215, 48, 39));
        assert_eq!(rdylgn(100.0, 90.0, 100.0), RGBColor(26, 152, 80));
        assert_eq!(rdylgn(150.0, 90.0, 100.0), RGBColor(26, 152, 80));
        assert_eq!(rdylgn(95.0, 90.0, 100.0), RGBColor(254, 224, 139));
    }

    #[test]
    fn locale_formatting() {
        assert_eq!(format_decimal(97.24, "en"), "97.2");
        assert_eq!(format_decimal(97.36, "fr"), "97,4");
        assert_eq!(format_count(1_234_567, "en"), "1,234,567");
        assert_eq!(format_count(1_234_567, "de"), "1.234.567");
    }

    #[test]
    fn bounds_skip_non_finite() {
        assert_eq!(finite_bounds([3.0, f64::NAN, 1.0]), Some((1.0, 3.0)));
        assert_eq!(finite_bounds(Vec::<f64>::new()), None);
        assert_eq!(padded_range(5.0, 5.0, 0.5), (4.0, 6.0));
    }

    #[test]
    fn category_axis_never_collapses() {
        assert_eq!(category_axis(1), 0..1);
        assert_eq!(category_axis(7), 0..6);
    }
}
