//! Chart rendering: the four dashboard charts to **SVG**, **PNG**, or an in-memory RGB buffer.
//!
//! - One entry point, [`render_chart`], parameterized by [`ChartKind`]
//! - Distinct series colors (Microsoft Office palette), red-yellow-green scale for rates
//! - Locale-aware value labels (`97.3` vs `97,3`)
//! - Legend placement for the timeline: `Inside`, `Right`, `Top`, `Bottom`
//!
//! Data is validated before a backend is created, so an empty chart never leaves a file behind.

pub mod heatmap;
pub mod legend;
pub mod map;
pub mod ranking;
pub mod text;
pub mod timeline;
pub mod types;
pub mod util;

pub use types::{
    ChartInput, ChartKind, ChartOptions, DEFAULT_LEGEND_MODE, DEFAULT_TARGET_RATE, LegendMode,
};

use anyhow::{Result, bail};
use log::debug;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use std::path::Path;
use std::sync::Once;

/// One-time registration for a fallback "sans-serif" font when using the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
    });
}

/// Validated chart data, ready to draw on any backend.
enum Prepared<'a> {
    Timeline(timeline::Timeline),
    Ranking(ranking::Ranking),
    Weekly(heatmap::Heatmap<'a>),
    Map(map::MapPoints),
}

fn prepare<'a>(
    kind: ChartKind,
    input: &ChartInput<'a>,
    opts: &ChartOptions,
) -> Result<Prepared<'a>> {
    Ok(match kind {
        ChartKind::Timeline => {
            Prepared::Timeline(timeline::prepare(input.regularity, opts.target_rate)?)
        }
        ChartKind::Ranking => Prepared::Ranking(ranking::prepare(input.ranking)?),
        ChartKind::WeeklyHeatmap => Prepared::Weekly(heatmap::prepare(input.weekly)?),
        ChartKind::Map => Prepared::Map(map::prepare(input.amenities)?),
    })
}

fn draw<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    data: &Prepared<'_>,
    opts: &ChartOptions,
) -> Result<()> {
    match data {
        Prepared::Timeline(d) => timeline::draw(root, d, opts),
        Prepared::Ranking(d) => ranking::draw(root, d, opts),
        Prepared::Weekly(d) => heatmap::draw(root, d, opts),
        Prepared::Map(d) => map::draw(root, d, opts),
    }
}

fn check_size(opts: &ChartOptions) -> Result<()> {
    if opts.width < 200 || opts.height < 150 {
        bail!("chart size {}x{} is too small", opts.width, opts.height);
    }
    Ok(())
}

/// Render `kind` to `out_path`; `.svg` selects the SVG backend, anything else PNG.
pub fn render_chart<P: AsRef<Path>>(
    kind: ChartKind,
    input: &ChartInput<'_>,
    out_path: P,
    opts: &ChartOptions,
) -> Result<()> {
    check_size(opts)?;
    let data = prepare(kind, input, opts)?;
    ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let size = (opts.width, opts.height);

    let is_svg = out_path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if is_svg {
        draw(SVGBackend::new(out_path, size).into_drawing_area(), &data, opts)?;
    } else {
        draw(BitMapBackend::new(out_path, size).into_drawing_area(), &data, opts)?;
    }
    debug!("rendered {kind:?} chart to {}", out_path.display());
    Ok(())
}

/// Render `kind` into a packed RGB buffer of `width * height * 3` bytes.
pub fn render_chart_rgb(
    kind: ChartKind,
    input: &ChartInput<'_>,
    opts: &ChartOptions,
) -> Result<Vec<u8>> {
    check_size(opts)?;
    let data = prepare(kind, input, opts)?;
    ensure_fonts_registered();
    let mut buf = vec![0u8; opts.width as usize * opts.height as usize * 3];
    {
        let root =
            BitMapBackend::with_buffer(&mut buf, (opts.width, opts.height)).into_drawing_area();
        draw(root, &data, opts)?;
    }
    Ok(buf)
}
