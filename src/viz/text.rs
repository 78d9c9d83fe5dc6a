//! Text measurement and truncation.
//!
//! Plotters has no text measuring on the `ab_glyph` path, so widths are estimated from the
//! character count: an average glyph is 3/5 of the font size for DejaVu Sans.

/// Estimated pixel width of `text` at `font_px`.
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    (text.chars().count() as u32 * font_px * 3).div_ceil(5)
}

/// Shorten `text` to fit `max_px`, ending with a single ellipsis when cut.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let fit = (max_px * 5 / (font_px * 3).max(1)) as usize;
    if fit == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(fit - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_to_width("Line 4", 10, 200), "Line 4");
    }

    #[test]
    fn long_text_gets_one_ellipsis() {
        // 6px per glyph, 30px fits five glyphs
        let out = truncate_to_width("Châtelet-Les Halles", 10, 30);
        assert_eq!(out, "Chât…");
        assert!(estimate_text_width_px(&out, 10) <= 30);
        assert_eq!(truncate_to_width("abc", 10, 3), "");
    }
}
