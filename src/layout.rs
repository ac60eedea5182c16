use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PrimitiveStyle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use profont::{PROFONT_18_POINT, PROFONT_7_POINT};

// ── Layout constants ────────────────────────────────────────────────

pub const SCREEN_W: i32 = 128;
pub const CENTER_X: i32 = SCREEN_W / 2;

/// Header overlay: separator line and the text row under it.
pub const HEADER_LINE_Y: i32 = 52;
pub const HEADER_TEXT_Y: i32 = 54;

/// Frame indicator row (between the overlay's left and right texts).
pub const INDICATOR_Y: i32 = 56;
pub const INDICATOR_SPACING: i32 = 12;

/// Rows used by the frames: small line, then large line.
pub const ROW_SMALL_Y: i32 = 5;
pub const ROW_LARGE_Y: i32 = 15;

pub const FORECAST_COLUMN_W: i32 = 44;

// ── Fonts ───────────────────────────────────────────────────────────

pub const FONT_SMALL: &MonoFont<'static> = &PROFONT_7_POINT;
pub const FONT_LARGE: &MonoFont<'static> = &PROFONT_18_POINT;

pub fn small_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyle::new(FONT_SMALL, BinaryColor::On)
}

pub fn large_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyle::new(FONT_LARGE, BinaryColor::On)
}

/// Pixel width of `text` in a monospaced font.
pub fn text_width(font: &MonoFont<'_>, text: &str) -> i32 {
    let advance = font.character_size.width + font.character_spacing;
    (text.chars().count() as u32 * advance) as i32
}

/// Cut `text` so it fits in `max_width` pixels.
pub fn fit<'a>(font: &MonoFont<'_>, text: &'a str, max_width: i32) -> &'a str {
    let advance = text_width(font, " ").max(1);
    let max_chars = (max_width / advance).max(0) as usize;
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Draw `text` with its top edge at `pos.y`; `pos.x` is the anchor for the
/// given alignment.
pub fn draw_text<D>(
    target: &mut D,
    text: &str,
    pos: Point,
    style: MonoTextStyle<'_, BinaryColor>,
    alignment: Alignment,
) where
    D: DrawTarget<Color = BinaryColor>,
{
    let text_style = TextStyleBuilder::new()
        .alignment(alignment)
        .baseline(Baseline::Top)
        .build();
    Text::with_text_style(text, pos, style, text_style)
        .draw(target)
        .ok();
}

/// One-pixel horizontal line across `width` pixels starting at `x`.
pub fn draw_hline<D>(target: &mut D, x: i32, y: i32, width: i32)
where
    D: DrawTarget<Color = BinaryColor>,
{
    Line::new(Point::new(x, y), Point::new(x + width - 1, y))
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(target)
        .ok();
}

/// `"<t> °C"`, or `"-- °C"` before the first sample.
pub fn indoor_text(temperature: Option<i32>) -> String {
    match temperature {
        Some(t) => format!("{} °C", t),
        None => "-- °C".to_string(),
    }
}
