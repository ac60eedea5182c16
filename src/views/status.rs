//! Full-screen status pages shown outside the carousel.

use embedded_graphics::{
    image::{Image, ImageRaw},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle, RoundedRectangle},
    text::Alignment,
};

use crate::layout::*;

pub const SYMBOL_SIZE: u32 = 8;

/// 8x8, MSB-first rows.
pub const ACTIVE_SYMBOL: [u8; 8] = [0x00, 0x18, 0x3C, 0x7E, 0x7E, 0x3C, 0x18, 0x00];
pub const INACTIVE_SYMBOL: [u8; 8] = [0x00, 0x00, 0x00, 0x18, 0x18, 0x00, 0x00, 0x00];

const LABEL_Y: i32 = 10;

const BAR_X: i32 = 2;
const BAR_Y: i32 = 28;
const BAR_W: u32 = 124;
const BAR_H: u32 = 10;

const CONNECTING_SYMBOL_X: [i32; 3] = [46, 60, 74];
const CONNECTING_SYMBOL_Y: i32 = 30;

pub fn draw_symbol<D>(target: &mut D, top_left: Point, active: bool)
where
    D: DrawTarget<Color = BinaryColor>,
{
    let data: &[u8] = if active {
        &ACTIVE_SYMBOL
    } else {
        &INACTIVE_SYMBOL
    };
    let raw = ImageRaw::<BinaryColor>::new(data, SYMBOL_SIZE);
    Image::new(&raw, top_left).draw(target).ok();
}

/// Label centred on top, rounded progress bar below.
pub fn draw_progress<D>(target: &mut D, percentage: u8, label: &str)
where
    D: DrawTarget<Color = BinaryColor>,
{
    target.clear(BinaryColor::Off).ok();
    draw_text(
        target,
        label,
        Point::new(CENTER_X, LABEL_Y),
        small_style(),
        Alignment::Center,
    );

    let radius = Size::new(BAR_H / 2, BAR_H / 2);
    RoundedRectangle::with_equal_corners(
        Rectangle::new(Point::new(BAR_X, BAR_Y), Size::new(BAR_W, BAR_H)),
        radius,
    )
    .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
    .draw(target)
    .ok();

    let inner_w = (BAR_W - 4) * percentage.min(100) as u32 / 100;
    if inner_w > 0 {
        let inner_h = BAR_H - 4;
        RoundedRectangle::with_equal_corners(
            Rectangle::new(Point::new(BAR_X + 2, BAR_Y + 2), Size::new(inner_w, inner_h)),
            Size::new(inner_h / 2, inner_h / 2),
        )
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
        .draw(target)
        .ok();
    }
}

/// "Connecting to WiFi" with three dots, the `counter % 3`-th one active.
pub fn draw_connecting<D>(target: &mut D, counter: u32)
where
    D: DrawTarget<Color = BinaryColor>,
{
    target.clear(BinaryColor::Off).ok();
    draw_text(
        target,
        "Connecting to WiFi",
        Point::new(CENTER_X, LABEL_Y),
        small_style(),
        Alignment::Center,
    );
    let active = (counter % 3) as usize;
    for (i, x) in CONNECTING_SYMBOL_X.iter().enumerate() {
        draw_symbol(target, Point::new(*x, CONNECTING_SYMBOL_Y), i == active);
    }
}
