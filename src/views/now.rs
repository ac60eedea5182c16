use embedded_graphics::{pixelcolor::BinaryColor, prelude::*, text::Alignment};

use crate::layout::*;
use crate::views::ViewState;
use crate::weather_icons::WeatherIcon;

const TEXT_X: i32 = 60;
const ICON_CENTER_X: i32 = 32;
const ICON_SIZE: u32 = 32;

/// Current conditions: icon on the left, description and temperature on
/// the right.
pub fn draw<D>(target: &mut D, state: &ViewState<'_>, origin: Point)
where
    D: DrawTarget<Color = BinaryColor>,
{
    let unit = state.weather.query().unit();
    let (text, temp, icon) = match state.weather.current() {
        Some(c) => (c.text.as_str(), format!("{}{}", c.temp, unit), c.icon),
        None => ("No data", format!("--{}", unit), WeatherIcon::Unknown),
    };

    let text = fit(FONT_SMALL, text, SCREEN_W - TEXT_X);
    draw_text(
        target,
        text,
        origin + Point::new(TEXT_X, ROW_SMALL_Y),
        small_style(),
        Alignment::Left,
    );
    draw_text(
        target,
        &temp,
        origin + Point::new(TEXT_X, ROW_LARGE_Y),
        large_style(),
        Alignment::Left,
    );

    icon.draw_centered(
        target,
        origin.x + ICON_CENTER_X,
        origin.y + ROW_SMALL_Y,
        ICON_SIZE,
    );
}
