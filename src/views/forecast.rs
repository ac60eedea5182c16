use embedded_graphics::{pixelcolor::BinaryColor, prelude::*, text::Alignment};

use crate::layout::*;
use crate::views::ViewState;
use crate::weather::ForecastDay;

const COLUMNS: usize = 3;
const COLUMN_CENTER: i32 = 20;
const ICON_Y: i32 = 12;
const ICON_SIZE: u32 = 20;
const RANGE_Y: i32 = 34;

/// Three day columns: today and the next two.
pub fn draw<D>(target: &mut D, state: &ViewState<'_>, origin: Point)
where
    D: DrawTarget<Color = BinaryColor>,
{
    let days = state.weather.forecast();
    if days.is_empty() {
        draw_text(
            target,
            "No forecast",
            origin + Point::new(CENTER_X, ROW_LARGE_Y),
            small_style(),
            Alignment::Center,
        );
        return;
    }
    for (i, day) in days.iter().take(COLUMNS).enumerate() {
        let x = origin.x + i as i32 * FORECAST_COLUMN_W;
        draw_day(target, day, Point::new(x, origin.y));
    }
}

fn draw_day<D>(target: &mut D, day: &ForecastDay, at: Point)
where
    D: DrawTarget<Color = BinaryColor>,
{
    let center = at.x + COLUMN_CENTER;
    draw_text(
        target,
        &day.title,
        Point::new(center, at.y),
        small_style(),
        Alignment::Center,
    );
    day.icon.draw_centered(target, center, at.y + ICON_Y, ICON_SIZE);
    draw_text(
        target,
        &day.range_text(),
        Point::new(center, at.y + RANGE_Y),
        small_style(),
        Alignment::Center,
    );
}
