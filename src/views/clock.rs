use embedded_graphics::{pixelcolor::BinaryColor, prelude::*, text::Alignment};

use crate::layout::*;
use crate::views::ViewState;

/// Date on the small row, `HH:MM:SS` large under it, both centred.
pub fn draw<D>(target: &mut D, state: &ViewState<'_>, origin: Point)
where
    D: DrawTarget<Color = BinaryColor>,
{
    let date = state.clock.formatted_date(state.now_ms);
    draw_text(
        target,
        &date,
        origin + Point::new(CENTER_X, ROW_SMALL_Y),
        small_style(),
        Alignment::Center,
    );

    let time = state.clock.formatted_time(state.now_ms);
    draw_text(
        target,
        &time,
        origin + Point::new(CENTER_X, ROW_LARGE_Y),
        large_style(),
        Alignment::Center,
    );
}
