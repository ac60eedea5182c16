use embedded_graphics::{pixelcolor::BinaryColor, prelude::*, text::Alignment};

use crate::layout::*;
use crate::views::ViewState;

pub fn draw<D>(target: &mut D, state: &ViewState<'_>, origin: Point)
where
    D: DrawTarget<Color = BinaryColor>,
{
    draw_text(
        target,
        "Indoor",
        origin + Point::new(CENTER_X, ROW_SMALL_Y),
        small_style(),
        Alignment::Center,
    );
    draw_text(
        target,
        &indoor_text(state.indoor),
        origin + Point::new(CENTER_X, ROW_LARGE_Y),
        large_style(),
        Alignment::Center,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::Framebuffer;
    use crate::views::fixtures::*;

    #[test]
    fn value_and_placeholder_render_differently() {
        let clock = synced_clock();
        let station = empty_station();
        let mut with = Framebuffer::new();
        let mut without = Framebuffer::new();
        for (fb, indoor) in [(&mut with, Some(24)), (&mut without, None)] {
            let state = ViewState {
                now_ms: 0,
                clock: &clock,
                weather: &station,
                indoor,
            };
            draw(fb, &state, Point::zero());
        }
        assert_ne!(with.as_bytes(), without.as_bytes());
    }
}
