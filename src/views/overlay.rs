use embedded_graphics::{pixelcolor::BinaryColor, prelude::*, text::Alignment};

use crate::layout::*;
use crate::views::ViewState;

/// Header drawn on top of every frame and never shifted: separator line,
/// `HH:MM` on the left, indoor temperature on the right.
pub fn draw<D>(target: &mut D, state: &ViewState<'_>)
where
    D: DrawTarget<Color = BinaryColor>,
{
    draw_hline(target, 0, HEADER_LINE_Y, SCREEN_W);
    draw_text(
        target,
        &state.clock.short_time(state.now_ms),
        Point::new(0, HEADER_TEXT_Y),
        small_style(),
        Alignment::Left,
    );
    draw_text(
        target,
        &indoor_text(state.indoor),
        Point::new(SCREEN_W, HEADER_TEXT_Y),
        small_style(),
        Alignment::Right,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::Framebuffer;
    use crate::views::fixtures::*;
    use embedded_graphics::primitives::Rectangle;

    #[test]
    fn line_spans_the_width_and_text_sits_below() {
        let clock = synced_clock();
        let station = empty_station();
        let state = ViewState {
            now_ms: 0,
            clock: &clock,
            weather: &station,
            indoor: None,
        };
        let mut fb = Framebuffer::new();
        draw(&mut fb, &state);

        let line = Rectangle::new(Point::new(0, HEADER_LINE_Y), Size::new(128, 1));
        assert_eq!(fb.count_on(&line), 128);
        let above = Rectangle::new(Point::zero(), Size::new(128, HEADER_LINE_Y as u32));
        assert_eq!(fb.count_on(&above), 0);
        let left = Rectangle::new(Point::new(0, HEADER_TEXT_Y), Size::new(40, 10));
        let right = Rectangle::new(Point::new(88, HEADER_TEXT_Y), Size::new(40, 10));
        assert!(fb.count_on(&left) > 0);
        assert!(fb.count_on(&right) > 0);
    }
}
