//! Frame carousel: cycles the frames with a slide-left transition and
//! paces rendering to a target frame rate.

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

use crate::config::Config;
use crate::framebuffer::Framebuffer;
use crate::layout::{CENTER_X, INDICATOR_SPACING, INDICATOR_Y, SCREEN_W};
use crate::views::{overlay, status, Frame, ViewState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// A frame is shown still.
    Fixed,
    /// Sliding from the current frame to the next.
    InTransition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiTick {
    /// The framebuffer was redrawn and should be presented.
    pub rendered: bool,
    /// Milliseconds the caller may sleep before the next update.
    pub budget_ms: u32,
}

#[derive(Debug)]
pub struct FrameCarousel {
    current: usize,
    state: FrameState,
    phase_started_ms: u32,
    last_render_ms: Option<u32>,
    frame_period_ms: u32,
    time_per_frame_ms: u32,
    time_per_transition_ms: u32,
}

impl FrameCarousel {
    pub fn new(target_fps: u32, time_per_frame_ms: u32, time_per_transition_ms: u32) -> Self {
        Self {
            current: 0,
            state: FrameState::Fixed,
            phase_started_ms: 0,
            last_render_ms: None,
            frame_period_ms: (1000 / target_fps.max(1)).max(1),
            time_per_frame_ms,
            time_per_transition_ms,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            cfg.ui_target_fps,
            cfg.ui_time_per_frame_ms,
            cfg.ui_time_per_transition_ms,
        )
    }

    /// Start the first dwell at `now_ms`.
    pub fn init(&mut self, now_ms: u32) {
        self.current = 0;
        self.state = FrameState::Fixed;
        self.phase_started_ms = now_ms;
        self.last_render_ms = None;
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn current_frame(&self) -> Frame {
        Frame::ALL[self.current]
    }

    pub fn frame_period_ms(&self) -> u32 {
        self.frame_period_ms
    }

    /// Force a redraw on the next update, e.g. after a status page covered
    /// the panel.
    pub fn invalidate(&mut self) {
        self.last_render_ms = None;
    }

    /// Advance timing and redraw when a frame period has elapsed.
    pub fn update(&mut self, now_ms: u32, view: &ViewState<'_>, fb: &mut Framebuffer) -> UiTick {
        if let Some(last) = self.last_render_ms {
            let elapsed = now_ms.wrapping_sub(last);
            if elapsed < self.frame_period_ms {
                return UiTick {
                    rendered: false,
                    budget_ms: self.frame_period_ms - elapsed,
                };
            }
        }

        self.advance(now_ms);
        self.render(now_ms, view, fb);
        self.last_render_ms = Some(now_ms);
        UiTick {
            rendered: true,
            budget_ms: self.frame_period_ms,
        }
    }

    fn advance(&mut self, now_ms: u32) {
        let in_phase = now_ms.wrapping_sub(self.phase_started_ms);
        match self.state {
            FrameState::Fixed if in_phase >= self.time_per_frame_ms => {
                self.state = FrameState::InTransition;
                self.phase_started_ms = now_ms;
            }
            FrameState::InTransition if in_phase >= self.time_per_transition_ms => {
                self.current = (self.current + 1) % Frame::ALL.len();
                self.state = FrameState::Fixed;
                self.phase_started_ms = now_ms;
            }
            _ => {}
        }
    }

    /// Horizontal slide of the outgoing frame, `0..SCREEN_W`.
    fn slide_offset(&self, now_ms: u32) -> i32 {
        if self.state != FrameState::InTransition || self.time_per_transition_ms == 0 {
            return 0;
        }
        let in_phase = now_ms
            .wrapping_sub(self.phase_started_ms)
            .min(self.time_per_transition_ms);
        (in_phase as u64 * SCREEN_W as u64 / self.time_per_transition_ms as u64) as i32
    }

    fn render(&self, now_ms: u32, view: &ViewState<'_>, fb: &mut Framebuffer) {
        fb.clear_color(BinaryColor::Off);

        let frame = self.current_frame();
        match self.state {
            FrameState::Fixed => frame.render(fb, view, Point::zero()),
            FrameState::InTransition => {
                let dx = self.slide_offset(now_ms);
                frame.render(fb, view, Point::new(-dx, 0));
                frame.next().render(fb, view, Point::new(SCREEN_W - dx, 0));
            }
        }

        overlay::draw(fb, view);
        self.draw_indicator(fb);
    }

    fn draw_indicator(&self, fb: &mut Framebuffer) {
        let count = Frame::ALL.len() as i32;
        let start = CENTER_X - INDICATOR_SPACING * count / 2;
        for i in 0..count {
            let at = Point::new(start + INDICATOR_SPACING * i, INDICATOR_Y);
            status::draw_symbol(fb, at, i as usize == self.current);
        }
    }
}
