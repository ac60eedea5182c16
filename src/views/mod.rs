pub mod clock;
pub mod forecast;
pub mod indoor;
pub mod now;
pub mod overlay;
pub mod status;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

use crate::clock::Clock;
use crate::weather::WeatherStation;

/// Read-only data the frames draw from.
pub struct ViewState<'a> {
    pub now_ms: u32,
    pub clock: &'a Clock,
    pub weather: &'a WeatherStation,
    /// Smoothed indoor temperature, `None` before the first sample.
    pub indoor: Option<i32>,
}

/// Frames in carousel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Clock,
    CurrentWeather,
    Forecast,
    Indoor,
}

impl Frame {
    pub const ALL: [Frame; 4] = [
        Frame::Clock,
        Frame::CurrentWeather,
        Frame::Forecast,
        Frame::Indoor,
    ];

    pub fn index(self) -> usize {
        match self {
            Frame::Clock => 0,
            Frame::CurrentWeather => 1,
            Frame::Forecast => 2,
            Frame::Indoor => 3,
        }
    }

    pub fn next(self) -> Frame {
        Frame::ALL[(self.index() + 1) % Frame::ALL.len()]
    }

    /// Draw the frame with its origin shifted by `offset` (slide animation).
    pub fn render<D>(self, target: &mut D, state: &ViewState<'_>, offset: Point)
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        match self {
            Frame::Clock => clock::draw(target, state, offset),
            Frame::CurrentWeather => now::draw(target, state, offset),
            Frame::Forecast => forecast::draw(target, state, offset),
            Frame::Indoor => indoor::draw(target, state, offset),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::config::Config;
    use crate::weather::{CurrentConditions, ForecastDay, WeatherQuery};
    use crate::weather_icons::WeatherIcon;

    // 2026-10-19 02:30:05 UTC.
    pub const EPOCH: i64 = 1_792_377_005;

    pub fn synced_clock() -> Clock {
        let mut clock = Clock::new(8 * 3600);
        clock.set(EPOCH, 0);
        clock
    }

    pub fn empty_station() -> WeatherStation {
        WeatherStation::new(WeatherQuery::from_config(&Config::default()))
    }

    pub fn sample_conditions() -> CurrentConditions {
        CurrentConditions {
            temp: 18,
            text: "Light rain".to_string(),
            icon: WeatherIcon::Rain,
        }
    }

    pub fn sample_days() -> Vec<ForecastDay> {
        ["MON", "TUE", "WED", "THU"]
            .iter()
            .enumerate()
            .map(|(i, t)| ForecastDay {
                title: t.to_string(),
                icon: WeatherIcon::Clear,
                low: 10 + i as i32,
                high: 20 + i as i32,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::framebuffer::Framebuffer;
    use embedded_graphics::primitives::Rectangle;

    #[test]
    fn order_wraps() {
        assert_eq!(Frame::Clock.next(), Frame::CurrentWeather);
        assert_eq!(Frame::Indoor.next(), Frame::Clock);
        for (i, f) in Frame::ALL.iter().enumerate() {
            assert_eq!(f.index(), i);
        }
    }

    #[test]
    fn every_frame_stays_above_the_header_line() {
        let clock = synced_clock();
        let station = empty_station();
        let state = ViewState {
            now_ms: 0,
            clock: &clock,
            weather: &station,
            indoor: Some(23),
        };
        for frame in Frame::ALL {
            let mut fb = Framebuffer::new();
            frame.render(&mut fb, &state, Point::zero());
            let below = Rectangle::new(Point::new(0, 52), Size::new(128, 12));
            assert!(fb.count_on(&fb.bounding_box()) > 0, "{frame:?} drew nothing");
            assert_eq!(fb.count_on(&below), 0, "{frame:?} overlaps the header");
        }
    }

    #[test]
    fn offset_moves_the_whole_frame() {
        let clock = synced_clock();
        let station = empty_station();
        let state = ViewState {
            now_ms: 0,
            clock: &clock,
            weather: &station,
            indoor: None,
        };
        let mut fb = Framebuffer::new();
        Frame::Indoor.render(&mut fb, &state, Point::new(-128, 0));
        assert_eq!(fb.count_on(&fb.bounding_box()), 0);
    }
}
