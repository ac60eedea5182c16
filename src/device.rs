//! The main loop of the display, independent of the board it runs on.

use anyhow::Result;
use log::{info, warn};

use crate::clock::{Clock, TimeSource, Timebase};
use crate::config::Config;
use crate::framebuffer::{Framebuffer, Panel};
use crate::sampler::{AnalogInput, TemperatureSampler};
use crate::scheduler::{DueFlag, RefreshScheduler, RefreshStep, DONE_LABEL, DONE_PAUSE_MS, DONE_PROGRESS};
use crate::service::TemperaturePublisher;
use crate::ui::FrameCarousel;
use crate::views::{status, ViewState};
use crate::weather::{HttpGet, WeatherQuery, WeatherStation};

/// Board-specific collaborators.
pub struct Hardware {
    pub sensor: Box<dyn AnalogInput>,
    pub time: Box<dyn TimeSource>,
    pub http: Box<dyn HttpGet>,
    pub panel: Box<dyn Panel>,
    pub publisher: Box<dyn TemperaturePublisher>,
    pub timebase: Box<dyn Timebase>,
}

pub struct Device {
    hw: Hardware,
    scheduler: RefreshScheduler,
    sampler: TemperatureSampler,
    clock: Clock,
    weather: WeatherStation,
    carousel: FrameCarousel,
    fb: Framebuffer,
}

impl Device {
    pub fn new(cfg: &Config, hw: Hardware) -> Self {
        Self {
            hw,
            scheduler: RefreshScheduler::new(cfg.temperature_interval_ms),
            sampler: TemperatureSampler::new(cfg.temperature_window),
            clock: Clock::new(cfg.utc_offset_secs()),
            weather: WeatherStation::new(WeatherQuery::from_config(cfg)),
            carousel: FrameCarousel::from_config(cfg),
            fb: Framebuffer::new(),
        }
    }

    /// Handle for the periodic refresh timer.
    pub fn due_flag(&self) -> DueFlag {
        self.scheduler.due_flag()
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    pub fn sampler(&self) -> &TemperatureSampler {
        &self.sampler
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn weather(&self) -> &WeatherStation {
        &self.weather
    }

    pub fn carousel(&self) -> &FrameCarousel {
        &self.carousel
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    /// Set up the carousel and run the first full refresh. The periodic
    /// timer should be armed only after this returns.
    pub fn start(&mut self) {
        let now = self.hw.timebase.now_ms();
        self.carousel.init(now);
        self.run_full_refresh();
    }

    /// One pass of the main loop. Sleeps the carousel's remaining budget
    /// and returns it.
    pub fn tick(&mut self) -> u32 {
        if self.scheduler.full_refresh_due(self.carousel.state()) {
            info!("Refresh due");
            self.run_full_refresh();
        }

        let now = self.hw.timebase.now_ms();
        let view = ViewState {
            now_ms: now,
            clock: &self.clock,
            weather: &self.weather,
            indoor: self.sampler.current(),
        };
        let ui = self.carousel.update(now, &view, &mut self.fb);
        if ui.rendered {
            if let Err(e) = self.hw.panel.present(&self.fb) {
                warn!("present failed: {:?}", e);
            }
        }
        if ui.budget_ms > 0 {
            self.hw.timebase.delay_ms(ui.budget_ms);
        }

        let now = self.hw.timebase.now_ms();
        if self.scheduler.temperature_due(now) {
            self.update_temperature();
        }

        self.hw.publisher.poll();
        ui.budget_ms
    }

    /// Time, conditions, forecast, temperature, in that order. A failing
    /// step keeps its previous data and the sequence goes on.
    pub fn run_full_refresh(&mut self) {
        for step in RefreshStep::ORDER {
            self.show_progress(step.progress(), step.label());
            if let Err(e) = self.run_step(step) {
                warn!("{} failed, keeping previous data: {:#}", step.label(), e);
            }
        }

        let now = self.hw.timebase.now_ms();
        let stamp = self.clock.formatted_time(now);
        self.scheduler.complete_full_refresh(now, stamp);

        self.show_progress(DONE_PROGRESS, DONE_LABEL);
        self.hw.timebase.delay_ms(DONE_PAUSE_MS);
        self.carousel.invalidate();
    }

    fn run_step(&mut self, step: RefreshStep) -> Result<()> {
        info!("{}", step.label());
        match step {
            RefreshStep::Time => {
                let now = self.hw.timebase.now_ms();
                self.clock.update_time(self.hw.time.as_mut(), now)
            }
            RefreshStep::Conditions => self.weather.update_conditions(self.hw.http.as_mut()),
            RefreshStep::Forecast => self.weather.update_forecast(self.hw.http.as_mut()),
            RefreshStep::Temperature => {
                self.update_temperature();
                Ok(())
            }
        }
    }

    /// Read, smooth and publish one sample.
    pub fn update_temperature(&mut self) {
        let now = self.hw.timebase.now_ms();
        self.sampler
            .sample(self.hw.sensor.as_mut(), self.hw.publisher.as_mut());
        self.scheduler.mark_temperature_sampled(now);
    }

    fn show_progress(&mut self, percentage: u8, label: &str) {
        status::draw_progress(&mut self.fb, percentage, label);
        if let Err(e) = self.hw.panel.present(&self.fb) {
            warn!("progress screen: {:?}", e);
        }
    }
}
