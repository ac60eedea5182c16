//! When to refresh what.
//!
//! The periodic timer only raises a request flag; the main loop acts on it
//! once the display carousel is settled. Temperature resampling is driven by
//! the loop's own millisecond clock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::info;

use crate::ui::FrameState;

/// Request flag shared between the timer callback and the main loop.
#[derive(Debug, Clone, Default)]
pub struct DueFlag(Arc<AtomicBool>);

impl DueFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Safe from a timer callback: a single store, nothing else.
    pub fn raise(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clear the flag, returning whether it was set.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::Relaxed)
    }
}

/// Steps of a full refresh, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStep {
    Time,
    Conditions,
    Forecast,
    Temperature,
}

impl RefreshStep {
    pub const ORDER: [RefreshStep; 4] = [
        RefreshStep::Time,
        RefreshStep::Conditions,
        RefreshStep::Forecast,
        RefreshStep::Temperature,
    ];

    pub fn progress(self) -> u8 {
        match self {
            RefreshStep::Time => 10,
            RefreshStep::Conditions => 30,
            RefreshStep::Forecast => 50,
            RefreshStep::Temperature => 80,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RefreshStep::Time => "Updating time...",
            RefreshStep::Conditions => "Updating conditions...",
            RefreshStep::Forecast => "Updating forecasts...",
            RefreshStep::Temperature => "Updating temperature...",
        }
    }
}

pub const DONE_PROGRESS: u8 = 100;
pub const DONE_LABEL: &str = "Done...";
/// Pause on the finished progress screen before the carousel resumes.
pub const DONE_PAUSE_MS: u32 = 100;

#[derive(Debug)]
pub struct RefreshScheduler {
    due: DueFlag,
    temperature_interval_ms: u32,
    last_temperature_ms: Option<u32>,
    last_full_refresh_ms: Option<u32>,
    last_update: String,
    refreshes: u32,
}

impl RefreshScheduler {
    pub fn new(temperature_interval_ms: u32) -> Self {
        Self {
            due: DueFlag::new(),
            temperature_interval_ms,
            last_temperature_ms: None,
            last_full_refresh_ms: None,
            last_update: "--".to_string(),
            refreshes: 0,
        }
    }

    /// Handle for the periodic timer.
    pub fn due_flag(&self) -> DueFlag {
        self.due.clone()
    }

    /// A pending request is only acted on between transitions.
    pub fn full_refresh_due(&self, state: FrameState) -> bool {
        self.due.is_raised() && state == FrameState::Fixed
    }

    /// True if nothing was sampled yet or a full period has elapsed.
    /// Survives the millisecond counter wrapping.
    pub fn temperature_due(&self, now_ms: u32) -> bool {
        match self.last_temperature_ms {
            None => true,
            Some(last) => now_ms.wrapping_sub(last) >= self.temperature_interval_ms,
        }
    }

    pub fn mark_temperature_sampled(&mut self, now_ms: u32) {
        self.last_temperature_ms = Some(now_ms);
    }

    pub fn last_temperature_ms(&self) -> Option<u32> {
        self.last_temperature_ms
    }

    /// Called after the last refresh step with the loop time and clock text
    /// of the moment. A request raised while the steps were running is
    /// folded into this refresh.
    pub fn complete_full_refresh(&mut self, now_ms: u32, last_update: String) {
        self.due.take();
        self.last_full_refresh_ms = Some(now_ms);
        self.refreshes = self.refreshes.wrapping_add(1);
        info!("Full refresh #{} complete at {}", self.refreshes, last_update);
        self.last_update = last_update;
    }

    pub fn last_full_refresh_ms(&self) -> Option<u32> {
        self.last_full_refresh_ms
    }

    /// Clock text of the last completed refresh, `--` before the first.
    pub fn last_update(&self) -> &str {
        &self.last_update
    }

    pub fn refresh_count(&self) -> u32 {
        self.refreshes
    }
}
