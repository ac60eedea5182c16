//! Publishing side of the indoor temperature.
//!
//! The main loop is the only writer. Readers (the HTTP handlers on the
//! device) see the value through an atomic, so they never block the loop.

use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

/// Sentinel for "no sample taken yet".
const NO_READING: i32 = i32::MAX;

/// Anything that wants the smoothed temperature after each sample.
pub trait TemperaturePublisher {
    fn set_temperature(&mut self, celsius: i32);

    /// One step of the service's own request handling, run once per loop
    /// iteration. Services that run on their own task have nothing to do.
    fn poll(&mut self) {}
}

#[derive(Serialize)]
struct TemperatureStatus {
    temperature: Option<i32>,
    unit: &'static str,
}

#[derive(Debug, Clone)]
pub struct TemperatureService {
    latest: Arc<AtomicI32>,
    updates: Arc<AtomicU32>,
}

impl TemperatureService {
    pub fn new() -> Self {
        Self {
            latest: Arc::new(AtomicI32::new(NO_READING)),
            updates: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn temperature(&self) -> Option<i32> {
        match self.latest.load(Ordering::Relaxed) {
            NO_READING => None,
            t => Some(t),
        }
    }

    /// How many times the loop has published a value.
    pub fn update_count(&self) -> u32 {
        self.updates.load(Ordering::Relaxed)
    }

    /// Body served to other devices: `{"temperature":25,"unit":"C"}`.
    pub fn status_json(&self) -> Result<String> {
        let status = TemperatureStatus {
            temperature: self.temperature(),
            unit: "C",
        };
        Ok(serde_json::to_string(&status)?)
    }
}

impl Default for TemperatureService {
    fn default() -> Self {
        Self::new()
    }
}

impl TemperaturePublisher for TemperatureService {
    fn set_temperature(&mut self, celsius: i32) {
        self.latest.store(celsius, Ordering::Relaxed);
        self.updates.fetch_add(1, Ordering::Relaxed);
    }
}
