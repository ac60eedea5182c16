//! Smart Tube: a WiFi status display with clock, outdoor weather and a
//! smoothed indoor temperature on a 128x64 OLED.
//!
//! Everything here runs on the host; the board bindings live in the
//! binary.

pub mod clock;
pub mod config;
pub mod connectivity;
pub mod device;
pub mod framebuffer;
pub mod layout;
pub mod sampler;
pub mod scheduler;
pub mod service;
pub mod ui;
pub mod views;
pub mod weather;
pub mod weather_icons;
