use anyhow::{bail, Result};
use log::info;

const DEFAULT_WIFI_SSID: &str = "YOUR_WIFI_SSID";
const DEFAULT_WIFI_PASS: &str = "";
const DEFAULT_WEATHER_API_KEY: &str = "YOUR_API_KEY_HERE";
const DEFAULT_WEATHER_LANGUAGE: &str = "EN";
const DEFAULT_WEATHER_COUNTRY: &str = "CN";
const DEFAULT_WEATHER_CITY: &str = "Nanjing";

// ── Timing ──────────────────────────────────────────────────────────

/// Full refresh (time, conditions, forecast) period.
pub const UPDATE_INTERVAL_SECS: u32 = 60 * 60;
/// Indoor temperature resample period.
pub const TEMPERATURE_INTERVAL_MS: u32 = 10_000;
/// Span covered by the smoothing window.
pub const TEMPERATURE_SPAN_SECS: u32 = 3 * 60;
/// 3 minutes at a 10 s cadence = 18 samples.
pub const TEMPERATURE_WINDOW: usize =
    (TEMPERATURE_SPAN_SECS * 1000 / TEMPERATURE_INTERVAL_MS) as usize;

pub const UTC_OFFSET_HOURS: f32 = 8.0;

// ── Display / UI ────────────────────────────────────────────────────

pub const DISPLAY_I2C_ADDRESS: u8 = 0x3C;
pub const UI_TARGET_FPS: u32 = 30;
pub const UI_TIME_PER_FRAME_MS: u32 = 8_000;
pub const UI_TIME_PER_TRANSITION_MS: u32 = 200;

pub const SERVICE_PORT: u16 = 80;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub wifi_ssid: String,
    pub wifi_pass: String,
    pub weather_api_key: String,
    pub weather_language: String,
    pub weather_country: String,
    pub weather_city: String,
    pub is_metric: bool,
    pub update_interval_secs: u32,
    pub temperature_interval_ms: u32,
    pub temperature_window: usize,
    pub utc_offset_hours: f32,
    pub display_i2c_address: u8,
    pub ui_target_fps: u32,
    pub ui_time_per_frame_ms: u32,
    pub ui_time_per_transition_ms: u32,
    pub service_port: u16,
}

/// Build-time secret from `wifi.local.rs` (see build.rs), else the placeholder.
fn local_or(value: Option<&'static str>, fallback: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wifi_ssid: local_or(option_env!("LOCAL_WIFI_SSID"), DEFAULT_WIFI_SSID),
            wifi_pass: local_or(option_env!("LOCAL_WIFI_PASS"), DEFAULT_WIFI_PASS),
            weather_api_key: local_or(
                option_env!("LOCAL_WEATHER_API_KEY"),
                DEFAULT_WEATHER_API_KEY,
            ),
            weather_language: DEFAULT_WEATHER_LANGUAGE.to_string(),
            weather_country: DEFAULT_WEATHER_COUNTRY.to_string(),
            weather_city: DEFAULT_WEATHER_CITY.to_string(),
            is_metric: true,
            update_interval_secs: UPDATE_INTERVAL_SECS,
            temperature_interval_ms: TEMPERATURE_INTERVAL_MS,
            temperature_window: TEMPERATURE_WINDOW,
            utc_offset_hours: UTC_OFFSET_HOURS,
            display_i2c_address: DISPLAY_I2C_ADDRESS,
            ui_target_fps: UI_TARGET_FPS,
            ui_time_per_frame_ms: UI_TIME_PER_FRAME_MS,
            ui_time_per_transition_ms: UI_TIME_PER_TRANSITION_MS,
            service_port: SERVICE_PORT,
        }
    }
}

impl Config {
    /// Number of samples needed to cover `span_secs` at one sample every
    /// `interval_ms`. Never less than one.
    pub fn temperature_window_for(span_secs: u32, interval_ms: u32) -> usize {
        if interval_ms == 0 {
            return 1;
        }
        ((span_secs as u64 * 1000 / interval_ms as u64) as usize).max(1)
    }

    pub fn utc_offset_secs(&self) -> i64 {
        (self.utc_offset_hours as f64 * 3600.0).round() as i64
    }

    /// Reject values the loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.update_interval_secs == 0 {
            bail!("update_interval_secs must be > 0");
        }
        if self.temperature_interval_ms == 0 {
            bail!("temperature_interval_ms must be > 0");
        }
        if self.temperature_window == 0 {
            bail!("temperature_window must be > 0");
        }
        if self.ui_target_fps == 0 {
            bail!("ui_target_fps must be > 0");
        }
        if self.ui_time_per_frame_ms == 0 {
            bail!("ui_time_per_frame_ms must be > 0");
        }
        if !self.utc_offset_hours.is_finite() || self.utc_offset_hours.abs() > 14.0 {
            bail!("utc_offset_hours out of range: {}", self.utc_offset_hours);
        }
        Ok(())
    }

    pub fn log_summary(&self) {
        info!("cfg wifi_ssid = {:?}", self.wifi_ssid);
        info!("cfg wifi_pass = <{} chars>", self.wifi_pass.len());
        info!("cfg weather_api_key = <{} chars>", self.weather_api_key.len());
        info!(
            "cfg weather = {}, {} (lang {}, metric {})",
            self.weather_city, self.weather_country, self.weather_language, self.is_metric
        );
        info!(
            "cfg refresh every {}s, temperature every {}ms over {} samples",
            self.update_interval_secs, self.temperature_interval_ms, self.temperature_window
        );
        info!("cfg utc_offset = {}h", self.utc_offset_hours);
        info!(
            "cfg display 0x{:02X}, ui {} fps, frame {}ms, transition {}ms",
            self.display_i2c_address,
            self.ui_target_fps,
            self.ui_time_per_frame_ms,
            self.ui_time_per_transition_ms
        );
        info!("cfg service_port = {}", self.service_port);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_covers_three_minutes_at_ten_seconds() {
        assert_eq!(TEMPERATURE_WINDOW, 18);
        assert_eq!(Config::temperature_window_for(180, 10_000), 18);
        assert_eq!(Config::temperature_window_for(5, 10_000), 1);
        assert_eq!(Config::temperature_window_for(180, 0), 1);
    }

    #[test]
    fn defaults_match_device_constants() {
        let cfg = Config::default();
        assert_eq!(cfg.update_interval_secs, 3600);
        assert_eq!(cfg.temperature_interval_ms, 10_000);
        assert_eq!(cfg.temperature_window, 18);
        assert_eq!(cfg.display_i2c_address, 0x3C);
        assert_eq!(cfg.weather_city, "Nanjing");
        assert!(cfg.is_metric);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn utc_offset_supports_fractional_hours() {
        let mut cfg = Config::default();
        assert_eq!(cfg.utc_offset_secs(), 8 * 3600);
        cfg.utc_offset_hours = 5.5;
        assert_eq!(cfg.utc_offset_secs(), 19_800);
        cfg.utc_offset_hours = -3.5;
        assert_eq!(cfg.utc_offset_secs(), -12_600);
    }

    #[test]
    fn validate_rejects_zero_intervals() {
        let mut cfg = Config::default();
        cfg.update_interval_secs = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.temperature_interval_ms = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.temperature_window = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.ui_target_fps = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.utc_offset_hours = 20.0;
        assert!(cfg.validate().is_err());
    }
}
