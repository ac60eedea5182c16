use anyhow::{bail, Result};
use log::{info, warn};
use serde::Deserialize;

use crate::clock::{civil, weekday_abbrev};
use crate::config::Config;
use crate::weather_icons::WeatherIcon;

const OWM_BASE: &str = "https://api.openweathermap.org/data/2.5";
const FORECAST_MAX_DAYS: usize = 6;

/// Blocking HTTPS GET returning the response body.
pub trait HttpGet {
    fn get(&mut self, url: &str) -> Result<String>;
}

// ── Data types ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temp: i32,
    pub text: String,
    pub icon: WeatherIcon,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    /// Upper-case three-letter weekday, e.g. `MON`.
    pub title: String,
    pub icon: WeatherIcon,
    pub low: i32,
    pub high: i32,
}

impl ForecastDay {
    /// `low|high`, as shown under the forecast icon.
    pub fn range_text(&self) -> String {
        format!("{}|{}", self.low, self.high)
    }
}

// ── OWM JSON structures ─────────────────────────────────────────────

#[derive(Deserialize)]
struct OwmCurrentRoot {
    main: Option<OwmMain>,
    weather: Option<Vec<OwmWeather>>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct OwmMain {
    temp: Option<f64>,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
}

#[derive(Deserialize)]
struct OwmWeather {
    id: Option<i32>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct OwmForecastRoot {
    list: Option<Vec<OwmForecastEntry>>,
    city: Option<OwmCity>,
    message: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct OwmForecastEntry {
    dt: Option<i64>,
    main: Option<OwmMain>,
    weather: Option<Vec<OwmWeather>>,
}

#[derive(Deserialize)]
struct OwmCity {
    timezone: Option<i32>,
}

// ── Icon mapping ────────────────────────────────────────────────────

pub fn map_condition_to_icon(weather_id: i32) -> WeatherIcon {
    match weather_id {
        200..=299 => WeatherIcon::Thunderstorm,
        300..=399 => WeatherIcon::Drizzle,
        500..=504 => WeatherIcon::Rain,
        511 => WeatherIcon::Snow,
        520..=599 => WeatherIcon::ShowerRain,
        600..=699 => WeatherIcon::Snow,
        701 => WeatherIcon::Mist,
        711..=762 => WeatherIcon::Atmosphere,
        771..=799 => WeatherIcon::Fog,
        800 => WeatherIcon::Clear,
        801 => WeatherIcon::FewClouds,
        802 => WeatherIcon::ScatteredClouds,
        803 => WeatherIcon::BrokenClouds,
        804 => WeatherIcon::Overcast,
        _ => WeatherIcon::Unknown,
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ── Parsing ─────────────────────────────────────────────────────────

pub fn parse_current_conditions(json: &str) -> Result<CurrentConditions> {
    let root: OwmCurrentRoot = serde_json::from_str(json)?;

    let temp = match root.main.and_then(|m| m.temp) {
        Some(t) => t,
        None => bail!(
            "no temperature in response: {}",
            root.message.unwrap_or_else(|| "(no message)".to_string())
        ),
    };

    let (weather_id, description) = root
        .weather
        .and_then(|arr| arr.into_iter().next())
        .map(|w| (w.id.unwrap_or(0), w.description.unwrap_or_default()))
        .unwrap_or((0, String::new()));

    let icon = map_condition_to_icon(weather_id);
    let text = if description.is_empty() {
        icon.label().to_string()
    } else {
        capitalize(&description)
    };

    info!("conditions: id={} text={} mapped={:?}", weather_id, text, icon);

    Ok(CurrentConditions {
        temp: temp.round() as i32,
        text,
        icon,
    })
}

/// Group the 3-hour entries by local calendar day. Day 0 is today, even
/// when only its evening entries remain.
pub fn parse_forecast(json: &str) -> Result<Vec<ForecastDay>> {
    let root: OwmForecastRoot = serde_json::from_str(json)?;
    let list = match root.list {
        Some(list) if !list.is_empty() => list,
        _ => bail!(
            "forecast has no entries: {}",
            root.message
                .map(|m| m.to_string())
                .unwrap_or_else(|| "(no message)".to_string())
        ),
    };
    let tz_offset = root.city.and_then(|c| c.timezone).unwrap_or(0);

    struct DaySummary {
        yday: i32,
        year: i32,
        title: String,
        high: f64,
        low: f64,
        icon: WeatherIcon,
        icon_score: i32,
    }

    let mut days: Vec<DaySummary> = Vec::new();

    for entry in &list {
        let (dt, main) = match (entry.dt, &entry.main) {
            (Some(dt), Some(main)) => (dt, main),
            _ => continue,
        };
        let temp = match main.temp {
            Some(t) => t,
            None => continue,
        };
        let high = main.temp_max.unwrap_or(temp).max(temp);
        let low = main.temp_min.unwrap_or(temp).min(temp);

        let tm = civil(dt + tz_offset as i64);

        let idx = match days
            .iter()
            .position(|d| d.year == tm.tm_year && d.yday == tm.tm_yday)
        {
            Some(i) => i,
            None => {
                if days.len() >= FORECAST_MAX_DAYS {
                    continue;
                }
                days.push(DaySummary {
                    yday: tm.tm_yday,
                    year: tm.tm_year,
                    title: weekday_abbrev(&tm).to_ascii_uppercase(),
                    high,
                    low,
                    icon: WeatherIcon::Unknown,
                    icon_score: -1,
                });
                days.len() - 1
            }
        };

        let day = &mut days[idx];
        day.high = day.high.max(high);
        day.low = day.low.min(low);

        let weather_id = entry
            .weather
            .as_ref()
            .and_then(|arr| arr.first())
            .and_then(|w| w.id)
            .unwrap_or(0);

        // Prefer the midday entry for the day's icon.
        let score = match tm.tm_hour {
            12 => 3,
            9 | 15 => 2,
            _ => 1,
        };
        if score > day.icon_score {
            day.icon = map_condition_to_icon(weather_id);
            day.icon_score = score;
        }
    }

    if days.is_empty() {
        bail!("forecast entries carried no usable data");
    }

    Ok(days
        .into_iter()
        .map(|d| ForecastDay {
            title: d.title,
            icon: d.icon,
            low: d.low.round() as i32,
            high: d.high.round() as i32,
        })
        .collect())
}

// ── Requests ────────────────────────────────────────────────────────

/// Percent-encode everything outside the URL unreserved set.
fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

/// Location, language and units of the remote queries.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherQuery {
    pub api_key: String,
    pub language: String,
    pub country: String,
    pub city: String,
    pub is_metric: bool,
}

impl WeatherQuery {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            api_key: cfg.weather_api_key.clone(),
            language: cfg.weather_language.clone(),
            country: cfg.weather_country.clone(),
            city: cfg.weather_city.clone(),
            is_metric: cfg.is_metric,
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}?q={},{}&lang={}&units={}&appid={}",
            OWM_BASE,
            endpoint,
            encode_component(&self.city),
            encode_component(&self.country),
            encode_component(&self.language.to_ascii_lowercase()),
            if self.is_metric { "metric" } else { "imperial" },
            encode_component(&self.api_key),
        )
    }

    pub fn conditions_url(&self) -> String {
        self.url("weather")
    }

    pub fn forecast_url(&self) -> String {
        self.url("forecast")
    }

    /// Unit suffix of remote temperatures.
    pub fn unit(&self) -> &'static str {
        if self.is_metric {
            "°C"
        } else {
            "°F"
        }
    }
}

/// Last successfully fetched weather. A failed update leaves it untouched.
#[derive(Debug, Clone)]
pub struct WeatherStation {
    query: WeatherQuery,
    current: Option<CurrentConditions>,
    forecast: Vec<ForecastDay>,
}

impl WeatherStation {
    pub fn new(query: WeatherQuery) -> Self {
        Self {
            query,
            current: None,
            forecast: Vec::new(),
        }
    }

    pub fn query(&self) -> &WeatherQuery {
        &self.query
    }

    pub fn current(&self) -> Option<&CurrentConditions> {
        self.current.as_ref()
    }

    pub fn forecast(&self) -> &[ForecastDay] {
        &self.forecast
    }

    pub fn update_conditions<H>(&mut self, http: &mut H) -> Result<()>
    where
        H: HttpGet + ?Sized,
    {
        info!("Fetching current conditions...");
        let body = http.get(&self.query.conditions_url())?;
        match parse_current_conditions(&body) {
            Ok(current) => {
                self.current = Some(current);
                Ok(())
            }
            Err(e) => {
                warn!("conditions response rejected, keeping previous");
                Err(e)
            }
        }
    }

    pub fn update_forecast<H>(&mut self, http: &mut H) -> Result<()>
    where
        H: HttpGet + ?Sized,
    {
        info!("Fetching forecast...");
        let body = http.get(&self.query.forecast_url())?;
        match parse_forecast(&body) {
            Ok(days) => {
                info!("forecast: {} days", days.len());
                self.forecast = days;
                Ok(())
            }
            Err(e) => {
                warn!("forecast response rejected, keeping previous");
                Err(e)
            }
        }
    }
}
