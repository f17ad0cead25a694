use serde::{Deserialize, Serialize};

/// Marker carried in `dt_txt` by the reading taken to represent a whole day.
pub const NOON_MARKER: &str = "12:00:00";

/// Most days the forecast endpoint covers.
pub const FORECAST_DAYS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Current conditions for one location, as consumed from the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPayload {
    pub name: String,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub icon: String,
    pub coord: Coordinates,
}

/// A single 3-hour reading from the forecast endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReading {
    /// Unix timestamp (seconds).
    pub dt: i64,
    /// Provider-local label, e.g. `2026-10-14 12:00:00`.
    pub dt_txt: String,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub icon: String,
}

impl ForecastReading {
    pub fn is_noon(&self) -> bool {
        self.dt_txt.contains(NOON_MARKER)
    }
}

/// The unfiltered reading list returned by the forecast endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawForecast {
    pub readings: Vec<ForecastReading>,
}

/// Up to [`FORECAST_DAYS`] noon readings, in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    pub days: Vec<ForecastReading>,
}

impl ForecastPayload {
    pub fn from_readings(readings: &[ForecastReading]) -> Self {
        let days = daily_noon_readings(readings).cloned().collect();
        Self { days }
    }
}

impl From<&RawForecast> for ForecastPayload {
    fn from(raw: &RawForecast) -> Self {
        Self::from_readings(&raw.readings)
    }
}

/// Noon readings in the order the API lists them, capped at [`FORECAST_DAYS`].
fn daily_noon_readings(
    readings: &[ForecastReading],
) -> impl Iterator<Item = &ForecastReading> {
    readings.iter().filter(|r| r.is_noon()).take(FORECAST_DAYS)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub const DAY: i64 = 86_400;
    /// 2026-10-14 00:00:00 UTC
    pub const START: i64 = 1_791_936_000;

    /// Eight readings a day, every three hours, starting at midnight.
    pub fn readings(days: usize) -> Vec<ForecastReading> {
        (0..days * 8)
            .map(|i| {
                let dt = START + (i as i64) * 3 * 3600;
                let dt_txt = chrono::DateTime::from_timestamp(dt, 0)
                    .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default();
                ForecastReading {
                    dt,
                    dt_txt,
                    temperature_c: 10.0 + i as f64,
                    humidity_pct: 50,
                    wind_speed: 2.0,
                    icon: "02d".into(),
                }
            })
            .collect()
    }
}
