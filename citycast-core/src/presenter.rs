use chrono::DateTime;
use serde::Serialize;

use crate::{
    config::DEFAULT_ICON_BASE,
    model::{ForecastPayload, WeatherPayload},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentDisplay {
    pub name: String,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub icon_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayDisplay {
    /// Calendar date as `M/D/YYYY`.
    pub date: String,
    pub icon_url: String,
    pub temperature_c: f64,
    pub wind_speed: f64,
    pub humidity_pct: u8,
}

/// A failed action. Rendering one replaces weather, forecast and the recent
/// list entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDisplay {
    pub message: String,
}

/// Turns payloads into display fields. Holds only the icon host.
#[derive(Debug, Clone)]
pub struct WeatherPresenter {
    icon_base: String,
}

impl Default for WeatherPresenter {
    fn default() -> Self {
        Self::new(DEFAULT_ICON_BASE)
    }
}

impl WeatherPresenter {
    pub fn new(icon_base: &str) -> Self {
        Self { icon_base: icon_base.trim_end_matches('/').to_string() }
    }

    pub fn format_current(&self, payload: &WeatherPayload) -> CurrentDisplay {
        CurrentDisplay {
            name: payload.name.clone(),
            temperature_c: payload.temperature_c,
            humidity_pct: payload.humidity_pct,
            wind_speed: payload.wind_speed,
            icon_url: format!("{}/{}@2x.png", self.icon_base, payload.icon),
        }
    }

    pub fn format_forecast(&self, forecast: &ForecastPayload) -> Vec<DayDisplay> {
        forecast
            .days
            .iter()
            .map(|day| DayDisplay {
                date: format_date(day.dt),
                icon_url: format!("{}/{}.png", self.icon_base, day.icon),
                temperature_c: day.temperature_c,
                wind_speed: day.wind_speed,
                humidity_pct: day.humidity_pct,
            })
            .collect()
    }

    pub fn error_view(&self, message: impl Into<String>) -> ErrorDisplay {
        ErrorDisplay { message: message.into() }
    }
}

fn format_date(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%-m/%-d/%Y").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coordinates, fixtures};

    fn paris() -> WeatherPayload {
        WeatherPayload {
            name: "Paris".into(),
            temperature_c: 18.0,
            humidity_pct: 60,
            wind_speed: 3.5,
            icon: "01d".into(),
            coord: Coordinates { lat: 48.85, lon: 2.35 },
        }
    }

    #[test]
    fn current_fields_and_icon_url() {
        let view = WeatherPresenter::default().format_current(&paris());

        assert_eq!(view.name, "Paris");
        assert_eq!(view.temperature_c, 18.0);
        assert_eq!(view.humidity_pct, 60);
        assert_eq!(view.wind_speed, 3.5);
        assert_eq!(view.icon_url, "http://openweathermap.org/img/wn/01d@2x.png");
    }

    #[test]
    fn custom_icon_base_is_used() {
        let view = WeatherPresenter::new("https://icons.test/wn/").format_current(&paris());
        assert_eq!(view.icon_url, "https://icons.test/wn/01d@2x.png");
    }

    #[test]
    fn forecast_picks_noon_reading_per_day() {
        let payload = ForecastPayload::from_readings(&fixtures::readings(5));
        let days = WeatherPresenter::default().format_forecast(&payload);

        let dates: Vec<_> = days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, ["10/14/2026", "10/15/2026", "10/16/2026", "10/17/2026", "10/18/2026"]);
        assert!(days.iter().all(|d| d.icon_url.ends_with("/02d.png")));
        // Noon is the fifth reading of each day.
        assert_eq!(days[0].temperature_c, 14.0);
        assert_eq!(days[1].temperature_c, 22.0);
    }

    #[test]
    fn short_forecast_returns_what_exists() {
        let presenter = WeatherPresenter::default();
        let mut readings = fixtures::readings(2);
        readings.truncate(5);

        let payload = ForecastPayload::from_readings(&readings);
        assert_eq!(presenter.format_forecast(&payload).len(), 1);
        assert!(presenter.format_forecast(&ForecastPayload::default()).is_empty());
    }

    #[test]
    fn error_view_wraps_message() {
        let view = WeatherPresenter::default().error_view("City not found");
        assert_eq!(view.message, "City not found");
    }
}
