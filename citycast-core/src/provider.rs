use crate::{
    Config,
    model::{RawForecast, WeatherPayload},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

pub mod openweather;

pub const CITY_NOT_FOUND: &str = "City not found";
pub const LOCATION_WEATHER_FAILED: &str = "Unable to fetch weather for this location";
pub const FORECAST_FAILED: &str = "Unable to fetch forecast";

/// Failure of a single weather call. `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Non-success HTTP status, collapsed to the endpoint's fixed message.
    #[error("{message}")]
    Status { status: u16, message: &'static str },

    /// Anything else (connection, timeout, body decoding), surfaced verbatim.
    #[error("{0}")]
    Transport(String),
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Transport(_) => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key.
        FetchError::Transport(err.without_url().to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

pub type WeatherResult = Result<WeatherPayload, FetchError>;
pub type ForecastResult = Result<RawForecast, FetchError>;

/// Read-only access to current weather and the 3-hour forecast.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_by_city(&self, city: &str) -> WeatherResult;

    async fn fetch_by_coords(&self, lat: f64, lon: f64) -> WeatherResult;

    async fn fetch_forecast(&self, lat: f64, lon: f64) -> ForecastResult;
}

/// Construct the OpenWeather client from config.
pub fn source_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherSource>> {
    let api_key = config.resolve_api_key()?;
    let client = OpenWeatherClient::builder(api_key)
        .base_url(&config.api_base)
        .timeout(config.http_timeout())
        .build()?;

    Ok(Box::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_display_fixed_message() {
        let err = FetchError::Status { status: 404, message: CITY_NOT_FOUND };
        assert_eq!(err.to_string(), "City not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn transport_errors_display_verbatim() {
        let err = FetchError::Transport("connection refused".into());
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn decode_errors_become_transport_errors() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let text = json_err.to_string();

        let err = FetchError::from(json_err);
        assert!(matches!(err, FetchError::Transport(_)));
        assert_eq!(err.to_string(), text);
    }

    #[test]
    fn source_from_config_errors_when_missing_api_key() {
        // The environment may carry a real key; only assert when it doesn't.
        if std::env::var(crate::config::API_KEY_ENV).is_ok() {
            return;
        }
        let err = source_from_config(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn source_from_config_works_with_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());

        assert!(source_from_config(&cfg).is_ok());
    }
}
