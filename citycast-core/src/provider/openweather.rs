use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::{
    config::DEFAULT_API_BASE,
    model::{Coordinates, ForecastReading, RawForecast, WeatherPayload},
};

use super::{
    CITY_NOT_FOUND, FORECAST_FAILED, FetchError, ForecastResult, LOCATION_WEATHER_FAILED,
    WeatherResult, WeatherSource,
};

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClientBuilder {
    api_key: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl OpenWeatherClientBuilder {
    /// Endpoint root, e.g. `https://api.openweathermap.org/data/2.5`.
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> reqwest::Result<OpenWeatherClient> {
        let mut http = Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }

        Ok(OpenWeatherClient { api_key: self.api_key, base_url: self.base_url, http: http.build()? })
    }
}

impl OpenWeatherClient {
    pub fn builder(api_key: String) -> OpenWeatherClientBuilder {
        OpenWeatherClientBuilder { api_key, base_url: DEFAULT_API_BASE.to_string(), timeout: None }
    }

    /// GET `{base}/{endpoint}` with metric units. Non-success statuses become
    /// `failure_message` without reading the body.
    async fn get_json<T>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        failure_message: &'static str,
    ) -> Result<T, FetchError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/{}", self.base_url, endpoint);

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await?;

        let status = res.status();
        debug!(endpoint, status = status.as_u16(), "OpenWeather response");

        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), message: failure_message });
        }

        let body = res.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    coord: OwCoord,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    dt_txt: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn first_icon(weather: Vec<OwWeather>) -> Result<String, FetchError> {
    weather
        .into_iter()
        .next()
        .map(|w| w.icon)
        .ok_or_else(|| FetchError::Transport("response contained no weather condition".into()))
}

impl OwCurrentResponse {
    fn into_payload(self) -> Result<WeatherPayload, FetchError> {
        Ok(WeatherPayload {
            name: self.name,
            temperature_c: self.main.temp,
            humidity_pct: self.main.humidity,
            wind_speed: self.wind.speed,
            icon: first_icon(self.weather)?,
            coord: Coordinates { lat: self.coord.lat, lon: self.coord.lon },
        })
    }
}

impl OwForecastEntry {
    fn into_reading(self) -> Result<ForecastReading, FetchError> {
        Ok(ForecastReading {
            dt: self.dt,
            dt_txt: self.dt_txt,
            temperature_c: self.main.temp,
            humidity_pct: self.main.humidity,
            wind_speed: self.wind.speed,
            icon: first_icon(self.weather)?,
        })
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn fetch_by_city(&self, city: &str) -> WeatherResult {
        let parsed: OwCurrentResponse =
            self.get_json("weather", &[("q", city.to_string())], CITY_NOT_FOUND).await?;
        parsed.into_payload()
    }

    async fn fetch_by_coords(&self, lat: f64, lon: f64) -> WeatherResult {
        let parsed: OwCurrentResponse = self
            .get_json(
                "weather",
                &[("lat", lat.to_string()), ("lon", lon.to_string())],
                LOCATION_WEATHER_FAILED,
            )
            .await?;
        parsed.into_payload()
    }

    async fn fetch_forecast(&self, lat: f64, lon: f64) -> ForecastResult {
        let parsed: OwForecastResponse = self
            .get_json(
                "forecast",
                &[("lat", lat.to_string()), ("lon", lon.to_string())],
                FORECAST_FAILED,
            )
            .await?;

        let readings =
            parsed.list.into_iter().map(OwForecastEntry::into_reading).collect::<Result<_, _>>()?;
        Ok(RawForecast { readings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_trims_trailing_slash() {
        let client = OpenWeatherClient::builder("KEY".into())
            .base_url("http://localhost:1234/data/2.5/")
            .build()
            .unwrap();
        assert_eq!(client.base_url, "http://localhost:1234/data/2.5");
    }

    #[test]
    fn current_response_maps_to_payload() {
        let parsed: OwCurrentResponse = serde_json::from_value(serde_json::json!({
            "name": "Paris",
            "main": { "temp": 18, "humidity": 60, "pressure": 1012 },
            "wind": { "speed": 3.5 },
            "weather": [{ "icon": "01d", "main": "Clear" }],
            "coord": { "lat": 48.85, "lon": 2.35 }
        }))
        .unwrap();

        let payload = parsed.into_payload().unwrap();
        assert_eq!(payload.name, "Paris");
        assert_eq!(payload.temperature_c, 18.0);
        assert_eq!(payload.humidity_pct, 60);
        assert_eq!(payload.icon, "01d");
        assert_eq!(payload.coord, Coordinates { lat: 48.85, lon: 2.35 });
    }

    #[test]
    fn missing_condition_is_a_transport_error() {
        let parsed: OwCurrentResponse = serde_json::from_value(serde_json::json!({
            "name": "Nowhere",
            "main": { "temp": 1, "humidity": 1 },
            "wind": { "speed": 0 },
            "weather": [],
            "coord": { "lat": 0, "lon": 0 }
        }))
        .unwrap();

        let err = parsed.into_payload().unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
