//! One user action in, one view out.

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    location::{LocationError, Locator},
    model::{Coordinates, ForecastPayload, WeatherPayload},
    presenter::{CurrentDisplay, DayDisplay, ErrorDisplay, WeatherPresenter},
    provider::WeatherSource,
    recent::{KeyValueStore, RecentCitiesStore},
};

pub const EMPTY_CITY: &str = "Please enter a city name";

/// What to show after an action resolves: weather (with the forecast when it
/// could be fetched) or an error, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum View {
    Weather { current: CurrentDisplay, forecast: Option<Vec<DayDisplay>> },
    Error(ErrorDisplay),
}

impl View {
    pub fn is_error(&self) -> bool {
        matches!(self, View::Error(_))
    }
}

#[derive(Debug)]
pub struct Lookup<S: KeyValueStore> {
    source: Box<dyn WeatherSource>,
    locator: Option<Box<dyn Locator>>,
    recent: RecentCitiesStore<S>,
    presenter: WeatherPresenter,
}

impl<S: KeyValueStore> Lookup<S> {
    pub fn new(
        source: Box<dyn WeatherSource>,
        locator: Option<Box<dyn Locator>>,
        recent: RecentCitiesStore<S>,
        presenter: WeatherPresenter,
    ) -> Self {
        Self { source, locator, recent, presenter }
    }

    pub fn recent(&self) -> &[String] {
        self.recent.list()
    }

    /// Look up a typed city name; on success it is remembered as recent.
    pub async fn search(&mut self, input: &str) -> View {
        let city = input.trim();
        if city.is_empty() {
            return self.error(EMPTY_CITY);
        }

        match self.source.fetch_by_city(city).await {
            Ok(payload) => {
                if let Err(err) = self.recent.add(city) {
                    warn!(error = %err, "Could not persist recent cities");
                }
                let coords = payload.coord;
                self.with_forecast(payload, coords).await
            }
            Err(err) => {
                info!(city, status = ?err.status(), "City lookup failed");
                self.error(err.to_string())
            }
        }
    }

    /// Look up a city picked from the recent list. The list is left untouched.
    pub async fn search_recent(&mut self, city: &str) -> View {
        match self.source.fetch_by_city(city).await {
            Ok(payload) => {
                let coords = payload.coord;
                self.with_forecast(payload, coords).await
            }
            Err(err) => self.error(err.to_string()),
        }
    }

    /// Look up weather at the caller's position.
    pub async fn locate(&mut self) -> View {
        let coords = match &self.locator {
            Some(locator) => locator.locate().await,
            None => Err(LocationError::Unsupported),
        };

        let Coordinates { lat, lon } = match coords {
            Ok(coords) => coords,
            Err(err) => return self.error(err.to_string()),
        };

        match self.source.fetch_by_coords(lat, lon).await {
            Ok(payload) => self.with_forecast(payload, Coordinates { lat, lon }).await,
            Err(err) => self.error(err.to_string()),
        }
    }

    async fn with_forecast(&self, payload: WeatherPayload, at: Coordinates) -> View {
        let current = self.presenter.format_current(&payload);

        let forecast = match self.source.fetch_forecast(at.lat, at.lon).await {
            Ok(raw) => Some(self.presenter.format_forecast(&ForecastPayload::from(&raw))),
            Err(err) => {
                warn!(error = %err, "Forecast unavailable");
                None
            }
        };

        View::Weather { current, forecast }
    }

    fn error(&self, message: impl Into<String>) -> View {
        View::Error(self.presenter.error_view(message))
    }
}
