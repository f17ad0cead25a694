use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{Config, model::Coordinates};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// A locator exists but could not produce a position.
    #[error("Unable to access location")]
    Unavailable,

    /// No way of locating the user is configured.
    #[error("Geolocation not supported by your browser")]
    Unsupported,
}

#[async_trait]
pub trait Locator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, LocationError>;
}

/// Coordinates given up front, e.g. on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocator(pub Coordinates);

#[async_trait]
impl Locator for FixedLocator {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// Approximate position from the caller's public IP address.
#[derive(Debug, Clone)]
pub struct IpLocator {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpLocator {
    pub fn new(url: &str, timeout: Option<Duration>) -> reqwest::Result<Self> {
        let mut http = Client::builder();
        if let Some(timeout) = timeout {
            http = http.timeout(timeout);
        }
        Ok(Self { url: url.to_string(), http: http.build()? })
    }

    async fn lookup(&self) -> reqwest::Result<IpLookupResponse> {
        self.http.get(&self.url).send().await?.error_for_status()?.json().await
    }
}

#[async_trait]
impl Locator for IpLocator {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        match self.lookup().await {
            Ok(IpLookupResponse { lat: Some(lat), lon: Some(lon) }) => {
                debug!(lat, lon, "Resolved location from IP");
                Ok(Coordinates { lat, lon })
            }
            Ok(_) => {
                warn!("IP lookup returned no coordinates");
                Err(LocationError::Unavailable)
            }
            Err(err) => {
                warn!(error = %err, "IP lookup failed");
                Err(LocationError::Unavailable)
            }
        }
    }
}

/// Pick a locator: explicit coordinates win, then the configured IP lookup.
/// `None` means location lookups are unsupported.
pub fn locator_from_config(
    config: &Config,
    explicit: Option<Coordinates>,
) -> anyhow::Result<Option<Box<dyn Locator>>> {
    if let Some(coords) = explicit {
        return Ok(Some(Box::new(FixedLocator(coords))));
    }
    if !config.location.enabled {
        return Ok(None);
    }

    let locator = IpLocator::new(&config.location.lookup_url, config.http_timeout())?;
    Ok(Some(Box::new(locator)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(LocationError::Unavailable.to_string(), "Unable to access location");
        assert_eq!(
            LocationError::Unsupported.to_string(),
            "Geolocation not supported by your browser"
        );
    }

    #[tokio::test]
    async fn explicit_coordinates_take_precedence() {
        let mut cfg = Config::default();
        cfg.location.enabled = false;

        let coords = Coordinates { lat: 1.5, lon: -2.0 };
        let locator = locator_from_config(&cfg, Some(coords)).unwrap().unwrap();
        assert_eq!(locator.locate().await.unwrap(), coords);
    }

    #[test]
    fn disabled_location_has_no_locator() {
        let mut cfg = Config::default();
        cfg.location.enabled = false;

        assert!(locator_from_config(&cfg, None).unwrap().is_none());
        assert!(locator_from_config(&Config::default(), None).unwrap().is_some());
    }
}
