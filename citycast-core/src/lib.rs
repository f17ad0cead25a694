//! Core library for the `citycast` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - The OpenWeather client behind the `WeatherSource` seam
//! - The recent-city store and its persistence backends
//! - Pure presentation of payloads into display fields
//! - The lookup pipeline tying one user action to one `View`
//!
//! It is used by `citycast-cli`, but has no terminal dependencies of its own.

pub mod config;
pub mod location;
pub mod lookup;
pub mod model;
pub mod presenter;
pub mod provider;
pub mod recent;

pub use config::Config;
pub use location::{FixedLocator, IpLocator, LocationError, Locator, locator_from_config};
pub use lookup::{Lookup, View};
pub use model::{Coordinates, ForecastPayload, ForecastReading, RawForecast, WeatherPayload};
pub use presenter::{CurrentDisplay, DayDisplay, ErrorDisplay, WeatherPresenter};
pub use provider::{FetchError, WeatherSource, openweather::OpenWeatherClient, source_from_config};
pub use recent::{FileStore, KeyValueStore, MemoryStore, RecentCitiesStore};
