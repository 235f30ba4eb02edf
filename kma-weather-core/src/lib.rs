//! Core library for the `kma-weather` tool.
//!
//! This crate defines:
//! - Place-name resolution onto the KMA forecast grid
//! - Observation batch timing for the near-real-time API
//! - The KMA client and normalization of its observations
//! - Configuration & credentials handling
//!
//! It is used by `kma-weather-cli`, but can also be reused by other binaries or services.

pub mod base_time;
pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;

pub use base_time::{ObservationWindow, latest_base_time};
pub use config::{Config, ResolvedSettings};
pub use error::WeatherError;
pub use location::{LocationEntry, LocationResolver, MatchKind, Resolution};
pub use model::{
    ErrorResult, NormalizedWeather, Observation, PrecipitationType, WeatherOutcome,
};
pub use provider::{WeatherProvider, kma::KmaProvider, provider_from_settings};
