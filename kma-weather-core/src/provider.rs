use crate::{ResolvedSettings, WeatherError, WeatherOutcome, provider::kma::KmaProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod kma;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current observation for a free-text place name. Failures come back as
    /// [`WeatherOutcome::Error`], never as a panic.
    async fn current_weather(&self, city: &str) -> WeatherOutcome;
}

/// Construct the KMA provider from resolved settings.
///
/// A missing API key is not an error here: it is logged once, and every
/// lookup then fails fast with an error result.
pub fn provider_from_settings(
    settings: ResolvedSettings,
) -> Result<Box<dyn WeatherProvider>, WeatherError> {
    if settings.api_key.is_none() {
        tracing::warn!(
            "KMA_API_KEY is not set; weather lookups will fail until an API key is configured"
        );
    }

    Ok(Box::new(KmaProvider::new(settings)?))
}
