use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    ResolvedSettings,
    base_time::ObservationWindow,
    error::WeatherError,
    location::{LocationResolver, Resolution},
    model::{ErrorResult, NormalizedWeather, Observation, PrecipitationType, WeatherOutcome},
};

use super::WeatherProvider;

/// Path of the ultra-short-term observation endpoint under the base URL.
pub const ULTRA_SRT_NCST_PATH: &str = "/getUltraSrtNcst";

const SUCCESS_CODE: &str = "00";
const NUM_OF_ROWS: &str = "10";
const PAGE_NO: &str = "1";

/// Client for the KMA near-real-time ground observation API.
#[derive(Debug, Clone)]
pub struct KmaProvider {
    settings: ResolvedSettings,
    resolver: LocationResolver,
    http: Client,
}

impl KmaProvider {
    pub fn new(settings: ResolvedSettings) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            settings,
            resolver: LocationResolver::default(),
            http,
        })
    }

    pub fn with_resolver(mut self, resolver: LocationResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    /// Fetch the latest published observation for `city`.
    pub async fn fetch(&self, city: &str) -> WeatherOutcome {
        self.fetch_with_window(city, &ObservationWindow::current()).await
    }

    /// Fetch the observation batch labelled by `window` for `city`.
    pub async fn fetch_with_window(
        &self,
        city: &str,
        window: &ObservationWindow,
    ) -> WeatherOutcome {
        let resolution = self.resolver.resolve(city);
        self.fetch_resolved(&resolution, window).await
    }

    /// Fetch for a location that has already been resolved.
    pub async fn fetch_resolved(
        &self,
        resolution: &Resolution,
        window: &ObservationWindow,
    ) -> WeatherOutcome {
        match self.try_fetch(resolution, window).await {
            Ok(weather) => weather.into(),
            Err(err) => {
                tracing::warn!(location = resolution.name(), error = %err, "weather lookup failed");
                ErrorResult::from(err).into()
            }
        }
    }

    async fn try_fetch(
        &self,
        resolution: &Resolution,
        window: &ObservationWindow,
    ) -> Result<NormalizedWeather, WeatherError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(WeatherError::MissingApiKey)?;

        let url = format!("{}{}", self.settings.base_url, ULTRA_SRT_NCST_PATH);
        let nx = resolution.nx().to_string();
        let ny = resolution.ny().to_string();

        tracing::debug!(
            location = resolution.name(),
            base_date = %window.base_date,
            base_time = %window.base_time,
            %nx,
            %ny,
            "requesting ultra-short-term observation"
        );

        let res = self
            .http
            .get(&url)
            .query(&[
                ("authKey", api_key),
                ("dataType", "JSON"),
                ("numOfRows", NUM_OF_ROWS),
                ("pageNo", PAGE_NO),
                ("base_date", window.base_date.as_str()),
                ("base_time", window.base_time.as_str()),
                ("nx", nx.as_str()),
                ("ny", ny.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(WeatherError::HttpStatus(status.as_u16()));
        }

        let body = res.text().await?;
        tracing::debug!(bytes = body.len(), "received observation payload");

        let items = parse_items(&body)?;
        Ok(normalize(&items, resolution.name(), window))
    }
}

#[async_trait]
impl WeatherProvider for KmaProvider {
    async fn current_weather(&self, city: &str) -> WeatherOutcome {
        self.fetch(city).await
    }
}

#[derive(Debug, Deserialize)]
struct KmaResponse {
    header: KmaHeader,
    #[serde(default)]
    body: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KmaHeader {
    result_code: String,
    #[serde(default)]
    result_msg: String,
}

/// Observation value; KMA usually sends strings but occasionally numbers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Text(String),
    Number(f64),
}

impl RawValue {
    fn as_text(&self) -> String {
        match self {
            RawValue::Text(s) => s.trim().to_string(),
            RawValue::Number(n) => n.to_string(),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        let n = match self {
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
            RawValue::Number(n) => *n,
        };
        n.is_finite().then_some(n)
    }
}

/// One `response.body.items.item[]` element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KmaItem {
    pub category: String,
    pub obsr_value: RawValue,
}

impl KmaItem {
    pub fn new(category: &str, value: &str) -> Self {
        Self {
            category: category.to_string(),
            obsr_value: RawValue::Text(value.to_string()),
        }
    }
}

/// Validate the envelope and pull out the item list.
///
/// An empty `item` array is a valid (if uninformative) batch; only a missing
/// or non-array `item` is an error.
fn parse_items(body: &str) -> Result<Vec<KmaItem>, WeatherError> {
    let data: Value = serde_json::from_str(body).map_err(|e| WeatherError::internal(&e))?;

    let Some(envelope) = data.get("response") else {
        return Err(WeatherError::MissingEnvelope { raw: body.to_string() });
    };

    let response: KmaResponse =
        serde_json::from_value(envelope.clone()).map_err(|e| WeatherError::internal(&e))?;

    if response.header.result_code != SUCCESS_CODE {
        return Err(WeatherError::Upstream {
            code: response.header.result_code,
            message: response.header.result_msg,
        });
    }

    let items = response
        .body
        .as_ref()
        .and_then(|b| b.get("items"))
        .and_then(|i| i.get("item"))
        .filter(|item| item.is_array());

    let Some(items) = items else {
        return Err(WeatherError::MissingItems { raw: body.to_string() });
    };

    serde_json::from_value(items.clone()).map_err(|e| WeatherError::internal(&e))
}

/// Map raw category/value items onto an [`Observation`].
///
/// Unknown categories are ignored. A value that does not parse is logged and
/// skipped, leaving that field at its default.
pub fn normalize(
    items: &[KmaItem],
    location: &str,
    window: &ObservationWindow,
) -> NormalizedWeather {
    let mut weather = Observation::default();

    for item in items {
        let slot = match item.category.as_str() {
            "T1H" => &mut weather.temperature,
            "REH" => &mut weather.humidity,
            "VEC" => &mut weather.wind_direction,
            "WSD" => &mut weather.wind_speed,
            "RN1" => {
                match item.obsr_value.as_f64() {
                    Some(v) => weather.rainfall = v,
                    None => skip(item),
                }
                continue;
            }
            "PTY" => {
                weather.precipitation_type =
                    PrecipitationType::from_code(&item.obsr_value.as_text());
                continue;
            }
            _ => continue,
        };

        match item.obsr_value.as_f64() {
            Some(v) => *slot = Some(v),
            None => skip(item),
        }
    }

    if weather.temperature.is_none() {
        tracing::warn!(location, "observation has no temperature");
    }

    NormalizedWeather::new(location, window, weather)
}

fn skip(item: &KmaItem) {
    tracing::warn!(
        category = %item.category,
        value = ?item.obsr_value,
        "skipping unparseable observation value"
    );
}
