use serde::{Deserialize, Serialize};

use crate::base_time::ObservationWindow;

/// Precipitation type (PTY) as published by KMA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecipitationType {
    pub code: String,
    pub name: String,
}

impl PrecipitationType {
    pub const UNKNOWN_NAME: &'static str = "알 수 없음";

    /// Look up the display name for a PTY code. Unknown codes are kept
    /// verbatim with a generic name.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim();
        let name = match code {
            "0" => "없음",
            "1" => "비",
            "2" => "비/눈",
            "3" => "눈",
            "5" => "빗방울",
            "6" => "빗방울눈날림",
            "7" => "눈날림",
            _ => Self::UNKNOWN_NAME,
        };

        Self {
            code: code.to_string(),
            name: name.to_string(),
        }
    }
}

impl Default for PrecipitationType {
    fn default() -> Self {
        Self::from_code("0")
    }
}

/// Observed values for one grid point and batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Air temperature, °C.
    pub temperature: Option<f64>,
    /// Rainfall over the last hour, mm.
    pub rainfall: f64,
    /// Relative humidity, %.
    pub humidity: Option<f64>,
    pub precipitation_type: PrecipitationType,
    /// Wind direction, degrees.
    pub wind_direction: Option<f64>,
    /// Wind speed, m/s.
    pub wind_speed: Option<f64>,
}

impl Default for Observation {
    fn default() -> Self {
        Self {
            temperature: None,
            rainfall: 0.0,
            humidity: None,
            precipitation_type: PrecipitationType::default(),
            wind_direction: None,
            wind_speed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedWeather {
    pub location: String,
    pub base_date: String,
    pub base_time: String,
    pub weather: Observation,
}

impl NormalizedWeather {
    pub fn new(location: &str, window: &ObservationWindow, weather: Observation) -> Self {
        Self {
            location: location.to_string(),
            base_date: window.base_date.clone(),
            base_time: window.base_time.clone(),
            weather,
        }
    }
}

/// Failure returned as data. Serializes as `{"error": ..}` plus optional
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    #[serde(rename = "error")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

impl ErrorResult {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            raw_response: None,
            trace: None,
        }
    }
}

/// What a weather lookup hands back to its caller: never a panic or an `Err`,
/// always one of these two shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WeatherOutcome {
    Error(ErrorResult),
    Weather(NormalizedWeather),
}

impl WeatherOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, WeatherOutcome::Error(_))
    }

    pub fn into_result(self) -> Result<NormalizedWeather, ErrorResult> {
        match self {
            WeatherOutcome::Weather(w) => Ok(w),
            WeatherOutcome::Error(e) => Err(e),
        }
    }
}

impl From<NormalizedWeather> for WeatherOutcome {
    fn from(value: NormalizedWeather) -> Self {
        WeatherOutcome::Weather(value)
    }
}

impl From<ErrorResult> for WeatherOutcome {
    fn from(value: ErrorResult) -> Self {
        WeatherOutcome::Error(value)
    }
}
