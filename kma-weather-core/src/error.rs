use crate::model::ErrorResult;

/// Longest raw payload excerpt attached to protocol errors.
pub const RAW_EXCERPT_CHARS: usize = 300;
/// Longest trace excerpt attached to internal errors.
pub const TRACE_EXCERPT_CHARS: usize = 500;

/// Everything that can abort a weather lookup.
///
/// Unparseable individual values are not represented here: they are skipped
/// during normalization and never fail the call.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("API 키가 설정되지 않았습니다. 환경 변수 KMA_API_KEY를 확인하세요.")]
    MissingApiKey,

    #[error("API 요청 오류: {0}")]
    Transport(String),

    #[error("API 요청 오류: HTTP {0}")]
    HttpStatus(u16),

    #[error("기상청 API 응답 형식이 올바르지 않습니다.")]
    MissingEnvelope { raw: String },

    #[error("기상청 API 오류: {message} (코드 {code})")]
    Upstream { code: String, message: String },

    #[error("기상청 API에서 날씨 데이터를 찾을 수 없습니다.")]
    MissingItems { raw: String },

    #[error("데이터 처리 오류: {message}")]
    Internal { message: String, trace: String },
}

impl WeatherError {
    pub fn internal(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut trace = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            trace.push_str("\ncaused by: ");
            trace.push_str(&cause.to_string());
            source = cause.source();
        }

        WeatherError::Internal {
            message: err.to_string(),
            trace,
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => WeatherError::HttpStatus(status.as_u16()),
            None => WeatherError::Transport(err.to_string()),
        }
    }
}

impl From<WeatherError> for ErrorResult {
    fn from(err: WeatherError) -> Self {
        let message = err.to_string();
        match err {
            WeatherError::MissingEnvelope { raw } | WeatherError::MissingItems { raw } => {
                ErrorResult {
                    message,
                    raw_response: Some(truncate_chars(&raw, RAW_EXCERPT_CHARS)),
                    trace: None,
                }
            }
            WeatherError::Internal { trace, .. } => ErrorResult {
                message,
                raw_response: None,
                trace: Some(truncate_chars(&trace, TRACE_EXCERPT_CHARS)),
            },
            _ => ErrorResult::new(message),
        }
    }
}

/// First `max` characters of `s`. Counts chars, not bytes, so Hangul is never
/// cut mid-codepoint.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "가".repeat(400);
        let cut = truncate_chars(&s, RAW_EXCERPT_CHARS);
        assert_eq!(cut.chars().count(), RAW_EXCERPT_CHARS);
        assert_eq!(truncate_chars("short", 300), "short");
    }

    #[test]
    fn upstream_error_message_carries_upstream_text() {
        let res = ErrorResult::from(WeatherError::Upstream {
            code: "01".into(),
            message: "APPLICATION_ERROR".into(),
        });
        assert_eq!(res.message, "기상청 API 오류: APPLICATION_ERROR (코드 01)");
        assert!(res.raw_response.is_none());
        assert!(res.trace.is_none());
    }

    #[test]
    fn protocol_errors_attach_truncated_raw_excerpt() {
        let raw = "x".repeat(1000);
        let res = ErrorResult::from(WeatherError::MissingItems { raw });
        assert_eq!(res.raw_response.map(|r| r.len()), Some(RAW_EXCERPT_CHARS));
    }

    #[test]
    fn transport_and_status_messages_are_korean() {
        assert_eq!(
            WeatherError::HttpStatus(503).to_string(),
            "API 요청 오류: HTTP 503"
        );
        assert_eq!(
            WeatherError::MissingEnvelope { raw: String::new() }.to_string(),
            "기상청 API 응답 형식이 올바르지 않습니다."
        );
    }

    #[test]
    fn internal_errors_attach_truncated_trace() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let res = ErrorResult::from(WeatherError::internal(&parse_err));
        assert!(res.message.starts_with("데이터 처리 오류: "));
        let trace = res.trace.expect("internal error carries a trace");
        assert!(trace.chars().count() <= TRACE_EXCERPT_CHARS);
    }

    #[test]
    fn missing_key_is_plain_message() {
        let res = ErrorResult::from(WeatherError::MissingApiKey);
        assert!(res.message.starts_with("API 키가 설정되지 않았습니다."));
        assert!(res.message.contains("KMA_API_KEY"));
        assert!(res.raw_response.is_none());
    }
}
