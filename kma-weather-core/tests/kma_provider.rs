//! Integration tests for KmaProvider using wiremock.

use kma_weather_core::{
    KmaProvider, LocationEntry, LocationResolver, MatchKind, Observation, ObservationWindow,
    ResolvedSettings, WeatherOutcome,
};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn window() -> ObservationWindow {
    ObservationWindow {
        base_date: "20240315".into(),
        base_time: "1400".into(),
    }
}

fn provider(server: &MockServer) -> KmaProvider {
    let settings = ResolvedSettings::default()
        .with_api_key("TEST_KEY")
        .with_base_url(server.uri());
    KmaProvider::new(settings).unwrap()
}

fn envelope(code: &str, msg: &str, items: Value) -> Value {
    json!({
        "response": {
            "header": { "resultCode": code, "resultMsg": msg },
            "body": {
                "dataType": "JSON",
                "items": { "item": items },
                "pageNo": 1,
                "numOfRows": 10,
                "totalCount": 8
            }
        }
    })
}

fn item(category: &str, value: &str) -> Value {
    json!({
        "baseDate": "20240315",
        "baseTime": "1400",
        "category": category,
        "nx": 98,
        "ny": 76,
        "obsrValue": value
    })
}

async fn mount(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/getUltraSrtNcst"))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_success_normalizes_observation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/getUltraSrtNcst"))
        .and(query_param("authKey", "TEST_KEY"))
        .and(query_param("dataType", "JSON"))
        .and(query_param("numOfRows", "10"))
        .and(query_param("pageNo", "1"))
        .and(query_param("base_date", "20240315"))
        .and(query_param("base_time", "1400"))
        .and(query_param("nx", "98"))
        .and(query_param("ny", "76"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "00",
            "NORMAL_SERVICE",
            json!([
                item("PTY", "0"),
                item("REH", "71"),
                item("RN1", "0"),
                item("T1H", "14.2"),
                item("UUU", "-1.1"),
                item("VEC", "252"),
                item("VVV", "-0.4"),
                item("WSD", "1.2"),
            ]),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = provider(&server).fetch_with_window("Busan", &window()).await;
    let weather = outcome.into_result().unwrap();

    assert_eq!(weather.location, "부산");
    assert_eq!(weather.base_date, "20240315");
    assert_eq!(weather.base_time, "1400");
    assert_eq!(weather.weather.temperature, Some(14.2));
    assert_eq!(weather.weather.humidity, Some(71.0));
    assert_eq!(weather.weather.rainfall, 0.0);
    assert_eq!(weather.weather.precipitation_type.code, "0");
    assert_eq!(weather.weather.wind_direction, Some(252.0));
    assert_eq!(weather.weather.wind_speed, Some(1.2));
}

#[tokio::test]
async fn test_unknown_city_uses_default_grid() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/getUltraSrtNcst"))
        .and(query_param("nx", "60"))
        .and(query_param("ny", "127"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "00",
            "NORMAL_SERVICE",
            json!([item("T1H", "5.0")]),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let weather = provider(&server)
        .fetch_with_window("Atlantis", &window())
        .await
        .into_result()
        .unwrap();
    assert_eq!(weather.location, "서울");
}

#[tokio::test]
async fn test_injected_location_table_is_used() {
    static TABLE: &[LocationEntry] = &[
        LocationEntry {
            area: "Seoul",
            area_korean: "서울특별시",
            korean_name: "서울",
            nx: 60,
            ny: 127,
            region_code: "11B00000",
        },
        LocationEntry {
            area: "Pohang",
            area_korean: "포항시",
            korean_name: "포항",
            nx: 102,
            ny: 94,
            region_code: "11H10000",
        },
    ];

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/getUltraSrtNcst"))
        .and(query_param("nx", "102"))
        .and(query_param("ny", "94"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "00",
            "NORMAL_SERVICE",
            json!([item("T1H", "9.8")]),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = LocationResolver::new(TABLE).unwrap();
    let weather = provider(&server)
        .with_resolver(resolver)
        .fetch_with_window("pohang", &window())
        .await
        .into_result()
        .unwrap();

    assert_eq!(weather.location, "포항");
    assert_eq!(weather.weather.temperature, Some(9.8));
}

#[tokio::test]
async fn test_partial_data_still_succeeds() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(envelope(
            "00",
            "NORMAL_SERVICE",
            json!([item("T1H", "-"), item("REH", "55"), item("WSD", "2.0")]),
        )),
    )
    .await;

    let weather = provider(&server)
        .fetch_with_window("서울", &window())
        .await
        .into_result()
        .unwrap();

    assert_eq!(weather.weather.temperature, None);
    assert_eq!(weather.weather.humidity, Some(55.0));
    assert_eq!(weather.weather.wind_speed, Some(2.0));
}

#[tokio::test]
async fn test_upstream_error_code_is_reported() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "response": {
                "header": { "resultCode": "01", "resultMsg": "APPLICATION_ERROR" }
            }
        })),
    )
    .await;

    let err = provider(&server)
        .fetch_with_window("서울", &window())
        .await
        .into_result()
        .unwrap_err();

    assert!(
        err.message.starts_with("기상청 API 오류: APPLICATION_ERROR"),
        "message: {}",
        err.message
    );
    assert!(err.raw_response.is_none());
}

#[tokio::test]
async fn test_http_error_status() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(500)).await;

    let err = provider(&server)
        .fetch_with_window("서울", &window())
        .await
        .into_result()
        .unwrap_err();

    assert_eq!(err.message, "API 요청 오류: HTTP 500");
}

#[tokio::test]
async fn test_missing_envelope_includes_raw_excerpt() {
    let server = MockServer::start().await;
    let long_text = "x".repeat(1000);
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "message": long_text })),
    )
    .await;

    let err = provider(&server)
        .fetch_with_window("서울", &window())
        .await
        .into_result()
        .unwrap_err();

    let raw = err.raw_response.expect("raw excerpt attached");
    assert_eq!(raw.chars().count(), 300);
    assert!(raw.starts_with("{\"message\""));
}

#[tokio::test]
async fn test_empty_items_yields_default_observation() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(envelope("00", "NORMAL_SERVICE", json!([]))),
    )
    .await;

    let weather = provider(&server)
        .fetch_with_window("대구", &window())
        .await
        .into_result()
        .unwrap();

    assert_eq!(weather.location, "대구");
    assert_eq!(weather.weather, Observation::default());
    assert_eq!(weather.weather.rainfall, 0.0);
    assert_eq!(weather.weather.precipitation_type.code, "0");
    assert_eq!(weather.weather.precipitation_type.name, "없음");
}

#[tokio::test]
async fn test_missing_item_list_is_an_error() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "response": {
                "header": { "resultCode": "00", "resultMsg": "NORMAL_SERVICE" },
                "body": { "items": "" }
            }
        })),
    )
    .await;

    let err = provider(&server)
        .fetch_with_window("서울", &window())
        .await
        .into_result()
        .unwrap_err();

    assert_eq!(err.message, "기상청 API에서 날씨 데이터를 찾을 수 없습니다.");
    assert!(err.raw_response.is_some());
}

#[tokio::test]
async fn test_fetch_resolved_uses_given_resolution() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/getUltraSrtNcst"))
        .and(query_param("nx", "60"))
        .and(query_param("ny", "127"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "00",
            "NORMAL_SERVICE",
            json!([item("T1H", "7.5")]),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(&server);
    let resolution = provider.resolver().resolve("Atlantis");
    assert_eq!(resolution.matched_by, MatchKind::Default);
    assert!(resolution.note.is_some());

    let weather = provider
        .fetch_resolved(&resolution, &window())
        .await
        .into_result()
        .unwrap();

    assert_eq!(weather.location, "서울");
    assert_eq!(weather.weather.temperature, Some(7.5));
}

#[tokio::test]
async fn test_non_json_body_becomes_internal_error_with_trace() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200)
            .set_body_string("<OpenAPI_ServiceResponse>SERVICE ERROR</OpenAPI_ServiceResponse>"),
    )
    .await;

    let err = provider(&server)
        .fetch_with_window("서울", &window())
        .await
        .into_result()
        .unwrap_err();

    assert!(err.message.starts_with("데이터 처리 오류: "));
    let trace = err.trace.expect("trace attached");
    assert!(trace.chars().count() <= 500);
}

#[tokio::test]
async fn test_missing_api_key_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let settings = ResolvedSettings::default().with_base_url(server.uri());
    let provider = KmaProvider::new(settings).unwrap();
    let outcome = provider.fetch_with_window("서울", &window()).await;

    assert!(outcome.is_error());
    let value = serde_json::to_value(&outcome).unwrap();
    assert!(value["error"].as_str().unwrap().starts_with("API 키가 설정되지 않았습니다."));
}

#[tokio::test]
async fn test_transport_failure_is_reported() {
    // Nothing listens on port 9 (discard) in the test environment.
    let settings = ResolvedSettings::default()
        .with_api_key("TEST_KEY")
        .with_base_url("http://127.0.0.1:9");
    let provider = KmaProvider::new(settings).unwrap();

    let outcome = provider.fetch_with_window("서울", &window()).await;
    match outcome {
        WeatherOutcome::Error(err) => assert!(err.message.starts_with("API 요청 오류: ")),
        WeatherOutcome::Weather(w) => panic!("expected transport error, got {w:?}"),
    }
}
