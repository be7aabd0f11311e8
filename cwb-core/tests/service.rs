//! Integration tests for WeatherService against a mock CWB datastore.

use std::sync::Arc;
use std::time::Duration;

use cwb_core::{CwbClient, ErrorKind, FetchParams, WeatherService};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn observation_body() -> serde_json::Value {
    serde_json::json!({
        "records": {
            "location": [{
                "locationName": "臺北",
                "time": { "obsTime": "2026-08-31 14:10:00" },
                "weatherElement": [
                    { "elementName": "WDSD", "elementValue": "2.1" },
                    { "elementName": "TEMP", "elementValue": "27.5" },
                    { "elementName": "HUMD", "elementValue": "0.81" }
                ]
            }]
        }
    })
}

fn forecast_body() -> serde_json::Value {
    serde_json::json!({
        "records": {
            "location": [{
                "weatherElement": [
                    {
                        "elementName": "Wx",
                        "time": [
                            { "parameter": { "parameterName": "多雲", "parameterValue": "4" } },
                            { "parameter": { "parameterName": "晴", "parameterValue": "1" } }
                        ]
                    },
                    {
                        "elementName": "PoP",
                        "time": [{ "parameter": { "parameterName": "30" } }]
                    },
                    {
                        "elementName": "CI",
                        "time": [{ "parameter": { "parameterName": "舒適" } }]
                    }
                ]
            }]
        }
    })
}

async fn mount_observation(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/O-A0003-001"))
        .and(query_param("Authorization", "TEST-KEY"))
        .and(query_param("locationName", "臺北"))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn mount_forecast(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/F-C0032-001"))
        .and(query_param("Authorization", "TEST-KEY"))
        .and(query_param("locationName", "臺北市"))
        .respond_with(template)
        .mount(server)
        .await;
}

fn service_for(server: &MockServer) -> WeatherService {
    let client = CwbClient::new(server.uri(), "TEST-KEY");
    let params = FetchParams { location_name: "臺北".into(), city_name: "臺北市".into() };
    WeatherService::new(client, params)
}

#[tokio::test]
async fn successful_cycle_merges_both_sources() {
    let server = MockServer::start().await;
    mount_observation(&server, ResponseTemplate::new(200).set_body_json(observation_body())).await;
    mount_forecast(&server, ResponseTemplate::new(200).set_body_json(forecast_body())).await;

    let service = service_for(&server);
    service.refresh().await.expect("cycle must succeed");

    let snapshot = service.snapshot();
    assert!(!snapshot.is_loading);
    assert!(snapshot.last_error.is_none());

    // Observation half.
    assert_eq!(snapshot.location_name, "臺北");
    assert_eq!(snapshot.temperature, 27.5);
    assert_eq!(snapshot.wind_speed, 2.1);

    // Forecast half.
    assert_eq!(snapshot.description, "多雲");
    assert_eq!(snapshot.weather_code, 4);
    assert_eq!(snapshot.rain_possibility, 30.0);
    assert_eq!(snapshot.comfortability, "舒適");
}

#[tokio::test]
async fn refresh_publishes_loading_before_responses_arrive() {
    let server = MockServer::start().await;
    let delayed = ResponseTemplate::new(200)
        .set_body_json(observation_body())
        .set_delay(Duration::from_millis(250));
    mount_observation(&server, delayed).await;
    mount_forecast(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(forecast_body())
            .set_delay(Duration::from_millis(250)),
    )
    .await;

    let service = Arc::new(service_for(&server));
    let mut receiver = service.subscribe();

    let cycle = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.refresh().await })
    };

    // First publication is the loading marker, well before the delayed
    // responses settle.
    receiver.changed().await.expect("loading snapshot");
    assert!(receiver.borrow_and_update().is_loading);

    cycle.await.expect("task").expect("cycle must succeed");
    assert!(!service.snapshot().is_loading);
}

#[tokio::test]
async fn failed_observation_fails_the_cycle_without_partial_publish() {
    let server = MockServer::start().await;
    mount_observation(&server, ResponseTemplate::new(500).set_body_string("datastore down")).await;
    mount_forecast(&server, ResponseTemplate::new(200).set_body_json(forecast_body())).await;

    let service = service_for(&server);
    let err = service.refresh().await.expect_err("cycle must fail");
    assert_eq!(err.kind(), ErrorKind::Status);

    let snapshot = service.snapshot();
    assert!(!snapshot.is_loading, "loading flag must reset on failure");
    assert_eq!(snapshot.last_error, Some(ErrorKind::Status));

    // Nothing from the succeeding forecast half may leak out.
    assert!(snapshot.description.is_empty());
    assert_eq!(snapshot.rain_possibility, 0.0);
}

#[tokio::test]
async fn status_error_with_multibyte_body_is_reported_not_panicked() {
    let server = MockServer::start().await;
    // CJK text straddling the truncation limit used for error bodies.
    let body = format!("{}錯誤：資料庫暫時無法使用", "x".repeat(199));
    mount_observation(&server, ResponseTemplate::new(500).set_body_string(body)).await;
    mount_forecast(&server, ResponseTemplate::new(200).set_body_json(forecast_body())).await;

    let service = service_for(&server);
    let err = service.refresh().await.expect_err("cycle must fail");

    assert_eq!(err.kind(), ErrorKind::Status);
    assert_eq!(service.snapshot().last_error, Some(ErrorKind::Status));
}

#[tokio::test]
async fn superseded_cycle_never_overwrites_newer_snapshot() {
    let server = MockServer::start().await;
    // Slow 臺北 cycle, fast 高雄 cycle.
    mount_observation(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(observation_body())
            .set_delay(Duration::from_millis(400)),
    )
    .await;
    mount_forecast(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(forecast_body())
            .set_delay(Duration::from_millis(400)),
    )
    .await;

    let kaohsiung_observation = serde_json::json!({
        "records": {
            "location": [{
                "locationName": "高雄",
                "time": { "obsTime": "2026-08-31 14:10:00" },
                "weatherElement": [
                    { "elementName": "WDSD", "elementValue": "3.4" },
                    { "elementName": "TEMP", "elementValue": "30.2" }
                ]
            }]
        }
    });
    Mock::given(method("GET"))
        .and(path("/O-A0003-001"))
        .and(query_param("locationName", "高雄"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kaohsiung_observation))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/F-C0032-001"))
        .and(query_param("locationName", "高雄市"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&server)
        .await;

    let service = Arc::new(service_for(&server));
    let mut receiver = service.subscribe();

    let slow = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.refresh().await })
    };
    // The slow cycle's loading marker guarantees it registered before the
    // newer cycle starts.
    receiver.changed().await.expect("loading snapshot");

    service.set_location("高雄", "高雄市").await.expect("newer cycle must succeed");
    assert_eq!(service.snapshot().location_name, "高雄");

    // The superseded cycle settles after its delayed responses; its
    // completion is discarded without error.
    slow.await.expect("task").expect("superseded cycle discards silently");

    let snapshot = service.snapshot();
    assert_eq!(snapshot.location_name, "高雄");
    assert_eq!(snapshot.temperature, 30.2);
    assert!(!snapshot.is_loading);
}

#[tokio::test]
async fn failure_retains_previously_published_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/O-A0003-001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(observation_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/O-A0003-001"))
        .respond_with(ResponseTemplate::new(500).set_body_string("datastore down"))
        .mount(&server)
        .await;
    mount_forecast(&server, ResponseTemplate::new(200).set_body_json(forecast_body())).await;

    let service = service_for(&server);
    service.refresh().await.expect("first cycle must succeed");

    service.refresh().await.expect_err("second cycle must fail");

    let snapshot = service.snapshot();
    assert_eq!(snapshot.temperature, 27.5, "stale fields must survive a failed cycle");
    assert_eq!(snapshot.description, "多雲");
    assert!(!snapshot.is_loading);
    assert_eq!(snapshot.last_error, Some(ErrorKind::Status));
}

#[tokio::test]
async fn repeated_refresh_is_structurally_equal() {
    let server = MockServer::start().await;
    mount_observation(&server, ResponseTemplate::new(200).set_body_json(observation_body())).await;
    mount_forecast(&server, ResponseTemplate::new(200).set_body_json(forecast_body())).await;

    let service = service_for(&server);

    service.refresh().await.expect("first cycle");
    let first = service.snapshot();

    service.refresh().await.expect("second cycle");
    let second = service.snapshot();

    assert_eq!(first, second);
}

#[tokio::test]
async fn set_location_triggers_a_cycle_with_new_params() {
    let server = MockServer::start().await;
    mount_observation(&server, ResponseTemplate::new(200).set_body_json(observation_body())).await;
    mount_forecast(&server, ResponseTemplate::new(200).set_body_json(forecast_body())).await;

    // 高雄 variants of the two datasets.
    let kaohsiung_observation = serde_json::json!({
        "records": {
            "location": [{
                "locationName": "高雄",
                "time": { "obsTime": "2026-08-31 14:10:00" },
                "weatherElement": [
                    { "elementName": "WDSD", "elementValue": "3.4" },
                    { "elementName": "TEMP", "elementValue": "30.2" }
                ]
            }]
        }
    });
    Mock::given(method("GET"))
        .and(path("/O-A0003-001"))
        .and(query_param("locationName", "高雄"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kaohsiung_observation))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/F-C0032-001"))
        .and(query_param("locationName", "高雄市"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&server)
        .await;

    let service = service_for(&server);
    service.refresh().await.expect("initial cycle");
    assert_eq!(service.snapshot().location_name, "臺北");

    service.set_location("高雄", "高雄市").await.expect("cycle after param change");

    let snapshot = service.snapshot();
    assert_eq!(snapshot.location_name, "高雄");
    assert_eq!(snapshot.temperature, 30.2);
}
