//! Integration tests for alert endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    create_test_app, empty_request, get_request, put_hazards, report_fix, send, test_config,
    TestHazard,
};

const T0: i64 = 1_700_000_000_000;

#[tokio::test]
async fn test_no_alert_initially() {
    let app = create_test_app(test_config());

    let (status, body) = send(&app, get_request("/api/v1/alert")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["alert"].is_null());
}

#[tokio::test]
async fn test_alert_raised_when_location_arrives() {
    let app = create_test_app(test_config());
    put_hazards(
        &app,
        &[TestHazard::new("h1", 40.001, -73.0, 200.0)
            .with_severity("critical")
            .with_description("Gas leak on Main St")],
    )
    .await;

    let body = report_fix(&app, 40.0, -73.0, T0).await;
    assert_eq!(body["alert"]["id"], "h1");

    let (_, body) = send(&app, get_request("/api/v1/alert")).await;
    let alert = &body["alert"];
    assert_eq!(alert["severity"], "critical");
    assert_eq!(
        alert["recommendedAction"],
        "Evacuate immediately! Seek shelter now!"
    );
    assert_eq!(alert["notification"]["title"], "Hazard Alert!");
    assert_eq!(
        alert["notification"]["body"],
        "CRITICAL: You are entering a danger zone. Gas leak on Main St"
    );
    assert_eq!(alert["notification"]["tag"], "hazard-h1");
    let km = alert["distanceKm"].as_f64().unwrap();
    assert!((km - 0.111).abs() < 0.001);
}

#[tokio::test]
async fn test_alert_not_replaced_while_active() {
    let app = create_test_app(test_config());
    report_fix(&app, 40.0, -73.0, T0).await;
    put_hazards(
        &app,
        &[
            TestHazard::new("first", 40.001, -73.0, 200.0),
            TestHazard::new("second", 40.0005, -73.0, 500.0).with_severity("critical"),
        ],
    )
    .await;

    // Walking away does not clear it, and the closer critical hazard does not replace it
    let body = report_fix(&app, 40.0004, -73.0, T0 + 5_000).await;
    assert_eq!(body["alert"]["id"], "first");

    let body = report_fix(&app, 45.0, -73.0, T0 + 10_000).await;
    assert_eq!(body["alert"]["id"], "first");
}

#[tokio::test]
async fn test_acknowledge_clears_and_suppresses() {
    let app = create_test_app(test_config());
    report_fix(&app, 40.0, -73.0, T0).await;
    put_hazards(&app, &[TestHazard::new("h1", 40.001, -73.0, 200.0)]).await;

    let (status, body) = send(&app, empty_request(Method::POST, "/api/v1/alert/acknowledge")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["acknowledgedHazardId"], "h1");
    assert_eq!(body["acknowledgedCount"], 1);
    assert!(body["alert"].is_null());

    // Still in range on the next fix, but acknowledged
    let body = report_fix(&app, 40.0001, -73.0, T0 + 5_000).await;
    assert!(body["alert"].is_null());
}

#[tokio::test]
async fn test_acknowledge_surfaces_next_hazard() {
    let app = create_test_app(test_config());
    report_fix(&app, 40.0, -73.0, T0).await;
    put_hazards(
        &app,
        &[
            TestHazard::new("a", 40.001, -73.0, 200.0),
            TestHazard::new("b", 40.0005, -73.0, 200.0),
        ],
    )
    .await;

    let (_, body) = send(&app, empty_request(Method::POST, "/api/v1/alert/acknowledge")).await;

    assert_eq!(body["acknowledgedHazardId"], "a");
    assert_eq!(body["alert"]["id"], "b");
}

#[tokio::test]
async fn test_acknowledge_without_alert_is_noop() {
    let app = create_test_app(test_config());

    let (status, body) = send(&app, empty_request(Method::POST, "/api/v1/alert/acknowledge")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["acknowledgedHazardId"].is_null());
    assert_eq!(body["acknowledgedCount"], 0);
}

#[tokio::test]
async fn test_reset_acknowledgements_retriggers() {
    let app = create_test_app(test_config());
    report_fix(&app, 40.0, -73.0, T0).await;
    put_hazards(&app, &[TestHazard::new("h1", 40.001, -73.0, 200.0)]).await;
    send(&app, empty_request(Method::POST, "/api/v1/alert/acknowledge")).await;

    let (status, body) = send(
        &app,
        empty_request(Method::DELETE, "/api/v1/alert/acknowledgements"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alert"]["id"], "h1");
}

#[tokio::test]
async fn test_restart_tracking_resets_acknowledgements() {
    let app = create_test_app(test_config());
    report_fix(&app, 40.0, -73.0, T0).await;
    put_hazards(&app, &[TestHazard::new("h1", 40.001, -73.0, 200.0)]).await;
    send(&app, empty_request(Method::POST, "/api/v1/alert/acknowledge")).await;

    let (status, body) = send(&app, empty_request(Method::POST, "/api/v1/tracking/restart")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tracking"], true);

    let (_, body) = send(&app, get_request("/api/v1/alert")).await;
    assert_eq!(body["alert"]["id"], "h1");
}

#[tokio::test]
async fn test_feedback_disabled_still_raises_alert() {
    let mut config = test_config();
    config.feedback.tone_enabled = false;
    config.feedback.vibration_enabled = false;
    let app = create_test_app(config);

    report_fix(&app, 40.0, -73.0, T0).await;
    let body = put_hazards(&app, &[TestHazard::new("h1", 40.001, -73.0, 200.0)]).await;

    assert_eq!(body["alert"]["id"], "h1");
}
