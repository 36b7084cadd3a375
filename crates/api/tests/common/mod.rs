//! Common test utilities for integration tests.
//!
//! Each test builds its own router, and with it its own monitoring session.

// Not every test binary uses every helper.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use hazard_watch_api::app::create_app;
use hazard_watch_api::config::{
    Config, FeedbackConfig, LimitsConfig, LoggingConfig, PositioningConfig, SecurityConfig,
    ServerConfig,
};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Test configuration.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig::default(),
        limits: LimitsConfig {
            max_hazards_per_snapshot: 100,
        },
        positioning: PositioningConfig { supported: true },
        feedback: FeedbackConfig::default(),
    }
}

pub fn create_test_app(config: Config) -> Router {
    create_app(config)
}

/// Build a JSON request.
pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Build a request without a body.
pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    empty_request(Method::GET, uri)
}

/// Helper to parse JSON response body.
pub async fn parse_response_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

/// Send a request through a clone of the router and return status plus body.
pub async fn send(app: &Router, request: Request<Body>) -> (axum::http::StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, parse_response_body(response).await)
}

/// A store row for a hazard.
pub struct TestHazard {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub severity: String,
    pub safety_radius: f64,
    pub description: String,
}

impl TestHazard {
    pub fn new(id: &str, latitude: f64, longitude: f64, safety_radius: f64) -> Self {
        Self {
            id: id.to_string(),
            latitude,
            longitude,
            severity: "high".to_string(),
            safety_radius,
            description: Sentence(3..8).fake(),
        }
    }

    pub fn with_severity(mut self, severity: &str) -> Self {
        self.severity = severity.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn to_row(&self) -> Value {
        json!({
            "id": self.id,
            "latitude": self.latitude,
            "longitude": self.longitude,
            "severity": self.severity,
            "safety_radius": self.safety_radius,
            "description": self.description,
            "created_at": "2024-05-01T12:00:00Z"
        })
    }
}

/// Replace the hazard snapshot.
pub async fn put_hazards(app: &Router, hazards: &[TestHazard]) -> Value {
    let rows: Vec<Value> = hazards.iter().map(TestHazard::to_row).collect();
    let (status, body) = send(
        app,
        json_request(Method::PUT, "/api/v1/hazards", json!({ "hazards": rows })),
    )
    .await;
    assert!(status.is_success(), "hazard snapshot rejected: {}", body);
    body
}

/// Report a fix from the device.
pub async fn report_fix(app: &Router, latitude: f64, longitude: f64, timestamp: i64) -> Value {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/v1/location/reports",
            json!({
                "status": "fix",
                "latitude": latitude,
                "longitude": longitude,
                "accuracy": 10.0,
                "timestamp": timestamp
            }),
        ),
    )
    .await;
    assert!(status.is_success(), "position report rejected: {}", body);
    body
}
