use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use domain::services::TrackingSession;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware};
use crate::routes::{self, alerts, hazards, health, tracking};
use crate::services::{spawn_deadline_driver, ReportedPositionProvider, TracingFeedback};

/// The session type served over HTTP.
pub type WatchSession = TrackingSession<ReportedPositionProvider, TracingFeedback>;

#[derive(Clone)]
pub struct AppState {
    /// Every mutation and re-evaluation goes through this lock, one at a time.
    pub session: Arc<Mutex<WatchSession>>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Builds the session and starts tracking, as a freshly opened monitor
    /// does. Must run inside a tokio runtime: position request deadlines are
    /// driven by a background task.
    pub fn new(config: Config) -> Self {
        let (deadlines, armed) = mpsc::unbounded_channel();
        let provider = ReportedPositionProvider::new(config.positioning.supported, deadlines);
        let feedback = TracingFeedback::new(&config.feedback);

        let mut session = TrackingSession::new(provider, feedback);
        session.start_tracking();
        info!(session_id = %session.session_id(), "Monitoring session ready");

        let session = Arc::new(Mutex::new(session));
        spawn_deadline_driver(armed, Arc::downgrade(&session));

        Self {
            session,
            config: Arc::new(config),
        }
    }
}

pub fn create_app(config: Config) -> Router {
    let state = AppState::new(config);
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let api_routes = Router::new()
        // Location tracking
        .route("/api/v1/location", get(tracking::get_location))
        .route("/api/v1/location/reports", post(tracking::report_position))
        .route("/api/v1/tracking/start", post(tracking::start_tracking))
        .route("/api/v1/tracking/stop", post(tracking::stop_tracking))
        .route("/api/v1/tracking/restart", post(tracking::restart_tracking))
        // Hazard snapshot
        .route(
            "/api/v1/hazards",
            put(hazards::replace_hazards).get(hazards::list_hazards),
        )
        // Alerts
        .route("/api/v1/alert", get(alerts::get_alert))
        .route("/api/v1/alert/acknowledge", post(alerts::acknowledge_alert))
        .route(
            "/api/v1/alert/acknowledgements",
            delete(alerts::reset_acknowledgements),
        );

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .fallback(routes::not_found)
        // Global middleware (order matters: bottom layers run first)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
