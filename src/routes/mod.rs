// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post, put},
};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::presentation::{AppView, Theme};
use crate::session::HomeSession;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) session: Arc<HomeSession>,
    pub(crate) theme: Arc<Theme>,
    pub(crate) ws_clients: Arc<AtomicUsize>,
}

impl AppState {
    pub(crate) async fn view(&self) -> AppView {
        let snapshot = self.session.snapshot().await;
        AppView::from_snapshot(&snapshot, self.session.filter_substring())
    }
}

/// Only the listed origins get CORS headers. The API hands out prompt prefills, so
/// arbitrary pages must not be able to read its responses.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn app(
    session: Arc<HomeSession>,
    theme: Theme,
    ws_clients: Arc<AtomicUsize>,
    allowed_origins: &[String],
) -> Router {
    let state = AppState {
        session,
        theme: Arc::new(theme),
        ws_clients,
    };
    Router::new()
        .route("/", get(|| async { "Wi-Fi scanner is running" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/health", get(http::health_handler)) // GET /api/health
        .route("/api/theme", get(http::theme_handler)) // GET /api/theme
        .route("/api/state", get(http::state_handler)) // GET /api/state
        .route("/api/scan", post(http::scan_handler)) // POST /api/scan
        .route("/api/filter", put(http::filter_handler)) // PUT /api/filter
        .route("/api/connect", post(http::connect_handler)) // POST /api/connect
        .route("/api/connect/secret", post(http::secret_handler)) // POST /api/connect/secret
        .route("/api/connect/cancel", post(http::cancel_handler)) // POST /api/connect/cancel
        .route("/api/navigate/home", post(http::navigate_home_handler)) // POST /api/navigate/home
        .route("/ws/state", get(ws::ws_state)) // WS /ws/state
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}
