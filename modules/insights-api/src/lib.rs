//! HTTP API for the insights dashboard.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::warn;

use insights_store::{RecordStore, UserStore};

pub mod auth;
pub mod error;
pub mod jwt;
pub mod password;
pub mod rest;
pub mod seed;

use jwt::JwtService;

pub struct AppState {
    pub records: Arc<dyn RecordStore>,
    pub users: Arc<dyn UserStore>,
    pub jwt: JwtService,
    pub require_auth: bool,
}

/// Assemble the full application router.
pub fn build_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let data = Router::new()
        .route("/data", get(rest::get_data).post(rest::create_data))
        .route(
            "/data/{id}",
            put(rest::update_data).delete(rest::delete_data),
        )
        .route("/filters", get(rest::get_filters))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    let accounts = Router::new()
        .route("/register", post(rest::auth::register))
        .route("/login", post(rest::auth::login))
        .route("/me", get(rest::auth::me));

    Router::new()
        .route("/", get(rest::root))
        .nest("/api/auth", accounts)
        .nest("/api", data)
        .with_state(state)
        .layer(cors_layer(cors_origins))
        // Dashboard data is always read fresh
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Logging layer: method + path + status + latency
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

/// Any origin when none are configured; otherwise an explicit allow-list
/// with credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
