//! The HTTP Surface: axum router, three-tier auth, scope
//! checks, distributed rate limiting, canonical error envelope. Folds
//! `trace-query-service`'s axum shape with its `ApiError` idiom.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod headers;
pub mod ratelimit;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use config::HttpConfig;
use ratelimit::DistributedRateLimiter;
use scrapcore_core::ClientTokenSigner;
use scrapcore_store::Store;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub store: Store,
    pub signer: ClientTokenSigner,
    pub cfg: HttpConfig,
    pub limiter: DistributedRateLimiter,
}

pub async fn build_state(store: Store, signer: ClientTokenSigner, cfg: HttpConfig) -> AppState {
    let limiter = DistributedRateLimiter::connect(cfg.redis_url.as_deref(), cfg.production).await;
    AppState { store, signer, cfg, limiter }
}

/// CORS is disabled by default and only opt-in when
/// `cors_origins` is non-empty.
fn cors_layer(cfg: &HttpConfig) -> Option<CorsLayer> {
    if cfg.cors_origins.is_empty() {
        return None;
    }
    let origins: Vec<HeaderValue> = cfg
        .cors_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    Some(CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(tower_http::cors::Any))
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.cfg);
    let state = Arc::new(state);
    let mut app = Router::new()
        .route("/api/auth/login", post(handlers::login))
        .route("/ext/followings/enqueue", post(handlers::enqueue_followings))
        .route("/ext/analyze/enqueue", post(handlers::enqueue_analyze))
        .route("/jobs/:job_id/summary", get(handlers::job_summary))
        .route("/api/send/pull", post(handlers::send_pull))
        .route("/api/send/result", post(handlers::send_result))
        .layer(axum::middleware::from_fn_with_state(state.clone(), headers::security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    if let Some(cors) = cors {
        app = app.layer(cors);
    }
    app
}
