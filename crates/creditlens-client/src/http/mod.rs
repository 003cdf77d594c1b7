//! HTTP surface over the scoring commands.
//!
//! Handlers stay thin: they decode the request, call into `commands`, and
//! translate [`ClientError`] codes into status codes. Scored batches live in
//! the [`BatchStore`] carried by [`AppState`].

mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::ClientError;
use crate::config::{AllowedOrigins, ServerConfig};
use crate::contracts::envelope::HttpErrorBody;
use crate::store::BatchStore;

#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<BatchStore>,
}

impl AppState {
    pub fn new(store: BatchStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(BatchStore::new(config.batch_capacity))
    }
}

pub fn router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/api/ping", get(handlers::ping))
        .route("/api/score", post(handlers::score_upload))
        .route("/api/score-manual", post(handlers::score_manual))
        .route("/api/customer/:customer_id", get(handlers::customer_detail))
        .route(
            "/api/batches/:batch_id/customers/:customer_id",
            get(handlers::batch_customer_detail),
        )
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors_layer(&config.allowed_origins))
        .with_state(state)
}

pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let allow_origin = match origins {
        AllowedOrigins::Any => AllowOrigin::from(Any),
        AllowedOrigins::List(values) => {
            let parsed = values
                .iter()
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        log::warn!("ignoring unparseable CORS origin `{origin}`");
                        None
                    }
                })
                .collect::<Vec<HeaderValue>>();
            AllowOrigin::list(parsed)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn status_for_error(error: &ClientError) -> StatusCode {
    match error.code.as_str() {
        "customer_not_found" | "batch_not_found" => StatusCode::NOT_FOUND,
        code if code.starts_with("internal_") => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

pub(crate) fn error_response(error: &ClientError) -> Response {
    let status = status_for_error(error);
    if status.is_server_error() {
        log::error!("{}: {}", error.code, error.message);
    } else {
        log::info!("request refused with {}: {}", error.code, error.message);
    }
    (status, axum::Json(HttpErrorBody::from(error))).into_response()
}
