//! Views REST surface
//!
//! Exposes the bucket config and design-document endpoints:
//!
//! ```text
//! GET    /:bucket
//! GET    /:bucket/_all_docs
//! GET    /:bucket/_design/:doc
//! GET    /:bucket/_design/:doc/_view/:view
//! PUT    /:bucket/_design/:doc
//! DELETE /:bucket/_design/:doc
//! ```
//!
//! Request parsing and dispatch live in [`views`] and are independent of the
//! listener; this module binds them to axum and renders errors.

pub mod views;

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde::Serialize;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::bucket::BucketRegistry;
pub use views::{NullViewEngine, ViewEngine, ViewOperation, ViewRequest};

/// Classified error body. `error` carries the code, `reason` the
/// human-readable cause; the 400 case puts the reason string directly in
/// `error` and has no separate code.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ViewsError {
    /// No bucket with the requested name exists.
    BucketNotFound,
    /// PUT path does not have exactly a design-doc marker plus an id.
    BadPutPath,
    /// Method other than GET, PUT or DELETE.
    MethodNotAllowed,
    /// Unclassified failure. Rendered as a bare 500 with empty body; the
    /// detail is logged, never sent to the client.
    Internal(String),
}

impl IntoResponse for ViewsError {
    fn into_response(self) -> Response {
        let (status, error, reason) = match self {
            ViewsError::BucketNotFound => (
                StatusCode::NOT_FOUND,
                "not_found",
                Some("no_couchbase_bucket_exists"),
            ),
            ViewsError::BadPutPath => (
                StatusCode::BAD_REQUEST,
                "Only reserved document ids may start with underscore",
                None,
            ),
            ViewsError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "method_not_allowed",
                Some("Only GET,PUT,DELETE allowed"),
            ),
            ViewsError::Internal(detail) => {
                tracing::warn!(%detail, "unclassified views failure");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            reason: reason.map(str::to_string),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ViewsError>;

#[derive(Clone)]
struct AppState {
    registry: BucketRegistry,
    engine: Arc<dyn ViewEngine>,
}

/// Build the views router over a registry and a view engine.
///
/// The registry is passed in explicitly; the router holds a handle to it
/// for as long as the server runs.
pub fn router(registry: BucketRegistry, engine: Arc<dyn ViewEngine>) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(AppState { registry, engine })
}

// A panicking handler still answers like any other unclassified failure:
// bare 500, empty body, detail only in the log.
fn panic_response(_err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    tracing::warn!("views handler panicked");
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    tracing::debug!(%method, path = uri.path(), "views request");
    let request = match ViewRequest::parse(&method, uri.path(), body.to_vec(), &state.registry)
    {
        Ok(request) => request,
        Err(err) => return err.into_response(),
    };
    match request.execute(state.engine.as_ref()) {
        Ok(payload) => (StatusCode::OK, payload).into_response(),
        Err(err) => err.into_response(),
    }
}
