//! HTTP document service — exposes any `DocumentStore` over HTTP/JSON.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /health` — `{ "ok": true }`.
//! - `GET /collections/:collection/documents` — every document, ordered by id.
//! - `GET /collections/:collection/document?id=<id>` — one document, or 404.
//! - `PUT /collections/:collection/document?id=<id>` — body
//!   `{ "fields": {...}, "mode": "overwrite" | "merge", "precondition": {...} }`,
//!   returns `{ "version": n }`.
//! - `DELETE /collections/:collection/document?id=<id>` — optional body
//!   `{ "precondition": {...} }`, returns `{ "existed": bool }`. No body means
//!   an unconditional delete.
//!
//! A failed precondition answers 409 with `{ "error": ..., "actual": n }`.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use stockroom::{server, InMemoryDocumentStore};
//!
//! let store = Arc::new(InMemoryDocumentStore::new());
//! server::serve(store, "0.0.0.0:8080").await?;
//! ```

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tracing::{debug, error, info};

use crate::document::wire::{
    DeleteRequest, DeleteResponse, DocumentQuery, ErrorBody, SetRequest, SetResponse,
};
use crate::document::{DocumentError, DocumentStore};

/// Build an axum `Router` serving the given store.
pub fn router<S: DocumentStore + 'static>(store: Arc<S>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/collections/:collection/documents",
            get(list_handler::<S>),
        )
        .route(
            "/collections/:collection/document",
            get(get_handler::<S>)
                .put(set_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .with_state(store)
}

/// Serve the store over HTTP at the given address (e.g. `"0.0.0.0:8080"`).
pub async fn serve<S: DocumentStore + 'static>(
    store: Arc<S>,
    addr: &str,
) -> Result<(), std::io::Error> {
    let app = router(store);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "document service listening");
    axum::serve(listener, app).await
}

/// `GET /health`
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// `GET /collections/:collection/documents`
async fn list_handler<S: DocumentStore + 'static>(
    State(store): State<Arc<S>>,
    Path(collection): Path<String>,
) -> Response {
    match store.list(&collection).await {
        Ok(documents) => (StatusCode::OK, Json(documents)).into_response(),
        Err(e) => error_response(e),
    }
}

/// `GET /collections/:collection/document?id=`
async fn get_handler<S: DocumentStore + 'static>(
    State(store): State<Arc<S>>,
    Path(collection): Path<String>,
    Query(query): Query<DocumentQuery>,
) -> Response {
    match store.get(&collection, &query.id).await {
        Ok(Some(document)) => (StatusCode::OK, Json(document)).into_response(),
        Ok(None) => {
            let body = ErrorBody {
                error: format!("document not found: {}:{}", collection, query.id),
                actual: None,
            };
            (StatusCode::NOT_FOUND, Json(body)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// `PUT /collections/:collection/document?id=`
async fn set_handler<S: DocumentStore + 'static>(
    State(store): State<Arc<S>>,
    Path(collection): Path<String>,
    Query(query): Query<DocumentQuery>,
    Json(request): Json<SetRequest>,
) -> Response {
    let result = store
        .set(
            &collection,
            &query.id,
            request.fields,
            request.mode,
            request.precondition,
        )
        .await;

    match result {
        Ok(version) => {
            debug!(%collection, id = %query.id, version, "document written");
            (StatusCode::OK, Json(SetResponse { version })).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// `DELETE /collections/:collection/document?id=`
async fn delete_handler<S: DocumentStore + 'static>(
    State(store): State<Arc<S>>,
    Path(collection): Path<String>,
    Query(query): Query<DocumentQuery>,
    body: Bytes,
) -> Response {
    let request = if body.is_empty() {
        DeleteRequest::default()
    } else {
        match serde_json::from_slice::<DeleteRequest>(&body) {
            Ok(request) => request,
            Err(e) => {
                let body = ErrorBody {
                    error: format!("invalid delete body: {}", e),
                    actual: None,
                };
                return (StatusCode::BAD_REQUEST, Json(body)).into_response();
            }
        }
    };

    match store
        .delete(&collection, &query.id, request.precondition)
        .await
    {
        Ok(existed) => {
            debug!(%collection, id = %query.id, existed, "document deleted");
            (StatusCode::OK, Json(DeleteResponse { existed })).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// Map a store error to a status code and `ErrorBody`.
fn error_response(err: DocumentError) -> Response {
    let (status, actual) = match &err {
        DocumentError::PreconditionFailed { actual, .. } => (StatusCode::CONFLICT, *actual),
        DocumentError::InvalidId(_) => (StatusCode::BAD_REQUEST, None),
        DocumentError::Serde(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
        DocumentError::Unavailable(_) => {
            error!(error = %err, "document store failed");
            (StatusCode::SERVICE_UNAVAILABLE, None)
        }
    };

    let body = ErrorBody {
        error: err.to_string(),
        actual,
    };
    (status, Json(body)).into_response()
}
