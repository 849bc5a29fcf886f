//! HTTP API exposing price search as `POST /search`.

use crate::retail::{PriceResult, PriceSearch, SearchError, SearchRequest};
use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Builds the API router.
pub fn router(search: Arc<PriceSearch>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/search", post(search_prices))
        .with_state(search)
}

/// Serves the API on `bind` until the process exits.
pub async fn serve(search: Arc<PriceSearch>, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    info!("Listening on {}", bind);
    axum::serve(listener, router(search)).await.context("HTTP server failed")
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Price Comparison API" }))
}

async fn search_prices(
    State(search): State<Arc<PriceSearch>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Vec<PriceResult>>, ApiError> {
    let Json(request) = payload?;
    request.validate().map_err(SearchError::InvalidRequest)?;

    let results = search.search(&request).await?;
    Ok(Json(results))
}

/// Client errors, always rendered as `{"detail": ...}`.
#[derive(Debug)]
pub enum ApiError {
    /// The search itself was refused
    Search(SearchError),
    /// The request body could not be decoded into a search request
    Body(JsonRejection),
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        Self::Search(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Search(SearchError::NoRetailersForCountry(country)) => {
                warn!("Rejected search: no retailers for {}", country);
                (
                    StatusCode::BAD_REQUEST,
                    "No retailers available for the specified country".to_string(),
                )
            }
            ApiError::Search(SearchError::InvalidRequest(msg)) => {
                warn!("Rejected search: {}", msg);
                (StatusCode::UNPROCESSABLE_ENTITY, msg)
            }
            ApiError::Body(rejection) => {
                warn!("Rejected search body: {}", rejection.body_text());
                (rejection.status(), rejection.body_text())
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
