use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::AppState;

/// Products are taken as the caller sent them; search reads only
/// `name`, `price` and `description` and returns the objects unchanged.
#[derive(Deserialize)]
pub struct SemanticSearchRequest {
    query: String,
    #[serde(default)]
    products: Vec<Value>,
}

#[derive(Serialize)]
pub struct SemanticSearchResponse {
    results: Vec<Value>,
}

pub async fn semantic_search(
    State(state): State<AppState>,
    body: Result<Json<SemanticSearchRequest>, JsonRejection>,
) -> Result<Json<SemanticSearchResponse>, ApiError> {
    let Json(request) = body.map_err(|r| ApiError::rejected_body(r, "AI search failed"))?;

    let results = state
        .search
        .search(&request.query, &request.products)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, query = %request.query, "semantic search failed");
            ApiError::internal("AI search failed")
        })?;

    Ok(Json(SemanticSearchResponse { results }))
}
