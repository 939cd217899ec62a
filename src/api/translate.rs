use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::AppState;

#[derive(Deserialize)]
pub struct TranslateRequest {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    translated_text: String,
}

pub async fn translate_text(
    State(state): State<AppState>,
    body: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let Json(request) = body.map_err(|r| ApiError::rejected_body(r, "Translation failed"))?;
    let translated_text = state.translator.translate(&request.text).await.map_err(|e| {
        tracing::error!(error = %e, "translation error");
        ApiError::internal("Translation failed")
    })?;

    Ok(Json(TranslateResponse { translated_text }))
}
