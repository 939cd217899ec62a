//! Error taxonomy for the catalog service

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Store error: {0}")]
    PgStore(#[from] sqlx::Error),

    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("Search failed: {0}")]
    SearchFailed(Box<CatalogError>),

    #[error("Translation failed: {0}")]
    TranslationFailed(Box<CatalogError>),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tokio::task::JoinError> for CatalogError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        Self::OracleUnavailable(err.to_string())
    }
}

/// What the HTTP caller sees. Details stay in the server log.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: &'static str,
}

impl ApiError {
    pub fn internal(message: &'static str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }

    /// An unreadable request body gets the route's generic failure message;
    /// the extractor's reason is only logged.
    pub fn rejected_body(rejection: JsonRejection, message: &'static str) -> Self {
        tracing::warn!(status = %rejection.status(), "rejected request body: {}", rejection.body_text());
        Self::internal(message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "message": self.message })),
        )
            .into_response()
    }
}
