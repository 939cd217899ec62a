use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;

use crate::error::ApiError;
use crate::storage::{NewProduct, Product};
use crate::AppState;

#[derive(Serialize)]
pub struct CreateProductResponse {
    message: &'static str,
    product: Product,
}

pub async fn create_product(
    State(state): State<AppState>,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateProductResponse>), ApiError> {
    let Json(request) = body.map_err(|r| ApiError::rejected_body(r, "Error saving product"))?;
    let product = state.store.insert(request).await.map_err(|e| {
        tracing::error!(error = %e, "DB insert error");
        ApiError::internal("Error saving product")
    })?;

    tracing::info!(id = ?product.id, name = %product.name, "product added");

    Ok((
        StatusCode::CREATED,
        Json(CreateProductResponse {
            message: "Product added",
            product,
        }),
    ))
}

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.store.list_all().await.map_err(|e| {
        tracing::error!(error = %e, "DB fetch error");
        ApiError::internal("Error fetching products")
    })?;

    Ok(Json(products))
}
