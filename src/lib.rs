pub mod api;
pub mod config;
pub mod error;
pub mod filter;
pub mod llm;
pub mod query_parser;
pub mod relevance;
pub mod search;
pub mod storage;
pub mod translate;

use axum::{
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::llm::LanguageModel;
use crate::relevance::RelevanceOracle;
use crate::search::SemanticSearch;
use crate::storage::ProductStore;
use crate::translate::Translator;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProductStore>,
    pub search: Arc<SemanticSearch>,
    pub translator: Arc<Translator>,
}

impl AppState {
    /// Wire the pipelines around the injected store and model.
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn ProductStore>,
        model: Arc<dyn LanguageModel>,
    ) -> Self {
        let oracle = RelevanceOracle::new(
            model.clone(),
            config.currency_symbol.clone(),
            config.search_max_tokens,
        );

        Self {
            store,
            search: Arc::new(SemanticSearch::new(oracle, config.dedupe_search_results)),
            translator: Arc::new(Translator::new(
                model,
                config.translation_temperature,
                config.translation_max_tokens,
            )),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route(
            "/products",
            post(api::products::create_product).get(api::products::list_products),
        )
        .route("/translate", post(api::translate::translate_text))
        .route("/semantic-search", post(api::search::semantic_search))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn health_check() -> Result<Json<serde_json::Value>, StatusCode> {
    Ok(Json(serde_json::json!({
        "status": "ok",
        "service": "product-catalog-backend"
    })))
}
