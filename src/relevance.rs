//! Relevance ranking delegated to the language model

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::error::Result;
use crate::llm::{ChatMessage, CompletionRequest, LanguageModel};
use crate::storage::Listing;

static BRACKETED_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\[(.*?)\]").expect("bracket pattern is valid"));

pub struct RelevanceOracle {
    model: Arc<dyn LanguageModel>,
    currency_symbol: String,
    max_tokens: u32,
}

impl RelevanceOracle {
    pub fn new(model: Arc<dyn LanguageModel>, currency_symbol: String, max_tokens: u32) -> Self {
        Self {
            model,
            currency_symbol,
            max_tokens,
        }
    }

    /// Ask the model which `candidates` match `query`.
    ///
    /// Returns 0-based positions into `candidates`, in the model's order. Bounds are
    /// not checked here. An unreadable reply is an empty list, not an error.
    pub async fn rank<T: Listing + Sync>(&self, query: &str, candidates: &[T]) -> Result<Vec<usize>> {
        let prompt = build_ranking_prompt(query, candidates, &self.currency_symbol);

        let reply = self
            .model
            .complete(CompletionRequest {
                messages: vec![ChatMessage::user(prompt)],
                temperature: None,
                max_tokens: Some(self.max_tokens),
            })
            .await?;

        tracing::debug!(model = self.model.model_name(), reply = %reply, "ranking reply");
        Ok(parse_index_reply(&reply))
    }
}

pub fn build_ranking_prompt<T: Listing>(
    query: &str,
    candidates: &[T],
    currency_symbol: &str,
) -> String {
    let mut prompt = format!(
        r#"You are a strict e-commerce AI assistant. Based on the user's query and the product list below, return only the products that genuinely match.

Rules:
- Category is exclusive: return phones only for phone queries, laptops only for laptop queries, cameras only for camera queries, and so on.
- Ecosystem is exclusive: never return iPhones or other iOS devices for Android queries, and never return Android devices for iPhone or iOS queries.
- Prices have already been filtered to the user's budget. Do not re-check price ranges.
- Respect use-case keywords: for "drawing" or "sketching" return only devices with stylus or pen support; for "gaming" only devices described as suited to gaming.
- Don't guess. If nothing is a good fit, return [].

User Query: "{}"

Product List:
"#,
        query
    );

    for (idx, product) in candidates.iter().enumerate() {
        prompt.push_str(&format!(
            "{}. {} — {}{} — {}\n",
            idx + 1,
            product.name(),
            currency_symbol,
            product.price_text(),
            product.description()
        ));
    }

    prompt.push_str("\nReply ONLY with index numbers like [2, 4]. If no matches, reply []\n");
    prompt
}

/// Read the first `[...]` in `reply` as 1-based indexes and convert them to 0-based.
///
/// Tokens that aren't positive integers are dropped. No brackets means no matches.
pub fn parse_index_reply(reply: &str) -> Vec<usize> {
    let Some(caps) = BRACKETED_LIST.captures(reply) else {
        tracing::warn!(reply = %reply, "ranking reply has no bracketed index list");
        return Vec::new();
    };

    caps[1]
        .split(',')
        .filter_map(|token| token.trim().parse::<usize>().ok())
        .filter_map(|index| index.checked_sub(1))
        .collect()
}
