mod postgres;
mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

use crate::error::Result;

pub use postgres::PostgresProductStore;
pub use sqlite::SqliteProductStore;

/// Currency markers accepted in front of a price, in both stored prices and queries.
/// Longer forms come first so "rs." wins over "rs".
pub const CURRENCY_PREFIXES: &[&str] = &["₹", "$", "rs.", "rs", "inr"];

/// Parse price text into the number every comparison uses.
///
/// A leading currency marker, thousands separators and whitespace are ignored.
/// `None` if what's left isn't a finite number.
pub fn parse_price_text(text: &str) -> Option<f64> {
    let cleaned: String = strip_currency_prefix(text.trim())
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn strip_currency_prefix(text: &str) -> &str {
    for prefix in CURRENCY_PREFIXES {
        let len = prefix.len();
        if text.is_char_boundary(len) && text[..len].eq_ignore_ascii_case(prefix) {
            return &text[len..];
        }
    }
    text
}

/// Decimal price kept as the text it was given in.
///
/// Accepts a JSON string or number on input, always serializes as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPrice", into = "String")]
pub struct Price(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawPrice> for Price {
    fn from(raw: RawPrice) -> Self {
        match raw {
            RawPrice::Text(text) => Price(text),
            RawPrice::Number(number) => Price(number.to_string()),
        }
    }
}

impl From<Price> for String {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Price {
    pub fn new(text: impl Into<String>) -> Self {
        Price(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn value(&self) -> Option<f64> {
        parse_price_text(&self.0)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "imageUrl")]
    pub image_url: String,
}

/// Body of `POST /products`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "imageUrl", alias = "image_url")]
    pub image_url: String,
}

/// The fields search reads from a product. Everything else is carried through untouched.
pub trait Listing {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn price_text(&self) -> Cow<'_, str>;
    fn price_value(&self) -> Option<f64>;
}

impl Listing for Product {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn price_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.price.as_str())
    }

    fn price_value(&self) -> Option<f64> {
        self.price.value()
    }
}

// Caller-supplied products arrive as arbitrary JSON objects; missing or
// mistyped fields read as empty and the price as non-numeric.
impl Listing for Value {
    fn name(&self) -> &str {
        self.get("name").and_then(Value::as_str).unwrap_or_default()
    }

    fn description(&self) -> &str {
        self.get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    fn price_text(&self) -> Cow<'_, str> {
        match self.get("price") {
            Some(Value::String(text)) => Cow::Borrowed(text),
            Some(Value::Number(number)) => Cow::Owned(number.to_string()),
            _ => Cow::Borrowed(""),
        }
    }

    fn price_value(&self) -> Option<f64> {
        match self.get("price")? {
            Value::String(text) => parse_price_text(text),
            Value::Number(number) => number.as_f64().filter(|v| v.is_finite()),
            _ => None,
        }
    }
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a product and return the stored row, id included.
    async fn insert(&self, product: NewProduct) -> Result<Product>;

    /// Every product, most recent (highest id) first.
    async fn list_all(&self) -> Result<Vec<Product>>;

    /// Release held connections on shutdown.
    async fn close(&self) {}
}
