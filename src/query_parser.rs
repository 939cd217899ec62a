use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::storage::CURRENCY_PREFIXES;

/// Price intent extracted from a free-text search query.
///
/// Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceConstraint {
    None,
    Under(i64),
    Over(i64),
    Between(i64, i64),
    Cheapest,
    MostExpensive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    /// The query exactly as received; the ranking step still needs the full wording.
    pub query: String,
    pub constraint: PriceConstraint,
}

const NUMBER: &str = r"(\d[\d,]*)";

// Optional currency marker in front of a number, the same set stored prices accept.
fn currency_pattern() -> String {
    let alternatives: Vec<String> = CURRENCY_PREFIXES.iter().map(|p| regex::escape(p)).collect();
    format!("(?:{})?", alternatives.join("|"))
}

static BETWEEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let currency = currency_pattern();
    Regex::new(&format!(
        r"(?i)\bbetween\s*{currency}\s*{NUMBER}\s+and\s*{currency}\s*{NUMBER}"
    ))
    .expect("between pattern is valid")
});

static UNDER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let currency = currency_pattern();
    Regex::new(&format!(r"(?i)\bunder\s*{currency}\s*{NUMBER}"))
        .expect("under pattern is valid")
});

static OVER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let currency = currency_pattern();
    Regex::new(&format!(r"(?i)\bover\s*{currency}\s*{NUMBER}")).expect("over pattern is valid")
});

static MOST_EXPENSIVE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)most\s+expensive").expect("most expensive pattern is valid"));

/// Parse a query into its price constraint.
///
/// Patterns are tried in a fixed order and the first match wins:
/// `between X and Y`, `under X`, `over X`, `cheapest`, `most expensive`.
/// A matched clause whose number can't be read as an integer yields
/// `PriceConstraint::None` rather than an error.
pub fn parse(query: &str) -> ParsedQuery {
    ParsedQuery {
        query: query.to_string(),
        constraint: extract_price_constraint(query),
    }
}

fn extract_price_constraint(query: &str) -> PriceConstraint {
    if let Some(caps) = BETWEEN_PATTERN.captures(query) {
        return match (number_at(&caps, 1), number_at(&caps, 2)) {
            (Some(low), Some(high)) => PriceConstraint::Between(low, high),
            _ => PriceConstraint::None,
        };
    }

    if let Some(caps) = UNDER_PATTERN.captures(query) {
        return number_at(&caps, 1).map_or(PriceConstraint::None, PriceConstraint::Under);
    }

    if let Some(caps) = OVER_PATTERN.captures(query) {
        return number_at(&caps, 1).map_or(PriceConstraint::None, PriceConstraint::Over);
    }

    if query.to_lowercase().contains("cheapest") {
        return PriceConstraint::Cheapest;
    }

    if MOST_EXPENSIVE_PATTERN.is_match(query) {
        return PriceConstraint::MostExpensive;
    }

    PriceConstraint::None
}

fn number_at(caps: &Captures<'_>, group: usize) -> Option<i64> {
    let raw = caps.get(group)?.as_str();
    raw.replace(',', "").parse::<i64>().ok()
}
