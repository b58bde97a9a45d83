//! Context-factor extraction.
//!
//! Deterministic keyword-category matching: each category contributes one
//! factor when any of its keywords appears as a whole word.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value as JsonValue;

use scenario_core::ContextMap;

/// Emitted when neither a category nor the caller's context yields a factor.
pub const DEFAULT_FACTOR: &str = "General situational context";

struct Category {
    factor: &'static str,
    pattern: Regex,
}

fn category(factor: &'static str, keywords: &str) -> Category {
    Category {
        factor,
        pattern: Regex::new(&format!(r"\b(?:{keywords})\b")).expect("category regex is valid"),
    }
}

/// Fixed category order; factors are emitted in this order.
static CATEGORIES: LazyLock<[Category; 5]> = LazyLock::new(|| {
    [
        category("Business/Commercial context", "business|company|startup"),
        category("Economic factors", "market|economy|financial"),
        category("Human resources", "team|people|employee"),
        category("Technology factors", "technology|tech|digital"),
        category("Time constraints", "time|deadline|urgent"),
    ]
});

/// Derive the ordered factor list for a situation.
///
/// Category keywords are matched against the lower-cased situation together
/// with any string values of `context`. Each context entry is then appended as
/// `"<key>: <value>"` in the map's insertion order.
pub fn extract_context_factors(situation: &str, context: Option<&ContextMap>) -> Vec<String> {
    let mut haystack = situation.to_lowercase();
    if let Some(ctx) = context {
        for value in ctx.values() {
            if let JsonValue::String(s) = value {
                haystack.push('\n');
                haystack.push_str(&s.to_lowercase());
            }
        }
    }

    let mut factors: Vec<String> = CATEGORIES
        .iter()
        .filter(|c| c.pattern.is_match(&haystack))
        .map(|c| c.factor.to_string())
        .collect();

    if let Some(ctx) = context {
        factors.extend(
            ctx.iter()
                .map(|(key, value)| format!("{key}: {}", render_value(value))),
        );
    }

    if factors.is_empty() {
        factors.push(DEFAULT_FACTOR.to_string());
    }
    factors
}

/// Strings render bare; everything else renders as compact JSON.
fn render_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
