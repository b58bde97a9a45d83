//! Analysis requests and the redacted snapshot kept for auditing.

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Model id that always selects the rule-based generator.
pub const RULE_BASED_MODEL: &str = "rule-based";

/// Caller-supplied context, kept in insertion order.
pub type ContextMap = serde_json::Map<String, JsonValue>;

/// Provider credential.
///
/// Never printed: `Debug` is redacted and the type is not `Serialize`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// A key made only of whitespace is treated as no key at all.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// Input to one analysis, whether run in the background or inline.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    pub situation: String,
    #[serde(default)]
    pub context: Option<ContextMap>,
    #[serde(default)]
    pub api_key: Option<ApiKey>,
    #[serde(default = "default_model")]
    pub model: String,
}

impl AnalysisRequest {
    pub fn new(situation: impl Into<String>) -> Self {
        Self {
            situation: situation.into(),
            context: None,
            api_key: None,
            model: default_model(),
        }
    }

    pub fn with_context(mut self, context: ContextMap) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// The credential to use, if any non-blank one was supplied.
    pub fn credentials(&self) -> Option<&ApiKey> {
        self.api_key.as_ref().filter(|k| !k.is_blank())
    }

    pub fn snapshot(&self) -> RequestSnapshot {
        RequestSnapshot {
            situation: self.situation.clone(),
            context: self.context.clone(),
            model: self.model.clone(),
            credentials_supplied: self.credentials().is_some(),
        }
    }
}

/// What a job remembers about its request. The credential itself is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSnapshot {
    pub situation: String,
    pub context: Option<ContextMap>,
    pub model: String,
    pub credentials_supplied: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_defaults_when_absent() {
        let req: AnalysisRequest =
            serde_json::from_value(serde_json::json!({"situation": "x"})).unwrap();
        assert_eq!(req.model, DEFAULT_MODEL);
        assert!(req.context.is_none());
        assert!(req.credentials().is_none());
    }

    #[test]
    fn blank_key_counts_as_absent() {
        let req = AnalysisRequest::new("x").with_api_key(ApiKey::new("   "));
        assert!(req.credentials().is_none());
        assert!(!req.snapshot().credentials_supplied);
    }

    #[test]
    fn snapshot_never_contains_the_key() {
        let req = AnalysisRequest::new("x").with_api_key(ApiKey::new("sk-secret"));
        let snap = req.snapshot();
        assert!(snap.credentials_supplied);
        let rendered = serde_json::to_string(&snap).unwrap();
        assert!(!rendered.contains("sk-secret"));
        assert!(!format!("{req:?}").contains("sk-secret"));
    }

    #[test]
    fn context_keeps_insertion_order() {
        let req: AnalysisRequest = serde_json::from_str(
            r#"{"situation": "x", "context": {"zeta": 1, "alpha": 2, "mid": 3}}"#,
        )
        .unwrap();
        let keys: Vec<_> = req.context.unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }
}
