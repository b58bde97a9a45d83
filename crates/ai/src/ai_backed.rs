//! Provider-backed outcome generation with a single rule-based fallback.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use scenario_core::{ImpactLevel, Outcome, OutcomeSource};

use crate::generator::{Generation, OutcomeGenerator};
use crate::provider::LlmClient;
use crate::result::AiError;
use crate::rule_based::RuleBasedGenerator;

const SYSTEM_PROMPT: &str = "You are a scenario analyst. You interpret a situation and \
enumerate its plausible outcomes. Respond with JSON only.";

/// Asks the provider once; on any failure, answers with the canonical set.
pub struct AiBackedGenerator {
    client: Arc<dyn LlmClient>,
    fallback: RuleBasedGenerator,
}

impl AiBackedGenerator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            fallback: RuleBasedGenerator::new(),
        }
    }

    async fn attempt(&self, situation: &str, context_factors: &[String]) -> Result<Vec<Outcome>, AiError> {
        let prompt = build_prompt(situation, context_factors);
        let payload = self.client.complete_json(SYSTEM_PROMPT, &prompt).await?;
        parse_outcomes(payload)
    }
}

#[async_trait]
impl OutcomeGenerator for AiBackedGenerator {
    async fn generate(&self, situation: &str, context_factors: &[String]) -> Generation {
        match self.attempt(situation, context_factors).await {
            Ok(outcomes) => {
                debug!(count = outcomes.len(), "provider returned outcome set");
                Generation::Success {
                    outcomes,
                    source: OutcomeSource::Ai,
                }
            }
            Err(e) => {
                warn!(error = %e, "AI generation failed; using rule-based outcomes");
                Generation::Fallback {
                    outcomes: self.fallback.generate(situation, context_factors).await.into_outcomes(),
                    cause: e.to_string(),
                }
            }
        }
    }
}

/// The single structured prompt sent to the provider.
pub fn build_prompt(situation: &str, context_factors: &[String]) -> String {
    format!(
        "Analyze this situation and generate 4-6 possible outcomes.\n\
         \n\
         SITUATION: {situation}\n\
         \n\
         CONTEXT: {context}\n\
         \n\
         For each outcome, provide:\n\
         1. description: clear description (string)\n\
         2. probability: number between 0 and 1\n\
         3. impact_level: one of \"Low\", \"Medium\", \"High\"\n\
         4. risk_factors: list of strings\n\
         5. opportunities: list of strings\n\
         6. timeline: timeline estimate (string)\n\
         7. confidence_score: number between 0 and 1\n\
         \n\
         Return a JSON object of the form {{\"outcomes\": [ ... ]}}.",
        situation = situation.trim(),
        context = context_factors.join(", "),
    )
}

#[derive(Debug, Deserialize)]
struct RawOutcome {
    description: String,
    probability: f64,
    impact_level: String,
    risk_factors: Vec<String>,
    opportunities: Vec<String>,
    timeline: String,
    confidence_score: f64,
}

/// Validate a provider payload field-by-field into outcomes.
///
/// Accepts either a bare array or an object with an `outcomes` array.
pub fn parse_outcomes(payload: JsonValue) -> Result<Vec<Outcome>, AiError> {
    let items = match payload {
        JsonValue::Array(items) => items,
        JsonValue::Object(mut map) => match map.remove("outcomes") {
            Some(JsonValue::Array(items)) => items,
            _ => {
                return Err(AiError::Validation(
                    "expected an `outcomes` array in the response object".to_string(),
                ));
            }
        },
        other => {
            return Err(AiError::Validation(format!(
                "expected a JSON array or object, got {}",
                json_kind(&other)
            )));
        }
    };

    if items.is_empty() {
        return Err(AiError::Validation("provider returned no outcomes".to_string()));
    }

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let raw: RawOutcome = serde_json::from_value(item)
                .map_err(|e| AiError::Validation(format!("outcome {i}: {e}")))?;
            let impact: ImpactLevel = raw
                .impact_level
                .parse()
                .map_err(|e| AiError::Validation(format!("outcome {i}: {e}")))?;
            Outcome::new(
                raw.description,
                raw.probability,
                impact,
                raw.risk_factors,
                raw.opportunities,
                raw.timeline,
                raw.confidence_score,
            )
            .map_err(|e| AiError::Validation(format!("outcome {i}: {e}")))
        })
        .collect()
}

fn json_kind(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FakeLlmClient, LlmError};
    use crate::rule_based::canonical_outcomes;
    use serde_json::json;

    fn outcome_json(description: &str, probability: f64, impact: &str) -> JsonValue {
        json!({
            "description": description,
            "probability": probability,
            "impact_level": impact,
            "risk_factors": ["Key supplier exits"],
            "opportunities": ["Early mover advantage"],
            "timeline": "6-12 months",
            "confidence_score": 0.6,
        })
    }

    #[test]
    fn prompt_embeds_situation_and_factors() {
        let prompt = build_prompt(
            "  Expanding to a new city  ",
            &["Economic factors".to_string(), "budget: High".to_string()],
        );
        assert!(prompt.contains("SITUATION: Expanding to a new city\n"));
        assert!(prompt.contains("CONTEXT: Economic factors, budget: High"));
        assert!(prompt.contains("4-6 possible outcomes"));
        assert!(prompt.contains("confidence_score"));
    }

    #[test]
    fn parses_object_and_bare_array_forms() {
        let wrapped = json!({"outcomes": [outcome_json("Win", 0.6, "High")]});
        assert_eq!(parse_outcomes(wrapped).unwrap()[0].description(), "Win");

        let bare = json!([outcome_json("Win", 0.6, "high"), outcome_json("Lose", 0.4, "LOW")]);
        let outcomes = parse_outcomes(bare).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1].impact_level(), ImpactLevel::Low);
    }

    #[test]
    fn rejects_missing_field_with_index() {
        let mut broken = outcome_json("Lose", 0.4, "Low");
        broken.as_object_mut().unwrap().remove("timeline");
        let err = parse_outcomes(json!([outcome_json("Win", 0.6, "High"), broken])).unwrap_err();
        assert!(matches!(err, AiError::Validation(msg) if msg.starts_with("outcome 1")));
    }

    #[test]
    fn rejects_out_of_range_probability_and_unknown_impact() {
        assert!(parse_outcomes(json!([outcome_json("Win", 1.5, "High")])).is_err());
        assert!(parse_outcomes(json!([outcome_json("Win", 0.5, "Catastrophic")])).is_err());
    }

    #[test]
    fn rejects_empty_and_wrong_shapes() {
        assert!(parse_outcomes(json!([])).is_err());
        assert!(parse_outcomes(json!({"results": []})).is_err());
        assert!(parse_outcomes(json!("four outcomes")).is_err());
    }

    #[tokio::test]
    async fn valid_provider_output_is_used() {
        let client = Arc::new(FakeLlmClient::always_valid(json!({
            "outcomes": [outcome_json("Win", 0.7, "High"), outcome_json("Lose", 0.3, "Medium")]
        })));
        let generator = AiBackedGenerator::new(client.clone());

        let generation = generator.generate("situation", &[]).await;
        assert_eq!(generation.source(), OutcomeSource::Ai);
        assert_eq!(generation.outcomes().len(), 2);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn provider_error_falls_back_once() {
        let client = Arc::new(FakeLlmClient::always_error(LlmError::Http(
            "connection refused".to_string(),
        )));
        let generator = AiBackedGenerator::new(client.clone());

        let generation = generator.generate("situation", &[]).await;
        match &generation {
            Generation::Fallback { outcomes, cause } => {
                assert_eq!(outcomes, &canonical_outcomes());
                assert!(cause.contains("connection refused"));
            }
            other => panic!("expected fallback, got {other:?}"),
        }
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn schema_violation_falls_back() {
        let client = Arc::new(FakeLlmClient::always_valid(json!({"outcomes": [{"description": "x"}]})));
        let generation = AiBackedGenerator::new(client).generate("situation", &[]).await;
        assert_eq!(generation.source(), OutcomeSource::Fallback);
        assert_eq!(generation.outcomes().len(), 4);
    }
}
