//! The analysis pipeline.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use scenario_core::{ApiKey, ContextMap, RULE_BASED_MODEL, ScenarioAnalysis};

use crate::ai_backed::AiBackedGenerator;
use crate::context::extract_context_factors;
use crate::generator::OutcomeGenerator;
use crate::provider::{HttpLlmClient, LlmClient, LlmError, ProviderConfig};
use crate::recommendations::synthesize_recommendations;
use crate::result::AiError;
use crate::rule_based::RuleBasedGenerator;
use crate::variables::identify_key_variables;

/// Runs context extraction, outcome generation, variable identification and
/// recommendation synthesis, in that order.
///
/// Holds no mutable state; concurrent `analyze` calls are independent.
#[derive(Clone)]
pub struct AnalysisEngine {
    generator: Arc<dyn OutcomeGenerator>,
}

impl fmt::Debug for AnalysisEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisEngine").finish_non_exhaustive()
    }
}

impl AnalysisEngine {
    pub fn new(generator: Arc<dyn OutcomeGenerator>) -> Self {
        Self { generator }
    }

    pub fn rule_based() -> Self {
        Self::new(Arc::new(RuleBasedGenerator::new()))
    }

    pub async fn analyze(
        &self,
        situation: &str,
        context: Option<&ContextMap>,
    ) -> Result<ScenarioAnalysis, AiError> {
        if situation.trim().is_empty() {
            return Err(AiError::InvalidInput("situation must not be empty".to_string()));
        }

        let context_factors = extract_context_factors(situation, context);
        let generation = self.generator.generate(situation, &context_factors).await;
        let outcome_source = generation.source();
        let outcomes = generation.into_outcomes();
        let key_variables = identify_key_variables(situation, &outcomes);
        let recommendations = synthesize_recommendations(&outcomes);

        debug!(
            factors = context_factors.len(),
            outcomes = outcomes.len(),
            source = ?outcome_source,
            "analysis complete"
        );

        Ok(ScenarioAnalysis {
            situation: situation.to_string(),
            context_factors,
            outcomes,
            key_variables,
            recommendations,
            outcome_source,
            analysis_timestamp: Utc::now(),
        })
    }
}

/// Builds the engine for one request.
///
/// The generator is picked here, once, from the request's credentials and model.
pub trait EngineFactory: Send + Sync + 'static {
    fn build(&self, credentials: Option<&ApiKey>, model: &str) -> Result<AnalysisEngine, AiError>;
}

/// Production factory: AI-backed when a key is supplied, rule-based otherwise.
#[derive(Debug, Clone, Default)]
pub struct ProviderEngineFactory {
    config: ProviderConfig,
}

impl ProviderEngineFactory {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

impl EngineFactory for ProviderEngineFactory {
    fn build(&self, credentials: Option<&ApiKey>, model: &str) -> Result<AnalysisEngine, AiError> {
        match credentials.filter(|k| !k.is_blank()) {
            Some(key) if model != RULE_BASED_MODEL => {
                let client = HttpLlmClient::new(self.config.clone(), key.clone(), model);
                Ok(ai_backed_or_rule_based(client))
            }
            _ => Ok(AnalysisEngine::rule_based()),
        }
    }
}

/// AI-backed engine over `client`; rule-based when the client could not be built.
fn ai_backed_or_rule_based<C>(client: Result<C, LlmError>) -> AnalysisEngine
where
    C: LlmClient + 'static,
{
    match client {
        Ok(client) => AnalysisEngine::new(Arc::new(AiBackedGenerator::new(Arc::new(client)))),
        Err(e) => {
            warn!(error = %e, "provider client unavailable, using rule-based outcomes");
            AnalysisEngine::rule_based()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FakeLlmClient, LlmError};
    use crate::recommendations::CLOSING_RECOMMENDATIONS;
    use crate::rule_based::canonical_outcomes;
    use proptest::prelude::*;
    use scenario_core::OutcomeSource;
    use serde_json::json;

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(f)
    }

    #[tokio::test]
    async fn startup_scenario_end_to_end() {
        let mut context = ContextMap::new();
        context.insert("industry".to_string(), json!("Technology"));
        let situation = "I'm launching a startup with my team, market conditions are uncertain";

        let analysis = AnalysisEngine::rule_based()
            .analyze(situation, Some(&context))
            .await
            .unwrap();

        assert_eq!(analysis.situation, situation);
        for factor in ["Business/Commercial context", "Technology factors", "industry: Technology"] {
            assert!(analysis.context_factors.iter().any(|f| f == factor), "missing {factor}");
        }
        assert_eq!(analysis.outcomes, canonical_outcomes());
        assert_eq!(analysis.outcome_source, OutcomeSource::RuleBased);
        assert!(analysis.key_variables.iter().any(|v| v.contains("Team")));
        assert!(analysis.recommendations.len() >= 3);
        assert!(analysis.recommendations.ends_with(&CLOSING_RECOMMENDATIONS.map(String::from)));
    }

    #[tokio::test]
    async fn blank_situation_is_rejected() {
        let err = AnalysisEngine::rule_based().analyze("   ", None).await.unwrap_err();
        assert!(matches!(err, AiError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn provider_failure_never_fails_the_engine() {
        let client = Arc::new(FakeLlmClient::always_error(LlmError::Timeout(30)));
        let engine = AnalysisEngine::new(Arc::new(AiBackedGenerator::new(client)));

        let analysis = engine.analyze("Should we hire?", None).await.unwrap();
        assert_eq!(analysis.outcome_source, OutcomeSource::Fallback);
        assert_eq!(analysis.outcomes.len(), 4);
    }

    #[tokio::test]
    async fn ai_outcomes_drive_variables_and_recommendations() {
        let client = Arc::new(FakeLlmClient::always_valid(json!({"outcomes": [{
            "description": "Competitor copies the product",
            "probability": 0.6,
            "impact_level": "High",
            "risk_factors": ["External pressure"],
            "opportunities": ["Brand loyalty"],
            "timeline": "1 year",
            "confidence_score": 0.5,
        }]})));
        let engine = AnalysisEngine::new(Arc::new(AiBackedGenerator::new(client)));

        let analysis = engine.analyze("Pricing change", None).await.unwrap();
        assert_eq!(analysis.outcome_source, OutcomeSource::Ai);
        assert_eq!(analysis.key_variables, vec!["External environment"]);
        assert_eq!(
            analysis.recommendations,
            vec![
                "Prepare primarily for: Competitor copies the product",
                "Mitigate risk: External pressure",
                "Leverage opportunity: Brand loyalty",
                "Monitor key variables closely",
                "Maintain flexibility for scenario pivots",
            ]
        );
    }

    #[test]
    fn factory_selects_rule_based_without_usable_credentials() {
        let factory = ProviderEngineFactory::default();
        for key in [None, Some(ApiKey::new("  "))] {
            let engine = factory.build(key.as_ref(), "gpt-4").unwrap();
            let analysis = block_on(engine.analyze("x", None)).unwrap();
            assert_eq!(analysis.outcome_source, OutcomeSource::RuleBased);
        }
    }

    #[test]
    fn rule_based_model_ignores_credentials() {
        let factory = ProviderEngineFactory::default();
        let key = ApiKey::new("sk-test");
        let engine = factory.build(Some(&key), RULE_BASED_MODEL).unwrap();
        let analysis = block_on(engine.analyze("x", None)).unwrap();
        assert_eq!(analysis.outcome_source, OutcomeSource::RuleBased);
    }

    #[tokio::test]
    async fn client_construction_failure_uses_rule_based_engine() {
        let client: Result<FakeLlmClient, _> =
            Err(LlmError::Http("failed to create HTTP client: no TLS backend".to_string()));

        let analysis = ai_backed_or_rule_based(client)
            .analyze("Market entry", None)
            .await
            .unwrap();
        assert_eq!(analysis.outcome_source, OutcomeSource::RuleBased);
        assert_eq!(analysis.outcomes, canonical_outcomes());
    }

    #[tokio::test]
    async fn built_client_drives_ai_backed_engine() {
        let client = FakeLlmClient::always_error(LlmError::Timeout(1));

        let analysis = ai_backed_or_rule_based(Ok(client))
            .analyze("Market entry", None)
            .await
            .unwrap();
        assert_eq!(analysis.outcome_source, OutcomeSource::Fallback);
    }

    #[tokio::test]
    async fn unreachable_provider_falls_back() {
        let factory = ProviderEngineFactory::new(ProviderConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout_secs: Some(5),
            temperature: 0.7,
        });
        let key = ApiKey::new("sk-test");
        let engine = factory.build(Some(&key), "gpt-4").unwrap();

        let analysis = engine.analyze("Market entry", None).await.unwrap();
        assert_eq!(analysis.outcome_source, OutcomeSource::Fallback);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        #[test]
        fn pipeline_invariants_hold_for_any_situation(situation in "[a-zA-Z ,.']{1,120}") {
            prop_assume!(!situation.trim().is_empty());
            let analysis = block_on(AnalysisEngine::rule_based().analyze(&situation, None)).unwrap();

            prop_assert!(!analysis.context_factors.is_empty());
            prop_assert!(!analysis.key_variables.is_empty());
            for o in &analysis.outcomes {
                prop_assert!((0.0..=1.0).contains(&o.probability()));
                prop_assert!((0.0..=1.0).contains(&o.confidence_score()));
            }
            let n = analysis.recommendations.len();
            prop_assert!(n >= 2);
            prop_assert_eq!(&analysis.recommendations[n - 2], CLOSING_RECOMMENDATIONS[0]);
            prop_assert_eq!(&analysis.recommendations[n - 1], CLOSING_RECOMMENDATIONS[1]);
        }
    }
}
