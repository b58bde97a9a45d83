//! `scenario-ai`
//!
//! **Responsibility:** Turning a situation into a [`scenario_core::ScenarioAnalysis`].
//!
//! This crate is pure computation:
//! - It holds no job state and never touches the job store.
//! - Provider failures are resolved here (rule-based fallback), never surfaced.
//! - The only fallible input is the situation text itself.

pub mod ai_backed;
pub mod catalog;
pub mod context;
pub mod engine;
pub mod generator;
pub mod provider;
pub mod recommendations;
pub mod result;
pub mod rule_based;
pub mod variables;

pub use ai_backed::AiBackedGenerator;
pub use catalog::{example_scenarios, list_models, ExampleScenario, ModelInfo};
pub use context::extract_context_factors;
pub use engine::{AnalysisEngine, EngineFactory, ProviderEngineFactory};
pub use generator::{Generation, OutcomeGenerator};
pub use provider::{FakeLlmClient, HttpLlmClient, LlmClient, LlmError, ProviderConfig};
pub use recommendations::synthesize_recommendations;
pub use result::AiError;
pub use rule_based::{canonical_outcomes, RuleBasedGenerator};
pub use variables::identify_key_variables;
