//! `scenario-core`: value types shared by every layer.
//!
//! This crate contains **pure data** (no IO, no async): identifiers, the
//! domain error, outcomes, analyses and requests.

pub mod analysis;
pub mod error;
pub mod id;
pub mod outcome;
pub mod request;

pub use analysis::{OutcomeSource, ScenarioAnalysis};
pub use error::{DomainError, DomainResult};
pub use id::AnalysisId;
pub use outcome::{ImpactLevel, Outcome, OutcomeFields};
pub use request::{
    AnalysisRequest, ApiKey, ContextMap, RequestSnapshot, DEFAULT_MODEL, RULE_BASED_MODEL,
};
