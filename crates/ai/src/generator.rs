//! Outcome generation strategies.
//!
//! Exactly one [`OutcomeGenerator`] is chosen when an engine is built; the
//! pipeline never branches on credentials itself.

use async_trait::async_trait;

use scenario_core::{Outcome, OutcomeSource};

/// Result of one generation pass.
///
/// `Fallback` is still a usable outcome set: it records that the primary
/// strategy failed and why.
#[derive(Debug, Clone)]
pub enum Generation {
    Success {
        outcomes: Vec<Outcome>,
        source: OutcomeSource,
    },
    Fallback {
        outcomes: Vec<Outcome>,
        cause: String,
    },
}

impl Generation {
    pub fn outcomes(&self) -> &[Outcome] {
        match self {
            Generation::Success { outcomes, .. } | Generation::Fallback { outcomes, .. } => outcomes,
        }
    }

    pub fn source(&self) -> OutcomeSource {
        match self {
            Generation::Success { source, .. } => *source,
            Generation::Fallback { .. } => OutcomeSource::Fallback,
        }
    }

    pub fn into_outcomes(self) -> Vec<Outcome> {
        match self {
            Generation::Success { outcomes, .. } | Generation::Fallback { outcomes, .. } => outcomes,
        }
    }
}

/// Produces the outcome set for a situation.
///
/// Implementations must not fail: any internal error is resolved into a
/// [`Generation::Fallback`].
#[async_trait]
pub trait OutcomeGenerator: Send + Sync {
    async fn generate(&self, situation: &str, context_factors: &[String]) -> Generation;
}
