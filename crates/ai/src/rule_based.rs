//! Deterministic outcome generation.
//!
//! The canonical four-bucket partition used when no provider is configured and
//! as the fallback when the provider fails.

use async_trait::async_trait;

use scenario_core::{ImpactLevel, Outcome, OutcomeSource};

use crate::generator::{Generation, OutcomeGenerator};

/// Rule-based generator. Cannot fail.
#[derive(Debug, Default, Copy, Clone)]
pub struct RuleBasedGenerator;

impl RuleBasedGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OutcomeGenerator for RuleBasedGenerator {
    async fn generate(&self, _situation: &str, _context_factors: &[String]) -> Generation {
        Generation::Success {
            outcomes: canonical_outcomes(),
            source: OutcomeSource::RuleBased,
        }
    }
}

struct Bucket {
    description: &'static str,
    probability: f64,
    impact: ImpactLevel,
    risks: [&'static str; 2],
    opportunities: [&'static str; 2],
    timeline: &'static str,
    confidence: f64,
}

// Probabilities sum to exactly 1.0.
const BUCKETS: [Bucket; 4] = [
    Bucket {
        description: "Optimal outcome - all factors align favorably",
        probability: 0.25,
        impact: ImpactLevel::High,
        risks: ["Overconfidence", "External disruptions"],
        opportunities: ["Maximum benefit realization", "Positive momentum"],
        timeline: "Short to medium term",
        confidence: 0.70,
    },
    Bucket {
        description: "Expected outcome - moderate success with some challenges",
        probability: 0.45,
        impact: ImpactLevel::Medium,
        risks: ["Resource constraints", "Execution challenges"],
        opportunities: ["Learning opportunities", "Incremental progress"],
        timeline: "Medium term",
        confidence: 0.85,
    },
    Bucket {
        description: "Difficult outcome - significant obstacles encountered",
        probability: 0.25,
        impact: ImpactLevel::Medium,
        risks: ["Major setbacks", "Resource depletion"],
        opportunities: ["Resilience building", "Alternative paths"],
        timeline: "Extended timeline",
        confidence: 0.75,
    },
    Bucket {
        description: "Adverse outcome - multiple failures compound",
        probability: 0.05,
        impact: ImpactLevel::High,
        risks: ["Complete failure", "Reputation damage"],
        opportunities: ["Lessons learned", "Fresh start potential"],
        timeline: "Long term recovery",
        confidence: 0.60,
    },
];

/// The canonical outcome set: optimal, expected, challenging, adverse.
pub fn canonical_outcomes() -> Vec<Outcome> {
    BUCKETS
        .iter()
        .filter_map(|b| {
            Outcome::new(
                b.description,
                b.probability,
                b.impact,
                b.risks.iter().map(|s| s.to_string()).collect(),
                b.opportunities.iter().map(|s| s.to_string()).collect(),
                b.timeline,
                b.confidence,
            )
            .ok()
        })
        .collect()
}
