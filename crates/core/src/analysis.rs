//! The complete result of analysing one situation.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::outcome::Outcome;

/// Which branch of outcome generation produced the outcome set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeSource {
    /// The AI provider returned a valid outcome set.
    Ai,
    /// No credentials were configured; the canonical set was used directly.
    RuleBased,
    /// The AI attempt failed and the canonical set was used instead.
    Fallback,
}

/// Structured analysis of a situation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAnalysis {
    pub situation: String,
    pub context_factors: Vec<String>,
    /// Generation order, which is also presentation order.
    pub outcomes: Vec<Outcome>,
    pub key_variables: Vec<String>,
    pub recommendations: Vec<String>,
    pub outcome_source: OutcomeSource,
    pub analysis_timestamp: DateTime<Utc>,
}

impl fmt::Display for ScenarioAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SCENARIO ANALYSIS")?;
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(f)?;
        writeln!(f, "SITUATION: {}", self.situation.trim())?;
        writeln!(f)?;

        writeln!(f, "KEY CONTEXT FACTORS:")?;
        for factor in &self.context_factors {
            writeln!(f, "  - {factor}")?;
        }
        writeln!(f)?;

        writeln!(f, "POSSIBLE OUTCOMES:")?;
        for (i, o) in self.outcomes.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "{}. {}", i + 1, o.description())?;
            writeln!(f, "   Probability: {:.1}%", o.probability() * 100.0)?;
            writeln!(f, "   Impact: {}", o.impact_level())?;
            writeln!(f, "   Risks: {}", o.risk_factors().join(", "))?;
            writeln!(f, "   Opportunities: {}", o.opportunities().join(", "))?;
            writeln!(f, "   Timeline: {}", o.timeline())?;
            writeln!(f, "   Confidence: {:.1}%", o.confidence_score() * 100.0)?;
        }
        writeln!(f)?;

        writeln!(f, "KEY VARIABLES:")?;
        for var in &self.key_variables {
            writeln!(f, "  - {var}")?;
        }
        writeln!(f)?;

        writeln!(f, "RECOMMENDATIONS:")?;
        for rec in &self.recommendations {
            writeln!(f, "  - {rec}")?;
        }
        writeln!(f)?;

        write!(f, "Analysis Date: {}", self.analysis_timestamp.to_rfc3339())
    }
}
