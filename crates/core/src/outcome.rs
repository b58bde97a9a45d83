//! A single hypothesized result of a situation.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// How strongly an outcome would affect the situation if it happened.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

impl ImpactLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactLevel::Low => "Low",
            ImpactLevel::Medium => "Medium",
            ImpactLevel::High => "High",
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImpactLevel {
    type Err = DomainError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(ImpactLevel::Low),
            "medium" => Ok(ImpactLevel::Medium),
            "high" => Ok(ImpactLevel::High),
            other => Err(DomainError::validation(format!(
                "impact_level must be one of Low, Medium, High (got {other:?})"
            ))),
        }
    }
}

/// One weighted possible outcome.
///
/// Fields are private: the only way to obtain an `Outcome` is [`Outcome::new`],
/// which rejects probabilities and confidence scores outside `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OutcomeFields")]
pub struct Outcome {
    description: String,
    probability: f64,
    impact_level: ImpactLevel,
    risk_factors: Vec<String>,
    opportunities: Vec<String>,
    timeline: String,
    confidence_score: f64,
}

/// Unvalidated outcome shape, as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct OutcomeFields {
    pub description: String,
    pub probability: f64,
    pub impact_level: ImpactLevel,
    pub risk_factors: Vec<String>,
    pub opportunities: Vec<String>,
    pub timeline: String,
    pub confidence_score: f64,
}

impl TryFrom<OutcomeFields> for Outcome {
    type Error = DomainError;

    fn try_from(f: OutcomeFields) -> Result<Self, Self::Error> {
        Outcome::new(
            f.description,
            f.probability,
            f.impact_level,
            f.risk_factors,
            f.opportunities,
            f.timeline,
            f.confidence_score,
        )
    }
}

impl Outcome {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        description: impl Into<String>,
        probability: f64,
        impact_level: ImpactLevel,
        risk_factors: Vec<String>,
        opportunities: Vec<String>,
        timeline: impl Into<String>,
        confidence_score: f64,
    ) -> DomainResult<Self> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(DomainError::validation("description must not be empty"));
        }
        ensure_unit_interval("probability", probability)?;
        ensure_unit_interval("confidence_score", confidence_score)?;

        Ok(Self {
            description,
            probability,
            impact_level,
            risk_factors,
            opportunities,
            timeline: timeline.into(),
            confidence_score,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn impact_level(&self) -> ImpactLevel {
        self.impact_level
    }

    pub fn risk_factors(&self) -> &[String] {
        &self.risk_factors
    }

    pub fn opportunities(&self) -> &[String] {
        &self.opportunities
    }

    pub fn timeline(&self) -> &str {
        &self.timeline
    }

    pub fn confidence_score(&self) -> f64 {
        self.confidence_score
    }
}

fn ensure_unit_interval(field: &str, value: f64) -> DomainResult<()> {
    // NaN fails the range check too.
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "{field} must be within [0, 1] (got {value})"
        )))
    }
}
