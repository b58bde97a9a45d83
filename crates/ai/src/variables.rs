//! Key-variable identification.

use scenario_core::Outcome;

/// Emitted when neither scan identifies a variable.
pub const DEFAULT_VARIABLES: [&str; 2] = ["Situational dynamics", "External factors"];

const SITUATION_KEYWORDS: [(&str, &str); 4] = [
    ("decision", "Decision quality and timing"),
    ("resource", "Resource availability"),
    ("market", "Market conditions"),
    ("team", "Team performance and dynamics"),
];

const RISK_KEYWORDS: [(&str, &str); 3] = [
    ("resource", "Resource management"),
    ("execution", "Execution capability"),
    ("external", "External environment"),
];

/// Scan the situation, then the pooled risk factors of every outcome.
///
/// Matching is by case-insensitive substring, so "teams" and "resources" count.
pub fn identify_key_variables(situation: &str, outcomes: &[Outcome]) -> Vec<String> {
    let situation = situation.to_lowercase();
    let risks: Vec<String> = outcomes
        .iter()
        .flat_map(|o| o.risk_factors())
        .map(|r| r.to_lowercase())
        .collect();

    let mut variables: Vec<String> = SITUATION_KEYWORDS
        .iter()
        .filter(|(kw, _)| situation.contains(kw))
        .map(|(_, var)| var.to_string())
        .collect();

    variables.extend(
        RISK_KEYWORDS
            .iter()
            .filter(|(kw, _)| risks.iter().any(|r| r.contains(kw)))
            .map(|(_, var)| var.to_string()),
    );

    if variables.is_empty() {
        return DEFAULT_VARIABLES.iter().map(|s| s.to_string()).collect();
    }
    variables
}
