//! Recommendation synthesis from an outcome set.

use std::collections::HashSet;

use scenario_core::Outcome;

/// Always the last two recommendations, in this order.
pub const CLOSING_RECOMMENDATIONS: [&str; 2] = [
    "Monitor key variables closely",
    "Maintain flexibility for scenario pivots",
];

/// Outcomes strictly above this probability can drive the primary recommendation.
pub const PRIMARY_PROBABILITY_THRESHOLD: f64 = 0.3;

const MAX_RISKS: usize = 3;
const MAX_OPPORTUNITIES: usize = 2;

/// Derive recommendations from outcomes alone.
///
/// Risks and opportunities are pooled and de-duplicated as sets, so which
/// distinct values are picked, and their order, is unspecified.
pub fn synthesize_recommendations(outcomes: &[Outcome]) -> Vec<String> {
    let mut recommendations = Vec::new();

    if let Some(primary) = outcomes
        .iter()
        .find(|o| o.probability() > PRIMARY_PROBABILITY_THRESHOLD)
    {
        recommendations.push(format!("Prepare primarily for: {}", primary.description()));
    }

    let risks: HashSet<&str> = outcomes
        .iter()
        .flat_map(|o| o.risk_factors())
        .map(String::as_str)
        .collect();
    recommendations.extend(
        risks
            .into_iter()
            .take(MAX_RISKS)
            .map(|r| format!("Mitigate risk: {r}")),
    );

    let opportunities: HashSet<&str> = outcomes
        .iter()
        .flat_map(|o| o.opportunities())
        .map(String::as_str)
        .collect();
    recommendations.extend(
        opportunities
            .into_iter()
            .take(MAX_OPPORTUNITIES)
            .map(|o| format!("Leverage opportunity: {o}")),
    );

    recommendations.extend(CLOSING_RECOMMENDATIONS.iter().map(|s| s.to_string()));
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule_based::canonical_outcomes;
    use scenario_core::ImpactLevel;

    fn outcome(description: &str, probability: f64, risks: &[&str], opps: &[&str]) -> Outcome {
        Outcome::new(
            description,
            probability,
            ImpactLevel::Medium,
            risks.iter().map(|s| s.to_string()).collect(),
            opps.iter().map(|s| s.to_string()).collect(),
            "Soon",
            0.5,
        )
        .unwrap()
    }

    #[test]
    fn canonical_set_yields_full_recommendation_list() {
        let outcomes = canonical_outcomes();
        let recs = synthesize_recommendations(&outcomes);

        assert_eq!(recs.len(), 1 + 3 + 2 + 2);
        assert_eq!(
            recs[0],
            "Prepare primarily for: Expected outcome - moderate success with some challenges"
        );

        let all_risks: HashSet<&str> =
            outcomes.iter().flat_map(|o| o.risk_factors()).map(String::as_str).collect();
        let picked_risks: Vec<&str> = recs
            .iter()
            .filter_map(|r| r.strip_prefix("Mitigate risk: "))
            .collect();
        assert_eq!(picked_risks.len(), 3);
        assert!(picked_risks.iter().all(|r| all_risks.contains(r)));
        assert_eq!(picked_risks.iter().collect::<HashSet<_>>().len(), 3);

        let picked_opps = recs
            .iter()
            .filter(|r| r.starts_with("Leverage opportunity: "))
            .count();
        assert_eq!(picked_opps, 2);

        assert_eq!(&recs[recs.len() - 2..], &CLOSING_RECOMMENDATIONS.map(String::from));
    }

    #[test]
    fn primary_uses_first_in_generation_order_not_highest() {
        let recs = synthesize_recommendations(&[
            outcome("Low", 0.1, &[], &[]),
            outcome("First above threshold", 0.35, &[], &[]),
            outcome("Highest", 0.55, &[], &[]),
        ]);
        assert_eq!(recs[0], "Prepare primarily for: First above threshold");
    }

    #[test]
    fn threshold_is_strict_and_entry_is_omitted_when_nothing_qualifies() {
        let recs = synthesize_recommendations(&[outcome("Exactly", 0.3, &[], &[])]);
        assert_eq!(recs, CLOSING_RECOMMENDATIONS.map(String::from).to_vec());
    }

    #[test]
    fn duplicates_are_collapsed_before_capping() {
        let recs = synthesize_recommendations(&[
            outcome("A", 0.1, &["Churn", "Churn"], &["Upsell"]),
            outcome("B", 0.1, &["Churn"], &["Upsell"]),
        ]);
        assert_eq!(
            recs,
            vec![
                "Mitigate risk: Churn",
                "Leverage opportunity: Upsell",
                "Monitor key variables closely",
                "Maintain flexibility for scenario pivots",
            ]
        );
    }

    #[test]
    fn closers_are_present_for_empty_input() {
        let recs = synthesize_recommendations(&[]);
        assert_eq!(recs, CLOSING_RECOMMENDATIONS.map(String::from).to_vec());
    }
}
