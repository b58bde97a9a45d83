//! Static catalogs: selectable models and example scenarios.

use serde::Serialize;
use serde_json::json;

use scenario_core::{ContextMap, RULE_BASED_MODEL};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

const MODELS: [ModelInfo; 4] = [
    ModelInfo {
        id: "gpt-4",
        name: "GPT-4",
        description: "Most capable model for complex analysis",
    },
    ModelInfo {
        id: "gpt-4-turbo",
        name: "GPT-4 Turbo",
        description: "Faster GPT-4 variant",
    },
    ModelInfo {
        id: "gpt-3.5-turbo",
        name: "GPT-3.5 Turbo",
        description: "Fast and cost-effective",
    },
    ModelInfo {
        id: RULE_BASED_MODEL,
        name: "Rule-based",
        description: "No API key required, basic analysis",
    },
];

/// Informational only; the engine accepts any model identifier.
pub fn list_models() -> Vec<ModelInfo> {
    MODELS.to_vec()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExampleScenario {
    pub title: &'static str,
    pub situation: &'static str,
    pub context: ContextMap,
}

pub fn example_scenarios() -> Vec<ExampleScenario> {
    vec![
        ExampleScenario {
            title: "Business Launch",
            situation: "I'm considering launching a new AI-powered mobile app for small businesses \
                        in India. The app would help with inventory management and customer \
                        analytics. I have a team of 3 developers and $50,000 in funding.",
            context: context(&[
                ("industry", "Technology"),
                ("timeline", "Medium-term"),
                ("budget", "Medium"),
                ("risk_tolerance", "Moderate"),
            ]),
        },
        ExampleScenario {
            title: "Career Change",
            situation: "I'm a software engineer with 5 years experience considering switching to \
                        data science. I have basic Python knowledge but no formal ML training. \
                        The job market seems competitive.",
            context: context(&[
                ("industry", "Technology"),
                ("timeline", "Long-term"),
                ("risk_tolerance", "Conservative"),
            ]),
        },
        ExampleScenario {
            title: "Investment Decision",
            situation: "I have $100,000 to invest and am considering between real estate, stock \
                        market, or starting a franchise business. I'm 35 years old with moderate \
                        risk tolerance.",
            context: context(&[
                ("industry", "Finance"),
                ("timeline", "Long-term"),
                ("budget", "High"),
                ("risk_tolerance", "Moderate"),
            ]),
        },
    ]
}

fn context(pairs: &[(&str, &str)]) -> ContextMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), json!(v)))
        .collect()
}
