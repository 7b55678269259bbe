//! Strict parsing of the arbiter's verdict object
//!
//! Expected shape, nothing more:
//! `{verdict, confidence_score, reasoning, adversarial_technique}`

use serde::{Deserialize, Deserializer};
use serde_json::json;

use crate::models::{RemoteLabel, RemoteVerdict};

/// Longest reasoning accepted, in lines
pub const MAX_REASONING_LINES: usize = 3;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WireVerdict {
    verdict: RemoteLabel,
    confidence_score: f64,
    reasoning: String,
    #[serde(deserialize_with = "present_or_null")]
    adversarial_technique: Option<String>,
}

/// Key must be present; `null` is a valid value
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

/// Parse the model's text into a `RemoteVerdict`, or describe why not
pub fn parse_verdict(text: &str) -> Result<RemoteVerdict, String> {
    let wire: WireVerdict = serde_json::from_str(text.trim())
        .map_err(|e| format!("response does not match verdict schema: {}", e))?;

    if !wire.confidence_score.is_finite() || !(0.0..=1.0).contains(&wire.confidence_score) {
        return Err(format!("confidence_score {} outside [0, 1]", wire.confidence_score));
    }

    let reasoning = wire.reasoning.trim();
    if reasoning.is_empty() {
        return Err("reasoning is empty".to_string());
    }
    let lines = reasoning.lines().count();
    if lines > MAX_REASONING_LINES {
        return Err(format!("reasoning has {} lines (max {})", lines, MAX_REASONING_LINES));
    }

    Ok(RemoteVerdict {
        verdict: wire.verdict,
        confidence: wire.confidence_score,
        reasoning: reasoning.to_string(),
        technique: wire
            .adversarial_technique
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()),
    })
}

/// Response schema sent with the request so the model answers in shape
pub fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "verdict": { "type": "STRING", "enum": ["Safe", "Malicious", "Adversarial"] },
            "confidence_score": { "type": "NUMBER" },
            "reasoning": { "type": "STRING" },
            "adversarial_technique": { "type": "STRING", "nullable": true }
        },
        "required": ["verdict", "confidence_score", "reasoning", "adversarial_technique"]
    })
}
