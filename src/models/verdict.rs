//! Remote arbiter output

use serde::{Deserialize, Serialize};

/// Verdict values the arbiter may return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteLabel {
    Safe,
    Malicious,
    Adversarial,
}

/// A schema-valid answer from the arbiter.
///
/// `confidence` is within `[0, 1]` and `reasoning` is non-empty and at most
/// three lines; the adapter rejects anything else as malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteVerdict {
    pub verdict: RemoteLabel,
    pub confidence: f64,
    pub reasoning: String,
    pub technique: Option<String>,
}

/// Result of one arbiter call.
///
/// Callers branch on the variant, never on the diagnostic text.
#[derive(Debug, Clone, PartialEq)]
pub enum ArbiterOutcome {
    Verdict(RemoteVerdict),
    Unconfigured(String),
    Unreachable(String),
    MalformedResponse(String),
}

impl ArbiterOutcome {
    /// Short tag used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ArbiterOutcome::Verdict(_) => "verdict",
            ArbiterOutcome::Unconfigured(_) => "unconfigured",
            ArbiterOutcome::Unreachable(_) => "unreachable",
            ArbiterOutcome::MalformedResponse(_) => "malformed_response",
        }
    }
}
