//! Consensus Engine
//!
//! Merges the local prediction with the arbiter outcome into one record.
//! Pure: no I/O, no shared state. The remote verdict is authoritative when
//! usable; otherwise the local signal is used unchanged.

use chrono::Utc;

use crate::models::{ArbiterOutcome, LocalPrediction, ScanRecord, ScanStatus};

// ============================================================================
// FALLBACK REASONS
// ============================================================================

pub const REASON_UNCONFIGURED: &str =
    "Remote arbiter is not configured; verdict based on the local model only.";
pub const REASON_UNREACHABLE: &str =
    "Remote arbiter could not be reached in time; verdict based on the local model only.";
pub const REASON_MALFORMED: &str =
    "Remote arbiter returned a malformed response; verdict based on the local model only.";

/// Which signal produced the final verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictSource {
    Remote,
    LocalFallback,
}

impl VerdictSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictSource::Remote => "remote",
            VerdictSource::LocalFallback => "local_fallback",
        }
    }
}

/// Merged values before formatting
#[derive(Debug, Clone, PartialEq)]
pub struct Consensus {
    pub status: ScanStatus,
    pub confidence: f64,
    pub reasoning: String,
    pub technique: Option<String>,
    pub source: VerdictSource,
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// Build the final record for `url`, timestamped now, and report which
/// signal it came from
pub fn resolve(
    url: &str,
    local: &LocalPrediction,
    outcome: &ArbiterOutcome,
) -> (ScanRecord, VerdictSource) {
    let consensus = merge(local, outcome);
    let analysis = format_analysis(&consensus);

    let record = ScanRecord {
        url: url.to_string(),
        status: consensus.status,
        confidence: consensus.confidence,
        analysis,
        timestamp: Utc::now(),
    };
    (record, consensus.source)
}

/// Binary authority: remote wins if usable, else local. No blending.
pub fn merge(local: &LocalPrediction, outcome: &ArbiterOutcome) -> Consensus {
    match outcome {
        ArbiterOutcome::Verdict(remote) => Consensus {
            status: remote.verdict.into(),
            confidence: clamp_confidence(remote.confidence),
            reasoning: remote.reasoning.clone(),
            technique: remote
                .technique
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            source: VerdictSource::Remote,
        },
        ArbiterOutcome::Unconfigured(_) => fallback(local, REASON_UNCONFIGURED),
        ArbiterOutcome::Unreachable(_) => fallback(local, REASON_UNREACHABLE),
        ArbiterOutcome::MalformedResponse(_) => fallback(local, REASON_MALFORMED),
    }
}

fn fallback(local: &LocalPrediction, reason: &str) -> Consensus {
    Consensus {
        status: local.label.into(),
        confidence: clamp_confidence(local.confidence),
        reasoning: reason.to_string(),
        technique: None,
        source: VerdictSource::LocalFallback,
    }
}

/// Clamp to [0, 1]; NaN becomes 0
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// ============================================================================
// FORMATTING
// ============================================================================

/// Three labeled lines (result, confidence, reasoning), plus an
/// "Adversarial Pattern" line for threat statuses with a technique.
pub fn format_analysis(consensus: &Consensus) -> String {
    let mut analysis = format!(
        "1. Result: {}\n2. Confidence Score: {:.2}\n3. Reasoning: {}",
        consensus.status, consensus.confidence, consensus.reasoning
    );

    if let Some(technique) = &consensus.technique {
        if consensus.status.is_threat() {
            analysis.push_str("\nAdversarial Pattern: ");
            analysis.push_str(technique);
        }
    }

    analysis
}

// ============================================================================
// TESTS
// ============================================================================
