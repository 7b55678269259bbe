//! Local classifier output

use serde::{Deserialize, Serialize};

/// Label produced by the local classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalLabel {
    Safe,
    Malicious,
    Unknown,
    Error,
}

impl LocalLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocalLabel::Safe => "Safe",
            LocalLabel::Malicious => "Malicious",
            LocalLabel::Unknown => "Unknown",
            LocalLabel::Error => "Error",
        }
    }
}

impl std::fmt::Display for LocalLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One prediction per request, never persisted on its own
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalPrediction {
    pub label: LocalLabel,
    pub confidence: f64,
}

impl LocalPrediction {
    pub fn new(label: LocalLabel, confidence: f64) -> Self {
        Self { label, confidence }
    }

    /// Model not loaded or no usable output
    pub fn unknown() -> Self {
        Self::new(LocalLabel::Unknown, 0.0)
    }

    /// Inference ran and failed
    pub fn error() -> Self {
        Self::new(LocalLabel::Error, 0.0)
    }
}
