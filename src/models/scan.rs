//! Scan record model

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{LocalLabel, RemoteLabel};

/// Final status of a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanStatus {
    Safe,
    Malicious,
    Adversarial,
    Unknown,
}

impl ScanStatus {
    pub const ALL: [ScanStatus; 4] = [
        ScanStatus::Safe,
        ScanStatus::Malicious,
        ScanStatus::Adversarial,
        ScanStatus::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Safe => "Safe",
            ScanStatus::Malicious => "Malicious",
            ScanStatus::Adversarial => "Adversarial",
            ScanStatus::Unknown => "Unknown",
        }
    }

    /// Statuses that carry an adversarial pattern line in the analysis
    pub fn is_threat(&self) -> bool {
        matches!(self, ScanStatus::Malicious | ScanStatus::Adversarial)
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScanStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown scan status '{}'", s))
    }
}

impl From<LocalLabel> for ScanStatus {
    fn from(label: LocalLabel) -> Self {
        match label {
            LocalLabel::Safe => ScanStatus::Safe,
            LocalLabel::Malicious => ScanStatus::Malicious,
            LocalLabel::Unknown | LocalLabel::Error => ScanStatus::Unknown,
        }
    }
}

impl From<RemoteLabel> for ScanStatus {
    fn from(label: RemoteLabel) -> Self {
        match label {
            RemoteLabel::Safe => ScanStatus::Safe,
            RemoteLabel::Malicious => ScanStatus::Malicious,
            RemoteLabel::Adversarial => ScanStatus::Adversarial,
        }
    }
}

/// The persisted, user-visible unit. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub url: String,
    pub status: ScanStatus,
    pub confidence: f64,
    pub analysis: String,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate counters, derived on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total: u64,
    pub safe_count: u64,
    pub malicious_count: u64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ScanRequest {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "URL is required"),
        custom(function = "validate_url_length")
    )]
    pub url: String,
}

/// Longest URL accepted by `/scan`, in bytes
pub const MAX_URL_LEN: usize = 2048;

fn validate_url_length(url: &str) -> Result<(), ValidationError> {
    if url.len() > MAX_URL_LEN {
        let mut err = ValidationError::new("too_long");
        err.message = Some("URL is too long".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Default)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// Default number of records returned by `/history`
pub const DEFAULT_HISTORY_LIMIT: i64 = 10;
