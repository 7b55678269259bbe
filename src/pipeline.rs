//! Scan pipeline
//!
//! classify -> arbitrate (bounded) -> resolve -> append (best effort).
//! Always yields a record; only the store write may fail, and that failure is
//! reported to the caller instead of aborting the scan.

use std::sync::Arc;

use crate::consensus::{self, VerdictSource};
use crate::models::{ArbiterOutcome, LocalPrediction, ScanRecord};
use crate::store::StoreError;
use crate::AppState;

/// What one scan produced
#[derive(Debug)]
pub struct ScanOutcome {
    pub record: ScanRecord,
    pub local: LocalPrediction,
    pub arbiter: ArbiterOutcome,
    pub source: VerdictSource,
    pub stored: Result<(), StoreError>,
}

/// Run the full pipeline for an already-validated URL
pub async fn scan(state: &AppState, url: &str) -> ScanOutcome {
    let local = classify(state, url).await;
    let arbiter = arbitrate(state, url, &local).await;

    let (record, source) = consensus::resolve(url, &local, &arbiter);
    tracing::info!(
        url = %record.url,
        status = %record.status,
        source = source.as_str(),
        confidence = record.confidence,
        "Scan resolved"
    );

    let stored = state.store.append(&record).await;
    if let Err(e) = &stored {
        tracing::warn!("Failed to save scan for {}: {}", record.url, e);
    }

    ScanOutcome {
        record,
        local,
        arbiter,
        source,
        stored,
    }
}

async fn classify(state: &AppState, url: &str) -> LocalPrediction {
    let classifier = Arc::clone(&state.classifier);
    let owned = url.to_string();

    match tokio::task::spawn_blocking(move || classifier.classify(&owned)).await {
        Ok(prediction) => prediction,
        Err(e) => {
            tracing::warn!("Classifier task failed: {}", e);
            LocalPrediction::unknown()
        }
    }
}

async fn arbitrate(state: &AppState, url: &str, local: &LocalPrediction) -> ArbiterOutcome {
    let timeout = state.config.arbiter_timeout;

    let outcome = match tokio::time::timeout(timeout, state.arbiter.arbitrate(url, local)).await {
        Ok(outcome) => outcome,
        Err(_) => ArbiterOutcome::Unreachable(format!(
            "no answer within {}s",
            timeout.as_secs_f32()
        )),
    };

    match &outcome {
        ArbiterOutcome::Verdict(_) => {}
        ArbiterOutcome::Unconfigured(msg) => tracing::debug!("Arbiter unconfigured: {}", msg),
        ArbiterOutcome::Unreachable(msg) => tracing::warn!("Arbiter unreachable: {}", msg),
        ArbiterOutcome::MalformedResponse(msg) => tracing::warn!("Arbiter response malformed: {}", msg),
    }

    outcome
}
