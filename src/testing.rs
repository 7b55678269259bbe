//! Test doubles for the classifier, arbiter and store

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::arbiter::Arbiter;
use crate::classifier::UrlClassifier;
use crate::config::Config;
use crate::models::{ArbiterOutcome, LocalPrediction, ScanRecord, ScanStatus};
use crate::store::{MemoryScanStore, ScanStore, StoreError, StoreResult};
use crate::AppState;

pub struct StubClassifier {
    pub prediction: LocalPrediction,
    pub calls: AtomicUsize,
}

impl StubClassifier {
    pub fn new(prediction: LocalPrediction) -> Arc<Self> {
        Arc::new(Self { prediction, calls: AtomicUsize::new(0) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl UrlClassifier for StubClassifier {
    fn classify(&self, _url: &str) -> LocalPrediction {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prediction
    }

    fn is_ready(&self) -> bool {
        true
    }
}

pub struct StubArbiter {
    pub outcome: ArbiterOutcome,
    pub delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl StubArbiter {
    pub fn new(outcome: ArbiterOutcome) -> Arc<Self> {
        Arc::new(Self { outcome, delay: None, calls: AtomicUsize::new(0) })
    }

    /// Answers only after `delay`
    pub fn slow(outcome: ArbiterOutcome, delay: Duration) -> Arc<Self> {
        Arc::new(Self { outcome, delay: Some(delay), calls: AtomicUsize::new(0) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Arbiter for StubArbiter {
    async fn arbitrate(&self, _url: &str, _local: &LocalPrediction) -> ArbiterOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone()
    }

    fn is_configured(&self) -> bool {
        !matches!(self.outcome, ArbiterOutcome::Unconfigured(_))
    }
}

/// Every operation fails
pub struct FailingStore;

fn failure() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl ScanStore for FailingStore {
    async fn append(&self, _record: &ScanRecord) -> StoreResult<()> {
        Err(failure())
    }

    async fn recent(&self, _limit: u32) -> StoreResult<Vec<ScanRecord>> {
        Err(failure())
    }

    async fn count_by_status(&self, _status: ScanStatus) -> StoreResult<u64> {
        Err(failure())
    }

    async fn count_all(&self) -> StoreResult<u64> {
        Err(failure())
    }

    async fn ping(&self) -> StoreResult<()> {
        Err(failure())
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

pub fn state_with(
    classifier: Arc<dyn UrlClassifier>,
    arbiter: Arc<dyn Arbiter>,
    store: Arc<dyn ScanStore>,
) -> AppState {
    AppState {
        classifier,
        arbiter,
        store,
        config: Arc::new(Config {
            arbiter_timeout: Duration::from_millis(200),
            static_dir: "/nonexistent/static".into(),
            ..Config::default()
        }),
    }
}

pub fn memory_store() -> Arc<MemoryScanStore> {
    Arc::new(MemoryScanStore::new())
}
