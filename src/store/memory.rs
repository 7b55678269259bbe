//! In-process store

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{ScanStore, StoreResult};
use crate::models::{ScanRecord, ScanStatus};

#[derive(Default)]
pub struct MemoryScanStore {
    records: RwLock<Vec<ScanRecord>>,
}

impl MemoryScanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScanStore for MemoryScanStore {
    async fn append(&self, record: &ScanRecord) -> StoreResult<()> {
        self.records.write().push(record.clone());
        Ok(())
    }

    async fn recent(&self, limit: u32) -> StoreResult<Vec<ScanRecord>> {
        let records = self.records.read();

        // Reverse first so equal timestamps keep newest-inserted first
        let mut newest: Vec<ScanRecord> = records.iter().rev().cloned().collect();
        newest.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        newest.truncate(limit as usize);

        Ok(newest)
    }

    async fn count_by_status(&self, status: ScanStatus) -> StoreResult<u64> {
        let count = self.records.read().iter().filter(|r| r.status == status).count();
        Ok(count as u64)
    }

    async fn count_all(&self) -> StoreResult<u64> {
        Ok(self.records.read().len() as u64)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn record(url: &str, status: ScanStatus, age_secs: i64) -> ScanRecord {
        ScanRecord {
            url: url.to_string(),
            status,
            confidence: 0.5,
            analysis: "1. Result: test".to_string(),
            timestamp: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_bounded() {
        let store = MemoryScanStore::new();
        store.append(&record("old", ScanStatus::Safe, 30)).await.unwrap();
        store.append(&record("newest", ScanStatus::Safe, 0)).await.unwrap();
        store.append(&record("middle", ScanStatus::Malicious, 10)).await.unwrap();

        let recent = store.recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].url, "newest");
        assert_eq!(recent[1].url, "middle");

        let all = store.recent(50).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_counts() {
        let store = MemoryScanStore::new();
        store.append(&record("a", ScanStatus::Safe, 0)).await.unwrap();
        store.append(&record("b", ScanStatus::Safe, 0)).await.unwrap();
        store.append(&record("c", ScanStatus::Adversarial, 0)).await.unwrap();

        assert_eq!(store.count_all().await.unwrap(), 3);
        assert_eq!(store.count_by_status(ScanStatus::Safe).await.unwrap(), 2);
        assert_eq!(store.count_by_status(ScanStatus::Malicious).await.unwrap(), 0);
        assert_eq!(store.count_by_status(ScanStatus::Adversarial).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_appends() {
        let store = std::sync::Arc::new(MemoryScanStore::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.append(&record(&format!("u{}", i), ScanStatus::Unknown, 0)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(store.count_all().await.unwrap(), 16);
    }
}
