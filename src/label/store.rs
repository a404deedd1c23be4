//! Shared label record.
//!
//! Two independent writers touch the record: manual edits (API/CLI) and the
//! scale session's weight updates. Every write is a whole-field replacement
//! applied under the lock through [`LabelRecord::set`], so the barcode/QR
//! derivation always runs together with the tracking number change that
//! triggered it.

use tokio::sync::RwLock;

use super::record::{LabelField, LabelRecord};

#[derive(Debug, Default)]
pub struct LabelStore {
    record: RwLock<LabelRecord>,
}

impl LabelStore {
    pub fn new(record: LabelRecord) -> Self {
        Self {
            record: RwLock::new(record),
        }
    }

    /// Copy of the current record, for encoding or display.
    pub async fn snapshot(&self) -> LabelRecord {
        self.record.read().await.clone()
    }

    /// Replace one field. Returns `true` if the record changed.
    pub async fn set(&self, field: LabelField, value: impl Into<String>) -> bool {
        self.record.write().await.set(field, value)
    }

    /// Apply several updates in order under one lock and return the result.
    pub async fn apply<I, V>(&self, updates: I) -> LabelRecord
    where
        I: IntoIterator<Item = (LabelField, V)>,
        V: Into<String>,
    {
        let mut record = self.record.write().await;
        for (field, value) in updates {
            record.set(field, value);
        }
        record.clone()
    }
}
