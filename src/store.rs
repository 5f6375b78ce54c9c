//! Flag store adapter trait and in-memory reference implementation.

use crate::error::{FlagError, FlagResult};
use crate::flag::{FlagRecord, FlagUpdate};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Storage adapter for persisted flag records.
///
/// The engine consumes this interface and never implements persistence
/// itself. Backends map their transient failures to
/// [`FlagError::StoreUnavailable`]; an absent record is `Ok(None)`, not an
/// error.
#[async_trait]
pub trait FlagStore: Send + Sync {
    /// Read a single flag by name.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(record))` if the flag exists, `Ok(None)` if not
    /// found, or an error if the read fails.
    async fn read_flag(&self, name: &str) -> FlagResult<Option<FlagRecord>>;

    /// Persist a whole record, replacing any previous version of the same
    /// name.
    async fn write_flag(&self, record: &FlagRecord) -> FlagResult<()>;

    /// Apply a partial update to an existing record.
    ///
    /// # Returns
    ///
    /// Returns the record after the patch, or [`FlagError::NotFound`] when
    /// no record of that name exists.
    async fn patch_flag(&self, name: &str, update: &FlagUpdate) -> FlagResult<FlagRecord>;

    /// List every stored record.
    async fn list_flags(&self) -> FlagResult<Vec<FlagRecord>>;
}

/// In-memory [`FlagStore`] for tests and single-process hosts.
#[derive(Debug, Default)]
pub struct InMemoryFlagStore {
    records: RwLock<HashMap<String, FlagRecord>>,
}

impl InMemoryFlagStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// True when nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl FlagStore for InMemoryFlagStore {
    async fn read_flag(&self, name: &str) -> FlagResult<Option<FlagRecord>> {
        Ok(self.records.read().await.get(name).cloned())
    }

    async fn write_flag(&self, record: &FlagRecord) -> FlagResult<()> {
        self.records
            .write()
            .await
            .insert(record.name.clone(), record.clone());
        Ok(())
    }

    async fn patch_flag(&self, name: &str, update: &FlagUpdate) -> FlagResult<FlagRecord> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(name)
            .ok_or_else(|| FlagError::NotFound(name.to_string()))?;
        update.apply(record);
        Ok(record.clone())
    }

    async fn list_flags(&self) -> FlagResult<Vec<FlagRecord>> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}
