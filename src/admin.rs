//! Administrative flag operations.

use crate::cache::FlagCache;
use crate::error::{FlagError, FlagResult};
use crate::flag::{FlagRecord, FlagUpdate, RolloutStats};
use crate::store::FlagStore;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

/// Mutating and inspection operations exposed to operator tooling.
///
/// Every mutation persists through the [`FlagStore`] and invalidates the
/// affected cache entry, so evaluators pick up the change on their next
/// read (bounded by the cache TTL for other processes).
pub struct FlagAdmin {
    store: Arc<dyn FlagStore>,
    cache: Arc<FlagCache>,
}

impl FlagAdmin {
    pub(crate) fn new(store: Arc<dyn FlagStore>, cache: Arc<FlagCache>) -> Self {
        Self { store, cache }
    }

    /// Create a new flag.
    ///
    /// Fails with [`FlagError::Conflict`] when the name already exists and
    /// [`FlagError::InvalidArgument`] when the rollout percentage is out of
    /// range. Creation needs no cache invalidation: nothing was cached yet.
    pub async fn create_flag(&self, record: FlagRecord) -> FlagResult<FlagRecord> {
        validate_percentage(record.rollout_percentage)?;
        if self.store.read_flag(&record.name).await?.is_some() {
            return Err(FlagError::Conflict(record.name));
        }

        let mut record = record;
        let now = Utc::now();
        record.created_at = now;
        record.updated_at = now;
        self.store.write_flag(&record).await?;
        info!(
            "flag created: {} ({}%, {} targeted, {} excluded)",
            record.name,
            record.rollout_percentage,
            record.target_users.len(),
            record.excluded_users.len()
        );
        Ok(record)
    }

    /// Apply a partial update to an existing flag.
    ///
    /// Fails with [`FlagError::NotFound`] when the flag does not exist.
    pub async fn update_flag(&self, name: &str, update: FlagUpdate) -> FlagResult<FlagRecord> {
        if let Some(percentage) = update.rollout_percentage {
            validate_percentage(percentage)?;
        }

        let updated = self.store.patch_flag(name, &update).await?;
        self.cache.invalidate(name).await;
        info!("flag updated: {name}");
        Ok(updated)
    }

    /// Flip the master switch.
    pub async fn toggle_flag(&self, name: &str, enabled: bool) -> FlagResult<FlagRecord> {
        self.update_flag(name, FlagUpdate::new().with_enabled(enabled))
            .await
    }

    /// Set the rollout percentage.
    ///
    /// Fails with [`FlagError::InvalidArgument`] before any store contact
    /// when `percentage` exceeds 100.
    pub async fn set_rollout_percentage(
        &self,
        name: &str,
        percentage: u8,
    ) -> FlagResult<FlagRecord> {
        validate_percentage(percentage)?;
        self.update_flag(name, FlagUpdate::new().with_rollout_percentage(percentage))
            .await
    }

    /// Add users to the target list. Idempotent.
    pub async fn add_target_users(&self, name: &str, users: &[&str]) -> FlagResult<FlagRecord> {
        self.edit_lists(name, |record| {
            for user in users {
                record.target_users.insert((*user).to_string());
            }
        })
        .await
    }

    /// Remove users from the target list. Removing an absent user is a
    /// no-op.
    pub async fn remove_target_users(&self, name: &str, users: &[&str]) -> FlagResult<FlagRecord> {
        self.edit_lists(name, |record| {
            for user in users {
                record.target_users.remove(*user);
            }
        })
        .await
    }

    /// Add users to the exclusion list. Idempotent.
    pub async fn add_excluded_users(&self, name: &str, users: &[&str]) -> FlagResult<FlagRecord> {
        self.edit_lists(name, |record| {
            for user in users {
                record.excluded_users.insert((*user).to_string());
            }
        })
        .await
    }

    /// Remove users from the exclusion list. Removing an absent user is a
    /// no-op.
    pub async fn remove_excluded_users(
        &self,
        name: &str,
        users: &[&str],
    ) -> FlagResult<FlagRecord> {
        self.edit_lists(name, |record| {
            for user in users {
                record.excluded_users.remove(*user);
            }
        })
        .await
    }

    /// Derived rollout figures for a flag.
    ///
    /// Soft-fails: an absent flag or an unreachable store yields zeroed
    /// stats rather than an error.
    pub async fn get_rollout_stats(&self, name: &str) -> RolloutStats {
        match self.store.read_flag(name).await {
            Ok(Some(record)) => RolloutStats::for_record(&record),
            Ok(None) => RolloutStats::absent(name),
            Err(err) => {
                warn!("rollout stats for {name} degraded to zeroes: {err}");
                RolloutStats::absent(name)
            }
        }
    }

    /// List every stored flag.
    pub async fn list_all_flags(&self) -> FlagResult<Vec<FlagRecord>> {
        self.store.list_flags().await
    }

    /// Drop every cached record, forcing evaluators back to the store.
    pub async fn clear_cache(&self) {
        self.cache.invalidate_all().await;
        info!("flag cache cleared");
    }

    /// Read-modify-write of the override lists, then invalidate.
    async fn edit_lists<F>(&self, name: &str, edit: F) -> FlagResult<FlagRecord>
    where
        F: FnOnce(&mut FlagRecord),
    {
        let mut record = self
            .store
            .read_flag(name)
            .await?
            .ok_or_else(|| FlagError::NotFound(name.to_string()))?;
        edit(&mut record);
        record.updated_at = Utc::now();
        self.store.write_flag(&record).await?;
        self.cache.invalidate(name).await;
        Ok(record)
    }
}

fn validate_percentage(percentage: u8) -> FlagResult<()> {
    if percentage > 100 {
        return Err(FlagError::InvalidArgument(format!(
            "rollout percentage must be within 0-100, got {percentage}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryFlagStore;

    fn admin() -> (Arc<InMemoryFlagStore>, FlagAdmin) {
        let store = Arc::new(InMemoryFlagStore::new());
        let cache = Arc::new(FlagCache::new(store.clone()));
        (store.clone(), FlagAdmin::new(store, cache))
    }

    #[tokio::test]
    async fn test_create_then_read_back() {
        let (store, admin) = admin();
        admin
            .create_flag(FlagRecord::new("a").with_rollout_percentage(20))
            .await
            .unwrap();

        let stored = store.read_flag("a").await.unwrap().unwrap();
        assert_eq!(stored.rollout_percentage, 20);
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let (store, admin) = admin();
        admin
            .create_flag(FlagRecord::new("a").with_rollout_percentage(20))
            .await
            .unwrap();

        let err = admin
            .create_flag(FlagRecord::new("a").with_rollout_percentage(90))
            .await
            .unwrap_err();
        assert!(matches!(err, FlagError::Conflict(_)));

        // First record unchanged.
        let stored = store.read_flag("a").await.unwrap().unwrap();
        assert_eq!(stored.rollout_percentage, 20);
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_range_percentage() {
        let (store, admin) = admin();
        let err = admin
            .create_flag(FlagRecord::new("a").with_rollout_percentage(101))
            .await
            .unwrap_err();
        assert!(matches!(err, FlagError::InvalidArgument(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (_, admin) = admin();
        let err = admin
            .update_flag("missing", FlagUpdate::new().with_enabled(false))
            .await
            .unwrap_err();
        assert!(matches!(err, FlagError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_set_percentage_out_of_range_leaves_record() {
        let (store, admin) = admin();
        admin
            .create_flag(FlagRecord::new("a").with_rollout_percentage(30))
            .await
            .unwrap();

        let err = admin.set_rollout_percentage("a", 150).await.unwrap_err();
        assert!(matches!(err, FlagError::InvalidArgument(_)));

        let stored = store.read_flag("a").await.unwrap().unwrap();
        assert_eq!(stored.rollout_percentage, 30);
    }

    #[tokio::test]
    async fn test_list_edits_are_idempotent() {
        let (store, admin) = admin();
        admin.create_flag(FlagRecord::new("a")).await.unwrap();

        admin.add_target_users("a", &["u1", "u2"]).await.unwrap();
        admin.add_target_users("a", &["u1"]).await.unwrap();
        let stored = store.read_flag("a").await.unwrap().unwrap();
        assert_eq!(stored.target_users.len(), 2);

        admin.remove_target_users("a", &["u1", "ghost"]).await.unwrap();
        let stored = store.read_flag("a").await.unwrap().unwrap();
        assert_eq!(stored.target_users.len(), 1);
        assert!(stored.target_users.contains("u2"));
    }

    #[tokio::test]
    async fn test_excluded_list_edits() {
        let (store, admin) = admin();
        admin.create_flag(FlagRecord::new("a")).await.unwrap();

        admin.add_excluded_users("a", &["u1"]).await.unwrap();
        assert!(
            store
                .read_flag("a")
                .await
                .unwrap()
                .unwrap()
                .excluded_users
                .contains("u1")
        );

        admin.remove_excluded_users("a", &["u1"]).await.unwrap();
        assert!(
            store
                .read_flag("a")
                .await
                .unwrap()
                .unwrap()
                .excluded_users
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_toggle_flag() {
        let (store, admin) = admin();
        admin.create_flag(FlagRecord::new("a")).await.unwrap();

        admin.toggle_flag("a", false).await.unwrap();
        assert!(!store.read_flag("a").await.unwrap().unwrap().enabled);

        admin.toggle_flag("a", true).await.unwrap();
        assert!(store.read_flag("a").await.unwrap().unwrap().enabled);
    }

    #[tokio::test]
    async fn test_mutation_refreshes_updated_at() {
        let (store, admin) = admin();
        let created = admin.create_flag(FlagRecord::new("a")).await.unwrap();

        admin.add_target_users("a", &["u1"]).await.unwrap();
        let stored = store.read_flag("a").await.unwrap().unwrap();
        assert!(stored.updated_at >= created.updated_at);
        assert_eq!(stored.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_rollout_stats() {
        let (_, admin) = admin();
        admin
            .create_flag(
                FlagRecord::new("a")
                    .with_rollout_percentage(40)
                    .with_target_user("u1")
                    .with_excluded_user("u2"),
            )
            .await
            .unwrap();

        let stats = admin.get_rollout_stats("a").await;
        assert!(stats.exists);
        assert_eq!(stats.estimated_reach, 40);
        assert_eq!(stats.target_count, 1);
        assert_eq!(stats.excluded_count, 1);

        let absent = admin.get_rollout_stats("ghost").await;
        assert!(!absent.exists);
        assert_eq!(absent.estimated_reach, 0);
    }

    #[tokio::test]
    async fn test_list_all_flags() {
        let (_, admin) = admin();
        admin.create_flag(FlagRecord::new("a")).await.unwrap();
        admin.create_flag(FlagRecord::new("b")).await.unwrap();

        let flags = admin.list_all_flags().await.unwrap();
        assert_eq!(flags.len(), 2);
    }
}
