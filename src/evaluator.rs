//! Flag evaluation for users.

use crate::bucket::BucketAssigner;
use crate::cache::FlagCache;
use crate::flag::FlagRecord;
use futures::future::join_all;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

/// Evaluates flags for users, absorbing every failure into the caller's
/// default.
///
/// Feature checks sit on hot paths: this type never returns an error and
/// never panics for well-formed input. Its only side effect is cache
/// population.
pub struct FlagEvaluator {
    cache: Arc<FlagCache>,
    buckets: BucketAssigner,
    capabilities: Vec<String>,
}

impl FlagEvaluator {
    pub(crate) fn new(cache: Arc<FlagCache>, capabilities: Vec<String>) -> Self {
        Self {
            cache,
            buckets: BucketAssigner::new(),
            capabilities,
        }
    }

    /// Whether `flag_name` is enabled for `user_id`.
    ///
    /// `None` identifies an anonymous or system-level caller, which cannot
    /// be bucketed and therefore only passes a 100% rollout. A flag that is
    /// missing, or a store that is unreachable, yields `default_value`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flagship::prelude::*;
    /// # use std::sync::Arc;
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// # let engine = FlagEngine::new(Arc::new(InMemoryFlagStore::new()));
    /// // Missing flags fall back to the supplied default.
    /// assert!(engine.evaluator().is_enabled("unknown", Some("u1"), true).await);
    /// # }
    /// ```
    pub async fn is_enabled(&self, flag_name: &str, user_id: Option<&str>, default_value: bool) -> bool {
        match self.cache.get(flag_name).await {
            Ok(record) => self.decide(&record, user_id),
            Err(err) => {
                debug!("flag {flag_name} fell back to default {default_value}: {err}");
                default_value
            }
        }
    }

    /// The decision procedure, applied to an already-fetched record.
    ///
    /// Strict precedence: master kill switch, then the anonymous-caller
    /// rule, then exclusion, then targeting, then full rollout, then
    /// percentage bucketing. Exclusion is checked before targeting, so a
    /// user on both lists is off.
    pub fn decide(&self, record: &FlagRecord, user_id: Option<&str>) -> bool {
        if !record.enabled {
            return false;
        }

        let Some(user_id) = user_id else {
            return record.rollout_percentage >= 100;
        };

        if record.excluded_users.contains(user_id) {
            return false;
        }
        if record.target_users.contains(user_id) {
            return true;
        }
        if record.rollout_percentage >= 100 {
            return true;
        }

        self.buckets.bucket(user_id, &record.name) < record.rollout_percentage
    }

    /// Evaluate a batch of flags concurrently.
    ///
    /// Each flag is evaluated independently with a `false` default; one
    /// flag's failure never affects the others.
    pub async fn enabled_features(
        &self,
        flag_names: &[&str],
        user_id: Option<&str>,
    ) -> HashMap<String, bool> {
        let checks = flag_names.iter().map(|name| async move {
            (name.to_string(), self.is_enabled(name, user_id, false).await)
        });
        join_all(checks).await.into_iter().collect()
    }

    /// Evaluate the fixed capability set named in the engine configuration.
    pub async fn capabilities(&self, user_id: Option<&str>) -> HashMap<String, bool> {
        let names: Vec<&str> = self.capabilities.iter().map(String::as_str).collect();
        self.enabled_features(&names, user_id).await
    }

    /// Drop the advisory bucket memo.
    pub fn clear_bucket_memo(&self) {
        self.buckets.clear();
    }
}
