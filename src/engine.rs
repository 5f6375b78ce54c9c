//! Engine wiring: one instance per process, no hidden globals.

use crate::admin::FlagAdmin;
use crate::cache::FlagCache;
use crate::config::EngineConfig;
use crate::evaluator::FlagEvaluator;
use crate::store::FlagStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Entry point tying a [`FlagStore`] to a shared cache, an evaluator, and
/// the admin surface.
///
/// All mutable state (the record cache and the bucket memo) lives inside
/// the instance; construct one per process and hand out clones, which
/// share the same internals.
///
/// # Examples
///
/// ```
/// use flagship::prelude::*;
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = Arc::new(InMemoryFlagStore::new());
/// let engine = FlagEngine::new(store);
///
/// engine
///     .admin()
///     .create_flag(FlagRecord::new("new-ui").with_rollout_percentage(25))
///     .await
///     .unwrap();
///
/// let enabled = engine.is_enabled("new-ui", Some("user-123"), false).await;
/// assert_eq!(enabled, engine.is_enabled("new-ui", Some("user-123"), false).await);
/// # }
/// ```
pub struct FlagEngine {
    evaluator: Arc<FlagEvaluator>,
    admin: Arc<FlagAdmin>,
}

impl FlagEngine {
    /// Create an engine with the default configuration.
    pub fn new(store: Arc<dyn FlagStore>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Create an engine with an explicit configuration.
    pub fn with_config(store: Arc<dyn FlagStore>, config: EngineConfig) -> Self {
        let cache = Arc::new(FlagCache::with_ttl(store.clone(), config.cache_ttl));
        let evaluator = Arc::new(FlagEvaluator::new(cache.clone(), config.capabilities));
        let admin = Arc::new(FlagAdmin::new(store, cache));
        Self { evaluator, admin }
    }

    /// The evaluation surface.
    pub fn evaluator(&self) -> &FlagEvaluator {
        &self.evaluator
    }

    /// The operator surface.
    pub fn admin(&self) -> &FlagAdmin {
        &self.admin
    }

    /// Convenience passthrough to [`FlagEvaluator::is_enabled`].
    pub async fn is_enabled(
        &self,
        flag_name: &str,
        user_id: Option<&str>,
        default_value: bool,
    ) -> bool {
        self.evaluator.is_enabled(flag_name, user_id, default_value).await
    }

    /// Convenience passthrough to [`FlagEvaluator::enabled_features`].
    pub async fn enabled_features(
        &self,
        flag_names: &[&str],
        user_id: Option<&str>,
    ) -> HashMap<String, bool> {
        self.evaluator.enabled_features(flag_names, user_id).await
    }
}

impl Clone for FlagEngine {
    fn clone(&self) -> Self {
        Self {
            evaluator: self.evaluator.clone(),
            admin: self.admin.clone(),
        }
    }
}
