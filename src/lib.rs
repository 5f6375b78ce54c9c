//! Feature Flags and Gradual Rollout
//!
//! Per-user, per-flag boolean decisions with percentage-based bucketing,
//! explicit include/exclude lists, and a time-bounded cache over a
//! pluggable store.
//!
//! # Features
//!
//! - 🚀 **Feature Flags** - Toggle capabilities at runtime behind a kill switch
//! - 🎲 **Gradual Rollout** - Deterministic percentage-based bucketing
//! - 🎯 **User Targeting** - Explicit include/exclude overrides per user
//! - ⏱ **TTL Caching** - Lazily expired record cache with explicit invalidation
//! - 🔌 **Pluggable Storage** - Bring your own [`FlagStore`] backend
//!
//! # Quick Start
//!
//! ```
//! use flagship::prelude::*;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(InMemoryFlagStore::new());
//! let engine = FlagEngine::new(store);
//!
//! // Roll a flag out to 25% of users, with QA always included.
//! engine
//!     .admin()
//!     .create_flag(
//!         FlagRecord::new("new-checkout")
//!             .with_description("Redesigned checkout funnel")
//!             .with_rollout_percentage(25)
//!             .with_target_user("qa-1"),
//!     )
//!     .await
//!     .unwrap();
//!
//! assert!(engine.is_enabled("new-checkout", Some("qa-1"), false).await);
//! # }
//! ```
//!
//! # Evaluation Precedence
//!
//! The decision procedure is strictly ordered: a disabled flag is off for
//! everyone, anonymous callers only pass a full rollout, exclusion beats
//! targeting, targeting beats bucketing, and only then does the rollout
//! percentage apply. See [`FlagEvaluator::decide`].
//!
//! # Degrading Gracefully
//!
//! Evaluation never fails: a missing flag or an unreachable store yields
//! the caller-supplied default. Admin operations return typed
//! [`FlagError`] values instead.
//!
//! ```
//! use flagship::prelude::*;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let engine = FlagEngine::new(Arc::new(InMemoryFlagStore::new()));
//!
//! // Nothing stored: the default decides.
//! assert!(engine.is_enabled("unknown-flag", Some("user-1"), true).await);
//! # }
//! ```

pub mod admin;
pub mod bucket;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod flag;
pub mod store;

pub use admin::FlagAdmin;
pub use bucket::{BucketAssigner, assign_bucket};
pub use cache::{DEFAULT_CACHE_TTL, FlagCache};
pub use config::EngineConfig;
pub use engine::FlagEngine;
pub use error::{FlagError, FlagResult};
pub use evaluator::FlagEvaluator;
pub use flag::{FlagRecord, FlagUpdate, RolloutStats};
pub use store::{FlagStore, InMemoryFlagStore};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::admin::FlagAdmin;
    pub use crate::bucket::{BucketAssigner, assign_bucket};
    pub use crate::cache::{DEFAULT_CACHE_TTL, FlagCache};
    pub use crate::config::EngineConfig;
    pub use crate::engine::FlagEngine;
    pub use crate::error::{FlagError, FlagResult};
    pub use crate::evaluator::FlagEvaluator;
    pub use crate::flag::{FlagRecord, FlagUpdate, RolloutStats};
    pub use crate::store::{FlagStore, InMemoryFlagStore};
}
