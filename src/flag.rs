//! Flag records, partial updates, and derived rollout figures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A persisted feature flag.
///
/// The record is the unit of configuration: a master switch, a rollout
/// percentage for the non-overridden population, and explicit per-user
/// override lists. Exclusion always wins over targeting.
///
/// # Examples
///
/// ```
/// use flagship::FlagRecord;
///
/// let flag = FlagRecord::new("new-checkout")
///     .with_description("Redesigned checkout funnel")
///     .with_rollout_percentage(25)
///     .with_target_user("qa-1");
///
/// assert_eq!(flag.rollout_percentage, 25);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagRecord {
    /// Flag name (unique, immutable after creation)
    pub name: String,

    /// Flag description
    pub description: Option<String>,

    /// Master switch; when false the flag evaluates to false for everyone
    pub enabled: bool,

    /// Fraction of the non-overridden population receiving `true` (0-100)
    pub rollout_percentage: u8,

    /// Users that always evaluate to `true` unless excluded
    #[serde(default)]
    pub target_users: HashSet<String>,

    /// Users that always evaluate to `false`
    #[serde(default)]
    pub excluded_users: HashSet<String>,

    /// Opaque annotations, not interpreted by the evaluator
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

impl FlagRecord {
    /// Create a new flag: enabled, rolled out to nobody beyond its targets.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            description: None,
            enabled: true,
            rollout_percentage: 0,
            target_users: HashSet::new(),
            excluded_users: HashSet::new(),
            metadata: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the master switch
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the rollout percentage (validated at the admin boundary)
    pub fn with_rollout_percentage(mut self, percentage: u8) -> Self {
        self.rollout_percentage = percentage;
        self
    }

    /// Add a targeted user
    pub fn with_target_user(mut self, user_id: impl Into<String>) -> Self {
        self.target_users.insert(user_id.into());
        self
    }

    /// Add an excluded user
    pub fn with_excluded_user(mut self, user_id: impl Into<String>) -> Self {
        self.excluded_users.insert(user_id.into());
        self
    }

    /// Attach an opaque metadata annotation
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Partial update applied to an existing [`FlagRecord`].
///
/// Unset fields leave the stored value untouched; `name`, `created_at`,
/// and `updated_at` are never patchable directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlagUpdate {
    /// New description
    pub description: Option<String>,

    /// New master switch state
    pub enabled: Option<bool>,

    /// New rollout percentage
    pub rollout_percentage: Option<u8>,

    /// Replacement target list
    pub target_users: Option<HashSet<String>>,

    /// Replacement exclusion list
    pub excluded_users: Option<HashSet<String>>,

    /// Replacement metadata map
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl FlagUpdate {
    /// Create an empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the master switch
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Set the rollout percentage
    pub fn with_rollout_percentage(mut self, percentage: u8) -> Self {
        self.rollout_percentage = Some(percentage);
        self
    }

    /// Replace the target list
    pub fn with_target_users(mut self, users: HashSet<String>) -> Self {
        self.target_users = Some(users);
        self
    }

    /// Replace the exclusion list
    pub fn with_excluded_users(mut self, users: HashSet<String>) -> Self {
        self.excluded_users = Some(users);
        self
    }

    /// Replace the metadata map
    pub fn with_metadata(mut self, metadata: HashMap<String, serde_json::Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.enabled.is_none()
            && self.rollout_percentage.is_none()
            && self.target_users.is_none()
            && self.excluded_users.is_none()
            && self.metadata.is_none()
    }

    /// Apply the set fields to a record and refresh its `updated_at`.
    pub fn apply(&self, record: &mut FlagRecord) {
        if let Some(description) = &self.description {
            record.description = Some(description.clone());
        }
        if let Some(enabled) = self.enabled {
            record.enabled = enabled;
        }
        if let Some(percentage) = self.rollout_percentage {
            record.rollout_percentage = percentage;
        }
        if let Some(targets) = &self.target_users {
            record.target_users = targets.clone();
        }
        if let Some(excluded) = &self.excluded_users {
            record.excluded_users = excluded.clone();
        }
        if let Some(metadata) = &self.metadata {
            record.metadata = metadata.clone();
        }
        record.updated_at = Utc::now();
    }
}

/// Derived rollout figures for operator tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloutStats {
    /// Flag name the stats were requested for
    pub name: String,

    /// Whether the flag exists in the store
    pub exists: bool,

    /// Master switch state (false when absent)
    pub enabled: bool,

    /// Configured rollout percentage (zero when absent)
    pub rollout_percentage: u8,

    /// Rollout percentage when enabled, zero otherwise
    pub estimated_reach: u8,

    /// Number of explicitly targeted users
    pub target_count: usize,

    /// Number of explicitly excluded users
    pub excluded_count: usize,
}

impl RolloutStats {
    /// Derive stats from a stored record.
    pub fn for_record(record: &FlagRecord) -> Self {
        Self {
            name: record.name.clone(),
            exists: true,
            enabled: record.enabled,
            rollout_percentage: record.rollout_percentage,
            estimated_reach: if record.enabled {
                record.rollout_percentage
            } else {
                0
            },
            target_count: record.target_users.len(),
            excluded_count: record.excluded_users.len(),
        }
    }

    /// Zeroed stats for a flag that does not exist (or could not be read).
    pub fn absent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exists: false,
            enabled: false,
            rollout_percentage: 0,
            estimated_reach: 0,
            target_count: 0,
            excluded_count: 0,
        }
    }
}
