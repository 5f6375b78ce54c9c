//! Deterministic user bucketing for percentage rollouts.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;

/// Assign a user to a rollout bucket for a flag.
///
/// Pure and total: the same `(user_id, flag_name)` pair always yields the
/// same bucket, for any well-formed strings including empty ones, across
/// processes and restarts. A different flag name is allowed to reshuffle
/// buckets.
///
/// The hash is part of the evaluation contract, not an implementation
/// detail: SHA-256 over `user_id`, a `:` separator, and `flag_name`; the
/// first four digest bytes read as a big-endian `i32`; absolute value
/// modulo 100. Changing any of this re-buckets every user of every
/// partially rolled out flag.
///
/// # Examples
///
/// ```
/// use flagship::assign_bucket;
///
/// let bucket = assign_bucket("user-123", "new-ui");
/// assert!(bucket < 100);
/// assert_eq!(bucket, assign_bucket("user-123", "new-ui"));
/// ```
pub fn assign_bucket(user_id: &str, flag_name: &str) -> u8 {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(b":");
    hasher.update(flag_name.as_bytes());
    let digest = hasher.finalize();

    let seed = i32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    (seed.unsigned_abs() % 100) as u8
}

/// Memoizing wrapper around [`assign_bucket`].
///
/// The memo is advisory only: clearing it is always safe and can never
/// change a result, since the underlying function is pure.
#[derive(Debug, Default)]
pub struct BucketAssigner {
    memo: RwLock<HashMap<String, u8>>,
}

impl BucketAssigner {
    /// Create an assigner with an empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket for a `(user, flag)` pair, memoized.
    pub fn bucket(&self, user_id: &str, flag_name: &str) -> u8 {
        // Memo key matches the hash input, so colliding keys already
        // share a digest.
        let key = format!("{user_id}:{flag_name}");
        if let Ok(memo) = self.memo.read()
            && let Some(bucket) = memo.get(&key)
        {
            return *bucket;
        }

        let bucket = assign_bucket(user_id, flag_name);
        if let Ok(mut memo) = self.memo.write() {
            memo.insert(key, bucket);
        }
        bucket
    }

    /// Drop every memoized bucket.
    pub fn clear(&self) {
        if let Ok(mut memo) = self.memo.write() {
            memo.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_is_deterministic() {
        for i in 0..50 {
            let user = format!("user-{i}");
            assert_eq!(
                assign_bucket(&user, "some-flag"),
                assign_bucket(&user, "some-flag")
            );
        }
    }

    #[test]
    fn test_bucket_in_range() {
        for i in 0..1000 {
            let user = format!("user-{i}");
            assert!(assign_bucket(&user, "range-flag") < 100);
        }
    }

    #[test]
    fn test_bucket_accepts_empty_strings() {
        assert!(assign_bucket("", "") < 100);
        assert!(assign_bucket("", "flag") < 100);
        assert!(assign_bucket("user", "") < 100);
    }

    #[test]
    fn test_flag_name_reshuffles_buckets() {
        let moved = (0..200)
            .filter(|i| {
                let user = format!("user-{i}");
                assign_bucket(&user, "flag-a") != assign_bucket(&user, "flag-b")
            })
            .count();
        assert!(moved > 0);
    }

    #[test]
    fn test_bucket_distribution() {
        // 30% rollout over 10k synthetic users should land near 30%.
        let hits = (0..10_000)
            .filter(|i| assign_bucket(&format!("user-{i}"), "dist-flag") < 30)
            .count();
        assert!(
            (2_700..=3_300).contains(&hits),
            "expected ~3000 users under bucket 30, got {hits}"
        );
    }

    #[test]
    fn test_memo_matches_pure_function() {
        let assigner = BucketAssigner::new();
        for i in 0..100 {
            let user = format!("user-{i}");
            assert_eq!(assigner.bucket(&user, "memo-flag"), assign_bucket(&user, "memo-flag"));
            // Second call hits the memo.
            assert_eq!(assigner.bucket(&user, "memo-flag"), assign_bucket(&user, "memo-flag"));
        }
    }

    #[test]
    fn test_memo_clear_is_safe() {
        let assigner = BucketAssigner::new();
        let before = assigner.bucket("user-1", "clear-flag");
        assigner.clear();
        assert_eq!(assigner.bucket("user-1", "clear-flag"), before);
    }
}
