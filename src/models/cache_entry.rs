use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ArticleRecord;

/// Freshness threshold for a cached section.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// A section's persisted records and the epoch-millisecond time they were fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub section: String,
    pub records: Vec<ArticleRecord>,
    pub fetched_at_ms: i64,
}

/// A timestamp from the future, or one too far off to subtract, is stale.
pub fn is_fresh(fetched_at_ms: i64, now_ms: i64, ttl: Duration) -> bool {
    match now_ms.checked_sub(fetched_at_ms) {
        Some(age) if age >= 0 => age as u128 <= ttl.as_millis(),
        _ => false,
    }
}
