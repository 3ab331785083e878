/*!
 * Synchronization Configuration
 *
 * Construction-time tunables for the containers
 */

use super::errors::{Result, SyncError};
use serde::{Deserialize, Serialize};

/// Default bucket count for sharded maps (prime to limit clustering)
pub const DEFAULT_BUCKET_COUNT: usize = 19;

/// Container configuration
///
/// Values are read once at construction; nothing here can change the shape
/// of a live container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Number of independently locked buckets in a `ShardedMap`
    pub bucket_count: usize,
    /// Entries pre-allocated per bucket
    pub bucket_capacity: usize,
    /// Slots pre-allocated in blocking containers
    pub queue_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
            bucket_capacity: 0,
            queue_capacity: 0,
        }
    }
}

impl SyncConfig {
    /// Configuration for few threads touching few keys
    pub const fn low_contention() -> Self {
        Self {
            bucket_count: 7,
            bucket_capacity: 0,
            queue_capacity: 16,
        }
    }

    /// Configuration for many threads spread over many keys
    pub const fn high_contention() -> Self {
        Self {
            bucket_count: 67,
            bucket_capacity: 4,
            queue_capacity: 1024,
        }
    }

    /// Reject configurations no container can be built from
    pub fn validate(&self) -> Result<()> {
        if self.bucket_count == 0 {
            return Err(SyncError::Configuration(
                "bucket_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
