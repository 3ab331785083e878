/*!
 * Core Module
 * Shared error and configuration types
 */

pub mod config;
pub mod errors;

// Re-export for convenience
pub use config::{SyncConfig, DEFAULT_BUCKET_COUNT};
pub use errors::*;
