//! Cache Module
//!
//! Shared request cache state: fingerprints, cached results, subscription
//! records and the tick time base.

mod clock;
mod item;
mod key;
mod stats;
mod store;
mod subscription;


// Re-export public types
pub use clock::{current_timestamp_ms, CacheSettings};
pub use item::{CacheItem, CacheView};
pub use key::{fingerprint, CacheKey};
pub use stats::CacheStats;
pub use store::{CacheStore, FetchCommand};
pub use subscription::{CacheSubscription, ConsumerId};

// == Public Constants ==
/// Failure weight used when a caller does not supply one
pub const DEFAULT_SCORE: u32 = 1;

/// Maximum allowed consumer id length in bytes
pub const MAX_CONSUMER_ID_LENGTH: usize = 256;
