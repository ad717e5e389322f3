//! Cache Module
//!
//! Provides a bounded in-memory cache with insertion-order eviction and a
//! schema-versioned, TTL-aware persistent cache over a key-value store.

mod bounded;
mod envelope;
mod order;
mod persistent;
mod stats;


// Re-export public types
pub use bounded::BoundedMemoryCache;
pub use envelope::{current_timestamp_ms, expiry_from, Envelope, EnvelopePolicy};
pub use order::InsertionOrder;
pub use persistent::{PersistentCacheOptions, SweepState, VersionedPersistentCache};
pub use stats::{CacheStats, SharedStats};

// == Public Constants ==
/// Maximum allowed key length in bytes accepted by the HTTP surface
pub const MAX_KEY_LENGTH: usize = 256;
