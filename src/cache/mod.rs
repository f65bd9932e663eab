// Prediction response cache
// Author: kelexine (https://github.com/kelexine)

pub mod clock;
pub mod codec;
pub mod eviction;
pub mod file_store;
pub mod fingerprint;
pub mod manager;
pub mod models;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::CacheEntry;
pub use eviction::EvictionManager;
pub use file_store::FileStore;
pub use fingerprint::{fingerprint, CacheKey, Fingerprint};
pub use manager::PredictionCache;
pub use models::{CacheConfig, CacheStats, SweepReport, CACHE_PREFIX, MAX_CACHE_SIZE, TTL_MS};
pub use store::{CacheStore, MemoryStore};
