//! In-process entity cache layer.
//!
//! Every entity service owns one [`ReadThroughCache`], each backed by its own
//! [`LfuCache`]. Caches are never shared between entity kinds and hold no
//! state beyond the process: after a restart they start empty and refill
//! through misses.
//!
//! # Example
//!
//! ```ignore
//! let cache: ReadThroughCache<Workspace> = ReadThroughCache::new(100);
//!
//! // Miss: loads from storage and remembers the result.
//! let workspace = cache.get_required(workspace_id, storage.as_ref())?;
//!
//! // After a write, keep the cached copy current.
//! cache.put(&updated);
//! ```

pub mod lfu;
pub mod read_through;
pub mod traits;

pub use lfu::LfuCache;
pub use read_through::{ReadThroughCache, StorageFetcher};
pub use traits::{CacheStats, CacheableEntity};
