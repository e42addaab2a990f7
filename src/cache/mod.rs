//! Status caching: a TTL store and a single-flight coordinator in front of it.

mod coordinator;
mod store;

pub use coordinator::{FetchCoordinator, ResolveError};
pub use store::{CacheEntry, CacheStore};
