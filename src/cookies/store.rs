//! Cookie store infrastructure.
//!
//! A **cookie store** is the persistence layer behind a cookie facility. The facility
//! loads its jar from the store when it is created and writes a snapshot back on
//! `flush`. Facilities without a store keep cookies in memory only.
mod json;

use std::sync::Arc;

use crate::cookies::DefaultCookieJar;
use crate::errors::CookieError;

/// File-backed JSON cookie store.
pub use json::JsonCookieStore;

/// Reference-counted pointer to a type-erased [`CookieStore`].
pub type CookieStoreHandle = Arc<dyn CookieStore + Send + Sync>;

/// Durable storage for a cookie jar snapshot.
///
/// Implementations must be `Send + Sync` and safe for concurrent use.
pub trait CookieStore: Send + Sync {
    /// Loads the persisted jar. An empty store yields an empty jar.
    fn load(&self) -> Result<DefaultCookieJar, CookieError>;

    /// Replaces the persisted state with `snapshot`.
    fn persist(&self, snapshot: &DefaultCookieJar) -> Result<(), CookieError>;
}
