//! JSON-backed cookie store.
//!
//! `JsonCookieStore` persists a single cookie jar in a JSON file on disk.
//!
//! ### I/O characteristics & caveats
//! - Every `persist` rewrites the whole file.
//! - File writes are not atomic.
//!
//! ### Example
//! ```ignore
//! let store = JsonCookieStore::new("cookies.json".into());
//! let manager = InMemoryCookieManager::with_store(store)?;
//! ```
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::cookies::store::CookieStore;
use crate::cookies::DefaultCookieJar;
use crate::errors::CookieError;

/// On-disk representation of the cookie jar.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CookieStoreFile {
    jar: DefaultCookieJar,
}

/// A JSON-based cookie store that persists cookies across sessions.
pub struct JsonCookieStore {
    /// Path to the JSON file where cookies are stored.
    path: PathBuf,
    /// Serializes concurrent writers.
    lock: Mutex<()>,
}

impl JsonCookieStore {
    /// Opens a JSON cookie store at `path`. The file is created on the first `persist`.
    pub fn new(path: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CookieStore for JsonCookieStore {
    fn load(&self) -> Result<DefaultCookieJar, CookieError> {
        let _guard = self.lock.lock();

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(DefaultCookieJar::new()),
            Err(e) => return Err(e.into()),
        };

        let file: CookieStoreFile = serde_json::from_str(&contents)?;
        debug!("JsonCookieStore: loaded {} origins from {}", file.jar.entries.len(), self.path.display());
        Ok(file.jar)
    }

    fn persist(&self, snapshot: &DefaultCookieJar) -> Result<(), CookieError> {
        let _guard = self.lock.lock();

        let file = CookieStoreFile { jar: snapshot.clone() };
        let contents = serde_json::to_string_pretty(&file)?;
        fs::write(&self.path, contents)?;
        debug!("JsonCookieStore: persisted {} origins to {}", snapshot.entries.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::CookieJar;
    use url::Url;

    #[test]
    fn missing_file_loads_empty_jar() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonCookieStore::new(dir.path().join("cookies.json"));

        let jar = store.load().unwrap();
        assert!(!jar.has_cookies());
    }

    #[test]
    fn persisted_jar_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonCookieStore::new(dir.path().join("cookies.json"));

        let url = Url::parse("https://example.com/").unwrap();
        let mut jar = DefaultCookieJar::new();
        jar.store_cookie(&url, "a=b; Secure").unwrap();
        store.persist(&jar).unwrap();

        let reopened = JsonCookieStore::new(store.path().to_path_buf());
        let loaded = reopened.load().unwrap();
        assert_eq!(loaded, jar);
        assert_eq!(loaded.get_request_cookies(&url).as_deref(), Some("a=b"));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        fs::write(&path, "{not json").unwrap();

        let store = JsonCookieStore::new(path);
        assert!(matches!(store.load(), Err(CookieError::Json(_))));
    }
}
