//! Cookie jar abstraction and a simple in-memory implementation.
//!
//! A **cookie jar** holds every cookie known to one cookie facility. The facility
//! passes the caller's URL and cookie string to the jar, and the jar decides where
//! the cookie lives and which cookies a URL gets back.
//!
//! ## Notes & limitations
//! - Cookies are bucketed by **origin** (`url.origin().ascii_serialization()`).
//!   Within a bucket, domain and path matching follow RFC 6265. A `Domain`
//!   attribute that does not cover the URL host is rejected.
//! - `Expires` is stored but not enforced. `Max-Age`, size limits and eviction are
//!   not implemented.
//! - The jar is **not** internally synchronized. Share it through a
//!   [`CookieJarHandle`].
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cookies::Cookie;
use crate::errors::CookieError;

/// Reference-counted, read/write-locked pointer to a type-erased [`CookieJar`].
pub type CookieJarHandle = Arc<RwLock<dyn CookieJar + Send + Sync>>;

/// A cookie jar keeps all cookies of a single cookie facility.
pub trait CookieJar: Send + Sync {
    /// Returns a type-erased reference to the jar, used for snapshotting.
    fn as_any(&self) -> &dyn Any;

    /// Parses `set_cookie` and stores it for `url`, replacing a cookie with the same
    /// name in the same origin ("last write wins").
    fn store_cookie(&mut self, url: &Url, set_cookie: &str) -> Result<(), CookieError>;

    /// Returns the `Cookie` header value for `url`, or `None` when nothing matches.
    fn get_request_cookies(&self, url: &Url) -> Option<String>;

    /// True when the jar holds at least one cookie.
    fn has_cookies(&self) -> bool;

    /// Removes all cookies from the jar.
    fn clear(&mut self);
}

/// Default in-memory cookie jar, bucketed by origin (`scheme://host:port`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultCookieJar {
    /// Key: origin string from `Url::origin().ascii_serialization()`.
    pub entries: HashMap<String, Vec<Cookie>>,
}

impl DefaultCookieJar {
    pub fn new() -> Self {
        DefaultCookieJar {
            entries: HashMap::new(),
        }
    }
}

impl From<DefaultCookieJar> for CookieJarHandle {
    fn from(jar: DefaultCookieJar) -> Self {
        Arc::new(RwLock::new(jar))
    }
}

impl CookieJar for DefaultCookieJar {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn store_cookie(&mut self, url: &Url, set_cookie: &str) -> Result<(), CookieError> {
        let mut cookie = Cookie::parse(set_cookie)?;

        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        if let Some(domain) = &cookie.domain {
            if !domain_matches(&host, domain) {
                return Err(CookieError::InvalidCookie(format!(
                    "domain `{domain}` does not match host `{host}`"
                )));
            }
        }

        if cookie.path.is_none() {
            let default_path = url
                .path()
                .rsplit_once('/')
                .map_or("/", |(a, _)| if a.is_empty() { "/" } else { a });
            cookie.path = Some(default_path.to_string());
        }

        let bucket = self.entries.entry(url.origin().ascii_serialization()).or_default();
        if let Some(existing) = bucket.iter_mut().find(|c| c.name == cookie.name) {
            *existing = cookie;
        } else {
            bucket.push(cookie);
        }

        Ok(())
    }

    fn get_request_cookies(&self, url: &Url) -> Option<String> {
        let origin = url.origin().ascii_serialization();
        let host = url.host_str().unwrap_or_default();
        let path = url.path();
        let is_https = url.scheme() == "https";

        let cookies = self.entries.get(&origin)?;

        let header = cookies
            .iter()
            .filter(|cookie| match &cookie.domain {
                Some(domain) => domain_matches(host, domain),
                None => true,
            })
            .filter(|cookie| match &cookie.path {
                Some(cookie_path) => path_matches(path, cookie_path),
                None => true,
            })
            .filter(|cookie| !cookie.secure || is_https)
            .map(Cookie::pair)
            .collect::<Vec<_>>()
            .join("; ");

        if header.is_empty() {
            None
        } else {
            Some(header)
        }
    }

    fn has_cookies(&self) -> bool {
        self.entries.values().any(|bucket| !bucket.is_empty())
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

fn domain_matches(host: &str, domain: &str) -> bool {
    host == domain || host.strip_suffix(domain).is_some_and(|rest| rest.ends_with('.'))
}

// RFC 6265 section 5.1.4
fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    match request_path.strip_prefix(cookie_path) {
        Some("") => true,
        Some(rest) => cookie_path.ends_with('/') || rest.starts_with('/'),
        None => false,
    }
}
