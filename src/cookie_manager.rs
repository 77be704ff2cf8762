//! Native cookie facility.
//!
//! [`CookieManager`] is the platform-facing cookie API the bridge drives. It mirrors
//! what a platform cookie manager offers: synchronous reads and writes, an
//! asynchronous "remove everything" call reporting through a callback, the legacy
//! synchronous removal, per-webview third-party cookie settings and `flush`.
//!
//! [`InMemoryCookieManager`] is the implementation shipped with this crate. It keeps
//! cookies in a [`CookieJarHandle`] and can persist them through a
//! [`CookieStore`](crate::cookies::CookieStore).
use std::sync::Arc;

use log::{debug, warn};
use tokio::runtime::Handle;
use url::Url;

use crate::cookies::{CookieJarHandle, CookieStoreHandle, DefaultCookieJar};
use crate::errors::CookieError;
use crate::webview::WebView;

/// Completion callback handed to asynchronous native calls.
///
/// The callback may run on a different thread than the call that started the work.
pub type ValueCallback<T> = Box<dyn FnOnce(T) + Send + 'static>;

pub trait CookieManager: Send + Sync {
    /// Sets `value` (a `Set-Cookie` style string) for exactly `url`.
    fn set_cookie(&self, url: &Url, value: &str) -> Result<(), CookieError>;

    /// Returns the cookies for `url` as `"a=b; c=d"`, or `None` when there are none.
    fn get_cookie(&self, url: &Url) -> Option<String>;

    fn has_cookies(&self) -> bool;

    /// Removes all cookies, then invokes `callback` with whether anything was removed.
    fn remove_all_cookies(&self, callback: ValueCallback<bool>);

    /// Legacy synchronous removal of all cookies.
    fn remove_all_cookie(&self);

    fn set_accept_third_party_cookies(&self, webview: &WebView, accept: bool);

    /// Makes the current cookie state durable. No-op when nothing backs the facility.
    fn flush(&self) -> Result<(), CookieError>;
}

/// Cookie facility backed by an in-memory jar and an optional persistent store.
pub struct InMemoryCookieManager {
    jar: CookieJarHandle,
    store: Option<CookieStoreHandle>,
    /// Runtime on which asynchronous removals complete. Inline when `None`.
    runtime: Option<Handle>,
}

impl Default for InMemoryCookieManager {
    fn default() -> Self {
        Self::with_jar(DefaultCookieJar::new().into())
    }
}

impl InMemoryCookieManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jar(jar: CookieJarHandle) -> Self {
        Self {
            jar,
            store: None,
            runtime: None,
        }
    }

    /// Creates a facility whose jar is loaded from `store` and flushed back to it.
    pub fn with_store(store: CookieStoreHandle) -> Result<Self, CookieError> {
        let jar = store.load()?;
        Ok(Self {
            jar: jar.into(),
            store: Some(store),
            runtime: None,
        })
    }

    /// Completes asynchronous removals on `runtime` instead of on the calling thread.
    pub fn on_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn jar(&self) -> CookieJarHandle {
        self.jar.clone()
    }

    fn clear_jar(jar: &CookieJarHandle) -> bool {
        let mut jar = jar.write();
        let had_cookies = jar.has_cookies();
        jar.clear();
        had_cookies
    }
}

impl CookieManager for InMemoryCookieManager {
    fn set_cookie(&self, url: &Url, value: &str) -> Result<(), CookieError> {
        self.jar.write().store_cookie(url, value)
    }

    fn get_cookie(&self, url: &Url) -> Option<String> {
        self.jar.read().get_request_cookies(url)
    }

    fn has_cookies(&self) -> bool {
        self.jar.read().has_cookies()
    }

    fn remove_all_cookies(&self, callback: ValueCallback<bool>) {
        let jar = self.jar.clone();
        let task = move || {
            let removed = Self::clear_jar(&jar);
            debug!("InMemoryCookieManager: removed all cookies (had cookies: {})", removed);
            callback(removed);
        };

        match &self.runtime {
            Some(runtime) => {
                runtime.spawn_blocking(task);
            }
            None => task(),
        }
    }

    fn remove_all_cookie(&self) {
        Self::clear_jar(&self.jar);
    }

    fn set_accept_third_party_cookies(&self, webview: &WebView, accept: bool) {
        webview.set_third_party_cookie_policy(accept);
    }

    fn flush(&self) -> Result<(), CookieError> {
        let Some(store) = &self.store else {
            return Ok(());
        };

        let snapshot = {
            let jar = self.jar.read();
            match jar.as_any().downcast_ref::<DefaultCookieJar>() {
                Some(jar) => jar.clone(),
                None => {
                    warn!("InMemoryCookieManager: jar cannot be snapshotted, skipping flush");
                    return Ok(());
                }
            }
        };

        store.persist(&snapshot)
    }
}

impl From<InMemoryCookieManager> for Arc<dyn CookieManager> {
    fn from(manager: InMemoryCookieManager) -> Self {
        Arc::new(manager)
    }
}
