use std::sync::Arc;

use lazy_static::lazy_static;

use crate::cookie_manager::{CookieManager, InMemoryCookieManager};

lazy_static! {
    static ref PROCESS_COOKIE_MANAGER: Arc<dyn CookieManager> = InMemoryCookieManager::new().into();
}

/// Yields the cookie facility the bridge attaches to new handles.
///
/// The bridge never reaches for the process-wide facility itself, so tests can hand
/// it a private one instead.
pub trait CookieManagerProxy: Send + Sync {
    fn instance(&self) -> Arc<dyn CookieManager>;
}

/// Proxy returning the process-wide cookie facility singleton.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCookieManagerProxy;

impl CookieManagerProxy for DefaultCookieManagerProxy {
    fn instance(&self) -> Arc<dyn CookieManager> {
        PROCESS_COOKIE_MANAGER.clone()
    }
}

/// Proxy that always hands out one fixed facility.
#[derive(Clone)]
pub struct FixedCookieManagerProxy {
    manager: Arc<dyn CookieManager>,
}

impl FixedCookieManagerProxy {
    pub fn new(manager: Arc<dyn CookieManager>) -> Self {
        Self { manager }
    }
}

impl CookieManagerProxy for FixedCookieManagerProxy {
    fn instance(&self) -> Arc<dyn CookieManager> {
        self.manager.clone()
    }
}
