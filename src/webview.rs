use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Native web view object as seen by the cookie facility.
///
/// Only the cookie-related state lives here. Web views are shared with the caller
/// through the instance registry as `Arc<WebView>`.
#[derive(Debug, Default)]
pub struct WebView {
    accept_third_party_cookies: AtomicBool,
}

impl WebView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Whether this web view currently accepts third-party cookies.
    pub fn accepts_third_party_cookies(&self) -> bool {
        self.accept_third_party_cookies.load(Ordering::SeqCst)
    }

    pub fn set_third_party_cookie_policy(&self, accept: bool) {
        self.accept_third_party_cookies.store(accept, Ordering::SeqCst);
    }
}
