//! Host API bridge for the native cookie facility.
//!
//! The remote caller addresses cookie facilities and web views by [`InstanceId`].
//! [`CookieManagerBridge`] resolves those identifiers through the shared
//! [`InstanceManager`], applies platform-version gates through a [`PlatformChecker`]
//! and drives the resolved [`CookieManager`].
//!
//! The bridge never owns native objects: every call resolves its handles again, and
//! an unknown handle fails the call with [`BridgeError::MissingInstance`].
use std::sync::Arc;

use log::{debug, warn};
use url::Url;

use crate::config::BridgeConfig;
use crate::cookie_manager::CookieManager;
use crate::errors::BridgeError;
use crate::instance::{InstanceId, InstanceManager};
use crate::platform::{versions, PlatformChecker, SystemPlatform};
use crate::proxy::{CookieManagerProxy, DefaultCookieManagerProxy};
use crate::reply::Reply;
use crate::webview::WebView;

/// Host-side operations the remote caller can invoke on a cookie facility.
pub trait CookieManagerHostApi: Send + Sync {
    /// Registers the native cookie facility under `instance_id`.
    fn attach_instance(&self, instance_id: InstanceId) -> Result<(), BridgeError>;

    fn set_cookie(&self, instance_id: InstanceId, url: &str, value: &str) -> Result<(), BridgeError>;

    /// Returns the cookies stored for `url`, or `None` when there are none.
    fn get_cookies(&self, instance_id: InstanceId, url: &str) -> Result<Option<String>, BridgeError>;

    /// Removes all cookies and answers through `reply` with whether any existed.
    ///
    /// The answer may arrive after this call returns.
    fn remove_all_cookies(&self, instance_id: InstanceId, reply: Reply<bool>);

    fn set_accept_third_party_cookies(
        &self,
        instance_id: InstanceId,
        webview_id: InstanceId,
        accept: bool,
    ) -> Result<(), BridgeError>;
}

pub struct CookieManagerBridge {
    instances: Arc<InstanceManager>,
    proxy: Arc<dyn CookieManagerProxy>,
    checker: Arc<dyn PlatformChecker>,
    flush_before_read: bool,
}

impl CookieManagerBridge {
    /// Bridge over the process-wide cookie facility, configured with defaults.
    pub fn new(instances: Arc<InstanceManager>) -> Self {
        Self::from_config(instances, &BridgeConfig::default())
    }

    pub fn from_config(instances: Arc<InstanceManager>, config: &BridgeConfig) -> Self {
        Self {
            instances,
            proxy: Arc::new(DefaultCookieManagerProxy),
            checker: Arc::new(SystemPlatform::new(config.platform_version)),
            flush_before_read: config.flush_before_read,
        }
    }

    /// Replaces the source of facilities handed out by `attach_instance`.
    pub fn with_proxy(mut self, proxy: Arc<dyn CookieManagerProxy>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_checker(mut self, checker: Arc<dyn PlatformChecker>) -> Self {
        self.checker = checker;
        self
    }

    pub fn instances(&self) -> &Arc<InstanceManager> {
        &self.instances
    }

    fn cookie_manager(&self, id: InstanceId) -> Result<Arc<dyn CookieManager>, BridgeError> {
        Ok(self.instances.get_instance::<Arc<dyn CookieManager>>(id)?)
    }

    fn webview(&self, id: InstanceId) -> Result<Arc<WebView>, BridgeError> {
        Ok(self.instances.get_instance::<Arc<WebView>>(id)?)
    }

    fn remove_cookies_legacy(cookie_manager: &dyn CookieManager) -> bool {
        let has_cookies = cookie_manager.has_cookies();
        if has_cookies {
            cookie_manager.remove_all_cookie();
        }
        has_cookies
    }
}

/// Parses a caller-supplied URL. A value without any scheme defaults to `https://`.
///
/// Only `http` and `https` URLs with a host are accepted. Anything else is rejected;
/// it is never rewritten into some other destination.
pub fn parse_cookie_url(raw: &str) -> Result<Url, BridgeError> {
    let malformed = |reason: String| BridgeError::MalformedUrl {
        url: raw.to_string(),
        reason,
    };

    let url = if raw.contains("://") {
        Url::parse(raw)
    } else {
        Url::parse(&format!("https://{raw}"))
    }
    .map_err(|e| malformed(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(malformed(format!("unsupported scheme `{}`", url.scheme())));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(malformed("missing host".to_string())),
    }
}

impl CookieManagerHostApi for CookieManagerBridge {
    fn attach_instance(&self, instance_id: InstanceId) -> Result<(), BridgeError> {
        self.instances
            .add_dart_created_instance(self.proxy.instance(), instance_id)?;
        debug!("CookieManagerBridge: attached cookie manager {}", instance_id);
        Ok(())
    }

    fn set_cookie(&self, instance_id: InstanceId, url: &str, value: &str) -> Result<(), BridgeError> {
        let cookie_manager = self.cookie_manager(instance_id)?;
        let url = parse_cookie_url(url)?;

        cookie_manager.set_cookie(&url, value)?;
        debug!("CookieManagerBridge[{}]: set cookie for {}", instance_id, url);
        Ok(())
    }

    fn get_cookies(&self, instance_id: InstanceId, url: &str) -> Result<Option<String>, BridgeError> {
        let cookie_manager = self.cookie_manager(instance_id)?;
        let url = parse_cookie_url(url)?;

        if self.flush_before_read {
            cookie_manager.flush()?;
        }

        Ok(cookie_manager.get_cookie(&url))
    }

    fn remove_all_cookies(&self, instance_id: InstanceId, reply: Reply<bool>) {
        let cookie_manager = match self.cookie_manager(instance_id) {
            Ok(cookie_manager) => cookie_manager,
            Err(e) => {
                warn!("CookieManagerBridge[{}]: removeAllCookies failed: {}", instance_id, e);
                reply.error(e);
                return;
            }
        };

        if self.checker.sdk_is_at_least(versions::LOLLIPOP) {
            cookie_manager.remove_all_cookies(Box::new(move |removed| reply.success(removed)));
        } else {
            reply.success(Self::remove_cookies_legacy(cookie_manager.as_ref()));
        }
    }

    fn set_accept_third_party_cookies(
        &self,
        instance_id: InstanceId,
        webview_id: InstanceId,
        accept: bool,
    ) -> Result<(), BridgeError> {
        let cookie_manager = self.cookie_manager(instance_id)?;
        let webview = self.webview(webview_id)?;

        if !self.checker.sdk_is_at_least(versions::LOLLIPOP) {
            warn!("CookieManagerBridge[{}]: setAcceptThirdPartyCookies on legacy platform", instance_id);
            return Err(BridgeError::Unsupported {
                operation: "setAcceptThirdPartyCookies",
                required: versions::LOLLIPOP,
            });
        }

        cookie_manager.set_accept_third_party_cookies(&webview, accept);
        debug!(
            "CookieManagerBridge[{}]: third-party cookies {} for webview {}",
            instance_id,
            if accept { "accepted" } else { "rejected" },
            webview_id
        );
        Ok(())
    }
}
