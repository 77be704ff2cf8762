//! Host-side bridge exposing a native cookie facility to a remote caller.
//!
//! The caller lives in another runtime and talks to this crate only through
//! serialized messages. It refers to native objects (cookie facilities, web views)
//! by integer [`InstanceId`]s registered in a shared [`InstanceManager`]; the
//! [`CookieManagerBridge`] resolves them on every call, gates platform-dependent
//! behavior through a [`PlatformChecker`] and answers asynchronous calls through a
//! [`Reply`].
pub mod bridge;
pub mod config;
pub mod cookie_manager;
pub mod cookies;
pub mod errors;
pub mod ffi;
pub mod instance;
pub mod logging;
pub mod platform;
pub mod proxy;
pub mod reply;
pub mod transport;
pub mod webview;

pub use bridge::{CookieManagerBridge, CookieManagerHostApi};
pub use config::{BridgeConfig, LogLevel};
pub use cookie_manager::{CookieManager, InMemoryCookieManager};
pub use errors::{BridgeError, CookieError, InstanceError};
pub use instance::{InstanceId, InstanceManager};
pub use platform::{PlatformChecker, SystemPlatform};
pub use reply::{reply_channel, PendingReply, Reply};
pub use transport::{Envelope, HostApiDispatcher};
pub use webview::WebView;
