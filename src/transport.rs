//! Message transport for the cookie host API.
//!
//! The remote caller sends a message on a named channel, one channel per host API
//! operation (`cookie_bridge.CookieManagerHostApi.setCookie`, ...). The payload is a
//! JSON array with the positional arguments of the call:
//!
//! ```text
//! cookie_bridge.CookieManagerHostApi.setCookie   [1, "example.com", "a=b"]
//! ```
//!
//! Every message is answered with an [`Envelope`]: `{"result": <value>}` on success
//! (`null` for operations without a value and for "no cookies") or
//! `{"error": {"code": ..., "message": ..., "details": ...}}` on failure.
//!
//! `removeAllCookies` may complete after the host API call returns; the dispatcher
//! waits for its [`Reply`](crate::reply::Reply). Timeouts are left to the caller.
use std::fmt::Display;
use std::sync::Arc;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bridge::CookieManagerHostApi;
use crate::errors::BridgeError;
use crate::instance::InstanceId;
use crate::reply::reply_channel;

pub const CHANNEL_PREFIX: &str = "cookie_bridge.CookieManagerHostApi.";

/// Host API operations reachable over the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostApiChannel {
    AttachInstance,
    SetCookie,
    GetCookies,
    RemoveAllCookies,
    SetAcceptThirdPartyCookies,
}

impl HostApiChannel {
    pub const ALL: [HostApiChannel; 5] = [
        HostApiChannel::AttachInstance,
        HostApiChannel::SetCookie,
        HostApiChannel::GetCookies,
        HostApiChannel::RemoveAllCookies,
        HostApiChannel::SetAcceptThirdPartyCookies,
    ];

    pub fn operation(&self) -> &'static str {
        match self {
            HostApiChannel::AttachInstance => "attachInstance",
            HostApiChannel::SetCookie => "setCookie",
            HostApiChannel::GetCookies => "getCookies",
            HostApiChannel::RemoveAllCookies => "removeAllCookies",
            HostApiChannel::SetAcceptThirdPartyCookies => "setAcceptThirdPartyCookies",
        }
    }

    /// Full channel name as used on the wire.
    pub fn name(&self) -> String {
        format!("{}{}", CHANNEL_PREFIX, self.operation())
    }

    pub fn from_name(channel: &str) -> Option<Self> {
        let operation = channel.strip_prefix(CHANNEL_PREFIX)?;
        Self::ALL.into_iter().find(|c| c.operation() == operation)
    }
}

impl Display for HostApiChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.operation())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl From<&BridgeError> for ErrorPayload {
    fn from(err: &BridgeError) -> Self {
        let details = match err {
            BridgeError::MissingInstance(id) => Some(id.to_string()),
            BridgeError::MalformedUrl { url, .. } => Some(url.clone()),
            BridgeError::NoHandler(channel) => Some(channel.clone()),
            _ => None,
        };

        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            details,
        }
    }
}

/// Response to a single transport message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Envelope {
    Result(Value),
    Error(ErrorPayload),
}

impl Envelope {
    pub fn encode(&self) -> Result<Vec<u8>, BridgeError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, BridgeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl From<Result<Value, BridgeError>> for Envelope {
    fn from(result: Result<Value, BridgeError>) -> Self {
        match result {
            Ok(value) => Envelope::Result(value),
            Err(err) => Envelope::Error(ErrorPayload::from(&err)),
        }
    }
}

/// Routes transport messages to a [`CookieManagerHostApi`].
#[derive(Clone)]
pub struct HostApiDispatcher {
    api: Arc<dyn CookieManagerHostApi>,
}

impl HostApiDispatcher {
    pub fn new(api: Arc<dyn CookieManagerHostApi>) -> Self {
        Self { api }
    }

    /// Channel names this dispatcher answers.
    pub fn channels(&self) -> Vec<String> {
        HostApiChannel::ALL.iter().map(HostApiChannel::name).collect()
    }

    /// Handles one message and returns the encoded [`Envelope`].
    pub async fn handle_message(&self, channel: &str, payload: &[u8]) -> Result<Vec<u8>, BridgeError> {
        self.handle(channel, payload).await.encode()
    }

    pub async fn handle(&self, channel: &str, payload: &[u8]) -> Envelope {
        let result = self.dispatch(channel, payload).await;
        if let Err(e) = &result {
            warn!("HostApiDispatcher: `{}` failed: {}", channel, e);
        }
        result.into()
    }

    async fn dispatch(&self, channel: &str, payload: &[u8]) -> Result<Value, BridgeError> {
        let channel = HostApiChannel::from_name(channel)
            .ok_or_else(|| BridgeError::NoHandler(channel.to_string()))?;
        debug!("HostApiDispatcher: dispatching {}", channel);

        match channel {
            HostApiChannel::AttachInstance => {
                let (id,): (InstanceId,) = decode_args(channel, payload)?;
                self.api.attach_instance(id)?;
                Ok(Value::Null)
            }
            HostApiChannel::SetCookie => {
                let (id, url, value): (InstanceId, String, String) = decode_args(channel, payload)?;
                self.api.set_cookie(id, &url, &value)?;
                Ok(Value::Null)
            }
            HostApiChannel::GetCookies => {
                let (id, url): (InstanceId, String) = decode_args(channel, payload)?;
                Ok(Value::from(self.api.get_cookies(id, &url)?))
            }
            HostApiChannel::RemoveAllCookies => {
                let (id,): (InstanceId,) = decode_args(channel, payload)?;
                let (reply, pending) = reply_channel();
                self.api.remove_all_cookies(id, reply);
                Ok(Value::Bool(pending.recv().await?))
            }
            HostApiChannel::SetAcceptThirdPartyCookies => {
                let (id, webview_id, accept): (InstanceId, InstanceId, bool) = decode_args(channel, payload)?;
                self.api.set_accept_third_party_cookies(id, webview_id, accept)?;
                Ok(Value::Null)
            }
        }
    }
}

fn decode_args<T: DeserializeOwned>(channel: HostApiChannel, payload: &[u8]) -> Result<T, BridgeError> {
    serde_json::from_slice(payload)
        .map_err(|e| BridgeError::InvalidArguments(format!("{}: {}", channel, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::CookieManagerBridge;
    use crate::cookie_manager::{CookieManager, InMemoryCookieManager};
    use crate::instance::InstanceManager;
    use crate::proxy::FixedCookieManagerProxy;
    use serde_json::json;

    fn dispatcher(modern: bool) -> HostApiDispatcher {
        let manager: Arc<dyn CookieManager> = InMemoryCookieManager::new().into();
        let bridge = CookieManagerBridge::new(InstanceManager::new())
            .with_proxy(Arc::new(FixedCookieManagerProxy::new(manager)))
            .with_checker(Arc::new(move |_version: u32| modern));
        HostApiDispatcher::new(Arc::new(bridge))
    }

    async fn call(d: &HostApiDispatcher, channel: HostApiChannel, args: Value) -> Envelope {
        d.handle(&channel.name(), args.to_string().as_bytes()).await
    }

    #[test]
    fn channel_names_round_trip() {
        for channel in HostApiChannel::ALL {
            assert_eq!(HostApiChannel::from_name(&channel.name()), Some(channel));
        }
        assert_eq!(
            HostApiChannel::SetCookie.name(),
            "cookie_bridge.CookieManagerHostApi.setCookie"
        );
        assert_eq!(HostApiChannel::from_name("other.Api.setCookie"), None);
    }

    #[tokio::test]
    async fn set_and_get_through_messages() {
        let d = dispatcher(true);

        assert_eq!(call(&d, HostApiChannel::AttachInstance, json!([1])).await, Envelope::Result(Value::Null));
        assert_eq!(
            call(&d, HostApiChannel::SetCookie, json!([1, "example.com", "a=b"])).await,
            Envelope::Result(Value::Null)
        );
        assert_eq!(
            call(&d, HostApiChannel::GetCookies, json!([1, "example.com"])).await,
            Envelope::Result(json!("a=b"))
        );
        assert_eq!(
            call(&d, HostApiChannel::GetCookies, json!([1, "nothing.here"])).await,
            Envelope::Result(Value::Null)
        );
    }

    #[tokio::test]
    async fn remove_all_waits_for_reply() {
        let d = dispatcher(true);
        call(&d, HostApiChannel::AttachInstance, json!([1])).await;
        call(&d, HostApiChannel::SetCookie, json!([1, "example.com", "a=b"])).await;

        assert_eq!(call(&d, HostApiChannel::RemoveAllCookies, json!([1])).await, Envelope::Result(json!(true)));
        assert_eq!(call(&d, HostApiChannel::RemoveAllCookies, json!([1])).await, Envelope::Result(json!(false)));
    }

    #[tokio::test]
    async fn errors_become_error_envelopes() {
        let d = dispatcher(false);

        match call(&d, HostApiChannel::GetCookies, json!([9, "example.com"])).await {
            Envelope::Error(payload) => {
                assert_eq!(payload.code, "missing-instance");
                assert_eq!(payload.details.as_deref(), Some("9"));
            }
            other => panic!("expected error, got {other:?}"),
        }

        call(&d, HostApiChannel::AttachInstance, json!([1])).await;
        match call(&d, HostApiChannel::SetAcceptThirdPartyCookies, json!([1, 1, true])).await {
            Envelope::Error(payload) => assert_eq!(payload.code, "instance-error"),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bad_arguments_and_unknown_channels() {
        let d = dispatcher(true);

        match call(&d, HostApiChannel::SetCookie, json!([1, "example.com"])).await {
            Envelope::Error(payload) => assert_eq!(payload.code, "invalid-arguments"),
            other => panic!("expected error, got {other:?}"),
        }

        match d.handle("cookie_bridge.CookieManagerHostApi.flush", b"[]").await {
            Envelope::Error(payload) => assert_eq!(payload.code, "no-handler"),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn encoded_envelope_shape() {
        let d = dispatcher(true);
        let bytes = d
            .handle_message(&HostApiChannel::AttachInstance.name(), b"[3]")
            .await
            .unwrap();

        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!({ "result": null }));
        assert_eq!(Envelope::decode(&bytes).unwrap(), Envelope::Result(Value::Null));
    }
}
