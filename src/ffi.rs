//! C ABI entry points.
//!
//! A foreign host creates a bridge with [`cookie_bridge_new`], forwards every
//! incoming message with [`cookie_bridge_handle_message`] and releases it with
//! [`cookie_bridge_free`]. Messages use the wire format described in
//! [`crate::transport`].
//!
//! A response that does not fit the caller's buffer is kept on the host until
//! [`cookie_bridge_take_response`] collects it, so the operation never runs twice.
use std::ffi::CStr;
use std::os::raw::c_char;
use std::ptr;
use std::sync::Arc;

use log::{error, warn};
use parking_lot::Mutex;

use crate::bridge::CookieManagerBridge;
use crate::config::BridgeConfig;
use crate::errors::BridgeError;
use crate::instance::InstanceManager;
use crate::transport::HostApiDispatcher;

/// Everything a foreign host needs to serve the cookie host API.
pub struct CookieBridgeHost {
    instances: Arc<InstanceManager>,
    dispatcher: HostApiDispatcher,
    /// Encoded response that did not fit the caller's buffer.
    pending_response: Mutex<Option<Vec<u8>>>,
}

impl CookieBridgeHost {
    pub fn new(config: &BridgeConfig) -> Self {
        let instances = InstanceManager::new();
        let bridge = CookieManagerBridge::from_config(instances.clone(), config);
        Self {
            instances,
            dispatcher: HostApiDispatcher::new(Arc::new(bridge)),
            pending_response: Mutex::new(None),
        }
    }

    /// Host for a platform at `platform_version` with otherwise default settings.
    pub fn for_platform(platform_version: u32) -> Result<Self, BridgeError> {
        let config = BridgeConfig::builder().platform_version(platform_version).build()?;
        Ok(Self::new(&config))
    }

    pub fn instances(&self) -> &Arc<InstanceManager> {
        &self.instances
    }

    pub fn dispatcher(&self) -> &HostApiDispatcher {
        &self.dispatcher
    }

    /// Handles one message on the calling thread, waiting for asynchronous replies.
    pub fn handle_blocking(&self, channel: &str, payload: &[u8]) -> Result<Vec<u8>, BridgeError> {
        futures::executor::block_on(self.dispatcher.handle_message(channel, payload))
    }
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct CookieBridgeHandle(*mut CookieBridgeHost);

impl CookieBridgeHandle {
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

/// Creates a bridge for a platform at `platform_version`. Returns a null handle when
/// the version is invalid.
#[no_mangle]
pub extern "C" fn cookie_bridge_new(platform_version: u32) -> CookieBridgeHandle {
    match CookieBridgeHost::for_platform(platform_version) {
        Ok(host) => CookieBridgeHandle(Box::into_raw(Box::new(host))),
        Err(e) => {
            error!("cookie_bridge_new: {}", e);
            CookieBridgeHandle(ptr::null_mut())
        }
    }
}

/// Handles one message and writes the encoded response envelope into `output`.
///
/// Returns the length of the response, or 0 when the handle or arguments are invalid.
/// When the length exceeds `output_size` nothing is written: the response is held
/// by the host and must be fetched with [`cookie_bridge_take_response`].
///
/// # Safety
/// `handle` must come from [`cookie_bridge_new`] and not be freed yet. `channel` must
/// be a NUL-terminated string. `payload` must point to `payload_len` readable bytes and
/// `output` to `output_size` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn cookie_bridge_handle_message(
    handle: CookieBridgeHandle,
    channel: *const c_char,
    payload: *const u8,
    payload_len: usize,
    output: *mut u8,
    output_size: usize,
) -> usize {
    if handle.0.is_null() || channel.is_null() || output.is_null() || (payload.is_null() && payload_len > 0) {
        return 0;
    }

    let host = &*handle.0;
    let Ok(channel) = CStr::from_ptr(channel).to_str() else {
        error!("cookie_bridge_handle_message: channel is not valid UTF-8");
        return 0;
    };
    let payload = if payload_len == 0 {
        &[][..]
    } else {
        std::slice::from_raw_parts(payload, payload_len)
    };

    let response = match host.handle_blocking(channel, payload) {
        Ok(response) => response,
        Err(e) => {
            error!("cookie_bridge_handle_message: {}", e);
            return 0;
        }
    };

    let len = response.len();
    if output_size < len {
        warn!("cookie_bridge_handle_message: response needs {} bytes, buffer has {}", len, output_size);
        *host.pending_response.lock() = Some(response);
        return len;
    }

    ptr::copy_nonoverlapping(response.as_ptr(), output, len);
    len
}

/// Copies the response held back by [`cookie_bridge_handle_message`] into `output`.
///
/// Returns the number of bytes written. Returns 0 when no response is held or
/// `output` is still too small; in the latter case the response stays held.
///
/// # Safety
/// `handle` must come from [`cookie_bridge_new`] and not be freed yet. `output` must
/// point to `output_size` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn cookie_bridge_take_response(
    handle: CookieBridgeHandle,
    output: *mut u8,
    output_size: usize,
) -> usize {
    if handle.0.is_null() || output.is_null() {
        return 0;
    }

    let host = &*handle.0;
    let mut pending = host.pending_response.lock();
    match pending.as_ref() {
        Some(response) if response.len() <= output_size => {
            let len = response.len();
            ptr::copy_nonoverlapping(response.as_ptr(), output, len);
            *pending = None;
            len
        }
        _ => 0,
    }
}

#[no_mangle]
pub extern "C" fn cookie_bridge_free(handle: CookieBridgeHandle) {
    if !handle.0.is_null() {
        unsafe {
            let _ = Box::from_raw(handle.0);
        }
    }
}
