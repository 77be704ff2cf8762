use crate::config::BridgeConfigError;
use crate::instance::InstanceId;

/// Errors raised by the [`InstanceManager`](crate::instance::InstanceManager).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstanceError {
    #[error("No instance registered for identifier {0}")]
    NotFound(InstanceId),

    #[error("An instance is already registered for identifier {0}")]
    AlreadyRegistered(InstanceId),

    #[error("Identifier {0} is outside the caller-created range")]
    InvalidIdentifier(InstanceId),

    #[error("Instance {id} is not a {expected}")]
    TypeMismatch { id: InstanceId, expected: &'static str },
}

/// Errors raised by cookie storage and the native cookie facility.
#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    #[error("Cookie store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cookie store serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid cookie: {0}")]
    InvalidCookie(String),
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Missing instance for identifier {0}")]
    MissingInstance(InstanceId),

    #[error(transparent)]
    Instance(InstanceError),

    #[error("`{operation}` is unsupported on platform versions below {required}")]
    Unsupported { operation: &'static str, required: u32 },

    #[error("Malformed URL `{url}`: {reason}")]
    MalformedUrl { url: String, reason: String },

    #[error(transparent)]
    Cookie(#[from] CookieError),

    #[error("Reply was dropped before a result was delivered")]
    ReplyDropped,

    #[error("No handler registered for channel `{0}`")]
    NoHandler(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Message codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<InstanceError> for BridgeError {
    fn from(err: InstanceError) -> Self {
        match err {
            InstanceError::NotFound(id) => BridgeError::MissingInstance(id),
            other => BridgeError::Instance(other),
        }
    }
}

impl From<BridgeConfigError> for BridgeError {
    fn from(err: BridgeConfigError) -> Self {
        BridgeError::InvalidConfig(err.to_string())
    }
}

impl BridgeError {
    /// Stable code reported to the caller in error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::MissingInstance(_) => "missing-instance",
            BridgeError::Instance(_) => "instance-error",
            BridgeError::Unsupported { .. } => "unsupported-operation",
            BridgeError::MalformedUrl { .. } => "malformed-url",
            BridgeError::Cookie(_) => "cookie-error",
            BridgeError::ReplyDropped => "reply-dropped",
            BridgeError::NoHandler(_) => "no-handler",
            BridgeError::InvalidArguments(_) => "invalid-arguments",
            BridgeError::Codec(_) => "codec-error",
            BridgeError::InvalidConfig(_) => "invalid-config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_missing_instance() {
        let err: BridgeError = InstanceError::NotFound(InstanceId::from(7)).into();
        assert!(matches!(err, BridgeError::MissingInstance(id) if id == InstanceId::from(7)));
        assert_eq!(err.code(), "missing-instance");
    }

    #[test]
    fn other_registry_errors_are_kept_intact() {
        let err: BridgeError = InstanceError::AlreadyRegistered(InstanceId::from(3)).into();
        assert!(matches!(
            err,
            BridgeError::Instance(InstanceError::AlreadyRegistered(_))
        ));
    }

    #[test]
    fn unsupported_message_names_operation_and_version() {
        let err = BridgeError::Unsupported {
            operation: "setAcceptThirdPartyCookies",
            required: 21,
        };
        assert_eq!(
            err.to_string(),
            "`setAcceptThirdPartyCookies` is unsupported on platform versions below 21"
        );
        assert_eq!(err.code(), "unsupported-operation");
    }
}
