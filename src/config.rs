//! Bridge configuration.
//!
//! `BridgeConfig` describes the platform the bridge runs on and a few behavioral
//! switches. It provides defaults via [`Default`] and a fluent
//! [`BridgeConfig::builder()`] with validation.
//!
//! ```rust
//! use cookie_bridge::config::{BridgeConfig, LogLevel};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = BridgeConfig::builder()
//!     .platform_version(19)
//!     .flush_before_read(false)
//!     .log_level(LogLevel::Debug)
//!     .build()?;
//! assert_eq!(cfg.platform_version, 19);
//! # Ok(()) }
//! ```
use std::fmt;

use crate::platform::versions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Version of the platform the bridge is running on.
    pub platform_version: u32,
    /// Flush the cookie facility before every read so reads observe buffered writes.
    pub flush_before_read: bool,
    /// Log level used by [`crate::logging::init`].
    pub log_level: LogLevel,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            platform_version: versions::LOLLIPOP,
            flush_before_read: true,
            log_level: LogLevel::Info,
        }
    }
}

impl BridgeConfig {
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }
}

/// Builder for [`BridgeConfig`].
#[derive(Debug, Clone, Default)]
pub struct BridgeConfigBuilder {
    inner: BridgeConfig,
}

impl BridgeConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut BridgeConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn platform_version(self, version: u32) -> Self { self.map(|c| c.platform_version = version) }
    pub fn flush_before_read(self, on: bool) -> Self { self.map(|c| c.flush_before_read = on) }
    pub fn log_level(self, level: LogLevel) -> Self { self.map(|c| c.log_level = level) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<BridgeConfig, BridgeConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeConfigError {
    ZeroPlatformVersion,
}

impl fmt::Display for BridgeConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeConfigError::ZeroPlatformVersion => write!(f, "platform_version must be at least 1"),
        }
    }
}
impl std::error::Error for BridgeConfigError {}

fn validate(c: &BridgeConfig) -> Result<(), BridgeConfigError> {
    if c.platform_version == 0 {
        return Err(BridgeConfigError::ZeroPlatformVersion);
    }
    Ok(())
}
