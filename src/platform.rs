//! Platform capability checks.
//!
//! Host API calls that depend on the platform version ask a [`PlatformChecker`]
//! instead of querying the platform directly, so both code paths can be exercised
//! without running on two different platforms.

/// Platform versions that gate behavior in this crate.
pub mod versions {
    /// First version with asynchronous cookie removal and per-webview third-party
    /// cookie settings.
    pub const LOLLIPOP: u32 = 21;
}

/// Answers "is the running platform at least version `version`?".
pub trait PlatformChecker: Send + Sync {
    fn sdk_is_at_least(&self, version: u32) -> bool;
}

impl<F> PlatformChecker for F
where
    F: Fn(u32) -> bool + Send + Sync,
{
    fn sdk_is_at_least(&self, version: u32) -> bool {
        self(version)
    }
}

/// Checker backed by the platform version reported at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemPlatform {
    version: u32,
}

impl SystemPlatform {
    pub fn new(version: u32) -> Self {
        Self { version }
    }

    pub fn version(&self) -> u32 {
        self.version
    }
}

impl PlatformChecker for SystemPlatform {
    fn sdk_is_at_least(&self, version: u32) -> bool {
        self.version >= version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_platform_compares_inclusive() {
        let platform = SystemPlatform::new(versions::LOLLIPOP);
        assert!(platform.sdk_is_at_least(versions::LOLLIPOP));
        assert!(platform.sdk_is_at_least(19));
        assert!(!platform.sdk_is_at_least(22));
    }

    #[test]
    fn closures_act_as_checkers() {
        let legacy = |_version: u32| false;
        let checker: &dyn PlatformChecker = &legacy;
        assert!(!checker.sdk_is_at_least(versions::LOLLIPOP));
    }
}
