use crate::config::LogLevel;

/// Installs an `env_logger` at `level`. `RUST_LOG` still overrides per module.
///
/// Calling it more than once is harmless; later calls leave the first logger in place.
pub fn init(level: LogLevel) {
    let _ = env_logger::Builder::new()
        .filter_level(level.into())
        .parse_default_env()
        .try_init();
}
