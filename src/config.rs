//! Platform paths and service-wide constants.

use std::path::PathBuf;

/// Service name, used for logging and OS integration.
pub const SERVICE_NAME: &str = "aukera";

/// Default TCP port the schedule server listens on.
pub const SERVICE_PORT: u16 = 9119;

/// Metric recording per-file configuration load outcomes.
pub const METRIC_CONFIG_LOADER: &str = "aukera.config_loader";

/// Metric recording per-label schedule retrievals.
pub const METRIC_SCHEDULE_RETRIEVED: &str = "aukera.schedule_retrieved";

/// Configuration JSON directory for this platform.
#[cfg(all(unix, not(target_os = "macos")))]
pub fn conf_dir() -> PathBuf {
    PathBuf::from("/etc/aukera")
}

#[cfg(target_os = "macos")]
pub fn conf_dir() -> PathBuf {
    PathBuf::from("/var/lib/aukera/conf.d")
}

#[cfg(windows)]
pub fn conf_dir() -> PathBuf {
    data_dir().join("conf")
}

/// App data directory for this platform.
#[cfg(unix)]
pub fn data_dir() -> PathBuf {
    PathBuf::from("/var/lib/aukera")
}

#[cfg(windows)]
pub fn data_dir() -> PathBuf {
    std::env::var_os("ProgramData")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\ProgramData"))
        .join("Aukera")
}

/// Active log file location for this platform.
#[cfg(unix)]
pub fn log_path() -> PathBuf {
    PathBuf::from("/var/log/aukera.log")
}

#[cfg(windows)]
pub fn log_path() -> PathBuf {
    data_dir().join("aukera.log")
}
