//! Well-known filesystem paths for idshift.

use std::path::PathBuf;

use once_cell::sync::Lazy;

/// Default configuration file.
pub static IDSHIFT_CONFIG: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var("IDSHIFT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/etc/idshift/config.toml"))
});

/// Subordinate UID ranges.
pub static SUBUID: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var("IDSHIFT_SUBUID")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/etc/subuid"))
});

/// Subordinate GID ranges.
pub static SUBGID: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var("IDSHIFT_SUBGID")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/etc/subgid"))
});
