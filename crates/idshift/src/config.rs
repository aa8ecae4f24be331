//! Shift configuration.
//!
//! ```toml
//! mappings = ["b:0:100000:65536"]
//! subid_user = "builder"
//! unmapped = "keep"
//! ```

use std::io::ErrorKind;
use std::path::Path;

use idshift_common::{ShiftError, ShiftResult, paths};
use serde::{Deserialize, Serialize};

use crate::idmap::IdMapSet;
use crate::shift::UnmappedPolicy;

/// Mapping configuration, usually loaded from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShiftConfig {
    /// Range specifications, in priority order.
    pub mappings: Vec<String>,
    /// Append this user's `/etc/subuid` and `/etc/subgid` ranges.
    pub subid_user: Option<String>,
    /// How IDs without a mapping are handled.
    pub unmapped: UnmappedPolicy,
}

impl ShiftConfig {
    /// Parse from TOML.
    pub fn from_toml(content: &str) -> ShiftResult<Self> {
        toml::from_str(content).map_err(|e| ShiftError::Config {
            message: format!("Failed to parse TOML: {e}"),
        })
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> ShiftResult<String> {
        toml::to_string_pretty(self).map_err(|e| ShiftError::Config {
            message: format!("Failed to serialize to TOML: {e}"),
        })
    }

    /// Load from a file.
    pub fn load(path: &Path) -> ShiftResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ShiftError::io("read", path, e))?;
        Self::from_toml(&content)
    }

    /// Load the default config file, or an empty config if there is none.
    pub fn load_default() -> ShiftResult<Self> {
        let path = paths::IDSHIFT_CONFIG.as_path();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ShiftError::io("read", path, e)),
        }
    }

    /// Add a range specification.
    #[must_use]
    pub fn with_mapping(mut self, spec: impl Into<String>) -> Self {
        self.mappings.push(spec.into());
        self
    }

    /// Set the unmapped-ID policy.
    #[must_use]
    pub fn with_unmapped(mut self, policy: UnmappedPolicy) -> Self {
        self.unmapped = policy;
        self
    }

    /// Build the ID map: configured mappings in order, then subid ranges.
    ///
    /// Stops at the first malformed or conflicting range.
    pub fn build_set(&self) -> ShiftResult<IdMapSet> {
        self.build_set_with(&paths::SUBUID, &paths::SUBGID)
    }

    /// Like [`ShiftConfig::build_set`], reading subid ranges from the given files.
    pub fn build_set_with(&self, subuid: &Path, subgid: &Path) -> ShiftResult<IdMapSet> {
        let mut set = IdMapSet::new();
        for spec in &self.mappings {
            set.append(spec)?;
        }
        if let Some(user) = &self.subid_user {
            set.append_subid(user, subuid, subgid)?;
        }
        Ok(set)
    }
}
