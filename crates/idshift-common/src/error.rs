//! Common error types for idshift.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`ShiftError`].
pub type ShiftResult<T> = Result<T, ShiftError>;

/// Errors raised while building ID maps or shifting a tree.
#[derive(Error, Diagnostic, Debug)]
pub enum ShiftError {
    /// Malformed range specification.
    #[error("Bad idmap {spec:?}: {reason}")]
    #[diagnostic(
        code(idshift::idmap::parse),
        help("Ranges look like <u|g|b>:<namespace-start>:<host-start>:<length>, e.g. b:0:100000:65536")
    )]
    Parse {
        /// The specification text as given.
        spec: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A new range overlaps one already in the set.
    #[error("Conflicting id mapping: {spec:?} overlaps {existing:?}")]
    #[diagnostic(
        code(idshift::idmap::conflict),
        help("Ranges that apply to the same ID kind must not overlap on either side")
    )]
    Conflict {
        /// The rejected specification.
        spec: String,
        /// The existing entry it collides with.
        existing: String,
    },

    /// Root of a shift does not exist.
    #[error("No such file or directory: {}", path.display())]
    #[diagnostic(code(idshift::not_found))]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A filesystem operation on a specific entry failed.
    #[error("Failed to {operation} {}: {source}", path.display())]
    #[diagnostic(
        code(idshift::io),
        help("Changing ownership usually requires root or CAP_CHOWN")
    )]
    Io {
        /// The operation that failed (e.g. "read ownership of").
        operation: &'static str,
        /// The entry it failed on.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An ID had no mapping and the run was asked to refuse those.
    #[error("No mapping for {kind} {id} on {}", path.display())]
    #[diagnostic(
        code(idshift::unmapped),
        help("Add a range covering this ID, or allow unmapped IDs to be left unchanged")
    )]
    Unmapped {
        /// The entry carrying the ID.
        path: PathBuf,
        /// "uid" or "gid".
        kind: &'static str,
        /// The untranslatable ID.
        id: u32,
    },

    /// No subordinate range for a user.
    #[error("No subordinate id range for {user} in {}", path.display())]
    #[diagnostic(code(idshift::subid::not_found))]
    SubIdNotFound {
        /// User name or numeric id that was looked up.
        user: String,
        /// The file that was searched.
        path: PathBuf,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(idshift::io))]
    IoGeneric(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(idshift::config))]
    Config {
        /// The error message.
        message: String,
    },
}

impl ShiftError {
    /// Build an [`ShiftError::Io`] for `path`.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ShiftError::Parse {
            spec: "x:0:0:1".to_string(),
            reason: "unknown kind 'x'".to_string(),
        };
        assert_eq!(err.to_string(), "Bad idmap \"x:0:0:1\": unknown kind 'x'");
    }

    #[test]
    fn io_error_names_path() {
        let err = ShiftError::io(
            "change ownership of",
            "/srv/rootfs/etc",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to change ownership of /srv/rootfs/etc:"));
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ShiftError = io_err.into();
        assert!(matches!(err, ShiftError::IoGeneric(_)));
    }
}
