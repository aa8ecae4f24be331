//! What a shift did, entry by entry and in total.

use std::fmt;
use std::path::{Path, PathBuf};

/// The ownership an entry received (or would receive in a dry run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftRecord {
    /// Path of the entry.
    pub path: PathBuf,
    /// New owner, or `None` if its uid had no mapping.
    pub uid: Option<u32>,
    /// New group, or `None` if its gid had no mapping.
    pub gid: Option<u32>,
    /// Whether the entry is a symbolic link.
    pub is_symlink: bool,
}

impl ShiftRecord {
    /// Path of the entry.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Renders as `would shift <path> to <uid> <gid>`, with `-1` for an
/// unmapped ID.
impl fmt::Display for ShiftRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "would shift {:?} to {} {}",
            self.path,
            DisplayId(self.uid),
            DisplayId(self.gid)
        )
    }
}

struct DisplayId(Option<u32>);

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{id}"),
            None => f.write_str("-1"),
        }
    }
}

/// Totals for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShiftSummary {
    /// Entries visited, root included.
    pub visited: u64,
    /// Ownership changes applied (always 0 in a dry run).
    pub changed: u64,
    /// Entries whose uid had no mapping.
    pub unmapped_uids: u64,
    /// Entries whose gid had no mapping.
    pub unmapped_gids: u64,
    /// Entries whose mode could not be restored after the change.
    pub mode_restore_failures: u64,
}

impl ShiftSummary {
    pub(crate) fn record(&mut self, record: &ShiftRecord) {
        self.visited += 1;
        if record.uid.is_none() {
            self.unmapped_uids += 1;
        }
        if record.gid.is_none() {
            self.unmapped_gids += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_line() {
        let record = ShiftRecord {
            path: PathBuf::from("/srv/rootfs/etc"),
            uid: Some(100_000),
            gid: None,
            is_symlink: false,
        };
        assert_eq!(
            record.to_string(),
            "would shift \"/srv/rootfs/etc\" to 100000 -1"
        );
    }

    #[test]
    fn summary_counts_unmapped() {
        let mut summary = ShiftSummary::default();
        summary.record(&ShiftRecord {
            path: PathBuf::from("a"),
            uid: None,
            gid: Some(1),
            is_symlink: true,
        });
        summary.record(&ShiftRecord {
            path: PathBuf::from("b"),
            uid: None,
            gid: None,
            is_symlink: false,
        });
        assert_eq!(summary.visited, 2);
        assert_eq!(summary.unmapped_uids, 2);
        assert_eq!(summary.unmapped_gids, 1);
        assert_eq!(summary.changed, 0);
    }
}
