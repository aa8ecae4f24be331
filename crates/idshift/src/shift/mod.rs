//! Recursive ownership shifting.
//!
//! Every entry under a root (the root included) has its owner and group
//! read without following symlinks, translated through an [`IdMapSet`],
//! and written back with `lchown`. Symlinks are never followed: the link
//! itself is shifted and its target is left alone unless the walk reaches
//! the target on its own.
//!
//! `chown` clears setuid/setgid bits on some platforms, so the mode read
//! before the change is restored afterwards on everything but symlinks.
//! That restore is best effort; any failure to read or change ownership
//! aborts the run and leaves already shifted entries as they are.

mod report;

use std::io;
use std::os::unix::fs::{MetadataExt, lchown};
use std::path::{Path, PathBuf};

use idshift_common::{ShiftError, ShiftResult};
use rustix::fs::{AtFlags, CWD, Mode, chmodat};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::idmap::{Direction, IdMapSet};

pub use report::{ShiftRecord, ShiftSummary};

/// What to do with an ID no range covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmappedPolicy {
    /// Leave that ID as it is on disk.
    #[default]
    Keep,
    /// Abort the run.
    Reject,
}

/// Walks a tree and shifts the ownership of every entry in it.
#[derive(Debug, Clone)]
pub struct TreeShifter<'a> {
    map: &'a IdMapSet,
    root: PathBuf,
    direction: Direction,
    dry_run: bool,
    unmapped: UnmappedPolicy,
}

impl<'a> TreeShifter<'a> {
    /// Create a shifter for `root`.
    pub fn new(map: &'a IdMapSet, root: impl Into<PathBuf>, direction: Direction) -> Self {
        Self {
            map,
            root: root.into(),
            direction,
            dry_run: false,
            unmapped: UnmappedPolicy::default(),
        }
    }

    /// Compute and report the new ownership without changing anything.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set how unmapped IDs are handled.
    #[must_use]
    pub fn with_unmapped(mut self, policy: UnmappedPolicy) -> Self {
        self.unmapped = policy;
        self
    }

    /// Root of the walk.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Shift the tree.
    pub fn run(&self) -> ShiftResult<ShiftSummary> {
        self.run_with(|_| {})
    }

    /// Shift the tree, calling `visit` once per entry after it is handled.
    pub fn run_with(&self, mut visit: impl FnMut(&ShiftRecord)) -> ShiftResult<ShiftSummary> {
        match std::fs::symlink_metadata(&self.root) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ShiftError::NotFound {
                    path: self.root.clone(),
                });
            }
            Err(e) => return Err(ShiftError::io("stat", &self.root, e)),
        }

        tracing::info!(
            root = %self.root.display(),
            direction = ?self.direction,
            dry_run = self.dry_run,
            "Shifting tree"
        );

        let mut summary = ShiftSummary::default();
        let walk = WalkDir::new(&self.root)
            .follow_links(false)
            .follow_root_links(false);

        for entry in walk {
            let entry = entry.map_err(|e| walk_error(&self.root, e))?;
            let record = self.shift_entry(&entry, &mut summary)?;
            visit(&record);
        }

        tracing::info!(
            root = %self.root.display(),
            visited = summary.visited,
            changed = summary.changed,
            unmapped_uids = summary.unmapped_uids,
            unmapped_gids = summary.unmapped_gids,
            mode_restore_failures = summary.mode_restore_failures,
            "Shift complete"
        );
        Ok(summary)
    }

    fn shift_entry(
        &self,
        entry: &walkdir::DirEntry,
        summary: &mut ShiftSummary,
    ) -> ShiftResult<ShiftRecord> {
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| walk_error(path, e))?;

        let (uid, gid) = self.map.translate(meta.uid(), meta.gid(), self.direction);
        if self.unmapped == UnmappedPolicy::Reject {
            if uid.is_none() {
                return Err(unmapped(path, "uid", meta.uid()));
            }
            if gid.is_none() {
                return Err(unmapped(path, "gid", meta.gid()));
            }
        }

        let record = ShiftRecord {
            path: path.to_path_buf(),
            uid,
            gid,
            is_symlink: meta.file_type().is_symlink(),
        };
        summary.record(&record);

        if self.dry_run {
            return Ok(record);
        }

        // None leaves that ID unchanged.
        lchown(path, uid, gid).map_err(|e| ShiftError::io("change ownership of", path, e))?;
        summary.changed += 1;
        tracing::debug!(
            path = %path.display(),
            from_uid = meta.uid(),
            from_gid = meta.gid(),
            ?uid,
            ?gid,
            "Shifted"
        );

        if !record.is_symlink {
            if let Err(e) = restore_mode(path, meta.mode()) {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Error resetting mode, continuing"
                );
                summary.mode_restore_failures += 1;
            }
        }

        Ok(record)
    }
}

fn restore_mode(path: &Path, mode: u32) -> io::Result<()> {
    chmodat(CWD, path, Mode::from_raw_mode(mode & 0o7777), AtFlags::empty())?;
    Ok(())
}

fn unmapped(path: &Path, kind: &'static str, id: u32) -> ShiftError {
    ShiftError::Unmapped {
        path: path.to_path_buf(),
        kind,
        id,
    }
}

fn walk_error(fallback: &Path, err: walkdir::Error) -> ShiftError {
    let path = err.path().unwrap_or(fallback).to_path_buf();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other("filesystem loop"));
    ShiftError::io("read ownership of", path, source)
}

impl IdMapSet {
    /// Shift `root` from namespace IDs to host IDs.
    pub fn shift_tree_into(
        &self,
        root: impl Into<PathBuf>,
        dry_run: bool,
    ) -> ShiftResult<ShiftSummary> {
        TreeShifter::new(self, root, Direction::IntoNamespace)
            .with_dry_run(dry_run)
            .run()
    }

    /// Shift `root` from host IDs back to namespace IDs.
    pub fn shift_tree_from(
        &self,
        root: impl Into<PathBuf>,
        dry_run: bool,
    ) -> ShiftResult<ShiftSummary> {
        TreeShifter::new(self, root, Direction::FromNamespace)
            .with_dry_run(dry_run)
            .run()
    }
}
