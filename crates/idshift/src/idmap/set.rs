//! Ordered, conflict-free collection of ID ranges.

use std::path::Path;

use idshift_common::{ShiftError, ShiftResult};

use super::entry::IdMapEntry;
use super::subid;

/// Which way a shift translates IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Namespace IDs become the host IDs backing them (`0 -> 100000`).
    IntoNamespace,
    /// Host IDs become namespace IDs again (`100000 -> 0`).
    FromNamespace,
}

impl Direction {
    /// The opposite direction.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::IntoNamespace => Self::FromNamespace,
            Self::FromNamespace => Self::IntoNamespace,
        }
    }

    fn apply(self, entry: &IdMapEntry, id: u32) -> Option<u32> {
        match self {
            Self::IntoNamespace => entry.to_host(id),
            Self::FromNamespace => entry.to_namespace(id),
        }
    }
}

/// An ordered set of [`IdMapEntry`] values.
///
/// Insertion order is translation priority: the first entry that covers
/// an ID kind and yields a result wins. No two entries sharing an ID kind
/// may overlap on either the host or the namespace side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMapSet {
    entries: Vec<IdMapEntry>,
}

impl IdMapSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `spec` and append it.
    ///
    /// Fails without modifying the set if the text is malformed or the new
    /// range conflicts with an existing one.
    pub fn append(&mut self, spec: &str) -> ShiftResult<()> {
        let entry = IdMapEntry::parse(spec)?;
        self.push(entry)
    }

    /// Append an already-built entry, rejecting conflicts.
    pub fn push(&mut self, entry: IdMapEntry) -> ShiftResult<()> {
        if let Some(existing) = self.conflicting(&entry) {
            return Err(ShiftError::Conflict {
                spec: entry.to_string(),
                existing: existing.to_string(),
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Append the subordinate ranges of `user` from subuid/subgid files.
    ///
    /// Both ranges start at namespace ID 0. Missing files are treated as
    /// empty; a user with neither range is an error.
    pub fn append_subid(&mut self, user: &str, subuid: &Path, subgid: &Path) -> ShiftResult<()> {
        let uids = subid::read_subid(subuid, user)?;
        let gids = subid::read_subid(subgid, user)?;

        if uids.is_none() && gids.is_none() {
            return Err(ShiftError::SubIdNotFound {
                user: user.to_string(),
                path: subuid.to_path_buf(),
            });
        }

        // Validate both before touching the set.
        let mut staged = self.clone();
        if let Some(range) = uids {
            staged.append(&format!("u:0:{}:{}", range.start, range.count))?;
        }
        if let Some(range) = gids {
            staged.append(&format!("g:0:{}:{}", range.start, range.count))?;
        }
        *self = staged;
        Ok(())
    }

    /// The first existing entry that conflicts with `entry`.
    #[must_use]
    pub fn conflicting(&self, entry: &IdMapEntry) -> Option<&IdMapEntry> {
        self.entries.iter().find(|e| e.intersects(entry))
    }

    /// Whether `entry` conflicts with any existing entry.
    #[must_use]
    pub fn intersects(&self, entry: &IdMapEntry) -> bool {
        self.conflicting(entry).is_some()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &IdMapEntry> {
        self.entries.iter()
    }

    /// Entries in priority order, as a slice.
    #[must_use]
    pub fn entries(&self) -> &[IdMapEntry] {
        &self.entries
    }

    /// Translate a uid/gid pair.
    ///
    /// Each ID is translated on its own by the first entry covering its
    /// kind that yields a result. `None` means no entry covered it.
    #[must_use]
    pub fn translate(
        &self,
        uid: u32,
        gid: u32,
        direction: Direction,
    ) -> (Option<u32>, Option<u32>) {
        let uid = self
            .entries
            .iter()
            .filter(|e| e.kind().applies_to_user())
            .find_map(|e| direction.apply(e, uid));
        let gid = self
            .entries
            .iter()
            .filter(|e| e.kind().applies_to_group())
            .find_map(|e| direction.apply(e, gid));
        (uid, gid)
    }

    /// Translate namespace IDs to host IDs.
    #[must_use]
    pub fn shift_into_ns(&self, uid: u32, gid: u32) -> (Option<u32>, Option<u32>) {
        self.translate(uid, gid, Direction::IntoNamespace)
    }

    /// Translate host IDs back to namespace IDs.
    #[must_use]
    pub fn shift_from_ns(&self, uid: u32, gid: u32) -> (Option<u32>, Option<u32>) {
        self.translate(uid, gid, Direction::FromNamespace)
    }

    /// Entries covering user IDs, in `/proc/<pid>/uid_map` format.
    #[must_use]
    pub fn uid_map(&self) -> String {
        self.proc_map(|e| e.kind().applies_to_user())
    }

    /// Entries covering group IDs, in `/proc/<pid>/gid_map` format.
    #[must_use]
    pub fn gid_map(&self) -> String {
        self.proc_map(|e| e.kind().applies_to_group())
    }

    fn proc_map(&self, keep: impl Fn(&IdMapEntry) -> bool) -> String {
        self.entries
            .iter()
            .filter(|e| keep(e))
            .map(IdMapEntry::to_proc_format)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<'a> IntoIterator for &'a IdMapSet {
    type Item = &'a IdMapEntry;
    type IntoIter = std::slice::Iter<'a, IdMapEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
