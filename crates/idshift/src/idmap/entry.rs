//! A single contiguous ID range.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use idshift_common::{ShiftError, ShiftResult};

/// Which ID kinds an entry governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// `u`: user IDs only.
    User,
    /// `g`: group IDs only.
    Group,
    /// `b`: both, identically.
    Both,
}

impl IdKind {
    /// Whether this kind covers user IDs.
    #[must_use]
    pub const fn applies_to_user(self) -> bool {
        matches!(self, Self::User | Self::Both)
    }

    /// Whether this kind covers group IDs.
    #[must_use]
    pub const fn applies_to_group(self) -> bool {
        matches!(self, Self::Group | Self::Both)
    }

    /// Whether two kinds share at least one ID kind.
    #[must_use]
    pub const fn overlaps(self, other: Self) -> bool {
        (self.applies_to_user() && other.applies_to_user())
            || (self.applies_to_group() && other.applies_to_group())
    }

    const fn tag(self) -> char {
        match self {
            Self::User => 'u',
            Self::Group => 'g',
            Self::Both => 'b',
        }
    }
}

/// One mapping between a namespace ID interval and a host ID interval.
///
/// Both intervals are half-open and have the same length. The ends are
/// guaranteed not to overflow `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdMapEntry {
    kind: IdKind,
    namespace_start: u32,
    host_start: u32,
    length: u32,
}

impl IdMapEntry {
    /// Create an entry, checking length and wraparound.
    pub fn new(
        kind: IdKind,
        namespace_start: u32,
        host_start: u32,
        length: u32,
    ) -> ShiftResult<Self> {
        let entry = Self {
            kind,
            namespace_start,
            host_start,
            length,
        };
        entry.validate().map_err(|reason| ShiftError::Parse {
            spec: entry.to_string(),
            reason: reason.to_string(),
        })?;
        Ok(entry)
    }

    /// Parse `<kind>:<namespace-start>:<host-start>:<length>`.
    pub fn parse(spec: &str) -> ShiftResult<Self> {
        let bad = |reason: String| ShiftError::Parse {
            spec: spec.to_string(),
            reason,
        };

        let fields: Vec<&str> = spec.split(':').collect();
        let [kind, ns, host, len] = fields.as_slice() else {
            return Err(bad(format!("expected 4 fields, got {}", fields.len())));
        };

        let kind = match *kind {
            "u" => IdKind::User,
            "g" => IdKind::Group,
            "b" => IdKind::Both,
            other => return Err(bad(format!("unknown id kind {other:?}"))),
        };

        let number = |name: &str, field: &str| {
            field
                .parse::<u32>()
                .map_err(|e| bad(format!("invalid {name} {field:?}: {e}")))
        };

        let entry = Self {
            kind,
            namespace_start: number("namespace start", *ns)?,
            host_start: number("host start", *host)?,
            length: number("length", *len)?,
        };
        entry.validate().map_err(|reason| bad(reason.to_string()))?;
        Ok(entry)
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.length == 0 {
            return Err("length must be positive");
        }
        if self.host_start.checked_add(self.length).is_none()
            || self.namespace_start.checked_add(self.length).is_none()
        {
            return Err("id wraparound");
        }
        Ok(())
    }

    /// ID kinds governed by this entry.
    #[must_use]
    pub const fn kind(&self) -> IdKind {
        self.kind
    }

    /// First namespace ID.
    #[must_use]
    pub const fn namespace_start(&self) -> u32 {
        self.namespace_start
    }

    /// First host ID.
    #[must_use]
    pub const fn host_start(&self) -> u32 {
        self.host_start
    }

    /// Number of IDs covered.
    #[must_use]
    pub const fn length(&self) -> u32 {
        self.length
    }

    /// Namespace-side interval.
    #[must_use]
    pub const fn namespace_range(&self) -> Range<u32> {
        self.namespace_start..self.namespace_start + self.length
    }

    /// Host-side interval.
    #[must_use]
    pub const fn host_range(&self) -> Range<u32> {
        self.host_start..self.host_start + self.length
    }

    /// Map a namespace ID to the host ID backing it.
    ///
    /// Returns `None` when `id` is outside the namespace interval.
    #[must_use]
    pub fn to_host(&self, id: u32) -> Option<u32> {
        self.namespace_range()
            .contains(&id)
            .then(|| id - self.namespace_start + self.host_start)
    }

    /// Map a host ID back to its namespace ID.
    ///
    /// Returns `None` when `id` is outside the host interval.
    #[must_use]
    pub fn to_namespace(&self, id: u32) -> Option<u32> {
        self.host_range()
            .contains(&id)
            .then(|| id - self.host_start + self.namespace_start)
    }

    /// Whether two entries would make translation ambiguous.
    ///
    /// Entries that share no ID kind never conflict. Otherwise they
    /// conflict when either their host or their namespace intervals
    /// overlap; adjacent intervals do not.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        if !self.kind.overlaps(other.kind) {
            return false;
        }
        overlap(&self.host_range(), &other.host_range())
            || overlap(&self.namespace_range(), &other.namespace_range())
    }

    /// Line for `/proc/<pid>/uid_map` or `gid_map`.
    #[must_use]
    pub fn to_proc_format(&self) -> String {
        format!("{} {} {}", self.namespace_start, self.host_start, self.length)
    }
}

const fn overlap(a: &Range<u32>, b: &Range<u32>) -> bool {
    a.start < b.end && b.start < a.end
}

impl fmt::Display for IdMapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.kind.tag(),
            self.namespace_start,
            self.host_start,
            self.length
        )
    }
}

impl FromStr for IdMapEntry {
    type Err = ShiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
