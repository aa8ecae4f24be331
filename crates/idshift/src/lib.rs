//! # idshift
//!
//! Shift the ownership of a directory tree between the IDs a user
//! namespace sees and the host IDs backing them.
//!
//! ## Usage
//!
//! ```no_run
//! use idshift::idmap::IdMapSet;
//!
//! # fn example() -> idshift_common::ShiftResult<()> {
//! let mut map = IdMapSet::new();
//! map.append("b:0:100000:65536")?;
//!
//! // uid/gid 0 inside the namespace is 100000 on the host.
//! assert_eq!(map.shift_into_ns(0, 0), (Some(100_000), Some(100_000)));
//!
//! // Rewrite a rootfs for the namespace, then undo it.
//! map.shift_tree_into("/srv/rootfs", false)?;
//! map.shift_tree_from("/srv/rootfs", false)?;
//! # Ok(())
//! # }
//! ```
//!
//! Runs are synchronous and stop at the first ownership read or change
//! that fails; nothing is rolled back.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod idmap;
pub mod shift;

pub use config::ShiftConfig;
pub use idmap::{Direction, IdKind, IdMapEntry, IdMapSet};
pub use shift::{ShiftRecord, ShiftSummary, TreeShifter, UnmappedPolicy};
