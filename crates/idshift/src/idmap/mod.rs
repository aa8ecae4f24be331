//! User namespace UID/GID range mapping.
//!
//! Ranges are written `<kind>:<namespace-start>:<host-start>:<length>`,
//! where kind is `u` (uids), `g` (gids) or `b` (both). For example
//! `b:0:100000:65536` maps namespace IDs 0..65535 to host IDs
//! 100000..165535.

mod entry;
mod set;
pub mod subid;

pub use entry::{IdKind, IdMapEntry};
pub use set::{Direction, IdMapSet};
