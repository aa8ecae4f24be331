//! # idshift-common
//!
//! Shared types for the idshift crates:
//! - The [`ShiftError`] diagnostic enum and [`ShiftResult`] alias
//! - Well-known paths (config file, `/etc/subuid`, `/etc/subgid`)

#![warn(missing_docs)]

pub mod error;
pub mod paths;

pub use error::{ShiftError, ShiftResult};
