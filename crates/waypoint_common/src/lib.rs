//! Shared foundational types used across the Waypoint routing cache.
//!
//! This crate provides content hashing for deriving manifest locations and
//! checking artifact integrity, plus small filesystem helpers for reading
//! modification times.

#![warn(missing_docs)]

pub mod fs;
pub mod hash;

pub use fs::{is_newer_than, modified_time};
pub use hash::ContentHash;
