//! State module for tracking visitation progress
//!
//! This module provides the data model of the frontier.
//!
//! # Components
//!
//! - `FrontierEntry`: one discovered URL with its hops and resolution
//! - `Resolution`: the `Pending -> Resolved` state of an entry
//! - `HopRecord`: one observed response in a redirect chain

mod entry;

// Re-export main types
pub use entry::{FrontierEntry, HopRecord, Outcome, Resolution, MAX_HOPS};
