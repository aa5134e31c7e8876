//! Output module for reporting frontier state
//!
//! This module handles:
//! - Loading counts of pending and resolved entries
//! - Breaking resolved entries down by outcome
//! - Printing a summary for operators

pub mod stats;

pub use stats::{load_statistics, print_statistics, FrontierStatistics};
