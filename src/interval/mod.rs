//! Interval module
//!
//! This module provides the canonical interval map and the ordered boundary
//! backends it can run on.

pub mod segments;
pub mod store;

// Re-export key types and functions
pub use segments::{SegmentMap, SortedVecMap, INLINE_SEGMENTS};
pub use store::{IntervalStore, IntervalStoreStats};

/// Errors that can occur with interval store operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntervalError {
    /// The range is empty or its end precedes its start
    InvalidRange,
}

impl std::fmt::Display for IntervalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntervalError::InvalidRange => write!(f, "Invalid range: begin must be less than end"),
        }
    }
}

impl std::error::Error for IntervalError {}
