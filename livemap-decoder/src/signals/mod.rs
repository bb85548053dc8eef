//! Signal state and tag classification
//!
//! This module contains the closed set of tag roles and the state the
//! engine derives from them.

pub mod snapshot;
pub mod tags;

// Re-export key types for convenience
pub use snapshot::{DebounceCounters, SignalSnapshot};
pub use tags::KnownTag;
