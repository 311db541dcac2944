//! Widget timeline construction.
//!
//! This module contains the pure rendering-side logic:
//! - `timeline`: future display frames and the host refresh policy

pub mod timeline;

pub use timeline::{build_timeline, RefreshPolicy, Timeline, TimelineEntry, TIMELINE_STEP_SECONDS};
