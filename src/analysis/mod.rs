//! Timeline construction and result types
//!
//! Turns per-frame chord labels into the final timeline:
//! - Frame-to-time conversion with latency correction
//! - Raw segment collapsing
//! - Short-segment merging
//! - Result types and JSON rendering

pub mod merge;
pub mod result;
pub mod timeline;

pub use merge::merge_segments;
pub use result::{timeline_to_json, Chord, ChordSegment};
pub use timeline::{build_raw_segments, FrameTiming, RawSegment};
