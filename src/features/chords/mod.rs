//! Chord recognition modules
//!
//! Classify chroma frames as major/minor triads:
//! - 24 binary templates (rotated C major / C minor masks)
//! - Per-frame template matching

pub mod matcher;
pub mod templates;

pub use matcher::{best_template, match_frames, match_frames_gated};
pub use templates::{ChordTemplate, ChordTemplates};
