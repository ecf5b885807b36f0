//! Stem preprocessing modules
//!
//! Prepares decoded stems for analysis:
//! - RMS normalization with a silence floor
//! - Channel downmixing and weighted stem mixing

pub mod channel_mixer;
pub mod normalization;

pub use channel_mixer::{mix_stems, StemMix};
pub use normalization::{normalize_stem, StemLevel, StemNormalization};
