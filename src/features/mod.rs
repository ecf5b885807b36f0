//! Feature extraction modules
//!
//! This module contains the signal-processing stages of the chord pipeline:
//! - STFT / inverse STFT
//! - Harmonic-percussive separation
//! - Chroma (CENS) extraction and smoothing
//! - Chord template matching

pub mod chords;
pub mod chroma;
pub mod hpss;
pub mod stft;
