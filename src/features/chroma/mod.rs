//! Chroma extraction modules
//!
//! Extract pitch-class distribution (12 semitones) from audio:
//! - Chroma vector computation and CENS features
//! - Normalization strategies
//! - Temporal smoothing

pub mod extractor;
pub mod normalization;
pub mod smoothing;

pub use extractor::{chroma_cens, extract_chroma, ChromaConfig, ChromaFeatures};
pub use normalization::l2_normalize_frames;
pub use smoothing::nn_filter;

/// Number of pitch classes
pub const N_CHROMA: usize = 12;

/// One chroma vector, indexed by pitch class (C = 0 ... B = 11)
pub type ChromaFrame = [f32; N_CHROMA];
