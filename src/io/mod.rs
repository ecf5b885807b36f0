//! Audio I/O modules
//!
//! Stem decoding using Symphonia and mono sample buffers.

pub mod decoder;
pub mod sample_buffer;

pub use decoder::decode_audio;
pub use sample_buffer::{load_stem_pair, AudioBuffer, StemPair};
