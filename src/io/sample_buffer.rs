//! Mono sample buffers and stem pair loading

use std::path::Path;

use crate::error::Result;

/// Decoded mono audio at a fixed sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Sample data
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from samples
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if the buffer holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Drop samples past `len`
    pub fn truncate(&mut self, len: usize) {
        self.samples.truncate(len);
    }
}

/// Root and harmony stems cut to a common length
#[derive(Debug, Clone)]
pub struct StemPair {
    /// Bass-register stem
    pub root: AudioBuffer,
    /// Remaining harmonic instruments
    pub harmony: AudioBuffer,
}

impl StemPair {
    /// Pair two buffers, truncating the longer one to the shorter length
    pub fn new(mut root: AudioBuffer, mut harmony: AudioBuffer) -> Self {
        let min_len = root.len().min(harmony.len());
        if root.len() != harmony.len() {
            log::debug!(
                "Truncating stems to {} samples (root={}, harmony={})",
                min_len,
                root.len(),
                harmony.len()
            );
        }
        root.truncate(min_len);
        harmony.truncate(min_len);
        Self { root, harmony }
    }

    /// Common length in samples
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// True if the stems are empty
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

/// Decode both stems at `sample_rate` and truncate them to equal length
///
/// # Errors
///
/// Returns `ChordError::StemLoad` if either stem cannot be decoded; nothing is
/// returned for the other stem in that case.
pub fn load_stem_pair(
    root_path: impl AsRef<Path>,
    harmony_path: impl AsRef<Path>,
    sample_rate: u32,
) -> Result<StemPair> {
    let root = super::decoder::decode_audio(root_path, sample_rate)?;
    let harmony = super::decoder::decode_audio(harmony_path, sample_rate)?;
    Ok(StemPair::new(root, harmony))
}
