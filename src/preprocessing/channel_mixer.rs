//! Channel and stem mixing utilities

use crate::error::{ChordError, Result};

/// Gains for combining the root and harmony stems
#[derive(Debug, Clone, Copy)]
pub struct StemMix {
    /// Root (bass) stem gain (default: 1.0)
    pub root_gain: f32,
    /// Harmony (other) stem gain (default: 0.7)
    pub harmony_gain: f32,
}

impl Default for StemMix {
    fn default() -> Self {
        Self {
            root_gain: 1.0,
            harmony_gain: 0.7,
        }
    }
}

/// Average interleaved frames down to mono
///
/// # Arguments
///
/// * `interleaved` - Interleaved samples (`L R L R ...` for stereo)
/// * `channels` - Channel count (1 returns a copy)
pub fn downmix_interleaved(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Mix root and harmony stems into one mono signal
///
/// Computes `root_gain * root + harmony_gain * harmony` sample by sample.
/// The root stem carries the chord root and is weighted higher so upper
/// structure tones from the harmony stem cannot override it.
///
/// # Errors
///
/// Returns `ChordError::InvalidInput` if the stems differ in length.
pub fn mix_stems(root: &[f32], harmony: &[f32], mix: StemMix) -> Result<Vec<f32>> {
    if root.len() != harmony.len() {
        return Err(ChordError::InvalidInput(format!(
            "Stem length mismatch: root={}, harmony={}",
            root.len(),
            harmony.len()
        )));
    }

    log::debug!(
        "Mixing {} samples (root gain {:.2}, harmony gain {:.2})",
        root.len(),
        mix.root_gain,
        mix.harmony_gain
    );

    Ok(root
        .iter()
        .zip(harmony)
        .map(|(&r, &h)| mix.root_gain * r + mix.harmony_gain * h)
        .collect())
}
