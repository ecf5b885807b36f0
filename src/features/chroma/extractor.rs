//! Chroma vector extraction
//!
//! Folds an STFT magnitude spectrogram into 12 pitch classes and derives
//! CENS (chroma energy normalized statistics) features from it.
//!
//! # Reference
//!
//! Müller, M., Kurth, F., & Clausen, M. (2005). Audio Matching via Chroma-Based
//! Statistical Features. *Proceedings of ISMIR*.

use super::normalization::{l1_normalize, l2_normalize, quantize_cens};
use super::smoothing::smooth_hann;
use super::{ChromaFrame, N_CHROMA};
use crate::error::{ChordError, Result};
use crate::features::stft::stft;

/// Chroma extraction parameters
#[derive(Debug, Clone, Copy)]
pub struct ChromaConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// FFT frame size (default: 8192)
    pub frame_size: usize,
    /// Hop size (default: 512)
    pub hop_size: usize,
    /// Lowest frequency mapped to a pitch class (default: C1)
    pub min_frequency: f32,
    /// Octaves above `min_frequency` (default: 7)
    pub octaves: usize,
    /// CENS Hann smoothing length in frames (default: 41, 0 disables)
    pub smoothing_window: usize,
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            frame_size: 8192,
            hop_size: 512,
            min_frequency: 32.703_197,
            octaves: 7,
            smoothing_window: 41,
        }
    }
}

/// Chroma features with per-frame raw energy
#[derive(Debug, Clone)]
pub struct ChromaFeatures {
    /// CENS chroma, one L2-normalized vector per frame
    pub frames: Vec<ChromaFrame>,
    /// Sum of raw (pre-normalization) chroma magnitudes per frame
    pub energy: Vec<f32>,
}

/// Pitch class (C = 0) of a frequency in Hz, A4 = 440 Hz
pub fn pitch_class(frequency: f32) -> usize {
    let midi = 69.0 + 12.0 * (frequency / 440.0).log2();
    (midi.round() as i64).rem_euclid(N_CHROMA as i64) as usize
}

/// Map every FFT bin to a pitch class, `None` outside the analysed range
fn bin_pitch_classes(config: &ChromaConfig) -> Vec<Option<usize>> {
    let n_bins = config.frame_size / 2 + 1;
    let bin_hz = config.sample_rate as f32 / config.frame_size as f32;
    let max_frequency = config.min_frequency * 2f32.powi(config.octaves as i32);

    (0..n_bins)
        .map(|bin| {
            let frequency = bin as f32 * bin_hz;
            if bin == 0 || frequency < config.min_frequency || frequency >= max_frequency {
                None
            } else {
                Some(pitch_class(frequency))
            }
        })
        .collect()
}

/// Extract raw chroma vectors from audio samples
///
/// # Arguments
///
/// * `samples` - Audio samples
/// * `config` - Frame, hop and frequency range
///
/// # Returns
///
/// Vector of 12-element chroma vectors (one per frame, magnitude sums)
pub fn extract_chroma(samples: &[f32], config: &ChromaConfig) -> Result<Vec<ChromaFrame>> {
    if config.sample_rate == 0 {
        return Err(ChordError::InvalidInput("Sample rate must be > 0".to_string()));
    }

    log::debug!(
        "Extracting chroma: {} samples at {} Hz, frame_size={}, hop_size={}",
        samples.len(),
        config.sample_rate,
        config.frame_size,
        config.hop_size
    );

    let spec = stft(samples, config.frame_size, config.hop_size)?;
    let mapping = bin_pitch_classes(config);

    Ok(spec
        .frames
        .iter()
        .map(|frame| {
            let mut chroma = [0.0f32; N_CHROMA];
            for (bin, pc) in frame.iter().zip(&mapping) {
                if let Some(pc) = pc {
                    chroma[*pc] += bin.norm();
                }
            }
            chroma
        })
        .collect())
}

/// Compute CENS chroma features
///
/// 1. Raw chroma (see [`extract_chroma`])
/// 2. L1-normalize each frame
/// 3. Quantize with thresholds 0.4, 0.2, 0.1, 0.05
/// 4. Hann smoothing over `smoothing_window` frames
/// 5. L2-normalize each frame
///
/// # Errors
///
/// Returns `ChordError::Analysis` if any chroma value is not finite.
pub fn chroma_cens(samples: &[f32], config: &ChromaConfig) -> Result<ChromaFeatures> {
    let mut frames = extract_chroma(samples, config)?;

    if let Some(t) = frames.iter().position(|f| f.iter().any(|v| !v.is_finite())) {
        return Err(ChordError::Analysis(format!(
            "Non-finite chroma value at frame {}",
            t
        )));
    }

    let energy: Vec<f32> = frames.iter().map(|f| f.iter().sum()).collect();

    for frame in frames.iter_mut() {
        l1_normalize(frame);
        quantize_cens(frame);
    }

    let mut frames = smooth_hann(&frames, config.smoothing_window);
    for frame in frames.iter_mut() {
        l2_normalize(frame);
    }

    log::debug!("Computed {} CENS frames", frames.len());

    Ok(ChromaFeatures { frames, energy })
}
