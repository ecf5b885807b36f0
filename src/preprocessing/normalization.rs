//! Stem level normalization
//!
//! RMS-based normalization with a silence floor: a stem whose RMS falls
//! below the floor is passed through untouched so that noise is never
//! amplified into dominance in the mix.
//!
//! # Example
//!
//! ```
//! use stratum_chords::preprocessing::normalization::{normalize_stem, StemNormalization};
//!
//! let mut samples = vec![0.5f32; 44100];
//! let level = normalize_stem(&mut samples, &StemNormalization::default());
//! assert!(level.gain > 0.0);
//! ```

use crate::config::ChordConfig;

/// Stem normalization parameters
#[derive(Debug, Clone, Copy)]
pub struct StemNormalization {
    /// RMS below which the stem is left unchanged (default: 0.005)
    pub rms_floor: f32,
    /// RMS the stem is scaled to (default: 0.1)
    pub target_rms: f32,
    /// Added to the measured RMS before dividing (default: 1e-6)
    pub epsilon: f32,
}

impl Default for StemNormalization {
    fn default() -> Self {
        Self {
            rms_floor: 0.005,
            target_rms: 0.1,
            epsilon: 1e-6,
        }
    }
}

impl From<&ChordConfig> for StemNormalization {
    fn from(config: &ChordConfig) -> Self {
        Self {
            rms_floor: config.rms_floor,
            target_rms: config.target_rms,
            epsilon: config.rms_epsilon,
        }
    }
}

/// Level information returned from normalization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StemLevel {
    /// Measured RMS before normalization
    pub rms: f32,
    /// Linear gain applied (1.0 when the stem was below the floor)
    pub gain: f32,
    /// True if the stem was treated as silence
    pub below_floor: bool,
}

/// Root-mean-square of a signal (0.0 for an empty slice)
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&x| (x as f64) * (x as f64)).sum();
    (sum_sq / samples.len() as f64).sqrt() as f32
}

/// Normalize a stem in place to the target RMS
///
/// # Arguments
///
/// * `samples` - Stem samples (modified in place)
/// * `params` - Floor, target and epsilon
///
/// # Returns
///
/// Measured RMS and the gain that was applied
pub fn normalize_stem(samples: &mut [f32], params: &StemNormalization) -> StemLevel {
    let measured = rms(samples);

    if measured < params.rms_floor {
        log::debug!(
            "Stem RMS {:.6} below floor {:.6}, leaving unchanged",
            measured,
            params.rms_floor
        );
        return StemLevel {
            rms: measured,
            gain: 1.0,
            below_floor: true,
        };
    }

    let gain = params.target_rms / (measured + params.epsilon);
    for x in samples.iter_mut() {
        *x *= gain;
    }

    log::debug!("Normalized stem: rms={:.6}, gain={:.3}", measured, gain);

    StemLevel {
        rms: measured,
        gain,
        below_floor: false,
    }
}
