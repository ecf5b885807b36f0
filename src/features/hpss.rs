//! Harmonic-percussive source separation (HPSS)
//!
//! Separates a signal into harmonic and percussive components by median
//! filtering its magnitude spectrogram.
//!
//! # Reference
//!
//! Fitzgerald, D. (2010). Harmonic/Percussive Separation using Median Filtering.
//! *Proceedings of the 13th International Conference on Digital Audio Effects (DAFx-10)*.
//!
//! # Algorithm
//!
//! 1. STFT of the signal, magnitude `S`
//! 2. Harmonic enhancement: median of `S` along time (per bin)
//! 3. Percussive enhancement: median of `S` along frequency (per frame)
//! 4. Soft Wiener masks `H^2 / (H^2 + P^2)` and `P^2 / (H^2 + P^2)`
//! 5. Mask the complex STFT and resynthesize

use rayon::prelude::*;

use super::stft::{istft, stft, Spectrogram};
use crate::error::{ChordError, Result};

/// Magnitudes below this are treated as zero when building masks
const TINY: f32 = f32::MIN_POSITIVE;

/// HPSS parameters
#[derive(Debug, Clone, Copy)]
pub struct HpssConfig {
    /// FFT frame size (default: 2048)
    pub frame_size: usize,
    /// Hop size (default: 512)
    pub hop_size: usize,
    /// Median filter length along time, in frames (default: 31)
    pub harmonic_kernel: usize,
    /// Median filter length along frequency, in bins (default: 31)
    pub percussive_kernel: usize,
}

impl Default for HpssConfig {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
            harmonic_kernel: 31,
            percussive_kernel: 31,
        }
    }
}

/// Median of a small scratch slice (mean of the two middle values when even)
pub(crate) fn median_in_place(values: &mut [f32]) -> f32 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    let mid = n / 2;
    let (_, upper, _) = values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
    let upper = *upper;
    if n % 2 == 1 {
        return upper;
    }
    let lower = values[..mid]
        .iter()
        .copied()
        .fold(f32::NEG_INFINITY, f32::max);
    (lower + upper) / 2.0
}

/// Sliding median with mirrored edges (`d c b a | a b c d | d c b a`)
pub fn median_filter(values: &[f32], kernel: usize) -> Vec<f32> {
    let n = values.len() as isize;
    if n == 0 || kernel <= 1 {
        return values.to_vec();
    }
    let half = (kernel / 2) as isize;
    let mut window = vec![0.0f32; kernel];

    (0..n)
        .map(|i| {
            for (slot, offset) in window.iter_mut().zip(-half..) {
                let mut j = i + offset;
                while j < 0 || j >= n {
                    j = if j < 0 { -j - 1 } else { 2 * n - j - 1 };
                }
                *slot = values[j as usize];
            }
            median_in_place(&mut window)
        })
        .collect()
}

/// Decompose a magnitude spectrogram into harmonic and percussive enhanced spectrograms
///
/// # Arguments
///
/// * `magnitude_spec` - Magnitude spectrogram, frame-major
/// * `harmonic_kernel` - Median length along time
/// * `percussive_kernel` - Median length along frequency
///
/// # Returns
///
/// Tuple of (harmonic, percussive) median-filtered spectrograms
pub fn hpss_decompose(
    magnitude_spec: &[Vec<f32>],
    harmonic_kernel: usize,
    percussive_kernel: usize,
) -> Result<(Vec<Vec<f32>>, Vec<Vec<f32>>)> {
    log::debug!(
        "Decomposing spectrogram with HPSS: {} frames, kernels=({}, {})",
        magnitude_spec.len(),
        harmonic_kernel,
        percussive_kernel
    );

    if magnitude_spec.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    let n_frames = magnitude_spec.len();
    let n_bins = magnitude_spec[0].len();
    if magnitude_spec.iter().any(|frame| frame.len() != n_bins) {
        return Err(ChordError::InvalidInput(
            "Spectrogram frames have inconsistent bin counts".to_string(),
        ));
    }

    // Percussive: filter each frame across frequency
    let percussive: Vec<Vec<f32>> = magnitude_spec
        .par_iter()
        .map(|frame| median_filter(frame, percussive_kernel))
        .collect();

    // Harmonic: filter each bin across time, then transpose back
    let harmonic_by_bin: Vec<Vec<f32>> = (0..n_bins)
        .into_par_iter()
        .map(|bin| {
            let track: Vec<f32> = magnitude_spec.iter().map(|frame| frame[bin]).collect();
            median_filter(&track, harmonic_kernel)
        })
        .collect();
    let harmonic: Vec<Vec<f32>> = (0..n_frames)
        .map(|t| harmonic_by_bin.iter().map(|bin| bin[t]).collect())
        .collect();

    Ok((harmonic, percussive))
}

/// Soft mask `x^2 / (x^2 + reference^2)`, zero where both are negligible
fn soft_mask(x: f32, reference: f32) -> f32 {
    let z = x.max(reference);
    if z < TINY {
        return 0.0;
    }
    let a = (x / z).powi(2);
    let b = (reference / z).powi(2);
    a / (a + b)
}

/// Harmonic component of a spectrogram after soft masking
pub fn harmonic_spectrogram(spec: &Spectrogram, config: &HpssConfig) -> Result<Spectrogram> {
    let magnitudes = spec.magnitudes();
    let (harmonic, percussive) =
        hpss_decompose(&magnitudes, config.harmonic_kernel, config.percussive_kernel)?;

    let frames = spec
        .frames
        .iter()
        .zip(harmonic.iter().zip(&percussive))
        .map(|(frame, (h, p))| {
            frame
                .iter()
                .zip(h.iter().zip(p))
                .map(|(&c, (&hm, &pm))| c * soft_mask(hm, pm))
                .collect()
        })
        .collect();

    Ok(Spectrogram {
        frames,
        frame_size: spec.frame_size,
        hop_size: spec.hop_size,
    })
}

/// Extract the harmonic component of a time-domain signal
///
/// Percussive transients (drum bleed, pick noise) are removed; the result has
/// the same length as the input.
///
/// # Errors
///
/// Returns `ChordError::InvalidInput` for invalid frame/hop sizes.
pub fn harmonic_component(signal: &[f32], config: &HpssConfig) -> Result<Vec<f32>> {
    if signal.is_empty() {
        return Ok(Vec::new());
    }
    let spec = stft(signal, config.frame_size, config.hop_size)?;
    let harmonic = harmonic_spectrogram(&spec, config)?;
    let output = istft(&harmonic, signal.len())?;
    log::debug!("HPSS: extracted harmonic component ({} samples)", output.len());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_filter_removes_spike() {
        let mut values = vec![1.0f32; 11];
        values[5] = 100.0;
        let filtered = median_filter(&values, 3);
        assert_eq!(filtered[5], 1.0);
        assert_eq!(filtered.len(), values.len());
    }

    #[test]
    fn test_median_filter_reflect_edges() {
        let values = vec![1.0, 2.0, 3.0, 4.0];
        // window at 0 = [1, 1, 2] -> 1
        let filtered = median_filter(&values, 3);
        assert_eq!(filtered, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_median_even_count() {
        let mut values = vec![4.0, 1.0, 3.0, 2.0];
        assert_eq!(median_in_place(&mut values), 2.5);
    }

    #[test]
    fn test_soft_mask() {
        assert_eq!(soft_mask(0.0, 0.0), 0.0);
        assert!((soft_mask(1.0, 1.0) - 0.5).abs() < 1e-6);
        assert!(soft_mask(10.0, 1.0) > 0.98);
    }

    #[test]
    fn test_tone_survives_clicks_removed() {
        let sample_rate = 44100.0;
        let len = 44100;
        let tone: Vec<f32> = (0..len)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sample_rate).sin())
            .collect();
        let mut signal = tone.clone();
        for click in (2000..len).step_by(8000) {
            signal[click] += 1.0;
        }

        let harmonic = harmonic_component(&signal, &HpssConfig::default()).unwrap();
        assert_eq!(harmonic.len(), len);

        let energy = |x: &[f32]| x.iter().map(|v| v * v).sum::<f32>();
        let ratio = energy(&harmonic) / energy(&tone);
        assert!(
            ratio > 0.8 && ratio < 1.2,
            "harmonic energy should match the tone, ratio={:.3}",
            ratio
        );
        // The click sample itself should be strongly attenuated
        let residual = (harmonic[10000] - tone[10000]).abs();
        assert!(residual < 0.5, "click should be suppressed, residual={:.3}", residual);
    }

    #[test]
    fn test_inconsistent_bins() {
        let spec = vec![vec![1.0; 4], vec![1.0; 3]];
        assert!(hpss_decompose(&spec, 3, 3).is_err());
    }
}
