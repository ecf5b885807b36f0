//! Temporal chroma smoothing
//!
//! Two filters operate along the time axis:
//! - Hann-window convolution (the CENS statistics window)
//! - Nearest-neighbour median filtering in chroma space
//!
//! The nearest-neighbour filter replaces each frame with the per-pitch-class
//! median of the `k` frames closest to it under Euclidean distance, ignoring
//! frames within `width` of it in time. Repeated harmonic content elsewhere in
//! the track reinforces each frame, while blends that only occur during
//! transitions have no close neighbours and are pulled back to a real chord.

use rayon::prelude::*;

use super::{ChromaFrame, N_CHROMA};
use crate::error::{ChordError, Result};
use crate::features::hpss::median_in_place;

/// Smooth chroma vectors over time with a normalized Hann window
///
/// The window has `window_size` non-zero taps centered on each frame; frames
/// outside the signal count as zero.
///
/// # Arguments
///
/// * `chroma_vectors` - Chroma frames
/// * `window_size` - Smoothing window size in frames (0 or 1 disables)
///
/// # Returns
///
/// Smoothed chroma vectors
pub fn smooth_hann(chroma_vectors: &[ChromaFrame], window_size: usize) -> Vec<ChromaFrame> {
    log::debug!(
        "Smoothing {} chroma vectors with window size {}",
        chroma_vectors.len(),
        window_size
    );

    if window_size <= 1 || chroma_vectors.is_empty() {
        return chroma_vectors.to_vec();
    }

    // Symmetric Hann of length window_size + 2 without its zero endpoints
    let span = (window_size + 1) as f32;
    let mut taps: Vec<f32> = (1..=window_size)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / span).cos())
        .collect();
    let total: f32 = taps.iter().sum();
    for w in taps.iter_mut() {
        *w /= total;
    }

    let n = chroma_vectors.len() as isize;
    let center = ((window_size + 2) / 2) as isize - 1;

    (0..n)
        .map(|t| {
            let mut out = [0.0f32; N_CHROMA];
            for (i, &w) in taps.iter().enumerate() {
                let src = t + i as isize - center;
                if src < 0 || src >= n {
                    continue;
                }
                for (o, &v) in out.iter_mut().zip(&chroma_vectors[src as usize]) {
                    *o += w * v;
                }
            }
            out
        })
        .collect()
}

fn squared_distance(a: &ChromaFrame, b: &ChromaFrame) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Default neighbour count for a sequence of `n_frames`: `2 * ceil(sqrt(n - 2w + 1))`
pub fn default_neighbor_count(n_frames: usize, width: usize) -> usize {
    let span = (n_frames + 1).saturating_sub(2 * width);
    2 * (span as f64).sqrt().ceil() as usize
}

/// Nearest-neighbour median filter
///
/// # Arguments
///
/// * `chroma_vectors` - Chroma frames (typically L2-normalized)
/// * `width` - Frames closer than this in time are never neighbours (e.g., 21)
///
/// # Returns
///
/// Filtered chroma vectors, same length as the input
///
/// # Errors
///
/// Returns `ChordError::Analysis` if `width` is zero or the sequence is too
/// short to leave any candidates outside the exclusion band
/// (`width >= (n_frames - 1) / 2`).
pub fn nn_filter(chroma_vectors: &[ChromaFrame], width: usize) -> Result<Vec<ChromaFrame>> {
    let n = chroma_vectors.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    if width < 1 || width >= n.saturating_sub(1) / 2 {
        return Err(ChordError::Analysis(format!(
            "Nearest-neighbour width {} needs at least {} frames, got {}",
            width,
            2 * width + 3,
            n
        )));
    }

    let k = default_neighbor_count(n, width);
    log::debug!(
        "Nearest-neighbour filter: {} frames, width={}, k={}",
        n,
        width,
        k
    );

    Ok((0..n)
        .into_par_iter()
        .map(|i| {
            let mut candidates: Vec<(f32, usize)> = (0..n)
                .filter(|&j| i.abs_diff(j) >= width)
                .map(|j| (squared_distance(&chroma_vectors[i], &chroma_vectors[j]), j))
                .collect();

            if candidates.is_empty() {
                return chroma_vectors[i];
            }

            let order = |a: &(f32, usize), b: &(f32, usize)| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1));
            if candidates.len() > k {
                candidates.select_nth_unstable_by(k - 1, order);
                candidates.truncate(k);
            }

            let mut out = [0.0f32; N_CHROMA];
            let mut column = vec![0.0f32; candidates.len()];
            for (pc, o) in out.iter_mut().enumerate() {
                for (slot, &(_, j)) in column.iter_mut().zip(&candidates) {
                    *slot = chroma_vectors[j][pc];
                }
                *o = median_in_place(&mut column);
            }
            out
        })
        .collect())
}
