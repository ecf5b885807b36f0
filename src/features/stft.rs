//! Short-time Fourier transform
//!
//! Centered STFT with a periodic Hann window and reflect padding, and the
//! matching overlap-add inverse. Frame `t` is centered on sample
//! `t * hop_size`, so a signal of `n` samples yields `1 + n / hop_size`
//! frames.

use std::sync::Arc;

use rayon::prelude::*;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::error::{ChordError, Result};

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Complex spectrogram, frame-major
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// One vector of `frame_size / 2 + 1` bins per frame
    pub frames: Vec<Vec<Complex<f32>>>,
    /// FFT frame size in samples
    pub frame_size: usize,
    /// Hop size in samples
    pub hop_size: usize,
}

impl Spectrogram {
    /// Number of frames
    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of frequency bins per frame
    pub fn n_bins(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// Magnitude of every bin
    pub fn magnitudes(&self) -> Vec<Vec<f32>> {
        self.frames
            .iter()
            .map(|frame| frame.iter().map(|c| c.norm()).collect())
            .collect()
    }
}

/// Periodic Hann window
pub fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / size as f32).cos()
        })
        .collect()
}

/// Sample at a padded index, mirroring around the signal edges
///
/// Signals too short to mirror are zero-padded.
fn reflected(signal: &[f32], index: isize) -> f32 {
    let n = signal.len() as isize;
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return if index == 0 { signal[0] } else { 0.0 };
    }
    let mut i = index;
    // A few bounces cover any padding up to the frame size
    for _ in 0..4 {
        if i < 0 {
            i = -i;
        } else if i >= n {
            i = 2 * (n - 1) - i;
        } else {
            return signal[i as usize];
        }
    }
    0.0
}

/// Compute the centered STFT of a signal
///
/// # Arguments
///
/// * `signal` - Mono samples
/// * `frame_size` - FFT size (also the window length)
/// * `hop_size` - Samples between frame centers
///
/// # Errors
///
/// Returns `ChordError::InvalidInput` for a zero frame or hop size.
pub fn stft(signal: &[f32], frame_size: usize, hop_size: usize) -> Result<Spectrogram> {
    if frame_size < 2 || hop_size == 0 {
        return Err(ChordError::InvalidInput(format!(
            "Invalid STFT parameters: frame_size={}, hop_size={}",
            frame_size, hop_size
        )));
    }

    if signal.is_empty() {
        return Ok(Spectrogram {
            frames: Vec::new(),
            frame_size,
            hop_size,
        });
    }

    let n_frames = 1 + signal.len() / hop_size;
    let n_bins = frame_size / 2 + 1;
    let pad = (frame_size / 2) as isize;
    let window = hann_window(frame_size);

    log::debug!(
        "Computing STFT: {} samples, frame_size={}, hop_size={}, {} frames",
        signal.len(),
        frame_size,
        hop_size,
        n_frames
    );

    let mut planner = FftPlanner::new();
    let fft: Arc<dyn Fft<f32>> = planner.plan_fft_forward(frame_size);

    let frames = (0..n_frames)
        .into_par_iter()
        .map(|t| {
            let start = (t * hop_size) as isize - pad;
            let mut buffer: Vec<Complex<f32>> = window
                .iter()
                .enumerate()
                .map(|(i, &w)| Complex::new(reflected(signal, start + i as isize) * w, 0.0))
                .collect();
            fft.process(&mut buffer);
            buffer.truncate(n_bins);
            buffer
        })
        .collect();

    Ok(Spectrogram {
        frames,
        frame_size,
        hop_size,
    })
}

/// Invert a centered STFT by windowed overlap-add
///
/// # Arguments
///
/// * `spec` - Spectrogram produced by [`stft`] (possibly masked)
/// * `length` - Output length in samples
pub fn istft(spec: &Spectrogram, length: usize) -> Result<Vec<f32>> {
    let frame_size = spec.frame_size;
    let hop_size = spec.hop_size;
    if frame_size < 2 || hop_size == 0 {
        return Err(ChordError::InvalidInput(format!(
            "Invalid STFT parameters: frame_size={}, hop_size={}",
            frame_size, hop_size
        )));
    }
    if spec.frames.is_empty() || length == 0 {
        return Ok(vec![0.0; length]);
    }

    let n_bins = spec.n_bins();
    if let Some((i, frame)) = spec.frames.iter().enumerate().find(|(_, f)| f.len() != n_bins) {
        return Err(ChordError::InvalidInput(format!(
            "Frame {} has {} bins, expected {}",
            i,
            frame.len(),
            n_bins
        )));
    }

    let window = hann_window(frame_size);
    let mut planner = FftPlanner::new();
    let ifft: Arc<dyn Fft<f32>> = planner.plan_fft_inverse(frame_size);
    let scale = 1.0 / frame_size as f32;

    let time_frames: Vec<Vec<f32>> = spec
        .frames
        .par_iter()
        .map(|half| {
            let mut buffer = vec![Complex::new(0.0f32, 0.0); frame_size];
            buffer[..n_bins].copy_from_slice(half);
            // Hermitian mirror of the positive frequencies
            for k in n_bins..frame_size {
                buffer[k] = buffer[frame_size - k].conj();
            }
            ifft.process(&mut buffer);
            buffer
                .iter()
                .zip(&window)
                .map(|(c, &w)| c.re * scale * w)
                .collect()
        })
        .collect();

    let total = frame_size + hop_size * (time_frames.len() - 1);
    let mut output = vec![0.0f32; total];
    let mut window_sum = vec![0.0f32; total];
    for (t, frame) in time_frames.iter().enumerate() {
        let offset = t * hop_size;
        for (i, (&x, &w)) in frame.iter().zip(&window).enumerate() {
            output[offset + i] += x;
            window_sum[offset + i] += w * w;
        }
    }
    for (x, &w) in output.iter_mut().zip(&window_sum) {
        if w > EPSILON {
            *x /= w;
        }
    }

    let pad = frame_size / 2;
    let mut signal: Vec<f32> = output.into_iter().skip(pad).take(length).collect();
    signal.resize(length, 0.0);
    Ok(signal)
}
