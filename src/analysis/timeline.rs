//! Frame labels to raw chord segments
//!
//! # Algorithm
//!
//! 1. Frame time: `t = frame * hop_size / sample_rate - latency`, clamped at 0
//! 2. Start a new segment whenever the label differs from the previous frame
//! 3. Close each segment at the corrected time of the frame that changed label
//! 4. Close the last segment at the last frame's corrected time
//!
//! The latency shift compensates for the temporal smearing of the chroma
//! smoothing stages, which makes changes register late.

use super::result::Chord;

/// Timing parameters for frame-to-time conversion
#[derive(Debug, Clone, Copy)]
pub struct FrameTiming {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Hop size in samples
    pub hop_size: usize,
    /// Seconds subtracted from every frame time (default: 0.4)
    pub latency_correction: f64,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            hop_size: 512,
            latency_correction: 0.4,
        }
    }
}

impl FrameTiming {
    /// Latency-corrected time of a frame in seconds, never negative
    pub fn frame_time(&self, frame: usize) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        let raw = frame as f64 * self.hop_size as f64 / self.sample_rate as f64;
        (raw - self.latency_correction).max(0.0)
    }
}

/// Pre-merge chord interval
#[derive(Debug, Clone, PartialEq)]
pub struct RawSegment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Chord label
    pub chord: Chord,
    /// `end - start`
    pub duration: f64,
}

impl RawSegment {
    fn new(start: f64, end: f64, chord: Chord) -> Self {
        Self {
            start,
            end,
            chord,
            duration: end - start,
        }
    }
}

/// Collapse per-frame labels into raw segments
///
/// # Arguments
///
/// * `labels` - One chord per frame
/// * `timing` - Frame-to-time conversion
///
/// # Returns
///
/// Raw segments in time order; empty for empty input
pub fn build_raw_segments(labels: &[Chord], timing: &FrameTiming) -> Vec<RawSegment> {
    let mut segments = Vec::new();
    let mut current: Option<(Chord, f64)> = None;

    for (frame, &chord) in labels.iter().enumerate() {
        let time = timing.frame_time(frame);
        match current {
            Some((label, _)) if label == chord => {}
            Some((label, start)) => {
                segments.push(RawSegment::new(start, time, label));
                current = Some((chord, time));
            }
            None => current = Some((chord, time)),
        }
    }

    if let Some((label, start)) = current {
        let final_time = timing.frame_time(labels.len() - 1);
        segments.push(RawSegment::new(start, final_time, label));
    }

    log::debug!(
        "Built {} raw segments from {} frame labels",
        segments.len(),
        labels.len()
    );

    segments
}
