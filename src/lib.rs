//! # Stratum Chords
//!
//! Chord timeline extraction from separated stems. Takes the bass ("root")
//! and other ("harmony") stems of one recording and produces a sequence of
//! major/minor chord segments suitable for display alongside playback.
//!
//! ## Features
//!
//! - **Stem Loading**: Any symphonia-supported container, downmixed and resampled to 44.1 kHz
//! - **Stem Mixing**: RMS-normalized weighted mix that keeps the bass root dominant
//! - **Harmonic Isolation**: Median-filter HPSS removes percussive transients
//! - **CENS Chroma**: Quantized, smoothed pitch-class profiles with a Euclidean nearest-neighbour filter
//! - **Template Matching**: 24 major/minor triad templates, per-frame argmax
//! - **Timeline**: Latency-corrected segments with short-segment merging
//! - **Separation**: Optional Demucs subprocess adapter for full-track input
//!
//! ## Quick Start
//!
//! ```no_run
//! use stratum_chords::{extract_chords, ChordConfig};
//!
//! let chords = extract_chords("stems/bass.wav", "stems/other.wav", &ChordConfig::default())?;
//!
//! for segment in &chords {
//!     println!("{:>8.3} - {:>8.3}  {}", segment.time, segment.end, segment.chord);
//! }
//! # Ok::<(), stratum_chords::ChordError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Stems → Normalize + Mix → HPSS → CENS Chroma → NN Filter → Templates → Segments → Merge
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;
pub mod separation;

use std::path::Path;
use std::time::Instant;

use serde::Serialize;

// Re-export main types
pub use analysis::result::{timeline_to_json, Chord, ChordSegment};
pub use config::ChordConfig;
pub use error::{ChordError, Result};
pub use io::{AudioBuffer, StemPair};
pub use separation::{DemucsSeparator, Stem, StemPaths, StemSeparator};

use analysis::merge::merge_segments;
use analysis::timeline::{build_raw_segments, FrameTiming};
use features::chords::{match_frames, match_frames_gated, ChordTemplates};
use features::chroma::{chroma_cens, l2_normalize_frames, nn_filter, ChromaConfig};
use features::hpss::{harmonic_component, HpssConfig};
use io::decoder::resample;
use preprocessing::{mix_stems, normalize_stem, StemMix, StemNormalization};

/// Extract the chord timeline from a root (bass) and harmony (other) stem file
///
/// Both files are decoded, downmixed to mono and resampled to
/// `config.sample_rate`, then truncated to the shorter length.
///
/// # Errors
///
/// - `ChordError::StemLoad` if either stem is missing or undecodable
/// - `ChordError::InvalidInput` if `config` fails validation
/// - `ChordError::Analysis` if feature extraction fails
///
/// Use [`analyze_stems`] for the best-effort variant that downgrades analysis
/// failures to an empty timeline.
pub fn extract_chords(
    root_path: impl AsRef<Path>,
    harmony_path: impl AsRef<Path>,
    config: &ChordConfig,
) -> Result<Vec<ChordSegment>> {
    config.validate()?;
    let pair = io::load_stem_pair(root_path, harmony_path, config.sample_rate)?;
    extract_chords_from_buffers(pair.root, pair.harmony, config)
}

/// Extract the chord timeline from already-decoded mono stems
///
/// Buffers at a rate other than `config.sample_rate` are resampled first.
/// Empty stems produce an empty timeline.
///
/// # Example
///
/// ```no_run
/// use stratum_chords::{extract_chords_from_buffers, AudioBuffer, ChordConfig};
///
/// let root = AudioBuffer::new(vec![0.0f32; 44100 * 10], 44100);
/// let harmony = AudioBuffer::new(vec![0.0f32; 44100 * 10], 44100);
/// let chords = extract_chords_from_buffers(root, harmony, &ChordConfig::default())?;
/// assert_eq!(chords.len(), 1); // silence still gets one label
/// # Ok::<(), stratum_chords::ChordError>(())
/// ```
pub fn extract_chords_from_buffers(
    root: AudioBuffer,
    harmony: AudioBuffer,
    config: &ChordConfig,
) -> Result<Vec<ChordSegment>> {
    let start_time = Instant::now();
    config.validate()?;

    let root = conform_rate(root, config.sample_rate)?;
    let harmony = conform_rate(harmony, config.sample_rate)?;
    let StemPair {
        mut root,
        mut harmony,
    } = StemPair::new(root, harmony);

    if root.is_empty() {
        log::warn!("Empty stems, returning empty chord timeline");
        return Ok(Vec::new());
    }

    log::debug!(
        "Extracting chords: {} samples ({:.2}s) at {} Hz",
        root.len(),
        root.duration_seconds(),
        config.sample_rate
    );

    // Normalize and mix
    let normalization = StemNormalization::from(config);
    let root_level = normalize_stem(&mut root.samples, &normalization);
    let harmony_level = normalize_stem(&mut harmony.samples, &normalization);
    log::debug!(
        "Stem levels: root rms={:.5} gain={:.3}, harmony rms={:.5} gain={:.3}",
        root_level.rms,
        root_level.gain,
        harmony_level.rms,
        harmony_level.gain
    );

    let mix = StemMix {
        root_gain: config.root_gain,
        harmony_gain: config.harmony_gain,
    };
    let mixed = mix_stems(&root.samples, &harmony.samples, mix)?;

    // Harmonic isolation
    let hpss_config = HpssConfig {
        frame_size: config.hpss_frame_size,
        hop_size: config.hop_size,
        harmonic_kernel: config.hpss_kernel_size,
        percussive_kernel: config.hpss_kernel_size,
    };
    let harmonic = harmonic_component(&mixed, &hpss_config)?;

    // Chroma features
    let chroma_config = ChromaConfig {
        sample_rate: config.sample_rate,
        frame_size: config.chroma_frame_size,
        hop_size: config.hop_size,
        min_frequency: config.chroma_min_frequency,
        octaves: config.chroma_octaves,
        smoothing_window: config.cens_smoothing_window,
    };
    let features = chroma_cens(&harmonic, &chroma_config)?;
    let mut frames = features.frames;
    l2_normalize_frames(&mut frames);
    let filtered = nn_filter(&frames, config.nn_filter_width)?;

    // Template matching
    let templates = ChordTemplates::new();
    let labels = match config.no_chord_threshold {
        Some(threshold) => match_frames_gated(&filtered, &features.energy, threshold, &templates),
        None => match_frames(&filtered, &templates),
    };

    // Timeline
    let timing = FrameTiming {
        sample_rate: config.sample_rate,
        hop_size: config.hop_size,
        latency_correction: config.latency_correction_seconds,
    };
    let raw_segments = build_raw_segments(&labels, &timing);
    let segments = merge_segments(&raw_segments, config.min_segment_seconds);

    log::info!(
        "Extracted {} chord segments from {} frames in {:.1} ms",
        segments.len(),
        labels.len(),
        start_time.elapsed().as_secs_f32() * 1000.0
    );

    Ok(segments)
}

fn conform_rate(buffer: AudioBuffer, target_rate: u32) -> Result<AudioBuffer> {
    if buffer.sample_rate == target_rate {
        return Ok(buffer);
    }
    if buffer.sample_rate == 0 {
        return Err(ChordError::InvalidInput("Invalid sample rate".to_string()));
    }
    let samples = resample(&buffer.samples, buffer.sample_rate, target_rate)
        .map_err(ChordError::InvalidInput)?;
    Ok(AudioBuffer::new(samples, target_rate))
}

/// Best-effort chord extraction for separated stems
///
/// Stem load failures are fatal and propagate. Any other failure is logged
/// and downgraded to an empty timeline so the stems can still be delivered.
pub fn analyze_stems(stems: &StemPaths, config: &ChordConfig) -> Result<Vec<ChordSegment>> {
    soften(extract_chords(stems.root(), stems.harmony(), config))
}

/// Best-effort chord extraction for decoded stems
///
/// See [`analyze_stems`] for the failure policy.
pub fn analyze_stem_buffers(
    root: AudioBuffer,
    harmony: AudioBuffer,
    config: &ChordConfig,
) -> Result<Vec<ChordSegment>> {
    soften(extract_chords_from_buffers(root, harmony, config))
}

fn soften(result: Result<Vec<ChordSegment>>) -> Result<Vec<ChordSegment>> {
    match result {
        Ok(segments) => Ok(segments),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            log::error!("Chord analysis failed, returning empty timeline: {}", e);
            Ok(Vec::new())
        }
    }
}

/// Separated stems plus the chord timeline of one track
#[derive(Debug, Clone, Serialize)]
pub struct TrackAnalysis {
    /// Paths of the four separated stems
    pub stems: StemPaths,
    /// Chord timeline (empty if analysis failed)
    pub chords: Vec<ChordSegment>,
}

/// Separate a full recording into stems and extract its chord timeline
///
/// `output_dir` is cleared before separation.
///
/// # Errors
///
/// - `ChordError::Separation` if the separator fails or any stem file is missing
/// - `ChordError::StemLoad` if a separated stem cannot be decoded
///
/// Analysis failures yield `Ok` with an empty `chords` list.
pub fn process_track(
    input: impl AsRef<Path>,
    separator: &dyn StemSeparator,
    output_dir: impl AsRef<Path>,
    config: &ChordConfig,
) -> Result<TrackAnalysis> {
    let input = input.as_ref();
    let output_dir = output_dir.as_ref();

    if !input.is_file() {
        return Err(ChordError::InvalidInput(format!(
            "Input file not found: {}",
            input.display()
        )));
    }

    separation::prepare_output_dir(output_dir)?;
    let stems = separator.separate(input, output_dir)?;

    let missing = stems.missing();
    if !missing.is_empty() {
        return Err(ChordError::Separation(format!(
            "Output files not found: {:?}",
            missing
        )));
    }

    let chords = analyze_stems(&stems, config)?;
    log::info!(
        "Processed {}: {} chord segments",
        input.display(),
        chords.len()
    );

    Ok(TrackAnalysis { stems, chords })
}
