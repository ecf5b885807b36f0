//! Configuration parameters for chord extraction

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ChordError, Result};

/// Chord extraction configuration parameters
///
/// Every field has a default; partial TOML files only override the keys they
/// name.
///
/// # Example
///
/// ```
/// use stratum_chords::ChordConfig;
///
/// let config = ChordConfig::from_toml_str("min_segment_seconds = 1.2").unwrap();
/// assert_eq!(config.min_segment_seconds, 1.2);
/// assert_eq!(config.hop_size, 512);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChordConfig {
    // Loading
    /// Analysis sample rate in Hz (default: 44100)
    /// Both stems are resampled to this rate on decode
    pub sample_rate: u32,

    // Normalization and mixing
    /// RMS below which a stem is treated as silence and left untouched (default: 0.005)
    pub rms_floor: f32,

    /// Target RMS level for normalized stems (default: 0.1)
    pub target_rms: f32,

    /// Additive epsilon in the RMS denominator (default: 1e-6)
    pub rms_epsilon: f32,

    /// Gain applied to the root (bass) stem in the mix (default: 1.0)
    pub root_gain: f32,

    /// Gain applied to the harmony (other) stem in the mix (default: 0.7)
    pub harmony_gain: f32,

    // STFT parameters
    /// Hop size in samples shared by every frame-based stage (default: 512)
    pub hop_size: usize,

    /// FFT frame size for harmonic/percussive separation (default: 2048)
    pub hpss_frame_size: usize,

    /// Median filter length in bins/frames for HPSS (default: 31, must be odd)
    pub hpss_kernel_size: usize,

    // Chroma
    /// FFT frame size for chroma extraction (default: 8192)
    /// Long windows resolve semitones in the bass register
    pub chroma_frame_size: usize,

    /// Lowest analysed frequency in Hz (default: 32.70, C1)
    pub chroma_min_frequency: f32,

    /// Number of octaves analysed above `chroma_min_frequency` (default: 7)
    pub chroma_octaves: usize,

    /// Hann window length in frames for CENS smoothing (default: 41, 0 disables)
    pub cens_smoothing_window: usize,

    /// Nearest-neighbour filter exclusion width in frames (default: 21)
    pub nn_filter_width: usize,

    // Timeline
    /// Seconds subtracted from every frame time (default: 0.4)
    pub latency_correction_seconds: f64,

    /// Segments shorter than this are absorbed into the preceding segment (default: 0.8)
    pub min_segment_seconds: f64,

    /// Frames with raw chroma energy below this are labelled `N` (default: disabled)
    pub no_chord_threshold: Option<f32>,
}

impl Default for ChordConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            rms_floor: 0.005,
            target_rms: 0.1,
            rms_epsilon: 1e-6,
            root_gain: 1.0,
            harmony_gain: 0.7,
            hop_size: 512,
            hpss_frame_size: 2048,
            hpss_kernel_size: 31,
            chroma_frame_size: 8192,
            chroma_min_frequency: 32.703_197,
            chroma_octaves: 7,
            cens_smoothing_window: 41,
            nn_filter_width: 21,
            latency_correction_seconds: 0.4,
            min_segment_seconds: 0.8,
            no_chord_threshold: None,
        }
    }
}

impl ChordConfig {
    /// Parse a configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns `ChordError::Config` if the text is not valid TOML, or
    /// `ChordError::InvalidInput` if the values fail [`ChordConfig::validate`].
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ChordConfig =
            toml::from_str(text).map_err(|e| ChordError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ChordError::Config(format!("{}: {}", path.display(), e)))?;
        log::debug!("Loaded chord config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Check parameter sanity
    ///
    /// # Errors
    ///
    /// Returns `ChordError::InvalidInput` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(ChordError::InvalidInput("sample_rate must be > 0".to_string()));
        }
        if self.hop_size == 0 {
            return Err(ChordError::InvalidInput("hop_size must be > 0".to_string()));
        }
        if self.hpss_frame_size < 2 || self.chroma_frame_size < 2 {
            return Err(ChordError::InvalidInput(format!(
                "frame sizes must be >= 2, got hpss={} chroma={}",
                self.hpss_frame_size, self.chroma_frame_size
            )));
        }
        if self.hpss_kernel_size == 0 || self.hpss_kernel_size % 2 == 0 {
            return Err(ChordError::InvalidInput(format!(
                "hpss_kernel_size must be odd, got {}",
                self.hpss_kernel_size
            )));
        }
        if self.target_rms <= 0.0 || self.rms_floor < 0.0 {
            return Err(ChordError::InvalidInput(format!(
                "invalid RMS levels: target={} floor={}",
                self.target_rms, self.rms_floor
            )));
        }
        if self.root_gain < 0.0 || self.harmony_gain < 0.0 {
            return Err(ChordError::InvalidInput(format!(
                "mix gains must be non-negative: root={} harmony={}",
                self.root_gain, self.harmony_gain
            )));
        }
        if self.chroma_min_frequency <= 0.0 || self.chroma_octaves == 0 {
            return Err(ChordError::InvalidInput(format!(
                "invalid chroma range: fmin={} octaves={}",
                self.chroma_min_frequency, self.chroma_octaves
            )));
        }
        if self.latency_correction_seconds < 0.0 || self.min_segment_seconds < 0.0 {
            return Err(ChordError::InvalidInput(
                "timeline durations must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}
