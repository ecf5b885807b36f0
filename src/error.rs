//! Error types for the chord extraction engine

use thiserror::Error;

/// Errors that can occur while separating stems or extracting chords
#[derive(Debug, Clone, Error)]
pub enum ChordError {
    /// A stem source is missing or cannot be decoded
    #[error("Stem load error for {path}: {reason}")]
    StemLoad {
        /// Path of the stem that failed to load
        path: String,
        /// Underlying decoder message
        reason: String,
    },

    /// Upstream stem separation failed or produced no discoverable output
    #[error("Separation error: {0}")]
    Separation(String),

    /// Failure inside feature extraction or template matching
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ChordError {
    /// Build a [`ChordError::StemLoad`] for the given path
    pub fn stem_load(path: impl AsRef<std::path::Path>, reason: impl Into<String>) -> Self {
        ChordError::StemLoad {
            path: path.as_ref().display().to_string(),
            reason: reason.into(),
        }
    }

    /// True for failures that must abort the whole request
    ///
    /// Separation and stem-load failures are hard; analysis failures are
    /// downgraded to an empty chord timeline by [`crate::analyze_stems`].
    pub fn is_fatal(&self) -> bool {
        matches!(self, ChordError::StemLoad { .. } | ChordError::Separation(_))
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ChordError>;
