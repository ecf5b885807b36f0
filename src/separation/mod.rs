//! Stem separation collaborator
//!
//! The chord pipeline consumes two of the four stems produced by an external
//! 4-stem separator (vocals, drums, bass, other): `bass` is the root stem and
//! `other` is the harmony stem.

pub mod demucs;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{ChordError, Result};

pub use demucs::DemucsSeparator;

/// One separated stem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stem {
    /// Lead and backing vocals
    Vocals,
    /// Drums and percussion
    Drums,
    /// Bass-register instruments (root stem)
    Bass,
    /// Remaining instruments (harmony stem)
    Other,
}

impl Stem {
    /// All stems in output order
    pub const ALL: [Stem; 4] = [Stem::Vocals, Stem::Drums, Stem::Bass, Stem::Other];

    /// Stable file name of the stem inside a separation output directory
    pub fn file_name(&self) -> &'static str {
        match self {
            Stem::Vocals => "vocals.wav",
            Stem::Drums => "drums.wav",
            Stem::Bass => "bass.wav",
            Stem::Other => "other.wav",
        }
    }
}

/// Paths of the four separated stems
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemPaths {
    /// Vocals stem
    pub vocals: PathBuf,
    /// Drums stem
    pub drums: PathBuf,
    /// Bass stem
    pub bass: PathBuf,
    /// Other (harmonic instruments) stem
    pub other: PathBuf,
}

impl StemPaths {
    /// Stem paths inside a separator's per-track output directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            vocals: dir.join(Stem::Vocals.file_name()),
            drums: dir.join(Stem::Drums.file_name()),
            bass: dir.join(Stem::Bass.file_name()),
            other: dir.join(Stem::Other.file_name()),
        }
    }

    /// Path of one stem
    pub fn get(&self, stem: Stem) -> &Path {
        match stem {
            Stem::Vocals => &self.vocals,
            Stem::Drums => &self.drums,
            Stem::Bass => &self.bass,
            Stem::Other => &self.other,
        }
    }

    /// Root stem for chord analysis (bass)
    pub fn root(&self) -> &Path {
        &self.bass
    }

    /// Harmony stem for chord analysis (other)
    pub fn harmony(&self) -> &Path {
        &self.other
    }

    /// Stems whose files do not exist
    pub fn missing(&self) -> Vec<Stem> {
        Stem::ALL
            .iter()
            .copied()
            .filter(|&stem| !self.get(stem).is_file())
            .collect()
    }
}

/// Splits one recording into vocals, drums, bass and other stems
pub trait StemSeparator {
    /// Separate `input`, writing stems somewhere under `output_dir`
    ///
    /// # Errors
    ///
    /// Returns `ChordError::Separation` if the separator fails or its output
    /// cannot be located.
    fn separate(&self, input: &Path, output_dir: &Path) -> Result<StemPaths>;
}

/// Remove artifacts of a previous run and recreate the output directory
pub fn prepare_output_dir(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    if dir.exists() {
        log::debug!("Clearing previous separation output in {}", dir.display());
        fs::remove_dir_all(dir).map_err(|e| {
            ChordError::Separation(format!("cannot clear {}: {}", dir.display(), e))
        })?;
    }
    fs::create_dir_all(dir)
        .map_err(|e| ChordError::Separation(format!("cannot create {}: {}", dir.display(), e)))
}

/// Locate the per-track directory a separator wrote
///
/// Checks `<output_dir>/<model>/<track_name>` first, then walks `output_dir`
/// (sorted by file name) for any directory named `track_name`.
///
/// # Errors
///
/// Returns `ChordError::Separation` if no such directory exists.
pub fn find_track_dir(output_dir: &Path, track_name: &str, model: &str) -> Result<PathBuf> {
    let expected = output_dir.join(model).join(track_name);
    if expected.is_dir() {
        return Ok(expected);
    }

    log::debug!(
        "No {} under {}, searching {}",
        track_name,
        model,
        output_dir.display()
    );

    WalkDir::new(output_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .find(|e| e.file_name() == track_name)
        .map(|e| e.into_path())
        .ok_or_else(|| {
            ChordError::Separation(format!(
                "Output files not found for '{}' under {}",
                track_name,
                output_dir.display()
            ))
        })
}
