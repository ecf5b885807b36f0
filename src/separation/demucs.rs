//! Demucs command-line separator
//!
//! Runs `demucs -n <model> <input> -o <output_dir>` and locates the
//! `<output_dir>/<model>/<track>/{vocals,drums,bass,other}.wav` stems it
//! writes. Requires `demucs` on `PATH` (or an explicit program path).

use std::path::{Path, PathBuf};
use std::process::Command;

use super::{find_track_dir, StemPaths, StemSeparator};
use crate::error::{ChordError, Result};

/// Fine-tuned hybrid transformer model
pub const DEFAULT_MODEL: &str = "htdemucs_ft";

/// Separator backed by the `demucs` executable
#[derive(Debug, Clone)]
pub struct DemucsSeparator {
    /// Executable to run (default: `demucs`)
    pub program: PathBuf,
    /// Model name passed with `-n`
    pub model: String,
}

impl Default for DemucsSeparator {
    fn default() -> Self {
        Self {
            program: PathBuf::from("demucs"),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl DemucsSeparator {
    /// Separator using `model`
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    fn command(&self, input: &Path, output_dir: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-n")
            .arg(&self.model)
            .arg(input)
            .arg("-o")
            .arg(output_dir);
        command
    }
}

impl StemSeparator for DemucsSeparator {
    fn separate(&self, input: &Path, output_dir: &Path) -> Result<StemPaths> {
        log::info!(
            "Separating {} with {} ({})",
            input.display(),
            self.program.display(),
            self.model
        );

        let status = self.command(input, output_dir).status().map_err(|e| {
            ChordError::Separation(format!("cannot run {}: {}", self.program.display(), e))
        })?;

        if !status.success() {
            return Err(ChordError::Separation(format!(
                "{} exited with {}",
                self.program.display(),
                status
            )));
        }

        let track_name = input
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                ChordError::Separation(format!("input has no file name: {}", input.display()))
            })?;

        let track_dir = find_track_dir(output_dir, track_name, &self.model)?;
        log::debug!("Found separated stems in {}", track_dir.display());
        Ok(StemPaths::in_dir(track_dir))
    }
}
