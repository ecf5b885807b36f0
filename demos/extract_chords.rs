//! Example: Extract a chord timeline and print it as JSON
//!
//! From separated stems:
//!
//! ```text
//! cargo run --example extract_chords -- --root bass.wav --harmony other.wav
//! ```
//!
//! From a full mix (requires `demucs` on PATH):
//!
//! ```text
//! cargo run --example extract_chords -- --separate song.mp3 --output separated
//! ```

use std::path::PathBuf;

use clap::Parser;
use stratum_chords::{
    analyze_stems, process_track, timeline_to_json, ChordConfig, DemucsSeparator, StemPaths,
};

/// Chord timeline extraction
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Root (bass) stem
    #[arg(long, requires = "harmony", conflicts_with = "separate")]
    root: Option<PathBuf>,

    /// Harmony (other) stem
    #[arg(long, requires = "root")]
    harmony: Option<PathBuf>,

    /// Separate this full mix with demucs before analysis
    #[arg(long)]
    separate: Option<PathBuf>,

    /// Separation output directory (cleared before each run)
    #[arg(short, long, default_value = "separated")]
    output: PathBuf,

    /// Demucs model name
    #[arg(long, default_value = "htdemucs_ft")]
    model: String,

    /// TOML file overriding analysis parameters
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ChordConfig::load(path)?,
        None => ChordConfig::default(),
    };

    if let Some(input) = &args.separate {
        let separator = DemucsSeparator::with_model(args.model.as_str());
        let analysis = process_track(input, &separator, &args.output, &config)?;
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    let (Some(root), Some(harmony)) = (args.root, args.harmony) else {
        return Err("pass --root and --harmony, or --separate <file>".into());
    };

    let stems = StemPaths {
        bass: root,
        other: harmony,
        ..StemPaths::in_dir(&args.output)
    };
    let chords = analyze_stems(&stems, &config)?;
    println!("{}", timeline_to_json(&chords)?);

    Ok(())
}
