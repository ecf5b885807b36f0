//! Integration tests for the chord extraction pipeline

use std::f32::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};

use stratum_chords::{
    analyze_stem_buffers, analyze_stems, extract_chords, extract_chords_from_buffers,
    process_track, timeline_to_json, AudioBuffer, ChordConfig, ChordError, ChordSegment,
    StemPaths, StemSeparator,
};

const SAMPLE_RATE: u32 = 44100;

// Bass roots and triads for the two-chord scenario
const C3: f32 = 130.81;
const A2: f32 = 110.0;
const C_MAJOR: [f32; 3] = [261.63, 329.63, 392.0];
const A_MINOR: [f32; 3] = [220.0, 261.63, 329.63];

/// Sum of sines at `amplitude / freqs.len()` each
fn tones(freqs: &[f32], seconds: f32, sample_rate: u32, amplitude: f32) -> Vec<f32> {
    let len = (seconds * sample_rate as f32) as usize;
    let scale = amplitude / freqs.len() as f32;
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            freqs.iter().map(|f| (2.0 * PI * f * t).sin()).sum::<f32>() * scale
        })
        .collect()
}

/// C major for 5 s, then A minor for 5 s, as (root, harmony)
fn two_chord_stems(sample_rate: u32) -> (Vec<f32>, Vec<f32>) {
    let mut root = tones(&[C3], 5.0, sample_rate, 0.4);
    root.extend(tones(&[A2], 5.0, sample_rate, 0.4));

    let mut harmony = tones(&C_MAJOR, 5.0, sample_rate, 0.3);
    harmony.extend(tones(&A_MINOR, 5.0, sample_rate, 0.3));

    (root, harmony)
}

/// Write mono samples as 16-bit PCM, duplicated to `channels`
fn write_wav(path: &Path, samples: &[f32], sample_rate: u32, channels: u16) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create WAV");
    for &s in samples {
        let value = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        for _ in 0..channels {
            writer.write_sample(value).expect("Failed to write sample");
        }
    }
    writer.finalize().expect("Failed to finalize WAV");
}

fn labels(segments: &[ChordSegment]) -> Vec<&str> {
    segments.iter().map(|s| s.chord.as_str()).collect()
}

fn assert_tiled(segments: &[ChordSegment]) {
    assert_eq!(segments[0].time, 0.0, "timeline should start at 0");
    for pair in segments.windows(2) {
        assert_eq!(pair[0].end, pair[1].time, "gap or overlap in {:?}", segments);
        assert_ne!(pair[0].chord, pair[1].chord, "adjacent duplicate in {:?}", segments);
    }
    for segment in segments {
        assert!(segment.time >= 0.0);
        assert!(segment.end >= segment.time);
    }
}

/// Writes C major stems under `<output_dir>/fake_model/<track>/`
struct FakeSeparator {
    stems_to_write: Vec<&'static str>,
}

impl FakeSeparator {
    fn complete() -> Self {
        Self {
            stems_to_write: vec!["vocals.wav", "drums.wav", "bass.wav", "other.wav"],
        }
    }
}

impl StemSeparator for FakeSeparator {
    fn separate(&self, input: &Path, output_dir: &Path) -> stratum_chords::Result<StemPaths> {
        let track = input.file_stem().and_then(|s| s.to_str()).unwrap_or("track");
        let dir = output_dir.join("fake_model").join(track);
        fs::create_dir_all(&dir).map_err(|e| ChordError::Separation(e.to_string()))?;

        let silence = vec![0.0f32; SAMPLE_RATE as usize * 3];
        let bass = tones(&[C3], 3.0, SAMPLE_RATE, 0.4);
        let other = tones(&C_MAJOR, 3.0, SAMPLE_RATE, 0.3);
        for name in &self.stems_to_write {
            let samples = match *name {
                "bass.wav" => &bass,
                "other.wav" => &other,
                _ => &silence,
            };
            write_wav(&dir.join(name), samples, SAMPLE_RATE, 2);
        }
        Ok(StemPaths::in_dir(dir))
    }
}

struct FailingSeparator;

impl StemSeparator for FailingSeparator {
    fn separate(&self, _input: &Path, _output_dir: &Path) -> stratum_chords::Result<StemPaths> {
        Err(ChordError::Separation("demucs exited with status 1".to_string()))
    }
}

fn dummy_input(dir: &Path) -> PathBuf {
    let input = dir.join("song.mp3");
    fs::write(&input, b"not really audio").expect("Failed to write input");
    input
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_chord_scenario_from_files() {
        let _ = env_logger::builder().is_test(true).try_init();
        let tmp = tempfile::tempdir().unwrap();
        let (root, harmony) = two_chord_stems(SAMPLE_RATE);
        let root_path = tmp.path().join("bass.wav");
        let harmony_path = tmp.path().join("other.wav");
        write_wav(&root_path, &root, SAMPLE_RATE, 2);
        write_wav(&harmony_path, &harmony, SAMPLE_RATE, 2);

        let segments = extract_chords(&root_path, &harmony_path, &ChordConfig::default())
            .expect("Chord extraction should succeed");

        assert_eq!(labels(&segments), vec!["C", "Am"], "got {:?}", segments);
        assert_eq!(segments[0].time, 0.0);
        assert!(
            (segments[0].end - 5.0).abs() < 0.8,
            "C -> Am boundary should be near 5 s, got {:.3}",
            segments[0].end
        );
        assert!(
            (segments[1].end - 10.0).abs() < 0.8,
            "timeline should end near 10 s, got {:.3}",
            segments[1].end
        );
        assert_tiled(&segments);
    }

    #[test]
    fn test_resampled_stems_match() {
        let (root, harmony) = two_chord_stems(48000);
        let segments = extract_chords_from_buffers(
            AudioBuffer::new(root, 48000),
            AudioBuffer::new(harmony, 48000),
            &ChordConfig::default(),
        )
        .expect("Chord extraction should succeed");

        assert_eq!(labels(&segments), vec!["C", "Am"], "got {:?}", segments);
        assert!((segments[0].end - 5.0).abs() < 0.8);
    }

    #[test]
    fn test_silence_yields_single_segment() {
        let silence = vec![0.0f32; SAMPLE_RATE as usize * 5];
        let segments = extract_chords_from_buffers(
            AudioBuffer::new(silence.clone(), SAMPLE_RATE),
            AudioBuffer::new(silence, SAMPLE_RATE),
            &ChordConfig::default(),
        )
        .expect("Silence must not fail");

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].chord, "C");
        assert_eq!(segments[0].time, 0.0);
        assert!(segments[0].end > 4.0 && segments[0].end <= 5.0);
    }

    #[test]
    fn test_silence_with_no_chord_gate() {
        let silence = vec![0.0f32; SAMPLE_RATE as usize * 5];
        let config = ChordConfig {
            no_chord_threshold: Some(1e-3),
            ..ChordConfig::default()
        };
        let segments = extract_chords_from_buffers(
            AudioBuffer::new(silence.clone(), SAMPLE_RATE),
            AudioBuffer::new(silence, SAMPLE_RATE),
            &config,
        )
        .unwrap();

        assert_eq!(labels(&segments), vec!["N"]);
    }

    #[test]
    fn test_deterministic_output() {
        let (root, harmony) = two_chord_stems(SAMPLE_RATE);
        let config = ChordConfig::default();
        let first = extract_chords_from_buffers(
            AudioBuffer::new(root.clone(), SAMPLE_RATE),
            AudioBuffer::new(harmony.clone(), SAMPLE_RATE),
            &config,
        )
        .unwrap();
        let second = extract_chords_from_buffers(
            AudioBuffer::new(root, SAMPLE_RATE),
            AudioBuffer::new(harmony, SAMPLE_RATE),
            &config,
        )
        .unwrap();

        assert_eq!(first, second);
        assert_eq!(
            timeline_to_json(&first).unwrap(),
            timeline_to_json(&second).unwrap()
        );
    }

    #[test]
    fn test_mismatched_lengths_truncate() {
        let (root, mut harmony) = two_chord_stems(SAMPLE_RATE);
        harmony.truncate(SAMPLE_RATE as usize * 7);
        let segments = extract_chords_from_buffers(
            AudioBuffer::new(root, SAMPLE_RATE),
            AudioBuffer::new(harmony, SAMPLE_RATE),
            &ChordConfig::default(),
        )
        .unwrap();

        let last = segments.last().unwrap();
        assert!(last.end <= 7.0, "timeline should stop at the shorter stem, got {:.3}", last.end);
        assert_tiled(&segments);
    }

    #[test]
    fn test_missing_stem_is_stem_load_error() {
        let tmp = tempfile::tempdir().unwrap();
        let root_path = tmp.path().join("bass.wav");
        write_wav(&root_path, &tones(&[C3], 1.0, SAMPLE_RATE, 0.4), SAMPLE_RATE, 1);

        let result = extract_chords(
            &root_path,
            tmp.path().join("missing.wav"),
            &ChordConfig::default(),
        );
        assert!(matches!(result, Err(ChordError::StemLoad { .. })));

        // Stem load failures stay fatal in the best-effort wrapper
        let stems = StemPaths::in_dir(tmp.path());
        assert!(matches!(
            analyze_stems(&stems, &ChordConfig::default()),
            Err(ChordError::StemLoad { .. })
        ));
    }

    #[test]
    fn test_analysis_failure_downgrades_to_empty() {
        // Too few frames for the nearest-neighbour filter
        let root = tones(&[C3], 0.2, SAMPLE_RATE, 0.4);
        let harmony = tones(&C_MAJOR, 0.2, SAMPLE_RATE, 0.3);

        let hard = extract_chords_from_buffers(
            AudioBuffer::new(root.clone(), SAMPLE_RATE),
            AudioBuffer::new(harmony.clone(), SAMPLE_RATE),
            &ChordConfig::default(),
        );
        assert!(matches!(hard, Err(ChordError::Analysis(_))));

        let soft = analyze_stem_buffers(
            AudioBuffer::new(root, SAMPLE_RATE),
            AudioBuffer::new(harmony, SAMPLE_RATE),
            &ChordConfig::default(),
        )
        .expect("Analysis failures should not propagate");
        assert!(soft.is_empty());
    }

    #[test]
    fn test_non_finite_input_downgrades_to_empty() {
        let mut harmony = tones(&C_MAJOR, 2.0, SAMPLE_RATE, 0.3);
        harmony[1000] = f32::NAN;
        let segments = analyze_stem_buffers(
            AudioBuffer::new(tones(&[C3], 2.0, SAMPLE_RATE, 0.4), SAMPLE_RATE),
            AudioBuffer::new(harmony, SAMPLE_RATE),
            &ChordConfig::default(),
        )
        .unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn test_process_track_with_separator() {
        let tmp = tempfile::tempdir().unwrap();
        let input = dummy_input(tmp.path());
        let output_dir = tmp.path().join("separated");
        fs::create_dir_all(output_dir.join("stale")).unwrap();

        let analysis = process_track(
            &input,
            &FakeSeparator::complete(),
            &output_dir,
            &ChordConfig::default(),
        )
        .expect("Processing should succeed");

        assert!(!output_dir.join("stale").exists(), "previous output should be cleared");
        assert!(analysis.stems.missing().is_empty());
        assert!(analysis.stems.root().ends_with("song/bass.wav"));
        assert_eq!(labels(&analysis.chords), vec!["C"]);

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["chords"][0]["chord"], "C");
        assert_eq!(json["chords"][0]["time"], 0.0);
    }

    #[test]
    fn test_process_track_separation_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let input = dummy_input(tmp.path());

        let result = process_track(
            &input,
            &FailingSeparator,
            tmp.path().join("separated"),
            &ChordConfig::default(),
        );
        assert!(matches!(result, Err(ChordError::Separation(_))));
    }

    #[test]
    fn test_process_track_missing_stem_files() {
        let tmp = tempfile::tempdir().unwrap();
        let input = dummy_input(tmp.path());
        let separator = FakeSeparator {
            stems_to_write: vec!["bass.wav"],
        };

        let result = process_track(
            &input,
            &separator,
            tmp.path().join("separated"),
            &ChordConfig::default(),
        );
        assert!(matches!(result, Err(ChordError::Separation(_))));
    }
}
