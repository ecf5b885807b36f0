//! Chord labels and timeline result types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ChordError, Result};

/// Pitch class names, C = 0
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Label emitted for frames without a chord (only when a no-chord threshold is set)
pub const NO_CHORD_LABEL: &str = "N";

/// Triad chord label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chord {
    /// Major triad (0 = C, 1 = C#, ..., 11 = B)
    Major(u32),
    /// Minor triad (0 = C, 1 = C#, ..., 11 = B)
    Minor(u32),
    /// No chord (silence or noise)
    NoChord,
}

impl Chord {
    /// Get chord name in lead-sheet notation (e.g., "C", "Am", "F#", "D#m")
    ///
    /// # Example
    ///
    /// ```
    /// use stratum_chords::analysis::result::Chord;
    ///
    /// assert_eq!(Chord::Major(0).name(), "C");
    /// assert_eq!(Chord::Major(6).name(), "F#");
    /// assert_eq!(Chord::Minor(9).name(), "Am");
    /// assert_eq!(Chord::NoChord.name(), "N");
    /// ```
    pub fn name(&self) -> String {
        match self {
            Chord::Major(i) => NOTE_NAMES[*i as usize % 12].to_string(),
            Chord::Minor(i) => format!("{}m", NOTE_NAMES[*i as usize % 12]),
            Chord::NoChord => NO_CHORD_LABEL.to_string(),
        }
    }

    /// Shift the root by `semitones` (negative shifts down)
    pub fn transpose(&self, semitones: i32) -> Self {
        let shift = |root: u32| (root as i32 + semitones).rem_euclid(12) as u32;
        match self {
            Chord::Major(i) => Chord::Major(shift(*i)),
            Chord::Minor(i) => Chord::Minor(shift(*i)),
            Chord::NoChord => Chord::NoChord,
        }
    }

    /// Parse a chord name produced by [`Chord::name`]
    ///
    /// ```
    /// use stratum_chords::analysis::result::Chord;
    ///
    /// assert_eq!(Chord::from_name("C#m"), Some(Chord::Minor(1)));
    /// assert_eq!(Chord::from_name("G"), Some(Chord::Major(7)));
    /// assert_eq!(Chord::from_name("H"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        if name == NO_CHORD_LABEL {
            return Some(Chord::NoChord);
        }
        let (note, minor) = match name.strip_suffix('m') {
            Some(note) => (note, true),
            None => (name, false),
        };
        let root = NOTE_NAMES.iter().position(|&n| n == note)? as u32;
        Some(if minor {
            Chord::Minor(root)
        } else {
            Chord::Major(root)
        })
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// One entry of the final chord timeline
///
/// Serializes to `{"time": 0.0, "chord": "C", "end": 4.6}` with times in
/// seconds rounded to milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordSegment {
    /// Segment start in seconds
    pub time: f64,
    /// Chord label
    pub chord: String,
    /// Segment end in seconds
    pub end: f64,
}

impl ChordSegment {
    /// Segment length in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.time
    }
}

/// Render a chord timeline as a JSON array
pub fn timeline_to_json(segments: &[ChordSegment]) -> Result<String> {
    serde_json::to_string_pretty(segments).map_err(|e| ChordError::Analysis(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_names_round_trip() {
        for root in 0..12 {
            for chord in [Chord::Major(root), Chord::Minor(root)] {
                assert_eq!(Chord::from_name(&chord.name()), Some(chord));
            }
        }
        assert_eq!(Chord::from_name("N"), Some(Chord::NoChord));
    }

    #[test]
    fn test_transpose_wraps() {
        assert_eq!(Chord::Major(11).transpose(1), Chord::Major(0));
        assert_eq!(Chord::Minor(0).transpose(-3), Chord::Minor(9));
        assert_eq!(Chord::NoChord.transpose(5), Chord::NoChord);
    }

    #[test]
    fn test_segment_json_shape() {
        let segments = vec![ChordSegment {
            time: 0.0,
            chord: "Am".to_string(),
            end: 4.6,
        }];
        let json = timeline_to_json(&segments).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["chord"], "Am");
        assert_eq!(value[0]["end"], 4.6);
        assert_eq!(value[0]["time"], 0.0);
    }
}
