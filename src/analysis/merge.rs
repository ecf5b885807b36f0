//! Short-segment merging
//!
//! Scans raw segments left to right with an accumulator seeded from the first
//! segment:
//! - a segment shorter than the minimum duration is absorbed into the
//!   accumulator, which keeps its own label;
//! - a segment with the accumulator's label is absorbed as well, so two
//!   long segments split by an absorbed glitch come out as one (a plain
//!   short-segment merge would emit them as two adjacent segments with the
//!   same label);
//! - any other segment flushes the accumulator and becomes the new one.
//!
//! Short segments are always folded into what came before them, never into
//! the following chord, so a genuine one-beat chord between two longer
//! chords is lost. Only the very first raw segment can survive while short.

use super::result::ChordSegment;
use super::timeline::RawSegment;

/// Round seconds to millisecond precision
pub fn round_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

fn finalize(segment: &RawSegment) -> ChordSegment {
    ChordSegment {
        time: round_millis(segment.start),
        chord: segment.chord.name(),
        end: round_millis(segment.end),
    }
}

/// Merge raw segments into the final chord timeline
///
/// # Arguments
///
/// * `raw_segments` - Segments from [`super::timeline::build_raw_segments`]
/// * `min_duration` - Segments strictly shorter than this are absorbed (e.g., 0.8 s)
///
/// # Returns
///
/// Final segments with times rounded to milliseconds; consecutive segments
/// never share a label
pub fn merge_segments(raw_segments: &[RawSegment], min_duration: f64) -> Vec<ChordSegment> {
    let Some((first, rest)) = raw_segments.split_first() else {
        return Vec::new();
    };

    let mut merged = Vec::new();
    let mut current = first.clone();
    let mut absorbed = 0usize;

    for next in rest {
        if next.duration < min_duration || next.chord == current.chord {
            current.end = next.end;
            current.duration += next.duration;
            absorbed += 1;
        } else {
            merged.push(finalize(&current));
            current = next.clone();
        }
    }
    merged.push(finalize(&current));

    log::debug!(
        "Merged {} raw segments into {} ({} absorbed, min duration {:.2}s)",
        raw_segments.len(),
        merged.len(),
        absorbed,
        min_duration
    );

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::result::Chord;

    fn raw(start: f64, end: f64, chord: Chord) -> RawSegment {
        RawSegment {
            start,
            end,
            chord,
            duration: end - start,
        }
    }

    #[test]
    fn test_empty() {
        assert!(merge_segments(&[], 0.8).is_empty());
    }

    #[test]
    fn test_short_glitch_takes_previous_label() {
        let segments = vec![
            raw(0.0, 2.0, Chord::Major(0)),
            raw(2.0, 2.3, Chord::Minor(4)),
            raw(2.3, 5.0, Chord::Major(7)),
        ];
        let merged = merge_segments(&segments, 0.8);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].chord, "C");
        assert_eq!(merged[0].end, 2.3);
        assert_eq!(merged[1].chord, "G");
        assert_eq!(merged[1].time, 2.3);
    }

    #[test]
    fn test_one_beat_chord_is_lost() {
        let segments = vec![
            raw(0.0, 4.0, Chord::Major(0)),
            raw(4.0, 4.5, Chord::Major(5)),
            raw(4.5, 8.0, Chord::Major(7)),
        ];
        let merged = merge_segments(&segments, 0.8);
        let labels: Vec<&str> = merged.iter().map(|s| s.chord.as_str()).collect();
        assert_eq!(labels, vec!["C", "G"]);
    }

    #[test]
    fn test_short_first_segment_survives() {
        let segments = vec![
            raw(0.0, 0.2, Chord::Minor(2)),
            raw(0.2, 3.0, Chord::Major(0)),
        ];
        let merged = merge_segments(&segments, 0.8);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].chord, "Dm");
        assert!((merged[0].duration() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_no_adjacent_duplicates() {
        // A glitch inside a chord leaves two long halves with the same label
        let segments = vec![
            raw(0.0, 2.0, Chord::Major(0)),
            raw(2.0, 2.2, Chord::Minor(9)),
            raw(2.2, 4.0, Chord::Major(0)),
            raw(4.0, 6.0, Chord::Major(7)),
        ];
        let merged = merge_segments(&segments, 0.8);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].chord, "C");
        assert_eq!(merged[0].end, 4.0);
        for pair in merged.windows(2) {
            assert_ne!(pair[0].chord, pair[1].chord);
        }
    }

    #[test]
    fn test_glitch_inside_chord_yields_one_segment() {
        let segments = vec![
            raw(0.0, 2.0, Chord::Major(0)),
            raw(2.0, 2.2, Chord::Minor(9)),
            raw(2.2, 4.0, Chord::Major(0)),
        ];
        let merged = merge_segments(&segments, 0.8);
        assert_eq!(
            merged,
            vec![ChordSegment {
                time: 0.0,
                chord: "C".to_string(),
                end: 4.0,
            }]
        );
    }

    #[test]
    fn test_rounding_and_tiling() {
        let segments = vec![
            raw(0.0, 1.23456, Chord::Major(0)),
            raw(1.23456, 3.98765, Chord::Minor(9)),
        ];
        let merged = merge_segments(&segments, 0.8);
        assert_eq!(merged[0].end, 1.235);
        assert_eq!(merged[1].time, merged[0].end);
        assert_eq!(merged[1].end, 3.988);
    }

    #[test]
    fn test_boundary_duration_not_absorbed() {
        let mut second = raw(1.0, 1.8, Chord::Major(2));
        second.duration = 0.8;
        let segments = vec![raw(0.0, 1.0, Chord::Major(0)), second];
        let merged = merge_segments(&segments, 0.8);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].chord, "D");
    }
}
