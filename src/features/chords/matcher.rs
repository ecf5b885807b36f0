//! Per-frame chord template matching
//!
//! Every frame is scored against all 24 templates by dot product and assigned
//! the best-scoring chord. Ties go to the lowest template index, so an
//! all-zero frame resolves to C major. There is no score threshold: silence
//! still receives a best-guess label unless a no-chord energy threshold is
//! supplied.

use super::templates::ChordTemplates;
use crate::analysis::result::Chord;
use crate::features::chroma::ChromaFrame;

/// Index and score of the best template for one frame
///
/// Scanning in enumeration order and replacing only on a strictly greater
/// score keeps the lowest index among equal scores.
pub fn best_template(chroma: &ChromaFrame, templates: &ChordTemplates) -> (usize, f32) {
    templates
        .as_slice()
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best, best_score), (i, template)| {
            let score = template.score(chroma);
            if score > best_score {
                (i, score)
            } else {
                (best, best_score)
            }
        })
}

/// Label every chroma frame with its best-matching chord
///
/// # Arguments
///
/// * `chroma_vectors` - Smoothed chroma frames
/// * `templates` - The 24 chord templates
///
/// # Returns
///
/// One chord per frame, in frame order
pub fn match_frames(chroma_vectors: &[ChromaFrame], templates: &ChordTemplates) -> Vec<Chord> {
    log::debug!(
        "Matching {} chroma frames against {} templates",
        chroma_vectors.len(),
        templates.len()
    );

    chroma_vectors
        .iter()
        .map(|chroma| {
            let (index, _) = best_template(chroma, templates);
            templates
                .get(index)
                .map_or(Chord::NoChord, |template| template.chord)
        })
        .collect()
}

/// Label frames, replacing low-energy frames with [`Chord::NoChord`]
///
/// # Arguments
///
/// * `chroma_vectors` - Smoothed chroma frames
/// * `energy` - Raw chroma energy per frame (same length)
/// * `threshold` - Frames with energy below this become `NoChord`
pub fn match_frames_gated(
    chroma_vectors: &[ChromaFrame],
    energy: &[f32],
    threshold: f32,
    templates: &ChordTemplates,
) -> Vec<Chord> {
    let mut labels = match_frames(chroma_vectors, templates);
    let mut gated = 0usize;
    for (label, &e) in labels.iter_mut().zip(energy) {
        if e < threshold {
            *label = Chord::NoChord;
            gated += 1;
        }
    }
    log::debug!("No-chord gate: {} of {} frames below {}", gated, labels.len(), threshold);
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::chroma::normalization::l2_normalize;

    fn chroma(weights: &[(usize, f32)]) -> ChromaFrame {
        let mut f = [0.0f32; 12];
        for &(pc, w) in weights {
            f[pc] = w;
        }
        l2_normalize(&mut f);
        f
    }

    fn rotate(frame: &ChromaFrame, semitones: usize) -> ChromaFrame {
        let mut out = [0.0f32; 12];
        for (i, &v) in frame.iter().enumerate() {
            out[(i + semitones) % 12] = v;
        }
        out
    }

    #[test]
    fn test_c_major_and_a_minor() {
        let templates = ChordTemplates::new();
        let frames = vec![
            chroma(&[(0, 1.0), (4, 0.5), (7, 0.5)]),
            chroma(&[(9, 1.0), (0, 0.5), (4, 0.5)]),
        ];
        let labels = match_frames(&frames, &templates);
        assert_eq!(labels, vec![Chord::Major(0), Chord::Minor(9)]);
    }

    #[test]
    fn test_silence_ties_to_first_template() {
        let templates = ChordTemplates::new();
        let labels = match_frames(&[[0.0f32; 12]], &templates);
        assert_eq!(labels, vec![Chord::Major(0)]);
    }

    #[test]
    fn test_tie_prefers_lowest_index() {
        let templates = ChordTemplates::new();
        // C and E only: C major and A minor score the same
        let frame = chroma(&[(0, 1.0), (4, 1.0)]);
        let (index, _) = best_template(&frame, &templates);
        assert_eq!(index, 0);
    }

    #[test]
    fn test_transposition_symmetry() {
        let templates = ChordTemplates::new();
        let base = [
            chroma(&[(0, 1.0), (4, 0.5), (7, 0.5)]),
            chroma(&[(9, 1.0), (0, 0.5), (4, 0.5)]),
            chroma(&[(2, 0.8), (5, 0.6), (9, 0.7), (11, 0.1)]),
        ];
        for frame in base.iter() {
            let label = match_frames(&[*frame], &templates)[0];
            for shift in 1..12 {
                let shifted = match_frames(&[rotate(frame, shift)], &templates)[0];
                assert_eq!(shifted, label.transpose(shift as i32));
            }
        }
    }

    #[test]
    fn test_gated_labels() {
        let templates = ChordTemplates::new();
        let frames = vec![chroma(&[(0, 1.0), (4, 1.0), (7, 1.0)]); 3];
        let labels = match_frames_gated(&frames, &[1.0, 0.001, 1.0], 0.01, &templates);
        assert_eq!(labels, vec![Chord::Major(0), Chord::NoChord, Chord::Major(0)]);
    }
}
