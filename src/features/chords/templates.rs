//! Binary triad templates
//!
//! Defines pitch-class masks for 24 chords (12 major + 12 minor), generated by
//! rotating a C major and a C minor mask through all 12 roots. Templates are
//! interleaved per root: C, Cm, C#, C#m, ..., B, Bm.

use crate::analysis::result::Chord;
use crate::features::chroma::{ChromaFrame, N_CHROMA};

/// Root, major third, fifth
const MAJOR_MASK: ChromaFrame = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];

/// Root, minor third, fifth
const MINOR_MASK: ChromaFrame = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];

/// One chord template
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordTemplate {
    /// Pitch-class mask
    pub mask: ChromaFrame,
    /// Chord the mask represents
    pub chord: Chord,
}

impl ChordTemplate {
    /// Dot product of the mask with a chroma vector
    pub fn score(&self, chroma: &ChromaFrame) -> f32 {
        self.mask.iter().zip(chroma).map(|(m, c)| m * c).sum()
    }
}

/// Rotate a mask right by `shift` semitones (`out[j] = mask[j - shift]`)
fn rotate(mask: &ChromaFrame, shift: usize) -> ChromaFrame {
    let mut out = [0.0f32; N_CHROMA];
    for (j, o) in out.iter_mut().enumerate() {
        *o = mask[(j + N_CHROMA - shift % N_CHROMA) % N_CHROMA];
    }
    out
}

/// The 24 chord templates
#[derive(Debug, Clone)]
pub struct ChordTemplates {
    templates: Vec<ChordTemplate>,
}

impl ChordTemplates {
    /// Build the 24 major/minor templates in root order
    pub fn new() -> Self {
        let templates = (0..N_CHROMA)
            .flat_map(|root| {
                [
                    ChordTemplate {
                        mask: rotate(&MAJOR_MASK, root),
                        chord: Chord::Major(root as u32),
                    },
                    ChordTemplate {
                        mask: rotate(&MINOR_MASK, root),
                        chord: Chord::Minor(root as u32),
                    },
                ]
            })
            .collect();
        Self { templates }
    }

    /// All templates in enumeration order
    pub fn as_slice(&self) -> &[ChordTemplate] {
        &self.templates
    }

    /// Number of templates (24)
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// True if there are no templates
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Template at `index`
    pub fn get(&self, index: usize) -> Option<&ChordTemplate> {
        self.templates.get(index)
    }
}

impl Default for ChordTemplates {
    fn default() -> Self {
        Self::new()
    }
}
