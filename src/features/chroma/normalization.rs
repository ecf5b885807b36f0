//! Chroma normalization strategies

use super::ChromaFrame;

/// Norms below this leave the vector untouched
const EPSILON: f32 = 1e-10;

/// CENS quantization thresholds, each worth 0.25
const CENS_STEPS: [f32; 4] = [0.4, 0.2, 0.1, 0.05];
const CENS_STEP_WEIGHT: f32 = 0.25;

/// Scale a chroma vector to unit L1 norm
pub fn l1_normalize(chroma: &mut ChromaFrame) {
    let sum: f32 = chroma.iter().map(|v| v.abs()).sum();
    if sum > EPSILON {
        for v in chroma.iter_mut() {
            *v /= sum;
        }
    }
}

/// Scale a chroma vector to unit L2 norm
///
/// Vectors with (near) zero energy are left unchanged, so silent frames stay
/// all-zero instead of dividing by zero.
pub fn l2_normalize(chroma: &mut ChromaFrame) {
    let norm = chroma.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > EPSILON {
        for v in chroma.iter_mut() {
            *v /= norm;
        }
    }
}

/// L2-normalize every frame of a chroma sequence
pub fn l2_normalize_frames(frames: &mut [ChromaFrame]) {
    for frame in frames.iter_mut() {
        l2_normalize(frame);
    }
}

/// Quantize an L1-normalized chroma vector to CENS levels
///
/// Each pitch class scores 0.25 for every threshold it exceeds, so values map
/// to one of 0, 0.25, 0.5, 0.75, 1.0.
pub fn quantize_cens(chroma: &mut ChromaFrame) {
    for v in chroma.iter_mut() {
        let level = *v;
        *v = CENS_STEPS.iter().filter(|&&step| level > step).count() as f32 * CENS_STEP_WEIGHT;
    }
}
