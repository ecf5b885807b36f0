//! Performance benchmarks for chord extraction

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stratum_chords::features::chords::{match_frames, ChordTemplates};
use stratum_chords::features::chroma::{chroma_cens, nn_filter, ChromaConfig};
use stratum_chords::{extract_chords_from_buffers, AudioBuffer, ChordConfig};

const SAMPLE_RATE: u32 = 44100;

/// Cycle C, Am, F, G every 2 seconds for `seconds`
fn progression(seconds: usize) -> (Vec<f32>, Vec<f32>) {
    let chords: [(f32, [f32; 3]); 4] = [
        (130.81, [261.63, 329.63, 392.0]),
        (110.0, [220.0, 261.63, 329.63]),
        (87.31, [174.61, 220.0, 261.63]),
        (98.0, [196.0, 246.94, 293.66]),
    ];
    let len = SAMPLE_RATE as usize * seconds;
    let mut root = Vec::with_capacity(len);
    let mut harmony = Vec::with_capacity(len);
    for i in 0..len {
        let t = i as f32 / SAMPLE_RATE as f32;
        let (bass, triad) = chords[(t / 2.0) as usize % chords.len()];
        root.push((2.0 * std::f32::consts::PI * bass * t).sin() * 0.4);
        harmony.push(
            triad
                .iter()
                .map(|f| (2.0 * std::f32::consts::PI * f * t).sin())
                .sum::<f32>()
                * 0.1,
        );
    }
    (root, harmony)
}

fn bench_extract_chords(c: &mut Criterion) {
    let (root, harmony) = progression(30);
    let config = ChordConfig::default();

    let mut group = c.benchmark_group("chord_extraction");
    group.sample_size(10);
    group.bench_function("extract_chords_30s", |b| {
        b.iter(|| {
            let _ = extract_chords_from_buffers(
                black_box(AudioBuffer::new(root.clone(), SAMPLE_RATE)),
                black_box(AudioBuffer::new(harmony.clone(), SAMPLE_RATE)),
                black_box(&config),
            );
        });
    });
    group.finish();
}

fn bench_nn_filter_and_matching(c: &mut Criterion) {
    let (_, harmony) = progression(30);
    let features = match chroma_cens(&harmony, &ChromaConfig::default()) {
        Ok(features) => features,
        Err(e) => panic!("chroma extraction failed: {}", e),
    };
    let templates = ChordTemplates::new();

    c.bench_function("nn_filter_match_30s", |b| {
        b.iter(|| {
            if let Ok(filtered) = nn_filter(black_box(&features.frames), 21) {
                let _ = match_frames(&filtered, &templates);
            }
        });
    });
}

criterion_group!(benches, bench_extract_chords, bench_nn_filter_and_matching);
criterion_main!(benches);
