//! Audio decoding using Symphonia
//!
//! Decodes any supported container to mono `f32` and resamples to the
//! analysis rate with an FFT resampler when the source rate differs.

use std::fs::File;
use std::path::Path;

use rubato::{FftFixedIn, Resampler};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::sample_buffer::AudioBuffer;
use crate::error::{ChordError, Result};
use crate::preprocessing::channel_mixer::downmix_interleaved;

/// Input chunk size for the resampler
const RESAMPLE_CHUNK: usize = 4096;

/// Decode audio file to mono PCM samples at `target_rate`
///
/// # Arguments
///
/// * `path` - Path to audio file (WAV, FLAC, MP3, OGG, AAC, MP4, MKV)
/// * `target_rate` - Output sample rate in Hz
///
/// # Returns
///
/// Mono `AudioBuffer` at `target_rate`
///
/// # Errors
///
/// Returns `ChordError::StemLoad` if the file is missing, has no audio track,
/// or yields no samples.
pub fn decode_audio(path: impl AsRef<Path>, target_rate: u32) -> Result<AudioBuffer> {
    let path = path.as_ref();
    log::debug!("Decoding audio file: {}", path.display());

    let (samples, source_rate) = decode_mono(path)?;
    if samples.is_empty() {
        return Err(ChordError::stem_load(path, "no audio samples decoded"));
    }

    let samples = if source_rate == target_rate {
        samples
    } else {
        resample(&samples, source_rate, target_rate)
            .map_err(|reason| ChordError::stem_load(path, reason))?
    };

    log::info!(
        "Decoded {} samples @ {}Hz (source {}Hz) from {}",
        samples.len(),
        target_rate,
        source_rate,
        path.display()
    );

    Ok(AudioBuffer::new(samples, target_rate))
}

fn decode_mono(path: &Path) -> Result<(Vec<f32>, u32)> {
    let file = File::open(path).map_err(|e| ChordError::stem_load(path, e.to_string()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| ChordError::stem_load(path, format!("unsupported format: {}", e)))?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| ChordError::stem_load(path, "no supported audio track"))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| ChordError::stem_load(path, "unknown sample rate"))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| ChordError::stem_load(path, format!("no decoder: {}", e)))?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(ChordError::stem_load(path, format!("read error: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("Skipping corrupt packet in {}: {}", path.display(), e);
                continue;
            }
            Err(e) => {
                return Err(ChordError::stem_load(path, format!("decode error: {}", e)));
            }
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);
        let frames = decoded.capacity() as u64;
        let needs_alloc = sample_buf
            .as_ref()
            .map_or(true, |buf| buf.capacity() < decoded.capacity() * channels);
        if needs_alloc {
            sample_buf = Some(SampleBuffer::<f32>::new(frames, spec));
        }
        if let Some(buf) = sample_buf.as_mut() {
            buf.copy_interleaved_ref(decoded);
            samples.extend(downmix_interleaved(buf.samples(), channels));
        }
    }

    Ok((samples, sample_rate))
}

/// Resample mono samples from `from` Hz to `to` Hz
///
/// The resampler's output delay is trimmed so sample `n` of the output lines
/// up with time `n / to` of the input.
pub fn resample(samples: &[f32], from: u32, to: u32) -> std::result::Result<Vec<f32>, String> {
    if from == 0 || to == 0 {
        return Err(format!("invalid resample rates: {} -> {}", from, to));
    }
    log::debug!("Resampling {} samples: {}Hz -> {}Hz", samples.len(), from, to);

    let mut resampler = FftFixedIn::<f32>::new(from as usize, to as usize, RESAMPLE_CHUNK, 2, 1)
        .map_err(|e| e.to_string())?;

    let expected_len =
        ((samples.len() as u64 * to as u64 + from as u64 - 1) / from as u64) as usize;
    let delay = resampler.output_delay();
    let mut output: Vec<f32> = Vec::with_capacity(expected_len + delay + RESAMPLE_CHUNK);

    let mut pos = 0;
    while pos + resampler.input_frames_next() <= samples.len() {
        let n = resampler.input_frames_next();
        let frames = resampler
            .process(&[&samples[pos..pos + n]], None)
            .map_err(|e| e.to_string())?;
        output.extend_from_slice(&frames[0]);
        pos += n;
    }

    if pos < samples.len() {
        let frames = resampler
            .process_partial(Some(&[&samples[pos..]][..]), None)
            .map_err(|e| e.to_string())?;
        output.extend_from_slice(&frames[0]);
    }

    // Flush until the delayed tail is out
    while output.len() < expected_len + delay {
        let frames = resampler
            .process_partial::<&[f32]>(None, None)
            .map_err(|e| e.to_string())?;
        if frames[0].is_empty() {
            break;
        }
        output.extend_from_slice(&frames[0]);
    }

    let start = delay.min(output.len());
    let mut output = output.split_off(start);
    output.truncate(expected_len);
    Ok(output)
}
