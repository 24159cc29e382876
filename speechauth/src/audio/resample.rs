//! Whole-buffer sample rate conversion with rubato.

use rubato::{FftFixedInOut, Resampler};

use crate::error::{Error, Result};

/// Frames per processing block handed to rubato.
const CHUNK_FRAMES: usize = 1024;

/// Resamples interleaved 16-bit samples from `src_rate` to `dst_rate`.
///
/// The output has `frames * dst_rate / src_rate` frames, with the
/// resampler's delay removed.
pub fn resample(samples: &[i16], channels: usize, src_rate: u32, dst_rate: u32) -> Result<Vec<i16>> {
    if src_rate == 0 || dst_rate == 0 {
        return Err(Error::UnsupportedAudio(format!(
            "sample rate {} -> {}",
            src_rate, dst_rate
        )));
    }
    if src_rate == dst_rate || samples.is_empty() || channels == 0 {
        return Ok(samples.to_vec());
    }

    let frames = samples.len() / channels;
    let expected = (frames as u64 * dst_rate as u64 / src_rate as u64) as usize;

    let mut resampler =
        FftFixedInOut::<f32>::new(src_rate as usize, dst_rate as usize, CHUNK_FRAMES, channels)?;
    let delay = resampler.output_delay();

    // Convert i16 interleaved to f32 per-channel
    let mut input: Vec<Vec<f32>> = vec![Vec::with_capacity(frames); channels];
    for frame in samples.chunks_exact(channels) {
        for (ch, &s) in frame.iter().enumerate() {
            input[ch].push(s as f32 / 32768.0);
        }
    }

    let mut input_buf: Vec<Vec<f32>> = vec![Vec::new(); channels];
    let mut output_buf: Vec<Vec<f32>> = vec![vec![0.0; resampler.output_frames_max()]; channels];
    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(expected + delay); channels];

    let mut pos = 0;
    while output[0].len() < expected + delay {
        let needed = resampler.input_frames_next();
        let end = (pos + needed).min(frames);
        for ch in 0..channels {
            input_buf[ch].clear();
            if pos < end {
                input_buf[ch].extend_from_slice(&input[ch][pos..end]);
            }
            // Pad input (and flush the tail) with silence
            input_buf[ch].resize(needed, 0.0);
        }
        pos = end;

        let (_, written) = resampler.process_into_buffer(&input_buf, &mut output_buf, None)?;
        for ch in 0..channels {
            output[ch].extend_from_slice(&output_buf[ch][..written]);
        }
    }

    // Convert f32 per-channel back to i16 interleaved
    let mut result = Vec::with_capacity(expected * channels);
    for frame in delay..delay + expected {
        for out in &output {
            result.push((out[frame] * 32767.0).clamp(-32768.0, 32767.0) as i16);
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(rate: u32, freq: f32, frames: usize) -> Vec<i16> {
        (0..frames)
            .map(|i| {
                let t = i as f32 / rate as f32;
                ((t * freq * 2.0 * std::f32::consts::PI).sin() * 16000.0) as i16
            })
            .collect()
    }

    #[test]
    fn test_downsample_length() {
        let input = sine(16000, 440.0, 16000);
        let output = resample(&input, 1, 16000, 8000).unwrap();
        assert_eq!(output.len(), 8000);
    }

    #[test]
    fn test_downsample_stereo_length() {
        let mono = sine(44100, 300.0, 4410);
        let stereo: Vec<i16> = mono.iter().flat_map(|&s| [s, s]).collect();
        let output = resample(&stereo, 2, 44100, 8000).unwrap();
        assert_eq!(output.len(), 800 * 2);
    }

    #[test]
    fn test_downsample_keeps_energy() {
        let input = sine(16000, 440.0, 16000);
        let output = resample(&input, 1, 16000, 8000).unwrap();
        let peak = output[1000..7000].iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert!(peak > 12000 && peak < 20000, "peak {}", peak);
    }

    #[test]
    fn test_zero_rate_rejected() {
        let input = vec![1i16; 160];
        assert!(matches!(
            resample(&input, 1, 0, 8000),
            Err(Error::UnsupportedAudio(_))
        ));
        assert!(resample(&input, 1, 16000, 0).is_err());
    }

    #[test]
    fn test_same_rate_passthrough() {
        let input = vec![1i16, 2, 3, 4];
        assert_eq!(resample(&input, 2, 8000, 8000).unwrap(), input);
    }
}
