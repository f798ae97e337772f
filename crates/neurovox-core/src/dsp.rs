//! Sample-level transforms.
//!
//! Every function takes a slice and returns a new buffer; nothing here
//! mutates its input.

use std::f64::consts::{PI, TAU};

use realfft::num_complex::Complex;
use realfft::{FftError, RealFftPlanner};
use rubato::{FftFixedIn, Resampler};
use tracing::{debug, warn};

use crate::error::{NeurovoxError, NeurovoxResult};

/// Analysis/synthesis frame for time stretching
const STRETCH_FRAME: usize = 1024;
/// Synthesis hop for time stretching (87.5% overlap)
const STRETCH_HOP: usize = STRETCH_FRAME / 8;
/// Input block size fed to the resampler
const RESAMPLE_CHUNK: usize = 1024;

/// Largest absolute sample value, 0.0 for an empty buffer
#[must_use]
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0_f32, |max, s| max.max(s.abs()))
}

/// Scale so the loudest sample has magnitude 1.0.
///
/// Silent (all-zero) buffers are returned unchanged instead of dividing by zero.
#[must_use]
pub fn peak_normalize(samples: &[f32]) -> Vec<f32> {
    let max = peak(samples);
    if max <= f32::EPSILON {
        return samples.to_vec();
    }
    samples.iter().map(|s| s / max).collect()
}

/// Soft-knee compression above `threshold` at `ratio`:1, preserving sign
#[must_use]
pub fn compress(samples: &[f32], threshold: f32, ratio: f32) -> Vec<f32> {
    samples
        .iter()
        .map(|&s| {
            let magnitude = s.abs();
            if magnitude > threshold {
                s.signum() * (threshold + (magnitude - threshold) / ratio)
            } else {
                s
            }
        })
        .collect()
}

/// Multiply every sample by `gain`
#[must_use]
pub fn apply_gain(samples: &[f32], gain: f32) -> Vec<f32> {
    samples.iter().map(|s| s * gain).collect()
}

/// Periodic Hann window
fn hann_window(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 0.5 * (1.0 - (TAU * i as f64 / len as f64).cos()))
        .collect()
}

/// Wrap a phase into `[-PI, PI)`
fn wrap_phase(phase: f64) -> f64 {
    (phase + PI).rem_euclid(TAU) - PI
}

/// Change duration without changing pitch.
///
/// `rate > 1.0` speeds up (shorter output), `rate < 1.0` slows down. The
/// output has exactly `round(len / rate)` samples.
///
/// Runs a phase vocoder: frames are analysed every `STRETCH_HOP * rate`
/// input samples and resynthesized every `STRETCH_HOP` output samples, with
/// each bin's phase advanced by its measured instantaneous frequency so
/// overlapping frames stay coherent.
#[must_use]
pub fn time_stretch(samples: &[f32], rate: f32) -> Vec<f32> {
    if samples.is_empty() || (rate - 1.0).abs() < f32::EPSILON || !rate.is_finite() || rate <= 0.0 {
        return samples.to_vec();
    }

    let out_len = (samples.len() as f32 / rate).round() as usize;
    if samples.len() < STRETCH_FRAME {
        // Too short to window; plain interpolation is inaudible at this length.
        return linear_resize(samples, out_len);
    }

    match phase_vocoder(samples, f64::from(rate), out_len) {
        Ok(stretched) => stretched,
        Err(e) => {
            warn!(error = %e, "Phase vocoder failed, falling back to linear resize");
            linear_resize(samples, out_len)
        }
    }
}

fn phase_vocoder(samples: &[f32], rate: f64, out_len: usize) -> Result<Vec<f32>, FftError> {
    let half = STRETCH_FRAME / 2;
    let bins = half + 1;
    let frames = out_len / STRETCH_HOP + 2;

    // Frame k is centred on input sample k * hop * rate; the leading half
    // frame of zeros puts that centre at `starts[k] + half` in `padded`.
    let starts: Vec<usize> = (0..frames)
        .map(|k| (k as f64 * STRETCH_HOP as f64 * rate).round() as usize)
        .collect();
    let padded_len = (starts[frames - 1] + STRETCH_FRAME).max(half + samples.len());
    let mut padded = vec![0.0_f64; padded_len];
    for (dst, &s) in padded[half..].iter_mut().zip(samples) {
        *dst = f64::from(s);
    }

    let window = hann_window(STRETCH_FRAME);
    let mut planner = RealFftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(STRETCH_FRAME);
    let inverse = planner.plan_fft_inverse(STRETCH_FRAME);
    let mut frame = forward.make_input_vec();
    let mut spectrum = forward.make_output_vec();
    let mut resynth = inverse.make_output_vec();

    let mut last_phase = vec![0.0_f64; bins];
    let mut phase_acc = vec![0.0_f64; bins];
    let mut output = vec![0.0_f64; (frames - 1) * STRETCH_HOP + STRETCH_FRAME];
    let mut weight = vec![0.0_f64; output.len()];
    let bin_step = TAU / STRETCH_FRAME as f64;
    let synthesis_hop = STRETCH_HOP as f64;

    for (k, &start) in starts.iter().enumerate() {
        for ((dst, &s), &w) in frame
            .iter_mut()
            .zip(&padded[start..start + STRETCH_FRAME])
            .zip(&window)
        {
            *dst = s * w;
        }
        forward.process(&mut frame, &mut spectrum)?;

        let analysis_hop = if k == 0 { 0 } else { start - starts[k - 1] };
        for (i, bin) in spectrum.iter_mut().enumerate() {
            let magnitude = bin.norm();
            let phase = bin.arg();
            if k == 0 {
                phase_acc[i] = phase;
            } else {
                let expected = bin_step * i as f64;
                let true_freq = if analysis_hop == 0 {
                    expected
                } else {
                    let hop = analysis_hop as f64;
                    expected + wrap_phase(phase - last_phase[i] - expected * hop) / hop
                };
                phase_acc[i] = wrap_phase(phase_acc[i] + true_freq * synthesis_hop);
            }
            last_phase[i] = phase;
            *bin = Complex::from_polar(magnitude, phase_acc[i]);
        }
        // DC and Nyquist must be purely real for the inverse transform
        spectrum[0].im = 0.0;
        spectrum[bins - 1].im = 0.0;
        inverse.process(&mut spectrum, &mut resynth)?;

        let offset = k * STRETCH_HOP;
        for (i, (&s, &w)) in resynth.iter().zip(&window).enumerate() {
            output[offset + i] += s * w;
            weight[offset + i] += w * w;
        }
    }

    // The inverse transform is unnormalized, hence the extra frame-length factor.
    let scale = STRETCH_FRAME as f64;
    Ok(output[half..half + out_len]
        .iter()
        .zip(&weight[half..])
        .map(|(&s, &w)| if w > 1e-6 { (s / (w * scale)) as f32 } else { 0.0 })
        .collect())
}

/// Resize by linear interpolation (changes pitch along with length)
#[must_use]
pub fn linear_resize(samples: &[f32], out_len: usize) -> Vec<f32> {
    if samples.is_empty() || out_len == 0 {
        return Vec::new();
    }
    if samples.len() == 1 {
        return vec![samples[0]; out_len];
    }

    let step = (samples.len() - 1) as f32 / (out_len.max(2) - 1) as f32;
    (0..out_len)
        .map(|i| {
            let pos = i as f32 * step;
            let idx = pos.floor() as usize;
            let frac = pos - idx as f32;
            let a = samples[idx.min(samples.len() - 1)];
            let b = samples[(idx + 1).min(samples.len() - 1)];
            a + (b - a) * frac
        })
        .collect()
}

/// Expected output length when converting `len` samples between rates
#[must_use]
pub fn resampled_len(len: usize, from_rate: u32, to_rate: u32) -> usize {
    ((len as u64 * u64::from(to_rate) + u64::from(from_rate) - 1) / u64::from(from_rate)) as usize
}

/// Convert between sample rates with FFT-based sinc resampling
///
/// # Errors
///
/// Returns an error if either rate is zero or the resampler fails.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> NeurovoxResult<Vec<f32>> {
    if from_rate == 0 || to_rate == 0 {
        return Err(NeurovoxError::audio_processing(format!(
            "Cannot resample from {from_rate} Hz to {to_rate} Hz"
        )));
    }
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let expected = resampled_len(samples.len(), from_rate, to_rate);
    if samples.len() < 64 {
        return Ok(linear_resize(samples, expected));
    }

    let mut resampler = FftFixedIn::<f64>::new(
        from_rate as usize,
        to_rate as usize,
        RESAMPLE_CHUNK,
        2,
        1,
    )
    .map_err(|e| NeurovoxError::audio_processing(format!("Resampler init failed: {e}")))?;

    let delay = resampler.output_delay();
    let input: Vec<f64> = samples.iter().map(|&s| f64::from(s)).collect();
    let mut output: Vec<f64> = Vec::with_capacity(expected + delay);
    let mut pos = 0;

    let process_err =
        |e: rubato::ResampleError| NeurovoxError::audio_processing(format!("Resampling failed: {e}"));

    while input.len() - pos >= resampler.input_frames_next() {
        let next = resampler.input_frames_next();
        let block = [&input[pos..pos + next]];
        let frames = resampler.process(&block[..], None).map_err(process_err)?;
        output.extend_from_slice(&frames[0]);
        pos += next;
    }
    if pos < input.len() {
        let block = [&input[pos..]];
        let frames = resampler
            .process_partial(Some(&block[..]), None)
            .map_err(process_err)?;
        output.extend_from_slice(&frames[0]);
    }
    while output.len() < expected + delay {
        let frames = resampler
            .process_partial::<&[f64]>(None, None)
            .map_err(process_err)?;
        if frames[0].is_empty() {
            break;
        }
        output.extend_from_slice(&frames[0]);
    }

    debug!(from_rate, to_rate, input = samples.len(), output = expected, "Resampled audio");
    Ok(output
        .into_iter()
        .skip(delay)
        .take(expected)
        .map(|s| s as f32)
        .collect())
}
