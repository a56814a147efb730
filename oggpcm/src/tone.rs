//! Sine test signal in the decoder's output layout.

use std::f64::consts::PI;

use crate::pcm::extend_le_bytes;

/// Concert pitch A4.
pub const DEFAULT_FREQUENCY: f64 = 440.0;

/// Fraction of full scale used for the generated signal.
const AMPLITUDE: f64 = 0.8 * i16::MAX as f64;

/// Generates `seconds` of a sine wave, interleaved, same signal on every channel.
pub fn sine_wave(sample_rate: u32, channels: u8, seconds: f64, frequency: f64) -> Vec<i16> {
    let frames = (sample_rate as f64 * seconds).round() as usize;
    let mut samples = Vec::with_capacity(frames * channels as usize);
    for i in 0..frames {
        let t = i as f64 / sample_rate as f64;
        let value = ((2.0 * PI * frequency * t).sin() * AMPLITUDE) as i16;
        samples.extend(std::iter::repeat_n(value, channels as usize));
    }
    samples
}

/// Same as [`sine_wave`], encoded as 16-bit little-endian bytes.
pub fn sine_wave_le_bytes(sample_rate: u32, channels: u8, seconds: f64, frequency: f64) -> Vec<u8> {
    let mut out = Vec::new();
    extend_le_bytes(&sine_wave(sample_rate, channels, seconds, frequency), &mut out);
    out
}
