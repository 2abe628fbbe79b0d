//! Waveform Generator
//!
//! The eight built-in instrument shapes of the console, evaluated as pure
//! functions of oscillator phase. Amplitudes follow the console's exported
//! WAV reference levels rather than full scale, which is why most shapes
//! peak well below 1.0.
//!
//! The APU consumes waveform evaluation through an injected [`WaveFn`], so
//! alternative tables (or constant stubs in tests) can be substituted
//! without touching the synthesis core. This module is the default
//! implementation.

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

/// Pure waveform evaluation: `(waveform id, phase) -> sample in [-1, 1]`
///
/// `phase` is an unbounded accumulator; one waveform cycle spans one unit,
/// periodicity is handled inside the function.
pub type WaveFn = fn(u8, f32) -> f32;

/// Built-in instrument waveform ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum Waveform {
    /// Plain triangle
    Triangle = 0,
    /// Triangle with a skewed peak
    TiltedSaw = 1,
    /// Sawtooth
    Saw = 2,
    /// 50% square
    Square = 3,
    /// Narrow (1/3 duty) pulse
    Pulse = 4,
    /// Two stacked triangle partials
    Organ = 5,
    /// White noise
    Noise = 6,
    /// Slowly detuned triangle pair
    Phaser = 7,
}

/// Convert a note key to its frequency in Hz
///
/// Key 33 is A at 440 Hz, with 12 keys per octave.
pub fn key_to_freq(key: u8) -> f32 {
    440.0 * ((key as f32 - 33.0) / 12.0).exp2()
}

fn triangle(t: f32) -> f32 {
    0.5 - (2.0 * t - 1.0).abs()
}

// Deterministic white noise: phase steps are hashed instead of drawn from a
// generator so the function stays pure and renders are reproducible.
fn noise(phase: f32) -> f32 {
    let step = (phase * 2.0).floor() as i64 as u64;
    let mut h = step.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    h ^= h >> 29;
    h = h.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    h ^= h >> 32;
    // Map the top 16 bits to [-0.5, 0.5]
    (h >> 48) as f32 / 65535.0 - 0.5
}

/// Evaluate the built-in waveform `id` at `phase`
///
/// Unknown ids fall back to silence, matching the console's behaviour for
/// waveform slots it does not implement.
pub fn waveform(id: u8, phase: f32) -> f32 {
    let t = phase.rem_euclid(1.0);

    match Waveform::from_u8(id) {
        Some(Waveform::Triangle) => triangle(t),
        Some(Waveform::TiltedSaw) => {
            let a = 0.9;
            let v = if t < a {
                2.0 * t / a - 1.0
            } else {
                2.0 * (1.0 - t) / (1.0 - a) - 1.0
            };
            v * 0.5
        }
        Some(Waveform::Saw) => 0.653 * if t < 0.5 { t } else { t - 1.0 },
        Some(Waveform::Square) => {
            if t < 0.5 {
                0.25
            } else {
                -0.25
            }
        }
        Some(Waveform::Pulse) => {
            if t < 1.0 / 3.0 {
                0.25
            } else {
                -0.25
            }
        }
        Some(Waveform::Organ) => {
            (triangle(t) * 2.0 + triangle((2.0 * phase).rem_euclid(1.0))) / 3.0
        }
        Some(Waveform::Noise) => noise(phase),
        Some(Waveform::Phaser) => {
            // Second partial drifts at 127/128 of the rate for the slow beat
            let detuned = (phase * 127.0 / 128.0).rem_euclid(1.0);
            (triangle(t) * 2.0 + triangle(detuned)) / 3.0
        }
        None => 0.0,
    }
}
