//! PICO-8-style Fantasy Console APU
//!
//! A sample-accurate emulation of the sound generation unit of a
//! PICO-8-style fantasy console: four hardware voice channels playing
//! compact sample-based sound effects, a music sequencer chaining song
//! patterns with start/stop/loop flags and linear fades, and a mixer
//! producing a continuous 22050 Hz interleaved-stereo 16-bit PCM stream.
//!
//! # Features
//! - Four independent voice channels with console-faithful allocation and
//!   eviction (lowest playing sfx id is stolen first)
//! - Per-note pitch/volume/waveform decoding and loop-range wraparound
//! - Music sequencing over 64 patterns with fade in/out on the sample clock
//! - The console's eight instrument waveforms, injectable for testing
//! - WAV rendering and optional real-time streaming playback
//!
//! # Crate feature flags
//! - `streaming` (opt-in): Real-time audio output (enables optional `rodio` dep)
//!
//! # Quick start
//! ## Render a sound effect
//! ```no_run
//! use pico_apu::{Apu, Note, SoundEffect};
//!
//! let mut sfx = SoundEffect::default();
//! sfx.notes[0] = Note::new(33, 7, 3); // A-440, full volume, square
//! sfx.speed = 16;
//!
//! let mut apu = Apu::new();
//! apu.set_sfx(0, sfx);
//! apu.sfx(0, -1, 0);
//!
//! let mut frames = vec![0u32; 1024];
//! apu.fill_buffer(&mut frames);
//! ```
//!
//! ## Real-time streaming
//! ```no_run
//! # #[cfg(feature = "streaming")]
//! # {
//! use pico_apu::{Apu, AudioDevice, RealtimeApu, StreamConfig};
//!
//! let config = StreamConfig::low_latency();
//! let rt = RealtimeApu::new(Apu::new(), config).unwrap();
//! let _dev = AudioDevice::new(config.sample_rate, config.channels, rt.get_buffer()).unwrap();
//! rt.sfx(0, -1, 0);
//! // pump samples into the ring in a loop
//! rt.pump_blocking(512);
//! # }
//! ```

#![warn(missing_docs)]

// Domain modules
pub mod apu; // Voice channels, allocator, sequencer, mixer (core)
pub mod export; // WAV rendering
#[cfg(feature = "streaming")]
pub mod streaming; // Audio Output & Streaming
pub mod synth; // Waveform generator
pub mod tracker; // Instrument & song data model

/// Error types for APU operations
///
/// The control surface itself never errors — the emulated hardware treats a
/// malformed request as a no-op — so errors only arise at the file and
/// device edges.
#[derive(thiserror::Error, Debug)]
pub enum ApuError {
    /// Error writing audio file
    #[error("Audio file write error: {0}")]
    AudioFileError(String),

    /// IO error from filesystem or device
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Audio device error
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for ApuError {
    /// Converts a String into `ApuError::Other`.
    ///
    /// Convenience for generic string errors; prefer the specific variant
    /// constructors where the error type matters.
    fn from(msg: String) -> Self {
        ApuError::Other(msg)
    }
}

impl From<&str> for ApuError {
    /// Converts a string slice into `ApuError::Other`.
    fn from(msg: &str) -> Self {
        ApuError::Other(msg.to_string())
    }
}

/// Result type for APU operations
pub type Result<T> = std::result::Result<T, ApuError>;

// Public API exports
pub use apu::{Apu, MusicState, SfxChannel};

pub use export::render_wav;
#[cfg(feature = "streaming")]
pub use streaming::{AudioDevice, PlaybackState, RealtimeApu, RingBuffer, StreamConfig};
pub use synth::{key_to_freq, waveform, WaveFn, Waveform};
pub use tracker::{Note, PatternFlags, SoundEffect, Song, CHANNEL_COUNT, SAMPLE_RATE};
