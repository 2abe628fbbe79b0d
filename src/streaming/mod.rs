//! Real-time audio output
//!
//! Couples an [`Apu`](crate::apu::Apu) to a system audio device through a
//! ring buffer of interleaved stereo samples. Control calls (`sfx`,
//! `music`) and block rendering go through one shared mutex, since both
//! sides freely mutate the same channel state — see [`RealtimeApu`].

mod audio_device;
mod realtime;

pub use audio_device::AudioDevice;
pub use realtime::RealtimeApu;

use crate::tracker::SAMPLE_RATE;
use crate::{ApuError, Result};

/// Backoff when the ring buffer is full during a blocking write
pub(crate) const BUFFER_BACKOFF_MICROS: u64 = 500;

/// Streaming configuration
#[derive(Debug, Clone, Copy)]
pub struct StreamConfig {
    /// Output sample rate in Hz (the APU always renders at 22050)
    pub sample_rate: u32,
    /// Interleaved output channels (2: left/right carry the same mix)
    pub channels: u16,
    /// Ring buffer capacity in samples (not frames)
    pub ring_buffer_size: usize,
}

impl StreamConfig {
    /// Low-latency configuration (~93 ms of buffered audio)
    pub fn low_latency() -> Self {
        StreamConfig {
            sample_rate: SAMPLE_RATE,
            channels: 2,
            ring_buffer_size: 4096,
        }
    }

    /// Stability-first configuration (~372 ms of buffered audio)
    pub fn stable() -> Self {
        StreamConfig {
            sample_rate: SAMPLE_RATE,
            channels: 2,
            ring_buffer_size: 16384,
        }
    }

    /// Buffered latency of a full ring in milliseconds
    pub fn latency_ms(&self) -> f32 {
        let frames = self.ring_buffer_size as f32 / self.channels as f32;
        frames * 1000.0 / self.sample_rate as f32
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::low_latency()
    }
}

/// Playback state of a streaming session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Not producing output
    Stopped,
    /// Producing output
    Playing,
    /// Output suspended, state retained
    Paused,
}

/// Fixed-capacity ring buffer of 16-bit samples
///
/// Shared between the render thread (producer) and the audio callback
/// (consumer) behind a `parking_lot::Mutex`.
pub struct RingBuffer {
    data: Vec<i16>,
    read_pos: usize,
    write_pos: usize,
    len: usize,
}

impl RingBuffer {
    /// Create a ring buffer holding `capacity` samples
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(ApuError::ConfigError(
                "ring buffer capacity must be non-zero".to_string(),
            ));
        }
        Ok(RingBuffer {
            data: vec![0; capacity],
            read_pos: 0,
            write_pos: 0,
            len: 0,
        })
    }

    /// Write as many samples as fit, returning how many were taken
    pub fn write(&mut self, samples: &[i16]) -> usize {
        let capacity = self.data.len();
        let writable = (capacity - self.len).min(samples.len());
        for &sample in &samples[..writable] {
            self.data[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % capacity;
        }
        self.len += writable;
        writable
    }

    /// Read up to `out.len()` samples, returning how many were produced
    pub fn read(&mut self, out: &mut [i16]) -> usize {
        let capacity = self.data.len();
        let readable = self.len.min(out.len());
        for slot in &mut out[..readable] {
            *slot = self.data[self.read_pos];
            self.read_pos = (self.read_pos + 1) % capacity;
        }
        self.len -= readable;
        readable
    }

    /// Samples currently buffered
    pub fn available_read(&self) -> usize {
        self.len
    }

    /// Free space in samples
    pub fn available_write(&self) -> usize {
        self.data.len() - self.len
    }

    /// Fill level, 0.0 (empty) to 1.0 (full)
    pub fn fill_percentage(&self) -> f32 {
        self.len as f32 / self.data.len() as f32
    }

    /// Drop all buffered samples
    pub fn flush(&mut self) {
        self.read_pos = 0;
        self.write_pos = 0;
        self.len = 0;
    }
}
