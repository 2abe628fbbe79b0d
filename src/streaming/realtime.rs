//! Shared APU handle for real-time rendering
//!
//! Control calls arrive from the host's instruction-dispatch path while
//! block rendering runs on an audio-paced thread. Both mutate the same
//! channel and sequencer state, so everything goes through one
//! `parking_lot::Mutex` around the APU.

use super::{PlaybackState, RingBuffer, StreamConfig, BUFFER_BACKOFF_MICROS};
use crate::apu::Apu;
use crate::Result;
use parking_lot::Mutex;
use std::sync::Arc;

/// An [`Apu`] shared between a control thread and a render thread
///
/// The render side pulls stereo samples out of the APU into a ring buffer;
/// an [`AudioDevice`](super::AudioDevice) drains the ring from the system
/// audio callback. Control calls proxy through the same mutex, so a `sfx()`
/// request lands between two rendered blocks, never inside one.
pub struct RealtimeApu {
    apu: Arc<Mutex<Apu>>,
    buffer: Arc<Mutex<RingBuffer>>,
    config: StreamConfig,
    state: Arc<Mutex<PlaybackState>>,
}

impl RealtimeApu {
    /// Wrap `apu` for streaming with the given configuration
    pub fn new(apu: Apu, config: StreamConfig) -> Result<Self> {
        let buffer = Arc::new(Mutex::new(RingBuffer::new(config.ring_buffer_size)?));
        Ok(RealtimeApu {
            apu: Arc::new(Mutex::new(apu)),
            buffer,
            config,
            state: Arc::new(Mutex::new(PlaybackState::Stopped)),
        })
    }

    /// Start a sound effect (locks the shared APU)
    pub fn sfx(&self, n: i32, channel: i32, offset: i32) {
        self.apu.lock().sfx(n, channel, offset);
    }

    /// Start or fade the music sequencer (locks the shared APU)
    pub fn music(&self, pattern: i32, fade_len_ms: i32, channel_mask: i32) {
        self.apu.lock().music(pattern, fade_len_ms, channel_mask);
    }

    /// Run `f` against the locked APU (bank loading, inspection)
    pub fn with_apu<T>(&self, f: impl FnOnce(&mut Apu) -> T) -> T {
        f(&mut self.apu.lock())
    }

    /// Render `frame_count` stereo frames into the ring, blocking while the
    /// ring is full until everything is written
    pub fn pump_blocking(&self, frame_count: usize) {
        let samples = self.render(frame_count);
        let mut remaining = &samples[..];

        while !remaining.is_empty() {
            let written = self.buffer.lock().write(remaining);
            if written == 0 {
                // Ring is full, let the consumer drain
                std::thread::sleep(std::time::Duration::from_micros(BUFFER_BACKOFF_MICROS));
            } else {
                remaining = &remaining[written..];
            }
        }
    }

    /// Render at most `frame_count` frames without blocking
    ///
    /// Renders only as much as currently fits in the ring and returns the
    /// number of frames written.
    pub fn pump_nonblocking(&self, frame_count: usize) -> usize {
        let writable_frames = self.buffer.lock().available_write() / 2;
        let count = frame_count.min(writable_frames);
        if count == 0 {
            return 0;
        }

        let samples = self.render(count);
        self.buffer.lock().write(&samples) / 2
    }

    fn render(&self, frame_count: usize) -> Vec<i16> {
        let mut apu = self.apu.lock();
        let mut samples = Vec::with_capacity(frame_count * 2);
        for _ in 0..frame_count {
            let sample = apu.next_sample();
            samples.push(sample);
            samples.push(sample);
        }
        samples
    }

    /// Ring fill level, 0.0 to 1.0
    pub fn fill_percentage(&self) -> f32 {
        self.buffer.lock().fill_percentage()
    }

    /// Ring buffer handle for audio device integration
    pub fn get_buffer(&self) -> Arc<Mutex<RingBuffer>> {
        Arc::clone(&self.buffer)
    }

    /// Stream configuration
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Mark the session as playing
    pub fn play(&self) {
        *self.state.lock() = PlaybackState::Playing;
    }

    /// Suspend output, keeping channel state
    pub fn pause(&self) {
        let mut state = self.state.lock();
        if *state == PlaybackState::Playing {
            *state = PlaybackState::Paused;
        }
    }

    /// Stop the session and drop buffered audio
    pub fn stop(&self) {
        *self.state.lock() = PlaybackState::Stopped;
        self.buffer.lock().flush();
    }

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        *self.state.lock()
    }
}
