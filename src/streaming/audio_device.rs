//! Audio device integration using rodio
//!
//! Plays interleaved stereo samples from the streaming ring buffer on the
//! system's default output device. Buffer underruns play silence so the
//! stream stays alive while the producer catches up.

use super::RingBuffer;
use crate::Result;
use parking_lot::Mutex;
use rodio::{OutputStream, Sink, Source};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Audio source that reads from the ring buffer
struct RingBufferSource {
    ring_buffer: Arc<Mutex<RingBuffer>>,
    sample_rate: u32,
    channels: u16,
    finished: Arc<AtomicBool>,
    /// Internal batch buffer, refilled under one lock to limit contention
    buffer: Vec<i16>,
    buffer_pos: usize,
}

impl RingBufferSource {
    fn new(
        ring_buffer: Arc<Mutex<RingBuffer>>,
        sample_rate: u32,
        channels: u16,
        finished: Arc<AtomicBool>,
    ) -> Self {
        RingBufferSource {
            ring_buffer,
            sample_rate,
            channels,
            finished,
            buffer: vec![0; 2048],
            buffer_pos: 2048, // Force a batch read on first pull
        }
    }
}

impl Source for RingBufferSource {
    fn current_frame_len(&self) -> Option<usize> {
        let available = self.ring_buffer.lock().available_read();
        if available > 0 {
            Some(available)
        } else {
            Some(2048)
        }
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

impl Iterator for RingBufferSource {
    type Item = i16;

    fn next(&mut self) -> Option<i16> {
        if self.finished.load(Ordering::Relaxed) {
            return None;
        }

        if self.buffer_pos >= self.buffer.len() {
            let read = self.ring_buffer.lock().read(&mut self.buffer);
            self.buffer_pos = 0;
            if read == 0 {
                // Underrun: feed silence instead of ending the stream
                self.buffer.fill(0);
            } else if read < self.buffer.len() {
                self.buffer[read..].fill(0);
            }
        }

        let sample = self.buffer[self.buffer_pos];
        self.buffer_pos += 1;
        Some(sample)
    }
}

/// Audio playback device using rodio
pub struct AudioDevice {
    _stream: OutputStream,
    sink: Sink,
    finished: Arc<AtomicBool>,
}

impl AudioDevice {
    /// Open the default output device and start draining `ring_buffer`
    pub fn new(
        sample_rate: u32,
        channels: u16,
        ring_buffer: Arc<Mutex<RingBuffer>>,
    ) -> Result<Self> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| format!("Failed to create audio stream: {}", e))?;

        let sink = Sink::try_new(&stream_handle)
            .map_err(|e| format!("Failed to create audio sink: {}", e))?;

        let finished = Arc::new(AtomicBool::new(false));
        let source =
            RingBufferSource::new(ring_buffer, sample_rate, channels, Arc::clone(&finished));
        sink.append(source);

        Ok(AudioDevice {
            _stream: stream,
            sink,
            finished,
        })
    }

    /// Pause playback
    pub fn pause(&self) {
        self.sink.pause();
    }

    /// Resume playback
    pub fn play(&self) {
        self.sink.play();
    }

    /// Signal that no more samples will be produced, letting the stream
    /// terminate instead of playing silence forever
    pub fn finish(&self) {
        self.finished.store(true, Ordering::Relaxed);
    }

    /// Block until the sink has drained
    pub fn wait_for_finish(&self) {
        self.sink.sleep_until_end();
    }
}

impl Drop for AudioDevice {
    fn drop(&mut self) {
        self.pause();
    }
}
