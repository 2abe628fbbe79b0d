//! Four-channel downmix and stereo buffer fill
//!
//! Each output slot sums the four voice samples, attenuated by a 3-bit
//! right shift per channel so four simultaneous full-scale voices cannot
//! clip the 16-bit accumulator, and duplicates the mono result into both
//! halves of a 32-bit interleaved stereo frame.

use super::Apu;
use crate::tracker::CHANNEL_COUNT;

impl Apu {
    /// Mix one mono output sample across all four channels
    ///
    /// This also drives the music sequencer, since the master channel
    /// advances the song as part of its synthesis step.
    pub fn next_sample(&mut self) -> i16 {
        let mut sample: i16 = 0;
        for c in 0..CHANNEL_COUNT {
            // Shift before summing to keep headroom for 4 voices
            sample += self.sample_channel(c) >> 3;
        }
        sample
    }

    /// Pack a mono sample into an interleaved stereo frame (left == right)
    pub fn frame_from_sample(sample: i16) -> u32 {
        ((sample as u32) << 16) | (sample as u16 as u32)
    }

    /// Render `frames.len()` stereo frames into `frames`
    ///
    /// Each frame holds the same 16-bit sample in both channels. An empty
    /// slice renders nothing and leaves all playback state untouched.
    pub fn fill_buffer(&mut self, frames: &mut [u32]) {
        for frame in frames.iter_mut() {
            *frame = Self::frame_from_sample(self.next_sample());
        }
    }
}
