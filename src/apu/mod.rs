//! Fantasy Console APU
//!
//! Emulates the console's sound generation unit: four hardware voice
//! channels playing sample-based sound effects, a music sequencer chaining
//! song patterns, and a mixer producing a 22050 Hz stereo PCM stream.
//!
//! The control surface mirrors the console's instruction set:
//! - [`Apu::sfx`] starts/stops one-shot sound effect playback,
//! - [`Apu::music`] starts/fades the music sequencer,
//! - [`Apu::fill_buffer`] renders interleaved stereo frames.
//!
//! Malformed control requests are silently ignored — the emulated hardware
//! never signals failure, and host code depends on unconditional
//! callability.

pub mod channel;
mod mixer;
mod sequencer;
mod voice;

pub use channel::{MusicState, SfxChannel, NO_SFX};

use crate::synth::{self, WaveFn};
use crate::tracker::{SoundEffect, Song, CHANNEL_COUNT, SFX_COUNT, SONG_COUNT};

/// The audio processing unit
///
/// Owns the instrument/song banks, the four voice channels and the music
/// sequencer state. All operations are synchronous state transitions over
/// this fixed-size state; nothing is heap-allocated per call.
pub struct Apu {
    sfx_bank: [SoundEffect; SFX_COUNT],
    song_bank: [Song; SONG_COUNT],
    channels: [SfxChannel; CHANNEL_COUNT],
    music: MusicState,
    wave_fn: WaveFn,
}

impl Apu {
    /// Create an APU with silent banks and the built-in waveform generator
    pub fn new() -> Self {
        Self::with_waveform(synth::waveform)
    }

    /// Create an APU evaluating waveforms through `wave_fn`
    ///
    /// Used to substitute alternative waveform tables, or constant stubs in
    /// tests that check sequencing independently of synthesis.
    pub fn with_waveform(wave_fn: WaveFn) -> Self {
        Apu {
            sfx_bank: [SoundEffect::default(); SFX_COUNT],
            song_bank: [Song::default(); SONG_COUNT],
            channels: [SfxChannel::idle(); CHANNEL_COUNT],
            music: MusicState::stopped(),
            wave_fn,
        }
    }

    /// Load a sound effect into bank slot `index`
    ///
    /// Out-of-range indices are ignored, like every other malformed request.
    pub fn set_sfx(&mut self, index: usize, sfx: SoundEffect) {
        if index < SFX_COUNT {
            self.sfx_bank[index] = sfx;
        }
    }

    /// Load a song pattern into bank slot `index`
    pub fn set_song(&mut self, index: usize, song: Song) {
        if index < SONG_COUNT {
            self.song_bank[index] = song;
        }
    }

    /// Sound effect in bank slot `index`
    pub fn sfx_at(&self, index: usize) -> &SoundEffect {
        &self.sfx_bank[index]
    }

    /// Song pattern in bank slot `index`
    pub fn song_at(&self, index: usize) -> &Song {
        &self.song_bank[index]
    }

    /// Snapshot of one voice channel (host `stat()`-style inspection)
    pub fn channel(&self, index: usize) -> &SfxChannel {
        &self.channels[index]
    }

    /// Snapshot of the music sequencer state
    pub fn music_state(&self) -> &MusicState {
        &self.music
    }

    /// Pattern currently being sequenced, or -1
    pub fn playing_pattern(&self) -> i32 {
        self.music.pattern
    }

    /// Number of patterns played since the song started
    pub fn music_count(&self) -> i32 {
        self.music.count
    }

    /// Start, stop or unloop a sound effect (console `sfx()` call)
    ///
    /// * `n` — sfx index to play, `-1` to stop `channel`, `-2` to clear the
    ///   loop flag of `channel`
    /// * `channel` — target channel 0..=3, or `-1` to let the allocator pick
    /// * `offset` — note index to start from, 0..=31
    ///
    /// Channel selection with `channel == -1` takes the first channel that
    /// is idle or already playing `n`; failing that it evicts the channel
    /// with the numerically smallest sfx id. Any other channel playing `n`
    /// is stopped, so a given sfx never plays twice concurrently.
    ///
    /// Out-of-range arguments make the whole call a no-op. Stop and unloop
    /// requests without an explicit channel are also no-ops; the hardware
    /// has no "stop everything" form of this call.
    pub fn sfx(&mut self, n: i32, channel: i32, offset: i32) {
        if !(-2..=63).contains(&n) || !(-1..=3).contains(&channel) || offset > 31 {
            return;
        }

        if n == -1 {
            // Stop the addressed channel
            if channel != -1 {
                self.channels[channel as usize].sfx_id = NO_SFX;
            }
        } else if n == -2 {
            // Let the addressed channel run off the end of its loop range
            if channel != -1 {
                self.channels[channel as usize].can_loop = false;
            }
        } else {
            let mut channel = channel;

            // First pass: a free channel, or one already playing this sfx
            // (the console forcibly reuses that one)
            if channel == -1 {
                for (i, ch) in self.channels.iter().enumerate() {
                    if ch.sfx_id == NO_SFX || ch.sfx_id == n {
                        channel = i as i32;
                        break;
                    }
                }
            }

            // Second pass: evict the lowest-numbered playing sfx
            if channel == -1 {
                for i in 0..CHANNEL_COUNT as i32 {
                    if channel == -1
                        || self.channels[i as usize].sfx_id
                            < self.channels[channel as usize].sfx_id
                    {
                        channel = i;
                    }
                }
            }

            // Stop any other channel playing the same sfx
            for ch in self.channels.iter_mut() {
                if ch.sfx_id == n {
                    ch.sfx_id = NO_SFX;
                }
            }

            self.channels[channel as usize].trigger(n, offset.max(0) as f32, true, false);
        }
    }

    /// Start or fade out the music sequencer (console `music()` call)
    ///
    /// * `pattern` — pattern index to start from, or `-1` to begin a fade
    ///   out of the playing song (`fade_len_ms <= 0` silences it on the
    ///   next processed sample)
    /// * `fade_len_ms` — fade-in length when starting, fade-out length when
    ///   stopping, in milliseconds
    /// * `channel_mask` — low 4 bits select which hardware channels the
    ///   sequencer may use; 0 means all of them
    pub fn music(&mut self, pattern: i32, fade_len_ms: i32, channel_mask: i32) {
        if !(-1..=63).contains(&pattern) {
            return;
        }

        if pattern == -1 {
            // Music stops once the fade out completes
            self.music.volume_step = if fade_len_ms <= 0 {
                -f32::MAX
            } else {
                -self.music.volume * (1000.0 / fade_len_ms as f32)
            };
            return;
        }

        self.music.count = 0;
        self.music.mask = if channel_mask != 0 {
            (channel_mask & 0xf) as u8
        } else {
            0xf
        };

        self.music.volume = 1.0;
        self.music.volume_step = 0.0;
        if fade_len_ms > 0 {
            self.music.volume = 0.0;
            self.music.volume_step = 1000.0 / fade_len_ms as f32;
        }

        self.set_music_pattern(pattern);
    }
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}
