//! Music sequencer: pattern activation and per-sample song advancement
//!
//! The sequencer has no clock of its own. It is driven from the synthesis
//! path: the channel designated as master advances the song position by one
//! sample step before synthesizing its own output, so the music offset, the
//! fade volume and every voice's note offset move on the same sample clock.

use super::channel::NO_SFX;
use super::Apu;
use crate::tracker::{PatternFlags, CHANNEL_COUNT, SAMPLE_RATE, SONG_COUNT};

// The console exports instruments as 22050 Hz WAV data with 183 samples per
// speed unit per note; note offsets advance accordingly.
pub(super) const SAMPLES_PER_TICK: f32 = 183.0;

impl Apu {
    /// Activate `pattern` (or deactivate sequencing when out of range)
    ///
    /// Selects the master channel (the enabled slot whose sfx has the
    /// smallest speed, first match winning ties) and retriggers the music
    /// voices on every masked-in channel with an enabled slot.
    pub(super) fn set_music_pattern(&mut self, pattern: i32) {
        self.music.offset = 0.0;
        self.music.master = -1;
        self.music.speed = -1;

        // The original indexes the song table blindly here; anything outside
        // the bank deactivates sequencing instead.
        if !(0..SONG_COUNT as i32).contains(&pattern) {
            self.music.pattern = NO_SFX;
            return;
        }
        self.music.pattern = pattern;

        let song = self.song_bank[pattern as usize];

        // The music speed is the speed of the fastest sfx among enabled
        // slots; its channel becomes the master
        for i in 0..CHANNEL_COUNT {
            let Some(n) = song.sfx_slot(i) else {
                continue;
            };
            let sfx_speed = self.sfx_bank[n as usize].speed as i32;
            if self.music.master == -1 || self.music.speed > sfx_speed {
                self.music.master = i as i32;
                self.music.speed = sfx_speed.max(1);
            }
        }

        // Retrigger the music voices on the active channels
        for i in 0..CHANNEL_COUNT {
            if self.music.mask & (1 << i) == 0 {
                continue;
            }
            let Some(n) = song.sfx_slot(i) else {
                continue;
            };
            // Music notes never individually loop; looping is a
            // pattern-level concept
            self.channels[i].trigger(n as i32, 0.0, false, true);
        }
    }

    /// Advance the song position by one sample step
    ///
    /// Called from the synthesis path for the master channel only, while a
    /// pattern is active. Handles fade volume, fade-out termination, and the
    /// transition to the next pattern when the current one's 32 note slots
    /// are exhausted.
    pub(super) fn advance_music(&mut self) {
        let offset_per_second = SAMPLE_RATE as f32 / (SAMPLES_PER_TICK * self.music.speed as f32);
        self.music.offset += offset_per_second / SAMPLE_RATE as f32;

        self.music.volume += self.music.volume_step / SAMPLE_RATE as f32;
        self.music.volume = self.music.volume.clamp(0.0, 1.0);

        if self.music.volume_step < 0.0 && self.music.volume <= 0.0 {
            // Fade out finished: stop the song and silence its voices
            for ch in self.channels.iter_mut() {
                if ch.is_music {
                    ch.sfx_id = NO_SFX;
                }
            }
            self.music.pattern = NO_SFX;
        } else if self.music.offset >= 32.0 {
            let flags = self.song_bank[self.music.pattern as usize].flags;
            let mut next_pattern = self.music.pattern + 1;
            let mut next_count = self.music.count + 1;

            if flags.contains(PatternFlags::STOP) {
                next_pattern = NO_SFX;
                next_count = self.music.count;
            } else if flags.contains(PatternFlags::LOOP) {
                // Rewind to the nearest START-flagged pattern, never past
                // the start of the bank
                loop {
                    next_pattern -= 1;
                    if next_pattern <= 0
                        || self.song_bank[next_pattern as usize]
                            .flags
                            .contains(PatternFlags::START)
                    {
                        break;
                    }
                }
            }

            self.music.count = next_count;
            self.set_music_pattern(next_pattern);
        }
    }
}
