//! Per-channel sample synthesis
//!
//! One call per output sample per channel: advance the note offset, resolve
//! the active note, evaluate the waveform at the oscillator phase and emit
//! a signed 16-bit sample. The master channel additionally drives the music
//! sequencer before synthesizing, keeping every timing domain (note offset,
//! phase, song offset, fade volume) on the same sample clock.

use super::channel::NO_SFX;
use super::sequencer::SAMPLES_PER_TICK;
use super::Apu;
use crate::synth::key_to_freq;
use crate::tracker::SAMPLE_RATE;

impl Apu {
    /// Synthesize one sample for `channel`
    ///
    /// Returns 0 for idle channels. The two-phase step — advance the
    /// sequencer if this channel is the master, then synthesize — is kept
    /// explicit so sequencing can be exercised with a stub waveform.
    pub fn sample_channel(&mut self, channel: usize) -> i16 {
        if channel as i32 == self.music.master && self.music.is_playing() {
            self.advance_music();
        }

        let index = self.channels[channel].sfx_id;
        if !(0..64).contains(&index) {
            // No (valid) sfx here
            return 0;
        }
        let sfx = self.sfx_bank[index as usize];

        // Speed must be 1..=255, otherwise the sfx is invalid
        let speed = (sfx.speed as i32).max(1);

        let offset = self.channels[channel].offset;
        let phase = self.channels[channel].phase;

        let offset_per_second = SAMPLE_RATE as f32 / (SAMPLES_PER_TICK * speed as f32);
        let mut next_offset = offset + offset_per_second / SAMPLE_RATE as f32;

        // Loop wraparound captures the offset once it enters the range
        let loop_range = sfx.loop_end as f32 - sfx.loop_start as f32;
        if loop_range > 0.0 && next_offset >= sfx.loop_start as f32 && self.channels[channel].can_loop
        {
            next_offset = (next_offset - sfx.loop_start as f32) % loop_range + sfx.loop_start as f32;
        }

        let note_idx = offset.floor() as usize;
        let next_note_idx = next_offset.floor() as usize;

        let note = sfx.notes[note_idx];
        let volume = note.volume as f32 / 7.0;

        if volume == 0.0 {
            // Silent note: no synthesis, but playback state still advances
            self.advance_offset(channel, &sfx, next_offset, note_idx, next_note_idx);
            return 0;
        }

        let freq = key_to_freq(note.key);
        let wave = (self.wave_fn)(note.waveform, phase);

        // Near-full-scale constant; truncation keeps a unit waveform just
        // inside i16 range
        let sample = (32767.99 * volume * wave) as i16;

        self.channels[channel].phase = phase + freq / SAMPLE_RATE as f32;
        self.advance_offset(channel, &sfx, next_offset, note_idx, next_note_idx);

        sample
    }

    /// Commit the new offset and handle end-of-sfx / note-boundary bookkeeping
    fn advance_offset(
        &mut self,
        channel: usize,
        sfx: &crate::tracker::SoundEffect,
        next_offset: f32,
        note_idx: usize,
        next_note_idx: usize,
    ) {
        let ch = &mut self.channels[channel];
        ch.offset = next_offset;

        if next_offset >= 32.0 {
            ch.sfx_id = NO_SFX;
        } else if next_note_idx != note_idx {
            ch.prev_key = sfx.notes[note_idx].key;
            ch.prev_volume = sfx.notes[note_idx].volume as f32 / 7.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{Note, SoundEffect, NOTES_PER_SFX};
    use approx::assert_relative_eq;

    fn full_scale(_id: u8, _phase: f32) -> f32 {
        1.0
    }

    fn make_sfx(speed: u8, volume: u8) -> SoundEffect {
        let mut sfx = SoundEffect::default();
        for note in sfx.notes.iter_mut() {
            *note = Note::new(33, volume, 0);
        }
        sfx.speed = speed;
        sfx
    }

    /// Samples for one full pass over the 32 note slots at `speed`, with a
    /// little slack for float accumulation
    fn samples_per_sfx(speed: u32) -> usize {
        (NOTES_PER_SFX as u32 * SAMPLES_PER_TICK as u32 * speed) as usize + 64
    }

    #[test]
    fn test_idle_channel_is_silent_and_unchanged() {
        let mut apu = Apu::with_waveform(full_scale);
        let before = *apu.channel(0);
        assert_eq!(apu.sample_channel(0), 0);
        assert_eq!(*apu.channel(0), before);
    }

    #[test]
    fn test_full_scale_sample_value() {
        let mut apu = Apu::with_waveform(full_scale);
        apu.set_sfx(0, make_sfx(1, 7));
        apu.sfx(0, 0, 0);

        // volume 7/7 on a unit waveform hits the near-full-scale constant
        assert_eq!(apu.sample_channel(0), 32767);
    }

    #[test]
    fn test_volume_scales_linearly() {
        let mut apu = Apu::with_waveform(full_scale);
        apu.set_sfx(0, make_sfx(1, 4));
        apu.sfx(0, 0, 0);

        let expected = (32767.99f32 * 4.0 / 7.0) as i16;
        assert_eq!(apu.sample_channel(0), expected);
    }

    #[test]
    fn test_phase_advances_by_freq_over_sample_rate() {
        let mut apu = Apu::with_waveform(full_scale);
        apu.set_sfx(0, make_sfx(4, 7));
        apu.sfx(0, 0, 0);

        apu.sample_channel(0);
        assert_relative_eq!(
            apu.channel(0).phase,
            key_to_freq(33) / SAMPLE_RATE as f32,
            max_relative = 1e-6
        );
    }

    #[test]
    fn test_speed_zero_behaves_like_speed_one() {
        let mut apu_a = Apu::with_waveform(full_scale);
        let mut apu_b = Apu::with_waveform(full_scale);
        apu_a.set_sfx(0, make_sfx(0, 7));
        apu_b.set_sfx(0, make_sfx(1, 7));
        apu_a.sfx(0, 0, 0);
        apu_b.sfx(0, 0, 0);

        for _ in 0..500 {
            assert_eq!(apu_a.sample_channel(0), apu_b.sample_channel(0));
        }
        assert_eq!(apu_a.channel(0).offset, apu_b.channel(0).offset);
    }

    #[test]
    fn test_channel_deactivates_at_end_of_sfx() {
        let mut apu = Apu::with_waveform(full_scale);
        apu.set_sfx(0, make_sfx(1, 7));
        apu.sfx(0, 0, 0);

        for _ in 0..samples_per_sfx(1) {
            apu.sample_channel(0);
            if !apu.channel(0).is_active() {
                break;
            }
        }
        assert_eq!(apu.channel(0).sfx_id, NO_SFX);
        assert!(apu.channel(0).offset >= 32.0);
    }

    #[test]
    fn test_silent_notes_still_advance_and_deactivate() {
        let mut apu = Apu::with_waveform(full_scale);
        apu.set_sfx(0, make_sfx(1, 0));
        apu.sfx(0, 0, 0);

        let mut produced = 0i64;
        for _ in 0..samples_per_sfx(1) {
            produced += apu.sample_channel(0).abs() as i64;
            if !apu.channel(0).is_active() {
                break;
            }
        }
        assert_eq!(produced, 0);
        assert_eq!(apu.channel(0).sfx_id, NO_SFX);
    }

    #[test]
    fn test_loop_keeps_channel_alive_and_offset_confined() {
        let mut apu = Apu::with_waveform(full_scale);
        let mut sfx = make_sfx(1, 7);
        sfx.loop_start = 4;
        sfx.loop_end = 8;
        apu.set_sfx(0, sfx);
        apu.sfx(0, 0, 0);

        for _ in 0..samples_per_sfx(1) * 4 {
            apu.sample_channel(0);
        }
        assert!(apu.channel(0).is_active());
        let offset = apu.channel(0).offset;
        assert!((4.0..8.0).contains(&offset), "offset {} escaped loop", offset);
    }

    #[test]
    fn test_stop_loop_lets_sfx_run_out() {
        let mut apu = Apu::with_waveform(full_scale);
        let mut sfx = make_sfx(1, 7);
        sfx.loop_start = 4;
        sfx.loop_end = 8;
        apu.set_sfx(0, sfx);
        apu.sfx(0, 0, 0);

        for _ in 0..1000 {
            apu.sample_channel(0);
        }
        assert!(apu.channel(0).is_active());

        apu.sfx(-2, 0, 0);
        for _ in 0..samples_per_sfx(1) {
            apu.sample_channel(0);
        }
        assert_eq!(apu.channel(0).sfx_id, NO_SFX);
    }

    #[test]
    fn test_prev_note_snapshot_at_boundary() {
        let mut apu = Apu::with_waveform(full_scale);
        let mut sfx = make_sfx(1, 7);
        sfx.notes[0] = Note::new(40, 6, 0);
        apu.set_sfx(0, sfx);
        apu.sfx(0, 0, 0);

        // Run until just past the first note boundary
        while apu.channel(0).offset < 1.0 {
            apu.sample_channel(0);
        }
        assert_eq!(apu.channel(0).prev_key, 40);
        assert_relative_eq!(apu.channel(0).prev_volume, 6.0 / 7.0);
    }
}
