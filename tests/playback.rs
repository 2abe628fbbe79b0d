//! End-to-end playback tests: bank setup, sequencing and mixing through the
//! public buffer-fill surface.

use pico_apu::tracker::{SONG_CHANNEL_OFF, SONG_COUNT};
use pico_apu::{Apu, Note, PatternFlags, SoundEffect, Song, SAMPLE_RATE};

fn lead_sfx(speed: u8) -> SoundEffect {
    let mut sfx = SoundEffect::default();
    for (i, note) in sfx.notes.iter_mut().enumerate() {
        *note = Note::new(24 + (i % 12) as u8, 5, 3);
    }
    sfx.speed = speed;
    sfx
}

fn two_pattern_song() -> Apu {
    let mut apu = Apu::new();
    apu.set_sfx(0, lead_sfx(2));
    apu.set_sfx(1, lead_sfx(4));

    apu.set_song(
        0,
        Song {
            channels: [0, 1, SONG_CHANNEL_OFF, SONG_CHANNEL_OFF],
            flags: PatternFlags::empty(),
        },
    );
    apu.set_song(
        1,
        Song {
            channels: [0, SONG_CHANNEL_OFF, SONG_CHANNEL_OFF, SONG_CHANNEL_OFF],
            flags: PatternFlags::STOP,
        },
    );
    apu
}

/// Samples for one full 32-slot pattern at the given master speed, with
/// slack for float accumulation in the offset
fn pattern_len(speed: usize) -> usize {
    32 * 183 * speed + 64
}

#[test]
fn song_plays_through_buffer_fill_and_stops() {
    let mut apu = two_pattern_song();
    apu.music(0, 0, 0);
    assert_eq!(apu.playing_pattern(), 0);
    assert_eq!(apu.music_state().master, 0);

    // First pattern: audible output, master speed 2
    let mut frames = vec![0u32; pattern_len(2)];
    apu.fill_buffer(&mut frames);
    assert!(frames.iter().any(|&f| f != 0));
    assert_eq!(apu.playing_pattern(), 1);
    assert_eq!(apu.music_count(), 1);

    // Second pattern carries the STOP flag: sequencing ends after it
    let mut frames = vec![0u32; pattern_len(2)];
    apu.fill_buffer(&mut frames);
    assert_eq!(apu.playing_pattern(), -1);
    assert_eq!(apu.music_count(), 1);

    // Everything idle afterwards: pure silence
    let mut tail = vec![0u32; 512];
    apu.fill_buffer(&mut tail);
    assert!(tail.iter().all(|&f| f == 0));
}

#[test]
fn rendering_is_deterministic() {
    let render = || {
        let mut apu = two_pattern_song();
        apu.music(0, 0, 0);
        let mut frames = vec![0u32; 4096];
        apu.fill_buffer(&mut frames);
        frames
    };
    assert_eq!(render(), render());
}

#[test]
fn sfx_and_music_share_the_mix() {
    let mut apu = two_pattern_song();
    let mut blip = SoundEffect::default();
    blip.notes[0] = Note::new(45, 7, 0);
    blip.speed = 32;
    apu.set_sfx(5, blip);

    apu.music(0, 0, 0b0011);
    apu.sfx(5, 3, 0);

    let mut frames = vec![0u32; 256];
    apu.fill_buffer(&mut frames);

    // Channel 3 plays the one-shot while channels 0/1 carry the song
    assert_eq!(apu.channel(3).sfx_id, 5);
    assert!(apu.channel(0).is_music);
    assert!(frames.iter().any(|&f| f != 0));
}

#[test]
fn fade_out_over_buffer_fills_goes_silent() {
    let mut apu = two_pattern_song();
    // Loop the bank end so the song would otherwise play forever
    let mut song = *apu.song_at(0);
    song.flags = PatternFlags::START;
    apu.set_song(0, song);
    let mut song = *apu.song_at(1);
    song.flags = PatternFlags::LOOP;
    apu.set_song(1, song);

    apu.music(0, 0, 0);
    let mut frames = vec![0u32; 1024];
    apu.fill_buffer(&mut frames);
    assert_eq!(apu.playing_pattern(), 0);

    // Quarter-second fade: gone well within a second of audio
    apu.music(-1, 250, 0);
    let mut frames = vec![0u32; SAMPLE_RATE as usize];
    apu.fill_buffer(&mut frames);
    assert_eq!(apu.playing_pattern(), -1);
    assert_eq!(apu.music_state().volume, 0.0);
}

#[test]
fn bank_indices_stay_in_range() {
    let mut apu = two_pattern_song();
    // Start on the last pattern with no flags: the chain runs off the end
    // of the bank and must deactivate rather than wrap or panic
    apu.set_song(
        SONG_COUNT - 1,
        Song {
            channels: [0, SONG_CHANNEL_OFF, SONG_CHANNEL_OFF, SONG_CHANNEL_OFF],
            flags: PatternFlags::empty(),
        },
    );
    apu.music(SONG_COUNT as i32 - 1, 0, 0);

    let mut frames = vec![0u32; pattern_len(2)];
    apu.fill_buffer(&mut frames);
    assert_eq!(apu.playing_pattern(), -1);
}
