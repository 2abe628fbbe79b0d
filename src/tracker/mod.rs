//! Tracker Data Model
//!
//! The immutable instrument and song data the APU plays from: 64 sound
//! effect slots (up to 32 notes each, with a playback speed and an optional
//! loop range) and 64 song pattern rows (one sfx reference per hardware
//! channel plus start/stop/loop sequencing flags).
//!
//! The data is normally populated by the host's cartridge loader, which is
//! outside this crate. The instrument types carry serde derives so banks
//! can also be assembled from JSON fixtures in tests and tools.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Number of hardware voice channels
pub const CHANNEL_COUNT: usize = 4;
/// Number of sound effect slots in the bank
pub const SFX_COUNT: usize = 64;
/// Number of song pattern slots in the bank
pub const SONG_COUNT: usize = 64;
/// Notes per sound effect
pub const NOTES_PER_SFX: usize = 32;
/// Native output sample rate in Hz
pub const SAMPLE_RATE: u32 = 22050;

/// Bit marking a song channel slot as disabled (low 6 bits hold the sfx index)
pub const SONG_CHANNEL_OFF: u8 = 0x40;

/// A single note of a sound effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Pitch index; frequency is `440 * 2^((key - 33) / 12)` Hz
    pub key: u8,
    /// Volume 0..=7; 0 is silence, normalized by /7 at synthesis time
    pub volume: u8,
    /// Waveform id passed to the waveform generator
    pub waveform: u8,
    /// Effect id. Effects (slide, vibrato, arpeggio, ...) are not emulated;
    /// the field is carried for layout fidelity with the console format.
    pub effect: u8,
}

impl Note {
    /// Convenience constructor for the common key/volume/waveform triple
    pub fn new(key: u8, volume: u8, waveform: u8) -> Self {
        Note {
            key,
            volume,
            waveform,
            effect: 0,
        }
    }
}

/// A sound effect: an ordered run of up to 32 notes
///
/// `speed` is the number of ticks each note is held for; the console clamps
/// it to a minimum of 1 wherever it is used. Looping is active only while
/// `loop_start < loop_end` ("looping is turned off when the start index >=
/// end index" per the console manual).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundEffect {
    /// The 32 note slots
    pub notes: [Note; NOTES_PER_SFX],
    /// Ticks per note (effective minimum 1)
    pub speed: u8,
    /// First note index of the loop range
    pub loop_start: u8,
    /// One past the last note index of the loop range
    pub loop_end: u8,
}

impl Default for SoundEffect {
    fn default() -> Self {
        SoundEffect {
            notes: [Note::default(); NOTES_PER_SFX],
            speed: 1,
            loop_start: 0,
            loop_end: 0,
        }
    }
}

impl SoundEffect {
    /// True when this sfx has an active loop range
    pub fn has_loop(&self) -> bool {
        self.loop_end > self.loop_start
    }
}

bitflags! {
    /// Sequencing flags of a song pattern row
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct PatternFlags: u8 {
        /// Marks the beginning of a loop section
        const START = 0x01;
        /// Sequencing ends after this pattern
        const STOP = 0x02;
        /// Jump back to the nearest START-flagged pattern after this one
        const LOOP = 0x04;
    }
}

/// A song pattern row: one sfx reference per hardware channel plus flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Song {
    /// Per-channel sfx references; bit 0x40 disables the slot, the low
    /// 6 bits are the sfx index
    pub channels: [u8; CHANNEL_COUNT],
    /// Start/stop/loop sequencing flags
    pub flags: PatternFlags,
}

impl Song {
    /// The sfx index the given channel slot references, or `None` when the
    /// slot is disabled
    pub fn sfx_slot(&self, channel: usize) -> Option<u8> {
        let raw = self.channels[channel];
        if raw & SONG_CHANNEL_OFF != 0 {
            None
        } else {
            Some(raw & 0x3f)
        }
    }
}
