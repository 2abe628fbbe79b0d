//! Voice and music channel state records
//!
//! Exactly four [`SfxChannel`] slots and one [`MusicState`] exist for the
//! lifetime of the APU. They are plain mutable records with fixed identity;
//! nothing here is ever reallocated, voices are reused indefinitely.

/// Sentinel for "no sfx assigned" / "music stopped"
pub const NO_SFX: i32 = -1;

/// Neutral previous-key default. Playing an instrument starting on this key
/// with the slide effect causes no audible pitch change on the console, so
/// it stands in for "no previous note".
pub const PREV_KEY_DEFAULT: u8 = 24;

/// Playback state of one hardware voice channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SfxChannel {
    /// Assigned sfx index, or [`NO_SFX`] when idle
    pub sfx_id: i32,
    /// Playback position in note units, [0, 32) while active
    pub offset: f32,
    /// Oscillator phase accumulator; unbounded, the waveform function is
    /// periodic in it
    pub phase: f32,
    /// Whether the sfx loop range may capture the offset
    pub can_loop: bool,
    /// Set when this voice is driven by the music sequencer rather than a
    /// direct sfx request
    pub is_music: bool,
    /// Key of the most recently completed note (envelope bookkeeping)
    pub prev_key: u8,
    /// Normalized volume of the most recently completed note
    pub prev_volume: f32,
}

impl SfxChannel {
    /// An idle channel slot
    pub fn idle() -> Self {
        SfxChannel {
            sfx_id: NO_SFX,
            offset: 0.0,
            phase: 0.0,
            can_loop: false,
            is_music: false,
            prev_key: PREV_KEY_DEFAULT,
            prev_volume: 0.0,
        }
    }

    /// True while a valid sfx is assigned
    pub fn is_active(&self) -> bool {
        (0..64).contains(&self.sfx_id)
    }

    /// Assign `sfx_id` and reset playback state for a fresh trigger
    pub fn trigger(&mut self, sfx_id: i32, offset: f32, can_loop: bool, is_music: bool) {
        self.sfx_id = sfx_id;
        self.offset = offset;
        self.phase = 0.0;
        self.can_loop = can_loop;
        self.is_music = is_music;
        self.prev_key = PREV_KEY_DEFAULT;
        self.prev_volume = 0.0;
    }
}

impl Default for SfxChannel {
    fn default() -> Self {
        Self::idle()
    }
}

/// State of the singleton music sequencer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MusicState {
    /// Playing pattern index, or [`NO_SFX`] when stopped
    pub pattern: i32,
    /// Song position in note units, [0, 32)
    pub offset: f32,
    /// Which of the 4 hardware channels the sequencer controls (low 4 bits)
    pub mask: u8,
    /// Current fade volume, clamped to [0, 1]
    pub volume: f32,
    /// Volume delta per second (fade in positive, fade out negative)
    pub volume_step: f32,
    /// Ticks-per-note of the fastest enabled slot (>= 1), or -1
    pub speed: i32,
    /// Channel index driving sequencer advancement, or -1
    pub master: i32,
    /// Patterns played since the song started (host-visible progress)
    pub count: i32,
}

impl MusicState {
    /// A stopped sequencer
    pub fn stopped() -> Self {
        MusicState {
            pattern: NO_SFX,
            offset: 0.0,
            mask: 0,
            volume: 0.0,
            volume_step: 0.0,
            speed: -1,
            master: -1,
            count: 0,
        }
    }

    /// True while a pattern is being sequenced
    pub fn is_playing(&self) -> bool {
        self.pattern != NO_SFX
    }
}

impl Default for MusicState {
    fn default() -> Self {
        Self::stopped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_channel_is_inactive() {
        let ch = SfxChannel::idle();
        assert!(!ch.is_active());
        assert_eq!(ch.sfx_id, NO_SFX);
    }

    #[test]
    fn test_trigger_resets_playback_state() {
        let mut ch = SfxChannel::idle();
        ch.phase = 7.5;
        ch.prev_volume = 0.9;
        ch.trigger(12, 3.0, true, false);

        assert!(ch.is_active());
        assert_eq!(ch.sfx_id, 12);
        assert_eq!(ch.offset, 3.0);
        assert_eq!(ch.phase, 0.0);
        assert!(ch.can_loop);
        assert!(!ch.is_music);
        assert_eq!(ch.prev_key, PREV_KEY_DEFAULT);
        assert_eq!(ch.prev_volume, 0.0);
    }

    #[test]
    fn test_stopped_music_is_not_playing() {
        assert!(!MusicState::stopped().is_playing());
    }
}
