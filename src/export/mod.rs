//! WAV export of rendered APU output
//!
//! Renders a fixed number of stereo frames from an [`Apu`] and writes them
//! as a 16-bit PCM WAV file at the console's native 22050 Hz rate.

use crate::apu::Apu;
use crate::tracker::SAMPLE_RATE;
use crate::Result;
use std::path::Path;

/// Render `frame_count` interleaved stereo frames from `apu`
///
/// Returned samples alternate left/right; both carry the same mono mix.
pub fn render_frames(apu: &mut Apu, frame_count: usize) -> Vec<i16> {
    let mut samples = Vec::with_capacity(frame_count * 2);
    for _ in 0..frame_count {
        let sample = apu.next_sample();
        samples.push(sample);
        samples.push(sample);
    }
    samples
}

/// Render `frame_count` frames from `apu` straight into a WAV file
///
/// # Examples
///
/// ```no_run
/// use pico_apu::{export::render_wav, Apu};
///
/// # fn main() -> pico_apu::Result<()> {
/// let mut apu = Apu::new();
/// apu.sfx(0, -1, 0);
/// render_wav(&mut apu, 22050, "one_second.wav")?;
/// # Ok(())
/// # }
/// ```
pub fn render_wav<P: AsRef<Path>>(apu: &mut Apu, frame_count: usize, path: P) -> Result<()> {
    let samples = render_frames(apu, frame_count);
    write_wav_file(path.as_ref(), &samples)
}

/// Write interleaved stereo samples to a WAV file
fn write_wav_file(path: &Path, samples: &[i16]) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| format!("Failed to create WAV file: {}", e))?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| format!("Failed to write sample: {}", e))?;
    }

    writer
        .finalize()
        .map_err(|e| format!("Failed to finalize WAV file: {}", e))?;

    Ok(())
}
