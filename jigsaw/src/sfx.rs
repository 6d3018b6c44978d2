use std::time::Duration;

use engine::audio::{ToneCue, Waveform};
use rodio::{OutputStream, OutputStreamHandle, Sink};

use crate::settings::AudioSettings;

/// Shared SFX volume constants (0.0..=1.0), scaled by the player's audio settings.
pub const SNAP_SFX_VOLUME: f32 = 0.35;
pub const WIN_SFX_VOLUME: f32 = 0.5;

const SAMPLE_RATE: u32 = 44_100;

/// Sounds the session asks the app to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEvent {
    /// A drop merged at least one pair of groups.
    Snap,
    /// The last merge completed the picture.
    Win,
}

impl SoundEvent {
    pub fn volume(self) -> f32 {
        match self {
            SoundEvent::Snap => SNAP_SFX_VOLUME,
            SoundEvent::Win => WIN_SFX_VOLUME,
        }
    }

    pub fn cue(self) -> ToneCue {
        match self {
            SoundEvent::Snap => ToneCue::new([880.0_f32, 1318.5], Duration::from_millis(45))
                .with_waveform(Waveform::Triangle)
                .with_envelope(0.05, 0.45)
                .with_gain(1.0),
            SoundEvent::Win => {
                ToneCue::new([523.25_f32, 659.25, 783.99, 1046.5], Duration::from_millis(140))
                    .with_harmonic_mix(0.3)
                    .with_envelope(0.08, 0.35)
                    .with_gain(1.0)
            }
        }
    }
}

/// Mono rodio source pulling samples from a `ToneCue`.
#[derive(Debug, Clone)]
struct CueSource {
    cue: ToneCue,
    frame: u64,
    len: u64,
}

impl CueSource {
    fn new(cue: ToneCue) -> Self {
        let len = cue.len_frames(SAMPLE_RATE);
        Self { cue, frame: 0, len }
    }
}

impl Iterator for CueSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.frame >= self.len {
            return None;
        }
        let sample = self.cue.sample_at(self.frame, SAMPLE_RATE);
        self.frame += 1;
        Some(sample)
    }
}

impl rodio::Source for CueSource {
    fn current_frame_len(&self) -> Option<usize> {
        Some((self.len - self.frame) as usize)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(self.cue.duration())
    }
}

pub struct Sfx {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    audio: AudioSettings,
}

impl Sfx {
    pub fn new(audio: AudioSettings) -> Result<Self, Box<dyn std::error::Error>> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
            audio,
        })
    }

    /// Opens the default output device, or returns `None` (logged) so the game runs silently.
    pub fn try_open(audio: AudioSettings) -> Option<Self> {
        match Self::new(audio) {
            Ok(sfx) => Some(sfx),
            Err(err) => {
                log::warn!("audio unavailable, running silently: {err}");
                None
            }
        }
    }

    pub fn play(&self, event: SoundEvent) {
        let volume = event.volume() * self.audio.effective_sfx_gain();
        if volume <= 0.0 {
            return;
        }
        let Ok(sink) = Sink::try_new(&self.handle) else {
            return;
        };
        sink.set_volume(volume);
        sink.append(CueSource::new(event.cue()));
        sink.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volumes_are_in_range() {
        for event in [SoundEvent::Snap, SoundEvent::Win] {
            assert!((0.0..=1.0).contains(&event.volume()));
        }
    }

    #[test]
    fn cue_source_ends_after_the_cue() {
        let source = CueSource::new(SoundEvent::Snap.cue());
        let expected = SoundEvent::Snap.cue().len_frames(SAMPLE_RATE) as usize;
        let samples: Vec<f32> = source.collect();
        assert_eq!(samples.len(), expected);
        assert!(samples.iter().any(|s| s.abs() > 0.01));
        assert!(samples.iter().all(|s| s.abs() <= 2.0));
    }

    #[test]
    fn win_cue_is_longer_than_snap() {
        assert!(SoundEvent::Win.cue().duration() > SoundEvent::Snap.cue().duration());
    }
}
