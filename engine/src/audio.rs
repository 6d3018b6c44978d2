//! Small synthesizer for UI sound cues.
//!
//! Output devices are not handled here; callers wrap a `ToneCue` in whatever sink they play
//! through and pull samples with `sample_at`.

use std::f32::consts::TAU;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
}

/// A short sequence of notes played back to back, each with its own attack/release envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneCue {
    notes_hz: Vec<f32>,
    note_len: Duration,
    waveform: Waveform,
    harmonic_mix: f32,
    gain: f32,
    attack: f32,
    release: f32,
}

impl ToneCue {
    pub fn new(notes_hz: impl Into<Vec<f32>>, note_len: Duration) -> Self {
        Self {
            notes_hz: notes_hz.into(),
            note_len,
            waveform: Waveform::Sine,
            harmonic_mix: 0.0,
            gain: 0.3,
            attack: 0.05,
            release: 0.4,
        }
    }

    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn with_harmonic_mix(mut self, harmonic_mix: f32) -> Self {
        self.harmonic_mix = harmonic_mix.clamp(0.0, 1.0);
        self
    }

    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain.max(0.0);
        self
    }

    /// Attack and release as fractions of a note, each clamped to `0.0..=0.49`.
    pub fn with_envelope(mut self, attack: f32, release: f32) -> Self {
        self.attack = attack.clamp(0.0, 0.49);
        self.release = release.clamp(0.0, 0.49);
        self
    }

    fn note_frames(&self, sample_rate: u32) -> u64 {
        ((self.note_len.as_secs_f64() * sample_rate as f64).round() as u64).max(1)
    }

    pub fn len_frames(&self, sample_rate: u32) -> u64 {
        self.note_frames(sample_rate) * self.notes_hz.len() as u64
    }

    pub fn duration(&self) -> Duration {
        self.note_len * self.notes_hz.len() as u32
    }

    /// Mono sample for frame `frame`; silent once the cue has finished.
    pub fn sample_at(&self, frame: u64, sample_rate: u32) -> f32 {
        let sample_rate = sample_rate.max(1);
        let note_frames = self.note_frames(sample_rate);
        let index = (frame / note_frames) as usize;
        let Some(&freq_hz) = self.notes_hz.get(index) else {
            return 0.0;
        };

        let pos_in_note = frame % note_frames;
        let t = frame as f32 / sample_rate as f32;
        let phase = (TAU * freq_hz * t) % TAU;
        let env = envelope(
            pos_in_note as f32 / note_frames as f32,
            self.attack,
            self.release,
        );

        let base = waveform_sample(self.waveform, phase);
        let harmonic = waveform_sample(self.waveform, (phase * 2.0) % TAU) * self.harmonic_mix;
        (base + harmonic) * self.gain * env
    }
}

fn waveform_sample(wave: Waveform, phase: f32) -> f32 {
    match wave {
        Waveform::Sine => phase.sin(),
        Waveform::Triangle => (2.0 / std::f32::consts::PI) * phase.sin().asin(),
        Waveform::Square => {
            if phase.sin() >= 0.0 {
                1.0
            } else {
                -1.0
            }
        }
    }
}

fn envelope(in_note: f32, attack: f32, release: f32) -> f32 {
    if attack > 0.0 && in_note < attack {
        return in_note / attack;
    }
    if release > 0.0 && in_note > (1.0 - release) {
        return ((1.0 - in_note) / release).max(0.0);
    }
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cue_length_covers_every_note() {
        let cue = ToneCue::new(vec![440.0, 660.0], Duration::from_millis(50));
        assert_eq!(cue.len_frames(48_000), 4_800);
        assert_eq!(cue.duration(), Duration::from_millis(100));
    }

    #[test]
    fn cue_is_silent_after_its_last_note() {
        let cue = ToneCue::new(vec![440.0], Duration::from_millis(10));
        let end = cue.len_frames(48_000);
        assert_eq!(cue.sample_at(end, 48_000), 0.0);
        assert_eq!(cue.sample_at(end + 1_000, 48_000), 0.0);
    }

    #[test]
    fn envelope_starts_silent_and_stays_within_gain() {
        let cue = ToneCue::new(vec![440.0], Duration::from_millis(20))
            .with_waveform(Waveform::Square)
            .with_gain(0.5);
        assert_eq!(cue.sample_at(0, 48_000), 0.0);
        for frame in 0..cue.len_frames(48_000) {
            assert!(cue.sample_at(frame, 48_000).abs() <= 0.5 + 1e-6);
        }
    }
}
