//! UI cue recipes and shared playback volumes (0.0..=1.0).
//!
//! Cues are short oscillator patterns rendered offline by [`engine::audio::render`]; the
//! volumes are applied by whichever backend plays them and are validated by tests.

use engine::audio::{Sweep, Voice, Waveform, render};

/// Sample rate cues are rendered at.
pub const CUE_SAMPLE_RATE: u32 = 44_100;

/// Ambient loop volume. Sits under the preview clip.
pub const AMBIENT_VOLUME: f32 = 0.3;
/// Preview clip volume.
pub const PREVIEW_VOLUME: f32 = 0.5;
/// Multiplier applied on top of each cue's own envelope.
pub const CUE_VOLUME: f32 = 0.8;

const MAJOR_TRIAD_HZ: [f32; 3] = [523.25, 659.25, 783.99];
const FANFARE_HZ: [f32; 4] = [523.25, 659.25, 783.99, 1046.50];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Click,
    Correct,
    Incorrect,
    Start,
    Victory,
}

impl Cue {
    pub const ALL: [Cue; 5] = [Cue::Click, Cue::Correct, Cue::Incorrect, Cue::Start, Cue::Victory];

    pub fn voices(self) -> Vec<Voice> {
        match self {
            Cue::Click => vec![Voice::new(
                Waveform::Sine,
                Sweep::exponential(800.0, 1200.0),
                Sweep::exponential(0.1, 0.01),
                0.1,
            )],
            Cue::Start => vec![Voice::new(
                Waveform::Triangle,
                Sweep::linear(200.0, 600.0),
                Sweep::linear(0.1, 0.0),
                0.3,
            )],
            Cue::Incorrect => vec![Voice::new(
                Waveform::Saw,
                Sweep::linear(150.0, 100.0),
                Sweep::exponential(0.1, 0.01),
                0.3,
            )],
            // Rising major arpeggio, notes 50 ms apart.
            Cue::Correct => MAJOR_TRIAD_HZ
                .iter()
                .enumerate()
                .map(|(i, &hz)| {
                    Voice::new(
                        Waveform::Sine,
                        Sweep::constant(hz),
                        Sweep::exponential(0.1, 0.01),
                        0.5,
                    )
                    .with_attack(0.05)
                    .starting_at(i as f32 * 0.05)
                })
                .collect(),
            Cue::Victory => FANFARE_HZ
                .iter()
                .enumerate()
                .map(|(i, &hz)| {
                    let last = i + 1 == FANFARE_HZ.len();
                    Voice::new(
                        Waveform::Square,
                        Sweep::constant(hz),
                        Sweep::exponential(0.05, 0.001),
                        if last { 0.6 } else { 0.1 },
                    )
                    .starting_at(i as f32 * 0.1)
                })
                .collect(),
        }
    }

    /// Mono samples at [`CUE_SAMPLE_RATE`].
    pub fn render(self) -> Vec<f32> {
        render(&self.voices(), CUE_SAMPLE_RATE)
    }
}
