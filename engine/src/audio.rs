//! Tiny offline synthesizer: oscillator voices for short cues and an endless step-pattern
//! loop for background music. Output is mono or interleaved `f32` in `-1.0..=1.0`, ready for
//! whatever playback backend the game uses.

use std::f32::consts::{PI, TAU};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Saw,
}

impl Waveform {
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => phase.sin(),
            Waveform::Triangle => (2.0 / PI) * phase.sin().asin(),
            Waveform::Square => {
                if phase.sin() >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Saw => 2.0 * (phase / TAU) - 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    Linear,
    /// Geometric interpolation. Both endpoints must be positive; otherwise falls back to linear.
    Exponential,
}

/// A value moving from `from` to `to` over a voice's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    pub from: f32,
    pub to: f32,
    pub ramp: Ramp,
}

impl Sweep {
    pub fn constant(value: f32) -> Self {
        Self {
            from: value,
            to: value,
            ramp: Ramp::Linear,
        }
    }

    pub fn linear(from: f32, to: f32) -> Self {
        Self {
            from,
            to,
            ramp: Ramp::Linear,
        }
    }

    pub fn exponential(from: f32, to: f32) -> Self {
        Self {
            from,
            to,
            ramp: Ramp::Exponential,
        }
    }

    pub fn at(&self, progress: f32) -> f32 {
        let t = progress.clamp(0.0, 1.0);
        match self.ramp {
            Ramp::Exponential if self.from > 0.0 && self.to > 0.0 => {
                self.from * (self.to / self.from).powf(t)
            }
            _ => self.from + (self.to - self.from) * t,
        }
    }
}

/// One oscillator note inside a cue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub waveform: Waveform,
    pub start_secs: f32,
    pub duration_secs: f32,
    pub frequency: Sweep,
    pub gain: Sweep,
    /// Linear fade-in from silence to `gain.from`; the gain sweep runs over the remainder.
    pub attack_secs: f32,
}

impl Voice {
    pub fn new(waveform: Waveform, frequency: Sweep, gain: Sweep, duration_secs: f32) -> Self {
        Self {
            waveform,
            start_secs: 0.0,
            duration_secs: duration_secs.max(0.0),
            frequency,
            gain,
            attack_secs: 0.0,
        }
    }

    pub fn starting_at(mut self, start_secs: f32) -> Self {
        self.start_secs = start_secs.max(0.0);
        self
    }

    pub fn with_attack(mut self, attack_secs: f32) -> Self {
        self.attack_secs = attack_secs.clamp(0.0, self.duration_secs);
        self
    }

    pub fn end_secs(&self) -> f32 {
        self.start_secs + self.duration_secs
    }

    fn gain_at(&self, t: f32) -> f32 {
        if self.attack_secs > 0.0 && t < self.attack_secs {
            return self.gain.from * (t / self.attack_secs);
        }
        let body = (self.duration_secs - self.attack_secs).max(f32::EPSILON);
        self.gain.at((t - self.attack_secs) / body)
    }
}

/// Mixes `voices` into a mono buffer long enough to hold the last voice.
pub fn render(voices: &[Voice], sample_rate: u32) -> Vec<f32> {
    let sample_rate = sample_rate.max(1);
    let end = voices.iter().map(Voice::end_secs).fold(0.0f32, f32::max);
    let len = (end * sample_rate as f32).round() as usize;
    let mut out = vec![0.0f32; len];

    for voice in voices {
        let first = (voice.start_secs * sample_rate as f32).round() as usize;
        let count = (voice.duration_secs * sample_rate as f32).round() as usize;
        let mut phase = 0.0f32;
        for (i, slot) in out.iter_mut().skip(first).take(count).enumerate() {
            let t = i as f32 / sample_rate as f32;
            let progress = t / voice.duration_secs.max(f32::EPSILON);
            let freq = voice.frequency.at(progress);
            phase = (phase + TAU * freq / sample_rate as f32) % TAU;
            *slot += voice.waveform.sample(phase) * voice.gain_at(t);
        }
    }

    for sample in &mut out {
        *sample = sample.clamp(-1.0, 1.0);
    }
    out
}

fn step_envelope(in_step: f32, attack: f32, release: f32) -> f32 {
    if attack > 0.0 && in_step < attack {
        return in_step / attack;
    }
    if release > 0.0 && in_step > (1.0 - release) {
        return ((1.0 - in_step) / release).max(0.0);
    }
    1.0
}

/// Endless arpeggio loop, interleaved across `channels`.
///
/// `None` steps are rests. Each step fades in and out over `attack`/`release` (fractions of a
/// step) so note boundaries don't click.
#[derive(Debug, Clone)]
pub struct PatternLoop {
    notes_hz: Vec<Option<f32>>,
    step_frames: u64,
    sample_rate: u32,
    channels: u16,
    waveform: Waveform,
    gain: f32,
    harmonic_mix: f32,
    attack: f32,
    release: f32,
    frame: u64,
    chan: u16,
    phase: f32,
    held: f32,
}

impl PatternLoop {
    pub fn new(notes_hz: impl Into<Vec<Option<f32>>>, step_secs: f32, sample_rate: u32) -> Self {
        let mut notes_hz = notes_hz.into();
        if notes_hz.is_empty() {
            notes_hz.push(None);
        }
        let sample_rate = sample_rate.max(1);
        Self {
            notes_hz,
            step_frames: ((step_secs.max(0.01) * sample_rate as f32).round() as u64).max(1),
            sample_rate,
            channels: 2,
            waveform: Waveform::Sine,
            gain: 0.2,
            harmonic_mix: 0.0,
            attack: 0.05,
            release: 0.15,
            frame: 0,
            chan: 0,
            phase: 0.0,
            held: 0.0,
        }
    }

    /// Slow minor-seventh arpeggio used as the default background bed.
    pub fn lofi(sample_rate: u32) -> Self {
        const NOTES_HZ: [Option<f32>; 16] = [
            Some(220.00),
            Some(261.63),
            Some(329.63),
            Some(392.00),
            Some(329.63),
            Some(261.63),
            None,
            Some(196.00),
            Some(174.61),
            Some(220.00),
            Some(261.63),
            Some(329.63),
            Some(261.63),
            Some(220.00),
            None,
            Some(196.00),
        ];
        Self::new(NOTES_HZ.to_vec(), 0.375, sample_rate)
            .with_waveform(Waveform::Triangle)
            .with_harmonic_mix(0.25)
            .with_gain(0.18)
    }

    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain.clamp(0.0, 1.0);
        self
    }

    pub fn with_harmonic_mix(mut self, harmonic_mix: f32) -> Self {
        self.harmonic_mix = harmonic_mix.clamp(0.0, 1.0);
        self
    }

    pub fn with_channels(mut self, channels: u16) -> Self {
        self.channels = channels.max(1);
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Frames in one full pass over the pattern.
    pub fn period_frames(&self) -> u64 {
        self.step_frames * self.notes_hz.len() as u64
    }

    fn frame_sample(&mut self) -> f32 {
        let step = ((self.frame / self.step_frames) % self.notes_hz.len() as u64) as usize;
        let in_step = (self.frame % self.step_frames) as f32 / self.step_frames as f32;
        let Some(freq_hz) = self.notes_hz[step] else {
            return 0.0;
        };

        self.phase = (self.phase + TAU * freq_hz / self.sample_rate as f32) % TAU;
        let base = self.waveform.sample(self.phase);
        let harmonic = self.waveform.sample((self.phase * 2.0) % TAU) * self.harmonic_mix;
        let env = step_envelope(in_step, self.attack, self.release);
        ((base + harmonic) * self.gain * env).tanh()
    }
}

impl Iterator for PatternLoop {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        // Same value on every channel of a frame; the oscillator only advances once per frame.
        if self.chan == 0 {
            self.held = self.frame_sample();
        }
        let sample = self.held;

        self.chan += 1;
        if self.chan >= self.channels {
            self.chan = 0;
            self.frame = self.frame.wrapping_add(1);
        }
        Some(sample)
    }
}
