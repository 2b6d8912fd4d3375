//! Music channel coordination and playback backends.
//!
//! [`AudioController`] owns the rules: the ambient loop and the preview clip never play at
//! the same time, mute silences music and cues, and playback failures only get logged. The
//! actual output goes through an [`AudioBackend`], which is `rodio` in the binary and a
//! recording fake in tests.

use std::io::Cursor;
use std::time::Duration;

use engine::audio::PatternLoop;
use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use thiserror::Error;
use tracing::{debug, warn};

use crate::settings::AudioSettings;
use crate::sfx::{CUE_SAMPLE_RATE, Cue};

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no audio output device: {0}")]
    Device(String),
    #[error("could not open an audio sink: {0}")]
    Sink(String),
    #[error("could not decode preview clip: {0}")]
    Decode(String),
}

/// Downloaded preview audio, keyed by the URL it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewClip {
    pub url: String,
    pub bytes: Vec<u8>,
}

pub trait AudioBackend {
    fn start_ambient(&mut self, volume: f32, muted: bool) -> Result<(), PlaybackError>;
    fn stop_ambient(&mut self);
    fn start_preview(
        &mut self,
        clip: &PreviewClip,
        volume: f32,
        muted: bool,
    ) -> Result<(), PlaybackError>;
    fn pause_preview(&mut self);
    fn resume_preview(&mut self);
    fn stop_preview(&mut self);
    /// Mutes or unmutes whatever is currently assigned, without stopping it.
    fn set_muted(&mut self, muted: bool);
    fn play_cue(&mut self, samples: Vec<f32>, sample_rate: u32, volume: f32)
    -> Result<(), PlaybackError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MusicChannel {
    #[default]
    Silent,
    Ambient,
    Preview { url: String, paused: bool },
}

pub struct AudioController {
    backend: Box<dyn AudioBackend>,
    channel: MusicChannel,
    muted: bool,
    volumes: AudioSettings,
}

impl AudioController {
    pub fn new(backend: Box<dyn AudioBackend>, settings: AudioSettings) -> Self {
        let settings = settings.clamp();
        Self {
            backend,
            channel: MusicChannel::Silent,
            muted: settings.muted,
            volumes: settings,
        }
    }

    pub fn silent() -> Self {
        Self::new(Box::new(NullBackend), AudioSettings::default())
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn channel(&self) -> &MusicChannel {
        &self.channel
    }

    /// Flips the mute flag and returns the new value.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.backend.set_muted(self.muted);
        self.muted
    }

    /// Starts the ambient loop, stopping any preview first. Does nothing while muted.
    pub fn start_ambient(&mut self) {
        if self.muted {
            debug!("muted; ambient loop not started");
            return;
        }
        if self.channel == MusicChannel::Ambient {
            return;
        }
        self.stop_preview();
        match self.backend.start_ambient(self.volumes.ambient_volume, self.muted) {
            Ok(()) => self.channel = MusicChannel::Ambient,
            Err(err) => {
                warn!(%err, "failed to start ambient loop");
                self.channel = MusicChannel::Silent;
            }
        }
    }

    /// Plays a preview clip, stopping the ambient loop first. Falls back to the ambient loop
    /// when the clip can't be played.
    pub fn play_preview(&mut self, clip: &PreviewClip) {
        self.stop_all();
        match self
            .backend
            .start_preview(clip, self.volumes.preview_volume, self.muted)
        {
            Ok(()) => {
                self.channel = MusicChannel::Preview {
                    url: clip.url.clone(),
                    paused: false,
                }
            }
            Err(err) => {
                warn!(url = %clip.url, %err, "failed to start preview");
                self.start_ambient();
            }
        }
    }

    /// Music for a freshly shown question: its preview when there is one, else the ambient loop.
    pub fn start_question(&mut self, clip: Option<&PreviewClip>) {
        match clip {
            Some(clip) => self.play_preview(clip),
            None => {
                self.stop_all();
                self.start_ambient();
            }
        }
    }

    pub fn pause_preview(&mut self) {
        if let MusicChannel::Preview { paused, .. } = &mut self.channel {
            if !*paused {
                self.backend.pause_preview();
                *paused = true;
            }
        }
    }

    /// Resumes a paused preview. Refused while muted.
    pub fn resume_preview(&mut self) {
        if self.muted {
            debug!("muted; preview not resumed");
            return;
        }
        if let MusicChannel::Preview { paused, .. } = &mut self.channel {
            if *paused {
                self.backend.stop_ambient();
                self.backend.resume_preview();
                *paused = false;
            }
        }
    }

    /// Pauses or resumes the preview. Returns whether it is playing afterwards, or `None`
    /// when no preview is assigned.
    pub fn toggle_preview(&mut self) -> Option<bool> {
        let paused = match &self.channel {
            MusicChannel::Preview { paused, .. } => *paused,
            _ => return None,
        };
        if paused {
            self.resume_preview();
        } else {
            self.pause_preview();
        }
        match &self.channel {
            MusicChannel::Preview { paused, .. } => Some(!*paused),
            _ => None,
        }
    }

    pub fn is_preview_playing(&self) -> bool {
        matches!(self.channel, MusicChannel::Preview { paused: false, .. })
    }

    pub fn stop_all(&mut self) {
        self.backend.stop_ambient();
        self.backend.stop_preview();
        self.channel = MusicChannel::Silent;
    }

    /// Plays a UI cue unless muted.
    pub fn cue(&mut self, cue: Cue) {
        if self.muted {
            return;
        }
        if let Err(err) = self
            .backend
            .play_cue(cue.render(), CUE_SAMPLE_RATE, self.volumes.cue_volume)
        {
            debug!(?cue, %err, "failed to play cue");
        }
    }

    fn stop_preview(&mut self) {
        if matches!(self.channel, MusicChannel::Preview { .. }) {
            self.backend.stop_preview();
            self.channel = MusicChannel::Silent;
        }
    }
}

/// Backend that accepts everything and plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl AudioBackend for NullBackend {
    fn start_ambient(&mut self, _volume: f32, _muted: bool) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn stop_ambient(&mut self) {}

    fn start_preview(
        &mut self,
        _clip: &PreviewClip,
        _volume: f32,
        _muted: bool,
    ) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn pause_preview(&mut self) {}

    fn resume_preview(&mut self) {}

    fn stop_preview(&mut self) {}

    fn set_muted(&mut self, _muted: bool) {}

    fn play_cue(
        &mut self,
        _samples: Vec<f32>,
        _sample_rate: u32,
        _volume: f32,
    ) -> Result<(), PlaybackError> {
        Ok(())
    }
}

const AMBIENT_SAMPLE_RATE: u32 = 48_000;

/// Procedural ambient bed as a `rodio` source.
struct AmbientLoop(PatternLoop);

impl AmbientLoop {
    fn new() -> Self {
        Self(PatternLoop::lofi(AMBIENT_SAMPLE_RATE))
    }
}

impl Iterator for AmbientLoop {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

impl rodio::Source for AmbientLoop {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.0.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.0.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

struct Channel {
    sink: Sink,
    volume: f32,
}

impl Channel {
    fn apply_mute(&self, muted: bool) {
        self.sink.set_volume(if muted { 0.0 } else { self.volume });
    }
}

/// Speaker output through the default `rodio` device.
pub struct RodioBackend {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    ambient: Option<Channel>,
    preview: Option<Channel>,
}

impl RodioBackend {
    pub fn new() -> Result<Self, PlaybackError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| PlaybackError::Device(e.to_string()))?;
        Ok(Self {
            _stream: stream,
            handle,
            ambient: None,
            preview: None,
        })
    }

    fn sink(&self) -> Result<Sink, PlaybackError> {
        Sink::try_new(&self.handle).map_err(|e| PlaybackError::Sink(e.to_string()))
    }
}

impl AudioBackend for RodioBackend {
    fn start_ambient(&mut self, volume: f32, muted: bool) -> Result<(), PlaybackError> {
        self.stop_ambient();
        let channel = Channel {
            sink: self.sink()?,
            volume,
        };
        channel.apply_mute(muted);
        channel.sink.append(AmbientLoop::new());
        self.ambient = Some(channel);
        Ok(())
    }

    fn stop_ambient(&mut self) {
        if let Some(channel) = self.ambient.take() {
            channel.sink.stop();
        }
    }

    fn start_preview(
        &mut self,
        clip: &PreviewClip,
        volume: f32,
        muted: bool,
    ) -> Result<(), PlaybackError> {
        self.stop_preview();
        let source = Decoder::new(Cursor::new(clip.bytes.clone()))
            .map_err(|e| PlaybackError::Decode(e.to_string()))?;
        let channel = Channel {
            sink: self.sink()?,
            volume,
        };
        channel.apply_mute(muted);
        channel.sink.append(source);
        self.preview = Some(channel);
        Ok(())
    }

    fn pause_preview(&mut self) {
        if let Some(channel) = &self.preview {
            channel.sink.pause();
        }
    }

    fn resume_preview(&mut self) {
        if let Some(channel) = &self.preview {
            channel.sink.play();
        }
    }

    fn stop_preview(&mut self) {
        if let Some(channel) = self.preview.take() {
            channel.sink.stop();
        }
    }

    fn set_muted(&mut self, muted: bool) {
        for channel in [&self.ambient, &self.preview].into_iter().flatten() {
            channel.apply_mute(muted);
        }
    }

    fn play_cue(
        &mut self,
        samples: Vec<f32>,
        sample_rate: u32,
        volume: f32,
    ) -> Result<(), PlaybackError> {
        let sink = self.sink()?;
        sink.set_volume(volume);
        sink.append(SamplesBuffer::new(1, sample_rate, samples));
        sink.detach();
        Ok(())
    }
}
