use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::i18n::Language;
use crate::question::Difficulty;
use crate::sfx::{AMBIENT_VOLUME, CUE_VOLUME, PREVIEW_VOLUME};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AudioSettings {
    pub muted: bool,
    pub ambient_volume: f32,
    pub preview_volume: f32,
    pub cue_volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            muted: false,
            ambient_volume: AMBIENT_VOLUME,
            preview_volume: PREVIEW_VOLUME,
            cue_volume: CUE_VOLUME,
        }
    }
}

impl AudioSettings {
    pub fn clamp(mut self) -> Self {
        self.ambient_volume = self.ambient_volume.clamp(0.0, 1.0);
        self.preview_volume = self.preview_volume.clamp(0.0, 1.0);
        self.cue_volume = self.cue_volume.clamp(0.0, 1.0);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub audio: AudioSettings,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            language: Language::default(),
            difficulty: Difficulty::default(),
            audio: AudioSettings::default(),
        }
    }
}

impl PlayerSettings {
    pub fn sanitized(mut self) -> Self {
        self.version = default_version();
        self.audio = self.audio.clamp();
        self
    }

    pub fn live(&self) -> LiveSettings {
        LiveSettings {
            language: self.language,
            difficulty: self.difficulty,
            muted: self.audio.muted,
        }
    }

    /// Takes over the fields that changed between `before` and `after`, leaving the rest
    /// alone so launch-time overrides are never written back. Returns whether anything
    /// was taken.
    pub fn absorb(&mut self, before: LiveSettings, after: LiveSettings) -> bool {
        let mut changed = false;
        if before.language != after.language && self.language != after.language {
            self.language = after.language;
            changed = true;
        }
        if before.difficulty != after.difficulty && self.difficulty != after.difficulty {
            self.difficulty = after.difficulty;
            changed = true;
        }
        if before.muted != after.muted && self.audio.muted != after.muted {
            self.audio.muted = after.muted;
            changed = true;
        }
        changed
    }
}

/// The settings a player can change while the game runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveSettings {
    pub language: Language,
    pub difficulty: Difficulty,
    pub muted: bool,
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("BEAT_TIMELINE_SETTINGS_PATH") {
            return Self {
                path: PathBuf::from(explicit),
            };
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".config");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let mut path = base;
        path.push("beat-timeline");
        path.push("settings.json");
        Self { path }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> PlayerSettings {
        let Ok(bytes) = fs::read(&self.path) else {
            return PlayerSettings::default();
        };
        match serde_json::from_slice::<PlayerSettings>(&bytes) {
            Ok(settings) => settings.sanitized(),
            Err(err) => {
                warn!(path = %self.path.display(), %err, "settings file is corrupt; using defaults");
                PlayerSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &PlayerSettings) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(settings)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, text)
    }
}
