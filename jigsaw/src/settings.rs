use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::puzzle::DEFAULT_SNAP_TOLERANCE;

pub const MAX_GRID_SIDE: u32 = 32;
pub const MAX_SNAP_TOLERANCE: f32 = 200.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioSettings {
    pub master_volume: f32,
    pub sfx_volume: f32,
    pub mute_all: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            sfx_volume: 1.0,
            mute_all: false,
        }
    }
}

impl AudioSettings {
    pub fn clamp(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self
    }

    pub fn effective_sfx_gain(self) -> f32 {
        if self.mute_all {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PuzzleSettings {
    pub rows: u32,
    pub cols: u32,
    pub snap_tolerance: f32,
    /// Fixed RNG seed; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for PuzzleSettings {
    fn default() -> Self {
        Self {
            rows: 4,
            cols: 6,
            snap_tolerance: DEFAULT_SNAP_TOLERANCE,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VideoSettings {
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directory scanned for `*.txt` picture assets.
    pub pictures_dir: PathBuf,
    /// JSON edge catalog; the built-in knobs are used when unset.
    pub edge_catalog: Option<PathBuf>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            pictures_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/pictures")),
            edge_catalog: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub puzzle: PuzzleSettings,
    #[serde(default)]
    pub video: VideoSettings,
    #[serde(default)]
    pub library: LibrarySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            audio: AudioSettings::default(),
            puzzle: PuzzleSettings::default(),
            video: VideoSettings::default(),
            library: LibrarySettings::default(),
        }
    }
}

impl Settings {
    pub fn sanitized(mut self) -> Self {
        self.version = default_version();
        self.audio = self.audio.clamp();
        self.puzzle.rows = self.puzzle.rows.clamp(1, MAX_GRID_SIDE);
        self.puzzle.cols = self.puzzle.cols.clamp(1, MAX_GRID_SIDE);
        self.puzzle.snap_tolerance = if self.puzzle.snap_tolerance.is_finite() {
            self.puzzle.snap_tolerance.clamp(0.0, MAX_SNAP_TOLERANCE)
        } else {
            DEFAULT_SNAP_TOLERANCE
        };
        self.video.width = self.video.width.max(320);
        self.video.height = self.video.height.max(240);
        self
    }
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("JIGSAW_SETTINGS_PATH") {
            return Self::at(explicit);
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));

        Self::at(base.join("jigsaw").join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the settings file, falling back to defaults when it is missing or unreadable.
    pub fn load(&self) -> Settings {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("no settings at {}, using defaults", self.path.display());
                return Settings::default();
            }
            Err(err) => {
                log::warn!("failed to read {}: {err}", self.path.display());
                return Settings::default();
            }
        };
        match serde_json::from_slice::<Settings>(&bytes) {
            Ok(settings) => settings.sanitized(),
            Err(err) => {
                log::warn!("ignoring invalid settings {}: {err}", self.path.display());
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> io::Result<()> {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sfx_gain_respects_mute() {
        let mut audio = AudioSettings {
            master_volume: 0.5,
            sfx_volume: 0.5,
            mute_all: false,
        };
        assert!((audio.effective_sfx_gain() - 0.25).abs() < 1e-6);
        audio.mute_all = true;
        assert_eq!(audio.effective_sfx_gain(), 0.0);
    }

    #[test]
    fn sanitized_clamps_expected_fields() {
        let settings = Settings {
            version: 7,
            audio: AudioSettings {
                master_volume: 4.0,
                sfx_volume: -1.0,
                mute_all: false,
            },
            puzzle: PuzzleSettings {
                rows: 0,
                cols: 500,
                snap_tolerance: f32::NAN,
                seed: Some(3),
            },
            ..Settings::default()
        }
        .sanitized();

        assert_eq!(settings.version, 1);
        assert_eq!(settings.audio.master_volume, 1.0);
        assert_eq!(settings.audio.sfx_volume, 0.0);
        assert_eq!(settings.puzzle.rows, 1);
        assert_eq!(settings.puzzle.cols, MAX_GRID_SIDE);
        assert_eq!(settings.puzzle.snap_tolerance, DEFAULT_SNAP_TOLERANCE);
        assert_eq!(settings.puzzle.seed, Some(3));
    }

    #[test]
    fn serde_defaults_fill_missing_fields() {
        let parsed: Settings = serde_json::from_str(r#"{"puzzle":{"rows":3}}"#)
            .expect("settings JSON should parse");
        assert_eq!(parsed.puzzle.rows, 3);
        assert_eq!(parsed.puzzle.cols, PuzzleSettings::default().cols);
        assert_eq!(parsed.audio, AudioSettings::default());
        assert_eq!(parsed.library, LibrarySettings::default());
    }

    #[test]
    fn store_round_trips_and_tolerates_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("nested").join("settings.json"));
        assert_eq!(store.load(), Settings::default());

        let mut settings = Settings::default();
        settings.puzzle.seed = Some(42);
        settings.library.edge_catalog = Some(PathBuf::from("edges.json"));
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);

        fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.load(), Settings::default());
    }
}
