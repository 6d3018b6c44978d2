use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use engine::app::{AppConfig, run_game};
use engine::ui::Rect;
use jigsaw::app::JigsawApp;
use jigsaw::edge::EdgeLibrary;
use jigsaw::puzzle::{Orientation, PuzzleConfig};
use jigsaw::session::discover_pictures;
use jigsaw::settings::{Settings, SettingsStore};
use jigsaw::sfx::Sfx;
use rand::Rng;
use winit::dpi::PhysicalSize;

#[derive(Parser, Debug)]
#[command(name = "jigsaw", version, about = "Drag pieces together until the picture is whole")]
struct Cli {
    /// Directory of `*.txt` picture assets.
    #[arg(long)]
    pictures: Option<PathBuf>,
    /// JSON edge catalog; defaults to the built-in knobs.
    #[arg(long)]
    edges: Option<PathBuf>,
    #[arg(long)]
    rows: Option<u32>,
    #[arg(long)]
    cols: Option<u32>,
    /// Fixed RNG seed, for reproducible cuts and scatter.
    #[arg(long)]
    seed: Option<u64>,
    /// Snap distance in pixels between matching edge midpoints.
    #[arg(long)]
    tolerance: Option<f32>,
    /// Clockwise quarter turns applied to every picture.
    #[arg(long, default_value_t = 0)]
    rotate: u8,
    /// Mirror every picture left to right.
    #[arg(long)]
    mirror: bool,
    /// Settings file; overrides `JIGSAW_SETTINGS_PATH`.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Write the merged settings back to the settings file before starting.
    #[arg(long)]
    save_settings: bool,
}

impl Cli {
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(dir) = &self.pictures {
            settings.library.pictures_dir = dir.clone();
        }
        if let Some(edges) = &self.edges {
            settings.library.edge_catalog = Some(edges.clone());
        }
        if let Some(rows) = self.rows {
            settings.puzzle.rows = rows;
        }
        if let Some(cols) = self.cols {
            settings.puzzle.cols = cols;
        }
        if let Some(seed) = self.seed {
            settings.puzzle.seed = Some(seed);
        }
        if let Some(tolerance) = self.tolerance {
            settings.puzzle.snap_tolerance = tolerance;
        }
        settings.sanitized()
    }

    fn store(&self) -> SettingsStore {
        match &self.settings {
            Some(path) => SettingsStore::at(path),
            None => SettingsStore::from_env(),
        }
    }

    /// Loads the settings file, applies the flags, and saves the result when asked to.
    fn resolve_settings(&self) -> Settings {
        let store = self.store();
        let settings = self.apply(store.load());
        if self.save_settings {
            match store.save(&settings) {
                Ok(()) => log::info!("saved settings to {}", store.path().display()),
                Err(err) => log::warn!("failed to save settings to {}: {err}", store.path().display()),
            }
        }
        settings
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = cli.resolve_settings();

    let library = match &settings.library.edge_catalog {
        Some(path) => EdgeLibrary::load(path)?,
        None => EdgeLibrary::classic(),
    };

    let pictures = discover_pictures(&settings.library.pictures_dir).unwrap_or_else(|err| {
        log::warn!("no pictures loaded: {err}");
        Vec::new()
    });

    let seed = settings
        .puzzle
        .seed
        .unwrap_or_else(|| rand::rng().random());
    log::info!("rng seed {seed}");

    let config = PuzzleConfig {
        rows: settings.puzzle.rows,
        cols: settings.puzzle.cols,
        snap_tolerance: settings.puzzle.snap_tolerance,
        scatter: Rect::from_size(settings.video.width, settings.video.height),
        orientation: Orientation {
            quarter_turns: cli.rotate % 4,
            mirrored: cli.mirror,
        },
    };
    let sfx = Sfx::try_open(settings.audio);

    run_game(
        AppConfig {
            title: "Jigsaw".to_string(),
            desired_size: PhysicalSize::new(settings.video.width, settings.video.height),
            clamp_to_monitor: true,
            vsync: Some(settings.video.vsync),
        },
        JigsawApp::new(pictures, library, config, seed, sfx),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_settings() {
        let cli = Cli::parse_from([
            "jigsaw",
            "--rows",
            "3",
            "--cols",
            "5",
            "--seed",
            "9",
            "--tolerance",
            "20",
            "--edges",
            "edges.json",
        ]);
        let settings = cli.apply(Settings::default());
        assert_eq!(settings.puzzle.rows, 3);
        assert_eq!(settings.puzzle.cols, 5);
        assert_eq!(settings.puzzle.seed, Some(9));
        assert_eq!(settings.puzzle.snap_tolerance, 20.0);
        assert_eq!(
            settings.library.edge_catalog,
            Some(PathBuf::from("edges.json"))
        );
    }

    #[test]
    fn save_settings_persists_the_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let path_arg = path.to_str().unwrap();

        let cli = Cli::parse_from(["jigsaw", "--settings", path_arg, "--rows", "6"]);
        assert_eq!(cli.resolve_settings().puzzle.rows, 6);
        assert!(!path.exists());

        let cli = Cli::parse_from(["jigsaw", "--settings", path_arg, "--rows", "6", "--save-settings"]);
        let saved = cli.resolve_settings();
        assert!(path.exists());
        assert_eq!(SettingsStore::at(&path).load(), saved);

        let cli = Cli::parse_from(["jigsaw", "--settings", path_arg]);
        assert_eq!(cli.resolve_settings().puzzle.rows, 6);
    }

    #[test]
    fn overrides_are_sanitized() {
        let cli = Cli::parse_from(["jigsaw", "--rows", "0"]);
        assert_eq!(cli.apply(Settings::default()).puzzle.rows, 1);
    }
}
