//! Orchestrates one play session: the picture menu, the live puzzle, and the held piece.
//!
//! Everything here is driven by plain method calls (`pointer_down`, `key_press`, ...), so the
//! whole game can be exercised headless; the windowed app only translates `InputFrame`s.

use std::fs;
use std::path::{Path, PathBuf};

use engine::graphics::{Color, DEFAULT_TEXT_SCALE, Renderer2d, text_size};
use engine::surface::SurfaceSize;
use engine::ui::{Anchor, Insets, Rect, Size};
use rand_chacha::ChaCha8Rng;

use crate::edge::EdgeLibrary;
use crate::error::{LoadError, PuzzleError};
use crate::geom::Point;
use crate::puzzle::{Puzzle, PuzzleConfig};
use crate::sfx::SoundEvent;
use crate::texture::Texture;
use crate::view::{GameView, GameViewEffect, GameViewEvent};

pub const ESCAPE: char = '\u{1b}';

const BACKGROUND: Color = [24, 26, 32, 255];
const PANEL: Color = [44, 48, 58, 255];
const PANEL_EDGE: Color = [120, 126, 140, 255];
const TEXT: Color = [230, 230, 230, 255];
const ACCENT: Color = [250, 200, 90, 255];
const ERROR_TEXT: Color = [240, 110, 100, 255];

const MENU_PADDING: u32 = 24;
const MENU_TITLE_H: u32 = 48;
const MENU_ENTRY_W: u32 = 420;
const MENU_ENTRY_H: u32 = 36;
const MENU_ENTRY_GAP: u32 = 6;
const BANNER_H: u32 = 56;
const STATUS_PADDING: u32 = 8;

#[derive(Debug, Clone)]
pub enum PictureSource {
    Asset(PathBuf),
    Loaded(Texture),
}

/// One selectable picture in the menu.
#[derive(Debug, Clone)]
pub struct PictureEntry {
    pub name: String,
    pub source: PictureSource,
}

impl PictureEntry {
    /// An asset file, named after its file stem. Loaded only when selected.
    pub fn asset(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            source: PictureSource::Asset(path),
        }
    }

    pub fn loaded(name: impl Into<String>, texture: Texture) -> Self {
        Self {
            name: name.into(),
            source: PictureSource::Loaded(texture),
        }
    }
}

/// Lists `*.txt` picture assets in `dir`, sorted by file name.
pub fn discover_pictures(dir: impl AsRef<Path>) -> Result<Vec<PictureEntry>, LoadError> {
    let dir = dir.as_ref();
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|err| LoadError::io(dir, err))? {
        let path = entry.map_err(|err| LoadError::io(dir, err))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            paths.push(path);
        }
    }
    paths.sort();
    log::debug!("found {} pictures in {}", paths.len(), dir.display());
    Ok(paths.into_iter().map(PictureEntry::asset).collect())
}

/// The piece being dragged and where on it the pointer grabbed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Held {
    pub id: usize,
    pub grab_offset: Point,
}

#[derive(Debug)]
pub struct Session {
    pictures: Vec<PictureEntry>,
    library: EdgeLibrary,
    config: PuzzleConfig,
    rng: ChaCha8Rng,
    view: GameView,
    puzzle: Option<Puzzle>,
    held: Option<Held>,
    screen: SurfaceSize,
    last_error: Option<String>,
}

impl Session {
    pub fn new(
        pictures: Vec<PictureEntry>,
        library: EdgeLibrary,
        config: PuzzleConfig,
        rng: ChaCha8Rng,
    ) -> Self {
        let screen = SurfaceSize::new(config.scatter.w, config.scatter.h);
        Self {
            pictures,
            library,
            config,
            rng,
            view: GameView::default(),
            puzzle: None,
            held: None,
            screen,
            last_error: None,
        }
    }

    pub fn view(&self) -> GameView {
        self.view
    }

    pub fn puzzle(&self) -> Option<&Puzzle> {
        self.puzzle.as_ref()
    }

    /// Direct access for scripted setups; moving pieces here bypasses the held-piece state.
    pub fn puzzle_mut(&mut self) -> Option<&mut Puzzle> {
        self.puzzle.as_mut()
    }

    pub fn held(&self) -> Option<Held> {
        self.held
    }

    pub fn pictures(&self) -> &[PictureEntry] {
        &self.pictures
    }

    pub fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    /// Message from the last picture that failed to load, shown on the menu.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Tracks the window size; new puzzles scatter over the whole surface.
    pub fn resize(&mut self, size: SurfaceSize) {
        if size.is_empty() || size == self.screen {
            return;
        }
        self.screen = size;
        self.config.scatter = Rect::from_size(size.width, size.height);
    }

    fn apply(&mut self, event: GameViewEvent) -> GameViewEffect {
        let (next, effect) = self.view.handle(event);
        if effect == GameViewEffect::DiscardPuzzle {
            self.puzzle = None;
            self.held = None;
        }
        if next != self.view {
            log::info!("view {:?} -> {next:?}", self.view);
        }
        self.view = next;
        effect
    }

    /// Builds a puzzle from menu entry `index` and starts playing it.
    ///
    /// On failure the session stays on the menu and the error is kept for display.
    pub fn select_puzzle(&mut self, index: usize) -> Result<(), PuzzleError> {
        if self.view != GameView::Menu {
            return Ok(());
        }
        let Some(entry) = self.pictures.get(index) else {
            log::debug!("no picture at menu index {index}");
            self.last_error = Some(format!("no picture {}", index + 1));
            return Err(PuzzleError::UnknownPicture(index));
        };

        let built = match &entry.source {
            PictureSource::Asset(path) => {
                Puzzle::from_asset(path, &self.library, &self.config, &mut self.rng)
            }
            PictureSource::Loaded(texture) => {
                Puzzle::new(texture, &self.library, &self.config, &mut self.rng)
            }
        };
        let puzzle = match built {
            Ok(puzzle) => puzzle,
            Err(err) => {
                log::error!("failed to build puzzle {:?}: {err}", entry.name);
                self.last_error = Some(format!("{}: {err}", entry.name));
                return Err(err);
            }
        };
        log::info!(
            "starting {:?}: {} pieces",
            entry.name,
            puzzle.piece_count()
        );

        if self.apply(GameViewEvent::SelectPuzzle) == GameViewEffect::BuildPuzzle {
            self.puzzle = Some(puzzle);
            self.held = None;
            self.last_error = None;
        }
        Ok(())
    }

    /// Rows of the picture menu for a surface of `size`, one per entry that fits.
    pub fn menu_layout(&self, size: SurfaceSize) -> Vec<Rect> {
        let area = Rect::from_size(size.width, size.height).inset(Insets::all(MENU_PADDING));
        let (_, mut rest) = area.take_top(MENU_TITLE_H);
        let mut rows = Vec::with_capacity(self.pictures.len());
        for _ in &self.pictures {
            let (row, next) = rest.take_top(MENU_ENTRY_H + MENU_ENTRY_GAP);
            if row.h < MENU_ENTRY_H {
                break;
            }
            rows.push(row.place(Size::new(MENU_ENTRY_W, MENU_ENTRY_H), Anchor::TopCenter));
            rest = next;
        }
        rows
    }

    pub fn pointer_down(&mut self, point: Point) -> Vec<SoundEvent> {
        match self.view {
            GameView::Menu => {
                let hit = (point.x >= 0 && point.y >= 0)
                    .then(|| {
                        self.menu_layout(self.screen)
                            .iter()
                            .position(|row| row.contains(point.x as u32, point.y as u32))
                    })
                    .flatten();
                if let Some(index) = hit {
                    // Failures are logged and kept in `last_error`.
                    let _ = self.select_puzzle(index);
                }
                Vec::new()
            }
            GameView::Playing => {
                if self.held.is_some() {
                    return self.drop_held();
                }
                if let Some(puzzle) = self.puzzle.as_mut() {
                    if let Some(id) = puzzle.hit_test(point) {
                        puzzle.pick_up(id);
                        self.held = Some(Held {
                            id,
                            grab_offset: point - puzzle.piece(id).position(),
                        });
                    }
                }
                Vec::new()
            }
            GameView::Won => {
                self.apply(GameViewEvent::Restart);
                Vec::new()
            }
        }
    }

    /// Drags the held piece (and its group) so the grab point follows the pointer.
    pub fn pointer_moved(&mut self, point: Point) {
        if !self.view.is_playing() {
            return;
        }
        let (Some(held), Some(puzzle)) = (self.held, self.puzzle.as_mut()) else {
            return;
        };
        puzzle.move_piece(held.id, point - held.grab_offset);
    }

    pub fn key_press(&mut self, key: char) -> Vec<SoundEvent> {
        match (self.view, key) {
            (GameView::Menu, '1'..='9') => {
                let index = key as usize - '1' as usize;
                // Failures are logged and kept in `last_error`.
                let _ = self.select_puzzle(index);
                Vec::new()
            }
            (GameView::Playing, ESCAPE) => self.drop_held(),
            (GameView::Playing, 'm' | 'M') => {
                self.apply(GameViewEvent::Abandon);
                Vec::new()
            }
            (GameView::Won, 'r' | 'R') => {
                self.apply(GameViewEvent::Restart);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn drop_held(&mut self) -> Vec<SoundEvent> {
        let (Some(held), Some(puzzle)) = (self.held.take(), self.puzzle.as_mut()) else {
            return Vec::new();
        };
        let outcome = puzzle.drop_piece(held.id);
        let mut sounds = Vec::new();
        if outcome.merges > 0 {
            sounds.push(SoundEvent::Snap);
        }
        if outcome.complete {
            log::info!("puzzle complete ({} pieces)", puzzle.piece_count());
            sounds.push(SoundEvent::Win);
            self.apply(GameViewEvent::Completed);
        }
        sounds
    }

    pub fn render(&self, gfx: &mut dyn Renderer2d) {
        gfx.clear(BACKGROUND);
        match self.view {
            GameView::Menu => self.render_menu(gfx),
            GameView::Playing => {
                if let Some(puzzle) = &self.puzzle {
                    puzzle.draw(gfx);
                    let status = format!(
                        "GROUPS {}/{}  M: MENU",
                        puzzle.group_count(),
                        puzzle.piece_count()
                    );
                    let size = gfx.size();
                    let (sw, sh) = text_size(&status, DEFAULT_TEXT_SCALE);
                    let at = Rect::from_size(size.width, size.height)
                        .inset(Insets::all(STATUS_PADDING))
                        .place(Size::new(sw, sh), Anchor::TopLeft);
                    gfx.draw_text(at.x, at.y, &status, TEXT);
                }
            }
            GameView::Won => {
                if let Some(puzzle) = &self.puzzle {
                    puzzle.draw(gfx);
                }
                self.render_banner(gfx);
            }
        }
    }

    fn render_menu(&self, gfx: &mut dyn Renderer2d) {
        let size = gfx.size();
        let area = Rect::from_size(size.width, size.height).inset(Insets::all(MENU_PADDING));
        let (title_row, _) = area.take_top(MENU_TITLE_H);
        let title = "JIGSAW: PICK A PICTURE";
        let (tw, th) = text_size(title, DEFAULT_TEXT_SCALE + 1);
        let title_at = title_row.place(Size::new(tw, th), Anchor::Center);
        gfx.draw_text_scaled(title_at.x, title_at.y, title, ACCENT, DEFAULT_TEXT_SCALE + 1);

        let rows = self.menu_layout(size);
        for (index, (row, entry)) in rows.iter().zip(&self.pictures).enumerate() {
            gfx.fill_rect(*row, PANEL);
            gfx.rect_outline(*row, PANEL_EDGE);
            let label = if index < 9 {
                format!("{}  {}", index + 1, entry.name)
            } else {
                entry.name.clone()
            };
            let (_, lh) = text_size(&label, DEFAULT_TEXT_SCALE);
            let y = row.y + row.h.saturating_sub(lh) / 2;
            gfx.draw_text(row.x + 12, y, &label, TEXT);
        }

        if self.pictures.is_empty() {
            gfx.draw_text(area.x, area.y + MENU_TITLE_H, "NO PICTURES FOUND", ERROR_TEXT);
        }
        if let Some(err) = &self.last_error {
            let (ew, eh) = text_size(err, DEFAULT_TEXT_SCALE);
            let at = area.place(Size::new(ew, eh), Anchor::BottomCenter);
            gfx.draw_text(at.x, at.y, err, ERROR_TEXT);
        }
    }

    fn render_banner(&self, gfx: &mut dyn Renderer2d) {
        let size = gfx.size();
        let screen = Rect::from_size(size.width, size.height);
        let banner = screen.place(Size::new(size.width, BANNER_H), Anchor::Center);
        gfx.blend_rect(banner, [0, 0, 0, 255], 170);
        let text = "COMPLETE!  CLICK OR R FOR MENU";
        let (tw, th) = text_size(text, DEFAULT_TEXT_SCALE);
        let at = banner.place(Size::new(tw, th), Anchor::Center);
        gfx.draw_text(at.x, at.y, text, ACCENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn session_with(pictures: Vec<PictureEntry>) -> Session {
        let config = PuzzleConfig {
            rows: 2,
            cols: 2,
            ..PuzzleConfig::default()
        };
        Session::new(
            pictures,
            EdgeLibrary::classic(),
            config,
            ChaCha8Rng::seed_from_u64(11),
        )
    }

    fn picture() -> PictureEntry {
        PictureEntry::loaded("stripes", Texture::from_fn(80, 80, |x, _| [x as u8, 0, 0]))
    }

    #[test]
    fn asset_entries_are_named_after_file_stem() {
        let entry = PictureEntry::asset("assets/pictures/sunset.txt");
        assert_eq!(entry.name, "sunset");
        assert!(matches!(entry.source, PictureSource::Asset(_)));
    }

    #[test]
    fn menu_layout_stacks_rows_without_overlap() {
        let session = session_with(vec![picture(), picture(), picture()]);
        let rows = session.menu_layout(SurfaceSize::new(800, 600));
        assert_eq!(rows.len(), 3);
        for pair in rows.windows(2) {
            assert!(pair[0].y + pair[0].h <= pair[1].y);
        }
        assert!(session.menu_layout(SurfaceSize::new(800, 100)).is_empty());
    }

    #[test]
    fn unknown_menu_index_stays_on_menu() {
        let mut session = session_with(vec![picture()]);
        assert!(matches!(
            session.select_puzzle(4),
            Err(PuzzleError::UnknownPicture(4))
        ));
        assert_eq!(session.view(), GameView::Menu);
        assert!(session.puzzle().is_none());
    }

    #[test]
    fn clicking_a_menu_row_starts_that_puzzle() {
        let mut session = session_with(vec![picture()]);
        let row = session.menu_layout(SurfaceSize::new(1024, 768))[0];
        let sounds = session.pointer_down(Point::new(row.x as i32 + 5, row.y as i32 + 5));
        assert!(sounds.is_empty());
        assert_eq!(session.view(), GameView::Playing);
        assert_eq!(session.puzzle().map(Puzzle::piece_count), Some(4));
    }
}
