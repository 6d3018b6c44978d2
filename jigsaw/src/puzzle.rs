use std::path::Path;

use engine::graphics::Renderer2d;
use engine::ui::Rect;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::edge::{Edge, EdgeLibrary};
use crate::error::PuzzleError;
use crate::geom::{Direction, Point};
use crate::groups::DisjointSet;
use crate::piece::Piece;
use crate::texture::{Texture, load_texture};

pub const DEFAULT_SNAP_TOLERANCE: f32 = 12.0;
/// Pieces narrower or shorter than this are refused.
pub const MIN_PIECE_PX: u32 = 4;

const SHADOW_OFFSET: i32 = 4;
const SHADOW_COLOR: [u8; 4] = [0, 0, 0, 255];
const SHADOW_ALPHA: u8 = 90;

/// Re-orientation applied to the picture before it is cut.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Orientation {
    /// Clockwise quarter turns.
    pub quarter_turns: u8,
    /// Mirror left-to-right after rotating.
    pub mirrored: bool,
}

impl Orientation {
    pub fn apply(self, picture: &Texture) -> Texture {
        let rotated = picture.rotated(self.quarter_turns);
        if self.mirrored {
            rotated.flipped_horizontal()
        } else {
            rotated
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PuzzleConfig {
    pub rows: u32,
    pub cols: u32,
    pub snap_tolerance: f32,
    /// Screen area the pieces are scattered over when the puzzle starts.
    pub scatter: Rect,
    pub orientation: Orientation,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            rows: 4,
            cols: 6,
            snap_tolerance: DEFAULT_SNAP_TOLERANCE,
            scatter: Rect::from_size(1024, 768),
            orientation: Orientation::default(),
        }
    }
}

/// Result of dropping a held piece.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropOutcome {
    /// Number of successful merges during the snap pass.
    pub merges: usize,
    /// The dropped group moved since it was picked up.
    pub moved: bool,
    /// Every piece is in one group.
    pub complete: bool,
}

/// The full grid of pieces cut from one picture.
///
/// Pieces are addressed by index (`row * cols + col`); neighbours are found by index arithmetic
/// and connected groups live in a `DisjointSet` over the same indices.
#[derive(Debug, Clone)]
pub struct Puzzle {
    rows: u32,
    cols: u32,
    piece_width: u32,
    piece_height: u32,
    margin: u32,
    snap_tolerance: f32,
    pieces: Vec<Piece>,
    groups: DisjointSet,
    z_order: Vec<usize>,
}

impl Puzzle {
    pub fn from_asset<R: Rng + ?Sized>(
        path: impl AsRef<Path>,
        library: &EdgeLibrary,
        config: &PuzzleConfig,
        rng: &mut R,
    ) -> Result<Self, PuzzleError> {
        let picture = load_texture(path)?;
        Self::new(&picture, library, config, rng)
    }

    pub fn new<R: Rng + ?Sized>(
        picture: &Texture,
        library: &EdgeLibrary,
        config: &PuzzleConfig,
        rng: &mut R,
    ) -> Result<Self, PuzzleError> {
        let (rows, cols) = (config.rows, config.cols);
        if rows == 0 || cols == 0 {
            return Err(PuzzleError::EmptyGrid);
        }

        let picture = config.orientation.apply(picture);
        let piece_width = picture.width() / cols;
        let piece_height = picture.height() / rows;
        if piece_width < MIN_PIECE_PX || piece_height < MIN_PIECE_PX {
            return Err(PuzzleError::PictureTooSmall {
                width: picture.width(),
                height: picture.height(),
                cols,
                rows,
            });
        }
        let margin = (piece_width.min(piece_height) / 4).max(1);

        let count = (rows * cols) as usize;
        let mut edges = vec![[Edge::Flat; 4]; count];
        for row in 0..rows {
            for col in 0..cols {
                let id = (row * cols + col) as usize;
                if col + 1 < cols {
                    let shared = library.pick_random_edge(rng);
                    edges[id][Direction::Right.index()] = Edge::Shaped(shared);
                    edges[id + 1][Direction::Left.index()] = Edge::Shaped(shared.complement());
                }
                if row + 1 < rows {
                    let shared = library.pick_random_edge(rng);
                    let below = id + cols as usize;
                    edges[id][Direction::Bottom.index()] = Edge::Shaped(shared);
                    edges[below][Direction::Top.index()] = Edge::Shaped(shared.complement());
                }
            }
        }

        let mut pieces: Vec<Piece> = edges
            .into_iter()
            .enumerate()
            .map(|(id, piece_edges)| {
                let id = id as u32;
                Piece::cut(
                    &picture,
                    id / cols,
                    id % cols,
                    (piece_width, piece_height),
                    margin,
                    piece_edges,
                    library,
                )
            })
            .collect();

        let scatter = config.scatter;
        let lo_x = scatter.x as i32 + margin as i32;
        let lo_y = scatter.y as i32 + margin as i32;
        let hi_x = (scatter.x + scatter.w) as i32 - (piece_width + margin) as i32;
        let hi_y = (scatter.y + scatter.h) as i32 - (piece_height + margin) as i32;
        for piece in &mut pieces {
            let x = rng.random_range(lo_x..=hi_x.max(lo_x));
            let y = rng.random_range(lo_y..=hi_y.max(lo_y));
            piece.set_position(Point::new(x, y));
        }

        let mut z_order: Vec<usize> = (0..count).collect();
        z_order.shuffle(rng);

        log::debug!(
            "cut {}x{} puzzle into {piece_width}x{piece_height} pieces (margin {margin})",
            cols,
            rows
        );

        Ok(Self {
            rows,
            cols,
            piece_width,
            piece_height,
            margin,
            snap_tolerance: config.snap_tolerance,
            pieces,
            groups: DisjointSet::new(count),
            z_order,
        })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn piece_size(&self) -> (u32, u32) {
        (self.piece_width, self.piece_height)
    }

    pub fn margin(&self) -> u32 {
        self.margin
    }

    pub fn snap_tolerance(&self) -> f32 {
        self.snap_tolerance
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: usize) -> &Piece {
        &self.pieces[id]
    }

    /// Index of the piece cut from grid cell `(row, col)`.
    pub fn id_of(&self, row: u32, col: u32) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| (row * self.cols + col) as usize)
    }

    /// Draw order, bottom first.
    pub fn z_order(&self) -> &[usize] {
        &self.z_order
    }

    pub fn edge(&self, id: usize, dir: Direction) -> Edge {
        self.pieces[id].edge(dir)
    }

    pub fn neighbor(&self, id: usize, dir: Direction) -> Option<usize> {
        let cols = self.cols as i32;
        let row = id as i32 / cols;
        let col = id as i32 % cols;
        let (d_row, d_col) = dir.grid_offset();
        let (row, col) = (row + d_row, col + d_col);
        if row < 0 || col < 0 || row >= self.rows as i32 || col >= cols {
            return None;
        }
        Some((row * cols + col) as usize)
    }

    pub fn connected_count(&self, id: usize) -> usize {
        self.groups.size(id)
    }

    pub fn same_group(&self, a: usize, b: usize) -> bool {
        self.groups.same(a, b)
    }

    pub fn group_members(&self, id: usize) -> Vec<usize> {
        self.groups.members(id)
    }

    pub fn group_count(&self) -> usize {
        self.groups.set_count()
    }

    pub fn is_complete(&self) -> bool {
        !self.pieces.is_empty() && self.groups.size(0) == self.pieces.len()
    }

    /// Whether piece `id` could snap to its neighbour on side `dir` where it lies right now.
    pub fn is_snappable(&self, id: usize, dir: Direction) -> bool {
        let Some(other) = self.neighbor(id, dir) else {
            return false;
        };
        if self.groups.same(id, other) {
            return false;
        }
        let here = self.pieces[id].edge_midpoint(dir);
        let there = self.pieces[other].edge_midpoint(dir.opposite());
        here.distance(there) <= self.snap_tolerance
    }

    /// Position piece `id` must take to sit exactly against its neighbour on side `dir`.
    pub fn snap_position(&self, id: usize, dir: Direction) -> Option<Point> {
        let other = self.neighbor(id, dir)?;
        let anchor = self.pieces[other].position();
        let w = self.piece_width as i32;
        let h = self.piece_height as i32;
        Some(match dir {
            Direction::Top => anchor + Point::new(0, h),
            Direction::Right => anchor - Point::new(w, 0),
            Direction::Bottom => anchor - Point::new(0, h),
            Direction::Left => anchor + Point::new(w, 0),
        })
    }

    /// Aligns piece `id`'s whole group against the neighbour on side `dir` and merges the groups.
    ///
    /// Returns `false` without touching anything when there is no neighbour or it already
    /// belongs to the same group.
    pub fn connect(&mut self, id: usize, dir: Direction) -> bool {
        let Some(other) = self.neighbor(id, dir) else {
            return false;
        };
        if self.groups.same(id, other) {
            return false;
        }
        let Some(target) = self.snap_position(id, dir) else {
            return false;
        };
        let delta = target - self.pieces[id].position();
        self.translate_group(id, delta);
        self.groups.union(id, other);
        log::debug!(
            "piece {id} snapped {dir:?} onto {other}, group size {}",
            self.groups.size(id)
        );
        true
    }

    /// Moves piece `id` to `target`, dragging its whole group along.
    pub fn move_piece(&mut self, id: usize, target: Point) {
        let delta = target - self.pieces[id].position();
        self.translate_group(id, delta);
    }

    fn translate_group(&mut self, id: usize, delta: Point) {
        for member in self.groups.members(id) {
            self.pieces[member].translate(delta);
        }
    }

    /// Topmost piece whose cell contains `point`.
    pub fn hit_test(&self, point: Point) -> Option<usize> {
        self.z_order
            .iter()
            .rev()
            .copied()
            .find(|&id| self.pieces[id].bounds_contain(point))
    }

    /// Moves `id`'s group to the top of the draw order, keeping its internal order.
    pub fn raise_group(&mut self, id: usize) {
        let root = self.groups.find(id);
        let (mut rest, group): (Vec<usize>, Vec<usize>) = self
            .z_order
            .iter()
            .copied()
            .partition(|&i| self.groups.find(i) != root);
        rest.extend(group);
        self.z_order = rest;
    }

    pub fn pick_up(&mut self, id: usize) {
        for member in self.groups.members(id) {
            self.pieces[member].set_selected(true);
        }
        self.raise_group(id);
    }

    /// Releases `id`'s group and runs the snap pass.
    ///
    /// Every group member is tested in all four directions, the dropped piece first; each
    /// snappable side merges, so one drop can join several groups.
    pub fn drop_piece(&mut self, id: usize) -> DropOutcome {
        let moved = self.pieces[id].has_moved();
        let mut candidates = self.groups.members(id);
        for &member in &candidates {
            self.pieces[member].set_selected(false);
        }
        candidates.sort_by_key(|&member| member != id);

        let mut merges = 0;
        for member in candidates {
            for dir in Direction::ALL {
                if self.is_snappable(member, dir) && self.connect(member, dir) {
                    merges += 1;
                }
            }
        }
        self.raise_group(id);

        DropOutcome {
            merges,
            moved,
            complete: self.is_complete(),
        }
    }

    pub fn draw(&self, gfx: &mut dyn Renderer2d) {
        for &id in &self.z_order {
            let piece = &self.pieces[id];
            if piece.is_selected() {
                let pos = piece.position();
                if let Some(shadow) = Rect::from_signed(
                    pos.x + SHADOW_OFFSET,
                    pos.y + SHADOW_OFFSET,
                    self.piece_width,
                    self.piece_height,
                ) {
                    gfx.blend_rect(shadow, SHADOW_COLOR, SHADOW_ALPHA);
                }
            }
            piece.draw(gfx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn build(rows: u32, cols: u32, seed: u64) -> Puzzle {
        let picture = Texture::from_fn(cols * 20, rows * 20, |x, y| [x as u8, y as u8, 0]);
        let config = PuzzleConfig {
            rows,
            cols,
            ..PuzzleConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Puzzle::new(&picture, &EdgeLibrary::classic(), &config, &mut rng).unwrap()
    }

    #[test]
    fn neighbor_respects_grid_borders() {
        let puzzle = build(2, 3, 1);
        assert_eq!(puzzle.neighbor(0, Direction::Top), None);
        assert_eq!(puzzle.neighbor(0, Direction::Left), None);
        assert_eq!(puzzle.neighbor(0, Direction::Right), Some(1));
        assert_eq!(puzzle.neighbor(0, Direction::Bottom), Some(3));
        assert_eq!(puzzle.neighbor(5, Direction::Right), None);
        assert_eq!(puzzle.neighbor(5, Direction::Bottom), None);
        assert_eq!(puzzle.neighbor(5, Direction::Top), Some(2));
        assert_eq!(puzzle.neighbor(2, Direction::Right), None);
    }

    #[test]
    fn raise_group_keeps_internal_order() {
        let mut puzzle = build(1, 3, 2);
        puzzle.z_order = vec![0, 2, 1];
        puzzle.groups.union(0, 1);
        puzzle.raise_group(1);
        assert_eq!(puzzle.z_order(), &[2, 0, 1]);
    }

    #[test]
    fn hit_test_prefers_topmost_piece() {
        let mut puzzle = build(1, 2, 3);
        puzzle.move_piece(0, Point::new(100, 100));
        puzzle.move_piece(1, Point::new(105, 105));
        puzzle.z_order = vec![0, 1];
        assert_eq!(puzzle.hit_test(Point::new(110, 110)), Some(1));
        puzzle.raise_group(0);
        assert_eq!(puzzle.hit_test(Point::new(110, 110)), Some(0));
        assert_eq!(puzzle.hit_test(Point::new(101, 101)), Some(0));
        assert_eq!(puzzle.hit_test(Point::new(5, 5)), None);
    }

    #[test]
    fn margin_is_a_quarter_of_the_short_side() {
        let puzzle = build(2, 2, 4);
        assert_eq!(puzzle.piece_size(), (20, 20));
        assert_eq!(puzzle.margin(), 5);
    }
}
