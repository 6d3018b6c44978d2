use engine::graphics::Renderer2d;

use crate::edge::{Edge, EdgeLibrary};
use crate::geom::{Direction, Point};
use crate::texture::Texture;

/// How much visible pixels on a piece outline are darkened, out of 255.
const OUTLINE_SHADE: u32 = 90;

/// One tile of the puzzle.
///
/// The image covers the cell plus `margin` pixels on every side so tabs can reach into the
/// neighbouring cells; the silhouette decides which of those pixels belong to this piece.
#[derive(Debug, Clone)]
pub struct Piece {
    row: u32,
    col: u32,
    width: u32,
    height: u32,
    margin: u32,
    image: Texture,
    edges: [Edge; 4],
    mask: Vec<bool>,
    sprite: Vec<u8>,
    position: Point,
    selected: bool,
    moved: bool,
}

impl Piece {
    /// Cuts the piece at `(row, col)` out of `picture`.
    pub fn cut(
        picture: &Texture,
        row: u32,
        col: u32,
        (width, height): (u32, u32),
        margin: u32,
        edges: [Edge; 4],
        library: &EdgeLibrary,
    ) -> Self {
        let image = picture.region(
            (col * width) as i32 - margin as i32,
            (row * height) as i32 - margin as i32,
            width + 2 * margin,
            height + 2 * margin,
        );
        let mask = silhouette(width, height, margin, &edges, library);
        let sprite = bake_sprite(&image, &mask);
        Self {
            row,
            col,
            width,
            height,
            margin,
            image,
            edges,
            mask,
            sprite,
            position: Point::ZERO,
            selected: false,
            moved: false,
        }
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn col(&self) -> u32 {
        self.col
    }

    pub fn image(&self) -> &Texture {
        &self.image
    }

    pub fn edges(&self) -> &[Edge; 4] {
        &self.edges
    }

    pub fn edge(&self, dir: Direction) -> Edge {
        self.edges[dir.index()]
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn has_moved(&self) -> bool {
        self.moved
    }

    pub fn margin(&self) -> u32 {
        self.margin
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether image pixel `(x, y)` belongs to this piece's silhouette.
    pub fn is_opaque(&self, x: u32, y: u32) -> bool {
        let iw = self.image.width();
        if x >= iw || y >= self.image.height() {
            return false;
        }
        self.mask[(y * iw + x) as usize]
    }

    /// Whether `point` falls inside the cell's bounding box at the current position.
    pub fn bounds_contain(&self, point: Point) -> bool {
        point.x >= self.position.x
            && point.x < self.position.x + self.width as i32
            && point.y >= self.position.y
            && point.y < self.position.y + self.height as i32
    }

    /// Midpoint of the cell edge on side `dir`, in screen space.
    pub fn edge_midpoint(&self, dir: Direction) -> Point {
        let Point { x, y } = self.position;
        let w = self.width as i32;
        let h = self.height as i32;
        match dir {
            Direction::Top => Point::new(x + w / 2, y),
            Direction::Right => Point::new(x + w, y + h / 2),
            Direction::Bottom => Point::new(x + w / 2, y + h),
            Direction::Left => Point::new(x, y + h / 2),
        }
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub(crate) fn translate(&mut self, delta: Point) {
        self.position = self.position + delta;
        if delta != Point::ZERO {
            self.moved = true;
        }
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
        if selected {
            self.moved = false;
        }
    }

    pub fn draw(&self, gfx: &mut dyn Renderer2d) {
        let m = self.margin as i32;
        gfx.blit_rgba(
            self.position.x - m,
            self.position.y - m,
            self.image.width(),
            self.image.height(),
            &self.sprite,
        );
    }
}

/// Depth in pixels reached by `edge` at pixel `along` of an edge `len` pixels long.
///
/// The first and last `margin` pixels of every edge stay flat, so two perpendicular edges never
/// claim the same corner pixel.
fn edge_depth(library: &EdgeLibrary, edge: Edge, along: i32, len: i32, margin: u32) -> f32 {
    let m = margin as i32;
    match edge {
        Edge::Flat => 0.0,
        Edge::Shaped(_) if along < m || along >= len - m => 0.0,
        Edge::Shaped(r) => {
            let t = (along as f32 + 0.5) / len as f32;
            library.shape(r).depth_at(t) * margin as f32
        }
    }
}

/// A pixel `k` rows away from the cell edge lies inside a silhouette of depth `depth`.
///
/// Tabs and sockets use the same test with the same `k`, which is what makes them interlock
/// without gaps or overlap.
fn reaches(k: i32, depth: f32) -> bool {
    (k as f32) + 0.5 < depth
}

fn silhouette(width: u32, height: u32, margin: u32, edges: &[Edge; 4], library: &EdgeLibrary) -> Vec<bool> {
    let iw = width + 2 * margin;
    let ih = height + 2 * margin;
    let (w, h, m) = (width as i32, height as i32, margin as i32);
    let edge = |dir: Direction| edges[dir.index()];

    let mut mask = Vec::with_capacity((iw * ih) as usize);
    for py in 0..ih as i32 {
        for px in 0..iw as i32 {
            let cx = px - m;
            let cy = py - m;
            let in_x = (0..w).contains(&cx);
            let in_y = (0..h).contains(&cy);

            let tab = |dir: Direction, k: i32, along: i32, len: i32| {
                let e = edge(dir);
                e.is_tab() && reaches(k, edge_depth(library, e, along, len, margin))
            };

            let visible = if in_x && in_y {
                let carved = Direction::ALL.into_iter().any(|dir| {
                    let e = edge(dir);
                    if !e.is_socket() {
                        return false;
                    }
                    let (k, along, len) = match dir {
                        Direction::Top => (cy, cx, w),
                        Direction::Bottom => (h - 1 - cy, cx, w),
                        Direction::Left => (cx, cy, h),
                        Direction::Right => (w - 1 - cx, cy, h),
                    };
                    reaches(k, edge_depth(library, e, along, len, margin))
                });
                !carved
            } else if in_x && cy < 0 {
                tab(Direction::Top, -cy - 1, cx, w)
            } else if in_x && cy >= h {
                tab(Direction::Bottom, cy - h, cx, w)
            } else if in_y && cx < 0 {
                tab(Direction::Left, -cx - 1, cy, h)
            } else if in_y && cx >= w {
                tab(Direction::Right, cx - w, cy, h)
            } else {
                false
            };
            mask.push(visible);
        }
    }
    mask
}

/// RGBA sprite: masked-out pixels are transparent, pixels on the silhouette outline are shaded.
fn bake_sprite(image: &Texture, mask: &[bool]) -> Vec<u8> {
    let iw = image.width() as i64;
    let ih = image.height() as i64;
    let opaque = |x: i64, y: i64| x >= 0 && y >= 0 && x < iw && y < ih && mask[(y * iw + x) as usize];

    let mut sprite = Vec::with_capacity(mask.len() * 4);
    for (i, rgb) in image.pixels().iter().enumerate() {
        let x = i as i64 % iw;
        let y = i as i64 / iw;
        if !mask[i] {
            sprite.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        let outline = !(opaque(x - 1, y) && opaque(x + 1, y) && opaque(x, y - 1) && opaque(x, y + 1));
        let shade = |c: u8| {
            if outline {
                (c as u32 * (255 - OUTLINE_SHADE) / 255) as u8
            } else {
                c
            }
        };
        sprite.extend_from_slice(&[shade(rgb[0]), shade(rgb[1]), shade(rgb[2]), 255]);
    }
    sprite
}
