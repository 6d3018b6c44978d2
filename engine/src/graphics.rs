use crate::{surface::SurfaceSize, ui::Rect};

pub type Color = [u8; 4];

// 3x5 block font.
pub const DEFAULT_TEXT_SCALE: u32 = 2;
const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;

fn glyph_advance_x(scale: u32) -> u32 {
    (GLYPH_W + 1) * scale.max(1)
}

fn line_advance_y(scale: u32) -> u32 {
    (GLYPH_H + 1) * scale.max(1)
}

/// Pixel size of `text` when drawn with `draw_text_scaled` (widest line wins).
pub fn text_size(text: &str, scale: u32) -> (u32, u32) {
    let lines = text.split('\n').count().max(1) as u32;
    let widest = text
        .split('\n')
        .map(|line| line.chars().count() as u32)
        .max()
        .unwrap_or(0);
    let w = (widest * glyph_advance_x(scale)).saturating_sub(scale.max(1));
    let h = (lines * line_advance_y(scale)).saturating_sub(scale.max(1));
    (w, h)
}

/// Unified 2D rendering interface.
///
/// Game code only talks to this trait. Headful runs hand out a `CpuRenderer` over the `pixels`
/// frame, tests hand out one over an `RgbaBufferSurface`.
pub trait Renderer2d {
    fn begin_frame(&mut self, size: SurfaceSize);
    fn size(&self) -> SurfaceSize;

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Alpha-blended rect over existing content (alpha is applied to `color`'s RGB).
    fn blend_rect(&mut self, rect: Rect, color: Color, alpha: u8);

    fn rect_outline(&mut self, rect: Rect, color: Color);

    /// Copies a `width * height` RGBA image with its top-left corner at `(x, y)`.
    ///
    /// The position is signed so images may hang off any edge; they are clipped to the surface.
    /// Source pixels with alpha 0 are skipped, everything else is written opaque.
    fn blit_rgba(&mut self, x: i32, y: i32, width: u32, height: u32, rgba: &[u8]);

    fn draw_text_scaled(&mut self, x: u32, y: u32, text: &str, color: Color, scale: u32);

    fn draw_text(&mut self, x: u32, y: u32, text: &str, color: Color) {
        self.draw_text_scaled(x, y, text, color, DEFAULT_TEXT_SCALE);
    }

    fn clear(&mut self, color: Color) {
        let s = self.size();
        self.fill_rect(Rect::from_size(s.width, s.height), color);
    }
}

/// CPU renderer that draws into an RGBA frame buffer.
pub struct CpuRenderer<'a> {
    frame: &'a mut [u8],
    size: SurfaceSize,
}

impl<'a> CpuRenderer<'a> {
    pub fn new(frame: &'a mut [u8], size: SurfaceSize) -> Self {
        Self { frame, size }
    }

    /// Runs `f` over every clipped row of `rect`, handing it the row's pixel bytes.
    fn for_each_row(&mut self, rect: Rect, mut f: impl FnMut(&mut [u8])) {
        let width = self.size.width;
        let height = self.size.height;

        let max_x = rect.x.saturating_add(rect.w).min(width);
        let max_y = rect.y.saturating_add(rect.h).min(height);
        if rect.x >= max_x || rect.y >= max_y {
            return;
        }
        if self.frame.len() < self.size.rgba_len() {
            return;
        }

        let stride = width as usize * 4;
        let row_bytes = (max_x - rect.x) as usize * 4;
        let mut row_start = rect.y as usize * stride + rect.x as usize * 4;
        for _ in rect.y..max_y {
            f(&mut self.frame[row_start..row_start + row_bytes]);
            row_start += stride;
        }
    }
}

impl Renderer2d for CpuRenderer<'_> {
    fn begin_frame(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.for_each_row(rect, |row| {
            for px in row.chunks_exact_mut(4) {
                px.copy_from_slice(&color);
            }
        });
    }

    fn blend_rect(&mut self, rect: Rect, color: Color, alpha: u8) {
        if alpha == 0 {
            return;
        }
        if alpha == 255 {
            self.fill_rect(rect, color);
            return;
        }

        let a = alpha as u32;
        let inv = 255u32 - a;
        self.for_each_row(rect, |row| {
            for px in row.chunks_exact_mut(4) {
                for c in 0..3 {
                    px[c] = ((px[c] as u32 * inv + color[c] as u32 * a + 127) / 255) as u8;
                }
                px[3] = 255;
            }
        });
    }

    fn rect_outline(&mut self, rect: Rect, color: Color) {
        if rect.w == 0 || rect.h == 0 {
            return;
        }

        let x1 = rect.x.saturating_add(rect.w).min(self.size.width);
        let y1 = rect.y.saturating_add(rect.h).min(self.size.height);
        if rect.x >= x1 || rect.y >= y1 {
            return;
        }

        let w = x1 - rect.x;
        let h = y1 - rect.y;

        // Top / bottom.
        self.fill_rect(Rect::new(rect.x, rect.y, w, 1), color);
        if h > 1 {
            self.fill_rect(Rect::new(rect.x, y1 - 1, w, 1), color);
        }

        // Left / right.
        self.fill_rect(Rect::new(rect.x, rect.y, 1, h), color);
        if w > 1 {
            self.fill_rect(Rect::new(x1 - 1, rect.y, 1, h), color);
        }
    }

    fn blit_rgba(&mut self, x: i32, y: i32, width: u32, height: u32, rgba: &[u8]) {
        let src_len = (width as usize) * (height as usize) * 4;
        if rgba.len() < src_len || self.frame.len() < self.size.rgba_len() {
            return;
        }

        let dst_w = self.size.width as i64;
        let dst_h = self.size.height as i64;
        let x0 = (x as i64).max(0);
        let y0 = (y as i64).max(0);
        let x1 = (x as i64 + width as i64).min(dst_w);
        let y1 = (y as i64 + height as i64).min(dst_h);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        for dy in y0..y1 {
            let sy = (dy - y as i64) as usize;
            for dx in x0..x1 {
                let sx = (dx - x as i64) as usize;
                let src = (sy * width as usize + sx) * 4;
                if rgba[src + 3] == 0 {
                    continue;
                }
                let dst = ((dy * dst_w + dx) * 4) as usize;
                self.frame[dst..dst + 3].copy_from_slice(&rgba[src..src + 3]);
                self.frame[dst + 3] = 255;
            }
        }
    }

    fn draw_text_scaled(&mut self, x: u32, y: u32, text: &str, color: Color, scale: u32) {
        let width = self.size.width;
        let height = self.size.height;
        let scale = scale.max(1);
        let adv_x = glyph_advance_x(scale);
        let adv_y = line_advance_y(scale);

        let mut cursor_x = x;
        let mut cursor_y = y;

        for ch in text.chars() {
            match ch {
                '\n' => {
                    cursor_x = x;
                    cursor_y = cursor_y.saturating_add(adv_y);
                    if cursor_y >= height {
                        break;
                    }
                    continue;
                }
                ' ' => {
                    cursor_x = cursor_x.saturating_add(adv_x);
                    continue;
                }
                _ => {}
            }

            if cursor_x < width {
                self.draw_glyph(cursor_x, cursor_y, ch, color, scale);
            }
            cursor_x = cursor_x.saturating_add(adv_x);
        }
    }
}

impl CpuRenderer<'_> {
    fn draw_glyph(&mut self, x: u32, y: u32, ch: char, color: Color, scale: u32) {
        for (row, bits) in glyph_rows(ch).into_iter().enumerate() {
            let py = y.saturating_add(row as u32 * scale);
            for col in 0..GLYPH_W {
                if bits & (1u8 << (GLYPH_W - 1 - col)) == 0 {
                    continue;
                }
                let px = x.saturating_add(col * scale);
                self.fill_rect(Rect::new(px, py, scale, scale), color);
            }
        }
    }
}

fn glyph_rows(ch: char) -> [u8; GLYPH_H as usize] {
    match ch.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],

        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b111, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b101, 0b111, 0b111, 0b111, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b111, 0b101, 0b111, 0b110, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],

        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],

        _ => [0b111, 0b001, 0b010, 0b000, 0b010], // '?'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_size_accounts_for_lines_and_trailing_gap() {
        assert_eq!(text_size("AB", 1), (7, 5));
        assert_eq!(text_size("A\nBCD", 2), (22, 22));
        assert_eq!(text_size("", 1), (0, 5));
    }
}
