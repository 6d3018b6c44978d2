//! Immutable RGB pictures and the text asset format they are stored in.
//!
//! Asset format: whitespace-separated tokens, `;` starts a comment line. The first two tokens are
//! width and height, followed by exactly `width * height` row-major colours written as `rrggbb`
//! hex (a leading `#` is allowed). Row breaks carry no meaning.

use std::fs;
use std::path::Path;

use crate::error::LoadError;

pub type Rgb = [u8; 3];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl Texture {
    pub fn new(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self, LoadError> {
        if width == 0 || height == 0 {
            return Err(LoadError::Header(format!(
                "dimensions must be positive, got {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(LoadError::PixelCount {
                expected,
                found: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Builds a texture by evaluating `f(x, y)` for every pixel.
    ///
    /// Zero dimensions are bumped to 1.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgb) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    fn clamped(&self, x: i64, y: i64) -> Rgb {
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        self.pixels[y * self.width as usize + x]
    }

    /// Extracts the `w x h` region whose top-left corner is `(x, y)`.
    ///
    /// The region may overhang the texture; samples outside repeat the nearest border pixel.
    pub fn region(&self, x: i32, y: i32, w: u32, h: u32) -> Texture {
        Texture::from_fn(w, h, |rx, ry| {
            self.clamped(x as i64 + rx as i64, y as i64 + ry as i64)
        })
    }

    /// Rotates clockwise by `quarter_turns * 90` degrees.
    pub fn rotated(&self, quarter_turns: u8) -> Texture {
        match quarter_turns % 4 {
            0 => self.clone(),
            1 => Texture::from_fn(self.height, self.width, |x, y| {
                self.clamped(y as i64, (self.height - 1 - x) as i64)
            }),
            2 => Texture::from_fn(self.width, self.height, |x, y| {
                self.clamped((self.width - 1 - x) as i64, (self.height - 1 - y) as i64)
            }),
            _ => Texture::from_fn(self.height, self.width, |x, y| {
                self.clamped((self.width - 1 - y) as i64, x as i64)
            }),
        }
    }

    pub fn flipped_horizontal(&self) -> Texture {
        Texture::from_fn(self.width, self.height, |x, y| {
            self.clamped((self.width - 1 - x) as i64, y as i64)
        })
    }

    pub fn flipped_vertical(&self) -> Texture {
        Texture::from_fn(self.width, self.height, |x, y| {
            self.clamped(x as i64, (self.height - 1 - y) as i64)
        })
    }
}

pub fn load_texture(path: impl AsRef<Path>) -> Result<Texture, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|err| LoadError::io(path, err))?;
    let texture = parse_texture(&text)?;
    log::debug!(
        "loaded {}x{} texture from {}",
        texture.width(),
        texture.height(),
        path.display()
    );
    Ok(texture)
}

pub fn parse_texture(text: &str) -> Result<Texture, LoadError> {
    let mut tokens = text
        .lines()
        .filter(|line| !line.trim_start().starts_with(';'))
        .flat_map(str::split_whitespace);

    let width = parse_dimension(tokens.next(), "width")?;
    let height = parse_dimension(tokens.next(), "height")?;
    let expected = width as usize * height as usize;

    let body: Vec<&str> = tokens.collect();
    if body.len() != expected {
        return Err(LoadError::PixelCount {
            expected,
            found: body.len(),
        });
    }

    let pixels = body
        .iter()
        .enumerate()
        .map(|(index, token)| {
            parse_color(token).ok_or_else(|| LoadError::Color {
                index,
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Texture::new(width, height, pixels)
}

fn parse_dimension(token: Option<&str>, name: &str) -> Result<u32, LoadError> {
    let token = token.ok_or_else(|| LoadError::Header(format!("missing {name}")))?;
    match token.parse::<u32>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(LoadError::Header(format!("{name} {token:?} is not a positive integer"))),
    }
}

fn parse_color(token: &str) -> Option<Rgb> {
    let hex = token.strip_prefix('#').unwrap_or(token);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: u32, height: u32) -> Texture {
        Texture::from_fn(width, height, |x, y| [x as u8, y as u8, 0])
    }

    #[test]
    fn parses_header_comments_and_wrapped_rows() {
        let text = "; tiny test picture\n2 2\nff0000 #00ff00\n; row two\n0000ff\nFFFFFF\n";
        let tex = parse_texture(text).unwrap();
        assert_eq!((tex.width(), tex.height()), (2, 2));
        assert_eq!(tex.get(0, 0), Some([255, 0, 0]));
        assert_eq!(tex.get(1, 0), Some([0, 255, 0]));
        assert_eq!(tex.get(0, 1), Some([0, 0, 255]));
        assert_eq!(tex.get(1, 1), Some([255, 255, 255]));
        assert_eq!(tex.get(2, 1), None);
    }

    #[test]
    fn rejects_bad_header() {
        assert!(matches!(parse_texture(""), Err(LoadError::Header(_))));
        assert!(matches!(parse_texture("3"), Err(LoadError::Header(_))));
        assert!(matches!(parse_texture("0 2"), Err(LoadError::Header(_))));
        assert!(matches!(parse_texture("x 2"), Err(LoadError::Header(_))));
    }

    #[test]
    fn rejects_bad_colour_with_its_index() {
        let err = parse_texture("2 1 000000 zz0000").unwrap_err();
        match err {
            LoadError::Color { index, token } => {
                assert_eq!(index, 1);
                assert_eq!(token, "zz0000");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            parse_texture("1 1 fff"),
            Err(LoadError::Color { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_wrong_pixel_count() {
        assert!(matches!(
            parse_texture("2 2 000000 000000 000000"),
            Err(LoadError::PixelCount {
                expected: 4,
                found: 3
            })
        ));
        assert!(matches!(
            parse_texture("1 1 000000 111111 222222"),
            Err(LoadError::PixelCount {
                expected: 1,
                found: 3
            })
        ));
    }

    #[test]
    fn region_extracts_and_clamps_overhang() {
        let tex = numbered(4, 3);
        let inner = tex.region(1, 1, 2, 2);
        assert_eq!(inner.get(0, 0), Some([1, 1, 0]));
        assert_eq!(inner.get(1, 1), Some([2, 2, 0]));

        let overhang = tex.region(-2, 2, 3, 2);
        assert_eq!(overhang.get(0, 0), Some([0, 2, 0]));
        assert_eq!(overhang.get(2, 1), Some([0, 2, 0]));
    }

    #[test]
    fn rotation_moves_corners_clockwise() {
        let tex = numbered(3, 2);
        let cw = tex.rotated(1);
        assert_eq!((cw.width(), cw.height()), (2, 3));
        // Old bottom-left becomes new top-left.
        assert_eq!(cw.get(0, 0), Some([0, 1, 0]));
        // Old top-left becomes new top-right.
        assert_eq!(cw.get(1, 0), Some([0, 0, 0]));

        assert_eq!(tex.rotated(4), tex);
        assert_eq!(tex.rotated(1).rotated(3), tex);
        assert_eq!(tex.rotated(2), tex.flipped_horizontal().flipped_vertical());
    }

    #[test]
    fn flips_mirror_axes() {
        let tex = numbered(3, 2);
        assert_eq!(tex.flipped_horizontal().get(0, 0), Some([2, 0, 0]));
        assert_eq!(tex.flipped_vertical().get(0, 0), Some([0, 1, 0]));
        assert_eq!(tex.flipped_horizontal().flipped_horizontal(), tex);
    }
}
