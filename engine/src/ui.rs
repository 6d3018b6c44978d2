//! Minimal UI layout primitives.
//!
//! Screen-space rects are unsigned (they always live on the surface); game objects that can be
//! dragged partly off-screen use signed coordinates and go through `Rect::from_signed` to clip.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_size(w: u32, h: u32) -> Self {
        Self { x: 0, y: 0, w, h }
    }

    /// Clips a signed rect against the surface origin.
    ///
    /// Returns `None` when nothing of the rect remains at non-negative coordinates.
    pub fn from_signed(x: i32, y: i32, w: u32, h: u32) -> Option<Self> {
        let cut_x = x.min(0).unsigned_abs();
        let cut_y = y.min(0).unsigned_abs();
        let w = w.checked_sub(cut_x).filter(|w| *w > 0)?;
        let h = h.checked_sub(cut_y).filter(|h| *h > 0)?;
        Some(Self {
            x: x.max(0) as u32,
            y: y.max(0) as u32,
            w,
            h,
        })
    }

    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x
            && px < self.x.saturating_add(self.w)
            && py >= self.y
            && py < self.y.saturating_add(self.h)
    }

    /// Returns the rectangle inset by `insets` (i.e. the inner content area).
    ///
    /// If insets exceed the rect size, the resulting width/height will saturate to 0.
    pub fn inset(&self, insets: Insets) -> Self {
        let w = self
            .w
            .saturating_sub(insets.left.saturating_add(insets.right));
        let h = self
            .h
            .saturating_sub(insets.top.saturating_add(insets.bottom));
        Self {
            x: self.x.saturating_add(insets.left),
            y: self.y.saturating_add(insets.top),
            w,
            h,
        }
    }

    /// Places a child of `size` inside this rect using the requested `anchor`.
    ///
    /// If `size` exceeds this rect, it is clamped to fit.
    pub fn place(&self, size: Size, anchor: Anchor) -> Self {
        let w = size.w.min(self.w);
        let h = size.h.min(self.h);

        let x = match anchor {
            Anchor::TopLeft => self.x,
            Anchor::TopCenter | Anchor::Center | Anchor::BottomCenter => {
                self.x.saturating_add(self.w.saturating_sub(w) / 2)
            }
        };

        let y = match anchor {
            Anchor::TopLeft | Anchor::TopCenter => self.y,
            Anchor::Center => self.y.saturating_add(self.h.saturating_sub(h) / 2),
            Anchor::BottomCenter => self.y.saturating_add(self.h.saturating_sub(h)),
        };

        Self { x, y, w, h }
    }

    /// Splits off a row of height `h` from the top, returning `(row, rest)`.
    pub fn take_top(&self, h: u32) -> (Self, Self) {
        let h = h.min(self.h);
        (
            Self::new(self.x, self.y, self.w, h),
            Self::new(self.x, self.y.saturating_add(h), self.w, self.h - h),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Insets {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Insets {
    pub fn all(v: u32) -> Self {
        Self {
            left: v,
            top: v,
            right: v,
            bottom: v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopCenter,
    Center,
    BottomCenter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inset_shrinks_rect_and_moves_origin() {
        let r = Rect::from_size(100, 80);
        let inner = r.inset(Insets::all(10));
        assert_eq!(inner, Rect::new(10, 10, 80, 60));
    }

    #[test]
    fn place_center_positions_child_in_parent() {
        let parent = Rect::from_size(100, 100);
        let child = parent.place(Size::new(20, 10), Anchor::Center);
        assert_eq!(child, Rect::new(40, 45, 20, 10));
    }

    #[test]
    fn place_bottom_center_positions_child_at_bottom() {
        let parent = Rect::from_size(100, 100);
        let child = parent.place(Size::new(20, 10), Anchor::BottomCenter);
        assert_eq!(child, Rect::new(40, 90, 20, 10));
    }

    #[test]
    fn from_signed_clips_negative_origin() {
        assert_eq!(Rect::from_signed(-5, 3, 10, 4), Some(Rect::new(0, 3, 5, 4)));
        assert_eq!(Rect::from_signed(-10, 0, 10, 4), None);
        assert_eq!(Rect::from_signed(2, 2, 3, 3), Some(Rect::new(2, 2, 3, 3)));
    }

    #[test]
    fn take_top_splits_rows() {
        let (row, rest) = Rect::new(0, 10, 50, 30).take_top(12);
        assert_eq!(row, Rect::new(0, 10, 50, 12));
        assert_eq!(rest, Rect::new(0, 22, 50, 18));
    }
}
