use std::ops::{Add, Sub};

/// Signed screen coordinate. Pieces may be dragged partly off-screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Self::Output {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Self::Output {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(u32, u32)> for Point {
    fn from((x, y): (u32, u32)) -> Self {
        Point::new(x as i32, y as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Right,
        Direction::Bottom,
        Direction::Left,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Right => Direction::Left,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
        }
    }

    /// `(d_row, d_col)` to the neighbouring grid cell.
    pub fn grid_offset(self) -> (i32, i32) {
        match self {
            Direction::Top => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Bottom => (1, 0),
            Direction::Left => (0, -1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution_and_offsets_cancel() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            let (r, c) = dir.grid_offset();
            let (or, oc) = dir.opposite().grid_offset();
            assert_eq!((r + or, c + oc), (0, 0));
        }
    }

    #[test]
    fn point_arithmetic_and_distance() {
        let a = Point::new(1, 2);
        let b = Point::new(4, 6);
        assert_eq!(b - a, Point::new(3, 4));
        assert_eq!(a + (b - a), b);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(Point::from((7u32, 9u32)), Point::new(7, 9));
    }
}
