//! Arena Coordinates
//!
//! Integer grid positions in arena-centered space, plus the four
//! movement directions.

use std::fmt;
use std::ops::{Add, Sub};
use serde::{Serialize, Deserialize};

/// A cell position in arena-centered space (origin at the map center).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Coordinate {
    /// Column offset from the center (grows to the right)
    pub x: i32,
    /// Row offset from the center (grows downward)
    pub y: i32,
}

impl Coordinate {
    /// The arena center.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a new coordinate.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Add another coordinate component-wise.
    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_add(other.x),
            y: self.y.wrapping_add(other.y),
        }
    }

    /// Subtract another coordinate component-wise.
    #[inline]
    pub fn sub(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_sub(other.x),
            y: self.y.wrapping_sub(other.y),
        }
    }

    /// Squared Euclidean distance (exact, no rounding).
    #[inline]
    pub fn distance_squared(self, other: Self) -> i64 {
        let dx = i64::from(other.x) - i64::from(self.x);
        let dy = i64::from(other.y) - i64::from(self.y);
        dx * dx + dy * dy
    }

    /// Euclidean distance truncated to an integer.
    pub fn distance(self, other: Self) -> i32 {
        (self.distance_squared(other) as f64).sqrt() as i32
    }

    /// Step one cell in the given direction.
    #[inline]
    pub fn step(self, direction: Direction) -> Self {
        self.add(direction.offset())
    }
}

impl Add for Coordinate {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Coordinate::add(self, other)
    }
}

impl Sub for Coordinate {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Coordinate::sub(self, other)
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Movement direction. `Stop` has zero displacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Toward negative Y
    Up,
    /// Toward positive Y
    Down,
    /// Toward negative X
    Left,
    /// Toward positive X
    Right,
    /// No displacement
    Stop,
}

impl Direction {
    /// The four directions that actually move.
    pub const MOVING: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit offset for this direction.
    #[inline]
    pub const fn offset(self) -> Coordinate {
        match self {
            Direction::Up => Coordinate::new(0, -1),
            Direction::Down => Coordinate::new(0, 1),
            Direction::Left => Coordinate::new(-1, 0),
            Direction::Right => Coordinate::new(1, 0),
            Direction::Stop => Coordinate::ORIGIN,
        }
    }

    /// Whether this direction produces any displacement.
    #[inline]
    pub fn is_moving(self) -> bool {
        self != Direction::Stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_add() {
        let a = Coordinate::new(3, -4);
        let b = Coordinate::new(-1, 2);
        assert_eq!(a + b, Coordinate::new(2, -2));
        assert_eq!(a - b, Coordinate::new(4, -6));
    }

    #[test]
    fn test_coordinate_distance() {
        // 3-4-5 triangle
        let a = Coordinate::new(0, 0);
        let b = Coordinate::new(3, 4);
        assert_eq!(a.distance_squared(b), 25);
        assert_eq!(a.distance(b), 5);

        // sqrt(2) truncates to 1
        assert_eq!(a.distance(Coordinate::new(1, 1)), 1);
        // sqrt(8) ~ 2.83 truncates to 2
        assert_eq!(a.distance(Coordinate::new(-2, 2)), 2);
    }

    #[test]
    fn test_direction_offsets() {
        let c = Coordinate::new(5, 5);
        assert_eq!(c.step(Direction::Up), Coordinate::new(5, 4));
        assert_eq!(c.step(Direction::Down), Coordinate::new(5, 6));
        assert_eq!(c.step(Direction::Left), Coordinate::new(4, 5));
        assert_eq!(c.step(Direction::Right), Coordinate::new(6, 5));
        assert_eq!(c.step(Direction::Stop), c);
        assert!(!Direction::Stop.is_moving());
    }
}
