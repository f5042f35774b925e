//! Integer block positions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::axis::{Axis, Direction};

/// A block coordinate. Serialized as `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[i32; 3]", into = "[i32; 3]")]
pub struct Position {
    /// East-west component.
    pub x: i32,
    /// Vertical component.
    pub y: i32,
    /// North-south component.
    pub z: i32,
}

impl Position {
    /// Creates a position from its components.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Component along `axis`.
    #[must_use]
    pub fn along(self, axis: Axis) -> i32 {
        self.components()[axis.index()]
    }

    /// Components as an `[x, y, z]` array.
    #[must_use]
    pub fn components(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }

    /// The position `distance` steps away in `direction`, or `None` if it
    /// falls outside the `i32` grid.
    #[must_use]
    pub fn offset(self, direction: Direction, distance: i32) -> Option<Self> {
        let (dx, dy, dz) = direction.offset();
        let step = |at: i32, unit: i32| at.checked_add(unit.checked_mul(distance)?);
        Some(Self::new(step(self.x, dx)?, step(self.y, dy)?, step(self.z, dz)?))
    }

    /// The face-adjacent positions in [`Direction::ALL`] order. Neighbors
    /// beyond the edge of the grid are skipped.
    pub fn neighbors(self) -> impl Iterator<Item = Position> {
        Direction::ALL.into_iter().filter_map(move |d| self.offset(d, 1))
    }

    /// Componentwise difference `other - self` as `[dx, dy, dz]`, widened so
    /// it cannot overflow.
    #[must_use]
    pub fn delta(self, other: Position) -> [i64; 3] {
        let diff = |a: i32, b: i32| i64::from(b) - i64::from(a);
        [diff(self.x, other.x), diff(self.y, other.y), diff(self.z, other.z)]
    }

    /// Exact componentwise average of two positions.
    ///
    /// Returns `None` when any component sum is odd, since the average would
    /// not land on the grid.
    #[must_use]
    pub fn midpoint(a: Position, b: Position) -> Option<Position> {
        let half = |p: i32, q: i32| {
            let sum = i64::from(p) + i64::from(q);
            if sum % 2 == 0 {
                i32::try_from(sum / 2).ok()
            } else {
                None
            }
        };
        Some(Self::new(half(a.x, b.x)?, half(a.y, b.y)?, half(a.z, b.z)?))
    }
}

impl From<[i32; 3]> for Position {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Position> for [i32; 3] {
    fn from(p: Position) -> Self {
        p.components()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

/// Error returned when a position string is not `x,y,z`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid position '{0}' (expected x,y,z)")]
pub struct ParsePositionError(pub String);

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [x, y, z] = parts.as_slice() else {
            return Err(ParsePositionError(s.to_string()));
        };
        let parse = |v: &str| v.parse::<i32>().map_err(|_| ParsePositionError(s.to_string()));
        Ok(Self::new(parse(x)?, parse(y)?, parse(z)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_of_even_separation_is_exact() {
        let a = Position::new(0, 0, 0);
        let b = Position::new(2, 0, 0);
        assert_eq!(Position::midpoint(a, b), Some(Position::new(1, 0, 0)));
        assert_eq!(Position::midpoint(b, a), Some(Position::new(1, 0, 0)));
    }

    #[test]
    fn midpoint_handles_negative_coordinates() {
        let a = Position::new(-3, 64, -10);
        let b = Position::new(-3, 64, -12);
        assert_eq!(Position::midpoint(a, b), Some(Position::new(-3, 64, -11)));
    }

    #[test]
    fn midpoint_of_odd_separation_is_none() {
        let a = Position::new(0, 0, 0);
        let b = Position::new(3, 0, 0);
        assert_eq!(Position::midpoint(a, b), None);
    }

    #[test]
    fn neighbors_follow_direction_order() {
        let n: Vec<Position> = Position::new(1, 0, 0).neighbors().collect();
        assert_eq!(n[0], Position::new(1, -1, 0));
        assert_eq!(n[5], Position::new(2, 0, 0));
        assert_eq!(n.len(), 6);
    }

    #[test]
    fn offsets_stop_at_the_edge_of_the_grid() {
        let edge = Position::new(i32::MAX, 0, i32::MIN);
        assert_eq!(edge.offset(Direction::East, 2), None);
        assert_eq!(edge.offset(Direction::North, 1), None);
        assert_eq!(edge.offset(Direction::West, 2), Some(Position::new(i32::MAX - 2, 0, i32::MIN)));

        let n: Vec<Position> = edge.neighbors().collect();
        assert_eq!(n.len(), 4);
        assert!(!n.contains(&Position::new(i32::MIN, 0, i32::MIN)));
    }

    #[test]
    fn delta_spans_the_whole_range() {
        let a = Position::new(i32::MAX, 0, 0);
        let b = Position::new(i32::MIN + 1, 0, 0);
        assert_eq!(a.delta(b), [-(1_i64 << 32) + 2, 0, 0]);
        assert_eq!(b.delta(a)[0], (1_i64 << 32) - 2);
    }

    #[test]
    fn parses_and_displays_round_trip() {
        let p: Position = " 4, -2 ,7".parse().unwrap();
        assert_eq!(p, Position::new(4, -2, 7));
        assert_eq!(p.to_string(), "4,-2,7");
        assert!("1,2".parse::<Position>().is_err());
        assert!("a,b,c".parse::<Position>().is_err());
    }

    #[test]
    fn serializes_as_triple() {
        let yaml = serde_yaml::to_string(&Position::new(1, 2, 3)).unwrap();
        let back: Position = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, Position::new(1, 2, 3));
        assert!(yaml.contains('1') && yaml.contains('3'));
    }
}
