//! Pairing validation.
//!
//! Two devices form a working pair only when they spin around the same
//! axis and sit exactly two cells apart along one of the two directions
//! perpendicular to that axis, leaving one empty cell between them. That
//! cell is the pair's controller position.

mod targets;

pub use targets::{find_invalid_targets, find_pair, find_valid_targets};

use std::fmt;

use crate::grid::{Axis, Position};
use crate::ports::DeviceView;

/// Separation between the two members of a pair, in grid cells.
pub const LINK_DISTANCE: i32 = 2;

/// Why two positions cannot be paired.
///
/// Variants are listed in the order they are checked; the first failing
/// check is the one reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// The position holds no pairable device.
    NotPairable {
        /// The first offending position.
        position: Position,
    },
    /// The devices spin around different axes.
    AxisMismatch {
        /// Axis of the first device.
        first: Axis,
        /// Axis of the second device.
        second: Axis,
    },
    /// The positions differ on more than one axis, or not at all.
    NotCollinear,
    /// Collinear, but not [`LINK_DISTANCE`] apart.
    WrongDistance {
        /// The observed separation.
        distance: i64,
    },
    /// Correct distance, but along the shared rotation axis.
    AlongRotationAxis {
        /// The shared rotation axis.
        axis: Axis,
    },
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::NotPairable { position } => {
                write!(f, "no pairable device at {position}")
            }
            InvalidReason::AxisMismatch { first, second } => write!(
                f,
                "devices rotate around different axes ({first} and {second})"
            ),
            InvalidReason::NotCollinear => {
                f.write_str("devices are not in a straight line along one axis")
            }
            InvalidReason::WrongDistance { distance } => write!(
                f,
                "devices must be exactly {LINK_DISTANCE} blocks apart (found {distance})"
            ),
            InvalidReason::AlongRotationAxis { axis } => write!(
                f,
                "devices are aligned along their rotation axis ({axis}) - must be perpendicular"
            ),
        }
    }
}

impl std::error::Error for InvalidReason {}

/// A validated pair of devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair {
    /// First member as requested.
    pub a: Position,
    /// Second member as requested.
    pub b: Position,
    /// The shared rotation axis.
    pub axis: Axis,
    /// The cell between the two members.
    pub controller: Position,
}

/// Checks whether `a` and `b` can form a pair.
///
/// # Errors
///
/// Returns the first [`InvalidReason`] that applies, in declaration order.
pub fn validate<W: DeviceView + ?Sized>(
    world: &W,
    a: Position,
    b: Position,
) -> Result<Pair, InvalidReason> {
    let first = world.rotation_axis(a).ok_or(InvalidReason::NotPairable { position: a })?;
    let second = world.rotation_axis(b).ok_or(InvalidReason::NotPairable { position: b })?;
    if first != second {
        return Err(InvalidReason::AxisMismatch { first, second });
    }

    let separation = separation(a, b).ok_or(InvalidReason::NotCollinear)?;
    if separation.distance != i64::from(LINK_DISTANCE) {
        return Err(InvalidReason::WrongDistance { distance: separation.distance });
    }
    if separation.axis == first {
        return Err(InvalidReason::AlongRotationAxis { axis: first });
    }

    let controller = Position::midpoint(a, b).ok_or(InvalidReason::NotCollinear)?;
    Ok(Pair { a, b, axis: first, controller })
}

/// Returns `true` if `a` and `b` can form a pair.
#[must_use]
pub fn is_valid_pair<W: DeviceView + ?Sized>(world: &W, a: Position, b: Position) -> bool {
    validate(world, a, b).is_ok()
}

/// Returns why `a` and `b` cannot pair, or `None` if they can.
#[must_use]
pub fn reason_invalid<W: DeviceView + ?Sized>(
    world: &W,
    a: Position,
    b: Position,
) -> Option<InvalidReason> {
    validate(world, a, b).err()
}

/// The controller cell between two pair members, if it lies on the grid.
#[must_use]
pub fn controller_position(a: Position, b: Position) -> Option<Position> {
    Position::midpoint(a, b)
}

/// Returns `true` if `a` and `b` sit exactly [`LINK_DISTANCE`] apart along
/// a single axis. Ignores device state.
#[must_use]
pub fn is_pair_geometry(a: Position, b: Position) -> bool {
    separation(a, b).is_some_and(|s| s.distance == i64::from(LINK_DISTANCE))
}

struct Separation {
    axis: Axis,
    distance: i64,
}

fn separation(a: Position, b: Position) -> Option<Separation> {
    let delta = a.delta(b);
    let mut moved = Axis::ALL.into_iter().filter(|axis| delta[axis.index()] != 0);
    let axis = moved.next()?;
    if moved.next().is_some() {
        return None;
    }
    Some(Separation { axis, distance: delta[axis.index()].abs() })
}
