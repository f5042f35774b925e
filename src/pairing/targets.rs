//! Discovery of pairing candidates around a device.

use crate::grid::{Direction, Position};
use crate::ports::DeviceView;

use super::{is_valid_pair, LINK_DISTANCE};

/// Positions that `origin` could pair with right now.
///
/// Only the (at most four) cells [`LINK_DISTANCE`] away along directions
/// perpendicular to the origin's rotation axis are checked, in
/// [`Direction::ALL`] order. Empty when `origin` holds no pairable device.
#[must_use]
pub fn find_valid_targets<W: DeviceView + ?Sized>(world: &W, origin: Position) -> Vec<Position> {
    let Some(axis) = world.rotation_axis(origin) else {
        return Vec::new();
    };
    Direction::perpendicular_to(axis)
        .filter_map(|dir| origin.offset(dir, LINK_DISTANCE))
        .filter(|&candidate| is_valid_pair(world, origin, candidate))
        .collect()
}

/// The first valid partner of `origin`, if any.
#[must_use]
pub fn find_pair<W: DeviceView + ?Sized>(world: &W, origin: Position) -> Option<Position> {
    find_valid_targets(world, origin).into_iter().next()
}

/// Nearby pairable devices that `origin` cannot pair with.
///
/// Scans the cube of half-width `radius` around `origin`, skipping the
/// origin itself and every position in `valid`. Results are in x, y, z
/// scan order.
#[must_use]
pub fn find_invalid_targets<W: DeviceView + ?Sized>(
    world: &W,
    origin: Position,
    valid: &[Position],
    radius: i32,
) -> Vec<Position> {
    if !world.is_pairable(origin) {
        return Vec::new();
    }
    let mut found = Vec::new();
    for dx in -radius..=radius {
        for dy in -radius..=radius {
            for dz in -radius..=radius {
                if dx == 0 && dy == 0 && dz == 0 {
                    continue;
                }
                let (Some(x), Some(y), Some(z)) = (
                    origin.x.checked_add(dx),
                    origin.y.checked_add(dy),
                    origin.z.checked_add(dz),
                ) else {
                    continue;
                };
                let candidate = Position::new(x, y, z);
                if world.is_pairable(candidate) && !valid.contains(&candidate) {
                    found.push(candidate);
                }
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Axis;
    use crate::pairing::test_world::TestWorld;

    #[test]
    fn finds_only_perpendicular_matching_axis_targets() {
        let world = TestWorld::with(&[
            ((0, 0, 0), Axis::Y),
            ((2, 0, 0), Axis::Y),
            ((0, 0, -2), Axis::Y),
            ((-2, 0, 0), Axis::X),
            ((0, 2, 0), Axis::Y),
        ]);
        let targets = find_valid_targets(&world, Position::new(0, 0, 0));
        assert_eq!(targets, vec![Position::new(0, 0, -2), Position::new(2, 0, 0)]);
        assert_eq!(find_pair(&world, Position::new(0, 0, 0)), Some(Position::new(0, 0, -2)));
    }

    #[test]
    fn no_device_means_no_targets() {
        let world = TestWorld::with(&[((2, 0, 0), Axis::Y)]);
        assert!(find_valid_targets(&world, Position::new(0, 0, 0)).is_empty());
        assert_eq!(find_pair(&world, Position::new(0, 0, 0)), None);
        assert!(find_invalid_targets(&world, Position::new(0, 0, 0), &[], 3).is_empty());
    }

    #[test]
    fn invalid_targets_exclude_valid_ones_and_origin() {
        let world = TestWorld::with(&[
            ((0, 0, 0), Axis::Y),
            ((2, 0, 0), Axis::Y),
            ((0, 2, 0), Axis::Y),
            ((1, 1, 0), Axis::Z),
            ((4, 0, 0), Axis::Y),
        ]);
        let origin = Position::new(0, 0, 0);
        let valid = find_valid_targets(&world, origin);
        let invalid = find_invalid_targets(&world, origin, &valid, 3);

        assert_eq!(valid, vec![Position::new(2, 0, 0)]);
        assert_eq!(invalid, vec![Position::new(0, 2, 0), Position::new(1, 1, 0)]);
    }

    #[test]
    fn scans_stop_at_the_edge_of_the_grid() {
        let world = TestWorld::with(&[
            ((i32::MAX, 0, 0), Axis::Y),
            ((i32::MAX - 2, 0, 0), Axis::Y),
            ((i32::MAX - 1, 1, 0), Axis::Z),
            ((i32::MIN, 0, 0), Axis::Y),
        ]);
        let origin = Position::new(i32::MAX, 0, 0);
        let valid = find_valid_targets(&world, origin);
        assert_eq!(valid, vec![Position::new(i32::MAX - 2, 0, 0)]);
        assert_eq!(
            find_invalid_targets(&world, origin, &valid, 3),
            vec![Position::new(i32::MAX - 1, 1, 0)]
        );
    }
}
