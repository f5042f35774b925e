//! Device view port: what the host world says about a grid position.

use crate::grid::{Axis, Position};

/// Read-only view of the pairable devices placed in the host world.
///
/// The core never inspects concrete host block types; it only asks whether
/// a position holds something that can be paired and which way it spins.
pub trait DeviceView {
    /// Returns the rotation axis of the pairable device at `position`,
    /// or `None` when the position holds no pairable device.
    fn rotation_axis(&self, position: Position) -> Option<Axis>;

    /// Returns `true` if `position` holds a pairable device.
    fn is_pairable(&self, position: Position) -> bool {
        self.rotation_axis(position).is_some()
    }
}

impl<T: DeviceView + ?Sized> DeviceView for &T {
    fn rotation_axis(&self, position: Position) -> Option<Axis> {
        (**self).rotation_axis(position)
    }
}
