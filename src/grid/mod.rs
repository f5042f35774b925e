//! Grid primitives: block positions, rotation axes and the six directions.

mod axis;
mod position;

pub use axis::{Axis, Direction};
pub use position::{ParsePositionError, Position};
