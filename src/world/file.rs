//! On-disk layout of a world file.
//!
//! ```yaml
//! devices:
//!   - position: [0, 64, 0]
//!     axis: y
//!   - position: [2, 64, 0]
//!     axis: y
//! rules:
//!   - id: create:crushing/raw_iron
//!     inputs: [raw_iron]
//!     outputs:
//!       - item: crushed_iron
//!       - item: experience_nugget
//!         chance: 0.75
//! ```

use serde::{Deserialize, Serialize};

use crate::grid::{Axis, Position};
use crate::rules::Rule;

/// The whole world file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldFile {
    /// Placed pairable devices.
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
    /// Every rule the simulated host knows.
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// One placed device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Where it stands.
    pub position: Position,
    /// What it spins around.
    pub axis: Axis,
}
