//! A file-backed host: placed devices plus the host's rule list.
//!
//! The `wheelpin` binary uses this to stand in for a live simulation. It
//! answers the [`DeviceView`] and [`RuleCatalog`] ports the way a real host
//! integration would.

mod file;

pub use file::{DeviceRecord, WorldFile};

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::context::ServiceContext;
use crate::grid::{Axis, Position};
use crate::ports::{DeviceView, RuleCatalog};
use crate::rules::{ConflictIndex, Rule, RuleId};

/// Loading a world file failed.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The file does not exist.
    #[error("World file not found: {0}")]
    NotFound(String),
    /// The file could not be read.
    #[error("Failed to read world file {path}: {message}")]
    Read {
        /// File path.
        path: String,
        /// Underlying error.
        message: String,
    },
    /// The file is not a valid world document.
    #[error("Failed to parse world file {path}: {source}")]
    Parse {
        /// File path.
        path: String,
        /// Underlying error.
        source: serde_yaml::Error,
    },
}

/// Devices and rules of one simulated world.
#[derive(Debug, Clone, Default)]
pub struct World {
    devices: HashMap<Position, Axis>,
    rules: Vec<Rule>,
    conflicts: ConflictIndex,
}

impl World {
    /// Builds a world from its file representation.
    ///
    /// A position listed twice keeps its last axis. Rules keep their file
    /// order, which is the order the host would try them in.
    #[must_use]
    pub fn from_file(file: WorldFile) -> Self {
        let devices = file.devices.iter().map(|d| (d.position, d.axis)).collect();
        let conflicts = ConflictIndex::build(&file.rules);
        Self { devices, rules: file.rules, conflicts }
    }

    /// Reads and parses the world file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or malformed.
    pub fn load(ctx: &ServiceContext, path: &Path) -> Result<Self, WorldError> {
        let display = path.display().to_string();
        if !ctx.fs.exists(path) {
            return Err(WorldError::NotFound(display));
        }
        let contents = ctx
            .fs
            .read_to_string(path)
            .map_err(|e| WorldError::Read { path: display.clone(), message: e.to_string() })?;
        let file: WorldFile = if contents.trim().is_empty() {
            WorldFile::default()
        } else {
            serde_yaml::from_str(&contents)
                .map_err(|source| WorldError::Parse { path: display.clone(), source })?
        };
        let world = Self::from_file(file);
        ctx.log.info(&format!(
            "Loaded world {display}: {} device(s), {} rule(s), {} ambiguous input(s)",
            world.devices.len(),
            world.rules.len(),
            world.conflicts.len()
        ));
        Ok(world)
    }

    /// Places (or replaces) a device.
    pub fn place(&mut self, position: Position, axis: Axis) {
        self.devices.insert(position, axis);
    }

    /// Removes a device. Returns `true` if one stood there.
    pub fn remove(&mut self, position: Position) -> bool {
        self.devices.remove(&position).is_some()
    }

    /// All devices in position order.
    #[must_use]
    pub fn devices(&self) -> BTreeMap<Position, Axis> {
        self.devices.iter().map(|(p, a)| (*p, *a)).collect()
    }

    /// All rules in host order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The rule called `id`, if any.
    #[must_use]
    pub fn rule(&self, id: &RuleId) -> Option<&Rule> {
        self.rules.iter().find(|r| &r.id == id)
    }

    /// The host's default pick for `input`: the first rule accepting it.
    #[must_use]
    pub fn default_rule(&self, input: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.accepts(input))
    }

    /// Inputs with more than one distinct-output rule.
    #[must_use]
    pub fn conflicts(&self) -> &ConflictIndex {
        &self.conflicts
    }
}

impl DeviceView for World {
    fn rotation_axis(&self, position: Position) -> Option<Axis> {
        self.devices.get(&position).copied()
    }
}

impl RuleCatalog for World {
    type Rule = Rule;

    fn find_applicable(&self, input: &str, id: &RuleId) -> Option<Rule> {
        self.rules.iter().find(|r| &r.id == id && r.accepts(input)).cloned()
    }
}
