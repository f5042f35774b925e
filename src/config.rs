//! Runtime settings for the `wheelpin` binary.
//!
//! Sources, lowest priority first: built-in defaults, a YAML file (named by
//! `WHEELPIN_CONFIG`, else `wheelpin.yaml` when present), then the
//! `WHEELPIN_STORE`, `WHEELPIN_WORLD`, `WHEELPIN_POLICY` and `WHEELPIN_LOG`
//! environment variables.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::pairing::LINK_DISTANCE;
use crate::ports::{FileSystem, Level};
use crate::store::LinkPolicy;

const DEFAULT_CONFIG_FILE: &str = "wheelpin.yaml";

/// A bad configuration value or file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file named by `WHEELPIN_CONFIG` does not exist.
    #[error("Config file not found: {0}")]
    NotFound(String),
    /// The config file could not be read.
    #[error("Failed to read config file {path}: {message}")]
    Read {
        /// File path.
        path: String,
        /// Underlying error.
        message: String,
    },
    /// The config file is not valid YAML for [`Settings`].
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        /// File path.
        path: String,
        /// Underlying error.
        source: serde_yaml::Error,
    },
    /// An environment variable holds an unusable value.
    #[error("Invalid {var}: {message}")]
    Env {
        /// Variable name.
        var: &'static str,
        /// What was wrong.
        message: String,
    },
    /// A setting is out of range.
    #[error("Invalid setting {name}: {message}")]
    Invalid {
        /// Setting name.
        name: &'static str,
        /// What was wrong.
        message: String,
    },
}

/// Resolved settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the link store is persisted.
    pub store_path: PathBuf,
    /// The world file the simulator reads devices and rules from.
    pub world_path: PathBuf,
    /// How link requests touching linked devices are handled.
    pub policy: LinkPolicy,
    /// Minimum level written to stderr.
    pub log_level: Level,
    /// Pair separation. Only the mechanical distance is accepted.
    pub link_distance: i32,
    /// Half-width of the cube scanned for invalid targets.
    pub search_radius: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(".wheelpin/links.yaml"),
            world_path: PathBuf::from("world.yaml"),
            policy: LinkPolicy::Pairwise,
            log_level: Level::Warn,
            link_distance: LINK_DISTANCE,
            search_radius: 3,
        }
    }
}

impl Settings {
    /// Loads settings from the process environment and config file.
    ///
    /// # Errors
    ///
    /// Returns an error for an unreadable or malformed config file or an
    /// invalid value.
    pub fn load(fs: &dyn FileSystem) -> Result<Self, ConfigError> {
        Self::from_sources(fs, |name| env::var(name).ok())
    }

    /// Loads settings using `var` to read environment variables.
    ///
    /// # Errors
    ///
    /// See [`Settings::load`].
    pub fn from_sources(
        fs: &dyn FileSystem,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut settings = match var("WHEELPIN_CONFIG") {
            Some(path) => {
                let path = PathBuf::from(path);
                if !fs.exists(&path) {
                    return Err(ConfigError::NotFound(path.display().to_string()));
                }
                Self::from_file(fs, &path)?
            }
            None if fs.exists(Path::new(DEFAULT_CONFIG_FILE)) => {
                Self::from_file(fs, Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        if let Some(store) = var("WHEELPIN_STORE") {
            settings.store_path = PathBuf::from(store);
        }
        if let Some(world) = var("WHEELPIN_WORLD") {
            settings.world_path = PathBuf::from(world);
        }
        if let Some(policy) = var("WHEELPIN_POLICY") {
            settings.policy = policy
                .parse()
                .map_err(|message| ConfigError::Env { var: "WHEELPIN_POLICY", message })?;
        }
        if let Some(level) = var("WHEELPIN_LOG") {
            settings.log_level = level
                .parse()
                .map_err(|message| ConfigError::Env { var: "WHEELPIN_LOG", message })?;
        }

        settings.validate()?;
        Ok(settings)
    }

    fn from_file(fs: &dyn FileSystem, path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let contents = fs
            .read_to_string(path)
            .map_err(|e| ConfigError::Read { path: display.clone(), message: e.to_string() })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents)
            .map_err(|source| ConfigError::Parse { path: display, source })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.link_distance != LINK_DISTANCE {
            return Err(ConfigError::Invalid {
                name: "link_distance",
                message: format!("must be {LINK_DISTANCE} (got {})", self.link_distance),
            });
        }
        if !(0..=16).contains(&self.search_radius) {
            return Err(ConfigError::Invalid {
                name: "search_radius",
                message: format!("must be between 0 and 16 (got {})", self.search_radius),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::adapters::memory::MemoryFileSystem;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_any_source() {
        let settings = Settings::from_sources(&MemoryFileSystem::new(), vars(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.store_path, PathBuf::from(".wheelpin/links.yaml"));
    }

    #[test]
    fn default_config_file_is_picked_up() {
        let fs = MemoryFileSystem::with_file(
            Path::new("wheelpin.yaml"),
            "policy: merge\nsearch_radius: 5\n",
        );
        let settings = Settings::from_sources(&fs, vars(&[])).unwrap();
        assert_eq!(settings.policy, LinkPolicy::Merge);
        assert_eq!(settings.search_radius, 5);
        assert_eq!(settings.world_path, PathBuf::from("world.yaml"));
    }

    #[test]
    fn environment_overrides_file() {
        let fs = MemoryFileSystem::with_file(
            Path::new("custom.yaml"),
            "store_path: from-file.yaml\nlog_level: info\n",
        );
        let settings = Settings::from_sources(
            &fs,
            vars(&[
                ("WHEELPIN_CONFIG", "custom.yaml"),
                ("WHEELPIN_STORE", "from-env.yaml"),
                ("WHEELPIN_LOG", "debug"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.store_path, PathBuf::from("from-env.yaml"));
        assert_eq!(settings.log_level, Level::Debug);
    }

    #[test]
    fn bad_values_are_rejected() {
        let fs = MemoryFileSystem::new();
        let err = Settings::from_sources(&fs, vars(&[("WHEELPIN_POLICY", "chaos")])).unwrap_err();
        assert!(err.to_string().starts_with("Invalid WHEELPIN_POLICY"));

        let err =
            Settings::from_sources(&fs, vars(&[("WHEELPIN_CONFIG", "gone.yaml")])).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));

        let fs = MemoryFileSystem::with_file(Path::new("wheelpin.yaml"), "link_distance: 3\n");
        let err = Settings::from_sources(&fs, vars(&[])).unwrap_err();
        assert!(err.to_string().contains("link_distance"));
    }
}
