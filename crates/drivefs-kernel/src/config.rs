//! TOML configuration: default driver and extra driver kinds.
//!
//! ```toml
//! default_driver = "scratch"
//!
//! [[drivers]]
//! name = "scratch"
//! encoding = "UTF-8"
//! root = { kind = "directory" }
//!
//! [[drivers]]
//! name = "rom"
//! encoding = "ASCII"
//! root = { kind = "file", name = "rom.bin" }
//! ```

use std::collections::HashSet;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vfs::drivers::{BlockDriver, FtpDriver, NativeDriver};
use crate::vfs::path;

/// Names reserved by the built-in drivers.
pub const BUILTIN_DRIVERS: [&str; 3] = [NativeDriver::NAME, BlockDriver::NAME, FtpDriver::NAME];

/// Configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Shape of a configured driver's root node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RootSpec {
    /// A directory at `/`; the namespace can grow below it.
    Directory,
    /// A single named file at `/`.
    File { name: String },
}

/// A driver kind declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverSpec {
    pub name: String,
    pub encoding: String,
    pub root: RootSpec,
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VfsConfig {
    /// Driver used when the caller does not pick one.
    #[serde(default = "default_driver")]
    pub default_driver: String,

    /// Extra driver kinds, registered alongside the built-ins.
    #[serde(default)]
    pub drivers: Vec<DriverSpec>,
}

fn default_driver() -> String {
    FtpDriver::NAME.to_string()
}

impl Default for VfsConfig {
    fn default() -> Self {
        Self {
            default_driver: default_driver(),
            drivers: Vec::new(),
        }
    }
}

impl VfsConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: VfsConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Check names are unique, non-empty, and don't shadow built-ins, and
    /// that the default driver exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for spec in &self.drivers {
            if spec.name.trim().is_empty() {
                return Err(ConfigError::Invalid("driver name must not be empty".into()));
            }
            if BUILTIN_DRIVERS.contains(&spec.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "driver {} shadows a built-in driver",
                    spec.name
                )));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "driver {} declared twice",
                    spec.name
                )));
            }
            if let RootSpec::File { name } = &spec.root {
                path::validate_name(name).map_err(|_| {
                    ConfigError::Invalid(format!(
                        "driver {} has an invalid root file name: {:?}",
                        spec.name, name
                    ))
                })?;
            }
        }

        let default_known = BUILTIN_DRIVERS.contains(&self.default_driver.as_str())
            || seen.contains(self.default_driver.as_str());
        if !default_known {
            return Err(ConfigError::Invalid(format!(
                "default driver {} is not defined",
                self.default_driver
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_defaults_to_ftp() {
        let config = VfsConfig::from_toml("").unwrap();
        assert_eq!(config, VfsConfig::default());
        assert_eq!(config.default_driver, "ftp");
    }

    #[test]
    fn test_parse_drivers() {
        let config = VfsConfig::from_toml(
            r#"
            default_driver = "rom"

            [[drivers]]
            name = "scratch"
            encoding = "UTF-8"
            root = { kind = "directory" }

            [[drivers]]
            name = "rom"
            encoding = "ASCII"
            root = { kind = "file", name = "rom.bin" }
            "#,
        )
        .unwrap();

        assert_eq!(config.default_driver, "rom");
        assert_eq!(config.drivers.len(), 2);
        assert_eq!(config.drivers[0].root, RootSpec::Directory);
        assert_eq!(
            config.drivers[1].root,
            RootSpec::File {
                name: "rom.bin".into()
            }
        );
    }

    #[test]
    fn test_rejects_builtin_shadowing() {
        let err = VfsConfig::from_toml(
            r#"
            [[drivers]]
            name = "ftp"
            encoding = "UTF-8"
            root = { kind = "directory" }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_duplicates_and_unknown_default() {
        let dup = r#"
            [[drivers]]
            name = "x"
            encoding = "UTF-8"
            root = { kind = "directory" }

            [[drivers]]
            name = "x"
            encoding = "ASCII"
            root = { kind = "directory" }
        "#;
        assert!(matches!(VfsConfig::from_toml(dup), Err(ConfigError::Invalid(_))));

        let unknown = r#"default_driver = "smb""#;
        assert!(matches!(VfsConfig::from_toml(unknown), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_bad_root_file_name() {
        let bad = r#"
            [[drivers]]
            name = "x"
            encoding = "UTF-8"
            root = { kind = "file", name = "a/b" }
        "#;
        assert!(matches!(VfsConfig::from_toml(bad), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_parse_error() {
        let err = VfsConfig::from_toml("default_driver = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("drivefs.toml");
        std::fs::write(&file, "default_driver = \"block\"\n").unwrap();

        let config = VfsConfig::load(&file).unwrap();
        assert_eq!(config.default_driver, "block");

        let missing = VfsConfig::load(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Read(_))));
    }
}
