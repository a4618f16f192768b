//! Driver registry.
//!
//! Maps a driver name to a factory, and hands out at most one live instance
//! per name for the registry's lifetime. The registry is an ordinary value
//! owned by the caller, so tests and independent namespaces each get their
//! own.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::{DriverSpec, VfsConfig};
use crate::vfs::drivers::{BlockDriver, ConfiguredDriver, FtpDriver, NativeDriver};
use crate::vfs::{DriverHandle, MountError, UnknownDriverError, VirtualFileSystem};

/// Builds a driver instance, using the clock for root timestamps.
pub type DriverFactory = Arc<dyn Fn(&dyn Clock) -> DriverHandle + Send + Sync>;

/// Registry of driver kinds and their live instances.
pub struct DriverRegistry {
    clock: Arc<dyn Clock>,
    factories: HashMap<String, DriverFactory>,
    instances: Mutex<HashMap<String, DriverHandle>>,
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.names())
            .field("live", &self.instances.lock().keys().cloned().collect::<Vec<_>>())
            .finish()
    }
}

impl DriverRegistry {
    /// Create a registry with the built-in `native`, `block`, and `ftp` kinds.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let mut registry = Self::empty(clock);
        registry.register(NativeDriver::NAME, |clock: &dyn Clock| -> DriverHandle {
            Arc::new(NativeDriver::new(clock))
        });
        registry.register(BlockDriver::NAME, |clock: &dyn Clock| -> DriverHandle {
            Arc::new(BlockDriver::new(clock))
        });
        registry.register(FtpDriver::NAME, |clock: &dyn Clock| -> DriverHandle {
            Arc::new(FtpDriver::new(clock))
        });
        registry
    }

    /// Create a registry with no driver kinds at all.
    pub fn empty(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            factories: HashMap::new(),
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Built-ins plus every driver declared in `config`.
    pub fn from_config(config: &VfsConfig, clock: Arc<dyn Clock>) -> Self {
        let mut registry = Self::new(clock);
        for spec in &config.drivers {
            registry.register_spec(spec.clone());
        }
        registry
    }

    /// Register a driver kind. Replaces any kind already registered under
    /// `name`; a live instance of the old kind stays live until [`reset`](Self::reset).
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&dyn Clock) -> DriverHandle + Send + Sync + 'static,
    {
        let name = name.into();
        debug!("Registered driver kind {}", name);
        self.factories.insert(name, Arc::new(factory));
    }

    /// Register a driver kind described by configuration.
    pub fn register_spec(&mut self, spec: DriverSpec) {
        let name = spec.name.clone();
        self.register(name, move |clock: &dyn Clock| -> DriverHandle {
            Arc::new(ConfiguredDriver::new(&spec, clock))
        });
    }

    /// Return the live driver for `name`, creating it on first use.
    pub fn create_or_get(&self, name: &str) -> Result<DriverHandle, UnknownDriverError> {
        let mut instances = self.instances.lock();
        if let Some(driver) = instances.get(name) {
            return Ok(Arc::clone(driver));
        }

        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| UnknownDriverError::new(name))?;
        let driver = factory(self.clock.as_ref());
        info!("Created {} driver (encoding={})", driver.name(), driver.encoding());
        instances.insert(name.to_string(), Arc::clone(&driver));
        Ok(driver)
    }

    /// Get the driver for `name` and mount a namespace on it.
    pub fn open(&self, name: &str) -> Result<VirtualFileSystem, OpenError> {
        let driver = self.create_or_get(name)?;
        Ok(VirtualFileSystem::new(driver, Arc::clone(&self.clock))?)
    }

    /// Returns true if a driver kind is registered under `name`.
    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered driver names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Drop every live instance. The next `create_or_get` builds fresh ones.
    pub fn reset(&self) {
        let mut instances = self.instances.lock();
        debug!("Resetting registry ({} live drivers)", instances.len());
        instances.clear();
    }

    /// The clock handed to drivers and namespaces opened through this registry.
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }
}

/// Failure from [`DriverRegistry::open`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OpenError {
    #[error(transparent)]
    UnknownDriver(#[from] UnknownDriverError),

    #[error(transparent)]
    Mount(#[from] MountError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TickClock;
    use crate::config::RootSpec;
    use crate::vfs::VfsNode;

    fn registry() -> DriverRegistry {
        DriverRegistry::new(Arc::new(TickClock::default()))
    }

    #[test]
    fn test_builtin_names() {
        let registry = registry();
        assert_eq!(registry.names(), vec!["block", "ftp", "native"]);
        assert!(registry.is_registered("ftp"));
        assert!(!registry.is_registered("smb"));
    }

    #[test]
    fn test_same_instance_per_name() {
        let registry = registry();
        let a = registry.create_or_get("ftp").unwrap();
        let b = registry.create_or_get("ftp").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.root().id(), b.root().id());

        let native = registry.create_or_get("native").unwrap();
        assert_ne!(native.root().id(), a.root().id());
    }

    #[test]
    fn test_unknown_driver() {
        let registry = registry();
        let err = registry.create_or_get("smb").unwrap_err();
        assert_eq!(err, UnknownDriverError::new("smb"));
        assert_eq!(err.name, "smb");
    }

    #[test]
    fn test_reset_builds_fresh_instances() {
        let registry = registry();
        let before = registry.create_or_get("block").unwrap();
        registry.reset();
        let after = registry.create_or_get("block").unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_ne!(before.root().id(), after.root().id());
    }

    #[test]
    fn test_independent_registries() {
        let a = registry().create_or_get("ftp").unwrap();
        let b = registry().create_or_get("ftp").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_register_spec() {
        let mut registry = DriverRegistry::empty(Arc::new(TickClock::default()));
        registry.register_spec(DriverSpec {
            name: "scratch".into(),
            encoding: "UTF-8".into(),
            root: RootSpec::Directory,
        });

        let driver = registry.create_or_get("scratch").unwrap();
        assert_eq!(driver.name(), "scratch");
        assert!(matches!(driver.root(), VfsNode::Directory(_)));
        assert!(registry.create_or_get("ftp").is_err());
    }

    #[test]
    fn test_open_mounts_once() {
        let registry = registry();
        let fs = registry.open("ftp").unwrap();
        assert!(fs.driver().is_mounted());
        assert_eq!(
            registry.open("ftp").unwrap_err(),
            OpenError::Mount(MountError::AlreadyMounted("ftp".into()))
        );
        assert_eq!(
            registry.open("smb").unwrap_err(),
            OpenError::UnknownDriver(UnknownDriverError::new("smb"))
        );
    }
}
