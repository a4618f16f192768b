//! Driver trait and shared lifecycle state.
//!
//! A driver is the backend a [`VirtualFileSystem`](super::VirtualFileSystem)
//! mounts. It owns one root node and a mount state; everything else lives in
//! the namespace built on top of it.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use super::error::MountError;
use super::types::VfsNode;

/// Mount lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MountState {
    #[default]
    Unmounted,
    Mounted,
}

/// Proof of one particular mount of a driver.
///
/// Every successful `mount` hands out a fresh token. Once the driver is
/// unmounted, that token never matches again, even after a remount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MountToken(u64);

impl MountToken {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Core driver operations.
///
/// `mount`/`unmount` take `&self` so a driver can be shared through a
/// [`DriverHandle`]; implementations keep their state behind a lock.
pub trait Driver: Send + Sync + fmt::Debug {
    /// Driver name, e.g. `ftp`.
    fn name(&self) -> &str;

    /// Encoding used for file names. Descriptive only; nothing is transcoded.
    fn encoding(&self) -> &str;

    /// Snapshot of the driver's designated root node.
    fn root(&self) -> VfsNode;

    /// Replace the stored root node. Namespaces call this whenever they
    /// change the root, so its state outlives any one mount.
    fn store_root(&self, root: VfsNode);

    /// Current lifecycle state.
    fn state(&self) -> MountState;

    /// Unmounted → Mounted.
    fn mount(&self) -> Result<MountToken, MountError>;

    /// Mounted → Unmounted, whoever holds the mount.
    fn unmount(&self) -> Result<(), MountError>;

    /// Token of the live mount, if any.
    fn current_mount(&self) -> Option<MountToken>;

    /// Unmount only if `token` is the live mount.
    fn release(&self, token: MountToken) -> Result<(), MountError>;

    fn is_mounted(&self) -> bool {
        self.state() == MountState::Mounted
    }
}

/// Shared handle to a live driver.
pub type DriverHandle = Arc<dyn Driver>;

#[derive(Debug, Default)]
struct MountSlot {
    state: MountState,
    generation: u64,
}

/// State every driver variant carries: identity, root, and mount state.
#[derive(Debug)]
pub struct DriverCore {
    name: String,
    encoding: String,
    root: RwLock<VfsNode>,
    mount: Mutex<MountSlot>,
}

impl DriverCore {
    pub fn new(name: impl Into<String>, encoding: impl Into<String>, root: VfsNode) -> Self {
        Self {
            name: name.into(),
            encoding: encoding.into(),
            root: RwLock::new(root),
            mount: Mutex::new(MountSlot::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn root(&self) -> VfsNode {
        self.root.read().clone()
    }

    /// The root keeps its identity; only its state is replaced.
    pub fn store_root(&self, root: VfsNode) {
        let mut current = self.root.write();
        if current.id() != root.id() {
            warn!(
                "Ignoring root update for {} driver: node {} is not its root",
                self.name,
                root.id().short()
            );
            return;
        }
        *current = root;
    }

    pub fn state(&self) -> MountState {
        self.mount.lock().state
    }

    pub fn mount(&self) -> Result<MountToken, MountError> {
        let mut slot = self.mount.lock();
        match slot.state {
            MountState::Mounted => Err(MountError::AlreadyMounted(self.name.clone())),
            MountState::Unmounted => {
                slot.state = MountState::Mounted;
                slot.generation += 1;
                info!(
                    "Mounted driver {} (encoding={}, generation={})",
                    self.name, self.encoding, slot.generation
                );
                Ok(MountToken(slot.generation))
            }
        }
    }

    pub fn unmount(&self) -> Result<(), MountError> {
        let mut slot = self.mount.lock();
        match slot.state {
            MountState::Unmounted => Err(MountError::NotMounted(self.name.clone())),
            MountState::Mounted => {
                slot.state = MountState::Unmounted;
                info!("Unmounted driver {}", self.name);
                Ok(())
            }
        }
    }

    pub fn current_mount(&self) -> Option<MountToken> {
        let slot = self.mount.lock();
        match slot.state {
            MountState::Mounted => Some(MountToken(slot.generation)),
            MountState::Unmounted => None,
        }
    }

    pub fn release(&self, token: MountToken) -> Result<(), MountError> {
        let mut slot = self.mount.lock();
        if slot.state != MountState::Mounted || slot.generation != token.0 {
            return Err(MountError::NotMounted(self.name.clone()));
        }
        slot.state = MountState::Unmounted;
        info!("Unmounted driver {} (generation={})", self.name, token.0);
        Ok(())
    }
}

/// Implement [`Driver`] for a type with a `core: DriverCore` field.
macro_rules! impl_driver_via_core {
    ($T:ty) => {
        impl $crate::vfs::driver::Driver for $T {
            fn name(&self) -> &str {
                self.core.name()
            }

            fn encoding(&self) -> &str {
                self.core.encoding()
            }

            fn root(&self) -> $crate::vfs::types::VfsNode {
                self.core.root()
            }

            fn store_root(&self, root: $crate::vfs::types::VfsNode) {
                self.core.store_root(root)
            }

            fn state(&self) -> $crate::vfs::driver::MountState {
                self.core.state()
            }

            fn mount(
                &self,
            ) -> Result<$crate::vfs::driver::MountToken, $crate::vfs::error::MountError> {
                self.core.mount()
            }

            fn unmount(&self) -> Result<(), $crate::vfs::error::MountError> {
                self.core.unmount()
            }

            fn current_mount(&self) -> Option<$crate::vfs::driver::MountToken> {
                self.core.current_mount()
            }

            fn release(
                &self,
                token: $crate::vfs::driver::MountToken,
            ) -> Result<(), $crate::vfs::error::MountError> {
                self.core.release(token)
            }
        }
    };
}

pub(crate) use impl_driver_via_core;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, TickClock};
    use crate::vfs::types::{DirNode, FileNode};

    fn core() -> DriverCore {
        let clock = TickClock::default();
        DriverCore::new("test", "UTF-8", VfsNode::Directory(DirNode::new("/", clock.now())))
    }

    #[test]
    fn test_mount_state_machine() {
        let core = core();
        assert_eq!(core.state(), MountState::Unmounted);

        core.mount().unwrap();
        assert_eq!(core.state(), MountState::Mounted);
        assert_eq!(core.mount(), Err(MountError::AlreadyMounted("test".into())));

        core.unmount().unwrap();
        assert_eq!(core.state(), MountState::Unmounted);
        assert_eq!(core.unmount(), Err(MountError::NotMounted("test".into())));

        // Remount after unmount is allowed
        core.mount().unwrap();
        assert_eq!(core.state(), MountState::Mounted);
    }

    #[test]
    fn test_root_snapshot_is_stable() {
        let core = core();
        assert_eq!(core.root().id(), core.root().id());
        assert!(core.root().is_dir());
    }

    #[test]
    fn test_stale_token_cannot_release_a_remount() {
        let core = core();
        let first = core.mount().unwrap();
        assert_eq!(core.current_mount(), Some(first));

        core.unmount().unwrap();
        let second = core.mount().unwrap();
        assert_ne!(first, second);
        assert!(second.generation() > first.generation());

        assert_eq!(core.release(first), Err(MountError::NotMounted("test".into())));
        assert_eq!(core.current_mount(), Some(second));

        core.release(second).unwrap();
        assert_eq!(core.current_mount(), None);
        assert_eq!(core.release(second), Err(MountError::NotMounted("test".into())));
    }

    #[test]
    fn test_store_root_keeps_identity() {
        let clock = TickClock::default();
        let core = DriverCore::new(
            "rom",
            "ASCII",
            VfsNode::File(FileNode::new("/", "rom.bin", clock.now())),
        );

        let mut root = core.root();
        if let VfsNode::File(f) = &mut root {
            f.content.extend_from_slice(b"boot");
        }
        core.store_root(root);
        match core.root() {
            VfsNode::File(f) => assert_eq!(f.content, b"boot"),
            VfsNode::Directory(_) => panic!("expected a file root"),
        }

        // A different node never replaces the root
        let stranger = VfsNode::File(FileNode::new("/", "rom.bin", clock.now()));
        let id = core.root().id();
        core.store_root(stranger);
        assert_eq!(core.root().id(), id);
    }
}
