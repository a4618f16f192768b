//! Path-based namespace over a mounted driver.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::clock::{Clock, Timestamp};

use super::driver::{DriverHandle, MountToken};
use super::error::{MountError, VfsError, VfsResult};
use super::path;
use super::types::{DirEntry, DirNode, FileNode, Metadata, NodeRef, VfsNode, WriteMode};

type Nodes = BTreeMap<String, VfsNode>;

/// Virtual filesystem over one driver.
///
/// Thread-safe via a single internal `RwLock`: lookups share it, and every
/// mutation (structural or content) holds it exclusively for the whole
/// check-then-update sequence.
///
/// The namespace owns the mount it made: once the driver is unmounted, by
/// this namespace or directly on the handle, the namespace stays dead even
/// if someone else remounts the driver.
///
/// Changes to the root node are written back to the driver, so a file
/// root's content outlives the namespace.
///
/// Unmounting must not race with in-flight operations. Callers make sure
/// nothing else is using the filesystem before calling [`unmount`](Self::unmount).
pub struct VirtualFileSystem {
    driver: DriverHandle,
    clock: Arc<dyn Clock>,
    mount: MountToken,
    mounted_at: Timestamp,
    root_path: String,
    /// True until this instance gives its mount back.
    holds_mount: AtomicBool,
    nodes: RwLock<Nodes>,
}

impl fmt::Debug for VirtualFileSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualFileSystem")
            .field("driver", &self.driver.name())
            .field("mounted_at", &self.mounted_at)
            .field("nodes", &self.nodes.read().len())
            .finish()
    }
}

impl VirtualFileSystem {
    /// Mount `driver` and seed the namespace with its root node.
    pub fn new(driver: DriverHandle, clock: Arc<dyn Clock>) -> Result<Self, MountError> {
        let mount = driver.mount()?;
        let mounted_at = clock.now();

        let mut root = driver.root();
        let root_path = path::normalize(root.path());
        if root.path() != root_path {
            root.relocate(root_path.clone());
        }

        info!(
            "Namespace ready on {} driver (root {} {} at {})",
            driver.name(),
            root.kind(),
            root_path,
            mounted_at
        );

        let mut nodes = BTreeMap::new();
        nodes.insert(root_path.clone(), root);

        Ok(Self {
            driver,
            clock,
            mount,
            mounted_at,
            root_path,
            holds_mount: AtomicBool::new(true),
            nodes: RwLock::new(nodes),
        })
    }

    /// The driver this namespace is mounted on.
    pub fn driver(&self) -> &DriverHandle {
        &self.driver
    }

    /// When the driver was mounted.
    pub fn mounted_at(&self) -> Timestamp {
        self.mounted_at
    }

    /// Normalized path of the root node.
    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    /// Unmount the driver. Every later path operation fails with
    /// `DriverNotMounted`. Fails with `NotMounted` if this namespace's mount
    /// is already gone.
    pub fn unmount(&self) -> Result<(), MountError> {
        if !self.holds_mount.swap(false, Ordering::AcqRel) {
            return Err(MountError::NotMounted(self.driver.name().to_string()));
        }
        self.driver.release(self.mount)
    }

    fn ensure_mounted(&self) -> VfsResult<()> {
        if self.holds_mount.load(Ordering::Acquire)
            && self.driver.current_mount() == Some(self.mount)
        {
            Ok(())
        } else {
            Err(VfsError::driver_not_mounted(self.driver.name()))
        }
    }

    fn is_root(&self, path: &str) -> bool {
        path == self.root_path
    }

    // ========================================================================
    // Creating
    // ========================================================================

    /// Create an empty directory. The parent must already be a directory.
    pub fn create_directory(&self, path: &str) -> VfsResult<NodeRef> {
        self.ensure_mounted()?;
        let path = path::normalize(path);

        let mut nodes = self.nodes.write();
        if nodes.contains_key(&path) {
            return Err(VfsError::already_exists(path));
        }
        check_parent(&nodes, &path)?;

        let node = VfsNode::Directory(DirNode::new(path.as_str(), self.clock.now()));
        let node_ref = node.node_ref();
        nodes.insert(path, node);

        debug!("Created directory {} ({})", node_ref.path, node_ref.id.short());
        Ok(node_ref)
    }

    /// Create an empty file called `name` inside directory `dir`.
    pub fn create_file(&self, dir: &str, name: &str) -> VfsResult<NodeRef> {
        self.ensure_mounted()?;
        path::validate_name(name)?;
        self.insert_file(path::join(&path::normalize(dir), name))
    }

    /// Create an empty file at `path`; the last component is its name.
    pub fn create_file_at(&self, path: &str) -> VfsResult<NodeRef> {
        self.ensure_mounted()?;
        self.insert_file(path::normalize(path))
    }

    fn insert_file(&self, path: String) -> VfsResult<NodeRef> {
        let mut nodes = self.nodes.write();
        if nodes.contains_key(&path) {
            return Err(VfsError::already_exists(path));
        }
        check_parent(&nodes, &path)?;

        let name = path::file_name(&path).unwrap_or_default().to_string();
        let node = VfsNode::File(FileNode::new(path.as_str(), name, self.clock.now()));
        let node_ref = node.node_ref();
        nodes.insert(path, node);

        debug!("Created file {} ({})", node_ref.path, node_ref.id.short());
        Ok(node_ref)
    }

    // ========================================================================
    // Reading
    // ========================================================================

    /// Read the whole content of a file.
    pub fn read(&self, path: &str) -> VfsResult<Vec<u8>> {
        self.ensure_mounted()?;
        let path = path::normalize(path);

        let nodes = self.nodes.read();
        match nodes.get(&path) {
            Some(VfsNode::File(f)) => Ok(f.content.clone()),
            Some(VfsNode::Directory(_)) => Err(VfsError::is_a_directory(path)),
            None => Err(VfsError::not_found(path)),
        }
    }

    /// Metadata snapshot for a node.
    pub fn metadata(&self, path: &str) -> VfsResult<Metadata> {
        self.ensure_mounted()?;
        let path = path::normalize(path);

        let nodes = self.nodes.read();
        nodes
            .get(&path)
            .map(VfsNode::metadata)
            .ok_or_else(|| VfsError::not_found(path))
    }

    /// Direct children of a directory, sorted by name.
    pub fn list(&self, path: &str) -> VfsResult<Vec<DirEntry>> {
        self.ensure_mounted()?;
        let path = path::normalize(path);

        let nodes = self.nodes.read();
        match nodes.get(&path) {
            Some(VfsNode::Directory(_)) => {}
            Some(VfsNode::File(_)) => return Err(VfsError::not_a_directory(path)),
            None => return Err(VfsError::not_found(path)),
        }

        let prefix = path::child_prefix(&path);
        let entries = nodes
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter(|(key, _)| key.as_str() != path && !key[prefix.len()..].contains('/'))
            .map(|(key, node)| DirEntry::new(&key[prefix.len()..], node.kind()))
            .collect();

        // BTreeMap order is already sorted by name within one directory
        Ok(entries)
    }

    /// Returns true if the path exists in a mounted namespace.
    pub fn exists(&self, path: &str) -> bool {
        self.ensure_mounted().is_ok() && self.nodes.read().contains_key(&path::normalize(path))
    }

    // ========================================================================
    // Writing
    // ========================================================================

    /// Write `data` to a file, replacing or appending per `mode`.
    pub fn write(&self, path: &str, data: &[u8], mode: WriteMode) -> VfsResult<()> {
        self.ensure_mounted()?;
        let path = path::normalize(path);

        let mut nodes = self.nodes.write();
        match nodes.get_mut(&path) {
            Some(VfsNode::File(f)) => {
                match mode {
                    WriteMode::Rewrite => {
                        f.content.clear();
                        f.content.extend_from_slice(data);
                    }
                    WriteMode::Append => f.content.extend_from_slice(data),
                }
                f.modified_at = self.clock.now();
                debug!("Wrote {} bytes to {} ({}, size={})", data.len(), path, mode, f.size());
                if self.is_root(&path) {
                    self.driver.store_root(VfsNode::File(f.clone()));
                }
                Ok(())
            }
            Some(VfsNode::Directory(_)) => Err(VfsError::is_a_directory(path)),
            None => Err(VfsError::not_found(path)),
        }
    }

    /// Move a node, and for a directory its whole subtree, to `new_path`.
    pub fn move_to(&self, path: &str, new_path: &str) -> VfsResult<()> {
        self.ensure_mounted()?;
        let from = path::normalize(path);
        let to = path::normalize(new_path);

        let mut nodes = self.nodes.write();
        self.move_locked(&mut nodes, &from, &to)
    }

    /// Rename a file in place.
    pub fn rename(&self, path: &str, new_name: &str) -> VfsResult<()> {
        self.ensure_mounted()?;
        path::validate_name(new_name)?;
        let from = path::normalize(path);

        if self.is_root(&from) {
            warn!("Refusing to rename root of {} driver", self.driver.name());
            return Err(VfsError::permission_denied(from));
        }

        let mut nodes = self.nodes.write();
        match nodes.get(&from) {
            Some(VfsNode::File(_)) => {}
            Some(VfsNode::Directory(_)) => return Err(VfsError::is_a_directory(from)),
            None => return Err(VfsError::not_found(from)),
        }

        let parent = path::parent(&from).unwrap_or(path::ROOT);
        let to = path::join(parent, new_name);
        self.move_locked(&mut nodes, &from, &to)
    }

    fn move_locked(&self, nodes: &mut Nodes, from: &str, to: &str) -> VfsResult<()> {
        if self.is_root(from) {
            warn!("Refusing to move root of {} driver", self.driver.name());
            return Err(VfsError::permission_denied(from));
        }
        if !nodes.contains_key(from) {
            return Err(VfsError::not_found(from));
        }
        if nodes.contains_key(to) {
            return Err(VfsError::already_exists(to));
        }
        if path::is_descendant(to, from) {
            return Err(VfsError::invalid_path(format!("cannot move {from} into itself ({to})")));
        }
        check_parent(nodes, to)?;

        let Some(mut node) = nodes.remove(from) else {
            return Err(VfsError::not_found(from));
        };

        // Every parent exists, so nothing lives under `to` yet: the rewritten
        // descendant keys cannot collide.
        let mut moved = 0usize;
        if node.is_dir() {
            let prefix = path::child_prefix(from);
            let descendants: Vec<String> = nodes
                .range(prefix.clone()..)
                .take_while(|(key, _)| key.starts_with(&prefix))
                .map(|(key, _)| key.clone())
                .collect();

            for key in descendants {
                if let Some(mut child) = nodes.remove(&key) {
                    let new_key = format!("{to}{}", &key[from.len()..]);
                    child.relocate(new_key.clone());
                    nodes.insert(new_key, child);
                    moved += 1;
                }
            }
        }

        node.relocate(to.to_string());
        node.touch(self.clock.now());
        nodes.insert(to.to_string(), node);

        debug!("Moved {} -> {} ({} descendants)", from, to, moved);
        Ok(())
    }

    // ========================================================================
    // Removing
    // ========================================================================

    /// Remove a file or an empty directory.
    pub fn delete(&self, path: &str) -> VfsResult<()> {
        self.ensure_mounted()?;
        let path = path::normalize(path);

        if self.is_root(&path) {
            warn!("Refusing to remove root of {} driver", self.driver.name());
            return Err(VfsError::permission_denied(path));
        }

        let mut nodes = self.nodes.write();
        match nodes.get(&path) {
            Some(VfsNode::Directory(_)) => {
                let prefix = path::child_prefix(&path);
                let has_children = nodes
                    .range(prefix.clone()..)
                    .next()
                    .is_some_and(|(key, _)| key.starts_with(&prefix));
                if has_children {
                    return Err(VfsError::directory_not_empty(path));
                }
            }
            Some(VfsNode::File(_)) => {}
            None => return Err(VfsError::not_found(path)),
        }

        nodes.remove(&path);
        debug!("Deleted {}", path);
        Ok(())
    }
}

impl Drop for VirtualFileSystem {
    fn drop(&mut self) {
        if self.holds_mount.swap(false, Ordering::AcqRel) {
            if let Err(e) = self.driver.release(self.mount) {
                // The mount was already taken away on the driver handle
                debug!("Mount of {} already released: {}", self.driver.name(), e);
            }
        }
    }
}

/// The parent of `path` must exist and be a directory.
fn check_parent(nodes: &Nodes, path: &str) -> VfsResult<()> {
    let Some(parent) = path::parent(path) else {
        // Only the root has no parent, and the root always exists
        return Err(VfsError::already_exists(path));
    };
    match nodes.get(parent) {
        Some(VfsNode::Directory(_)) => Ok(()),
        Some(VfsNode::File(_)) => Err(VfsError::not_a_directory(parent)),
        None => Err(VfsError::parent_not_found(parent)),
    }
}
