//! Drivers declared in configuration rather than compiled in.

use crate::clock::Clock;
use crate::config::{DriverSpec, RootSpec};
use crate::vfs::driver::{impl_driver_via_core, DriverCore};
use crate::vfs::path::ROOT;
use crate::vfs::types::{DirNode, FileNode, VfsNode};

/// Driver built from a [`DriverSpec`].
#[derive(Debug)]
pub struct ConfiguredDriver {
    core: DriverCore,
}

impl ConfiguredDriver {
    pub fn new(spec: &DriverSpec, clock: &dyn Clock) -> Self {
        let now = clock.now();
        let root = match &spec.root {
            RootSpec::Directory => VfsNode::Directory(DirNode::new(ROOT, now)),
            RootSpec::File { name } => VfsNode::File(FileNode::new(ROOT, name.as_str(), now)),
        };
        Self {
            core: DriverCore::new(spec.name.as_str(), spec.encoding.as_str(), root),
        }
    }
}

impl_driver_via_core!(ConfiguredDriver);
