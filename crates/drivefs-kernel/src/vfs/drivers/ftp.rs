//! The `ftp` driver: a directory tree rooted at `/`.

use crate::clock::Clock;
use crate::vfs::driver::{impl_driver_via_core, DriverCore};
use crate::vfs::path::ROOT;
use crate::vfs::types::{DirNode, VfsNode};

use super::ENCODING_UTF_8;

/// FTP driver: UTF-8 names, root is the directory `/`.
#[derive(Debug)]
pub struct FtpDriver {
    core: DriverCore,
}

impl FtpDriver {
    pub const NAME: &'static str = "ftp";

    pub fn new(clock: &dyn Clock) -> Self {
        let root = VfsNode::Directory(DirNode::new(ROOT, clock.now()));
        Self {
            core: DriverCore::new(Self::NAME, ENCODING_UTF_8, root),
        }
    }
}

impl_driver_via_core!(FtpDriver);
