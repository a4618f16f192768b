//! The `block` driver: one opaque binary image as its root.

use crate::clock::Clock;
use crate::vfs::driver::{impl_driver_via_core, DriverCore};
use crate::vfs::path::ROOT;
use crate::vfs::types::{FileNode, VfsNode};

use super::ENCODING_LATIN_1;

/// Block driver: Latin-1 names, root is the file `block.binary`.
#[derive(Debug)]
pub struct BlockDriver {
    core: DriverCore,
}

impl BlockDriver {
    pub const NAME: &'static str = "block";
    pub const ROOT_NAME: &'static str = "block.binary";

    pub fn new(clock: &dyn Clock) -> Self {
        let root = VfsNode::File(FileNode::new(ROOT, Self::ROOT_NAME, clock.now()));
        Self {
            core: DriverCore::new(Self::NAME, ENCODING_LATIN_1, root),
        }
    }
}

impl_driver_via_core!(BlockDriver);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TickClock;
    use crate::vfs::driver::Driver;

    #[test]
    fn test_block_identity() {
        let driver = BlockDriver::new(&TickClock::default());
        assert_eq!(driver.name(), "block");
        assert_eq!(driver.encoding(), "ISO 8859-1");
        match driver.root() {
            VfsNode::File(f) => assert_eq!(f.name, "block.binary"),
            VfsNode::Directory(_) => panic!("block root must be a file"),
        }
    }
}
