//! The `native` driver: a single system-call file as its root.

use crate::clock::Clock;
use crate::vfs::driver::{impl_driver_via_core, DriverCore};
use crate::vfs::path::ROOT;
use crate::vfs::types::{FileNode, VfsNode};

use super::ENCODING_ASCII;

/// Native driver: ASCII names, root is the file `syscall`.
#[derive(Debug)]
pub struct NativeDriver {
    core: DriverCore,
}

impl NativeDriver {
    pub const NAME: &'static str = "native";
    pub const ROOT_NAME: &'static str = "syscall";

    pub fn new(clock: &dyn Clock) -> Self {
        let root = VfsNode::File(FileNode::new(ROOT, Self::ROOT_NAME, clock.now()));
        Self {
            core: DriverCore::new(Self::NAME, ENCODING_ASCII, root),
        }
    }
}

impl_driver_via_core!(NativeDriver);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TickClock;
    use crate::vfs::driver::Driver;

    #[test]
    fn test_native_identity() {
        let driver = NativeDriver::new(&TickClock::default());
        assert_eq!(driver.name(), "native");
        assert_eq!(driver.encoding(), "ASCII");
        match driver.root() {
            VfsNode::File(f) => {
                assert_eq!(f.name, "syscall");
                assert_eq!(f.size(), 0);
            }
            VfsNode::Directory(_) => panic!("native root must be a file"),
        }
    }
}
