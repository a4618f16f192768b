//! # drivefs-kernel
//!
//! Core crate for drivefs: a virtual filesystem that puts one path-based
//! namespace over a pluggable driver.
//!
//! A driver:
//! - Has a name (`native`, `block`, `ftp`, or anything registered later)
//! - Declares the encoding it uses for file names
//! - Owns a single root node (a file or a directory)
//! - Moves between `Unmounted` and `Mounted`
//!
//! A [`DriverRegistry`] hands out one live driver per name, and a
//! [`VirtualFileSystem`] mounts it and serves path operations on top.

pub mod clock;
pub mod config;
pub mod registry;
pub mod vfs;

pub use clock::{Clock, SystemClock, TickClock, Timestamp};
pub use config::{ConfigError, DriverSpec, RootSpec, VfsConfig};
pub use registry::{DriverFactory, DriverRegistry, OpenError};
pub use vfs::{
    drivers::{BlockDriver, ConfiguredDriver, FtpDriver, NativeDriver},
    DirEntry, Driver, DriverHandle, Metadata, MountError, MountState, MountToken, NodeId,
    NodeKind, NodeRef, UnknownDriverError, VfsError, VfsNode, VfsResult, VirtualFileSystem,
    WriteMode,
};
