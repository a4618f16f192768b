//! Virtual Filesystem abstraction.
//!
//! Key components:
//!
//! - [`Driver`] - Backend trait: name, encoding, root node, mount lifecycle
//! - [`drivers`] - The built-in `native`, `block`, and `ftp` drivers
//! - [`VirtualFileSystem`] - Path-based namespace over one mounted driver
//!
//! ## Design Decisions
//!
//! - **Flat namespace**: Nodes are keyed by normalized path in one ordered
//!   map. Lookups are a single map access; only moves scan, and only the
//!   moved subtree.
//! - **One lock**: A single read-write lock covers the whole namespace,
//!   file content included. Writers to the same file never interleave.
//! - **Stable identity**: Every node carries a [`NodeId`] that survives
//!   moves and renames.

mod driver;
pub mod drivers;
mod error;
mod fs;
pub mod path;
mod types;

pub use driver::{Driver, DriverCore, DriverHandle, MountState, MountToken};
pub use error::{MountError, UnknownDriverError, VfsError, VfsResult};
pub use fs::VirtualFileSystem;
pub use types::{DirEntry, DirNode, FileNode, Metadata, NodeId, NodeKind, NodeRef, VfsNode, WriteMode};
