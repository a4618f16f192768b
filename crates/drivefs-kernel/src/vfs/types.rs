//! Core VFS types.
//!
//! A node is either a file or a directory. Nodes are keyed by normalized
//! path in the namespace; the [`NodeId`] survives moves and renames and is
//! what "the same node" means.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::clock::Timestamp;

/// A node identifier (UUIDv7).
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(uuid::Uuid);

impl NodeId {
    /// Create a new time-ordered ID (UUIDv7).
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// First 8 hex characters — for human display only, not lookup.
    pub fn short(&self) -> String {
        self.0.as_simple().to_string()[..8].to_string()
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.short())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Node type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

impl NodeKind {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, NodeKind::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, NodeKind::Directory)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::File => write!(f, "file"),
            NodeKind::Directory => write!(f, "directory"),
        }
    }
}

/// A file: named leaf with byte content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub id: NodeId,
    pub path: String,
    pub name: String,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
    pub content: Vec<u8>,
}

impl FileNode {
    /// Create an empty file.
    pub fn new(path: impl Into<String>, name: impl Into<String>, now: Timestamp) -> Self {
        Self {
            id: NodeId::new(),
            path: path.into(),
            name: name.into(),
            created_at: now,
            modified_at: now,
            content: Vec::new(),
        }
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// A directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirNode {
    pub id: NodeId,
    pub path: String,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
}

impl DirNode {
    pub fn new(path: impl Into<String>, now: Timestamp) -> Self {
        Self {
            id: NodeId::new(),
            path: path.into(),
            created_at: now,
            modified_at: now,
        }
    }
}

/// Entry in the namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VfsNode {
    File(FileNode),
    Directory(DirNode),
}

impl VfsNode {
    pub fn id(&self) -> NodeId {
        match self {
            VfsNode::File(f) => f.id,
            VfsNode::Directory(d) => d.id,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            VfsNode::File(f) => &f.path,
            VfsNode::Directory(d) => &d.path,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            VfsNode::File(_) => NodeKind::File,
            VfsNode::Directory(_) => NodeKind::Directory,
        }
    }

    pub fn created_at(&self) -> Timestamp {
        match self {
            VfsNode::File(f) => f.created_at,
            VfsNode::Directory(d) => d.created_at,
        }
    }

    pub fn modified_at(&self) -> Timestamp {
        match self {
            VfsNode::File(f) => f.modified_at,
            VfsNode::Directory(d) => d.modified_at,
        }
    }

    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind().is_file()
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind().is_dir()
    }

    /// Point the node at a new path. A file's name follows the new leaf
    /// unless the path has none (the root).
    pub(crate) fn relocate(&mut self, path: String) {
        match self {
            VfsNode::File(f) => {
                if let Some(leaf) = super::path::file_name(&path) {
                    f.name = leaf.to_string();
                }
                f.path = path;
            }
            VfsNode::Directory(d) => d.path = path,
        }
    }

    pub(crate) fn touch(&mut self, now: Timestamp) {
        match self {
            VfsNode::File(f) => f.modified_at = now,
            VfsNode::Directory(d) => d.modified_at = now,
        }
    }

    /// Read-only snapshot of this node's metadata.
    pub fn metadata(&self) -> Metadata {
        match self {
            VfsNode::File(f) => Metadata {
                kind: NodeKind::File,
                path: f.path.clone(),
                name: Some(f.name.clone()),
                size: Some(f.size()),
                created_at: f.created_at,
                modified_at: f.modified_at,
            },
            VfsNode::Directory(d) => Metadata {
                kind: NodeKind::Directory,
                path: d.path.clone(),
                name: None,
                size: None,
                created_at: d.created_at,
                modified_at: d.modified_at,
            },
        }
    }

    pub(crate) fn node_ref(&self) -> NodeRef {
        NodeRef {
            id: self.id(),
            path: self.path().to_string(),
            kind: self.kind(),
        }
    }
}

/// Node metadata snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub kind: NodeKind,
    pub path: String,
    /// File name (files only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Size in bytes (files only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
}

impl Metadata {
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

/// Handle to a freshly created node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: NodeId,
    pub path: String,
    pub kind: NodeKind,
}

/// Directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name (not full path).
    pub name: String,
    /// Entry type.
    pub kind: NodeKind,
}

impl DirEntry {
    /// Create a new directory entry.
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// How `write` combines new data with existing content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum WriteMode {
    /// Replace the whole content.
    #[default]
    #[strum(serialize = "rewrite", serialize = "w")]
    Rewrite,
    /// Concatenate onto the existing content.
    #[strum(serialize = "append", serialize = "a")]
    Append,
}

impl WriteMode {
    /// Parse from string (case-insensitive).
    ///
    /// Accepts the short flags `w` / `a` as well as the full names.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteMode::Rewrite => "rewrite",
            WriteMode::Append => "append",
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, TickClock};

    #[test]
    fn test_node_kind() {
        assert!(NodeKind::File.is_file());
        assert!(!NodeKind::File.is_dir());
        assert!(NodeKind::Directory.is_dir());
    }

    #[test]
    fn test_file_metadata() {
        let clock = TickClock::default();
        let mut file = FileNode::new("/docs/a.txt", "a.txt", clock.now());
        file.content.extend_from_slice(b"abc");
        let meta = VfsNode::File(file).metadata();
        assert!(meta.is_file());
        assert_eq!(meta.size, Some(3));
        assert_eq!(meta.name.as_deref(), Some("a.txt"));
    }

    #[test]
    fn test_directory_metadata_json_omits_file_fields() {
        let clock = TickClock::new(42, 1);
        let meta = VfsNode::Directory(DirNode::new("/d", clock.now())).metadata();
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["kind"], "directory");
        assert_eq!(value["created_at"], 42);
        assert!(value.get("size").is_none());
        assert!(value.get("name").is_none());
    }

    #[test]
    fn test_relocate_updates_file_name() {
        let clock = TickClock::default();
        let mut node = VfsNode::File(FileNode::new("/a/old.txt", "old.txt", clock.now()));
        let id = node.id();
        node.relocate("/b/new.txt".to_string());
        assert_eq!(node.path(), "/b/new.txt");
        assert_eq!(node.id(), id);
        match node {
            VfsNode::File(f) => assert_eq!(f.name, "new.txt"),
            VfsNode::Directory(_) => panic!("expected a file"),
        }
    }

    #[test]
    fn test_write_mode_parse() {
        assert_eq!(WriteMode::from_str("w"), Some(WriteMode::Rewrite));
        assert_eq!(WriteMode::from_str("a"), Some(WriteMode::Append));
        assert_eq!(WriteMode::from_str("APPEND"), Some(WriteMode::Append));
        assert_eq!(WriteMode::from_str("rewrite"), Some(WriteMode::Rewrite));
        assert_eq!(WriteMode::from_str("x"), None);
        assert!("truncate".parse::<WriteMode>().is_err());
    }
}
