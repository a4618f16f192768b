//! VFS error types.

use std::io;
use thiserror::Error;

/// Driver lifecycle error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
    /// `mount()` called on a driver that is already mounted.
    #[error("driver already mounted: {0}")]
    AlreadyMounted(String),

    /// `unmount()` called on a driver that is not mounted.
    #[error("driver not mounted: {0}")]
    NotMounted(String),
}

/// No driver kind is registered under this name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown driver: {name}")]
pub struct UnknownDriverError {
    pub name: String,
}

impl UnknownDriverError {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// VFS error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VfsError {
    /// File or directory not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Path already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Expected a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Expected a file.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// Parent of the target path does not exist.
    #[error("parent not found: {0}")]
    ParentNotFound(String),

    /// Directory not empty.
    #[error("directory not empty: {0}")]
    DirectoryNotEmpty(String),

    /// The driver backing the namespace is unmounted.
    #[error("driver not mounted: {0}")]
    DriverNotMounted(String),

    /// Operation not allowed on this node (e.g. removing the root).
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Invalid path or file name.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl VfsError {
    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create an AlreadyExists error.
    pub fn already_exists(path: impl Into<String>) -> Self {
        Self::AlreadyExists(path.into())
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    /// Create an IsADirectory error.
    pub fn is_a_directory(path: impl Into<String>) -> Self {
        Self::IsADirectory(path.into())
    }

    /// Create a ParentNotFound error.
    pub fn parent_not_found(path: impl Into<String>) -> Self {
        Self::ParentNotFound(path.into())
    }

    /// Create a DirectoryNotEmpty error.
    pub fn directory_not_empty(path: impl Into<String>) -> Self {
        Self::DirectoryNotEmpty(path.into())
    }

    /// Create a DriverNotMounted error.
    pub fn driver_not_mounted(driver: impl Into<String>) -> Self {
        Self::DriverNotMounted(driver.into())
    }

    /// Create a PermissionDenied error.
    pub fn permission_denied(path: impl Into<String>) -> Self {
        Self::PermissionDenied(path.into())
    }

    /// Create an InvalidPath error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }
}

/// Convert VfsError to std::io::Error for compatibility.
impl From<VfsError> for io::Error {
    fn from(e: VfsError) -> Self {
        match e {
            VfsError::NotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            VfsError::AlreadyExists(msg) => io::Error::new(io::ErrorKind::AlreadyExists, msg),
            VfsError::NotADirectory(msg) => io::Error::new(io::ErrorKind::NotADirectory, msg),
            VfsError::IsADirectory(msg) => io::Error::new(io::ErrorKind::IsADirectory, msg),
            VfsError::ParentNotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            VfsError::DirectoryNotEmpty(msg) => {
                io::Error::new(io::ErrorKind::DirectoryNotEmpty, msg)
            }
            VfsError::DriverNotMounted(driver) => {
                io::Error::other(format!("driver not mounted: {driver}"))
            }
            VfsError::PermissionDenied(msg) => {
                io::Error::new(io::ErrorKind::PermissionDenied, msg)
            }
            VfsError::InvalidPath(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
        }
    }
}

/// VFS result type.
pub type VfsResult<T> = Result<T, VfsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        assert_eq!(
            VfsError::not_found("/a/b").to_string(),
            "not found: /a/b"
        );
        assert_eq!(
            MountError::AlreadyMounted("ftp".into()).to_string(),
            "driver already mounted: ftp"
        );
        assert_eq!(
            UnknownDriverError::new("smb").to_string(),
            "unknown driver: smb"
        );
    }

    #[test]
    fn test_io_error_kinds() {
        let e: io::Error = VfsError::directory_not_empty("/d").into();
        assert_eq!(e.kind(), io::ErrorKind::DirectoryNotEmpty);

        let e: io::Error = VfsError::parent_not_found("/x").into();
        assert_eq!(e.kind(), io::ErrorKind::NotFound);

        let e: io::Error = VfsError::invalid_path("a/b").into();
        assert_eq!(e.kind(), io::ErrorKind::InvalidInput);
    }
}
