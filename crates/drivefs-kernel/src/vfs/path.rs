//! Path normalization for the flat namespace.
//!
//! Namespace keys are always absolute, `/`-separated, with no empty, `.` or
//! `..` components and no trailing separator. The root is `/`.

use super::error::{VfsError, VfsResult};

/// The root path.
pub const ROOT: &str = "/";

/// Normalize a path: collapse `//`, resolve `.` and `..`, strip trailing
/// separators. Relative paths are taken from the root, and `..` at the root
/// stays at the root.
pub fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            name => parts.push(name),
        }
    }
    if parts.is_empty() {
        ROOT.to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Parent of a normalized path, or `None` for the root.
pub fn parent(path: &str) -> Option<&str> {
    if path == ROOT {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some(ROOT),
        Some(idx) => Some(&path[..idx]),
        None => None,
    }
}

/// Last component of a normalized path, or `None` for the root.
pub fn file_name(path: &str) -> Option<&str> {
    if path == ROOT {
        return None;
    }
    path.rsplit('/').next().filter(|s| !s.is_empty())
}

/// Join a normalized directory path and a single component.
pub fn join(dir: &str, name: &str) -> String {
    if dir == ROOT {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Prefix shared by every descendant of a normalized directory path.
pub fn child_prefix(dir: &str) -> String {
    if dir == ROOT {
        ROOT.to_string()
    } else {
        format!("{dir}/")
    }
}

/// True if `path` lies strictly below `ancestor` (both normalized).
pub fn is_descendant(path: &str, ancestor: &str) -> bool {
    path != ancestor && path.starts_with(&child_prefix(ancestor))
}

/// Check that `name` is usable as a single path component.
pub fn validate_name(name: &str) -> VfsResult<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(VfsError::invalid_path(name));
    }
    Ok(())
}
