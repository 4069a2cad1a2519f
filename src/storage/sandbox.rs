//! Path sandbox
//!
//! Resolves caller-supplied identifiers against a storage root and rejects
//! any identifier that would land outside it, including through symlinks.

use log::warn;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{StorageError, StorageResult};

/// Upper bound on chained symlinks followed for a single component
const MAX_SYMLINK_HOPS: usize = 40;

/// A canonicalized storage root that confines identifier resolution
#[derive(Debug, Clone)]
pub struct PathSandbox {
    root: PathBuf,
}

impl PathSandbox {
    /// Canonicalizes `root` once so later containment checks compare
    /// real path components.
    pub fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = fs::canonicalize(root.as_ref())?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `id` to an absolute location inside the root.
    ///
    /// Existing components are canonicalized (symlinks followed), the
    /// remaining ones are appended lexically so that not-yet-created files
    /// can be resolved. `""` and `"."` yield the root itself.
    pub fn resolve(&self, id: &str) -> StorageResult<PathBuf> {
        let mut resolved = self.root.clone();

        for component in Path::new(id).components() {
            match component {
                Component::Prefix(_) | Component::RootDir => {
                    warn!("Rejected absolute identifier: {}", id);
                    return Err(StorageError::PathEscape(id.to_string()));
                }
                Component::CurDir => {}
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(name) => {
                    let candidate = resolved.join(name);
                    resolved = match fs::symlink_metadata(&candidate) {
                        Ok(meta) if meta.file_type().is_symlink() => follow_symlink(&candidate)?,
                        _ => candidate,
                    };
                }
            }
        }

        // Path::starts_with compares whole components, so `/tmp/baseXYZ`
        // is not inside `/tmp/base`.
        if resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            warn!(
                "Identifier {} resolves outside storage root ({})",
                id,
                resolved.display()
            );
            Err(StorageError::PathEscape(id.to_string()))
        }
    }
}

/// Resolves `id` against `root`, canonicalizing both.
pub fn resolve(root: impl AsRef<Path>, id: &str) -> StorageResult<PathBuf> {
    PathSandbox::new(root)?.resolve(id)
}

/// Lexically normalizes `id` into a root-relative key without touching
/// the filesystem.
///
/// Used by backends with no directory tree of their own. Absolute
/// identifiers and `..` climbing above the root are rejected; `""` and
/// `"."` normalize to the empty key (the root).
pub fn normalize(id: &str) -> StorageResult<String> {
    let mut parts: Vec<String> = Vec::new();

    for component in Path::new(id).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                return Err(StorageError::PathEscape(id.to_string()));
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(StorageError::PathEscape(id.to_string()));
                }
            }
            Component::Normal(name) => parts.push(name.to_string_lossy().into_owned()),
        }
    }

    Ok(parts.join("/"))
}

/// Follows a symlink to the location a write through it would touch.
fn follow_symlink(link: &Path) -> StorageResult<PathBuf> {
    if let Ok(target) = fs::canonicalize(link) {
        return Ok(target);
    }

    // Dangling link: walk the chain by hand.
    let mut current = link.to_path_buf();
    for _ in 0..MAX_SYMLINK_HOPS {
        let target = fs::read_link(&current)?;
        let base = current.parent().map(Path::to_path_buf).unwrap_or_default();
        current = lexical_join(&base, &target);

        match fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => continue,
            _ => return Ok(current),
        }
    }

    Err(StorageError::Io(io::Error::other(
        "Too many levels of symbolic links",
    )))
}

/// Joins `target` onto `base` and collapses `.` and `..` lexically.
fn lexical_join(base: &Path, target: &Path) -> PathBuf {
    let mut joined = if target.is_absolute() {
        PathBuf::new()
    } else {
        base.to_path_buf()
    };

    for component in target.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                joined.pop();
            }
            other => joined.push(other.as_os_str()),
        }
    }

    joined
}
