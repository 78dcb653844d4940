//! Path resolution inside the sandbox root.
//!
//! Every caller-supplied path is relative, lexically normalized, and
//! verified to land under the canonical root before any I/O happens.
//! The final file name is sharded into a two-character prefix directory
//! so owner namespaces with many attachments stay fast to list.

use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};

/// Validated namespace segment (owner id, lowercased alphanumeric).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceName(pub(crate) String);

impl TryFrom<&str> for NamespaceName {
    type Error = StorageError;

    fn try_from(value: &str) -> Result<Self, StorageError> {
        let name = value.to_lowercase();

        if name.is_empty() {
            return Err(StorageError::PathTraversal {
                message: "EMPTY".into(),
                context: Some("Namespace cannot be empty".into()),
            });
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(StorageError::PathTraversal {
                message: name.into(),
                context: Some("Namespace contains illegal characters".into()),
            });
        }

        Ok(Self(name))
    }
}

impl TryFrom<String> for NamespaceName {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, StorageError> {
        Self::try_from(value.as_str())
    }
}

impl std::fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collapses `.`/`..` lexically, rejecting anything that climbs above the
/// sandbox or smuggles in an absolute component.
fn normalize(path: &Path) -> Result<PathBuf, StorageError> {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::Normal(segment) => out.push(segment),
            Component::ParentDir => {
                if !out.pop() {
                    return Err(StorageError::PathTraversal {
                        message: path.display().to_string().into(),
                        context: Some("Path attempted to escape sandbox via '..'".into()),
                    });
                }
            },
            Component::RootDir | Component::Prefix(_) => {
                return Err(StorageError::PathTraversal {
                    message: path.display().to_string().into(),
                    context: Some("Absolute paths are not allowed in sandbox".into()),
                });
            },
        }
    }

    Ok(out)
}

/// Joins a relative path to the root and verifies it stays inside.
pub(crate) fn resolve(root: &Path, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
    let path = path.as_ref();

    if path.is_absolute() {
        return Err(StorageError::PathTraversal {
            message: path.display().to_string().into(),
            context: Some("Absolute paths are not allowed in sandbox".into()),
        });
    }

    let joined = root.join(normalize(path)?);
    verify_inside(root, &joined)?;
    Ok(joined)
}

/// Resolves a file with namespace prefix and shard directory applied.
pub(crate) fn resolve_sharded(
    root: &Path,
    namespace: Option<&str>,
    path: impl AsRef<Path>,
) -> Result<PathBuf, StorageError> {
    let path = path.as_ref();
    let file_name =
        path.file_name().and_then(|s| s.to_str()).ok_or_else(|| StorageError::FileNotFound {
            message: path.display().to_string().into(),
            context: Some("Target must be a file".into()),
        })?;

    let mut layout = PathBuf::new();
    if let Some(ns) = namespace {
        layout.push(ns);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        layout.push(parent);
    }
    if let Some(shard) = shard_prefix(file_name) {
        layout.push(shard);
    }
    layout.push(file_name);

    resolve(root, layout)
}

/// First two characters of the file name, when long enough to matter.
fn shard_prefix(file_name: &str) -> Option<String> {
    let prefix: String = file_name.chars().take(2).collect();
    (file_name.chars().count() >= 4).then_some(prefix)
}

/// Checks containment against the canonical root, walking up to the first
/// existing ancestor so not-yet-created targets can be validated too
/// (symlinked ancestors that point outside the sandbox are rejected).
fn verify_inside(root: &Path, joined: &Path) -> Result<(), StorageError> {
    if !joined.starts_with(root) {
        return Err(StorageError::PathTraversal {
            message: joined.display().to_string().into(),
            context: Some("Path is outside sandbox boundaries".into()),
        });
    }

    let mut current = Some(joined);
    while let Some(path) = current {
        if path == root {
            return Ok(());
        }
        if path.exists() {
            let canonical = path.canonicalize().map_err(|e| StorageError::Io {
                source: e,
                context: Some("Failed to verify parent directory".into()),
            })?;
            if canonical.starts_with(root) {
                return Ok(());
            }
            return Err(StorageError::PathTraversal {
                message: canonical.display().to_string().into(),
                context: Some("Existing ancestor resolves outside the sandbox".into()),
            });
        }
        current = path.parent();
    }

    Err(StorageError::PathTraversal {
        message: joined.display().to_string().into(),
        context: Some("No valid parent directory found within sandbox".into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_rules() {
        assert_eq!(NamespaceName::try_from("User_42").unwrap().0, "user_42");
        assert!(NamespaceName::try_from("").is_err());
        assert!(NamespaceName::try_from("../up").is_err());
        assert!(NamespaceName::try_from("a/b").is_err());
    }

    #[test]
    fn short_names_skip_sharding() {
        assert_eq!(shard_prefix("abc"), None);
        assert_eq!(shard_prefix("abcd"), Some("ab".to_owned()));
    }
}
