use std::path::{Component, Path, PathBuf};

use super::FsError;

/// Confines client-supplied logical paths to a single root directory.
///
/// Containment is checked per path component (`Path::starts_with`), never as a
/// string prefix: with root `/files`, the sibling `/files-evil` is rejected.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Creates a resolver for `root`. The root is cleaned lexically; callers that
    /// want symlinks in the root itself resolved should canonicalize it first.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: clean(root.as_ref()) }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_root(&self, path: &Path) -> bool {
        path == self.root
    }

    /// Resolves `requested` (untrusted, `/`-separated) to an absolute path under the root.
    ///
    /// `.` and empty segments are dropped, `..` pops one component. The result must
    /// still lie under the root, otherwise [`FsError::InvalidPath`] is returned.
    /// Existence is not checked.
    pub fn resolve(&self, requested: &str) -> Result<PathBuf, FsError> {
        if requested.contains('\0') {
            return Err(FsError::InvalidPath("path contains null byte".into()));
        }

        let mut resolved = self.root.clone();
        for segment in requested.split(['/', '\\']) {
            match segment {
                "" | "." => continue,
                ".." => {
                    resolved.pop();
                }
                name => resolved.push(name),
            }
        }

        if !resolved.starts_with(&self.root) {
            return Err(FsError::InvalidPath(format!("'{}' escapes the root directory", requested)));
        }
        Ok(resolved)
    }

    /// Maps a resolved path back to its logical form (`/`, `/docs`, `/docs/a.txt`).
    pub fn to_logical(&self, path: &Path) -> String {
        let rel = match path.strip_prefix(&self.root) {
            Ok(rel) => rel,
            Err(_) => return "/".to_string(),
        };
        let segments: Vec<String> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        format!("/{}", segments.join("/"))
    }
}

/// Free-standing form of [`PathResolver::resolve`].
pub fn resolve(root: &Path, requested: &str) -> Result<PathBuf, FsError> {
    PathResolver::new(root).resolve(requested)
}

/// Logical parent of `logical`, staying inside the public namespace (`/docs` -> `/`).
pub fn logical_parent(logical: &str) -> String {
    let trimmed = logical.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, _)) if !parent.is_empty() => parent.to_string(),
        _ => "/".to_string(),
    }
}

/// Joins a logical directory and an entry name without doubling the separator.
pub fn join_logical(base: &str, name: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        format!("/{}", name)
    } else {
        format!("{}/{}", base, name)
    }
}

fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
