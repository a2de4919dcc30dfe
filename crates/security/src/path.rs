//! Path resolution: filesystem sandboxing to the project root.
//!
//! Paths supplied by the model are joined onto the project root and
//! normalized lexically (`.` and `..` collapsed, no symlink lookups).
//! The result must still lie under the root.

use std::path::{Component, Path, PathBuf};

use tracing::warn;

/// Error returned when a path cannot be confined to the project root.
#[derive(Debug, thiserror::Error)]
pub enum PathEscapeError {
    #[error("Path '{path}' escapes the project directory.")]
    EscapesRoot { path: String },
}

/// Resolve `relative` against `root` and return the absolute path.
///
/// Both `/` and `\` are accepted as separators. An absolute `relative`
/// replaces the root before the containment check, so it is only accepted
/// when it already points inside the project.
pub fn resolve(relative: &str, root: &Path) -> Result<PathBuf, PathEscapeError> {
    let root = normalize(root);
    let unified = relative.replace('\\', "/");
    let candidate = normalize(&root.join(unified));

    if !candidate.starts_with(&root) {
        warn!(path = %relative, root = %root.display(), "Rejected path outside project root");
        return Err(PathEscapeError::EscapesRoot {
            path: relative.to_string(),
        });
    }

    Ok(candidate)
}

/// Lexically normalize a path: drop `.`, apply `..` against the components
/// seen so far. `..` at the filesystem root stays at the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                let at_anchor = matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                );
                if at_anchor {
                    if out.as_os_str().is_empty() {
                        out.push("..");
                    }
                } else if out.ends_with("..") {
                    out.push("..");
                } else {
                    out.pop();
                }
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}
