//! Static path resolution with traversal rejection.
//!
//! The request path is joined onto the static root without percent-decoding,
//! `.` and `..` segments are folded lexically, and the result must stay inside
//! the root. File existence is not checked here.

use std::path::{Component, Path, PathBuf};

/// The request path escapes the static root.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("path '{0}' resolves outside the static root")]
pub struct Forbidden(pub String);

/// Map `request_path` onto a file below `root`.
///
/// `""` and `"/"` map to `default_document`.
pub fn resolve(
    request_path: &str,
    root: &Path,
    default_document: &str,
) -> Result<PathBuf, Forbidden> {
    if request_path.is_empty() || request_path == "/" {
        return Ok(root.join(default_document));
    }

    let relative = request_path.trim_start_matches('/');
    let mut resolved = root.to_path_buf();

    for component in Path::new(relative).components() {
        match component {
            Component::Normal(segment) => resolved.push(segment),
            Component::CurDir => {}
            Component::ParentDir => {
                if !resolved.pop() {
                    return Err(Forbidden(request_path.to_string()));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Forbidden(request_path.to_string()));
            }
        }
    }

    // `Path::starts_with` compares whole components, so `/srv/www2` is not
    // inside `/srv/www`.
    if resolved.starts_with(root) {
        Ok(resolved)
    } else {
        Err(Forbidden(request_path.to_string()))
    }
}
