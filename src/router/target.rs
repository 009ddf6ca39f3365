//! Mapping a URL path onto the document root.
//!
//! Two checks run in order. `join_under_root` works on the text of the
//! path and refuses anything that climbs above the root. `ensure_contained`
//! then canonicalizes the candidate when it exists, which also catches
//! symlinks pointing out of the root.

use std::io;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("path escapes the document root")]
    Forbidden,
}

/// Joins a decoded URL path to `root`, resolving `.` and `..` lexically.
pub fn join_under_root(root: &Path, url_path: &str) -> Result<PathBuf, TargetError> {
    let relative = url_path.trim_start_matches('/');
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();

    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(TargetError::Forbidden);
                }
            }
            Component::RootDir | Component::Prefix(_) => return Err(TargetError::Forbidden),
        }
    }

    let mut target = root.to_path_buf();
    target.extend(parts);
    Ok(target)
}

/// Confirms that `candidate` still lies under `root` once symlinks are
/// resolved. `root` must already be canonical.
///
/// A candidate that does not exist is returned unchanged; there is nothing
/// on disk it could leak.
pub async fn ensure_contained(root: &Path, candidate: PathBuf) -> Result<PathBuf, TargetError> {
    match tokio::fs::canonicalize(&candidate).await {
        Ok(resolved) if resolved.starts_with(root) => Ok(resolved),
        Ok(_) => Err(TargetError::Forbidden),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => Err(TargetError::Forbidden),
        Err(_) => Ok(candidate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_plain_paths() {
        let root = Path::new("/srv/www");
        assert_eq!(join_under_root(root, "/").unwrap(), PathBuf::from("/srv/www"));
        assert_eq!(
            join_under_root(root, "/img/a.png").unwrap(),
            PathBuf::from("/srv/www/img/a.png")
        );
    }

    #[test]
    fn resolves_dots_inside_root() {
        let root = Path::new("/srv/www");
        assert_eq!(
            join_under_root(root, "/a/./b/../c.html").unwrap(),
            PathBuf::from("/srv/www/a/c.html")
        );
        assert_eq!(join_under_root(root, "/a/..").unwrap(), PathBuf::from("/srv/www"));
    }

    #[test]
    fn rejects_escapes() {
        let root = Path::new("/srv/www");
        assert_eq!(join_under_root(root, "/.."), Err(TargetError::Forbidden));
        assert_eq!(join_under_root(root, "/a/../../etc"), Err(TargetError::Forbidden));
    }

    #[test]
    fn leading_slashes_do_not_override_root() {
        let root = Path::new("/srv/www");
        assert_eq!(
            join_under_root(root, "//etc/passwd").unwrap(),
            PathBuf::from("/srv/www/etc/passwd")
        );
    }
}
