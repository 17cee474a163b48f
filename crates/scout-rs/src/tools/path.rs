//! Workdir confinement for file tools.
//!
//! The model chooses every path it passes to a tool, so each one is checked
//! before any filesystem access: absolute paths and `..` components are
//! rejected outright, and paths that exist are canonicalized so a symlink
//! cannot lead outside the root.

use std::path::{Component, Path, PathBuf};

/// Result string returned by every file tool for a rejected path.
pub const FORBIDDEN: &str = "Forbidden";

/// Whether `path` must not be accessed relative to `root`.
///
/// True when the path is absolute, contains a `..` (or root/prefix)
/// component, or resolves outside the canonical root. If the root itself
/// cannot be canonicalized, every path is unsafe.
pub fn is_path_unsafe(root: &Path, path: &str) -> bool {
    let candidate = Path::new(path);
    if candidate.is_absolute() || candidate.has_root() {
        return true;
    }
    if candidate.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    }) {
        return true;
    }

    let Ok(root) = root.canonicalize() else {
        return true;
    };
    match root.join(candidate).canonicalize() {
        Ok(resolved) => !resolved.starts_with(&root),
        // Missing paths passed the lexical checks; the caller reports them
        // as invalid rather than forbidden.
        Err(_) => false,
    }
}

/// Resolve `path` under `root`, or `None` when it is unsafe.
pub fn resolve(root: &Path, path: &str) -> Option<PathBuf> {
    if is_path_unsafe(root, path) {
        None
    } else {
        Some(root.join(path))
    }
}

/// Whether `path` exists and is a regular file (following symlinks).
pub fn is_valid_file(path: &Path) -> bool {
    path.is_file()
}

/// Whether `path` exists and is a directory (following symlinks).
pub fn is_valid_directory(path: &Path) -> bool {
    path.is_dir()
}

/// Whether a file name is hidden (dot-prefixed).
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Drop `.` components so `./src/main.rs` displays as `src/main.rs`.
pub fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_and_parent_paths_are_unsafe() {
        let dir = tempfile::tempdir().unwrap();
        assert!(is_path_unsafe(dir.path(), "/etc/passwd"));
        assert!(is_path_unsafe(dir.path(), "../secret"));
        assert!(is_path_unsafe(dir.path(), "src/../../secret"));
    }

    #[test]
    fn relative_paths_inside_root_are_safe() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
        assert!(!is_path_unsafe(dir.path(), "src/main.rs"));
        assert!(!is_path_unsafe(dir.path(), "./src"));
        assert!(!is_path_unsafe(dir.path(), "."));
        // Missing paths are not forbidden, just invalid.
        assert!(!is_path_unsafe(dir.path(), "does/not/exist.txt"));
    }

    #[test]
    fn missing_root_makes_everything_unsafe() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone");
        assert!(is_path_unsafe(&gone, "anything"));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escaping_root_is_unsafe() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), "s").unwrap();
        let root = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), root.path().join("escape")).unwrap();
        assert!(is_path_unsafe(root.path(), "escape/secret.txt"));
        assert!(is_path_unsafe(root.path(), "escape"));
    }

    #[test]
    fn resolve_joins_safe_paths() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve(dir.path(), "a.txt"), Some(dir.path().join("a.txt")));
        assert_eq!(resolve(dir.path(), "../a.txt"), None);
    }

    #[test]
    fn validity_checks() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(is_valid_file(&file));
        assert!(!is_valid_directory(&file));
        assert!(is_valid_directory(dir.path()));
        assert!(!is_valid_file(&dir.path().join("missing")));
    }

    #[test]
    fn normalize_strips_cur_dir() {
        assert_eq!(normalize(Path::new("./src/./lib.rs")), PathBuf::from("src/lib.rs"));
        assert!(is_hidden(".git"));
        assert!(!is_hidden("src"));
    }
}
