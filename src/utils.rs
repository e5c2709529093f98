// ABOUTME: Utility functions for the course-slides application
// ABOUTME: Directory validation, tree copying, path containment checks and MIME types

use crate::errors::{Result, SiteError};
use log::{debug, warn};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Validate that a directory exists
pub fn validate_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(SiteError::PathNotFoundError(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(SiteError::ValidationError(format!(
            "Path is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(SiteError::FileReadError)?;
    } else if !path.is_dir() {
        return Err(SiteError::ValidationError(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Ensure a file's parent directory exists
pub fn ensure_parent_directory_exists(file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        ensure_directory_exists(parent)?;
    }
    Ok(())
}

/// Validate write permissions for a directory
pub fn validate_directory_writable(path: &Path) -> Result<()> {
    // First ensure it exists
    ensure_directory_exists(path)?;

    // Try to create a temporary file to test write permissions
    let test_file = path.join(format!("test_write_{}.tmp", uuid::Uuid::new_v4()));
    match fs::File::create(&test_file) {
        Ok(_) => {
            if let Err(e) = fs::remove_file(&test_file) {
                warn!("Failed to clean up test file {:?}: {}", test_file, e);
            }
            Ok(())
        }
        Err(e) => Err(SiteError::ValidationError(format!(
            "Directory is not writable: {:?} - {}",
            path, e
        ))),
    }
}

/// Get the absolute path
pub fn get_absolute_path(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|e| {
        SiteError::ValidationError(format!("Failed to get absolute path for {:?}: {}", path, e))
    })
}

/// Remove everything inside a directory, creating it when missing
pub fn empty_directory(path: &Path) -> Result<()> {
    if path.exists() {
        validate_directory_exists(path)?;
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(entry.path())?;
            } else {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    } else {
        ensure_directory_exists(path)
    }
}

/// Recursively copy a directory tree, merging into `dst` if it already exists
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<usize> {
    validate_directory_exists(src)?;
    let mut copied = 0;

    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(src).map_err(|_| {
            SiteError::ValidationError(format!("{:?} is outside {:?}", entry.path(), src))
        })?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            ensure_directory_exists(&target)?;
        } else {
            ensure_parent_directory_exists(&target)?;
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    debug!("Copied {} files from {:?} to {:?}", copied, src, dst);
    Ok(copied)
}

/// Whether `inner` lies at or below `outer`. Either path may not exist yet.
pub fn is_within(inner: &Path, outer: &Path) -> bool {
    canonical_prefix(inner).starts_with(canonical_prefix(outer))
}

/// Absolute form of a path that may not exist: its deepest existing ancestor is
/// canonicalized and the missing components are appended unchanged
fn canonical_prefix(path: &Path) -> PathBuf {
    let absolute = match std::env::current_dir() {
        Ok(cwd) if path.is_relative() => cwd.join(path),
        _ => path.to_path_buf(),
    };
    let normalized = normalize(&absolute);

    let mut existing = normalized.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = fs::canonicalize(existing) {
            return missing
                .iter()
                .rev()
                .fold(canonical, |acc: PathBuf, name| acc.join(name));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => return normalized.clone(),
        }
    }
}

/// Resolve `relative` below `root`, refusing anything that escapes it.
///
/// The check runs lexically first (so `..` cannot climb out even toward files
/// that do not exist) and again on the canonical path (so symlinks cannot
/// either). Returns `NotFound` when the path stays inside but does not exist.
pub fn resolve_within(root: &Path, relative: &str) -> Result<PathBuf> {
    let joined = normalize(&root.join(relative));
    if !joined.starts_with(normalize(root)) {
        return Err(SiteError::Forbidden(format!(
            "{} resolves outside {:?}",
            relative, root
        )));
    }

    let resolved = match fs::canonicalize(&joined) {
        Ok(path) => path,
        Err(_) => return Err(SiteError::NotFound(relative.to_string())),
    };
    let canonical_root = get_absolute_path(root)?;
    if !resolved.starts_with(&canonical_root) {
        return Err(SiteError::Forbidden(format!(
            "{} resolves outside {:?}",
            relative, root
        )));
    }
    if !resolved.is_file() {
        return Err(SiteError::NotFound(relative.to_string()));
    }
    Ok(resolved)
}

/// Lexically resolve `.` and `..` components without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "application/javascript; charset=utf-8",
        "json" => "application/json; charset=utf-8",
        "md" => "text/markdown; charset=utf-8",
        "txt" => "text/plain; charset=utf-8",

        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",

        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",

        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_collapses_parent_components() {
        assert_eq!(
            normalize(Path::new("/srv/slides/deck/assets/../../x.png")),
            PathBuf::from("/srv/slides/x.png")
        );
        assert_eq!(
            normalize(Path::new("/srv/slides/./a/../../../etc/passwd")),
            PathBuf::from("/etc/passwd")
        );
    }

    #[test]
    fn test_resolve_within_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("slides");
        fs::create_dir_all(root.join("deckA/assets")).unwrap();
        fs::write(dir.path().join("secret.txt"), "top secret").unwrap();

        match resolve_within(&root, "deckA/assets/../../../secret.txt") {
            Err(SiteError::Forbidden(_)) => {}
            other => panic!("expected forbidden, got {:?}", other),
        }
        // Escaping toward a file that does not exist is still forbidden
        match resolve_within(&root, "deckA/assets/../../../../nope/passwd") {
            Err(SiteError::Forbidden(_)) => {}
            other => panic!("expected forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_within_missing_and_present() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("deckA/assets")).unwrap();
        fs::write(root.join("deckA/assets/pic.png"), [0u8; 4]).unwrap();

        assert!(matches!(
            resolve_within(root, "deckA/assets/missing.png"),
            Err(SiteError::NotFound(_))
        ));
        assert!(matches!(
            resolve_within(root, "deckA/assets"),
            Err(SiteError::NotFound(_))
        ));
        let resolved = resolve_within(root, "deckA/assets/pic.png").unwrap();
        assert!(resolved.ends_with("deckA/assets/pic.png"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_within_rejects_symlink_escape() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("slides");
        fs::create_dir_all(root.join("deckA/assets")).unwrap();
        fs::write(dir.path().join("secret.txt"), "top secret").unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("secret.txt"),
            root.join("deckA/assets/link.txt"),
        )
        .unwrap();

        assert!(matches!(
            resolve_within(&root, "deckA/assets/link.txt"),
            Err(SiteError::Forbidden(_))
        ));
    }

    #[test]
    fn test_is_within_paths_not_yet_created() {
        let dir = TempDir::new().unwrap();
        let public = dir.path().join("public");
        fs::create_dir_all(&public).unwrap();

        assert!(is_within(&public.join("site/nested"), &public));
        assert!(is_within(&public, &public));
        assert!(is_within(&public, dir.path()));
        assert!(!is_within(&dir.path().join("out"), &public));
        assert!(!is_within(&dir.path().join("public_site"), &public));
        assert!(is_within(&public.join("site/../../public/x"), &public));
    }

    #[test]
    fn test_copy_dir_all_nested() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("nested/deeper")).unwrap();
        fs::write(src.join("a.txt"), "a").unwrap();
        fs::write(src.join("nested/deeper/b.txt"), "b").unwrap();

        let dst = dir.path().join("dst");
        assert_eq!(copy_dir_all(&src, &dst).unwrap(), 2);
        assert_eq!(fs::read_to_string(dst.join("nested/deeper/b.txt")).unwrap(), "b");
    }

    #[test]
    fn test_empty_directory_keeps_root() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        fs::create_dir_all(out.join("old/stale")).unwrap();
        fs::write(out.join("index.html"), "old").unwrap();

        empty_directory(&out).unwrap();
        assert!(out.is_dir());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(Path::new("a/pic.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("logo.svg")), "image/svg+xml");
        assert_eq!(content_type_for(Path::new("prog.cpp")), "application/octet-stream");
        assert_eq!(content_type_for(Path::new("noext")), "application/octet-stream");
    }
}
