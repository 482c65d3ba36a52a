//! Filesystem utilities.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

/// Ensure a directory exists, creating it if necessary.
///
/// Fails if something other than a directory already occupies `path`.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        bail!("not a directory: {}", path.display());
    }
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Write a file only if it does not exist yet.
///
/// Returns `true` if the file was written.
pub fn write_if_missing(path: &Path, contents: &str) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    write_string(path, contents)?;
    Ok(true)
}

/// Clear the read-only attribute of a single file or directory.
#[allow(clippy::permissions_set_readonly_false)]
pub fn make_writable(path: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(path)
        .with_context(|| format!("failed to stat: {}", path.display()))?;
    let mut perms = metadata.permissions();
    if perms.readonly() {
        perms.set_readonly(false);
        fs::set_permissions(path, perms)
            .with_context(|| format!("failed to make writable: {}", path.display()))?;
    }
    Ok(())
}

/// Clear the read-only attribute of everything under `root`, including `root`.
pub fn make_writable_recursive(root: &Path) -> Result<()> {
    for entry in WalkDir::new(root).follow_links(false) {
        let entry =
            entry.with_context(|| format!("failed to walk directory: {}", root.display()))?;
        if entry.path_is_symlink() {
            continue;
        }
        make_writable(entry.path())?;
    }
    Ok(())
}

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Remove everything inside `dir` one entry at a time, deepest first.
///
/// Slower than [`remove_dir_all_if_exists`] but leaves `dir` itself in place
/// and names the exact entry that could not be removed.
pub fn remove_dir_contents(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }

    for entry in WalkDir::new(dir).min_depth(1).contents_first(true) {
        let entry = entry.with_context(|| format!("failed to walk directory: {}", dir.display()))?;
        let path = entry.path();
        if entry.file_type().is_dir() {
            fs::remove_dir(path)
                .with_context(|| format!("failed to remove directory: {}", path.display()))?;
        } else {
            fs::remove_file(path)
                .with_context(|| format!("failed to remove file: {}", path.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn populate(root: &Path) {
        fs::create_dir_all(root.join("CMakeFiles/3.28")).unwrap();
        fs::write(root.join("CMakeCache.txt"), "CMAKE_BUILD_TYPE:STRING=Debug\n").unwrap();
        fs::write(root.join(".ninja_log"), "").unwrap();
        fs::write(root.join("CMakeFiles/3.28/CMakeSystem.cmake"), "").unwrap();
    }

    #[test]
    fn test_remove_dir_contents_keeps_dir() {
        let tmp = TempDir::new().unwrap();
        let build = tmp.path().join("build");
        populate(&build);

        remove_dir_contents(&build).unwrap();

        assert!(build.is_dir());
        assert_eq!(fs::read_dir(&build).unwrap().count(), 0);
    }

    #[test]
    fn test_ensure_dir_rejects_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("build");
        fs::write(&path, "").unwrap();

        let err = ensure_dir(&path).unwrap_err();
        assert!(err.to_string().contains("not a directory"));

        ensure_dir(&tmp.path().join("a/b")).unwrap();
        assert!(tmp.path().join("a/b").is_dir());
    }

    #[test]
    fn test_remove_dir_contents_missing_dir() {
        let tmp = TempDir::new().unwrap();
        remove_dir_contents(&tmp.path().join("nope")).unwrap();
    }

    #[test]
    fn test_make_writable_recursive() {
        let tmp = TempDir::new().unwrap();
        let build = tmp.path().join("build");
        populate(&build);

        let cache = build.join("CMakeCache.txt");
        let mut perms = fs::metadata(&cache).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&cache, perms).unwrap();

        make_writable_recursive(&build).unwrap();

        assert!(!fs::metadata(&cache).unwrap().permissions().readonly());
    }

    #[test]
    fn test_write_if_missing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("src/main.cpp");

        assert!(write_if_missing(&path, "first").unwrap());
        assert!(!write_if_missing(&path, "second").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "first");
    }
}
