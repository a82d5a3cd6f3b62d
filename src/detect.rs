//! Source file discovery and validation.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Extension of markup source files.
pub const SOURCE_EXTENSION: &str = "sn";

/// Whether `name` looks like a source file rather than an editor backup or
/// lock file (`notes.sn~`, `.#notes.sn`, `#notes.sn#`).
pub fn is_source_name(name: &str) -> bool {
    if name.ends_with('~') || name.starts_with('.') || name.starts_with('#') {
        return false;
    }
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext == SOURCE_EXTENSION)
}

/// Pick the source file in `dir`.
///
/// When several candidates exist the first in name order is used, so the
/// choice does not depend on directory iteration order.
///
/// # Example
/// ```no_run
/// use snp::detect::find_source_file;
///
/// let path = find_source_file(".").unwrap();
/// println!("using {}", path.display());
/// ```
pub fn find_source_file<P: AsRef<Path>>(dir: P) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter(|entry| is_source_name(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.path())
        .collect();
    candidates.sort();

    if candidates.len() > 1 {
        log::debug!("{} source files in {}, using the first", candidates.len(), dir.display());
    }
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::NoSourceFile(dir.to_path_buf()))
}

/// Check that `path` names an existing file and return its size.
pub fn check_input<P: AsRef<Path>>(path: P) -> Result<u64> {
    let path = path.as_ref();
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(meta.len()),
        _ => Err(Error::InputNotFound(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_source_names() {
        assert!(is_source_name("lecture01.sn"));
        assert!(!is_source_name("lecture01.sn~"));
        assert!(!is_source_name(".#lecture01.sn"));
        assert!(!is_source_name("#lecture01.sn"));
        assert!(!is_source_name("lecture01.md"));
        assert!(!is_source_name("sn"));
    }

    #[test]
    fn test_find_source_file_skips_backups() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.sn"), "").unwrap();
        fs::write(dir.path().join("a.sn~"), "").unwrap();
        fs::write(dir.path().join(".#a.sn"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let found = find_source_file(dir.path()).unwrap();
        assert_eq!(found, dir.path().join("b.sn"));
    }

    #[test]
    fn test_find_source_file_is_ordered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("week2.sn"), "").unwrap();
        fs::write(dir.path().join("week1.sn"), "").unwrap();
        assert_eq!(find_source_file(dir.path()).unwrap(), dir.path().join("week1.sn"));
    }

    #[test]
    fn test_find_source_file_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let result = find_source_file(dir.path());
        assert!(matches!(result, Err(Error::NoSourceFile(_))));
    }

    #[test]
    fn test_check_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lec.sn");
        fs::write(&path, "T Intro\n").unwrap();
        assert_eq!(check_input(&path).unwrap(), 8);
        assert!(matches!(
            check_input(dir.path().join("missing.sn")),
            Err(Error::InputNotFound(_))
        ));
        assert!(matches!(check_input(dir.path()), Err(Error::InputNotFound(_))));
    }
}
