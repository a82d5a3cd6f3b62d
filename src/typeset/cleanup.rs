//! Removal of intermediate typesetting files.

use std::path::Path;

/// Extensions of the files a TeX run (plus biber) leaves behind.
pub const TEX_INTERMEDIATES: &[&str] = &[
    ".aux", ".log", ".out", ".run.xml", ".bcf", ".nav", ".snm", ".toc", ".bbl", ".blg",
];

/// Remove `dir/<stem><ext>` for every intermediate extension. Returns how
/// many files were removed.
pub fn remove_intermediates(dir: &Path, stem: &str) -> usize {
    let names: Vec<String> = TEX_INTERMEDIATES
        .iter()
        .map(|ext| format!("{}{}", stem, ext))
        .collect();
    remove_files(dir, &names)
}

/// Remove the named files from `dir`, skipping ones that do not exist.
pub fn remove_files<S: AsRef<str>>(dir: &Path, names: &[S]) -> usize {
    let mut removed = 0;
    for name in names {
        let path = dir.join(name.as_ref());
        if !path.is_file() {
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => {
                log::trace!("removed {}", path.display());
                removed += 1;
            }
            Err(e) => log::warn!("error removing {}: {}", path.display(), e),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_remove_intermediates() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["lec-notes.aux", "lec-notes.log", "lec-notes.pdf", "lec-notes.tex"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }

        assert_eq!(remove_intermediates(dir.path(), "lec-notes"), 2);
        assert!(dir.path().join("lec-notes.pdf").exists());
        assert!(dir.path().join("lec-notes.tex").exists());
        assert!(!dir.path().join("lec-notes.aux").exists());
    }

    #[test]
    fn test_remove_missing_files_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(remove_files(dir.path(), &["nope.tex"]), 0);
    }
}
