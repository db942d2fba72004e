//! Input collection.
//!
//! Turns the paths given on the command line into an ordered list of
//! [`SourceImage`]s. Files are taken as given; directories are walked
//! recursively in filename order. Only JPEG, PNG, and WebP files are kept
//! (matched by extension); everything else is reported as skipped.
//!
//! ```text
//! coverpack pack meters/ extra/001_front.png
//!
//! meters/
//! ├── .DS_Store          # hidden: ignored
//! ├── 001_front.jpg      # kept
//! ├── 002_front.webp     # kept
//! ├── notes.txt          # skipped
//! └── north/
//!     └── 003_side.png   # kept
//! ```

use crate::types::{ImageKind, SourceImage};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Input not found: {0}")]
    NotFound(PathBuf),
}

/// Sources accepted for processing plus files passed over.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub sources: Vec<SourceImage>,
    /// Regular files with an unsupported extension.
    pub skipped: Vec<PathBuf>,
}

/// Collect source images from files and directories, preserving input order.
pub fn collect_sources(inputs: &[PathBuf]) -> Result<ScanResult, ScanError> {
    let mut result = ScanResult::default();

    for input in inputs {
        if !input.exists() {
            return Err(ScanError::NotFound(input.clone()));
        }
        for path in expand_input(input)? {
            match file_name(&path) {
                Some(name) if ImageKind::from_filename(&name).is_some() => {
                    let bytes = fs::read(&path).map_err(|source| ScanError::Io {
                        path: path.clone(),
                        source,
                    })?;
                    result.sources.push(SourceImage::new(name, bytes));
                }
                _ => result.skipped.push(path),
            }
        }
    }

    log::info!(
        "Collected {} source images ({} skipped)",
        result.sources.len(),
        result.skipped.len()
    );
    Ok(result)
}

/// Expand one input into the regular files it names.
fn expand_input(input: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }
    let mut files = Vec::new();
    let walker = WalkDir::new(input)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::jpeg_bytes;
    use tempfile::TempDir;

    fn names(result: &ScanResult) -> Vec<&str> {
        result.sources.iter().map(|s| s.filename.as_str()).collect()
    }

    #[test]
    fn directory_is_walked_in_name_order() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("002_b.png"), "fake image").unwrap();
        fs::write(tmp.path().join("001_a.jpg"), "fake image").unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("sub/003_c.webp"), "fake image").unwrap();

        let result = collect_sources(&[tmp.path().to_path_buf()]).unwrap();
        assert_eq!(names(&result), vec!["001_a.jpg", "002_b.png", "003_c.webp"]);
    }

    #[test]
    fn unsupported_files_are_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("001_a.jpg"), "fake image").unwrap();
        fs::write(tmp.path().join("notes.txt"), "hello").unwrap();
        fs::write(tmp.path().join("anim.gif"), "GIF89a").unwrap();

        let result = collect_sources(&[tmp.path().to_path_buf()]).unwrap();
        assert_eq!(names(&result), vec!["001_a.jpg"]);
        assert_eq!(result.skipped.len(), 2);
    }

    #[test]
    fn hidden_entries_are_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".hidden.jpg"), "fake image").unwrap();
        fs::create_dir(tmp.path().join(".cache")).unwrap();
        fs::write(tmp.path().join(".cache/001.jpg"), "fake image").unwrap();
        fs::write(tmp.path().join("visible.jpg"), "fake image").unwrap();

        let result = collect_sources(&[tmp.path().to_path_buf()]).unwrap();
        assert_eq!(names(&result), vec!["visible.jpg"]);
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn explicit_files_keep_argument_order() {
        let tmp = TempDir::new().unwrap();
        let b = tmp.path().join("b.jpg");
        let a = tmp.path().join("a.png");
        fs::write(&b, jpeg_bytes(4, 4)).unwrap();
        fs::write(&a, "fake image").unwrap();

        let result = collect_sources(&[b, a]).unwrap();
        assert_eq!(names(&result), vec!["b.jpg", "a.png"]);
        assert_eq!(result.sources[0].bytes, jpeg_bytes(4, 4));
    }

    #[test]
    fn missing_input_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = collect_sources(&[tmp.path().join("nope")]);
        assert!(matches!(result, Err(ScanError::NotFound(_))));
    }
}
