//! Loading input text from disk.
//!
//! Files are read as UTF-8 with a leading byte-order mark removed, and
//! directories are walked recursively in a stable, sorted order.

use std::io;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;
use walkdir::WalkDir;

/// UTF-8 byte-order mark some editors prepend to text files.
pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Error, Diagnostic, Debug)]
pub enum SourceError {
    #[error("failed to read `{}`", .path.display())]
    #[diagnostic(code(rulecraft::source::read))]
    Read {
        path: PathBuf,
        #[source]
        error: io::Error,
    },

    #[error("`{}` is not valid UTF-8", .path.display())]
    #[diagnostic(code(rulecraft::source::encoding))]
    Encoding {
        path: PathBuf,
        #[source]
        error: std::string::FromUtf8Error,
    },

    #[error("failed to walk `{}`", .root.display())]
    #[diagnostic(code(rulecraft::source::walk))]
    Walk {
        root: PathBuf,
        #[source]
        error: walkdir::Error,
    },
}

pub fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Reads a text file, dropping a UTF-8 byte-order mark if present.
pub fn read_source(path: impl AsRef<Path>) -> Result<String, SourceError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|error| SourceError::Read {
        path: path.to_path_buf(),
        error,
    })?;
    String::from_utf8(strip_bom(&bytes).to_vec()).map_err(|error| SourceError::Encoding {
        path: path.to_path_buf(),
        error,
    })
}

/// Finds files under `root` whose extension matches `extension`
/// (case-insensitive). Files whose name ends with one of `exclude` are left
/// out. A `root` that is itself a file is returned as is.
///
/// The result is sorted so runs are deterministic.
pub fn discover(
    root: impl AsRef<Path>,
    extension: &str,
    exclude: &[String],
) -> Result<Vec<PathBuf>, SourceError> {
    let root = root.as_ref();
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|error| SourceError::Walk {
            root: root.to_path_buf(),
            error,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !has_extension(path, extension) || is_excluded(path, exclude) {
            continue;
        }
        files.push(path.to_path_buf());
    }
    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension.trim_start_matches('.')))
}

fn is_excluded(path: &Path, exclude: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    exclude.iter().any(|suffix| name.ends_with(suffix.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rulecraft-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn strip_bom_only_removes_a_leading_mark() {
        assert_eq!(strip_bom(b"\xEF\xBB\xBFabc"), b"abc");
        assert_eq!(strip_bom(b"abc\xEF\xBB\xBF"), b"abc\xEF\xBB\xBF");
        assert_eq!(strip_bom(b""), b"");
    }

    #[test]
    fn read_source_drops_bom() {
        let dir = scratch_dir("bom");
        let file = dir.join("with_bom.txt");
        fs::write(&file, b"\xEF\xBB\xBFENG = {}").unwrap();
        assert_eq!(read_source(&file).unwrap(), "ENG = {}");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn read_source_reports_missing_file() {
        let err = read_source("definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, SourceError::Read { .. }));
        assert!(err.to_string().contains("definitely/not/here.txt"));
    }

    #[test]
    fn discover_filters_sorts_and_excludes() {
        let dir = scratch_dir("discover");
        fs::create_dir_all(dir.join("nested")).unwrap();
        for name in ["b.txt", "a.TXT", "00_names.txt", "notes.md", "nested/c.txt"] {
            fs::write(dir.join(name), "").unwrap();
        }

        let files = discover(&dir, "txt", &["00_names.txt".to_string()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(&dir).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, ["a.TXT", "b.txt", "nested/c.txt"]);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn discover_accepts_a_single_file() {
        let dir = scratch_dir("single");
        let file = dir.join("only.dat");
        fs::write(&file, "x").unwrap();
        assert_eq!(discover(&file, "txt", &[]).unwrap(), vec![file.clone()]);
        let _ = fs::remove_dir_all(&dir);
    }
}
