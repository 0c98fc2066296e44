//! File system utilities.

use crate::Result;
use std::path::Path;

/// Create a directory and all parent directories if missing.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        std::fs::create_dir_all(path)?;
        tracing::debug!("Created directory: {}", path.display());
    }
    Ok(())
}

/// Write a file, creating its parent directory first.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

/// Read a file to string; a missing file reads as empty.
pub fn read_or_empty(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

/// Get file extension in lowercase.
pub fn get_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_write_file_creates_parents() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a").join("b").join("history.txt");
        write_file(&file, "x").unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "x");
    }

    #[test]
    fn test_read_or_empty() {
        let temp = TempDir::new().unwrap();
        assert_eq!(read_or_empty(&temp.path().join("missing")).unwrap(), "");
    }

    #[test]
    fn test_get_extension() {
        assert_eq!(get_extension(&PathBuf::from("movie.MP4")).as_deref(), Some("mp4"));
        assert_eq!(get_extension(&PathBuf::from("movie")), None);
    }
}
