//! Storage operations
//!
//! Enumerates the served directory and resolves requested file names
//! against its entries.

use log::{debug, error, info};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::StorageError;

/// Lists the entry names of `root`, sorted.
pub async fn list_directory(root: &Path) -> Result<Vec<String>, StorageError> {
    let mut entries = fs::read_dir(root).await.map_err(|e| {
        error!("Failed to list directory {}: {}", root.display(), e);
        StorageError::from(e)
    })?;

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    names.sort();

    info!("Listed directory {} - {} entries", root.display(), names.len());

    Ok(names)
}

/// Joins entry names into the listing payload: one name per line, no
/// trailing newline.
pub fn format_listing(names: &[String]) -> String {
    names.join("\n")
}

/// Resolves `filename` to a path if it names an entry of `root`.
///
/// Only direct entries match, so a name containing a path separator is
/// never found.
pub async fn find_entry(root: &Path, filename: &str) -> Result<PathBuf, StorageError> {
    let names = list_directory(root).await?;

    if names.iter().any(|name| name == filename) {
        debug!("Resolved {} in {}", filename, root.display());
        Ok(root.join(filename))
    } else {
        Err(StorageError::FileNotFound(filename.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[tokio::test]
    async fn listing_is_sorted_and_newline_joined() {
        let dir = TempDir::new("ftserver-list").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"b").unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let names = list_directory(dir.path()).await.unwrap();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);
        assert_eq!(format_listing(&names), "a.txt\nb.txt\nsub");
    }

    #[tokio::test]
    async fn empty_directory_lists_nothing() {
        let dir = TempDir::new("ftserver-empty").unwrap();
        let names = list_directory(dir.path()).await.unwrap();
        assert!(names.is_empty());
        assert_eq!(format_listing(&names), "");
    }

    #[tokio::test]
    async fn missing_directory_is_an_io_error() {
        let dir = TempDir::new("ftserver-gone").unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            list_directory(&missing).await,
            Err(StorageError::IoError(_))
        ));
    }

    #[tokio::test]
    async fn find_entry_matches_names_exactly() {
        let dir = TempDir::new("ftserver-find").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"n").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("inner.txt"), b"i").unwrap();

        let found = find_entry(dir.path(), "notes.txt").await.unwrap();
        assert_eq!(found, dir.path().join("notes.txt"));

        assert!(matches!(
            find_entry(dir.path(), "NOTES.txt").await,
            Err(StorageError::FileNotFound(_))
        ));
        assert!(matches!(
            find_entry(dir.path(), "sub/inner.txt").await,
            Err(StorageError::FileNotFound(_))
        ));
        assert!(matches!(
            find_entry(dir.path(), "../notes.txt").await,
            Err(StorageError::FileNotFound(_))
        ));
    }
}
