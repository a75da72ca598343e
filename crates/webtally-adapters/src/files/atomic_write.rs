use std::io::Write;
use std::path::{Path, PathBuf};

/// Replaces `path` with `contents` so readers only ever see the old or the new file.
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temporary_path = temporary_sibling(path);
    let result = write_and_sync(&temporary_path, contents)
        .and_then(|_| std::fs::rename(&temporary_path, path));

    if result.is_err() {
        let _ = std::fs::remove_file(&temporary_path);
    }

    result
}

fn write_and_sync(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_existing_content() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("file.json");

        write_atomically(&path, b"old").unwrap();
        write_atomically(&path, b"new").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert!(!temporary_sibling(&path).exists());
    }

    #[test]
    fn creates_missing_parent_directories() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("a").join("b").join("file.toml");

        write_atomically(&path, b"content").unwrap();

        assert!(path.exists());
    }
}
