use super::models::FolderEntry;
use std::io;
use std::path::{Path, PathBuf};

/*
 * Single-level directory listings for the source and destination browser
 * panes. Listings are always returned case-insensitively sorted by name
 * with directories before files, independent of the underlying filesystem
 * order. A trait (`DirectoryListerOperations`) abstracts the listing so
 * the UI layer can be tested against a fake.
 */

#[derive(Debug)]
pub enum FileSystemError {
    Io(io::Error),
    InvalidPath(PathBuf),
}

impl From<io::Error> for FileSystemError {
    fn from(err: io::Error) -> Self {
        FileSystemError::Io(err)
    }
}

impl std::fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileSystemError::Io(e) => write!(f, "I/O error: {e}"),
            FileSystemError::InvalidPath(p) => write!(f, "Not an existing folder: {p:?}"),
        }
    }
}

impl std::error::Error for FileSystemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileSystemError::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FileSystemError>;

pub trait DirectoryListerOperations: Send + Sync {
    /// Lists the folder's immediate children, folders first, sorted
    /// case-insensitively by name.
    fn list_entries(&self, folder: &Path) -> Result<Vec<FolderEntry>>;

    /// Same as `list_entries` but keeps only subfolders (the destination
    /// pane never shows files).
    fn list_subfolders(&self, folder: &Path) -> Result<Vec<FolderEntry>>;
}

pub struct CoreDirectoryLister {}

impl CoreDirectoryLister {
    pub fn new() -> Self {
        CoreDirectoryLister {}
    }
}

impl Default for CoreDirectoryLister {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryListerOperations for CoreDirectoryLister {
    fn list_entries(&self, folder: &Path) -> Result<Vec<FolderEntry>> {
        if !folder.is_dir() {
            return Err(FileSystemError::InvalidPath(folder.to_path_buf()));
        }

        let mut entries = Vec::new();
        for entry_result in std::fs::read_dir(folder)? {
            let entry = entry_result?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.file_type().is_ok_and(|ft| ft.is_dir());
            entries.push(FolderEntry { path, name, is_dir });
        }
        sort_folder_entries(&mut entries);
        log::debug!(
            "DirectoryLister: Listed {} entr(ies) in {folder:?}.",
            entries.len()
        );
        Ok(entries)
    }

    fn list_subfolders(&self, folder: &Path) -> Result<Vec<FolderEntry>> {
        let mut entries = self.list_entries(folder)?;
        entries.retain(|entry| entry.is_dir);
        Ok(entries)
    }
}

fn sort_folder_entries(entries: &mut [FolderEntry]) {
    entries.sort_by(|a, b| {
        if a.is_dir && !b.is_dir {
            std::cmp::Ordering::Less
        } else if !a.is_dir && b.is_dir {
            std::cmp::Ordering::Greater
        } else {
            a.name.to_lowercase().cmp(&b.name.to_lowercase())
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn setup_mixed_dir(base: &Path) -> io::Result<()> {
        fs::create_dir(base.join("Zulu"))?;
        fs::create_dir(base.join("alpha"))?;
        File::create(base.join("Beta.txt"))?.sync_all()?;
        File::create(base.join("gamma.txt"))?.sync_all()?;
        Ok(())
    }

    #[test]
    fn test_list_entries_sorts_dirs_first_case_insensitively() -> Result<()> {
        let dir = tempdir()?;
        setup_mixed_dir(dir.path())?;
        let lister = CoreDirectoryLister::new();

        let entries = lister.list_entries(dir.path())?;

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "Zulu", "Beta.txt", "gamma.txt"]);
        assert!(entries[0].is_dir && entries[1].is_dir);
        assert!(!entries[2].is_dir && !entries[3].is_dir);
        Ok(())
    }

    #[test]
    fn test_list_entries_paths_are_absolute_children() -> Result<()> {
        let dir = tempdir()?;
        setup_mixed_dir(dir.path())?;
        let lister = CoreDirectoryLister::new();

        let entries = lister.list_entries(dir.path())?;

        for entry in &entries {
            assert_eq!(entry.path.parent(), Some(dir.path()));
        }
        Ok(())
    }

    #[test]
    fn test_list_subfolders_drops_files() -> Result<()> {
        let dir = tempdir()?;
        setup_mixed_dir(dir.path())?;
        let lister = CoreDirectoryLister::new();

        let entries = lister.list_subfolders(dir.path())?;

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "Zulu"]);
        Ok(())
    }

    #[test]
    fn test_list_entries_rejects_missing_folder() {
        let lister = CoreDirectoryLister::new();
        let result = lister.list_entries(Path::new("this_folder_does_not_exist"));
        assert!(matches!(result, Err(FileSystemError::InvalidPath(_))));
    }

    #[test]
    fn test_list_entries_rejects_file_path() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("plain.txt");
        File::create(&file_path)?.sync_all()?;
        let lister = CoreDirectoryLister::new();

        let result = lister.list_entries(&file_path);
        assert!(matches!(result, Err(FileSystemError::InvalidPath(_))));
        Ok(())
    }
}
