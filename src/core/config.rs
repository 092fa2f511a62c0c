/*
 * Application-level configuration: the last-used source and destination
 * folders, so a restarted session can open where the user left off. Each
 * value lives in its own small text file under the platform's local
 * configuration directory. Missing or empty files load as `None`; saving
 * `None` clears the stored value.
 *
 * A trait (`ConfigManagerOperations`) allows mock implementations in
 * tests of the layers above.
 */
use crate::core::path_utils;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

const LAST_SOURCE_FOLDER_FILENAME: &str = "last_source_folder.txt";
const LAST_DESTINATION_FOLDER_FILENAME: &str = "last_destination_folder.txt";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    NoConfigDirectory,
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Configuration I/O error: {e}"),
            ConfigError::NoConfigDirectory => {
                write!(f, "Could not determine the configuration directory")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

pub trait ConfigManagerOperations: Send + Sync {
    fn load_last_source_folder(&self) -> Result<Option<PathBuf>>;
    fn save_last_source_folder(&self, folder: Option<&Path>) -> Result<()>;
    fn load_last_destination_folder(&self) -> Result<Option<PathBuf>>;
    fn save_last_destination_folder(&self, folder: Option<&Path>) -> Result<()>;
}

pub struct CoreConfigManager {
    app_name: String,
}

impl CoreConfigManager {
    pub fn new(app_name: &str) -> Self {
        CoreConfigManager {
            app_name: app_name.to_string(),
        }
    }

    fn config_file_path(&self, file_name: &str) -> Result<PathBuf> {
        let dir = path_utils::get_base_app_config_local_dir(&self.app_name)
            .ok_or(ConfigError::NoConfigDirectory)?;
        Ok(dir.join(file_name))
    }

    fn load_folder(&self, file_name: &str) -> Result<Option<PathBuf>> {
        let file_path = self.config_file_path(file_name)?;
        if !file_path.exists() {
            log::trace!("ConfigManager: {file_path:?} does not exist.");
            return Ok(None);
        }

        let mut contents = String::new();
        File::open(&file_path)?.read_to_string(&mut contents)?;

        let trimmed = contents.trim();
        if trimmed.is_empty() {
            Ok(None)
        } else {
            Ok(Some(PathBuf::from(trimmed)))
        }
    }

    fn save_folder(&self, file_name: &str, folder: Option<&Path>) -> Result<()> {
        let file_path = self.config_file_path(file_name)?;
        let mut file = File::create(&file_path)?;
        if let Some(folder) = folder {
            file.write_all(folder.to_string_lossy().as_bytes())?;
        } else {
            file.write_all(b"")?;
        }
        log::debug!("ConfigManager: Saved {folder:?} to {file_path:?}.");
        Ok(())
    }
}

impl ConfigManagerOperations for CoreConfigManager {
    fn load_last_source_folder(&self) -> Result<Option<PathBuf>> {
        self.load_folder(LAST_SOURCE_FOLDER_FILENAME)
    }

    fn save_last_source_folder(&self, folder: Option<&Path>) -> Result<()> {
        self.save_folder(LAST_SOURCE_FOLDER_FILENAME, folder)
    }

    fn load_last_destination_folder(&self) -> Result<Option<PathBuf>> {
        self.load_folder(LAST_DESTINATION_FOLDER_FILENAME)
    }

    fn save_last_destination_folder(&self, folder: Option<&Path>) -> Result<()> {
        self.save_folder(LAST_DESTINATION_FOLDER_FILENAME, folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    // Each test uses a unique app name so parallel runs and real user
    // configuration never collide; the directory is removed afterwards.
    fn unique_manager(tag: &str) -> CoreConfigManager {
        CoreConfigManager::new(&format!("FileShuttleTest_{tag}_{}", rand::random::<u64>()))
    }

    fn cleanup(manager: &CoreConfigManager) {
        if let Some(dir) = path_utils::get_base_app_config_local_dir(&manager.app_name) {
            if dir.exists()
                && let Err(e) = fs::remove_dir_all(&dir)
            {
                eprintln!("Test cleanup failed for {dir:?}: {e}");
            }
        }
    }

    #[test]
    fn test_save_and_load_both_folders() -> Result<()> {
        let manager = unique_manager("roundtrip");

        manager.save_last_source_folder(Some(Path::new("/tmp/source")))?;
        manager.save_last_destination_folder(Some(Path::new("/tmp/dest")))?;

        assert_eq!(
            manager.load_last_source_folder()?,
            Some(PathBuf::from("/tmp/source"))
        );
        assert_eq!(
            manager.load_last_destination_folder()?,
            Some(PathBuf::from("/tmp/dest"))
        );

        cleanup(&manager);
        Ok(())
    }

    #[test]
    fn test_load_when_nothing_saved_is_none() -> Result<()> {
        let manager = unique_manager("missing");

        assert!(manager.load_last_source_folder()?.is_none());
        assert!(manager.load_last_destination_folder()?.is_none());

        cleanup(&manager);
        Ok(())
    }

    #[test]
    fn test_saving_none_clears_the_value() -> Result<()> {
        let manager = unique_manager("clear");

        manager.save_last_source_folder(Some(Path::new("/tmp/source")))?;
        manager.save_last_source_folder(None)?;

        assert!(manager.load_last_source_folder()?.is_none());

        cleanup(&manager);
        Ok(())
    }
}
