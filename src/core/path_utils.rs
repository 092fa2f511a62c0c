/*
 * Utility functions for deriving and ensuring the directories the
 * application works in: the scratch root under the system temp directory
 * (which also hosts the history and profile files), the per-day scratch
 * subdirectory staged copies land in, and the platform-specific local
 * configuration directory.
 */
use directories::ProjectDirs;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::macros::format_description;

pub const APP_NAMESPACE: &str = "FileShuttle";
const FILES_SUBFOLDER_NAME: &str = "files";

/// `<system temp root>/FileShuttle/files`; not created by this call.
pub fn scratch_root() -> PathBuf {
    env::temp_dir().join(APP_NAMESPACE).join(FILES_SUBFOLDER_NAME)
}

/*
 * Ensures the scratch root exists and returns it, or `None` when it could
 * not be created. Creation failures are logged here so callers can treat
 * `None` uniformly.
 */
pub fn ensure_scratch_root() -> Option<PathBuf> {
    ensure_dir(scratch_root())
}

/*
 * Ensures today's scratch subdirectory (`<root>/<YYYY-MM-DD>`) exists and
 * returns it. Staged copies within one calendar day share this directory.
 */
pub fn ensure_scratch_dir_for_today(root: &Path) -> Option<PathBuf> {
    let date = today_date_string()?;
    ensure_dir(root.join(date))
}

pub fn today_date_string() -> Option<String> {
    let format = format_description!("[year]-[month]-[day]");
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    match now.format(&format) {
        Ok(date) => Some(date),
        Err(e) => {
            log::error!("PathUtils: Failed to format today's date: {e}");
            None
        }
    }
}

fn ensure_dir(path: PathBuf) -> Option<PathBuf> {
    if !path.exists() {
        if let Err(e) = fs::create_dir_all(&path) {
            log::error!("PathUtils: Failed to create directory {path:?}: {e}");
            return None;
        }
        log::debug!("PathUtils: Created directory: {path:?}");
    }
    Some(path)
}

/*
 * Retrieves the application's local (non-roaming) configuration directory,
 * creating it if necessary. Derived without an organization qualifier, so
 * the folder sits directly under the user's local application data
 * directory structure.
 */
pub fn get_base_app_config_local_dir(app_name: &str) -> Option<PathBuf> {
    ProjectDirs::from("", "", app_name).and_then(|proj_dirs| {
        ensure_dir(proj_dirs.config_local_dir().to_path_buf())
    })
}
