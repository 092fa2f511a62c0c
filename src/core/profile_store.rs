use super::models::Profile;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/*
 * Persistence for the eight fixed profile slots. The backing file is an
 * INI-style text file with one section per slot, `[Profile1]` through
 * `[Profile8]`, each holding `src`, `dest` and `files` keys (the latter a
 * `;`-joined path list). Empty slots are written as empty sections. A
 * missing backing file means all slots are empty, not an error; a section
 * missing any field, or with any field empty, also loads as an empty
 * slot. Saving rewrites the whole file through a temporary sibling and a
 * rename, so a concurrent `load` in this process never sees a torn write.
 */

pub const PROFILES_FILE_NAME: &str = "profiles.ini";
pub const PROFILE_SLOT_COUNT: usize = 8;

#[derive(Debug)]
pub enum ProfileStoreError {
    Io(io::Error),
}

impl From<io::Error> for ProfileStoreError {
    fn from(err: io::Error) -> Self {
        ProfileStoreError::Io(err)
    }
}

impl std::fmt::Display for ProfileStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileStoreError::Io(e) => write!(f, "Profile store I/O error: {e}"),
        }
    }
}

impl std::error::Error for ProfileStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProfileStoreError::Io(e) => Some(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProfileStoreError>;

pub trait ProfileStoreOperations: Send + Sync {
    /// Loads all slots. Always returns exactly `PROFILE_SLOT_COUNT` entries.
    fn load(&self) -> Result<Vec<Option<Profile>>>;

    /// Serializes all slots (empties included) and replaces the backing file.
    fn save(&self, slots: &[Option<Profile>]) -> Result<()>;
}

pub struct CoreProfileStore {
    store_dir: PathBuf,
}

impl CoreProfileStore {
    pub fn new(store_dir: PathBuf) -> Self {
        CoreProfileStore { store_dir }
    }

    pub fn file_path(&self) -> PathBuf {
        self.store_dir.join(PROFILES_FILE_NAME)
    }
}

fn slot_section_name(index: usize) -> String {
    format!("Profile{}", index + 1)
}

impl ProfileStoreOperations for CoreProfileStore {
    fn load(&self) -> Result<Vec<Option<Profile>>> {
        let mut slots: Vec<Option<Profile>> = vec![None; PROFILE_SLOT_COUNT];
        let path = self.file_path();
        if !path.exists() {
            log::debug!("ProfileStore: No backing file at {path:?} yet; all slots empty.");
            return Ok(slots);
        }

        let contents = fs::read_to_string(&path)?;
        let sections = parse_sections(&contents);
        for (index, slot) in slots.iter_mut().enumerate() {
            if let Some(fields) = sections.get(slot_section_name(index).as_str()) {
                *slot = profile_from_fields(fields);
            }
        }
        log::debug!(
            "ProfileStore: Loaded {} filled slot(s) from {path:?}.",
            slots.iter().filter(|slot| slot.is_some()).count()
        );
        Ok(slots)
    }

    fn save(&self, slots: &[Option<Profile>]) -> Result<()> {
        fs::create_dir_all(&self.store_dir)?;

        let mut contents = String::new();
        for index in 0..PROFILE_SLOT_COUNT {
            contents.push_str(&format!("[{}]\n", slot_section_name(index)));
            if let Some(profile) = slots.get(index).and_then(|slot| slot.as_ref()) {
                contents.push_str(&format!("src = {}\n", profile.source_folder.display()));
                contents.push_str(&format!(
                    "dest = {}\n",
                    profile.destination_folder.display()
                ));
                let files = profile
                    .files
                    .iter()
                    .map(|p| p.to_string_lossy())
                    .collect::<Vec<_>>()
                    .join(";");
                contents.push_str(&format!("files = {files}\n"));
            }
            contents.push('\n');
        }

        let tmp_path = self.store_dir.join(format!("{PROFILES_FILE_NAME}.tmp"));
        fs::write(&tmp_path, contents)?;
        fs::rename(&tmp_path, self.file_path())?;
        log::debug!(
            "ProfileStore: Saved {} filled slot(s) to {:?}.",
            slots.iter().filter(|slot| slot.is_some()).count(),
            self.file_path()
        );
        Ok(())
    }
}

/*
 * Minimal sectioned key/value parsing: `[Section]` headers, `key = value`
 * lines, `#`/`;` comments. Keys are lowercased; unknown keys and lines
 * that fit neither shape are ignored, so hand-edited files degrade
 * instead of failing.
 */
fn parse_sections(contents: &str) -> HashMap<String, HashMap<String, String>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current: Option<String> = None;

    for raw_line in contents.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            let name = line[1..line.len() - 1].trim().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }
        if let Some(section) = &current
            && let Some((key, value)) = line.split_once('=')
            && let Some(fields) = sections.get_mut(section)
        {
            fields.insert(key.trim().to_lowercase(), value.trim().to_string());
        }
    }
    sections
}

fn profile_from_fields(fields: &HashMap<String, String>) -> Option<Profile> {
    let src = fields.get("src")?;
    let dest = fields.get("dest")?;
    let files: Vec<PathBuf> = fields
        .get("files")?
        .split(';')
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect();
    if src.is_empty() || dest.is_empty() || files.is_empty() {
        return None;
    }
    Some(Profile::new(PathBuf::from(src), PathBuf::from(dest), files))
}
