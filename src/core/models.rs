use std::path::{Path, PathBuf};

/*
 * Plain data types shared by the core components: parsed history records,
 * saved profiles, directory listing rows, and the per-operation reports
 * returned by the operation runner. Nothing in here touches the file system.
 */

// How many basenames a history line shows before collapsing into "+N".
const DISPLAY_NAME_LIMIT: usize = 3;

/// One parsed line of the operation history.
///
/// Two textual formats are accepted for backward compatibility; anything
/// else is carried verbatim as `Raw`. A `Raw` record is display-only:
/// it has no structured fields and must never be used as a profile source.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryRecord {
    /// Canonical format: timestamp, source folder, full file paths, destination.
    Structured {
        timestamp: String,
        source_folder: PathBuf,
        files: Vec<PathBuf>,
        destination: PathBuf,
    },
    /// Older format: bare file names and a destination, no source folder.
    Legacy {
        timestamp: String,
        file_names: Vec<String>,
        destination: PathBuf,
    },
    /// A line matching neither format, kept as-is.
    Raw(String),
}

impl HistoryRecord {
    pub fn is_raw(&self) -> bool {
        matches!(self, HistoryRecord::Raw(_))
    }

    pub fn destination(&self) -> Option<&Path> {
        match self {
            HistoryRecord::Structured { destination, .. }
            | HistoryRecord::Legacy { destination, .. } => Some(destination),
            HistoryRecord::Raw(_) => None,
        }
    }

    /*
     * Renders the one-line summary shown in the history pane: the timestamp,
     * up to three file basenames with a "+N" overflow marker, and the
     * destination. Raw records render as their original text.
     */
    pub fn display_line(&self) -> String {
        match self {
            HistoryRecord::Structured {
                timestamp,
                files,
                destination,
                ..
            } => {
                let names: Vec<String> = files
                    .iter()
                    .map(|p| {
                        p.file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_else(|| p.to_string_lossy().into_owned())
                    })
                    .collect();
                format!(
                    "{timestamp}: {} -> {}",
                    abbreviate_names(&names),
                    destination.display()
                )
            }
            HistoryRecord::Legacy {
                timestamp,
                file_names,
                destination,
            } => {
                format!(
                    "{timestamp}: {} -> {}",
                    abbreviate_names(file_names),
                    destination.display()
                )
            }
            HistoryRecord::Raw(line) => line.clone(),
        }
    }
}

fn abbreviate_names(names: &[String]) -> String {
    let shown = names
        .iter()
        .take(DISPLAY_NAME_LIMIT)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if names.len() > DISPLAY_NAME_LIMIT {
        format!("{shown} +{}", names.len() - DISPLAY_NAME_LIMIT)
    } else {
        shown
    }
}

/// A saved operation: where the files came from, which files, and where
/// they go. Occupies one of the fixed profile slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub source_folder: PathBuf,
    pub destination_folder: PathBuf,
    pub files: Vec<PathBuf>,
}

impl Profile {
    pub fn new(source_folder: PathBuf, destination_folder: PathBuf, files: Vec<PathBuf>) -> Self {
        Profile {
            source_folder,
            destination_folder,
            files,
        }
    }

    /// A profile is only usable when all three fields are populated.
    pub fn is_complete(&self) -> bool {
        !self.source_folder.as_os_str().is_empty()
            && !self.destination_folder.as_os_str().is_empty()
            && !self.files.is_empty()
    }

    /*
     * Builds a profile from a history record. Legacy records have no source
     * folder, so the resulting profile is incomplete and will be rejected at
     * replay time. Raw records carry no structured data and yield `None`.
     */
    pub fn from_record(record: &HistoryRecord) -> Option<Profile> {
        match record {
            HistoryRecord::Structured {
                source_folder,
                files,
                destination,
                ..
            } => Some(Profile::new(
                source_folder.clone(),
                destination.clone(),
                files.clone(),
            )),
            HistoryRecord::Legacy {
                file_names,
                destination,
                ..
            } => Some(Profile::new(
                PathBuf::new(),
                destination.clone(),
                file_names.iter().map(PathBuf::from).collect(),
            )),
            HistoryRecord::Raw(_) => None,
        }
    }
}

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderEntry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
}

/// What to do when a committed file already exists at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionChoice {
    Replace,
    Rename,
    Skip,
}

/// A per-file failure collected during a batch operation. The batch itself
/// continues past these.
#[derive(Debug, Clone, PartialEq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

impl FileFailure {
    pub fn new(path: PathBuf, message: String) -> Self {
        FileFailure { path, message }
    }
}

/// Outcome of staging a selection into the scratch directory.
#[derive(Debug, Default)]
pub struct StageReport {
    pub staged: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

/// Outcome of committing staged files into the destination folder.
#[derive(Debug, Default)]
pub struct CommitReport {
    /// Final paths written at the destination (renamed entries keep their new name).
    pub placed: Vec<PathBuf>,
    /// Staged files the user chose to leave uncommitted.
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

/// Outcome of replaying a profile back into the scratch directory.
#[derive(Debug, Default)]
pub struct ReplayReport {
    pub staged: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_display_line_abbreviates_long_file_lists() {
        let record = HistoryRecord::Structured {
            timestamp: "2026-08-01 10:00:00".to_string(),
            source_folder: PathBuf::from("/src"),
            files: vec![
                PathBuf::from("/src/a.txt"),
                PathBuf::from("/src/b.txt"),
                PathBuf::from("/src/c.txt"),
                PathBuf::from("/src/d.txt"),
                PathBuf::from("/src/e.txt"),
            ],
            destination: PathBuf::from("/dest"),
        };
        assert_eq!(
            record.display_line(),
            "2026-08-01 10:00:00: a.txt, b.txt, c.txt +2 -> /dest"
        );
    }

    #[test]
    fn test_display_line_short_list_has_no_overflow_marker() {
        let record = HistoryRecord::Legacy {
            timestamp: "2021-03-04 09:10:11".to_string(),
            file_names: vec!["a.txt".to_string(), "b.txt".to_string()],
            destination: PathBuf::from("/dest"),
        };
        assert_eq!(record.display_line(), "2021-03-04 09:10:11: a.txt, b.txt -> /dest");
    }

    #[test]
    fn test_display_line_raw_is_verbatim() {
        let record = HistoryRecord::Raw("not a record at all".to_string());
        assert_eq!(record.display_line(), "not a record at all");
    }

    #[test]
    fn test_profile_from_structured_record() {
        let record = HistoryRecord::Structured {
            timestamp: "2026-08-01 10:00:00".to_string(),
            source_folder: PathBuf::from("/src"),
            files: vec![PathBuf::from("/src/a.txt")],
            destination: PathBuf::from("/dest"),
        };
        let profile = Profile::from_record(&record).expect("structured record should convert");
        assert_eq!(profile.source_folder, PathBuf::from("/src"));
        assert_eq!(profile.destination_folder, PathBuf::from("/dest"));
        assert_eq!(profile.files, vec![PathBuf::from("/src/a.txt")]);
        assert!(profile.is_complete());
    }

    #[test]
    fn test_profile_from_legacy_record_is_incomplete() {
        let record = HistoryRecord::Legacy {
            timestamp: "2021-03-04 09:10:11".to_string(),
            file_names: vec!["a.txt".to_string()],
            destination: PathBuf::from("/dest"),
        };
        let profile = Profile::from_record(&record).expect("legacy record should convert");
        assert!(profile.source_folder.as_os_str().is_empty());
        assert!(!profile.is_complete());
    }

    #[test]
    fn test_profile_from_raw_record_is_none() {
        assert!(Profile::from_record(&HistoryRecord::Raw("junk".to_string())).is_none());
    }

    #[test]
    fn test_profile_is_complete_requires_all_fields() {
        let complete = Profile::new(
            PathBuf::from("/src"),
            PathBuf::from("/dest"),
            vec![PathBuf::from("/src/a.txt")],
        );
        assert!(complete.is_complete());

        let no_files = Profile::new(PathBuf::from("/src"), PathBuf::from("/dest"), Vec::new());
        assert!(!no_files.is_complete());

        let no_dest = Profile::new(
            PathBuf::from("/src"),
            PathBuf::new(),
            vec![PathBuf::from("/src/a.txt")],
        );
        assert!(!no_dest.is_complete());
    }
}
