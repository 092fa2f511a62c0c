use super::history::{HistoryError, HistoryLogOperations};
use super::models::{
    CollisionChoice, CommitReport, FileFailure, Profile, ReplayReport, StageReport,
};
use super::naming;
use super::path_utils;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/*
 * The operation runner: stages selected files into the per-day scratch
 * directory, commits staged files into the destination folder, and
 * replays a saved profile back into the scratch directory.
 *
 * Collision handling is intentionally asymmetric: staging overwrites a
 * same-named scratch copy silently, replay only renames within its
 * source-folder fallback branch, and committing is the single point
 * where the user decides per file via `CollisionResolverOperations`
 * (the replace/rename/skip dialog the UI layer implements).
 *
 * Per-file I/O failures are collected into the operation's report and
 * never abort the rest of the batch.
 */

#[derive(Debug)]
pub enum StagingError {
    Io(io::Error),
    History(HistoryError),
    NoScratchDirectory,
    NothingStaged,
    InvalidDestination(PathBuf),
}

impl From<io::Error> for StagingError {
    fn from(err: io::Error) -> Self {
        StagingError::Io(err)
    }
}

impl From<HistoryError> for StagingError {
    fn from(err: HistoryError) -> Self {
        StagingError::History(err)
    }
}

impl std::fmt::Display for StagingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StagingError::Io(e) => write!(f, "I/O error: {e}"),
            StagingError::History(e) => write!(f, "Failed to record the operation: {e}"),
            StagingError::NoScratchDirectory => {
                write!(f, "Could not create the scratch directory for staged files")
            }
            StagingError::NothingStaged => write!(f, "No files have been staged yet"),
            StagingError::InvalidDestination(p) => {
                write!(f, "Destination is not an existing folder: {p:?}")
            }
        }
    }
}

impl std::error::Error for StagingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StagingError::Io(e) => Some(e),
            StagingError::History(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, StagingError>;

/// The choice made for one colliding file, plus whether it should cover
/// the rest of the batch.
#[derive(Debug, Clone, Copy)]
pub struct CollisionDecision {
    pub choice: CollisionChoice,
    pub apply_to_all: bool,
}

/*
 * The interactive seam for commit collisions. The desktop front-end
 * implements this with a modal dialog; tests use scripted fakes. Only
 * consulted when a same-named file already exists at the destination, and
 * at most once per batch after the user picks "apply to all".
 */
pub trait CollisionResolverOperations {
    fn choose(&self, file_name: &str, multiple: bool) -> CollisionDecision;
}

pub trait OperationRunnerOperations: Send + Sync {
    /// Copies each selected regular file into today's scratch directory
    /// under its original name. Directories and vanished selection
    /// entries are skipped silently; a repeated name overwrites the
    /// previous scratch copy.
    fn stage(&self, selected: &[PathBuf]) -> Result<StageReport>;

    /// Copies staged files into `destination`, consulting `resolver` on
    /// collisions. When at least one file was not skipped, appends one
    /// history record listing the reconstructed original source paths.
    fn commit(
        &self,
        staged: &[PathBuf],
        source_folder: &Path,
        destination: &Path,
        resolver: &dyn CollisionResolverOperations,
        history: &dyn HistoryLogOperations,
    ) -> Result<CommitReport>;

    /// Stages a saved profile's files into today's scratch directory:
    /// the recorded path directly when it still exists, otherwise the
    /// same basename under the profile's source folder, otherwise a
    /// collected not-found failure.
    fn replay(&self, profile: &Profile) -> Result<ReplayReport>;
}

pub struct CoreOperationRunner {
    scratch_root: PathBuf,
}

impl CoreOperationRunner {
    pub fn new(scratch_root: PathBuf) -> Self {
        CoreOperationRunner { scratch_root }
    }

    fn todays_scratch_dir(&self) -> Result<PathBuf> {
        path_utils::ensure_scratch_dir_for_today(&self.scratch_root)
            .ok_or(StagingError::NoScratchDirectory)
    }
}

impl OperationRunnerOperations for CoreOperationRunner {
    fn stage(&self, selected: &[PathBuf]) -> Result<StageReport> {
        let scratch_dir = self.todays_scratch_dir()?;
        let mut report = StageReport::default();

        for path in selected {
            if !path.is_file() {
                log::trace!("OperationRunner: Skipping non-file selection entry {path:?}.");
                continue;
            }
            let Some(file_name) = path.file_name() else {
                continue;
            };
            let staged_path = scratch_dir.join(file_name);
            match fs::copy(path, &staged_path) {
                Ok(_) => report.staged.push(staged_path),
                Err(e) => {
                    log::warn!("OperationRunner: Failed to stage {path:?}: {e}");
                    report.failures.push(FileFailure::new(path.clone(), e.to_string()));
                }
            }
        }

        log::debug!(
            "OperationRunner: Staged {} file(s) into {scratch_dir:?}, {} failure(s).",
            report.staged.len(),
            report.failures.len()
        );
        Ok(report)
    }

    fn commit(
        &self,
        staged: &[PathBuf],
        source_folder: &Path,
        destination: &Path,
        resolver: &dyn CollisionResolverOperations,
        history: &dyn HistoryLogOperations,
    ) -> Result<CommitReport> {
        if staged.is_empty() {
            return Err(StagingError::NothingStaged);
        }
        if !destination.is_dir() {
            return Err(StagingError::InvalidDestination(destination.to_path_buf()));
        }

        let multiple = staged.len() > 1;
        let mut remembered: Option<CollisionChoice> = None;
        let mut report = CommitReport::default();

        for staged_path in staged {
            let Some(file_name_os) = staged_path.file_name() else {
                continue;
            };
            let file_name = file_name_os.to_string_lossy().into_owned();
            let mut target = destination.join(&file_name);

            if target.exists() {
                let choice = match remembered {
                    Some(choice) => choice,
                    None => {
                        let decision = resolver.choose(&file_name, multiple);
                        if decision.apply_to_all {
                            remembered = Some(decision.choice);
                        }
                        decision.choice
                    }
                };
                match choice {
                    CollisionChoice::Replace => {}
                    CollisionChoice::Rename => {
                        match naming::next_available_name(destination, &file_name) {
                            Ok(new_name) => target = destination.join(new_name),
                            Err(e) => {
                                report
                                    .failures
                                    .push(FileFailure::new(staged_path.clone(), e.to_string()));
                                continue;
                            }
                        }
                    }
                    CollisionChoice::Skip => {
                        report.skipped.push(staged_path.clone());
                        continue;
                    }
                }
            }

            match fs::copy(staged_path, &target) {
                Ok(_) => report.placed.push(target),
                Err(e) => {
                    log::warn!("OperationRunner: Failed to place {staged_path:?}: {e}");
                    report
                        .failures
                        .push(FileFailure::new(staged_path.clone(), e.to_string()));
                }
            }
        }

        // The history entry lists the pre-staging originals, reconstructed
        // from the session's source folder, never the scratch paths.
        if report.skipped.len() < staged.len() {
            let originals: Vec<PathBuf> = staged
                .iter()
                .filter_map(|p| p.file_name())
                .map(|name| source_folder.join(name))
                .collect();
            history.append(&originals, source_folder, destination)?;
        }

        log::debug!(
            "OperationRunner: Commit to {destination:?}: {} placed, {} skipped, {} failed.",
            report.placed.len(),
            report.skipped.len(),
            report.failures.len()
        );
        Ok(report)
    }

    fn replay(&self, profile: &Profile) -> Result<ReplayReport> {
        let scratch_dir = self.todays_scratch_dir()?;
        let mut report = ReplayReport::default();

        for recorded in &profile.files {
            let Some(file_name_os) = recorded.file_name() else {
                report.failures.push(FileFailure::new(
                    recorded.clone(),
                    "path has no file name".to_string(),
                ));
                continue;
            };

            if recorded.is_file() {
                let staged_path = scratch_dir.join(file_name_os);
                match fs::copy(recorded, &staged_path) {
                    Ok(_) => report.staged.push(staged_path),
                    Err(e) => report
                        .failures
                        .push(FileFailure::new(recorded.clone(), e.to_string())),
                }
                continue;
            }

            let candidate = profile.source_folder.join(file_name_os);
            if candidate.is_file() {
                let file_name = file_name_os.to_string_lossy();
                let mut staged_path = scratch_dir.join(file_name_os);
                if staged_path.exists() {
                    match naming::next_available_name(&scratch_dir, &file_name) {
                        Ok(new_name) => staged_path = scratch_dir.join(new_name),
                        Err(e) => {
                            report
                                .failures
                                .push(FileFailure::new(candidate.clone(), e.to_string()));
                            continue;
                        }
                    }
                }
                match fs::copy(&candidate, &staged_path) {
                    Ok(_) => report.staged.push(staged_path),
                    Err(e) => report
                        .failures
                        .push(FileFailure::new(candidate.clone(), e.to_string())),
                }
            } else {
                report.failures.push(FileFailure::new(
                    recorded.clone(),
                    "not found at the recorded path or in the profile's source folder".to_string(),
                ));
            }
        }

        log::debug!(
            "OperationRunner: Replay staged {} file(s), {} failure(s).",
            report.staged.len(),
            report.failures.len()
        );
        Ok(report)
    }
}
