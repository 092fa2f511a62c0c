use crate::core::{
    CollisionResolverOperations, CommitReport, ConfigManagerOperations,
    DirectoryListerOperations, FileSystemError, FolderEntry, HistoryError, HistoryLogOperations,
    HistoryRecord, OperationRunnerOperations, PROFILE_SLOT_COUNT, Profile,
    ProfileStoreOperations, ReplayReport, StageReport, StagingError,
};
use crate::core::profile_store::ProfileStoreError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/*
 * The session object owns all process-wide mutable state (the loaded
 * profile slots, the cumulative staged-file list, the current source and
 * destination folders, and the history entry selected for a profile save)
 * and exposes the orchestration methods the UI adapter calls. Core
 * components are injected behind their `XxxOperations` traits so the
 * session is testable without a real disk layout.
 *
 * Lifecycle: construction loads the profile slots and seeds the current
 * folders from configuration; every slot mutation is written back
 * synchronously; nothing else persists at session end.
 */

#[derive(Debug)]
pub enum SessionError {
    /// Stage was requested with nothing selected in the source pane.
    NothingSelected,
    /// Commit was requested with an empty staged list.
    NothingStaged,
    /// Commit was requested before a destination folder was chosen.
    NoDestination,
    /// A profile save was requested before a history entry was selected.
    NoRecordSelected,
    /// The selected history entry could not be parsed; it cannot become a profile.
    RawRecordSelected,
    SlotOutOfRange(usize),
    /// The slot holds a profile with missing fields; replay refused.
    IncompleteProfile(usize),
    FileSystem(FileSystemError),
    History(HistoryError),
    Staging(StagingError),
    Store(ProfileStoreError),
}

impl From<FileSystemError> for SessionError {
    fn from(err: FileSystemError) -> Self {
        SessionError::FileSystem(err)
    }
}

impl From<HistoryError> for SessionError {
    fn from(err: HistoryError) -> Self {
        SessionError::History(err)
    }
}

impl From<StagingError> for SessionError {
    fn from(err: StagingError) -> Self {
        SessionError::Staging(err)
    }
}

impl From<ProfileStoreError> for SessionError {
    fn from(err: ProfileStoreError) -> Self {
        SessionError::Store(err)
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::NothingSelected => {
                write!(f, "Select at least one file from the list first")
            }
            SessionError::NothingStaged => {
                write!(f, "Stage at least one file before running the operation")
            }
            SessionError::NoDestination => write!(f, "Choose a destination folder first"),
            SessionError::NoRecordSelected => {
                write!(f, "Select an operation in the history first")
            }
            SessionError::RawRecordSelected => write!(
                f,
                "The selected history entry could not be parsed and cannot be saved as a profile"
            ),
            SessionError::SlotOutOfRange(index) => {
                write!(f, "There is no profile slot #{}", index + 1)
            }
            SessionError::IncompleteProfile(index) => {
                write!(f, "Profile #{} contains incomplete data", index + 1)
            }
            SessionError::FileSystem(e) => write!(f, "{e}"),
            SessionError::History(e) => write!(f, "{e}"),
            SessionError::Staging(e) => write!(f, "{e}"),
            SessionError::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::FileSystem(e) => Some(e),
            SessionError::History(e) => Some(e),
            SessionError::Staging(e) => Some(e),
            SessionError::Store(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Outcome of replaying a slot: an empty slot is an expected state, not
/// an error, and performs no filesystem work.
#[derive(Debug)]
pub enum SlotReplay {
    Empty,
    Replayed(ReplayReport),
}

pub struct Session {
    profile_slots: Vec<Option<Profile>>,
    staged_files: Vec<PathBuf>,
    current_folder: Option<PathBuf>,
    current_dest_folder: Option<PathBuf>,
    selected_record: Option<HistoryRecord>,
    profile_store: Arc<dyn ProfileStoreOperations>,
    history_log: Arc<dyn HistoryLogOperations>,
    runner: Arc<dyn OperationRunnerOperations>,
    lister: Arc<dyn DirectoryListerOperations>,
    config: Arc<dyn ConfigManagerOperations>,
}

impl Session {
    /*
     * Starts a session: loads the profile slots (a load failure degrades
     * to empty slots with a logged warning rather than blocking startup)
     * and restores the last-used folders when they still exist.
     */
    pub fn new(
        profile_store: Arc<dyn ProfileStoreOperations>,
        history_log: Arc<dyn HistoryLogOperations>,
        runner: Arc<dyn OperationRunnerOperations>,
        lister: Arc<dyn DirectoryListerOperations>,
        config: Arc<dyn ConfigManagerOperations>,
    ) -> Self {
        let mut profile_slots = match profile_store.load() {
            Ok(slots) => slots,
            Err(e) => {
                log::warn!("Session: Failed to load profiles, starting with empty slots: {e}");
                Vec::new()
            }
        };
        profile_slots.resize(PROFILE_SLOT_COUNT, None);
        let current_folder = config
            .load_last_source_folder()
            .ok()
            .flatten()
            .filter(|p| p.is_dir());
        let current_dest_folder = config
            .load_last_destination_folder()
            .ok()
            .flatten()
            .filter(|p| p.is_dir());

        Session {
            profile_slots,
            staged_files: Vec::new(),
            current_folder,
            current_dest_folder,
            selected_record: None,
            profile_store,
            history_log,
            runner,
            lister,
            config,
        }
    }

    pub fn staged_files(&self) -> &[PathBuf] {
        &self.staged_files
    }

    pub fn profile_slots(&self) -> &[Option<Profile>] {
        &self.profile_slots
    }

    pub fn current_folder(&self) -> Option<&Path> {
        self.current_folder.as_deref()
    }

    pub fn current_dest_folder(&self) -> Option<&Path> {
        self.current_dest_folder.as_deref()
    }

    pub fn selected_record(&self) -> Option<&HistoryRecord> {
        self.selected_record.as_ref()
    }

    /// Makes `folder` the current source folder and returns its listing.
    pub fn browse_source(&mut self, folder: &Path) -> Result<Vec<FolderEntry>> {
        let entries = self.lister.list_entries(folder)?;
        self.current_folder = Some(folder.to_path_buf());
        if let Err(e) = self.config.save_last_source_folder(Some(folder)) {
            log::warn!("Session: Could not remember the source folder: {e}");
        }
        Ok(entries)
    }

    /// Makes `folder` the current destination and returns its subfolders.
    pub fn browse_destination(&mut self, folder: &Path) -> Result<Vec<FolderEntry>> {
        let entries = self.lister.list_subfolders(folder)?;
        self.current_dest_folder = Some(folder.to_path_buf());
        if let Err(e) = self.config.save_last_destination_folder(Some(folder)) {
            log::warn!("Session: Could not remember the destination folder: {e}");
        }
        Ok(entries)
    }

    /// Steps the source pane to the parent folder. `Ok(None)` means there
    /// is nowhere further up to go.
    pub fn go_back_source(&mut self) -> Result<Option<Vec<FolderEntry>>> {
        match parent_of(self.current_folder.as_deref()) {
            Some(parent) => self.browse_source(&parent).map(Some),
            None => Ok(None),
        }
    }

    pub fn go_back_destination(&mut self) -> Result<Option<Vec<FolderEntry>>> {
        match parent_of(self.current_dest_folder.as_deref()) {
            Some(parent) => self.browse_destination(&parent).map(Some),
            None => Ok(None),
        }
    }

    /*
     * Stages the selected files into the scratch directory. Staging is
     * cumulative: the new copies are appended to whatever is already
     * staged in this session.
     */
    pub fn stage(&mut self, selection: &[PathBuf]) -> Result<StageReport> {
        if selection.is_empty() {
            return Err(SessionError::NothingSelected);
        }
        let report = self.runner.stage(selection)?;
        self.staged_files.extend(report.staged.iter().cloned());
        Ok(report)
    }

    /*
     * Commits every staged file into the current destination folder and,
     * on success, clears the staged list. The history record uses the
     * current source folder, which is where the files are assumed to have
     * been staged from.
     */
    pub fn commit_staged(
        &mut self,
        resolver: &dyn CollisionResolverOperations,
    ) -> Result<CommitReport> {
        if self.staged_files.is_empty() {
            return Err(SessionError::NothingStaged);
        }
        let Some(destination) = self.current_dest_folder.clone() else {
            return Err(SessionError::NoDestination);
        };
        let source_folder = self.current_folder.clone().unwrap_or_default();

        let report = self.runner.commit(
            &self.staged_files,
            &source_folder,
            &destination,
            resolver,
            self.history_log.as_ref(),
        )?;
        self.staged_files.clear();
        Ok(report)
    }

    pub fn clear_staged(&mut self) {
        self.staged_files.clear();
    }

    /// Removes the staged entries at the given positions; out-of-range
    /// positions are ignored.
    pub fn remove_staged(&mut self, indices: &[usize]) {
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        // Back to front so earlier removals do not shift later indices.
        for index in sorted.into_iter().rev() {
            if index < self.staged_files.len() {
                self.staged_files.remove(index);
            }
        }
    }

    pub fn recent_history(&self, limit: usize) -> Result<Vec<HistoryRecord>> {
        Ok(self.history_log.recent(limit)?)
    }

    /// Marks a history entry as the candidate for the next profile save.
    pub fn select_record(&mut self, record: HistoryRecord) {
        self.selected_record = Some(record);
    }

    pub fn clear_selected_record(&mut self) {
        self.selected_record = None;
    }

    /*
     * Saves the selected history entry into the given slot, overwriting
     * whatever was there, and persists all slots immediately. The
     * selection is consumed by a successful save.
     */
    pub fn assign_slot(&mut self, index: usize) -> Result<()> {
        if index >= PROFILE_SLOT_COUNT {
            return Err(SessionError::SlotOutOfRange(index));
        }
        let Some(record) = &self.selected_record else {
            return Err(SessionError::NoRecordSelected);
        };
        let Some(profile) = Profile::from_record(record) else {
            return Err(SessionError::RawRecordSelected);
        };

        self.profile_slots[index] = Some(profile);
        self.profile_store.save(&self.profile_slots)?;
        self.selected_record = None;
        log::info!("Session: Saved the selected operation into profile slot {}.", index + 1);
        Ok(())
    }

    /*
     * Replays the profile in the given slot: stages its files into a
     * fresh scratch directory, replaces the staged list with the result,
     * and makes the profile's folders current. An empty slot is reported
     * as `SlotReplay::Empty` without touching the filesystem; a profile
     * with missing fields is a data-integrity failure for that slot only.
     */
    pub fn replay_slot(&mut self, index: usize) -> Result<SlotReplay> {
        if index >= PROFILE_SLOT_COUNT {
            return Err(SessionError::SlotOutOfRange(index));
        }
        let Some(profile) = self.profile_slots.get(index).and_then(|slot| slot.clone()) else {
            return Ok(SlotReplay::Empty);
        };
        if !profile.is_complete() {
            return Err(SessionError::IncompleteProfile(index));
        }

        let report = self.runner.replay(&profile)?;
        self.staged_files = report.staged.clone();
        self.current_folder = Some(profile.source_folder.clone());
        self.current_dest_folder = Some(profile.destination_folder.clone());
        Ok(SlotReplay::Replayed(report))
    }

    /// Caption for a profile button: the destination's basename for a
    /// filled slot, the 1-based slot number otherwise.
    pub fn slot_label(&self, index: usize) -> String {
        let fallback = (index + 1).to_string();
        match self.profile_slots.get(index).and_then(|slot| slot.as_ref()) {
            Some(profile) => profile
                .destination_folder
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .filter(|n| !n.is_empty())
                .unwrap_or(fallback),
            None => fallback,
        }
    }
}

fn parent_of(folder: Option<&Path>) -> Option<PathBuf> {
    folder?.parent().map(Path::to_path_buf)
}
