/*
 * This module consolidates the core, platform-agnostic logic of the
 * application. It re-exports the key data structures and component
 * abstractions (`HistoryLogOperations`, `ProfileStoreOperations`,
 * `OperationRunnerOperations`, `DirectoryListerOperations`,
 * `ConfigManagerOperations`) for history logging, profile persistence,
 * staging and committing files, directory listings, and application
 * configuration, plus utilities for collision-free naming and path
 * derivation. Nothing in here depends on a GUI toolkit type.
 */
pub mod config;
pub mod file_system;
pub mod history;
pub mod models;
pub mod naming;
pub mod path_utils;
pub mod profile_store;
pub mod staging;

// Re-export key structures and enums
pub use models::{
    CollisionChoice, CommitReport, FileFailure, FolderEntry, HistoryRecord, Profile,
    ReplayReport, StageReport,
};

// Re-export directory listing related items
pub use file_system::{CoreDirectoryLister, DirectoryListerOperations, FileSystemError};

// Re-export history related items
pub use history::{
    CoreHistoryLog, HISTORY_FILE_NAME, HistoryError, HistoryLogOperations, RECENT_LIMIT,
    parse_record,
};

// Re-export profile store related items
pub use profile_store::{
    CoreProfileStore, PROFILE_SLOT_COUNT, PROFILES_FILE_NAME, ProfileStoreError,
    ProfileStoreOperations,
};

// Re-export operation runner related items
pub use staging::{
    CollisionDecision, CollisionResolverOperations, CoreOperationRunner,
    OperationRunnerOperations, StagingError,
};

// Re-export config related items
pub use config::{ConfigError, ConfigManagerOperations, CoreConfigManager};
