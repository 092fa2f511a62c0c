/*
 * Headless entry point: wires the concrete core components into a
 * `Session` and prints the current history and profile slots. The
 * desktop front-end links against the same modules and drives `Session`
 * (plus a real `CollisionResolverOperations` dialog) instead of this
 * summary.
 */
mod core;
mod session;

use crate::core::{
    ConfigManagerOperations, CoreConfigManager, CoreDirectoryLister, CoreHistoryLog,
    CoreOperationRunner, CoreProfileStore, DirectoryListerOperations, HistoryLogOperations,
    OperationRunnerOperations, PROFILE_SLOT_COUNT, ProfileStoreOperations, RECENT_LIMIT,
    path_utils,
};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    if let Err(e) = TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let Some(scratch_root) = path_utils::ensure_scratch_root() else {
        log::error!("Could not create the scratch root; nothing to do.");
        return ExitCode::FAILURE;
    };
    log::info!("Scratch root: {scratch_root:?}");

    let profile_store: Arc<dyn ProfileStoreOperations> =
        Arc::new(CoreProfileStore::new(scratch_root.clone()));
    let history_log: Arc<dyn HistoryLogOperations> =
        Arc::new(CoreHistoryLog::new(scratch_root.clone()));
    let runner: Arc<dyn OperationRunnerOperations> =
        Arc::new(CoreOperationRunner::new(scratch_root));
    let lister: Arc<dyn DirectoryListerOperations> = Arc::new(CoreDirectoryLister::new());
    let config: Arc<dyn ConfigManagerOperations> =
        Arc::new(CoreConfigManager::new(path_utils::APP_NAMESPACE));

    let session = session::Session::new(profile_store, history_log, runner, lister, config);

    match session.recent_history(RECENT_LIMIT) {
        Ok(records) => {
            println!("Recent operations ({}):", records.len());
            for record in &records {
                println!("  {}", record.display_line());
            }
        }
        Err(e) => log::error!("Could not read the operation history: {e}"),
    }

    let filled = session
        .profile_slots()
        .iter()
        .filter(|slot| slot.is_some())
        .count();
    println!("Profiles: {filled} of {PROFILE_SLOT_COUNT} slot(s) in use.");
    for index in 0..PROFILE_SLOT_COUNT {
        println!("  [{}] {}", index + 1, session.slot_label(index));
    }

    ExitCode::SUCCESS
}
