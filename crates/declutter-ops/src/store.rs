//! In-memory file store that executes and reverses batch actions.
//!
//! Deleted and archived files are parked in a trash area so the last action
//! can be reversed. The trash only ever holds the files of the most recent
//! action that applied to at least one path. Archives are real zip files
//! stored under the archive folder.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tracing::debug;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use declutter_core::{CoordinatorConfig, ExecutorError};

use crate::action::{ActionRequest, ActionResponse, FileAction, PathOutcome};
use crate::executor::{
    BoxFuture, FileActionExecutor, FileLookup, StoredFile, UndoExecutor, base_name, join_path,
};
use crate::undo::PendingAction;

/// Concurrent path to content map standing in for real storage.
#[derive(Debug)]
pub struct MemoryStore {
    files: DashMap<String, Vec<u8>>,
    trash: DashMap<String, Vec<u8>>,
    faults: DashMap<String, String>,
    offline: AtomicBool,
    archive_dir: String,
    latency: Option<Duration>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            files: DashMap::new(),
            trash: DashMap::new(),
            faults: DashMap::new(),
            offline: AtomicBool::new(false),
            archive_dir: CoordinatorConfig::default().archive_dir,
            latency: None,
        }
    }

    /// Create a store holding the given files.
    pub fn with_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<Vec<u8>>,
    {
        let store = Self::new();
        for (path, content) in files {
            store.insert(path, content);
        }
        store
    }

    /// Set the folder that receives archives.
    pub fn with_archive_dir(mut self, dir: impl Into<String>) -> Self {
        self.archive_dir = dir.into();
        self
    }

    /// Delay every executor call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Add or replace a file.
    pub fn insert(&self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), content.into());
    }

    /// Remove a file without going through the trash.
    pub fn remove(&self, path: &str) -> bool {
        self.files.remove(path).is_some()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Number of live files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// All live paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files.iter().map(|e| e.key().clone()).collect();
        paths.sort();
        paths
    }

    /// Where an archive with this name is stored.
    pub fn archive_path(&self, archive_name: &str) -> String {
        join_path(&self.archive_dir, archive_name)
    }

    /// Number of files parked for undo.
    pub fn trash_len(&self) -> usize {
        self.trash.len()
    }

    /// Make every action on this path report an error.
    pub fn fail_path(&self, path: impl Into<String>, message: impl Into<String>) {
        self.faults.insert(path.into(), message.into());
    }

    /// Make every call fail as if the store were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    async fn enter(&self) -> Result<(), ExecutorError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(ExecutorError::transport("file store is offline"));
        }
        Ok(())
    }

    fn fault(&self, path: &str) -> Option<String> {
        self.faults.get(path).map(|m| m.value().clone())
    }

    /// Replace the trash with the files of a newer action.
    ///
    /// Files of the superseded action can no longer be undone. Calls that
    /// applied to nothing leave the previous action's files in place.
    fn park(&self, parked: Vec<(String, Vec<u8>)>, applied_any: bool) {
        if !applied_any {
            return;
        }
        if !self.trash.is_empty() {
            debug!(dropped = self.trash.len(), "discarding superseded trash");
            self.trash.clear();
        }
        for (path, content) in parked {
            self.trash.insert(path, content);
        }
    }

    fn delete(&self, paths: &[String]) -> ActionResponse {
        let mut parked = Vec::new();
        let outcomes: Vec<PathOutcome> = paths
            .iter()
            .map(|path| {
                if let Some(message) = self.fault(path) {
                    return PathOutcome::error(path, message);
                }
                match self.files.remove(path) {
                    Some((path, content)) => {
                        debug!(path = %path, "deleting file");
                        parked.push((path.clone(), content));
                        PathOutcome::applied(path)
                    }
                    None => PathOutcome::not_found(path),
                }
            })
            .collect();
        self.park(parked, outcomes.iter().any(PathOutcome::is_applied));

        ActionResponse {
            outcomes,
            archive_name: None,
        }
    }

    fn move_to(&self, paths: &[String], destination: &str) -> ActionResponse {
        let outcomes: Vec<PathOutcome> = paths
            .iter()
            .map(|path| {
                if let Some(message) = self.fault(path) {
                    return PathOutcome::error(path, message);
                }
                if !self.files.contains_key(path) {
                    return PathOutcome::not_found(path);
                }
                let target = join_path(destination, base_name(path));
                if self.files.contains_key(&target) {
                    return PathOutcome::error(path, format!("{target} already exists"));
                }
                match self.files.remove(path) {
                    Some((_, content)) => {
                        debug!(from = %path, to = %target, "moving file");
                        self.files.insert(target.clone(), content);
                        PathOutcome::moved(path, target)
                    }
                    None => PathOutcome::not_found(path),
                }
            })
            .collect();
        self.park(Vec::new(), outcomes.iter().any(PathOutcome::is_applied));

        ActionResponse {
            outcomes,
            archive_name: None,
        }
    }

    fn archive(&self, paths: &[String], archive_name: &str) -> Result<ActionResponse, ExecutorError> {
        let archive_path = self.archive_path(archive_name);
        if self.files.contains_key(&archive_path) {
            return Err(ExecutorError::archive_creation(format!(
                "{archive_path} already exists"
            )));
        }

        let mut outcomes = Vec::with_capacity(paths.len());
        let mut entries = Vec::new();
        for path in paths {
            if let Some(message) = self.fault(path) {
                outcomes.push(PathOutcome::error(path, message));
                continue;
            }
            match self.lookup(path) {
                Some(file) => {
                    entries.push(file);
                    outcomes.push(PathOutcome::applied(path));
                }
                None => outcomes.push(PathOutcome::not_found(path)),
            }
        }

        if entries.is_empty() {
            return Ok(ActionResponse {
                outcomes,
                archive_name: None,
            });
        }

        let bytes = build_zip(&entries)
            .map_err(|e| ExecutorError::archive_creation(e.to_string()))?;
        debug!(archive = %archive_path, files = entries.len(), "creating archive");
        self.files.insert(archive_path, bytes);

        // Originals only leave the store once the archive exists.
        let parked = entries
            .into_iter()
            .filter_map(|file| self.files.remove(&file.path))
            .collect();
        self.park(parked, true);

        Ok(ActionResponse {
            outcomes,
            archive_name: Some(archive_name.to_string()),
        })
    }

    fn restore_from_trash(&self, paths: &[String]) -> usize {
        let mut restored = 0;
        for path in paths {
            if let Some((path, content)) = self.trash.remove(path) {
                self.files.insert(path, content);
                restored += 1;
            }
        }
        restored
    }

    fn restore_moves(&self, relocations: &[(String, String)]) -> usize {
        let mut restored = 0;
        for (original, moved) in relocations {
            if self.files.contains_key(original) {
                continue;
            }
            if let Some((_, content)) = self.files.remove(moved) {
                self.files.insert(original.clone(), content);
                restored += 1;
            }
        }
        restored
    }
}

/// Pack files into an in-memory zip, one entry per file under its base name.
fn build_zip(files: &[StoredFile]) -> zip::result::ZipResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    let mut used = HashSet::new();

    for (index, file) in files.iter().enumerate() {
        let base = file.base_name();
        let mut name = base.to_string();
        let mut prefix = index;
        while !used.insert(name.clone()) {
            name = format!("{prefix}_{base}");
            prefix += 1;
        }
        writer.start_file(name, options)?;
        writer.write_all(&file.content)?;
    }

    Ok(writer.finish()?.into_inner())
}

impl FileLookup for MemoryStore {
    fn lookup(&self, path: &str) -> Option<StoredFile> {
        self.files.get(path).map(|entry| StoredFile {
            path: entry.key().clone(),
            content: entry.value().clone(),
        })
    }
}

impl FileActionExecutor for MemoryStore {
    fn execute<'a>(
        &'a self,
        request: &'a ActionRequest,
    ) -> BoxFuture<'a, Result<ActionResponse, ExecutorError>> {
        Box::pin(async move {
            self.enter().await?;
            match &request.action {
                FileAction::Delete => Ok(self.delete(&request.paths)),
                FileAction::Move { destination } => Ok(self.move_to(&request.paths, destination)),
                FileAction::Archive { archive_name } => self.archive(&request.paths, archive_name),
            }
        })
    }
}

impl UndoExecutor for MemoryStore {
    fn undo<'a>(&'a self, action: &'a PendingAction) -> BoxFuture<'a, Result<(), ExecutorError>> {
        Box::pin(async move {
            self.enter().await?;
            let restored = match &action.action {
                FileAction::Delete => self.restore_from_trash(&action.file_paths),
                FileAction::Move { .. } => self.restore_moves(&action.relocations),
                FileAction::Archive { archive_name } => {
                    let restored = self.restore_from_trash(&action.file_paths);
                    if restored > 0 {
                        self.files.remove(&self.archive_path(archive_name));
                    }
                    restored
                }
            };

            if restored == 0 {
                return Err(ExecutorError::no_op(format!(
                    "no files from the last {} could be restored",
                    action.kind()
                )));
            }
            debug!(kind = %action.kind(), restored, "reversed action");
            Ok(())
        })
    }
}
