//! Status store - one small file per (task type, session)
//!
//! Layout: `<root>/<name>/<name>.<session>.status`, a single line of text.
//! Workers write these files directly; the core reads, reserves and removes
//! them. Keys never share a file, so no cross-key locking is needed.

use crate::state::{STATUS_REQUESTED, STATUS_UNKNOWN};
use crate::task::{SessionId, TaskType};
use parking_lot::{Mutex, MutexGuard};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Status lines longer than this are truncated on read
const MAX_STATUS_BYTES: u64 = 256;

/// File extension of status records
const STATUS_EXTENSION: &str = "status";

/// Outcome of [`StatusStore::reserve`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// The key was idle; a provisional record now exists
    Created,
    /// A record was already present and was left untouched
    Exists,
}

/// File-backed status records
#[derive(Debug)]
pub struct StatusStore {
    root: PathBuf,

    /// Serialises read-modify-write sequences of the store and fetch paths
    guard: Mutex<()>,
}

impl StatusStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record for a key
    pub fn path_for(&self, task: TaskType, session: SessionId) -> PathBuf {
        let name = task.name();
        self.root
            .join(name)
            .join(format!("{}.{}.{}", name, session, STATUS_EXTENSION))
    }

    /// Hold while checking and then changing a record.
    ///
    /// Only coordinates callers inside this process; workers write without it.
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.guard.lock()
    }

    /// True iff a record exists for the key and can be opened
    pub fn has(&self, task: TaskType, session: SessionId) -> bool {
        File::open(self.path_for(task, session)).is_ok()
    }

    /// Current record content, newline-stripped.
    ///
    /// Returns "UNKNOWN" when the record is empty or cannot be read.
    pub fn get(&self, task: TaskType, session: SessionId) -> String {
        let path = self.path_for(task, session);
        match read_status(&path) {
            Ok(content) if !content.is_empty() => content,
            Ok(_) => STATUS_UNKNOWN.to_string(),
            Err(e) => {
                debug!("Unreadable status record {}: {}", path.display(), e);
                STATUS_UNKNOWN.to_string()
            }
        }
    }

    /// Delete the record, returning what it held.
    ///
    /// `None` means there was nothing to delete, or another caller (possibly
    /// another process) removed it first. Of several concurrent callers only
    /// one gets `Some`.
    pub fn remove(&self, task: TaskType, session: SessionId) -> io::Result<Option<String>> {
        let path = self.path_for(task, session);
        let dir = path.parent().unwrap_or(&self.root);

        // rename은 한 쪽만 성공한다; 진 쪽은 NotFound
        let claimed = match tempfile::Builder::new().prefix(".claim").tempfile_in(dir) {
            Ok(file) => file.into_temp_path(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        match fs::rename(&path, &claimed) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        }

        let content = read_status(&claimed)?;
        claimed.close()?;
        debug!("Removed status record {}", path.display());
        Ok(Some(content))
    }

    /// Atomically create a "REQUESTED" record if none exists
    pub fn reserve(&self, task: TaskType, session: SessionId) -> io::Result<Reservation> {
        let path = self.path_for(task, session);
        ensure_parent(&path)?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(Reservation::Exists),
            Err(e) => return Err(e),
        };
        writeln!(file, "{}", STATUS_REQUESTED)?;
        Ok(Reservation::Created)
    }

    /// Replace the record content
    pub fn write(&self, task: TaskType, session: SessionId, status: &str) -> io::Result<()> {
        let path = self.path_for(task, session);
        ensure_parent(&path)?;

        // rename으로 교체해서 읽는 쪽이 잘린 내용을 보지 않도록
        let dir = path.parent().unwrap_or(&self.root);
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        writeln!(tmp, "{}", status)?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Remove every status record under the root, returning how many went.
    ///
    /// Run at startup: records left by a previous process belong to sessions
    /// that no longer exist.
    pub fn clear_all(&self) -> usize {
        let pattern = format!(
            "{}/*/*.*.{}",
            glob::Pattern::escape(&self.root.to_string_lossy()),
            STATUS_EXTENSION
        );

        let paths = match glob::glob(&pattern) {
            Ok(paths) => paths,
            Err(e) => {
                warn!("Invalid status glob {}: {}", pattern, e);
                return 0;
            }
        };

        let mut removed = 0;
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => match fs::remove_file(&path) {
                    Ok(()) => removed += 1,
                    Err(e) => warn!("Failed to remove stale {}: {}", path.display(), e),
                },
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable status entry: {}", e),
            }
        }
        removed
    }
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) => fs::create_dir_all(dir),
        None => Ok(()),
    }
}

fn read_status(path: &Path) -> io::Result<String> {
    let mut buf = Vec::new();
    File::open(path)?
        .take(MAX_STATUS_BYTES)
        .read_to_end(&mut buf)?;
    let text = String::from_utf8_lossy(&buf);
    Ok(text.trim_end_matches(['\n', '\r']).to_string())
}
