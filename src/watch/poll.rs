//! Metadata-polling [`FileWatch`] implementation.

use super::{FileEvent, FileEventKind, FileWatch, WatchError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: Option<SystemTime>,
    len: u64,
}

impl Fingerprint {
    fn of(meta: &std::fs::Metadata) -> Self {
        Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        }
    }
}

/// Detects writes by comparing modification time and length between polls.
#[derive(Debug, Default)]
pub struct PollingFileWatch {
    watched: Option<(PathBuf, Fingerprint)>,
}

impl PollingFileWatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_watching(&self) -> bool {
        self.watched.is_some()
    }
}

impl FileWatch for PollingFileWatch {
    fn add(&mut self, path: &Path) -> Result<(), WatchError> {
        let meta = std::fs::metadata(path).map_err(|e| WatchError::Subscribe {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        self.watched = Some((path.to_path_buf(), Fingerprint::of(&meta)));
        Ok(())
    }

    fn poll(&mut self) -> Result<Vec<FileEvent>, WatchError> {
        let Some((path, last)) = self.watched.as_mut() else {
            return Ok(Vec::new());
        };

        match std::fs::metadata(&*path) {
            Ok(meta) => {
                let current = Fingerprint::of(&meta);
                if current == *last {
                    return Ok(Vec::new());
                }
                *last = current;
                Ok(vec![FileEvent {
                    kind: FileEventKind::Write,
                    path: path.clone(),
                }])
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let path = path.clone();
                self.watched = None;
                Ok(vec![FileEvent {
                    kind: FileEventKind::Remove,
                    path,
                }])
            }
            Err(e) => Err(WatchError::Transient(e.to_string())),
        }
    }

    fn close(&mut self) {
        self.watched = None;
    }
}
