//! Periodic background snapshot of the workspace, offered for restore on the
//! next start.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info};

use super::file::{parse_document, to_json, LoadedDocument, Stamp};
use crate::error::StoreError;
use crate::model::Workspace;

#[derive(Debug, Clone)]
pub struct Autosave {
    path: PathBuf,
}

impl Autosave {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, workspace: &Workspace) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let json = to_json(workspace, Stamp::Autosave, Utc::now())?;
        std::fs::write(&self.path, json).map_err(|e| StoreError::io(&self.path, e))?;
        debug!(path = %self.path.display(), "autosaved");
        Ok(())
    }

    /// The stored snapshot, if there is one worth restoring (at least one
    /// project with content).
    pub fn read(&self) -> Result<Option<LoadedDocument>, StoreError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        let doc = parse_document(&json)?;
        if doc.projects.iter().all(|p| p.is_empty()) {
            return Ok(None);
        }
        Ok(Some(doc))
    }

    /// Remove the snapshot. A missing file is not an error.
    pub fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "autosave cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }
}

/// Decides when the next autosave is due.
#[derive(Debug, Clone)]
pub struct AutosaveTimer {
    interval: Duration,
    last: Instant,
}

impl AutosaveTimer {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last: now,
        }
    }

    /// True when there are unsaved changes and the interval has elapsed.
    /// Firing restarts the interval.
    pub fn due(&mut self, now: Instant, dirty: bool) -> bool {
        if !dirty || now.duration_since(self.last) < self.interval {
            return false;
        }
        self.last = now;
        true
    }

    /// Time left until the next check could fire.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.interval.saturating_sub(now.duration_since(self.last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTask;
    use chrono::NaiveDate;

    fn workspace_with_task() -> Workspace {
        let mut ws = Workspace::new();
        let day = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        ws.active_mut()
            .add_task(NewTask {
                name: "Ship".into(),
                group: "Release".into(),
                start: day,
                end: day,
                status: Default::default(),
            })
            .unwrap();
        ws
    }

    #[test]
    fn missing_snapshot_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let autosave = Autosave::new(dir.path().join("data").join("autosave.json"));
        assert!(autosave.read().unwrap().is_none());
        autosave.clear().unwrap();
    }

    #[test]
    fn snapshot_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let autosave = Autosave::new(dir.path().join("data").join("autosave.json"));
        let ws = workspace_with_task();
        autosave.write(&ws).unwrap();

        let raw = std::fs::read_to_string(autosave.path()).unwrap();
        assert!(raw.contains("autoSaveTimestamp"));

        let doc = autosave.read().unwrap().unwrap();
        assert!(doc.saved_at.is_some());
        assert_eq!(doc.projects, ws.projects().to_vec());

        autosave.clear().unwrap();
        assert!(!autosave.path().exists());
    }

    #[test]
    fn empty_workspace_is_not_offered() {
        let dir = tempfile::tempdir().unwrap();
        let autosave = Autosave::new(dir.path().join("autosave.json"));
        autosave.write(&Workspace::new()).unwrap();
        assert!(autosave.read().unwrap().is_none());
    }

    #[test]
    fn timer_fires_only_when_dirty_and_elapsed() {
        let start = Instant::now();
        let mut timer = AutosaveTimer::new(Duration::from_secs(30), start);
        assert!(!timer.due(start + Duration::from_secs(10), true));
        assert!(!timer.due(start + Duration::from_secs(40), false));
        assert!(timer.due(start + Duration::from_secs(40), true));
        assert!(!timer.due(start + Duration::from_secs(41), true));
        assert_eq!(
            timer.remaining(start + Duration::from_secs(50)),
            Duration::from_secs(20)
        );
    }
}
