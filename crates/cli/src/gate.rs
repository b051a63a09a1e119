//! File-backed usage gate: a JSON ledger of completed runs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use bankrec_recon::{ReconError, UsageGate};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Ledger {
    #[serde(default)]
    used: u32,
}

/// Default ledger location: `<data dir>/bankrec/usage.json`.
pub fn default_usage_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("bankrec").join("usage.json"))
}

pub struct FileGate {
    path: PathBuf,
    limit: u32,
}

impl FileGate {
    pub fn new(path: PathBuf, limit: u32) -> Self {
        Self { path, limit }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Zero the counter.
    pub fn reset(&self) -> Result<(), ReconError> {
        self.store(&Ledger::default())
    }

    /// A missing ledger reads as zero runs.
    fn load(&self) -> Result<Ledger, ReconError> {
        if !self.path.exists() {
            return Ok(Ledger::default());
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            ReconError::Gate(format!("cannot read {}: {e}", self.path.display()))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            ReconError::Gate(format!("corrupt usage file {}: {e}", self.path.display()))
        })
    }

    fn store(&self, ledger: &Ledger) -> Result<(), ReconError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ReconError::Gate(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        let contents = serde_json::to_string(ledger)
            .map_err(|e| ReconError::Gate(format!("cannot serialize usage: {e}")))?;

        // Write-then-rename: readers never see a partial ledger
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|e| ReconError::Gate(format!("cannot write {}: {e}", self.path.display())))
    }
}

impl UsageGate for FileGate {
    fn usage(&self) -> Result<(u32, u32), ReconError> {
        Ok((self.load()?.used, self.limit))
    }

    fn increment(&mut self) -> Result<(), ReconError> {
        let mut ledger = self.load()?;
        ledger.used = ledger.used.saturating_add(1);
        self.store(&ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_as_zero() {
        let dir = tempdir().unwrap();
        let gate = FileGate::new(dir.path().join("usage.json"), 5);
        assert_eq!(gate.usage().unwrap(), (0, 5));
        assert!(gate.allow().unwrap());
    }

    #[test]
    fn increment_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("usage.json");
        let mut gate = FileGate::new(path.clone(), 5);
        gate.increment().unwrap();
        gate.increment().unwrap();

        let reopened = FileGate::new(path.clone(), 5);
        assert_eq!(reopened.usage().unwrap(), (2, 5));
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"used":2}"#);
    }

    #[test]
    fn limit_reached_denies() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("usage.json");
        fs::write(&path, r#"{"used": 3}"#).unwrap();
        let gate = FileGate::new(path, 3);
        assert!(!gate.allow().unwrap());
    }

    #[test]
    fn reset_zeroes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("usage.json");
        fs::write(&path, r#"{"used": 4}"#).unwrap();
        let gate = FileGate::new(path, 5);
        gate.reset().unwrap();
        assert_eq!(gate.usage().unwrap(), (0, 5));
    }

    #[test]
    fn corrupt_ledger_is_gate_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("usage.json");
        fs::write(&path, "not json").unwrap();
        let gate = FileGate::new(path, 5);
        assert!(matches!(gate.usage(), Err(ReconError::Gate(_))));
    }
}
