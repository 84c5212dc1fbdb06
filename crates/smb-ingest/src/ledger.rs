//! Persistent stage ledger.
//!
//! Pipeline steps communicate only through files rewritten in place, so the
//! record of which transforms a file has been through is kept next to it in
//! a JSON sidecar. Each entry carries a SHA-256 fingerprint of the file as it
//! was after the last recorded write; if the file has changed since (a fresh
//! extract dropped in, a manual edit), its stages are no longer trusted and
//! callers fall back to sniffing the data.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use smb_model::{Stage, StageSet};

use crate::error::{IngestError, Result};

/// File name of the ledger inside a working directory.
pub const LEDGER_FILE_NAME: &str = ".smb-stages.json";

/// Hex-encoded SHA-256 of some bytes.
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Fingerprint of a file's current contents.
pub fn fingerprint_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::read(path, e))?;
    Ok(fingerprint(&bytes))
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub fingerprint: String,
    pub stages: StageSet,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageLedger {
    #[serde(skip)]
    path: PathBuf,
    #[serde(default)]
    files: BTreeMap<String, LedgerEntry>,
}

fn key_for(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string()
}

impl StageLedger {
    /// Loads the ledger of a directory, or starts an empty one.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(LEDGER_FILE_NAME);
        if !path.exists() {
            return Ok(Self {
                path,
                files: BTreeMap::new(),
            });
        }
        let contents = std::fs::read(&path).map_err(|e| IngestError::read(&path, e))?;
        let mut ledger: StageLedger =
            serde_json::from_slice(&contents).map_err(|source| IngestError::Ledger {
                path: path.clone(),
                source,
            })?;
        ledger.path = path;
        Ok(ledger)
    }

    /// Location of the ledger file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stages applied to a file whose current contents hash to `current`.
    ///
    /// Returns an empty set when the file is unknown or has changed since its
    /// last recorded write.
    pub fn stages(&self, file: &Path, current: &str) -> StageSet {
        match self.files.get(&key_for(file)) {
            Some(entry) if entry.fingerprint == current => entry.stages.clone(),
            Some(_) => {
                tracing::debug!(
                    file = %file.display(),
                    "file changed since last recorded stage, ignoring ledger entry"
                );
                StageSet::new()
            }
            None => StageSet::new(),
        }
    }

    /// Whether a stage is recorded for a file in its current state.
    pub fn has_stage(&self, file: &Path, current: &str, stage: Stage) -> bool {
        self.stages(file, current).contains(&stage)
    }

    /// Records `stage` for a file whose contents were `before` and are now
    /// `after`. Stages recorded against `before` are carried forward.
    pub fn record(&mut self, file: &Path, before: &str, after: &str, stage: Stage) {
        let mut stages = self.stages(file, before);
        stages.insert(stage);
        self.files.insert(
            key_for(file),
            LedgerEntry {
                fingerprint: after.to_string(),
                stages,
            },
        );
    }

    /// Drops a file's entry, e.g. when the file is regenerated from scratch.
    pub fn forget(&mut self, file: &Path) {
        self.files.remove(&key_for(file));
    }

    /// Writes the ledger back to its directory.
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_vec_pretty(self).map_err(|source| IngestError::Ledger {
            path: self.path.clone(),
            source,
        })?;
        crate::csv::write_bytes(&self.path, &json)
    }
}
