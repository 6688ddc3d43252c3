//! State Management - the release baseline and its backing file
//!
//! The baseline maps `owner/name` to the last release tag seen for that
//! repository. It is read once at the start of a run and written once at the
//! end. The file is a tab-indented JSON object with sorted keys, so a run
//! that observes no upstream change rewrites identical bytes.
//!
//! Saving goes through a sibling temporary file that is renamed over the
//! target, so an interrupted write never leaves a truncated baseline behind.

use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, SyncError};

/// Tag recorded for repositories that have never published a release
pub const NO_RELEASES: &str = "no-releases";

/// Last seen release tag per repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Baseline(BTreeMap<String, String>);

impl Baseline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag recorded for `full_name`, `None` if the repository was never observed
    pub fn get(&self, full_name: &str) -> Option<&str> {
        self.0.get(full_name).map(String::as_str)
    }

    /// Tag to compare against, empty when the repository was never observed
    pub fn previous_tag(&self, full_name: &str) -> &str {
        self.get(full_name).unwrap_or("")
    }

    /// Insert or overwrite the tag for `full_name`
    pub fn record(&mut self, full_name: impl Into<String>, tag: impl Into<String>) {
        self.0.insert(full_name.into(), tag.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    /// Render the on-disk representation
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)
            .map_err(|e| SyncError::decode("release baseline", e))?;
        Ok(out)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Baseline {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// File-backed store for the [`Baseline`]
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the baseline, empty when no file exists yet
    pub fn load(&self) -> Result<Baseline> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "No baseline at {}, starting from scratch",
                    self.path.display()
                );
                return Ok(Baseline::new());
            }
            Err(e) => return Err(SyncError::store_io(&self.path, e)),
        };

        let baseline: Baseline = serde_json::from_slice(&content).map_err(|e| {
            SyncError::decode(format!("baseline file {}", self.path.display()), e)
        })?;

        debug!(
            "Loaded {} baseline entries from {}",
            baseline.len(),
            self.path.display()
        );
        Ok(baseline)
    }

    /// Replace the stored baseline with `baseline`
    pub fn save(&self, baseline: &Baseline) -> Result<()> {
        let content = baseline.to_bytes()?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SyncError::store_io(parent, e))?;
        }

        let tmp_path = self.tmp_path();
        std::fs::write(&tmp_path, &content).map_err(|e| SyncError::store_io(&tmp_path, e))?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| SyncError::store_io(&self.path, e))?;

        info!(
            "Saved {} baseline entries to {}",
            baseline.len(),
            self.path.display()
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
