//! Package manifest serialization
//!
//! A manifest is a JSON file recording installed package names for later
//! restoration, keyed by package kind:
//!
//! ```json
//! {
//!   "created": "2026-08-05T10:30:00+02:00",
//!   "host": "mybook",
//!   "formula": ["git", "wget"],
//!   "cask": ["firefox"]
//! }
//! ```
//!
//! A bare JSON array of names is also accepted on load and treated as a
//! list of formulae. Duplicates are tolerated and preserved; order is
//! significant and carried through to restore.

use crate::brew::listing::Snapshot;
use crate::types::{ManifestEntry, PackageKind};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The package manifest written at backup time and read at restore time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Local>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default)]
    pub formula: Vec<String>,
    #[serde(default)]
    pub cask: Vec<String>,
}

impl Manifest {
    /// Build a manifest from an installed-package snapshot
    pub fn from_snapshot(snapshot: &Snapshot, host: Option<String>) -> Self {
        Self {
            created: Some(Local::now()),
            host,
            formula: snapshot.formulae.iter().map(|p| p.name.clone()).collect(),
            cask: snapshot.casks.iter().map(|p| p.name.clone()).collect(),
        }
    }

    /// Load a manifest from disk
    ///
    /// Fails on unreadable files, malformed JSON, and empty package
    /// identifiers, always before any install could be attempted.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest from {}", path.display()))?;

        let manifest = match serde_json::from_str::<Manifest>(&content) {
            Ok(manifest) => manifest,
            Err(_) => {
                // Bare-array form: ["git", "wget"]
                let names: Vec<String> = serde_json::from_str(&content).with_context(|| {
                    format!("Malformed manifest JSON in {}", path.display())
                })?;
                Manifest {
                    formula: names,
                    ..Default::default()
                }
            }
        };

        manifest.validate()?;
        Ok(manifest)
    }

    /// Save the manifest to disk, overwriting any existing file
    ///
    /// The destination must be a non-empty path. Serialization happens
    /// fully in memory, so a failure can never leave a partial file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            anyhow::bail!("Destination path is empty");
        }

        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize manifest")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write manifest to {}", path.display()))?;

        Ok(())
    }

    /// All entries in restore order: formulae first, then casks,
    /// each in listed order
    pub fn entries(&self) -> Vec<ManifestEntry> {
        self.formula
            .iter()
            .map(|name| ManifestEntry {
                name: name.clone(),
                kind: PackageKind::Formula,
            })
            .chain(self.cask.iter().map(|name| ManifestEntry {
                name: name.clone(),
                kind: PackageKind::Cask,
            }))
            .collect()
    }

    pub fn package_count(&self) -> usize {
        self.formula.len() + self.cask.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formula.is_empty() && self.cask.is_empty()
    }

    /// Every identifier must be a non-empty string
    fn validate(&self) -> Result<()> {
        for name in self.formula.iter().chain(self.cask.iter()) {
            if name.trim().is_empty() {
                anyhow::bail!("Manifest contains an empty package identifier");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_load_keyed_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, r#"{"formula": ["git", "wget"], "cask": ["firefox"]}"#).unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.formula, vec!["git", "wget"]);
        assert_eq!(manifest.cask, vec!["firefox"]);
        assert_eq!(manifest.package_count(), 3);
        assert!(manifest.created.is_none());
    }

    #[test]
    fn test_load_bare_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, r#"["git", "wget"]"#).unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.formula, vec!["git", "wget"]);
        assert!(manifest.cask.is_empty());
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, "{not json").unwrap();

        let err = Manifest::load(&path).unwrap_err();
        assert!(err.to_string().contains("Malformed manifest JSON"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Manifest::load(&PathBuf::from("/nonexistent/manifest.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read manifest"));
    }

    #[test]
    fn test_load_rejects_empty_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, r#"{"formula": ["git", ""]}"#).unwrap();

        let err = Manifest::load(&path).unwrap_err();
        assert!(err.to_string().contains("empty package identifier"));
    }

    #[test]
    fn test_save_rejects_empty_path() {
        let manifest = Manifest {
            formula: vec!["git".into()],
            ..Default::default()
        };

        let err = manifest.save(Path::new("")).unwrap_err();
        assert!(err.to_string().contains("Destination path is empty"));
    }

    #[test]
    fn test_save_load_roundtrip_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, "old contents").unwrap();

        let manifest = Manifest {
            created: Some(Local::now()),
            host: Some("mybook".into()),
            formula: vec!["git".into(), "wget".into()],
            cask: vec!["firefox".into()],
        };
        manifest.save(&path).unwrap();

        let loaded = Manifest::load(&path).unwrap();
        assert_eq!(loaded.formula, manifest.formula);
        assert_eq!(loaded.cask, manifest.cask);
        assert_eq!(loaded.host.as_deref(), Some("mybook"));
    }

    #[test]
    fn test_entries_order() {
        let manifest = Manifest {
            formula: vec!["zsh".into(), "git".into(), "zsh".into()],
            cask: vec!["firefox".into()],
            ..Default::default()
        };

        let entries = manifest.entries();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        // Listed order preserved, duplicates kept, formulae before casks
        assert_eq!(names, vec!["zsh", "git", "zsh", "firefox"]);
        assert_eq!(entries[3].kind, PackageKind::Cask);
    }

    #[test]
    fn test_is_empty() {
        assert!(Manifest::default().is_empty());
    }
}
