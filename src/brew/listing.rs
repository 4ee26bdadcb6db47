//! Installed-package listing
//!
//! Snapshots the set of installed formulae and casks by running
//! `brew list --versions`. A failing list command aborts the whole
//! snapshot so callers never serialize a partial package list.

use crate::types::{Package, PackageKind};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use std::process::Command;

/// The installed formulae and casks at one point in time
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub formulae: Vec<Package>,
    pub casks: Vec<Package>,
}

impl Snapshot {
    pub fn total(&self) -> usize {
        self.formulae.len() + self.casks.len()
    }

    /// (kind, name) pairs for installed-membership checks
    pub fn name_set(&self) -> HashSet<(PackageKind, String)> {
        self.formulae
            .iter()
            .chain(self.casks.iter())
            .map(|p| p.key())
            .collect()
    }
}

/// List everything currently installed
pub fn snapshot(brew_path: &Path) -> Result<Snapshot> {
    let formulae = list_kind(brew_path, PackageKind::Formula)?;
    let casks = list_kind(brew_path, PackageKind::Cask)?;

    Ok(Snapshot { formulae, casks })
}

/// Run `brew list --<kind> --versions` and parse the output
fn list_kind(brew_path: &Path, kind: PackageKind) -> Result<Vec<Package>> {
    let kind_flag = format!("--{}", kind.as_str());

    let output = Command::new(brew_path)
        .args(["list", &kind_flag, "--versions"])
        .output()
        .with_context(|| format!("Failed to run brew list {}", kind_flag))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!(
            "brew list {} failed: {}",
            kind_flag,
            stderr.trim()
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_versions_output(&stdout, kind))
}

/// Parse `brew list --versions` output
///
/// Example output:
///   git 2.44.0
///   python@3.12 3.12.2 3.12.4
///
/// When multiple versions are installed the newest is listed last.
fn parse_versions_output(output: &str, kind: PackageKind) -> Vec<Package> {
    let mut packages: Vec<Package> = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        let name = match parts.next() {
            Some(n) => n.to_string(),
            None => continue,
        };

        let version = parts.last().map(|v| v.to_string());

        packages.push(Package {
            name,
            version,
            kind,
        });
    }

    packages.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    packages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_versions_output() {
        let input = "git 2.44.0\nwget 1.24.5\n";
        let packages = parse_versions_output(input, PackageKind::Formula);

        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].name, "git");
        assert_eq!(packages[0].version.as_deref(), Some("2.44.0"));
        assert_eq!(packages[0].kind, PackageKind::Formula);
    }

    #[test]
    fn test_parse_versions_output_multiple_versions() {
        let input = "python@3.12 3.12.2 3.12.4\n";
        let packages = parse_versions_output(input, PackageKind::Formula);

        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "python@3.12");
        // Newest version wins
        assert_eq!(packages[0].version.as_deref(), Some("3.12.4"));
    }

    #[test]
    fn test_parse_versions_output_bare_name() {
        let input = "some-cask\n\n";
        let packages = parse_versions_output(input, PackageKind::Cask);

        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].version, None);
        assert_eq!(packages[0].kind, PackageKind::Cask);
    }

    #[test]
    fn test_parse_versions_output_sorted() {
        let input = "Wget 1.0\napp 2.0\n";
        let packages = parse_versions_output(input, PackageKind::Formula);
        assert_eq!(packages[0].name, "app");
        assert_eq!(packages[1].name, "Wget");
    }

    #[test]
    fn test_snapshot_name_set() {
        let snap = Snapshot {
            formulae: vec![Package {
                name: "git".into(),
                version: Some("2.44.0".into()),
                kind: PackageKind::Formula,
            }],
            casks: vec![Package {
                name: "firefox".into(),
                version: None,
                kind: PackageKind::Cask,
            }],
        };

        let set = snap.name_set();
        assert!(set.contains(&(PackageKind::Formula, "git".to_string())));
        assert!(set.contains(&(PackageKind::Cask, "firefox".to_string())));
        assert!(!set.contains(&(PackageKind::Cask, "git".to_string())));
        assert_eq!(snap.total(), 2);
    }
}
