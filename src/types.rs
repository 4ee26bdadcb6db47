//! Core data types for brewstash
//!
//! This module defines all shared data structures used throughout the application.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Kind of Homebrew package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    Formula,
    Cask,
}

impl PackageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageKind::Formula => "formula",
            PackageKind::Cask => "cask",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PackageKind::Formula => "Formulae",
            PackageKind::Cask => "Casks",
        }
    }
}

/// An installed (or installable) Homebrew package
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Package {
    pub name: String,
    pub version: Option<String>,
    pub kind: PackageKind,
}

impl Package {
    pub fn key(&self) -> (PackageKind, String) {
        (self.kind, self.name.clone())
    }
}

/// One restorable item from a manifest, in manifest order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub name: String,
    pub kind: PackageKind,
}

/// A restore plan: manifest entries annotated against the installed set
#[derive(Debug, Clone, Default)]
pub struct RestorePlan {
    pub entries: Vec<PlanEntry>,
}

/// A single entry of a restore plan
#[derive(Debug, Clone)]
pub struct PlanEntry {
    pub name: String,
    pub kind: PackageKind,
    pub already_installed: bool,
    pub selected: bool,
}

impl RestorePlan {
    /// Build a plan from manifest entries, preserving manifest order.
    ///
    /// Every entry starts selected, including ones that are already
    /// installed (those are only marked, so the user can deselect them).
    pub fn build(entries: Vec<ManifestEntry>, installed: &HashSet<(PackageKind, String)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|e| {
                let already_installed = installed.contains(&(e.kind, e.name.clone()));
                PlanEntry {
                    name: e.name,
                    kind: e.kind,
                    already_installed,
                    selected: true,
                }
            })
            .collect();

        Self { entries }
    }

    /// Entries currently selected for installation, in plan order
    pub fn selected_entries(&self) -> Vec<ManifestEntry> {
        self.entries
            .iter()
            .filter(|e| e.selected)
            .map(|e| ManifestEntry {
                name: e.name.clone(),
                kind: e.kind,
            })
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.entries.iter().filter(|e| e.selected).count()
    }

    /// Re-evaluate the installed markers after the installed set changed
    pub fn mark_installed(&mut self, installed: &HashSet<(PackageKind, String)>) {
        for entry in &mut self.entries {
            entry.already_installed = installed.contains(&(entry.kind, entry.name.clone()));
        }
    }
}

/// Per-entry outcome of a batch of brew invocations
#[derive(Debug, Clone, Default)]
pub struct RestoreReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, String)>, // (name, error text)
}

impl RestoreReport {
    /// Get summary string (e.g., "4 installed · 1 failed")
    pub fn summary(&self) -> String {
        format!("{} installed · {} failed", self.succeeded.len(), self.failed.len())
    }

    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Application tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Installed,
    Search,
    Restore,
    Settings,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Installed, Tab::Search, Tab::Restore, Tab::Settings]
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Installed => 0,
            Tab::Search => 1,
            Tab::Restore => 2,
            Tab::Settings => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Installed => "Installed",
            Tab::Search => "Search",
            Tab::Restore => "Restore",
            Tab::Settings => "Settings",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, kind: PackageKind) -> ManifestEntry {
        ManifestEntry {
            name: name.into(),
            kind,
        }
    }

    #[test]
    fn test_plan_preserves_order_and_duplicates() {
        let entries = vec![
            entry("git", PackageKind::Formula),
            entry("wget", PackageKind::Formula),
            entry("git", PackageKind::Formula),
            entry("firefox", PackageKind::Cask),
        ];

        let plan = RestorePlan::build(entries, &HashSet::new());
        let names: Vec<&str> = plan.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["git", "wget", "git", "firefox"]);
        assert_eq!(plan.selected_count(), 4);
    }

    #[test]
    fn test_plan_marks_installed_but_keeps_selected() {
        let mut installed = HashSet::new();
        installed.insert((PackageKind::Formula, "git".to_string()));

        let entries = vec![
            entry("git", PackageKind::Formula),
            entry("wget", PackageKind::Formula),
        ];

        let plan = RestorePlan::build(entries, &installed);
        assert!(plan.entries[0].already_installed);
        assert!(plan.entries[0].selected);
        assert!(!plan.entries[1].already_installed);

        // Same manifest builds the same selection both times
        assert_eq!(plan.selected_entries().len(), 2);
    }

    #[test]
    fn test_plan_distinguishes_kinds() {
        let mut installed = HashSet::new();
        installed.insert((PackageKind::Formula, "firefox".to_string()));

        let plan = RestorePlan::build(vec![entry("firefox", PackageKind::Cask)], &installed);
        // Cask "firefox" is not the installed formula "firefox"
        assert!(!plan.entries[0].already_installed);
    }

    #[test]
    fn test_report_summary() {
        let report = RestoreReport {
            succeeded: vec!["git".into(), "wget".into()],
            failed: vec![("htop".into(), "exit 1".into())],
        };
        assert_eq!(report.summary(), "2 installed · 1 failed");
        assert!(!report.all_ok());
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn test_tab_indices_match_order() {
        for (i, tab) in Tab::all().iter().enumerate() {
            assert_eq!(tab.index(), i);
        }
    }
}
