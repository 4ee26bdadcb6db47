//! Command execution for install, uninstall, and search operations
//!
//! Handles executing brew commands with proper error handling.
//! Supports dry-run mode for safe testing. Every invocation is
//! synchronous; a batch never stops at a failing entry.

use crate::types::{ManifestEntry, Package, PackageKind, RestoreReport};
use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};

/// Result of a command execution
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub success: bool,
    pub message: String,
    pub command: String,
}

/// Install a single package
pub fn install_package(
    brew_path: &Path,
    name: &str,
    kind: PackageKind,
    dry_run: bool,
) -> Result<CommandResult> {
    let args = install_args(name, kind);
    let command = display_command(&args);

    if dry_run {
        return Ok(CommandResult {
            success: true,
            message: format!("Dry run: Would install {}", name),
            command,
        });
    }

    execute_brew(brew_path, &args, &format!("install {}", name))
}

/// Uninstall a single package
pub fn uninstall_package(
    brew_path: &Path,
    name: &str,
    kind: PackageKind,
    dry_run: bool,
) -> Result<CommandResult> {
    let args = uninstall_args(name, kind);
    let command = display_command(&args);

    if dry_run {
        return Ok(CommandResult {
            success: true,
            message: format!("Dry run: Would uninstall {}", name),
            command,
        });
    }

    execute_brew(brew_path, &args, &format!("uninstall {}", name))
}

/// Install every entry, in order, collecting per-entry outcomes.
///
/// One invocation per entry; a failing entry (or an unavailable brew
/// executable) is recorded and the run continues with the next entry.
pub fn run_restore(brew_path: &Path, entries: &[ManifestEntry], dry_run: bool) -> RestoreReport {
    let mut report = RestoreReport::default();

    for entry in entries {
        match install_package(brew_path, &entry.name, entry.kind, dry_run) {
            Ok(result) if result.success => report.succeeded.push(entry.name.clone()),
            Ok(result) => report.failed.push((entry.name.clone(), result.message)),
            Err(e) => report.failed.push((entry.name.clone(), e.to_string())),
        }
    }

    report
}

/// Uninstall every entry, collecting per-entry outcomes
pub fn run_removal(brew_path: &Path, entries: &[ManifestEntry], dry_run: bool) -> RestoreReport {
    let mut report = RestoreReport::default();

    for entry in entries {
        match uninstall_package(brew_path, &entry.name, entry.kind, dry_run) {
            Ok(result) if result.success => report.succeeded.push(entry.name.clone()),
            Ok(result) => report.failed.push((entry.name.clone(), result.message)),
            Err(e) => report.failed.push((entry.name.clone(), e.to_string())),
        }
    }

    report
}

/// Search for packages by name or keyword
///
/// A non-zero exit (brew reports "no formulae or casks found" that way)
/// yields an empty result list rather than an error.
pub fn search_packages(brew_path: &Path, query: &str) -> Result<Vec<Package>> {
    let output = Command::new(brew_path)
        .args(["search", query])
        .stdin(Stdio::null())
        .output()
        .context("Failed to run brew search")?;

    if !output.status.success() {
        return Ok(Vec::new());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_search_output(&stdout))
}

/// Parse `brew search` output
///
/// Example output:
///   ==> Formulae
///   wget
///   wget2
///   ==> Casks
///   wgestures
///
/// Without section headers everything is treated as a formula.
fn parse_search_output(output: &str) -> Vec<Package> {
    let mut packages = Vec::new();
    let mut kind = PackageKind::Formula;

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("==>") {
            kind = if line.to_lowercase().contains("cask") {
                PackageKind::Cask
            } else {
                PackageKind::Formula
            };
            continue;
        }

        // A line may hold several names in column layout
        for name in line.split_whitespace() {
            packages.push(Package {
                name: name.to_string(),
                version: None,
                kind,
            });
        }
    }

    packages
}

/// Preview of the install invocations for a confirmation popup
pub fn install_preview(entries: &[ManifestEntry]) -> String {
    batch_preview(entries, "install", &[])
}

/// Preview of the uninstall invocations for a confirmation popup
pub fn uninstall_preview(entries: &[ManifestEntry]) -> String {
    batch_preview(entries, "uninstall", &["--force"])
}

fn batch_preview(entries: &[ManifestEntry], verb: &str, extra: &[&str]) -> String {
    let formulae: Vec<&str> = entries
        .iter()
        .filter(|e| e.kind == PackageKind::Formula)
        .map(|e| e.name.as_str())
        .collect();
    let casks: Vec<&str> = entries
        .iter()
        .filter(|e| e.kind == PackageKind::Cask)
        .map(|e| e.name.as_str())
        .collect();

    let extra_str = if extra.is_empty() {
        String::new()
    } else {
        format!(" {}", extra.join(" "))
    };

    let mut parts = Vec::new();
    if !formulae.is_empty() {
        parts.push(format!("brew {}{} {}", verb, extra_str, formulae.join(" ")));
    }
    if !casks.is_empty() {
        parts.push(format!(
            "brew {}{} --cask {}",
            verb,
            extra_str,
            casks.join(" ")
        ));
    }

    parts.join("  ·  ")
}

fn install_args(name: &str, kind: PackageKind) -> Vec<String> {
    let mut args = vec!["install".to_string()];
    if kind == PackageKind::Cask {
        args.push("--cask".to_string());
    }
    args.push(name.to_string());
    args
}

fn uninstall_args(name: &str, kind: PackageKind) -> Vec<String> {
    let mut args = vec!["uninstall".to_string(), "--force".to_string()];
    if kind == PackageKind::Cask {
        args.push("--cask".to_string());
    }
    args.push(name.to_string());
    args
}

fn display_command(args: &[String]) -> String {
    format!("brew {}", args.join(" "))
}

/// Execute brew with the given arguments, capturing output
fn execute_brew(brew_path: &Path, args: &[String], description: &str) -> Result<CommandResult> {
    let command = display_command(args);

    let output = Command::new(brew_path)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("Failed to execute: {}", command))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if output.status.success() {
        Ok(CommandResult {
            success: true,
            message: format!("Successfully {}", description),
            command,
        })
    } else {
        let error_msg = if !stderr.is_empty() {
            stderr.trim().to_string()
        } else if !stdout.is_empty() {
            stdout.trim().to_string()
        } else {
            format!("Command failed with exit code: {:?}", output.status.code())
        };

        Ok(CommandResult {
            success: false,
            message: format!("Failed to {}: {}", description, error_msg),
            command,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entry(name: &str, kind: PackageKind) -> ManifestEntry {
        ManifestEntry {
            name: name.into(),
            kind,
        }
    }

    #[test]
    fn test_install_args() {
        assert_eq!(install_args("git", PackageKind::Formula), vec!["install", "git"]);
        assert_eq!(
            install_args("firefox", PackageKind::Cask),
            vec!["install", "--cask", "firefox"]
        );
    }

    #[test]
    fn test_uninstall_args() {
        assert_eq!(
            uninstall_args("git", PackageKind::Formula),
            vec!["uninstall", "--force", "git"]
        );
        assert_eq!(
            uninstall_args("firefox", PackageKind::Cask),
            vec!["uninstall", "--force", "--cask", "firefox"]
        );
    }

    #[test]
    fn test_dry_run_install() {
        let path = PathBuf::from("/opt/homebrew/bin/brew");
        let result = install_package(&path, "git", PackageKind::Formula, true).unwrap();
        assert!(result.success);
        assert!(result.message.contains("Dry run"));
        assert_eq!(result.command, "brew install git");
    }

    #[test]
    fn test_dry_run_restore_preserves_order() {
        let path = PathBuf::from("/opt/homebrew/bin/brew");
        let entries = vec![
            entry("git", PackageKind::Formula),
            entry("wget", PackageKind::Formula),
        ];

        // Restoring the same entries twice issues the same calls both times
        for _ in 0..2 {
            let report = run_restore(&path, &entries, true);
            assert_eq!(report.succeeded, vec!["git".to_string(), "wget".to_string()]);
            assert!(report.all_ok());
        }
    }

    #[test]
    fn test_run_restore_continues_past_failure() {
        // A brew path that cannot be spawned makes every entry fail,
        // but the run still attempts all of them.
        let path = PathBuf::from("/nonexistent/brew");
        let entries = vec![
            entry("git", PackageKind::Formula),
            entry("wget", PackageKind::Formula),
            entry("htop", PackageKind::Formula),
        ];

        let report = run_restore(&path, &entries, false);
        assert_eq!(report.succeeded.len(), 0);
        assert_eq!(report.failed.len(), 3);
        assert_eq!(report.failed[0].0, "git");
        assert_eq!(report.failed[2].0, "htop");
    }

    #[test]
    fn test_parse_search_output_sections() {
        let input = "==> Formulae\nwget\nwget2\n\n==> Casks\nwgestures\n";
        let packages = parse_search_output(input);

        assert_eq!(packages.len(), 3);
        assert_eq!(packages[0].name, "wget");
        assert_eq!(packages[0].kind, PackageKind::Formula);
        assert_eq!(packages[2].name, "wgestures");
        assert_eq!(packages[2].kind, PackageKind::Cask);
    }

    #[test]
    fn test_parse_search_output_no_headers() {
        let input = "git\ngit-lfs\n";
        let packages = parse_search_output(input);

        assert_eq!(packages.len(), 2);
        assert!(packages.iter().all(|p| p.kind == PackageKind::Formula));
    }

    #[test]
    fn test_install_preview_groups_kinds() {
        let entries = vec![
            entry("git", PackageKind::Formula),
            entry("firefox", PackageKind::Cask),
            entry("wget", PackageKind::Formula),
        ];

        let preview = install_preview(&entries);
        assert!(preview.contains("brew install git wget"));
        assert!(preview.contains("brew install --cask firefox"));
    }

    #[test]
    fn test_uninstall_preview() {
        let entries = vec![entry("git", PackageKind::Formula)];
        assert_eq!(uninstall_preview(&entries), "brew uninstall --force git");
    }
}
