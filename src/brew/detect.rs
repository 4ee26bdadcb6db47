//! Homebrew and host detection
//!
//! Locates the brew executable (Apple Silicon, Intel, and Linuxbrew
//! prefixes, then PATH) and captures the Homebrew version and hostname.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Command;

/// Information about the detected Homebrew installation
#[derive(Debug, Clone)]
pub struct BrewInfo {
    pub hostname: String,
    pub brew_path: PathBuf,
    pub brew_version: Option<String>,
}

/// Standard Homebrew prefixes, checked before falling back to PATH
const BREW_CANDIDATES: &[&str] = &[
    "/opt/homebrew/bin/brew",
    "/usr/local/bin/brew",
    "/home/linuxbrew/.linuxbrew/bin/brew",
];

/// Detect the Homebrew installation
///
/// Fails when no brew executable can be found, since nothing else in the
/// application can work without one.
pub fn detect_brew() -> Result<BrewInfo> {
    let brew_path = find_brew().context(
        "Homebrew not found. Install it from https://brew.sh or put `brew` on your PATH",
    )?;

    let hostname = get_hostname()?;
    let brew_version = get_brew_version(&brew_path);

    Ok(BrewInfo {
        hostname,
        brew_path,
        brew_version,
    })
}

/// Find the brew executable
fn find_brew() -> Option<PathBuf> {
    for candidate in BREW_CANDIDATES {
        let path = PathBuf::from(candidate);
        if path.exists() {
            return Some(path);
        }
    }

    // Fallback: ask the shell
    let output = Command::new("which").arg("brew").output().ok()?;
    if !output.status.success() {
        return None;
    }

    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

/// Get the system hostname
fn get_hostname() -> Result<String> {
    // Try /etc/hostname first
    if let Ok(hostname) = std::fs::read_to_string("/etc/hostname") {
        let hostname = hostname.trim().to_string();
        if !hostname.is_empty() {
            return Ok(hostname);
        }
    }

    // Fallback to hostname command
    let output = Command::new("hostname")
        .output()
        .context("Failed to get hostname")?;

    let hostname = String::from_utf8_lossy(&output.stdout).trim().to_string();

    if hostname.is_empty() {
        Ok("unknown".to_string())
    } else {
        Ok(hostname)
    }
}

/// Get the Homebrew version string (e.g. "4.3.12")
fn get_brew_version(brew_path: &PathBuf) -> Option<String> {
    let output = Command::new(brew_path).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }

    parse_version_output(&String::from_utf8_lossy(&output.stdout))
}

/// Parse `brew --version` output
///
/// Example output:
///   Homebrew 4.3.12
fn parse_version_output(output: &str) -> Option<String> {
    let first_line = output.lines().next()?.trim();
    let version = first_line.strip_prefix("Homebrew ").unwrap_or(first_line);

    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_output() {
        assert_eq!(
            parse_version_output("Homebrew 4.3.12\n"),
            Some("4.3.12".to_string())
        );
        assert_eq!(
            parse_version_output("Homebrew 4.1.0-34-gabcdef\nHomebrew/homebrew-core (git revision abc)"),
            Some("4.1.0-34-gabcdef".to_string())
        );
        assert_eq!(parse_version_output(""), None);
    }
}
