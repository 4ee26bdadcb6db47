//! Configuration management for brewstash
//!
//! Handles loading, saving, and default configuration values.
//! Config file location: ~/.config/brewstash/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: ThemeName,
    pub layout: LayoutMode,
    pub display: DisplayOptions,
    pub manifest: ManifestOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: ThemeName::Gruvbox,
            layout: LayoutMode::Auto,
            display: DisplayOptions::default(),
            manifest: ManifestOptions::default(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("brewstash");
        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default if not exists
    pub fn load() -> Result<Self> {
        let path = Self::path()?;

        if !path.exists() {
            let config = Config::default();
            config.save()?;
            return Ok(config);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {:?}", path))
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// Default destination offered in the backup path prompt
    pub fn default_manifest_path(&self) -> PathBuf {
        let dir = self
            .manifest
            .default_dir
            .clone()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        dir.join("brew-manifest.json")
    }
}

/// Available theme names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Gruvbox,
    Nord,
    Transparent,
}

impl ThemeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeName::Gruvbox => "Gruvbox",
            ThemeName::Nord => "Nord",
            ThemeName::Transparent => "Transparent",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ThemeName::Gruvbox => ThemeName::Nord,
            ThemeName::Nord => ThemeName::Transparent,
            ThemeName::Transparent => ThemeName::Gruvbox,
        }
    }
}

/// Layout mode for the Installed tab panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Auto,
    SideBySide,
    TabsOnly,
}

impl LayoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Auto => "Auto (responsive)",
            LayoutMode::SideBySide => "Side-by-side",
            LayoutMode::TabsOnly => "Single panel",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            LayoutMode::Auto => LayoutMode::SideBySide,
            LayoutMode::SideBySide => LayoutMode::TabsOnly,
            LayoutMode::TabsOnly => LayoutMode::Auto,
        }
    }
}

/// Display options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    pub show_versions: bool,
    pub show_cask_panel: bool,
    pub confirm_before_apply: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_versions: true,
            show_cask_panel: true,
            confirm_before_apply: true,
        }
    }
}

/// Manifest-related options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestOptions {
    /// Directory offered in path prompts; the user's home when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.theme, ThemeName::Gruvbox);
        assert_eq!(config.layout, LayoutMode::Auto);
        assert!(config.display.show_versions);
        assert!(config.display.confirm_before_apply);
        assert!(config.manifest.default_dir.is_none());
    }

    #[test]
    fn test_theme_cycle() {
        let theme = ThemeName::Gruvbox;
        assert_eq!(theme.next(), ThemeName::Nord);
        assert_eq!(theme.next().next(), ThemeName::Transparent);
        assert_eq!(theme.next().next().next(), ThemeName::Gruvbox);
    }

    #[test]
    fn test_default_manifest_path_honors_configured_dir() {
        let mut config = Config::default();
        config.manifest.default_dir = Some(PathBuf::from("/tmp/backups"));
        assert_eq!(
            config.default_manifest_path(),
            PathBuf::from("/tmp/backups/brew-manifest.json")
        );
    }

    #[test]
    fn test_config_roundtrip_toml() {
        let mut config = Config::default();
        config.theme = ThemeName::Nord;
        config.display.show_versions = false;

        let content = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&content).unwrap();
        assert_eq!(parsed.theme, ThemeName::Nord);
        assert!(!parsed.display.show_versions);
    }
}
