//! Application state and event handling
//!
//! This is the core of brewstash, managing:
//! - Application state across all tabs
//! - Event handling (keyboard input)
//! - Backup, restore, install, and uninstall flows

use crate::brew::{self, commands, BrewInfo, Snapshot};
use crate::config::{Config, LayoutMode};
use crate::manifest::Manifest;
use crate::types::{ManifestEntry, Package, PackageKind, RestorePlan, RestoreReport, Tab};
use crate::ui::Theme;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Main application state
pub struct App {
    // Core state
    pub should_quit: bool,
    pub active_tab: Tab,
    pub config: Config,
    pub theme: Theme,
    pub brew: BrewInfo,
    pub dry_run: bool,

    // Installed tab state
    pub formulae: Vec<Package>,
    pub casks: Vec<Package>,
    pub installed_focus: usize, // 0 = formulae, 1 = casks
    pub formula_cursor: usize,
    pub cask_cursor: usize,
    pub installed_selected: HashSet<(PackageKind, String)>,

    // Search tab state
    pub search_query: String,
    pub search_input_active: bool,
    pub search_results: Vec<Package>,
    pub search_cursor: usize,
    pub search_marked: HashSet<(PackageKind, String)>,
    pub search_ran: bool,

    // Restore tab state
    pub manifest_path: Option<PathBuf>,
    pub manifest: Option<Manifest>,
    pub restore_plan: Option<RestorePlan>,
    pub restore_cursor: usize,
    pub last_report: Option<RestoreReport>,

    // Settings tab state
    pub settings_selected: usize,

    // Popup state
    pub popup: PopupState,
    pending: Option<PendingAction>,

    // Flash message (temporary feedback)
    pub flash_message: Option<(String, bool, Instant)>, // (message, is_error, timestamp)
}

/// Popup overlay state
#[derive(Debug, Clone)]
pub enum PopupState {
    None,
    Confirm {
        title: String,
        message: String,
        command: String,
    },
    Error {
        title: String,
        message: String,
    },
    Input {
        title: String,
        prompt: String,
        buffer: String,
        purpose: InputPurpose,
    },
    Report {
        title: String,
        report: RestoreReport,
    },
    Loading {
        message: String,
    },
}

/// What a path prompt is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPurpose {
    BackupPath,
    RestorePath,
}

/// Action waiting on confirmation
#[derive(Debug, Clone)]
enum PendingAction {
    Restore(Vec<ManifestEntry>),
    Install(Vec<ManifestEntry>),
    Uninstall(Vec<ManifestEntry>),
}

/// Application state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    QueryInput,
    TextInput,
    ConfirmAction,
    ShowError,
    ShowReport,
    Loading,
}

impl App {
    /// Create a new App instance from an initial installed-package snapshot
    pub fn new(brew: BrewInfo, config: Config, snapshot: Snapshot, dry_run: bool) -> Self {
        let theme = Theme::from_name(config.theme);

        Self {
            should_quit: false,
            active_tab: Tab::Installed,
            config,
            theme,
            brew,
            dry_run,

            formulae: snapshot.formulae,
            casks: snapshot.casks,
            installed_focus: 0,
            formula_cursor: 0,
            cask_cursor: 0,
            installed_selected: HashSet::new(),

            search_query: String::new(),
            search_input_active: false,
            search_results: Vec::new(),
            search_cursor: 0,
            search_marked: HashSet::new(),
            search_ran: false,

            manifest_path: None,
            manifest: None,
            restore_plan: None,
            restore_cursor: 0,
            last_report: None,

            settings_selected: 0,

            popup: PopupState::None,
            pending: None,
            flash_message: None,
        }
    }

    /// Get current app state
    pub fn state(&self) -> AppState {
        match &self.popup {
            PopupState::None => {
                if self.active_tab == Tab::Search && self.search_input_active {
                    AppState::QueryInput
                } else {
                    AppState::Normal
                }
            }
            PopupState::Confirm { .. } => AppState::ConfirmAction,
            PopupState::Error { .. } => AppState::ShowError,
            PopupState::Input { .. } => AppState::TextInput,
            PopupState::Report { .. } => AppState::ShowReport,
            PopupState::Loading { .. } => AppState::Loading,
        }
    }

    /// Check if side-by-side layout should be used
    pub fn should_use_side_by_side(&self, terminal_width: u16) -> bool {
        if !self.config.display.show_cask_panel {
            return false;
        }
        match self.config.layout {
            LayoutMode::SideBySide => true,
            LayoutMode::TabsOnly => false,
            LayoutMode::Auto => terminal_width >= 100,
        }
    }

    /// Periodic housekeeping from the main loop
    pub fn tick(&mut self) {
        if let Some((_, _, instant)) = &self.flash_message {
            if instant.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }
    }

    /// Handle a key event
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.state() {
            AppState::ConfirmAction => self.handle_confirm_key(key),
            AppState::ShowError | AppState::ShowReport => self.handle_dismiss_key(key),
            AppState::TextInput => self.handle_input_key(key),
            AppState::QueryInput => self.handle_query_key(key),
            AppState::Loading => Ok(()), // Ignore input while busy
            AppState::Normal => self.handle_normal_key(key),
        }
    }

    /// Handle key in normal state
    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<()> {
        // Global keys (work in all tabs)
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return Ok(());
            }
            KeyCode::Char('1') => self.active_tab = Tab::Installed,
            KeyCode::Char('2') => self.active_tab = Tab::Search,
            KeyCode::Char('3') => self.active_tab = Tab::Restore,
            KeyCode::Char('4') => self.active_tab = Tab::Settings,
            _ => {}
        }

        // Tab-specific handling
        match self.active_tab {
            Tab::Installed => self.handle_installed_key(key),
            Tab::Search => self.handle_search_key(key),
            Tab::Restore => self.handle_restore_key(key),
            Tab::Settings => self.handle_settings_key(key),
        }
    }

    /// Handle keys in Installed tab
    fn handle_installed_key(&mut self, key: KeyEvent) -> Result<()> {
        let panel_len = self.focused_panel().len();

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                let cursor = self.focused_cursor_mut();
                if *cursor < panel_len.saturating_sub(1) {
                    *cursor += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let cursor = self.focused_cursor_mut();
                *cursor = cursor.saturating_sub(1);
            }
            KeyCode::Char('g') => {
                *self.focused_cursor_mut() = 0;
            }
            KeyCode::Char('G') => {
                *self.focused_cursor_mut() = panel_len.saturating_sub(1);
            }
            KeyCode::Tab => {
                if self.config.display.show_cask_panel {
                    self.installed_focus = (self.installed_focus + 1) % 2;
                }
            }
            KeyCode::Char(' ') => {
                // Toggle selection
                if let Some(pkg) = self.focused_package() {
                    let pkg_key = pkg.key();
                    if self.installed_selected.contains(&pkg_key) {
                        self.installed_selected.remove(&pkg_key);
                    } else {
                        self.installed_selected.insert(pkg_key);
                    }
                }
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                // Select all in focused panel
                let keys: Vec<_> = self.focused_panel().iter().map(|p| p.key()).collect();
                self.installed_selected.extend(keys);
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.installed_selected.clear();
            }
            KeyCode::Char('u') | KeyCode::Char('U') => {
                self.prompt_uninstall();
            }
            KeyCode::Char('b') | KeyCode::Char('B') => {
                self.open_backup_prompt();
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                match self.refresh_installed() {
                    Ok(()) => self.show_flash("Package list refreshed", false),
                    Err(e) => self.show_error("Refresh Failed", &format!("{:#}", e)),
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Handle keys in Search tab (results navigation)
    fn handle_search_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('/') => {
                self.search_input_active = true;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if self.search_cursor < self.search_results.len().saturating_sub(1) {
                    self.search_cursor += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.search_cursor = self.search_cursor.saturating_sub(1);
            }
            KeyCode::Char('g') => {
                self.search_cursor = 0;
            }
            KeyCode::Char('G') => {
                self.search_cursor = self.search_results.len().saturating_sub(1);
            }
            KeyCode::Char(' ') => {
                if let Some(pkg) = self.search_results.get(self.search_cursor) {
                    let pkg_key = pkg.key();
                    if self.search_marked.contains(&pkg_key) {
                        self.search_marked.remove(&pkg_key);
                    } else {
                        self.search_marked.insert(pkg_key);
                    }
                }
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.search_marked.clear();
            }
            KeyCode::Char('i') | KeyCode::Char('I') | KeyCode::Enter => {
                self.prompt_install_marked();
            }
            _ => {}
        }
        Ok(())
    }

    /// Handle keys while typing a search query
    fn handle_query_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.search_input_active = false;
            }
            KeyCode::Enter => {
                self.search_input_active = false;
                self.run_search();
            }
            KeyCode::Backspace => {
                self.search_query.pop();
            }
            KeyCode::Char(c) => {
                self.search_query.push(c);
            }
            _ => {}
        }
        Ok(())
    }

    /// Handle keys in Restore tab
    fn handle_restore_key(&mut self, key: KeyEvent) -> Result<()> {
        let plan_len = self
            .restore_plan
            .as_ref()
            .map(|p| p.entries.len())
            .unwrap_or(0);

        match key.code {
            KeyCode::Char('o') | KeyCode::Char('O') => {
                self.open_restore_prompt();
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if self.restore_cursor < plan_len.saturating_sub(1) {
                    self.restore_cursor += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.restore_cursor = self.restore_cursor.saturating_sub(1);
            }
            KeyCode::Char('g') => {
                self.restore_cursor = 0;
            }
            KeyCode::Char('G') => {
                self.restore_cursor = plan_len.saturating_sub(1);
            }
            KeyCode::Char(' ') => {
                if let Some(plan) = &mut self.restore_plan {
                    if let Some(entry) = plan.entries.get_mut(self.restore_cursor) {
                        entry.selected = !entry.selected;
                    }
                }
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                if let Some(plan) = &mut self.restore_plan {
                    for entry in &mut plan.entries {
                        entry.selected = true;
                    }
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                if let Some(plan) = &mut self.restore_plan {
                    for entry in &mut plan.entries {
                        entry.selected = false;
                    }
                }
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                // Skip entries that are already installed
                if let Some(plan) = &mut self.restore_plan {
                    for entry in &mut plan.entries {
                        if entry.already_installed {
                            entry.selected = false;
                        }
                    }
                }
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.manifest = None;
                self.manifest_path = None;
                self.restore_plan = None;
                self.restore_cursor = 0;
            }
            KeyCode::Char('i') | KeyCode::Char('I') | KeyCode::Enter => {
                self.prompt_restore_run();
            }
            _ => {}
        }
        Ok(())
    }

    /// Handle keys in Settings tab
    fn handle_settings_key(&mut self, key: KeyEvent) -> Result<()> {
        let settings_count = 5; // Number of settings items

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.settings_selected < settings_count - 1 {
                    self.settings_selected += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.settings_selected = self.settings_selected.saturating_sub(1);
            }
            KeyCode::Enter => {
                // Toggle/cycle setting
                match self.settings_selected {
                    0 => {
                        self.config.theme = self.config.theme.next();
                        self.theme = Theme::from_name(self.config.theme);
                    }
                    1 => {
                        self.config.layout = self.config.layout.next();
                    }
                    2 => {
                        self.config.display.show_versions = !self.config.display.show_versions
                    }
                    3 => {
                        self.config.display.show_cask_panel =
                            !self.config.display.show_cask_panel;
                        if !self.config.display.show_cask_panel {
                            self.installed_focus = 0;
                        }
                    }
                    4 => {
                        self.config.display.confirm_before_apply =
                            !self.config.display.confirm_before_apply
                    }
                    _ => {}
                }
                // Save config
                if let Err(e) = self.config.save() {
                    self.show_error("Save Failed", &e.to_string());
                } else {
                    self.show_flash("Settings saved", false);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Handle keys in confirm popup
    fn handle_confirm_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.execute_pending();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.popup = PopupState::None;
                self.pending = None;
            }
            _ => {}
        }
        Ok(())
    }

    /// Handle keys in error/report popups
    fn handle_dismiss_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('o') | KeyCode::Enter | KeyCode::Esc => {
                self.popup = PopupState::None;
            }
            _ => {}
        }
        Ok(())
    }

    /// Handle keys in path-input popup
    fn handle_input_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.popup = PopupState::None;
            }
            KeyCode::Enter => {
                if let PopupState::Input {
                    buffer, purpose, ..
                } = &self.popup
                {
                    let buffer = buffer.clone();
                    let purpose = *purpose;
                    match purpose {
                        InputPurpose::BackupPath => self.run_backup(&buffer),
                        InputPurpose::RestorePath => self.load_manifest(&buffer),
                    }
                }
            }
            KeyCode::Backspace => {
                if let PopupState::Input { buffer, .. } = &mut self.popup {
                    buffer.pop();
                }
            }
            KeyCode::Char(c) => {
                if let PopupState::Input { buffer, .. } = &mut self.popup {
                    buffer.push(c);
                }
            }
            _ => {}
        }
        Ok(())
    }

    // === BACKUP / RESTORE FLOWS ===

    /// Open the destination prompt for a backup
    fn open_backup_prompt(&mut self) {
        self.popup = PopupState::Input {
            title: "Backup Installed Packages".into(),
            prompt: "Write the package manifest to:".into(),
            buffer: self.config.default_manifest_path().display().to_string(),
            purpose: InputPurpose::BackupPath,
        };
    }

    /// Open the source prompt for a restore
    fn open_restore_prompt(&mut self) {
        self.popup = PopupState::Input {
            title: "Open Manifest".into(),
            prompt: "Read the package manifest from:".into(),
            buffer: self.config.default_manifest_path().display().to_string(),
            purpose: InputPurpose::RestorePath,
        };
    }

    /// Export the current package list to a manifest file
    ///
    /// The listing runs fresh so the manifest reflects this moment, and
    /// nothing is written when any listing command fails.
    fn run_backup(&mut self, raw_path: &str) {
        let raw_path = raw_path.trim();
        if raw_path.is_empty() {
            self.show_error("Backup Failed", "Destination path is empty");
            return;
        }

        self.popup = PopupState::Loading {
            message: "Exporting package list...".into(),
        };

        let snapshot = match brew::snapshot(&self.brew.brew_path) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.show_error("Backup Failed", &format!("{:#}", e));
                return;
            }
        };

        let manifest = Manifest::from_snapshot(&snapshot, Some(self.brew.hostname.clone()));
        let count = manifest.package_count();

        if let Err(e) = manifest.save(Path::new(raw_path)) {
            self.show_error("Backup Failed", &format!("{:#}", e));
            return;
        }

        // The snapshot doubles as a refresh of the Installed tab
        self.apply_snapshot(snapshot);

        self.popup = PopupState::None;
        self.show_flash(
            &format!("Exported {} packages to {}", count, raw_path),
            false,
        );
    }

    /// Load a manifest and build the restore plan
    ///
    /// Any load error leaves the previous plan untouched and triggers no
    /// install invocation.
    fn load_manifest(&mut self, raw_path: &str) {
        let raw_path = raw_path.trim();
        if raw_path.is_empty() {
            self.show_error("Restore Failed", "Manifest path is empty");
            return;
        }

        let path = PathBuf::from(raw_path);
        let manifest = match Manifest::load(&path) {
            Ok(manifest) => manifest,
            Err(e) => {
                self.show_error("Restore Failed", &format!("{:#}", e));
                return;
            }
        };

        if manifest.is_empty() {
            self.show_error("Restore Failed", "Manifest lists no packages");
            return;
        }

        let count = manifest.package_count();
        let plan = RestorePlan::build(manifest.entries(), &self.installed_set());

        self.restore_plan = Some(plan);
        self.manifest = Some(manifest);
        self.manifest_path = Some(path);
        self.restore_cursor = 0;
        self.popup = PopupState::None;
        self.show_flash(&format!("Loaded {} packages from {}", count, raw_path), false);
    }

    /// Prompt before running the restore plan
    fn prompt_restore_run(&mut self) {
        let entries = match &self.restore_plan {
            Some(plan) => plan.selected_entries(),
            None => {
                self.show_flash("No manifest loaded (press [o] to open one)", true);
                return;
            }
        };

        if entries.is_empty() {
            self.show_flash("No packages selected", true);
            return;
        }

        let source = self
            .manifest_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "manifest".into());

        let message = format!("Install {} package(s) from {}?", entries.len(), source);
        let command = commands::install_preview(&entries);
        self.confirm_or_run(PendingAction::Restore(entries), "Confirm Restore", message, command);
    }

    /// Prompt before installing marked search results
    fn prompt_install_marked(&mut self) {
        let entries = if self.search_marked.is_empty() {
            // Nothing marked: act on the entry under the cursor
            self.search_results
                .get(self.search_cursor)
                .map(|p| {
                    vec![ManifestEntry {
                        name: p.name.clone(),
                        kind: p.kind,
                    }]
                })
                .unwrap_or_default()
        } else {
            self.marked_entries(&self.search_marked)
        };

        if entries.is_empty() {
            self.show_flash("No packages selected", true);
            return;
        }

        let message = format!("Install {} package(s)?", entries.len());
        let command = commands::install_preview(&entries);
        self.confirm_or_run(PendingAction::Install(entries), "Confirm Install", message, command);
    }

    /// Prompt before uninstalling selected installed packages
    fn prompt_uninstall(&mut self) {
        let entries = if self.installed_selected.is_empty() {
            self.focused_package()
                .map(|p| {
                    vec![ManifestEntry {
                        name: p.name.clone(),
                        kind: p.kind,
                    }]
                })
                .unwrap_or_default()
        } else {
            self.marked_entries(&self.installed_selected)
        };

        if entries.is_empty() {
            self.show_flash("No packages selected", true);
            return;
        }

        let message = format!("Uninstall {} package(s)?", entries.len());
        let command = commands::uninstall_preview(&entries);
        self.confirm_or_run(
            PendingAction::Uninstall(entries),
            "Confirm Uninstall",
            message,
            command,
        );
    }

    /// Either show the confirmation popup or run immediately,
    /// depending on configuration
    fn confirm_or_run(
        &mut self,
        action: PendingAction,
        title: &str,
        message: String,
        command: String,
    ) {
        self.pending = Some(action);

        if self.config.display.confirm_before_apply {
            self.popup = PopupState::Confirm {
                title: title.into(),
                message,
                command,
            };
        } else {
            self.execute_pending();
        }
    }

    /// Execute the pending confirmed action
    fn execute_pending(&mut self) {
        let pending = match self.pending.take() {
            Some(pending) => pending,
            None => {
                self.popup = PopupState::None;
                return;
            }
        };

        match pending {
            PendingAction::Restore(entries) => {
                self.popup = PopupState::Loading {
                    message: format!("Installing {} package(s)...", entries.len()),
                };
                let report = commands::run_restore(&self.brew.brew_path, &entries, self.dry_run);
                self.finish_batch("Restore Complete", report, true);
            }
            PendingAction::Install(entries) => {
                self.popup = PopupState::Loading {
                    message: format!("Installing {} package(s)...", entries.len()),
                };
                let report = commands::run_restore(&self.brew.brew_path, &entries, self.dry_run);
                self.search_marked.clear();
                self.finish_batch("Install Complete", report, false);
            }
            PendingAction::Uninstall(entries) => {
                self.popup = PopupState::Loading {
                    message: format!("Uninstalling {} package(s)...", entries.len()),
                };
                let report = commands::run_removal(&self.brew.brew_path, &entries, self.dry_run);
                self.installed_selected.clear();
                self.finish_batch("Uninstall Complete", report, false);
            }
        }
    }

    /// Common tail of every batch action: refresh, report, flash
    fn finish_batch(&mut self, title: &str, report: RestoreReport, is_restore: bool) {
        if !self.dry_run {
            // Keep the report popup even if the refresh fails
            if let Err(e) = self.refresh_installed() {
                self.show_flash(&format!("Refresh failed: {:#}", e), true);
            }
        }

        if is_restore {
            self.last_report = Some(report.clone());
        }

        self.popup = PopupState::Report {
            title: title.into(),
            report,
        };
    }

    /// Run a brew search for the current query
    fn run_search(&mut self) {
        let query = self.search_query.trim().to_string();
        if query.is_empty() {
            self.show_flash("Search query is empty", true);
            return;
        }

        self.popup = PopupState::Loading {
            message: format!("Searching for \"{}\"...", query),
        };

        match commands::search_packages(&self.brew.brew_path, &query) {
            Ok(results) => {
                let count = results.len();
                self.search_results = results;
                self.search_cursor = 0;
                self.search_marked.clear();
                self.search_ran = true;
                self.popup = PopupState::None;
                if count == 0 {
                    self.show_flash("No packages found", true);
                } else {
                    self.show_flash(&format!("{} result(s)", count), false);
                }
            }
            Err(e) => {
                self.show_error("Search Failed", &format!("{:#}", e));
            }
        }
    }

    // === HELPER METHODS ===

    /// Packages in the focused Installed panel
    pub fn focused_panel(&self) -> &[Package] {
        if self.installed_focus == 0 {
            &self.formulae
        } else {
            &self.casks
        }
    }

    fn focused_cursor_mut(&mut self) -> &mut usize {
        if self.installed_focus == 0 {
            &mut self.formula_cursor
        } else {
            &mut self.cask_cursor
        }
    }

    /// Package under the cursor in the focused Installed panel
    pub fn focused_package(&self) -> Option<&Package> {
        let cursor = if self.installed_focus == 0 {
            self.formula_cursor
        } else {
            self.cask_cursor
        };
        self.focused_panel().get(cursor)
    }

    /// The installed set as (kind, name) pairs
    fn installed_set(&self) -> HashSet<(PackageKind, String)> {
        self.formulae
            .iter()
            .chain(self.casks.iter())
            .map(|p| p.key())
            .collect()
    }

    /// Selection set as entries, ordered for stable display
    fn marked_entries(&self, marked: &HashSet<(PackageKind, String)>) -> Vec<ManifestEntry> {
        let mut entries: Vec<ManifestEntry> = marked
            .iter()
            .map(|(kind, name)| ManifestEntry {
                name: name.clone(),
                kind: *kind,
            })
            .collect();
        entries.sort_by(|a, b| (a.kind.as_str(), &a.name).cmp(&(b.kind.as_str(), &b.name)));
        entries
    }

    /// Re-list installed packages and update dependent state
    fn refresh_installed(&mut self) -> Result<()> {
        let snapshot = brew::snapshot(&self.brew.brew_path)?;
        self.apply_snapshot(snapshot);
        Ok(())
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.formulae = snapshot.formulae;
        self.casks = snapshot.casks;
        self.formula_cursor = self
            .formula_cursor
            .min(self.formulae.len().saturating_sub(1));
        self.cask_cursor = self.cask_cursor.min(self.casks.len().saturating_sub(1));

        let installed = self.installed_set();
        if let Some(plan) = &mut self.restore_plan {
            plan.mark_installed(&installed);
        }
    }

    /// Show an error popup
    fn show_error(&mut self, title: &str, message: &str) {
        self.popup = PopupState::Error {
            title: title.into(),
            message: message.into(),
        };
    }

    /// Show a flash message
    fn show_flash(&mut self, message: &str, is_error: bool) {
        self.flash_message = Some((message.into(), is_error, Instant::now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn test_app() -> App {
        let brew = BrewInfo {
            hostname: "testhost".into(),
            brew_path: PathBuf::from("/nonexistent/brew"),
            brew_version: Some("4.3.12".into()),
        };
        let snapshot = Snapshot {
            formulae: vec![
                Package {
                    name: "git".into(),
                    version: Some("2.44.0".into()),
                    kind: PackageKind::Formula,
                },
                Package {
                    name: "wget".into(),
                    version: Some("1.24.5".into()),
                    kind: PackageKind::Formula,
                },
            ],
            casks: vec![Package {
                name: "firefox".into(),
                version: None,
                kind: PackageKind::Cask,
            }],
        };
        App::new(brew, Config::default(), snapshot, true)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    #[test]
    fn test_tab_switching() {
        let mut app = test_app();
        assert_eq!(app.active_tab, Tab::Installed);

        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.active_tab, Tab::Search);

        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.active_tab, Tab::Restore);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_installed_navigation_and_selection() {
        let mut app = test_app();

        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.formula_cursor, 1);

        press(&mut app, KeyCode::Char(' '));
        assert!(app
            .installed_selected
            .contains(&(PackageKind::Formula, "wget".to_string())));

        press(&mut app, KeyCode::Char(' '));
        assert!(app.installed_selected.is_empty());

        // Cursor clamps at the end of the list
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.formula_cursor, 1);
    }

    #[test]
    fn test_uninstall_prompt_sets_confirmation() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('u'));

        match &app.popup {
            PopupState::Confirm { title, command, .. } => {
                assert_eq!(title, "Confirm Uninstall");
                assert!(command.contains("brew uninstall --force git"));
            }
            other => panic!("Expected confirm popup, got {:?}", other),
        }

        // Declining clears the pending action
        press(&mut app, KeyCode::Char('n'));
        assert!(matches!(app.popup, PopupState::None));
    }

    #[test]
    fn test_confirmed_dry_run_uninstall_reports() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('u'));
        press(&mut app, KeyCode::Char('y'));

        match &app.popup {
            PopupState::Report { report, .. } => {
                assert_eq!(report.succeeded, vec!["git".to_string()]);
                assert!(report.all_ok());
            }
            other => panic!("Expected report popup, got {:?}", other),
        }
        assert!(app.installed_selected.is_empty());
    }

    #[test]
    fn test_backup_prompt_prefills_default_path() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('b'));

        match &app.popup {
            PopupState::Input {
                buffer, purpose, ..
            } => {
                assert_eq!(*purpose, InputPurpose::BackupPath);
                assert!(buffer.ends_with("brew-manifest.json"));
            }
            other => panic!("Expected input popup, got {:?}", other),
        }
    }

    #[test]
    fn test_backup_rejects_empty_path() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('b'));

        // Erase the prefilled buffer, then submit
        while matches!(&app.popup, PopupState::Input { buffer, .. } if !buffer.is_empty()) {
            press(&mut app, KeyCode::Backspace);
        }
        press(&mut app, KeyCode::Enter);

        match &app.popup {
            PopupState::Error { message, .. } => {
                assert!(message.contains("Destination path is empty"));
            }
            other => panic!("Expected error popup, got {:?}", other),
        }
    }

    #[test]
    fn test_restore_load_missing_manifest_keeps_plan_empty() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char('o'));

        while matches!(&app.popup, PopupState::Input { buffer, .. } if !buffer.is_empty()) {
            press(&mut app, KeyCode::Backspace);
        }
        for c in "/nonexistent/manifest.json".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.popup, PopupState::Error { .. }));
        assert!(app.restore_plan.is_none());
        assert!(app.manifest.is_none());
    }

    #[test]
    fn test_restore_flow_from_manifest_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, r#"{"formula": ["git", "htop"], "cask": ["firefox"]}"#).unwrap();

        let mut app = test_app();
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char('o'));

        while matches!(&app.popup, PopupState::Input { buffer, .. } if !buffer.is_empty()) {
            press(&mut app, KeyCode::Backspace);
        }
        for c in path.display().to_string().chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);

        let plan = app.restore_plan.as_ref().expect("plan built");
        assert_eq!(plan.entries.len(), 3);
        // "git" and "firefox" are installed in the test snapshot
        assert!(plan.entries[0].already_installed);
        assert!(!plan.entries[1].already_installed);
        assert_eq!(plan.selected_count(), 3);

        // Run it (dry-run): every entry succeeds, in manifest order
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('y'));

        match &app.popup {
            PopupState::Report { report, .. } => {
                assert_eq!(
                    report.succeeded,
                    vec!["git".to_string(), "htop".to_string(), "firefox".to_string()]
                );
            }
            other => panic!("Expected report popup, got {:?}", other),
        }
        assert!(app.last_report.is_some());
    }

    #[test]
    fn test_search_query_input() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.state(), AppState::QueryInput);

        // 'q' is text while typing, not quit
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.search_query, "q");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state(), AppState::Normal);
    }

    #[test]
    fn test_settings_toggle_theme() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.settings_selected, 0);
        // Theme cycling is exercised via config directly; Enter would
        // also write the config file, which tests avoid.
        let before = app.config.theme;
        assert_ne!(before.next(), before);
    }
}
