//! brewstash - Homebrew backup and restore
//!
//! A TUI for backing up, restoring, and managing Homebrew packages.
//!
//! Features:
//! - View installed formulae and casks
//! - Export the installed package list to a JSON manifest
//! - Restore packages from a previously saved manifest
//! - Search Homebrew and install new packages
//! - Uninstall selected packages
//!
//! Usage: brewstash [--dry-run]

mod app;
mod brew;
mod config;
mod manifest;
mod types;
mod ui;

use anyhow::{Context, Result};
use app::App;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;

fn main() -> Result<()> {
    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let dry_run = args.iter().any(|a| a == "--dry-run" || a == "-n");

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|a| a == "--version" || a == "-v") {
        println!("brewstash {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Run the application; run_app restores the terminal before returning
    if let Err(e) = run_app(dry_run) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn print_help() {
    println!(
        r#"brewstash - Homebrew backup and restore

USAGE:
    brewstash [OPTIONS]

OPTIONS:
    -n, --dry-run    Show what would be done without executing
    -h, --help       Print help information
    -v, --version    Print version information

KEYBINDINGS:
    1-4              Switch tabs
    j/k              Navigate up/down
    Tab              Switch panel/focus
    Space            Toggle selection
    b                Backup installed packages to a manifest
    o                Open a manifest (Restore tab)
    i / Enter        Install selected/marked packages
    u                Uninstall selected packages
    /                Search query (Search tab)
    r                Refresh installed packages
    q                Quit

TABS:
    [1] Installed    View and manage installed formulae and casks
    [2] Search       Search Homebrew and install new packages
    [3] Restore      Re-install packages from a saved manifest
    [4] Settings     Configure theme and display options

CONFIG:
    ~/.config/brewstash/config.toml
"#
    );
}

fn run_app(dry_run: bool) -> Result<()> {
    // Detect Homebrew
    eprintln!("Detecting Homebrew...");
    let brew_info = brew::detect_brew().context("Failed to detect Homebrew")?;

    eprintln!("Hostname: {}", brew_info.hostname);
    eprintln!("Homebrew: {}", brew_info.brew_path.display());
    if let Some(version) = &brew_info.brew_version {
        eprintln!("Version: {}", version);
    }

    // Load configuration
    let config = config::Config::load().context("Failed to load configuration")?;

    // Snapshot installed packages
    eprintln!("Loading installed packages...");
    let snapshot = brew::snapshot(&brew_info.brew_path)
        .context("Failed to list installed packages")?;
    eprintln!(
        "{} packages ({} formulae, {} casks)",
        snapshot.total(),
        snapshot.formulae.len(),
        snapshot.casks.len()
    );

    if dry_run {
        eprintln!("Running in dry-run mode (no changes will be made)");
    }

    // Create application state
    let mut app = App::new(brew_info, config, snapshot, dry_run);

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to setup terminal")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Run main loop
    let result = main_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

fn main_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        // Render UI
        terminal.draw(|frame| {
            ui::render(frame, app);
        })?;

        // Expire flash messages
        app.tick();

        // Poll for events with timeout (for flash expiry)
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key)?;
                }
            }
        }

        // Check if should quit
        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_does_not_panic() {
        print_help();
    }
}
