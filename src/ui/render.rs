//! Main rendering module
//!
//! Handles rendering the complete UI including:
//! - Header with hostname and tab bar
//! - Active tab content
//! - Popups and overlays
//! - Status bar

use crate::app::{App, PopupState};
use crate::types::{Package, PackageKind, Tab};
use crate::ui::{theme::Theme, widgets};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, Tabs},
    Frame,
};
use std::collections::HashSet;

/// Main render function - entry point for all UI rendering
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Main layout: header, content, status bar
    let layout = Layout::vertical([
        Constraint::Length(3), // Header + tabs
        Constraint::Min(10),   // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    // Render header with tabs
    render_header(frame, app, layout[0]);

    // Render active tab content
    render_tab_content(frame, app, layout[1]);

    // Render status bar
    render_status_bar(frame, app, layout[2]);

    // Render popup overlays (if any)
    render_popups(frame, app, area);
}

/// Render header with hostname and tab bar
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let header_block = Block::default()
        .style(theme.block_style())
        .title(format!(" brewstash · {} ", app.brew.hostname))
        .title_style(theme.title())
        .borders(Borders::BOTTOM)
        .border_style(theme.border());

    frame.render_widget(header_block, area);

    // Tab bar
    let tab_titles: Vec<Line> = Tab::all()
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            let style = if app.active_tab == *tab {
                theme.tab_active()
            } else {
                theme.tab_inactive()
            };
            Line::styled(format!("[{}] {}", i + 1, tab.label()), style)
        })
        .collect();

    let tabs = Tabs::new(tab_titles)
        .select(app.active_tab.index())
        .divider(" │ ")
        .style(theme.text());

    let tabs_area = Rect {
        x: area.x + 2,
        y: area.y + 1,
        width: area.width.saturating_sub(4),
        height: 1,
    };
    frame.render_widget(tabs, tabs_area);
}

/// Render the active tab's content
fn render_tab_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.active_tab {
        Tab::Installed => render_installed_tab(frame, app, area),
        Tab::Search => render_search_tab(frame, app, area),
        Tab::Restore => render_restore_tab(frame, app, area),
        Tab::Settings => render_settings_tab(frame, app, area),
    }
}

/// Render status bar with keybindings
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let hints = match app.active_tab {
        Tab::Installed => {
            "[j/k] Navigate  [Tab] Panel  [Space] Select  [b] Backup  [u] Uninstall  [r] Refresh  [q] Quit"
        }
        Tab::Search => "[/] Query  [j/k] Navigate  [Space] Mark  [i] Install  [q] Quit",
        Tab::Restore => "[o] Open Manifest  [Space] Toggle  [s] Skip Installed  [Enter] Install  [q] Quit",
        Tab::Settings => "[j/k] Navigate  [Enter] Change  [q] Quit",
    };

    let right = if app.dry_run {
        "DRY RUN".to_string()
    } else {
        app.brew
            .brew_version
            .as_deref()
            .map(|v| format!("Homebrew {}", v))
            .unwrap_or_default()
    };

    widgets::render_status_bar(frame, hints, &right, theme, area);
}

/// Render popups if active
fn render_popups(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    match &app.popup {
        PopupState::None => {}

        PopupState::Confirm {
            title,
            message,
            command,
        } => {
            widgets::render_confirm_popup(frame, title, message, Some(command), theme, area);
        }

        PopupState::Error { title, message } => {
            widgets::render_error_popup(frame, title, message, theme, area);
        }

        PopupState::Input {
            title,
            prompt,
            buffer,
            ..
        } => {
            widgets::render_input_popup(frame, title, prompt, buffer, theme, area);
        }

        PopupState::Report { title, report } => {
            widgets::render_report_popup(frame, title, report, theme, area);
        }

        PopupState::Loading { message } => {
            widgets::render_loading(frame, message, theme, area);
        }
    }

    // Flash message (success/error feedback)
    if let Some((msg, is_error, _)) = &app.flash_message {
        widgets::render_flash_message(frame, msg, *is_error, theme, area);
    }
}

// === TAB RENDERERS ===

/// Installed tab: formula and cask panels
fn render_installed_tab(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    if app.should_use_side_by_side(area.width) {
        let panels = widgets::horizontal_split(area, &[50, 50]);

        render_package_panel(
            frame,
            app,
            PackageKind::Formula.label(),
            &app.formulae,
            app.formula_cursor,
            app.installed_focus == 0,
            theme,
            panels[0],
        );
        render_package_panel(
            frame,
            app,
            PackageKind::Cask.label(),
            &app.casks,
            app.cask_cursor,
            app.installed_focus == 1,
            theme,
            panels[1],
        );
    } else {
        // Single panel view
        let (title, packages, cursor) = if app.installed_focus == 0 {
            (PackageKind::Formula.label(), &app.formulae, app.formula_cursor)
        } else {
            (PackageKind::Cask.label(), &app.casks, app.cask_cursor)
        };

        render_package_panel(frame, app, title, packages, cursor, true, theme, area);
    }
}

/// Render one panel of installed packages
#[allow(clippy::too_many_arguments)]
fn render_package_panel(
    frame: &mut Frame,
    app: &App,
    title: &str,
    packages: &[Package],
    cursor: usize,
    is_focused: bool,
    theme: &Theme,
    area: Rect,
) {
    let border_style = if is_focused {
        theme.border_focused()
    } else {
        theme.border()
    };

    let block = Block::default()
        .style(theme.block_style())
        .title(format!(" {} ({}) ", title, packages.len()))
        .title_style(if is_focused { theme.title() } else { theme.text_dim() })
        .borders(Borders::ALL)
        .border_style(border_style);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if packages.is_empty() {
        let empty_msg = Paragraph::new("Nothing installed")
            .style(theme.text_dim())
            .alignment(Alignment::Center);
        frame.render_widget(empty_msg, inner);
        return;
    }

    let items: Vec<ListItem> = packages
        .iter()
        .enumerate()
        .map(|(i, pkg)| {
            let checked = app.installed_selected.contains(&pkg.key());
            let marker = if checked { "■ " } else { "□ " };
            let marker_style = if checked {
                theme.marker_checked()
            } else {
                theme.text_dim()
            };

            let style = if i == cursor && is_focused {
                theme.selected()
            } else {
                theme.text()
            };

            let mut spans = vec![
                Span::styled(marker.to_string(), marker_style),
                Span::styled(pkg.name.clone(), style),
            ];
            if app.config.display.show_versions {
                if let Some(version) = &pkg.version {
                    spans.push(Span::raw(" "));
                    spans.push(Span::styled(version.clone(), theme.text_dim()));
                }
            }

            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items);
    frame.render_widget(list, inner);

    // Selection summary at bottom
    let selected_here = packages
        .iter()
        .filter(|p| app.installed_selected.contains(&p.key()))
        .count();
    if selected_here > 0 {
        let detail_area = Rect {
            x: inner.x,
            y: inner.y + inner.height.saturating_sub(1),
            width: inner.width,
            height: 1,
        };
        let details = format!("{} selected", selected_here);
        let detail_widget = Paragraph::new(details)
            .style(theme.warning())
            .alignment(Alignment::Right);
        frame.render_widget(detail_widget, detail_area);
    }
}

/// Search tab: query input and result list
fn render_search_tab(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let block = Block::default()
        .style(theme.block_style())
        .title(" Search Packages ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border_focused());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Query input line
    let query_area = Rect {
        x: inner.x,
        y: inner.y,
        width: inner.width,
        height: 1,
    };
    let cursor = if app.search_input_active { "_" } else { "" };
    let query_text = format!("Search: {}{}", app.search_query, cursor);
    let query_style = if app.search_input_active {
        theme.text()
    } else {
        theme.text_dim()
    };
    frame.render_widget(Paragraph::new(query_text).style(query_style), query_area);

    // Result list
    let list_area = Rect {
        x: inner.x,
        y: inner.y + 2,
        width: inner.width,
        height: inner.height.saturating_sub(3),
    };

    if !app.search_ran {
        let hint = Paragraph::new("Press [/] to search Homebrew for new packages")
            .style(theme.text_dim())
            .alignment(Alignment::Center);
        frame.render_widget(hint, list_area);
        return;
    }

    if app.search_results.is_empty() {
        let empty_msg = Paragraph::new("No packages found")
            .style(theme.text_dim())
            .alignment(Alignment::Center);
        frame.render_widget(empty_msg, list_area);
        return;
    }

    let installed: HashSet<(PackageKind, String)> = app
        .formulae
        .iter()
        .chain(app.casks.iter())
        .map(|p| p.key())
        .collect();

    let items: Vec<ListItem> = app
        .search_results
        .iter()
        .enumerate()
        .map(|(i, pkg)| {
            let marked = app.search_marked.contains(&pkg.key());
            let marker = if marked { "■ " } else { "□ " };
            let marker_style = if marked {
                theme.marker_checked()
            } else {
                theme.text_dim()
            };

            let style = if i == app.search_cursor {
                theme.selected()
            } else {
                theme.text()
            };

            let mut spans = vec![
                Span::styled(marker.to_string(), marker_style),
                Span::styled(pkg.name.clone(), style),
            ];
            if pkg.kind == PackageKind::Cask {
                spans.push(Span::raw(" "));
                spans.push(Span::styled("[cask]", theme.marker_cask()));
            }
            if installed.contains(&pkg.key()) {
                spans.push(Span::raw(" "));
                spans.push(Span::styled("✓ installed", theme.marker_installed()));
            }

            ListItem::new(Line::from(spans))
        })
        .collect();

    frame.render_widget(List::new(items), list_area);

    // Result count at bottom
    let count_area = Rect {
        x: inner.x,
        y: inner.y + inner.height.saturating_sub(1),
        width: inner.width,
        height: 1,
    };
    let count_text = format!(
        "{} / {} results · {} marked",
        app.search_cursor.saturating_add(1).min(app.search_results.len()),
        app.search_results.len(),
        app.search_marked.len()
    );
    let count_widget = Paragraph::new(count_text)
        .style(theme.text_dim())
        .alignment(Alignment::Right);
    frame.render_widget(count_widget, count_area);
}

/// Restore tab: manifest info and install plan
fn render_restore_tab(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let block = Block::default()
        .style(theme.block_style())
        .title(" Restore from Manifest ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border_focused());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let plan = match &app.restore_plan {
        Some(plan) => plan,
        None => {
            let mut lines = vec![
                Line::raw(""),
                Line::styled(
                    "Press [o] to open a manifest file",
                    theme.text_dim(),
                ),
            ];
            if let Some(report) = &app.last_report {
                let style = if report.all_ok() {
                    theme.success()
                } else {
                    theme.warning()
                };
                lines.push(Line::raw(""));
                lines.push(Line::styled(
                    format!("Last restore: {}", report.summary()),
                    style,
                ));
            }
            let hint = Paragraph::new(lines).alignment(Alignment::Center);
            frame.render_widget(hint, inner);
            return;
        }
    };

    // Manifest info line
    let info_area = Rect {
        x: inner.x,
        y: inner.y,
        width: inner.width,
        height: 1,
    };

    let mut info = app
        .manifest_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    if let Some(manifest) = &app.manifest {
        if let Some(created) = &manifest.created {
            info.push_str(&format!(" · created {}", created.format("%d.%m.%y %H:%M")));
        }
        if let Some(host) = &manifest.host {
            info.push_str(&format!(" · from {}", host));
        }
    }
    frame.render_widget(Paragraph::new(info).style(theme.text_dim()), info_area);

    // Plan table
    let table_area = Rect {
        x: inner.x,
        y: inner.y + 2,
        width: inner.width,
        height: inner.height.saturating_sub(5),
    };

    let header = Row::new(vec![
        Cell::from("").style(theme.title()),
        Cell::from("NAME").style(theme.title()),
        Cell::from("KIND").style(theme.title()),
        Cell::from("STATUS").style(theme.title()),
    ]);

    let rows: Vec<Row> = plan
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let marker = if entry.selected { "■" } else { "□" };
            let status = if entry.already_installed {
                "✓ installed"
            } else {
                ""
            };

            let style = if i == app.restore_cursor {
                theme.selected()
            } else if entry.already_installed {
                theme.text_dim()
            } else {
                theme.text()
            };

            Row::new(vec![
                Cell::from(marker),
                Cell::from(entry.name.clone()),
                Cell::from(entry.kind.as_str()),
                Cell::from(status),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Min(20),
            Constraint::Length(9),
            Constraint::Length(14),
        ],
    )
    .header(header);

    frame.render_widget(table, table_area);

    // Actions help at bottom
    let actions_area = Rect {
        x: inner.x,
        y: inner.y + inner.height.saturating_sub(2),
        width: inner.width,
        height: 2,
    };

    let actions_text = format!(
        "{} of {} selected · [Space] Toggle  [a] All  [n] None  [s] Skip Installed  [Enter] Install  [c] Close",
        plan.selected_count(),
        plan.entries.len(),
    );
    let actions_widget = Paragraph::new(actions_text)
        .style(theme.text_dim())
        .alignment(Alignment::Center);
    frame.render_widget(actions_widget, actions_area);
}

/// Settings tab
fn render_settings_tab(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let block = Block::default()
        .style(theme.block_style())
        .title(" Settings ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border_focused());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let settings = [
        ("Theme", app.config.theme.as_str().to_string()),
        ("Layout", app.config.layout.as_str().to_string()),
        (
            "Show Versions",
            bool_str(app.config.display.show_versions).to_string(),
        ),
        (
            "Show Cask Panel",
            bool_str(app.config.display.show_cask_panel).to_string(),
        ),
        (
            "Confirm Before Apply",
            bool_str(app.config.display.confirm_before_apply).to_string(),
        ),
    ];

    let items: Vec<ListItem> = settings
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let style = if i == app.settings_selected {
                theme.selected()
            } else {
                theme.text()
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<24}", label), style),
                Span::styled(format!("[{}]", value), Style::default().fg(theme.accent)),
            ]))
        })
        .collect();

    let list = List::new(items);
    frame.render_widget(list, inner);

    // Config path at bottom
    let config_path = crate::config::Config::path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "Unknown".into());

    let path_area = Rect {
        x: inner.x,
        y: inner.y + inner.height.saturating_sub(2),
        width: inner.width,
        height: 1,
    };
    let path_widget =
        Paragraph::new(format!("Config: {}", config_path)).style(theme.text_dim());
    frame.render_widget(path_widget, path_area);
}

fn bool_str(b: bool) -> &'static str {
    if b {
        "✓"
    } else {
        " "
    }
}
