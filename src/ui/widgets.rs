//! Reusable UI widgets
//!
//! Centered popup dialogs (confirm, error, path input, batch report,
//! busy indicator), the flash message line, the status bar, and small
//! layout helpers.

use crate::types::RestoreReport;
use crate::ui::Theme;
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render a centered popup dialog with an optional button row
pub fn render_popup(
    frame: &mut Frame,
    title: &str,
    content: Vec<Line>,
    buttons: &[(&str, char)], // (label, key)
    theme: &Theme,
    area: Rect,
) {
    let width = 60.min(area.width.saturating_sub(4));
    let height = (content.len() as u16 + 6).min(area.height.saturating_sub(4));
    let popup_area = centered_rect(width, height, area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" {} ", title))
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border_focused())
        .style(theme.text());
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let [body_area, _, footer_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let body = Paragraph::new(content)
        .style(theme.text())
        .wrap(Wrap { trim: false });
    frame.render_widget(body, body_area);

    if !buttons.is_empty() {
        let mut spans = Vec::new();
        for (i, (label, key)) in buttons.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("    "));
            }
            spans.push(Span::styled(
                format!("[{}]", key),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(format!(" {}", label), theme.text()));
        }
        frame.render_widget(
            Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
            footer_area,
        );
    }
}

/// Confirmation popup with a command preview
pub fn render_confirm_popup(
    frame: &mut Frame,
    title: &str,
    message: &str,
    command_preview: Option<&str>,
    theme: &Theme,
    area: Rect,
) {
    let mut content = vec![Line::raw(""), Line::raw(message), Line::raw("")];

    if let Some(cmd) = command_preview {
        content.push(Line::styled("Runs:", theme.text_dim()));
        content.push(Line::styled(cmd, theme.text_dim()));
        content.push(Line::raw(""));
    }

    render_popup(
        frame,
        title,
        content,
        &[("Yes", 'y'), ("Cancel", 'n')],
        theme,
        area,
    );
}

pub fn render_error_popup(
    frame: &mut Frame,
    title: &str,
    message: &str,
    theme: &Theme,
    area: Rect,
) {
    let content = vec![
        Line::raw(""),
        Line::styled(message, theme.error()),
        Line::raw(""),
    ];

    render_popup(frame, title, content, &[("OK", 'o')], theme, area);
}

/// Text-input popup, used for manifest file paths
pub fn render_input_popup(
    frame: &mut Frame,
    title: &str,
    prompt: &str,
    buffer: &str,
    theme: &Theme,
    area: Rect,
) {
    let content = vec![
        Line::raw(""),
        Line::styled(prompt, theme.text_dim()),
        Line::raw(""),
        Line::from(vec![
            Span::styled("> ", Style::default().fg(theme.accent)),
            Span::styled(buffer, theme.text()),
            Span::styled("_", Style::default().fg(theme.accent)),
        ]),
        Line::raw(""),
    ];

    render_popup(
        frame,
        title,
        content,
        &[("Accept", '⏎'), ("Cancel", '\x1b')], // Enter / Esc
        theme,
        area,
    );
}

/// Per-entry result report popup
pub fn render_report_popup(
    frame: &mut Frame,
    title: &str,
    report: &RestoreReport,
    theme: &Theme,
    area: Rect,
) {
    // Cap the listing so huge batches still fit on screen
    const MAX_LISTED: usize = 8;

    let mut content = vec![Line::raw("")];

    if !report.succeeded.is_empty() {
        content.push(Line::styled(
            format!("Succeeded ({})", report.succeeded.len()),
            theme.success(),
        ));
        for name in report.succeeded.iter().take(MAX_LISTED) {
            content.push(Line::from(vec![
                Span::styled(" ✓ ", theme.success()),
                Span::styled(name.as_str(), theme.text()),
            ]));
        }
        if report.succeeded.len() > MAX_LISTED {
            content.push(Line::styled(
                format!("   … and {} more", report.succeeded.len() - MAX_LISTED),
                theme.text_dim(),
            ));
        }
        content.push(Line::raw(""));
    }

    if !report.failed.is_empty() {
        content.push(Line::styled(
            format!("Failed ({})", report.failed.len()),
            theme.error(),
        ));
        for (name, error) in report.failed.iter().take(MAX_LISTED) {
            content.push(Line::from(vec![
                Span::styled(" ✗ ", theme.error()),
                Span::styled(name.as_str(), theme.text()),
                Span::raw("  "),
                Span::styled(error.as_str(), theme.text_dim()),
            ]));
        }
        if report.failed.len() > MAX_LISTED {
            content.push(Line::styled(
                format!("   … and {} more", report.failed.len() - MAX_LISTED),
                theme.text_dim(),
            ));
        }
        content.push(Line::raw(""));
    }

    if report.total() == 0 {
        content.push(Line::styled("Nothing to do.", theme.text_dim()));
        content.push(Line::raw(""));
    }

    render_popup(frame, title, content, &[("OK", 'o')], theme, area);
}

/// Busy indicator shown while a brew invocation blocks the UI
pub fn render_loading(frame: &mut Frame, message: &str, theme: &Theme, area: Rect) {
    const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let tick = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        / 100;
    let glyph = FRAMES[tick as usize % FRAMES.len()];

    let content = vec![
        Line::raw(""),
        Line::from(vec![
            Span::styled(glyph, Style::default().fg(theme.accent)),
            Span::raw(" "),
            Span::styled(message, theme.text()),
        ])
        .alignment(Alignment::Center),
    ];

    render_popup(frame, "Working", content, &[], theme, area);
}

/// One-line feedback message over the status bar
pub fn render_flash_message(
    frame: &mut Frame,
    message: &str,
    is_error: bool,
    theme: &Theme,
    area: Rect,
) {
    let (style, prefix) = if is_error {
        (theme.error(), "✗")
    } else {
        (theme.success(), "✓")
    };

    let flash = Paragraph::new(Line::styled(format!("{} {}", prefix, message), style));
    frame.render_widget(flash, bottom_line(area));
}

/// Key hints on the left, version / dry-run tag on the right
pub fn render_status_bar(
    frame: &mut Frame,
    left_content: &str,
    right_content: &str,
    theme: &Theme,
    area: Rect,
) {
    let bar = bottom_line(area);
    frame.render_widget(Clear, bar);
    frame.render_widget(Paragraph::new(left_content).style(theme.text_dim()), bar);
    frame.render_widget(
        Paragraph::new(right_content)
            .style(theme.text_dim())
            .alignment(Alignment::Right),
        bar,
    );
}

fn bottom_line(area: Rect) -> Rect {
    Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    }
}

/// Center a width × height rect inside an area
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    area
}

/// Split an area into horizontal percentage columns
pub fn horizontal_split(area: Rect, percentages: &[u16]) -> Vec<Rect> {
    Layout::horizontal(percentages.iter().map(|p| Constraint::Percentage(*p)))
        .split(area)
        .to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(40, 20, area);

        assert_eq!(popup, Rect::new(30, 15, 40, 20));
    }

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        let popup = centered_rect(40, 20, area);

        assert!(popup.width <= area.width);
        assert!(popup.height <= area.height);
    }

    #[test]
    fn test_horizontal_split() {
        let area = Rect::new(0, 0, 100, 50);
        let splits = horizontal_split(area, &[50, 50]);

        assert_eq!(splits.len(), 2);
        assert_eq!(splits[0].width, 50);
        assert_eq!(splits[1].width, 50);
    }
}
