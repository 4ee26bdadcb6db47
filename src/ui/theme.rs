//! Color themes
//!
//! Three built-in palettes: Gruvbox (default), Nord, and Transparent,
//! which defers to the terminal's own colors. The style helpers keep
//! raw color juggling out of the widget code.

use crate::config::ThemeName;
use ratatui::style::{Color, Modifier, Style};

const fn hex(rgb: u32) -> Color {
    Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// Resolved palette for the active theme
#[derive(Debug, Clone)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub fg_dim: Color,
    pub accent: Color,

    pub success: Color,
    pub warning: Color,
    pub error: Color,

    pub border: Color,
    pub border_focused: Color,
    pub selection_bg: Color,

    pub installed_marker: Color,
    pub checked_marker: Color,
    pub cask_marker: Color,
}

impl Theme {
    pub fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Gruvbox => Self::gruvbox(),
            ThemeName::Nord => Self::nord(),
            ThemeName::Transparent => Self::transparent(),
        }
    }

    /// Gruvbox dark (default)
    pub fn gruvbox() -> Self {
        Self {
            bg: hex(0x282828),
            fg: hex(0xebdbb2),
            fg_dim: hex(0x928374),
            accent: hex(0xfe8019),

            success: hex(0xb8bb26),
            warning: hex(0xfabd2f),
            error: hex(0xfb4934),

            border: hex(0x504945),
            border_focused: hex(0xa89984),
            selection_bg: hex(0x504945),

            installed_marker: hex(0xb8bb26),
            checked_marker: hex(0xfabd2f),
            cask_marker: hex(0x83a598),
        }
    }

    pub fn nord() -> Self {
        Self {
            bg: hex(0x2e3440),
            fg: hex(0xeceff4),
            fg_dim: hex(0x4c566a),
            accent: hex(0x88c0d0),

            success: hex(0xa3be8c),
            warning: hex(0xebcb8b),
            error: hex(0xbf616a),

            border: hex(0x3b4252),
            border_focused: hex(0x88c0d0),
            selection_bg: hex(0x4c566a),

            installed_marker: hex(0xa3be8c),
            checked_marker: hex(0xebcb8b),
            cask_marker: hex(0x81a1c1),
        }
    }

    /// Terminal-default colors, for transparent terminals
    pub fn transparent() -> Self {
        Self {
            bg: Color::Reset,
            fg: Color::Reset,
            fg_dim: Color::DarkGray,
            accent: Color::Cyan,

            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,

            border: Color::DarkGray,
            border_focused: Color::Cyan,
            selection_bg: Color::DarkGray,

            installed_marker: Color::Green,
            checked_marker: Color::Yellow,
            cask_marker: Color::Cyan,
        }
    }

    fn on_bg(&self, fg: Color) -> Style {
        Style::default().fg(fg).bg(self.bg)
    }

    /// Background fill for block-level widgets
    pub fn block_style(&self) -> Style {
        Style::default().bg(self.bg)
    }

    pub fn text(&self) -> Style {
        self.on_bg(self.fg)
    }

    pub fn text_dim(&self) -> Style {
        self.on_bg(self.fg_dim)
    }

    pub fn title(&self) -> Style {
        self.on_bg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.fg)
            .bg(self.selection_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border(&self) -> Style {
        self.on_bg(self.border)
    }

    pub fn border_focused(&self) -> Style {
        self.on_bg(self.border_focused)
    }

    pub fn tab_inactive(&self) -> Style {
        self.text_dim()
    }

    pub fn tab_active(&self) -> Style {
        self.title()
    }

    pub fn success(&self) -> Style {
        self.on_bg(self.success)
    }

    pub fn warning(&self) -> Style {
        self.on_bg(self.warning)
    }

    pub fn error(&self) -> Style {
        self.on_bg(self.error)
    }

    /// Already-installed marker
    pub fn marker_installed(&self) -> Style {
        Style::default()
            .fg(self.installed_marker)
            .add_modifier(Modifier::BOLD)
    }

    /// Checked/selected-for-action marker
    pub fn marker_checked(&self) -> Style {
        Style::default().fg(self.checked_marker)
    }

    /// Cask tag marker
    pub fn marker_cask(&self) -> Style {
        Style::default().fg(self.cask_marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(hex(0x282828), Color::Rgb(40, 40, 40));
        assert_eq!(hex(0xfe8019), Color::Rgb(254, 128, 25));
    }

    #[test]
    fn test_theme_from_name() {
        assert_eq!(Theme::from_name(ThemeName::Gruvbox).bg, hex(0x282828));
        assert_eq!(Theme::from_name(ThemeName::Nord).bg, hex(0x2e3440));
        assert_eq!(Theme::from_name(ThemeName::Transparent).bg, Color::Reset);
    }
}
