//! Theme and styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

/// Color palette for a theme.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Brand Colors
    pub primary: Color,
    pub accent: Color,

    // Semantic Colors
    pub success: Color,
    pub error: Color,
    pub info: Color,

    // Background Colors
    pub bg_dark: Color,
    pub bg_card: Color,
    pub bg_elevated: Color,

    // Text Colors
    pub text: Color,
    pub text_muted: Color,
    pub text_dim: Color,
}

/// Available theme names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeName {
    Default,
    Gruvbox,
    Nord,
}

impl ThemeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeName::Default => "default",
            ThemeName::Gruvbox => "gruvbox",
            ThemeName::Nord => "nord",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ThemeName::Default => "Default",
            ThemeName::Gruvbox => "Gruvbox",
            ThemeName::Nord => "Nord",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "gruvbox" | "gruvbox-dark" => ThemeName::Gruvbox,
            "nord" => ThemeName::Nord,
            _ => ThemeName::Default,
        }
    }

    pub fn all() -> &'static [ThemeName] {
        &[ThemeName::Default, ThemeName::Gruvbox, ThemeName::Nord]
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        let pos = all.iter().position(|name| name == self).unwrap_or(0);
        all[(pos + 1) % all.len()]
    }
}

/// Theme struct that holds colors and provides style methods.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,
    pub colors: ThemeColors,
}

impl Theme {
    pub fn new(name: ThemeName) -> Self {
        let colors = match name {
            ThemeName::Default => Self::default_colors(),
            ThemeName::Gruvbox => Self::gruvbox_colors(),
            ThemeName::Nord => Self::nord_colors(),
        };
        Self { name, colors }
    }

    pub fn from_name(name: &str) -> Self {
        Self::new(ThemeName::from_str(name))
    }

    fn default_colors() -> ThemeColors {
        ThemeColors {
            primary: Color::Rgb(56, 189, 248),    // Sky 400
            accent: Color::Rgb(251, 146, 60),     // Orange 400

            success: Color::Rgb(74, 222, 128),    // Green 400
            error: Color::Rgb(248, 113, 113),     // Red 400
            info: Color::Rgb(129, 140, 248),      // Indigo 400

            bg_dark: Color::Rgb(17, 24, 39),      // Gray 900
            bg_card: Color::Rgb(31, 41, 55),      // Gray 800
            bg_elevated: Color::Rgb(55, 65, 81),  // Gray 700

            text: Color::Rgb(243, 244, 246),      // Gray 100
            text_muted: Color::Rgb(156, 163, 175), // Gray 400
            text_dim: Color::Rgb(107, 114, 128),  // Gray 500
        }
    }

    fn gruvbox_colors() -> ThemeColors {
        ThemeColors {
            primary: Color::Rgb(0x83, 0xA5, 0x98),     // blue
            accent: Color::Rgb(0xFE, 0x80, 0x19),      // orange

            success: Color::Rgb(0xB8, 0xBB, 0x26),     // green
            error: Color::Rgb(0xFB, 0x49, 0x34),       // red
            info: Color::Rgb(0x8E, 0xC0, 0x7C),        // aqua

            bg_dark: Color::Rgb(0x1D, 0x20, 0x21),     // bg0_h
            bg_card: Color::Rgb(0x28, 0x28, 0x28),     // bg0
            bg_elevated: Color::Rgb(0x3C, 0x38, 0x36), // bg1

            text: Color::Rgb(0xEB, 0xDB, 0xB2),        // fg1
            text_muted: Color::Rgb(0xBD, 0xAE, 0x93),  // fg3
            text_dim: Color::Rgb(0x92, 0x83, 0x74),    // gray
        }
    }

    fn nord_colors() -> ThemeColors {
        ThemeColors {
            primary: Color::Rgb(0x88, 0xC0, 0xD0),     // nord8
            accent: Color::Rgb(0xB4, 0x8E, 0xAD),      // nord15

            success: Color::Rgb(0xA3, 0xBE, 0x8C),     // nord14
            error: Color::Rgb(0xBF, 0x61, 0x6A),       // nord11
            info: Color::Rgb(0x81, 0xA1, 0xC1),        // nord9

            bg_dark: Color::Rgb(0x2E, 0x34, 0x40),     // nord0
            bg_card: Color::Rgb(0x3B, 0x42, 0x52),     // nord1
            bg_elevated: Color::Rgb(0x43, 0x4C, 0x5E), // nord2

            text: Color::Rgb(0xEC, 0xEF, 0xF4),        // nord6
            text_muted: Color::Rgb(0xD8, 0xDE, 0xE9),  // nord4
            text_dim: Color::Rgb(0x4C, 0x56, 0x6A),    // nord3
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Styles
    // ══════════════════════════════════════════════════════════════════════

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.colors.text)
            .add_modifier(Modifier::BOLD)
    }

    pub fn card_front(&self) -> Style {
        Style::default()
            .fg(self.colors.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn card_back(&self) -> Style {
        Style::default()
            .fg(self.colors.success)
            .add_modifier(Modifier::BOLD)
    }

    /// Border for a card; the focused card gets the brand color.
    pub fn card_border(&self, focused: bool) -> Style {
        if focused {
            Style::default()
                .fg(self.colors.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.colors.text_dim)
        }
    }

    pub fn input_border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.colors.accent)
        } else {
            Style::default().fg(self.colors.text_muted)
        }
    }

    pub fn button(&self, enabled: bool) -> Style {
        if enabled {
            Style::default()
                .fg(self.colors.bg_dark)
                .bg(self.colors.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(self.colors.text_dim)
                .bg(self.colors.bg_elevated)
        }
    }

    pub fn status_progress(&self) -> Style {
        Style::default().fg(self.colors.info)
    }

    pub fn status_error(&self) -> Style {
        Style::default()
            .fg(self.colors.error)
            .add_modifier(Modifier::BOLD)
    }

    pub fn key_hint(&self) -> Style {
        Style::default()
            .fg(self.colors.text_dim)
    }

    pub fn key_highlight(&self) -> Style {
        Style::default()
            .fg(self.colors.accent)
            .add_modifier(Modifier::BOLD)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(ThemeName::Default)
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Icons
// ══════════════════════════════════════════════════════════════════════════

pub mod icons {
    pub const CARD: &str = "🃏";
    pub const SPARKLE: &str = "✨";
    pub const PRESSED: &str = "◉";
    pub const RELEASED: &str = "○";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_names_round_trip() {
        for name in ThemeName::all() {
            assert_eq!(ThemeName::from_str(name.as_str()), *name);
        }
        assert_eq!(ThemeName::from_str("unknown"), ThemeName::Default);
    }

    #[test]
    fn next_cycles_through_all_themes() {
        let start = ThemeName::Default;
        let mut name = start.next();
        let mut seen = 1;
        while name != start {
            name = name.next();
            seen += 1;
        }
        assert_eq!(seen, ThemeName::all().len());
    }

    #[test]
    fn disabled_button_is_dimmed() {
        let theme = Theme::default();
        assert_eq!(theme.button(false).fg, Some(theme.colors.text_dim));
        assert_ne!(theme.button(true), theme.button(false));
    }
}
