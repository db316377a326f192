//! Terminal colors, with optional overrides from the `[theme]` config table

use ratatui::style::Color;

use crate::config::ThemeConfig;

/// Theme colors for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub accent: Color,      // Active borders, selected mode tab
    pub success: Color,     // Output panel border, info notices
    pub warning: Color,     // Warnings, spinner
    pub danger: Color,      // Error panel
    pub text: Color,        // Primary text
    pub text_dim: Color,    // Placeholders, hints
    pub inactive: Color,    // Inactive borders
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired
        Self {
            accent: Color::Rgb(250, 179, 135),
            success: Color::Rgb(166, 218, 149),
            warning: Color::Rgb(249, 226, 175),
            danger: Color::Rgb(243, 139, 168),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            inactive: Color::Rgb(88, 91, 112),
        }
    }
}

impl Theme {
    /// Defaults with any valid overrides applied. Invalid colors are logged and ignored.
    pub fn from_config(config: &ThemeConfig) -> Self {
        let mut theme = Self::default();

        let overrides = [
            ("accent", &config.accent, &mut theme.accent),
            ("success", &config.success, &mut theme.success),
            ("warning", &config.warning, &mut theme.warning),
            ("danger", &config.danger, &mut theme.danger),
            ("text", &config.text, &mut theme.text),
            ("text_dim", &config.text_dim, &mut theme.text_dim),
        ];

        for (name, value, slot) in overrides {
            if let Some(value) = value {
                match Self::parse_hex_color(value) {
                    Some(color) => *slot = color,
                    None => tracing::warn!("Ignoring invalid theme color {} = '{}'", name, value),
                }
            }
        }

        theme
    }

    /// `#RRGGBB` or `#RGB`, leading `#` optional
    pub fn parse_hex_color(s: &str) -> Option<Color> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;

        match hex.len() {
            6 => Some(Color::Rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)),
            // #abc is shorthand for #aabbcc
            3 => {
                let [r, g, b] = [8, 4, 0].map(|shift| ((value >> shift) & 0xf) as u8 * 17);
                Some(Color::Rgb(r, g, b))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(Theme::parse_hex_color("#FFC107"), Some(Color::Rgb(255, 193, 7)));
        assert_eq!(Theme::parse_hex_color("d35f5f"), Some(Color::Rgb(211, 95, 95)));
        assert_eq!(Theme::parse_hex_color("#fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(Theme::parse_hex_color("#12345"), None);
        assert_eq!(Theme::parse_hex_color("#zzzzzz"), None);
        assert_eq!(Theme::parse_hex_color("#ééé"), None);
    }

    #[test]
    fn test_overrides_apply_and_invalid_are_ignored() {
        let config = ThemeConfig {
            accent: Some("#000000".to_string()),
            danger: Some("not-a-color".to_string()),
            ..Default::default()
        };
        let theme = Theme::from_config(&config);
        assert_eq!(theme.accent, Color::Rgb(0, 0, 0));
        assert_eq!(theme.danger, Theme::default().danger);
    }
}
