//! `[theme]` entries turned into a class style sheet.

use std::collections::BTreeMap;
use std::str::FromStr;

use chatree_tree::StyleSheet;
use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Style rule for one class. Colors take ratatui names (`red`,
/// `lightblue`), `#rrggbb` or a 256-color index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSpec {
    pub fg: Option<String>,
    pub bg: Option<String>,
    pub bold: bool,
    pub italic: bool,
    pub reversed: bool,
}

impl StyleSpec {
    pub fn to_style(&self, class: &str) -> Result<Style, ConfigError> {
        let color = |name: &str| {
            Color::from_str(name).map_err(|_| ConfigError::Color {
                class: class.to_string(),
                color: name.to_string(),
            })
        };

        let mut style = Style::default();
        if let Some(fg) = &self.fg {
            style = style.fg(color(fg)?);
        }
        if let Some(bg) = &self.bg {
            style = style.bg(color(bg)?);
        }
        for (on, modifier) in [
            (self.bold, Modifier::BOLD),
            (self.italic, Modifier::ITALIC),
            (self.reversed, Modifier::REVERSED),
        ] {
            if on {
                style = style.add_modifier(modifier);
            }
        }
        Ok(style)
    }
}

/// The built-in chat sheet with the configured overrides applied.
pub fn stylesheet(theme: &BTreeMap<String, StyleSpec>) -> Result<StyleSheet, ConfigError> {
    let mut sheet = chatree_chat::chat_styles();
    for (class, spec) in theme {
        sheet.set(class.clone(), spec.to_style(class)?);
    }
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_keeps_rule_order() {
        let before = chatree_chat::chat_styles();
        let mut theme = BTreeMap::new();
        theme.insert(
            "node".to_string(),
            StyleSpec {
                fg: Some("#ff0000".into()),
                italic: true,
                ..Default::default()
            },
        );
        let sheet = stylesheet(&theme).unwrap();
        assert_eq!(sheet.len(), before.len());
        assert_eq!(
            sheet.get("node"),
            Some(
                Style::default()
                    .fg(Color::Rgb(255, 0, 0))
                    .add_modifier(Modifier::ITALIC)
            )
        );
    }

    #[test]
    fn test_unknown_color_is_reported() {
        let mut theme = BTreeMap::new();
        theme.insert(
            "add-node".to_string(),
            StyleSpec {
                bg: Some("not-a-color".into()),
                ..Default::default()
            },
        );
        let err = stylesheet(&theme).unwrap_err();
        assert!(matches!(err, ConfigError::Color { ref class, .. } if class == "add-node"));
    }
}
