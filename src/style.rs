//! Style rules derived from the resolved configuration
//!
//! [`StyleSheet::build`] is a pure function of the [`Configuration`]. The
//! overlay paints from the typed rules; `Display` renders the same rules as
//! CSS text, which is what gets logged at startup.

use std::fmt;

use crate::config::{Configuration, LineSettings};

/// `.clearine-button`
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonRule {
    pub background: String,
    pub color: String,
    pub font_family: String,
    pub font_size: i64,
}

/// `.clearine-card`
#[derive(Debug, Clone, PartialEq)]
pub struct CardRule {
    pub background: String,
    pub border_radius: i64,
}

/// `.clearine-widget-first` / `.clearine-widget-second`
#[derive(Debug, Clone, PartialEq)]
pub struct TextRule {
    pub color: String,
    pub font_family: String,
    pub font_size: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    pub button: ButtonRule,
    pub card: CardRule,
    pub first_line: TextRule,
    pub second_line: TextRule,
}

impl StyleSheet {
    pub fn build(config: &Configuration) -> Self {
        let text = |line: &LineSettings| TextRule {
            color: line.color.clone(),
            font_family: line.font.clone(),
            font_size: line.size,
        };

        Self {
            // Buttons sit on the card, so they share its background
            button: ButtonRule {
                background: config.card.background_color.clone(),
                color: config.button.label_color.clone(),
                font_family: config.button.label_font.clone(),
                font_size: config.button.label_size,
            },
            card: CardRule {
                background: config.card.background_color.clone(),
                border_radius: config.card.border_radius,
            },
            first_line: text(&config.widget.firstline),
            second_line: text(&config.widget.secondline),
        }
    }
}

impl fmt::Display for StyleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.button;
        writeln!(f, ".clearine-button {{")?;
        writeln!(f, "    background: {};", b.background)?;
        writeln!(f, "    color: {};", b.color)?;
        writeln!(f, "    font-family: '{}';", b.font_family)?;
        writeln!(f, "    font-size: {}px;", b.font_size)?;
        writeln!(f, "    box-shadow: none;")?;
        writeln!(f, "}}")?;

        writeln!(f, ".clearine-card {{")?;
        writeln!(f, "    background: {};", self.card.background)?;
        writeln!(f, "    border-width: 0;")?;
        writeln!(f, "    border-radius: {}px;", self.card.border_radius)?;
        writeln!(f, "}}")?;

        for (class, rule) in [
            ("clearine-widget-first", &self.first_line),
            ("clearine-widget-second", &self.second_line),
        ] {
            writeln!(f, ".{class} {{")?;
            writeln!(f, "    color: {};", rule.color)?;
            writeln!(f, "    font-family: '{}';", rule.font_family)?;
            writeln!(f, "    font-size: {}px;", rule.font_size)?;
            writeln!(f, "}}")?;
        }
        Ok(())
    }
}
