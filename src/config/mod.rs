//! Configuration for the overlay
//!
//! - **ini**: tolerant reader for the `clearine.conf` file format
//! - **resolver**: typed reads with per-key defaults and `{resource}` colors
//!
//! The result is a [`Configuration`] built once at startup and passed by
//! reference to everything that needs it.

pub mod ini;
pub mod resolver;

use std::collections::BTreeMap;
use std::fmt;

pub use resolver::resolve_default;

/// Every dotted key with a documented default
pub const KEYS: &[&str] = &[
    "main.opacity",
    "main.gap-left",
    "main.gap-right",
    "command.logout",
    "command.restart",
    "command.shutdown",
    "card.background-color",
    "card.border-radius",
    "button.theme",
    "button.items",
    "button.label-font",
    "button.label-size",
    "button.label-color",
    "button.width",
    "button.height",
    "button.icon-width",
    "button.icon-height",
    "button.margin-top",
    "button.margin-bottom",
    "button.margin-left",
    "button.margin-right",
    "button.spacing",
    "widget.firstline-font",
    "widget.firstline-size",
    "widget.firstline-color",
    "widget.firstline-format",
    "widget.secondline-font",
    "widget.secondline-size",
    "widget.secondline-color",
    "widget.secondline-format",
];

mod default_commands {
    pub const LOGOUT: &str = "pkexec pkill X";

    #[cfg(target_os = "linux")]
    pub const RESTART: &str = "pkexec reboot -h now";
    #[cfg(target_os = "linux")]
    pub const SHUTDOWN: &str = "pkexec shutdown -h now";

    #[cfg(not(target_os = "linux"))]
    pub const RESTART: &str = "shutdown -r now";
    #[cfg(not(target_os = "linux"))]
    pub const SHUTDOWN: &str = "shutdown -p now";
}

/// Fully resolved overlay configuration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Configuration {
    pub main: MainSettings,
    pub command: CommandSettings,
    pub card: CardSettings,
    pub button: ButtonSettings,
    pub widget: WidgetSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MainSettings {
    /// Backdrop opacity, 0.0 - 1.0
    pub opacity: f64,
    pub gap_left: i64,
    pub gap_right: i64,
}

/// Shell commands keyed by action name
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSettings {
    commands: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardSettings {
    pub background_color: String,
    pub border_radius: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonSettings {
    pub theme: String,
    pub items: Vec<String>,
    pub label_font: String,
    pub label_size: i64,
    pub label_color: String,
    pub width: i64,
    pub height: i64,
    pub icon_width: i64,
    pub icon_height: i64,
    pub margin_top: i64,
    pub margin_bottom: i64,
    pub margin_left: i64,
    pub margin_right: i64,
    pub spacing: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSettings {
    pub firstline: LineSettings,
    pub secondline: LineSettings,
}

/// One of the two clock lines
#[derive(Debug, Clone, PartialEq)]
pub struct LineSettings {
    pub font: String,
    pub size: i64,
    pub color: String,
    /// strftime-style pattern
    pub format: String,
}

impl Default for MainSettings {
    fn default() -> Self {
        Self {
            opacity: 0.8,
            gap_left: 100,
            gap_right: 50,
        }
    }
}

impl Default for CommandSettings {
    fn default() -> Self {
        let commands = [
            ("logout", default_commands::LOGOUT),
            ("restart", default_commands::RESTART),
            ("shutdown", default_commands::SHUTDOWN),
        ]
        .into_iter()
        .map(|(name, cmd)| (name.to_string(), cmd.to_string()))
        .collect();
        Self { commands }
    }
}

impl CommandSettings {
    /// Command for `action`, if one is configured or built in
    pub fn get(&self, action: &str) -> Option<&str> {
        self.commands.get(action).map(String::as_str)
    }

    pub fn set(&mut self, action: &str, command: String) {
        self.commands.insert(action.to_string(), command);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.commands.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for CardSettings {
    fn default() -> Self {
        Self {
            background_color: "#e1e5e8".to_string(),
            border_radius: 20,
        }
    }
}

impl Default for ButtonSettings {
    fn default() -> Self {
        Self {
            theme: crate::constants::themes::FALLBACK_THEME.to_string(),
            items: ["logout", "restart", "shutdown", "cancel"]
                .into_iter()
                .map(String::from)
                .collect(),
            label_font: "DejaVu Sans Book".to_string(),
            label_size: 9,
            label_color: "#101314".to_string(),
            width: 100,
            height: 70,
            icon_width: 32,
            icon_height: 32,
            margin_top: 30,
            margin_bottom: 30,
            margin_left: 10,
            margin_right: 10,
            spacing: 10,
        }
    }
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            firstline: LineSettings {
                font: "DejaVu Sans ExtraLight".to_string(),
                size: 90,
                color: "#e1e5e8".to_string(),
                format: "%H.%M".to_string(),
            },
            secondline: LineSettings {
                font: "DejaVu Sans Book".to_string(),
                size: 14,
                color: "#e1e5e8".to_string(),
                format: "%A, %d %B %Y".to_string(),
            },
        }
    }
}

/// A single configuration value in the flat dotted-key view
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Color(String),
    List(Vec<String>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) | Value::Color(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

impl Configuration {
    /// Look up a value by dotted key, e.g. `card.border-radius`
    ///
    /// Besides [`KEYS`], any `command.<name>` present in the file resolves.
    pub fn get(&self, key: &str) -> Option<Value> {
        let string = |s: &String| Some(Value::String(s.clone()));
        let int = |i: i64| Some(Value::Integer(i));
        let color = |s: &String| Some(Value::Color(s.clone()));

        match key {
            "main.opacity" => Some(Value::Float(self.main.opacity)),
            "main.gap-left" => int(self.main.gap_left),
            "main.gap-right" => int(self.main.gap_right),
            "card.background-color" => color(&self.card.background_color),
            "card.border-radius" => int(self.card.border_radius),
            "button.theme" => string(&self.button.theme),
            "button.items" => Some(Value::List(self.button.items.clone())),
            "button.label-font" => string(&self.button.label_font),
            "button.label-size" => int(self.button.label_size),
            "button.label-color" => color(&self.button.label_color),
            "button.width" => int(self.button.width),
            "button.height" => int(self.button.height),
            "button.icon-width" => int(self.button.icon_width),
            "button.icon-height" => int(self.button.icon_height),
            "button.margin-top" => int(self.button.margin_top),
            "button.margin-bottom" => int(self.button.margin_bottom),
            "button.margin-left" => int(self.button.margin_left),
            "button.margin-right" => int(self.button.margin_right),
            "button.spacing" => int(self.button.spacing),
            "widget.firstline-font" => string(&self.widget.firstline.font),
            "widget.firstline-size" => int(self.widget.firstline.size),
            "widget.firstline-color" => color(&self.widget.firstline.color),
            "widget.firstline-format" => string(&self.widget.firstline.format),
            "widget.secondline-font" => string(&self.widget.secondline.font),
            "widget.secondline-size" => int(self.widget.secondline.size),
            "widget.secondline-color" => color(&self.widget.secondline.color),
            "widget.secondline-format" => string(&self.widget.secondline.format),
            _ => key
                .strip_prefix("command.")
                .and_then(|action| self.command.get(action))
                .map(|cmd| Value::String(cmd.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_has_a_value() {
        let config = Configuration::default();
        for key in KEYS {
            assert!(config.get(key).is_some(), "missing value for {key}");
        }
    }

    #[test]
    fn test_unknown_keys() {
        let config = Configuration::default();
        assert_eq!(config.get("card.shadow"), None);
        assert_eq!(config.get("command.suspend"), None);
        assert_eq!(config.get("opacity"), None);
    }

    #[test]
    fn test_default_commands() {
        let commands = CommandSettings::default();
        let names: Vec<&str> = commands.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["logout", "restart", "shutdown"]);
        assert_eq!(commands.get("logout"), Some("pkexec pkill X"));
        #[cfg(target_os = "linux")]
        {
            assert_eq!(commands.get("restart"), Some("pkexec reboot -h now"));
            assert_eq!(commands.get("shutdown"), Some("pkexec shutdown -h now"));
        }
    }

    #[test]
    fn test_value_display() {
        let config = Configuration::default();
        assert_eq!(config.get("main.opacity").unwrap().to_string(), "0.8");
        assert_eq!(
            config.get("button.items").unwrap().to_string(),
            "logout, restart, shutdown, cancel"
        );
        assert_eq!(config.get("card.background-color").unwrap().to_string(), "#e1e5e8");
    }
}
