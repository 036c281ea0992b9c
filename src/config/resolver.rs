//! Resolve `clearine.conf` into a [`Configuration`]
//!
//! Every key is read with a typed accessor. A missing section, missing key
//! or a value that doesn't convert is not an error: the key keeps its default
//! and an info line is logged.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::ini::IniDocument;
use super::{Configuration, LineSettings};
use crate::constants;
use crate::xrdb::{normalize_key, ResourceDatabase, Xrdb};

/// `$HOME/.config/clearine.conf` (if `$HOME` is known) and `/etc/clearine.conf`
pub fn default_paths() -> (Option<PathBuf>, PathBuf) {
    let home = dirs::home_dir().map(|mut path| {
        path.push(constants::config::HOME_CONFIG_DIR);
        path.push(constants::config::FILENAME);
        path
    });
    (home, PathBuf::from(constants::config::SYSTEM_PATH))
}

/// Resolve from the standard locations using the live X resource database
pub fn resolve_default() -> Configuration {
    let (home, system) = default_paths();
    resolve(home.as_deref(), &system, &Xrdb::new())
}

/// Resolve configuration from the first existing of `path_home`, `path_system`
pub fn resolve(
    path_home: Option<&Path>,
    path_system: &Path,
    resources: &dyn ResourceDatabase,
) -> Configuration {
    let doc = load_document(path_home, path_system);
    let reader = Reader {
        doc: &doc,
        resources,
    };
    let defaults = Configuration::default();
    let mut config = defaults.clone();

    config.main.opacity = reader.float("main", "opacity", defaults.main.opacity);
    config.main.gap_left = reader.integer("main", "gap-left", defaults.main.gap_left);
    config.main.gap_right = reader.integer("main", "gap-right", defaults.main.gap_right);

    for (action, default) in defaults.command.iter() {
        let command = reader.string("command", action, default);
        config.command.set(action, command);
    }
    // User-added actions only need a command entry to work
    for action in doc.keys("command") {
        if defaults.command.get(action).is_none() {
            if let Some(command) = doc.get("command", action) {
                config.command.set(action, command.to_string());
            }
        }
    }

    let card = &defaults.card;
    config.card.background_color = reader.color("card", "background-color", &card.background_color);
    config.card.border_radius = reader.integer("card", "border-radius", card.border_radius);

    let button = &defaults.button;
    config.button.theme = reader.string("button", "theme", &button.theme);
    config.button.items = reader.list("button", "items", &button.items);
    config.button.label_font = reader.string("button", "label-font", &button.label_font);
    config.button.label_size = reader.integer("button", "label-size", button.label_size);
    config.button.label_color = reader.color("button", "label-color", &button.label_color);
    config.button.width = reader.integer("button", "width", button.width);
    config.button.height = reader.integer("button", "height", button.height);
    config.button.icon_width = reader.integer("button", "icon-width", button.icon_width);
    config.button.icon_height = reader.integer("button", "icon-height", button.icon_height);
    config.button.margin_top = reader.integer("button", "margin-top", button.margin_top);
    config.button.margin_bottom = reader.integer("button", "margin-bottom", button.margin_bottom);
    config.button.margin_left = reader.integer("button", "margin-left", button.margin_left);
    config.button.margin_right = reader.integer("button", "margin-right", button.margin_right);
    config.button.spacing = reader.integer("button", "spacing", button.spacing);

    config.widget.firstline = reader.line("firstline", &defaults.widget.firstline);
    config.widget.secondline = reader.line("secondline", &defaults.widget.secondline);

    config
}

fn load_document(path_home: Option<&Path>, path_system: &Path) -> IniDocument {
    let Some(path) = path_home
        .into_iter()
        .chain(std::iter::once(path_system))
        .find(|path| path.exists())
    else {
        info!("No configuration file found, using built-in defaults");
        return IniDocument::default();
    };

    match fs::read_to_string(path) {
        Ok(contents) => {
            info!(path = %path.display(), "Loaded configuration file");
            IniDocument::parse(&contents)
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Failed to read configuration file, using built-in defaults");
            IniDocument::default()
        }
    }
}

/// Where a color value should come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorSource<'a> {
    /// `#rrggbb`-style value used as written
    Literal(&'a str),
    /// `{key}` looked up in the X resource database
    Resource(&'a str),
}

impl<'a> ColorSource<'a> {
    pub fn parse(raw: &'a str) -> Option<Self> {
        if raw.starts_with('#') {
            return Some(Self::Literal(raw));
        }
        raw.strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .map(|key| Self::Resource(normalize_key(key)))
    }
}

struct Reader<'a> {
    doc: &'a IniDocument,
    resources: &'a dyn ResourceDatabase,
}

impl Reader<'_> {
    fn raw(&self, section: &str, key: &str) -> Option<&str> {
        let value = self.doc.get(section, key);
        if value.is_none() {
            if self.doc.has_section(section) {
                info!(section, key, "Key not found, using fallback value instead");
            } else {
                info!(section, key, "Section not found, using fallback value instead");
            }
        }
        value
    }

    fn string(&self, section: &str, key: &str, default: &str) -> String {
        self.raw(section, key).unwrap_or(default).to_string()
    }

    fn integer(&self, section: &str, key: &str, default: i64) -> i64 {
        let Some(raw) = self.raw(section, key) else {
            return default;
        };
        raw.parse().unwrap_or_else(|_| {
            info!(section, key, value = %raw, default, "Value is not an integer, using fallback value instead");
            default
        })
    }

    fn float(&self, section: &str, key: &str, default: f64) -> f64 {
        let Some(raw) = self.raw(section, key) else {
            return default;
        };
        raw.parse().unwrap_or_else(|_| {
            info!(section, key, value = %raw, default, "Value is not a number, using fallback value instead");
            default
        })
    }

    fn list(&self, section: &str, key: &str, default: &[String]) -> Vec<String> {
        match self.raw(section, key) {
            Some(raw) => raw.split(',').map(|item| item.trim().to_string()).collect(),
            None => default.to_vec(),
        }
    }

    fn color(&self, section: &str, key: &str, default: &str) -> String {
        let Some(raw) = self.raw(section, key) else {
            return default.to_string();
        };

        match ColorSource::parse(raw) {
            Some(ColorSource::Literal(color)) => color.to_string(),
            Some(ColorSource::Resource(name)) => match self.resources.lookup(name) {
                Ok(color) => {
                    debug!(section, key, resource = name, color = %color, "Resolved color from X resources");
                    color
                }
                Err(err) => {
                    info!(section, key, resource = name, error = %err, "Failed to resolve color resource, using fallback value instead");
                    default.to_string()
                }
            },
            None => {
                info!(section, key, value = %raw, "Color must be '#...' or '{{resource}}', using fallback value instead");
                default.to_string()
            }
        }
    }

    fn line(&self, prefix: &str, default: &LineSettings) -> LineSettings {
        LineSettings {
            font: self.string("widget", &format!("{prefix}-font"), &default.font),
            size: self.integer("widget", &format!("{prefix}-size"), default.size),
            color: self.color("widget", &format!("{prefix}-color"), &default.color),
            format: self.string("widget", &format!("{prefix}-format"), &default.format),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KEYS;
    use crate::xrdb::ResourceError;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    /// In-memory resource database that records every lookup
    #[derive(Default)]
    struct FakeResources {
        entries: HashMap<String, String>,
        requests: RefCell<Vec<String>>,
    }

    impl FakeResources {
        fn with(entries: &[(&str, &str)]) -> Self {
            Self {
                entries: entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl ResourceDatabase for FakeResources {
        fn lookup(&self, key: &str) -> Result<String, ResourceError> {
            self.requests.borrow_mut().push(key.to_string());
            self.entries
                .get(key)
                .cloned()
                .ok_or_else(|| ResourceError::NotFound(key.to_string()))
        }
    }

    fn config_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp config");
        file.write_all(contents.as_bytes()).expect("write temp config");
        file
    }

    fn resolve_str(contents: &str, resources: &FakeResources) -> Configuration {
        let file = config_file(contents);
        let missing = TempDir::new().expect("temp dir");
        resolve(Some(file.path()), &missing.path().join("none.conf"), resources)
    }

    #[test]
    fn test_no_files_yields_defaults_for_every_key() {
        let dir = TempDir::new().unwrap();
        let config = resolve(
            Some(dir.path().join("home.conf").as_path()),
            &dir.path().join("system.conf"),
            &FakeResources::default(),
        );
        let defaults = Configuration::default();
        for key in KEYS {
            assert_eq!(config.get(key), defaults.get(key), "key {key}");
        }
        assert_eq!(config.card.border_radius, 20);
        assert_eq!(config.widget.secondline.format, "%A, %d %B %Y");
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = resolve_str("", &FakeResources::default());
        assert_eq!(config, Configuration::default());
    }

    #[test]
    fn test_home_file_takes_precedence() {
        let home = config_file("[card]\nborder-radius = 4\n");
        let system = config_file("[card]\nborder-radius = 8\n");
        let config = resolve(Some(home.path()), system.path(), &FakeResources::default());
        assert_eq!(config.card.border_radius, 4);

        let dir = TempDir::new().unwrap();
        let config = resolve(
            Some(dir.path().join("missing.conf").as_path()),
            system.path(),
            &FakeResources::default(),
        );
        assert_eq!(config.card.border_radius, 8);
    }

    #[test]
    fn test_typed_values_are_read() {
        let config = resolve_str(
            "[main]\nopacity = 0.5\ngap-left = 12\n\
             [button]\ntheme = Nord\nlabel-font = Inter\nwidth = 120\nspacing = 2\n\
             [widget]\nfirstline-format = %H:%M:%S\nsecondline-size = 20\n",
            &FakeResources::default(),
        );
        assert_eq!(config.main.opacity, 0.5);
        assert_eq!(config.main.gap_left, 12);
        assert_eq!(config.main.gap_right, 50);
        assert_eq!(config.button.theme, "Nord");
        assert_eq!(config.button.label_font, "Inter");
        assert_eq!(config.button.width, 120);
        assert_eq!(config.button.spacing, 2);
        assert_eq!(config.widget.firstline.format, "%H:%M:%S");
        assert_eq!(config.widget.secondline.size, 20);
    }

    #[test]
    fn test_malformed_numbers_fall_back() {
        let config = resolve_str(
            "[card]\nborder-radius = round\n[main]\nopacity = very\n",
            &FakeResources::default(),
        );
        assert_eq!(config.card.border_radius, 20);
        assert_eq!(config.main.opacity, 0.8);
    }

    #[test]
    fn test_items_are_trimmed_in_order() {
        let config = resolve_str(
            "[button]\nitems = logout, restart,  shutdown,cancel\n",
            &FakeResources::default(),
        );
        assert_eq!(config.button.items, vec!["logout", "restart", "shutdown", "cancel"]);

        let config = resolve_str("[button]\nitems = cancel, cancel\n", &FakeResources::default());
        assert_eq!(config.button.items, vec!["cancel", "cancel"]);
    }

    #[test]
    fn test_items_continued_across_a_blank_line() {
        let config = resolve_str(
            "[button]\nitems = logout,\n\n    cancel\nspacing = 3\n",
            &FakeResources::default(),
        );
        assert_eq!(config.button.items, vec!["logout", "cancel"]);
        assert_eq!(config.button.spacing, 3);
    }

    #[test]
    fn test_literal_color_is_unchanged() {
        let resources = FakeResources::default();
        let config = resolve_str("[card]\nbackground-color = #2e3440ee\n", &resources);
        assert_eq!(config.card.background_color, "#2e3440ee");
        assert!(resources.requests.borrow().is_empty());
    }

    #[test]
    fn test_resource_color_is_looked_up() {
        let resources = FakeResources::with(&[("foreground", "#d8dee9"), ("color4", "#81a1c1")]);
        let config = resolve_str(
            "[button]\nlabel-color = {foreground}\n[widget]\nfirstline-color = {*.color4}\n",
            &resources,
        );
        assert_eq!(config.button.label_color, "#d8dee9");
        assert_eq!(config.widget.firstline.color, "#81a1c1");
        assert_eq!(*resources.requests.borrow(), vec!["foreground", "color4"]);
    }

    #[test]
    fn test_failed_resource_lookup_falls_back() {
        let resources = FakeResources::default();
        let config = resolve_str("[card]\nbackground-color = {background}\n", &resources);
        assert_eq!(config.card.background_color, "#e1e5e8");
        assert_eq!(*resources.requests.borrow(), vec!["background"]);
    }

    #[test]
    fn test_unrecognized_color_shape_falls_back() {
        let config = resolve_str("[button]\nlabel-color = red\n", &FakeResources::default());
        assert_eq!(config.button.label_color, "#101314");
    }

    #[test]
    fn test_commands_including_user_actions() {
        let config = resolve_str(
            "[command]\nlogout = openbox --exit\nsuspend = systemctl suspend\n",
            &FakeResources::default(),
        );
        assert_eq!(config.command.get("logout"), Some("openbox --exit"));
        assert_eq!(config.command.get("suspend"), Some("systemctl suspend"));
        assert_eq!(
            config.get("command.restart"),
            Configuration::default().get("command.restart")
        );
    }

    #[test]
    fn test_color_source_parse() {
        assert_eq!(ColorSource::parse("#fff"), Some(ColorSource::Literal("#fff")));
        assert_eq!(ColorSource::parse("{color1}"), Some(ColorSource::Resource("color1")));
        assert_eq!(ColorSource::parse("{.color1}"), Some(ColorSource::Resource("color1")));
        assert_eq!(ColorSource::parse("{color1"), None);
        assert_eq!(ColorSource::parse("rgb:00/00/00"), None);
    }
}
