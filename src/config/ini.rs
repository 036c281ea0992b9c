//! `clearine.conf` reader built on the `configparser` crate
//!
//! The crate handles sections, `=`/`:` delimiters (first one wins),
//! duplicate keys (last one wins) and multi-line values. This wrapper adds
//! what the file format needs on top:
//! - only full-line `#`/`;` comments, so `background-color = #e1e5e8` keeps
//!   its value
//! - a line continues a value only when indented deeper than its key, so a
//!   fully indented file still parses key by key
//! - keys are lower-cased, section names are matched as written
//! - malformed lines and keys outside any section are skipped with a
//!   warning instead of rejecting the file

use std::collections::HashMap;

use configparser::ini::Ini;
use tracing::warn;

/// Section the crate files keys into before the first header; a name no
/// header line can produce
const ORPHAN_SECTION: &str = "\n";

/// Parsed INI file: section name → (key → raw value)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: HashMap<String, HashMap<String, String>>,
}

impl IniDocument {
    pub fn parse(contents: &str) -> Self {
        let mut ini = Ini::new_cs();
        ini.set_comment_symbols(&[]);
        ini.set_default_section(ORPHAN_SECTION);
        ini.set_multiline(true);

        let parsed = match ini.read(normalize(contents)) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(error = %err, "Failed to parse config file, using defaults");
                return Self::default();
            }
        };

        let mut doc = Self::default();
        for (section, entries) in parsed {
            if section == ORPHAN_SECTION {
                for key in entries.keys() {
                    warn!(key = %key, "Skipping key outside of any [section]");
                }
                continue;
            }

            // Sorted so keys differing only in case resolve the same way every run
            let mut entries: Vec<_> = entries.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));

            let keys = doc.sections.entry(section.clone()).or_default();
            for (key, value) in entries {
                match value {
                    Some(value) => {
                        keys.insert(key.to_lowercase(), value);
                    }
                    None => {
                        warn!(section = %section, content = %key, "Skipping config line without '=' or ':'");
                    }
                }
            }
        }
        doc
    }

    /// Raw value of `key` in `section`
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|keys| keys.get(&key.to_lowercase()))
            .map(String::as_str)
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// All keys of `section`, sorted for stable iteration
    pub fn keys(&self, section: &str) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .sections
            .get(section)
            .map(|keys| keys.keys().map(String::as_str).collect())
            .unwrap_or_default();
        keys.sort_unstable();
        keys
    }
}

/// Rewrite the file into the shape the crate expects
///
/// Continuation lines are re-indented by one level and every other line is
/// dedented. Comment lines and lines the crate would reject are dropped.
fn normalize(contents: &str) -> String {
    let mut out = String::with_capacity(contents.len());
    let mut key_indent: Option<usize> = None;

    for (index, raw_line) in contents.lines().enumerate() {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            out.push('\n');
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let indent = raw_line.len() - raw_line.trim_start().len();
        if key_indent.is_some_and(|key| indent > key) {
            out.push_str("  ");
            out.push_str(trimmed);
            out.push('\n');
            continue;
        }

        let line = index + 1;
        if trimmed.starts_with('[') {
            if !trimmed.contains(']') {
                warn!(line, content = %trimmed, "Skipping section header without ']'");
                key_indent = None;
                continue;
            }
            key_indent = None;
        } else if trimmed.starts_with(['=', ':']) {
            warn!(line, "Skipping config line with empty key");
            key_indent = None;
            continue;
        } else {
            key_indent = Some(indent);
        }

        out.push_str(trimmed);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_and_both_delimiters() {
        let doc = IniDocument::parse(
            "[main]\nopacity = 0.5\ngap-left: 40\n\n[card]\nborder-radius=12\n",
        );
        assert_eq!(doc.get("main", "opacity"), Some("0.5"));
        assert_eq!(doc.get("main", "gap-left"), Some("40"));
        assert_eq!(doc.get("card", "border-radius"), Some("12"));
        assert_eq!(doc.get("card", "opacity"), None);
        assert!(!doc.has_section("widget"));
    }

    #[test]
    fn test_hash_in_value_is_not_a_comment() {
        let doc = IniDocument::parse(
            "[card]\n# comment line\nbackground-color = #e1e5e8\n; another\nborder-radius = 4\n",
        );
        assert_eq!(doc.get("card", "background-color"), Some("#e1e5e8"));
        assert_eq!(doc.get("card", "border-radius"), Some("4"));
        assert_eq!(doc.keys("card"), vec!["background-color", "border-radius"]);
    }

    #[test]
    fn test_first_delimiter_wins() {
        let doc = IniDocument::parse("[widget]\nfirstline-format = %H:%M\n");
        assert_eq!(doc.get("widget", "firstline-format"), Some("%H:%M"));
    }

    #[test]
    fn test_keys_are_case_insensitive_sections_are_not() {
        let doc = IniDocument::parse("[Main]\nOpacity = 0.3\n");
        assert_eq!(doc.get("Main", "opacity"), Some("0.3"));
        assert_eq!(doc.get("Main", "OPACITY"), Some("0.3"));
        assert_eq!(doc.get("main", "opacity"), None);
    }

    #[test]
    fn test_indented_file_like_the_documented_example() {
        let doc = IniDocument::parse(
            "   [command]\n     # set command\n     logout = openbox --exit\n     restart = systemctl reboot\n",
        );
        assert_eq!(doc.get("command", "logout"), Some("openbox --exit"));
        assert_eq!(doc.get("command", "restart"), Some("systemctl reboot"));
    }

    #[test]
    fn test_continuation_lines_are_joined() {
        let doc = IniDocument::parse("[button]\nitems = logout,\n    cancel\nspacing = 4\n");
        assert_eq!(doc.get("button", "items"), Some("logout,\ncancel"));
        assert_eq!(doc.get("button", "spacing"), Some("4"));
    }

    #[test]
    fn test_blank_line_does_not_end_a_continuation() {
        let doc = IniDocument::parse("[button]\nitems = a,\n\n  b\nspacing = 4\n");
        let items = doc.get("button", "items").unwrap();
        assert_eq!(items.lines().next(), Some("a,"));
        assert_eq!(items.lines().last(), Some("b"));
        assert_eq!(doc.get("button", "spacing"), Some("4"));
    }

    #[test]
    fn test_malformed_and_orphan_lines_are_skipped() {
        let doc = IniDocument::parse(
            "orphan = 1\n[main]\nnot a pair\n= no key\n[broken\nopacity = 0.1\n",
        );
        assert_eq!(doc.get("main", "opacity"), Some("0.1"));
        assert_eq!(doc.get("main", "not a pair"), None);
        assert_eq!(doc.keys("main"), vec!["opacity"]);
        assert_eq!(doc.get(ORPHAN_SECTION, "orphan"), None);
        assert!(!doc.has_section(ORPHAN_SECTION));
    }

    #[test]
    fn test_duplicate_key_last_wins_and_empty_value_kept() {
        let doc = IniDocument::parse("[command]\nlogout = a\nlogout = b\nsuspend =\n");
        assert_eq!(doc.get("command", "logout"), Some("b"));
        assert_eq!(doc.get("command", "suspend"), Some(""));
        assert_eq!(doc.keys("command"), vec!["logout", "suspend"]);
    }
}
