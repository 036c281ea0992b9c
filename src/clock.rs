//! Clock line formatting

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone};
use tracing::info;

/// A validated strftime-style pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockFormat {
    pattern: String,
}

impl ClockFormat {
    /// `None` if chrono can't render `pattern`
    pub fn parse(pattern: &str) -> Option<Self> {
        let valid = StrftimeItems::new(pattern).all(|item| !matches!(item, Item::Error));
        valid.then(|| Self {
            pattern: pattern.to_string(),
        })
    }

    /// Parse `pattern`, or fall back to `default`
    pub fn parse_or(pattern: &str, default: &str) -> Self {
        Self::parse(pattern).unwrap_or_else(|| {
            info!(format = %pattern, default, "Invalid date/time format, using fallback value instead");
            Self {
                pattern: default.to_string(),
            }
        })
    }

    #[cfg(test)]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn render<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        at.format(&self.pattern).to_string()
    }

    pub fn render_now(&self) -> String {
        self.render(&Local::now())
    }
}
