//! Application-wide constants
//!
//! Paths, external commands and fixed identifiers used across the overlay.

/// Configuration file locations
pub mod config {
    /// Config file name inside `$HOME/.config`
    pub const FILENAME: &str = "clearine.conf";

    /// Directory under the home directory holding the user config
    pub const HOME_CONFIG_DIR: &str = ".config";

    /// System-wide config, used when the user config is absent
    pub const SYSTEM_PATH: &str = "/etc/clearine.conf";
}

/// Icon theme search locations
pub mod themes {
    /// Theme directory under the user's home
    pub const HOME_DIR: &str = ".themes";

    /// System theme directory
    pub const SYSTEM_DIR: &str = "/usr/share/themes";

    /// Per-theme subdirectory holding the action icons
    pub const ICON_SUBDIR: &str = "clearine";

    /// Theme shipped with the package, used when nothing else matches
    pub const FALLBACK_THEME: &str = "default-clearine";
}

/// X resource database query
pub mod xrdb {
    use std::time::Duration;

    pub const PROGRAM: &str = "xrdb";
    pub const QUERY_FLAG: &str = "-query";

    /// Upper bound on how long startup waits for the query tool
    pub const QUERY_TIMEOUT: Duration = Duration::from_secs(2);
}

/// Action names with built-in meaning
pub mod actions {
    /// Closes the overlay instead of running a command
    pub const CANCEL: &str = "cancel";

    /// Shell used to run configured commands
    pub const SHELL: &str = "sh";
}
