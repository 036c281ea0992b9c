//! X resource database client
//!
//! Colors in the config may be written as `{resource-key}`; the value is then
//! taken from the user's X resources. The database is read once per process
//! via `xrdb -query`, or straight from the root window's `RESOURCE_MANAGER`
//! property when the `xrdb` binary is not installed.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{AtomEnum, ConnectionExt};

use crate::constants::xrdb;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("resource database unavailable: {0}")]
    Unavailable(String),

    #[error("resource database query timed out after {0:?}")]
    Timeout(Duration),

    #[error("resource '{0}' not found")]
    NotFound(String),
}

/// Source of `{key}` color values
pub trait ResourceDatabase {
    fn lookup(&self, key: &str) -> Result<String, ResourceError>;
}

/// Strip the `*`/`.` binding prefix the way resource names are matched
pub fn normalize_key(key: &str) -> &str {
    key.trim().trim_start_matches('*').trim_start_matches('.')
}

/// Parse `xrdb -query` output into key → value
///
/// Each line is split on `:`; the first field is the key, the second the
/// value, and anything after a further `:` is dropped. Lines with fewer than
/// two fields are skipped.
pub fn parse_query_output(output: &str) -> HashMap<String, String> {
    let mut resources = HashMap::new();
    for line in output.lines() {
        let mut fields = line.split(':');
        let (Some(key), Some(value)) = (fields.next(), fields.next()) else {
            continue;
        };
        let key = normalize_key(key);
        if key.is_empty() {
            continue;
        }
        resources.insert(key.to_string(), value.trim().to_string());
    }
    resources
}

/// Resource database backed by the `xrdb` tool
pub struct Xrdb {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    display_fallback: bool,
    cache: OnceCell<Result<HashMap<String, String>, ResourceError>>,
}

impl Xrdb {
    /// `xrdb -query`, falling back to the X server when `xrdb` is missing
    pub fn new() -> Self {
        Self {
            program: xrdb::PROGRAM.to_string(),
            args: vec![xrdb::QUERY_FLAG.to_string()],
            timeout: xrdb::QUERY_TIMEOUT,
            display_fallback: true,
            cache: OnceCell::new(),
        }
    }

    /// Query through an arbitrary command with no display fallback
    #[cfg(test)]
    pub fn with_command<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: xrdb::QUERY_TIMEOUT,
            display_fallback: false,
            cache: OnceCell::new(),
        }
    }

    #[cfg(test)]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the query and parse its output, bypassing the cache
    pub fn query(&self) -> Result<HashMap<String, String>, ResourceError> {
        let output = match self.run_command() {
            Ok(output) => output,
            Err(RunError::Launch(err)) if self.display_fallback => {
                debug!(program = %self.program, error = %err, "Query tool not available, reading RESOURCE_MANAGER from the X server");
                read_resource_manager()?
            }
            Err(RunError::Launch(err)) => {
                return Err(ResourceError::Unavailable(format!(
                    "failed to launch '{}': {err}",
                    self.program
                )));
            }
            Err(RunError::Query(err)) => return Err(err),
        };

        let resources = parse_query_output(&output);
        debug!(count = resources.len(), "Loaded X resources");
        Ok(resources)
    }

    fn run_command(&self) -> Result<String, RunError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(RunError::Launch)?;

        let mut stdout = child.stdout.take().ok_or_else(|| {
            RunError::Query(ResourceError::Unavailable(
                "query tool stdout not captured".to_string(),
            ))
        })?;

        // Read on a helper thread so a hung tool can't block startup forever
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let result = stdout.read_to_end(&mut buf).map(|_| buf);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(self.timeout) {
            Ok(Ok(bytes)) => {
                let _ = child.wait();
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            Ok(Err(err)) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(RunError::Query(ResourceError::Unavailable(format!(
                    "failed to read query output: {err}"
                ))))
            }
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(RunError::Query(ResourceError::Timeout(self.timeout)))
            }
        }
    }
}

impl Default for Xrdb {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceDatabase for Xrdb {
    fn lookup(&self, key: &str) -> Result<String, ResourceError> {
        let resources = self.cache.get_or_init(|| {
            self.query().inspect_err(|err| {
                info!(error = %err, "X resource database could not be read");
            })
        });

        let key = normalize_key(key);
        match resources {
            Ok(map) => map
                .get(key)
                .cloned()
                .ok_or_else(|| ResourceError::NotFound(key.to_string())),
            Err(err) => Err(err.clone()),
        }
    }
}

enum RunError {
    Launch(io::Error),
    Query(ResourceError),
}

/// Read the `RESOURCE_MANAGER` property of the default screen's root window
fn read_resource_manager() -> Result<String, ResourceError> {
    let (conn, screen_num) = x11rb::connect(None)
        .map_err(|err| ResourceError::Unavailable(format!("failed to connect to X11 server: {err}")))?;
    let root = conn
        .setup()
        .roots
        .get(screen_num)
        .map(|screen| screen.root)
        .ok_or_else(|| ResourceError::Unavailable(format!("screen {screen_num} not found")))?;

    let reply = conn
        .get_property(
            false,
            root,
            AtomEnum::RESOURCE_MANAGER,
            AtomEnum::STRING,
            0,
            u32::MAX,
        )
        .map_err(|err| ResourceError::Unavailable(format!("failed to query RESOURCE_MANAGER: {err}")))?
        .reply()
        .map_err(|err| ResourceError::Unavailable(format!("failed to read RESOURCE_MANAGER: {err}")))?;

    Ok(String::from_utf8_lossy(&reply.value).into_owned())
}
