//! Overlay buttons and what clicking them does

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::config::Configuration;
use crate::constants::actions;
use crate::icons::IconResolver;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Close the overlay
    Cancel,
    /// Run a shell command; `None` when nothing is configured for the action
    Command(Option<String>),
}

/// One button of the card, in `button.items` order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonSpec {
    pub name: String,
    pub label: String,
    pub icon: PathBuf,
    pub action: Action,
}

impl ButtonSpec {
    pub fn from_config(config: &Configuration, icons: &IconResolver) -> Vec<Self> {
        config
            .button
            .items
            .iter()
            .map(|item| item.trim())
            .filter(|name| {
                if name.is_empty() {
                    debug!("Skipping empty entry in button.items");
                }
                !name.is_empty()
            })
            .map(|name| {
                let action = if name == actions::CANCEL {
                    Action::Cancel
                } else {
                    let command = config.command.get(name).map(str::to_string);
                    if command.is_none() {
                        warn!(action = name, "No command configured for button, it will do nothing");
                    }
                    Action::Command(command)
                };
                Self {
                    name: name.to_string(),
                    label: capitalize(name),
                    icon: icons.resolve(name, &config.button.theme),
                    action,
                }
            })
            .collect()
    }
}

/// Upper-case the first character and lower-case the rest
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Start `command` through the shell without waiting for it
///
/// The child is reaped on a detached thread; its exit status is only logged.
pub fn spawn_command(command: &str) -> Result<u32> {
    let child = Command::new(actions::SHELL)
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to run command '{command}'"))?;
    let pid = child.id();
    info!(pid, command, "Started action command");
    reap(child);
    Ok(pid)
}

fn reap(mut child: Child) {
    thread::spawn(move || match child.wait() {
        Ok(status) => debug!(pid = child.id(), exit = ?status.code(), "Action command exited"),
        Err(err) => error!(pid = child.id(), error = ?err, "Failed to wait for action command"),
    });
}
