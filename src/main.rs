#![forbid(unsafe_code)]

mod actions;
mod clock;
mod color;
mod config;
mod constants;
mod fonts;
mod gui;
mod icons;
mod style;
mod xrdb;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use actions::ButtonSpec;
use config::KEYS;
use icons::IconResolver;
use style::StyleSheet;

const CONFIG_REFERENCE: &str = "\
configuration file location:

  Clearine reads its configuration from \"~/.config/clearine.conf\".
  If that file is unavailable, \"/etc/clearine.conf\" is read instead.

configuration format:

  [main]
    # background opacity, padding left and right
    opacity = 0.8
    gap-left = 100
    gap-right = 50

  [command]
    # command launched when the button is clicked
    logout = openbox --exit
    restart = systemctl reboot
    shutdown = systemctl poweroff

  [card]
    # background color and border radius of the card
    background-color = #e1e5e8
    border-radius = 20

  [button]
    # icon theme, button order, label font, size and color
    theme = default-clearine
    items = logout, restart, shutdown, cancel
    label-font = DejaVu Sans Book
    label-size = 9
    label-color = #101314
    # button and icon size
    width = 100
    height = 70
    icon-width = 32
    icon-height = 32
    # per-button margin and spacing between buttons
    margin-top = 30
    margin-bottom = 30
    margin-left = 10
    margin-right = 10
    spacing = 10

  [widget]
    # clock lines: font, size, color and strftime format
    firstline-font = DejaVu Sans ExtraLight
    firstline-size = 90
    firstline-color = #e1e5e8
    firstline-format = %H.%M
    secondline-font = DejaVu Sans Book
    secondline-size = 14
    secondline-color = #e1e5e8
    secondline-format = %A, %d %B %Y

  Colors may also name an X resource, e.g. label-color = {foreground}.";

/// Yet another logout-window overlay for independent window managers
#[derive(Parser, Debug)]
#[command(name = "clearine", after_help = CONFIG_REFERENCE)]
struct Cli {}

fn init_logging() -> Result<()> {
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Flag raised by SIGINT; the overlay polls it and closes
fn interrupt_flag() -> Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    #[cfg(unix)]
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&flag))?;
    Ok(flag)
}

fn main() -> Result<()> {
    // Parsed first so --help and bad options exit before any setup
    let _cli = Cli::parse();
    init_logging()?;

    let interrupted = interrupt_flag()?;

    let config = config::resolve_default();
    for key in KEYS {
        if let Some(value) = config.get(key) {
            debug!(key, value = %value, "Resolved configuration");
        }
    }
    debug!(stylesheet = %StyleSheet::build(&config), "Built style sheet");

    let buttons = ButtonSpec::from_config(&config, &IconResolver::new());
    info!(
        buttons = buttons.len(),
        theme = %config.button.theme,
        "Starting overlay"
    );

    gui::run_overlay(&config, buttons, interrupted)
}
