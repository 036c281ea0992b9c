//! Fullscreen overlay implemented with egui/eframe

mod constants;
mod overlay;
mod widgets;

pub use overlay::run_overlay;
