//! GUI-specific constants for layout and timing

/// Clock labels refresh interval
pub const REFRESH_INTERVAL_MS: u64 = 200;

/// Space above and below the icon inside a button
pub const ICON_MARGIN: f32 = 10.0;

/// Corner rounding of a single button
pub const BUTTON_ROUNDING: u8 = 6;

/// Darkening applied to a hovered or focused button
pub const HOVER_DIM: f32 = 0.9;
pub const PRESSED_DIM: f32 = 0.8;

pub const WINDOW_TITLE: &str = "Clearine";

/// Upper bound for a rasterized icon edge
pub const MAX_ICON_SIZE: u32 = 512;
