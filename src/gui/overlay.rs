//! The overlay window: backdrop, clock lines and the action card

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use eframe::{egui, CreationContext, NativeOptions};
use egui::{Color32, CornerRadius, FontId, RichText, TextureHandle, TextureOptions};
use tracing::{error, info, warn};

use super::constants::*;
use super::widgets::{action_button, ButtonLook};
use crate::actions::{spawn_command, Action, ButtonSpec};
use crate::clock::ClockFormat;
use crate::color::color32_or;
use crate::config::Configuration;
use crate::fonts;
use crate::icons::load_icon;
use crate::style::{StyleSheet, TextRule};

/// Why the overlay is closing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitReason {
    Cancel,
    Escape,
    Interrupt,
}

struct ClockLine {
    format: ClockFormat,
    text: String,
    font: FontId,
    color: Color32,
}

impl ClockLine {
    fn new(format: ClockFormat, rule: &TextRule, fallback_color: &str) -> Self {
        let text = format.render_now();
        Self {
            format,
            text,
            font: FontId::new(px(rule.font_size), fonts::family(&rule.font_family)),
            color: color32_or(&rule.color, fallback_color),
        }
    }

    fn refresh(&mut self) {
        self.text = self.format.render_now();
    }
}

struct CardButton {
    spec: ButtonSpec,
    icon: TextureHandle,
}

struct OverlayApp {
    backdrop: Color32,
    gap_left: f32,
    gap_right: f32,
    card_fill: Color32,
    card_rounding: CornerRadius,
    margins: [f32; 4],
    spacing: f32,
    button_look: ButtonLook,
    buttons: Vec<CardButton>,
    first_line: ClockLine,
    second_line: ClockLine,
    last_refresh: Instant,
    interrupted: Arc<AtomicBool>,
    exit: ExitLatch,
}

/// Shutdown path shared by cancel, Escape and SIGINT; closes the viewport once
#[derive(Debug, Default)]
struct ExitLatch {
    reason: Option<ExitReason>,
}

impl ExitLatch {
    fn request(&mut self, ctx: &egui::Context, reason: ExitReason) {
        if self.reason.is_some() {
            return;
        }
        info!(reason = ?reason, "Closing overlay");
        self.reason = Some(reason);
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }
}

/// Exit asked for by input polled every frame; SIGINT is checked first
fn polled_exit(interrupted: &AtomicBool, escape_pressed: bool) -> Option<ExitReason> {
    if interrupted.load(Ordering::Relaxed) {
        Some(ExitReason::Interrupt)
    } else if escape_pressed {
        Some(ExitReason::Escape)
    } else {
        None
    }
}

/// Exit triggered by clicking a button with `action`
fn action_exit(action: &Action) -> Option<ExitReason> {
    match action {
        Action::Cancel => Some(ExitReason::Cancel),
        Action::Command(_) => None,
    }
}

impl OverlayApp {
    fn new(
        cc: &CreationContext<'_>,
        config: &Configuration,
        specs: Vec<ButtonSpec>,
        interrupted: Arc<AtomicBool>,
    ) -> Result<Self> {
        info!("Initializing overlay");
        let defaults = Configuration::default();
        let style = StyleSheet::build(config);

        cc.egui_ctx.set_fonts(fonts::font_definitions([
            style.button.font_family.as_str(),
            style.first_line.font_family.as_str(),
            style.second_line.font_family.as_str(),
        ]));

        let icon_width = icon_extent(config.button.icon_width, config.button.width);
        let icon_height = icon_extent(config.button.icon_height, config.button.height);
        let buttons = specs
            .into_iter()
            .map(|spec| {
                let image = load_icon(&spec.icon, icon_width, icon_height)
                    .with_context(|| format!("Failed to load icon for '{}'", spec.name))?;
                let icon = cc
                    .egui_ctx
                    .load_texture(format!("clearine-{}", spec.name), image, TextureOptions::LINEAR);
                Ok(CardButton { spec, icon })
            })
            .collect::<Result<Vec<_>>>()?;

        let first_line = ClockLine::new(
            ClockFormat::parse_or(&config.widget.firstline.format, &defaults.widget.firstline.format),
            &style.first_line,
            &defaults.widget.firstline.color,
        );
        let second_line = ClockLine::new(
            ClockFormat::parse_or(&config.widget.secondline.format, &defaults.widget.secondline.format),
            &style.second_line,
            &defaults.widget.secondline.color,
        );

        let opacity = config.main.opacity.clamp(0.0, 1.0);
        let card_fill = color32_or(&style.card.background, &defaults.card.background_color);

        Ok(Self {
            backdrop: Color32::from_black_alpha((opacity * 255.0).round() as u8),
            gap_left: px(config.main.gap_left),
            gap_right: px(config.main.gap_right),
            card_fill,
            card_rounding: CornerRadius::same(style.card.border_radius.clamp(0, u8::MAX as i64) as u8),
            margins: [
                px(config.button.margin_top),
                px(config.button.margin_bottom),
                px(config.button.margin_left),
                px(config.button.margin_right),
            ],
            spacing: px(config.button.spacing),
            button_look: ButtonLook {
                size: egui::vec2(px(config.button.width), px(config.button.height)),
                icon_size: egui::vec2(icon_width as f32, icon_height as f32),
                fill: color32_or(&style.button.background, &defaults.card.background_color),
                text_color: color32_or(&style.button.color, &defaults.button.label_color),
                font: FontId::new(px(style.button.font_size), fonts::family(&style.button.font_family)),
            },
            buttons,
            first_line,
            second_line,
            last_refresh: Instant::now(),
            interrupted,
            exit: ExitLatch::default(),
        })
    }

    fn activate(&mut self, ctx: &egui::Context, index: usize) {
        let Some(spec) = self.buttons.get(index).map(|button| &button.spec) else {
            return;
        };
        if let Some(reason) = action_exit(&spec.action) {
            self.exit.request(ctx, reason);
            return;
        }
        match &spec.action {
            Action::Command(Some(command)) => {
                info!(action = %spec.name, "Button clicked");
                if let Err(err) = spawn_command(command) {
                    error!(action = %spec.name, error = ?err, "Failed to run action command");
                }
            }
            Action::Command(None) => {
                warn!(action = %spec.name, "Button clicked but no command is configured");
            }
            Action::Cancel => {}
        }
    }

    fn refresh_clock(&mut self) {
        if self.last_refresh.elapsed() < Duration::from_millis(REFRESH_INTERVAL_MS) {
            return;
        }
        self.last_refresh = Instant::now();
        self.first_line.refresh();
        self.second_line.refresh();
    }

    fn show_clock(&self, ui: &mut egui::Ui) {
        ui.vertical(|ui| {
            for line in [&self.first_line, &self.second_line] {
                ui.label(RichText::new(&line.text).font(line.font.clone()).color(line.color));
            }
        });
    }

    /// Draws the card; returns the index of a clicked button
    fn show_card(&self, ui: &mut egui::Ui) -> Option<usize> {
        let [top, bottom, left, right] = self.margins;
        let mut clicked = None;

        egui::Frame::new()
            .fill(self.card_fill)
            .corner_radius(self.card_rounding)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.add_space(top);
                    ui.horizontal(|ui| {
                        ui.add_space(left);
                        ui.vertical(|ui| {
                            ui.spacing_mut().item_spacing.y = self.spacing;
                            for (index, button) in self.buttons.iter().enumerate() {
                                let response = action_button(
                                    ui,
                                    &button.icon,
                                    &button.spec.label,
                                    &self.button_look,
                                );
                                if response.clicked() {
                                    clicked = Some(index);
                                }
                            }
                        });
                        ui.add_space(right);
                    });
                    ui.add_space(bottom);
                });
            });

        clicked
    }
}

impl eframe::App for OverlayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let escape_pressed = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        if let Some(reason) = polled_exit(&self.interrupted, escape_pressed) {
            self.exit.request(ctx, reason);
        }
        self.refresh_clock();

        let mut clicked = None;
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let screen = ui.max_rect();
                ui.painter().rect_filled(screen, CornerRadius::ZERO, self.backdrop);

                let mut content = screen;
                content.min.x += self.gap_left;
                content.max.x -= self.gap_right;

                ui.scope_builder(
                    egui::UiBuilder::new()
                        .max_rect(content)
                        .layout(egui::Layout::left_to_right(egui::Align::Center)),
                    |ui| self.show_clock(ui),
                );
                ui.scope_builder(
                    egui::UiBuilder::new()
                        .max_rect(content)
                        .layout(egui::Layout::right_to_left(egui::Align::Center)),
                    |ui| clicked = self.show_card(ui),
                );
            });

        if let Some(index) = clicked {
            self.activate(ctx, index);
        }

        ctx.request_repaint_after(Duration::from_millis(REFRESH_INTERVAL_MS));
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        [0.0, 0.0, 0.0, 0.0]
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Overlay exiting");
    }
}

/// Config integers are pixel counts; negative values collapse to zero
fn px(value: i64) -> f32 {
    value.max(0) as f32
}

/// Icon edge in pixels: at least 1, at most the button edge and
/// [`MAX_ICON_SIZE`]
fn icon_extent(requested: i64, button: i64) -> u32 {
    let limit = u32::try_from(button.max(1))
        .unwrap_or(u32::MAX)
        .min(MAX_ICON_SIZE);
    u32::try_from(requested.max(1)).unwrap_or(u32::MAX).min(limit)
}

/// Open the overlay and block until it is closed
pub fn run_overlay(
    config: &Configuration,
    buttons: Vec<ButtonSpec>,
    interrupted: Arc<AtomicBool>,
) -> Result<()> {
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_fullscreen(true)
            .with_decorations(false)
            .with_transparent(true)
            .with_window_level(egui::WindowLevel::AlwaysOnTop),
        ..Default::default()
    };

    let config = config.clone();
    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(OverlayApp::new(cc, &config, buttons, interrupted)?))),
    )
    .map_err(|err| anyhow!("Failed to run overlay: {err}"))
}
