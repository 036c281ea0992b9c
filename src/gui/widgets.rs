//! Card button painted with the icon above its label

use egui::{load::SizedTexture, Align2, Color32, CornerRadius, FontId, Rect, Response, Sense, StrokeKind, TextureHandle, Ui, Vec2};

use super::constants::{BUTTON_ROUNDING, HOVER_DIM, ICON_MARGIN, PRESSED_DIM};

/// Resolved look shared by every button of the card
pub struct ButtonLook {
    pub size: Vec2,
    pub icon_size: Vec2,
    pub fill: Color32,
    pub text_color: Color32,
    pub font: FontId,
}

pub fn action_button(ui: &mut Ui, icon: &TextureHandle, label: &str, look: &ButtonLook) -> Response {
    let (rect, response) = ui.allocate_exact_size(look.size, Sense::click());
    if !ui.is_rect_visible(rect) {
        return response;
    }

    let fill = if response.is_pointer_button_down_on() {
        look.fill.gamma_multiply(PRESSED_DIM)
    } else if response.hovered() || response.has_focus() {
        look.fill.gamma_multiply(HOVER_DIM)
    } else {
        look.fill
    };

    let painter = ui.painter();
    let rounding = CornerRadius::same(BUTTON_ROUNDING);
    painter.rect_filled(rect, rounding, fill);
    if response.has_focus() {
        painter.rect_stroke(rect, rounding, ui.visuals().selection.stroke, StrokeKind::Inside);
    }

    let icon_rect = Rect::from_center_size(
        egui::pos2(rect.center().x, rect.top() + ICON_MARGIN + look.icon_size.y / 2.0),
        look.icon_size,
    );
    egui::Image::from_texture(SizedTexture::from_handle(icon)).paint_at(ui, icon_rect);

    painter.text(
        egui::pos2(rect.center().x, icon_rect.bottom() + ICON_MARGIN),
        Align2::CENTER_TOP,
        label,
        look.font.clone(),
        look.text_color,
    );

    response
}
