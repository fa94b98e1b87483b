use eframe::egui;
use moodpaper_shared::domain::AspectRatio;

pub const GRID_COLUMNS: usize = 2;
pub const GRID_SPACING: f32 = 12.0;

/// Size of one grid cell for the given available width, keeping the wallpaper ratio.
pub fn thumbnail_size(available_width: f32) -> egui::Vec2 {
    let columns = GRID_COLUMNS as f32;
    let width = ((available_width - GRID_SPACING * (columns - 1.0)) / columns).max(32.0);
    egui::vec2(width, width / AspectRatio::Portrait9x16.ratio())
}

/// Largest size with the texture's ratio that fits into `bounds`.
pub fn fit_within(texture_size: egui::Vec2, bounds: egui::Vec2) -> egui::Vec2 {
    if texture_size.x <= 0.0 || texture_size.y <= 0.0 {
        return bounds;
    }
    let scale = (bounds.x / texture_size.x).min(bounds.y / texture_size.y);
    texture_size * scale
}

pub fn error_banner(ui: &mut egui::Ui, message: &str) {
    egui::Frame::NONE
        .fill(egui::Color32::from_rgb(111, 53, 53))
        .stroke(egui::Stroke::new(
            1.0,
            egui::Color32::from_rgb(175, 96, 96),
        ))
        .corner_radius(12.0)
        .inner_margin(egui::Margin::symmetric(12, 10))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new(message).color(egui::Color32::from_rgb(252, 202, 202)));
            });
        });
}
