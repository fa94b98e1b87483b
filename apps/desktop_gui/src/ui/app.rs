use std::{
    collections::{HashMap, HashSet},
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use egui::TextureHandle;
use moodpaper_shared::domain::{AspectRatio, GeneratedImage, ImageId};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::controller::orchestration::{dispatch_backend_command, generation_command};
use crate::controller::session::{Effect, SessionController};
use crate::media::PreviewImage;
use crate::ui::widgets::{error_banner, fit_within, thumbnail_size, GRID_COLUMNS, GRID_SPACING};

const FRESH_HINT: &str = "e.g. lyrical rainy city street, pastel clouds";
const REMIX_HINT: &str = "How should it change? (e.g. darker, add falling rain)";

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub window_title: String,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            window_title: "MoodPaper".to_string(),
        }
    }
}

pub struct MoodPaperApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    session: SessionController,
    textures: HashMap<ImageId, TextureHandle>,

    status: String,
    startup_error: Option<UiError>,
    results_scroll_at: Option<Instant>,
    scroll_to_top: bool,
}

impl MoodPaperApp {
    pub fn bootstrap(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            session: SessionController::new(),
            textures: HashMap::new(),
            status: String::new(),
            startup_error: None,
            results_scroll_at: None,
            scroll_to_top: false,
        }
    }

    fn process_ui_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::GenerationSucceeded {
                    cycle,
                    images,
                    previews,
                } => {
                    for (image_id, preview) in previews {
                        self.upload_texture(ctx, image_id, &preview);
                    }
                    let effects = self.session.complete_generation(cycle, Ok(images));
                    self.prune_textures();
                    self.apply_effects(effects);
                }
                UiEvent::GenerationFailed { cycle, error } => {
                    let effects = self.session.complete_generation(cycle, Err(error));
                    self.apply_effects(effects);
                }
                UiEvent::ImageSaved { image_id, path } => {
                    tracing::info!(image_id = %image_id, path = %path.display(), "image downloaded");
                    self.status = format!("Saved to {}", path.display());
                }
                UiEvent::Error(error) => {
                    tracing::error!(
                        category = ?error.category(),
                        context = ?error.context(),
                        "{}",
                        error.message()
                    );
                    match error.context() {
                        UiErrorContext::BackendStartup => self.startup_error = Some(error),
                        UiErrorContext::Generate | UiErrorContext::Download => {
                            self.status = error.banner_text();
                        }
                    }
                }
            }
        }
    }

    fn upload_texture(&mut self, ctx: &egui::Context, image_id: ImageId, preview: &PreviewImage) {
        let color_image =
            egui::ColorImage::from_rgba_unmultiplied([preview.width, preview.height], &preview.rgba);
        let texture = ctx.load_texture(
            format!("wallpaper:{image_id}"),
            color_image,
            egui::TextureOptions::LINEAR,
        );
        self.textures.insert(image_id, texture);
    }

    /// Drops textures no longer reachable from results, reference or viewer.
    fn prune_textures(&mut self) {
        let live: HashSet<ImageId> = self
            .session
            .images()
            .iter()
            .chain(self.session.reference())
            .chain(self.session.selected())
            .map(|image| image.id)
            .collect();
        self.textures.retain(|id, _| live.contains(id));
    }

    fn apply_effects(&mut self, effects: impl IntoIterator<Item = Effect>) {
        for effect in effects {
            self.apply_effect(effect);
        }
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::DispatchGeneration(job) => {
                let cycle = job.cycle;
                if dispatch_backend_command(&self.cmd_tx, generation_command(job), &mut self.status)
                    .is_err()
                {
                    let error = UiError::from_message(UiErrorContext::Generate, self.status.clone());
                    let effects = self.session.complete_generation(cycle, Err(error));
                    self.apply_effects(effects);
                }
            }
            Effect::ScrollToResults { after } => {
                self.results_scroll_at = Some(Instant::now() + after);
            }
            Effect::ScrollToTop => {
                self.scroll_to_top = true;
            }
            Effect::Download(image) => {
                self.status = "Choose where to save the wallpaper…".to_string();
                let _ = dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::SaveImage { image },
                    &mut self.status,
                );
            }
        }
    }

    fn submit(&mut self) {
        if let Some(effect) = self.session.submit() {
            self.status.clear();
            self.apply_effect(effect);
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header")
            .frame(
                egui::Frame::NONE
                    .fill(egui::Color32::BLACK)
                    .inner_margin(egui::Margin::symmetric(20, 16)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("✨").size(22.0));
                    ui.label(
                        egui::RichText::new("MoodPaper")
                            .size(22.0)
                            .strong()
                            .color(egui::Color32::from_rgb(192, 132, 252)),
                    );
                });
            });
    }

    fn show_status_line(&mut self, ctx: &egui::Context) {
        if self.status.is_empty() {
            return;
        }
        egui::TopBottomPanel::bottom("status_line").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&self.status).small().weak());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("✕").clicked() {
                        self.status.clear();
                    }
                });
            });
        });
    }

    fn show_main(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(
                egui::Frame::NONE
                    .fill(egui::Color32::BLACK)
                    .inner_margin(egui::Margin::symmetric(16, 8)),
            )
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        if std::mem::take(&mut self.scroll_to_top) {
                            ui.scroll_to_cursor(Some(egui::Align::TOP));
                        }

                        if let Some(error) = &self.startup_error {
                            error_banner(ui, &error.banner_text());
                            ui.add_space(12.0);
                        }

                        self.show_input_section(ui);
                        ui.add_space(24.0);

                        if self.session.shows_error_banner() {
                            let text = self
                                .session
                                .last_error()
                                .map(UiError::banner_text)
                                .unwrap_or_default();
                            error_banner(ui, &text);
                            ui.add_space(16.0);
                        }

                        if !self.session.images().is_empty() {
                            self.show_results(ui);
                        }
                    });
            });
    }

    fn show_input_section(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("What mood do you want to create?").size(24.0).strong());
        ui.add_space(8.0);

        egui::Frame::NONE
            .fill(egui::Color32::from_gray(23))
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_gray(38)))
            .corner_radius(16.0)
            .inner_margin(egui::Margin::same(14))
            .show(ui, |ui| {
                self.show_remix_badge(ui);

                let hint = if self.session.is_remix_mode() {
                    REMIX_HINT
                } else {
                    FRESH_HINT
                };
                let response = ui.add(
                    egui::TextEdit::multiline(self.session.prompt_mut())
                        .hint_text(hint)
                        .desired_rows(4)
                        .desired_width(f32::INFINITY)
                        .frame(false)
                        .font(egui::TextStyle::Heading),
                );
                let submit_shortcut = response.has_focus()
                    && ui.input(|i| i.key_pressed(egui::Key::Enter) && i.modifiers.command);
                if submit_shortcut {
                    self.submit();
                }
            });

        ui.add_space(12.0);
        let label = if self.session.is_generating() {
            "Generating…"
        } else if self.session.is_remix_mode() {
            "✨ Remix"
        } else {
            "✨ Generate"
        };
        ui.horizontal(|ui| {
            let button = egui::Button::new(egui::RichText::new(label).size(18.0).strong())
                .corner_radius(24.0)
                .min_size(egui::vec2(ui.available_width() - 32.0, 48.0));
            if ui.add_enabled(self.session.can_submit(), button).clicked() {
                self.submit();
            }
            if self.session.is_generating() {
                ui.add(egui::Spinner::new());
            }
        });
    }

    fn show_remix_badge(&mut self, ui: &mut egui::Ui) {
        let Some(reference_id) = self.session.reference().map(|image| image.id) else {
            return;
        };
        let mut dismissed = false;
        egui::Frame::NONE
            .fill(egui::Color32::from_gray(38))
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_gray(64)))
            .corner_radius(8.0)
            .inner_margin(egui::Margin::same(6))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    if let Some(texture) = self.textures.get(&reference_id) {
                        ui.add(egui::Image::new(texture).fit_to_exact_size(egui::vec2(27.0, 48.0)));
                    }
                    ui.label(egui::RichText::new("Remixing this image").small());
                    if ui.small_button("✕").on_hover_text("Cancel remix").clicked() {
                        dismissed = true;
                    }
                });
            });
        ui.add_space(8.0);
        if dismissed {
            self.session.clear_reference();
        }
    }

    fn show_results(&mut self, ui: &mut egui::Ui) {
        let heading = ui
            .horizontal(|ui| {
                ui.label(egui::RichText::new("Results").size(18.0));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(format!("{} Ratio", AspectRatio::Portrait9x16))
                            .small()
                            .weak(),
                    );
                });
            })
            .response;

        if self
            .results_scroll_at
            .is_some_and(|due| Instant::now() >= due)
        {
            self.results_scroll_at = None;
            heading.scroll_to_me(Some(egui::Align::TOP));
        }

        ui.add_space(8.0);
        let cell = thumbnail_size(ui.available_width());
        let mut clicked: Option<GeneratedImage> = None;
        egui::Grid::new("results_grid")
            .num_columns(GRID_COLUMNS)
            .spacing([GRID_SPACING, GRID_SPACING])
            .show(ui, |ui| {
                for (index, image) in self.session.images().iter().enumerate() {
                    let response = match self.textures.get(&image.id) {
                        Some(texture) => ui.add(
                            egui::Image::new(texture)
                                .fit_to_exact_size(cell)
                                .sense(egui::Sense::click()),
                        ),
                        None => ui.add_sized(cell, egui::Button::new("Preview unavailable")),
                    };
                    if response.on_hover_cursor(egui::CursorIcon::PointingHand).clicked() {
                        clicked = Some(image.clone());
                    }
                    if index % GRID_COLUMNS == GRID_COLUMNS - 1 {
                        ui.end_row();
                    }
                }
            });

        if let Some(image) = clicked {
            self.session.select(&image);
        }
    }

    fn show_viewer(&mut self, ctx: &egui::Context) {
        let Some(image) = self.session.selected().cloned() else {
            return;
        };

        let mut keep_open = true;
        let mut remix = false;
        let mut download = false;
        let screen = ctx.screen_rect();
        egui::Window::new("Wallpaper")
            .open(&mut keep_open)
            .collapsible(false)
            .resizable(false)
            .title_bar(true)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .fixed_size(screen.size() * 0.92)
            .show(ctx, |ui| {
                let actions_height = 64.0;
                let bounds = ui.available_size() - egui::vec2(0.0, actions_height);
                ui.vertical_centered(|ui| match self.textures.get(&image.id) {
                    Some(texture) => {
                        let size = fit_within(texture.size_vec2(), bounds);
                        ui.add(egui::Image::new(texture).fit_to_exact_size(size));
                    }
                    None => {
                        ui.label("Preview not available.");
                    }
                });
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("🔀 Remix").clicked() {
                        remix = true;
                    }
                    if ui.button("⬇ Download").clicked() {
                        download = true;
                    }
                });
            });

        if download {
            let effect = self.session.download(&image);
            self.apply_effect(effect);
        }
        if remix {
            let effect = self.session.remix(&image);
            self.apply_effect(effect);
        } else if !keep_open {
            self.session.dismiss_selected();
        }
    }
}

impl eframe::App for MoodPaperApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events(ctx);

        self.show_header(ctx);
        self.show_status_line(ctx);
        self.show_main(ctx);
        self.show_viewer(ctx);

        let repaint_after = match self.results_scroll_at {
            Some(due) => due.saturating_duration_since(Instant::now()),
            None if self.session.is_generating() => Duration::from_millis(50),
            None => Duration::from_millis(100),
        };
        ctx.request_repaint_after(repaint_after);
    }
}
