use eframe::egui;

use crate::config::{FlickerConfig, PROMPT};
use crate::ingest::{DroppedImage, Ingestor};
use crate::state::FlickerState;
use crate::toggle::TickFeed;

const OVERLAY_ID: &str = "drop_overlay";

pub struct CropFlicker {
    // Dropping the app cancels the timer.
    ticks: Option<TickFeed>,
    state: FlickerState,
    ingestor: Ingestor,
    surface: Option<egui::TextureHandle>,
}

impl CropFlicker {
    pub fn new(cc: &eframe::CreationContext<'_>, config: FlickerConfig) -> Self {
        let ctx = cc.egui_ctx.clone();
        let ticks = match TickFeed::start(config.period, move || ctx.request_repaint()) {
            Ok(feed) => Some(feed),
            Err(e) => {
                log::error!("failed to start flicker timer: {e}");
                None
            }
        };

        let ctx = cc.egui_ctx.clone();
        let ingestor = Ingestor::new(move || ctx.request_repaint());

        Self {
            ticks,
            state: FlickerState::new(config),
            ingestor,
            surface: None,
        }
    }

    fn handle_drag_and_drop(&mut self, ctx: &egui::Context) {
        let (hovering, dropped) = ctx.input(|i| {
            (
                !i.raw.hovered_files.is_empty(),
                i.raw.dropped_files.first().map(DroppedImage::from),
            )
        });

        self.state.set_dragging(hovering);
        if let Some(file) = dropped {
            self.ingestor.submit(file);
            self.state.set_dragging(false);
        }
    }

    fn render_surface(&mut self, ctx: &egui::Context) {
        let Some(frame) = self.state.current_frame() else {
            self.surface = None;
            return;
        };

        let color_image = egui::ColorImage::from_rgba_unmultiplied(frame.size(), frame.pixels());
        match &mut self.surface {
            Some(texture) => texture.set(color_image, egui::TextureOptions::NEAREST),
            None => {
                self.surface =
                    Some(ctx.load_texture("flicker", color_image, egui::TextureOptions::NEAREST));
            }
        }
    }

    fn paint_overlay(ctx: &egui::Context) {
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new(OVERLAY_ID),
        ));
        let screen_rect = ctx.screen_rect();

        painter.rect_filled(
            screen_rect,
            0.0,
            egui::Color32::from_rgba_unmultiplied(203, 213, 225, 204),
        );
        painter.text(
            screen_rect.center(),
            egui::Align2::CENTER_CENTER,
            PROMPT,
            egui::FontId::proportional(36.0),
            egui::Color32::from_rgb(71, 85, 105),
        );
    }
}

impl eframe::App for CropFlicker {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_drag_and_drop(ctx);

        if let Some(image) = self.ingestor.poll() {
            self.state.publish(image);
        }
        self.state.advance(self.ticks.as_ref().map_or(0, TickFeed::drain));

        if self.state.take_dirty() {
            self.render_surface(ctx);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(texture) = &self.surface else {
                return;
            };

            // Painted at natural size, centred when there is room.
            let available_size = ui.available_size();
            let size = texture.size_vec2();
            let x_offset = (available_size.x - size.x) / 2.0;
            let y_offset = (available_size.y - size.y) / 2.0;
            let start_pos = ui.cursor().min + egui::vec2(x_offset.max(0.0), y_offset.max(0.0));
            let target_rect = egui::Rect::from_min_size(start_pos, size);

            ui.allocate_rect(target_rect, egui::Sense::hover());
            ui.painter_at(target_rect).image(
                texture.id(),
                target_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        });

        if self.state.overlay_visible() {
            Self::paint_overlay(ctx);
        }
    }
}
