// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for video display and box annotation.
//!
//! This module shows the current video frame scaled to the panel and zoom,
//! turns pointer input into annotation actions in native pixel space, and
//! paints the annotation and preview layers on top of the frame.

use super::overlay::{self, Surface, TextAnchor};
use crate::models::annotation::Point;
use crate::models::state::{Action, AnnotationState, DragState};
use crate::util::color::Rgba;
use crate::util::geometry::{CoordinateMapper, Size, SurfaceSync};

/// egui painter adapter that draws native-pixel primitives at display scale.
struct PainterSurface<'a> {
    painter: &'a egui::Painter,
    mapper: CoordinateMapper,
}

impl PainterSurface<'_> {
    fn pos(&self, p: Point) -> egui::Pos2 {
        let c = self.mapper.to_client(p);
        egui::pos2(c.x as f32, c.y as f32)
    }

    fn scale(&self) -> f32 {
        self.mapper.display_scale_x() as f32
    }
}

impl Surface for PainterSurface<'_> {
    fn stroke_rect(&mut self, min: Point, max: Point, width: f32, color: Rgba) {
        let rect = egui::Rect::from_two_pos(self.pos(min), self.pos(max));
        let stroke = egui::Stroke::new((width * self.scale()).max(1.0), color.to_egui());
        self.painter.rect_stroke(rect, 0.0, stroke);
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba) {
        self.painter
            .circle_filled(self.pos(center), radius * self.scale(), color.to_egui());
    }

    fn stroke_circle(&mut self, center: Point, radius: f32, width: f32, color: Rgba) {
        let stroke = egui::Stroke::new((width * self.scale()).max(1.0), color.to_egui());
        self.painter
            .circle_stroke(self.pos(center), radius * self.scale(), stroke);
    }

    fn fill_text(&mut self, pos: Point, text: &str, size: f32, anchor: TextAnchor, color: Rgba) {
        let align = match anchor {
            TextAnchor::LeftBaseline => egui::Align2::LEFT_BOTTOM,
            TextAnchor::Center => egui::Align2::CENTER_CENTER,
        };
        let font = egui::FontId::proportional((size * self.scale()).max(1.0));
        self.painter
            .text(self.pos(pos), align, text, font, color.to_egui());
    }
}

/// Display the main canvas area and handle mouse interactions.
///
/// Returns the annotation actions produced by this frame's input.
pub fn show(
    ui: &mut egui::Ui,
    state: &AnnotationState,
    texture: Option<&egui::TextureHandle>,
    sync: &mut SurfaceSync,
) -> Vec<Action> {
    let mut actions = Vec::new();
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(16);

    let (Some(texture), Some(meta)) = (texture, state.video().filter(|v| v.has_frame())) else {
        show_welcome(ui);
        return actions;
    };

    let available = ui.available_size();
    sync.sync(
        meta.width,
        meta.height,
        Size::new(available.x as f64, available.y as f64),
        state.zoom(),
    );
    let display = sync.geometry().display_size();
    let display = egui::vec2(display.width as f32, display.height as f32);

    egui::ScrollArea::both()
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            let outer_size = display.max(available);
            let (outer, _) = ui.allocate_exact_size(outer_size, egui::Sense::hover());
            let offset = ((outer_size - display) / 2.0).max(egui::Vec2::ZERO);
            let image_rect = egui::Rect::from_min_size(outer.min + offset, display);

            ui.painter().image(
                texture.id(),
                image_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );

            let mapper = sync
                .geometry()
                .mapper(Point::new(image_rect.min.x as f64, image_rect.min.y as f64));
            let to_native =
                |pos: egui::Pos2| mapper.to_native(Point::new(pos.x as f64, pos.y as f64));

            let response = ui.interact(
                image_rect,
                ui.id().with("annotation_surface"),
                egui::Sense::click_and_drag(),
            );

            // Ctrl/Cmd + wheel zoom
            if response.hovered() {
                let zoom_delta = ui.input(|i| i.zoom_delta());
                if zoom_delta > 1.0 {
                    actions.push(Action::ZoomStep(1));
                } else if zoom_delta < 1.0 {
                    actions.push(Action::ZoomStep(-1));
                }
                if state.draw_mode() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
                }
            }

            if response.drag_started_by(egui::PointerButton::Primary) {
                let origin = ui
                    .input(|i| i.pointer.press_origin())
                    .or(response.interact_pointer_pos());
                if let Some(pos) = origin {
                    actions.push(Action::PointerDown(to_native(pos)));
                }
            } else if response.dragged() {
                if let Some(pos) = response.interact_pointer_pos() {
                    if image_rect.contains(pos) {
                        actions.push(Action::PointerMove(to_native(pos)));
                    } else if matches!(state.drag(), DragState::Dragging { .. }) {
                        actions.push(Action::PointerLeave);
                    }
                }
            }
            if response.drag_stopped() {
                let release = response
                    .interact_pointer_pos()
                    .or(ui.input(|i| i.pointer.latest_pos()));
                if let Some(pos) = release {
                    actions.push(Action::PointerUp(to_native(pos)));
                }
            }

            let boxes_painter = ui.painter_at(image_rect);
            let mut boxes_layer = PainterSurface {
                painter: &boxes_painter,
                mapper,
            };
            overlay::render_boxes(Some(&mut boxes_layer), state);

            let preview_painter = ui.painter_at(image_rect);
            let mut preview_layer = PainterSurface {
                painter: &preview_painter,
                mapper,
            };
            overlay::render_preview(Some(&mut preview_layer), state);
        });

    actions
}

fn show_welcome(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new("vidbox")
                    .size(32.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.label(
                egui::RichText::new("Video bounding-box annotator")
                    .size(14.0)
                    .color(egui::Color32::from_gray(150)),
            );
            ui.add_space(20.0);
            ui.label(
                egui::RichText::new("Open a video or frame to begin annotating")
                    .color(egui::Color32::from_gray(180)),
            );
            ui.add_space(10.0);
            ui.label(
                egui::RichText::new("File → Open Video...")
                    .weak()
                    .color(egui::Color32::from_gray(130)),
            );
        });
    });
}
