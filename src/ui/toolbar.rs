// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with draw mode, zoom, and bulk clear controls.
//!
//! Controls stay disabled until media with a non-zero native size is loaded.

use crate::models::annotation::ProvenanceKind;
use crate::models::state::{Action, AnnotationState};

/// Display the toolbar and return the actions the user triggered.
pub fn show(ui: &mut egui::Ui, state: &AnnotationState, playing: bool) -> Vec<Action> {
    let mut actions = Vec::new();
    let has_frame = state.video().is_some_and(|v| v.has_frame());

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.add_enabled_ui(has_frame, |ui| {
            let mut draw_mode = state.draw_mode();
            if ui.toggle_value(&mut draw_mode, "▭ Draw").changed() {
                actions.push(Action::SetDrawMode(draw_mode));
            }

            ui.separator();

            ui.label("Zoom:");
            if ui.button("−").on_hover_text("Zoom out (Ctrl+wheel)").clicked() {
                actions.push(Action::ZoomStep(-1));
            }
            ui.label(format!("{:.0}%", state.zoom() * 100.0));
            if ui.button("+").on_hover_text("Zoom in (Ctrl+wheel)").clicked() {
                actions.push(Action::ZoomStep(1));
            }
            if ui.button("Reset").clicked() {
                actions.push(Action::ResetZoom);
            }
        });

        ui.separator();

        let has_boxes = !state.store().is_empty();
        ui.add_enabled_ui(has_boxes && !playing, |ui| {
            for kind in ProvenanceKind::ALL {
                let count = state.store().count_of(kind);
                let button = egui::Button::new(format!("Clear {} ({})", kind.label(), count));
                if ui.add_enabled(count > 0, button).clicked() {
                    actions.push(Action::ClearKind(kind));
                }
            }
            if ui
                .button("⟲ Delete Last")
                .on_hover_text("Delete or Ctrl+Z")
                .clicked()
            {
                actions.push(Action::DeleteLast);
            }
        });

        ui.separator();

        let hint = if !has_frame {
            "Load a video to start"
        } else if state.draw_mode() {
            "Drag on the frame to draw a box"
        } else {
            "Enable Draw to add boxes with the mouse"
        };
        ui.label(egui::RichText::new(hint).italics().weak());
    });

    actions
}
