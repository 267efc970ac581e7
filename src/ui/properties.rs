// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Settings panel.
//!
//! This module provides the right-hand panel: media and batch sources, the
//! per-provenance style editors, manual coordinate entry and the coordinate
//! list with per-box delete and hover highlighting.

use crate::models::annotation::{BoundsFlags, ProvenanceKind};
use crate::models::settings::ProvenanceStyle;
use crate::models::state::{Action, AnnotationState};
use crate::ui::overlay::badge_label;
use crate::util::color::Rgba;
use egui::text::LayoutJob;

/// Actions emitted by the properties panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertiesAction {
    Annotation(Action),
    OpenVideoFile,
    OpenVideoUrl(String),
    ImportNpzFile,
    ImportNpzUrl(String),
}

/// Text fields owned by the app that this panel edits.
pub struct SourceInputs<'a> {
    pub video_url: &'a mut String,
    pub npz_url: &'a mut String,
}

/// Display the properties panel.
pub fn show(
    ui: &mut egui::Ui,
    state: &AnnotationState,
    inputs: SourceInputs<'_>,
    playing: bool,
    error_message: Option<&str>,
) -> Vec<PropertiesAction> {
    let mut actions = Vec::new();

    egui::ScrollArea::vertical()
        .id_source("properties_scroll")
        .show(ui, |ui| {
            ui.heading("Sources");
            ui.add_space(4.0);
            show_sources(ui, inputs, &mut actions);

            if let Some(message) = error_message {
                ui.add_space(4.0);
                ui.label(egui::RichText::new(message).color(Rgba::WARNING.to_egui()));
            }

            ui.separator();

            ui.add_enabled_ui(!playing, |ui| {
                ui.heading("Styles");
                for kind in ProvenanceKind::ALL {
                    show_style_editor(ui, kind, state.styles().get(kind), &mut actions);
                }
                ui.add_space(4.0);
                if ui.button("🗑 Clear All").clicked() {
                    actions.push(PropertiesAction::Annotation(Action::ClearAll));
                }

                ui.separator();

                ui.heading("Manual Coordinates");
                show_manual_input(ui, state, &mut actions);
            });

            ui.separator();

            ui.heading(format!("Boxes ({})", state.store().len()));
            show_box_list(ui, state, playing, &mut actions);
        });

    actions
}

fn show_sources(ui: &mut egui::Ui, inputs: SourceInputs<'_>, actions: &mut Vec<PropertiesAction>) {
    ui.horizontal(|ui| {
        ui.label("Video:");
        if ui.button("📂 File...").clicked() {
            actions.push(PropertiesAction::OpenVideoFile);
        }
    });
    ui.horizontal(|ui| {
        let edit = ui.add(
            egui::TextEdit::singleline(&mut *inputs.video_url)
                .hint_text("https://…/clip.mp4")
                .desired_width(170.0),
        );
        let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Load").clicked() || submitted {
            actions.push(PropertiesAction::OpenVideoUrl(inputs.video_url.clone()));
        }
    });

    ui.add_space(4.0);

    ui.horizontal(|ui| {
        ui.label("Boxes (.npz):");
        if ui.button("📂 File...").clicked() {
            actions.push(PropertiesAction::ImportNpzFile);
        }
    });
    ui.horizontal(|ui| {
        let edit = ui.add(
            egui::TextEdit::singleline(&mut *inputs.npz_url)
                .hint_text("https://…/boxes.npz")
                .desired_width(170.0),
        );
        let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Import").clicked() || submitted {
            actions.push(PropertiesAction::ImportNpzUrl(inputs.npz_url.clone()));
        }
    });
}

fn show_style_editor(
    ui: &mut egui::Ui,
    kind: ProvenanceKind,
    style: &ProvenanceStyle,
    actions: &mut Vec<PropertiesAction>,
) {
    egui::CollapsingHeader::new(format!("{} ({})", kind.label(), kind.letter()))
        .id_source(("style", kind.letter()))
        .default_open(kind == ProvenanceKind::Manual)
        .show(ui, |ui| {
            egui::Grid::new(("style_grid", kind.letter()))
                .num_columns(2)
                .spacing([8.0, 4.0])
                .show(ui, |ui| {
                    ui.label("Box color:");
                    let mut stroke = style.stroke.to_egui();
                    if ui.color_edit_button_srgba(&mut stroke).changed() {
                        let mut updated = *style;
                        updated.stroke = Rgba::from_egui(stroke);
                        actions.push(PropertiesAction::Annotation(Action::SetStyle(kind, updated)));
                    }
                    ui.end_row();

                    ui.label("Text color:");
                    let mut text = style.text.to_egui();
                    if ui.color_edit_button_srgba(&mut text).changed() {
                        let mut updated = *style;
                        updated.text = Rgba::from_egui(text);
                        actions.push(PropertiesAction::Annotation(Action::SetStyle(kind, updated)));
                    }
                    ui.end_row();

                    ui.label("Font size:");
                    if let Some(steps) = stepper(ui, style.font_size) {
                        actions.push(PropertiesAction::Annotation(Action::StepFontSize(kind, steps)));
                    }
                    ui.end_row();

                    ui.label("Line width:");
                    if let Some(steps) = stepper(ui, style.line_width) {
                        actions.push(PropertiesAction::Annotation(Action::StepLineWidth(kind, steps)));
                    }
                    ui.end_row();
                });
        });
}

/// `-  value  +` row. Returns the step direction when a button was clicked.
fn stepper(ui: &mut egui::Ui, value: f32) -> Option<i32> {
    let mut step = None;
    ui.horizontal(|ui| {
        if ui.small_button("−").clicked() {
            step = Some(-1);
        }
        ui.monospace(format!("{:>2.0}", value));
        if ui.small_button("+").clicked() {
            step = Some(1);
        }
    });
    step
}

fn show_manual_input(ui: &mut egui::Ui, state: &AnnotationState, actions: &mut Vec<PropertiesAction>) {
    let mut text = state.manual_text().to_string();
    let edit = ui.add(
        egui::TextEdit::multiline(&mut text)
            .hint_text("[x1,y1,x2,y2],[x1,y1,x2,y2]")
            .desired_rows(3)
            .desired_width(f32::INFINITY)
            .code_editor(),
    );
    if edit.changed() {
        actions.push(PropertiesAction::Annotation(Action::SetManualText(text)));
    }

    if ui.button("✏ Draw from input").clicked() {
        actions.push(PropertiesAction::Annotation(Action::DrawFromText));
    }

    let skipped = state.skipped_fragments();
    if !skipped.is_empty() {
        ui.label(
            egui::RichText::new(format!("Skipped: {}", skipped.join(" ")))
                .small()
                .weak(),
        );
    }
}

fn show_box_list(
    ui: &mut egui::Ui,
    state: &AnnotationState,
    playing: bool,
    actions: &mut Vec<PropertiesAction>,
) {
    let store = state.store();
    if store.is_empty() {
        ui.label(egui::RichText::new("No boxes yet").italics().weak());
        if state.highlight().is_some() {
            actions.push(PropertiesAction::Annotation(Action::Highlight(None)));
        }
        return;
    }

    let meta = state.video().filter(|v| v.has_frame());
    let flags = meta
        .map(|v| store.bounds_flags(v.width, v.height))
        .unwrap_or_default();
    let out_of_bounds = meta.map_or(0, |v| store.out_of_bounds_count(v.width, v.height));

    let mut hovered = None;
    egui::ScrollArea::vertical()
        .id_source("box_list")
        .max_height(240.0)
        .stick_to_bottom(true)
        .auto_shrink([false, true])
        .show(ui, |ui| {
            let font = egui::TextStyle::Monospace.resolve(ui.style());
            let normal = ui.visuals().text_color();
            for (index, annotated) in store.iter().enumerate() {
                let row_flags = flags.get(index).copied().unwrap_or_default();
                let row = ui.horizontal(|ui| {
                    let job = row_layout(
                        &badge_label(annotated, index),
                        annotated.rect.as_array(),
                        row_flags,
                        font.clone(),
                        normal,
                    );
                    ui.label(job);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .add_enabled(!playing, egui::Button::new("×").small())
                            .on_hover_text("Delete this box")
                            .clicked()
                        {
                            actions.push(PropertiesAction::Annotation(Action::DeleteAt(index)));
                        }
                    });
                });
                if ui.rect_contains_pointer(row.response.rect) {
                    hovered = Some(index);
                }
            }
        });

    if hovered != state.highlight() {
        actions.push(PropertiesAction::Annotation(Action::Highlight(hovered)));
    }

    if out_of_bounds > 0 {
        ui.label(
            egui::RichText::new(format!("{} box(es) extend outside the frame", out_of_bounds))
                .color(Rgba::WARNING.to_egui()),
        );
    }
}

/// `M1: [x1,y1,x2,y2]` with out-of-bounds numbers in the warning color.
fn row_layout(
    label: &str,
    coords: [i32; 4],
    flags: BoundsFlags,
    font: egui::FontId,
    normal: egui::Color32,
) -> LayoutJob {
    let plain = egui::TextFormat::simple(font.clone(), normal);
    let warning = egui::TextFormat::simple(font, Rgba::WARNING.to_egui());

    let mut job = LayoutJob::default();
    job.append(&format!("{}: [", label), 0.0, plain.clone());
    for (i, (value, out)) in coords.iter().zip(flags.0).enumerate() {
        if i > 0 {
            job.append(",", 0.0, plain.clone());
        }
        let format = if out { warning.clone() } else { plain.clone() };
        job.append(&value.to_string(), 0.0, format);
    }
    job.append("]", 0.0, plain);
    job
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_layout_colors_offending_numbers() {
        let font = egui::FontId::monospace(12.0);
        let job = row_layout(
            "N2",
            [-5, 10, 2000, 40],
            BoundsFlags([true, false, true, false]),
            font,
            egui::Color32::GRAY,
        );
        assert_eq!(job.text, "N2: [-5,10,2000,40]");
        let red: Vec<&str> = job
            .sections
            .iter()
            .filter(|s| s.format.color == Rgba::WARNING.to_egui())
            .map(|s| &job.text[s.byte_range.clone()])
            .collect();
        assert_eq!(red, vec!["-5", "2000"]);
    }
}
