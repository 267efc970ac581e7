// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback controls: play/pause, seekable progress bar and time display.

use crate::models::playback::{format_time, Playback};

const BAR_HEIGHT: f32 = 8.0;

/// User input from the timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineAction {
    None,
    TogglePlay,
    /// Seek to a fraction of the duration in `0..=1`.
    Seek(f64),
}

/// Display the timeline. Disabled while no media is loaded.
pub fn show(ui: &mut egui::Ui, playback: Option<&Playback>) -> TimelineAction {
    let mut action = TimelineAction::None;
    let enabled = playback.is_some_and(|p| p.meta().has_frame());

    ui.horizontal(|ui| {
        ui.add_enabled_ui(enabled, |ui| {
            let playing = playback.is_some_and(|p| p.is_playing());
            let label = if playing { "⏸ Pause" } else { "▶ Play" };
            if ui.button(label).on_hover_text("Space").clicked() {
                action = TimelineAction::TogglePlay;
            }

            let (current, duration, progress) = playback
                .map(|p| (p.current_time(), p.duration(), p.progress()))
                .unwrap_or_default();
            let time_text = format!("{} / {}", format_time(current), format_time(duration));

            let bar_width = (ui.available_width() - 110.0).max(40.0);
            let (rect, response) =
                ui.allocate_exact_size(egui::vec2(bar_width, BAR_HEIGHT), egui::Sense::click_and_drag());

            let visuals = ui.style().visuals.clone();
            ui.painter()
                .rect_filled(rect, BAR_HEIGHT / 2.0, visuals.extreme_bg_color);
            let mut filled = rect;
            filled.set_width(rect.width() * progress as f32);
            ui.painter()
                .rect_filled(filled, BAR_HEIGHT / 2.0, visuals.selection.bg_fill);

            if enabled && (response.clicked() || response.dragged()) {
                if let Some(pos) = response.interact_pointer_pos() {
                    action = TimelineAction::Seek(seek_fraction(rect, pos.x));
                }
            }

            ui.monospace(time_text);
        });
    });

    action
}

/// Fraction of the bar left of `x`, clamped to `0..=1`.
fn seek_fraction(bar: egui::Rect, x: f32) -> f64 {
    if bar.width() <= 0.0 {
        return 0.0;
    }
    (((x - bar.min.x) / bar.width()) as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek_fraction_is_clamped() {
        let bar = egui::Rect::from_min_size(egui::pos2(100.0, 0.0), egui::vec2(200.0, 8.0));
        assert_eq!(seek_fraction(bar, 200.0), 0.5);
        assert_eq!(seek_fraction(bar, 50.0), 0.0);
        assert_eq!(seek_fraction(bar, 400.0), 1.0);
    }

    #[test]
    fn test_seek_fraction_on_empty_bar() {
        let bar = egui::Rect::from_min_size(egui::pos2(10.0, 0.0), egui::vec2(0.0, 8.0));
        assert_eq!(seek_fraction(bar, 10.0), 0.0);
    }
}
