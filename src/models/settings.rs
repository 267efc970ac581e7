// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application settings.
//!
//! Per-provenance drawing styles, zoom limits and import options. Loaded from
//! YAML or JSON by [`crate::io::serialization`]; every field has a default so
//! partial files are accepted.

use super::annotation::ProvenanceKind;
use crate::util::color::Rgba;
use serde::{Deserialize, Serialize};

pub const FONT_SIZE_MIN: f32 = 12.0;
pub const FONT_SIZE_MAX: f32 = 48.0;
pub const FONT_SIZE_STEP: f32 = 4.0;
pub const LINE_WIDTH_MIN: f32 = 1.0;
pub const LINE_WIDTH_MAX: f32 = 10.0;
pub const LINE_WIDTH_STEP: f32 = 2.0;

/// Drawing style for one provenance kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvenanceStyle {
    pub stroke: Rgba,
    pub text: Rgba,
    pub font_size: f32,
    pub line_width: f32,
}

impl Default for ProvenanceStyle {
    fn default() -> Self {
        Self {
            stroke: Rgba::rgb(0xDA, 0x10, 0x10),
            text: Rgba::rgb(0x22, 0xD3, 0xEE),
            font_size: 32.0,
            line_width: 5.0,
        }
    }
}

impl ProvenanceStyle {
    /// Step the font size by `steps` increments, staying within bounds.
    pub fn step_font_size(&mut self, steps: i32) {
        self.font_size =
            (self.font_size + steps as f32 * FONT_SIZE_STEP).clamp(FONT_SIZE_MIN, FONT_SIZE_MAX);
    }

    /// Step the line width by `steps` increments, staying within bounds.
    pub fn step_line_width(&mut self, steps: i32) {
        self.line_width = (self.line_width + steps as f32 * LINE_WIDTH_STEP)
            .clamp(LINE_WIDTH_MIN, LINE_WIDTH_MAX);
    }

    fn clamped(mut self) -> Self {
        self.font_size = self.font_size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX);
        self.line_width = self.line_width.clamp(LINE_WIDTH_MIN, LINE_WIDTH_MAX);
        self
    }
}

/// Style lookup table indexed by provenance kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleTable {
    pub manual: ProvenanceStyle,
    pub draw: ProvenanceStyle,
    pub imported: ProvenanceStyle,
}

impl Default for StyleTable {
    fn default() -> Self {
        Self {
            manual: ProvenanceStyle::default(),
            draw: ProvenanceStyle {
                stroke: Rgba::rgb(0x22, 0xC5, 0x5E),
                ..ProvenanceStyle::default()
            },
            imported: ProvenanceStyle {
                stroke: Rgba::rgb(0xF5, 0x9E, 0x0B),
                text: Rgba::rgb(0xFD, 0xE6, 0x8A),
                ..ProvenanceStyle::default()
            },
        }
    }
}

impl StyleTable {
    pub fn get(&self, kind: ProvenanceKind) -> &ProvenanceStyle {
        match kind {
            ProvenanceKind::Manual => &self.manual,
            ProvenanceKind::Draw => &self.draw,
            ProvenanceKind::Imported => &self.imported,
        }
    }

    pub fn get_mut(&mut self, kind: ProvenanceKind) -> &mut ProvenanceStyle {
        match kind {
            ProvenanceKind::Manual => &mut self.manual,
            ProvenanceKind::Draw => &mut self.draw,
            ProvenanceKind::Imported => &mut self.imported,
        }
    }
}

/// Zoom factor limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    pub min: f32,
    pub max: f32,
    /// Change per wheel notch.
    pub step: f32,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            min: 0.2,
            max: 10.0,
            step: 0.1,
        }
    }
}

/// Batch import options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Entry name inside the `.npz` archive holding the N x 4 box matrix.
    pub entry_name: String,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            entry_name: "crop_box.npy".to_string(),
        }
    }
}

/// Highlight animation options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightSettings {
    /// Hue rotation speed in degrees per second.
    pub hue_speed: f32,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self { hue_speed: 180.0 }
    }
}

/// Complete settings document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub styles: StyleTable,
    pub zoom: ZoomSettings,
    pub import: ImportSettings,
    pub highlight: HighlightSettings,
}

impl Settings {
    /// Repair values a hand-edited file may have put out of range.
    pub fn sanitized(mut self) -> Self {
        for kind in ProvenanceKind::ALL {
            let style = self.styles.get_mut(kind);
            *style = style.clamped();
        }
        let defaults = ZoomSettings::default();
        if !(self.zoom.min > 0.0 && self.zoom.min <= self.zoom.max) {
            log::warn!(
                "Invalid zoom range {}..{}, using defaults",
                self.zoom.min,
                self.zoom.max
            );
            self.zoom.min = defaults.min;
            self.zoom.max = defaults.max;
        }
        if !(self.zoom.step > 0.0) {
            self.zoom.step = defaults.step;
        }
        if self.import.entry_name.trim().is_empty() {
            self.import.entry_name = ImportSettings::default().entry_name;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_size_steps_are_clamped() {
        let mut style = ProvenanceStyle::default();
        style.step_font_size(10);
        assert_eq!(style.font_size, FONT_SIZE_MAX);
        style.step_font_size(-1);
        assert_eq!(style.font_size, 44.0);
        style.step_font_size(-100);
        assert_eq!(style.font_size, FONT_SIZE_MIN);
    }

    #[test]
    fn test_line_width_steps_are_clamped() {
        let mut style = ProvenanceStyle::default();
        style.step_line_width(1);
        assert_eq!(style.line_width, 7.0);
        style.step_line_width(5);
        assert_eq!(style.line_width, LINE_WIDTH_MAX);
        style.step_line_width(-10);
        assert_eq!(style.line_width, LINE_WIDTH_MIN);
    }

    #[test]
    fn test_style_lookup_is_per_kind() {
        let mut table = StyleTable::default();
        table.get_mut(ProvenanceKind::Draw).line_width = 9.0;
        assert_eq!(table.get(ProvenanceKind::Draw).line_width, 9.0);
        assert_eq!(table.get(ProvenanceKind::Manual).line_width, 5.0);
        assert_ne!(table.manual.stroke, table.imported.stroke);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "styles:\n  draw:\n    stroke: '#00FF00'\nzoom:\n  max: 4.0\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.styles.draw.stroke, Rgba::rgb(0, 255, 0));
        assert_eq!(settings.styles.draw.font_size, 32.0);
        assert_eq!(settings.zoom.max, 4.0);
        assert_eq!(settings.zoom.min, 0.2);
        assert_eq!(settings.import.entry_name, "crop_box.npy");
    }

    #[test]
    fn test_sanitized_repairs_ranges() {
        let mut settings = Settings::default();
        settings.styles.manual.font_size = 500.0;
        settings.zoom.min = 5.0;
        settings.zoom.max = 1.0;
        settings.zoom.step = 0.0;
        settings.import.entry_name = "  ".to_string();
        let fixed = settings.sanitized();
        assert_eq!(fixed.styles.manual.font_size, FONT_SIZE_MAX);
        assert_eq!(fixed.zoom, ZoomSettings::default());
        assert_eq!(fixed.import.entry_name, "crop_box.npy");
    }
}
