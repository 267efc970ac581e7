// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation session state.
//!
//! All mutable annotation state lives in [`AnnotationState`] and only changes
//! through [`AnnotationState::reduce`], so the box list, the manual text
//! field, the highlight and the drag preview can never drift apart.

use super::annotation::{Point, Provenance, ProvenanceKind, Rect, MIN_BOX_SPAN};
use super::playback::VideoMeta;
use super::settings::{ProvenanceStyle, Settings, StyleTable, ZoomSettings};
use super::store::{parse_text_report, BoxStore};
use crate::util::color::Rgba;

/// Pointer drag lifecycle on the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { start: Point, current: Point },
}

/// Everything that can change the annotation state.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// New media with known native size; resets the session.
    VideoLoaded(VideoMeta),
    VideoCleared,
    SetDrawMode(bool),
    /// Pointer positions are in native video pixels.
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    PointerLeave,
    /// Change zoom by a number of configured steps.
    ZoomStep(i32),
    SetZoom(f32),
    ResetZoom,
    Highlight(Option<usize>),
    /// Frame tick in seconds, drives the highlight animation.
    Tick(f32),
    SetManualText(String),
    /// Replace the manual boxes with whatever the text field holds.
    DrawFromText,
    ImportBatch(Vec<Rect>),
    DeleteAt(usize),
    DeleteLast,
    ClearKind(ProvenanceKind),
    ClearBatch(usize),
    ClearAll,
    SetStyle(ProvenanceKind, ProvenanceStyle),
    StepFontSize(ProvenanceKind, i32),
    StepLineWidth(ProvenanceKind, i32),
    ApplySettings(Box<Settings>),
}

#[derive(Debug, Clone)]
pub struct AnnotationState {
    store: BoxStore,
    styles: StyleTable,
    zoom: f32,
    zoom_limits: ZoomSettings,
    highlight: Option<usize>,
    highlight_hue: f32,
    hue_speed: f32,
    draw_mode: bool,
    drag: DragState,
    manual_text: String,
    skipped_fragments: Vec<String>,
    video: Option<VideoMeta>,
    next_batch: usize,
    revision: u64,
}

impl Default for AnnotationState {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl AnnotationState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            store: BoxStore::new(),
            styles: settings.styles,
            zoom: 1.0,
            zoom_limits: settings.zoom,
            highlight: None,
            highlight_hue: 0.0,
            hue_speed: settings.highlight.hue_speed,
            draw_mode: false,
            drag: DragState::Idle,
            manual_text: String::new(),
            skipped_fragments: Vec::new(),
            video: None,
            next_batch: 0,
            revision: 0,
        }
    }

    pub fn store(&self) -> &BoxStore {
        &self.store
    }

    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    /// Current color of the animated highlight stroke.
    pub fn highlight_color(&self) -> Rgba {
        Rgba::from_hue(self.highlight_hue)
    }

    pub fn draw_mode(&self) -> bool {
        self.draw_mode
    }

    pub fn drag(&self) -> DragState {
        self.drag
    }

    pub fn manual_text(&self) -> &str {
        &self.manual_text
    }

    /// Fragments skipped by the last "draw from text".
    pub fn skipped_fragments(&self) -> &[String] {
        &self.skipped_fragments
    }

    pub fn video(&self) -> Option<VideoMeta> {
        self.video
    }

    /// Incremented whenever something visible changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply `action` in place.
    pub fn dispatch(&mut self, action: Action) {
        *self = std::mem::take(self).reduce(action);
    }

    /// Pure state transition.
    pub fn reduce(mut self, action: Action) -> Self {
        let visible = match action {
            Action::VideoLoaded(meta) => {
                self.reset_session();
                self.video = Some(meta);
                true
            }
            Action::VideoCleared => {
                self.reset_session();
                self.video = None;
                true
            }
            Action::SetDrawMode(on) => {
                self.draw_mode = on;
                if !on {
                    self.drag = DragState::Idle;
                }
                true
            }
            Action::PointerDown(p) => {
                let has_frame = self.video.is_some_and(|v| v.has_frame());
                if self.draw_mode && has_frame {
                    self.drag = DragState::Dragging { start: p, current: p };
                    true
                } else {
                    false
                }
            }
            Action::PointerMove(p) => match self.drag {
                DragState::Dragging { start, .. } => {
                    self.drag = DragState::Dragging { start, current: p };
                    true
                }
                DragState::Idle => false,
            },
            Action::PointerUp(end) => match std::mem::take(&mut self.drag) {
                DragState::Dragging { start, .. } => {
                    self.commit_drag(start, end);
                    true
                }
                DragState::Idle => false,
            },
            Action::PointerLeave => std::mem::take(&mut self.drag) != DragState::Idle,
            Action::ZoomStep(steps) => {
                let target = self.zoom + steps as f32 * self.zoom_limits.step;
                self.set_zoom(target)
            }
            Action::SetZoom(zoom) => self.set_zoom(zoom),
            Action::ResetZoom => self.set_zoom(1.0),
            Action::Highlight(index) => {
                let index = index.filter(|i| *i < self.store.len());
                let changed = index != self.highlight;
                self.highlight = index;
                changed
            }
            Action::Tick(dt) => {
                if self.highlight.is_some() && dt > 0.0 {
                    self.highlight_hue = (self.highlight_hue + self.hue_speed * dt).rem_euclid(360.0);
                    true
                } else {
                    false
                }
            }
            Action::SetManualText(text) => {
                self.manual_text = text;
                false
            }
            Action::DrawFromText => {
                let report = parse_text_report(&self.manual_text);
                let mut skipped = report.skipped;
                let too_small = self.store.replace_manual(report.rects);
                skipped.extend(too_small.iter().map(Rect::to_string));
                if !skipped.is_empty() {
                    log::warn!("Skipped {} coordinate fragment(s)", skipped.len());
                }
                self.skipped_fragments = skipped;
                self.highlight = None;
                true
            }
            Action::ImportBatch(rects) => {
                let batch = self.next_batch;
                self.next_batch += 1;
                let added = self.store.append_batch(rects, Provenance::Imported { batch });
                log::info!("Imported batch {} with {} boxes, total: {}", batch, added, self.store.len());
                self.sync_text();
                true
            }
            Action::DeleteAt(index) => self.delete(index),
            Action::DeleteLast => match self.store.len().checked_sub(1) {
                Some(last) => self.delete(last),
                None => false,
            },
            Action::ClearKind(kind) => {
                let removed = self.store.clear_by_provenance(kind);
                log::info!("Cleared {} {:?} boxes", removed, kind);
                self.highlight = None;
                self.sync_text();
                removed > 0
            }
            Action::ClearBatch(batch) => {
                let removed = self.store.clear_batch(batch);
                self.highlight = None;
                self.sync_text();
                removed > 0
            }
            Action::ClearAll => {
                self.store.clear_all();
                self.manual_text.clear();
                self.skipped_fragments.clear();
                self.highlight = None;
                true
            }
            Action::SetStyle(kind, style) => {
                *self.styles.get_mut(kind) = style;
                true
            }
            Action::StepFontSize(kind, steps) => {
                self.styles.get_mut(kind).step_font_size(steps);
                true
            }
            Action::StepLineWidth(kind, steps) => {
                self.styles.get_mut(kind).step_line_width(steps);
                true
            }
            Action::ApplySettings(settings) => {
                self.styles = settings.styles;
                self.zoom_limits = settings.zoom;
                self.hue_speed = settings.highlight.hue_speed;
                let zoom = self.zoom;
                self.set_zoom(zoom);
                true
            }
        };
        if visible {
            self.revision = self.revision.wrapping_add(1);
        }
        self
    }

    fn reset_session(&mut self) {
        self.store.clear_all();
        self.manual_text.clear();
        self.skipped_fragments.clear();
        self.highlight = None;
        self.drag = DragState::Idle;
        self.next_batch = 0;
    }

    fn commit_drag(&mut self, start: Point, end: Point) {
        let min = MIN_BOX_SPAN as f64;
        if (end.x - start.x).abs() < min || (end.y - start.y).abs() < min {
            log::debug!("Discarded drag smaller than {} px", MIN_BOX_SPAN);
            return;
        }
        if self.store.append(Rect::from_points(start, end), Provenance::Draw) {
            log::info!("Added drawn box, total: {}", self.store.len());
            self.sync_text();
        }
    }

    fn delete(&mut self, index: usize) -> bool {
        match self.store.delete_at(index) {
            Some(removed) => {
                log::info!("Deleted box {} ({}), total: {}", index + 1, removed.rect, self.store.len());
                self.highlight = None;
                self.sync_text();
                true
            }
            None => false,
        }
    }

    fn set_zoom(&mut self, zoom: f32) -> bool {
        let clamped = zoom.clamp(self.zoom_limits.min, self.zoom_limits.max);
        // Keep repeated 0.1 steps from accumulating float error
        let rounded = (clamped * 1000.0).round() / 1000.0;
        let changed = rounded != self.zoom;
        self.zoom = rounded;
        changed
    }

    fn sync_text(&mut self) {
        self.manual_text = self.store.to_manual_text();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn loaded() -> AnnotationState {
        AnnotationState::default().reduce(Action::VideoLoaded(VideoMeta {
            width: 1920,
            height: 1080,
            duration: 10.0,
        }))
    }

    fn drawing() -> AnnotationState {
        loaded().reduce(Action::SetDrawMode(true))
    }

    fn drag(state: AnnotationState, from: (f64, f64), to: (f64, f64)) -> AnnotationState {
        state
            .reduce(Action::PointerDown(Point::new(from.0, from.1)))
            .reduce(Action::PointerMove(Point::new(to.0, to.1)))
            .reduce(Action::PointerUp(Point::new(to.0, to.1)))
    }

    fn with_boxes(n: i32) -> AnnotationState {
        let rects = (0..n).map(|i| Rect::from_corners(i * 10, 0, i * 10 + 8, 8)).collect();
        loaded().reduce(Action::ImportBatch(rects))
    }

    #[test]
    fn test_drag_commits_draw_box() {
        let state = drag(drawing(), (300.0, 200.0), (100.5, 50.2));
        assert_eq!(state.store().len(), 1);
        let b = state.store().get(0).unwrap();
        assert_eq!(b.rect.as_array(), [101, 50, 300, 200]);
        assert_eq!(b.provenance, Provenance::Draw);
        assert_eq!(state.drag(), DragState::Idle);
    }

    #[test]
    fn test_drag_requires_draw_mode() {
        let state = drag(loaded(), (0.0, 0.0), (100.0, 100.0));
        assert!(state.store().is_empty());
    }

    #[test]
    fn test_drag_requires_video() {
        let state = AnnotationState::default().reduce(Action::SetDrawMode(true));
        let state = drag(state, (0.0, 0.0), (100.0, 100.0));
        assert!(state.store().is_empty());
    }

    #[test]
    fn test_pointer_leave_discards_drag() {
        let state = drawing()
            .reduce(Action::PointerDown(Point::new(0.0, 0.0)))
            .reduce(Action::PointerMove(Point::new(100.0, 100.0)))
            .reduce(Action::PointerLeave)
            .reduce(Action::PointerUp(Point::new(100.0, 100.0)));
        assert!(state.store().is_empty());
        assert_eq!(state.drag(), DragState::Idle);
    }

    #[test]
    fn test_move_updates_preview() {
        let state = drawing()
            .reduce(Action::PointerDown(Point::new(1.0, 2.0)))
            .reduce(Action::PointerMove(Point::new(30.0, 40.0)));
        assert_eq!(
            state.drag(),
            DragState::Dragging {
                start: Point::new(1.0, 2.0),
                current: Point::new(30.0, 40.0)
            }
        );
    }

    #[test]
    fn test_highlight_reset_on_delete() {
        let state = with_boxes(5)
            .reduce(Action::Highlight(Some(2)))
            .reduce(Action::DeleteAt(0));
        assert_eq!(state.store().len(), 4);
        assert_eq!(state.highlight(), None);
    }

    #[test]
    fn test_highlight_out_of_range_is_none() {
        let state = with_boxes(2).reduce(Action::Highlight(Some(7)));
        assert_eq!(state.highlight(), None);
    }

    #[test]
    fn test_import_skips_size_check_and_syncs_text() {
        let state = loaded()
            .reduce(Action::SetManualText("[1,1,100,100]".to_string()))
            .reduce(Action::DrawFromText)
            .reduce(Action::ImportBatch(vec![
                Rect::from_corners(5, 5, 15, 15),
                Rect::from_corners(0, 0, 1, 1),
            ]));
        assert_eq!(state.store().len(), 3);
        assert_eq!(state.store().get(2).map(|b| b.rect.as_array()), Some([0, 0, 1, 1]));
        assert_eq!(state.manual_text(), "[1,1,100,100]");
    }

    #[test]
    fn test_import_batches_are_numbered() {
        let state = loaded()
            .reduce(Action::ImportBatch(vec![Rect::from_corners(0, 0, 10, 10)]))
            .reduce(Action::ImportBatch(vec![Rect::from_corners(0, 0, 20, 20)]))
            .reduce(Action::ClearBatch(0));
        assert_eq!(state.store().len(), 1);
        assert_eq!(
            state.store().get(0).map(|b| b.provenance),
            Some(Provenance::Imported { batch: 1 })
        );
    }

    #[test]
    fn test_draw_from_text_records_skipped() {
        let state = loaded()
            .reduce(Action::SetManualText("[10,10,50,50],[bad],[60,60,100,100]".to_string()))
            .reduce(Action::DrawFromText);
        assert_eq!(state.store().count_of(ProvenanceKind::Manual), 2);
        assert_eq!(state.skipped_fragments().to_vec(), vec!["[bad]".to_string()]);
    }

    #[test]
    fn test_draw_from_text_drops_small_quads() {
        let state = loaded()
            .reduce(Action::SetManualText("[0,0,1,1],[10,10,50,50]".to_string()))
            .reduce(Action::DrawFromText);
        assert_eq!(state.store().len(), 1);
        assert_eq!(state.store().get(0).map(|b| b.rect.as_array()), Some([10, 10, 50, 50]));
        assert_eq!(state.skipped_fragments().to_vec(), vec!["[0,0,1,1]".to_string()]);
    }

    #[test]
    fn test_delete_last_and_clear_all() {
        let state = with_boxes(3).reduce(Action::DeleteLast);
        assert_eq!(state.store().len(), 2);
        let state = state.reduce(Action::ClearAll);
        assert!(state.store().is_empty());
        assert!(state.manual_text().is_empty());
        let before = state.revision();
        let state = state.reduce(Action::DeleteLast);
        assert_eq!(state.revision(), before);
    }

    #[test]
    fn test_video_change_resets_session() {
        let state = with_boxes(3)
            .reduce(Action::Highlight(Some(1)))
            .reduce(Action::VideoLoaded(VideoMeta {
                width: 640,
                height: 480,
                duration: 0.0,
            }));
        assert!(state.store().is_empty());
        assert_eq!(state.highlight(), None);
        assert_eq!(state.video().map(|v| v.width), Some(640));
    }

    #[test]
    fn test_zoom_steps_are_clamped() {
        let mut state = loaded();
        for _ in 0..3 {
            state.dispatch(Action::ZoomStep(1));
        }
        assert!((state.zoom() - 1.3).abs() < 1e-6);
        state.dispatch(Action::ZoomStep(-100));
        assert!((state.zoom() - 0.2).abs() < 1e-6);
        state.dispatch(Action::SetZoom(50.0));
        assert!((state.zoom() - 10.0).abs() < 1e-6);
        state.dispatch(Action::ResetZoom);
        assert_eq!(state.zoom(), 1.0);
    }

    #[test]
    fn test_highlight_hue_only_advances_when_highlighted() {
        let state = with_boxes(2).reduce(Action::Tick(0.5));
        let idle_color = state.highlight_color();
        let state = state.reduce(Action::Highlight(Some(0))).reduce(Action::Tick(0.5));
        assert_ne!(state.highlight_color(), idle_color);
    }

    #[test]
    fn test_style_steps_are_per_kind() {
        let state = loaded().reduce(Action::StepLineWidth(ProvenanceKind::Imported, 1));
        assert_eq!(state.styles().imported.line_width, 7.0);
        assert_eq!(state.styles().manual.line_width, 5.0);
    }

    proptest! {
        #[test]
        fn prop_small_drags_add_nothing(
            x in 0.0f64..1900.0,
            y in 0.0f64..1000.0,
            dx in -4.99f64..4.99,
            dy in -500.0f64..500.0,
            swap in any::<bool>(),
        ) {
            let (dx, dy) = if swap { (dy, dx) } else { (dx, dy) };
            let state = drag(drawing(), (x, y), (x + dx, y + dy));
            prop_assert!(state.store().is_empty());
        }
    }
}
