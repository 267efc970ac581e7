// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Box overlay renderer.
//!
//! Draws the annotation layer (every stored box) and the preview layer (the
//! rectangle under an active drag) in native video pixel coordinates. The
//! drawing backend is abstracted behind [`Surface`]; a missing surface makes
//! every call a no-op.

use crate::models::annotation::{AnnotatedBox, BoundsFlags, Point};
use crate::models::settings::ProvenanceStyle;
use crate::models::state::{AnnotationState, DragState};
use crate::util::color::Rgba;

const BOX_ALPHA: f32 = 0.9;
const BADGE_ALPHA: f32 = 0.85;
const BADGE_OUTLINE: f32 = 2.0;
const PREVIEW_ALPHA: f32 = 0.5;
const PREVIEW_WIDTH: f32 = 2.0;
const LABEL_GAP: f64 = 5.0;

/// How a text position relates to the drawn string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    /// Position is the left end of the baseline.
    LeftBaseline,
    Center,
}

/// A 2D drawing target addressed in native video pixels.
pub trait Surface {
    fn stroke_rect(&mut self, min: Point, max: Point, width: f32, color: Rgba);
    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba);
    fn stroke_circle(&mut self, center: Point, radius: f32, width: f32, color: Rgba);
    fn fill_text(&mut self, pos: Point, text: &str, size: f32, anchor: TextAnchor, color: Rgba);
}

/// Badge radius for a given label font size.
pub fn badge_radius(font_size: f32) -> f32 {
    (font_size * 0.7).max(10.0)
}

/// Badge text, e.g. `M3` for the third box when it was typed manually.
pub fn badge_label(annotated: &AnnotatedBox, index: usize) -> String {
    format!("{}{}", annotated.kind().letter(), index + 1)
}

/// Redraw the annotation layer. Highlighted box goes last so nothing covers it.
pub fn render_boxes(surface: Option<&mut dyn Surface>, state: &AnnotationState) {
    let Some(surface) = surface else {
        return;
    };
    let flags = state
        .video()
        .filter(|v| v.has_frame())
        .map(|v| state.store().bounds_flags(v.width, v.height));
    let highlight = state.highlight();
    let highlight_color = state.highlight_color();

    let order = state
        .store()
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != highlight)
        .chain(
            highlight
                .and_then(|i| state.store().get(i).map(|b| (i, b)))
                .into_iter(),
        );

    for (index, annotated) in order {
        let style = state.styles().get(annotated.kind());
        let bounds = flags
            .as_ref()
            .and_then(|f| f.get(index).copied())
            .unwrap_or_default();
        let accent = (Some(index) == highlight).then_some(highlight_color);
        draw_box(surface, annotated, index, style, bounds, accent);
    }
}

/// Redraw the preview layer: one translucent rectangle while dragging.
pub fn render_preview(surface: Option<&mut dyn Surface>, state: &AnnotationState) {
    let Some(surface) = surface else {
        return;
    };
    if let DragState::Dragging { start, current } = state.drag() {
        let min = Point::new(start.x.min(current.x), start.y.min(current.y));
        let max = Point::new(start.x.max(current.x), start.y.max(current.y));
        let color = state.styles().draw.stroke.with_alpha(PREVIEW_ALPHA);
        surface.stroke_rect(min, max, PREVIEW_WIDTH, color);
    }
}

fn draw_box(
    surface: &mut dyn Surface,
    annotated: &AnnotatedBox,
    index: usize,
    style: &ProvenanceStyle,
    bounds: BoundsFlags,
    accent: Option<Rgba>,
) {
    let r = annotated.rect;
    let top_left = Point::new(r.x1 as f64, r.y1 as f64);
    let bottom_right = Point::new(r.x2 as f64, r.y2 as f64);

    let stroke = accent.unwrap_or_else(|| style.stroke.with_alpha(BOX_ALPHA));
    surface.stroke_rect(top_left, bottom_right, style.line_width, stroke);

    let label_color = if bounds.any() {
        Rgba::WARNING
    } else if accent.is_some() {
        Rgba::WHITE
    } else {
        style.text
    };
    surface.fill_text(
        Point::new(top_left.x, top_left.y - LABEL_GAP),
        &format!("({},{})", r.x1, r.y1),
        style.font_size,
        TextAnchor::LeftBaseline,
        label_color,
    );
    surface.fill_text(
        Point::new(bottom_right.x, bottom_right.y + style.font_size as f64),
        &format!("({},{})", r.x2, r.y2),
        style.font_size,
        TextAnchor::LeftBaseline,
        label_color,
    );

    let center = r.center();
    let radius = badge_radius(style.font_size);
    let (fill, outline, number) = match accent {
        Some(color) => (Rgba::WHITE, color, color),
        None => (Rgba::BADGE.with_alpha(BADGE_ALPHA), Rgba::WHITE, Rgba::WHITE),
    };
    surface.fill_circle(center, radius, fill);
    surface.stroke_circle(center, radius, BADGE_OUTLINE, outline);
    surface.fill_text(
        center,
        &badge_label(annotated, index),
        style.font_size - 2.0,
        TextAnchor::Center,
        number,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::{Provenance, Rect};
    use crate::models::playback::VideoMeta;
    use crate::models::state::Action;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Rect(Point, Point, f32, Rgba),
        Circle(Point, f32, Rgba),
        Ring(Point, f32, Rgba),
        Text(Point, String, Rgba),
    }

    #[derive(Default)]
    struct Recorder {
        ops: Vec<Op>,
    }

    impl Surface for Recorder {
        fn stroke_rect(&mut self, min: Point, max: Point, width: f32, color: Rgba) {
            self.ops.push(Op::Rect(min, max, width, color));
        }
        fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba) {
            self.ops.push(Op::Circle(center, radius, color));
        }
        fn stroke_circle(&mut self, center: Point, radius: f32, _width: f32, color: Rgba) {
            self.ops.push(Op::Ring(center, radius, color));
        }
        fn fill_text(&mut self, pos: Point, text: &str, _size: f32, _anchor: TextAnchor, color: Rgba) {
            self.ops.push(Op::Text(pos, text.to_string(), color));
        }
    }

    impl Recorder {
        fn texts(&self) -> Vec<String> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Text(_, t, _) => Some(t.clone()),
                    _ => None,
                })
                .collect()
        }

        fn rects(&self) -> Vec<(Point, Point)> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Rect(a, b, _, _) => Some((*a, *b)),
                    _ => None,
                })
                .collect()
        }
    }

    fn state() -> AnnotationState {
        AnnotationState::default()
            .reduce(Action::VideoLoaded(VideoMeta {
                width: 1920,
                height: 1080,
                duration: 0.0,
            }))
            .reduce(Action::SetManualText("[10,10,50,50]".to_string()))
            .reduce(Action::DrawFromText)
            .reduce(Action::ImportBatch(vec![Rect::from_corners(-10, 0, 100, 100)]))
    }

    fn render(state: &AnnotationState) -> Recorder {
        let mut recorder = Recorder::default();
        render_boxes(Some(&mut recorder), state);
        recorder
    }

    #[test]
    fn test_box_primitives() {
        let recorder = render(&state());
        assert_eq!(
            recorder.texts(),
            vec!["(10,10)", "(50,50)", "M1", "(-10,0)", "(100,100)", "N2"]
        );
        assert_eq!(recorder.ops.len(), 12);
        assert_eq!(
            recorder.ops[3],
            Op::Circle(
                Point::new(30.0, 30.0),
                badge_radius(32.0),
                Rgba::BADGE.with_alpha(BADGE_ALPHA)
            )
        );
    }

    #[test]
    fn test_redraw_is_idempotent() {
        let s = state();
        assert_eq!(render(&s).ops, render(&s).ops);
    }

    #[test]
    fn test_highlighted_box_drawn_last() {
        let s = state().reduce(Action::Highlight(Some(0)));
        let recorder = render(&s);
        let rects = recorder.rects();
        assert_eq!(rects.last(), Some(&(Point::new(10.0, 10.0), Point::new(50.0, 50.0))));
        assert_eq!(recorder.texts().last().map(String::as_str), Some("M1"));
        match &recorder.ops[6] {
            Op::Rect(_, _, _, color) => assert_eq!(*color, s.highlight_color()),
            other => panic!("expected rect, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_bounds_labels_use_warning_color() {
        let recorder = render(&state());
        let label_color = |label: &str| {
            recorder.ops.iter().find_map(|op| match op {
                Op::Text(_, t, c) if t == label => Some(*c),
                _ => None,
            })
        };
        assert_eq!(label_color("(-10,0)"), Some(Rgba::WARNING));
        assert_eq!(label_color("(10,10)"), Some(state().styles().manual.text));
    }

    #[test]
    fn test_missing_surface_is_noop() {
        render_boxes(None, &state());
        render_preview(None, &state());
    }

    #[test]
    fn test_preview_only_while_dragging() {
        let s = state().reduce(Action::SetDrawMode(true));
        let mut recorder = Recorder::default();
        render_preview(Some(&mut recorder), &s);
        assert!(recorder.ops.is_empty());

        let s = s
            .reduce(Action::PointerDown(Point::new(200.0, 200.0)))
            .reduce(Action::PointerMove(Point::new(100.0, 150.0)));
        render_preview(Some(&mut recorder), &s);
        assert_eq!(
            recorder.ops,
            vec![Op::Rect(
                Point::new(100.0, 150.0),
                Point::new(200.0, 200.0),
                PREVIEW_WIDTH,
                s.styles().draw.stroke.with_alpha(PREVIEW_ALPHA)
            )]
        );
    }

    #[test]
    fn test_badge_label_uses_provenance_letter() {
        let b = AnnotatedBox::new(Rect::from_corners(0, 0, 10, 10), Provenance::Draw);
        assert_eq!(badge_label(&b, 4), "D5");
        assert_eq!(badge_radius(8.0), 10.0);
    }
}
