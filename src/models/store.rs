// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Ordered box storage and the manual coordinate text format.
//!
//! Indices are positional: the box at index `i` is displayed as number `i + 1`
//! and deleting a box shifts every later box down by one.

use super::annotation::{AnnotatedBox, BoundsFlags, Provenance, ProvenanceKind, Rect};
use regex::Regex;
use std::sync::OnceLock;

/// Ordered collection of annotated boxes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxStore {
    boxes: Vec<AnnotatedBox>,
}

impl BoxStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AnnotatedBox> {
        self.boxes.get(index)
    }

    #[cfg(test)]
    pub(crate) fn boxes(&self) -> &[AnnotatedBox] {
        &self.boxes
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnnotatedBox> {
        self.boxes.iter()
    }

    /// Append one box. Degenerate rectangles are dropped and `false` returned.
    pub fn append(&mut self, rect: Rect, provenance: Provenance) -> bool {
        if rect.is_degenerate() {
            log::debug!("Rejected degenerate box {}", rect);
            return false;
        }
        self.boxes.push(AnnotatedBox::new(rect, provenance));
        true
    }

    /// Append many boxes in order. Batches skip the size check.
    pub fn append_batch<I>(&mut self, rects: I, provenance: Provenance) -> usize
    where
        I: IntoIterator<Item = Rect>,
    {
        let before = self.boxes.len();
        self.boxes
            .extend(rects.into_iter().map(|r| AnnotatedBox::new(r, provenance)));
        self.boxes.len() - before
    }

    /// Drop every manual box and append `rects` as the new manual set.
    ///
    /// Degenerate rectangles are not stored; they are returned in input order.
    pub fn replace_manual<I>(&mut self, rects: I) -> Vec<Rect>
    where
        I: IntoIterator<Item = Rect>,
    {
        self.clear_by_provenance(ProvenanceKind::Manual);
        let mut rejected = Vec::new();
        for rect in rects {
            if !self.append(rect, Provenance::Manual) {
                rejected.push(rect);
            }
        }
        rejected
    }

    /// Remove the box at `index`. Out-of-range indices are ignored.
    pub fn delete_at(&mut self, index: usize) -> Option<AnnotatedBox> {
        if index < self.boxes.len() {
            Some(self.boxes.remove(index))
        } else {
            None
        }
    }

    /// Remove every box of the given kind, keeping the others in order.
    pub fn clear_by_provenance(&mut self, kind: ProvenanceKind) -> usize {
        let before = self.boxes.len();
        self.boxes.retain(|b| b.kind() != kind);
        before - self.boxes.len()
    }

    /// Remove the boxes of a single import batch.
    pub fn clear_batch(&mut self, batch: usize) -> usize {
        let before = self.boxes.len();
        self.boxes
            .retain(|b| b.provenance != Provenance::Imported { batch });
        before - self.boxes.len()
    }

    pub fn clear_all(&mut self) {
        self.boxes.clear();
    }

    pub fn count_of(&self, kind: ProvenanceKind) -> usize {
        self.boxes.iter().filter(|b| b.kind() == kind).count()
    }

    /// Serialize the manual boxes as `[x1,y1,x2,y2],[...]` in store order.
    pub fn to_manual_text(&self) -> String {
        self.boxes
            .iter()
            .filter(|b| b.kind() == ProvenanceKind::Manual)
            .map(|b| b.rect.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Out-of-frame flags for every box, in store order.
    pub fn bounds_flags(&self, frame_width: u32, frame_height: u32) -> Vec<BoundsFlags> {
        self.boxes
            .iter()
            .map(|b| b.rect.bounds_flags(frame_width, frame_height))
            .collect()
    }

    pub fn out_of_bounds_count(&self, frame_width: u32, frame_height: u32) -> usize {
        self.bounds_flags(frame_width, frame_height)
            .iter()
            .filter(|f| f.any())
            .count()
    }
}

fn quad_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\[(\d+),(\d+),(\d+),(\d+)\]").expect("quad pattern is valid")
    })
}

/// Outcome of scanning coordinate text, including what was skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub rects: Vec<Rect>,
    /// Non-empty fragments that did not form a valid quad.
    pub skipped: Vec<String>,
}

/// Scan `text` for `[int,int,int,int]` quads, silently skipping anything else.
pub fn parse_text(text: &str) -> Vec<Rect> {
    parse_text_report(text).rects
}

/// Like [`parse_text`] but also reports the fragments that were skipped.
pub fn parse_text_report(text: &str) -> ParseReport {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let mut report = ParseReport::default();
    if compact.is_empty() {
        return report;
    }

    let mut cursor = 0;
    for caps in quad_pattern().captures_iter(&compact) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        push_gap(&mut report.skipped, &compact[cursor..whole.start]);
        cursor = whole.end;

        let values: Option<Vec<i32>> = (1..=4)
            .map(|i| caps.get(i).and_then(|m| m.as_str().parse().ok()))
            .collect();
        match values {
            Some(v) => report.rects.push(Rect::from_corners(v[0], v[1], v[2], v[3])),
            // Digits that overflow i32
            None => report.skipped.push(compact[whole].to_string()),
        }
    }
    push_gap(&mut report.skipped, &compact[cursor..]);
    report
}

fn push_gap(skipped: &mut Vec<String>, gap: &str) {
    let trimmed = gap.trim_matches(',');
    if !trimmed.is_empty() {
        skipped.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rect(v: [i32; 4]) -> Rect {
        Rect::from(v)
    }

    fn sample_store() -> BoxStore {
        let mut store = BoxStore::new();
        store.append(rect([0, 0, 10, 10]), Provenance::Manual);
        store.append(rect([10, 10, 20, 20]), Provenance::Draw);
        store.append_batch([rect([20, 20, 30, 30])], Provenance::Imported { batch: 0 });
        store.append(rect([30, 30, 40, 40]), Provenance::Manual);
        store.append(rect([40, 40, 50, 50]), Provenance::Draw);
        store
    }

    #[test]
    fn test_parse_text_skips_malformed() {
        let rects = parse_text("[10,10,50,50],[bad],[60,60,100,100]");
        assert_eq!(rects, vec![rect([10, 10, 50, 50]), rect([60, 60, 100, 100])]);
    }

    #[test]
    fn test_parse_text_ignores_whitespace() {
        let rects = parse_text(" [ 68, 760 ,641,873 ],\n[6,570,705,757]");
        assert_eq!(rects, vec![rect([68, 760, 641, 873]), rect([6, 570, 705, 757])]);
    }

    #[test]
    fn test_parse_text_empty() {
        assert!(parse_text("").is_empty());
        assert!(parse_text("   \n").is_empty());
    }

    #[test]
    fn test_parse_text_rejects_negative_and_short_quads() {
        assert!(parse_text("[-1,0,10,10],[1,2,3]").is_empty());
    }

    #[test]
    fn test_parse_report_lists_skipped() {
        let report = parse_text_report("[10,10,50,50],[bad],[60,60,100,100],oops");
        assert_eq!(report.rects.len(), 2);
        assert_eq!(report.skipped, vec!["[bad]".to_string(), "oops".to_string()]);
    }

    #[test]
    fn test_parse_report_overflow_is_skipped() {
        let report = parse_text_report("[1,2,3,99999999999]");
        assert!(report.rects.is_empty());
        assert_eq!(report.skipped, vec!["[1,2,3,99999999999]".to_string()]);
    }

    #[test]
    fn test_append_rejects_small_box() {
        let mut store = BoxStore::new();
        assert!(!store.append(rect([0, 0, 4, 100]), Provenance::Draw));
        assert!(store.append(rect([0, 0, 5, 5]), Provenance::Draw));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_batch_skips_size_check() {
        let mut store = BoxStore::new();
        let added = store.append_batch(
            [rect([5, 5, 15, 15]), rect([0, 0, 1, 1])],
            Provenance::Imported { batch: 0 },
        );
        assert_eq!(added, 2);
        assert_eq!(store.get(1).map(|b| b.rect), Some(rect([0, 0, 1, 1])));
    }

    #[test]
    fn test_replace_manual_keeps_other_provenances() {
        let mut store = sample_store();
        store.replace_manual([rect([100, 100, 200, 200])]);
        assert_eq!(store.len(), 4);
        assert_eq!(store.count_of(ProvenanceKind::Manual), 1);
        assert_eq!(store.to_manual_text(), "[100,100,200,200]");
        assert_eq!(store.get(3).map(|b| b.provenance), Some(Provenance::Manual));
    }

    #[test]
    fn test_replace_manual_rejects_small_boxes() {
        let mut store = BoxStore::new();
        let rejected = store.replace_manual([rect([0, 0, 1, 1]), rect([10, 10, 50, 50])]);
        assert_eq!(rejected, vec![rect([0, 0, 1, 1])]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.to_manual_text(), "[10,10,50,50]");
    }

    #[test]
    fn test_delete_out_of_range_is_noop() {
        let mut store = sample_store();
        assert!(store.delete_at(99).is_none());
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_clear_batch_only_touches_that_batch() {
        let mut store = sample_store();
        store.append_batch([rect([1, 1, 2, 2])], Provenance::Imported { batch: 1 });
        assert_eq!(store.clear_batch(0), 1);
        assert_eq!(store.count_of(ProvenanceKind::Imported), 1);
    }

    #[test]
    fn test_manual_text_only_serializes_manual() {
        let store = sample_store();
        assert_eq!(store.to_manual_text(), "[0,0,10,10],[30,30,40,40]");
    }

    #[test]
    fn test_out_of_bounds_count() {
        let mut store = BoxStore::new();
        store.append_batch(
            [rect([0, 0, 100, 100]), rect([-5, 0, 100, 100]), rect([0, 0, 2000, 100])],
            Provenance::Imported { batch: 0 },
        );
        assert_eq!(store.out_of_bounds_count(1920, 1080), 2);
    }

    fn valid_rect() -> impl Strategy<Value = Rect> {
        (0..5000i32, 0..5000i32, 6..2000i32, 6..2000i32)
            .prop_map(|(x, y, w, h)| Rect::from_corners(x, y, x + w, y + h))
    }

    fn provenance() -> impl Strategy<Value = Provenance> {
        prop_oneof![
            Just(Provenance::Manual),
            Just(Provenance::Draw),
            (0..3usize).prop_map(|batch| Provenance::Imported { batch }),
        ]
    }

    proptest! {
        #[test]
        fn prop_manual_round_trip(rects in prop::collection::vec(valid_rect(), 0..20)) {
            let mut store = BoxStore::new();
            for r in &rects {
                prop_assert!(store.append(*r, Provenance::Manual));
            }
            prop_assert_eq!(parse_text(&store.to_manual_text()), rects);
        }

        #[test]
        fn prop_delete_shifts_later_indices(
            items in prop::collection::vec((valid_rect(), provenance()), 1..20),
            pick in any::<prop::sample::Index>(),
        ) {
            let mut store = BoxStore::new();
            store.boxes = items.iter().map(|(r, p)| AnnotatedBox::new(*r, *p)).collect();
            let before = store.boxes.clone();
            let i = pick.index(before.len());

            store.delete_at(i);

            let mut expected = before.clone();
            expected.remove(i);
            prop_assert_eq!(store.len(), before.len() - 1);
            prop_assert_eq!(store.boxes(), expected.as_slice());
            if i + 1 < before.len() {
                prop_assert_eq!(store.get(i), before.get(i + 1));
            }
        }

        #[test]
        fn prop_clear_by_provenance_preserves_order(
            items in prop::collection::vec((valid_rect(), provenance()), 0..30),
            kind_idx in 0..3usize,
        ) {
            let kind = ProvenanceKind::ALL[kind_idx];
            let mut store = BoxStore::new();
            store.boxes = items.iter().map(|(r, p)| AnnotatedBox::new(*r, *p)).collect();
            let expected: Vec<AnnotatedBox> = store
                .boxes
                .iter()
                .copied()
                .filter(|b| b.kind() != kind)
                .collect();
            let removed = store.clear_by_provenance(kind);
            prop_assert_eq!(removed, items.len() - expected.len());
            prop_assert_eq!(store.boxes(), expected.as_slice());
        }
    }
}
