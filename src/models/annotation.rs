// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the core data structures for representing
//! bounding boxes in native video pixel coordinates and where they came from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest span (in pixels) a drawn or typed box may have on either axis.
pub const MIN_BOX_SPAN: i32 = 5;

/// A 2D point in native video pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle `[x1, y1, x2, y2]` with `x1 <= x2` and `y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    /// Build a rectangle from any two opposite corners.
    pub fn from_corners(ax: i32, ay: i32, bx: i32, by: i32) -> Self {
        Self {
            x1: ax.min(bx),
            y1: ay.min(by),
            x2: ax.max(bx),
            y2: ay.max(by),
        }
    }

    /// Build a rectangle from two drag points, rounding half-up to whole pixels.
    pub fn from_points(a: Point, b: Point) -> Self {
        Self::from_corners(
            round_half_up(a.x),
            round_half_up(a.y),
            round_half_up(b.x),
            round_half_up(b.y),
        )
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.x1 as f64 + self.x2 as f64) / 2.0,
            (self.y1 as f64 + self.y2 as f64) / 2.0,
        )
    }

    /// True when either span is below [`MIN_BOX_SPAN`].
    pub fn is_degenerate(&self) -> bool {
        self.width().abs() < MIN_BOX_SPAN || self.height().abs() < MIN_BOX_SPAN
    }

    /// Per-coordinate out-of-frame flags in `[x1, y1, x2, y2]` order.
    pub fn bounds_flags(&self, frame_width: u32, frame_height: u32) -> BoundsFlags {
        let w = frame_width as i64;
        let h = frame_height as i64;
        let outside = |v: i32, max: i64| (v as i64) < 0 || (v as i64) > max;
        BoundsFlags([
            outside(self.x1, w),
            outside(self.y1, h),
            outside(self.x2, w),
            outside(self.y2, h),
        ])
    }

    pub fn as_array(&self) -> [i32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

impl From<[i32; 4]> for Rect {
    fn from(v: [i32; 4]) -> Self {
        Self::from_corners(v[0], v[1], v[2], v[3])
    }
}

impl From<Rect> for [i32; 4] {
    fn from(r: Rect) -> Self {
        r.as_array()
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{},{},{}]", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Which coordinates of a rectangle fall outside the video frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundsFlags(pub [bool; 4]);

impl BoundsFlags {
    pub fn any(&self) -> bool {
        self.0.iter().any(|f| *f)
    }
}

/// Round to the nearest integer, with halves going towards positive infinity.
pub fn round_half_up(v: f64) -> i32 {
    (v + 0.5).floor() as i32
}

/// Provenance kind, used for style lookup and bulk clearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvenanceKind {
    Manual,
    Draw,
    Imported,
}

impl ProvenanceKind {
    pub const ALL: [ProvenanceKind; 3] = [Self::Manual, Self::Draw, Self::Imported];

    /// Letter shown in front of the box number on the canvas badge.
    pub fn letter(&self) -> char {
        match self {
            Self::Manual => 'M',
            Self::Draw => 'D',
            Self::Imported => 'N',
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Manual => "Manual",
            Self::Draw => "Drawn",
            Self::Imported => "Imported",
        }
    }
}

/// Where a box came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Manual,
    Draw,
    /// Imported from a numeric batch; `batch` counts imports within the session.
    Imported { batch: usize },
}

impl Provenance {
    pub fn kind(&self) -> ProvenanceKind {
        match self {
            Self::Manual => ProvenanceKind::Manual,
            Self::Draw => ProvenanceKind::Draw,
            Self::Imported { .. } => ProvenanceKind::Imported,
        }
    }
}

/// A rectangle tagged with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedBox {
    pub rect: Rect,
    pub provenance: Provenance,
}

impl AnnotatedBox {
    pub fn new(rect: Rect, provenance: Provenance) -> Self {
        Self { rect, provenance }
    }

    pub fn kind(&self) -> ProvenanceKind {
        self.provenance.kind()
    }
}
