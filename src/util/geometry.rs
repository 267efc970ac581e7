// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the coordinate transformations between the displayed
//! (scaled, zoomed) video surface and native video pixel coordinates, plus the
//! explicit surface sizing used by both overlay layers.

use crate::models::annotation::Point;

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Backing-store and display sizes shared by the annotation and preview layers.
///
/// The backing size always equals the native video size; the display size
/// always equals the rendered video size. Only [`CanvasGeometry::resize`]
/// changes either.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasGeometry {
    backing: Size,
    display: Size,
}

impl CanvasGeometry {
    pub fn resize(native_w: u32, native_h: u32, display_w: f64, display_h: f64) -> Self {
        Self {
            backing: Size::new(native_w as f64, native_h as f64),
            display: Size::new(display_w.max(0.0), display_h.max(0.0)),
        }
    }

    #[cfg(test)]
    pub(crate) fn backing_size(&self) -> Size {
        self.backing
    }

    pub fn display_size(&self) -> Size {
        self.display
    }

    /// Mapper for a surface whose top-left corner is at `origin` in client space.
    pub fn mapper(&self, origin: Point) -> CoordinateMapper {
        CoordinateMapper {
            origin,
            display: self.display,
            native: self.backing,
        }
    }
}

/// Snapshot of a surface's placement, used to convert pointer positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    pub origin: Point,
    pub display: Size,
    pub native: Size,
}

impl CoordinateMapper {
    /// Convert a client-space position to native video pixels.
    ///
    /// Returns `(0, 0)` while the surface has no displayed size.
    pub fn to_native(&self, client: Point) -> Point {
        if self.display.is_empty() {
            return Point::default();
        }
        let sx = self.native.width / self.display.width;
        let sy = self.native.height / self.display.height;
        Point::new(
            (client.x - self.origin.x) * sx,
            (client.y - self.origin.y) * sy,
        )
    }

    /// Convert native video pixels back to client space.
    pub fn to_client(&self, native: Point) -> Point {
        if self.native.is_empty() {
            return self.origin;
        }
        Point::new(
            self.origin.x + native.x * self.display_scale_x(),
            self.origin.y + native.y * self.display_scale_y(),
        )
    }

    /// Displayed pixels per native pixel along x.
    pub fn display_scale_x(&self) -> f64 {
        if self.native.width <= 0.0 {
            return 0.0;
        }
        self.display.width / self.native.width
    }

    /// Displayed pixels per native pixel along y.
    pub fn display_scale_y(&self) -> f64 {
        if self.native.height <= 0.0 {
            return 0.0;
        }
        self.display.height / self.native.height
    }
}

/// Largest size with the media's aspect ratio that fits inside `available`.
pub fn fit_size(native_w: u32, native_h: u32, available: Size) -> Size {
    if native_w == 0 || native_h == 0 || available.is_empty() {
        return Size::default();
    }
    let aspect = native_w as f64 / native_h as f64;
    if aspect > available.width / available.height {
        Size::new(available.width, available.width / aspect)
    } else {
        Size::new(available.height * aspect, available.height)
    }
}

/// Keeps [`CanvasGeometry`] in step with its three triggers: media metadata,
/// the available layout area, and the zoom factor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceSync {
    geometry: CanvasGeometry,
    native: (u32, u32),
    available: Size,
    zoom: f32,
}

impl SurfaceSync {
    pub fn geometry(&self) -> CanvasGeometry {
        self.geometry
    }

    /// Resize both layers if any trigger changed. Returns true when resized.
    pub fn sync(&mut self, native_w: u32, native_h: u32, available: Size, zoom: f32) -> bool {
        if self.native == (native_w, native_h) && self.available == available && self.zoom == zoom {
            return false;
        }
        let fitted = fit_size(native_w, native_h, available);
        let zoom_f = zoom as f64;
        self.geometry =
            CanvasGeometry::resize(native_w, native_h, fitted.width * zoom_f, fitted.height * zoom_f);
        self.native = (native_w, native_h);
        self.available = available;
        self.zoom = zoom;
        log::debug!(
            "Canvas resized: backing {}x{}, display {:.0}x{:.0}",
            native_w,
            native_h,
            self.geometry.display.width,
            self.geometry.display.height
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_surface_sync_only_on_trigger_change() {
        let mut sync = SurfaceSync::default();
        assert!(sync.sync(1920, 1080, Size::new(960.0, 540.0), 1.0));
        assert!(!sync.sync(1920, 1080, Size::new(960.0, 540.0), 1.0));
        assert_eq!(sync.geometry().display_size(), Size::new(960.0, 540.0));

        assert!(sync.sync(1920, 1080, Size::new(960.0, 540.0), 2.0));
        assert_eq!(sync.geometry().display_size(), Size::new(1920.0, 1080.0));
        assert_eq!(sync.geometry().backing_size(), Size::new(1920.0, 1080.0));

        assert!(sync.sync(640, 480, Size::new(960.0, 540.0), 2.0));
        assert_eq!(sync.geometry().backing_size(), Size::new(640.0, 480.0));
    }

    #[test]
    fn test_half_scale_maps_to_double() {
        let geometry = CanvasGeometry::resize(1920, 1080, 960.0, 540.0);
        let mapper = geometry.mapper(Point::new(0.0, 0.0));
        let p = mapper.to_native(Point::new(100.0, 100.0));
        assert!((p.x - 200.0).abs() < 1e-9);
        assert!((p.y - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_origin_offset_is_subtracted() {
        let mapper = CanvasGeometry::resize(1920, 1080, 960.0, 540.0).mapper(Point::new(40.0, 25.0));
        let p = mapper.to_native(Point::new(140.0, 125.0));
        assert!((p.x - 200.0).abs() < 1e-9);
        assert!((p.y - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_display_size_maps_to_origin() {
        let mapper = CanvasGeometry::resize(1920, 1080, 0.0, 0.0).mapper(Point::new(10.0, 10.0));
        assert_eq!(mapper.to_native(Point::new(500.0, 500.0)), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_resize_keeps_backing_at_native() {
        let geometry = CanvasGeometry::resize(1280, 720, 640.0 * 1.5, 360.0 * 1.5);
        assert_eq!(geometry.backing_size(), Size::new(1280.0, 720.0));
        assert_eq!(geometry.display_size(), Size::new(960.0, 540.0));
    }

    #[test]
    fn test_fit_size_preserves_aspect() {
        let wide = fit_size(1920, 1080, Size::new(800.0, 800.0));
        assert_eq!(wide, Size::new(800.0, 450.0));
        let tall = fit_size(1080, 1920, Size::new(800.0, 800.0));
        assert_eq!(tall, Size::new(450.0, 800.0));
        assert_eq!(fit_size(0, 1080, Size::new(800.0, 800.0)), Size::default());
    }

    proptest! {
        #[test]
        fn prop_mapping_round_trips(
            native_w in 16u32..8000,
            native_h in 16u32..8000,
            display_w in 1.0f64..4000.0,
            display_h in 1.0f64..4000.0,
            ox in -500.0f64..500.0,
            oy in -500.0f64..500.0,
            cx in -2000.0f64..6000.0,
            cy in -2000.0f64..6000.0,
        ) {
            let mapper = CanvasGeometry::resize(native_w, native_h, display_w, display_h)
                .mapper(Point::new(ox, oy));
            let client = Point::new(cx, cy);
            let back = mapper.to_client(mapper.to_native(client));
            prop_assert!((back.x - client.x).abs() < 1e-6);
            prop_assert!((back.y - client.y).abs() < 1e-6);
        }
    }
}
