//! Pan/zoom view transform shared by the main and content layers.
//!
//! `screen = content × scale + offset`. The scale is uniform on both axes.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom direction of a single wheel step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Scrolling up (negative `dy`) zooms in; anything else zooms out.
    pub fn from_wheel(dy: f64) -> Self {
        if dy < 0.0 { Self::In } else { Self::Out }
    }
}

/// Wheel events only zoom when they look like a pinch / zoom gesture:
/// ctrl held (trackpad pinch reports as ctrl+wheel) or a predominantly
/// horizontal delta.
pub fn is_zoom_gesture(dx: f64, dy: f64, ctrl: bool) -> bool {
    ctrl || dy.abs() < dx.abs()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        scale: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.offset_x, self.offset_y)
    }

    /// Content → screen.
    pub fn affine(&self) -> Affine {
        Affine::translate(self.offset()) * Affine::scale(self.scale)
    }

    pub fn to_content(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.offset_x) / self.scale,
            (screen.y - self.offset_y) / self.scale,
        )
    }

    pub fn to_screen(&self, content: Point) -> Point {
        Point::new(
            content.x * self.scale + self.offset_x,
            content.y * self.scale + self.offset_y,
        )
    }

    /// Translate by a screen-space delta.
    #[must_use]
    pub fn panned(&self, delta: Vec2) -> Self {
        Self {
            offset_x: self.offset_x + delta.x,
            offset_y: self.offset_y + delta.y,
            ..*self
        }
    }

    /// Zoom so that the content point under `cursor` stays under it.
    ///
    /// The new scale is clamped to `[min, max]`; the offset is recomputed
    /// from the clamped scale so the fixed point holds even at the limits.
    #[must_use]
    pub fn zoomed_at(&self, cursor: Point, factor: f64, min: f64, max: f64) -> Self {
        let new_scale = (self.scale * factor).clamp(min, max);
        let anchor = self.to_content(cursor);
        Self {
            scale: new_scale,
            offset_x: cursor.x - anchor.x * new_scale,
            offset_y: cursor.y - anchor.y * new_scale,
        }
    }

    /// One wheel step of `step` (e.g. 1.1) in the given direction.
    #[must_use]
    pub fn stepped(&self, cursor: Point, direction: ZoomDirection, step: f64, min: f64, max: f64) -> Self {
        let factor = match direction {
            ZoomDirection::In => step,
            ZoomDirection::Out => 1.0 / step,
        };
        self.zoomed_at(cursor, factor, min, max)
    }
}

/// Sizes of selection chrome in content units, derived from the view so
/// that the chrome keeps a constant on-screen size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChromeMetrics {
    pub anchor_stroke: f64,
    pub handle_size: f64,
    pub border_width: f64,
    pub padding: f64,
    pub rotate_offset: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn zoom_keeps_cursor_point_fixed() {
        let view = ViewTransform {
            scale: 1.3,
            offset_x: -40.0,
            offset_y: 25.0,
        };
        let cursor = Point::new(320.0, 180.0);
        let before = view.to_content(cursor);
        let zoomed = view.stepped(cursor, ZoomDirection::In, 1.1, 0.1, 5.0);
        let after = zoomed.to_content(cursor);
        assert!(approx(before.x, after.x) && approx(before.y, after.y));
        assert!(approx(zoomed.scale, 1.43));
    }

    #[test]
    fn zoom_matches_offset_formula() {
        // new_offset = cursor − (cursor − old_offset) / old_scale × new_scale
        let view = ViewTransform {
            scale: 2.0,
            offset_x: 10.0,
            offset_y: 20.0,
        };
        let cursor = Point::new(110.0, 220.0);
        let z = view.zoomed_at(cursor, 1.5, 0.1, 5.0);
        assert!(approx(z.offset_x, 110.0 - (100.0 / 2.0) * 3.0));
        assert!(approx(z.offset_y, 220.0 - (200.0 / 2.0) * 3.0));
    }

    #[test]
    fn scale_is_clamped() {
        let mut view = ViewTransform::IDENTITY;
        let cursor = Point::new(50.0, 50.0);
        for _ in 0..100 {
            view = view.stepped(cursor, ZoomDirection::In, 1.1, 0.1, 5.0);
        }
        assert_eq!(view.scale, 5.0);
        for _ in 0..200 {
            view = view.stepped(cursor, ZoomDirection::Out, 1.1, 0.1, 5.0);
        }
        assert_eq!(view.scale, 0.1);
    }

    #[test]
    fn gesture_detection() {
        assert!(is_zoom_gesture(0.0, 3.0, true));
        assert!(is_zoom_gesture(5.0, 1.0, false));
        assert!(!is_zoom_gesture(0.0, 3.0, false));
        assert_eq!(ZoomDirection::from_wheel(-1.0), ZoomDirection::In);
        assert_eq!(ZoomDirection::from_wheel(0.0), ZoomDirection::Out);
    }

    #[test]
    fn pan_then_roundtrip_point() {
        let view = ViewTransform::IDENTITY.panned(Vec2::new(30.0, -10.0));
        let p = Point::new(5.0, 5.0);
        assert_eq!(view.to_screen(p), Point::new(35.0, -5.0));
        assert_eq!(view.to_content(view.to_screen(p)), p);
        assert_eq!(view.affine() * p, view.to_screen(p));
    }
}
