//! Drawing area and its four edge anchors.
//!
//! The drawing area is the single source of truth for the workspace bounds.
//! Anchors are derived from it after every accepted resize; while one is
//! being dragged its position feeds back into a full recompute of the area.
//!
//! ```text
//!            [ top ]
//!   ┌───────────────────────┐
//! [l│                       │r]
//! [e│     drawing area      │i]
//! [f│                       │g]
//!   └───────────────────────┘
//!           [bottom]
//! ```

use crate::error::{EaselError, EaselResult};
use crate::model::Bounds;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Which edge of the drawing area an anchor sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorRole {
    Top,
    Right,
    Bottom,
    Left,
}

impl AnchorRole {
    pub const ALL: [AnchorRole; 4] = [
        AnchorRole::Top,
        AnchorRole::Right,
        AnchorRole::Bottom,
        AnchorRole::Left,
    ];

    /// Left/right anchors are tall and thin; top/bottom are wide and flat.
    pub fn is_side(self) -> bool {
        matches!(self, AnchorRole::Left | AnchorRole::Right)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnchorRole::Top => "top",
            AnchorRole::Right => "right",
            AnchorRole::Bottom => "bottom",
            AnchorRole::Left => "left",
        }
    }
}

/// Anchor dimensions and spacing, in content units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorGeometry {
    /// Short side of an anchor.
    pub thickness: f64,
    /// Long side of an anchor.
    pub length: f64,
    /// Gap between an anchor and the edge it controls.
    pub gap: f64,
}

impl AnchorGeometry {
    pub fn size(&self, role: AnchorRole) -> (f64, f64) {
        if role.is_side() {
            (self.thickness, self.length)
        } else {
            (self.length, self.thickness)
        }
    }
}

/// Reject any area whose width or height is not strictly above `min`.
pub fn validate_area(next: Bounds, min: f64) -> EaselResult<Bounds> {
    if next.width > min && next.height > min {
        Ok(next)
    } else {
        Err(EaselError::BelowMinimumSize {
            width: next.width,
            height: next.height,
            min,
        })
    }
}

/// Where an anchor sits for a given drawing area.
pub fn layout_anchor(role: AnchorRole, area: Bounds, geom: &AnchorGeometry) -> Bounds {
    let (w, h) = geom.size(role);
    let center = area.center();
    let (x, y) = match role {
        AnchorRole::Top => (center.x - w / 2.0, area.y - (h + geom.gap)),
        AnchorRole::Bottom => (center.x - w / 2.0, area.bottom() + geom.gap),
        AnchorRole::Left => (area.x - (w + geom.gap), center.y - h / 2.0),
        AnchorRole::Right => (area.right() + geom.gap, center.y - h / 2.0),
    };
    Bounds::new(x, y, w, h)
}

/// The four anchor boxes, indexed by role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorSet {
    pub top: Bounds,
    pub right: Bounds,
    pub bottom: Bounds,
    pub left: Bounds,
}

impl AnchorSet {
    pub fn layout(area: Bounds, geom: &AnchorGeometry) -> Self {
        Self {
            top: layout_anchor(AnchorRole::Top, area, geom),
            right: layout_anchor(AnchorRole::Right, area, geom),
            bottom: layout_anchor(AnchorRole::Bottom, area, geom),
            left: layout_anchor(AnchorRole::Left, area, geom),
        }
    }

    pub fn get(&self, role: AnchorRole) -> Bounds {
        match role {
            AnchorRole::Top => self.top,
            AnchorRole::Right => self.right,
            AnchorRole::Bottom => self.bottom,
            AnchorRole::Left => self.left,
        }
    }

    pub fn with(mut self, role: AnchorRole, bounds: Bounds) -> Self {
        match role {
            AnchorRole::Top => self.top = bounds,
            AnchorRole::Right => self.right = bounds,
            AnchorRole::Bottom => self.bottom = bounds,
            AnchorRole::Left => self.left = bounds,
        }
        self
    }

    /// Recompute the drawing area enclosed by the four anchors.
    /// The result is unvalidated and may have a negative size.
    pub fn enclosed_area(&self, gap: f64) -> Bounds {
        let x = self.left.right() + gap;
        let y = self.top.bottom() + gap;
        Bounds::new(
            x,
            y,
            self.right.x - (self.left.right() + gap * 2.0),
            self.bottom.y - (self.top.bottom() + gap * 2.0),
        )
    }
}

/// Position a dragged anchor under the pointer, honoring its role:
/// top/bottom move only vertically, left/right only horizontally, and the
/// bottom/right anchors cannot come closer than `min` to the area origin.
/// Top and left are unbounded.
pub fn constrain_drag(
    role: AnchorRole,
    pointer: Point,
    area: Bounds,
    geom: &AnchorGeometry,
    min: f64,
) -> Bounds {
    let (w, h) = geom.size(role);
    let center = area.center();
    match role {
        AnchorRole::Top => Bounds::new(center.x - w / 2.0, pointer.y - h / 2.0, w, h),
        AnchorRole::Bottom => Bounds::new(
            center.x - w / 2.0,
            (pointer.y - h / 2.0).max(area.y + min),
            w,
            h,
        ),
        AnchorRole::Left => Bounds::new(pointer.x - w / 2.0, center.y - h / 2.0, w, h),
        AnchorRole::Right => Bounds::new(
            (pointer.x - w / 2.0).max(area.x + min),
            center.y - h / 2.0,
            w,
            h,
        ),
    }
}

/// Compute the drawing area that results from dragging `role` to `pointer`.
///
/// Pure: nothing is mutated. An `Err` means the drag must be ignored and
/// the current area (and anchors) kept.
pub fn resize_from_drag(
    role: AnchorRole,
    pointer: Point,
    area: Bounds,
    geom: &AnchorGeometry,
    min: f64,
) -> EaselResult<Bounds> {
    let dragged = constrain_drag(role, pointer, area, geom, min);
    let candidate = AnchorSet::layout(area, geom)
        .with(role, dragged)
        .enclosed_area(geom.gap);
    validate_area(candidate, min)
}
