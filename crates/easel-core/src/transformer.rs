//! The resize/rotate overlay bound to the selected image.
//!
//! Single-selection: the transformer has at most one target. During a
//! gesture the target's scale and rotation change; when the gesture ends
//! the scale is baked into width/height so the next gesture starts from
//! identity scale instead of compounding factors.

use crate::id::NodeId;
use crate::model::{Color, SceneNode};
use crate::view::ChromeMetrics;
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

/// Appearance and behavior of the transformer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformerStyle {
    pub keep_ratio: bool,
    pub border_stroke: Color,
    pub border_width: f64,
    pub border_dash: SmallVec<[f64; 2]>,
    pub handle_stroke: Color,
    pub handle_fill: Color,
    pub handle_size: f64,
    pub padding: f64,
    pub rotate_offset: f64,
    /// Angles (degrees) that rotation snaps to.
    pub rotation_snaps: Vec<f64>,
    /// How close (degrees) a rotation must be to snap.
    pub rotation_snap_tolerance: f64,
}

impl Default for TransformerStyle {
    fn default() -> Self {
        Self {
            keep_ratio: true,
            border_stroke: Color::BLACK,
            border_width: 2.0,
            border_dash: smallvec![5.0, 5.0],
            handle_stroke: Color::BLACK,
            handle_fill: Color::WHITE,
            handle_size: 10.0,
            padding: 5.0,
            rotate_offset: 20.0,
            rotation_snaps: vec![0.0, 90.0, 180.0, 270.0],
            rotation_snap_tolerance: 5.0,
        }
    }
}

/// A draggable handle on the transformer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransformHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Rotate,
}

impl TransformHandle {
    pub const ALL: [TransformHandle; 5] = [
        TransformHandle::TopLeft,
        TransformHandle::TopRight,
        TransformHandle::BottomLeft,
        TransformHandle::BottomRight,
        TransformHandle::Rotate,
    ];
}

/// Selection state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transformer {
    target: Option<NodeId>,
}

impl Transformer {
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// Bind to `target` (or detach with `None`). Re-binding the same target
    /// is valid and reports no change.
    pub fn set_target(&mut self, target: Option<NodeId>) -> bool {
        let changed = self.target != target;
        self.target = target;
        changed
    }
}

/// Position, scale and rotation of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation: f64,
}

impl Pose {
    pub fn of(node: &SceneNode) -> Self {
        Self {
            x: node.x,
            y: node.y,
            scale_x: node.scale_x,
            scale_y: node.scale_y,
            rotation: node.rotation,
        }
    }

    pub fn apply(&self, node: &mut SceneNode) {
        node.x = self.x;
        node.y = self.y;
        node.scale_x = self.scale_x;
        node.scale_y = self.scale_y;
        node.rotation = self.rotation;
    }
}

/// Translate + rotate (no scale) frame of a node.
fn rotation_frame(node: &SceneNode) -> Affine {
    Affine::translate(Vec2::new(node.x, node.y)) * Affine::rotate(node.rotation.to_radians())
}

/// Corners of the padded selection box, clockwise from top-left,
/// in content coordinates.
pub fn border_corners(node: &SceneNode, chrome: &ChromeMetrics) -> [Point; 4] {
    let (w, h) = node.scaled_size();
    let pad = chrome.padding;
    let frame = rotation_frame(node);
    [
        frame * Point::new(-pad, -pad),
        frame * Point::new(w + pad, -pad),
        frame * Point::new(w + pad, h + pad),
        frame * Point::new(-pad, h + pad),
    ]
}

/// Center of a handle in content coordinates.
pub fn handle_position(node: &SceneNode, handle: TransformHandle, chrome: &ChromeMetrics) -> Point {
    let (w, h) = node.scaled_size();
    let pad = chrome.padding;
    let local = match handle {
        TransformHandle::TopLeft => Point::new(-pad, -pad),
        TransformHandle::TopRight => Point::new(w + pad, -pad),
        TransformHandle::BottomLeft => Point::new(-pad, h + pad),
        TransformHandle::BottomRight => Point::new(w + pad, h + pad),
        TransformHandle::Rotate => Point::new(w / 2.0, -pad - chrome.rotate_offset),
    };
    rotation_frame(node) * local
}

/// Resize by dragging a corner handle to `pointer` (content coordinates).
///
/// The opposite corner stays fixed. With `keep_ratio` the drag is projected
/// onto the box diagonal so both axes scale by the same factor. Neither side
/// shrinks below one unit.
pub fn resize_to(
    node: &SceneNode,
    handle: TransformHandle,
    pointer: Point,
    chrome: &ChromeMetrics,
    keep_ratio: bool,
) -> Option<Pose> {
    let (w, h) = node.scaled_size();
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let pad = chrome.padding;
    let frame = rotation_frame(node);
    let q = frame.inverse() * pointer;

    let (nw, nh) = match handle {
        TransformHandle::BottomRight => (q.x - pad, q.y - pad),
        TransformHandle::TopLeft => (w - (q.x + pad), h - (q.y + pad)),
        TransformHandle::TopRight => (q.x - pad, h - (q.y + pad)),
        TransformHandle::BottomLeft => (w - (q.x + pad), q.y - pad),
        TransformHandle::Rotate => return None,
    };

    let (kx, ky) = if keep_ratio {
        let k = ((nw * w + nh * h) / (w * w + h * h))
            .max(1.0 / w)
            .max(1.0 / h);
        (k, k)
    } else {
        ((nw / w).max(1.0 / w), (nh / h).max(1.0 / h))
    };
    let (w2, h2) = (w * kx, h * ky);

    // Local offset of the new origin so the opposite corner stays put.
    let shift = match handle {
        TransformHandle::BottomRight => Vec2::ZERO,
        TransformHandle::TopLeft => Vec2::new(w - w2, h - h2),
        TransformHandle::TopRight => Vec2::new(0.0, h - h2),
        TransformHandle::BottomLeft => Vec2::new(w - w2, 0.0),
        TransformHandle::Rotate => Vec2::ZERO,
    };
    let origin = frame * shift.to_point();

    Some(Pose {
        x: origin.x,
        y: origin.y,
        scale_x: node.scale_x * kx,
        scale_y: node.scale_y * ky,
        rotation: node.rotation,
    })
}

/// Angular distance in degrees, in [0, 180].
fn angle_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Rotate so the rotate handle points at `pointer`, pivoting on the node
/// center. Angles within `tolerance` of a snap angle snap to it.
pub fn rotate_towards(node: &SceneNode, pointer: Point, snaps: &[f64], tolerance: f64) -> Pose {
    let (w, h) = node.scaled_size();
    let center = rotation_frame(node) * Point::new(w / 2.0, h / 2.0);
    let v = pointer - center;
    let mut angle = (v.y.atan2(v.x).to_degrees() + 90.0).rem_euclid(360.0);
    if let Some(&snap) = snaps
        .iter()
        .filter(|&&s| angle_distance(angle, s) <= tolerance)
        .min_by(|a, b| angle_distance(angle, **a).total_cmp(&angle_distance(angle, **b)))
    {
        angle = snap.rem_euclid(360.0);
    }
    let half = Affine::rotate(angle.to_radians()) * Point::new(w / 2.0, h / 2.0);
    let origin = center - half.to_vec2();
    Pose {
        x: origin.x,
        y: origin.y,
        scale_x: node.scale_x,
        scale_y: node.scale_y,
        rotation: angle,
    }
}

/// Fold the node's scale into its width/height and reset scale to 1.
/// Returns true if anything changed.
pub fn bake_scale(node: &mut SceneNode) -> bool {
    if node.scale_x == 1.0 && node.scale_y == 1.0 {
        return false;
    }
    let (w, h) = node.scaled_size();
    node.set_size(w, h);
    node.scale_x = 1.0;
    node.scale_y = 1.0;
    true
}
