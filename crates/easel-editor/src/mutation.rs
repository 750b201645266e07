//! Scene mutations and their application.
//!
//! Tools never touch the scene; they describe the change they want as a
//! `SceneMutation` computed from the current state, and the engine applies
//! it here. A rejected mutation leaves the scene untouched.

use easel_core::transformer::{Pose, bake_scale};
use easel_core::{AnchorRole, Bounds, EaselResult, NodeId, Scene, ViewTransform};
use smallvec::SmallVec;

/// A batch of mutations produced by one event.
pub type Mutations = SmallVec<[SceneMutation; 2]>;

#[derive(Debug, Clone, PartialEq)]
pub enum SceneMutation {
    /// Replace the drawing area (validated on apply).
    SetDrawingArea(Bounds),
    SetView(ViewTransform),
    /// Translate a node by a content-space delta.
    MoveNode { id: NodeId, dx: f64, dy: f64 },
    /// Live transformer update: position, scale and rotation.
    SetPose { id: NodeId, pose: Pose },
    /// Fold scale into width/height at the end of a transform gesture.
    BakeScale { id: NodeId },
    /// Bind or clear the transformer.
    Select(Option<NodeId>),
    SetAnchorHover(Option<AnchorRole>),
}

/// Apply one mutation. Returns whether anything visible changed.
pub fn apply(scene: &mut Scene, mutation: SceneMutation) -> EaselResult<bool> {
    match mutation {
        SceneMutation::SetDrawingArea(next) => {
            if next == scene.drawing_area() {
                return Ok(false);
            }
            scene.set_drawing_area(next)?;
            Ok(true)
        }
        SceneMutation::SetView(view) => {
            let before = scene.view();
            scene.set_view(view);
            Ok(scene.view() != before)
        }
        SceneMutation::MoveNode { id, dx, dy } => {
            let node = scene.node_mut(id)?;
            node.x += dx;
            node.y += dy;
            Ok(dx != 0.0 || dy != 0.0)
        }
        SceneMutation::SetPose { id, pose } => {
            let node = scene.node_mut(id)?;
            pose.apply(node);
            Ok(true)
        }
        SceneMutation::BakeScale { id } => Ok(bake_scale(scene.node_mut(id)?)),
        SceneMutation::Select(target) => scene.select(target),
        SceneMutation::SetAnchorHover(role) => Ok(scene.set_anchor_hover(role)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::{Bitmap, EaselError, EditorConfig};
    use pretty_assertions::assert_eq;

    fn scene() -> Scene {
        Scene::new(EditorConfig::default(), 800.0, 600.0)
    }

    #[test]
    fn invalid_area_is_rejected_without_change() {
        let mut scene = scene();
        let res = apply(
            &mut scene,
            SceneMutation::SetDrawingArea(Bounds::new(0.0, 0.0, 30.0, 30.0)),
        );
        assert!(matches!(res, Err(EaselError::BelowMinimumSize { .. })));
        assert_eq!(scene.drawing_area(), Bounds::new(100.0, 100.0, 400.0, 300.0));
    }

    #[test]
    fn same_area_reports_no_change() {
        let mut scene = scene();
        let area = scene.drawing_area();
        assert_eq!(apply(&mut scene, SceneMutation::SetDrawingArea(area)), Ok(false));
    }

    #[test]
    fn move_and_bake() {
        let mut scene = scene();
        let id = scene.add_image(Bitmap::filled(100, 50, [0; 4]));
        apply(&mut scene, SceneMutation::MoveNode { id, dx: 10.0, dy: -5.0 }).unwrap();
        let node = scene.node(id).unwrap();
        assert_eq!((node.x, node.y), (260.0, 220.0));

        let pose = Pose {
            scale_x: 2.0,
            scale_y: 2.0,
            ..Pose::of(node)
        };
        apply(&mut scene, SceneMutation::SetPose { id, pose }).unwrap();
        assert_eq!(apply(&mut scene, SceneMutation::BakeScale { id }), Ok(true));
        let node = scene.node(id).unwrap();
        assert_eq!(node.size(), Some((200.0, 100.0)));
        assert_eq!((node.scale_x, node.scale_y), (1.0, 1.0));
    }

    #[test]
    fn unknown_nodes_are_errors() {
        let mut scene = scene();
        let ghost = NodeId::intern("nobody");
        assert_eq!(
            apply(&mut scene, SceneMutation::MoveNode { id: ghost, dx: 1.0, dy: 1.0 }),
            Err(EaselError::UnknownNode(ghost))
        );
    }
}
