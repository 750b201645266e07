//! Hit testing: point → what the pointer is over.
//!
//! Transformer handles are checked first since they draw above everything.
//! The rest of the tree is reverse-walked (front-to-back); layer clips
//! also clip hit testing, so an image part outside the drawing area is not
//! hittable.

use easel_core::model::{NodeKind, SceneNode};
use easel_core::scene::drawing_area_id;
use easel_core::transformer::handle_position;
use easel_core::{AnchorRole, NodeId, NodeIndex, Scene, TransformHandle};
use kurbo::{Affine, Point};

/// What lies under a point, topmost first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hit {
    TransformerHandle(TransformHandle),
    Anchor(AnchorRole),
    Image(NodeId),
    DrawingArea,
    /// Empty stage (including the non-listening grid background).
    Stage,
}

/// Classify the content-space point `p`.
pub fn hit_test(scene: &Scene, p: Point) -> Hit {
    if let Some(handle) = hit_transformer_handle(scene, p) {
        return Hit::TransformerHandle(handle);
    }
    match hit_node(scene, scene.graph.root, p) {
        Some(id) => classify(scene, id),
        None => Hit::Stage,
    }
}

/// The transformer handle under `p`, if the transformer is showing.
pub fn hit_transformer_handle(scene: &Scene, p: Point) -> Option<TransformHandle> {
    let target = scene.transformer_target()?;
    let chrome = scene.chrome();
    let half = chrome.handle_size / 2.0;
    let unrotate = Affine::rotate(-target.rotation.to_radians());
    TransformHandle::ALL.into_iter().find(|&handle| {
        let c = handle_position(target, handle, &chrome);
        let local = unrotate * (p - c).to_point();
        local.x.abs() <= half && local.y.abs() <= half
    })
}

fn hit_node(scene: &Scene, idx: NodeIndex, p: Point) -> Option<NodeId> {
    let node = &scene.graph.graph[idx];
    if !node.visible {
        return None;
    }

    if let NodeKind::Layer { clip: Some(clip) } = &node.kind
        && !clip.contains(p)
    {
        return None;
    }

    for child in scene.graph.children(idx).into_iter().rev() {
        if let Some(hit) = hit_node(scene, child, p) {
            return Some(hit);
        }
    }

    if hittable(node) && node.contains(p) {
        return Some(node.id);
    }
    None
}

fn hittable(node: &SceneNode) -> bool {
    node.listening
        && matches!(
            node.kind,
            NodeKind::Rect { .. } | NodeKind::Image { .. } | NodeKind::Anchor { .. }
        )
}

fn classify(scene: &Scene, id: NodeId) -> Hit {
    let Some(node) = scene.graph.get_by_id(id) else {
        return Hit::Stage;
    };
    match node.kind {
        NodeKind::Anchor { role, .. } => Hit::Anchor(role),
        NodeKind::Image { .. } => Hit::Image(id),
        _ if id == drawing_area_id() => Hit::DrawingArea,
        _ => Hit::Stage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::{Bitmap, EditorConfig};
    use pretty_assertions::assert_eq;

    fn scene() -> Scene {
        Scene::new(EditorConfig::default(), 800.0, 600.0)
    }

    #[test]
    fn classifies_chrome() {
        let scene = scene();
        assert_eq!(hit_test(&scene, Point::new(300.0, 90.0)), Hit::Anchor(AnchorRole::Top));
        assert_eq!(hit_test(&scene, Point::new(508.0, 250.0)), Hit::Anchor(AnchorRole::Right));
        assert_eq!(hit_test(&scene, Point::new(300.0, 250.0)), Hit::DrawingArea);
        assert_eq!(hit_test(&scene, Point::new(20.0, 20.0)), Hit::Stage);
        // In the gap between area and anchor.
        assert_eq!(hit_test(&scene, Point::new(300.0, 98.5)), Hit::Stage);
    }

    #[test]
    fn images_are_clipped_to_area() {
        let mut scene = scene();
        let id = scene.add_image(Bitmap::filled(100, 100, [0; 4]));
        // Image covers (250, 200)-(350, 300).
        assert_eq!(hit_test(&scene, Point::new(300.0, 250.0)), Hit::Image(id));

        scene.node_mut(id).unwrap().x = 450.0;
        // Image now spans x 450..550; only the part up to x=500 is hittable.
        assert_eq!(hit_test(&scene, Point::new(480.0, 250.0)), Hit::Image(id));
        assert_ne!(hit_test(&scene, Point::new(530.0, 250.0)), Hit::Image(id));
    }

    #[test]
    fn topmost_image_wins() {
        let mut scene = scene();
        let _a = scene.add_image(Bitmap::filled(100, 100, [0; 4]));
        let b = scene.add_image(Bitmap::filled(100, 100, [0; 4]));
        assert_eq!(hit_test(&scene, Point::new(300.0, 250.0)), Hit::Image(b));
    }

    #[test]
    fn handles_only_when_selected() {
        let mut scene = scene();
        let id = scene.add_image(Bitmap::filled(100, 100, [0; 4]));
        // Bottom-right handle sits at (355, 305).
        let p = Point::new(356.0, 304.0);
        assert_eq!(hit_test(&scene, p), Hit::DrawingArea);
        scene.select(Some(id)).unwrap();
        assert_eq!(
            hit_test(&scene, p),
            Hit::TransformerHandle(TransformHandle::BottomRight)
        );
        // Rotate handle above the top edge.
        assert_eq!(
            hit_test(&scene, Point::new(300.0, 175.0)),
            Hit::TransformerHandle(TransformHandle::Rotate)
        );
    }
}
