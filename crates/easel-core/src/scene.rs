//! The scene owner: one editor's complete state.
//!
//! ```text
//! stage
//! ├── main layer
//! │   ├── background      (grid pattern, not listening)
//! │   ├── drawing_area
//! │   ├── anchor_top / anchor_right / anchor_bottom / anchor_left
//! │   └── transformer
//! └── content layer       (clip = drawing area)
//!     └── image_0, image_1, ...
//! ```
//!
//! Nothing here is global: several scenes can coexist, and all state is
//! reachable without a DOM. Derived nodes (background, anchors, clip) are
//! refreshed synchronously whenever the drawing area or view changes.

use crate::area::{AnchorGeometry, AnchorRole, AnchorSet, validate_area};
use crate::config::EditorConfig;
use crate::error::{EaselError, EaselResult};
use crate::id::NodeId;
use crate::model::{
    Bitmap, BitmapId, Bounds, Color, NodeKind, Paint, SceneGraph, SceneNode, Shadow, Style,
};
use crate::placement::place_image;
use crate::transformer::Transformer;
use crate::view::{ChromeMetrics, ViewTransform};
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::HashMap;

/// Name given to every uploaded image node.
pub const UPLOADED_IMAGE: &str = "uploadedImage";

const ANCHOR_HOVER_SHADOW: Shadow = Shadow {
    color: Color::BLACK,
    blur: 10.0,
    offset_x: 0.0,
    offset_y: 0.0,
    opacity: 0.3,
};

// ─── Well-known IDs ──────────────────────────────────────────────────────

pub fn stage_id() -> NodeId {
    NodeId::intern("stage")
}

pub fn main_layer_id() -> NodeId {
    NodeId::intern("main_layer")
}

pub fn content_layer_id() -> NodeId {
    NodeId::intern("content_layer")
}

pub fn background_id() -> NodeId {
    NodeId::intern("background")
}

pub fn drawing_area_id() -> NodeId {
    NodeId::intern("drawing_area")
}

pub fn transformer_id() -> NodeId {
    NodeId::intern("transformer")
}

pub fn anchor_id(role: AnchorRole) -> NodeId {
    NodeId::intern(&format!("anchor_{}", role.as_str()))
}

// ─── Scene ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Scene {
    pub graph: SceneGraph,
    config: EditorConfig,
    area: Bounds,
    view: ViewTransform,
    transformer: Transformer,
    bitmaps: HashMap<BitmapId, Bitmap>,
    next_bitmap: u32,
    stage_width: f64,
    stage_height: f64,
    hovered_anchor: Option<AnchorRole>,
    chrome_visible: bool,
    main_layer: NodeIndex,
    content_layer: NodeIndex,
}

impl Scene {
    /// Build the initial scene for a `width × height` stage.
    pub fn new(config: EditorConfig, width: f64, height: f64) -> Self {
        let area = config.initial_area;
        let view = ViewTransform::IDENTITY;

        let mut graph = SceneGraph::new(SceneNode::new(stage_id(), NodeKind::Stage));
        let main_layer = graph.add_node(
            graph.root,
            SceneNode::new(main_layer_id(), NodeKind::Layer { clip: None }),
        );
        let content_layer = graph.add_node(
            graph.root,
            SceneNode::new(content_layer_id(), NodeKind::Layer { clip: Some(area) }),
        );

        let mut background = SceneNode::new(
            background_id(),
            NodeKind::Rect {
                width: area.width,
                height: area.height,
            },
        )
        .at(area.x, area.y);
        background.style.fill = Some(Paint::GridPattern);
        background.listening = false;
        graph.add_node(main_layer, background);

        let mut drawing_area = SceneNode::new(
            drawing_area_id(),
            NodeKind::Rect {
                width: area.width,
                height: area.height,
            },
        )
        .at(area.x, area.y);
        drawing_area.style = Style {
            fill: Some(Paint::Solid(config.area_style.fill)),
            stroke: Some(config.area_style.stroke),
            stroke_width: config.area_style.stroke_width,
            ..Style::default()
        };
        graph.add_node(main_layer, drawing_area);

        let geom = config.anchor_geometry(&view);
        let anchors = AnchorSet::layout(area, &geom);
        for role in AnchorRole::ALL {
            let b = anchors.get(role);
            let mut anchor = SceneNode::new(
                anchor_id(role),
                NodeKind::Anchor {
                    role,
                    width: b.width,
                    height: b.height,
                },
            )
            .at(b.x, b.y);
            anchor.style = Style {
                fill: Some(Paint::Solid(config.area_style.anchor_fill)),
                stroke: Some(config.area_style.anchor_stroke),
                stroke_width: config.area_style.stroke_width,
                corner_radius: config.area_style.anchor_corner_radius,
                ..Style::default()
            };
            anchor.draggable = true;
            graph.add_node(main_layer, anchor);
        }

        let mut transformer = SceneNode::new(transformer_id(), NodeKind::Transformer);
        transformer.visible = false;
        graph.add_node(main_layer, transformer);

        log::debug!("scene created: stage {width}x{height}, area {area:?}");

        Self {
            graph,
            config,
            area,
            view,
            transformer: Transformer::default(),
            bitmaps: HashMap::new(),
            next_bitmap: 0,
            stage_width: width,
            stage_height: height,
            hovered_anchor: None,
            chrome_visible: true,
            main_layer,
            content_layer,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // ─── Stage ───────────────────────────────────────────────────────────

    pub fn stage_size(&self) -> (f64, f64) {
        (self.stage_width, self.stage_height)
    }

    pub fn set_stage_size(&mut self, width: f64, height: f64) {
        self.stage_width = width;
        self.stage_height = height;
    }

    pub fn main_layer(&self) -> NodeIndex {
        self.main_layer
    }

    pub fn content_layer(&self) -> NodeIndex {
        self.content_layer
    }

    // ─── Drawing area & anchors ──────────────────────────────────────────

    pub fn drawing_area(&self) -> Bounds {
        self.area
    }

    pub fn anchor_geometry(&self) -> AnchorGeometry {
        self.config.anchor_geometry(&self.view)
    }

    /// Current anchor boxes, read back from the anchor nodes.
    pub fn anchors(&self) -> AnchorSet {
        let read = |role| {
            self.graph
                .get_by_id(anchor_id(role))
                .map(SceneNode::bounds)
                .unwrap_or_default()
        };
        AnchorSet {
            top: read(AnchorRole::Top),
            right: read(AnchorRole::Right),
            bottom: read(AnchorRole::Bottom),
            left: read(AnchorRole::Left),
        }
    }

    /// Replace the drawing area. Rejected updates leave every node as-is.
    pub fn set_drawing_area(&mut self, next: Bounds) -> EaselResult<()> {
        let next = validate_area(next, self.config.min_area_size)?;
        self.area = next;
        self.refresh_area_nodes();
        Ok(())
    }

    fn refresh_area_nodes(&mut self) {
        let area = self.area;
        for id in [background_id(), drawing_area_id()] {
            if let Some(node) = self.graph.get_by_id_mut(id) {
                node.x = area.x;
                node.y = area.y;
                node.set_size(area.width, area.height);
            }
        }
        if let NodeKind::Layer { clip } = &mut self.graph.graph[self.content_layer].kind {
            *clip = Some(area);
        }
        self.refresh_anchors();
    }

    fn refresh_anchors(&mut self) {
        let anchors = AnchorSet::layout(self.area, &self.anchor_geometry());
        let stroke = self.chrome().anchor_stroke;
        let hovered = self.hovered_anchor;
        let style = self.config.area_style.clone();
        for role in AnchorRole::ALL {
            let b = anchors.get(role);
            if let Some(node) = self.graph.get_by_id_mut(anchor_id(role)) {
                node.x = b.x;
                node.y = b.y;
                node.set_size(b.width, b.height);
                node.style.stroke_width = stroke;
                if hovered == Some(role) {
                    node.style.fill = Some(Paint::Solid(style.anchor_hover_fill));
                    node.style.shadow = Some(ANCHOR_HOVER_SHADOW);
                } else {
                    node.style.fill = Some(Paint::Solid(style.anchor_fill));
                    node.style.shadow = None;
                }
            }
        }
    }

    pub fn hovered_anchor(&self) -> Option<AnchorRole> {
        self.hovered_anchor
    }

    /// Highlight one anchor (or none). Returns true if the highlight moved.
    pub fn set_anchor_hover(&mut self, role: Option<AnchorRole>) -> bool {
        if self.hovered_anchor == role {
            return false;
        }
        self.hovered_anchor = role;
        self.refresh_anchors();
        true
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    /// Replace the view. The scale is clamped to the configured bounds and
    /// chrome is resized to stay constant on screen.
    pub fn set_view(&mut self, view: ViewTransform) {
        let scale = view.scale.clamp(self.config.min_scale, self.config.max_scale);
        if scale != view.scale {
            log::debug!("view scale {} clamped to {scale}", view.scale);
        }
        self.view = ViewTransform { scale, ..view };
        self.refresh_anchors();
    }

    pub fn chrome(&self) -> ChromeMetrics {
        self.config.chrome(&self.view)
    }

    /// Show or hide selection chrome (anchors). Used around export.
    pub fn set_chrome_visible(&mut self, visible: bool) {
        self.chrome_visible = visible;
        for role in AnchorRole::ALL {
            if let Some(node) = self.graph.get_by_id_mut(anchor_id(role)) {
                node.visible = visible;
            }
        }
        self.sync_transformer_node();
    }

    pub fn chrome_visible(&self) -> bool {
        self.chrome_visible
    }

    // ─── Images ──────────────────────────────────────────────────────────

    pub fn insert_bitmap(&mut self, bitmap: Bitmap) -> BitmapId {
        let id = BitmapId(self.next_bitmap);
        self.next_bitmap += 1;
        self.bitmaps.insert(id, bitmap);
        id
    }

    pub fn bitmap(&self, id: BitmapId) -> Option<&Bitmap> {
        self.bitmaps.get(&id)
    }

    /// Add a decoded bitmap as a new image node, downscaled and centered in
    /// the drawing area. The new image is on top of the content layer.
    pub fn add_image(&mut self, bitmap: Bitmap) -> NodeId {
        let placed = place_image(
            self.area,
            f64::from(bitmap.width),
            f64::from(bitmap.height),
            self.config.max_upload_size,
        );
        let bitmap = self.insert_bitmap(bitmap);
        let id = NodeId::image();
        let mut node = SceneNode::new(
            id,
            NodeKind::Image {
                width: placed.width,
                height: placed.height,
                bitmap,
            },
        )
        .at(placed.x, placed.y);
        node.draggable = true;
        node.name = Some(UPLOADED_IMAGE.to_string());
        self.graph.add_node(self.content_layer, node);
        log::info!("image {id} placed at {placed:?}");
        id
    }

    /// Image nodes in paint order.
    pub fn image_ids(&self) -> Vec<NodeId> {
        self.graph
            .children(self.content_layer)
            .into_iter()
            .map(|idx| &self.graph.graph[idx])
            .filter(|node| matches!(node.kind, NodeKind::Image { .. }))
            .map(|node| node.id)
            .collect()
    }

    pub fn node(&self, id: NodeId) -> EaselResult<&SceneNode> {
        self.graph.get_by_id(id).ok_or(EaselError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> EaselResult<&mut SceneNode> {
        self.graph.get_by_id_mut(id).ok_or(EaselError::UnknownNode(id))
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn selection(&self) -> Option<NodeId> {
        self.transformer.target()
    }

    /// Bind the transformer to an image (or clear it with `None`) and raise
    /// it to the top of its layer. Returns true if the target changed.
    pub fn select(&mut self, target: Option<NodeId>) -> EaselResult<bool> {
        if let Some(id) = target {
            self.node(id)?;
        }
        let changed = self.transformer.set_target(target);
        if target.is_some()
            && let Some(idx) = self.graph.index_of(transformer_id())
        {
            self.graph.move_to_top(idx);
        }
        self.sync_transformer_node();
        Ok(changed)
    }

    fn sync_transformer_node(&mut self) {
        let visible = self.chrome_visible && self.transformer.target().is_some();
        if let Some(node) = self.graph.get_by_id_mut(transformer_id()) {
            node.visible = visible;
        }
    }

    /// The selected image node, if the transformer is bound and showing.
    pub fn transformer_target(&self) -> Option<&SceneNode> {
        let visible = self
            .graph
            .get_by_id(transformer_id())
            .is_some_and(|n| n.visible);
        if !visible {
            return None;
        }
        self.transformer.target().and_then(|id| self.graph.get_by_id(id))
    }

    // ─── Snapshot ────────────────────────────────────────────────────────

    /// Serializable summary of the editor state.
    pub fn snapshot(&self) -> SceneSnapshot {
        let images = self
            .image_ids()
            .into_iter()
            .filter_map(|id| self.graph.get_by_id(id))
            .map(|node| {
                let (width, height) = node.size().unwrap_or((0.0, 0.0));
                ImageSnapshot {
                    id: node.id,
                    x: node.x,
                    y: node.y,
                    width,
                    height,
                    scale_x: node.scale_x,
                    scale_y: node.scale_y,
                    rotation: node.rotation,
                }
            })
            .collect();
        SceneSnapshot {
            drawing_area: self.area,
            view: self.view,
            selection: self.selection(),
            images,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSnapshot {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSnapshot {
    pub drawing_area: Bounds,
    pub view: ViewTransform,
    pub selection: Option<NodeId>,
    pub images: Vec<ImageSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scene() -> Scene {
        Scene::new(EditorConfig::default(), 1024.0, 768.0)
    }

    #[test]
    fn initial_layout() {
        let scene = scene();
        assert_eq!(scene.drawing_area(), Bounds::new(100.0, 100.0, 400.0, 300.0));
        assert_eq!(scene.anchors().top, Bounds::new(283.0, 87.0, 34.0, 10.0));

        let main: Vec<_> = scene
            .graph
            .children(scene.main_layer())
            .into_iter()
            .map(|idx| scene.graph.graph[idx].id.to_string())
            .collect();
        assert_eq!(
            main,
            vec![
                "background",
                "drawing_area",
                "anchor_top",
                "anchor_right",
                "anchor_bottom",
                "anchor_left",
                "transformer",
            ]
        );
        assert!(scene.transformer_target().is_none());
    }

    #[test]
    fn rejected_area_leaves_everything_unchanged() {
        let mut scene = scene();
        let before_anchors = scene.anchors();
        let err = scene
            .set_drawing_area(Bounds::new(0.0, 0.0, 50.0, 300.0))
            .unwrap_err();
        assert!(matches!(err, EaselError::BelowMinimumSize { .. }));
        assert_eq!(scene.drawing_area(), Bounds::new(100.0, 100.0, 400.0, 300.0));
        assert_eq!(scene.anchors(), before_anchors);
    }

    #[test]
    fn accepted_area_refreshes_derived_nodes() {
        let mut scene = scene();
        let next = Bounds::new(50.0, 60.0, 500.0, 200.0);
        scene.set_drawing_area(next).unwrap();

        assert_eq!(scene.graph.get_by_id(background_id()).unwrap().bounds(), next);
        assert_eq!(scene.graph.get_by_id(drawing_area_id()).unwrap().bounds(), next);
        assert_eq!(
            scene.graph.graph[scene.content_layer()].kind,
            NodeKind::Layer { clip: Some(next) }
        );
        assert!(scene.anchors().enclosed_area(3.0).approx_eq(&next, 1e-9));
    }

    #[test]
    fn view_changes_rescale_anchor_chrome() {
        let mut scene = scene();
        scene.set_view(ViewTransform {
            scale: 2.0,
            offset_x: 0.0,
            offset_y: 0.0,
        });
        let top = scene.anchors().top;
        // Gap is 3 screen px = 1.5 content units.
        assert_eq!(top.y, 100.0 - 10.0 - 1.5);
        let stroke = scene.graph.get_by_id(anchor_id(AnchorRole::Top)).unwrap().style.stroke_width;
        assert_eq!(stroke, 0.5);
    }

    #[test]
    fn set_view_clamps_scale() {
        let mut scene = scene();
        scene.set_view(ViewTransform {
            scale: 12.0,
            ..ViewTransform::IDENTITY
        });
        assert_eq!(scene.view().scale, 5.0);
    }

    #[test]
    fn select_raises_transformer_and_shows_it() {
        let mut scene = scene();
        let id = scene.add_image(Bitmap::filled(400, 100, [255, 0, 0, 255]));
        assert!(scene.select(Some(id)).unwrap());
        assert!(!scene.select(Some(id)).unwrap());
        assert_eq!(scene.transformer_target().map(|n| n.id), Some(id));

        let last = *scene.graph.children(scene.main_layer()).last().unwrap();
        assert_eq!(scene.graph.graph[last].id, transformer_id());

        scene.set_chrome_visible(false);
        assert!(scene.transformer_target().is_none());
        scene.set_chrome_visible(true);
        assert!(scene.transformer_target().is_some());

        assert!(scene.select(None).unwrap());
        assert!(scene.transformer_target().is_none());
    }

    #[test]
    fn selecting_unknown_node_fails() {
        let mut scene = scene();
        let ghost = NodeId::intern("ghost");
        assert_eq!(scene.select(Some(ghost)), Err(EaselError::UnknownNode(ghost)));
        assert_eq!(scene.selection(), None);
    }

    #[test]
    fn anchor_hover_swaps_fill() {
        let mut scene = scene();
        assert!(scene.set_anchor_hover(Some(AnchorRole::Left)));
        assert!(!scene.set_anchor_hover(Some(AnchorRole::Left)));
        let left = scene.graph.get_by_id(anchor_id(AnchorRole::Left)).unwrap();
        assert_eq!(
            left.style.fill,
            Some(Paint::Solid(scene.config().area_style.anchor_hover_fill))
        );
        assert!(left.style.shadow.is_some());
        assert!(scene.set_anchor_hover(None));
        let left = scene.graph.get_by_id(anchor_id(AnchorRole::Left)).unwrap();
        assert!(left.style.shadow.is_none());
    }

    #[test]
    fn images_are_named_and_ordered() {
        let mut scene = scene();
        let a = scene.add_image(Bitmap::filled(10, 10, [0; 4]));
        let b = scene.add_image(Bitmap::filled(10, 10, [0; 4]));
        assert_eq!(scene.image_ids(), vec![a, b]);
        let node = scene.node(a).unwrap();
        assert_eq!(node.name.as_deref(), Some(UPLOADED_IMAGE));
        assert!(node.draggable);
        assert_eq!(scene.snapshot().images.len(), 2);
    }
}
