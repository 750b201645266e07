//! Tool system for canvas interactions.
//!
//! Each tool translates editor events into `SceneMutation`s that the
//! `SyncEngine` applies. Tools read the current scene but never write it.
//!
//! | Tool        | Source                       | Gestures              |
//! |-------------|------------------------------|-----------------------|
//! | `View`      | empty stage / anywhere       | drag (pan), wheel     |
//! | `Anchor`    | anchor                       | drag (resize), hover  |
//! | `Move`      | image                        | drag                  |
//! | `Transform` | transformer handle           | drag (resize, rotate) |
//! | `Select`    | image, drawing area, stage   | click                 |

use crate::event::{EditorEvent, EventKind};
use crate::mutation::{Mutations, SceneMutation};
use easel_core::area::resize_from_drag;
use easel_core::transformer::{handle_position, resize_to, rotate_towards};
use easel_core::view::{ZoomDirection, is_zoom_gesture};
use easel_core::{AnchorRole, NodeId, Scene, TransformHandle};
use easel_render::Hit;
use kurbo::Vec2;
use smallvec::smallvec;

/// Which tool a gesture is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    View,
    Anchor,
    Move,
    Transform,
    Select,
}

/// Trait for tools that handle events and produce mutations.
pub trait Tool {
    /// Handle an event, returning zero or more mutations.
    fn handle(&mut self, event: &EditorEvent, scene: &Scene) -> Mutations;

    /// Whether a drag gesture owned by this tool is in progress.
    fn is_active(&self) -> bool {
        false
    }
}

// ─── View Tool ───────────────────────────────────────────────────────────

/// Pans the view by dragging the empty stage; zooms on wheel gestures.
#[derive(Debug, Default)]
pub struct ViewTool {
    panning: bool,
}

impl Tool for ViewTool {
    fn is_active(&self) -> bool {
        self.panning
    }

    fn handle(&mut self, event: &EditorEvent, scene: &Scene) -> Mutations {
        let p = &event.payload;
        match event.kind {
            EventKind::DragStart => {
                self.panning = event.source == Hit::Stage;
                smallvec![]
            }
            EventKind::DragMove if self.panning => {
                smallvec![SceneMutation::SetView(scene.view().panned(p.screen_delta))]
            }
            EventKind::DragEnd => {
                self.panning = false;
                smallvec![]
            }
            EventKind::Wheel => {
                if !is_zoom_gesture(p.wheel.x, p.wheel.y, p.modifiers.ctrl) {
                    return smallvec![];
                }
                let cfg = scene.config();
                let next = scene.view().stepped(
                    p.screen,
                    ZoomDirection::from_wheel(p.wheel.y),
                    cfg.zoom_step,
                    cfg.min_scale,
                    cfg.max_scale,
                );
                smallvec![SceneMutation::SetView(next)]
            }
            _ => smallvec![],
        }
    }
}

// ─── Anchor Tool ─────────────────────────────────────────────────────────

/// Resizes the drawing area from the dragged anchor and highlights the
/// anchor under the pointer.
#[derive(Debug, Default)]
pub struct AnchorTool {
    active: Option<AnchorRole>,
}

impl AnchorTool {
    pub fn active(&self) -> Option<AnchorRole> {
        self.active
    }
}

impl Tool for AnchorTool {
    fn is_active(&self) -> bool {
        self.active.is_some()
    }

    fn handle(&mut self, event: &EditorEvent, scene: &Scene) -> Mutations {
        match (event.kind, event.source) {
            (EventKind::Hover, Hit::Anchor(role)) => {
                smallvec![SceneMutation::SetAnchorHover(Some(role))]
            }
            (EventKind::Hover, _) => smallvec![SceneMutation::SetAnchorHover(None)],
            (EventKind::DragStart, Hit::Anchor(role)) => {
                self.active = Some(role);
                self.resize(role, event, scene)
            }
            (EventKind::DragMove, _) => match self.active {
                Some(role) => self.resize(role, event, scene),
                None => smallvec![],
            },
            (EventKind::DragEnd, _) => {
                self.active = None;
                smallvec![]
            }
            _ => smallvec![],
        }
    }
}

impl AnchorTool {
    fn resize(&self, role: AnchorRole, event: &EditorEvent, scene: &Scene) -> Mutations {
        match resize_from_drag(
            role,
            event.payload.content,
            scene.drawing_area(),
            &scene.anchor_geometry(),
            scene.config().min_area_size,
        ) {
            Ok(next) => smallvec![SceneMutation::SetDrawingArea(next)],
            Err(err) => {
                log::debug!("{} anchor drag ignored: {err}", role.as_str());
                smallvec![]
            }
        }
    }
}

// ─── Move Tool ───────────────────────────────────────────────────────────

/// Drags an image by the content-space pointer delta.
#[derive(Debug, Default)]
pub struct MoveTool {
    dragging: Option<NodeId>,
}

impl Tool for MoveTool {
    fn is_active(&self) -> bool {
        self.dragging.is_some()
    }

    fn handle(&mut self, event: &EditorEvent, _scene: &Scene) -> Mutations {
        match (event.kind, event.source) {
            (EventKind::DragStart, Hit::Image(id)) => {
                self.dragging = Some(id);
                self.step(event)
            }
            (EventKind::DragMove, _) => self.step(event),
            (EventKind::DragEnd, _) => {
                self.dragging = None;
                smallvec![]
            }
            _ => smallvec![],
        }
    }
}

impl MoveTool {
    fn step(&self, event: &EditorEvent) -> Mutations {
        match self.dragging {
            Some(id) => {
                let d = event.payload.content_delta;
                smallvec![SceneMutation::MoveNode { id, dx: d.x, dy: d.y }]
            }
            None => smallvec![],
        }
    }
}

// ─── Transform Tool ──────────────────────────────────────────────────────

/// Resizes (corner handles) or rotates (rotate handle) the selected image.
/// Scale accumulates during the gesture and is baked on release.
#[derive(Debug, Default)]
pub struct TransformTool {
    active: Option<(NodeId, TransformHandle)>,
    /// Pointer offset from the handle center at press time.
    grab: Vec2,
}

impl Tool for TransformTool {
    fn is_active(&self) -> bool {
        self.active.is_some()
    }

    fn handle(&mut self, event: &EditorEvent, scene: &Scene) -> Mutations {
        match (event.kind, event.source) {
            (EventKind::DragStart, Hit::TransformerHandle(handle)) => {
                self.active = scene.selection().map(|id| (id, handle));
                self.grab = match self.active.map(|(id, _)| scene.node(id)) {
                    Some(Ok(node)) => event.payload.content - handle_position(node, handle, &scene.chrome()),
                    _ => Vec2::ZERO,
                };
                self.step(event, scene)
            }
            (EventKind::DragMove, _) => self.step(event, scene),
            (EventKind::DragEnd, _) => match self.active.take() {
                Some((id, _)) => smallvec![SceneMutation::BakeScale { id }],
                None => smallvec![],
            },
            _ => smallvec![],
        }
    }
}

impl TransformTool {
    fn step(&self, event: &EditorEvent, scene: &Scene) -> Mutations {
        let Some((id, handle)) = self.active else {
            return smallvec![];
        };
        let Ok(node) = scene.node(id) else {
            return smallvec![];
        };
        let style = &scene.config().transformer;
        let pointer = event.payload.content - self.grab;
        let pose = match handle {
            TransformHandle::Rotate => Some(rotate_towards(
                node,
                pointer,
                &style.rotation_snaps,
                style.rotation_snap_tolerance,
            )),
            corner => resize_to(node, corner, pointer, &scene.chrome(), style.keep_ratio),
        };
        match pose {
            Some(pose) => smallvec![SceneMutation::SetPose { id, pose }],
            None => smallvec![],
        }
    }
}

// ─── Select Tool ─────────────────────────────────────────────────────────

/// Click on an image selects it; click on the stage or drawing area clears.
#[derive(Debug, Default)]
pub struct SelectTool;

impl Tool for SelectTool {
    fn handle(&mut self, event: &EditorEvent, _scene: &Scene) -> Mutations {
        if event.kind != EventKind::Click {
            return smallvec![];
        }
        match event.source {
            Hit::Image(id) => smallvec![SceneMutation::Select(Some(id))],
            Hit::Stage | Hit::DrawingArea => smallvec![SceneMutation::Select(None)],
            Hit::Anchor(_) | Hit::TransformerHandle(_) => smallvec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Payload;
    use crate::input::Modifiers;
    use easel_core::{Bitmap, EditorConfig};
    use kurbo::Point;
    use pretty_assertions::assert_eq;

    fn scene() -> Scene {
        Scene::new(EditorConfig::default(), 800.0, 600.0)
    }

    fn ev(source: Hit, kind: EventKind, x: f64, y: f64) -> EditorEvent {
        let p = Point::new(x, y);
        EditorEvent::new(source, kind, Payload::at(p, p, Modifiers::NONE))
    }

    #[test]
    fn plain_vertical_scroll_does_not_zoom() {
        let scene = scene();
        let mut tool = ViewTool::default();
        let mut e = ev(Hit::Stage, EventKind::Wheel, 10.0, 10.0);
        e.payload.wheel = Vec2::new(0.0, 40.0);
        assert!(tool.handle(&e, &scene).is_empty());

        e.payload.modifiers = Modifiers::ctrl();
        let out = tool.handle(&e, &scene);
        assert_eq!(out.len(), 1);
        let SceneMutation::SetView(v) = &out[0] else {
            panic!("expected SetView");
        };
        assert!((v.scale - 1.0 / 1.1).abs() < 1e-12);
    }

    #[test]
    fn pan_only_from_stage() {
        let scene = scene();
        let mut tool = ViewTool::default();
        tool.handle(&ev(Hit::DrawingArea, EventKind::DragStart, 0.0, 0.0), &scene);
        assert!(!tool.is_active());

        tool.handle(&ev(Hit::Stage, EventKind::DragStart, 0.0, 0.0), &scene);
        let mut mv = ev(Hit::Stage, EventKind::DragMove, 5.0, 5.0);
        mv.payload.screen_delta = Vec2::new(5.0, 7.0);
        let out = tool.handle(&mv, &scene);
        assert_eq!(
            out.into_vec(),
            vec![SceneMutation::SetView(scene.view().panned(Vec2::new(5.0, 7.0)))]
        );
    }

    #[test]
    fn anchor_drag_below_minimum_emits_nothing() {
        let scene = scene();
        let mut tool = AnchorTool::default();
        let out = tool.handle(
            &ev(Hit::Anchor(AnchorRole::Left), EventKind::DragStart, 480.0, 250.0),
            &scene,
        );
        assert!(out.is_empty());
        assert_eq!(tool.active(), Some(AnchorRole::Left));
    }

    #[test]
    fn hover_tracks_anchor_under_pointer() {
        let scene = scene();
        let mut tool = AnchorTool::default();
        let out = tool.handle(&ev(Hit::Anchor(AnchorRole::Top), EventKind::Hover, 0.0, 0.0), &scene);
        assert_eq!(out.into_vec(), vec![SceneMutation::SetAnchorHover(Some(AnchorRole::Top))]);
        let out = tool.handle(&ev(Hit::Stage, EventKind::Hover, 0.0, 0.0), &scene);
        assert_eq!(out.into_vec(), vec![SceneMutation::SetAnchorHover(None)]);
    }

    #[test]
    fn click_selects_and_clears() {
        let mut scene = scene();
        let id = scene.add_image(Bitmap::filled(10, 10, [0; 4]));
        let mut tool = SelectTool;
        let out = tool.handle(&ev(Hit::Image(id), EventKind::Click, 0.0, 0.0), &scene);
        assert_eq!(out.into_vec(), vec![SceneMutation::Select(Some(id))]);
        let out = tool.handle(&ev(Hit::DrawingArea, EventKind::Click, 0.0, 0.0), &scene);
        assert_eq!(out.into_vec(), vec![SceneMutation::Select(None)]);
        let out = tool.handle(
            &ev(Hit::Anchor(AnchorRole::Top), EventKind::Click, 0.0, 0.0),
            &scene,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn transform_release_bakes_scale() {
        let mut scene = scene();
        let id = scene.add_image(Bitmap::filled(100, 100, [0; 4]));
        scene.select(Some(id)).unwrap();
        let mut tool = TransformTool::default();
        let start = ev(
            Hit::TransformerHandle(TransformHandle::BottomRight),
            EventKind::DragStart,
            355.0,
            305.0,
        );
        let out = tool.handle(&start, &scene);
        assert!(matches!(out[0], SceneMutation::SetPose { .. }));
        let out = tool.handle(&ev(Hit::Stage, EventKind::DragEnd, 0.0, 0.0), &scene);
        assert_eq!(out.into_vec(), vec![SceneMutation::BakeScale { id }]);
        assert!(!tool.is_active());
    }

    #[test]
    fn off_center_grab_does_not_jump() {
        let mut scene = scene();
        let id = scene.add_image(Bitmap::filled(100, 100, [0; 4]));
        scene.select(Some(id)).unwrap();
        let mut tool = TransformTool::default();
        // Bottom-right handle is centered at (355, 305); grab it 4 units off.
        let handle = Hit::TransformerHandle(TransformHandle::BottomRight);
        let out = tool.handle(&ev(handle, EventKind::DragStart, 359.0, 303.0), &scene);
        let SceneMutation::SetPose { pose, .. } = &out[0] else {
            panic!("expected SetPose");
        };
        assert!((pose.scale_x - 1.0).abs() < 1e-9, "{pose:?}");

        // Moving the pointer 50 along the diagonal still grows by 50%.
        let out = tool.handle(&ev(Hit::Stage, EventKind::DragMove, 409.0, 353.0), &scene);
        let SceneMutation::SetPose { pose, .. } = &out[0] else {
            panic!("expected SetPose");
        };
        assert!((pose.scale_x - 1.5).abs() < 1e-9, "{pose:?}");
        assert_eq!((pose.x, pose.y), (250.0, 200.0));
    }
}
