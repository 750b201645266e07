//! The editor engine: raw input in, scene mutations applied.
//!
//! ```text
//! InputEvent ─► gesture recognizer ─► hit test ─► EditorEvent
//!           ─► Dispatcher ─► Tool ─► SceneMutation ─► apply ─► redraw
//! ```
//!
//! The engine owns the `Scene` and is the only writer to it. Every entry
//! point returns whether a redraw is needed.

use crate::dispatch::Dispatcher;
use crate::event::{EditorEvent, EventKind, Payload};
use crate::input::{InputEvent, Modifiers};
use crate::mutation::{SceneMutation, apply};
use crate::upload::decode_bitmap;
use easel_core::{Bitmap, EaselError, EaselResult, EditorConfig, NodeId, Scene};
use easel_render::export::{ExportedImage, export_png};
use easel_render::{Hit, hit_test};
use kurbo::{Point, Vec2};

/// A pointer press that has not been released yet.
#[derive(Debug, Clone, Copy)]
struct Press {
    source: Hit,
    origin: Point,
    last: Point,
    dragging: bool,
}

pub struct SyncEngine {
    pub scene: Scene,
    dispatcher: Dispatcher,
    press: Option<Press>,
}

impl SyncEngine {
    pub fn new(config: EditorConfig, width: f64, height: f64) -> Self {
        Self {
            scene: Scene::new(config, width, height),
            dispatcher: Dispatcher::new(),
            press: None,
        }
    }

    /// Track the host surface size.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.scene.set_stage_size(width, height);
    }

    /// Whether a drag gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        self.press.is_some_and(|p| p.dragging)
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Feed one raw input event. Returns true if the scene changed.
    pub fn handle_input(&mut self, input: &InputEvent) -> bool {
        let screen = input.position();
        let modifiers = input.modifiers();
        match *input {
            InputEvent::PointerDown { .. } => {
                let source = self.hit(screen);
                self.press = Some(Press {
                    source,
                    origin: screen,
                    last: screen,
                    dragging: false,
                });
                false
            }
            InputEvent::PointerMove { .. } => match self.press {
                Some(press) => self.pointer_drag(press, screen, modifiers),
                None => {
                    let source = self.hit(screen);
                    let payload = self.payload(screen, screen, modifiers);
                    self.emit(EditorEvent::new(source, EventKind::Hover, payload))
                }
            },
            InputEvent::PointerUp { .. } => {
                let Some(press) = self.press.take() else {
                    return false;
                };
                let mut changed = false;
                if press.dragging {
                    if screen != press.last {
                        changed |= self.emit_drag(press.source, EventKind::DragMove, press.last, screen, modifiers);
                    }
                    changed |= self.emit_drag(press.source, EventKind::DragEnd, screen, screen, modifiers);
                } else {
                    let payload = self.payload(screen, screen, modifiers);
                    changed |= self.emit(EditorEvent::new(press.source, EventKind::Click, payload));
                }
                changed
            }
            InputEvent::PointerCancel { .. } => match self.press.take() {
                Some(press) if press.dragging => {
                    self.emit_drag(press.source, EventKind::DragEnd, press.last, press.last, modifiers)
                }
                _ => false,
            },
            InputEvent::Wheel { dx, dy, .. } => {
                let source = self.hit(screen);
                let mut payload = self.payload(screen, screen, modifiers);
                payload.wheel = Vec2::new(dx, dy);
                self.emit(EditorEvent::new(source, EventKind::Wheel, payload))
            }
        }
    }

    fn pointer_drag(&mut self, mut press: Press, screen: Point, modifiers: Modifiers) -> bool {
        let mut changed = false;
        if !press.dragging {
            if (screen - press.origin).hypot() < self.scene.config().click_tolerance {
                return false;
            }
            press.dragging = true;
            changed |= self.emit_drag(press.source, EventKind::DragStart, press.origin, press.origin, modifiers);
        }
        changed |= self.emit_drag(press.source, EventKind::DragMove, press.last, screen, modifiers);
        press.last = screen;
        self.press = Some(press);
        changed
    }

    fn emit_drag(&mut self, source: Hit, kind: EventKind, from: Point, to: Point, modifiers: Modifiers) -> bool {
        let payload = self.payload(from, to, modifiers);
        self.emit(EditorEvent::new(source, kind, payload))
    }

    /// Build a payload for a pointer at `to` that was previously at `from`.
    fn payload(&self, from: Point, to: Point, modifiers: Modifiers) -> Payload {
        let view = self.scene.view();
        let content = view.to_content(to);
        Payload {
            screen_delta: to - from,
            content_delta: content - view.to_content(from),
            ..Payload::at(to, content, modifiers)
        }
    }

    fn hit(&self, screen: Point) -> Hit {
        hit_test(&self.scene, self.scene.view().to_content(screen))
    }

    fn emit(&mut self, event: EditorEvent) -> bool {
        let mutations = self.dispatcher.dispatch(&event, &self.scene);
        let mut changed = false;
        for m in mutations {
            changed |= self.apply(m);
        }
        changed
    }

    /// Apply a mutation. Rejections are logged and leave the scene as-is.
    pub fn apply(&mut self, mutation: SceneMutation) -> bool {
        match apply(&mut self.scene, mutation) {
            Ok(changed) => changed,
            Err(err @ EaselError::BelowMinimumSize { .. }) => {
                log::debug!("drawing area update rejected: {err}");
                false
            }
            Err(err) => {
                log::warn!("mutation failed: {err}");
                false
            }
        }
    }

    // ─── Images ──────────────────────────────────────────────────────────

    /// Decode uploaded file bytes and place the image in the drawing area.
    pub fn add_image(&mut self, bytes: &[u8]) -> EaselResult<NodeId> {
        let bitmap = decode_bitmap(bytes).inspect_err(|err| log::warn!("upload rejected: {err}"))?;
        Ok(self.add_bitmap(bitmap))
    }

    pub fn add_bitmap(&mut self, bitmap: Bitmap) -> NodeId {
        log::info!("upload: {}x{} bitmap", bitmap.width, bitmap.height);
        self.scene.add_image(bitmap)
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Export the drawing area as PNG.
    ///
    /// Selection is cleared and anchors are hidden for the duration; the
    /// anchors come back afterwards, the selection does not.
    pub fn export(&mut self) -> EaselResult<ExportedImage> {
        self.apply(SceneMutation::Select(None));
        self.scene.set_chrome_visible(false);
        let result = export_png(&self.scene);
        self.scene.set_chrome_visible(true);
        result
    }

    pub fn export_file_name(&self) -> &str {
        &self.scene.config().export_file_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::Bounds;
    use pretty_assertions::assert_eq;

    fn engine() -> SyncEngine {
        SyncEngine::new(EditorConfig::default(), 800.0, 600.0)
    }

    #[test]
    fn small_jitter_is_a_click() {
        let mut e = engine();
        let id = e.add_bitmap(Bitmap::filled(100, 100, [0; 4]));
        e.handle_input(&InputEvent::down(300.0, 250.0));
        e.handle_input(&InputEvent::moved(301.0, 251.0));
        assert!(!e.is_dragging());
        assert!(e.handle_input(&InputEvent::up(301.0, 251.0)));
        assert_eq!(e.scene.selection(), Some(id));
        assert_eq!(e.scene.node(id).unwrap().x, 250.0);
    }

    #[test]
    fn drag_moves_image_by_full_distance() {
        let mut e = engine();
        let id = e.add_bitmap(Bitmap::filled(100, 100, [0; 4]));
        e.handle_input(&InputEvent::down(300.0, 250.0));
        e.handle_input(&InputEvent::moved(310.0, 250.0));
        assert!(e.is_dragging());
        e.handle_input(&InputEvent::moved(320.0, 270.0));
        e.handle_input(&InputEvent::up(325.0, 270.0));
        let node = e.scene.node(id).unwrap();
        assert_eq!((node.x, node.y), (275.0, 220.0));
        assert_eq!(e.scene.selection(), None, "dragging does not select");
    }

    #[test]
    fn cancelled_press_is_not_a_click() {
        let mut e = engine();
        e.add_bitmap(Bitmap::filled(100, 100, [0; 4]));
        e.handle_input(&InputEvent::down(300.0, 250.0));
        e.handle_input(&InputEvent::moved(301.0, 251.0));
        assert!(!e.handle_input(&InputEvent::cancel(301.0, 251.0)));
        assert_eq!(e.scene.selection(), None);
        // The press is gone: a later release does nothing.
        assert!(!e.handle_input(&InputEvent::up(301.0, 251.0)));
        assert_eq!(e.scene.selection(), None);
    }

    #[test]
    fn cancel_ends_a_drag_in_place() {
        let mut e = engine();
        let id = e.add_bitmap(Bitmap::filled(100, 100, [0; 4]));
        e.handle_input(&InputEvent::down(300.0, 250.0));
        e.handle_input(&InputEvent::moved(320.0, 260.0));
        assert!(e.is_dragging());
        e.handle_input(&InputEvent::cancel(500.0, 500.0));
        assert!(!e.is_dragging());
        let node = e.scene.node(id).unwrap();
        assert_eq!((node.x, node.y), (270.0, 210.0));
        assert_eq!(e.scene.selection(), None);
    }

    #[test]
    fn hover_highlights_anchor() {
        let mut e = engine();
        assert!(e.handle_input(&InputEvent::moved(300.0, 92.0)));
        assert_eq!(e.scene.hovered_anchor(), Some(easel_core::AnchorRole::Top));
        assert!(e.handle_input(&InputEvent::moved(20.0, 20.0)));
        assert_eq!(e.scene.hovered_anchor(), None);
    }

    #[test]
    fn export_clears_selection_and_restores_anchors() {
        let mut e = engine();
        let id = e.add_bitmap(Bitmap::filled(40, 40, [0; 4]));
        e.scene.select(Some(id)).unwrap();
        let out = e.export().unwrap();
        assert_eq!((out.width, out.height), (800, 600));
        assert_eq!(e.scene.selection(), None);
        assert!(e.scene.chrome_visible());
        assert_eq!(e.scene.drawing_area(), Bounds::new(100.0, 100.0, 400.0, 300.0));
        assert_eq!(e.export_file_name(), "workspace-export.png");
    }
}
