//! WASM bridge for Easel: exposes the editor engine to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. Pages either drive an
//! [`EaselCanvas`] themselves or call [`mount`] to have the canvas, the
//! upload/export buttons and the window listeners wired up from Rust.

mod dom;
mod logger;
mod render2d;

pub use dom::mount;

use easel_core::{EaselError, EditorConfig};
use easel_editor::{InputEvent, Modifiers, SyncEngine};
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// The main WASM-facing canvas controller.
///
/// Holds the sync engine and the Canvas2D resource cache. All interaction
/// from JS goes through this struct; every `handle_*` method returns
/// whether a redraw is needed.
#[wasm_bindgen]
pub struct EaselCanvas {
    engine: SyncEngine,
    cache: render2d::RenderCache,
}

#[wasm_bindgen]
impl EaselCanvas {
    /// Create a new canvas controller with the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();
        Self::from_config(EditorConfig::default(), width, height)
    }

    /// Create a controller from a partial JSON configuration override.
    pub fn with_config(width: f64, height: f64, json: &str) -> Result<EaselCanvas, JsValue> {
        console_error_panic_hook_setup();
        let config = EditorConfig::from_json(json).map_err(js_error)?;
        Ok(Self::from_config(config, width, height))
    }

    /// Render the scene to a Canvas2D context.
    pub fn render(&mut self, ctx: &CanvasRenderingContext2d) {
        render2d::render_scene(ctx, &self.engine.scene, &mut self.cache);
    }

    /// Resize the stage to the host surface.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.engine.resize(width, height);
    }

    pub fn handle_pointer_down(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let modifiers = Modifiers { ctrl, shift, alt, meta };
        self.engine.handle_input(&InputEvent::PointerDown { x, y, modifiers })
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let modifiers = Modifiers { ctrl, shift, alt, meta };
        self.engine.handle_input(&InputEvent::PointerMove { x, y, modifiers })
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let modifiers = Modifiers { ctrl, shift, alt, meta };
        self.engine.handle_input(&InputEvent::PointerUp { x, y, modifiers })
    }

    /// The platform took the pointer away. Ends a drag without a click.
    pub fn handle_pointer_cancel(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let modifiers = Modifiers { ctrl, shift, alt, meta };
        self.engine.handle_input(&InputEvent::PointerCancel { x, y, modifiers })
    }

    /// Handle a wheel event. Pinch gestures arrive with `ctrl` set.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_wheel(
        &mut self,
        x: f64,
        y: f64,
        dx: f64,
        dy: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let modifiers = Modifiers { ctrl, shift, alt, meta };
        self.engine.handle_input(&InputEvent::wheel(x, y, dx, dy, modifiers))
    }

    /// Whether a drag gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        self.engine.is_dragging()
    }

    /// Decode an uploaded file and place it in the drawing area.
    /// Returns the new node's ID.
    pub fn add_image(&mut self, bytes: &[u8]) -> Result<String, JsValue> {
        self.engine
            .add_image(bytes)
            .map(|id| id.as_str().to_string())
            .map_err(js_error)
    }

    /// Export the drawing area as PNG bytes.
    pub fn export_png(&mut self) -> Result<Vec<u8>, JsValue> {
        let out = self.engine.export().map_err(js_error)?;
        log::info!("export: {}x{} PNG, {} bytes", out.width, out.height, out.png.len());
        Ok(out.png)
    }

    /// File name the PNG download should use.
    pub fn export_file_name(&self) -> String {
        self.engine.export_file_name().to_string()
    }

    /// Editor state as JSON: drawing area, view, selection and images.
    pub fn state_json(&self) -> String {
        serde_json::to_string(&self.engine.scene.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

impl EaselCanvas {
    fn from_config(config: EditorConfig, width: f64, height: f64) -> Self {
        Self {
            engine: SyncEngine::new(config, width, height),
            cache: render2d::RenderCache::new(),
        }
    }
}

/// Set the console log level (`"error"` .. `"trace"`, or `"off"`).
/// Returns `false` for an unknown level name.
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> bool {
    match level.parse::<log::LevelFilter>() {
        Ok(filter) => {
            logger::init(filter);
            true
        }
        Err(_) => false,
    }
}

fn js_error(err: EaselError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Easel WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state(canvas: &EaselCanvas) -> serde_json::Value {
        serde_json::from_str(&canvas.state_json()).unwrap()
    }

    #[test]
    fn anchor_drag_shows_up_in_state() {
        let mut canvas = EaselCanvas::new(1024.0, 768.0);
        assert!(!canvas.handle_pointer_down(508.0, 250.0, false, false, false, false));
        canvas.handle_pointer_move(608.0, 250.0, false, false, false, false);
        assert!(canvas.is_dragging());
        canvas.handle_pointer_up(608.0, 250.0, false, false, false, false);

        let s = state(&canvas);
        let width = s["drawing_area"]["width"].as_f64().unwrap();
        assert!((width - 500.0).abs() < 1e-6, "{width}");
        assert_eq!(s["selection"], serde_json::Value::Null);
    }

    #[test]
    fn cancelled_anchor_drag_stops_dragging() {
        let mut canvas = EaselCanvas::new(1024.0, 768.0);
        canvas.handle_pointer_down(508.0, 250.0, false, false, false, false);
        canvas.handle_pointer_move(608.0, 250.0, false, false, false, false);
        assert!(canvas.is_dragging());
        canvas.handle_pointer_cancel(608.0, 250.0, false, false, false, false);
        assert!(!canvas.is_dragging());
        let width = state(&canvas)["drawing_area"]["width"].as_f64().unwrap();
        assert!((width - 500.0).abs() < 1e-6, "{width}");
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        assert!(!set_log_level("chatty"));
    }

    #[test]
    fn pinch_wheel_zooms() {
        let mut canvas = EaselCanvas::new(800.0, 600.0);
        assert!(canvas.handle_wheel(100.0, 100.0, 0.0, -4.0, false, true, false, false));
        let scale = state(&canvas)["view"]["scale"].as_f64().unwrap();
        assert!((scale - 1.1).abs() < 1e-9);
    }

    #[test]
    fn default_file_name() {
        let canvas = EaselCanvas::new(800.0, 600.0);
        assert_eq!(canvas.export_file_name(), "workspace-export.png");
    }
}
