//! Canvas2D renderer.
//!
//! Walks the scene tree in paint order and draws to an HTML `<canvas>` via
//! `CanvasRenderingContext2d`. Every node is drawn under an absolute
//! `view × node` transform; layer clips are applied in content space and
//! stay in effect for the layer's children. The transformer overlay is
//! drawn after the tree.

use easel_core::model::{Bitmap, BitmapId, NodeKind, Paint, SceneNode, Style};
use easel_core::transformer::{border_corners, handle_position};
use easel_core::{NodeIndex, Scene, TransformHandle};
use easel_render::grid_tile;
use kurbo::Affine;
use std::collections::HashMap;
use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasPattern, CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

/// Offscreen canvases reused across frames: the grid pattern and one
/// canvas per uploaded bitmap.
#[derive(Default)]
pub struct RenderCache {
    grid: Option<CanvasPattern>,
    bitmaps: HashMap<BitmapId, HtmlCanvasElement>,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn grid(&mut self, ctx: &CanvasRenderingContext2d, scene: &Scene) -> Option<&CanvasPattern> {
        if self.grid.is_none() {
            let tile = grid_tile(&scene.config().grid);
            let (w, h) = tile.dimensions();
            match offscreen_canvas(tile.as_raw(), w, h).and_then(|canvas| {
                ctx.create_pattern_with_html_canvas_element(&canvas, "repeat")
            }) {
                Ok(pattern) => self.grid = pattern,
                Err(err) => log::warn!("grid pattern unavailable: {err:?}"),
            }
        }
        self.grid.as_ref()
    }

    fn bitmap(&mut self, id: BitmapId, bmp: &Bitmap) -> Option<&HtmlCanvasElement> {
        if !self.bitmaps.contains_key(&id) {
            match offscreen_canvas(&bmp.pixels, bmp.width, bmp.height) {
                Ok(canvas) => {
                    self.bitmaps.insert(id, canvas);
                }
                Err(err) => {
                    log::warn!("bitmap {id:?} not drawable: {err:?}");
                    return None;
                }
            }
        }
        self.bitmaps.get(&id)
    }
}

/// Render the entire scene to a Canvas2D context.
pub fn render_scene(ctx: &CanvasRenderingContext2d, scene: &Scene, cache: &mut RenderCache) {
    let (width, height) = scene.stage_size();
    let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    ctx.clear_rect(0.0, 0.0, width, height);
    ctx.set_fill_style_str(&scene.config().stage_background.to_css());
    ctx.fill_rect(0.0, 0.0, width, height);

    let view = scene.view().affine();
    render_node(ctx, scene, scene.graph.root, view, cache);
    draw_transformer(ctx, scene, view);

    let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
}

fn render_node(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene,
    idx: NodeIndex,
    view: Affine,
    cache: &mut RenderCache,
) {
    let node = &scene.graph.graph[idx];
    if !node.visible {
        return;
    }

    let clipped = match &node.kind {
        NodeKind::Layer { clip: Some(clip) } => {
            ctx.save();
            set_affine(ctx, view);
            ctx.begin_path();
            ctx.rect(clip.x, clip.y, clip.width, clip.height);
            ctx.clip();
            true
        }
        _ => false,
    };

    let transform = view * node.transform();
    match &node.kind {
        NodeKind::Stage | NodeKind::Layer { .. } | NodeKind::Transformer => {}
        NodeKind::Rect { width, height } => {
            set_affine(ctx, transform);
            draw_box(ctx, scene, node, *width, *height, cache);
        }
        NodeKind::Anchor { width, height, .. } => {
            set_affine(ctx, transform);
            draw_box(ctx, scene, node, *width, *height, cache);
        }
        NodeKind::Image { width, height, bitmap } => {
            if let Some(bmp) = scene.bitmap(*bitmap)
                && let Some(canvas) = cache.bitmap(*bitmap, bmp)
            {
                log::trace!("IMAGE {} {}x{} at ({}, {})", node.id, width, height, node.x, node.y);
                set_affine(ctx, transform);
                let _ = ctx.draw_image_with_html_canvas_element_and_dw_and_dh(canvas, 0.0, 0.0, *width, *height);
            }
        }
    }

    for child in scene.graph.children(idx) {
        render_node(ctx, scene, child, view, cache);
    }

    if clipped {
        ctx.restore();
    }
}

// ─── Shapes ──────────────────────────────────────────────────────────────

fn draw_box(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene,
    node: &SceneNode,
    w: f64,
    h: f64,
    cache: &mut RenderCache,
) {
    let style = &node.style;
    ctx.save();
    rounded_rect_path(ctx, 0.0, 0.0, w, h, style.corner_radius);

    match style.fill {
        Some(Paint::Solid(c)) => {
            apply_shadow(ctx, style, scene.view().scale);
            ctx.set_fill_style_str(&c.with_opacity(style.opacity).to_css());
            ctx.fill();
            clear_shadow(ctx);
        }
        Some(Paint::GridPattern) => {
            if let Some(pattern) = cache.grid(ctx, scene) {
                ctx.set_fill_style_canvas_pattern(pattern);
                ctx.fill();
            }
        }
        None => {}
    }

    if let Some(stroke) = style.stroke
        && style.stroke_width > 0.0
    {
        ctx.set_stroke_style_str(&stroke.with_opacity(style.opacity).to_css());
        ctx.set_line_width(style.stroke_width);
        if !style.dash.is_empty() {
            let _ = ctx.set_line_dash(&dash_array(style.dash.iter().copied()));
        }
        ctx.stroke();
    }
    ctx.restore();
}

fn draw_transformer(ctx: &CanvasRenderingContext2d, scene: &Scene, view: Affine) {
    let Some(target) = scene.transformer_target() else {
        return;
    };
    let style = &scene.config().transformer;
    let chrome = scene.chrome();
    let scale = scene.view().scale;

    ctx.save();
    set_affine(ctx, view);
    let corners = border_corners(target, &chrome);
    ctx.begin_path();
    ctx.move_to(corners[0].x, corners[0].y);
    for c in &corners[1..] {
        ctx.line_to(c.x, c.y);
    }
    ctx.close_path();
    ctx.set_stroke_style_str(&style.border_stroke.to_css());
    ctx.set_line_width(chrome.border_width);
    let _ = ctx.set_line_dash(&dash_array(style.border_dash.iter().map(|d| d / scale)));
    ctx.stroke();
    let _ = ctx.set_line_dash(&js_sys::Array::new());

    let half = chrome.handle_size / 2.0;
    ctx.set_fill_style_str(&style.handle_fill.to_css());
    ctx.set_stroke_style_str(&style.handle_stroke.to_css());
    ctx.set_line_width(1.0 / scale);
    for handle in TransformHandle::ALL {
        let c = handle_position(target, handle, &chrome);
        set_affine(ctx, view * Affine::translate(c.to_vec2()) * Affine::rotate(target.rotation.to_radians()));
        ctx.begin_path();
        ctx.rect(-half, -half, chrome.handle_size, chrome.handle_size);
        ctx.fill();
        ctx.stroke();
    }
    ctx.restore();
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn set_affine(ctx: &CanvasRenderingContext2d, t: Affine) {
    let [a, b, c, d, e, f] = t.as_coeffs();
    let _ = ctx.set_transform(a, b, c, d, e, f);
}

fn dash_array(dashes: impl Iterator<Item = f64>) -> js_sys::Array {
    dashes.map(JsValue::from_f64).collect()
}

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    ctx.begin_path();
    if r == 0.0 {
        ctx.rect(x, y, w, h);
        return;
    }
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    ctx.arc_to(x + w, y, x + w, y + r, r).unwrap_or(());
    ctx.line_to(x + w, y + h - r);
    ctx.arc_to(x + w, y + h, x + w - r, y + h, r).unwrap_or(());
    ctx.line_to(x + r, y + h);
    ctx.arc_to(x, y + h, x, y + h - r, r).unwrap_or(());
    ctx.line_to(x, y + r);
    ctx.arc_to(x, y, x + r, y, r).unwrap_or(());
    ctx.close_path();
}

/// Canvas shadows are measured in device pixels, so the blur follows the
/// view scale to match the shape.
fn apply_shadow(ctx: &CanvasRenderingContext2d, style: &Style, scale: f64) {
    if let Some(ref shadow) = style.shadow {
        ctx.set_shadow_blur(shadow.blur * scale);
        ctx.set_shadow_offset_x(shadow.offset_x * scale);
        ctx.set_shadow_offset_y(shadow.offset_y * scale);
        ctx.set_shadow_color(&shadow.color.with_opacity(shadow.opacity).to_css());
    }
}

/// Clear shadow after fill so stroke doesn't inherit it.
fn clear_shadow(ctx: &CanvasRenderingContext2d) {
    ctx.set_shadow_blur(0.0);
    ctx.set_shadow_offset_x(0.0);
    ctx.set_shadow_offset_y(0.0);
    ctx.set_shadow_color("transparent");
}

/// Copy straight-alpha RGBA8 pixels into a fresh detached canvas.
fn offscreen_canvas(pixels: &[u8], width: u32, height: u32) -> Result<HtmlCanvasElement, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    canvas.set_width(width);
    canvas.set_height(height);
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;
    let data = ImageData::new_with_u8_clamped_array_and_sh(Clamped(pixels), width, height)?;
    ctx.put_image_data(&data, 0.0, 0.0)?;
    Ok(canvas)
}
