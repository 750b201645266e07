//! Scene → Vello drawing commands.
//!
//! Walks the scene tree in paint order under the view transform. Layer
//! clips become Vello clip layers. The transformer overlay is painted last
//! so its handles sit above every image.

use crate::grid::grid_tile;
use easel_core::model::{Bitmap, Color as EaselColor, NodeKind, Paint, Style};
use easel_core::transformer::{border_corners, handle_position};
use easel_core::{NodeIndex, Scene, TransformHandle};
use kurbo::{Affine, BezPath, Rect, RoundedRect, Stroke};
use peniko::{Blob, Color, Extend, Fill, ImageFormat as Format, Image, Mix};
use std::sync::Arc;

/// Paint resources that outlive a frame.
pub struct PaintCache {
    grid: Image,
}

impl PaintCache {
    pub fn new(scene: &Scene) -> Self {
        let tile = grid_tile(&scene.config().grid);
        let (w, h) = tile.dimensions();
        let grid = Image::new(Blob::from(tile.into_raw()), Format::Rgba8, w, h)
            .with_extend(Extend::Repeat);
        Self { grid }
    }
}

/// Paint the whole scene into a freshly-cleared Vello scene.
pub fn paint_scene(out: &mut vello::Scene, scene: &Scene, cache: &PaintCache) {
    let view = scene.view().affine();
    paint_node(out, scene, scene.graph.root, view, cache);
    paint_transformer(out, scene, view);
}

fn paint_node(out: &mut vello::Scene, scene: &Scene, idx: NodeIndex, view: Affine, cache: &PaintCache) {
    let node = &scene.graph.graph[idx];
    if !node.visible {
        return;
    }

    let clipped = match &node.kind {
        NodeKind::Layer { clip: Some(clip) } => {
            out.push_layer(Mix::Clip, 1.0, view, &clip.to_rect());
            true
        }
        _ => false,
    };

    let transform = view * node.transform();
    match &node.kind {
        NodeKind::Stage | NodeKind::Layer { .. } | NodeKind::Transformer => {}

        NodeKind::Rect { width, height } => {
            let rect = Rect::new(0.0, 0.0, *width, *height);
            paint_box(out, &rect.to_rounded_rect(node.style.corner_radius), transform, &node.style, cache);
        }

        NodeKind::Anchor { width, height, .. } => {
            let rect = Rect::new(0.0, 0.0, *width, *height).to_rounded_rect(node.style.corner_radius);
            if let Some(shadow) = &node.style.shadow {
                let color = to_color(shadow.color.with_opacity(shadow.opacity));
                let offset = Affine::translate((shadow.offset_x, shadow.offset_y));
                out.draw_blurred_rounded_rect(
                    transform * offset,
                    rect.rect(),
                    color,
                    node.style.corner_radius,
                    shadow.blur / 2.0,
                );
            }
            paint_box(out, &rect, transform, &node.style, cache);
        }

        NodeKind::Image { width, height, bitmap } => {
            if let Some(bmp) = scene.bitmap(*bitmap) {
                log::trace!("IMAGE {} {}x{} at ({}, {})", node.id, width, height, node.x, node.y);
                paint_bitmap(out, bmp, *width, *height, transform);
            }
        }
    }

    for child in scene.graph.children(idx) {
        paint_node(out, scene, child, view, cache);
    }

    if clipped {
        out.pop_layer();
    }
}

// ─── Shape painters ──────────────────────────────────────────────────────

fn paint_box(out: &mut vello::Scene, shape: &RoundedRect, transform: Affine, style: &Style, cache: &PaintCache) {
    match style.fill {
        Some(Paint::Solid(c)) => {
            out.fill(Fill::NonZero, transform, to_color(c.with_opacity(style.opacity)), None, shape);
        }
        Some(Paint::GridPattern) => {
            out.fill(Fill::NonZero, transform, &cache.grid, None, shape);
        }
        None => {}
    }
    if let Some(stroke) = style.stroke
        && style.stroke_width > 0.0
    {
        let mut s = Stroke::new(style.stroke_width);
        if !style.dash.is_empty() {
            s = s.with_dashes(0.0, style.dash.iter().copied());
        }
        out.stroke(&s, transform, to_color(stroke.with_opacity(style.opacity)), None, shape);
    }
}

fn paint_bitmap(out: &mut vello::Scene, bmp: &Bitmap, width: f64, height: f64, transform: Affine) {
    if bmp.width == 0 || bmp.height == 0 {
        return;
    }
    let data: Arc<dyn AsRef<[u8]> + Send + Sync> = bmp.pixels.clone();
    let image = Image::new(Blob::new(data), Format::Rgba8, bmp.width, bmp.height);
    let stretch = Affine::scale_non_uniform(
        width / f64::from(bmp.width),
        height / f64::from(bmp.height),
    );
    out.draw_image(&image, transform * stretch);
}

fn paint_transformer(out: &mut vello::Scene, scene: &Scene, view: Affine) {
    let Some(target) = scene.transformer_target() else {
        return;
    };
    let style = &scene.config().transformer;
    let chrome = scene.chrome();

    let corners = border_corners(target, &chrome);
    let mut border = BezPath::new();
    border.move_to(corners[0]);
    for c in &corners[1..] {
        border.line_to(*c);
    }
    border.close_path();
    let stroke = Stroke::new(chrome.border_width).with_dashes(
        0.0,
        style.border_dash.iter().map(|d| d / scene.view().scale),
    );
    out.stroke(&stroke, view, to_color(style.border_stroke), None, &border);

    let half = chrome.handle_size / 2.0;
    let handle_rect = Rect::new(-half, -half, half, half);
    let handle_stroke = Stroke::new(1.0 / scene.view().scale);
    for handle in TransformHandle::ALL {
        let c = handle_position(target, handle, &chrome);
        let t = view * Affine::translate(c.to_vec2()) * Affine::rotate(target.rotation.to_radians());
        out.fill(Fill::NonZero, t, to_color(style.handle_fill), None, &handle_rect);
        out.stroke(&handle_stroke, t, to_color(style.handle_stroke), None, &handle_rect);
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn to_color(c: EaselColor) -> Color {
    let [r, g, b, a] = c.to_rgba8();
    Color::from_rgba8(r, g, b, a)
}
