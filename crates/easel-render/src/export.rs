//! PNG export of the drawing area.
//!
//! Rendered headlessly with `vello_cpu` into a surface of exactly
//! `area × pixel_ratio` pixels, so the surface bounds are the clip.
//! Content space maps onto it with `scale(ratio) · translate(-area.origin)`;
//! the current pan/zoom plays no part.
//!
//! Paint order: solid background, grid tiles at reduced opacity, then every
//! image of the content layer in paint order.

use crate::grid::{grid_tile, tile_origins};
use easel_core::model::{Bitmap, NodeKind};
use easel_core::{EaselError, EaselResult, Scene};
use kurbo::{Affine, Vec2};
use std::io::Cursor;
use std::sync::Arc;

/// An encoded export.
#[derive(Debug, Clone)]
pub struct ExportedImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Surface size for exporting the scene's drawing area.
pub fn export_size(scene: &Scene) -> EaselResult<(u16, u16)> {
    let area = scene.drawing_area();
    let ratio = scene.config().export_pixel_ratio;
    let dim = |v: f64| -> EaselResult<u16> {
        let px = (v * ratio).round();
        if px < 1.0 || px > f64::from(u16::MAX) {
            return Err(EaselError::export(format!("export dimension {px} is out of range")));
        }
        Ok(px as u16)
    };
    Ok((dim(area.width)?, dim(area.height)?))
}

/// Render the drawing area to straight-alpha RGBA.
pub fn render_export(scene: &Scene) -> EaselResult<image::RgbaImage> {
    let (width, height) = export_size(scene)?;
    let cfg = scene.config();
    let area = scene.drawing_area();
    let base = Affine::scale(cfg.export_pixel_ratio) * Affine::translate(Vec2::new(-area.x, -area.y));

    let mut ctx = vello_cpu::RenderContext::new(width, height);
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

    // Background
    let [r, g, b, a] = cfg.export_background.to_rgba8();
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(width),
        f64::from(height),
    ));

    // Grid
    let tile = grid_tile(&cfg.grid);
    let (tw, th) = tile.dimensions();
    let tile_image = to_cpu_image(&straight_to_premul(tile.as_raw()), tw, th)?;
    let size = f64::from(cfg.grid.size);
    ctx.push_opacity_layer(cfg.grid.export_opacity);
    for (tx, ty) in tile_origins(area.width, area.height, cfg.grid.size) {
        let w = size.min(area.width - tx);
        let h = size.min(area.height - ty);
        ctx.set_transform(affine_to_cpu(
            base * Affine::translate(Vec2::new(area.x + tx, area.y + ty)),
        ));
        ctx.set_paint(tile_image.clone());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
    }
    ctx.pop_layer();

    // Images
    let mut painted = 0usize;
    for id in scene.image_ids() {
        let node = scene.node(id)?;
        let NodeKind::Image { width: w, height: h, bitmap } = node.kind else {
            continue;
        };
        let Some(bmp) = scene.bitmap(bitmap) else {
            log::warn!("image {id} has no bitmap, skipped in export");
            continue;
        };
        if bmp.width == 0 || bmp.height == 0 {
            continue;
        }
        let ratio = cfg.export_pixel_ratio;
        let fitted = fit_to_surface(bmp, w * node.scale_x.abs() * ratio, h * node.scale_y.abs() * ratio);
        let bmp = fitted.as_ref().unwrap_or(bmp);
        let paint = bitmap_to_cpu_image(bmp)?;
        let stretch = Affine::scale_non_uniform(w / f64::from(bmp.width), h / f64::from(bmp.height));
        ctx.set_transform(affine_to_cpu(base * node.transform() * stretch));
        ctx.set_paint(paint);
        let opacity = node.style.opacity;
        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity);
        }
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(bmp.width),
            f64::from(bmp.height),
        ));
        if opacity < 1.0 {
            ctx.pop_layer();
        }
        log::trace!("export: painted {id}");
        painted += 1;
    }

    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(width, height);
    ctx.render_to_pixmap(&mut pixmap);

    let rgba = premul_to_straight(pixmap.data_as_u8_slice());
    log::debug!("export: {width}x{height} surface, {painted} image(s)");
    image::RgbaImage::from_raw(u32::from(width), u32::from(height), rgba)
        .ok_or_else(|| EaselError::export("rendered buffer has the wrong length"))
}

/// Render the drawing area and encode it as PNG.
pub fn export_png(scene: &Scene) -> EaselResult<ExportedImage> {
    let rgba = render_export(scene)?;
    let (width, height) = rgba.dimensions();
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(rgba)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| EaselError::export(e.to_string()))?;
    log::info!("exported {width}x{height} PNG ({} bytes)", png.len());
    Ok(ExportedImage { width, height, png })
}

// ─── Pixel helpers ───────────────────────────────────────────────────────

/// `vello_cpu` pixmaps are limited to `u16` sides. A bitmap over that limit
/// is resampled down to the size it covers on the export surface.
fn fit_to_surface(bmp: &Bitmap, target_w: f64, target_h: f64) -> Option<Bitmap> {
    let limit = u32::from(u16::MAX);
    if bmp.width <= limit && bmp.height <= limit {
        return None;
    }
    let side = |target: f64, natural: u32| (target.ceil() as u32).clamp(1, natural.min(limit));
    let (tw, th) = (side(target_w, bmp.width), side(target_h, bmp.height));
    let src = image::RgbaImage::from_raw(bmp.width, bmp.height, bmp.pixels.to_vec())?;
    let resized = image::imageops::resize(&src, tw, th, image::imageops::FilterType::Triangle);
    log::debug!("export: resampled {}x{} bitmap to {tw}x{th}", bmp.width, bmp.height);
    Some(Bitmap::new(tw, th, resized.into_raw()))
}

fn bitmap_to_cpu_image(bmp: &Bitmap) -> EaselResult<vello_cpu::Image> {
    to_cpu_image(&straight_to_premul(&bmp.pixels), bmp.width, bmp.height)
}

fn to_cpu_image(premul: &[u8], width: u32, height: u32) -> EaselResult<vello_cpu::Image> {
    let w: u16 = width
        .try_into()
        .map_err(|_| EaselError::export("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| EaselError::export("image height exceeds u16"))?;
    if premul.len() != width as usize * height as usize * 4 {
        return Err(EaselError::export("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels = premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn straight_to_premul(rgba: &[u8]) -> Vec<u8> {
    let mut out = rgba.to_vec();
    for px in out.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
    out
}

fn premul_to_straight(premul: &[u8]) -> Vec<u8> {
    let mut out = premul.to_vec();
    for px in out.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
    out
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::{Bounds, EditorConfig};
    use pretty_assertions::assert_eq;

    #[test]
    fn size_follows_area_and_ratio() {
        let scene = Scene::new(EditorConfig::default(), 800.0, 600.0);
        assert_eq!(export_size(&scene).unwrap(), (800, 600));

        let mut scene = scene;
        scene.set_drawing_area(Bounds::new(0.0, 0.0, 100.4, 60.6)).unwrap();
        assert_eq!(export_size(&scene).unwrap(), (201, 121));
    }

    #[test]
    fn oversized_area_is_an_export_error() {
        let mut scene = Scene::new(EditorConfig::default(), 800.0, 600.0);
        scene.set_drawing_area(Bounds::new(0.0, 0.0, 40_000.0, 100.0)).unwrap();
        assert!(matches!(export_size(&scene), Err(EaselError::Export(_))));
    }

    #[test]
    fn bitmaps_beyond_u16_are_resampled() {
        let wide = Bitmap::filled(70_000, 2, [255, 0, 0, 255]);
        let fitted = fit_to_surface(&wide, 400.0, 0.01).unwrap();
        assert_eq!((fitted.width, fitted.height), (400, 1));
        assert_eq!(&fitted.pixels[..4], &[255, 0, 0, 255]);

        let small = Bitmap::filled(300, 20, [0; 4]);
        assert!(fit_to_surface(&small, 50.0, 50.0).is_none());
    }

    #[test]
    fn premultiply_roundtrip_is_close() {
        let src = [100u8, 50, 200, 128, 9, 9, 9, 0, 1, 2, 3, 255];
        let back = premul_to_straight(&straight_to_premul(&src));
        for (a, b) in src.iter().zip(back.iter()).take(4) {
            assert!((i16::from(*a) - i16::from(*b)).abs() <= 1);
        }
        assert_eq!(&back[4..8], &[0, 0, 0, 0]);
        assert_eq!(&back[8..], &[1, 2, 3, 255]);
    }
}
