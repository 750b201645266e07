//! Integration tests: scene → vello_cpu raster → PNG bytes.

use easel_core::{Bitmap, Bounds, EditorConfig, Scene, ViewTransform};
use easel_render::{export_png, render_export};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn scene() -> Scene {
    Scene::new(EditorConfig::default(), 1024.0, 768.0)
}

#[test]
fn default_area_exports_at_double_resolution() {
    init_logger();
    let exported = export_png(&scene()).unwrap();
    assert_eq!((exported.width, exported.height), (800, 600));

    let decoded = image::load_from_memory(&exported.png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (800, 600));
}

#[test]
fn export_ignores_pan_and_zoom() {
    init_logger();
    let mut a = scene();
    a.add_image(Bitmap::filled(120, 80, [10, 200, 30, 255]));
    let mut b = a.clone();
    b.set_view(ViewTransform {
        scale: 2.7,
        offset_x: -311.0,
        offset_y: 48.0,
    });
    assert_eq!(render_export(&a).unwrap(), render_export(&b).unwrap());
}

#[test]
fn image_pixels_land_inside_the_frame() {
    init_logger();
    let mut scene = scene();
    // 400×100 → 200×50 at (200, 225); in export pixels (200, 250)-(600, 350).
    scene.add_image(Bitmap::filled(400, 100, [255, 0, 0, 255]));
    let out = render_export(&scene).unwrap();

    assert_eq!(out.get_pixel(400, 300).0, [255, 0, 0, 255]);
    // Outside the image: white under a 70% grid, fully opaque, not red.
    let bg = out.get_pixel(50, 50).0;
    assert_eq!(bg[3], 255);
    assert!(bg[0] > 150 && bg[1] > 150, "unexpected background {bg:?}");
}

#[test]
fn images_outside_the_area_are_clipped_away() {
    init_logger();
    let mut scene = scene();
    let id = scene.add_image(Bitmap::filled(100, 100, [0, 0, 255, 255]));
    scene.node_mut(id).unwrap().x = 900.0;
    let without = {
        let mut s = Scene::new(EditorConfig::default(), 1024.0, 768.0);
        s.set_drawing_area(Bounds::new(100.0, 100.0, 400.0, 300.0)).unwrap();
        render_export(&s).unwrap()
    };
    assert_eq!(render_export(&scene).unwrap(), without);
}

#[test]
fn resized_area_changes_output_size() {
    init_logger();
    let mut scene = scene();
    scene.set_drawing_area(Bounds::new(-40.0, 10.0, 123.0, 77.0)).unwrap();
    let exported = export_png(&scene).unwrap();
    assert_eq!((exported.width, exported.height), (246, 154));
}

/// Export pixel covering a content-space point of the default area.
fn export_px(p: kurbo::Point) -> (u32, u32) {
    (((p.x - 100.0) * 2.0) as u32, ((p.y - 100.0) * 2.0) as u32)
}

#[test]
fn rotated_image_keeps_its_transform() {
    init_logger();
    let mut scene = scene();
    let id = scene.add_image(Bitmap::filled(100, 40, [0, 160, 0, 255]));
    let node = scene.node_mut(id).unwrap();
    node.rotation = 90.0;
    let node = scene.node(id).unwrap().clone();
    let out = render_export(&scene).unwrap();

    let (x, y) = export_px(node.transform() * kurbo::Point::new(80.0, 20.0));
    assert_eq!(out.get_pixel(x, y).0, [0, 160, 0, 255]);

    // Where the unrotated image would reach; empty after the quarter turn.
    let (x, y) = export_px(kurbo::Point::new(node.x + 80.0, node.y + 20.0));
    assert_ne!(out.get_pixel(x, y).0, [0, 160, 0, 255]);
}

#[test]
fn mid_gesture_scale_is_exported() {
    init_logger();
    let mut scene = scene();
    let id = scene.add_image(Bitmap::filled(100, 40, [0, 0, 200, 255]));
    scene.node_mut(id).unwrap().scale_x = 1.5;
    let node = scene.node(id).unwrap().clone();
    let out = render_export(&scene).unwrap();

    // Local x 90 sits at 135 content units from the origin once stretched.
    let p = node.transform() * kurbo::Point::new(90.0, 20.0);
    assert!((p.x - (node.x + 135.0)).abs() < 1e-9);
    let (x, y) = export_px(p);
    assert_eq!(out.get_pixel(x, y).0, [0, 0, 200, 255]);
}

#[test]
fn very_wide_upload_still_exports() {
    init_logger();
    let mut scene = scene();
    scene.add_image(Bitmap::filled(70_000, 2, [255, 0, 0, 255]));
    let exported = export_png(&scene).unwrap();
    assert_eq!((exported.width, exported.height), (800, 600));
}
