//! Initial size and position of uploaded images.

use crate::model::Bounds;

/// Shrink `(w, h)` so neither side exceeds `max`, preserving aspect ratio.
/// Images already within the limit keep their natural size.
pub fn fit_within(w: f64, h: f64, max: f64) -> (f64, f64) {
    if w > max || h > max {
        let k = max / w.max(h);
        (w * k, h * k)
    } else {
        (w, h)
    }
}

/// Box of size `(w, h)` centered in `area`.
pub fn center_in(area: Bounds, w: f64, h: f64) -> Bounds {
    let c = area.center();
    Bounds::new(c.x - w / 2.0, c.y - h / 2.0, w, h)
}

/// Where a freshly decoded `natural_w × natural_h` image lands.
pub fn place_image(area: Bounds, natural_w: f64, natural_h: f64, max: f64) -> Bounds {
    let (w, h) = fit_within(natural_w, natural_h, max);
    center_in(area, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_image_is_downscaled_and_centered() {
        let area = Bounds::new(100.0, 100.0, 400.0, 300.0);
        let placed = place_image(area, 400.0, 100.0, 200.0);
        assert!(placed.approx_eq(&Bounds::new(200.0, 225.0, 200.0, 50.0), 1e-9));
    }

    #[test]
    fn tall_image_keeps_aspect() {
        let (w, h) = fit_within(300.0, 900.0, 200.0);
        assert!((h - 200.0).abs() < 1e-9);
        assert!((w / h - 300.0 / 900.0).abs() < 1e-9);
    }

    #[test]
    fn small_image_keeps_natural_size() {
        assert_eq!(fit_within(120.0, 200.0, 200.0), (120.0, 200.0));
    }
}
