//! Editor configuration.
//!
//! Every tunable constant of the editor lives here with its default. Hosts
//! can override any subset from JSON; missing fields keep their defaults.

use crate::area::AnchorGeometry;
use crate::error::{EaselError, EaselResult};
use crate::model::{Bounds, Color};
use crate::transformer::TransformerStyle;
use crate::view::{ChromeMetrics, ViewTransform};
use serde::{Deserialize, Serialize};

/// The repeating background grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Tile edge length in pixels.
    pub size: u32,
    pub background: Color,
    pub line: Color,
    /// Grid opacity in exported images.
    pub export_opacity: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: 20,
            background: Color::rgba8(0xf0, 0xf0, 0xf0, 1.0),
            line: Color::rgba8(0x99, 0x99, 0x99, 1.0),
            export_opacity: 0.7,
        }
    }
}

/// Styling of the drawing-area rectangle and its anchors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaStyle {
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f64,
    pub anchor_fill: Color,
    pub anchor_hover_fill: Color,
    pub anchor_stroke: Color,
    pub anchor_corner_radius: f64,
}

impl Default for AreaStyle {
    fn default() -> Self {
        Self {
            fill: Color::rgba(1.0, 1.0, 1.0, 0.7),
            stroke: Color::rgba8(0x99, 0x99, 0x99, 1.0),
            stroke_width: 1.0,
            anchor_fill: Color::BLACK,
            anchor_hover_fill: Color::rgba8(0x44, 0x44, 0x44, 1.0),
            anchor_stroke: Color::WHITE,
            anchor_corner_radius: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub initial_area: Bounds,
    /// Width and height must stay strictly above this.
    pub min_area_size: f64,
    pub anchor_gap: f64,
    pub anchor_thickness: f64,
    pub anchor_length: f64,
    pub area_style: AreaStyle,
    /// Multiplicative zoom per wheel step.
    pub zoom_step: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Uploaded images larger than this on either side are downscaled.
    pub max_upload_size: f64,
    pub export_pixel_ratio: f64,
    pub export_file_name: String,
    pub export_background: Color,
    pub grid: GridConfig,
    pub transformer: TransformerStyle,
    /// Pointer travel (screen px) below which a press-release is a click.
    pub click_tolerance: f64,
    pub stage_background: Color,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            initial_area: Bounds::new(100.0, 100.0, 400.0, 300.0),
            min_area_size: 50.0,
            anchor_gap: 3.0,
            anchor_thickness: 10.0,
            anchor_length: 34.0,
            area_style: AreaStyle::default(),
            zoom_step: 1.1,
            min_scale: 0.1,
            max_scale: 5.0,
            max_upload_size: 200.0,
            export_pixel_ratio: 2.0,
            export_file_name: "workspace-export.png".to_string(),
            export_background: Color::WHITE,
            grid: GridConfig::default(),
            transformer: TransformerStyle::default(),
            click_tolerance: 3.0,
            stage_background: Color::WHITE,
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON override and validate it.
    pub fn from_json(json: &str) -> EaselResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| EaselError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EaselResult<()> {
        if !(self.min_scale > 0.0 && self.min_scale <= self.max_scale) {
            return Err(EaselError::config(format!(
                "scale bounds [{}, {}] are invalid",
                self.min_scale, self.max_scale
            )));
        }
        if self.zoom_step <= 1.0 {
            return Err(EaselError::config("zoom_step must be greater than 1"));
        }
        if self.export_pixel_ratio <= 0.0 {
            return Err(EaselError::config("export_pixel_ratio must be positive"));
        }
        if self.grid.size == 0 {
            return Err(EaselError::config("grid size must be positive"));
        }
        if self.max_upload_size <= 0.0 {
            return Err(EaselError::config("max_upload_size must be positive"));
        }
        crate::area::validate_area(self.initial_area, self.min_area_size)?;
        Ok(())
    }

    /// Anchor geometry for the given view; the gap shrinks with zoom so it
    /// stays the same on screen.
    pub fn anchor_geometry(&self, view: &ViewTransform) -> AnchorGeometry {
        AnchorGeometry {
            thickness: self.anchor_thickness,
            length: self.anchor_length,
            gap: self.anchor_gap / view.scale,
        }
    }

    pub fn chrome(&self, view: &ViewTransform) -> ChromeMetrics {
        let s = view.scale;
        ChromeMetrics {
            anchor_stroke: self.area_style.stroke_width / s,
            handle_size: self.transformer.handle_size / s,
            border_width: self.transformer.border_width / s,
            padding: self.transformer.padding / s,
            rotate_offset: self.transformer.rotate_offset / s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = EditorConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.export_file_name, "workspace-export.png");
    }

    #[test]
    fn partial_json_overrides_only_given_fields() {
        let cfg = EditorConfig::from_json(
            r##"{ "max_upload_size": 300, "grid": { "size": 32 }, "transformer": { "padding": 8 } }"##,
        )
        .unwrap();
        assert_eq!(cfg.max_upload_size, 300.0);
        assert_eq!(cfg.grid.size, 32);
        assert_eq!(cfg.grid.line.to_hex(), "#999999");
        assert_eq!(cfg.transformer.padding, 8.0);
        assert!(cfg.transformer.keep_ratio);
        assert_eq!(cfg.zoom_step, 1.1);
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        assert!(matches!(
            EditorConfig::from_json(r#"{ "min_scale": 6.0 }"#),
            Err(EaselError::Config(_))
        ));
        assert!(EditorConfig::from_json(r#"{ "initial_area": { "x": 0, "y": 0, "width": 40, "height": 300 } }"#).is_err());
        assert!(EditorConfig::from_json("not json").is_err());
    }

    #[test]
    fn chrome_scales_inversely_with_zoom() {
        let cfg = EditorConfig::default();
        let view = ViewTransform {
            scale: 2.0,
            ..ViewTransform::IDENTITY
        };
        let chrome = cfg.chrome(&view);
        assert_eq!(chrome.handle_size, 5.0);
        assert_eq!(cfg.anchor_geometry(&view).gap, 1.5);
    }
}
