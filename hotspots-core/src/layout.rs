//! Aspect-fit scaling of hotspot geometry onto the player viewport

use crate::hotspot::{RawLayout, Styles};
use crate::Error;
use std::fmt;
use std::str::FromStr;

/// Width and height in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Checks that both dimensions are strictly positive
    pub fn is_positive(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

impl FromStr for Size {
    type Err = Error;

    /// Parses `WIDTHxHEIGHT`, e.g. `1280x720`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidSize(s.to_string());
        let (w, h) = s
            .split_once(|c: char| c == 'x' || c == 'X')
            .ok_or_else(invalid)?;
        let width = w.trim().parse::<f64>().map_err(|_| invalid())?;
        let height = h.trim().parse::<f64>().map_err(|_| invalid())?;
        if !width.is_finite() || !height.is_finite() {
            return Err(invalid());
        }
        Ok(Self::new(width, height))
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Resolved on-screen box of a hotspot, in viewport pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PixelBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// How native content is fitted into the viewport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FitMode {
    /// Letterbox/pillarbox: the whole content is visible
    #[default]
    Contain,
    /// The content covers the whole viewport and is cropped
    Cover,
}

/// Fitted content box inside the viewport
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScaleTransform {
    /// Fitted content width
    pub width: f64,
    /// Fitted content height
    pub height: f64,
    /// Horizontal offset of the fitted box from the viewport's left edge
    pub left: f64,
    /// Vertical offset of the fitted box from the viewport's top edge
    pub top: f64,
    pub scale_to_target_width: bool,
}

impl ScaleTransform {
    /// Fits `content` into `viewport` preserving aspect ratio, centered.
    ///
    /// Any non-positive dimension yields the all-zero transform.
    pub fn fit(content: Size, viewport: Size, mode: FitMode) -> Self {
        if !content.is_positive() || !viewport.is_positive() {
            return Self {
                scale_to_target_width: true,
                ..Self::default()
            };
        }

        // scale to the viewport width
        let width_fit = Size::new(
            viewport.width,
            content.height * viewport.width / content.width,
        );
        // scale to the viewport height
        let height_fit = Size::new(
            content.width * viewport.height / content.height,
            viewport.height,
        );

        let height_fit_overflows = height_fit.width > viewport.width;
        let scale_to_target_width = match mode {
            FitMode::Contain => height_fit_overflows,
            FitMode::Cover => !height_fit_overflows,
        };

        let fitted = if scale_to_target_width {
            width_fit
        } else {
            height_fit
        };
        let width = fitted.width.abs();
        let height = fitted.height.abs();

        Self {
            width,
            height,
            left: (viewport.width - width) / 2.0,
            top: (viewport.height - height) / 2.0,
            scale_to_target_width,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Maps normalized hotspot geometry onto the fitted content box
pub fn resolve_item_box(raw: &RawLayout, transform: &ScaleTransform) -> PixelBox {
    PixelBox {
        x: transform.left + raw.relative_x * transform.width,
        y: transform.top + raw.relative_y * transform.height,
        width: raw.relative_width * transform.width,
        height: raw.relative_height * transform.height,
    }
}

/// Scale factor that makes `object` fit entirely inside `container`
pub fn contain(container: Size, object: Size) -> f64 {
    (container.width / object.width).min(container.height / object.height)
}

/// Scale factor that makes `object` cover the whole of `container`
pub fn cover(container: Size, object: Size) -> f64 {
    (container.width / object.width).max(container.height / object.height)
}

/// Uniform transform of a fixed-size stage over the player, origin top left
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl StageTransform {
    /// Computes the transform for a stage authored over a video that is
    /// fitted into the player and centered.
    ///
    /// Returns `None` when any size is not strictly positive.
    pub fn compute(player: Size, video: Size, stage: Size) -> Option<Self> {
        if !player.is_positive() || !video.is_positive() || !stage.is_positive() {
            return None;
        }
        let scale = contain(player, video) * cover(video, stage);
        Some(Self {
            scale,
            offset_x: (player.width - stage.width * scale) / 2.0,
            offset_y: (player.height - stage.height * scale) / 2.0,
        })
    }

    /// Maps a point in stage pixels to player pixels
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.offset_x + x * self.scale, self.offset_y + y * self.scale)
    }
}

impl fmt::Display for StageTransform {
    /// CSS form, e.g. `translate(0.0px, 60.0px) scale(0.5000)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({:.1}px, {:.1}px) scale({:.4})",
            self.offset_x, self.offset_y, self.scale
        )
    }
}

/// Strategy turning raw hotspot geometry into viewport pixels
pub trait LayoutStrategy {
    type Transform: Copy + fmt::Debug;

    /// Computes the transform for the given content and viewport sizes, or
    /// `None` while the sizes cannot produce a usable layout.
    fn fit(&self, content: Size, viewport: Size) -> Option<Self::Transform>;

    fn resolve_box(&self, raw: &RawLayout, transform: &Self::Transform) -> PixelBox;

    /// Adapts style values to the transform. Passes styles through by default.
    fn resolve_style(&self, styles: &Styles, _transform: &Self::Transform) -> Styles {
        styles.clone()
    }
}

/// Hotspots positioned as fractions of the fitted video box
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelativeLayout {
    pub mode: FitMode,
}

impl RelativeLayout {
    pub fn new(mode: FitMode) -> Self {
        Self { mode }
    }
}

impl LayoutStrategy for RelativeLayout {
    type Transform = ScaleTransform;

    fn fit(&self, content: Size, viewport: Size) -> Option<ScaleTransform> {
        let transform = ScaleTransform::fit(content, viewport, self.mode);
        (!transform.is_degenerate()).then_some(transform)
    }

    fn resolve_box(&self, raw: &RawLayout, transform: &ScaleTransform) -> PixelBox {
        resolve_item_box(raw, transform)
    }
}

/// Style keys holding pixel lengths that follow the stage scale
const SCALED_STYLE_KEYS: &[&str] = &[
    "font-size",
    "fontSize",
    "border-width",
    "borderWidth",
    "border-radius",
    "borderRadius",
    "letter-spacing",
    "letterSpacing",
    "line-height",
    "lineHeight",
];

/// Hotspots positioned in pixels of a fixed authoring stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageLayout {
    pub stage: Size,
}

impl StageLayout {
    pub fn new(stage: Size) -> Self {
        Self { stage }
    }
}

impl LayoutStrategy for StageLayout {
    type Transform = StageTransform;

    fn fit(&self, content: Size, viewport: Size) -> Option<StageTransform> {
        StageTransform::compute(viewport, content, self.stage)
    }

    fn resolve_box(&self, raw: &RawLayout, transform: &StageTransform) -> PixelBox {
        let (x, y) = transform.apply(
            raw.relative_x * self.stage.width,
            raw.relative_y * self.stage.height,
        );
        PixelBox {
            x,
            y,
            width: raw.relative_width * self.stage.width * transform.scale,
            height: raw.relative_height * self.stage.height * transform.scale,
        }
    }

    fn resolve_style(&self, styles: &Styles, transform: &StageTransform) -> Styles {
        styles
            .iter()
            .map(|(key, value)| {
                let scaled = SCALED_STYLE_KEYS
                    .contains(&key.as_str())
                    .then(|| scale_px(value, transform.scale))
                    .flatten();
                (key.clone(), scaled.unwrap_or_else(|| value.clone()))
            })
            .collect()
    }
}

/// Scales a `<number>px` value, leaving anything else alone
fn scale_px(value: &str, scale: f64) -> Option<String> {
    let number = value.trim().strip_suffix("px")?.trim().parse::<f64>().ok()?;
    Some(format!("{:.1}px", number * scale))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-2
    }

    #[test]
    fn contain_letterboxes_wide_video() {
        let t = ScaleTransform::fit(
            Size::new(1280.0, 720.0),
            Size::new(640.0, 480.0),
            FitMode::Contain,
        );
        assert!(t.scale_to_target_width);
        assert_eq!(t.width, 640.0);
        assert_eq!(t.height, 360.0);
        assert_eq!(t.left, 0.0);
        assert_eq!(t.top, 60.0);
    }

    #[test]
    fn cover_fills_height_of_narrow_viewport() {
        let t = ScaleTransform::fit(
            Size::new(1280.0, 720.0),
            Size::new(640.0, 480.0),
            FitMode::Cover,
        );
        assert!(!t.scale_to_target_width);
        assert_eq!(t.height, 480.0);
        assert!(approx(t.width, 853.33));
        assert!(approx(t.left.abs(), 106.67));
        assert!(t.left < 0.0);
        assert_eq!(t.top, 0.0);
    }

    #[test]
    fn contain_pillarboxes_tall_video() {
        let t = ScaleTransform::fit(
            Size::new(720.0, 1280.0),
            Size::new(1280.0, 720.0),
            FitMode::Contain,
        );
        assert!(!t.scale_to_target_width);
        assert_eq!(t.height, 720.0);
        assert!(approx(t.width, 405.0));
        assert!(approx(t.left, 437.5));
        assert_eq!(t.top, 0.0);
    }

    #[test]
    fn degenerate_sizes_give_zero_transform() {
        for (content, viewport) in [
            (Size::new(0.0, 720.0), Size::new(640.0, 480.0)),
            (Size::new(1280.0, -1.0), Size::new(640.0, 480.0)),
            (Size::new(1280.0, 720.0), Size::new(0.0, 480.0)),
            (Size::new(1280.0, 720.0), Size::new(640.0, 0.0)),
        ] {
            let t = ScaleTransform::fit(content, viewport, FitMode::Contain);
            assert!(t.is_degenerate());
            assert_eq!((t.width, t.height, t.left, t.top), (0.0, 0.0, 0.0, 0.0));
            assert_eq!(RelativeLayout::default().fit(content, viewport), None);
        }
    }

    #[test]
    fn item_box_in_letterboxed_video() {
        let t = ScaleTransform::fit(
            Size::new(1280.0, 720.0),
            Size::new(640.0, 480.0),
            FitMode::Contain,
        );
        let b = resolve_item_box(&RawLayout::relative(0.5, 0.25, 0.25, 0.5), &t);
        assert_eq!(
            b,
            PixelBox {
                x: 320.0,
                y: 150.0,
                width: 160.0,
                height: 180.0
            }
        );
    }

    #[test]
    fn stage_transform_css() {
        let t = StageTransform::compute(
            Size::new(640.0, 480.0),
            Size::new(1280.0, 720.0),
            Size::new(1280.0, 720.0),
        )
        .unwrap();
        assert_eq!(t.scale, 0.5);
        assert_eq!(t.offset_x, 0.0);
        assert_eq!(t.offset_y, 60.0);
        assert_eq!(t.to_string(), "translate(0.0px, 60.0px) scale(0.5000)");
    }

    #[test]
    fn stage_transform_rejects_empty_stage() {
        let t = StageTransform::compute(
            Size::new(640.0, 480.0),
            Size::new(1280.0, 720.0),
            Size::default(),
        );
        assert_eq!(t, None);
    }

    #[test]
    fn stage_layout_matches_relative_layout_for_same_aspect() {
        let content = Size::new(1280.0, 720.0);
        let viewport = Size::new(640.0, 480.0);
        let raw = RawLayout::relative(0.1, 0.2, 0.3, 0.4);

        let relative = RelativeLayout::default();
        let rt = relative.fit(content, viewport).unwrap();
        let stage = StageLayout::new(Size::new(1920.0, 1080.0));
        let st = stage.fit(content, viewport).unwrap();

        let a = relative.resolve_box(&raw, &rt);
        let b = stage.resolve_box(&raw, &st);
        assert!(approx(a.x, b.x) && approx(a.y, b.y));
        assert!(approx(a.width, b.width) && approx(a.height, b.height));
    }

    #[test]
    fn stage_layout_scales_pixel_styles() {
        let stage = StageLayout::new(Size::new(1280.0, 720.0));
        let t = stage
            .fit(Size::new(1280.0, 720.0), Size::new(640.0, 480.0))
            .unwrap();

        let mut styles = Styles::new();
        styles.insert("fontSize".to_string(), "16px".to_string());
        styles.insert("border-radius".to_string(), "4 px".to_string());
        styles.insert("color".to_string(), "#fff".to_string());
        styles.insert("line-height".to_string(), "1.5".to_string());

        let resolved = stage.resolve_style(&styles, &t);
        assert_eq!(resolved["fontSize"], "8.0px");
        assert_eq!(resolved["border-radius"], "2.0px");
        assert_eq!(resolved["color"], "#fff");
        assert_eq!(resolved["line-height"], "1.5");

        let relative = RelativeLayout::default();
        let unscaled = relative.resolve_style(&styles, &ScaleTransform::default());
        assert_eq!(unscaled, styles);
    }

    #[test]
    fn parse_size() {
        assert_eq!("1280x720".parse::<Size>().unwrap(), Size::new(1280.0, 720.0));
        assert_eq!("640X480".parse::<Size>().unwrap(), Size::new(640.0, 480.0));
        assert!("1280".parse::<Size>().is_err());
        assert!("wide x tall".parse::<Size>().is_err());
    }
}
