//! Hotspot data structures

use std::collections::BTreeMap;

/// Opaque style map carried through to the renderer
pub type Styles = BTreeMap<String, String>;

/// Index of a hotspot within one item-set generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HotspotIdx(pub u32);

impl HotspotIdx {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Geometry of a hotspot, expressed as fractions of a reference stage
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct RawLayout {
    /// Left edge, 0..1 of the stage width
    pub relative_x: f64,
    /// Top edge, 0..1 of the stage height
    pub relative_y: f64,
    pub relative_width: f64,
    pub relative_height: f64,
    /// Native width of the stage the annotation was authored on
    pub stage_width: f64,
    /// Native height of the stage the annotation was authored on
    pub stage_height: f64,
}

impl RawLayout {
    /// Creates a layout from relative coordinates, without stage size
    pub fn relative(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            relative_x: x,
            relative_y: y,
            relative_width: width,
            relative_height: height,
            stage_width: 0.0,
            stage_height: 0.0,
        }
    }
}

/// Action triggered when the viewer clicks a hotspot
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "camelCase"))]
pub enum ClickAction {
    /// Navigate the current page
    OpenUrl { url: String },
    /// Open the link in a new tab
    OpenUrlInNewTab { url: String },
    /// Seek the player
    JumpToTime {
        #[cfg_attr(feature = "serde", serde(rename = "jumpToTime"))]
        jump_to_time: i64,
    },
}

/// A time-bounded, positioned annotation over the video
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Hotspot {
    pub id: String,
    /// Start time in milliseconds (inclusive)
    pub start_time_ms: Option<i64>,
    /// End time in milliseconds; `None` keeps the hotspot visible until the item-set changes
    pub end_time_ms: Option<i64>,
    pub label: Option<String>,
    pub raw_layout: RawLayout,
    pub styles: Styles,
    pub on_click: Option<ClickAction>,
}

impl Hotspot {
    /// Creates a hotspot with an empty layout and no styles
    pub fn new(
        id: impl Into<String>,
        start_time_ms: Option<i64>,
        end_time_ms: Option<i64>,
    ) -> Self {
        Self {
            id: id.into(),
            start_time_ms,
            end_time_ms,
            label: None,
            raw_layout: RawLayout::default(),
            styles: Styles::new(),
            on_click: None,
        }
    }

    pub fn with_layout(mut self, raw_layout: RawLayout) -> Self {
        self.raw_layout = raw_layout;
        self
    }

    pub fn with_styles(mut self, styles: Styles) -> Self {
        self.styles = styles;
        self
    }

    pub fn with_click(mut self, action: ClickAction) -> Self {
        self.on_click = Some(action);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns the start time if it can be placed on a timeline
    pub fn valid_start(&self) -> Option<i64> {
        self.start_time_ms.filter(|t| *t >= 0)
    }

    /// Returns the end time if it can be placed on a timeline
    pub fn valid_end(&self) -> Option<i64> {
        self.end_time_ms.filter(|t| *t >= 0)
    }

    /// Checks whether this hotspot takes part in the timeline at all
    pub fn is_schedulable(&self) -> bool {
        self.valid_start().is_some()
    }
}
