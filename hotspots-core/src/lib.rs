//! Hotspots Core Library
//!
//! This library provides the cue-point timeline, the playback-time visibility
//! engine and the layout scaling used to place time-bounded annotations
//! ("hotspots") over a video.

pub mod engine;
#[cfg(feature = "serde")]
pub mod feed;
pub mod hotspot;
pub mod layout;
pub mod timeline;

pub use engine::{
    Delta, EngineConfig, EngineState, PlacedHotspot, ResolvedLayout, VisibilityEngine,
    VisibilityUpdate,
};
pub use hotspot::{ClickAction, Hotspot, HotspotIdx, RawLayout, Styles};
pub use layout::{
    FitMode, LayoutStrategy, PixelBox, RelativeLayout, ScaleTransform, Size, StageLayout,
    StageTransform,
};
pub use timeline::{ChangeEvent, ChangeKind, TimelineIndex};

/// Result type for hotspots-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for hotspots-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid size '{0}', expected WIDTHxHEIGHT")]
    InvalidSize(String),
}
