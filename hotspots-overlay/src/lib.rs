//! Hotspots Overlay Library
//!
//! This library keeps the set of on-screen hotspots in sync with playback,
//! resolving their pixel boxes and click actions for the host player.

pub mod action;
pub mod overlay;

pub use action::{ClickOutcome, LinkTarget};
pub use overlay::{Overlay, RenderedHotspot};

/// Result type for hotspots-overlay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for hotspots-overlay operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown hotspot: {0}")]
    UnknownHotspot(String),

    #[error("Hotspot is not visible: {0}")]
    NotVisible(String),
}
