//! On-screen hotspot set driven by visibility updates

use crate::action::{resolve_click, ClickOutcome};
use crate::{Error, Result};
use hotspots_core::{
    ClickAction, Hotspot, HotspotIdx, LayoutStrategy, PixelBox, RelativeLayout, Size, Styles,
    VisibilityEngine, VisibilityUpdate,
};
use tracing::debug;

/// A hotspot ready to be drawn
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedHotspot {
    pub idx: HotspotIdx,
    pub id: String,
    pub label: Option<String>,
    pub bounds: PixelBox,
    pub styles: Styles,
    pub action: Option<ClickAction>,
}

/// Overlay that keeps the rendered hotspot set in sync with playback
pub struct Overlay<L: LayoutStrategy = RelativeLayout> {
    engine: VisibilityEngine<L>,
    on_screen: Vec<HotspotIdx>,
    rendered: Vec<RenderedHotspot>,
    current_time_ms: i64,
}

impl Overlay<RelativeLayout> {
    /// Creates an overlay for the given hotspots using the contain layout
    pub fn new(hotspots: Vec<Hotspot>) -> Self {
        Self::with_engine(VisibilityEngine::new(hotspots))
    }
}

impl<L: LayoutStrategy> Overlay<L> {
    pub fn with_engine(engine: VisibilityEngine<L>) -> Self {
        Self {
            engine,
            on_screen: Vec::new(),
            rendered: Vec::new(),
            current_time_ms: 0,
        }
    }

    pub fn engine(&self) -> &VisibilityEngine<L> {
        &self.engine
    }

    /// Hotspots currently on screen, in display order
    pub fn visible(&self) -> &[RenderedHotspot] {
        &self.rendered
    }

    pub fn current_time_ms(&self) -> i64 {
        self.current_time_ms
    }

    /// Moves playback to `time_ms` and applies the resulting update
    pub fn tick(&mut self, time_ms: i64) -> VisibilityUpdate {
        self.current_time_ms = time_ms;
        let update = self.engine.query_at(time_ms, false);
        self.apply(&update);
        update
    }

    /// Redraws everything at the current time, e.g. after the player reappears
    pub fn resync(&mut self) -> VisibilityUpdate {
        let update = self.engine.query_at(self.current_time_ms, true);
        self.apply(&update);
        update
    }

    /// Applies new video/player sizes and redraws the visible set
    pub fn resize(&mut self, video: Size, player: Size) -> &[RenderedHotspot] {
        debug!(%video, %player, "overlay resized");
        self.on_screen = self.engine.set_layout(video, player);
        self.render();
        &self.rendered
    }

    /// Replaces the hotspot list; nothing is shown until the next tick
    pub fn load(&mut self, hotspots: Vec<Hotspot>) {
        self.engine.reset(hotspots);
        self.on_screen.clear();
        self.render();
    }

    /// Resolves a click on the hotspot with the given id
    pub fn click(&self, id: &str) -> Result<ClickOutcome> {
        let idx = self
            .engine
            .find(id)
            .ok_or_else(|| Error::UnknownHotspot(id.to_string()))?;
        let rendered = self
            .rendered
            .iter()
            .find(|r| r.idx == idx)
            .ok_or_else(|| Error::NotVisible(id.to_string()))?;
        Ok(resolve_click(rendered.action.as_ref()))
    }

    fn apply(&mut self, update: &VisibilityUpdate) {
        match update {
            VisibilityUpdate::Snapshot(set) => self.on_screen = set.clone(),
            VisibilityUpdate::Delta(delta) => {
                if delta.is_empty() {
                    return;
                }
                self.on_screen.retain(|idx| !delta.hide.contains(idx));
                for idx in &delta.show {
                    if !self.on_screen.contains(idx) {
                        self.on_screen.push(*idx);
                    }
                }
            }
        }
        self.render();
    }

    fn render(&mut self) {
        let engine = &self.engine;
        self.rendered = self
            .on_screen
            .iter()
            .filter_map(|idx| engine.placed(*idx))
            .map(|placed| RenderedHotspot {
                idx: placed.idx,
                id: placed.hotspot.id.clone(),
                label: placed.hotspot.label.clone(),
                bounds: placed.bounds,
                styles: placed.styles.clone(),
                action: placed.hotspot.on_click.clone(),
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::LinkTarget;
    use hotspots_core::{EngineConfig, RawLayout, StageLayout};

    const VIDEO: Size = Size {
        width: 1920.0,
        height: 1080.0,
    };
    const PLAYER: Size = Size {
        width: 960.0,
        height: 540.0,
    };

    fn hotspots() -> Vec<Hotspot> {
        vec![
            Hotspot::new("intro", Some(0), Some(4000))
                .with_layout(RawLayout::relative(0.0, 0.0, 0.5, 0.5))
                .with_click(ClickAction::OpenUrl {
                    url: "example.com".to_string(),
                }),
            Hotspot::new("chapter", Some(2000), None)
                .with_layout(RawLayout::relative(0.5, 0.5, 0.25, 0.25))
                .with_click(ClickAction::JumpToTime {
                    jump_to_time: 90_000,
                }),
        ]
    }

    fn visible_ids<L: LayoutStrategy>(overlay: &Overlay<L>) -> Vec<&str> {
        overlay.visible().iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn playback_follows_timeline() {
        let mut overlay = Overlay::new(hotspots());
        overlay.resize(VIDEO, PLAYER);

        overlay.tick(0);
        assert_eq!(visible_ids(&overlay), vec!["intro"]);

        overlay.tick(2000);
        assert_eq!(visible_ids(&overlay), vec!["intro", "chapter"]);

        overlay.tick(4000);
        assert_eq!(visible_ids(&overlay), vec!["chapter"]);

        overlay.tick(1000);
        assert_eq!(visible_ids(&overlay), vec!["intro"]);
    }

    #[test]
    fn bounds_follow_resize() {
        let mut overlay = Overlay::new(hotspots());
        overlay.resize(VIDEO, PLAYER);
        overlay.tick(2500);

        let chapter = &overlay.visible()[1];
        assert_eq!(
            chapter.bounds,
            PixelBox {
                x: 480.0,
                y: 270.0,
                width: 240.0,
                height: 135.0
            }
        );

        let state = overlay.engine().state().clone();
        let rendered = overlay.resize(VIDEO, Size::new(1920.0, 1440.0));
        assert_eq!(rendered.len(), 2);
        assert_eq!(
            rendered[1].bounds,
            PixelBox {
                x: 960.0,
                y: 720.0,
                width: 480.0,
                height: 270.0
            }
        );
        assert_eq!(overlay.engine().state(), &state);
    }

    #[test]
    fn nothing_rendered_until_sized() {
        let mut overlay = Overlay::new(hotspots());
        overlay.tick(2500);
        assert!(overlay.visible().is_empty());

        overlay.resize(VIDEO, PLAYER);
        assert_eq!(visible_ids(&overlay), vec!["intro", "chapter"]);
    }

    #[test]
    fn resync_redraws_current_time() {
        let mut overlay = Overlay::new(hotspots());
        overlay.tick(2500);
        overlay.resize(VIDEO, Size::new(0.0, 0.0));
        assert!(overlay.visible().is_empty());

        overlay.resize(VIDEO, PLAYER);
        let update = overlay.resync();
        assert!(update.is_snapshot());
        assert_eq!(visible_ids(&overlay), vec!["intro", "chapter"]);
    }

    #[test]
    fn click_outcomes() {
        let mut overlay = Overlay::new(hotspots());
        overlay.resize(VIDEO, PLAYER);
        overlay.tick(0);

        assert_eq!(
            overlay.click("intro").unwrap(),
            ClickOutcome::Navigate {
                url: "http://example.com".to_string(),
                target: LinkTarget::Top,
                pause_playback: false,
            }
        );
        assert!(matches!(overlay.click("chapter"), Err(Error::NotVisible(_))));
        assert!(matches!(overlay.click("nope"), Err(Error::UnknownHotspot(_))));

        overlay.tick(2000);
        assert_eq!(
            overlay.click("chapter").unwrap(),
            ClickOutcome::Seek { time_ms: 90_000 }
        );
    }

    #[test]
    fn load_replaces_item_set() {
        let mut overlay = Overlay::new(hotspots());
        overlay.resize(VIDEO, PLAYER);
        overlay.tick(3000);

        overlay.load(vec![Hotspot::new("fresh", Some(0), None)]);
        assert!(overlay.visible().is_empty());

        overlay.tick(3100);
        assert_eq!(visible_ids(&overlay), vec!["fresh"]);
    }

    #[test]
    fn stage_layout_overlay() {
        let engine = VisibilityEngine::with_strategy(
            hotspots(),
            StageLayout::new(Size::new(1280.0, 720.0)),
            EngineConfig::default(),
        );
        let mut overlay = Overlay::with_engine(engine);
        overlay.resize(VIDEO, PLAYER);
        overlay.tick(0);

        assert_eq!(
            overlay.visible()[0].bounds,
            PixelBox {
                x: 0.0,
                y: 0.0,
                width: 480.0,
                height: 270.0
            }
        );
    }
}
