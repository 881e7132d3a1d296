//! Playback-time visibility engine

use crate::hotspot::{Hotspot, HotspotIdx, Styles};
use crate::layout::{LayoutStrategy, PixelBox, RelativeLayout, Size};
use crate::timeline::{ChangeKind, TimelineIndex};
use tracing::{debug, trace};

/// Gap past the next boundary beyond which a forward move counts as a seek
pub const DEFAULT_SEEK_THRESHOLD_MS: i64 = 2000;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Forward jumps further than this past the next boundary are seeks
    pub seek_threshold_ms: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seek_threshold_ms: DEFAULT_SEEK_THRESHOLD_MS,
        }
    }
}

/// Bookkeeping for the last handled playback position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineState {
    pub is_first_query: bool,
    /// Time of the last handled event (0 while before the first event)
    pub last_handled_time: Option<i64>,
    /// Index of the last handled event; `None` before the first event
    pub last_handled_event_index: Option<usize>,
    pub next_boundary_time: Option<i64>,
    pub layout_ready: bool,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            is_first_query: true,
            last_handled_time: None,
            last_handled_event_index: None,
            next_boundary_time: None,
            layout_ready: false,
        }
    }
}

/// Hotspots entering and leaving visibility since the last query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    pub show: Vec<HotspotIdx>,
    pub hide: Vec<HotspotIdx>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.show.is_empty() && self.hide.is_empty()
    }
}

/// Result of a visibility query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityUpdate {
    /// The complete visible set, replacing whatever was shown before
    Snapshot(Vec<HotspotIdx>),
    /// Changes relative to the previously reported set
    Delta(Delta),
}

impl VisibilityUpdate {
    pub fn is_snapshot(&self) -> bool {
        matches!(self, Self::Snapshot(_))
    }
}

/// Geometry and styles resolved for the current viewport
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLayout {
    pub bounds: PixelBox,
    pub styles: Styles,
}

/// A hotspot together with its resolved layout
#[derive(Debug, Clone, Copy)]
pub struct PlacedHotspot<'a> {
    pub idx: HotspotIdx,
    pub hotspot: &'a Hotspot,
    pub bounds: PixelBox,
    pub styles: &'a Styles,
}

/// Decides which hotspots are visible as playback time moves.
///
/// The first query, backward moves, forward jumps past the seek threshold
/// and forced resyncs produce a full snapshot. Ordinary forward ticks produce
/// a delta covering only the events crossed since the previous query.
pub struct VisibilityEngine<L: LayoutStrategy = RelativeLayout> {
    hotspots: Vec<Hotspot>,
    timeline: TimelineIndex,
    state: EngineState,
    config: EngineConfig,
    strategy: L,
    sizes: Option<(Size, Size)>,
    layouts: Vec<Option<ResolvedLayout>>,
}

impl VisibilityEngine<RelativeLayout> {
    /// Creates an engine fitting hotspots with the contain layout
    pub fn new(hotspots: Vec<Hotspot>) -> Self {
        Self::with_strategy(hotspots, RelativeLayout::default(), EngineConfig::default())
    }
}

impl<L: LayoutStrategy> VisibilityEngine<L> {
    pub fn with_strategy(hotspots: Vec<Hotspot>, strategy: L, config: EngineConfig) -> Self {
        let timeline = TimelineIndex::build(&hotspots);
        debug!(
            hotspots = hotspots.len(),
            events = timeline.len(),
            "visibility engine created"
        );
        let layouts = vec![None; hotspots.len()];
        Self {
            hotspots,
            timeline,
            state: EngineState::default(),
            config,
            strategy,
            sizes: None,
            layouts,
        }
    }

    /// Replaces the item-set, starting a new generation.
    ///
    /// The timeline and state are rebuilt; the last known sizes are kept and
    /// the new hotspots are laid out against them.
    pub fn reset(&mut self, hotspots: Vec<Hotspot>) {
        self.timeline = TimelineIndex::build(&hotspots);
        self.hotspots = hotspots;
        self.state = EngineState::default();
        debug!(
            hotspots = self.hotspots.len(),
            events = self.timeline.len(),
            "item-set replaced"
        );
        self.recalculate_layout();
    }

    pub fn hotspots(&self) -> &[Hotspot] {
        &self.hotspots
    }

    pub fn hotspot(&self, idx: HotspotIdx) -> Option<&Hotspot> {
        self.hotspots.get(idx.index())
    }

    /// Finds a hotspot by its id
    pub fn find(&self, id: &str) -> Option<HotspotIdx> {
        self.hotspots
            .iter()
            .position(|h| h.id == id)
            .map(|i| HotspotIdx(i as u32))
    }

    pub fn timeline(&self) -> &TimelineIndex {
        &self.timeline
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn strategy(&self) -> &L {
        &self.strategy
    }

    pub fn is_layout_ready(&self) -> bool {
        self.state.layout_ready
    }

    /// Returns the resolved layout of a hotspot, if the layout is ready
    pub fn layout(&self, idx: HotspotIdx) -> Option<&ResolvedLayout> {
        if !self.state.layout_ready {
            return None;
        }
        self.layouts.get(idx.index())?.as_ref()
    }

    /// Returns a hotspot with its geometry; `None` until it can be placed
    pub fn placed(&self, idx: HotspotIdx) -> Option<PlacedHotspot<'_>> {
        let layout = self.layout(idx)?;
        Some(PlacedHotspot {
            idx,
            hotspot: self.hotspot(idx)?,
            bounds: layout.bounds,
            styles: &layout.styles,
        })
    }

    /// Updates content and viewport sizes and re-lays out every hotspot.
    ///
    /// Returns the snapshot at the last handled position so the caller can
    /// redraw; the playback bookkeeping is left untouched.
    pub fn set_layout(&mut self, content: Size, viewport: Size) -> Vec<HotspotIdx> {
        self.sizes = Some((content, viewport));
        self.recalculate_layout();

        if self.state.is_first_query {
            return Vec::new();
        }
        self.snapshot_for(self.state.last_handled_event_index)
    }

    /// Forgets the sizes; nothing is shown until `set_layout` is called again
    pub fn clear_layout(&mut self) {
        debug!("layout cleared, hiding all hotspots");
        self.sizes = None;
        self.recalculate_layout();
    }

    fn recalculate_layout(&mut self) {
        let transform = self
            .sizes
            .and_then(|(content, viewport)| self.strategy.fit(content, viewport));

        let Some(transform) = transform else {
            debug!("missing video/player sizes, hiding all hotspots");
            self.state.layout_ready = false;
            self.layouts = vec![None; self.hotspots.len()];
            return;
        };

        debug!(?transform, "recalculating hotspot layout");
        self.layouts = self
            .hotspots
            .iter()
            .map(|hotspot| {
                Some(ResolvedLayout {
                    bounds: self.strategy.resolve_box(&hotspot.raw_layout, &transform),
                    styles: self.strategy.resolve_style(&hotspot.styles, &transform),
                })
            })
            .collect();
        self.state.layout_ready = true;
    }

    /// Computes the visible set at `time_ms` without touching the state
    pub fn snapshot_at(&self, time_ms: i64) -> Vec<HotspotIdx> {
        self.snapshot_for(self.timeline.last_index_at_or_before(time_ms))
    }

    /// Advances to `time_ms` and reports what changed.
    ///
    /// `force_snapshot` asks for the complete visible set even when nothing
    /// was crossed since the previous query.
    pub fn query_at(&mut self, time_ms: i64, force_snapshot: bool) -> VisibilityUpdate {
        if self.timeline.is_empty() {
            if self.state.is_first_query {
                debug!("hotspot list empty, every query yields an empty snapshot");
                self.state.is_first_query = false;
            }
            return VisibilityUpdate::Snapshot(Vec::new());
        }

        let EngineState {
            is_first_query,
            last_handled_time,
            next_boundary_time,
            ..
        } = self.state;

        let moved_backward = last_handled_time.is_some_and(|t| time_ms < t);
        let crossed_boundary = next_boundary_time.is_some_and(|t| time_ms >= t);
        let has_changes = is_first_query || moved_backward || crossed_boundary;
        let closest = self.timeline.last_index_at_or_before(time_ms);

        if !has_changes {
            if force_snapshot {
                return VisibilityUpdate::Snapshot(self.snapshot_for(closest));
            }
            return VisibilityUpdate::Delta(Delta::default());
        }

        let jumped_ahead = next_boundary_time
            .is_some_and(|t| time_ms.saturating_sub(t) > self.config.seek_threshold_ms);
        let seeked = !is_first_query && (moved_backward || jumped_ahead);

        debug!(
            time_ms,
            ?closest,
            ?last_handled_time,
            ?next_boundary_time,
            is_first_query,
            seeked,
            force_snapshot,
            "handling timeline changes"
        );

        let update = if is_first_query || force_snapshot || seeked {
            VisibilityUpdate::Snapshot(self.snapshot_for(closest))
        } else {
            VisibilityUpdate::Delta(self.delta_for(closest))
        };
        self.advance(closest);
        update
    }

    fn snapshot_for(&self, target: Option<usize>) -> Vec<HotspotIdx> {
        let Some(target) = target else {
            return Vec::new();
        };
        if !self.state.layout_ready {
            trace!(index = target, "layout not ready, empty snapshot");
            return Vec::new();
        }

        let mut visible: Vec<HotspotIdx> = Vec::new();
        for event in &self.timeline.events()[..=target] {
            let position = visible.iter().position(|h| *h == event.hotspot);
            match (event.kind, position) {
                (ChangeKind::Show, None) => visible.push(event.hotspot),
                (ChangeKind::Hide, Some(i)) => {
                    visible.remove(i);
                }
                _ => {}
            }
        }

        trace!(index = target, visible = visible.len(), "snapshot");
        visible
    }

    fn delta_for(&self, target: Option<usize>) -> Delta {
        let mut delta = Delta::default();
        if !self.state.layout_ready {
            trace!("layout not ready, empty delta");
            return delta;
        }

        let start = self.state.last_handled_event_index.map_or(0, |i| i + 1);
        let end = target.map_or(0, |i| i + 1);
        if start >= end {
            return delta;
        }

        for event in &self.timeline.events()[start..end] {
            let shown_in_window = delta.show.iter().position(|h| *h == event.hotspot);
            match (event.kind, shown_in_window) {
                (ChangeKind::Show, None) => {
                    // an end before the start puts the hide first; it was never shown
                    delta.hide.retain(|h| *h != event.hotspot);
                    delta.show.push(event.hotspot);
                }
                (ChangeKind::Show, Some(_)) => {}
                (ChangeKind::Hide, Some(i)) => {
                    // never made it on screen
                    delta.show.remove(i);
                }
                (ChangeKind::Hide, None) => {
                    if !delta.hide.contains(&event.hotspot) {
                        delta.hide.push(event.hotspot);
                    }
                }
            }
        }

        trace!(show = delta.show.len(), hide = delta.hide.len(), "delta");
        delta
    }

    fn advance(&mut self, closest: Option<usize>) {
        let timeline = &self.timeline;
        let next_boundary_time = match closest {
            None => timeline.first_time(),
            Some(i) if i + 1 >= timeline.len() => timeline.last_time(),
            Some(i) => Some(timeline.time_at(i + 1)),
        };

        self.state.last_handled_time = Some(closest.map_or(0, |i| timeline.time_at(i)));
        self.state.last_handled_event_index = closest;
        self.state.next_boundary_time = next_boundary_time;
        self.state.is_first_query = false;

        trace!(state = ?self.state, "state updated");
    }
}
