//! Sorted show/hide event timeline

use crate::hotspot::{Hotspot, HotspotIdx};

/// Whether an event reveals or removes a hotspot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Show,
    Hide,
}

/// A single visibility change at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Time of the change in milliseconds
    pub time_ms: i64,
    pub kind: ChangeKind,
    pub hotspot: HotspotIdx,
}

/// Ordering of events sharing one timestamp.
///
/// Hides of hotspots that started earlier go first so that a hotspot ending
/// at the instant another starts is never on screen together with it. Hides
/// of zero-duration hotspots go last so they still end hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TieRank {
    Hide,
    Show,
    InstantHide,
}

/// Time-sorted sequence of show/hide events for one item-set
#[derive(Debug, Clone, Default)]
pub struct TimelineIndex {
    events: Vec<ChangeEvent>,
}

impl TimelineIndex {
    /// Builds the timeline from a list of hotspots.
    ///
    /// Hotspots without a valid start time are left out entirely; a negative
    /// end time is treated as absent.
    pub fn build(hotspots: &[Hotspot]) -> Self {
        let mut ranked = Vec::with_capacity(hotspots.len() * 2);

        for (i, hotspot) in hotspots.iter().enumerate() {
            let Some(start) = hotspot.valid_start() else {
                continue;
            };
            let idx = HotspotIdx(i as u32);

            ranked.push((
                TieRank::Show,
                ChangeEvent {
                    time_ms: start,
                    kind: ChangeKind::Show,
                    hotspot: idx,
                },
            ));

            if let Some(end) = hotspot.valid_end() {
                let rank = if end == start {
                    TieRank::InstantHide
                } else {
                    TieRank::Hide
                };
                ranked.push((
                    rank,
                    ChangeEvent {
                        time_ms: end,
                        kind: ChangeKind::Hide,
                        hotspot: idx,
                    },
                ));
            }
        }

        // sort_by_key is stable, so equal (time, rank) keep insertion order
        ranked.sort_by_key(|(rank, event)| (event.time_ms, *rank));

        Self {
            events: ranked.into_iter().map(|(_, event)| event).collect(),
        }
    }

    /// Returns the number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[ChangeEvent] {
        &self.events
    }

    pub fn event(&self, index: usize) -> Option<&ChangeEvent> {
        self.events.get(index)
    }

    /// Time of the event at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn time_at(&self, index: usize) -> i64 {
        self.events[index].time_ms
    }

    pub fn first_time(&self) -> Option<i64> {
        self.events.first().map(|e| e.time_ms)
    }

    pub fn last_time(&self) -> Option<i64> {
        self.events.last().map(|e| e.time_ms)
    }

    /// Finds the index of the last event whose time is at or before `time_ms`.
    ///
    /// Every event sharing the query instant is included, so repeated queries
    /// for the same time always land on the same index. Returns `None` when
    /// the timeline is empty or `time_ms` precedes the first event.
    pub fn last_index_at_or_before(&self, time_ms: i64) -> Option<usize> {
        let first = self.events.first()?;
        if time_ms < first.time_ms {
            return None;
        }
        let last = self.events.len() - 1;
        if time_ms >= self.events[last].time_ms {
            return Some(last);
        }

        let upper = self.events.partition_point(|e| e.time_ms <= time_ms);
        Some(upper - 1)
    }
}
