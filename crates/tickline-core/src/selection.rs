//! Vetoable clip/track selection: single, toggle, range and click semantics.
//!
//! Raw membership lives on [`Timeline`]; this module decides *what* changes
//! and asks the host's [`SelectionPolicy`] before each change.

use std::fmt;
use std::ops::Range;

use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::events::SelectionDelta;
use crate::host::Modifiers;
use crate::index_map::OrderedIndexMap;
use crate::timeline::{ClipId, Span, Timeline, TrackId};

/// Anything that can be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionItem {
    Clip(ClipId),
    Track(TrackId),
}

impl fmt::Display for SelectionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionItem::Clip(id) => write!(f, "clip {id}"),
            SelectionItem::Track(id) => write!(f, "track {id}"),
        }
    }
}

/// A policy's answer to a proposed selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    /// Skip this item only.
    Veto,
    /// Stop the whole operation. Changes already applied stay applied.
    VetoAll,
}

/// Host hook consulted before every individual select/deselect.
pub trait SelectionPolicy {
    fn check(&mut self, timeline: &Timeline, item: SelectionItem, selected: bool) -> Verdict;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl SelectionPolicy for AllowAll {
    fn check(&mut self, _: &Timeline, _: SelectionItem, _: bool) -> Verdict {
        Verdict::Allow
    }
}

/// What a click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickTarget {
    pub track: TrackId,
    pub clip: Option<ClipId>,
}

/// One selection operation in progress. Collects every change so the
/// operation publishes a single `SelectionChanged` event.
pub struct SelectionBatch<'a> {
    timeline: &'a mut Timeline,
    policy: &'a mut dyn SelectionPolicy,
    delta: SelectionDelta,
}

impl SelectionBatch<'_> {
    pub fn timeline(&self) -> &Timeline {
        &*self.timeline
    }

    /// Change one item, consulting the policy. Items already in the
    /// requested state are left alone and the policy is not asked.
    /// A veto comes back as an error.
    pub fn set(&mut self, item: SelectionItem, selected: bool) -> Result<bool> {
        if self.timeline.is_selected(item) == selected {
            ensure_exists(self.timeline, item)?;
            return Ok(false);
        }
        match self.policy.check(self.timeline, item, selected) {
            Verdict::Allow => {}
            Verdict::Veto => return Err(CoreError::SelectionVetoed(item)),
            Verdict::VetoAll => return Err(CoreError::SelectionCancelled(item)),
        }
        let changed = self.timeline.set_selected(item, selected)?;
        if changed {
            trace!("{item} selected={selected}");
            self.delta.record(item, selected);
        }
        Ok(changed)
    }

    /// Like [`set`](Self::set), but a single-item veto only skips the item.
    /// Cancellation still propagates.
    pub fn try_set(&mut self, item: SelectionItem, selected: bool) -> Result<bool> {
        match self.set(item, selected) {
            Err(CoreError::SelectionVetoed(_)) => Ok(false),
            other => other,
        }
    }

    /// Deselect every selected item not listed in `keep`.
    pub fn clear_except(&mut self, keep: &[SelectionItem]) -> Result<()> {
        let doomed: Vec<SelectionItem> = self
            .timeline
            .selected_items()
            .into_iter()
            .filter(|item| !keep.contains(item))
            .collect();
        for item in doomed {
            self.try_set(item, false)?;
        }
        Ok(())
    }

    fn clear_clips_except(&mut self, keep: &[ClipId]) -> Result<()> {
        let doomed: Vec<ClipId> = self
            .timeline
            .selected_clips()
            .filter(|id| !keep.contains(id))
            .collect();
        for id in doomed {
            self.try_set(SelectionItem::Clip(id), false)?;
        }
        Ok(())
    }

    fn clear_tracks_except(&mut self, keep: Option<TrackId>) -> Result<()> {
        let doomed: Vec<TrackId> = self
            .timeline
            .selected_tracks()
            .iter()
            .copied()
            .filter(|id| Some(*id) != keep)
            .collect();
        for id in doomed {
            self.try_set(SelectionItem::Track(id), false)?;
        }
        Ok(())
    }

    pub fn set_anchor(&mut self, anchor: Option<ClipId>) {
        self.timeline.set_anchor(anchor);
    }
}

fn ensure_exists(timeline: &Timeline, item: SelectionItem) -> Result<()> {
    match item {
        SelectionItem::Clip(id) => timeline
            .find_clip(id)
            .map(|_| ())
            .ok_or(CoreError::ClipNotFound(id)),
        SelectionItem::Track(id) => timeline.track(id).map(|_| ()),
    }
}

/// Selection operations over a timeline, gated by a [`SelectionPolicy`].
pub struct SelectionModel {
    policy: Box<dyn SelectionPolicy>,
}

impl Default for SelectionModel {
    fn default() -> Self {
        Self::new(AllowAll)
    }
}

impl fmt::Debug for SelectionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionModel").finish_non_exhaustive()
    }
}

impl SelectionModel {
    pub fn new(policy: impl SelectionPolicy + 'static) -> Self {
        Self {
            policy: Box::new(policy),
        }
    }

    pub fn set_policy(&mut self, policy: impl SelectionPolicy + 'static) {
        self.policy = Box::new(policy);
    }

    /// Run a selection operation as one batch. Whatever the closure managed
    /// to change is published as one `SelectionChanged` event, even when the
    /// closure returns an error.
    pub fn batch<F, T>(&mut self, timeline: &mut Timeline, f: F) -> Result<T>
    where
        F: FnOnce(&mut SelectionBatch<'_>) -> Result<T>,
    {
        let mut batch = SelectionBatch {
            timeline,
            policy: self.policy.as_mut(),
            delta: SelectionDelta::new(),
        };
        let result = f(&mut batch);
        let SelectionBatch {
            timeline, delta, ..
        } = batch;
        if let Err(err) = &result {
            if err.is_veto() {
                warn!("selection change stopped: {err}");
            }
        }
        timeline.publish_selection(delta);
        result
    }

    pub fn select(&mut self, timeline: &mut Timeline, item: SelectionItem) -> Result<bool> {
        self.batch(timeline, |b| b.set(item, true))
    }

    pub fn deselect(&mut self, timeline: &mut Timeline, item: SelectionItem) -> Result<bool> {
        self.batch(timeline, |b| b.set(item, false))
    }

    /// Flip an item's state. Returns the new state. A clip that becomes
    /// selected becomes the range anchor.
    pub fn toggle_selected(&mut self, timeline: &mut Timeline, item: SelectionItem) -> Result<bool> {
        self.batch(timeline, |b| {
            let selected = !b.timeline().is_selected(item);
            b.set(item, selected)?;
            if let (SelectionItem::Clip(id), true) = (item, selected) {
                b.set_anchor(Some(id));
            }
            Ok(selected)
        })
    }

    /// Make `item` the only selected item. A clip becomes the range anchor.
    pub fn select_single(&mut self, timeline: &mut Timeline, item: SelectionItem) -> Result<()> {
        ensure_exists(timeline, item)?;
        self.batch(timeline, |b| {
            b.clear_except(&[item])?;
            b.set(item, true)?;
            if let SelectionItem::Clip(id) = item {
                b.set_anchor(Some(id));
            }
            Ok(())
        })
    }

    /// Select every clip between `anchor` and `target` in temporal order,
    /// inclusive, replacing the current selection. Other tracks are
    /// deselected; the range's own track keeps its selection state. Which
    /// endpoint is which does not matter.
    pub fn select_range(
        &mut self,
        timeline: &mut Timeline,
        track: TrackId,
        anchor: ClipId,
        target: ClipId,
    ) -> Result<()> {
        let track_ref = timeline.track(track)?;
        for clip in [anchor, target] {
            if !track_ref.contains_clip(clip) {
                return Err(CoreError::ClipNotOnTrack { clip, track });
            }
        }
        if anchor == target {
            return self.select_single(timeline, SelectionItem::Clip(target));
        }
        let range = OrderedIndexMap::build(track_ref)
            .ordered_range(anchor, target)
            .ok_or(CoreError::ClipNotOnTrack {
                clip: target,
                track,
            })?;
        self.batch(timeline, |b| {
            b.clear_clips_except(&range)?;
            b.clear_tracks_except(Some(track))?;
            for id in &range {
                b.try_set(SelectionItem::Clip(*id), true)?;
            }
            b.set_anchor(Some(anchor));
            Ok(())
        })
    }

    /// Deselect everything.
    pub fn clear(&mut self, timeline: &mut Timeline) -> Result<()> {
        self.batch(timeline, |b| b.clear_except(&[]))
    }

    /// Deselect every clip, optionally keeping one.
    pub fn clear_clip_selection(&mut self, timeline: &mut Timeline, except: Option<ClipId>) -> Result<()> {
        let keep: Vec<ClipId> = except.into_iter().collect();
        self.batch(timeline, |b| b.clear_clips_except(&keep))
    }

    pub fn clear_track_selection(&mut self, timeline: &mut Timeline) -> Result<()> {
        self.batch(timeline, |b| b.clear_tracks_except(None))
    }

    /// Add every clip of a track to the selection.
    pub fn select_all(&mut self, timeline: &mut Timeline, track: TrackId) -> Result<()> {
        let clips: Vec<ClipId> = timeline.track(track)?.clips().iter().map(|c| c.id).collect();
        self.batch(timeline, |b| {
            for id in clips {
                b.try_set(SelectionItem::Clip(id), true)?;
            }
            Ok(())
        })
    }

    /// Replace the clip selection with every clip intersecting `span` on the
    /// tracks in `tracks` (all tracks when `None`).
    pub fn select_tick_range(
        &mut self,
        timeline: &mut Timeline,
        span: Span,
        tracks: Option<Range<usize>>,
    ) -> Result<()> {
        let all = 0..timeline.tracks().len();
        let tracks = match tracks {
            Some(r) => {
                let end = r.end.min(all.end);
                r.start.min(end)..end
            }
            None => all,
        };
        let hits: Vec<ClipId> = timeline.tracks()[tracks]
            .iter()
            .flat_map(|t| t.clips_in_range(span).map(|c| c.id))
            .collect();
        self.batch(timeline, |b| {
            b.clear_clips_except(&hits)?;
            for id in &hits {
                b.try_set(SelectionItem::Clip(*id), true)?;
            }
            Ok(())
        })
    }

    /// Apply pointer-click semantics.
    ///
    /// - Control toggles the clicked clip, or the track when no clip was hit.
    /// - Shift on a clip extends a range from the anchor when the anchor is
    ///   on the same track; otherwise it acts like a plain click.
    /// - A plain click on a clip selects only that clip and its track; on
    ///   empty track area it selects only the track.
    pub fn click(&mut self, timeline: &mut Timeline, target: ClickTarget, modifiers: Modifiers) -> Result<()> {
        timeline.track(target.track)?;
        if modifiers.control {
            let item = match target.clip {
                Some(clip) => SelectionItem::Clip(clip),
                None => SelectionItem::Track(target.track),
            };
            return self.toggle_selected(timeline, item).map(|_| ());
        }

        if modifiers.shift {
            if let (Some(clip), Some(anchor)) = (target.clip, timeline.anchor()) {
                if timeline.track_of(anchor) == Some(target.track) {
                    return self.select_range(timeline, target.track, anchor, clip);
                }
            }
        }

        let track_item = SelectionItem::Track(target.track);
        match target.clip {
            Some(clip) => {
                let clip_item = SelectionItem::Clip(clip);
                ensure_exists(timeline, clip_item)?;
                self.batch(timeline, |b| {
                    b.clear_except(&[track_item, clip_item])?;
                    b.try_set(track_item, true)?;
                    b.set(clip_item, true)?;
                    b.set_anchor(Some(clip));
                    Ok(())
                })
            }
            None => self.batch(timeline, |b| {
                b.clear_except(&[track_item])?;
                b.set(track_item, true).map(|_| ())
            }),
        }
    }
}
