use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::events::{SelectionDelta, TimelineEvent};
use crate::selection::SelectionItem;
use crate::units::{self, TICKS_PER_SECOND};

/// Default length of a new timeline: five minutes.
pub const DEFAULT_MAX_DURATION: i64 = 5 * 60 * TICKS_PER_SECOND;

/// How far past a clip's end the timeline grows when a clip is dragged
/// beyond `max_duration`.
pub const MAX_DURATION_GROWTH: i64 = 15 * TICKS_PER_SECOND;

/// A half-open interval `[start, start + duration)` on the tick axis.
///
/// Deserializing goes through [`Span::new`], so a stored negative duration
/// is rejected rather than loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "SpanRepr")]
pub struct Span {
    start: i64,
    duration: i64,
}

#[derive(Deserialize)]
struct SpanRepr {
    start: i64,
    duration: i64,
}

impl TryFrom<SpanRepr> for Span {
    type Error = CoreError;

    fn try_from(repr: SpanRepr) -> Result<Self> {
        Span::new(repr.start, repr.duration)
    }
}

impl Span {
    pub const EMPTY: Span = Span {
        start: 0,
        duration: 0,
    };

    pub fn new(start: i64, duration: i64) -> Result<Self> {
        if duration < 0 {
            return Err(CoreError::NegativeDuration { start, duration });
        }
        Ok(Self { start, duration })
    }

    /// Build a span from its start and exclusive end.
    pub fn from_bounds(start: i64, end_exclusive: i64) -> Result<Self> {
        Self::new(start, end_exclusive - start)
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn duration(&self) -> i64 {
        self.duration
    }

    pub fn end_exclusive(&self) -> i64 {
        self.start + self.duration
    }

    pub fn is_empty(&self) -> bool {
        self.duration == 0
    }

    pub fn intersects(&self, other: &Span) -> bool {
        self.start < other.end_exclusive() && self.end_exclusive() > other.start
    }

    pub fn contains_tick(&self, tick: i64) -> bool {
        tick >= self.start && tick < self.end_exclusive()
    }

    /// Same duration, new start.
    pub fn with_start(&self, start: i64) -> Self {
        Self {
            start,
            duration: self.duration,
        }
    }

    /// Same start, new duration (negative values clamp to zero).
    pub fn with_duration(&self, duration: i64) -> Self {
        Self {
            start: self.start,
            duration: duration.max(0),
        }
    }

    pub fn offset(&self, ticks: i64) -> Self {
        self.with_start(self.start + ticks)
    }

    /// Smallest span covering both.
    pub fn union(&self, other: &Span) -> Self {
        let start = self.start.min(other.start);
        let end = self.end_exclusive().max(other.end_exclusive());
        Self {
            start,
            duration: end - start,
        }
    }

    /// Overlapping part of both spans, or `None` when they do not intersect.
    pub fn intersection(&self, other: &Span) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }
        let start = self.start.max(other.start);
        let end = self.end_exclusive().min(other.end_exclusive());
        Some(Self {
            start,
            duration: end - start,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(Uuid);

impl ClipId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(Uuid);

impl TrackId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a clip carries. The engine only needs span and identity; the tag is
/// for hosts that pick visuals per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ClipKind {
    #[default]
    Video,
    Audio,
    Scratch,
}

/// A clip placed on a track.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Clip {
    pub id: ClipId,
    span: Span,
    display_name: String,
    #[serde(default)]
    pub kind: ClipKind,
    /// Opaque host reference (media asset, generator, ...).
    #[serde(default)]
    pub payload: Option<Uuid>,
}

impl Clip {
    pub fn new(display_name: impl Into<String>, span: Span) -> Self {
        Self {
            id: ClipId::new(),
            span,
            display_name: display_name.into(),
            kind: ClipKind::Video,
            payload: None,
        }
    }

    pub fn with_kind(mut self, kind: ClipKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_payload(mut self, payload: Uuid) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Width of the clip on screen at `zoom`.
    pub fn width_px(&self, zoom: f64) -> f64 {
        units::ticks_to_pixels(self.span.duration(), zoom)
    }
}

/// Whether a track holds video or audio clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TrackKind {
    #[default]
    Video,
    Audio,
}

/// A track: clips in display (z) order plus the track's clip selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "TrackRepr")]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    #[serde(default)]
    pub kind: TrackKind,
    clips: Vec<Clip>,
    #[serde(default)]
    selected_clips: Vec<ClipId>,
    height: f64,
}

impl Track {
    pub const MIN_HEIGHT: f64 = 20.0;
    pub const DEFAULT_HEIGHT: f64 = 56.0;
    pub const MAX_HEIGHT: f64 = 250.0;

    pub fn new(name: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: TrackId::new(),
            name: name.into(),
            kind,
            clips: Vec::new(),
            selected_clips: Vec::new(),
            height: Self::DEFAULT_HEIGHT,
        }
    }

    pub fn video(name: impl Into<String>) -> Self {
        Self::new(name, TrackKind::Video)
    }

    pub fn audio(name: impl Into<String>) -> Self {
        Self::new(name, TrackKind::Audio)
    }

    /// Clips in display order.
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn get_clip(&self, clip_id: ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == clip_id)
    }

    pub fn clip_index(&self, clip_id: ClipId) -> Option<usize> {
        self.clips.iter().position(|c| c.id == clip_id)
    }

    pub fn contains_clip(&self, clip_id: ClipId) -> bool {
        self.clip_index(clip_id).is_some()
    }

    /// Selected clips of this track, in the order they were selected.
    pub fn selected_clips(&self) -> &[ClipId] {
        &self.selected_clips
    }

    pub fn is_clip_selected(&self, clip_id: ClipId) -> bool {
        self.selected_clips.contains(&clip_id)
    }

    /// All clips whose span intersects `span`, in display order.
    pub fn clips_in_range(&self, span: Span) -> impl Iterator<Item = &Clip> + '_ {
        self.clips.iter().filter(move |c| c.span.intersects(&span))
    }

    /// The top-most clip (last in display order) covering `tick`.
    pub fn clip_at(&self, tick: i64) -> Option<&Clip> {
        self.clips.iter().rev().find(|c| c.span.contains_tick(tick))
    }

    pub fn is_region_empty(&self, span: Span) -> bool {
        self.clips_in_range(span).next().is_none()
    }

    /// The free gap starting at `tick`: up to the next clip start (capped
    /// at `limit`), or `default_duration` when nothing follows. `None` when
    /// a clip already covers `tick`.
    pub fn span_until_clip(&self, tick: i64, default_duration: i64, limit: i64) -> Option<Span> {
        if self.clips.iter().any(|c| c.span.contains_tick(tick)) {
            return None;
        }
        let next_start = self
            .clips
            .iter()
            .map(|c| c.span.start())
            .filter(|start| *start > tick)
            .min();
        let duration = match next_start {
            Some(start) => (start - tick).min(limit),
            None => default_duration,
        };
        Some(Span {
            start: tick,
            duration: duration.max(0),
        })
    }

    /// End of the last-ending clip on this track.
    pub fn largest_tick(&self) -> i64 {
        self.clips
            .iter()
            .map(|c| c.span.end_exclusive())
            .max()
            .unwrap_or(0)
    }

    /// Whether a clip of `kind` may live on this track. Audio clips go on
    /// audio tracks; video and scratch clips go on video tracks.
    pub fn accepts(&self, kind: ClipKind) -> bool {
        matches!(
            (self.kind, kind),
            (TrackKind::Audio, ClipKind::Audio)
                | (TrackKind::Video, ClipKind::Video | ClipKind::Scratch)
        )
    }

    fn clip_mut(&mut self, clip_id: ClipId) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == clip_id)
    }

    fn take_clip(&mut self, clip_id: ClipId) -> Option<(Clip, bool)> {
        let idx = self.clip_index(clip_id)?;
        let clip = self.clips.remove(idx);
        let was_selected = self.set_clip_selected(clip_id, false);
        Some((clip, was_selected))
    }

    /// Raw set membership change; returns whether anything changed.
    fn set_clip_selected(&mut self, clip_id: ClipId, selected: bool) -> bool {
        let pos = self.selected_clips.iter().position(|c| *c == clip_id);
        match (selected, pos) {
            (true, None) => {
                self.selected_clips.push(clip_id);
                true
            }
            (false, Some(pos)) => {
                self.selected_clips.remove(pos);
                true
            }
            _ => false,
        }
    }
}

fn clamp_track_height(height: f64) -> f64 {
    if height.is_nan() {
        Track::DEFAULT_HEIGHT
    } else {
        height.clamp(Track::MIN_HEIGHT, Track::MAX_HEIGHT)
    }
}

#[derive(Deserialize)]
struct TrackRepr {
    id: TrackId,
    name: String,
    #[serde(default)]
    kind: TrackKind,
    clips: Vec<Clip>,
    #[serde(default)]
    selected_clips: Vec<ClipId>,
    height: f64,
}

impl From<TrackRepr> for Track {
    fn from(repr: TrackRepr) -> Self {
        let mut selected_clips: Vec<ClipId> = Vec::with_capacity(repr.selected_clips.len());
        for id in repr.selected_clips {
            if repr.clips.iter().any(|c| c.id == id) && !selected_clips.contains(&id) {
                selected_clips.push(id);
            }
        }
        Self {
            id: repr.id,
            name: repr.name,
            kind: repr.kind,
            clips: repr.clips,
            selected_clips,
            height: clamp_track_height(repr.height),
        }
    }
}

/// The timeline: tracks, view state (zoom/scroll), play head, selection
/// bookkeeping and the queue of pending change notifications.
///
/// Loading a stored timeline clamps the view state into range and drops
/// selected track ids that no longer name a track.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "TimelineRepr")]
pub struct Timeline {
    tracks: Vec<Track>,
    play_head: i64,
    zoom: f64,
    scroll_ticks: i64,
    #[serde(default)]
    scroll_y: f64,
    max_duration: i64,
    #[serde(default)]
    selected_tracks: Vec<TrackId>,
    #[serde(skip)]
    anchor: Option<ClipId>,
    #[serde(skip)]
    events: Vec<TimelineEvent>,
}

#[derive(Deserialize)]
struct TimelineRepr {
    tracks: Vec<Track>,
    play_head: i64,
    zoom: f64,
    scroll_ticks: i64,
    #[serde(default)]
    scroll_y: f64,
    max_duration: i64,
    #[serde(default)]
    selected_tracks: Vec<TrackId>,
}

impl From<TimelineRepr> for Timeline {
    fn from(repr: TimelineRepr) -> Self {
        let mut selected_tracks: Vec<TrackId> = Vec::with_capacity(repr.selected_tracks.len());
        for id in repr.selected_tracks {
            if repr.tracks.iter().any(|t| t.id == id) && !selected_tracks.contains(&id) {
                selected_tracks.push(id);
            }
        }
        let max_duration = repr.max_duration.max(0);
        let scroll_y = if repr.scroll_y.is_nan() {
            0.0
        } else {
            repr.scroll_y.max(0.0)
        };
        Self {
            tracks: repr.tracks,
            play_head: repr.play_head.clamp(0, (max_duration - 1).max(0)),
            zoom: units::clamp_zoom(repr.zoom),
            scroll_ticks: repr.scroll_ticks.max(0),
            scroll_y,
            max_duration,
            selected_tracks,
            anchor: None,
            events: Vec::new(),
        }
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self::with_max_duration(DEFAULT_MAX_DURATION)
    }

    pub fn with_max_duration(max_duration: i64) -> Self {
        Self {
            tracks: Vec::new(),
            play_head: 0,
            zoom: 1.0,
            scroll_ticks: 0,
            scroll_y: 0.0,
            max_duration: max_duration.max(0),
            selected_tracks: Vec::new(),
            anchor: None,
            events: Vec::new(),
        }
    }

    // ---- notifications ----

    /// Drain every notification recorded since the last call.
    pub fn take_events(&mut self) -> Vec<TimelineEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[TimelineEvent] {
        &self.events
    }

    pub(crate) fn push_event(&mut self, event: TimelineEvent) {
        self.events.push(event);
    }

    pub(crate) fn publish_selection(&mut self, delta: SelectionDelta) {
        if !delta.is_empty() {
            self.events.push(TimelineEvent::SelectionChanged(delta));
        }
    }

    // ---- tracks ----

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn add_track(&mut self, name: impl Into<String>, kind: TrackKind) -> TrackId {
        self.push_track(Track::new(name, kind))
    }

    /// Append an already-built track (with its clips).
    pub fn push_track(&mut self, track: Track) -> TrackId {
        let index = self.tracks.len();
        self.insert_track(index, track)
    }

    /// Insert a track at `index` (clamped to the track count).
    pub fn insert_track(&mut self, index: usize, mut track: Track) -> TrackId {
        let id = track.id;
        track.height = clamp_track_height(track.height);
        // Selection state of a foreign track is not carried over.
        track.selected_clips.clear();
        let end = track.largest_tick();
        let index = index.min(self.tracks.len());
        self.tracks.insert(index, track);
        self.push_event(TimelineEvent::TrackAdded(id));
        self.expand_for_tick(end);
        id
    }

    /// Remove a track and everything on it, dropping its selection state.
    pub fn remove_track(&mut self, track_id: TrackId) -> Result<Track> {
        let index = self
            .track_index(track_id)
            .ok_or(CoreError::TrackNotFound(track_id))?;
        let track = self.tracks.remove(index);

        let mut delta = SelectionDelta::new();
        for clip_id in &track.selected_clips {
            delta.record(SelectionItem::Clip(*clip_id), false);
        }
        if let Some(pos) = self.selected_tracks.iter().position(|t| *t == track_id) {
            self.selected_tracks.remove(pos);
            delta.record(SelectionItem::Track(track_id), false);
        }
        if let Some(anchor) = self.anchor {
            if track.contains_clip(anchor) {
                self.anchor = None;
            }
        }
        self.push_event(TimelineEvent::TrackRemoved(track_id));
        self.publish_selection(delta);
        Ok(track)
    }

    pub fn move_track(&mut self, track_id: TrackId, new_index: usize) -> Result<()> {
        let old_index = self
            .track_index(track_id)
            .ok_or(CoreError::TrackNotFound(track_id))?;
        let new_index = new_index.min(self.tracks.len() - 1);
        if old_index == new_index {
            return Ok(());
        }
        let track = self.tracks.remove(old_index);
        self.tracks.insert(new_index, track);
        self.push_event(TimelineEvent::TrackMoved {
            track: track_id,
            old_index,
            new_index,
        });
        Ok(())
    }

    pub fn track(&self, track_id: TrackId) -> Result<&Track> {
        self.tracks
            .iter()
            .find(|t| t.id == track_id)
            .ok_or(CoreError::TrackNotFound(track_id))
    }

    fn track_mut(&mut self, track_id: TrackId) -> Result<&mut Track> {
        self.tracks
            .iter_mut()
            .find(|t| t.id == track_id)
            .ok_or(CoreError::TrackNotFound(track_id))
    }

    pub fn track_index(&self, track_id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == track_id)
    }

    pub fn track_at_index(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Set a track's height, clamped to the track height limits.
    /// Returns the height actually applied.
    pub fn set_track_height(&mut self, track_id: TrackId, height: f64) -> Result<f64> {
        let track = self.track_mut(track_id)?;
        let height = clamp_track_height(height);
        if track.height == height {
            return Ok(height);
        }
        track.height = height;
        self.push_event(TimelineEvent::TrackHeightChanged {
            track: track_id,
            height,
        });
        Ok(height)
    }

    /// Top edge of track `index` in content pixels (before vertical scroll).
    pub fn track_top(&self, index: usize) -> f64 {
        self.tracks.iter().take(index).map(|t| t.height).sum()
    }

    /// Total height of all track rows.
    pub fn content_height(&self) -> f64 {
        self.tracks.iter().map(|t| t.height).sum()
    }

    // ---- clips ----

    /// Append a clip to the end of a track's display order.
    pub fn add_clip(&mut self, track_id: TrackId, clip: Clip) -> Result<ClipId> {
        let index = self.track(track_id)?.len();
        self.insert_clip(track_id, index, clip)
    }

    /// Insert a clip at a display index (clamped). Negative starts are
    /// clamped to zero.
    pub fn insert_clip(&mut self, track_id: TrackId, index: usize, mut clip: Clip) -> Result<ClipId> {
        if clip.span.start < 0 {
            clip.span = clip.span.with_start(0);
        }
        let id = clip.id;
        let end = clip.span.end_exclusive();
        let track = self.track_mut(track_id)?;
        let index = index.min(track.clips.len());
        track.clips.insert(index, clip);
        self.push_event(TimelineEvent::ClipAdded {
            track: track_id,
            clip: id,
        });
        self.expand_for_tick(end);
        Ok(id)
    }

    /// Remove a clip, dropping it from its track's selection and clearing
    /// the range anchor if it pointed at this clip.
    pub fn remove_clip(&mut self, clip_id: ClipId) -> Result<Clip> {
        let (track_index, _) = self
            .find_clip(clip_id)
            .ok_or(CoreError::ClipNotFound(clip_id))?;
        let track = &mut self.tracks[track_index];
        let track_id = track.id;
        let (clip, was_selected) = track
            .take_clip(clip_id)
            .ok_or(CoreError::ClipNotFound(clip_id))?;
        if self.anchor == Some(clip_id) {
            self.anchor = None;
        }
        self.push_event(TimelineEvent::ClipRemoved {
            track: track_id,
            clip: clip_id,
        });
        if was_selected {
            let mut delta = SelectionDelta::new();
            delta.record(SelectionItem::Clip(clip_id), false);
            self.publish_selection(delta);
        }
        Ok(clip)
    }

    /// Move a clip to the end of another track's display order. Selection
    /// membership moves with the clip. Fails when the destination does not
    /// [accept](Track::accepts) the clip's kind.
    pub fn move_clip_to_track(&mut self, clip_id: ClipId, dest: TrackId) -> Result<()> {
        let (src_index, clip_index) = self
            .find_clip(clip_id)
            .ok_or(CoreError::ClipNotFound(clip_id))?;
        let dest_index = self.track_index(dest).ok_or(CoreError::TrackNotFound(dest))?;
        if src_index == dest_index {
            return Ok(());
        }
        let kind = self.tracks[src_index].clips[clip_index].kind;
        if !self.tracks[dest_index].accepts(kind) {
            return Err(CoreError::IncompatibleTrack {
                clip: clip_id,
                track: dest,
            });
        }
        let from = self.tracks[src_index].id;
        let (clip, was_selected) = self.tracks[src_index]
            .take_clip(clip_id)
            .ok_or(CoreError::ClipNotFound(clip_id))?;
        let dest_track = &mut self.tracks[dest_index];
        dest_track.clips.push(clip);
        if was_selected {
            dest_track.set_clip_selected(clip_id, true);
        }
        self.push_event(TimelineEvent::ClipMoved {
            clip: clip_id,
            from,
            to: dest,
        });
        Ok(())
    }

    /// Change a clip's position in its track's display order.
    pub fn move_clip_display_index(&mut self, clip_id: ClipId, new_index: usize) -> Result<()> {
        let (track_index, old_index) = self
            .find_clip(clip_id)
            .ok_or(CoreError::ClipNotFound(clip_id))?;
        let track = &mut self.tracks[track_index];
        let new_index = new_index.min(track.clips.len() - 1);
        if old_index == new_index {
            return Ok(());
        }
        let clip = track.clips.remove(old_index);
        track.clips.insert(new_index, clip);
        let track_id = track.id;
        self.push_event(TimelineEvent::ClipOrderChanged { track: track_id });
        Ok(())
    }

    /// Draw a clip above every other clip on its track.
    pub fn bring_clip_to_front(&mut self, clip_id: ClipId) -> Result<()> {
        self.move_clip_display_index(clip_id, usize::MAX)
    }

    pub fn clip(&self, clip_id: ClipId) -> Option<&Clip> {
        self.tracks.iter().find_map(|t| t.get_clip(clip_id))
    }

    /// Locate a clip as (track index, display index).
    pub fn find_clip(&self, clip_id: ClipId) -> Option<(usize, usize)> {
        self.tracks
            .iter()
            .enumerate()
            .find_map(|(ti, t)| t.clip_index(clip_id).map(|ci| (ti, ci)))
    }

    pub fn track_of(&self, clip_id: ClipId) -> Option<TrackId> {
        self.find_clip(clip_id).map(|(ti, _)| self.tracks[ti].id)
    }

    /// Replace a clip's span. A negative start is clamped to zero.
    pub fn set_clip_span(&mut self, clip_id: ClipId, span: Span) -> Result<()> {
        let span = if span.start < 0 { span.with_start(0) } else { span };
        let (track_index, _) = self
            .find_clip(clip_id)
            .ok_or(CoreError::ClipNotFound(clip_id))?;
        let clip = self.tracks[track_index]
            .clip_mut(clip_id)
            .ok_or(CoreError::ClipNotFound(clip_id))?;
        let old = clip.span;
        if old == span {
            return Ok(());
        }
        clip.span = span;
        self.push_event(TimelineEvent::SpanChanged {
            clip: clip_id,
            old,
            new: span,
        });
        Ok(())
    }

    pub fn set_clip_display_name(&mut self, clip_id: ClipId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        let (track_index, _) = self
            .find_clip(clip_id)
            .ok_or(CoreError::ClipNotFound(clip_id))?;
        let clip = self.tracks[track_index]
            .clip_mut(clip_id)
            .ok_or(CoreError::ClipNotFound(clip_id))?;
        if clip.display_name == name {
            return Ok(());
        }
        clip.display_name = name;
        self.push_event(TimelineEvent::DisplayNameChanged { clip: clip_id });
        Ok(())
    }

    /// End of the last-ending clip across all tracks.
    pub fn largest_tick(&self) -> i64 {
        self.tracks
            .iter()
            .map(|t| t.largest_tick())
            .max()
            .unwrap_or(0)
    }

    // ---- view state ----

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom factor, clamped into the supported range.
    /// Returns the zoom actually applied.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        let zoom = units::clamp_zoom(zoom);
        let old = self.zoom;
        if old != zoom {
            self.zoom = zoom;
            self.push_event(TimelineEvent::ZoomChanged { old, new: zoom });
        }
        zoom
    }

    pub fn scroll_ticks(&self) -> i64 {
        self.scroll_ticks
    }

    /// Set the horizontal scroll offset, clamped to be non-negative.
    pub fn set_scroll_ticks(&mut self, ticks: i64) -> i64 {
        let ticks = ticks.max(0);
        let old = self.scroll_ticks;
        if old != ticks {
            self.scroll_ticks = ticks;
            self.push_event(TimelineEvent::ScrollChanged {
                old_ticks: old,
                new_ticks: ticks,
            });
        }
        ticks
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// Set the vertical scroll offset, clamped so the track area never
    /// scrolls past its content for a viewport `viewport_height` tall.
    pub fn set_scroll_y(&mut self, px: f64, viewport_height: f64) -> f64 {
        let max = (self.content_height() - viewport_height).max(0.0);
        let px = if px.is_nan() { 0.0 } else { px.clamp(0.0, max) };
        let old = self.scroll_y;
        if old != px {
            self.scroll_y = px;
            self.push_event(TimelineEvent::VerticalScrollChanged {
                old_px: old,
                new_px: px,
            });
        }
        px
    }

    pub fn play_head(&self) -> i64 {
        self.play_head
    }

    /// Move the play head, clamped into `[0, max_duration)`.
    pub fn set_play_head(&mut self, tick: i64) -> i64 {
        let tick = tick.clamp(0, (self.max_duration - 1).max(0));
        let old = self.play_head;
        if old != tick {
            self.play_head = tick;
            self.push_event(TimelineEvent::PlayHeadChanged { old, new: tick });
        }
        tick
    }

    pub fn max_duration(&self) -> i64 {
        self.max_duration
    }

    pub fn set_max_duration(&mut self, ticks: i64) {
        let ticks = ticks.max(0);
        let old = self.max_duration;
        if old == ticks {
            return;
        }
        self.max_duration = ticks;
        self.push_event(TimelineEvent::MaxDurationChanged { old, new: ticks });
        if self.play_head >= ticks {
            self.set_play_head(self.play_head);
        }
    }

    /// Grow `max_duration` (with some headroom) when `tick` lies past it.
    /// Returns whether the timeline grew.
    pub fn expand_for_tick(&mut self, tick: i64) -> bool {
        if tick > self.max_duration {
            self.set_max_duration(tick + MAX_DURATION_GROWTH);
            true
        } else {
            false
        }
    }

    // ---- selection state ----
    //
    // Raw membership only. Policy checks, anchors and batching live in
    // `selection::SelectionModel`.

    pub fn selected_tracks(&self) -> &[TrackId] {
        &self.selected_tracks
    }

    pub fn is_track_selected(&self, track_id: TrackId) -> bool {
        self.selected_tracks.contains(&track_id)
    }

    pub fn is_clip_selected(&self, clip_id: ClipId) -> bool {
        self.tracks.iter().any(|t| t.is_clip_selected(clip_id))
    }

    pub fn is_selected(&self, item: SelectionItem) -> bool {
        match item {
            SelectionItem::Clip(id) => self.is_clip_selected(id),
            SelectionItem::Track(id) => self.is_track_selected(id),
        }
    }

    /// Selected clips across all tracks, track by track.
    pub fn selected_clips(&self) -> impl Iterator<Item = ClipId> + '_ {
        self.tracks
            .iter()
            .flat_map(|t| t.selected_clips.iter().copied())
    }

    pub fn has_selected_clips(&self) -> bool {
        self.tracks.iter().any(|t| !t.selected_clips.is_empty())
    }

    /// Every selected track and clip.
    pub fn selected_items(&self) -> Vec<SelectionItem> {
        self.selected_tracks
            .iter()
            .map(|t| SelectionItem::Track(*t))
            .chain(self.selected_clips().map(SelectionItem::Clip))
            .collect()
    }

    /// The clip a shift-click range extends from.
    pub fn anchor(&self) -> Option<ClipId> {
        self.anchor
    }

    pub(crate) fn set_anchor(&mut self, anchor: Option<ClipId>) {
        self.anchor = anchor;
    }

    /// Flip raw membership of one item. Returns whether it changed.
    pub(crate) fn set_selected(&mut self, item: SelectionItem, selected: bool) -> Result<bool> {
        match item {
            SelectionItem::Clip(clip_id) => {
                let (track_index, _) = self
                    .find_clip(clip_id)
                    .ok_or(CoreError::ClipNotFound(clip_id))?;
                Ok(self.tracks[track_index].set_clip_selected(clip_id, selected))
            }
            SelectionItem::Track(track_id) => {
                if self.track_index(track_id).is_none() {
                    return Err(CoreError::TrackNotFound(track_id));
                }
                let pos = self.selected_tracks.iter().position(|t| *t == track_id);
                Ok(match (selected, pos) {
                    (true, None) => {
                        self.selected_tracks.push(track_id);
                        true
                    }
                    (false, Some(pos)) => {
                        self.selected_tracks.remove(pos);
                        true
                    }
                    _ => false,
                })
            }
        }
    }
}
