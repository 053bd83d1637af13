use log::{debug, trace};

use crate::config::EngineConfig;
use crate::error::{CoreError, Result};
use crate::geometry::Point;
use crate::timeline::{ClipId, Span, Timeline, TrackId};
use crate::units;
use crate::viewport::{self, HitZone, Viewport};

/// Shortest length a grip resize can leave a clip with, in ticks.
pub const MIN_CLIP_DURATION: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Pointer is down on a clip but has not moved past the threshold.
    Armed,
    Dragging,
}

/// What the pointer is doing to the clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragMode {
    /// Move the whole clip, possibly onto another track.
    #[default]
    Move,
    /// Drag the left grip: the start moves, the end stays put.
    ResizeStart,
    /// Drag the right grip: the end moves, the start stays put.
    ResizeEnd,
}

impl From<HitZone> for DragMode {
    fn from(zone: HitZone) -> Self {
        match zone {
            HitZone::Body => DragMode::Move,
            HitZone::LeftEdge => DragMode::ResizeStart,
            HitZone::RightEdge => DragMode::ResizeEnd,
        }
    }
}

/// The clip grabbed by the pointer and where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub clip: ClipId,
    pub mode: DragMode,
    pub origin_track: TrackId,
    /// Display index on the origin track at press.
    pub origin_index: usize,
    pub original_span: Span,
    /// Pointer position (viewport) at press.
    pub origin: Point,
    /// Grabbed edge (the clip start, or its end for a right-grip resize)
    /// minus pointer x, in content pixels.
    pub baseline_px: f64,
    pub state: DragState,
}

/// Result of a finished drag: where the clip ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragCommit {
    pub clip: ClipId,
    pub mode: DragMode,
    pub from_track: TrackId,
    pub to_track: TrackId,
    pub original_span: Span,
    pub span: Span,
}

impl DragCommit {
    pub fn moved(&self) -> bool {
        self.from_track != self.to_track || self.original_span != self.span
    }
}

/// Moves a clip along the time axis (and between tracks) while the
/// pointer is held.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    config: EngineConfig,
    session: Option<DragSession>,
}

impl DragController {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn state(&self) -> DragState {
        self.session.map_or(DragState::Idle, |s| s.state)
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Pointer went down on the body of `clip` at viewport point `point`.
    pub fn begin(&mut self, timeline: &Timeline, viewport: &Viewport, clip: ClipId, point: Point) -> Result<()> {
        self.begin_with(timeline, viewport, clip, point, DragMode::Move)
    }

    /// Pointer went down on `clip`, grabbing it as `mode` says.
    pub fn begin_with(
        &mut self,
        timeline: &Timeline,
        viewport: &Viewport,
        clip: ClipId,
        point: Point,
        mode: DragMode,
    ) -> Result<()> {
        let (track_index, origin_index) = timeline
            .find_clip(clip)
            .ok_or(CoreError::ClipNotFound(clip))?;
        let span = timeline.tracks()[track_index].clips()[origin_index].span();
        let grabbed = match mode {
            DragMode::Move | DragMode::ResizeStart => span.start(),
            DragMode::ResizeEnd => span.end_exclusive(),
        };
        let content_x = viewport.to_content(point).x;
        self.session = Some(DragSession {
            clip,
            mode,
            origin_track: timeline.tracks()[track_index].id,
            origin_index,
            original_span: span,
            origin: point,
            baseline_px: units::ticks_to_pixels(grabbed, viewport.zoom) - content_x,
            state: DragState::Armed,
        });
        debug!("drag armed for clip {clip} ({mode:?})");
        Ok(())
    }

    /// Pointer moved. Returns whether the clip moved or changed length.
    ///
    /// # Panics
    ///
    /// Panics when no drag session is active.
    pub fn update(&mut self, timeline: &mut Timeline, viewport: &Viewport, point: Point) -> Result<bool> {
        let session = self
            .session
            .as_mut()
            .expect("drag update called without an active session");

        if session.state == DragState::Armed {
            if (point.x - session.origin.x).abs() < self.config.drag_threshold_px {
                return Ok(false);
            }
            session.state = DragState::Dragging;
            debug!("drag activated for clip {}", session.clip);
        }

        let clip = session.clip;
        let original = session.original_span;
        let content_x = viewport.to_content(point).x;
        let raw = units::pixels_to_ticks((content_x + session.baseline_px).max(0.0), viewport.zoom);

        let mut changed = false;
        let span = match session.mode {
            DragMode::Move => {
                let kind = timeline.clip(clip).ok_or(CoreError::ClipNotFound(clip))?.kind;
                if let Some(row) = viewport::hit_test_track(timeline, viewport, point) {
                    let accepts = timeline.track(row.track).is_ok_and(|t| t.accepts(kind));
                    if accepts && timeline.track_of(clip) != Some(row.track) {
                        timeline.move_clip_to_track(clip, row.track)?;
                        changed = true;
                    }
                }
                let mut start = raw;
                if self.config.snap_enabled {
                    start = snap_start(timeline, clip, raw, original.duration(), viewport.zoom, &self.config);
                }
                original.with_start(start.max(0))
            }
            DragMode::ResizeStart => {
                let end = original.end_exclusive();
                let start = raw.min(end - MIN_CLIP_DURATION).max(0);
                Span::from_bounds(start, end.max(start + MIN_CLIP_DURATION))?
            }
            DragMode::ResizeEnd => {
                let start = original.start();
                Span::from_bounds(start, raw.max(start + MIN_CLIP_DURATION))?
            }
        };
        trace!("drag clip {clip} -> {span:?}");
        timeline.expand_for_tick(span.end_exclusive());
        let before = timeline.clip(clip).map(|c| c.span());
        timeline.set_clip_span(clip, span)?;
        Ok(changed || before != Some(span))
    }

    /// Pointer released. Returns the commit when the clip was actually
    /// dragged; a press that never passed the threshold yields `None`.
    ///
    /// # Panics
    ///
    /// Panics when no drag session is active.
    pub fn end(&mut self, timeline: &Timeline) -> Option<DragCommit> {
        let session = self
            .session
            .take()
            .expect("drag end called without an active session");
        if session.state != DragState::Dragging {
            return None;
        }
        let clip = timeline.clip(session.clip)?;
        let to_track = timeline.track_of(session.clip)?;
        let commit = DragCommit {
            clip: session.clip,
            mode: session.mode,
            from_track: session.origin_track,
            to_track,
            original_span: session.original_span,
            span: clip.span(),
        };
        debug!("drag committed for clip {}: {:?}", commit.clip, commit.span);
        Some(commit)
    }

    /// Abort the drag, putting the clip back where it started: same track,
    /// same display index, same span.
    ///
    /// # Panics
    ///
    /// Panics when no drag session is active.
    pub fn cancel(&mut self, timeline: &mut Timeline) -> Result<()> {
        let session = self
            .session
            .take()
            .expect("drag cancel called without an active session");
        if session.state != DragState::Dragging {
            return Ok(());
        }
        if timeline.track_of(session.clip) != Some(session.origin_track) {
            timeline.move_clip_to_track(session.clip, session.origin_track)?;
            timeline.move_clip_display_index(session.clip, session.origin_index)?;
        }
        timeline.set_clip_span(session.clip, session.original_span)?;
        debug!("drag cancelled for clip {}", session.clip);
        Ok(())
    }
}

/// Snap a proposed start so that the clip's start or end lands on a
/// neighbouring clip edge or the play head, when one is within the snap
/// threshold. The closest edge wins.
pub fn snap_start(
    timeline: &Timeline,
    clip: ClipId,
    start: i64,
    duration: i64,
    zoom: f64,
    config: &EngineConfig,
) -> i64 {
    let threshold = units::pixels_to_ticks(config.snap_threshold_px, zoom);
    let end = start + duration;
    let play_head = timeline.play_head();

    let mut best: Option<(i64, i64)> = None;
    let mut consider = |gap: i64, snapped: i64| {
        if gap <= threshold && best.is_none_or(|(g, _)| gap < g) {
            best = Some((gap, snapped));
        }
    };

    consider((start - play_head).abs(), play_head);
    consider((end - play_head).abs(), play_head - duration);

    if let Some((track_index, _)) = timeline.find_clip(clip) {
        for other in timeline.tracks()[track_index].clips() {
            if other.id == clip {
                continue;
            }
            let other_span = other.span();
            consider((start - other_span.end_exclusive()).abs(), other_span.end_exclusive());
            consider((end - other_span.start()).abs(), other_span.start() - duration);
        }
    }

    best.map_or(start, |(_, snapped)| snapped)
}
