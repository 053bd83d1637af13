//! Projection of the tick axis onto the scrolled, zoomed viewport: what is
//! visible, where it is drawn, and what lies under the pointer.
//!
//! Two pixel spaces are in play. *Viewport* coordinates are local to the
//! widget. *Content* coordinates are viewport coordinates plus the scroll
//! offsets, so they stay put while the view scrolls.

use crate::geometry::{Point, Rect, Size};
use crate::selection::SelectionItem;
use crate::timeline::{Clip, ClipId, Span, Timeline, Track, TrackId};
use crate::units;

/// Clips this wide or narrower (in px) are not hit-testable or drawn.
pub const DEFAULT_MIN_INTERACTIVE_WIDTH: f64 = 1.0;

/// Width (in px) of the resize grip at each end of a clip.
pub const DEFAULT_EDGE_GRIP: f64 = 6.0;

/// A snapshot of the view state needed to project ticks onto pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_ticks: i64,
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
    pub min_interactive_width: f64,
    pub edge_grip: f64,
}

impl Viewport {
    pub fn new(size: Size) -> Self {
        Self {
            scroll_ticks: 0,
            scroll_y: 0.0,
            width: size.width,
            height: size.height,
            zoom: 1.0,
            min_interactive_width: DEFAULT_MIN_INTERACTIVE_WIDTH,
            edge_grip: DEFAULT_EDGE_GRIP,
        }
    }

    /// The viewport of `timeline` as shown in a widget of `size`.
    pub fn of(timeline: &Timeline, size: Size) -> Self {
        Self {
            scroll_ticks: timeline.scroll_ticks(),
            scroll_y: timeline.scroll_y(),
            zoom: timeline.zoom(),
            ..Self::new(size)
        }
    }

    pub fn with_min_interactive_width(mut self, px: f64) -> Self {
        self.min_interactive_width = px;
        self
    }

    pub fn with_edge_grip(mut self, px: f64) -> Self {
        self.edge_grip = px;
        self
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The tick interval the viewport currently shows.
    pub fn visible_region(&self) -> Span {
        let ticks = (self.width.max(0.0) * units::ticks_per_pixel(self.zoom)).ceil() as i64;
        Span::new(self.scroll_ticks, ticks.max(0)).unwrap_or(Span::EMPTY)
    }

    pub fn tick_to_x(&self, tick: i64) -> f64 {
        units::ticks_to_pixels(tick - self.scroll_ticks, self.zoom)
    }

    pub fn x_to_tick(&self, x: f64) -> i64 {
        self.scroll_ticks + units::pixels_to_ticks(x, self.zoom)
    }

    /// Horizontal scroll offset in pixels.
    pub fn scroll_x(&self) -> f64 {
        units::ticks_to_pixels(self.scroll_ticks, self.zoom)
    }

    pub fn to_content(&self, p: Point) -> Point {
        Point::new(p.x + self.scroll_x(), p.y + self.scroll_y)
    }

    pub fn to_viewport(&self, p: Point) -> Point {
        Point::new(p.x - self.scroll_x(), p.y - self.scroll_y)
    }

    /// Whether a clip is wide enough on screen to be drawn and hit.
    pub fn is_interactive(&self, clip: &Clip) -> bool {
        clip.width_px(self.zoom) > self.min_interactive_width
    }

    /// A clip's rectangle in viewport coordinates, given the top of its track
    /// row in content pixels.
    pub fn clip_rect(&self, clip: &Clip, track_top: f64, track_height: f64) -> Rect {
        let span = clip.span();
        Rect::new(
            self.tick_to_x(span.start()),
            track_top - self.scroll_y,
            clip.width_px(self.zoom),
            track_height,
        )
    }
}

/// Which part of a clip is under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HitZone {
    #[default]
    Body,
    LeftEdge,
    RightEdge,
}

/// Where a pointer landed on a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipHit {
    pub track: TrackId,
    pub track_index: usize,
    pub clip: ClipId,
    pub zone: HitZone,
}

/// Where a pointer landed on a track row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackHit {
    pub track: TrackId,
    pub index: usize,
}

/// Clips of `track` worth drawing: those intersecting the visible region
/// and wider than the interactive threshold, in display order.
pub fn visible_clips<'a>(
    track: &'a Track,
    viewport: &Viewport,
) -> impl Iterator<Item = &'a Clip> + use<'a> {
    let viewport = *viewport;
    track
        .clips_in_range(viewport.visible_region())
        .filter(move |c| viewport.is_interactive(c))
}

/// The track row under a viewport point.
pub fn hit_test_track(timeline: &Timeline, viewport: &Viewport, point: Point) -> Option<TrackHit> {
    let y = point.y + viewport.scroll_y;
    if y < 0.0 {
        return None;
    }
    let mut top = 0.0;
    for (index, track) in timeline.tracks().iter().enumerate() {
        let bottom = top + track.height();
        if y >= top && y < bottom {
            return Some(TrackHit {
                track: track.id,
                index,
            });
        }
        top = bottom;
    }
    None
}

/// The top-most interactive clip under a viewport point.
pub fn hit_test(timeline: &Timeline, viewport: &Viewport, point: Point) -> Option<ClipHit> {
    let row = hit_test_track(timeline, viewport, point)?;
    let tick = viewport.x_to_tick(point.x);
    let track = timeline.track_at_index(row.index)?;
    track
        .clips()
        .iter()
        .rev()
        .find(|c| c.span().contains_tick(tick) && viewport.is_interactive(c))
        .map(|c| ClipHit {
            track: row.track,
            track_index: row.index,
            clip: c.id,
            zone: hit_zone(viewport, c, point.x),
        })
}

/// Grips only exist on clips wider than three grips; narrower clips are all
/// body so they can still be moved.
fn hit_zone(viewport: &Viewport, clip: &Clip, x: f64) -> HitZone {
    let grip = viewport.edge_grip;
    let width = clip.width_px(viewport.zoom);
    if grip <= 0.0 || width <= grip * 3.0 {
        return HitZone::Body;
    }
    let left = viewport.tick_to_x(clip.span().start());
    if x < left + grip {
        HitZone::LeftEdge
    } else if x >= left + width - grip {
        HitZone::RightEdge
    } else {
        HitZone::Body
    }
}

/// A clip's rectangle in viewport coordinates.
pub fn clip_bounds(timeline: &Timeline, viewport: &Viewport, clip: ClipId) -> Option<Rect> {
    let (track_index, clip_index) = timeline.find_clip(clip)?;
    let track = timeline.track_at_index(track_index)?;
    Some(viewport.clip_rect(
        &track.clips()[clip_index],
        timeline.track_top(track_index),
        track.height(),
    ))
}

/// A track row's rectangle in viewport coordinates, spanning the viewport
/// width.
pub fn track_bounds(timeline: &Timeline, viewport: &Viewport, index: usize) -> Option<Rect> {
    let track = timeline.track_at_index(index)?;
    Some(Rect::new(
        0.0,
        timeline.track_top(index) - viewport.scroll_y,
        viewport.width,
        track.height(),
    ))
}

/// Every interactive clip with its rectangle in content coordinates, track
/// by track in display order. This is the default item list for rectangle
/// selection.
pub fn marquee_candidates(timeline: &Timeline, viewport: &Viewport) -> Vec<(SelectionItem, Rect)> {
    let mut top = 0.0;
    let mut out = Vec::new();
    for track in timeline.tracks() {
        for clip in track.clips().iter().filter(|c| viewport.is_interactive(c)) {
            let x = units::ticks_to_pixels(clip.span().start(), viewport.zoom);
            out.push((
                SelectionItem::Clip(clip.id),
                Rect::new(x, top, clip.width_px(viewport.zoom), track.height()),
            ));
        }
        top += track.height();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_region_rounds_up() {
        let mut vp = Viewport::new(Size::new(100.5, 50.0));
        vp.scroll_ticks = 300;
        let region = vp.visible_region();
        assert_eq!(region.start(), 300);
        assert_eq!(region.duration(), 1005);
    }

    #[test]
    fn test_tick_x_roundtrip_within_one_tick() {
        let mut vp = Viewport::new(Size::new(800.0, 200.0));
        vp.zoom = 3.7;
        vp.scroll_ticks = 1234;
        for tick in [1234, 1500, 9999, 48_000] {
            let back = vp.x_to_tick(vp.tick_to_x(tick));
            assert!((back - tick).abs() <= 1, "{tick} came back as {back}");
        }
    }
}
