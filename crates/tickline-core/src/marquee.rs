//! Rectangle ("rubber band") selection.
//!
//! The rectangle lives in content coordinates so it keeps its origin when the
//! view auto-scrolls underneath it.

use std::collections::HashSet;
use std::time::Instant;

use log::{debug, trace};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::host::{Clock, Modifiers};
use crate::selection::{SelectionItem, SelectionModel};
use crate::timeline::Timeline;
use crate::viewport::{self, Viewport};

#[derive(Debug, Clone)]
struct MarqueeGesture {
    start: Point,
    last_point: Point,
    modifiers: Modifiers,
    snapshot: HashSet<SelectionItem>,
    activated: bool,
    aborted: bool,
    clear_on_click: bool,
    last_scroll: Option<Instant>,
}

/// Drives one rectangle selection gesture at a time.
///
/// With Control held the gesture is additive: items inside the rectangle are
/// toggled relative to what was selected when the gesture began. Without it
/// the selection is replaced by whatever the rectangle touches.
#[derive(Debug, Clone, Default)]
pub struct MarqueeController {
    config: EngineConfig,
    gesture: Option<MarqueeGesture>,
}

impl MarqueeController {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            gesture: None,
        }
    }

    /// Whether a gesture is in progress (activated or not).
    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Whether the pointer has moved far enough for the rectangle to show.
    pub fn is_activated(&self) -> bool {
        self.gesture.as_ref().is_some_and(|g| g.activated)
    }

    pub fn is_aborted(&self) -> bool {
        self.gesture.as_ref().is_some_and(|g| g.aborted)
    }

    /// Start a gesture at a viewport point. `clear_on_click` controls whether
    /// releasing without ever activating clears the selection.
    pub fn begin(
        &mut self,
        timeline: &Timeline,
        viewport: &Viewport,
        point: Point,
        modifiers: Modifiers,
        clear_on_click: bool,
    ) {
        self.gesture = Some(MarqueeGesture {
            start: viewport.to_content(point),
            last_point: point,
            modifiers,
            snapshot: timeline.selected_items().into_iter().collect(),
            activated: false,
            aborted: false,
            clear_on_click,
            last_scroll: None,
        });
    }

    /// The rectangle in viewport coordinates, once activated.
    pub fn rect(&self, viewport: &Viewport) -> Option<Rect> {
        let gesture = self.gesture.as_ref().filter(|g| g.activated)?;
        Some(Rect::from_corners(
            viewport.to_viewport(gesture.start),
            gesture.last_point,
        ))
    }

    /// Pointer moved, selecting against every interactive clip.
    /// Returns whether anything visible changed.
    pub fn update(
        &mut self,
        timeline: &mut Timeline,
        selection: &mut SelectionModel,
        viewport: &Viewport,
        point: Point,
        modifiers: Modifiers,
        clock: &dyn Clock,
    ) -> Result<bool> {
        self.update_with(
            timeline,
            selection,
            viewport,
            point,
            modifiers,
            clock,
            viewport::marquee_candidates,
        )
    }

    /// Pointer moved, selecting against a host-supplied item list. The
    /// closure returns each item with its rectangle in content coordinates.
    ///
    /// # Panics
    ///
    /// Panics when no gesture is in progress.
    #[allow(clippy::too_many_arguments)]
    pub fn update_with<F>(
        &mut self,
        timeline: &mut Timeline,
        selection: &mut SelectionModel,
        viewport: &Viewport,
        point: Point,
        modifiers: Modifiers,
        clock: &dyn Clock,
        candidates: F,
    ) -> Result<bool>
    where
        F: FnOnce(&Timeline, &Viewport) -> Vec<(SelectionItem, Rect)>,
    {
        let config = &self.config;
        let gesture = self
            .gesture
            .as_mut()
            .expect("marquee update called without an active gesture");
        gesture.last_point = point;
        gesture.modifiers = modifiers;
        if gesture.aborted {
            return Ok(false);
        }

        let additive = modifiers.control;
        let mut changed = false;
        if !gesture.activated {
            let p = viewport.to_content(point);
            let dx = (p.x - gesture.start.x).abs();
            let dy = (p.y - gesture.start.y).abs();
            if dx <= config.drag_threshold_px && dy <= config.drag_threshold_px {
                return Ok(false);
            }
            gesture.activated = true;
            changed = true;
            debug!("marquee activated (additive: {additive})");
            if !additive {
                if let Err(err) = selection.clear(timeline) {
                    gesture.aborted = true;
                    debug!("marquee aborted on activation: {err}");
                    return Err(err);
                }
            }
        }

        let mut vp = *viewport;
        changed |= auto_scroll(config, gesture, timeline, &mut vp, point, clock);

        let items = candidates(timeline, &vp);
        let rect = Rect::from_corners(gesture.start, vp.to_content(point));
        trace!("marquee rect {rect:?} over {} items", items.len());
        let snapshot = &gesture.snapshot;
        let result = selection.batch(timeline, |b| {
            let mut any = false;
            for (item, bounds) in &items {
                let target = rect.intersects(bounds) ^ (additive && snapshot.contains(item));
                any |= b.try_set(*item, target)?;
            }
            Ok(any)
        });
        match result {
            Ok(any) => Ok(changed || any),
            Err(err) => {
                if err.is_cancel_all() {
                    gesture.aborted = true;
                    debug!("marquee aborted: {err}");
                }
                Err(err)
            }
        }
    }

    /// Re-evaluate the rectangle after a modifier key went up or down.
    /// Does nothing outside an activated gesture.
    pub fn modifiers_changed(
        &mut self,
        timeline: &mut Timeline,
        selection: &mut SelectionModel,
        viewport: &Viewport,
        modifiers: Modifiers,
        clock: &dyn Clock,
    ) -> Result<bool> {
        let Some(point) = self
            .gesture
            .as_ref()
            .filter(|g| g.activated && g.modifiers != modifiers)
            .map(|g| g.last_point)
        else {
            return Ok(false);
        };
        self.update(timeline, selection, viewport, point, modifiers, clock)
    }

    /// Finish the gesture. A click that never became a rectangle clears the
    /// selection unless it was additive or the gesture opted out.
    ///
    /// # Panics
    ///
    /// Panics when no gesture is in progress.
    pub fn end(
        &mut self,
        timeline: &mut Timeline,
        selection: &mut SelectionModel,
        modifiers: Modifiers,
    ) -> Result<bool> {
        let gesture = self
            .gesture
            .take()
            .expect("marquee end called without an active gesture");
        if gesture.activated {
            debug!("marquee finished");
            return Ok(true);
        }
        if modifiers.control || !gesture.clear_on_click {
            return Ok(false);
        }
        let had_selection = !timeline.selected_items().is_empty();
        selection.clear(timeline)?;
        Ok(had_selection)
    }

    /// Drop the gesture, leaving the selection as it is.
    pub fn cancel(&mut self) {
        if self.gesture.take().is_some() {
            debug!("marquee cancelled");
        }
    }
}

/// Scroll vertically when the pointer sits near the top or bottom edge, at
/// most once per configured interval.
fn auto_scroll(
    config: &EngineConfig,
    gesture: &mut MarqueeGesture,
    timeline: &mut Timeline,
    vp: &mut Viewport,
    point: Point,
    clock: &dyn Clock,
) -> bool {
    let direction = if point.y < config.auto_scroll_edge_px {
        -1.0
    } else if point.y > vp.height - config.auto_scroll_edge_px {
        1.0
    } else {
        return false;
    };
    let now = clock.now();
    if let Some(last) = gesture.last_scroll {
        if now.saturating_duration_since(last) < config.auto_scroll_interval() {
            return false;
        }
    }
    gesture.last_scroll = Some(now);
    let before = timeline.scroll_y();
    let after = timeline.set_scroll_y(before + direction * config.auto_scroll_step_px(), vp.height);
    vp.scroll_y = after;
    trace!("marquee auto-scroll {before} -> {after}");
    after != before
}
