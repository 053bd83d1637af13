use log::trace;

use crate::config::EngineConfig;
use crate::geometry::{Point, Size};
use crate::host::Modifiers;
use crate::timeline::Timeline;
use crate::units::{self, TICKS_PER_SECOND};
use crate::viewport::{self, Viewport};

/// Zoom factor for one wheel gesture: `1 + step` toward the user's intent,
/// `1 - step` away from it; the fine step when `fine` is set.
pub fn wheel_multiplier(lines: f64, fine: bool, config: &EngineConfig) -> f64 {
    let step = if fine {
        config.fine_zoom_step
    } else {
        config.zoom_step
    };
    if lines > 0.0 {
        1.0 + step
    } else if lines < 0.0 {
        1.0 - step
    } else {
        1.0
    }
}

/// Smallest zoom at which `max_duration` still fills a viewport `width` wide.
pub fn fit_zoom(max_duration: i64, width: f64) -> f64 {
    if max_duration <= 0 || width <= 0.0 {
        return units::MIN_ZOOM;
    }
    let zoom = width * TICKS_PER_SECOND as f64
        / (units::BASE_PIXELS_PER_SECOND * max_duration as f64);
    units::clamp_zoom(zoom)
}

/// Scroll offset that keeps the tick under `mouse_x` in place across a zoom
/// change.
pub fn focal_scroll(scroll_ticks: i64, old_zoom: f64, new_zoom: f64, mouse_x: f64) -> i64 {
    let focal_tick = scroll_ticks + units::pixels_to_ticks(mouse_x, old_zoom);
    (focal_tick - units::pixels_to_ticks(mouse_x, new_zoom)).max(0)
}

/// Multiply the timeline zoom by `multiplier`, keeping the tick under
/// `mouse_x` fixed. Returns the zoom applied.
pub fn zoom_toward_cursor(timeline: &mut Timeline, multiplier: f64, mouse_x: f64, viewport_width: f64) -> f64 {
    let old_zoom = timeline.zoom();
    let floor = fit_zoom(timeline.max_duration(), viewport_width);
    let new_zoom = units::clamp_zoom((old_zoom * multiplier).max(floor));
    if new_zoom == old_zoom {
        return old_zoom;
    }
    let scroll = focal_scroll(timeline.scroll_ticks(), old_zoom, new_zoom, mouse_x);
    trace!("zoom {old_zoom} -> {new_zoom}, scroll -> {scroll}");
    timeline.set_zoom(new_zoom);
    timeline.set_scroll_ticks(scroll);
    new_zoom
}

/// Wheel handling for the timeline area.
///
/// - Control: zoom toward the pointer (Shift for the fine step).
/// - Alt: resize the track under the pointer.
/// - Shift: scroll vertically.
/// - Otherwise: scroll horizontally.
#[derive(Debug, Clone, Default)]
pub struct ZoomController {
    config: EngineConfig,
}

impl ZoomController {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply one wheel event. Returns whether the view changed.
    pub fn wheel(
        &self,
        timeline: &mut Timeline,
        size: Size,
        position: Point,
        lines: f64,
        modifiers: Modifiers,
    ) -> bool {
        if lines == 0.0 || !lines.is_finite() {
            return false;
        }
        if modifiers.control {
            let m = wheel_multiplier(lines, modifiers.shift, &self.config);
            let before = timeline.zoom();
            return zoom_toward_cursor(timeline, m, position.x, size.width) != before;
        }
        if modifiers.alt {
            return self.resize_track(timeline, size, position, lines);
        }
        if modifiers.shift {
            let before = timeline.scroll_y();
            let target = before - lines * self.config.line_height_px;
            return timeline.set_scroll_y(target, size.height) != before;
        }
        self.scroll_horizontal(timeline, lines)
    }

    /// Scroll by `lines` wheel lines; positive lines scroll toward the start.
    pub fn scroll_horizontal(&self, timeline: &mut Timeline, lines: f64) -> bool {
        let per_line = units::pixels_to_ticks(self.config.wheel_scroll_px, timeline.zoom());
        let delta = (lines * per_line as f64).round() as i64;
        let before = timeline.scroll_ticks();
        timeline.set_scroll_ticks(before - delta) != before
    }

    fn resize_track(&self, timeline: &mut Timeline, size: Size, position: Point, lines: f64) -> bool {
        let vp = Viewport::of(timeline, size);
        let Some(row) = viewport::hit_test_track(timeline, &vp, position) else {
            return false;
        };
        let Ok(track) = timeline.track(row.track) else {
            return false;
        };
        let before = track.height();
        let target = before + lines * self.config.track_height_step_px;
        match timeline.set_track_height(row.track, target) {
            Ok(height) => height != before,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_multiplier_steps() {
        let config = EngineConfig::default();
        assert_eq!(wheel_multiplier(1.0, false, &config), 1.4);
        assert_eq!(wheel_multiplier(-1.0, false, &config), 0.6);
        assert_eq!(wheel_multiplier(3.0, true, &config), 1.2);
        assert_eq!(wheel_multiplier(-0.5, true, &config), 0.8);
        assert_eq!(wheel_multiplier(0.0, true, &config), 1.0);
    }

    #[test]
    fn test_focal_scroll_never_negative() {
        assert_eq!(focal_scroll(0, 1.0, 0.5, 400.0), 0);
    }

    #[test]
    fn test_fit_zoom_degenerate_inputs() {
        assert_eq!(fit_zoom(0, 800.0), units::MIN_ZOOM);
        assert_eq!(fit_zoom(6000, 0.0), units::MIN_ZOOM);
        // 10 s in 1200 px -> 120 px/s -> zoom 2.
        assert_eq!(fit_zoom(6000, 1200.0), 2.0);
    }
}
