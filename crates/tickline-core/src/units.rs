//! Pixel/tick conversion.
//!
//! Every conversion in the engine goes through these functions so that
//! rounding is identical everywhere; pixels become ticks by flooring.

/// Ticks per second of timeline time. Divisible by 24, 25, 30 and 60.
pub const TICKS_PER_SECOND: i64 = 600;

/// On-screen pixels per second at zoom 1.0.
pub const BASE_PIXELS_PER_SECOND: f64 = 60.0;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 200.0;

pub fn pixels_per_tick(zoom: f64) -> f64 {
    debug_assert!(zoom > 0.0, "zoom must be positive, got {zoom}");
    (BASE_PIXELS_PER_SECOND * zoom) / TICKS_PER_SECOND as f64
}

pub fn ticks_per_pixel(zoom: f64) -> f64 {
    debug_assert!(zoom > 0.0, "zoom must be positive, got {zoom}");
    TICKS_PER_SECOND as f64 / (BASE_PIXELS_PER_SECOND * zoom)
}

pub fn ticks_to_pixels(ticks: i64, zoom: f64) -> f64 {
    ticks as f64 * pixels_per_tick(zoom)
}

pub fn pixels_to_ticks(px: f64, zoom: f64) -> i64 {
    (px * ticks_per_pixel(zoom)).floor() as i64
}

/// Clamp a zoom factor into `[MIN_ZOOM, MAX_ZOOM]`.
/// NaN, infinities and non-positive values fall back to `MIN_ZOOM`.
pub fn clamp_zoom(zoom: f64) -> f64 {
    if !zoom.is_finite() || zoom <= 0.0 {
        return MIN_ZOOM;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

pub fn secs_to_ticks(secs: f64) -> i64 {
    (secs * TICKS_PER_SECOND as f64).round() as i64
}

pub fn ticks_to_secs(ticks: i64) -> f64 {
    ticks as f64 / TICKS_PER_SECOND as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_zoom_scale() {
        // 60 px per second, 600 ticks per second -> 10 ticks per pixel.
        assert_eq!(ticks_per_pixel(1.0), 10.0);
        assert_eq!(pixels_per_tick(1.0), 0.1);
        assert_eq!(ticks_to_pixels(600, 1.0), 60.0);
        assert_eq!(pixels_to_ticks(60.0, 1.0), 600);
    }

    #[test]
    fn test_pixels_to_ticks_floors() {
        assert_eq!(pixels_to_ticks(0.55, 1.0), 5);
        assert_eq!(pixels_to_ticks(-0.05, 1.0), -1);
    }

    #[test]
    fn test_clamp_zoom() {
        assert_eq!(clamp_zoom(0.0), MIN_ZOOM);
        assert_eq!(clamp_zoom(-3.0), MIN_ZOOM);
        assert_eq!(clamp_zoom(f64::NAN), MIN_ZOOM);
        assert_eq!(clamp_zoom(1e9), MAX_ZOOM);
        assert_eq!(clamp_zoom(2.5), 2.5);
    }

    #[test]
    fn test_secs_roundtrip() {
        assert_eq!(secs_to_ticks(1.5), 900);
        assert_eq!(ticks_to_secs(900), 1.5);
    }
}
