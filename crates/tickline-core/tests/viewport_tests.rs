use tickline_core::geometry::{Point, Rect, Size};
use tickline_core::selection::SelectionItem;
use tickline_core::timeline::ClipId;
use tickline_core::viewport::*;
use tickline_test_harness::builders::{single_track, TimelineBuilder, TrackBuilder};

fn viewport(width: f64, height: f64) -> Viewport {
    Viewport::new(Size::new(width, height))
}

#[test]
fn test_visible_region_follows_scroll_and_zoom() {
    let mut vp = viewport(800.0, 200.0);
    assert_eq!(vp.visible_region().start(), 0);
    assert_eq!(vp.visible_region().duration(), 8000);

    vp.scroll_ticks = 1200;
    vp.zoom = 2.0;
    let region = vp.visible_region();
    assert_eq!(region.start(), 1200);
    assert_eq!(region.duration(), 4000);
}

#[test]
fn test_visible_clips_culls_offscreen_and_narrow() {
    // 100 px wide viewport at zoom 1 shows ticks [0, 1000).
    let (timeline, _, clips) = single_track(&[(0, 100), (900, 200), (1000, 50), (500, 10), (600, 5)]);
    let vp = viewport(100.0, 100.0);
    let visible: Vec<ClipId> = visible_clips(&timeline.tracks()[0], &vp).map(|c| c.id).collect();
    // (500, 10) is exactly 1 px wide and (600, 5) half a pixel: both culled.
    assert_eq!(visible, vec![clips[0], clips[1]]);

    // Range queries still see the narrow clips.
    let in_range = timeline.tracks()[0].clips_in_range(vp.visible_region()).count();
    assert_eq!(in_range, 4);
}

#[test]
fn test_hit_test_prefers_topmost_clip() {
    let (timeline, track, clips) = single_track(&[(0, 1000), (200, 200)]);
    let vp = viewport(400.0, 100.0);

    let hit = hit_test(&timeline, &vp, Point::new(25.0, 10.0)).unwrap();
    assert_eq!(hit.clip, clips[1]);
    assert_eq!(hit.track, track);
    assert_eq!(hit.track_index, 0);

    let hit = hit_test(&timeline, &vp, Point::new(5.0, 10.0)).unwrap();
    assert_eq!(hit.clip, clips[0]);
}

#[test]
fn test_hit_test_misses_narrow_clips_and_gaps() {
    let (timeline, _, _) = single_track(&[(0, 10), (500, 100)]);
    let vp = viewport(400.0, 100.0);
    // The 1 px clip at the origin is not interactive.
    assert!(hit_test(&timeline, &vp, Point::new(0.5, 10.0)).is_none());
    // Between clips.
    assert!(hit_test(&timeline, &vp, Point::new(30.0, 10.0)).is_none());
    // Below the last track.
    assert!(hit_test(&timeline, &vp, Point::new(55.0, 90.0)).is_none());
    assert!(hit_test(&timeline, &vp, Point::new(55.0, 10.0)).is_some());
}

#[test]
fn test_hit_test_respects_scroll() {
    let timeline = TimelineBuilder::new()
        .with_track(TrackBuilder::video("V1").with_span("a", 0, 100))
        .with_track(TrackBuilder::video("V2").with_span("b", 3000, 600))
        .scroll_ticks(3000)
        .build();
    let b = timeline.tracks()[1].clips()[0].id;
    let mut vp = Viewport::of(&timeline, Size::new(300.0, 100.0));
    vp.scroll_y = 20.0;

    // Viewport y 40 is content y 60: second track row.
    let hit = hit_test(&timeline, &vp, Point::new(10.0, 40.0)).unwrap();
    assert_eq!(hit.clip, b);
    assert_eq!(hit.track_index, 1);
}

#[test]
fn test_hit_test_track_rows() {
    let timeline = TimelineBuilder::new()
        .with_track(TrackBuilder::video("V1").height(30.0))
        .with_track(TrackBuilder::audio("A1").height(40.0))
        .build();
    let vp = viewport(300.0, 100.0);
    assert_eq!(hit_test_track(&timeline, &vp, Point::new(0.0, 29.9)).unwrap().index, 0);
    assert_eq!(hit_test_track(&timeline, &vp, Point::new(0.0, 30.0)).unwrap().index, 1);
    assert!(hit_test_track(&timeline, &vp, Point::new(0.0, 70.0)).is_none());
    assert!(hit_test_track(&timeline, &vp, Point::new(0.0, -1.0)).is_none());
}

#[test]
fn test_clip_bounds_in_viewport_space() {
    let timeline = TimelineBuilder::new()
        .with_track(TrackBuilder::video("V1").height(40.0))
        .with_track(TrackBuilder::video("V2").with_span("b", 600, 300))
        .scroll_ticks(100)
        .build();
    let b = timeline.tracks()[1].clips()[0].id;
    let vp = Viewport::of(&timeline, Size::new(300.0, 100.0));
    assert_eq!(
        clip_bounds(&timeline, &vp, b),
        Some(Rect::new(50.0, 40.0, 30.0, 56.0))
    );
    assert_eq!(clip_bounds(&timeline, &vp, ClipId::new()), None);
}

#[test]
fn test_marquee_candidates_use_content_space() {
    let timeline = TimelineBuilder::new()
        .with_track(TrackBuilder::video("V1").with_span("a", 100, 200).with_span("tiny", 0, 5))
        .with_track(TrackBuilder::video("V2").with_span("b", 0, 100))
        .scroll_ticks(50)
        .build();
    let a = timeline.tracks()[0].clips()[0].id;
    let b = timeline.tracks()[1].clips()[0].id;
    let vp = Viewport::of(&timeline, Size::new(300.0, 100.0));

    let candidates = marquee_candidates(&timeline, &vp);
    assert_eq!(
        candidates,
        vec![
            (SelectionItem::Clip(a), Rect::new(10.0, 0.0, 20.0, 56.0)),
            (SelectionItem::Clip(b), Rect::new(0.0, 56.0, 10.0, 56.0)),
        ]
    );
}

#[test]
fn test_hit_test_reports_grip_zones() {
    // 60 px wide clip at x 0..60, 15 px wide clip at x 100..115.
    let (timeline, _, clips) = single_track(&[(0, 600), (1000, 150)]);
    let vp = viewport(400.0, 100.0);

    let zone_at = |x: f64| hit_test(&timeline, &vp, Point::new(x, 10.0)).unwrap().zone;
    assert_eq!(zone_at(2.0), HitZone::LeftEdge);
    assert_eq!(zone_at(30.0), HitZone::Body);
    assert_eq!(zone_at(58.0), HitZone::RightEdge);

    // Too narrow for grips.
    let hit = hit_test(&timeline, &vp, Point::new(101.0, 10.0)).unwrap();
    assert_eq!(hit.clip, clips[1]);
    assert_eq!(hit.zone, HitZone::Body);

    let no_grips = vp.with_edge_grip(0.0);
    let hit = hit_test(&timeline, &no_grips, Point::new(2.0, 10.0)).unwrap();
    assert_eq!(hit.zone, HitZone::Body);
}
