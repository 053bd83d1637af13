use tickline_core::config::EngineConfig;
use tickline_core::geometry::{Point, Rect, Size};
use tickline_core::host::Modifiers;
use tickline_core::marquee::MarqueeController;
use tickline_core::selection::{SelectionItem, SelectionModel};
use tickline_core::timeline::{ClipId, Timeline};
use tickline_core::viewport::Viewport;
use tickline_test_harness::assertions::{assert_nothing_selected, assert_selected_clips};
use tickline_test_harness::builders::{single_track, TimelineBuilder, TrackBuilder};
use tickline_test_harness::fixtures::{init_logging, ManualClock, ScriptedPolicy};

struct Fixture {
    timeline: Timeline,
    clips: Vec<ClipId>,
    selection: SelectionModel,
    marquee: MarqueeController,
    clock: ManualClock,
    vp: Viewport,
}

fn fixture() -> Fixture {
    init_logging();
    let (timeline, _, clips) = single_track(&[(0, 10), (20, 10), (40, 10), (60, 10)]);
    Fixture {
        timeline,
        clips,
        selection: SelectionModel::default(),
        marquee: MarqueeController::new(EngineConfig::default()),
        clock: ManualClock::new(),
        vp: Viewport::new(Size::new(400.0, 400.0)),
    }
}

fn item(id: ClipId) -> SelectionItem {
    SelectionItem::Clip(id)
}

impl Fixture {
    fn items(&self) -> Vec<(SelectionItem, Rect)> {
        vec![
            // Fully inside (10,10)-(200,80).
            (item(self.clips[0]), Rect::new(20.0, 20.0, 50.0, 30.0)),
            // Partially inside.
            (item(self.clips[1]), Rect::new(150.0, 50.0, 100.0, 100.0)),
            // Outside.
            (item(self.clips[2]), Rect::new(300.0, 300.0, 20.0, 20.0)),
        ]
    }

    fn drag_to(&mut self, point: Point, modifiers: Modifiers) -> tickline_core::error::Result<bool> {
        let items = self.items();
        self.marquee.update_with(
            &mut self.timeline,
            &mut self.selection,
            &self.vp,
            point,
            modifiers,
            &self.clock,
            |_, _| items,
        )
    }
}

#[test]
fn test_rectangle_selects_inside_and_partial_items() {
    let mut f = fixture();
    f.selection.select(&mut f.timeline, item(f.clips[2])).unwrap();

    f.marquee
        .begin(&f.timeline, &f.vp, Point::new(10.0, 10.0), Modifiers::NONE, true);
    assert!(f.drag_to(Point::new(200.0, 80.0), Modifiers::NONE).unwrap());

    assert!(f.marquee.is_activated());
    assert_selected_clips(&f.timeline, &[f.clips[0], f.clips[1]]);
    assert_eq!(
        f.marquee.rect(&f.vp),
        Some(Rect::new(10.0, 10.0, 190.0, 70.0))
    );
}

#[test]
fn test_reapplying_same_rectangle_changes_nothing() {
    let mut f = fixture();
    f.marquee
        .begin(&f.timeline, &f.vp, Point::new(10.0, 10.0), Modifiers::NONE, true);
    f.drag_to(Point::new(200.0, 80.0), Modifiers::NONE).unwrap();
    f.timeline.take_events();

    assert!(!f.drag_to(Point::new(200.0, 80.0), Modifiers::NONE).unwrap());
    assert!(f.timeline.take_events().is_empty());
    assert_selected_clips(&f.timeline, &[f.clips[0], f.clips[1]]);
}

#[test]
fn test_shrinking_rectangle_deselects() {
    let mut f = fixture();
    f.marquee
        .begin(&f.timeline, &f.vp, Point::new(10.0, 10.0), Modifiers::NONE, true);
    f.drag_to(Point::new(200.0, 80.0), Modifiers::NONE).unwrap();
    f.drag_to(Point::new(100.0, 60.0), Modifiers::NONE).unwrap();
    assert_selected_clips(&f.timeline, &[f.clips[0]]);
}

#[test]
fn test_rectangle_normalizes_reverse_drag() {
    let mut f = fixture();
    f.marquee
        .begin(&f.timeline, &f.vp, Point::new(200.0, 80.0), Modifiers::NONE, true);
    f.drag_to(Point::new(10.0, 10.0), Modifiers::NONE).unwrap();
    assert_selected_clips(&f.timeline, &[f.clips[0], f.clips[1]]);
}

#[test]
fn test_small_movement_does_not_activate() {
    let mut f = fixture();
    f.selection.select(&mut f.timeline, item(f.clips[3])).unwrap();
    f.marquee
        .begin(&f.timeline, &f.vp, Point::new(10.0, 10.0), Modifiers::NONE, true);

    assert!(!f.drag_to(Point::new(13.0, 15.0), Modifiers::NONE).unwrap());

    assert!(!f.marquee.is_activated());
    assert!(f.marquee.rect(&f.vp).is_none());
    assert_selected_clips(&f.timeline, &[f.clips[3]]);
}

#[test]
fn test_additive_rectangle_toggles_against_snapshot() {
    let mut f = fixture();
    // clips[0] is under the rectangle, clips[3] is not a candidate at all.
    f.selection.select(&mut f.timeline, item(f.clips[0])).unwrap();
    f.selection.select(&mut f.timeline, item(f.clips[3])).unwrap();

    f.marquee
        .begin(&f.timeline, &f.vp, Point::new(10.0, 10.0), Modifiers::CONTROL, true);
    f.drag_to(Point::new(200.0, 80.0), Modifiers::CONTROL).unwrap();

    assert_selected_clips(&f.timeline, &[f.clips[1], f.clips[3]]);
}

#[test]
fn test_modifier_change_reevaluates() {
    init_logging();
    // Two 100 px wide clips on the first row: x 0..100 and 150..250.
    let (mut timeline, _, clips) = single_track(&[(0, 1000), (1500, 1000)]);
    let mut selection = SelectionModel::default();
    let mut marquee = MarqueeController::new(EngineConfig::default());
    let clock = ManualClock::new();
    let vp = Viewport::of(&timeline, Size::new(400.0, 400.0));
    selection.select(&mut timeline, item(clips[0])).unwrap();

    marquee.begin(&timeline, &vp, Point::new(50.0, 10.0), Modifiers::NONE, true);
    marquee
        .update(&mut timeline, &mut selection, &vp, Point::new(200.0, 40.0), Modifiers::NONE, &clock)
        .unwrap();
    assert_selected_clips(&timeline, &[clips[0], clips[1]]);

    let changed = marquee
        .modifiers_changed(&mut timeline, &mut selection, &vp, Modifiers::CONTROL, &clock)
        .unwrap();

    // Additive now: the clip selected before the gesture toggles off.
    assert!(changed);
    assert_selected_clips(&timeline, &[clips[1]]);
}

#[test]
fn test_click_without_drag_clears_selection() {
    let mut f = fixture();
    f.selection.select(&mut f.timeline, item(f.clips[0])).unwrap();
    f.marquee
        .begin(&f.timeline, &f.vp, Point::new(10.0, 300.0), Modifiers::NONE, true);

    assert!(f
        .marquee
        .end(&mut f.timeline, &mut f.selection, Modifiers::NONE)
        .unwrap());

    assert_nothing_selected(&f.timeline);
    assert!(!f.marquee.is_active());
}

#[test]
fn test_click_keeps_selection_when_opted_out_or_additive() {
    let mut f = fixture();
    f.selection.select(&mut f.timeline, item(f.clips[0])).unwrap();

    f.marquee
        .begin(&f.timeline, &f.vp, Point::new(10.0, 300.0), Modifiers::NONE, false);
    f.marquee
        .end(&mut f.timeline, &mut f.selection, Modifiers::NONE)
        .unwrap();
    assert_selected_clips(&f.timeline, &[f.clips[0]]);

    f.marquee
        .begin(&f.timeline, &f.vp, Point::new(10.0, 300.0), Modifiers::CONTROL, true);
    f.marquee
        .end(&mut f.timeline, &mut f.selection, Modifiers::CONTROL)
        .unwrap();
    assert_selected_clips(&f.timeline, &[f.clips[0]]);
}

#[test]
fn test_veto_all_aborts_gesture_keeping_applied_changes() {
    let mut f = fixture();
    f.selection = SelectionModel::new(ScriptedPolicy::new().veto_all_on_select(item(f.clips[1])));
    f.marquee
        .begin(&f.timeline, &f.vp, Point::new(10.0, 10.0), Modifiers::NONE, true);

    let err = f.drag_to(Point::new(200.0, 80.0), Modifiers::NONE).unwrap_err();

    assert!(err.is_cancel_all());
    assert!(f.marquee.is_aborted());
    assert_selected_clips(&f.timeline, &[f.clips[0]]);

    // Further movement is ignored until the gesture ends.
    assert!(!f.drag_to(Point::new(390.0, 390.0), Modifiers::NONE).unwrap());
    assert_selected_clips(&f.timeline, &[f.clips[0]]);
}

#[test]
fn test_vetoed_activation_clear_aborts() {
    let mut f = fixture();
    f.selection = SelectionModel::new(ScriptedPolicy::new().on(
        item(f.clips[3]),
        false,
        tickline_core::selection::Verdict::VetoAll,
    ));
    f.selection.select(&mut f.timeline, item(f.clips[3])).unwrap();
    f.marquee
        .begin(&f.timeline, &f.vp, Point::new(10.0, 10.0), Modifiers::NONE, true);

    assert!(f.drag_to(Point::new(200.0, 80.0), Modifiers::NONE).is_err());

    assert!(f.marquee.is_aborted());
    assert_selected_clips(&f.timeline, &[f.clips[3]]);
}

#[test]
fn test_auto_scroll_is_rate_limited() {
    init_logging();
    let mut track_list = TimelineBuilder::new();
    for i in 0..10 {
        track_list = track_list.with_track(TrackBuilder::video(&format!("V{i}")));
    }
    let mut timeline = track_list.build();
    let mut selection = SelectionModel::default();
    let mut marquee = MarqueeController::new(EngineConfig::default());
    let clock = ManualClock::new();
    let size = Size::new(400.0, 100.0);

    let vp = Viewport::of(&timeline, size);
    marquee.begin(&timeline, &vp, Point::new(10.0, 50.0), Modifiers::NONE, true);

    let mut move_to = |timeline: &mut Timeline, y: f64| {
        let vp = Viewport::of(timeline, size);
        marquee
            .update(timeline, &mut selection, &vp, Point::new(10.0, y), Modifiers::NONE, &clock)
            .unwrap();
        timeline.scroll_y()
    };

    // Near the bottom edge: two 16 px lines per step.
    assert_eq!(move_to(&mut timeline, 95.0), 32.0);
    assert_eq!(move_to(&mut timeline, 96.0), 32.0);
    clock.advance_ms(10);
    assert_eq!(move_to(&mut timeline, 96.0), 32.0);
    clock.advance_ms(15);
    assert_eq!(move_to(&mut timeline, 96.0), 64.0);
    clock.advance_ms(25);
    // Away from the edges nothing scrolls.
    assert_eq!(move_to(&mut timeline, 50.0), 64.0);
    // Near the top edge it scrolls back up.
    assert_eq!(move_to(&mut timeline, 5.0), 32.0);
}

#[test]
#[should_panic(expected = "without an active gesture")]
fn test_update_without_gesture_panics() {
    let mut f = fixture();
    let _ = f.drag_to(Point::new(10.0, 10.0), Modifiers::NONE);
}
