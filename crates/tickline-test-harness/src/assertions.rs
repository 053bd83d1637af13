use std::collections::HashSet;

use tickline_core::events::{SelectionDelta, TimelineEvent};
use tickline_core::timeline::{ClipId, Span, Timeline, TrackId};

/// Assert exactly these clips are selected, in any order.
pub fn assert_selected_clips(timeline: &Timeline, expected: &[ClipId]) {
    let actual: HashSet<ClipId> = timeline.selected_clips().collect();
    let expected_set: HashSet<ClipId> = expected.iter().copied().collect();
    assert_eq!(
        actual, expected_set,
        "selected clips {actual:?} != expected {expected_set:?}"
    );
}

/// Assert exactly these tracks are selected, in any order.
pub fn assert_selected_tracks(timeline: &Timeline, expected: &[TrackId]) {
    let actual: HashSet<TrackId> = timeline.selected_tracks().iter().copied().collect();
    let expected_set: HashSet<TrackId> = expected.iter().copied().collect();
    assert_eq!(
        actual, expected_set,
        "selected tracks {actual:?} != expected {expected_set:?}"
    );
}

pub fn assert_nothing_selected(timeline: &Timeline) {
    let items = timeline.selected_items();
    assert!(items.is_empty(), "expected empty selection, found {items:?}");
}

/// Assert a clip occupies `[start, start + duration)`.
pub fn assert_span(timeline: &Timeline, clip: ClipId, start: i64, duration: i64) {
    let actual = timeline
        .clip(clip)
        .unwrap_or_else(|| panic!("clip {clip} not on the timeline"))
        .span();
    assert_eq!(
        (actual.start(), actual.duration()),
        (start, duration),
        "clip {clip} has span {actual:?}, expected start {start} duration {duration}"
    );
}

/// Assert the range anchor (if any) still names a clip on the timeline.
pub fn assert_no_dangling_anchor(timeline: &Timeline) {
    if let Some(anchor) = timeline.anchor() {
        assert!(
            timeline.clip(anchor).is_some(),
            "anchor {anchor} refers to a clip that is no longer on the timeline"
        );
    }
}

/// All `SelectionChanged` deltas in an event list.
pub fn selection_deltas(events: &[TimelineEvent]) -> Vec<SelectionDelta> {
    events
        .iter()
        .filter_map(|e| match e {
            TimelineEvent::SelectionChanged(delta) => Some(delta.clone()),
            _ => None,
        })
        .collect()
}

/// Assert the event list holds exactly one `SelectionChanged` event and
/// return its delta.
pub fn single_selection_delta(events: &[TimelineEvent]) -> SelectionDelta {
    let deltas = selection_deltas(events);
    assert_eq!(
        deltas.len(),
        1,
        "expected exactly one selection event, got {deltas:?}"
    );
    deltas.into_iter().next().expect("length checked above")
}

/// Assert a span change for `clip` was reported.
pub fn assert_span_event(events: &[TimelineEvent], clip: ClipId, new: Span) {
    assert!(
        events.iter().any(|e| matches!(
            e,
            TimelineEvent::SpanChanged { clip: c, new: n, .. } if *c == clip && *n == new
        )),
        "no SpanChanged({clip} -> {new:?}) in {events:?}"
    );
}
