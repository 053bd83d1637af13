use crate::selection::SelectionItem;
use crate::timeline::{ClipId, Span, TrackId};

/// Items whose selection state changed during one selection operation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionDelta {
    pub added: Vec<SelectionItem>,
    pub removed: Vec<SelectionItem>,
}

impl SelectionDelta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one transition. A deselect followed by a reselect of the same
    /// item within one operation cancels out, and vice versa.
    pub fn record(&mut self, item: SelectionItem, selected: bool) {
        let (same, opposite) = if selected {
            (&mut self.added, &mut self.removed)
        } else {
            (&mut self.removed, &mut self.added)
        };
        if let Some(pos) = opposite.iter().position(|i| *i == item) {
            opposite.remove(pos);
        } else if !same.contains(&item) {
            same.push(item);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    pub fn touches(&self, item: SelectionItem) -> bool {
        self.added.contains(&item) || self.removed.contains(&item)
    }
}

/// A change notification recorded by the timeline. Events are queued in the
/// order the mutations happen and drained by the host with
/// [`Timeline::take_events`](crate::timeline::Timeline::take_events); the
/// host uses them to decide what to redraw.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    SelectionChanged(SelectionDelta),
    SpanChanged {
        clip: ClipId,
        old: Span,
        new: Span,
    },
    DisplayNameChanged {
        clip: ClipId,
    },
    ClipAdded {
        track: TrackId,
        clip: ClipId,
    },
    ClipRemoved {
        track: TrackId,
        clip: ClipId,
    },
    ClipMoved {
        clip: ClipId,
        from: TrackId,
        to: TrackId,
    },
    /// Display (z) order of a track's clips changed.
    ClipOrderChanged {
        track: TrackId,
    },
    TrackAdded(TrackId),
    TrackRemoved(TrackId),
    TrackMoved {
        track: TrackId,
        old_index: usize,
        new_index: usize,
    },
    TrackHeightChanged {
        track: TrackId,
        height: f64,
    },
    ZoomChanged {
        old: f64,
        new: f64,
    },
    ScrollChanged {
        old_ticks: i64,
        new_ticks: i64,
    },
    VerticalScrollChanged {
        old_px: f64,
        new_px: f64,
    },
    PlayHeadChanged {
        old: i64,
        new: i64,
    },
    MaxDurationChanged {
        old: i64,
        new: i64,
    },
}

impl TimelineEvent {
    /// The clip this event is about, if it concerns a single clip.
    pub fn clip(&self) -> Option<ClipId> {
        match self {
            TimelineEvent::SpanChanged { clip, .. }
            | TimelineEvent::DisplayNameChanged { clip }
            | TimelineEvent::ClipAdded { clip, .. }
            | TimelineEvent::ClipRemoved { clip, .. }
            | TimelineEvent::ClipMoved { clip, .. } => Some(*clip),
            _ => None,
        }
    }

    /// True when the event changes the horizontal projection of every clip.
    pub fn affects_projection(&self) -> bool {
        matches!(
            self,
            TimelineEvent::ZoomChanged { .. } | TimelineEvent::ScrollChanged { .. }
        )
    }
}
