use tickline_core::timeline::{Clip, ClipId, ClipKind, Span, Timeline, Track, TrackId, TrackKind};
use tickline_core::units::secs_to_ticks;
use uuid::Uuid;

/// Builder for creating test Clips with sensible defaults.
pub struct ClipBuilder {
    name: String,
    start: i64,
    duration: i64,
    kind: ClipKind,
    payload: Option<Uuid>,
}

impl ClipBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            start: 0,
            duration: secs_to_ticks(5.0),
            kind: ClipKind::Video,
            payload: None,
        }
    }

    /// Start tick.
    pub fn at(mut self, start: i64) -> Self {
        self.start = start;
        self
    }

    pub fn at_secs(mut self, secs: f64) -> Self {
        self.start = secs_to_ticks(secs);
        self
    }

    /// Duration in ticks.
    pub fn duration(mut self, ticks: i64) -> Self {
        self.duration = ticks;
        self
    }

    pub fn duration_secs(mut self, secs: f64) -> Self {
        self.duration = secs_to_ticks(secs);
        self
    }

    pub fn kind(mut self, kind: ClipKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn payload(mut self, payload: Uuid) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn build(self) -> Clip {
        let span = Span::new(self.start, self.duration).expect("invalid span in test builder");
        let clip = Clip::new(self.name, span).with_kind(self.kind);
        match self.payload {
            Some(payload) => clip.with_payload(payload),
            None => clip,
        }
    }
}

/// Builder for a track with clips already placed, in display order.
pub struct TrackBuilder {
    name: String,
    kind: TrackKind,
    height: Option<f64>,
    clips: Vec<Clip>,
}

impl TrackBuilder {
    pub fn video(name: &str) -> Self {
        Self {
            name: name.into(),
            kind: TrackKind::Video,
            height: None,
            clips: Vec::new(),
        }
    }

    pub fn audio(name: &str) -> Self {
        Self {
            kind: TrackKind::Audio,
            ..Self::video(name)
        }
    }

    pub fn height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_clip(mut self, clip: Clip) -> Self {
        self.clips.push(clip);
        self
    }

    /// Append a clip spanning `[start, start + duration)`.
    pub fn with_span(self, name: &str, start: i64, duration: i64) -> Self {
        self.with_clip(ClipBuilder::new(name).at(start).duration(duration).build())
    }

    fn add_to(self, timeline: &mut Timeline) -> TrackId {
        let id = timeline.push_track(Track::new(self.name, self.kind));
        if let Some(height) = self.height {
            timeline
                .set_track_height(id, height)
                .expect("track was just added");
        }
        for clip in self.clips {
            timeline.add_clip(id, clip).expect("track was just added");
        }
        id
    }
}

/// Build a timeline with tracks and view state. Events produced while
/// building are discarded.
pub struct TimelineBuilder {
    tracks: Vec<TrackBuilder>,
    max_duration: Option<i64>,
    zoom: f64,
    scroll_ticks: i64,
}

impl TimelineBuilder {
    pub fn new() -> Self {
        Self {
            tracks: Vec::new(),
            max_duration: None,
            zoom: 1.0,
            scroll_ticks: 0,
        }
    }

    pub fn with_track(mut self, track: TrackBuilder) -> Self {
        self.tracks.push(track);
        self
    }

    pub fn max_duration(mut self, ticks: i64) -> Self {
        self.max_duration = Some(ticks);
        self
    }

    pub fn zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn scroll_ticks(mut self, ticks: i64) -> Self {
        self.scroll_ticks = ticks;
        self
    }

    pub fn build(self) -> Timeline {
        let mut timeline = match self.max_duration {
            Some(ticks) => Timeline::with_max_duration(ticks),
            None => Timeline::new(),
        };
        for track in self.tracks {
            track.add_to(&mut timeline);
        }
        timeline.set_zoom(self.zoom);
        timeline.set_scroll_ticks(self.scroll_ticks);
        timeline.take_events();
        timeline
    }
}

impl Default for TimelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One video track holding clips with the given `(start, duration)` spans,
/// in that display order. Returns the timeline, the track and the clip ids.
pub fn single_track(spans: &[(i64, i64)]) -> (Timeline, TrackId, Vec<ClipId>) {
    let mut track = TrackBuilder::video("V1");
    for (i, (start, duration)) in spans.iter().enumerate() {
        track = track.with_span(&format!("C{i}"), *start, *duration);
    }
    let timeline = TimelineBuilder::new().with_track(track).build();
    let track_ref = &timeline.tracks()[0];
    let id = track_ref.id;
    let clips = track_ref.clips().iter().map(|c| c.id).collect();
    (timeline, id, clips)
}
