//! Routes raw input events to the selection, marquee, drag and zoom
//! controllers, the way a canvas widget's update loop would.

use std::fmt;

use log::{debug, warn};

use crate::config::EngineConfig;
use crate::drag::{DragCommit, DragController, DragState};
use crate::error::Result;
use crate::geometry::Point;
use crate::host::{Clock, InputEvent, Key, Modifiers, PointerButton, RenderSurface, SystemClock};
use crate::marquee::MarqueeController;
use crate::selection::{AllowAll, ClickTarget, SelectionModel, SelectionPolicy};
use crate::timeline::Timeline;
use crate::viewport::{self, Viewport};
use crate::zoom::ZoomController;

/// What the host should do with pointer capture after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capture {
    #[default]
    Unchanged,
    Take,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Response {
    pub handled: bool,
    pub capture: Capture,
    /// Set when this event finished a clip drag.
    pub commit: Option<DragCommit>,
}

impl Response {
    fn ignored() -> Self {
        Self::default()
    }

    fn handled() -> Self {
        Self {
            handled: true,
            ..Self::default()
        }
    }

    fn capture() -> Self {
        Self {
            handled: true,
            capture: Capture::Take,
            commit: None,
        }
    }

    fn release() -> Self {
        Self {
            handled: true,
            capture: Capture::Release,
            commit: None,
        }
    }
}

/// Per-widget interaction state: the controllers plus the host's clock and
/// selection policy.
pub struct Interaction {
    config: EngineConfig,
    selection: SelectionModel,
    marquee: MarqueeController,
    drag: DragController,
    zoom: ZoomController,
    clock: Box<dyn Clock>,
    modifiers: Modifiers,
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new(EngineConfig::default(), AllowAll, SystemClock)
    }
}

impl fmt::Debug for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interaction")
            .field("config", &self.config)
            .field("marquee", &self.marquee)
            .field("drag", &self.drag)
            .field("modifiers", &self.modifiers)
            .finish_non_exhaustive()
    }
}

impl Interaction {
    pub fn new(
        config: EngineConfig,
        policy: impl SelectionPolicy + 'static,
        clock: impl Clock + 'static,
    ) -> Self {
        Self {
            selection: SelectionModel::new(policy),
            marquee: MarqueeController::new(config.clone()),
            drag: DragController::new(config.clone()),
            zoom: ZoomController::new(config.clone()),
            config,
            clock: Box::new(clock),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn selection(&mut self) -> &mut SelectionModel {
        &mut self.selection
    }

    pub fn marquee(&self) -> &MarqueeController {
        &self.marquee
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// The viewport the timeline is currently shown in.
    pub fn viewport(&self, timeline: &Timeline, surface: &dyn RenderSurface) -> Viewport {
        Viewport::of(timeline, surface.viewport_size())
            .with_min_interactive_width(self.config.min_interactive_width_px)
            .with_edge_grip(self.config.edge_grip_px)
    }

    /// Feed one input event. Calls `surface.invalidate()` when anything
    /// visible changed.
    pub fn handle(
        &mut self,
        timeline: &mut Timeline,
        surface: &mut dyn RenderSurface,
        event: &InputEvent,
    ) -> Response {
        let vp = self.viewport(timeline, surface);
        let events_before = timeline.pending_events().len();
        self.modifiers = event.modifiers();

        let (response, redraw) = match *event {
            InputEvent::PointerDown {
                position,
                button: PointerButton::Primary,
                modifiers,
            } => self.pointer_down(timeline, &vp, position, modifiers),
            InputEvent::PointerDown { .. } => (Response::ignored(), false),
            InputEvent::PointerMove {
                position,
                modifiers,
            } => self.pointer_move(timeline, &vp, position, modifiers),
            InputEvent::PointerUp { modifiers, .. } => self.pointer_up(timeline, modifiers),
            InputEvent::Wheel {
                position,
                delta,
                modifiers,
            } => {
                let changed = self
                    .zoom
                    .wheel(timeline, vp.size(), position, delta.lines, modifiers);
                (Response::handled(), changed)
            }
            InputEvent::Key {
                key: Key::Escape, ..
            } => self.escape(timeline),
            InputEvent::Key { .. } => (Response::ignored(), false),
            InputEvent::ModifiersChanged(modifiers) => {
                let changed = self.marquee.modifiers_changed(
                    timeline,
                    &mut self.selection,
                    &vp,
                    modifiers,
                    self.clock.as_ref(),
                );
                let changed = log_failure("marquee re-evaluation", changed).unwrap_or(true);
                let response = if changed {
                    Response::handled()
                } else {
                    Response::ignored()
                };
                (response, changed)
            }
        };

        if redraw || timeline.pending_events().len() != events_before {
            surface.invalidate();
        }
        response
    }

    fn pointer_down(
        &mut self,
        timeline: &mut Timeline,
        vp: &Viewport,
        position: Point,
        modifiers: Modifiers,
    ) -> (Response, bool) {
        if let Some(hit) = viewport::hit_test(timeline, vp, position) {
            let target = ClickTarget {
                track: hit.track,
                clip: Some(hit.clip),
            };
            let _ = log_failure("click", self.selection.click(timeline, target, modifiers));
            if timeline.is_clip_selected(hit.clip) {
                let begun = self
                    .drag
                    .begin_with(timeline, vp, hit.clip, position, hit.zone.into());
                let _ = log_failure("drag", begun);
            }
            return (Response::capture(), false);
        }

        if let Some(row) = viewport::hit_test_track(timeline, vp, position) {
            let target = ClickTarget {
                track: row.track,
                clip: None,
            };
            let _ = log_failure("click", self.selection.click(timeline, target, modifiers));
            timeline.set_play_head(vp.x_to_tick(position.x));
            self.marquee.begin(timeline, vp, position, modifiers, false);
            return (Response::capture(), false);
        }

        self.marquee.begin(timeline, vp, position, modifiers, true);
        (Response::capture(), false)
    }

    fn pointer_move(
        &mut self,
        timeline: &mut Timeline,
        vp: &Viewport,
        position: Point,
        modifiers: Modifiers,
    ) -> (Response, bool) {
        if self.drag.state() != DragState::Idle {
            let moved = log_failure("drag", self.drag.update(timeline, vp, position));
            return (Response::handled(), moved.unwrap_or(false));
        }
        if self.marquee.is_active() {
            let changed = self.marquee.update(
                timeline,
                &mut self.selection,
                vp,
                position,
                modifiers,
                self.clock.as_ref(),
            );
            // An aborted gesture still changed what was drawn.
            return (Response::handled(), log_failure("marquee", changed).unwrap_or(true));
        }
        (Response::ignored(), false)
    }

    fn pointer_up(&mut self, timeline: &mut Timeline, modifiers: Modifiers) -> (Response, bool) {
        if self.drag.state() != DragState::Idle {
            let commit = self.drag.end(timeline);
            return (
                Response {
                    commit,
                    ..Response::release()
                },
                commit.is_some(),
            );
        }
        if self.marquee.is_active() {
            let was_drawn = self.marquee.is_activated();
            let changed = log_failure("marquee", self.marquee.end(timeline, &mut self.selection, modifiers));
            return (Response::release(), was_drawn || changed.unwrap_or(false));
        }
        (Response::ignored(), false)
    }

    fn escape(&mut self, timeline: &mut Timeline) -> (Response, bool) {
        if self.drag.state() != DragState::Idle {
            let _ = log_failure("drag cancel", self.drag.cancel(timeline));
            return (Response::release(), true);
        }
        if self.marquee.is_active() {
            let was_drawn = self.marquee.is_activated();
            self.marquee.cancel();
            return (Response::release(), was_drawn);
        }
        (Response::ignored(), false)
    }
}

fn log_failure<T>(what: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) if err.is_veto() => {
            debug!("{what}: {err}");
            None
        }
        Err(err) => {
            warn!("{what} failed: {err}");
            None
        }
    }
}
