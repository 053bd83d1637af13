//! What the engine needs from the embedding application: somewhere to
//! request repaints, a clock, and raw input events in viewport-local pixels.

use std::time::Instant;

use crate::geometry::{Point, Size};

/// The widget the timeline is drawn into.
pub trait RenderSurface {
    /// Request a repaint. Called whenever visible state changed.
    fn invalidate(&mut self);

    fn viewport_size(&self) -> Size;
}

/// Monotonic time source, used to rate-limit auto-scroll.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        control: false,
        alt: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        control: false,
        alt: false,
    };

    pub const CONTROL: Modifiers = Modifiers {
        shift: false,
        control: true,
        alt: false,
    };

    pub const ALT: Modifiers = Modifiers {
        shift: false,
        control: false,
        alt: true,
    };

    pub fn is_empty(&self) -> bool {
        !(self.shift || self.control || self.alt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

/// Wheel movement in lines; positive is "up" / away from the user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelDelta {
    pub lines: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown {
        position: Point,
        button: PointerButton,
        modifiers: Modifiers,
    },
    PointerMove {
        position: Point,
        modifiers: Modifiers,
    },
    PointerUp {
        position: Point,
        button: PointerButton,
        modifiers: Modifiers,
    },
    Wheel {
        position: Point,
        delta: WheelDelta,
        modifiers: Modifiers,
    },
    Key {
        key: Key,
        modifiers: Modifiers,
    },
    ModifiersChanged(Modifiers),
}

impl InputEvent {
    pub fn modifiers(&self) -> Modifiers {
        match self {
            InputEvent::PointerDown { modifiers, .. }
            | InputEvent::PointerMove { modifiers, .. }
            | InputEvent::PointerUp { modifiers, .. }
            | InputEvent::Wheel { modifiers, .. }
            | InputEvent::Key { modifiers, .. } => *modifiers,
            InputEvent::ModifiersChanged(m) => *m,
        }
    }

    pub fn position(&self) -> Option<Point> {
        match self {
            InputEvent::PointerDown { position, .. }
            | InputEvent::PointerMove { position, .. }
            | InputEvent::PointerUp { position, .. }
            | InputEvent::Wheel { position, .. } => Some(*position),
            InputEvent::Key { .. } | InputEvent::ModifiersChanged(_) => None,
        }
    }
}
