use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tickline_core::geometry::Size;
use tickline_core::host::{Clock, RenderSurface};
use tickline_core::selection::{SelectionItem, SelectionPolicy, Verdict};
use tickline_core::timeline::Timeline;

/// Route `log` output through env_logger for a test run. Safe to call from
/// every test; only the first call installs the logger.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// A render surface that counts repaint requests.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub size: Size,
    pub invalidations: usize,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            invalidations: 0,
        }
    }

    /// Invalidations since the last call.
    pub fn take_invalidations(&mut self) -> usize {
        std::mem::take(&mut self.invalidations)
    }
}

impl RenderSurface for RecordingSurface {
    fn invalidate(&mut self) {
        self.invalidations += 1;
    }

    fn viewport_size(&self) -> Size {
        self.size
    }
}

/// A selection policy with per-item verdicts. Unlisted items are allowed.
/// Every consultation is logged; clones share the log.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPolicy {
    verdicts: HashMap<(SelectionItem, bool), Verdict>,
    consulted: Rc<Cell<usize>>,
}

impl ScriptedPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `verdict` whenever `item` is about to become `selected`.
    pub fn on(mut self, item: SelectionItem, selected: bool, verdict: Verdict) -> Self {
        self.verdicts.insert((item, selected), verdict);
        self
    }

    pub fn veto_select(self, item: SelectionItem) -> Self {
        self.on(item, true, Verdict::Veto)
    }

    pub fn veto_all_on_select(self, item: SelectionItem) -> Self {
        self.on(item, true, Verdict::VetoAll)
    }

    pub fn veto_deselect(self, item: SelectionItem) -> Self {
        self.on(item, false, Verdict::Veto)
    }

    /// How many times the policy has been asked.
    pub fn consulted(&self) -> usize {
        self.consulted.get()
    }
}

impl SelectionPolicy for ScriptedPolicy {
    fn check(&mut self, _: &Timeline, item: SelectionItem, selected: bool) -> Verdict {
        self.consulted.set(self.consulted.get() + 1);
        self.verdicts
            .get(&(item, selected))
            .copied()
            .unwrap_or(Verdict::Allow)
    }
}
