//! Fixed-timestep clock built on an accumulator.
//!
//! The browser calls the draw closure at a variable frame rate (~60fps).
//! `GameTime` folds those deltas into whole ticks at a fixed rate so the
//! game logic stays deterministic and testable without a real clock.

/// Tick rate of the whole game. All periodic schedules are expressed in
/// multiples of this.
pub const TICKS_PER_SECOND: u32 = 10;

pub struct GameTime {
    ms_per_tick: f64,
    /// Milliseconds received but not yet consumed as whole ticks.
    accumulator: f64,
    pub total_ticks: u64,
    /// `None` until the first frame arrives.
    last_timestamp: Option<f64>,
}

impl GameTime {
    pub fn new(ticks_per_sec: u32) -> Self {
        Self {
            ms_per_tick: 1000.0 / ticks_per_sec as f64,
            accumulator: 0.0,
            total_ticks: 0,
            last_timestamp: None,
        }
    }

    /// Feed a wall-clock timestamp once per frame; returns how many whole
    /// ticks to run. Deltas are clamped to 500ms so a backgrounded tab does
    /// not replay a burst when it wakes (offline reconciliation handles long
    /// absences instead).
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            Some(prev) => (now_ms - prev).clamp(0.0, 500.0),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks as u64;
        ticks
    }
}
