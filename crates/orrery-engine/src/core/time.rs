/// Nominal simulation rate. Speed constants are expressed per tick at this rate.
pub const TICKS_PER_SECOND: f32 = 60.0;

/// Seconds covered by one tick at the nominal rate.
pub const TICK_SECONDS: f32 = 1.0 / TICKS_PER_SECOND;

/// Catch-up cap after a stall (tab switch, debugger pause).
pub const MAX_TICKS_PER_FRAME: u32 = 10;

/// Converts wall-clock frame time into whole simulation ticks.
pub struct TickClock {
    tick_seconds: f32,
    accumulator: f32,
    elapsed_ticks: u64,
}

impl TickClock {
    pub fn new(ticks_per_second: f32) -> Self {
        Self {
            tick_seconds: 1.0 / ticks_per_second.max(1.0),
            accumulator: 0.0,
            elapsed_ticks: 0,
        }
    }

    /// Add frame time. Returns how many ticks to run this frame.
    pub fn accumulate(&mut self, frame_seconds: f32) -> u32 {
        if !frame_seconds.is_finite() || frame_seconds <= 0.0 {
            return 0;
        }
        self.accumulator += frame_seconds;
        self.accumulator = self.accumulator.min(self.tick_seconds * MAX_TICKS_PER_FRAME as f32);
        let ticks = (self.accumulator / self.tick_seconds) as u32;
        self.accumulator -= ticks as f32 * self.tick_seconds;
        self.elapsed_ticks += ticks as u64;
        ticks
    }

    /// Fraction of a tick left in the accumulator (0.0 to 1.0).
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.tick_seconds
    }

    pub fn tick_seconds(&self) -> f32 {
        self.tick_seconds
    }

    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(TICKS_PER_SECOND)
    }
}
