//! Frame clock
//!
//! Turns variable host frame times into whole fixed simulation steps plus
//! whole-second pulses for the countdown clock.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

/// Rounding slack when comparing accumulated time against a whole step
const STEP_EPSILON: f32 = 1.0e-6;

/// Work produced by one host frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameSteps {
    /// Fixed `SIM_DT` steps to run
    pub ticks: u32,
    /// Whole seconds that elapsed for the 1 Hz clock
    pub seconds: u32,
}

/// Fixed-step accumulator with an independent 1 Hz pulse
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
    second_accumulator: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one host frame of `real_dt` seconds
    pub fn advance(&mut self, real_dt: f32) -> FrameSteps {
        // Long stalls (hidden tab, debugger) are clamped rather than replayed
        let dt = real_dt.clamp(0.0, MAX_FRAME_DT);
        self.accumulator += dt;
        self.second_accumulator += dt;

        let mut ticks = 0;
        while self.accumulator + STEP_EPSILON >= SIM_DT && ticks < MAX_SUBSTEPS {
            self.accumulator = (self.accumulator - SIM_DT).max(0.0);
            ticks += 1;
        }
        if ticks == MAX_SUBSTEPS && self.accumulator + STEP_EPSILON >= SIM_DT {
            log::debug!("Frame clock dropping {:.3}s of backlog", self.accumulator);
            self.accumulator = 0.0;
        }

        let mut seconds = 0;
        while self.second_accumulator + STEP_EPSILON >= 1.0 {
            self.second_accumulator = (self.second_accumulator - 1.0).max(0.0);
            seconds += 1;
        }

        FrameSteps { ticks, seconds }
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.second_accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_steps_only() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(SIM_DT * 0.5).ticks, 0);
        assert_eq!(clock.advance(SIM_DT * 0.6).ticks, 1);
        assert_eq!(clock.advance(SIM_DT * 2.0).ticks, 2);
    }

    #[test]
    fn test_longest_frame_runs_every_step() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(MAX_FRAME_DT).ticks, 6);
        // Stalls are clamped to the longest frame
        assert_eq!(clock.advance(10.0).ticks, 6);
    }

    #[test]
    fn test_slow_frames_keep_sim_time() {
        let mut clock = FrameClock::new();
        let mut total = FrameSteps::default();
        for _ in 0..30 {
            let steps = clock.advance(0.1);
            total.ticks += steps.ticks;
            total.seconds += steps.seconds;
        }
        assert_eq!(total.ticks, 180);
        assert_eq!(total.seconds, 3);
    }

    #[test]
    fn test_substeps_are_capped() {
        let mut clock = FrameClock::new();
        clock.accumulator = SIM_DT * 20.0;
        assert_eq!(clock.advance(0.0).ticks, MAX_SUBSTEPS);
        // Backlog beyond the cap is discarded
        assert_eq!(clock.advance(0.0).ticks, 0);
    }

    #[test]
    fn test_second_pulses_are_independent() {
        let mut clock = FrameClock::new();
        let mut seconds = 0;
        for _ in 0..48 {
            seconds += clock.advance(0.0625).seconds;
        }
        assert_eq!(seconds, 3);
    }
}
