//! Takedown: top-down vehicle combat
//!
//! Steer a car up a city street, shoot or ram the enemy cars pouring down
//! from above, and survive the countdown.

pub mod state;
pub mod tick;

pub use state::{
    Enemy, Explosion, Player, Projectile, TakedownInput, TakedownPhase, TakedownState,
};
pub use tick::{resolve_collisions, spawn_enemy, tick};

use serde::Deserialize;

use crate::sim::{MiniGame, RandomSource, SeededRng};
use crate::tuning::TakedownTuning;

/// Takedown has no discrete actions; everything is held input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TakedownAction {}

/// A takedown run with its random source
#[derive(Debug, Clone)]
pub struct Takedown<R = SeededRng> {
    state: TakedownState,
    tuning: TakedownTuning,
    rng: R,
}

impl Takedown {
    pub fn new(seed: u64) -> Self {
        Self::with_rng(TakedownTuning::default(), SeededRng::new(seed))
    }
}

impl<R: RandomSource> Takedown<R> {
    pub fn with_rng(tuning: TakedownTuning, rng: R) -> Self {
        Self {
            state: TakedownState::new(&tuning),
            tuning,
            rng,
        }
    }

    pub fn state(&self) -> &TakedownState {
        &self.state
    }

    /// Direct state access for scripted scenarios
    pub fn state_mut(&mut self) -> &mut TakedownState {
        &mut self.state
    }
}

impl<R: RandomSource> MiniGame for Takedown<R> {
    type Input = TakedownInput;
    type Action = TakedownAction;
    type Snapshot = TakedownState;

    fn start(&mut self) {
        self.state = TakedownState::new(&self.tuning);
        self.state.phase = TakedownPhase::Playing;
        log::info!("Takedown started ({}s on the clock)", self.state.time_left);
    }

    fn reset(&mut self) {
        self.state = TakedownState::new(&self.tuning);
    }

    fn tick(&mut self, input: &mut TakedownInput, dt: f32) {
        tick::tick(&mut self.state, &mut self.rng, &self.tuning, input, dt);
    }

    fn second_elapsed(&mut self) {
        if self.state.phase != TakedownPhase::Playing {
            return;
        }
        self.state.time_left = self.state.time_left.saturating_sub(1);
        if self.state.time_left == 0 {
            self.state.phase = TakedownPhase::Finished;
            log::info!("Takedown time up with score {}", self.state.score);
        }
    }

    fn handle_action(&mut self, action: TakedownAction) {
        match action {}
    }

    fn snapshot(&self) -> TakedownState {
        self.state.clone()
    }

    fn is_active(&self) -> bool {
        self.state.phase == TakedownPhase::Playing
    }
}
