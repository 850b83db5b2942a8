//! Uniform contract between a mini-game and its host

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::clock::{FrameClock, FrameSteps};
use crate::consts::SIM_DT;

/// Held-button record sampled by `tick`
///
/// Press/release events overwrite flags; the simulation only ever sees the
/// latest state.
pub trait HeldInputs: Default {
    /// Set a named control; returns false if the game has no such control
    fn set_held(&mut self, control: &str, held: bool) -> bool;
}

/// Input record for games driven only by discrete actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoInput;

impl HeldInputs for NoInput {
    fn set_held(&mut self, _control: &str, _held: bool) -> bool {
        false
    }
}

/// A self-contained real-time mini-game
pub trait MiniGame {
    type Input: HeldInputs;
    type Action: DeserializeOwned;
    type Snapshot: Serialize;

    /// Reset everything and enter the first active state
    fn start(&mut self);

    /// Return to ready, cancelling every pending timer
    fn reset(&mut self);

    /// Advance one fixed step of `dt` seconds
    ///
    /// The input record is mutable so games can stamp sampling bookkeeping
    /// (shot cooldowns) on it.
    fn tick(&mut self, input: &mut Self::Input, dt: f32);

    /// One pulse of the 1 Hz countdown clock
    fn second_elapsed(&mut self) {}

    /// Apply a discrete player action; invalid actions are ignored
    fn handle_action(&mut self, action: Self::Action);

    /// Read-only view for the presentation layer
    fn snapshot(&self) -> Self::Snapshot;

    /// True while the game is in a non-terminal, non-ready state
    fn is_active(&self) -> bool;
}

/// A game driven by a frame clock and a held-input record
pub struct Session<G: MiniGame> {
    game: G,
    clock: FrameClock,
    input: G::Input,
}

impl<G: MiniGame> Session<G> {
    pub fn new(game: G) -> Self {
        Self {
            game,
            clock: FrameClock::new(),
            input: G::Input::default(),
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn input(&self) -> &G::Input {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut G::Input {
        &mut self.input
    }

    pub fn set_control(&mut self, control: &str, held: bool) -> bool {
        self.input.set_held(control, held)
    }

    pub fn start(&mut self) {
        self.clock.reset();
        self.input = G::Input::default();
        self.game.start();
    }

    pub fn reset(&mut self) {
        self.clock.reset();
        self.input = G::Input::default();
        self.game.reset();
    }

    pub fn handle_action(&mut self, action: G::Action) {
        self.game.handle_action(action);
    }

    /// Feed one host frame of `real_dt` seconds
    pub fn advance(&mut self, real_dt: f32) -> FrameSteps {
        let steps = self.clock.advance(real_dt);
        for _ in 0..steps.ticks {
            self.game.tick(&mut self.input, SIM_DT);
        }
        for _ in 0..steps.seconds {
            self.game.second_elapsed();
        }
        steps
    }

    pub fn snapshot(&self) -> G::Snapshot {
        self.game.snapshot()
    }
}
