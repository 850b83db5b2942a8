//! Deterministic simulation machinery shared by every mini-game
//!
//! This module must stay pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Timers are owned deadlines, never host callbacks
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod game;
pub mod rng;
pub mod timers;

pub use clock::{FrameClock, FrameSteps};
pub use collision::{Playfield, boxes_overlap, within_half_extent};
pub use game::{HeldInputs, MiniGame, NoInput, Session};
pub use rng::{
    RandomSource, ScriptedRng, SeededRng, sample_without_replacement, shuffle, weighted_pick,
    weighted_pick_below,
};
pub use timers::TimerSet;
