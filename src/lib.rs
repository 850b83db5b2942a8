//! Park Arcade - themed mini-games for the browser
//!
//! Core modules:
//! - `sim`: Deterministic simulation machinery (clock, timers, RNG, collision)
//! - `games`: The five mini-game simulations
//! - `arcade`: Host-facing front door holding the active game
//! - `platform`: Browser binding
//! - `tuning`: Data-driven game balance

pub mod arcade;
pub mod games;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use arcade::{Arcade, ArcadeError, GameKind};
pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one step per display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest host frame the clock will accept (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
}

/// Unit vector for a heading angle (radians, screen space with y down)
#[inline]
pub fn heading_vector(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Convert a simulation step in seconds to milliseconds
#[inline]
pub fn step_millis(dt: f32) -> f64 {
    f64::from(dt) * 1000.0
}
