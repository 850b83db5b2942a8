//! The five mini-games
//!
//! Each game owns its state, its timers and its random source, and is driven
//! through [`crate::sim::MiniGame`].

pub mod breaker_panel;
pub mod fruit_feast;
pub mod pit_stop;
pub mod star_catcher;
pub mod takedown;

pub use breaker_panel::BreakerPanel;
pub use fruit_feast::FruitFeast;
pub use pit_stop::PitStop;
pub use star_catcher::StarCatcher;
pub use takedown::Takedown;
