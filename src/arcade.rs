//! Host-facing front door
//!
//! Holds at most one open game. Opening a game drops the previous one along
//! with every timer it had pending, so nothing stale can fire afterwards.
//! Actions and snapshots cross the boundary as JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::games::{BreakerPanel, FruitFeast, PitStop, StarCatcher, Takedown};
use crate::sim::{FrameSteps, MiniGame, SeededRng, Session};
use crate::tuning::{Tuning, TuningError};

/// Knuth multiplicative hash constant for per-opening seeds
const SEED_MIX: u64 = 2_654_435_761;

#[derive(Debug, Error)]
pub enum ArcadeError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown game `{0}`")]
    UnknownGame(String),
    #[error("no game is open")]
    NoActiveGame,
    #[error(transparent)]
    Tuning(#[from] TuningError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameKind {
    Takedown,
    PitStop,
    BreakerPanel,
    StarCatcher,
    FruitFeast,
}

impl GameKind {
    pub const ALL: [GameKind; 5] = [
        GameKind::Takedown,
        GameKind::PitStop,
        GameKind::BreakerPanel,
        GameKind::StarCatcher,
        GameKind::FruitFeast,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Takedown => "takedown",
            GameKind::PitStop => "pit-stop",
            GameKind::BreakerPanel => "breaker-panel",
            GameKind::StarCatcher => "star-catcher",
            GameKind::FruitFeast => "fruit-feast",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "takedown" => Some(GameKind::Takedown),
            "pit-stop" | "pitstop" => Some(GameKind::PitStop),
            "breaker-panel" | "breaker" => Some(GameKind::BreakerPanel),
            "star-catcher" | "catcher" => Some(GameKind::StarCatcher),
            "fruit-feast" | "feast" => Some(GameKind::FruitFeast),
            _ => None,
        }
    }
}

enum ActiveGame {
    Takedown(Session<Takedown>),
    PitStop(Session<PitStop>),
    BreakerPanel(Session<BreakerPanel>),
    StarCatcher(Session<StarCatcher>),
    FruitFeast(Session<FruitFeast>),
}

/// Run `$body` against whichever session is open
macro_rules! with_session {
    ($active:expr, $session:ident => $body:expr) => {
        match $active {
            ActiveGame::Takedown($session) => $body,
            ActiveGame::PitStop($session) => $body,
            ActiveGame::BreakerPanel($session) => $body,
            ActiveGame::StarCatcher($session) => $body,
            ActiveGame::FruitFeast($session) => $body,
        }
    };
}

impl ActiveGame {
    fn kind(&self) -> GameKind {
        match self {
            ActiveGame::Takedown(_) => GameKind::Takedown,
            ActiveGame::PitStop(_) => GameKind::PitStop,
            ActiveGame::BreakerPanel(_) => GameKind::BreakerPanel,
            ActiveGame::StarCatcher(_) => GameKind::StarCatcher,
            ActiveGame::FruitFeast(_) => GameKind::FruitFeast,
        }
    }
}

/// The arcade cabinet: one open game at a time
pub struct Arcade {
    seed: u64,
    openings: u64,
    tuning: Tuning,
    active: Option<ActiveGame>,
}

impl Arcade {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            openings: 0,
            tuning,
            active: None,
        }
    }

    /// Build from a (partial) tuning document
    pub fn from_tuning_json(seed: u64, json: &str) -> Result<Self, ArcadeError> {
        Ok(Self::with_tuning(seed, Tuning::from_json(json)?))
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Kind of the open game, if any
    pub fn kind(&self) -> Option<GameKind> {
        self.active.as_ref().map(ActiveGame::kind)
    }

    /// Open a game in its ready state, replacing any open one
    ///
    /// Returns the seed the new game was built with.
    pub fn open(&mut self, kind: GameKind) -> u64 {
        self.openings += 1;
        let seed = self.seed.wrapping_mul(SEED_MIX).wrapping_add(self.openings);
        let rng = SeededRng::new(seed);
        let t = &self.tuning;
        let game = match kind {
            GameKind::Takedown => {
                ActiveGame::Takedown(Session::new(Takedown::with_rng(t.takedown.clone(), rng)))
            }
            GameKind::PitStop => {
                ActiveGame::PitStop(Session::new(PitStop::with_rng(t.pit_stop.clone(), rng)))
            }
            GameKind::BreakerPanel => ActiveGame::BreakerPanel(Session::new(
                BreakerPanel::with_rng(t.breaker.clone(), rng),
            )),
            GameKind::StarCatcher => ActiveGame::StarCatcher(Session::new(
                StarCatcher::with_rng(t.catcher.clone(), rng),
            )),
            GameKind::FruitFeast => {
                ActiveGame::FruitFeast(Session::new(FruitFeast::with_rng(t.feast.clone(), rng)))
            }
        };
        if let Some(previous) = self.active.replace(game) {
            log::info!("Closed {}", previous.kind().as_str());
        }
        log::info!("Opened {} (seed {})", kind.as_str(), seed);
        seed
    }

    /// Open a game by name
    pub fn open_named(&mut self, name: &str) -> Result<u64, ArcadeError> {
        let kind =
            GameKind::from_str(name).ok_or_else(|| ArcadeError::UnknownGame(name.to_string()))?;
        Ok(self.open(kind))
    }

    pub fn close(&mut self) {
        if let Some(previous) = self.active.take() {
            log::info!("Closed {}", previous.kind().as_str());
        }
    }

    fn active_mut(&mut self) -> Result<&mut ActiveGame, ArcadeError> {
        self.active.as_mut().ok_or(ArcadeError::NoActiveGame)
    }

    fn active_ref(&self) -> Result<&ActiveGame, ArcadeError> {
        self.active.as_ref().ok_or(ArcadeError::NoActiveGame)
    }

    pub fn start(&mut self) -> Result<(), ArcadeError> {
        with_session!(self.active_mut()?, s => s.start());
        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), ArcadeError> {
        with_session!(self.active_mut()?, s => s.reset());
        Ok(())
    }

    /// Feed one host frame of `real_dt` seconds
    pub fn advance(&mut self, real_dt: f32) -> Result<FrameSteps, ArcadeError> {
        Ok(with_session!(self.active_mut()?, s => s.advance(real_dt)))
    }

    /// Press or release a held control; returns false for unknown controls
    pub fn set_control(&mut self, control: &str, held: bool) -> Result<bool, ArcadeError> {
        let known = with_session!(self.active_mut()?, s => s.set_control(control, held));
        if !known {
            log::warn!("Ignoring unknown control `{}`", control);
        }
        Ok(known)
    }

    /// Apply a discrete action given as tagged JSON
    pub fn handle_action_json(&mut self, json: &str) -> Result<(), ArcadeError> {
        let active = self.active_mut()?;
        with_session!(active, s => {
            let action = serde_json::from_str(json).map_err(|e| {
                log::warn!("Rejected action {}: {}", json, e);
                ArcadeError::from(e)
            })?;
            s.handle_action(action);
        });
        Ok(())
    }

    /// Current snapshot as JSON
    pub fn snapshot_json(&self) -> Result<String, ArcadeError> {
        let json = with_session!(self.active_ref()?, s => serde_json::to_string(&s.snapshot())?);
        Ok(json)
    }

    /// True while the open game is mid-run
    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| with_session!(active, s => s.game().is_active()))
    }
}
