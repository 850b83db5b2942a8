//! Breaker panel: restore power before the raptor arrives
//!
//! Each level flashes a sequence of distinct breakers, then the player must
//! flip them back in order while a danger meter creeps up. A wrong breaker
//! bumps the meter and wipes the player's progress (the sequence itself stays
//! the same). The meter reaching 100 loses the game.

use serde::{Deserialize, Serialize};

use crate::sim::{MiniGame, NoInput, RandomSource, SeededRng, TimerSet, sample_without_replacement};
use crate::step_millis;
use crate::tuning::{BreakerTuning, LevelConfig};

/// Meter value that ends the run
pub const DANGER_MAX: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerPhase {
    Ready,
    /// Sequence is being revealed; input is locked
    Memorize,
    Playing,
    /// Pause between a cleared level and the next reveal
    LevelTransition,
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BreakerAction {
    FlipSwitch { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerTimer {
    RevealNext,
    EndMemorize,
    DangerPulse,
    NextLevel,
    ClearError,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreakerSnapshot {
    pub phase: BreakerPhase,
    /// 0-based level index
    pub level: usize,
    pub level_count: usize,
    pub switches: usize,
    /// Breaker currently flashing during memorize
    pub highlighted: Option<usize>,
    /// Breakers already shown this level, in order
    pub revealed: Vec<usize>,
    /// Correct prefix entered so far
    pub accepted: Vec<usize>,
    pub danger: f32,
    /// Breaker flashing red after a mistake
    pub error_switch: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct BreakerPanel<R = SeededRng> {
    phase: BreakerPhase,
    level: usize,
    sequence: Vec<usize>,
    accepted: Vec<usize>,
    reveal_cursor: Option<usize>,
    danger: f32,
    error_switch: Option<usize>,
    now_ms: f64,
    timers: TimerSet<BreakerTimer>,
    tuning: BreakerTuning,
    rng: R,
}

impl BreakerPanel {
    pub fn new(seed: u64) -> Self {
        Self::with_rng(BreakerTuning::default(), SeededRng::new(seed))
    }
}

impl<R: RandomSource> BreakerPanel<R> {
    pub fn with_rng(tuning: BreakerTuning, rng: R) -> Self {
        Self {
            phase: BreakerPhase::Ready,
            level: 0,
            sequence: Vec::new(),
            accepted: Vec::new(),
            reveal_cursor: None,
            danger: 0.0,
            error_switch: None,
            now_ms: 0.0,
            timers: TimerSet::new(),
            tuning,
            rng,
        }
    }

    pub fn phase(&self) -> BreakerPhase {
        self.phase
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn sequence(&self) -> &[usize] {
        &self.sequence
    }

    pub fn accepted(&self) -> &[usize] {
        &self.accepted
    }

    pub fn danger(&self) -> f32 {
        self.danger
    }

    /// Config for the current level; an empty table plays the default level
    fn level_config(&self) -> LevelConfig {
        let levels = &self.tuning.levels;
        levels
            .get(self.level)
            .or(levels.last())
            .copied()
            .unwrap_or_default()
    }

    fn start_level(&mut self) {
        let config = self.level_config();
        self.phase = BreakerPhase::Memorize;
        self.accepted.clear();
        self.error_switch = None;
        self.sequence =
            sample_without_replacement(&mut self.rng, self.tuning.switches, config.sequence_length);
        self.reveal_cursor = Some(0);
        self.timers
            .schedule(BreakerTimer::RevealNext, self.now_ms, self.tuning.reveal_interval_ms);
        self.timers.schedule(
            BreakerTimer::EndMemorize,
            self.now_ms,
            config.memorize_ms + self.tuning.reveal_hold_ms,
        );
        log::info!(
            "Breaker level {} memorize: {} switches",
            self.level + 1,
            self.sequence.len()
        );
    }

    fn raise_danger(&mut self, amount: f32) {
        self.danger = (self.danger + amount).min(DANGER_MAX);
        if self.phase == BreakerPhase::Playing && self.danger >= DANGER_MAX {
            self.phase = BreakerPhase::Lost;
            self.timers.cancel_all();
            log::info!("Breaker panel lost on level {}", self.level + 1);
        }
    }

    fn on_timer(&mut self, timer: BreakerTimer) {
        match timer {
            BreakerTimer::RevealNext => {
                if self.phase != BreakerPhase::Memorize {
                    return;
                }
                let next = self.reveal_cursor.map_or(0, |c| c + 1);
                self.reveal_cursor = Some(next);
                if next < self.sequence.len() {
                    self.timers.schedule(
                        BreakerTimer::RevealNext,
                        self.now_ms,
                        self.tuning.reveal_interval_ms,
                    );
                }
            }
            BreakerTimer::EndMemorize => {
                if self.phase != BreakerPhase::Memorize {
                    return;
                }
                self.timers.cancel(&BreakerTimer::RevealNext);
                self.reveal_cursor = None;
                self.phase = BreakerPhase::Playing;
                self.timers
                    .schedule(BreakerTimer::DangerPulse, self.now_ms, self.tuning.danger_pulse_ms);
            }
            BreakerTimer::DangerPulse => {
                if self.phase != BreakerPhase::Playing {
                    return;
                }
                self.raise_danger(self.level_config().proximity_speed);
                if self.phase == BreakerPhase::Playing {
                    self.timers.schedule(
                        BreakerTimer::DangerPulse,
                        self.now_ms,
                        self.tuning.danger_pulse_ms,
                    );
                }
            }
            BreakerTimer::NextLevel => {
                if self.phase == BreakerPhase::LevelTransition {
                    self.level += 1;
                    self.start_level();
                }
            }
            BreakerTimer::ClearError => self.error_switch = None,
        }
    }

    fn flip(&mut self, index: usize) {
        if self.phase != BreakerPhase::Playing || index >= self.tuning.switches {
            return;
        }
        // Already-flipped breakers are latched
        if self.accepted.contains(&index) {
            return;
        }
        let Some(&expected) = self.sequence.get(self.accepted.len()) else {
            return;
        };

        if index != expected {
            self.accepted.clear();
            self.error_switch = Some(index);
            self.timers
                .schedule_replacing(BreakerTimer::ClearError, self.now_ms, self.tuning.error_flash_ms);
            log::debug!("Wrong breaker {} (expected {})", index, expected);
            self.raise_danger(self.tuning.mistake_penalty);
            return;
        }

        self.accepted.push(index);
        if self.accepted.len() < self.sequence.len() {
            return;
        }

        self.timers.cancel_all();
        self.error_switch = None;
        if self.level + 1 < self.tuning.levels.len() {
            self.phase = BreakerPhase::LevelTransition;
            self.timers
                .schedule(BreakerTimer::NextLevel, self.now_ms, self.tuning.level_pause_ms);
            log::info!("Breaker level {} cleared", self.level + 1);
        } else {
            self.phase = BreakerPhase::Won;
            log::info!("Breaker panel restored with danger {:.0}", self.danger);
        }
    }
}

impl<R: RandomSource> MiniGame for BreakerPanel<R> {
    type Input = NoInput;
    type Action = BreakerAction;
    type Snapshot = BreakerSnapshot;

    fn start(&mut self) {
        self.timers.cancel_all();
        self.level = 0;
        self.danger = 0.0;
        self.now_ms = 0.0;
        self.start_level();
    }

    fn reset(&mut self) {
        self.timers.cancel_all();
        self.phase = BreakerPhase::Ready;
        self.level = 0;
        self.danger = 0.0;
        self.now_ms = 0.0;
        self.sequence.clear();
        self.accepted.clear();
        self.reveal_cursor = None;
        self.error_switch = None;
    }

    fn tick(&mut self, _input: &mut NoInput, dt: f32) {
        if !self.is_active() {
            return;
        }
        self.now_ms += step_millis(dt);
        for timer in self.timers.drain_due(self.now_ms) {
            self.on_timer(timer);
        }
    }

    fn handle_action(&mut self, action: BreakerAction) {
        match action {
            BreakerAction::FlipSwitch { index } => self.flip(index),
        }
    }

    fn snapshot(&self) -> BreakerSnapshot {
        let cursor = self.reveal_cursor.unwrap_or(0).min(self.sequence.len());
        let memorizing = self.phase == BreakerPhase::Memorize;
        BreakerSnapshot {
            phase: self.phase,
            level: self.level,
            level_count: self.tuning.levels.len(),
            switches: self.tuning.switches,
            highlighted: if memorizing {
                self.reveal_cursor.and_then(|c| self.sequence.get(c).copied())
            } else {
                None
            },
            revealed: if memorizing {
                self.sequence[..cursor].to_vec()
            } else {
                Vec::new()
            },
            accepted: self.accepted.clone(),
            danger: self.danger,
            error_switch: self.error_switch,
        }
    }

    fn is_active(&self) -> bool {
        matches!(
            self.phase,
            BreakerPhase::Memorize | BreakerPhase::Playing | BreakerPhase::LevelTransition
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::ScriptedRng;

    fn run_for<R: RandomSource>(game: &mut BreakerPanel<R>, ms: f64) {
        let steps = (ms / step_millis(SIM_DT)).ceil() as usize;
        for _ in 0..steps {
            game.tick(&mut NoInput, SIM_DT);
        }
    }

    /// Level 0 draws [2, 5, 1] from the eight breakers
    fn scripted() -> BreakerPanel<ScriptedRng> {
        BreakerPanel::with_rng(
            BreakerTuning::default(),
            ScriptedRng::new(vec![0.25, 0.58, 0.2]),
        )
    }

    fn flip(game: &mut BreakerPanel<impl RandomSource>, index: usize) {
        game.handle_action(BreakerAction::FlipSwitch { index });
    }

    #[test]
    fn test_sequence_is_distinct_and_sized() {
        let mut game = BreakerPanel::new(77);
        game.start();
        let seq = game.sequence().to_vec();
        assert_eq!(seq.len(), 3);
        let mut unique = seq.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 3);
        assert!(seq.iter().all(|&s| s < 8));
    }

    #[test]
    fn test_reveal_steps_then_opens_input() {
        let mut game = scripted();
        game.start();
        assert_eq!(game.sequence(), &[2, 5, 1]);
        assert_eq!(game.snapshot().highlighted, Some(2));

        // Input is locked while memorizing
        flip(&mut game, 2);
        assert!(game.accepted().is_empty());

        run_for(&mut game, 1000.0);
        assert_eq!(game.snapshot().highlighted, Some(5));
        assert_eq!(game.snapshot().revealed, vec![2]);

        run_for(&mut game, 2000.0);
        assert_eq!(game.snapshot().highlighted, None);
        assert_eq!(game.snapshot().revealed, vec![2, 5, 1]);
        assert_eq!(game.phase(), BreakerPhase::Memorize);

        run_for(&mut game, 1000.0);
        assert_eq!(game.phase(), BreakerPhase::Playing);
        assert_eq!(game.danger(), 0.0);
    }

    #[test]
    fn test_correct_sequence_advances_level() {
        let mut game = scripted();
        game.start();
        run_for(&mut game, 4000.0);

        for index in [2, 5, 1] {
            flip(&mut game, index);
        }
        assert_eq!(game.phase(), BreakerPhase::LevelTransition);
        let frozen = game.danger();
        run_for(&mut game, 1000.0);
        assert_eq!(game.danger(), frozen);

        run_for(&mut game, 1500.0);
        assert_eq!(game.phase(), BreakerPhase::Memorize);
        assert_eq!(game.level(), 1);
        assert_eq!(game.sequence().len(), 4);
        assert!(game.accepted().is_empty());
    }

    #[test]
    fn test_wrong_input_resets_prefix_only() {
        let mut game = scripted();
        game.start();
        run_for(&mut game, 4000.0);
        let before = game.danger();

        flip(&mut game, 2);
        assert_eq!(game.accepted(), &[2]);
        flip(&mut game, 6);

        assert!(game.accepted().is_empty());
        assert_eq!(game.sequence(), &[2, 5, 1]);
        assert!((game.danger() - (before + 15.0)).abs() < 1e-4);
        assert_eq!(game.snapshot().error_switch, Some(6));

        run_for(&mut game, 500.0);
        assert_eq!(game.snapshot().error_switch, None);
    }

    #[test]
    fn test_danger_rises_while_playing() {
        let mut game = scripted();
        game.start();
        run_for(&mut game, 4000.0);
        run_for(&mut game, 1000.0);
        // Ten pulses at 0.8, give or take one for step alignment
        assert!(game.danger() >= 7.2 && game.danger() <= 8.8, "{}", game.danger());
    }

    #[test]
    fn test_meter_full_loses_and_stops_timers() {
        let mut game = scripted();
        game.start();
        run_for(&mut game, 4000.0);

        for _ in 0..7 {
            flip(&mut game, 7);
        }
        assert_eq!(game.phase(), BreakerPhase::Lost);
        assert_eq!(game.danger(), DANGER_MAX);
        assert!(game.timers.is_empty());

        // Nothing moves after the loss
        run_for(&mut game, 1000.0);
        flip(&mut game, 2);
        assert!(game.accepted().is_empty());
        assert_eq!(game.phase(), BreakerPhase::Lost);
    }

    #[test]
    fn test_final_level_wins() {
        let tuning = BreakerTuning {
            levels: vec![LevelConfig {
                sequence_length: 3,
                memorize_ms: 3000.0,
                proximity_speed: 0.8,
            }],
            ..Default::default()
        };
        let mut game = BreakerPanel::with_rng(tuning, ScriptedRng::new(vec![0.25, 0.58, 0.2]));
        game.start();
        run_for(&mut game, 4000.0);
        for index in [2, 5, 1] {
            flip(&mut game, index);
        }
        assert_eq!(game.phase(), BreakerPhase::Won);
        assert!(game.timers.is_empty());
    }

    #[test]
    fn test_empty_level_table_plays_default_level() {
        let tuning = BreakerTuning {
            levels: Vec::new(),
            ..Default::default()
        };
        let mut game = BreakerPanel::with_rng(tuning, ScriptedRng::new(vec![0.25, 0.58, 0.2]));
        game.start();
        assert_eq!(game.sequence(), &[2, 5, 1]);
        run_for(&mut game, 4000.0);
        assert_eq!(game.phase(), BreakerPhase::Playing);
        run_for(&mut game, 500.0);
        assert!(game.danger() > 0.0);
        for index in [2, 5, 1] {
            flip(&mut game, index);
        }
        assert_eq!(game.phase(), BreakerPhase::Won);
        assert_eq!(game.snapshot().level_count, 0);
    }

    #[test]
    fn test_reset_clears_meter_and_progress() {
        let mut game = scripted();
        game.start();
        run_for(&mut game, 5000.0);
        flip(&mut game, 2);
        assert!(game.danger() > 0.0);

        game.reset();
        assert_eq!(game.phase(), BreakerPhase::Ready);
        assert_eq!(game.danger(), 0.0);
        assert!(game.accepted().is_empty());
        assert!(game.timers.is_empty());
    }

    #[test]
    fn test_latched_switch_is_ignored() {
        let mut game = scripted();
        game.start();
        run_for(&mut game, 4000.0);
        flip(&mut game, 2);
        let before = game.danger();
        flip(&mut game, 2);
        assert_eq!(game.accepted(), &[2]);
        assert_eq!(game.danger(), before);
    }
}
