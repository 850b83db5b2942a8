//! Data-driven game balance
//!
//! Every number a designer might want to nudge lives here with the shipped
//! value as its default. A host can pass a partial JSON document; missing
//! fields keep their defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::games::pit_stop::ItemSymbol;

/// Errors raised while loading a tuning document
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> TuningError {
    TuningError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Balance for every game
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub takedown: TakedownTuning,
    pub pit_stop: PitStopTuning,
    pub breaker: BreakerTuning,
    pub catcher: CatcherTuning,
    pub feast: FeastTuning,
}

impl Tuning {
    /// Parse a (possibly partial) JSON document and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning overrides");
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulations cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let t = &self.takedown;
        if t.enemy_speed_min > t.enemy_speed_max {
            return Err(invalid("takedown.enemy_speed_min", "exceeds enemy_speed_max"));
        }
        if !(0.0..=1.0).contains(&t.enemy_spawn_chance) {
            return Err(invalid("takedown.enemy_spawn_chance", "must be within [0, 1]"));
        }
        if t.player_health <= 0 {
            return Err(invalid("takedown.player_health", "must be positive"));
        }

        let p = &self.pit_stop;
        if p.wheels == 0 {
            return Err(invalid("pit_stop.wheels", "need at least one wheel"));
        }
        if p.nuts_per_wheel == 0 {
            return Err(invalid("pit_stop.nuts_per_wheel", "need at least one nut"));
        }
        if !(0.0 <= p.fuel_min && p.fuel_min <= p.fuel_max && p.fuel_max <= 100.0) {
            return Err(invalid("pit_stop.fuel_min", "fuel band must be ordered within [0, 100]"));
        }
        if p.fuel_rate <= 0.0 {
            return Err(invalid("pit_stop.fuel_rate", "must be positive"));
        }
        if p.item_choices == 0 || p.item_choices > ItemSymbol::ALL.len() {
            return Err(invalid(
                "pit_stop.item_choices",
                format!("must be within 1..={}", ItemSymbol::ALL.len()),
            ));
        }

        let b = &self.breaker;
        if b.levels.is_empty() {
            return Err(invalid("breaker.levels", "need at least one level"));
        }
        if let Some(level) = b
            .levels
            .iter()
            .find(|l| l.sequence_length == 0 || l.sequence_length > b.switches)
        {
            return Err(invalid(
                "breaker.levels",
                format!(
                    "sequence length {} must be within 1..={}",
                    level.sequence_length, b.switches
                ),
            ));
        }
        if b.danger_pulse_ms <= 0.0 || b.reveal_interval_ms <= 0.0 {
            return Err(invalid("breaker.danger_pulse_ms", "intervals must be positive"));
        }

        let c = &self.catcher;
        if c.min_interval_ms <= 0.0 {
            return Err(invalid("catcher.min_interval_ms", "must be positive"));
        }

        let f = &self.feast;
        if f.spawn_interval_ms <= 0.0 {
            return Err(invalid("feast.spawn_interval_ms", "must be positive"));
        }

        Ok(())
    }
}

/// Vehicle combat balance (speeds in px/s on a 400x600 field)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TakedownTuning {
    pub duration_s: u32,
    pub player_health: i32,
    pub player_speed: f32,
    /// Radians per second
    pub turn_rate: f32,
    pub fire_cooldown_ms: f64,
    pub projectile_speed: f32,
    pub projectile_damage: i32,
    pub enemy_health: i32,
    /// Chance per 60 Hz step
    pub enemy_spawn_chance: f32,
    pub enemy_speed_min: f32,
    pub enemy_speed_max: f32,
    pub ram_damage: i32,
    pub kill_points: u32,
    pub explosion_ms: f64,
}

impl Default for TakedownTuning {
    fn default() -> Self {
        Self {
            duration_s: 90,
            player_health: 100,
            player_speed: 150.0,
            turn_rate: 3.0,
            fire_cooldown_ms: 200.0,
            projectile_speed: 600.0,
            projectile_damage: 15,
            enemy_health: 30,
            enemy_spawn_chance: 0.02,
            enemy_speed_min: 60.0,
            enemy_speed_max: 120.0,
            ram_damage: 10,
            kill_points: 100,
            explosion_ms: 600.0,
        }
    }
}

/// Pit stop balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitStopTuning {
    pub wheels: usize,
    pub nuts_per_wheel: usize,
    /// Fill percent per second while the pump is held
    pub fuel_rate: f32,
    pub fuel_min: f32,
    pub fuel_max: f32,
    pub penalty_ms: f64,
    pub penalty_pause_ms: f64,
    pub wheel_swap_ms: f64,
    pub wheel_transition_ms: f64,
    pub item_choices: usize,
}

impl Default for PitStopTuning {
    fn default() -> Self {
        Self {
            wheels: 4,
            nuts_per_wheel: 5,
            fuel_rate: 24.0,
            fuel_min: 65.0,
            fuel_max: 75.0,
            penalty_ms: 3000.0,
            penalty_pause_ms: 2000.0,
            wheel_swap_ms: 800.0,
            wheel_transition_ms: 1000.0,
            item_choices: 3,
        }
    }
}

/// One breaker-panel level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub sequence_length: usize,
    pub memorize_ms: f64,
    /// Danger added per meter pulse
    pub proximity_speed: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            sequence_length: 3,
            memorize_ms: 3000.0,
            proximity_speed: 0.8,
        }
    }
}

/// Sequence-memory balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerTuning {
    pub switches: usize,
    pub levels: Vec<LevelConfig>,
    pub reveal_interval_ms: f64,
    /// Extra hold after the memorize time before input opens
    pub reveal_hold_ms: f64,
    pub danger_pulse_ms: f64,
    pub mistake_penalty: f32,
    pub level_pause_ms: f64,
    pub error_flash_ms: f64,
}

impl Default for BreakerTuning {
    fn default() -> Self {
        Self {
            switches: 8,
            levels: vec![
                LevelConfig::default(),
                LevelConfig {
                    sequence_length: 4,
                    memorize_ms: 3500.0,
                    proximity_speed: 1.0,
                },
                LevelConfig {
                    sequence_length: 5,
                    memorize_ms: 4000.0,
                    proximity_speed: 1.3,
                },
            ],
            reveal_interval_ms: 1000.0,
            reveal_hold_ms: 1000.0,
            danger_pulse_ms: 100.0,
            mistake_penalty: 15.0,
            level_pause_ms: 2500.0,
            error_flash_ms: 500.0,
        }
    }
}

/// Falling-object catch balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatcherTuning {
    pub duration_s: u32,
    pub base_interval_ms: f64,
    /// Interval shrink per elapsed second
    pub interval_step_ms: f64,
    pub min_interval_ms: f64,
    pub star_points: u32,
    pub comet_points: u32,
    pub hazard_penalty: u32,
    pub missed_penalty: u32,
    pub empty_catch_penalty: u32,
    pub feedback_ms: f64,
    pub flash_ms: f64,
}

impl Default for CatcherTuning {
    fn default() -> Self {
        Self {
            duration_s: 60,
            base_interval_ms: 800.0,
            interval_step_ms: 8.0,
            min_interval_ms: 200.0,
            star_points: 10,
            comet_points: 50,
            hazard_penalty: 25,
            missed_penalty: 5,
            empty_catch_penalty: 2,
            feedback_ms: 1000.0,
            flash_ms: 150.0,
        }
    }
}

/// Tongue-grab balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeastTuning {
    pub duration_s: u32,
    pub spawn_interval_ms: f64,
    pub lifespan_ms: f64,
    pub power_ms: f64,
    pub time_bonus_s: u32,
    /// Multiplier gained per consecutive fruit
    pub combo_step: f32,
    pub powered_hazard_points: u32,
    pub tongue_ms: f64,
}

impl Default for FeastTuning {
    fn default() -> Self {
        Self {
            duration_s: 60,
            spawn_interval_ms: 800.0,
            lifespan_ms: 2500.0,
            power_ms: 5000.0,
            time_bonus_s: 5,
            combo_step: 0.1,
            powered_hazard_points: 30,
            tongue_ms: 200.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "pit_stop": { "penalty_ms": 5000 } }"#).unwrap();
        assert_eq!(tuning.pit_stop.penalty_ms, 5000.0);
        assert_eq!(tuning.pit_stop.fuel_min, 65.0);
        assert_eq!(tuning.breaker.levels.len(), 3);
    }

    #[test]
    fn test_rejects_inverted_fuel_band() {
        let err = Tuning::from_json(r#"{ "pit_stop": { "fuel_min": 80, "fuel_max": 70 } }"#)
            .unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "pit_stop.fuel_min", .. }));
    }

    #[test]
    fn test_rejects_sequence_longer_than_panel() {
        let json = r#"{ "breaker": { "switches": 4, "levels": [
            { "sequence_length": 5, "memorize_ms": 1000, "proximity_speed": 1.0 }
        ] } }"#;
        assert!(matches!(
            Tuning::from_json(json),
            Err(TuningError::Invalid { field: "breaker.levels", .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(Tuning::from_json("{ nope"), Err(TuningError::Json(_))));
    }

    #[test]
    fn test_round_trips_through_json() {
        let json = Tuning::default().to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), Tuning::default());
    }
}
