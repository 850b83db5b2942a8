//! Fruit feast: tongue-grab collection
//!
//! Items pop up around the field for a short while. Grabbing fruit builds a
//! combo, hazards hurt unless a star is active, clocks buy time.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::{
    MiniGame, NoInput, Playfield, RandomSource, SeededRng, TimerSet, boxes_overlap, weighted_pick,
};
use crate::step_millis;
use crate::tuning::FeastTuning;

/// Play area (px)
pub const FIELD: Playfield = Playfield::new(600.0, 400.0);
/// Footprint used for spawn overlap checks
pub const ITEM_SIZE: Vec2 = Vec2::new(48.0, 48.0);
/// Where the tongue starts
pub const MOUTH: Vec2 = Vec2::new(300.0, 360.0);
/// Spawn inset from the left/right and top edges
const SPAWN_INSET: f32 = 30.0;
/// Bottom strip kept clear for the eater
const SPAWN_FLOOR: f32 = 70.0;
/// Placement attempts before a spawn is skipped
const SPAWN_ATTEMPTS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeastPhase {
    Ready,
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeastItemKind {
    Apple,
    Banana,
    Melon,
    ShyGuy,
    PiranhaPlant,
    /// Adds seconds to the clock
    Clock,
    /// Power-up: hazards become food
    Star,
}

impl FeastItemKind {
    const WEIGHTS: [(FeastItemKind, f32); 7] = [
        (FeastItemKind::Apple, 0.4),
        (FeastItemKind::Banana, 0.3),
        (FeastItemKind::Melon, 0.1),
        (FeastItemKind::ShyGuy, 0.1),
        (FeastItemKind::PiranhaPlant, 0.05),
        (FeastItemKind::Clock, 0.025),
        (FeastItemKind::Star, 0.025),
    ];

    /// Base points for fruit
    pub fn fruit_points(self) -> Option<u32> {
        match self {
            FeastItemKind::Apple => Some(10),
            FeastItemKind::Banana => Some(15),
            FeastItemKind::Melon => Some(50),
            _ => None,
        }
    }

    /// Points lost grabbing a hazard unpowered
    pub fn hazard_penalty(self) -> Option<u32> {
        match self {
            FeastItemKind::ShyGuy => Some(25),
            FeastItemKind::PiranhaPlant => Some(50),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeastAction {
    Grab { id: u32 },
}

#[derive(Debug, Clone, Serialize)]
pub struct FeastItem {
    pub id: u32,
    pub kind: FeastItemKind,
    pub pos: Vec2,
    pub expires_at_ms: f64,
}

/// Tongue flick towards the last grabbed item
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tongue {
    pub target: Vec2,
    /// Radians from the mouth
    pub angle: f32,
    pub length: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeastSnapshot {
    pub phase: FeastPhase,
    pub score: u32,
    pub time_left: u32,
    pub combo: u32,
    pub powered: bool,
    pub items: Vec<FeastItem>,
    pub tongue: Option<Tongue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeastTimer {
    PowerOff,
    TongueIn,
}

#[derive(Debug, Clone)]
pub struct FruitFeast<R = SeededRng> {
    phase: FeastPhase,
    score: u32,
    time_left: u32,
    combo: u32,
    powered: bool,
    items: Vec<FeastItem>,
    tongue: Option<Tongue>,
    since_spawn_ms: f64,
    now_ms: f64,
    next_id: u32,
    timers: TimerSet<FeastTimer>,
    tuning: FeastTuning,
    rng: R,
}

impl FruitFeast {
    pub fn new(seed: u64) -> Self {
        Self::with_rng(FeastTuning::default(), SeededRng::new(seed))
    }
}

impl<R: RandomSource> FruitFeast<R> {
    pub fn with_rng(tuning: FeastTuning, rng: R) -> Self {
        Self {
            phase: FeastPhase::Ready,
            score: 0,
            time_left: tuning.duration_s,
            combo: 0,
            powered: false,
            items: Vec::new(),
            tongue: None,
            since_spawn_ms: 0.0,
            now_ms: 0.0,
            next_id: 1,
            timers: TimerSet::new(),
            tuning,
            rng,
        }
    }

    pub fn phase(&self) -> FeastPhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn items(&self) -> &[FeastItem] {
        &self.items
    }

    /// Place an item directly with a full lifespan
    pub fn spawn_at(&mut self, kind: FeastItemKind, pos: Vec2) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(FeastItem {
            id,
            kind,
            pos,
            expires_at_ms: self.now_ms + self.tuning.lifespan_ms,
        });
        id
    }

    /// Random spot not overlapping a live item, if one turns up
    fn free_position(&mut self) -> Option<Vec2> {
        for _ in 0..SPAWN_ATTEMPTS {
            let pos = Vec2::new(
                self.rng.range(SPAWN_INSET, FIELD.width - SPAWN_INSET),
                self.rng.range(SPAWN_INSET, FIELD.height - SPAWN_FLOOR),
            );
            let clear = self
                .items
                .iter()
                .all(|item| !boxes_overlap(pos, ITEM_SIZE, item.pos, ITEM_SIZE));
            if clear {
                return Some(pos);
            }
        }
        None
    }

    fn spawn_random(&mut self) {
        let kind = weighted_pick(&mut self.rng, &FeastItemKind::WEIGHTS);
        match self.free_position() {
            Some(pos) => {
                let id = self.spawn_at(kind, pos);
                log::debug!("Spawned {:?} #{} at {:?}", kind, id, pos);
            }
            None => log::debug!("No free spot for {:?}, skipping spawn", kind),
        }
    }

    fn clear(&mut self) {
        self.timers.cancel_all();
        self.score = 0;
        self.time_left = self.tuning.duration_s;
        self.combo = 0;
        self.powered = false;
        self.items.clear();
        self.tongue = None;
        self.since_spawn_ms = 0.0;
        self.now_ms = 0.0;
    }

    fn grab(&mut self, id: u32) {
        if self.phase != FeastPhase::Playing {
            return;
        }
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            return;
        };
        let item = self.items.remove(index);

        let reach = item.pos - MOUTH;
        self.tongue = Some(Tongue {
            target: item.pos,
            angle: reach.y.atan2(reach.x),
            length: reach.length(),
        });
        self.timers
            .schedule_replacing(FeastTimer::TongueIn, self.now_ms, self.tuning.tongue_ms);

        if let Some(points) = item.kind.fruit_points() {
            let multiplier = 1.0 + f64::from(self.tuning.combo_step) * f64::from(self.combo);
            let gained = (f64::from(points) * multiplier).floor() as u32;
            self.score = self.score.saturating_add(gained);
            self.combo += 1;
        } else if let Some(penalty) = item.kind.hazard_penalty() {
            if self.powered {
                self.score = self.score.saturating_add(self.tuning.powered_hazard_points);
            } else {
                self.score = self.score.saturating_sub(penalty);
                self.combo = 0;
            }
        } else if item.kind == FeastItemKind::Clock {
            self.time_left += self.tuning.time_bonus_s;
        } else {
            self.powered = true;
            self.timers
                .schedule_replacing(FeastTimer::PowerOff, self.now_ms, self.tuning.power_ms);
            log::debug!("Star power for {} ms", self.tuning.power_ms);
        }
    }
}

impl<R: RandomSource> MiniGame for FruitFeast<R> {
    type Input = NoInput;
    type Action = FeastAction;
    type Snapshot = FeastSnapshot;

    fn start(&mut self) {
        self.clear();
        self.phase = FeastPhase::Playing;
        log::info!("Fruit feast started");
    }

    fn reset(&mut self) {
        self.clear();
        self.phase = FeastPhase::Ready;
    }

    fn tick(&mut self, _input: &mut NoInput, dt: f32) {
        if self.phase != FeastPhase::Playing {
            return;
        }
        let step_ms = step_millis(dt);
        self.now_ms += step_ms;
        for timer in self.timers.drain_due(self.now_ms) {
            match timer {
                FeastTimer::PowerOff => self.powered = false,
                FeastTimer::TongueIn => self.tongue = None,
            }
        }

        let now = self.now_ms;
        self.items.retain(|item| item.expires_at_ms > now);

        self.since_spawn_ms += step_ms;
        if self.since_spawn_ms >= self.tuning.spawn_interval_ms {
            self.since_spawn_ms -= self.tuning.spawn_interval_ms;
            self.spawn_random();
        }
    }

    fn second_elapsed(&mut self) {
        if self.phase != FeastPhase::Playing {
            return;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.phase = FeastPhase::Finished;
            self.timers.cancel_all();
            self.items.clear();
            self.powered = false;
            self.tongue = None;
            log::info!("Fruit feast finished with score {}", self.score);
        }
    }

    fn handle_action(&mut self, action: FeastAction) {
        match action {
            FeastAction::Grab { id } => self.grab(id),
        }
    }

    fn snapshot(&self) -> FeastSnapshot {
        FeastSnapshot {
            phase: self.phase,
            score: self.score,
            time_left: self.time_left,
            combo: self.combo,
            powered: self.powered,
            items: self.items.clone(),
            tongue: self.tongue,
        }
    }

    fn is_active(&self) -> bool {
        self.phase == FeastPhase::Playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::ScriptedRng;

    fn playing() -> FruitFeast<ScriptedRng> {
        let mut game = FruitFeast::with_rng(FeastTuning::default(), ScriptedRng::constant(0.5));
        game.start();
        game
    }

    fn grab_new(game: &mut FruitFeast<impl RandomSource>, kind: FeastItemKind) {
        let id = game.spawn_at(kind, Vec2::new(100.0, 100.0));
        game.handle_action(FeastAction::Grab { id });
    }

    fn run_for(game: &mut FruitFeast<impl RandomSource>, ms: f64) {
        let steps = (ms / step_millis(SIM_DT)).ceil() as usize;
        for _ in 0..steps {
            game.tick(&mut NoInput, SIM_DT);
        }
    }

    #[test]
    fn test_combo_scales_fruit() {
        let mut game = playing();
        for _ in 0..3 {
            grab_new(&mut game, FeastItemKind::Apple);
        }
        // 10 + 11 + 12
        assert_eq!(game.score(), 33);
        assert_eq!(game.combo(), 3);

        grab_new(&mut game, FeastItemKind::Banana);
        // floor(15 * 1.3)
        assert_eq!(game.score(), 52);
        assert_eq!(game.combo(), 4);
    }

    #[test]
    fn test_hazard_resets_combo_and_floors_score() {
        let mut game = playing();
        grab_new(&mut game, FeastItemKind::Apple);
        grab_new(&mut game, FeastItemKind::Apple);
        assert_eq!(game.score(), 21);

        grab_new(&mut game, FeastItemKind::ShyGuy);
        assert_eq!(game.combo(), 0);
        assert_eq!(game.score(), 0);

        grab_new(&mut game, FeastItemKind::Melon);
        assert_eq!(game.score(), 50);
        grab_new(&mut game, FeastItemKind::PiranhaPlant);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_star_power_eats_hazards_and_expires() {
        let mut game = playing();
        grab_new(&mut game, FeastItemKind::Apple);
        grab_new(&mut game, FeastItemKind::Star);
        assert!(game.is_powered());

        grab_new(&mut game, FeastItemKind::PiranhaPlant);
        assert_eq!(game.score(), 40);
        assert_eq!(game.combo(), 1);

        run_for(&mut game, 5000.0);
        assert!(!game.is_powered());
        grab_new(&mut game, FeastItemKind::ShyGuy);
        assert_eq!(game.combo(), 0);
    }

    #[test]
    fn test_second_star_refreshes_power() {
        let mut game = playing();
        grab_new(&mut game, FeastItemKind::Star);
        run_for(&mut game, 3000.0);
        grab_new(&mut game, FeastItemKind::Star);
        run_for(&mut game, 3000.0);
        assert!(game.is_powered());
        run_for(&mut game, 2100.0);
        assert!(!game.is_powered());
    }

    #[test]
    fn test_clock_adds_time() {
        let mut game = playing();
        game.second_elapsed();
        grab_new(&mut game, FeastItemKind::Clock);
        assert_eq!(game.time_left(), 64);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_items_expire_without_penalty() {
        let mut game = FruitFeast::with_rng(
            FeastTuning {
                spawn_interval_ms: 1.0e9,
                ..Default::default()
            },
            ScriptedRng::constant(0.5),
        );
        game.start();
        grab_new(&mut game, FeastItemKind::Apple);
        let id = game.spawn_at(FeastItemKind::Melon, Vec2::new(200.0, 200.0));

        run_for(&mut game, 2400.0);
        assert!(game.items().iter().any(|i| i.id == id));
        run_for(&mut game, 200.0);
        assert!(game.items().is_empty());
        assert_eq!(game.score(), 10);
        assert_eq!(game.combo(), 1);
    }

    #[test]
    fn test_spawns_on_interval_without_overlap() {
        let mut game = FruitFeast::new(99);
        game.start();
        for _ in 0..5 {
            run_for(&mut game, 800.0);
            let items = game.items();
            for (i, a) in items.iter().enumerate() {
                assert!(FIELD.contains(a.pos));
                for b in &items[i + 1..] {
                    assert!(!boxes_overlap(a.pos, ITEM_SIZE, b.pos, ITEM_SIZE));
                }
            }
        }
        assert!(!game.items().is_empty());
        assert!(game.items().len() <= 4);
    }

    #[test]
    fn test_crowded_field_skips_spawn() {
        let mut game = playing();
        game.spawn_at(FeastItemKind::Apple, Vec2::new(300.0, 165.0));
        let before = game.items().len();
        // Constant rng keeps proposing the same occupied spot
        game.spawn_random();
        assert_eq!(game.items().len(), before);
    }

    #[test]
    fn test_tongue_flicks_and_retracts() {
        let mut game = playing();
        let id = game.spawn_at(FeastItemKind::Apple, Vec2::new(300.0, 260.0));
        game.handle_action(FeastAction::Grab { id });
        let tongue = game.snapshot().tongue.unwrap();
        assert_eq!(tongue.target, Vec2::new(300.0, 260.0));
        assert!((tongue.length - 100.0).abs() < 1e-3);

        run_for(&mut game, 200.0);
        assert!(game.snapshot().tongue.is_none());
    }

    #[test]
    fn test_invalid_grabs_are_ignored() {
        let mut game = FruitFeast::new(4);
        let id = game.spawn_at(FeastItemKind::Melon, Vec2::new(100.0, 100.0));
        game.handle_action(FeastAction::Grab { id });
        assert_eq!(game.score(), 0);

        game.start();
        game.handle_action(FeastAction::Grab { id: 9999 });
        assert_eq!(game.score(), 0);
        assert!(game.snapshot().tongue.is_none());
    }

    #[test]
    fn test_countdown_finishes() {
        let mut game = playing();
        for _ in 0..60 {
            game.second_elapsed();
        }
        assert_eq!(game.phase(), FeastPhase::Finished);
        assert!(game.items().is_empty());
    }
}
