//! Pit stop: a race against the clock through a shuffled task list
//!
//! Each run shuffles one task per wheel plus refuelling and an item-box
//! match. Wheels go unscrew -> swap -> screw -> transition; refuelling is a
//! hold-and-release into a target band; the item box asks for one symbol out
//! of a few candidates. Mistakes add a fixed penalty to the run time, which is
//! the final score (lower is better).

use serde::{Deserialize, Serialize};

use crate::sim::{MiniGame, NoInput, RandomSource, SeededRng, TimerSet, shuffle};
use crate::step_millis;
use crate::tuning::PitStopTuning;

/// Item-box symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSymbol {
    Mushroom,
    Banana,
    GreenShell,
    BobOmb,
    SuperStar,
}

impl ItemSymbol {
    pub const ALL: [ItemSymbol; 5] = [
        ItemSymbol::Mushroom,
        ItemSymbol::Banana,
        ItemSymbol::GreenShell,
        ItemSymbol::BobOmb,
        ItemSymbol::SuperStar,
    ];

    pub fn glyph(&self) -> &'static str {
        match self {
            ItemSymbol::Mushroom => "🍄",
            ItemSymbol::Banana => "🍌",
            ItemSymbol::GreenShell => "🐢",
            ItemSymbol::BobOmb => "💣",
            ItemSymbol::SuperStar => "⭐",
        }
    }
}

/// One entry of the run's task queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Task {
    Wheel { index: usize },
    Refuel,
    ItemMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitStopPhase {
    Ready,
    Playing,
    Finished,
}

/// Sub-phase of a wheel change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelStage {
    Unscrewing,
    WheelSwap,
    Screwing,
    Transition,
}

#[derive(Debug, Clone, Serialize)]
pub struct WheelTask {
    pub index: usize,
    pub stage: WheelStage,
    pub nuts_removed: Vec<bool>,
    pub nuts_installed: Vec<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefuelTask {
    /// Fill percent in [0, 100]
    pub level: f32,
    pub pumping: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemMatchTask {
    pub target: ItemSymbol,
    pub choices: Vec<ItemSymbol>,
}

/// The task currently in front of the player, with its private sub-state
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActiveTask {
    Wheel(WheelTask),
    Refuel(RefuelTask),
    ItemMatch(ItemMatchTask),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyReason {
    Underfilled,
    Overfilled,
    WrongItem,
}

impl PenaltyReason {
    pub fn message(&self) -> &'static str {
        match self {
            PenaltyReason::Underfilled => "Not enough fuel! 3s penalty.",
            PenaltyReason::Overfilled => "Overfilled! 3s penalty.",
            PenaltyReason::WrongItem => "Wrong item! 3s penalty.",
        }
    }
}

/// Discrete player actions
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PitStopAction {
    RemoveNut { slot: usize },
    InstallNut { slot: usize },
    PressFuel,
    ReleaseFuel,
    SelectItem { item: ItemSymbol },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PitTimer {
    WheelSwapDone,
    TransitionDone,
    PenaltyOver,
}

/// Read-only view for the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct PitStopSnapshot {
    pub phase: PitStopPhase,
    pub queue: Vec<Task>,
    pub current_index: usize,
    pub task: Option<ActiveTask>,
    pub completed_wheels: Vec<usize>,
    /// Wall time plus penalties (ms); frozen once finished
    pub elapsed_ms: f64,
    pub penalty: Option<PenaltyReason>,
}

#[derive(Debug, Clone)]
pub struct PitStop<R = SeededRng> {
    phase: PitStopPhase,
    queue: Vec<Task>,
    cursor: usize,
    active: Option<ActiveTask>,
    completed_wheels: Vec<usize>,
    run_ms: f64,
    penalty_ms: f64,
    final_ms: Option<f64>,
    penalty: Option<PenaltyReason>,
    timers: TimerSet<PitTimer>,
    tuning: PitStopTuning,
    rng: R,
}

impl PitStop {
    pub fn new(seed: u64) -> Self {
        Self::with_rng(PitStopTuning::default(), SeededRng::new(seed))
    }
}

impl<R: RandomSource> PitStop<R> {
    pub fn with_rng(tuning: PitStopTuning, rng: R) -> Self {
        Self {
            phase: PitStopPhase::Ready,
            queue: Vec::new(),
            cursor: 0,
            active: None,
            completed_wheels: Vec::new(),
            run_ms: 0.0,
            penalty_ms: 0.0,
            final_ms: None,
            penalty: None,
            timers: TimerSet::new(),
            tuning,
            rng,
        }
    }

    pub fn phase(&self) -> PitStopPhase {
        self.phase
    }

    pub fn queue(&self) -> &[Task] {
        &self.queue
    }

    pub fn current_task(&self) -> Option<Task> {
        self.queue.get(self.cursor).copied().filter(|_| self.active.is_some())
    }

    pub fn active_task(&self) -> Option<&ActiveTask> {
        self.active.as_ref()
    }

    pub fn penalty(&self) -> Option<PenaltyReason> {
        self.penalty
    }

    /// Run time including penalties
    pub fn elapsed_ms(&self) -> f64 {
        self.final_ms.unwrap_or(self.run_ms + self.penalty_ms)
    }

    pub fn penalty_ms(&self) -> f64 {
        self.penalty_ms
    }

    /// One of every task, shuffled once per run
    fn build_queue(&mut self) -> Vec<Task> {
        let mut tasks: Vec<Task> = (0..self.tuning.wheels)
            .map(|index| Task::Wheel { index })
            .collect();
        tasks.push(Task::Refuel);
        tasks.push(Task::ItemMatch);
        shuffle(&mut self.rng, &mut tasks);
        tasks
    }

    fn enter_task(&mut self, cursor: usize) {
        self.cursor = cursor;
        self.active = self.queue.get(cursor).copied().map(|task| match task {
            Task::Wheel { index } => ActiveTask::Wheel(WheelTask {
                index,
                stage: WheelStage::Unscrewing,
                nuts_removed: vec![false; self.tuning.nuts_per_wheel],
                nuts_installed: vec![false; self.tuning.nuts_per_wheel],
            }),
            Task::Refuel => ActiveTask::Refuel(RefuelTask {
                level: 0.0,
                pumping: false,
            }),
            Task::ItemMatch => ActiveTask::ItemMatch(self.draw_items()),
        });
    }

    /// Pick a target and distinct candidates containing it
    fn draw_items(&mut self) -> ItemMatchTask {
        let target = ItemSymbol::ALL[self.rng.below(ItemSymbol::ALL.len())];
        let wanted = self.tuning.item_choices.clamp(1, ItemSymbol::ALL.len());
        let mut choices = vec![target];
        let mut draws = 0;
        while choices.len() < wanted && draws < 64 {
            let candidate = ItemSymbol::ALL[self.rng.below(ItemSymbol::ALL.len())];
            if !choices.contains(&candidate) {
                choices.push(candidate);
            }
            draws += 1;
        }
        // Unlucky draws: top up in symbol order
        for symbol in ItemSymbol::ALL {
            if choices.len() >= wanted {
                break;
            }
            if !choices.contains(&symbol) {
                choices.push(symbol);
            }
        }
        shuffle(&mut self.rng, &mut choices);
        ItemMatchTask { target, choices }
    }

    fn advance_queue(&mut self) {
        if let Some(ActiveTask::Wheel(wheel)) = &self.active {
            self.completed_wheels.push(wheel.index);
        }
        let next = self.cursor + 1;
        if next >= self.queue.len() {
            let total = self.run_ms + self.penalty_ms;
            self.final_ms = Some(total);
            self.phase = PitStopPhase::Finished;
            self.active = None;
            self.cursor = self.queue.len();
            self.timers.cancel_all();
            log::info!("Pit stop finished in {:.2}s", total / 1000.0);
        } else {
            log::debug!("Pit stop task {} -> {:?}", next, self.queue[next]);
            self.enter_task(next);
        }
    }

    fn apply_penalty(&mut self, reason: PenaltyReason) {
        self.penalty_ms += self.tuning.penalty_ms;
        self.penalty = Some(reason);
        self.timers.schedule_replacing(
            PitTimer::PenaltyOver,
            self.run_ms,
            self.tuning.penalty_pause_ms,
        );
        log::debug!("Pit stop penalty: {:?}", reason);
    }

    /// Evaluate the fill level when the pump is let go
    fn release_fuel(&mut self) {
        let Some(ActiveTask::Refuel(refuel)) = &mut self.active else {
            return;
        };
        if !refuel.pumping {
            return;
        }
        refuel.pumping = false;
        let level = refuel.level;
        if (self.tuning.fuel_min..=self.tuning.fuel_max).contains(&level) {
            self.advance_queue();
        } else if level > self.tuning.fuel_max {
            self.apply_penalty(PenaltyReason::Overfilled);
        } else {
            self.apply_penalty(PenaltyReason::Underfilled);
        }
    }

    fn on_timer(&mut self, timer: PitTimer) {
        match timer {
            PitTimer::WheelSwapDone => {
                if let Some(ActiveTask::Wheel(wheel)) = &mut self.active
                    && wheel.stage == WheelStage::WheelSwap
                {
                    wheel.stage = WheelStage::Screwing;
                }
            }
            PitTimer::TransitionDone => {
                if matches!(
                    &self.active,
                    Some(ActiveTask::Wheel(WheelTask {
                        stage: WheelStage::Transition,
                        ..
                    }))
                ) {
                    self.advance_queue();
                }
            }
            PitTimer::PenaltyOver => {
                self.penalty = None;
                if let Some(ActiveTask::Refuel(refuel)) = &mut self.active {
                    refuel.level = 0.0;
                }
                if matches!(self.active, Some(ActiveTask::ItemMatch(_))) {
                    self.active = Some(ActiveTask::ItemMatch(self.draw_items()));
                }
            }
        }
    }

    fn set_nut(&mut self, slot: usize, installing: bool) {
        let Some(ActiveTask::Wheel(wheel)) = &mut self.active else {
            return;
        };
        let (expected, next_stage, delay, timer) = if installing {
            (
                WheelStage::Screwing,
                WheelStage::Transition,
                self.tuning.wheel_transition_ms,
                PitTimer::TransitionDone,
            )
        } else {
            (
                WheelStage::Unscrewing,
                WheelStage::WheelSwap,
                self.tuning.wheel_swap_ms,
                PitTimer::WheelSwapDone,
            )
        };
        if wheel.stage != expected {
            return;
        }
        let slots = if installing {
            &mut wheel.nuts_installed
        } else {
            &mut wheel.nuts_removed
        };
        let Some(nut) = slots.get_mut(slot) else {
            return;
        };
        *nut = true;
        if slots.iter().all(|&n| n) {
            wheel.stage = next_stage;
            self.timers.schedule(timer, self.run_ms, delay);
        }
    }

    fn snapshot_inner(&self) -> PitStopSnapshot {
        PitStopSnapshot {
            phase: self.phase,
            queue: self.queue.clone(),
            current_index: self.cursor,
            task: self.active.clone(),
            completed_wheels: self.completed_wheels.clone(),
            elapsed_ms: self.elapsed_ms(),
            penalty: self.penalty,
        }
    }
}

impl<R: RandomSource> MiniGame for PitStop<R> {
    type Input = NoInput;
    type Action = PitStopAction;
    type Snapshot = PitStopSnapshot;

    fn start(&mut self) {
        self.timers.cancel_all();
        self.queue = self.build_queue();
        self.completed_wheels.clear();
        self.run_ms = 0.0;
        self.penalty_ms = 0.0;
        self.final_ms = None;
        self.penalty = None;
        self.phase = PitStopPhase::Playing;
        self.enter_task(0);
        log::info!("Pit stop started: {:?}", self.queue);
    }

    fn reset(&mut self) {
        self.timers.cancel_all();
        self.phase = PitStopPhase::Ready;
        self.active = None;
        self.penalty = None;
        self.cursor = 0;
        self.run_ms = 0.0;
        self.penalty_ms = 0.0;
        self.final_ms = None;
        self.completed_wheels.clear();
    }

    fn tick(&mut self, _input: &mut NoInput, dt: f32) {
        if self.phase != PitStopPhase::Playing {
            return;
        }
        self.run_ms += step_millis(dt);

        for timer in self.timers.drain_due(self.run_ms) {
            self.on_timer(timer);
            if self.phase != PitStopPhase::Playing {
                return;
            }
        }

        let rate = self.tuning.fuel_rate;
        let mut overflowed = false;
        if let Some(ActiveTask::Refuel(refuel)) = &mut self.active
            && refuel.pumping
        {
            refuel.level += rate * dt;
            if refuel.level >= 100.0 {
                refuel.level = 100.0;
                overflowed = true;
            }
        }
        if overflowed {
            self.release_fuel();
        }
    }

    fn handle_action(&mut self, action: PitStopAction) {
        if self.phase != PitStopPhase::Playing {
            return;
        }
        match action {
            PitStopAction::RemoveNut { slot } => self.set_nut(slot, false),
            PitStopAction::InstallNut { slot } => self.set_nut(slot, true),
            PitStopAction::PressFuel => {
                let in_penalty = self.penalty.is_some();
                if let Some(ActiveTask::Refuel(refuel)) = &mut self.active
                    && !in_penalty
                {
                    refuel.pumping = true;
                }
            }
            PitStopAction::ReleaseFuel => self.release_fuel(),
            PitStopAction::SelectItem { item } => {
                if self.penalty.is_some() {
                    return;
                }
                let Some(ActiveTask::ItemMatch(task)) = &self.active else {
                    return;
                };
                if item == task.target {
                    self.advance_queue();
                } else {
                    self.apply_penalty(PenaltyReason::WrongItem);
                }
            }
        }
    }

    fn snapshot(&self) -> PitStopSnapshot {
        self.snapshot_inner()
    }

    fn is_active(&self) -> bool {
        self.phase == PitStopPhase::Playing
    }
}
