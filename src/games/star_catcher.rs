//! Star catcher: falling-object catch
//!
//! Stars and comets fall through a percent-based playfield towards a catch
//! line. The player taps one of three coloured catchers; everything in the
//! catch band matching that colour is caught, and a black hole in the band
//! always costs points whichever catcher was pressed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::{MiniGame, NoInput, RandomSource, SeededRng, TimerSet, weighted_pick_below};
use crate::step_millis;
use crate::tuning::CatcherTuning;

/// Catch line height (percent of playfield)
pub const CATCH_LINE_Y: f32 = 88.0;
/// Catch band, inclusive
pub const CATCH_BAND: (f32, f32) = (CATCH_LINE_Y - 8.0, CATCH_LINE_Y + 5.0);
/// Objects enter here
pub const SPAWN_Y: f32 = -10.0;
/// Objects past this are gone
pub const EXIT_Y: f32 = 105.0;
/// Horizontal spawn range `[min, max)`
pub const SPAWN_X: (f32, f32) = (10.0, 90.0);
/// Fall speed jitter (+/-)
pub const SPEED_JITTER: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatcherPhase {
    Ready,
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StarKind {
    Star,
    Comet,
    /// Black hole
    Hazard,
}

impl StarKind {
    /// Spawn buckets, scanned in this order
    const WEIGHTS: [(StarKind, f32); 3] = [
        (StarKind::Hazard, 0.05),
        (StarKind::Comet, 0.15),
        (StarKind::Star, 0.80),
    ];

    /// Fall speed in percent per 100 ms
    pub fn base_speed(self) -> f32 {
        match self {
            StarKind::Star => 15.0,
            StarKind::Comet => 25.0,
            StarKind::Hazard => 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StarColor {
    Blue,
    Yellow,
    White,
}

impl StarColor {
    pub const ALL: [StarColor; 3] = [StarColor::Blue, StarColor::Yellow, StarColor::White];

    fn index(self) -> usize {
        match self {
            StarColor::Blue => 0,
            StarColor::Yellow => 1,
            StarColor::White => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CatcherAction {
    Catch { zone: StarColor },
}

#[derive(Debug, Clone, Serialize)]
pub struct FallingStar {
    pub id: u32,
    pub kind: StarKind,
    pub color: StarColor,
    /// Percent of playfield
    pub pos: Vec2,
    /// Percent per 100 ms
    pub speed: f32,
    /// Cosmetic spin (degrees)
    pub rotation: f32,
}

/// Floating "+10" / "-5" marker
#[derive(Debug, Clone, Serialize)]
pub struct ScoreFeedback {
    pub id: u32,
    pub delta: i64,
    pub pos: Vec2,
    pub expires_at_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatcherSnapshot {
    pub phase: CatcherPhase,
    pub score: u32,
    pub time_left: u32,
    pub objects: Vec<FallingStar>,
    pub feedback: Vec<ScoreFeedback>,
    /// Catcher lit by the last press
    pub flashing: Option<StarColor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CatcherTimer {
    FlashOff,
}

#[derive(Debug, Clone)]
pub struct StarCatcher<R = SeededRng> {
    phase: CatcherPhase,
    score: u32,
    time_left: u32,
    objects: Vec<FallingStar>,
    feedback: Vec<ScoreFeedback>,
    flashing: Option<StarColor>,
    since_spawn_ms: f64,
    now_ms: f64,
    next_id: u32,
    timers: TimerSet<CatcherTimer>,
    tuning: CatcherTuning,
    rng: R,
}

impl StarCatcher {
    pub fn new(seed: u64) -> Self {
        Self::with_rng(CatcherTuning::default(), SeededRng::new(seed))
    }
}

impl<R: RandomSource> StarCatcher<R> {
    pub fn with_rng(tuning: CatcherTuning, rng: R) -> Self {
        Self {
            phase: CatcherPhase::Ready,
            score: 0,
            time_left: tuning.duration_s,
            objects: Vec::new(),
            feedback: Vec::new(),
            flashing: None,
            since_spawn_ms: 0.0,
            now_ms: 0.0,
            next_id: 1,
            timers: TimerSet::new(),
            tuning,
            rng,
        }
    }

    pub fn phase(&self) -> CatcherPhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn objects(&self) -> &[FallingStar] {
        &self.objects
    }

    /// Spawn gap for the current point in the run
    pub fn spawn_interval_ms(&self) -> f64 {
        let elapsed_s = self.tuning.duration_s.saturating_sub(self.time_left);
        (self.tuning.base_interval_ms - f64::from(elapsed_s) * self.tuning.interval_step_ms)
            .max(self.tuning.min_interval_ms)
    }

    /// Place an object directly
    pub fn spawn_at(&mut self, kind: StarKind, color: StarColor, pos: Vec2, speed: f32) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.objects.push(FallingStar {
            id,
            kind,
            color,
            pos,
            speed,
            rotation: 0.0,
        });
        id
    }

    fn spawn_random(&mut self) {
        let kind = weighted_pick_below(&mut self.rng, &StarKind::WEIGHTS);
        let color = StarColor::ALL[self.rng.below(StarColor::ALL.len())];
        let x = self.rng.range(SPAWN_X.0, SPAWN_X.1);
        let speed = kind.base_speed() + self.rng.range(-SPEED_JITTER, SPEED_JITTER);
        let rotation = self.rng.range(0.0, 360.0);
        let id = self.spawn_at(kind, color, Vec2::new(x, SPAWN_Y), speed);
        if let Some(star) = self.objects.last_mut() {
            star.rotation = rotation;
        }
        log::debug!("Spawned {:?} {:?} #{} at x={:.1}", color, kind, id, x);
    }

    fn clear(&mut self) {
        self.timers.cancel_all();
        self.score = 0;
        self.time_left = self.tuning.duration_s;
        self.objects.clear();
        self.feedback.clear();
        self.flashing = None;
        self.since_spawn_ms = self.spawn_interval_ms();
        self.now_ms = 0.0;
    }

    fn apply_delta(&mut self, delta: i64, pos: Vec2) {
        self.add_to_score(delta);
        self.push_feedback(delta, pos);
    }

    fn add_to_score(&mut self, delta: i64) {
        self.score = (i64::from(self.score) + delta).clamp(0, i64::from(u32::MAX)) as u32;
    }

    fn push_feedback(&mut self, delta: i64, pos: Vec2) {
        let id = self.next_id;
        self.next_id += 1;
        self.feedback.push(ScoreFeedback {
            id,
            delta,
            pos,
            expires_at_ms: self.now_ms + self.tuning.feedback_ms,
        });
    }

    fn catch(&mut self, zone: StarColor) {
        if self.phase != CatcherPhase::Playing {
            return;
        }
        self.flashing = Some(zone);
        self.timers
            .schedule_replacing(CatcherTimer::FlashOff, self.now_ms, self.tuning.flash_ms);

        let in_band = |star: &FallingStar| (CATCH_BAND.0..=CATCH_BAND.1).contains(&star.pos.y);
        if !self.objects.iter().any(in_band) {
            let slot = zone.index() as f32 + 0.5;
            let x = slot * 100.0 / StarColor::ALL.len() as f32;
            self.apply_delta(
                -i64::from(self.tuning.empty_catch_penalty),
                Vec2::new(x, CATCH_LINE_Y + 2.0),
            );
            return;
        }

        let mut outcomes = Vec::new();
        self.objects.retain(|star| {
            if !in_band(star) {
                return true;
            }
            let points = match star.kind {
                StarKind::Hazard => -i64::from(self.tuning.hazard_penalty),
                _ if star.color != zone => return true,
                StarKind::Comet => i64::from(self.tuning.comet_points),
                StarKind::Star => i64::from(self.tuning.star_points),
            };
            outcomes.push((points, star.pos));
            false
        });
        // One press settles as a single score change
        self.add_to_score(outcomes.iter().map(|(points, _)| points).sum());
        for (points, pos) in outcomes {
            self.push_feedback(points, pos);
        }
    }
}

impl<R: RandomSource> MiniGame for StarCatcher<R> {
    type Input = NoInput;
    type Action = CatcherAction;
    type Snapshot = CatcherSnapshot;

    fn start(&mut self) {
        self.clear();
        self.phase = CatcherPhase::Playing;
        log::info!("Star catcher started");
    }

    fn reset(&mut self) {
        self.clear();
        self.phase = CatcherPhase::Ready;
    }

    fn tick(&mut self, _input: &mut NoInput, dt: f32) {
        if self.phase != CatcherPhase::Playing {
            return;
        }
        let step_ms = step_millis(dt);
        self.now_ms += step_ms;
        for timer in self.timers.drain_due(self.now_ms) {
            match timer {
                CatcherTimer::FlashOff => self.flashing = None,
            }
        }
        let now = self.now_ms;
        self.feedback.retain(|f| f.expires_at_ms > now);

        self.since_spawn_ms += step_ms;
        if self.since_spawn_ms > self.spawn_interval_ms() {
            self.since_spawn_ms = 0.0;
            self.spawn_random();
        }

        let fall = (step_ms / 100.0) as f32;
        for star in &mut self.objects {
            star.pos.y += star.speed * fall;
        }

        let mut missed = Vec::new();
        self.objects.retain(|star| {
            if star.pos.y <= EXIT_Y {
                return true;
            }
            if star.kind != StarKind::Hazard {
                missed.push(star.pos.x);
            }
            false
        });
        for x in missed {
            self.apply_delta(
                -i64::from(self.tuning.missed_penalty),
                Vec2::new(x, CATCH_LINE_Y),
            );
        }
    }

    fn second_elapsed(&mut self) {
        if self.phase != CatcherPhase::Playing {
            return;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.phase = CatcherPhase::Finished;
            self.timers.cancel_all();
            self.flashing = None;
            log::info!("Star catcher finished with score {}", self.score);
        }
    }

    fn handle_action(&mut self, action: CatcherAction) {
        match action {
            CatcherAction::Catch { zone } => self.catch(zone),
        }
    }

    fn snapshot(&self) -> CatcherSnapshot {
        CatcherSnapshot {
            phase: self.phase,
            score: self.score,
            time_left: self.time_left,
            objects: self.objects.clone(),
            feedback: self.feedback.clone(),
            flashing: self.flashing,
        }
    }

    fn is_active(&self) -> bool {
        self.phase == CatcherPhase::Playing
    }
}
