//! Takedown state and entity types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::{HeldInputs, Playfield};
use crate::tuning::TakedownTuning;

/// Street playfield (px)
pub const FIELD: Playfield = Playfield::new(400.0, 600.0);
pub const PLAYER_SIZE: Vec2 = Vec2::new(30.0, 50.0);
pub const PLAYER_START: Vec2 = Vec2::new(200.0, 540.0);
/// Player starts pointing up the street
pub const PLAYER_START_ANGLE: f32 = -std::f32::consts::FRAC_PI_2;
pub const ENEMY_SIZE: Vec2 = Vec2::new(28.0, 45.0);
/// Enemies enter above the top edge
pub const ENEMY_SPAWN_Y: f32 = -30.0;
/// Horizontal margin kept clear when spawning
pub const ENEMY_SPAWN_MARGIN: f32 = 10.0;
/// Enemies are culled this far below the bottom edge
pub const ENEMY_EXIT_MARGIN: f32 = 50.0;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TakedownPhase {
    /// Waiting for start
    Ready,
    /// Active gameplay
    Playing,
    /// Run ended (health or clock ran out)
    Finished,
}

/// Held controls plus the shot cooldown stamp
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TakedownInput {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    /// Sim time of the last shot fired (ms)
    pub last_shot_ms: Option<f64>,
}

impl HeldInputs for TakedownInput {
    fn set_held(&mut self, control: &str, held: bool) -> bool {
        match control {
            "left" => self.left = held,
            "right" => self.right = held,
            "fire" => self.fire = held,
            _ => return false,
        }
        true
    }
}

/// The player's car
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Heading (radians, y down)
    pub angle: f32,
    pub health: i32,
    pub max_health: i32,
}

/// An enemy car driving down the street
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    /// px/s
    pub speed: f32,
    pub health: i32,
    pub max_health: i32,
}

/// A shot travelling along a fixed heading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub angle: f32,
}

/// Transient explosion marker (no physics)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub id: u32,
    pub pos: Vec2,
    pub expires_at_ms: f64,
}

/// Complete takedown state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakedownState {
    pub phase: TakedownPhase,
    pub player: Player,
    /// Active enemies (sorted by id)
    pub enemies: Vec<Enemy>,
    /// Active projectiles (sorted by id)
    pub projectiles: Vec<Projectile>,
    pub explosions: Vec<Explosion>,
    pub score: u32,
    /// Countdown seconds
    pub time_left: u32,
    /// Simulation clock (ms since start)
    pub now_ms: f64,
    next_id: u32,
}

impl TakedownState {
    pub fn new(tuning: &TakedownTuning) -> Self {
        Self {
            phase: TakedownPhase::Ready,
            player: Player {
                pos: PLAYER_START,
                angle: PLAYER_START_ANGLE,
                health: tuning.player_health,
                max_health: tuning.player_health,
            },
            enemies: Vec::new(),
            projectiles: Vec::new(),
            explosions: Vec::new(),
            score: 0,
            time_left: tuning.duration_s,
            now_ms: 0.0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Place an enemy with full health
    pub fn spawn_enemy_at(&mut self, pos: Vec2, speed: f32, health: i32) -> u32 {
        let id = self.next_entity_id();
        self.enemies.push(Enemy {
            id,
            pos,
            speed,
            health,
            max_health: health,
        });
        id
    }

    pub fn spawn_projectile_at(&mut self, pos: Vec2, angle: f32) -> u32 {
        let id = self.next_entity_id();
        self.projectiles.push(Projectile { id, pos, angle });
        id
    }

    pub fn spawn_explosion(&mut self, pos: Vec2, lifetime_ms: f64) {
        let id = self.next_entity_id();
        self.explosions.push(Explosion {
            id,
            pos,
            expires_at_ms: self.now_ms + lifetime_ms,
        });
    }
}
