//! Fixed timestep takedown tick
//!
//! Steering, shooting, spawning and collision resolution, in that order.

use glam::Vec2;

use super::state::*;
use crate::sim::{RandomSource, boxes_overlap, within_half_extent};
use crate::tuning::TakedownTuning;
use crate::{heading_vector, step_millis};

/// Advance the run by one fixed step
pub fn tick<R: RandomSource + ?Sized>(
    state: &mut TakedownState,
    rng: &mut R,
    tuning: &TakedownTuning,
    input: &mut TakedownInput,
    dt: f32,
) {
    if state.phase != TakedownPhase::Playing {
        return;
    }

    state.now_ms += step_millis(dt);
    let now = state.now_ms;
    state.explosions.retain(|e| e.expires_at_ms > now);

    // Steer, then drive along the new heading into the walls
    let turn = tuning.turn_rate * dt;
    if input.left {
        state.player.angle -= turn;
    }
    if input.right {
        state.player.angle += turn;
    }
    let step = heading_vector(state.player.angle) * tuning.player_speed * dt;
    state.player.pos = FIELD.clamp(state.player.pos + step, PLAYER_SIZE * 0.5);

    // Fire if the cooldown stamped on the input record has elapsed
    let cooled = match input.last_shot_ms {
        None => true,
        Some(last) => now < last || now - last > tuning.fire_cooldown_ms,
    };
    if input.fire && cooled {
        let (pos, angle) = (state.player.pos, state.player.angle);
        state.spawn_projectile_at(pos, angle);
        input.last_shot_ms = Some(now);
    }

    for p in &mut state.projectiles {
        p.pos += heading_vector(p.angle) * tuning.projectile_speed * dt;
    }
    state.projectiles.retain(|p| FIELD.contains(p.pos));

    if rng.chance(tuning.enemy_spawn_chance) {
        spawn_enemy(state, rng, tuning);
    }

    for e in &mut state.enemies {
        e.pos.y += e.speed * dt;
    }
    state
        .enemies
        .retain(|e| e.pos.y < FIELD.height + ENEMY_EXIT_MARGIN);

    resolve_collisions(state, tuning);

    if state.player.health <= 0 {
        state.player.health = 0;
        state.phase = TakedownPhase::Finished;
        log::info!("Takedown wrecked with score {}", state.score);
    }
}

/// Drop a new enemy above the street at a random lane and speed
pub fn spawn_enemy<R: RandomSource + ?Sized>(
    state: &mut TakedownState,
    rng: &mut R,
    tuning: &TakedownTuning,
) -> u32 {
    let x = rng.range(ENEMY_SPAWN_MARGIN, FIELD.width - ENEMY_SPAWN_MARGIN);
    let speed = rng.range(tuning.enemy_speed_min, tuning.enemy_speed_max);
    let id = state.spawn_enemy_at(Vec2::new(x, ENEMY_SPAWN_Y), speed, tuning.enemy_health);
    log::debug!("Enemy {} spawned at x={:.0} speed={:.0}", id, x, speed);
    id
}

/// Apply every hit for this step, then remove the dead
///
/// All hits resolve before any removal so simultaneous collisions all count.
/// Returns the number of enemies destroyed.
pub fn resolve_collisions(state: &mut TakedownState, tuning: &TakedownTuning) -> u32 {
    let enemy_half = ENEMY_SIZE * 0.5;

    // Projectile vs enemy: a shot damages every car it sits inside
    let mut spent = vec![false; state.projectiles.len()];
    for (i, p) in state.projectiles.iter().enumerate() {
        for enemy in &mut state.enemies {
            if within_half_extent(p.pos, enemy.pos, enemy_half) {
                enemy.health -= tuning.projectile_damage;
                spent[i] = true;
            }
        }
    }
    let mut spent = spent.into_iter();
    state
        .projectiles
        .retain(|_| !spent.next().unwrap_or(false));

    // Player vs enemy: ramming destroys the enemy outright
    let mut rammed: Vec<Vec2> = Vec::new();
    for enemy in &mut state.enemies {
        if boxes_overlap(state.player.pos, PLAYER_SIZE, enemy.pos, ENEMY_SIZE) {
            enemy.health = 0;
            state.player.health -= tuning.ram_damage;
            rammed.push(enemy.pos);
        }
    }
    for pos in rammed {
        state.spawn_explosion(pos, tuning.explosion_ms);
    }

    let destroyed: Vec<Vec2> = state
        .enemies
        .iter()
        .filter(|e| e.health <= 0)
        .map(|e| e.pos)
        .collect();
    state.enemies.retain(|e| e.health > 0);

    let kills = destroyed.len() as u32;
    for pos in destroyed {
        state.score += tuning.kill_points;
        state.spawn_explosion(pos, tuning.explosion_ms);
    }
    kills
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::ScriptedRng;

    fn playing_state(tuning: &TakedownTuning) -> TakedownState {
        let mut state = TakedownState::new(tuning);
        state.phase = TakedownPhase::Playing;
        state
    }

    /// Never spawns (rolls stay above the spawn chance)
    fn quiet_rng() -> ScriptedRng {
        ScriptedRng::constant(0.99)
    }

    #[test]
    fn test_two_hits_destroy_enemy() {
        let tuning = TakedownTuning::default();
        let mut state = playing_state(&tuning);
        let target = Vec2::new(200.0, -30.0);
        let enemy = state.spawn_enemy_at(target, 0.0, 30);

        state.spawn_projectile_at(target, PLAYER_START_ANGLE);
        assert_eq!(resolve_collisions(&mut state, &tuning), 0);
        assert_eq!(state.enemies[0].id, enemy);
        assert_eq!(state.enemies[0].health, 15);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.score, 0);

        state.spawn_projectile_at(target + Vec2::new(5.0, 10.0), PLAYER_START_ANGLE);
        assert_eq!(resolve_collisions(&mut state, &tuning), 1);
        assert!(state.enemies.is_empty());
        assert!(state.projectiles.is_empty());
        assert_eq!(state.score, 100);
        assert_eq!(state.explosions.len(), 1);
    }

    #[test]
    fn test_projectile_outside_extent_misses() {
        let tuning = TakedownTuning::default();
        let mut state = playing_state(&tuning);
        state.spawn_enemy_at(Vec2::new(200.0, 100.0), 0.0, 30);
        state.spawn_projectile_at(Vec2::new(214.0, 100.0), 0.0);

        resolve_collisions(&mut state, &tuning);
        assert_eq!(state.enemies[0].health, 30);
        assert_eq!(state.projectiles.len(), 1);
    }

    #[test]
    fn test_ram_destroys_enemy_and_hurts_player() {
        let tuning = TakedownTuning::default();
        let mut state = playing_state(&tuning);
        let pos = state.player.pos + Vec2::new(10.0, -20.0);
        state.spawn_enemy_at(pos, 0.0, 30);

        let kills = resolve_collisions(&mut state, &tuning);
        assert_eq!(kills, 1);
        assert!(state.enemies.is_empty());
        assert_eq!(state.player.health, 90);
        assert_eq!(state.score, 100);
        assert!(!state.explosions.is_empty());
    }

    #[test]
    fn test_simultaneous_hits_all_resolve() {
        let tuning = TakedownTuning::default();
        let mut state = playing_state(&tuning);
        let a = Vec2::new(100.0, 200.0);
        let b = Vec2::new(300.0, 200.0);
        state.spawn_enemy_at(a, 0.0, 15);
        state.spawn_enemy_at(b, 0.0, 15);
        state.spawn_projectile_at(a, 0.0);
        state.spawn_projectile_at(b, 0.0);

        assert_eq!(resolve_collisions(&mut state, &tuning), 2);
        assert_eq!(state.score, 200);
    }

    #[test]
    fn test_shot_damages_every_overlapping_enemy() {
        let tuning = TakedownTuning::default();
        let mut state = playing_state(&tuning);
        state.spawn_enemy_at(Vec2::new(200.0, 300.0), 0.0, 30);
        state.spawn_enemy_at(Vec2::new(204.0, 300.0), 0.0, 30);
        state.spawn_projectile_at(Vec2::new(200.0, 300.0), PLAYER_START_ANGLE);

        assert_eq!(resolve_collisions(&mut state, &tuning), 0);
        let health: Vec<i32> = state.enemies.iter().map(|e| e.health).collect();
        assert_eq!(health, vec![15, 15]);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_player_clamped_at_wall() {
        let tuning = TakedownTuning::default();
        let mut state = playing_state(&tuning);
        let mut rng = quiet_rng();
        let mut input = TakedownInput::default();

        // Drive straight up for five seconds
        for _ in 0..300 {
            tick(&mut state, &mut rng, &tuning, &mut input, SIM_DT);
        }
        assert!((state.player.pos.y - PLAYER_SIZE.y * 0.5).abs() < 1e-3);
        assert_eq!(state.player.pos.x, PLAYER_START.x);
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let tuning = TakedownTuning::default();
        let mut state = playing_state(&tuning);
        let mut rng = quiet_rng();
        let mut input = TakedownInput {
            fire: true,
            ..Default::default()
        };

        // 6 steps = 100 ms: only the first shot fires
        for _ in 0..6 {
            tick(&mut state, &mut rng, &tuning, &mut input, SIM_DT);
        }
        assert_eq!(state.projectiles.len(), 1);
        assert!(input.last_shot_ms.is_some());

        // Past 200 ms a second shot goes out
        for _ in 0..8 {
            tick(&mut state, &mut rng, &tuning, &mut input, SIM_DT);
        }
        assert_eq!(state.projectiles.len(), 2);
    }

    #[test]
    fn test_projectiles_leave_field() {
        let tuning = TakedownTuning::default();
        let mut state = playing_state(&tuning);
        let mut rng = quiet_rng();
        state.spawn_projectile_at(Vec2::new(200.0, 5.0), PLAYER_START_ANGLE);

        tick(&mut state, &mut rng, &tuning, &mut TakedownInput::default(), SIM_DT);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_enemy_spawns_above_field() {
        let tuning = TakedownTuning::default();
        let mut state = playing_state(&tuning);
        // First roll spawns, then x and speed rolls
        let mut rng = ScriptedRng::new(vec![0.0, 0.5, 0.5, 0.99]);

        tick(&mut state, &mut rng, &tuning, &mut TakedownInput::default(), SIM_DT);
        assert_eq!(state.enemies.len(), 1);
        let enemy = &state.enemies[0];
        assert_eq!(enemy.pos.x, 200.0);
        assert_eq!(enemy.speed, 90.0);
        assert!((enemy.pos.y - (ENEMY_SPAWN_Y + 90.0 * SIM_DT)).abs() < 1e-4);
        assert_eq!(enemy.health, tuning.enemy_health);
    }

    #[test]
    fn test_enemies_culled_below_field() {
        let tuning = TakedownTuning::default();
        let mut state = playing_state(&tuning);
        let mut rng = quiet_rng();
        state.spawn_enemy_at(Vec2::new(20.0, FIELD.height + ENEMY_EXIT_MARGIN - 0.5), 120.0, 30);

        tick(&mut state, &mut rng, &tuning, &mut TakedownInput::default(), SIM_DT);
        assert!(state.enemies.is_empty());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_zero_health_finishes_run() {
        let tuning = TakedownTuning::default();
        let mut state = playing_state(&tuning);
        let mut rng = quiet_rng();
        state.player.health = 10;
        let pos = state.player.pos;
        state.spawn_enemy_at(pos, 0.0, 30);

        tick(&mut state, &mut rng, &tuning, &mut TakedownInput::default(), SIM_DT);
        assert_eq!(state.phase, TakedownPhase::Finished);
        assert_eq!(state.player.health, 0);
    }

    #[test]
    fn test_determinism() {
        use crate::sim::SeededRng;

        let tuning = TakedownTuning::default();
        let mut state1 = playing_state(&tuning);
        let mut state2 = playing_state(&tuning);
        let mut rng1 = SeededRng::new(99999);
        let mut rng2 = SeededRng::new(99999);
        let mut input1 = TakedownInput {
            fire: true,
            left: true,
            ..Default::default()
        };
        let mut input2 = input1.clone();

        for _ in 0..600 {
            tick(&mut state1, &mut rng1, &tuning, &mut input1, SIM_DT);
            tick(&mut state2, &mut rng2, &tuning, &mut input2, SIM_DT);
        }

        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.enemies.len(), state2.enemies.len());
        assert!((state1.player.angle - state2.player.angle).abs() < 1e-4);
    }
}
