//! Park Arcade entry point
//!
//! The browser build starts from `platform::web`. Natively this runs every
//! game headless with a simple autopilot and logs how each run went.
//!
//! Usage: `park-arcade [seed]` (set `RUST_LOG=info` to see the output)

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use park_arcade::consts::SIM_DT;
    use park_arcade::games::breaker_panel::{BreakerAction, BreakerPhase};
    use park_arcade::games::fruit_feast::{FeastAction, FeastPhase};
    use park_arcade::games::pit_stop::{ActiveTask, PitStopAction, PitStopPhase, WheelStage};
    use park_arcade::games::star_catcher::{CATCH_BAND, CatcherAction, CatcherPhase, StarKind};
    use park_arcade::games::takedown::TakedownPhase;
    use park_arcade::games::{BreakerPanel, FruitFeast, PitStop, StarCatcher, Takedown};
    use park_arcade::sim::{MiniGame, Session};

    /// Give up on a run after this many simulated minutes
    const MAX_FRAMES: usize = 60 * 60 * 3;

    fn log_snapshot<G: MiniGame>(name: &str, session: &Session<G>) {
        match serde_json::to_string(&session.snapshot()) {
            Ok(json) => log::debug!("{} final snapshot: {}", name, json),
            Err(e) => log::warn!("{} snapshot failed: {}", name, e),
        }
    }

    pub fn takedown(seed: u64) {
        let mut session = Session::new(Takedown::new(seed));
        session.start();
        session.set_control("fire", true);
        for frame in 0..MAX_FRAMES {
            // Weave across the street
            let weave_left = (frame / 90) % 2 == 0;
            session.set_control("left", weave_left);
            session.set_control("right", !weave_left);
            session.advance(SIM_DT);
            if session.game().state().phase == TakedownPhase::Finished {
                break;
            }
        }
        let state = session.game().state();
        log::info!(
            "Takedown: score {} with {} health left",
            state.score,
            state.player.health
        );
        log_snapshot("Takedown", &session);
    }

    pub fn pit_stop(seed: u64) {
        let mut session = Session::new(PitStop::new(seed));
        session.start();
        for _ in 0..MAX_FRAMES {
            if session.game().phase() == PitStopPhase::Finished {
                break;
            }
            let action = if session.game().penalty().is_some() {
                None
            } else {
                match session.game().active_task() {
                    Some(ActiveTask::Wheel(wheel)) => match wheel.stage {
                        WheelStage::Unscrewing => wheel
                            .nuts_removed
                            .iter()
                            .position(|removed| !removed)
                            .map(|slot| PitStopAction::RemoveNut { slot }),
                        WheelStage::Screwing => wheel
                            .nuts_installed
                            .iter()
                            .position(|installed| !installed)
                            .map(|slot| PitStopAction::InstallNut { slot }),
                        WheelStage::WheelSwap | WheelStage::Transition => None,
                    },
                    Some(ActiveTask::Refuel(refuel)) if !refuel.pumping => {
                        Some(PitStopAction::PressFuel)
                    }
                    Some(ActiveTask::Refuel(refuel)) if refuel.level >= 70.0 => {
                        Some(PitStopAction::ReleaseFuel)
                    }
                    Some(ActiveTask::ItemMatch(task)) => {
                        Some(PitStopAction::SelectItem { item: task.target })
                    }
                    _ => None,
                }
            };
            if let Some(action) = action {
                session.handle_action(action);
            }
            session.advance(SIM_DT);
        }
        log::info!(
            "Pit stop: {:.2}s ({:.1}s of penalties)",
            session.game().elapsed_ms() / 1000.0,
            session.game().penalty_ms() / 1000.0
        );
        log_snapshot("Pit stop", &session);
    }

    pub fn breaker_panel(seed: u64) {
        let mut session = Session::new(BreakerPanel::new(seed));
        session.start();
        for _ in 0..MAX_FRAMES {
            match session.game().phase() {
                BreakerPhase::Won | BreakerPhase::Lost => break,
                BreakerPhase::Playing => {
                    let game = session.game();
                    if let Some(&index) = game.sequence().get(game.accepted().len()) {
                        session.handle_action(BreakerAction::FlipSwitch { index });
                    }
                }
                _ => {}
            }
            session.advance(SIM_DT);
        }
        log::info!(
            "Breaker panel: {:?} on level {} with danger {:.0}",
            session.game().phase(),
            session.game().level() + 1,
            session.game().danger()
        );
        log_snapshot("Breaker panel", &session);
    }

    pub fn star_catcher(seed: u64) {
        let mut session = Session::new(StarCatcher::new(seed));
        session.start();
        for _ in 0..MAX_FRAMES {
            if session.game().phase() == CatcherPhase::Finished {
                break;
            }
            // Catch anything worth points once it sits mid-band
            let zone = session
                .game()
                .objects()
                .iter()
                .find(|s| s.kind != StarKind::Hazard && s.pos.y >= CATCH_BAND.0 + 4.0)
                .filter(|s| s.pos.y <= CATCH_BAND.1)
                .map(|s| s.color);
            if let Some(zone) = zone {
                session.handle_action(CatcherAction::Catch { zone });
            }
            session.advance(SIM_DT);
        }
        log::info!("Star catcher: score {}", session.game().score());
        log_snapshot("Star catcher", &session);
    }

    pub fn fruit_feast(seed: u64) {
        let mut session = Session::new(FruitFeast::new(seed));
        session.start();
        for _ in 0..MAX_FRAMES {
            if session.game().phase() == FeastPhase::Finished {
                break;
            }
            let powered = session.game().is_powered();
            let target = session
                .game()
                .items()
                .iter()
                .find(|item| powered || item.kind.hazard_penalty().is_none())
                .map(|item| item.id);
            if let Some(id) = target {
                session.handle_action(FeastAction::Grab { id });
            }
            session.advance(SIM_DT);
        }
        log::info!(
            "Fruit feast: score {} (combo {})",
            session.game().score(),
            session.game().combo()
        );
        log_snapshot("Fruit feast", &session);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = match std::env::args().nth(1) {
        Some(arg) => match arg.parse::<u64>() {
            Ok(seed) => seed,
            Err(e) => {
                log::warn!("Ignoring seed `{}`: {}", arg, e);
                42
            }
        },
        None => 42,
    };
    log::info!("Park Arcade (native) running headless demo, seed {}", seed);

    demo::takedown(seed);
    demo::pit_stop(seed);
    demo::breaker_panel(seed);
    demo::star_catcher(seed);
    demo::fruit_feast(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser entry is platform::web::wasm_start
}
