//! Browser binding
//!
//! The page owns the `requestAnimationFrame` loop and passes each timestamp
//! to [`WebArcade::frame`]; everything else is JSON in, JSON out.

use wasm_bindgen::prelude::*;

use crate::arcade::{Arcade, GameKind};
use crate::consts::SIM_DT;
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Park arcade loaded");
}

#[wasm_bindgen]
pub struct WebArcade {
    arcade: Arcade,
    /// Last rAF timestamp (ms), zero until the first frame
    last_time: f64,
}

#[wasm_bindgen]
impl WebArcade {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebArcade {
        let seed = js_sys::Date::now() as u64;
        log::info!("Arcade seeded with {}", seed);
        Self::wrap(Arcade::with_tuning(seed, Tuning::default()))
    }

    /// Arcade with a partial tuning document applied
    #[wasm_bindgen(js_name = withTuning)]
    pub fn with_tuning(json: &str) -> Result<WebArcade, JsError> {
        let seed = js_sys::Date::now() as u64;
        Ok(Self::wrap(Arcade::from_tuning_json(seed, json)?))
    }

    fn wrap(arcade: Arcade) -> WebArcade {
        WebArcade {
            arcade,
            last_time: 0.0,
        }
    }

    /// Names accepted by `open`
    #[wasm_bindgen(js_name = gameNames)]
    pub fn game_names() -> Vec<String> {
        GameKind::ALL.iter().map(|k| k.as_str().to_string()).collect()
    }

    pub fn open(&mut self, name: &str) -> Result<(), JsError> {
        self.arcade.open_named(name)?;
        self.last_time = 0.0;
        Ok(())
    }

    pub fn close(&mut self) {
        self.arcade.close();
    }

    pub fn start(&mut self) -> Result<(), JsError> {
        self.last_time = 0.0;
        Ok(self.arcade.start()?)
    }

    pub fn reset(&mut self) -> Result<(), JsError> {
        self.last_time = 0.0;
        Ok(self.arcade.reset()?)
    }

    /// Advance by the time since the previous animation frame
    pub fn frame(&mut self, timestamp_ms: f64) -> Result<(), JsError> {
        let dt = if self.last_time > 0.0 {
            ((timestamp_ms - self.last_time) / 1000.0) as f32
        } else {
            SIM_DT
        };
        self.last_time = timestamp_ms;
        self.arcade.advance(dt)?;
        Ok(())
    }

    /// Page hidden: forget the last timestamp so the return frame is short
    pub fn suspend(&mut self) {
        self.last_time = 0.0;
    }

    #[wasm_bindgen(js_name = setControl)]
    pub fn set_control(&mut self, control: &str, held: bool) -> Result<bool, JsError> {
        Ok(self.arcade.set_control(control, held)?)
    }

    pub fn action(&mut self, json: &str) -> Result<(), JsError> {
        Ok(self.arcade.handle_action_json(json)?)
    }

    pub fn snapshot(&self) -> Result<String, JsError> {
        Ok(self.arcade.snapshot_json()?)
    }

    /// Name of the open game
    pub fn current(&self) -> Option<String> {
        self.arcade.kind().map(|k| k.as_str().to_string())
    }

    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.arcade.is_active()
    }
}

impl Default for WebArcade {
    fn default() -> Self {
        Self::new()
    }
}
