//! Platform bindings
//!
//! The browser build exposes the arcade to JavaScript; native builds drive
//! [`crate::Arcade`] directly.

#[cfg(target_arch = "wasm32")]
pub mod web;
