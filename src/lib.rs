#![cfg_attr(not(test), no_std)]

//! Build-time configuration of the ESP32 sensor board.
//!
//! `cfg.toml` is turned into a `const` bundle by the build script; the
//! firmware loads it with [`config::load`] and refuses to start unless
//! [`validate::validate`] accepts it.

pub mod config;
pub mod constants;
pub mod display;
pub mod target;
pub mod validate;

pub use config::{load, ConfigBundle};
pub use validate::{validate, ConfigError, ConfigErrors};
