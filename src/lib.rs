//! rotwatch
//!
//! Follows the accelerometer and rotates one Hyprland output together with
//! its touchscreen and tablet, unless the toggle file says not to.

pub mod backends;
pub mod control;
pub mod daemon;
pub mod error;
pub mod orientation;
pub mod query;
pub mod sensors;
pub mod toggle;

#[cfg(test)]
mod testing;
