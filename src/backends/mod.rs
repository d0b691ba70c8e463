use crate::orientation::TransformCode;

pub trait Dispatcher {
    /// Rotate the display and its absolute input devices. Best effort,
    /// nothing is reported back.
    fn apply(&mut self, transform: TransformCode);
}

pub mod hyprland;

pub use hyprland::{DisplayConfig, HyprctlDispatcher};
