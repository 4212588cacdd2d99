// extensions/mod.rs
//
// Small math helpers layered on top of the core.

pub mod easing;

pub use easing::{ease_vec3, Easing};
