//! Easel Animation System
//!
//! Frame-based tweens for canvas elements.
//!
//! # Features
//!
//! - **Easing**: the easings.net family, cubic bezier, and custom functions
//! - **Animations**: movement, color, rotation, and opacity tweens with lazy
//!   start capture and a Pending/Active/Ended state machine
//! - **Time Units**: frames, milliseconds, and seconds converted at a frame rate
//! - **Interpolation**: the [`Interpolate`] trait for animatable values

pub mod animation;
pub mod easing;
pub mod time;
pub mod values;

pub use animation::{Animation, AnimationKind, AnimationState};
pub use easing::Easing;
pub use time::TimeUnit;
pub use values::{Alpha, Interpolate};
