//! Easel Canvas
//!
//! A frame-clocked drawing canvas for timeline-driven 2D animation.
//!
//! # Features
//!
//! - **Frame Clock**: fixed-rate ticks that fire scheduled events, step
//!   animations, and render every frame
//! - **Element Container**: layer-ordered storage behind one mutation lock
//! - **Timeline Builders**: `add`/`with`/`wait`/`schedule` composition that
//!   blocks the calling thread only where sequencing needs it
//! - **Element Handles**: lock-guarded property access and animation shorthands
//! - **Render Lifecycles** and **Frame Sinks** for whatever consumes frames
//!
//! # Example
//!
//! ```rust
//! use easel_canvas::prelude::*;
//!
//! let canvas = Canvas::manual(400.0, 300.0, "demo", CanvasOptions::default()).unwrap();
//! let square = canvas.add(Rectangle::new(0.0, 0.0, 20.0, 20.0));
//! square
//!     .animate()
//!     .add(Animation::move_to(100.0, 100.0), 1.0)
//!     .unwrap()
//!     .with(Animation::color_to(Color::RED), 1.0)
//!     .unwrap();
//!
//! for _ in 0..=15 {
//!     canvas.tick();
//! }
//! assert_eq!(square.position().unwrap(), Point::new(50.0, 50.0));
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod canvas;
pub mod clock;
pub mod container;
pub mod handle;
pub mod lifecycle;
pub mod options;
pub mod sink;
pub mod timeline;


pub use canvas::Canvas;
pub use clock::{EventCallback, FrameClock};
pub use container::{ElementContainer, ElementEntry, Elements, ElementsGuard};
pub use handle::Element;
pub use lifecycle::{AntiAliasLifecycle, CenteringLifecycle, RenderLifecycle};
pub use options::CanvasOptions;
pub use sink::{CapturedFrames, FrameSink, NullSink, RenderedFrame};
pub use timeline::{TimelineBuilder, TimelineCursor};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::canvas::Canvas;
    pub use crate::handle::Element;
    pub use crate::options::CanvasOptions;
    pub use crate::sink::{CapturedFrames, FrameSink, RenderedFrame};
    pub use crate::timeline::TimelineBuilder;

    pub use easel_animation::{Animation, Easing, TimeUnit};
    pub use easel_core::{
        Color, EaselError, Ellipse, Point, Polygon, Rectangle, Result, Size, Sprite, Text,
    };
}

/// Lock a mutex, recovering the data if a holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
