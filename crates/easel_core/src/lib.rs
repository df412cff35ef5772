//! Easel Core
//!
//! Foundational types for the Easel drawing toolkit:
//!
//! - **Geometry**: points, sizes, and rectangles in canvas pixels
//! - **Colors**: 8-bit RGBA with clamped interpolation
//! - **Draw Context**: a recording surface that drawables describe themselves into
//! - **Capabilities**: small traits (position, color, outline, rotation) that
//!   decide what an animation may touch
//! - **Shapes**: rectangles, ellipses, polygons, text, and sprites
//!
//! # Example
//!
//! ```rust
//! use easel_core::{Color, Drawable, RecordingContext, Rectangle, Size};
//!
//! let rect = Rectangle::new(50.0, 50.0, 20.0, 20.0).with_color(Color::RED);
//! let mut ctx = RecordingContext::new(Size::new(100.0, 100.0));
//! rect.draw(&mut ctx).unwrap();
//! assert_eq!(ctx.commands().len(), 1);
//! ```

pub mod color;
pub mod draw;
pub mod element;
pub mod error;
pub mod geometry;
pub mod shapes;

pub use color::Color;
pub use draw::{DrawCommand, DrawContext, RecordingContext, Transform};
pub use element::{
    Capability, Colorable, Drawable, ElementId, Outlineable, Positionable, Rotatable,
};
pub use error::{EaselError, Result};
pub use geometry::{Point, Rect, Size};
pub use shapes::{Ellipse, Polygon, Rectangle, Sprite, Text};
