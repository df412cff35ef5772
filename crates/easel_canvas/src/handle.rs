//! Element handles
//!
//! An [`Element`] refers to one drawable stored on a canvas. Every getter and
//! setter goes through the canvas's mutation lock, so the tick loop never
//! renders a half-applied change. Once the element is removed, every call
//! returns [`EaselError::ElementNotFound`].

use crate::canvas::Canvas;
use crate::timeline::{TimelineBuilder, TimelineCursor};
use easel_animation::Animation;
use easel_core::{Color, Drawable, EaselError, ElementId, Point, Result};
use std::sync::{Arc, Mutex};

/// A handle to a drawable on a [`Canvas`]
#[derive(Clone)]
pub struct Element {
    id: ElementId,
    canvas: Canvas,
    cursor: Arc<Mutex<TimelineCursor>>,
}

impl Element {
    pub(crate) fn new(id: ElementId, canvas: Canvas) -> Self {
        Self {
            id,
            canvas,
            cursor: Arc::default(),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub(crate) fn cursor(&self) -> &Mutex<TimelineCursor> {
        &self.cursor
    }

    /// Start (or continue) this element's timeline
    pub fn animate(&self) -> TimelineBuilder {
        TimelineBuilder::new(self.clone())
    }

    /// Run `f` on the drawable with the mutation lock held
    ///
    /// `f` must not call back into element handles of the same canvas; use
    /// [`Canvas::atomic`] to group several handle calls.
    pub fn with_drawable<R>(&self, f: impl FnOnce(&mut dyn Drawable) -> R) -> Result<R> {
        let id = self.id;
        self.canvas.container().with(|elements| {
            elements
                .get_mut(id)
                .map(f)
                .ok_or(EaselError::ElementNotFound(id))
        })
    }

    pub fn exists(&self) -> bool {
        self.canvas.container().with(|elements| elements.contains(self.id))
    }

    pub fn kind(&self) -> Result<&'static str> {
        self.with_drawable(|d| d.kind())
    }

    // =========================================================================
    // Properties
    // =========================================================================

    pub fn position(&self) -> Result<Point> {
        self.with_drawable(|d| d.require_positionable().map(|p| p.position()))?
    }

    pub fn set_position(&self, x: f64, y: f64) -> Result<()> {
        self.with_drawable(|d| {
            d.require_positionable()
                .map(|p| p.set_position(Point::new(x, y)))
        })?
    }

    /// Shift the position by an offset
    pub fn translate(&self, dx: f64, dy: f64) -> Result<()> {
        self.with_drawable(|d| {
            d.require_positionable().map(|p| {
                let moved = p.position().translate(dx, dy);
                p.set_position(moved);
            })
        })?
    }

    pub fn color(&self) -> Result<Color> {
        self.with_drawable(|d| d.require_colorable().map(|c| c.color()))?
    }

    pub fn set_color(&self, color: impl Into<Color>) -> Result<()> {
        let color = color.into();
        self.with_drawable(|d| d.require_colorable().map(|c| c.set_color(color)))?
    }

    pub fn outline_color(&self) -> Result<Color> {
        self.with_drawable(|d| d.require_outlineable().map(|o| o.outline_color()))?
    }

    pub fn set_outline_color(&self, color: impl Into<Color>) -> Result<()> {
        let color = color.into();
        self.with_drawable(|d| {
            d.require_outlineable()
                .map(|o| o.set_outline_color(color))
        })?
    }

    /// Outline stroke width, `None` while no outline is drawn
    pub fn outline_width(&self) -> Result<Option<f64>> {
        self.with_drawable(|d| d.require_outlineable().map(|o| o.outline_width()))?
    }

    pub fn set_outline_width(&self, width: Option<f64>) -> Result<()> {
        self.with_drawable(|d| {
            d.require_outlineable()
                .map(|o| o.set_outline_width(width))
        })?
    }

    pub fn is_filled(&self) -> Result<bool> {
        self.with_drawable(|d| d.require_outlineable().map(|o| o.is_filled()))?
    }

    pub fn set_filled(&self, filled: bool) -> Result<()> {
        self.with_drawable(|d| d.require_outlineable().map(|o| o.set_filled(filled)))?
    }

    /// Rotation in degrees
    pub fn rotation(&self) -> Result<f64> {
        self.with_drawable(|d| {
            d.require_rotatable()
                .map(|r| r.rotation().to_degrees())
        })?
    }

    /// Set the rotation in degrees
    pub fn set_rotation(&self, degrees: f64) -> Result<()> {
        self.with_drawable(|d| {
            d.require_rotatable()
                .map(|r| r.set_rotation(degrees.to_radians()))
        })?
    }

    // =========================================================================
    // Layering and visibility
    // =========================================================================

    pub fn layer(&self) -> Result<i32> {
        self.canvas.container().with(|elements| elements.layer(self.id))
    }

    pub fn set_layer(&self, layer: i32) -> Result<()> {
        self.canvas.container().with(|elements| elements.set_layer(self.id, layer))
    }

    /// Move above every other element
    pub fn bring_to_front(&self) -> Result<()> {
        self.canvas.container().with(|elements| {
            let layer = elements.max_layer();
            elements.set_layer(self.id, layer)
        })
    }

    /// Move below every other element
    pub fn send_to_back(&self) -> Result<()> {
        self.canvas.container().with(|elements| {
            let layer = elements.min_layer();
            elements.set_layer(self.id, layer)
        })
    }

    pub fn is_visible(&self) -> Result<bool> {
        self.canvas
            .container()
            .with(|elements| elements.entry(self.id).map(|e| e.is_visible()))
    }

    pub fn hide(&self) -> Result<()> {
        self.canvas.container().with(|elements| elements.set_visible(self.id, false))
    }

    pub fn show(&self) -> Result<()> {
        self.canvas.container().with(|elements| elements.set_visible(self.id, true))
    }

    pub fn is_attached(&self) -> Result<bool> {
        self.canvas
            .container()
            .with(|elements| elements.entry(self.id).map(|e| e.is_attached()))
    }

    /// Start rendering an element created with `auto_add` off
    pub fn attach(&self) -> Result<()> {
        self.canvas.container().with(|elements| elements.attach(self.id))
    }

    /// Stop rendering without discarding the element
    pub fn detach(&self) -> Result<()> {
        self.canvas.container().with(|elements| elements.detach(self.id))
    }

    /// Remove from the canvas.
    ///
    /// Animations still queued for this element keep their timing but no
    /// longer change anything.
    pub fn remove(&self) -> Result<()> {
        self.canvas
            .container()
            .with(|elements| elements.remove(self.id))
            .map(|_| ())
            .ok_or(EaselError::ElementNotFound(self.id))
    }

    // =========================================================================
    // Shorthands
    // =========================================================================

    fn add_animation(&self, animation: Animation, seconds: f64) -> Result<TimelineBuilder> {
        let timeline = self.animate();
        timeline.add(animation, seconds)?;
        Ok(timeline)
    }

    pub fn move_to(&self, x: f64, y: f64, seconds: f64) -> Result<TimelineBuilder> {
        self.add_animation(Animation::move_to(x, y), seconds)
    }

    pub fn move_by(&self, dx: f64, dy: f64, seconds: f64) -> Result<TimelineBuilder> {
        self.add_animation(Animation::move_by(dx, dy), seconds)
    }

    pub fn color_to(&self, color: impl Into<Color>, seconds: f64) -> Result<TimelineBuilder> {
        self.add_animation(Animation::color_to(color), seconds)
    }

    pub fn rotate_to(&self, degrees: f64, seconds: f64) -> Result<TimelineBuilder> {
        self.add_animation(Animation::rotate_to(degrees), seconds)
    }

    pub fn rotate_by(&self, degrees: f64, seconds: f64) -> Result<TimelineBuilder> {
        self.add_animation(Animation::rotate_by(degrees), seconds)
    }

    pub fn fade_in(&self, seconds: f64) -> Result<TimelineBuilder> {
        self.add_animation(Animation::fade_in(), seconds)
    }

    pub fn fade_out(&self, seconds: f64) -> Result<TimelineBuilder> {
        self.add_animation(Animation::fade_out(), seconds)
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Canvas, CanvasOptions};
    use easel_core::{Capability, Rectangle, Text};

    fn canvas() -> Canvas {
        Canvas::manual(100.0, 100.0, "handles", CanvasOptions::default()).unwrap()
    }

    #[test]
    fn test_property_setters() {
        let canvas = canvas();
        let rect = canvas.add(Rectangle::new(0.0, 0.0, 5.0, 5.0));

        rect.set_position(10.0, 20.0).unwrap();
        rect.translate(1.0, -1.0).unwrap();
        assert_eq!(rect.position().unwrap(), Point::new(11.0, 19.0));

        rect.set_color(Color::YELLOW).unwrap();
        assert_eq!(rect.color().unwrap(), Color::YELLOW);

        rect.set_outline_color(Color::GREEN).unwrap();
        assert_eq!(rect.outline_color().unwrap(), Color::GREEN);

        rect.set_rotation(90.0).unwrap();
        assert!((rect.rotation().unwrap() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_fill_and_outline_stroke() {
        let canvas = canvas();
        let rect = canvas.add(Rectangle::new(0.0, 0.0, 5.0, 5.0));
        assert!(rect.is_filled().unwrap());
        assert_eq!(rect.outline_width().unwrap(), None);

        rect.set_filled(false).unwrap();
        rect.set_outline_width(Some(2.0)).unwrap();
        assert!(!rect.is_filled().unwrap());
        assert_eq!(rect.outline_width().unwrap(), Some(2.0));

        let text = canvas.add(Text::new("hi", 0.0, 0.0));
        assert!(matches!(
            text.set_filled(true),
            Err(EaselError::CapabilityMismatch { kind: "Text", .. })
        ));
    }

    #[test]
    fn test_handles_work_inside_atomic() {
        let canvas = canvas();
        let squares: Vec<_> = (0..3)
            .map(|i| canvas.add(Rectangle::new(f64::from(i) * 10.0, 0.0, 5.0, 5.0)))
            .collect();

        let moved = canvas.atomic(|| {
            for square in &squares {
                square.translate(10.0, 0.0)?;
            }
            squares[0].set_filled(false)?;
            squares[0].position()
        });
        assert_eq!(moved.unwrap(), Point::new(10.0, 0.0));
        assert_eq!(squares[2].position().unwrap(), Point::new(30.0, 0.0));
        assert!(!squares[0].is_filled().unwrap());
    }

    #[test]
    fn test_missing_capability() {
        let canvas = canvas();
        let text = canvas.add(Text::new("hi", 0.0, 0.0));
        assert_eq!(
            text.set_outline_color(Color::RED),
            Err(EaselError::CapabilityMismatch {
                kind: "Text",
                capability: Capability::Outline,
            })
        );
    }

    #[test]
    fn test_front_and_back() {
        let canvas = canvas();
        let a = canvas.add(Rectangle::new(0.0, 0.0, 5.0, 5.0));
        let b = canvas.add(Rectangle::new(0.0, 0.0, 5.0, 5.0));
        let c = canvas.add(Rectangle::new(0.0, 0.0, 5.0, 5.0));

        a.bring_to_front().unwrap();
        c.send_to_back().unwrap();
        assert_eq!(a.layer().unwrap(), 1);
        assert_eq!(c.layer().unwrap(), -1);

        let order = canvas.container().with(|elements| elements.ids_in_layer_order());
        assert_eq!(order, vec![c.id(), b.id(), a.id()]);
    }

    #[test]
    fn test_visibility_and_attachment() {
        let canvas = Canvas::manual(
            100.0,
            100.0,
            "detached",
            CanvasOptions::default().with_auto_add(false),
        )
        .unwrap();
        let rect = canvas.add(Rectangle::new(0.0, 0.0, 5.0, 5.0));
        assert!(!rect.is_attached().unwrap());
        rect.attach().unwrap();
        assert!(rect.is_attached().unwrap());

        rect.hide().unwrap();
        assert!(!rect.is_visible().unwrap());
        rect.show().unwrap();
        assert!(rect.is_visible().unwrap());
    }

    #[test]
    fn test_removed_handle() {
        let canvas = canvas();
        let rect = canvas.add(Rectangle::new(0.0, 0.0, 5.0, 5.0));
        rect.remove().unwrap();
        assert!(!rect.exists());
        assert_eq!(rect.position(), Err(EaselError::ElementNotFound(rect.id())));
        assert_eq!(rect.remove(), Err(EaselError::ElementNotFound(rect.id())));
    }
}
