//! Ready-made drawables
//!
//! Every shape is positioned by its center. Shapes that can be filled also
//! carry an optional outline; text and sprites don't.

use crate::color::Color;
use crate::draw::{DrawContext, Transform};
use crate::element::{Colorable, Drawable, Outlineable, Positionable, Rotatable};
use crate::error::{EaselError, Result};
use crate::geometry::{Point, Rect, Size};

macro_rules! impl_positionable {
    ($ty:ty) => {
        impl Positionable for $ty {
            fn position(&self) -> Point {
                self.position
            }

            fn set_position(&mut self, position: Point) {
                self.position = position;
            }
        }
    };
}

macro_rules! impl_colorable {
    ($ty:ty) => {
        impl Colorable for $ty {
            fn color(&self) -> Color {
                self.color
            }

            fn set_color(&mut self, color: Color) {
                self.color = color;
            }
        }
    };
}

macro_rules! impl_rotatable {
    ($ty:ty) => {
        impl Rotatable for $ty {
            fn rotation(&self) -> f64 {
                self.rotation
            }

            fn set_rotation(&mut self, radians: f64) {
                self.rotation = radians;
            }
        }
    };
}

/// The outline color is kept while no stroke is set, so changing it never
/// turns an outline on.
macro_rules! impl_outlineable {
    ($ty:ty) => {
        impl Outlineable for $ty {
            fn outline_color(&self) -> Color {
                self.outline_color
            }

            fn set_outline_color(&mut self, color: Color) {
                self.outline_color = color;
            }

            fn outline_width(&self) -> Option<f64> {
                self.stroke
            }

            fn set_outline_width(&mut self, width: Option<f64>) {
                self.stroke = width;
            }

            fn is_filled(&self) -> bool {
                self.filled
            }

            fn set_filled(&mut self, filled: bool) {
                self.filled = filled;
            }
        }
    };
}

macro_rules! shape_accessors {
    () => {
        fn as_positionable(&self) -> Option<&dyn Positionable> {
            Some(self)
        }

        fn as_positionable_mut(&mut self) -> Option<&mut dyn Positionable> {
            Some(self)
        }

        fn as_rotatable(&self) -> Option<&dyn Rotatable> {
            Some(self)
        }

        fn as_rotatable_mut(&mut self) -> Option<&mut dyn Rotatable> {
            Some(self)
        }
    };
}

macro_rules! paint_accessors {
    () => {
        fn as_colorable(&self) -> Option<&dyn Colorable> {
            Some(self)
        }

        fn as_colorable_mut(&mut self) -> Option<&mut dyn Colorable> {
            Some(self)
        }

        fn as_outlineable(&self) -> Option<&dyn Outlineable> {
            Some(self)
        }

        fn as_outlineable_mut(&mut self) -> Option<&mut dyn Outlineable> {
            Some(self)
        }
    };
}

/// Run `body` with the rotation transform for a shape pushed
fn with_rotation(
    ctx: &mut dyn DrawContext,
    rotation: f64,
    center: Point,
    body: impl FnOnce(&mut dyn DrawContext) -> Result<()>,
) -> Result<()> {
    if rotation == 0.0 {
        return body(ctx);
    }
    ctx.push_transform(Transform::rotate(rotation, center));
    let result = body(ctx);
    ctx.pop_transform();
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Rectangle
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Rectangle {
    pub position: Point,
    pub size: Size,
    pub color: Color,
    pub rotation: f64,
    pub filled: bool,
    pub outline_color: Color,
    /// Outline stroke width, `None` draws no outline
    pub stroke: Option<f64>,
}

impl Rectangle {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            position: Point::new(x, y),
            size: Size::new(width, height),
            color: Color::BLUE,
            rotation: 0.0,
            filled: true,
            outline_color: Color::BLACK,
            stroke: None,
        }
    }

    pub fn square(x: f64, y: f64, side: f64) -> Self {
        Self::new(x, y, side, side)
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_outline(mut self, width: f64, color: Color) -> Self {
        self.outline_color = color;
        self.stroke = Some(width);
        self
    }

    pub fn filled(mut self, filled: bool) -> Self {
        self.filled = filled;
        self
    }

    pub fn bounds(&self) -> Rect {
        Rect::centered_at(self.position, self.size)
    }
}

impl_positionable!(Rectangle);
impl_colorable!(Rectangle);
impl_rotatable!(Rectangle);
impl_outlineable!(Rectangle);

impl Drawable for Rectangle {
    fn kind(&self) -> &'static str {
        "Rectangle"
    }

    fn draw(&self, ctx: &mut dyn DrawContext) -> Result<()> {
        if self.size.width < 0.0 || self.size.height < 0.0 {
            return Err(EaselError::render("rectangle has a negative size"));
        }
        let bounds = self.bounds();
        with_rotation(ctx, self.rotation, self.position, |ctx| {
            if self.filled {
                ctx.fill_rect(bounds, self.color);
            }
            if let Some(width) = self.stroke {
                ctx.stroke_rect(bounds, width, self.outline_color);
            }
            Ok(())
        })
    }

    shape_accessors!();
    paint_accessors!();
}

// ─────────────────────────────────────────────────────────────────────────────
// Ellipse
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Ellipse {
    pub position: Point,
    pub radii: Size,
    pub color: Color,
    pub rotation: f64,
    pub filled: bool,
    pub outline_color: Color,
    /// Outline stroke width, `None` draws no outline
    pub stroke: Option<f64>,
}

impl Ellipse {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            position: Point::new(x, y),
            radii: Size::new(width / 2.0, height / 2.0),
            color: Color::RED,
            rotation: 0.0,
            filled: true,
            outline_color: Color::BLACK,
            stroke: None,
        }
    }

    pub fn circle(x: f64, y: f64, radius: f64) -> Self {
        Self::new(x, y, radius * 2.0, radius * 2.0)
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_outline(mut self, width: f64, color: Color) -> Self {
        self.outline_color = color;
        self.stroke = Some(width);
        self
    }

    pub fn filled(mut self, filled: bool) -> Self {
        self.filled = filled;
        self
    }
}

impl_positionable!(Ellipse);
impl_colorable!(Ellipse);
impl_rotatable!(Ellipse);
impl_outlineable!(Ellipse);

impl Drawable for Ellipse {
    fn kind(&self) -> &'static str {
        "Ellipse"
    }

    fn draw(&self, ctx: &mut dyn DrawContext) -> Result<()> {
        with_rotation(ctx, self.rotation, self.position, |ctx| {
            if self.filled {
                ctx.fill_ellipse(self.position, self.radii, self.color);
            }
            if let Some(width) = self.stroke {
                ctx.stroke_ellipse(self.position, self.radii, width, self.outline_color);
            }
            Ok(())
        })
    }

    shape_accessors!();
    paint_accessors!();
}

// ─────────────────────────────────────────────────────────────────────────────
// Polygon
// ─────────────────────────────────────────────────────────────────────────────

/// Closed polygon whose vertices are stored relative to its position
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub position: Point,
    pub vertices: Vec<Point>,
    pub color: Color,
    pub rotation: f64,
    pub filled: bool,
    pub outline_color: Color,
    /// Outline stroke width, `None` draws no outline
    pub stroke: Option<f64>,
}

impl Polygon {
    pub fn new(x: f64, y: f64, vertices: Vec<Point>) -> Self {
        Self {
            position: Point::new(x, y),
            vertices,
            color: Color::GREEN,
            rotation: 0.0,
            filled: true,
            outline_color: Color::BLACK,
            stroke: None,
        }
    }

    /// Isosceles triangle of the given width and height, pointing up
    pub fn triangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        Self::new(
            x,
            y,
            vec![Point::new(0.0, -hh), Point::new(hw, hh), Point::new(-hw, hh)],
        )
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_outline(mut self, width: f64, color: Color) -> Self {
        self.outline_color = color;
        self.stroke = Some(width);
        self
    }

    pub fn filled(mut self, filled: bool) -> Self {
        self.filled = filled;
        self
    }

    fn absolute_vertices(&self) -> Vec<Point> {
        self.vertices.iter().map(|v| *v + self.position).collect()
    }
}

impl_positionable!(Polygon);
impl_colorable!(Polygon);
impl_rotatable!(Polygon);
impl_outlineable!(Polygon);

impl Drawable for Polygon {
    fn kind(&self) -> &'static str {
        "Polygon"
    }

    fn draw(&self, ctx: &mut dyn DrawContext) -> Result<()> {
        if self.vertices.len() < 3 {
            return Err(EaselError::render(format!(
                "polygon needs at least 3 vertices, has {}",
                self.vertices.len()
            )));
        }
        let points = self.absolute_vertices();
        with_rotation(ctx, self.rotation, self.position, |ctx| {
            if self.filled {
                ctx.fill_polygon(&points, self.color);
            }
            if let Some(width) = self.stroke {
                ctx.stroke_polygon(&points, width, self.outline_color);
            }
            Ok(())
        })
    }

    shape_accessors!();
    paint_accessors!();
}

// ─────────────────────────────────────────────────────────────────────────────
// Text
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Text {
    pub position: Point,
    pub text: String,
    pub font_size: f64,
    pub color: Color,
    pub rotation: f64,
}

impl Text {
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            text: text.into(),
            font_size: 30.0,
            color: Color::BLACK,
            rotation: 0.0,
        }
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl_positionable!(Text);
impl_colorable!(Text);
impl_rotatable!(Text);

impl Drawable for Text {
    fn kind(&self) -> &'static str {
        "Text"
    }

    fn draw(&self, ctx: &mut dyn DrawContext) -> Result<()> {
        with_rotation(ctx, self.rotation, self.position, |ctx| {
            ctx.draw_text(&self.text, self.position, self.font_size, self.color);
            Ok(())
        })
    }

    shape_accessors!();

    fn as_colorable(&self) -> Option<&dyn Colorable> {
        Some(self)
    }

    fn as_colorable_mut(&mut self) -> Option<&mut dyn Colorable> {
        Some(self)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sprite
// ─────────────────────────────────────────────────────────────────────────────

/// An image drawn from an external source; it has no color of its own
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    pub position: Point,
    pub source: String,
    pub size: Size,
    pub rotation: f64,
}

impl Sprite {
    pub fn new(source: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            position: Point::new(x, y),
            source: source.into(),
            size: Size::new(width, height),
            rotation: 0.0,
        }
    }
}

impl_positionable!(Sprite);
impl_rotatable!(Sprite);

impl Drawable for Sprite {
    fn kind(&self) -> &'static str {
        "Sprite"
    }

    fn draw(&self, ctx: &mut dyn DrawContext) -> Result<()> {
        let rect = Rect::centered_at(self.position, self.size);
        with_rotation(ctx, self.rotation, self.position, |ctx| {
            ctx.draw_image(&self.source, rect);
            Ok(())
        })
    }

    shape_accessors!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{DrawCommand, RecordingContext};

    #[test]
    fn test_rectangle_draws_fill_and_outline() {
        let rect = Rectangle::new(50.0, 50.0, 20.0, 10.0)
            .with_color(Color::RED)
            .with_outline(2.0, Color::BLACK);
        let mut ctx = RecordingContext::new(Size::new(100.0, 100.0));
        rect.draw(&mut ctx).unwrap();

        assert_eq!(
            ctx.commands(),
            &[
                DrawCommand::FillRect {
                    rect: Rect::new(40.0, 45.0, 20.0, 10.0),
                    color: Color::RED,
                },
                DrawCommand::StrokeRect {
                    rect: Rect::new(40.0, 45.0, 20.0, 10.0),
                    width: 2.0,
                    color: Color::BLACK,
                },
            ]
        );
    }

    #[test]
    fn test_rotation_is_wrapped_in_transform() {
        let mut circle = Ellipse::circle(10.0, 10.0, 5.0);
        circle.set_rotation(1.0);
        let mut ctx = RecordingContext::new(Size::new(100.0, 100.0));
        circle.draw(&mut ctx).unwrap();

        let commands = ctx.commands();
        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0], DrawCommand::PushTransform(_)));
        assert!(matches!(commands[2], DrawCommand::PopTransform));
    }

    #[test]
    fn test_unfilled_outline_less_shape_draws_nothing() {
        let rect = Rectangle::new(0.0, 0.0, 5.0, 5.0).filled(false);
        let mut ctx = RecordingContext::new(Size::new(10.0, 10.0));
        rect.draw(&mut ctx).unwrap();
        assert!(ctx.commands().is_empty());
    }

    #[test]
    fn test_degenerate_polygon_fails_to_draw() {
        let poly = Polygon::new(0.0, 0.0, vec![Point::ZERO, Point::new(1.0, 1.0)]);
        let mut ctx = RecordingContext::new(Size::new(10.0, 10.0));
        assert!(matches!(poly.draw(&mut ctx), Err(EaselError::Render(_))));
    }

    #[test]
    fn test_outline_color_setter_keeps_stroke_off() {
        let mut rect = Rectangle::new(0.0, 0.0, 5.0, 5.0);
        assert_eq!(rect.outline_color(), Color::BLACK);
        rect.set_outline_color(Color::GREEN);
        assert_eq!(rect.outline_color(), Color::GREEN);
        assert_eq!(rect.outline_width(), None);

        let mut ctx = RecordingContext::new(Size::new(10.0, 10.0));
        rect.draw(&mut ctx).unwrap();
        assert_eq!(ctx.commands().len(), 1);

        rect.set_outline_width(Some(3.0));
        let mut ctx = RecordingContext::new(Size::new(10.0, 10.0));
        rect.draw(&mut ctx).unwrap();
        assert!(matches!(
            ctx.commands()[1],
            DrawCommand::StrokeRect { width, color, .. } if width == 3.0 && color == Color::GREEN
        ));
    }

    #[test]
    fn test_fill_toggle() {
        let mut poly = Polygon::triangle(5.0, 5.0, 4.0, 4.0).with_outline(1.0, Color::RED);
        assert!(poly.is_filled());
        poly.set_filled(false);
        let mut ctx = RecordingContext::new(Size::new(10.0, 10.0));
        poly.draw(&mut ctx).unwrap();
        assert_eq!(ctx.commands().len(), 1);
        assert!(matches!(ctx.commands()[0], DrawCommand::StrokePolygon { .. }));
    }
}
