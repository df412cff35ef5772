//! Draw context and command recording
//!
//! Drawables never rasterize anything themselves. They describe what they
//! look like through [`DrawContext`], and the canvas records those calls into
//! a [`RecordingContext`] once per tick. The recorded command list is what
//! leaves the crate: a window backend, an image encoder, or a test can
//! consume it.

use crate::color::Color;
use crate::geometry::{Point, Rect, Size};

// ─────────────────────────────────────────────────────────────────────────────
// Transforms
// ─────────────────────────────────────────────────────────────────────────────

/// A 2D transform pushed around a group of draw calls
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transform {
    /// Shift everything by the given offset
    Translate { dx: f64, dy: f64 },
    /// Rotate by `radians` around `center`
    Rotate { radians: f64, center: Point },
}

impl Transform {
    pub fn translate(dx: f64, dy: f64) -> Self {
        Transform::Translate { dx, dy }
    }

    pub fn rotate(radians: f64, center: Point) -> Self {
        Transform::Rotate { radians, center }
    }

    /// Whether applying this transform changes nothing
    pub fn is_identity(&self) -> bool {
        match self {
            Transform::Translate { dx, dy } => *dx == 0.0 && *dy == 0.0,
            Transform::Rotate { radians, .. } => *radians == 0.0,
        }
    }

    /// Map a point through this transform
    pub fn apply(&self, point: Point) -> Point {
        match *self {
            Transform::Translate { dx, dy } => point.translate(dx, dy),
            Transform::Rotate { radians, center } => {
                let (sin, cos) = radians.sin_cos();
                let local = point - center;
                Point::new(
                    center.x + local.x * cos - local.y * sin,
                    center.y + local.x * sin + local.y * cos,
                )
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Draw Context
// ─────────────────────────────────────────────────────────────────────────────

/// The drawing surface handed to every drawable during a render pass
pub trait DrawContext {
    /// Fill the whole viewport with a color
    fn clear(&mut self, color: Color);

    /// Enable or disable anti-aliasing for subsequent calls
    fn set_anti_alias(&mut self, enabled: bool);

    fn push_transform(&mut self, transform: Transform);

    fn pop_transform(&mut self);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn stroke_rect(&mut self, rect: Rect, width: f64, color: Color);

    fn fill_ellipse(&mut self, center: Point, radii: Size, color: Color);

    fn stroke_ellipse(&mut self, center: Point, radii: Size, width: f64, color: Color);

    fn fill_polygon(&mut self, points: &[Point], color: Color);

    fn stroke_polygon(&mut self, points: &[Point], width: f64, color: Color);

    fn draw_text(&mut self, text: &str, origin: Point, font_size: f64, color: Color);

    /// Draw an externally loaded image identified by `source`
    fn draw_image(&mut self, source: &str, rect: Rect);

    /// Size of the drawing surface
    fn viewport(&self) -> Size;
}

/// A draw command that can be recorded and replayed
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    SetAntiAlias(bool),
    PushTransform(Transform),
    PopTransform,
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        width: f64,
        color: Color,
    },
    FillEllipse {
        center: Point,
        radii: Size,
        color: Color,
    },
    StrokeEllipse {
        center: Point,
        radii: Size,
        width: f64,
        color: Color,
    },
    FillPolygon {
        points: Vec<Point>,
        color: Color,
    },
    StrokePolygon {
        points: Vec<Point>,
        width: f64,
        color: Color,
    },
    DrawText {
        text: String,
        origin: Point,
        font_size: f64,
        color: Color,
    },
    DrawImage {
        source: String,
        rect: Rect,
    },
}

/// A draw context that records commands for later execution
#[derive(Debug, Default)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
    transform_depth: usize,
    anti_alias: bool,
    viewport: Size,
}

impl RecordingContext {
    /// Create a new recording context
    pub fn new(viewport: Size) -> Self {
        Self {
            commands: Vec::new(),
            transform_depth: 0,
            anti_alias: false,
            viewport,
        }
    }

    /// Get the recorded commands
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of transforms pushed and not yet popped
    pub fn transform_depth(&self) -> usize {
        self.transform_depth
    }

    /// Pop every transform still on the stack.
    ///
    /// Used after a drawable fails mid-draw so its transforms cannot leak
    /// into the next drawable.
    pub fn unwind_transforms(&mut self, depth: usize) {
        while self.transform_depth > depth {
            self.pop_transform();
        }
    }

    pub fn anti_alias(&self) -> bool {
        self.anti_alias
    }

    /// Clear all recorded commands
    pub fn clear_commands(&mut self) {
        self.commands.clear();
        self.transform_depth = 0;
    }
}

impl DrawContext for RecordingContext {
    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn set_anti_alias(&mut self, enabled: bool) {
        self.anti_alias = enabled;
        self.commands.push(DrawCommand::SetAntiAlias(enabled));
    }

    fn push_transform(&mut self, transform: Transform) {
        self.transform_depth += 1;
        self.commands.push(DrawCommand::PushTransform(transform));
    }

    fn pop_transform(&mut self) {
        if self.transform_depth == 0 {
            return;
        }
        self.transform_depth -= 1;
        self.commands.push(DrawCommand::PopTransform);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, width: f64, color: Color) {
        self.commands
            .push(DrawCommand::StrokeRect { rect, width, color });
    }

    fn fill_ellipse(&mut self, center: Point, radii: Size, color: Color) {
        self.commands.push(DrawCommand::FillEllipse {
            center,
            radii,
            color,
        });
    }

    fn stroke_ellipse(&mut self, center: Point, radii: Size, width: f64, color: Color) {
        self.commands.push(DrawCommand::StrokeEllipse {
            center,
            radii,
            width,
            color,
        });
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        self.commands.push(DrawCommand::FillPolygon {
            points: points.to_vec(),
            color,
        });
    }

    fn stroke_polygon(&mut self, points: &[Point], width: f64, color: Color) {
        self.commands.push(DrawCommand::StrokePolygon {
            points: points.to_vec(),
            width,
            color,
        });
    }

    fn draw_text(&mut self, text: &str, origin: Point, font_size: f64, color: Color) {
        self.commands.push(DrawCommand::DrawText {
            text: text.to_string(),
            origin,
            font_size,
            color,
        });
    }

    fn draw_image(&mut self, source: &str, rect: Rect) {
        self.commands.push(DrawCommand::DrawImage {
            source: source.to_string(),
            rect,
        });
    }

    fn viewport(&self) -> Size {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_context() {
        let mut ctx = RecordingContext::new(Size::new(100.0, 100.0));
        ctx.clear(Color::WHITE);
        ctx.push_transform(Transform::translate(5.0, 5.0));
        ctx.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::RED);
        ctx.pop_transform();

        assert_eq!(ctx.commands().len(), 4);
        assert_eq!(ctx.transform_depth(), 0);
        assert_eq!(ctx.commands()[0], DrawCommand::Clear(Color::WHITE));
    }

    #[test]
    fn test_unwind_transforms() {
        let mut ctx = RecordingContext::new(Size::new(10.0, 10.0));
        ctx.push_transform(Transform::translate(1.0, 0.0));
        let depth = ctx.transform_depth();
        ctx.push_transform(Transform::rotate(1.0, Point::ZERO));
        ctx.push_transform(Transform::rotate(1.0, Point::ZERO));
        ctx.unwind_transforms(depth);
        assert_eq!(ctx.transform_depth(), 1);

        // Popping an empty stack records nothing
        ctx.pop_transform();
        let len = ctx.commands().len();
        ctx.pop_transform();
        assert_eq!(ctx.commands().len(), len);
    }

    #[test]
    fn test_rotate_transform_apply() {
        let t = Transform::rotate(std::f64::consts::FRAC_PI_2, Point::new(1.0, 1.0));
        let p = t.apply(Point::new(2.0, 1.0));
        assert!((p.x - 1.0).abs() < 1e-9);
        assert!((p.y - 2.0).abs() < 1e-9);
    }
}
