//! Render lifecycle hooks
//!
//! A [`RenderLifecycle`] runs code around each frame: `render_start` before
//! any element is drawn, `render_end` after the last one (hooks run in
//! reverse order there), and `on_resize` when the canvas changes size.

use easel_core::{DrawContext, Size, Transform};

pub trait RenderLifecycle: Send {
    fn render_start(&mut self, _ctx: &mut dyn DrawContext) {}

    fn render_end(&mut self, _ctx: &mut dyn DrawContext) {}

    fn on_resize(&mut self, _size: Size) {}
}

/// Turns on anti-aliasing for every frame
#[derive(Clone, Copy, Debug, Default)]
pub struct AntiAliasLifecycle;

impl RenderLifecycle for AntiAliasLifecycle {
    fn render_start(&mut self, ctx: &mut dyn DrawContext) {
        ctx.set_anti_alias(true);
    }
}

/// Keeps content centered by translating it half the growth of the canvas
#[derive(Clone, Debug)]
pub struct CenteringLifecycle {
    initial: Size,
    dx: f64,
    dy: f64,
    pushed: bool,
}

impl CenteringLifecycle {
    pub fn new(initial: Size) -> Self {
        Self {
            initial,
            dx: 0.0,
            dy: 0.0,
            pushed: false,
        }
    }

    pub fn offset(&self) -> (f64, f64) {
        (self.dx, self.dy)
    }
}

impl RenderLifecycle for CenteringLifecycle {
    fn render_start(&mut self, ctx: &mut dyn DrawContext) {
        let translate = Transform::translate(self.dx, self.dy);
        self.pushed = !translate.is_identity();
        if self.pushed {
            ctx.push_transform(translate);
        }
    }

    fn render_end(&mut self, ctx: &mut dyn DrawContext) {
        if self.pushed {
            ctx.pop_transform();
            self.pushed = false;
        }
    }

    fn on_resize(&mut self, size: Size) {
        self.dx = (size.width - self.initial.width) / 2.0;
        self.dy = (size.height - self.initial.height) / 2.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::{DrawCommand, RecordingContext};

    #[test]
    fn test_centering_offset() {
        let mut centering = CenteringLifecycle::new(Size::new(200.0, 100.0));
        let mut ctx = RecordingContext::new(Size::new(300.0, 100.0));

        centering.render_start(&mut ctx);
        centering.render_end(&mut ctx);
        assert!(ctx.commands().is_empty());

        centering.on_resize(Size::new(300.0, 100.0));
        assert_eq!(centering.offset(), (50.0, 0.0));
        centering.render_start(&mut ctx);
        centering.render_end(&mut ctx);
        assert_eq!(
            ctx.commands(),
            &[
                DrawCommand::PushTransform(Transform::translate(50.0, 0.0)),
                DrawCommand::PopTransform,
            ]
        );
    }
}
