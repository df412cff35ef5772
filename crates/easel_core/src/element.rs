//! Drawable elements and their capabilities
//!
//! A drawable is anything that can describe itself through a
//! [`DrawContext`]. What an animation may do to it is decided by the small
//! capability traits it opts into: a text label has a position, a color and
//! a rotation but no outline, an image has no fill color at all.
//!
//! Capabilities are discovered through the `as_*` accessors on [`Drawable`]
//! which default to `None`. The `require_*` helpers turn a missing
//! capability into [`EaselError::CapabilityMismatch`] so callers fail fast
//! instead of silently skipping the mutation.

use crate::color::Color;
use crate::draw::DrawContext;
use crate::error::{EaselError, Result};
use crate::geometry::Point;
use slotmap::new_key_type;
use std::fmt;

new_key_type! {
    /// Handle to an element stored in a canvas
    pub struct ElementId;
}

/// The properties an animation or setter can touch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    Position,
    Color,
    Outline,
    Rotation,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Position => "position",
            Capability::Color => "color",
            Capability::Outline => "outline color",
            Capability::Rotation => "rotation",
        };
        f.write_str(name)
    }
}

/// Gettable and settable position
pub trait Positionable {
    fn position(&self) -> Point;
    fn set_position(&mut self, position: Point);
}

/// Gettable and settable fill color
pub trait Colorable {
    fn color(&self) -> Color;
    fn set_color(&mut self, color: Color);
}

/// Shapes with a fill and an optional outline stroke
///
/// The outline color is independent of the stroke: it can be read and
/// animated while no outline is drawn.
pub trait Outlineable {
    fn outline_color(&self) -> Color;
    fn set_outline_color(&mut self, color: Color);

    /// Stroke width, `None` while no outline is drawn
    fn outline_width(&self) -> Option<f64>;
    fn set_outline_width(&mut self, width: Option<f64>);

    fn is_filled(&self) -> bool;
    fn set_filled(&mut self, filled: bool);
}

/// Gettable and settable rotation, in radians
pub trait Rotatable {
    fn rotation(&self) -> f64;
    fn set_rotation(&mut self, radians: f64);
}

/// Something that can be placed on a canvas and rendered every tick
pub trait Drawable: Send + 'static {
    /// Short human readable name used in errors and logs
    fn kind(&self) -> &'static str;

    /// Describe this drawable for the current frame
    fn draw(&self, ctx: &mut dyn DrawContext) -> Result<()>;

    fn as_positionable(&self) -> Option<&dyn Positionable> {
        None
    }

    fn as_positionable_mut(&mut self) -> Option<&mut dyn Positionable> {
        None
    }

    fn as_colorable(&self) -> Option<&dyn Colorable> {
        None
    }

    fn as_colorable_mut(&mut self) -> Option<&mut dyn Colorable> {
        None
    }

    fn as_outlineable(&self) -> Option<&dyn Outlineable> {
        None
    }

    fn as_outlineable_mut(&mut self) -> Option<&mut dyn Outlineable> {
        None
    }

    fn as_rotatable(&self) -> Option<&dyn Rotatable> {
        None
    }

    fn as_rotatable_mut(&mut self) -> Option<&mut dyn Rotatable> {
        None
    }
}

impl<'a> dyn Drawable + 'a {
    /// Whether this drawable exposes `capability`
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Position => self.as_positionable().is_some(),
            Capability::Color => self.as_colorable().is_some(),
            Capability::Outline => self.as_outlineable().is_some(),
            Capability::Rotation => self.as_rotatable().is_some(),
        }
    }

    /// Fail with a capability mismatch unless `capability` is supported
    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.supports(capability) {
            Ok(())
        } else {
            Err(self.mismatch(capability))
        }
    }

    pub fn require_positionable(&mut self) -> Result<&mut dyn Positionable> {
        let kind = self.kind();
        self.as_positionable_mut()
            .ok_or(EaselError::CapabilityMismatch {
                kind,
                capability: Capability::Position,
            })
    }

    pub fn require_colorable(&mut self) -> Result<&mut dyn Colorable> {
        let kind = self.kind();
        self.as_colorable_mut().ok_or(EaselError::CapabilityMismatch {
            kind,
            capability: Capability::Color,
        })
    }

    pub fn require_outlineable(&mut self) -> Result<&mut dyn Outlineable> {
        let kind = self.kind();
        self.as_outlineable_mut()
            .ok_or(EaselError::CapabilityMismatch {
                kind,
                capability: Capability::Outline,
            })
    }

    pub fn require_rotatable(&mut self) -> Result<&mut dyn Rotatable> {
        let kind = self.kind();
        self.as_rotatable_mut().ok_or(EaselError::CapabilityMismatch {
            kind,
            capability: Capability::Rotation,
        })
    }

    fn mismatch(&self, capability: Capability) -> EaselError {
        EaselError::CapabilityMismatch {
            kind: self.kind(),
            capability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rectangle, Sprite, Text};

    #[test]
    fn test_capability_discovery() {
        let rect: Box<dyn Drawable> = Box::new(Rectangle::new(0.0, 0.0, 10.0, 10.0));
        assert!(rect.supports(Capability::Position));
        assert!(rect.supports(Capability::Color));
        assert!(rect.supports(Capability::Outline));
        assert!(rect.supports(Capability::Rotation));

        let text: Box<dyn Drawable> = Box::new(Text::new("hi", 0.0, 0.0));
        assert!(text.supports(Capability::Color));
        assert!(!text.supports(Capability::Outline));
    }

    #[test]
    fn test_require_reports_mismatch() {
        let mut sprite: Box<dyn Drawable> = Box::new(Sprite::new("cat.png", 0.0, 0.0, 8.0, 8.0));
        let err = sprite.require_colorable().err();
        assert_eq!(
            err,
            Some(EaselError::CapabilityMismatch {
                kind: "Sprite",
                capability: Capability::Color,
            })
        );
        assert!(sprite.require(Capability::Position).is_ok());
        assert_eq!(
            sprite.require(Capability::Color).unwrap_err().to_string(),
            "Sprite does not support color"
        );
    }
}
