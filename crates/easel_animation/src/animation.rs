//! Frame-based animations
//!
//! An [`Animation`] is a timed mutation of one property of one element. It
//! is built from a constructor such as [`Animation::move_to`], bound to a
//! target and a frame window by a timeline builder, and then stepped once
//! per tick by the frame clock until it ends.
//!
//! # State machine
//!
//! ```text
//! Pending ──(frame >= start_frame)──▶ Active ──(frame > end_frame)──▶ Ended
//! ```
//!
//! The start value is captured from the target on activation, not when the
//! animation is built. A property changed between enqueueing and activation
//! is therefore animated *from its activation-time value*. Capturing at
//! construction instead would change observable behavior.
//!
//! An animation whose target has been removed keeps its timing but touches
//! nothing, so builders waiting on it still wake up on schedule.

use crate::easing::Easing;
use crate::values::{Alpha, Interpolate};
use easel_core::{Capability, Color, Drawable, ElementId, Point, Result};

/// Where an animation is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationState {
    Pending,
    Active,
    Ended,
}

/// The property an animation drives and the value it drives it to
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimationKind {
    /// Move to `end`, or by `end` when relative
    Movement { end: Point, relative: bool },
    /// Interpolate every RGBA channel to `end`
    Color { end: Color },
    /// Rotate to `end` radians, or by `end` radians when relative
    Rotation { end: f64, relative: bool },
    /// Drive the fill alpha, and the outline color alpha of outlined shapes, to `end`
    Opacity { end: u8 },
}

impl AnimationKind {
    /// The capability a target must expose for this animation to run
    pub fn required_capability(&self) -> Capability {
        match self {
            AnimationKind::Movement { .. } => Capability::Position,
            AnimationKind::Color { .. } => Capability::Color,
            AnimationKind::Rotation { .. } => Capability::Rotation,
            AnimationKind::Opacity { .. } => Capability::Color,
        }
    }
}

/// Endpoints resolved at activation
#[derive(Clone, Copy, Debug, PartialEq)]
enum Resolved {
    Movement { start: Point, end: Point },
    Color { start: Color, end: Color },
    Rotation { start: f64, end: f64 },
    Opacity {
        start: Alpha,
        outline_start: Option<Alpha>,
        end: Alpha,
    },
}

/// A timed, eased mutation of one element property
#[derive(Clone, Debug)]
pub struct Animation {
    kind: AnimationKind,
    easing: Easing,
    target: Option<ElementId>,
    start_frame: u64,
    duration: u64,
    state: AnimationState,
    resolved: Option<Resolved>,
}

impl Animation {
    pub fn new(kind: AnimationKind) -> Self {
        Self {
            kind,
            easing: Easing::Linear,
            target: None,
            start_frame: 0,
            duration: 0,
            state: AnimationState::Pending,
            resolved: None,
        }
    }

    /// Move to an absolute position
    pub fn move_to(x: f64, y: f64) -> Self {
        Self::new(AnimationKind::Movement {
            end: Point::new(x, y),
            relative: false,
        })
    }

    /// Move by an offset from wherever the target is on activation
    pub fn move_by(dx: f64, dy: f64) -> Self {
        Self::new(AnimationKind::Movement {
            end: Point::new(dx, dy),
            relative: true,
        })
    }

    pub fn color_to(color: impl Into<Color>) -> Self {
        Self::new(AnimationKind::Color { end: color.into() })
    }

    /// Rotate to an absolute angle in degrees
    pub fn rotate_to(degrees: f64) -> Self {
        Self::new(AnimationKind::Rotation {
            end: degrees.to_radians(),
            relative: false,
        })
    }

    /// Rotate by an angle in degrees relative to the rotation on activation
    pub fn rotate_by(degrees: f64) -> Self {
        Self::new(AnimationKind::Rotation {
            end: degrees.to_radians(),
            relative: true,
        })
    }

    /// Fade to an opacity between 0.0 (transparent) and 1.0 (opaque)
    pub fn fade_to(opacity: f64) -> Self {
        let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(AnimationKind::Opacity { end: alpha })
    }

    pub fn fade_in() -> Self {
        Self::fade_to(1.0)
    }

    pub fn fade_out() -> Self {
        Self::fade_to(0.0)
    }

    /// Set the easing (builder pattern)
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Bind to a target and a frame window.
    ///
    /// Called by timeline builders right before the animation is enqueued.
    pub fn bind(mut self, target: ElementId, start_frame: u64, duration: u64) -> Self {
        self.target = Some(target);
        self.start_frame = start_frame;
        self.duration = duration;
        self
    }

    pub fn kind(&self) -> &AnimationKind {
        &self.kind
    }

    pub fn target(&self) -> Option<ElementId> {
        self.target
    }

    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn end_frame(&self) -> u64 {
        self.start_frame + self.duration
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn is_ended(&self) -> bool {
        self.state == AnimationState::Ended
    }

    pub fn required_capability(&self) -> Capability {
        self.kind.required_capability()
    }

    /// Where a frame falls relative to this animation's window
    pub fn phase_at(&self, frame: u64) -> AnimationState {
        if frame < self.start_frame {
            AnimationState::Pending
        } else if frame <= self.end_frame() {
            AnimationState::Active
        } else {
            AnimationState::Ended
        }
    }

    /// Step the animation to `frame`.
    ///
    /// `target` is `None` once the element has been removed; the animation
    /// then only advances its state. Calling this twice with the same frame
    /// writes the same value twice.
    pub fn update(
        &mut self,
        frame: u64,
        target: Option<&mut dyn Drawable>,
    ) -> Result<AnimationState> {
        if self.state == AnimationState::Ended || frame < self.start_frame {
            return Ok(self.state);
        }

        let end_frame = self.end_frame();
        if self.state == AnimationState::Active && frame > end_frame {
            self.state = AnimationState::Ended;
            return Ok(self.state);
        }

        let Some(target) = target else {
            self.state = if frame > end_frame {
                AnimationState::Ended
            } else {
                AnimationState::Active
            };
            return Ok(self.state);
        };

        let resolved = match self.resolved {
            Some(resolved) => resolved,
            None => {
                let resolved = self.capture(target)?;
                tracing::trace!(
                    "activating {:?} on {} at frame {} (window {}..={})",
                    self.kind,
                    target.kind(),
                    frame,
                    self.start_frame,
                    end_frame
                );
                self.resolved = Some(resolved);
                self.state = AnimationState::Active;
                resolved
            }
        };

        let elapsed = frame.min(end_frame) - self.start_frame;
        let progress = if self.duration == 0 {
            1.0
        } else {
            elapsed as f64 / self.duration as f64
        };
        apply(&resolved, target, self.easing.ease(progress))?;

        // First seen after its window closed: the end value is applied once
        if frame > end_frame {
            self.state = AnimationState::Ended;
        }
        Ok(self.state)
    }

    fn capture(&self, target: &mut dyn Drawable) -> Result<Resolved> {
        let resolved = match self.kind {
            AnimationKind::Movement { end, relative } => {
                let start = target.require_positionable()?.position();
                let end = if relative { start + end } else { end };
                Resolved::Movement { start, end }
            }
            AnimationKind::Color { end } => Resolved::Color {
                start: target.require_colorable()?.color(),
                end,
            },
            AnimationKind::Rotation { end, relative } => {
                let start = target.require_rotatable()?.rotation();
                let end = if relative { start + end } else { end };
                Resolved::Rotation { start, end }
            }
            AnimationKind::Opacity { end } => {
                let start = Alpha(target.require_colorable()?.color().a);
                let outline_start = target
                    .as_outlineable()
                    .map(|outline| Alpha(outline.outline_color().a));
                Resolved::Opacity {
                    start,
                    outline_start,
                    end: Alpha(end),
                }
            }
        };
        Ok(resolved)
    }
}

fn apply(resolved: &Resolved, target: &mut dyn Drawable, t: f64) -> Result<()> {
    match *resolved {
        Resolved::Movement { start, end } => {
            target.require_positionable()?.set_position(start.lerp(&end, t));
        }
        Resolved::Color { start, end } => {
            target.require_colorable()?.set_color(start.lerp(&end, t));
        }
        Resolved::Rotation { start, end } => {
            target.require_rotatable()?.set_rotation(start.lerp(&end, t));
        }
        Resolved::Opacity {
            start,
            outline_start,
            end,
        } => {
            let fill = target.require_colorable()?;
            let color = fill.color();
            fill.set_color(color.with_alpha(start.lerp(&end, t).0));

            if let (Some(outline_start), Some(outline)) =
                (outline_start, target.as_outlineable_mut())
            {
                let color = outline.outline_color();
                outline.set_outline_color(color.with_alpha(outline_start.lerp(&end, t).0));
            }
        }
    }
    Ok(())
}
