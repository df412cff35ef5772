//! Animatable value types
//!
//! Provides the interpolation used by every animation variant.

use easel_core::color::{lerp_channel, Color};
use easel_core::Point;

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Interpolate between self and other by factor t.
    ///
    /// `t` is the already-eased progress and may leave `0.0..=1.0`.
    fn lerp(&self, other: &Self, t: f64) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f64) -> bool;
}

// ============================================================================
// f64 Implementation
// ============================================================================

impl Interpolate for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self - other).abs() < epsilon
    }
}

// ============================================================================
// Point Implementation
// ============================================================================

impl Interpolate for Point {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Point::new(self.x.lerp(&other.x, t), self.y.lerp(&other.y, t))
    }

    fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.x.approx_eq(&other.x, epsilon) && self.y.approx_eq(&other.y, epsilon)
    }
}

// ============================================================================
// Color Implementation
// ============================================================================

impl Interpolate for Color {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Color::lerp(self, other, t)
    }

    fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.to_array()
            .iter()
            .zip(other.to_array().iter())
            .all(|(a, b)| (*a as f64 - *b as f64).abs() < epsilon)
    }
}

/// A single 8-bit alpha channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Alpha(pub u8);

impl Interpolate for Alpha {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Alpha(lerp_channel(self.0, other.0, t))
    }

    fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.0 as f64 - other.0 as f64).abs() < epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_lerp() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 50.0);
        assert_eq!(a.lerp(&b, 0.5), Point::new(50.0, 25.0));
        assert!(a.lerp(&b, 1.0).approx_eq(&b, 1e-9));
    }

    #[test]
    fn test_alpha_lerp_clamps() {
        assert_eq!(Alpha(200).lerp(&Alpha(255), 3.0), Alpha(255));
        assert_eq!(Alpha(10).lerp(&Alpha(0), 2.0), Alpha(0));
        assert_eq!(Alpha(0).lerp(&Alpha(255), 0.5), Alpha(127));
    }
}
