//! Easing functions for animations
//!
//! An easing maps normalized progress to eased progress. Every easing is
//! stateless and `Copy`, so one value can drive any number of animations.
//!
//! Inputs are not clamped: callers that step past the end of an animation get
//! the curve's extrapolation. Clamping, where a property needs it (color
//! channels, alpha), happens when the value is applied to a target.

use std::f64::consts::PI;
use std::fmt;

/// Easing function type
#[derive(Clone, Copy, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// `t^n`
    InNth(f64),
    /// `1 - (1 - t)^n`
    OutNth(f64),
    /// Symmetric power ease: `(2t)^n / 2` then `1 - (2(1 - t))^n / 2`
    InOutNth(f64),
    InSine,
    OutSine,
    InOutSine,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    InQuint,
    OutQuint,
    InOutQuint,
    InExpo,
    OutExpo,
    InOutExpo,
    InCirc,
    OutCirc,
    InOutCirc,
    InBack,
    OutBack,
    InOutBack,
    InElastic,
    OutElastic,
    InOutElastic,
    InBounce,
    OutBounce,
    InOutBounce,
    CubicBezier(f64, f64, f64, f64),
    /// Any plain function of progress
    Custom(fn(f64) -> f64),
}

const BACK_C1: f64 = 1.70158;
const BACK_C2: f64 = BACK_C1 * 1.525;
const BACK_C3: f64 = BACK_C1 + 1.0;
const ELASTIC_C4: f64 = (2.0 * PI) / 3.0;
const ELASTIC_C5: f64 = (2.0 * PI) / 4.5;

impl Easing {
    pub fn linear() -> Self {
        Easing::Linear
    }

    pub fn in_nth(n: f64) -> Self {
        Easing::InNth(n)
    }

    pub fn out_nth(n: f64) -> Self {
        Easing::OutNth(n)
    }

    pub fn in_out_nth(n: f64) -> Self {
        Easing::InOutNth(n)
    }

    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn ease(&self, t: f64) -> f64 {
        match *self {
            Easing::Linear => t,
            Easing::InNth(n) => t.powf(n),
            Easing::OutNth(n) => 1.0 - (1.0 - t).powf(n),
            Easing::InOutNth(n) => {
                if t < 0.5 {
                    (2.0 * t).powf(n) / 2.0
                } else {
                    1.0 - (2.0 * (1.0 - t)).powf(n) / 2.0
                }
            }
            Easing::InSine => 1.0 - ((t * PI) / 2.0).cos(),
            Easing::OutSine => ((t * PI) / 2.0).sin(),
            Easing::InOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Easing::InQuad => t * t,
            Easing::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::InOutQuad => in_out_power(t, 2),
            Easing::InCubic => t * t * t,
            Easing::OutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::InOutCubic => in_out_power(t, 3),
            Easing::InQuart => t.powi(4),
            Easing::OutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::InOutQuart => in_out_power(t, 4),
            Easing::InQuint => t.powi(5),
            Easing::OutQuint => 1.0 - (1.0 - t).powi(5),
            Easing::InOutQuint => in_out_power(t, 5),
            Easing::InExpo => {
                if t == 0.0 {
                    0.0
                } else {
                    2f64.powf(10.0 * t - 10.0)
                }
            }
            Easing::OutExpo => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Easing::InOutExpo => {
                if t == 0.0 || t == 1.0 {
                    t
                } else if t < 0.5 {
                    2f64.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f64.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Easing::InCirc => 1.0 - (1.0 - t * t).sqrt(),
            Easing::OutCirc => (1.0 - (t - 1.0).powi(2)).sqrt(),
            Easing::InOutCirc => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).sqrt() + 1.0) / 2.0
                }
            }
            Easing::InBack => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Easing::OutBack => {
                1.0 + BACK_C3 * (t - 1.0).powi(3) + BACK_C1 * (t - 1.0).powi(2)
            }
            Easing::InOutBack => {
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((BACK_C2 + 1.0) * 2.0 * t - BACK_C2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((BACK_C2 + 1.0) * (t * 2.0 - 2.0) + BACK_C2)
                        + 2.0)
                        / 2.0
                }
            }
            Easing::InElastic => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    -(2f64.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * ELASTIC_C4).sin()
                }
            }
            Easing::OutElastic => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    2f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * ELASTIC_C4).sin() + 1.0
                }
            }
            Easing::InOutElastic => {
                if t == 0.0 || t == 1.0 {
                    t
                } else if t < 0.5 {
                    -(2f64.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin())
                        / 2.0
                } else {
                    (2f64.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin())
                        / 2.0
                        + 1.0
                }
            }
            Easing::InBounce => 1.0 - bounce_out(1.0 - t),
            Easing::OutBounce => bounce_out(t),
            Easing::InOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(t, x1, y1, x2, y2),
            Easing::Custom(f) => f(t),
        }
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::InNth(n) => write!(f, "InNth({n})"),
            Easing::OutNth(n) => write!(f, "OutNth({n})"),
            Easing::InOutNth(n) => write!(f, "InOutNth({n})"),
            Easing::CubicBezier(x1, y1, x2, y2) => {
                write!(f, "CubicBezier({x1}, {y1}, {x2}, {y2})")
            }
            Easing::Custom(_) => f.write_str("Custom(..)"),
            other => f.write_str(other.name()),
        }
    }
}

impl Easing {
    fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "Linear",
            Easing::InNth(_) => "InNth",
            Easing::OutNth(_) => "OutNth",
            Easing::InOutNth(_) => "InOutNth",
            Easing::InSine => "InSine",
            Easing::OutSine => "OutSine",
            Easing::InOutSine => "InOutSine",
            Easing::InQuad => "InQuad",
            Easing::OutQuad => "OutQuad",
            Easing::InOutQuad => "InOutQuad",
            Easing::InCubic => "InCubic",
            Easing::OutCubic => "OutCubic",
            Easing::InOutCubic => "InOutCubic",
            Easing::InQuart => "InQuart",
            Easing::OutQuart => "OutQuart",
            Easing::InOutQuart => "InOutQuart",
            Easing::InQuint => "InQuint",
            Easing::OutQuint => "OutQuint",
            Easing::InOutQuint => "InOutQuint",
            Easing::InExpo => "InExpo",
            Easing::OutExpo => "OutExpo",
            Easing::InOutExpo => "InOutExpo",
            Easing::InCirc => "InCirc",
            Easing::OutCirc => "OutCirc",
            Easing::InOutCirc => "InOutCirc",
            Easing::InBack => "InBack",
            Easing::OutBack => "OutBack",
            Easing::InOutBack => "InOutBack",
            Easing::InElastic => "InElastic",
            Easing::OutElastic => "OutElastic",
            Easing::InOutElastic => "InOutElastic",
            Easing::InBounce => "InBounce",
            Easing::OutBounce => "OutBounce",
            Easing::InOutBounce => "InOutBounce",
            Easing::CubicBezier(..) => "CubicBezier",
            Easing::Custom(_) => "Custom",
        }
    }
}

/// `2^(p-1) t^p` for the first half, mirrored for the second
fn in_out_power(t: f64, p: i32) -> f64 {
    if t < 0.5 {
        2f64.powi(p - 1) * t.powi(p)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(p) / 2.0
    }
}

fn bounce_out(t: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

/// Solve a CSS `cubic-bezier(x1, y1, x2, y2)` curve for `t`
///
/// Newton-Raphson on x, falling back to bisection when the slope flattens.
fn cubic_bezier_ease(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    // Endpoints are always exact
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let mut p = t;
    for _ in 0..8 {
        let err = bezier_sample(p, x1, x2) - t;
        if err.abs() < 1e-7 {
            return bezier_sample(p, y1, y2);
        }
        let slope = bezier_slope(p, x1, x2);
        if slope.abs() < 1e-7 {
            break;
        }
        p -= err / slope;
    }

    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    p = t;
    for _ in 0..20 {
        let val = bezier_sample(p, x1, x2);
        if (val - t).abs() < 1e-7 {
            break;
        }
        if val < t {
            lo = p;
        } else {
            hi = p;
        }
        p = (lo + hi) * 0.5;
    }

    bezier_sample(p, y1, y2)
}

/// B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³, in Horner form
#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}
