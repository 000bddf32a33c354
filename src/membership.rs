//! Trapezoidal membership functions.
//!
//! A trapezoid rises from 0 to 1 over `[a, b]`, stays at 1 over `[b, c]` and
//! falls back to 0 over `[c, d]`. Triangles (`b == c`) and vertical edges
//! (`a == b` or `c == d`) are the same type.

use serde::{Deserialize, Serialize};

use crate::error::ShapeError;

/// Piecewise-linear membership function with breakpoints `a <= b <= c <= d`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trapezoid {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

impl Trapezoid {
    /// Build a trapezoid, rejecting non-finite or unordered breakpoints.
    ///
    /// `name` is only used to label the error.
    pub fn new(name: &str, a: f64, b: f64, c: f64, d: f64) -> Result<Self, ShapeError> {
        if ![a, b, c, d].iter().all(|v| v.is_finite()) {
            return Err(ShapeError::NonFinite { set: name.into() });
        }
        if !(a <= b && b <= c && c <= d) {
            return Err(ShapeError::Unordered {
                set: name.into(),
                a,
                b,
                c,
                d,
            });
        }
        Ok(Self { a, b, c, d })
    }

    /// Triangle peaking at `b`.
    pub fn triangle(name: &str, a: f64, b: f64, c: f64) -> Result<Self, ShapeError> {
        Self::new(name, a, b, b, c)
    }

    pub fn breakpoints(&self) -> [f64; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Lower end of the support.
    pub fn start(&self) -> f64 {
        self.a
    }

    /// Upper end of the support.
    pub fn end(&self) -> f64 {
        self.d
    }

    /// Membership degree of `value`, in `[0, 1]`.
    ///
    /// The core `[b, c]` is checked first, so a vertical edge (`a == b` or
    /// `c == d`) reports 1.0 at the edge itself. Neither slope is ever
    /// evaluated with a zero-width denominator.
    pub fn degree(&self, value: f64) -> f64 {
        let Self { a, b, c, d } = *self;
        if b <= value && value <= c {
            1.0
        } else if value <= a || value >= d {
            0.0
        } else if value < b {
            (value - a) / (b - a)
        } else {
            (d - value) / (d - c)
        }
    }
}

impl std::fmt::Display for Trapezoid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.a, self.b, self.c, self.d)
    }
}
