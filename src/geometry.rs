//! Coordinate spaces used by the builder
//!
//! Three spaces are kept apart at the type level:
//!  - [`RelativePos`] offset from the current position of the head
//!  - [`AbsolutePos`] position on the drawing, origin at `(0, 0)`
//!  - [`HardwareAbsolutePos`] position on the machine, `AbsolutePos + Workspace::min`
//!
//! Arithmetic is only defined inside a single space, moving between spaces
//! goes through named conversions ([`Workspace::to_hardware`](crate::Workspace::to_hardware),
//! [`HardwareAbsolutePos::relative_to`], [`Workspace::to_absolute`](crate::Workspace::to_absolute)).
use crate::{Error, Result};
use std::{
    fmt,
    marker::PhantomData,
    ops::{Add, Mul, Sub},
};

pub type Scalar = f64;
pub const EPSILON: f64 = f64::EPSILON;
pub const PI: f64 = std::f64::consts::PI;

/// Format floats in a compact way suitable for comments
pub fn scalar_fmt(f: &mut fmt::Formatter<'_>, value: Scalar) -> fmt::Result {
    let value_abs = value.abs();
    if value_abs.fract() < EPSILON {
        write!(f, "{}", value.trunc() as i64)
    } else if value_abs > 9999.0 || value_abs <= 0.0001 {
        write!(f, "{:.3e}", value)
    } else {
        let ten: Scalar = 10.0;
        let round = ten.powi(6 - (value_abs.trunc() + 1.0).log10().ceil() as i32);
        write!(f, "{}", (value * round).round() / round)
    }
}

/// Marker of the space relative to the current position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relative {}

/// Marker of the drawing space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absolute {}

/// Marker of the machine space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hardware {}

/// 2D position tagged with the space `S` it belongs to.
pub struct Pos<S> {
    xy: [Scalar; 2],
    space: PhantomData<S>,
}

/// Offset from the current position
pub type RelativePos = Pos<Relative>;
/// Position on the drawing
pub type AbsolutePos = Pos<Absolute>;
/// Position on the machine
pub type HardwareAbsolutePos = Pos<Hardware>;

impl<S> Pos<S> {
    #[inline]
    pub const fn new(x: Scalar, y: Scalar) -> Self {
        Self {
            xy: [x, y],
            space: PhantomData,
        }
    }

    /// Get `x` component of the position
    #[inline]
    pub fn x(self) -> Scalar {
        self.xy[0]
    }

    /// Get `y` component of the position
    #[inline]
    pub fn y(self) -> Scalar {
        self.xy[1]
    }

    /// Components as an array `[x, y]`
    #[inline]
    pub fn to_array(self) -> [Scalar; 2] {
        self.xy
    }

    /// Reinterpret components in another space, only for use by the conversions
    #[inline]
    pub(crate) fn retag<T>(self) -> Pos<T> {
        Pos::new(self.x(), self.y())
    }

    /// Determine if self is close to the other within the margin of `EPSILON`
    pub fn is_close_to(self, other: Self) -> bool {
        (self.x() - other.x()).abs() < EPSILON && (self.y() - other.y()).abs() < EPSILON
    }
}

impl AbsolutePos {
    /// Drawing space only contains non-negative coordinates
    pub fn validate(self) -> Result<Self> {
        for (axis, value) in [(Axis::X, self.x()), (Axis::Y, self.y())] {
            // also rejects NaN
            if !(value >= 0.0) {
                return Err(Error::InvalidPosition { axis, value });
            }
        }
        Ok(self)
    }

    /// Point on the circle with the `center` and `radius` at angle `angle`
    ///
    /// Angle `0` points along positive `x` axis, angles grow counterclockwise.
    pub fn on_circle(self, radius: Scalar, angle: Scalar) -> Self {
        let (sin, cos) = angle.sin_cos();
        self + Self::new(cos * radius, sin * radius)
    }
}

impl HardwareAbsolutePos {
    /// Offset that moves the head from `current` to `self`
    pub fn relative_to(self, current: HardwareAbsolutePos) -> RelativePos {
        (self - current).retag()
    }
}

impl<S> Clone for Pos<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Pos<S> {}

impl<S> PartialEq for Pos<S> {
    fn eq(&self, other: &Self) -> bool {
        self.xy == other.xy
    }
}

impl<S> Default for Pos<S> {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl<S> fmt::Debug for Pos<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y] = self.xy;
        write!(f, "(")?;
        scalar_fmt(f, x)?;
        write!(f, ",")?;
        scalar_fmt(f, y)?;
        write!(f, ")")
    }
}

impl<S> From<(Scalar, Scalar)> for Pos<S> {
    #[inline]
    fn from(xy: (Scalar, Scalar)) -> Self {
        Self::new(xy.0, xy.1)
    }
}

impl<S> Add for Pos<S> {
    type Output = Pos<S>;

    #[inline]
    fn add(self, other: Pos<S>) -> Self::Output {
        Pos::new(self.x() + other.x(), self.y() + other.y())
    }
}

impl<S> Sub for Pos<S> {
    type Output = Pos<S>;

    #[inline]
    fn sub(self, other: Pos<S>) -> Self::Output {
        Pos::new(self.x() - other.x(), self.y() - other.y())
    }
}

impl<S> Mul<Pos<S>> for Scalar {
    type Output = Pos<S>;

    #[inline]
    fn mul(self, other: Pos<S>) -> Self::Output {
        Pos::new(self * other.x(), self * other.y())
    }
}

/// Machine axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "X"),
            Axis::Y => write!(f, "Y"),
        }
    }
}

/// Which side of the workspace envelope was crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    Min,
    Max,
}
