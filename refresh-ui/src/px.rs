//! Physical pixel units used by every layout computation.
//!
//! # Key Types
//!
//! - [`Px`] - A single pixel length or coordinate. Negative values are allowed
//!   so scroll offsets and deltas can be expressed directly.
//! - [`PxPosition`] - A 2D position (x grows to the right, y grows downward).
//! - [`PxSize`] - A 2D size, used for viewport dimensions.
//!
//! Arithmetic on [`Px`] is plain `i32` arithmetic; layout code that sums
//! caller-supplied heights uses the saturating variants so that absurd inputs
//! clamp instead of overflowing.
//!
//! # Example
//!
//! ```
//! use refresh_ui::px::{Px, PxPosition, PxSize};
//!
//! let gap = Px::new(16);
//! let position = PxPosition::new(Px::ZERO, gap * 3);
//! let viewport = PxSize::new(Px::new(1280), Px::new(720));
//!
//! assert_eq!(position.y, Px::new(48));
//! assert_eq!(viewport.width.raw(), 1280);
//! ```

use std::{
    iter::Sum,
    ops::{AddAssign, Neg, SubAssign},
};

use serde::{Deserialize, Serialize};

/// A physical pixel value.
///
/// # Examples
///
/// ```
/// use refresh_ui::px::Px;
///
/// let a = Px::new(100);
/// let b = Px::new(-50);
///
/// assert_eq!(a + b, Px::new(50));
/// assert_eq!(a * 2, Px::new(200));
/// assert_eq!(Px::new(i32::MAX).saturating_add(Px::new(1)), Px::MAX);
/// ```
#[derive(
    Debug, Default, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Px(pub i32);

impl Px {
    /// Zero pixels.
    pub const ZERO: Self = Self(0);

    /// The largest representable pixel value.
    pub const MAX: Self = Self(i32::MAX);

    /// Creates a new `Px` from an `i32`. Negative values are allowed.
    pub const fn new(value: i32) -> Self {
        Px(value)
    }

    /// Returns the raw `i32` value.
    pub fn raw(self) -> i32 {
        self.0
    }

    /// Returns the value as `u32`, or zero if negative.
    ///
    /// ```
    /// use refresh_ui::px::Px;
    ///
    /// assert_eq!(Px::new(10).positive(), 10);
    /// assert_eq!(Px::new(-5).positive(), 0);
    /// ```
    pub fn positive(self) -> u32 {
        if self.0 < 0 { 0 } else { self.0 as u32 }
    }

    /// Converts the pixel value to `f32`.
    pub fn to_f32(self) -> f32 {
        self.0 as f32
    }

    /// Creates a `Px` from an `f32`, clamping to the `i32` range.
    ///
    /// Fractional parts are truncated toward zero. `NaN` maps to zero.
    ///
    /// ```
    /// use refresh_ui::px::Px;
    ///
    /// assert_eq!(Px::saturating_from_f32(42.7), Px::new(42));
    /// assert_eq!(Px::saturating_from_f32(f32::MAX), Px::MAX);
    /// ```
    pub fn saturating_from_f32(value: f32) -> Self {
        let clamped_value = value.clamp(i32::MIN as f32, i32::MAX as f32);
        Px(clamped_value as i32)
    }

    /// Saturating addition.
    pub fn saturating_add(self, rhs: Self) -> Self {
        Px(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Px(self.0.saturating_sub(rhs.0))
    }

    /// Multiplies by a count, saturating at the `i32` bounds.
    ///
    /// ```
    /// use refresh_ui::px::Px;
    ///
    /// assert_eq!(Px::new(16).saturating_mul_count(3), Px::new(48));
    /// assert_eq!(Px::new(16).saturating_mul_count(0), Px::ZERO);
    /// assert_eq!(Px::MAX.saturating_mul_count(2), Px::MAX);
    /// ```
    pub fn saturating_mul_count(self, times: usize) -> Self {
        if times == 0 {
            return Px::ZERO;
        }
        let value = i64::from(self.0).saturating_mul(times.min(i64::MAX as usize) as i64);
        Px(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
    }

    /// Multiplies the pixel value by an `f32` scalar, saturating.
    pub fn mul_f32(self, rhs: f32) -> Self {
        Px::saturating_from_f32(self.0 as f32 * rhs)
    }

    /// Returns `self` if strictly positive, `fallback` otherwise.
    pub fn positive_or(self, fallback: Px) -> Px {
        if self > Px::ZERO { self } else { fallback }
    }
}

/// A 2D position in physical pixel space.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PxPosition {
    /// The x coordinate.
    pub x: Px,
    /// The y coordinate.
    pub y: Px,
}

impl PxPosition {
    /// The origin.
    pub const ZERO: Self = Self {
        x: Px::ZERO,
        y: Px::ZERO,
    };

    /// Creates a new position.
    pub const fn new(x: Px, y: Px) -> Self {
        Self { x, y }
    }

    /// Returns the position moved by the given deltas.
    pub fn offset(self, dx: Px, dy: Px) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// A 2D size in physical pixel space.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PxSize {
    /// Horizontal extent.
    pub width: Px,
    /// Vertical extent.
    pub height: Px,
}

impl PxSize {
    /// A zero-sized extent.
    pub const ZERO: Self = Self {
        width: Px::ZERO,
        height: Px::ZERO,
    };

    /// Creates a new size.
    pub const fn new(width: Px, height: Px) -> Self {
        Self { width, height }
    }
}

impl std::ops::Add for Px {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Px(self.0 + rhs.0)
    }
}

impl Neg for Px {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Px::new(-self.0)
    }
}

impl std::ops::Sub for Px {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Px(self.0 - rhs.0)
    }
}

impl std::ops::Mul<i32> for Px {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self::Output {
        Px(self.0 * rhs)
    }
}

impl std::ops::Div<i32> for Px {
    type Output = Self;

    fn div(self, rhs: i32) -> Self::Output {
        Px(self.0 / rhs)
    }
}

impl From<i32> for Px {
    fn from(value: i32) -> Self {
        Px(value)
    }
}

impl From<u32> for Px {
    fn from(value: u32) -> Self {
        Px(value.min(i32::MAX as u32) as i32)
    }
}

impl AddAssign for Px {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Px {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Sum for Px {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Px::ZERO, Px::saturating_add)
    }
}

impl std::fmt::Display for Px {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}px", self.0)
    }
}
