use std::ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign};

use thiserror::Error;

/// Error produced when a stride magnitude cannot be represented exactly by
/// the target stride type. Recoverable: callers can pick a different unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("stride magnitude {0} is not exactly representable")]
pub struct InexactStride(pub i128);

/// The duration/difference type paired with a scheduler's time type.
///
/// Arithmetic and ordering follow standard signed-integer semantics on the
/// underlying magnitude; `ZERO` is the additive identity. Each backend maps
/// the named unit constructors onto its own resolution.
pub trait SchedulerStride:
    Copy
    + Ord
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + TryFrom<i128, Error = InexactStride>
{
    /// The zero stride.
    const ZERO: Self;

    /// Exact construction from a wide integer. Returns `None` when
    /// `magnitude` does not fit the underlying type, never a truncated value.
    fn exactly(magnitude: i128) -> Option<Self> {
        Self::try_from(magnitude).ok()
    }

    fn seconds(value: i64) -> Self;
    fn milliseconds(value: i64) -> Self;
    fn microseconds(value: i64) -> Self;
    fn nanoseconds(value: i64) -> Self;
}

/// A scheduler's virtual-time instant.
///
/// `distance_to` and `advanced_by` are the minimal strideable pair; every
/// other time computation (is-before, is-after, clamping) derives from them
/// plus the stride's ordering.
pub trait SchedulerTime: Copy + Ord {
    type Stride: SchedulerStride;

    /// Stride from `self` to `other` (negative when `other` is earlier).
    fn distance_to(self, other: Self) -> Self::Stride;

    /// The instant `stride` away from `self`.
    fn advanced_by(self, stride: Self::Stride) -> Self;
}
